#![forbid(unsafe_code)]
#![deny(warnings, clippy::pedantic)]
#![allow(clippy::multiple_crate_versions)]
//! Client data layer for the travel planner: a REST adapter over a pluggable
//! transport, typed resource clients, a persisted session store, a keyed
//! query cache, and the route guard that decides what an anonymous visitor
//! may see.
//!
//! [`Planner`] wires all of it together.

pub mod api;
pub mod app;
pub mod error;
/// Which pages need a session, and where to send visitors who lack one.
pub mod guard;
pub mod http;
/// Where the user is and how to move them.
pub mod navigation;
pub mod query;
pub mod session;
pub mod storage;
pub mod transport;

#[cfg(test)]
mod test_support;

pub use app::Planner;
pub use error::{ClientError, ClientResult};
pub use guard::{AppRoute, GuardDecision, RouteGuard};
pub use query::{QueryClient, QueryKey, QueryState, QueryStatus};
pub use session::{AuthState, SessionStore};
