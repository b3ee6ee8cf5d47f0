use std::sync::Arc;

use anyhow::anyhow;
use client::{ClientError, QueryState};

pub mod completion;
pub mod config;
pub mod itinerary;
pub mod profile;
pub mod session;
pub mod trips;
pub mod weather;

/// Turns a client error into a command failure, pointing at `session login`
/// when the problem is a missing or rejected session.
pub fn hint(err: ClientError) -> anyhow::Error {
    match err {
        ClientError::NotAuthenticated => {
            anyhow!("not signed in. run `planner session login` first")
        }
        err if err.is_auth() => {
            anyhow!("{err}. run `planner session login` to sign in again")
        }
        err => anyhow::Error::new(err),
    }
}

/// The payload of a settled query.
pub fn loaded<T>(state: QueryState<T>) -> anyhow::Result<Arc<T>> {
    state.into_result().map_err(hint)
}
