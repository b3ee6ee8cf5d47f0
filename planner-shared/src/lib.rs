#![forbid(unsafe_code)]
#![deny(warnings, clippy::pedantic)]
#![allow(clippy::multiple_crate_versions)]
//! Types shared by the planner client library and its front ends: wire
//! models, form validation and configuration.

pub mod config;
pub mod form;
pub mod models;
