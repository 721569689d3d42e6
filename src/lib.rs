//! Data-access layer for Buildbot pipeline servers.
//!
//! [`BuildbotClient`] fetches builders, builds, steps, logs, workers and
//! changes from the Buildbot REST API, sends build actions, and keeps a
//! builder name cache. [`classify_step_urls`] turns the links attached to
//! build steps into typed request, build and plain links.

pub mod buildbot;
pub mod config;
pub mod error;

pub use buildbot::*;
pub use config::{BackendConfig, Config};
pub use error::{BuildviewError, Result};
