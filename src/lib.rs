//! Client library for the mentoring study-group LMS.
//!
//! Owns the REST contract, the JWT session, a normalized client-side store and
//! the panel view-models (curriculum, activity, group, account) that the CLI
//! and any other front-end drive.

pub mod core;
pub mod logger;
pub mod shared;

pub use crate::core::config;
pub use shared::*;
