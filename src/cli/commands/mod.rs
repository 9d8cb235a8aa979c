//! CLI command handlers for `mentorhub`.
//!
//! Each handler drives one panel of the library and prints the result.
//! Failures have already raised an alert in the app state; `main` prints it.

pub mod account;
pub mod activity;
pub mod config;
pub mod group;
pub mod plan;

use mentorhub::core::{AppState, HttpTransport};

/// App state as used by the CLI
pub type App = AppState<HttpTransport>;

/// `-` for missing optional text
pub fn or_dash(value: Option<&str>) -> &str {
    value.filter(|v| !v.is_empty()).unwrap_or("-")
}
