//! Core module: HTTP contract, session, store and panel view-models

pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod error;
pub mod http;
pub mod image;
pub mod models;
pub mod panels;
pub mod role;
pub mod storage;
pub mod store;
pub mod validation;

pub use app::{AppState, UiState};
pub use error::{ApiError, ErrorCode, PanelError, ValidationError};
pub use http::{HttpTransport, Transport};
