//! taskmatrix - seed and reconcile tasks in a Task Matrix instance.
//!
//! This library provides the core functionality for the `tm` CLI tool:
//! submitting the embedded task catalog, correcting urgency and category
//! drift against the ground-truth mapping, and listing remote tasks in
//! priority order.

pub mod api;
pub mod catalog;
pub mod cli;
pub mod commands;
pub mod config;
pub mod logging;
pub mod models;


/// Library-level error type for taskmatrix operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Api(#[from] api::ApiError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Result type alias for taskmatrix operations.
pub type Result<T> = std::result::Result<T, Error>;
