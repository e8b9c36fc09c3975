//! Configuration for taskmatrix.
//!
//! ## config.kdl
//!
//! Located at `~/.config/taskmatrix/config.kdl` (or the path given by
//! `--config` / `TM_CONFIG`). Every key is optional:
//! - `api-url` - Base URL of the tasks endpoint
//! - `timeout-secs` - Per-request network timeout
//! - `source` - Origin tag written into created tasks
//! - `seed-delay-ms`, `failure-delay-ms`, `patch-delay-ms` - Pacing between requests
//!
//! ## Precedence
//!
//! CLI flag > config.kdl > defaults. Use the [`resolver`] module for
//! resolution with source tracking.

pub mod resolver;
pub mod schema;

pub use resolver::{
    DEFAULT_API_URL, Resolved, ResolvedSettings, SettingsOverrides, ValueSource, resolve_settings,
};
pub use schema::{TmConfig, default_config_path, load_config_file};
