//! KDL schema for config.kdl.
//!
//! This module provides:
//! - The Rust struct representing the config file
//! - Parsing from KDL
//! - Validation
//! - Loading from disk

use crate::Error;
use kdl::{KdlDocument, KdlNode};
use std::path::{Path, PathBuf};

/// Directory name under the platform config dir.
pub const CONFIG_DIR_NAME: &str = "taskmatrix";

/// File name of the config file.
pub const CONFIG_FILE_NAME: &str = "config.kdl";

/// User settings stored in config.kdl.
///
/// # KDL Schema
///
/// ```kdl
/// api-url "https://agency-task-matrix.vercel.app/api/tasks"
/// timeout-secs 15
/// source "manual"
/// seed-delay-ms 300
/// failure-delay-ms 1000
/// patch-delay-ms 200
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TmConfig {
    /// Base URL of the tasks endpoint
    pub api_url: Option<String>,

    /// Per-request network timeout
    pub timeout_secs: Option<u64>,

    /// Origin tag written into created tasks
    pub source: Option<String>,

    /// Pause after each successful create
    pub seed_delay_ms: Option<u64>,

    /// Pause after each failed create
    pub failure_delay_ms: Option<u64>,

    /// Pause after each successful update
    pub patch_delay_ms: Option<u64>,
}

impl TmConfig {
    /// Create an empty config with no values set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate the config values.
    ///
    /// Returns an error message if any value is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if let Some(ref url) = self.api_url {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(format!("api-url must be an http(s) URL, got '{}'", url));
            }
        }
        if self.timeout_secs == Some(0) {
            return Err("timeout-secs must be at least 1".to_string());
        }
        if let Some(ref source) = self.source {
            if source.trim().is_empty() {
                return Err("source must not be empty".to_string());
            }
        }
        Ok(())
    }

    /// Parse config from a KDL document.
    ///
    /// Unknown nodes are ignored. Values of the wrong type are an error.
    pub fn from_kdl(doc: &KdlDocument) -> Result<Self, String> {
        let mut config = Self::new();

        for node in doc.nodes() {
            match node.name().value() {
                "api-url" => config.api_url = Some(string_arg(node)?),
                "source" => config.source = Some(string_arg(node)?),
                "timeout-secs" => config.timeout_secs = Some(u64_arg(node)?),
                "seed-delay-ms" => config.seed_delay_ms = Some(u64_arg(node)?),
                "failure-delay-ms" => config.failure_delay_ms = Some(u64_arg(node)?),
                "patch-delay-ms" => config.patch_delay_ms = Some(u64_arg(node)?),
                _ => {}
            }
        }

        Ok(config)
    }
}

fn string_arg(node: &KdlNode) -> Result<String, String> {
    node.entries()
        .first()
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
        .ok_or_else(|| format!("{} expects a string", node.name().value()))
}

fn u64_arg(node: &KdlNode) -> Result<u64, String> {
    node.entries()
        .first()
        .and_then(|e| e.value().as_integer())
        .and_then(|i| u64::try_from(i).ok())
        .ok_or_else(|| format!("{} expects a non-negative integer", node.name().value()))
}

/// Default config location: `$XDG_CONFIG_HOME/taskmatrix/config.kdl`.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Load and validate a config file.
///
/// A missing file yields an empty config.
pub fn load_config_file(path: &Path) -> Result<TmConfig, Error> {
    if !path.exists() {
        return Ok(TmConfig::new());
    }

    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;

    let doc: KdlDocument = content
        .parse()
        .map_err(|e| Error::Config(format!("Failed to parse KDL in {}: {}", path.display(), e)))?;

    let config = TmConfig::from_kdl(&doc)
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;
    config
        .validate()
        .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))?;

    Ok(config)
}
