//! Precedence resolution for runtime settings.
//!
//! ## Precedence (highest to lowest)
//!
//! 1. CLI flags (including their environment variable fallbacks, e.g. `TM_API_URL`)
//! 2. config.kdl (`~/.config/taskmatrix/config.kdl` or `--config`)
//! 3. Built-in defaults

use crate::commands::Pacing;
use crate::config::TmConfig;
use crate::models::DEFAULT_SOURCE;
use serde::Serialize;
use std::path::Path;
use std::time::Duration;

/// Default tasks endpoint.
pub const DEFAULT_API_URL: &str = "https://agency-task-matrix.vercel.app/api/tasks";

/// Default per-request timeout.
pub const DEFAULT_TIMEOUT_SECS: u64 = 15;

/// Default pause after a successful create.
pub const DEFAULT_SEED_DELAY_MS: u64 = 300;

/// Default pause after a failed create.
pub const DEFAULT_FAILURE_DELAY_MS: u64 = 1000;

/// Default pause after a successful update.
pub const DEFAULT_PATCH_DELAY_MS: u64 = 200;

/// Tracks where a resolved value came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueSource {
    /// Value from a CLI flag or its environment variable
    CliFlag,
    /// Value from a config file
    ConfigFile(String),
    /// Built-in default value
    Default,
}

impl std::fmt::Display for ValueSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ValueSource::CliFlag => write!(f, "cli"),
            ValueSource::ConfigFile(path) => write!(f, "config:{}", path),
            ValueSource::Default => write!(f, "default"),
        }
    }
}

impl Serialize for ValueSource {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A resolved value with its source.
#[derive(Debug, Clone, Serialize)]
pub struct Resolved<T> {
    /// The resolved value
    pub value: T,
    /// Where the value came from
    pub source: ValueSource,
}

impl<T> Resolved<T> {
    /// Create a new resolved value.
    pub fn new(value: T, source: ValueSource) -> Self {
        Self { value, source }
    }
}

/// Fully resolved settings with source tracking.
#[derive(Debug, Clone, Serialize)]
pub struct ResolvedSettings {
    pub api_url: Resolved<String>,
    pub timeout_secs: Resolved<u64>,
    pub source: Resolved<String>,
    pub seed_delay_ms: Resolved<u64>,
    pub failure_delay_ms: Resolved<u64>,
    pub patch_delay_ms: Resolved<u64>,
}

impl Default for ResolvedSettings {
    fn default() -> Self {
        Self {
            api_url: Resolved::new(DEFAULT_API_URL.to_string(), ValueSource::Default),
            timeout_secs: Resolved::new(DEFAULT_TIMEOUT_SECS, ValueSource::Default),
            source: Resolved::new(DEFAULT_SOURCE.to_string(), ValueSource::Default),
            seed_delay_ms: Resolved::new(DEFAULT_SEED_DELAY_MS, ValueSource::Default),
            failure_delay_ms: Resolved::new(DEFAULT_FAILURE_DELAY_MS, ValueSource::Default),
            patch_delay_ms: Resolved::new(DEFAULT_PATCH_DELAY_MS, ValueSource::Default),
        }
    }
}

impl ResolvedSettings {
    pub fn api_url(&self) -> &str {
        &self.api_url.value
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.value)
    }

    pub fn source(&self) -> &str {
        &self.source.value
    }

    /// Pacing for the seeder: pause after every create, longer after failures.
    pub fn seed_pacing(&self) -> Pacing {
        Pacing {
            after_success: Duration::from_millis(self.seed_delay_ms.value),
            after_failure: Duration::from_millis(self.failure_delay_ms.value),
        }
    }

    /// Pacing for the corrector: pause only after successful updates.
    pub fn patch_pacing(&self) -> Pacing {
        Pacing {
            after_success: Duration::from_millis(self.patch_delay_ms.value),
            after_failure: Duration::ZERO,
        }
    }
}

/// CLI overrides for settings resolution.
#[derive(Debug, Clone, Default)]
pub struct SettingsOverrides {
    /// API URL from `--api-url` / `TM_API_URL`
    pub api_url: Option<String>,
    /// `--no-delay`: zero every pacing delay
    pub no_delay: bool,
}

impl SettingsOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = Some(url.into());
        self
    }

    pub fn with_no_delay(mut self) -> Self {
        self.no_delay = true;
        self
    }
}

/// Resolve settings with the full precedence chain.
///
/// `config_path` is only used to label values that came from `file`.
pub fn resolve_settings(
    overrides: &SettingsOverrides,
    file: &TmConfig,
    config_path: Option<&Path>,
) -> ResolvedSettings {
    let mut result = ResolvedSettings::default();
    let from_file = || {
        ValueSource::ConfigFile(
            config_path
                .map(|p| p.display().to_string())
                .unwrap_or_else(|| "config.kdl".to_string()),
        )
    };

    if let Some(ref url) = overrides.api_url {
        result.api_url = Resolved::new(url.clone(), ValueSource::CliFlag);
    } else if let Some(ref url) = file.api_url {
        result.api_url = Resolved::new(url.clone(), from_file());
    }

    if let Some(secs) = file.timeout_secs {
        result.timeout_secs = Resolved::new(secs, from_file());
    }

    if let Some(ref source) = file.source {
        result.source = Resolved::new(source.clone(), from_file());
    }

    if overrides.no_delay {
        result.seed_delay_ms = Resolved::new(0, ValueSource::CliFlag);
        result.failure_delay_ms = Resolved::new(0, ValueSource::CliFlag);
        result.patch_delay_ms = Resolved::new(0, ValueSource::CliFlag);
    } else {
        if let Some(ms) = file.seed_delay_ms {
            result.seed_delay_ms = Resolved::new(ms, from_file());
        }
        if let Some(ms) = file.failure_delay_ms {
            result.failure_delay_ms = Resolved::new(ms, from_file());
        }
        if let Some(ms) = file.patch_delay_ms {
            result.patch_delay_ms = Resolved::new(ms, from_file());
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_defaults() {
        let settings = resolve_settings(&SettingsOverrides::new(), &TmConfig::new(), None);

        assert_eq!(settings.api_url(), DEFAULT_API_URL);
        assert_eq!(settings.api_url.source, ValueSource::Default);
        assert_eq!(settings.timeout(), Duration::from_secs(15));
        assert_eq!(settings.source(), "manual");
        assert_eq!(
            settings.seed_pacing(),
            Pacing {
                after_success: Duration::from_millis(300),
                after_failure: Duration::from_millis(1000),
            }
        );
        assert_eq!(settings.patch_pacing().after_success, Duration::from_millis(200));
        assert_eq!(settings.patch_pacing().after_failure, Duration::ZERO);
    }

    #[test]
    fn test_file_overrides_defaults() {
        let file = TmConfig {
            api_url: Some("http://localhost:3000/api/tasks".to_string()),
            timeout_secs: Some(3),
            seed_delay_ms: Some(50),
            ..Default::default()
        };
        let path = PathBuf::from("/tmp/tm/config.kdl");
        let settings = resolve_settings(&SettingsOverrides::new(), &file, Some(&path));

        assert_eq!(settings.api_url(), "http://localhost:3000/api/tasks");
        assert_eq!(
            settings.api_url.source,
            ValueSource::ConfigFile("/tmp/tm/config.kdl".to_string())
        );
        assert_eq!(settings.timeout_secs.value, 3);
        assert_eq!(settings.seed_delay_ms.value, 50);
        assert_eq!(settings.failure_delay_ms.source, ValueSource::Default);
    }

    #[test]
    fn test_cli_overrides_file() {
        let file = TmConfig {
            api_url: Some("http://from-file/api/tasks".to_string()),
            patch_delay_ms: Some(500),
            ..Default::default()
        };
        let overrides = SettingsOverrides::new()
            .with_api_url("http://from-cli/api/tasks")
            .with_no_delay();
        let settings = resolve_settings(&overrides, &file, None);

        assert_eq!(settings.api_url(), "http://from-cli/api/tasks");
        assert_eq!(settings.api_url.source, ValueSource::CliFlag);
        assert_eq!(settings.patch_delay_ms.value, 0);
        assert_eq!(settings.seed_pacing(), Pacing::none());
        assert_eq!(settings.patch_pacing(), Pacing::none());
    }

    #[test]
    fn test_value_source_display() {
        assert_eq!(ValueSource::CliFlag.to_string(), "cli");
        assert_eq!(ValueSource::Default.to_string(), "default");
        assert_eq!(
            ValueSource::ConfigFile("/a/config.kdl".to_string()).to_string(),
            "config:/a/config.kdl"
        );
    }

    #[test]
    fn test_resolved_settings_serialize() {
        let settings = ResolvedSettings::default();
        let value = serde_json::to_value(&settings).unwrap();
        assert_eq!(value["timeout_secs"]["value"], 15);
        assert_eq!(value["timeout_secs"]["source"], "default");
    }
}
