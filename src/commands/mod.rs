//! Command implementations for the `tm` CLI.
//!
//! This module contains the business logic for each CLI command:
//! - `seed` - Submit the task catalog
//! - `correct` - Bring remote urgency/category in line with the ground truth
//! - `list` - Show remote tasks in priority order
//! - `check` - Compare the catalog against the ground truth
//!
//! Commands take their data tables and the [`TaskApi`](crate::api::TaskApi)
//! explicitly, and write progress lines to a caller-supplied writer.

mod check;
mod correct;
mod list;
mod seed;

pub use check::{CheckResult, Mismatch, check};
pub use correct::{CorrectOptions, CorrectResult, correct};
pub use list::{ListResult, list};
pub use seed::{SeedOptions, SeedResult, seed, seed_bulk};

use crate::config::ResolvedSettings;
use serde::Serialize;
use std::time::Duration;

/// Command results that can be serialized to JSON or formatted for humans.
pub trait CommandResult {
    /// Serialize to JSON string.
    fn to_json(&self) -> String;

    /// Format for human-readable output.
    fn to_human(&self) -> String;
}

/// Serialize a result, falling back to an error object.
fn json_string<T: Serialize>(value: &T) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|e| serde_json::json!({ "error": e.to_string() }).to_string())
}

/// Fixed pauses between requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pacing {
    pub after_success: Duration,
    pub after_failure: Duration,
}

impl Pacing {
    /// No pauses at all.
    pub fn none() -> Self {
        Self {
            after_success: Duration::ZERO,
            after_failure: Duration::ZERO,
        }
    }

    pub fn pause_after_success(&self) {
        pause(self.after_success);
    }

    pub fn pause_after_failure(&self) {
        pause(self.after_failure);
    }
}

fn pause(duration: Duration) {
    if !duration.is_zero() {
        std::thread::sleep(duration);
    }
}

impl CommandResult for ResolvedSettings {
    fn to_json(&self) -> String {
        json_string(self)
    }

    fn to_human(&self) -> String {
        let rows = [
            ("api-url", self.api_url.value.clone(), &self.api_url.source),
            (
                "timeout-secs",
                self.timeout_secs.value.to_string(),
                &self.timeout_secs.source,
            ),
            ("source", self.source.value.clone(), &self.source.source),
            (
                "seed-delay-ms",
                self.seed_delay_ms.value.to_string(),
                &self.seed_delay_ms.source,
            ),
            (
                "failure-delay-ms",
                self.failure_delay_ms.value.to_string(),
                &self.failure_delay_ms.source,
            ),
            (
                "patch-delay-ms",
                self.patch_delay_ms.value.to_string(),
                &self.patch_delay_ms.source,
            ),
        ];
        rows.iter()
            .map(|(key, value, source)| format!("{:<17} {}  ({})", key, value, source))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pacing_none_is_zero() {
        let pacing = Pacing::none();
        assert!(pacing.after_success.is_zero());
        assert!(pacing.after_failure.is_zero());
        // Must return immediately.
        pacing.pause_after_success();
        pacing.pause_after_failure();
    }

    #[test]
    fn test_settings_human_lists_sources() {
        let human = ResolvedSettings::default().to_human();
        assert!(human.contains("api-url"));
        assert!(human.contains("https://agency-task-matrix.vercel.app/api/tasks  (default)"));
        assert!(human.contains("patch-delay-ms    200"));
    }
}
