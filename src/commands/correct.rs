//! Correction: align remote urgency and category with the ground truth.

use super::{CommandResult, Pacing, json_string};
use crate::Result;
use crate::api::TaskApi;
use crate::catalog::GroundTruth;
use crate::models::{StatusFilter, truncate_title};
use serde::Serialize;
use std::io::Write;

/// Inputs to a correction run besides the mapping.
#[derive(Debug, Clone)]
pub struct CorrectOptions {
    /// Which remote records to fetch
    pub status: StatusFilter,
    pub pacing: Pacing,
    /// Report planned updates without sending them
    pub dry_run: bool,
}

/// Outcome of a correction run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CorrectResult {
    pub fetched: usize,
    /// Records updated (or, in a dry run, that would be)
    pub patched: usize,
    pub already_correct: usize,
    /// Records whose title is not in the mapping
    pub skipped: usize,
    pub failed: Vec<String>,
    pub dry_run: bool,
}

impl CommandResult for CorrectResult {
    fn to_json(&self) -> String {
        json_string(self)
    }

    fn to_human(&self) -> String {
        let verb = if self.dry_run { "to patch" } else { "patched" };
        let mut lines = vec![format!(
            "\n✅ {} {} | {} already correct | {} skipped (not our tasks) | {} failed",
            self.patched,
            verb,
            self.already_correct,
            self.skipped,
            self.failed.len()
        )];
        if !self.failed.is_empty() {
            lines.push("\nFailed:".to_string());
            for title in &self.failed {
                lines.push(format!("  - {}", title));
            }
        }
        lines.join("\n")
    }
}

/// Fetch remote records and update the ones that drifted from `truth`.
///
/// Records whose title is absent from the mapping are skipped untouched.
/// Records already matching get no request, so a second run issues no
/// updates. A failed fetch is returned as an error; a failed update is
/// recorded and the run continues.
pub fn correct(
    api: &dyn TaskApi,
    truth: &GroundTruth,
    options: &CorrectOptions,
    out: &mut dyn Write,
) -> Result<CorrectResult> {
    writeln!(out, "Fetching tasks from API...")?;
    let tasks = api.list_tasks(options.status)?;
    writeln!(out, "Found {} {} tasks\n", tasks.len(), options.status)?;

    let mut result = CorrectResult {
        fetched: tasks.len(),
        dry_run: options.dry_run,
        ..CorrectResult::default()
    };

    for task in &tasks {
        let title = task.title.as_str();
        let Some(expected) = truth.get(title) else {
            tracing::debug!(title = %title, "not in ground truth, skipping");
            result.skipped += 1;
            continue;
        };

        if task.matches(expected) {
            writeln!(out, "  ✓ Already correct: {}", truncate_title(title, 55))?;
            result.already_correct += 1;
            continue;
        }

        let patch = expected.to_patch();
        let icon = patch.urgency.icon();

        if options.dry_run {
            writeln!(
                out,
                "  {} Would patch [{:9}] {}",
                icon,
                patch.urgency,
                truncate_title(title, 50)
            )?;
            result.patched += 1;
            continue;
        }

        let outcome = match task.id.as_deref() {
            Some(id) => api.update_task(id, &patch).map_err(|e| e.to_string()),
            None => Err("record has no id".to_string()),
        };

        match outcome {
            Ok(_) => {
                tracing::info!(title = %title, urgency = %patch.urgency, category = %patch.category, "task patched");
                writeln!(
                    out,
                    "  {} Patched [{:9}] {}",
                    icon,
                    patch.urgency,
                    truncate_title(title, 50)
                )?;
                result.patched += 1;
                options.pacing.pause_after_success();
            }
            Err(message) => {
                tracing::warn!(title = %title, error = %message, "update failed");
                writeln!(
                    out,
                    "  ❌ FAILED: {}: {}",
                    truncate_title(title, 50),
                    message
                )?;
                result.failed.push(title.to_string());
                options.pacing.pause_after_failure();
            }
        }
    }

    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;
    use crate::models::{Expectation, RemoteTask, TaskPatch, Urgency};
    use crate::test_utils::{Call, FakeApi};

    const RESUME: &str = "Resume ListKit daily email broadcasts";

    fn options() -> CorrectOptions {
        CorrectOptions {
            status: StatusFilter::Active,
            pacing: Pacing::none(),
            dry_run: false,
        }
    }

    fn truth() -> GroundTruth {
        GroundTruth::from_pairs([
            (
                RESUME.to_string(),
                Expectation::new(Urgency::Today, "Client Work > ListKit"),
            ),
            (
                "Update CRM pipeline for all active leads".to_string(),
                Expectation::new(Urgency::ThisWeek, "Sales"),
            ),
        ])
        .unwrap()
    }

    fn remote(id: &str, title: &str, urgency: Option<&str>, category: Option<&str>) -> RemoteTask {
        RemoteTask {
            id: Some(id.to_string()),
            title: title.to_string(),
            urgency: urgency.map(str::to_string),
            category: category.map(str::to_string),
            status: Some("active".to_string()),
            ..RemoteTask::default()
        }
    }

    #[test]
    fn test_drifted_record_gets_one_update() {
        let api = FakeApi::with_remote(vec![remote(
            "t1",
            RESUME,
            Some("whenever"),
            Some("Client Work > ListKit"),
        )]);
        let mut out = Vec::new();

        let result = correct(&api, &truth(), &options(), &mut out).unwrap();

        assert_eq!(
            api.update_calls(),
            vec![(
                "t1".to_string(),
                TaskPatch {
                    urgency: Urgency::Today,
                    category: "Client Work > ListKit".to_string(),
                }
            )]
        );
        assert_eq!(result.patched, 1);
        assert_eq!(result.skipped, 0);
        assert!(result.failed.is_empty());
        assert!(result.to_human().contains("1 patched"));
        assert!(result.to_human().contains("0 skipped"));
        assert!(result.to_human().contains("0 failed"));

        let progress = String::from_utf8(out).unwrap();
        assert!(progress.contains("🔴 Patched [today    ] Resume ListKit daily email broadcasts"));
    }

    #[test]
    fn test_matching_record_gets_no_update() {
        let api = FakeApi::with_remote(vec![remote(
            "t1",
            RESUME,
            Some("today"),
            Some("Client Work > ListKit"),
        )]);
        let mut out = Vec::new();

        let result = correct(&api, &truth(), &options(), &mut out).unwrap();

        assert!(api.update_calls().is_empty());
        assert_eq!(result.already_correct, 1);
        assert_eq!(result.patched, 0);
        assert!(String::from_utf8(out).unwrap().contains("✓ Already correct: Resume"));
    }

    #[test]
    fn test_unknown_title_is_skipped_without_requests() {
        let api = FakeApi::with_remote(vec![remote("t9", "Somebody else's task", None, None)]);
        let mut out = Vec::new();

        let result = correct(&api, &truth(), &options(), &mut out).unwrap();

        assert_eq!(api.calls(), vec![Call::List(StatusFilter::Active)]);
        assert_eq!(result.skipped, 1);
        assert_eq!(result.fetched, 1);
    }

    fn whenever_truth() -> GroundTruth {
        GroundTruth::from_pairs([(
            "Script VSL".to_string(),
            Expectation::new(Urgency::Whenever, "Marketing > Funnel"),
        )])
        .unwrap()
    }

    #[test]
    fn test_missing_urgency_reads_as_whenever() {
        let task: RemoteTask = serde_json::from_value(serde_json::json!({
            "id": "t1",
            "title": "Script VSL",
            "category": "Marketing > Funnel"
        }))
        .unwrap();
        let api = FakeApi::with_remote(vec![task]);
        let mut out = Vec::new();

        let result = correct(&api, &whenever_truth(), &options(), &mut out).unwrap();

        assert!(api.update_calls().is_empty());
        assert_eq!(result.already_correct, 1);
    }

    #[test]
    fn test_null_urgency_is_patched() {
        let task: RemoteTask = serde_json::from_value(serde_json::json!({
            "id": "t1",
            "title": "Script VSL",
            "urgency": null,
            "category": "Marketing > Funnel"
        }))
        .unwrap();
        let api = FakeApi::with_remote(vec![task]);
        let mut out = Vec::new();

        let result = correct(&api, &whenever_truth(), &options(), &mut out).unwrap();

        assert_eq!(api.update_calls().len(), 1);
        assert_eq!(api.update_calls()[0].1.urgency, Urgency::Whenever);
        assert_eq!(result.patched, 1);
    }

    #[test]
    fn test_foreign_records_with_odd_fields_are_skipped() {
        let tasks: Vec<RemoteTask> = serde_json::from_value(serde_json::json!([
            {
                "id": "t1",
                "title": RESUME,
                "urgency": "whenever",
                "category": "Client Work > ListKit",
                "leverage": 8,
                "effort": 2
            },
            {
                "id": "t2",
                "title": "Someone else's task",
                "urgency": "today",
                "leverage": 7.5,
                "effort": 2
            },
            { "id": "t3", "title": null, "urgency": "today" }
        ]))
        .unwrap();
        let api = FakeApi::with_remote(tasks);
        let mut out = Vec::new();

        let result = correct(&api, &truth(), &options(), &mut out).unwrap();

        assert_eq!(api.update_calls().len(), 1);
        assert_eq!(api.update_calls()[0].0, "t1");
        assert_eq!(result.fetched, 3);
        assert_eq!(result.patched, 1);
        assert_eq!(result.skipped, 2);
        assert!(result.failed.is_empty());
    }

    #[test]
    fn test_category_drift_alone_triggers_update() {
        let api = FakeApi::with_remote(vec![remote(
            "t2",
            "Update CRM pipeline for all active leads",
            Some("this_week"),
            None,
        )]);
        let mut out = Vec::new();

        let result = correct(&api, &truth(), &options(), &mut out).unwrap();

        assert_eq!(api.update_calls().len(), 1);
        assert_eq!(api.update_calls()[0].1.category, "Sales");
        assert_eq!(result.patched, 1);
    }

    #[test]
    fn test_failed_update_is_recorded_and_run_continues() {
        let api = FakeApi::with_remote(vec![
            remote("bad", RESUME, Some("whenever"), None),
            remote(
                "good",
                "Update CRM pipeline for all active leads",
                Some("whenever"),
                Some("Sales"),
            ),
        ])
        .failing_id("bad");
        let mut out = Vec::new();

        let result = correct(&api, &truth(), &options(), &mut out).unwrap();

        assert_eq!(api.update_calls().len(), 2);
        assert_eq!(result.patched, 1);
        assert_eq!(result.failed, vec![RESUME.to_string()]);
        let human = result.to_human();
        assert!(human.contains("1 failed"));
        assert!(human.contains("Failed:\n  - Resume ListKit daily email broadcasts"));
    }

    #[test]
    fn test_record_without_id_fails_without_request() {
        let mut task = remote("x", RESUME, Some("whenever"), None);
        task.id = None;
        let api = FakeApi::with_remote(vec![task]);
        let mut out = Vec::new();

        let result = correct(&api, &truth(), &options(), &mut out).unwrap();

        assert!(api.update_calls().is_empty());
        assert_eq!(result.failed, vec![RESUME.to_string()]);
        assert!(String::from_utf8(out).unwrap().contains("record has no id"));
    }

    #[test]
    fn test_second_run_converges() {
        let mut api = FakeApi::with_remote(vec![remote("t1", RESUME, Some("whenever"), None)]);
        let mut out = Vec::new();
        correct(&api, &truth(), &options(), &mut out).unwrap();

        // Simulate the server applying the update.
        let (_, patch) = api.update_calls().remove(0);
        api.remote[0].urgency = Some(patch.urgency.as_str().to_string());
        api.remote[0].category = Some(patch.category);
        api.calls.borrow_mut().clear();

        let second = correct(&api, &truth(), &options(), &mut out).unwrap();
        assert!(api.update_calls().is_empty());
        assert_eq!(second.already_correct, 1);
        assert_eq!(second.patched, 0);
    }

    #[test]
    fn test_dry_run_sends_no_updates() {
        let api = FakeApi::with_remote(vec![remote("t1", RESUME, Some("whenever"), None)]);
        let mut out = Vec::new();
        let opts = CorrectOptions {
            dry_run: true,
            ..options()
        };

        let result = correct(&api, &truth(), &opts, &mut out).unwrap();

        assert!(api.update_calls().is_empty());
        assert_eq!(result.patched, 1);
        assert!(result.to_human().contains("1 to patch"));
        assert!(String::from_utf8(out).unwrap().contains("Would patch [today    ]"));
    }

    #[test]
    fn test_fetch_failure_is_an_error() {
        let api = FakeApi {
            list_fails: true,
            ..FakeApi::new()
        };
        let mut out = Vec::new();

        let err = correct(&api, &truth(), &options(), &mut out).unwrap_err();
        assert!(matches!(err, Error::Api(_)));
    }

    #[test]
    fn test_status_filter_is_passed_through() {
        let api = FakeApi::new();
        let mut out = Vec::new();
        let opts = CorrectOptions {
            status: StatusFilter::All,
            ..options()
        };

        correct(&api, &truth(), &opts, &mut out).unwrap();

        assert_eq!(api.calls(), vec![Call::List(StatusFilter::All)]);
        assert!(String::from_utf8(out).unwrap().contains("Found 0 all tasks"));
    }
}
