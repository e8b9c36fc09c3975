//! Seeding: submit every catalog entry to the create endpoint.

use super::{CommandResult, Pacing, json_string};
use crate::Result;
use crate::api::TaskApi;
use crate::catalog::Catalog;
use crate::models::{NewTask, truncate_title};
use serde::Serialize;
use std::io::Write;

/// Inputs to a seeding run besides the catalog.
#[derive(Debug, Clone)]
pub struct SeedOptions {
    /// Origin tag written into every payload
    pub source: String,
    pub pacing: Pacing,
    /// Print what would be sent without sending it
    pub dry_run: bool,
}

/// Outcome of a seeding run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct SeedResult {
    pub total: usize,
    pub succeeded: usize,
    /// Titles whose create request failed, in catalog order
    pub failed: Vec<String>,
    pub bulk: bool,
    pub dry_run: bool,
}

impl CommandResult for SeedResult {
    fn to_json(&self) -> String {
        json_string(self)
    }

    fn to_human(&self) -> String {
        if self.dry_run {
            return format!("\nDry run: {} tasks would be added.", self.total);
        }

        let mut lines = vec![format!(
            "\n✅ {}/{} tasks added successfully.",
            self.succeeded, self.total
        )];
        if !self.failed.is_empty() {
            lines.push(format!("\n❌ Failed tasks ({}):", self.failed.len()));
            for title in &self.failed {
                lines.push(format!("   - {}", title));
            }
        }
        lines.join("\n")
    }
}

/// Submit each catalog entry with one create request, in catalog order.
///
/// A failed request is reported and recorded; the run always continues with
/// the next entry. Nothing checks for existing records, so running twice
/// creates duplicates.
pub fn seed(
    api: &dyn TaskApi,
    catalog: &Catalog,
    options: &SeedOptions,
    out: &mut dyn Write,
) -> Result<SeedResult> {
    let mut result = SeedResult {
        total: catalog.len(),
        dry_run: options.dry_run,
        ..SeedResult::default()
    };

    writeln!(out, "Adding {} tasks to Task Matrix...\n", catalog.len())?;

    for (i, entry) in catalog.entries().iter().enumerate() {
        let n = i + 1;
        let payload = entry.to_new_task(&options.source);
        let icon = payload.urgency.icon();

        if options.dry_run {
            writeln!(
                out,
                "  {:2}. {} {} (would add)",
                n,
                icon,
                truncate_title(&payload.title, 60)
            )?;
            continue;
        }

        match api.create_task(&payload) {
            Ok(created) => {
                tracing::info!(title = %payload.title, id = ?created.id, "task created");
                writeln!(out, "  {:2}. {} {}", n, icon, truncate_title(&payload.title, 60))?;
                result.succeeded += 1;
                options.pacing.pause_after_success();
            }
            Err(e) => {
                tracing::warn!(title = %payload.title, error = %e, "create failed");
                writeln!(
                    out,
                    "  {:2}. ❌ FAILED: {}: {}",
                    n,
                    truncate_title(&payload.title, 50),
                    e
                )?;
                result.failed.push(payload.title);
                options.pacing.pause_after_failure();
            }
        }
    }

    Ok(result)
}

/// Submit the whole catalog in a single bulk request.
///
/// The bulk endpoint inserts all rows or none, so a failed request marks
/// every title as failed.
pub fn seed_bulk(
    api: &dyn TaskApi,
    catalog: &Catalog,
    options: &SeedOptions,
    out: &mut dyn Write,
) -> Result<SeedResult> {
    let payloads: Vec<NewTask> = catalog
        .entries()
        .iter()
        .map(|e| e.to_new_task(&options.source))
        .collect();

    let mut result = SeedResult {
        total: payloads.len(),
        bulk: true,
        dry_run: options.dry_run,
        ..SeedResult::default()
    };

    writeln!(
        out,
        "Adding {} tasks to Task Matrix in one bulk request...\n",
        payloads.len()
    )?;

    if options.dry_run {
        for (i, payload) in payloads.iter().enumerate() {
            writeln!(
                out,
                "  {:2}. {} {} (would add)",
                i + 1,
                payload.urgency.icon(),
                truncate_title(&payload.title, 60)
            )?;
        }
        return Ok(result);
    }

    match api.bulk_create(&payloads) {
        Ok(created) => {
            result.succeeded = created.imported.min(payloads.len());
            tracing::info!(imported = created.imported, "bulk create finished");
            writeln!(out, "  Imported {} tasks", created.imported)?;
        }
        Err(e) => {
            tracing::warn!(error = %e, "bulk create failed");
            writeln!(out, "  ❌ FAILED: bulk request: {}", e)?;
            result.failed = payloads.into_iter().map(|p| p.title).collect();
        }
    }

    Ok(result)
}
