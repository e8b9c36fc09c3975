//! Consistency check between the catalog and the ground-truth mapping.
//!
//! Titles are the shared key between the two tables, but nothing ties them
//! together at runtime. This reports where they disagree.

use super::{CommandResult, json_string};
use crate::catalog::{Catalog, GroundTruth};
use crate::models::{Expectation, Urgency};
use serde::Serialize;
use std::collections::HashSet;

/// A title present in both tables with different values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Mismatch {
    pub title: String,
    pub catalog_urgency: Urgency,
    pub catalog_category: Option<String>,
    pub expected_urgency: Urgency,
    pub expected_category: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CheckResult {
    pub catalog_entries: usize,
    pub mapping_entries: usize,
    /// In the catalog, absent from the mapping (the corrector will skip them)
    pub catalog_only: Vec<String>,
    /// In the mapping, absent from the catalog
    pub mapping_only: Vec<String>,
    /// Seeded values that the corrector would immediately change
    pub mismatched: Vec<Mismatch>,
}

impl CheckResult {
    pub fn is_consistent(&self) -> bool {
        self.catalog_only.is_empty() && self.mapping_only.is_empty() && self.mismatched.is_empty()
    }
}

impl CommandResult for CheckResult {
    fn to_json(&self) -> String {
        json_string(self)
    }

    fn to_human(&self) -> String {
        let mut lines = vec![format!(
            "Catalog: {} tasks | Ground truth: {} titles",
            self.catalog_entries, self.mapping_entries
        )];

        if self.is_consistent() {
            lines.push("✅ Catalog and ground truth agree.".to_string());
            return lines.join("\n");
        }

        if !self.catalog_only.is_empty() {
            lines.push(format!(
                "\nIn catalog but not in ground truth ({}):",
                self.catalog_only.len()
            ));
            lines.extend(self.catalog_only.iter().map(|t| format!("  - {}", t)));
        }
        if !self.mapping_only.is_empty() {
            lines.push(format!(
                "\nIn ground truth but not in catalog ({}):",
                self.mapping_only.len()
            ));
            lines.extend(self.mapping_only.iter().map(|t| format!("  - {}", t)));
        }
        if !self.mismatched.is_empty() {
            lines.push(format!("\nDisagreeing values ({}):", self.mismatched.len()));
            for m in &self.mismatched {
                lines.push(format!(
                    "  - {}: catalog [{}] {} vs expected [{}] {}",
                    m.title,
                    m.catalog_urgency,
                    m.catalog_category.as_deref().unwrap_or("-"),
                    m.expected_urgency,
                    m.expected_category
                ));
            }
        }
        lines.join("\n")
    }
}

/// Compare every catalog entry with the mapping, and every mapping title
/// with the catalog.
pub fn check(catalog: &Catalog, truth: &GroundTruth) -> CheckResult {
    let mut result = CheckResult {
        catalog_entries: catalog.len(),
        mapping_entries: truth.len(),
        ..CheckResult::default()
    };
    let mut seen = HashSet::new();

    for entry in catalog.entries() {
        if !seen.insert(entry.title.as_str()) {
            continue;
        }
        match truth.get(&entry.title) {
            None => result.catalog_only.push(entry.title.clone()),
            Some(expected) if !agrees(entry.effective_urgency(), entry.category.as_deref(), expected) => {
                result.mismatched.push(Mismatch {
                    title: entry.title.clone(),
                    catalog_urgency: entry.effective_urgency(),
                    catalog_category: entry.category.clone(),
                    expected_urgency: expected.urgency,
                    expected_category: expected.category.clone(),
                });
            }
            Some(_) => {}
        }
    }

    result.mapping_only = truth
        .iter()
        .filter(|(title, _)| !seen.contains(title))
        .map(|(title, _)| title.to_string())
        .collect();

    result
}

fn agrees(urgency: Urgency, category: Option<&str>, expected: &Expectation) -> bool {
    urgency == expected.urgency && category == Some(expected.category.as_str())
}
