//! Task catalog and ground-truth mapping.
//!
//! Both tables ship embedded in the `tm` binary as KDL documents and can be
//! replaced at runtime with `--catalog` / `--mapping`.
//!
//! # KDL Schema
//!
//! ```kdl
//! // Catalog: submitted by `tm seed` in document order
//! task "Resume ListKit daily email broadcasts" {
//!     description "Resume sending daily broadcasts for ListKit."
//!     urgency "today"                    // optional, defaults to "whenever"
//!     category "Client Work > ListKit"   // optional
//!     leverage 7                         // optional, defaults to 5
//!     effort 2                           // optional, defaults to 5
//! }
//!
//! // Ground truth: applied by `tm correct`
//! expect "Resume ListKit daily email broadcasts" urgency="today" category="Client Work > ListKit"
//! ```

use crate::Error;
use crate::models::{CatalogEntry, Expectation};
use kdl::{KdlDocument, KdlEntry, KdlNode};
use std::collections::BTreeMap;
use std::path::Path;

const EMBEDDED_CATALOG: &str = include_str!("embedded/tasks.kdl");
const EMBEDDED_GROUND_TRUTH: &str = include_str!("embedded/ground_truth.kdl");

/// Ordered list of tasks to seed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Catalog {
    entries: Vec<CatalogEntry>,
}

impl Catalog {
    pub fn new(entries: Vec<CatalogEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Title to expected (urgency, category).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GroundTruth {
    entries: BTreeMap<String, Expectation>,
}

impl GroundTruth {
    /// Build a mapping, rejecting duplicate titles.
    pub fn from_pairs(
        pairs: impl IntoIterator<Item = (String, Expectation)>,
    ) -> Result<Self, Error> {
        let mut entries = BTreeMap::new();
        for (title, expected) in pairs {
            if entries.contains_key(&title) {
                return Err(Error::InvalidInput(format!(
                    "duplicate ground-truth title: '{}'",
                    title
                )));
            }
            entries.insert(title, expected);
        }
        Ok(Self { entries })
    }

    pub fn get(&self, title: &str) -> Option<&Expectation> {
        self.entries.get(title)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Expectation)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The catalog compiled into the binary.
pub fn embedded_catalog() -> Result<Catalog, Error> {
    parse_catalog(&parse_document(EMBEDDED_CATALOG, "embedded catalog")?)
}

/// The ground-truth mapping compiled into the binary.
pub fn embedded_ground_truth() -> Result<GroundTruth, Error> {
    parse_ground_truth(&parse_document(EMBEDDED_GROUND_TRUTH, "embedded ground truth")?)
}

/// Load a catalog from a KDL file.
pub fn load_catalog_file(path: &Path) -> Result<Catalog, Error> {
    parse_catalog(&read_document(path)?)
}

/// Load a ground-truth mapping from a KDL file.
pub fn load_ground_truth_file(path: &Path) -> Result<GroundTruth, Error> {
    parse_ground_truth(&read_document(path)?)
}

/// Parse `task` nodes from a KDL document, keeping document order.
///
/// Duplicate titles are kept: the seeder submits whatever the catalog holds.
pub fn parse_catalog(doc: &KdlDocument) -> Result<Catalog, Error> {
    let mut entries = Vec::new();

    for node in doc.nodes() {
        if node.name().value() == "task" {
            entries.push(parse_task_node(node)?);
        }
    }

    Ok(Catalog::new(entries))
}

/// Parse `expect` nodes from a KDL document.
pub fn parse_ground_truth(doc: &KdlDocument) -> Result<GroundTruth, Error> {
    let mut pairs = Vec::new();

    for node in doc.nodes() {
        if node.name().value() != "expect" {
            continue;
        }
        let title = title_arg(node, "expect")?;
        let urgency = property(node, "urgency")
            .and_then(|e| e.value().as_string())
            .ok_or_else(|| {
                Error::InvalidInput(format!("expect '{}' is missing urgency=", title))
            })?
            .parse()?;
        let category = property(node, "category")
            .and_then(|e| e.value().as_string())
            .ok_or_else(|| {
                Error::InvalidInput(format!("expect '{}' is missing category=", title))
            })?;
        pairs.push((title, Expectation::new(urgency, category)));
    }

    GroundTruth::from_pairs(pairs)
}

fn parse_task_node(node: &KdlNode) -> Result<CatalogEntry, Error> {
    let mut entry = CatalogEntry::new(title_arg(node, "task")?);

    if let Some(children) = node.children() {
        for child in children.nodes() {
            match child.name().value() {
                "description" => entry.description = get_string_arg(child),
                "urgency" => {
                    if let Some(value) = get_string_arg(child) {
                        entry.urgency = Some(value.parse()?);
                    }
                }
                "category" => entry.category = get_string_arg(child),
                "leverage" => entry.leverage = get_int_arg(child, &entry.title)?,
                "effort" => entry.effort = get_int_arg(child, &entry.title)?,
                _ => {
                    // Ignore unknown fields for forward compatibility
                }
            }
        }
    }

    Ok(entry)
}

/// The first positional argument, required and non-empty.
fn title_arg(node: &KdlNode, kind: &str) -> Result<String, Error> {
    node.entries()
        .iter()
        .find(|e| e.name().is_none())
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
        .filter(|s| !s.trim().is_empty())
        .ok_or_else(|| Error::InvalidInput(format!("{} node must have a title argument", kind)))
}

fn property<'a>(node: &'a KdlNode, key: &str) -> Option<&'a KdlEntry> {
    node.entries()
        .iter()
        .find(|e| e.name().map(|n| n.value()) == Some(key))
}

fn get_string_arg(node: &KdlNode) -> Option<String> {
    node.entries()
        .first()
        .and_then(|e| e.value().as_string())
        .map(|s| s.to_string())
}

fn get_int_arg(node: &KdlNode, title: &str) -> Result<Option<i64>, Error> {
    let Some(entry) = node.entries().first() else {
        return Ok(None);
    };
    entry
        .value()
        .as_integer()
        .and_then(|i| i64::try_from(i).ok())
        .map(Some)
        .ok_or_else(|| {
            Error::InvalidInput(format!(
                "{} of '{}' must be an integer",
                node.name().value(),
                title
            ))
        })
}

fn parse_document(content: &str, label: &str) -> Result<KdlDocument, Error> {
    content
        .parse()
        .map_err(|e| Error::InvalidInput(format!("Failed to parse KDL in {}: {}", label, e)))
}

fn read_document(path: &Path) -> Result<KdlDocument, Error> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        Error::InvalidInput(format!("Failed to read {}: {}", path.display(), e))
    })?;
    parse_document(&content, &path.display().to_string())
}
