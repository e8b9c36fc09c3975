//! Data models for Task Matrix records.
//!
//! This module defines the core data structures:
//! - `Urgency` - Priority bucket shared by the catalog, the mapping and remote records
//! - `CatalogEntry` - A task the seeder submits; scoring fields are optional
//! - `NewTask` - Normalized create payload sent to the API
//! - `RemoteTask` - A record as returned by the API
//! - `Expectation` / `TaskPatch` - Ground-truth pair and the update body built from it

pub mod priority;

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

/// Leverage applied when a catalog entry does not set one.
pub const DEFAULT_LEVERAGE: i64 = 5;

/// Effort applied when a catalog entry does not set one.
pub const DEFAULT_EFFORT: i64 = 5;

/// Origin tag attached to every created task.
pub const DEFAULT_SOURCE: &str = "manual";

/// Urgency bucket of a task.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Today,
    ThisWeek,
    #[default]
    Whenever,
}

impl Urgency {
    /// Wire representation.
    pub fn as_str(&self) -> &'static str {
        match self {
            Urgency::Today => "today",
            Urgency::ThisWeek => "this_week",
            Urgency::Whenever => "whenever",
        }
    }

    /// Marker used in progress output.
    pub fn icon(&self) -> &'static str {
        match self {
            Urgency::Today => "🔴",
            Urgency::ThisWeek => "🟡",
            Urgency::Whenever => "⚪",
        }
    }

    /// Sort rank, lower is more urgent.
    pub fn rank(&self) -> u8 {
        match self {
            Urgency::Today => 0,
            Urgency::ThisWeek => 1,
            Urgency::Whenever => 2,
        }
    }

    /// Lenient parse for values coming back from the API.
    ///
    /// Missing or unrecognized values read as `Whenever`.
    pub fn from_remote(value: Option<&str>) -> Self {
        value.and_then(|v| v.parse().ok()).unwrap_or_default()
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for Urgency {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "today" => Ok(Urgency::Today),
            "this_week" => Ok(Urgency::ThisWeek),
            "whenever" => Ok(Urgency::Whenever),
            _ => Err(crate::Error::InvalidInput(format!(
                "Invalid urgency: '{}'. Expected 'today', 'this_week' or 'whenever'.",
                s
            ))),
        }
    }
}

/// Status filter accepted by the list endpoint.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusFilter {
    #[default]
    Active,
    Completed,
    All,
}

impl StatusFilter {
    pub fn as_str(&self) -> &'static str {
        match self {
            StatusFilter::Active => "active",
            StatusFilter::Completed => "completed",
            StatusFilter::All => "all",
        }
    }
}

impl fmt::Display for StatusFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl std::str::FromStr for StatusFilter {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(StatusFilter::Active),
            "completed" => Ok(StatusFilter::Completed),
            "all" => Ok(StatusFilter::All),
            _ => Err(crate::Error::InvalidInput(format!(
                "Invalid status filter: '{}'. Expected 'active', 'completed' or 'all'.",
                s
            ))),
        }
    }
}

/// A task in the seed catalog.
///
/// Only the title is required; missing fields are filled in by
/// [`CatalogEntry::to_new_task`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CatalogEntry {
    pub title: String,
    pub description: Option<String>,
    pub urgency: Option<Urgency>,
    pub category: Option<String>,
    pub leverage: Option<i64>,
    pub effort: Option<i64>,
}

impl CatalogEntry {
    /// Create an entry with only a title set.
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Default::default()
        }
    }

    /// Urgency after defaults are applied.
    pub fn effective_urgency(&self) -> Urgency {
        self.urgency.unwrap_or_default()
    }

    /// Build the normalized create payload for this entry.
    pub fn to_new_task(&self, source: &str) -> NewTask {
        NewTask {
            title: self.title.clone(),
            description: self.description.clone().unwrap_or_default(),
            source: source.to_string(),
            leverage: self.leverage.unwrap_or(DEFAULT_LEVERAGE),
            effort: self.effort.unwrap_or(DEFAULT_EFFORT),
            urgency: self.effective_urgency(),
            category: self.category.clone(),
        }
    }
}

/// Body of a create request.
///
/// `category` is sent as `null` when the catalog entry has none.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewTask {
    pub title: String,
    pub description: String,
    pub source: String,
    pub leverage: i64,
    pub effort: i64,
    pub urgency: Urgency,
    pub category: Option<String>,
}

/// A task record as returned by the API.
///
/// The API owns this schema, so every field is optional and unknown
/// fields are ignored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RemoteTask {
    /// Server-assigned identifier (uuid string or number)
    #[serde(default, deserialize_with = "deserialize_id")]
    pub id: Option<String>,

    /// Empty when the record has a null or non-string title
    #[serde(default, deserialize_with = "deserialize_title")]
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,

    /// Any JSON number; other values read as unset
    #[serde(
        default,
        deserialize_with = "deserialize_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub leverage: Option<f64>,

    #[serde(
        default,
        deserialize_with = "deserialize_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub effort: Option<f64>,

    /// Raw urgency string; kept as-is so unknown values are not rewritten.
    /// An absent field reads as "whenever", an explicit null as `None`.
    #[serde(default = "absent_urgency")]
    pub urgency: Option<String>,

    #[serde(default)]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl RemoteTask {
    /// Urgency string as the corrector compares it. `None` never matches.
    pub fn current_urgency(&self) -> Option<&str> {
        self.urgency.as_deref()
    }

    /// Parsed urgency for ordering.
    pub fn urgency_bucket(&self) -> Urgency {
        Urgency::from_remote(self.urgency.as_deref())
    }

    /// Whether this record already carries the expected urgency and category.
    pub fn matches(&self, expected: &Expectation) -> bool {
        self.current_urgency() == Some(expected.urgency.as_str())
            && self.category.as_deref() == Some(expected.category.as_str())
    }
}

fn absent_urgency() -> Option<String> {
    Some(Urgency::Whenever.as_str().to_string())
}

fn deserialize_title<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => s,
        _ => String::new(),
    })
}

fn deserialize_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(serde_json::Value::as_f64))
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Ground-truth urgency and category for one title.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Expectation {
    pub urgency: Urgency,
    pub category: String,
}

impl Expectation {
    pub fn new(urgency: Urgency, category: impl Into<String>) -> Self {
        Self {
            urgency,
            category: category.into(),
        }
    }

    /// The update body that brings a record in line with this expectation.
    pub fn to_patch(&self) -> TaskPatch {
        TaskPatch {
            urgency: self.urgency,
            category: self.category.clone(),
        }
    }
}

/// Body of an update request. Carries only the corrected fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TaskPatch {
    pub urgency: Urgency,
    pub category: String,
}

/// Truncate a title to at most `max` characters for progress output.
pub fn truncate_title(title: &str, max: usize) -> &str {
    match title.char_indices().nth(max) {
        Some((idx, _)) => &title[..idx],
        None => title,
    }
}
