//! Shared data models: bug records as returned by the search endpoint and
//! the normalized severity classification attached to them.

pub mod severity;

pub use severity::{Severity, SeverityRank, Tier};

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Identifiers seen by a previous notifier run.
pub type SeenSet = BTreeSet<u64>;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
/// A single bug record, flat as projected by `include_fields`.
///
/// Only `id` is mandatory; projections that omit a field leave it empty.
pub struct Bug {
    pub id: u64,
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub product: String,
    #[serde(default)]
    pub component: String,
    /// Raw severity exactly as the tracker reports it.
    #[serde(default)]
    pub severity: String,
    #[serde(default, rename = "type")]
    pub bug_type: BugType,
    #[serde(default)]
    pub whiteboard: String,
    #[serde(default)]
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(from = "String", into = "String")]
/// Bug type. Unknown names are kept verbatim in `Other`.
pub enum BugType {
    #[default]
    Defect,
    Enhancement,
    Task,
    Other(String),
}

impl BugType {
    pub fn as_str(&self) -> &str {
        match self {
            BugType::Defect => "defect",
            BugType::Enhancement => "enhancement",
            BugType::Task => "task",
            BugType::Other(s) => s,
        }
    }
}

impl From<String> for BugType {
    fn from(s: String) -> Self {
        match s.as_str() {
            "defect" => BugType::Defect,
            "enhancement" => BugType::Enhancement,
            "task" => BugType::Task,
            _ => BugType::Other(s),
        }
    }
}

impl From<&str> for BugType {
    fn from(s: &str) -> Self {
        BugType::from(s.to_string())
    }
}

impl From<BugType> for String {
    fn from(t: BugType) -> Self {
        t.as_str().to_string()
    }
}

impl fmt::Display for BugType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
/// A bug paired with its normalized severity. The raw record is untouched.
pub struct TriagedBug {
    #[serde(flatten)]
    pub bug: Bug,
    #[serde(rename = "normalized_severity")]
    pub severity: Severity,
}
