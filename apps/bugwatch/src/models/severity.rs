//! Normalized severity classification and its sort rank.

use super::BugType;
use serde::{Serialize, Serializer};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
/// Ranked defect impact, `S1` highest.
pub enum Tier {
    S1,
    S2,
    S3,
    S4,
}

impl Tier {
    /// Parse a lowercase tier label (`s1`..`s4`).
    pub fn parse(s: &str) -> Option<Tier> {
        match s {
            "s1" => Some(Tier::S1),
            "s2" => Some(Tier::S2),
            "s3" => Some(Tier::S3),
            "s4" => Some(Tier::S4),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::S1 => "s1",
            Tier::S2 => "s2",
            Tier::S3 => "s3",
            Tier::S4 => "s4",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
/// Result of severity normalization.
pub enum Severity {
    /// A real severity tier.
    Tier(Tier),
    /// No usable severity: `""`, `"--"`, `"n/a"` or a value outside the
    /// tier vocabulary. Holds the lowercased raw label for display.
    Unset(String),
    /// Non-defect bugs are bucketed by type instead of severity.
    Kind(BugType),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
/// Sort rank of a [`Severity`]; declaration order is the sort order.
pub enum SeverityRank {
    S1,
    S2,
    S3,
    S4,
    Unset,
    Enhancement,
    Task,
    OtherKind,
}

impl Severity {
    pub fn rank(&self) -> SeverityRank {
        match self {
            Severity::Tier(Tier::S1) => SeverityRank::S1,
            Severity::Tier(Tier::S2) => SeverityRank::S2,
            Severity::Tier(Tier::S3) => SeverityRank::S3,
            Severity::Tier(Tier::S4) => SeverityRank::S4,
            Severity::Unset(_) => SeverityRank::Unset,
            // A defect never reaches Kind; rank it with unset severities if it does.
            Severity::Kind(BugType::Defect) => SeverityRank::Unset,
            Severity::Kind(BugType::Enhancement) => SeverityRank::Enhancement,
            Severity::Kind(BugType::Task) => SeverityRank::Task,
            Severity::Kind(BugType::Other(_)) => SeverityRank::OtherKind,
        }
    }

    /// Text shown in reports.
    pub fn label(&self) -> &str {
        match self {
            Severity::Tier(t) => t.as_str(),
            Severity::Unset(raw) => raw,
            Severity::Kind(t) => t.as_str(),
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl Serialize for Severity {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.label())
    }
}
