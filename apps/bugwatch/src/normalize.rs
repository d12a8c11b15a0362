//! Severity normalization.
//!
//! Precedence per bug: whiteboard access tag, then non-defect type, then the
//! raw severity with legacy values mapped onto tiers.

use crate::models::{Bug, BugType, Severity, Tier, TriagedBug};
use regex::Regex;
use std::sync::OnceLock;

fn access_tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[access-(s[1-4])").expect("valid access tag regex"))
}

/// Tier named by an `[access-sN]` whiteboard tag, if any.
pub fn access_tier(whiteboard: &str) -> Option<Tier> {
    access_tag_re()
        .captures(whiteboard)
        .and_then(|c| Tier::parse(c.get(1)?.as_str()))
}

/// Classify a raw severity in the context of the bug's type and whiteboard.
pub fn classify(raw_severity: &str, bug_type: &BugType, whiteboard: &str) -> Severity {
    if let Some(tier) = access_tier(whiteboard) {
        return Severity::Tier(tier);
    }
    if *bug_type != BugType::Defect {
        return Severity::Kind(bug_type.clone());
    }
    let lowered = raw_severity.to_lowercase();
    match lowered.as_str() {
        "major" => Severity::Tier(Tier::S2),
        "normal" => Severity::Tier(Tier::S3),
        other => match Tier::parse(other) {
            Some(tier) => Severity::Tier(tier),
            None => Severity::Unset(lowered),
        },
    }
}

/// [`classify`] applied to a bug's own fields.
pub fn classify_bug(bug: &Bug) -> Severity {
    classify(&bug.severity, &bug.bug_type, &bug.whiteboard)
}

/// Attach a normalized severity to every bug, preserving order.
pub fn triage(bugs: Vec<Bug>) -> Vec<TriagedBug> {
    bugs.into_iter()
        .map(|bug| {
            let severity = classify_bug(&bug);
            TriagedBug { bug, severity }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_access_tag_wins_over_legacy_severity() {
        let s = classify("normal", &BugType::Defect, "[access-s2][other-tag]");
        assert_eq!(s, Severity::Tier(Tier::S2));
    }

    #[test]
    fn test_access_tag_wins_over_type() {
        let s = classify("--", &BugType::Task, "[foo][access-s1]");
        assert_eq!(s, Severity::Tier(Tier::S1));
    }

    #[test]
    fn test_access_tag_outside_tier_range_is_ignored() {
        assert_eq!(access_tier("[access-s5]"), None);
        assert_eq!(
            classify("S4", &BugType::Defect, "[access-s5]"),
            Severity::Tier(Tier::S4)
        );
    }

    #[test]
    fn test_non_defect_uses_type_bucket() {
        assert_eq!(
            classify("s1", &BugType::Enhancement, ""),
            Severity::Kind(BugType::Enhancement)
        );
        assert_eq!(classify("", &BugType::Task, ""), Severity::Kind(BugType::Task));
    }

    #[test]
    fn test_legacy_mapping_is_case_insensitive() {
        assert_eq!(classify("Major", &BugType::Defect, ""), Severity::Tier(Tier::S2));
        assert_eq!(classify("NORMAL", &BugType::Defect, ""), Severity::Tier(Tier::S3));
        assert_eq!(classify("S1", &BugType::Defect, ""), Severity::Tier(Tier::S1));
    }

    #[test]
    fn test_sentinels_and_unknown_values_pass_through_lowercased() {
        assert_eq!(classify("--", &BugType::Defect, ""), Severity::Unset("--".into()));
        assert_eq!(classify("N/A", &BugType::Defect, ""), Severity::Unset("n/a".into()));
        assert_eq!(classify("", &BugType::Defect, ""), Severity::Unset(String::new()));
        assert_eq!(
            classify("Critical", &BugType::Defect, ""),
            Severity::Unset("critical".into())
        );
    }

    #[test]
    fn test_classify_is_idempotent() {
        let cases = [
            ("major", BugType::Defect, ""),
            ("normal", BugType::Defect, "[access-s4]"),
            ("Blocker", BugType::Defect, ""),
            ("--", BugType::Defect, ""),
            ("s2", BugType::Enhancement, ""),
            ("S3", BugType::Task, ""),
            ("minor", BugType::Other("regression".into()), ""),
        ];
        for (raw, ty, wb) in cases {
            let once = classify(raw, &ty, wb);
            let twice = classify(once.label(), &ty, wb);
            assert_eq!(once, twice, "raw={raw}");
        }
    }

    #[test]
    fn test_triage_keeps_raw_record() {
        let bug: Bug = serde_json::from_str(
            r#"{"id": 1, "severity": "major", "type": "defect", "whiteboard": ""}"#,
        )
        .unwrap();
        let out = triage(vec![bug]);
        assert_eq!(out[0].bug.severity, "major");
        assert_eq!(out[0].severity.label(), "s2");
    }
}
