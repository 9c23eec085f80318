//! Probe classification: severity tier, display topic and expected-ness.
//!
//! All lookups go through an immutable [`ClassificationTables`] value that
//! the caller constructs once and passes by reference.

pub mod tables;

pub use tables::{ClassificationTables, SeverityRule, TopicRule};

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Display topics in priority order. Topics not listed here sort after
/// these, alphabetically.
pub const TOPIC_ORDER: [&str; 7] = [
    "Security",
    "Network",
    "Identity",
    "Storage",
    "Execution",
    "Persistence",
    TOPIC_OTHER,
];

/// Topic of a probe no prefix matches
pub const TOPIC_OTHER: &str = "Other";

/// Sort key of a topic name: listed topics by position, then the rest
/// alphabetically.
pub fn topic_rank(topic: &str) -> (usize, &str) {
    match TOPIC_ORDER.iter().position(|t| *t == topic) {
        Some(pos) => (pos, ""),
        None => (TOPIC_ORDER.len(), topic),
    }
}

/// Priority tier used for ordering, never for filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    /// Sort rank, lower sorts first
    pub fn rank(self) -> u8 {
        match self {
            Severity::High => 0,
            Severity::Medium => 1,
            Severity::Low => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
        }
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether a probe's observed exit codes fall within its known-benign set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExpectedState {
    /// Every observed code is expected
    Expected,
    /// Some observed codes are expected, at least one is not
    Mixed,
    Unexpected,
}

impl ExpectedState {
    /// Display suffix appended to a probe line
    pub fn suffix(self) -> &'static str {
        match self {
            ExpectedState::Expected => " (expected)",
            ExpectedState::Mixed => " (mixed)",
            ExpectedState::Unexpected => "",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ExpectedState::Expected => "expected",
            ExpectedState::Mixed => "mixed",
            ExpectedState::Unexpected => "unexpected",
        }
    }
}

impl ClassificationTables {
    /// Severity of a probe: exact entry, else first matching prefix in
    /// declared order, else low.
    pub fn severity(&self, probe: &str) -> Severity {
        if let Some(sev) = self.severity_exact.get(probe) {
            return *sev;
        }
        self.severity_prefix
            .iter()
            .find(|rule| probe.starts_with(rule.prefix.as_str()))
            .map(|rule| rule.severity)
            .unwrap_or(Severity::Low)
    }

    /// Display topic of a probe: first matching prefix, else `Other`.
    pub fn topic(&self, probe: &str) -> &str {
        self.topic_prefix
            .iter()
            .find(|rule| probe.starts_with(rule.prefix.as_str()))
            .map(|rule| rule.topic.as_str())
            .unwrap_or(TOPIC_OTHER)
    }

    /// Classify the codes that actually occurred against the probe's
    /// expected set. A probe with no expected set is never expected.
    pub fn expected_state(&self, probe: &str, exit_codes: &BTreeMap<i64, u64>) -> ExpectedState {
        let observed: Vec<i64> = exit_codes
            .iter()
            .filter(|(_, n)| **n > 0)
            .map(|(code, _)| *code)
            .collect();
        if observed.is_empty() {
            return ExpectedState::Unexpected;
        }

        let Some(expected) = self.expected_exit_codes.get(probe) else {
            return ExpectedState::Unexpected;
        };
        let hits = observed.iter().filter(|c| expected.contains(c)).count();

        if hits == observed.len() {
            ExpectedState::Expected
        } else if hits > 0 {
            ExpectedState::Mixed
        } else {
            ExpectedState::Unexpected
        }
    }
}
