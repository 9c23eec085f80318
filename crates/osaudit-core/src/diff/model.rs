//! Snapshot diff output types.
//!
//! All types implement `Debug, Clone, Serialize, PartialEq`.
//! Sections are plain vectors in display order; an empty section means
//! "no delta" for that section.

use serde::Serialize;
use std::collections::BTreeMap;

use crate::classify::{ExpectedState, Severity};
use crate::record::ProbeFailureItem;

/// The structured diff between a baseline and a current snapshot.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct SnapshotDiff {
    /// Storage fields whose byte size changed
    pub storage: Vec<StorageDelta>,
    /// Item counts that changed
    pub counts: Vec<CountDelta>,
    /// Security toggles that flipped
    pub security_config: Vec<ToggleChange>,
    /// Package counts that changed
    pub homebrew: Vec<CountDelta>,
    /// Warning codes present now and absent from the baseline, sorted
    pub new_warnings: Vec<String>,
    /// Probe failure entries in sort-key order
    pub probe_failures: Vec<ProbeEntry>,
}

impl SnapshotDiff {
    /// True if any section found a delta
    pub fn has_changes(&self) -> bool {
        !self.storage.is_empty()
            || !self.counts.is_empty()
            || !self.security_config.is_empty()
            || !self.homebrew.is_empty()
            || !self.new_warnings.is_empty()
            || !self.probe_failures.is_empty()
    }

    /// Total number of delta rows across all sections
    pub fn entry_count(&self) -> usize {
        self.storage.len()
            + self.counts.len()
            + self.security_config.len()
            + self.homebrew.len()
            + self.new_warnings.len()
            + self.probe_failures.len()
    }
}

/// A byte-valued field that changed.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StorageDelta {
    /// Wire field name, e.g. `home_bytes`
    pub field: String,
    pub baseline: f64,
    pub current: f64,
    pub delta: f64,
    /// `delta / baseline * 100`, or 0 when the baseline is 0
    pub pct_change: f64,
}

impl StorageDelta {
    /// Field name without the `_bytes` suffix
    pub fn display_name(&self) -> &str {
        self.field.strip_suffix("_bytes").unwrap_or(&self.field)
    }
}

/// An integer-valued field that changed.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct CountDelta {
    pub field: String,
    pub baseline: i64,
    pub current: i64,
    pub delta: i64,
}

/// A boolean field that flipped.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct ToggleChange {
    pub field: String,
    pub baseline: bool,
    pub current: bool,
}

/// Status of a probe between the two snapshots.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    /// Failing now, not failing in the baseline
    New,
    /// Failing in the baseline, not failing now
    Resolved,
    /// Failing in both with a different count, distribution or expected-ness
    Changed,
}

impl ProbeStatus {
    pub fn rank(self) -> u8 {
        match self {
            ProbeStatus::New => 0,
            ProbeStatus::Resolved => 1,
            ProbeStatus::Changed => 2,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ProbeStatus::New => "new",
            ProbeStatus::Resolved => "resolved",
            ProbeStatus::Changed => "changed",
        }
    }
}

/// One probe that differs between the snapshots.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct ProbeEntry {
    pub status: ProbeStatus,
    pub probe: String,
    pub topic: String,
    pub severity: Severity,
    /// Classification of the current item, or of the baseline item for a
    /// resolved probe
    pub expected_state: ExpectedState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub baseline: Option<ProbeFailureItem>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current: Option<ProbeFailureItem>,
    /// Per-code change in occurrences, zero deltas omitted. Empty unless
    /// the status is `Changed`.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub exit_code_delta: BTreeMap<i64, i64>,
}

impl ProbeEntry {
    /// (severity rank, status rank, probe id)
    pub fn sort_key(&self) -> (u8, u8, &str) {
        (self.severity.rank(), self.status.rank(), self.probe.as_str())
    }

    pub fn baseline_count(&self) -> u64 {
        self.baseline.as_ref().map(|i| i.count).unwrap_or(0)
    }

    pub fn current_count(&self) -> u64 {
        self.current.as_ref().map(|i| i.count).unwrap_or(0)
    }
}
