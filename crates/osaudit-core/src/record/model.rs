//! Typed snapshot records.
//!
//! Every NDJSON row carries a `type` discriminator. Rows whose type the diff
//! engine consumes decode into a dedicated variant with strongly-typed
//! fields; every other row is kept as [`Record::Other`] with its raw object.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

use crate::record::lenient;

pub const TYPE_SUMMARY: &str = "summary";
pub const TYPE_COUNTS: &str = "counts";
pub const TYPE_SECURITY_CONFIG: &str = "security_config";
pub const TYPE_HOMEBREW_SUMMARY: &str = "homebrew_summary";
pub const TYPE_WARNING: &str = "warning";
pub const TYPE_PROBE_FAILURES_SUMMARY: &str = "probe_failures_summary";

/// One snapshot record.
#[derive(Debug, Clone, PartialEq)]
pub enum Record {
    Summary(StorageSummary),
    Counts(CountSummary),
    SecurityConfig(SecurityConfig),
    HomebrewSummary(HomebrewSummary),
    Warning(Warning),
    ProbeFailuresSummary(ProbeFailuresSummary),
    /// A row of a type this engine does not consume, or with no `type` at all
    Other {
        record_type: Option<String>,
        fields: Map<String, Value>,
    },
}

impl Record {
    /// Decode a JSON object into its typed variant.
    ///
    /// Never fails: malformed fields coerce to defaults, and a row that
    /// still cannot be decoded is preserved as [`Record::Other`].
    pub fn from_object(fields: Map<String, Value>) -> Self {
        let record_type = fields
            .get("type")
            .and_then(Value::as_str)
            .map(str::to_string);

        let decoded = match record_type.as_deref() {
            Some(TYPE_SUMMARY) => decode(&fields).map(Record::Summary),
            Some(TYPE_COUNTS) => decode(&fields).map(Record::Counts),
            Some(TYPE_SECURITY_CONFIG) => decode(&fields).map(Record::SecurityConfig),
            Some(TYPE_HOMEBREW_SUMMARY) => decode(&fields).map(Record::HomebrewSummary),
            Some(TYPE_WARNING) => decode(&fields).map(Record::Warning),
            Some(TYPE_PROBE_FAILURES_SUMMARY) => {
                decode(&fields).map(Record::ProbeFailuresSummary)
            }
            _ => None,
        };

        decoded.unwrap_or(Record::Other {
            record_type,
            fields,
        })
    }

    /// The `type` discriminator, if the row had one
    pub fn record_type(&self) -> Option<&str> {
        match self {
            Record::Summary(_) => Some(TYPE_SUMMARY),
            Record::Counts(_) => Some(TYPE_COUNTS),
            Record::SecurityConfig(_) => Some(TYPE_SECURITY_CONFIG),
            Record::HomebrewSummary(_) => Some(TYPE_HOMEBREW_SUMMARY),
            Record::Warning(_) => Some(TYPE_WARNING),
            Record::ProbeFailuresSummary(_) => Some(TYPE_PROBE_FAILURES_SUMMARY),
            Record::Other { record_type, .. } => record_type.as_deref(),
        }
    }
}

fn decode<T: for<'de> Deserialize<'de>>(fields: &Map<String, Value>) -> Option<T> {
    serde_json::from_value(Value::Object(fields.clone())).ok()
}

/// `summary` row: storage usage in bytes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StorageSummary {
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub home_bytes: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub downloads_bytes: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub desktop_bytes: Option<f64>,
    #[serde(default, deserialize_with = "lenient::opt_f64")]
    pub trash_bytes: Option<f64>,
}

impl StorageSummary {
    /// Fields in display order, keyed by wire name
    pub fn fields(&self) -> [(&'static str, Option<f64>); 4] {
        [
            ("home_bytes", self.home_bytes),
            ("downloads_bytes", self.downloads_bytes),
            ("desktop_bytes", self.desktop_bytes),
            ("trash_bytes", self.trash_bytes),
        ]
    }
}

/// `counts` row: item counts found by the storage scan.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CountSummary {
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub large_files: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub node_modules: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub broken_symlinks: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub git_repos: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub venv_cache: Option<i64>,
}

impl CountSummary {
    pub fn fields(&self) -> [(&'static str, Option<i64>); 5] {
        [
            ("large_files", self.large_files),
            ("node_modules", self.node_modules),
            ("broken_symlinks", self.broken_symlinks),
            ("git_repos", self.git_repos),
            ("venv_cache", self.venv_cache),
        ]
    }
}

/// `security_config` row: platform security toggles.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Disk encryption (FileVault on macOS)
    #[serde(default, deserialize_with = "lenient::opt_bool")]
    pub filevault: Option<bool>,
    /// System integrity protection
    #[serde(default, deserialize_with = "lenient::opt_bool")]
    pub sip: Option<bool>,
    /// Application allow-listing (Gatekeeper on macOS)
    #[serde(default, deserialize_with = "lenient::opt_bool")]
    pub gatekeeper: Option<bool>,
    #[serde(default, deserialize_with = "lenient::opt_bool")]
    pub firewall: Option<bool>,
}

impl SecurityConfig {
    pub fn fields(&self) -> [(&'static str, Option<bool>); 4] {
        [
            ("filevault", self.filevault),
            ("sip", self.sip),
            ("gatekeeper", self.gatekeeper),
            ("firewall", self.firewall),
        ]
    }
}

/// `homebrew_summary` row: package manager counts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HomebrewSummary {
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub formulae: Option<i64>,
    #[serde(default, deserialize_with = "lenient::opt_i64")]
    pub casks: Option<i64>,
}

impl HomebrewSummary {
    pub fn fields(&self) -> [(&'static str, Option<i64>); 2] {
        [("formulae", self.formulae), ("casks", self.casks)]
    }
}

/// `warning` row.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Warning {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub code: Option<String>,
    #[serde(default, deserialize_with = "lenient::present")]
    pub soft_failures: bool,
}

impl Warning {
    /// The identifier this warning contributes to the warning-code set
    pub fn identifier(&self) -> Option<&str> {
        match &self.code {
            Some(code) => Some(code.as_str()),
            None if self.soft_failures => Some("soft_failures"),
            None => None,
        }
    }
}

/// `probe_failures_summary` row: consolidated probe failures of one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProbeFailuresSummary {
    #[serde(default, deserialize_with = "lenient::opt_string")]
    pub run_id: Option<String>,
    #[serde(default, deserialize_with = "lenient::probe_items")]
    pub items: Vec<ProbeFailureItem>,
}

impl ProbeFailuresSummary {
    /// Index items by probe id; a duplicated probe keeps its last item
    pub fn by_probe(&self) -> BTreeMap<&str, &ProbeFailureItem> {
        self.items
            .iter()
            .map(|item| (item.probe.as_str(), item))
            .collect()
    }
}

/// Failures of a single probe within one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProbeFailureItem {
    pub probe: String,
    #[serde(default, deserialize_with = "lenient::u64_or_zero")]
    pub count: u64,
    /// Occurrences per exit code, normalised to integer keys on ingestion
    #[serde(default, deserialize_with = "lenient::exit_codes")]
    pub exit_codes: BTreeMap<i64, u64>,
    #[serde(default, deserialize_with = "lenient::u64_or_zero")]
    pub duration_ms: u64,
    #[serde(default, deserialize_with = "lenient::u64_or_zero")]
    pub first_ts_ms: u64,
    #[serde(default, deserialize_with = "lenient::u64_or_zero")]
    pub last_ts_ms: u64,
    #[serde(default, deserialize_with = "lenient::f64_or_zero")]
    pub failure_rate: f64,
}
