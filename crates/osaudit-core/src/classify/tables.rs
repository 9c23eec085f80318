//! Classification table construction and YAML loading.
//!
//! Tables are built once (built-in defaults, optionally overlaid by a YAML
//! document) and never mutated afterwards.
//!
//! ## YAML layout
//!
//! ```yaml
//! severity_prefix:
//!   - { prefix: "config.", severity: high }
//! severity_exact:
//!   network.socketfilterfw_stealth: high
//! topic_prefix:
//!   - { prefix: "config.", topic: Security }
//! expected_exit_codes:
//!   config.fdesetup_status: [1, 15]
//! ```
//!
//! Every section is optional; an absent section keeps its built-in entries
//! and a present one replaces them wholesale.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::time::Instant;

use crate::classify::Severity;
use crate::errors::{OsAuditError, Result};
use crate::{log_op_end, log_op_error, log_op_start};

/// One `(prefix, severity)` pair of the ordered severity table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeverityRule {
    pub prefix: String,
    pub severity: Severity,
}

impl SeverityRule {
    pub fn new(prefix: impl Into<String>, severity: Severity) -> Self {
        Self {
            prefix: prefix.into(),
            severity,
        }
    }
}

/// One `(prefix, topic)` pair of the ordered topic table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicRule {
    pub prefix: String,
    pub topic: String,
}

impl TopicRule {
    pub fn new(prefix: impl Into<String>, topic: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
            topic: topic.into(),
        }
    }
}

/// Lookup tables mapping probe identifiers to severity, topic and the set
/// of exit codes considered routine for that probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationTables {
    /// Checked in declared order, first match wins
    pub severity_prefix: Vec<SeverityRule>,
    /// Checked before the prefix table
    pub severity_exact: BTreeMap<String, Severity>,
    /// Checked in declared order, first match wins
    pub topic_prefix: Vec<TopicRule>,
    pub expected_exit_codes: BTreeMap<String, BTreeSet<i64>>,
}

/// Wire shape of a tables document: every section optional
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct TablesDocument {
    #[serde(default)]
    severity_prefix: Option<Vec<SeverityRule>>,
    #[serde(default)]
    severity_exact: Option<BTreeMap<String, Severity>>,
    #[serde(default)]
    topic_prefix: Option<Vec<TopicRule>>,
    #[serde(default)]
    expected_exit_codes: Option<BTreeMap<String, BTreeSet<i64>>>,
}

impl Default for ClassificationTables {
    fn default() -> Self {
        Self::builtin()
    }
}

impl ClassificationTables {
    /// Tables with no entries: everything is low, `Other` and unexpected
    pub fn empty() -> Self {
        Self {
            severity_prefix: Vec::new(),
            severity_exact: BTreeMap::new(),
            topic_prefix: Vec::new(),
            expected_exit_codes: BTreeMap::new(),
        }
    }

    /// The built-in macOS probe tables
    pub fn builtin() -> Self {
        use Severity::{High, Low, Medium};

        let severity_prefix = [
            ("config.", High),
            ("network.defaults_", High),
            ("network.socketfilterfw_", High),
            ("identity.dscl_", Medium),
            ("identity.dseditgroup_", Medium),
            ("network.ifconfig_", Medium),
            ("network.lsof_", Medium),
            ("network.scutil_", Medium),
            ("execution.launchctl_", Medium),
            ("execution.ps_", Low),
            ("persistence.", Medium),
        ]
        .into_iter()
        .map(|(p, s)| SeverityRule::new(p, s))
        .collect();

        let severity_exact = [("network.socketfilterfw_stealth", High)]
            .into_iter()
            .map(|(p, s)| (p.to_string(), s))
            .collect();

        let topic_prefix = [
            ("config.", "Security"),
            ("network.", "Network"),
            ("identity.", "Identity"),
            ("storage.", "Storage"),
            ("execution.", "Execution"),
            ("persistence.", "Persistence"),
        ]
        .into_iter()
        .map(|(p, t)| TopicRule::new(p, t))
        .collect();

        let expected: [(&str, &[i64]); 6] = [
            ("config.fdesetup_status", &[1, 15]),
            ("config.defaults_firewall_globalstate", &[1]),
            ("config.defaults_screen_lock_delay", &[1]),
            ("network.defaults_firewall_globalstate", &[1]),
            ("identity.dscl_list_users", &[1, 70]),
            ("identity.dseditgroup_checkmember", &[1]),
        ];
        let expected_exit_codes = expected
            .into_iter()
            .map(|(p, codes)| (p.to_string(), codes.iter().copied().collect()))
            .collect();

        Self {
            severity_prefix,
            severity_exact,
            topic_prefix,
            expected_exit_codes,
        }
    }

    /// Parse a YAML tables document, overlaying it on the built-in tables.
    ///
    /// `source_name` identifies the document in error messages.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the document is not valid YAML, names an unknown
    /// section or severity, or declares an empty prefix or topic.
    pub fn from_yaml_str(yaml: &str, source_name: &str) -> Result<Self> {
        let invalid = |message: String| OsAuditError::InvalidConfig {
            source_name: source_name.to_string(),
            message,
        };

        let doc: TablesDocument = if yaml.trim().is_empty() {
            TablesDocument::default()
        } else {
            serde_yaml::from_str(yaml).map_err(|e| invalid(e.to_string()))?
        };

        let mut tables = Self::builtin();
        if let Some(rules) = doc.severity_prefix {
            tables.severity_prefix = rules;
        }
        if let Some(exact) = doc.severity_exact {
            tables.severity_exact = exact;
        }
        if let Some(rules) = doc.topic_prefix {
            tables.topic_prefix = rules;
        }
        if let Some(expected) = doc.expected_exit_codes {
            tables.expected_exit_codes = expected;
        }

        tables.validate().map_err(invalid)?;
        Ok(tables)
    }

    /// Read and parse a YAML tables file.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if the file cannot be read or fails to parse.
    pub fn load_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let source_name = path.display().to_string();

        log_op_start!("load_classification_tables", source = %source_name);
        let start = Instant::now();

        let result = std::fs::read_to_string(path)
            .map_err(|e| OsAuditError::InvalidConfig {
                source_name: source_name.clone(),
                message: e.to_string(),
            })
            .and_then(|text| Self::from_yaml_str(&text, &source_name))
            .map_err(|e| {
                log_op_error!(
                    "load_classification_tables",
                    e.clone(),
                    duration_ms = start.elapsed().as_millis() as u64
                );
                e
            })?;

        log_op_end!(
            "load_classification_tables",
            duration_ms = start.elapsed().as_millis() as u64,
            entry_count = result.entry_count()
        );

        Ok(result)
    }

    /// Serialize the effective tables as a YAML document.
    ///
    /// # Errors
    ///
    /// `Serialization` if encoding fails.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).map_err(|e| OsAuditError::Serialization {
            message: e.to_string(),
        })
    }

    /// Total number of entries across all four tables
    pub fn entry_count(&self) -> usize {
        self.severity_prefix.len()
            + self.severity_exact.len()
            + self.topic_prefix.len()
            + self.expected_exit_codes.len()
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if self.severity_prefix.iter().any(|r| r.prefix.is_empty()) {
            return Err("severity_prefix: empty prefix".to_string());
        }
        if let Some(rule) = self
            .topic_prefix
            .iter()
            .find(|r| r.prefix.is_empty() || r.topic.trim().is_empty())
        {
            return Err(format!(
                "topic_prefix: empty prefix or topic in entry {:?}",
                rule.prefix
            ));
        }
        Ok(())
    }
}
