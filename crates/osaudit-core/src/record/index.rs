//! Type grouping index over a record stream.

use std::collections::{BTreeMap, BTreeSet};

use crate::record::model::{
    CountSummary, HomebrewSummary, ProbeFailuresSummary, Record, SecurityConfig, StorageSummary,
    TYPE_COUNTS, TYPE_HOMEBREW_SUMMARY, TYPE_PROBE_FAILURES_SUMMARY, TYPE_SECURITY_CONFIG,
    TYPE_SUMMARY,
};

/// Discriminator to last-seen record, borrowed from the stream.
///
/// Records without a `type` (or with an empty one) are not indexed.
#[derive(Debug, Clone, Default)]
pub struct TypeIndex<'a> {
    by_type: BTreeMap<&'a str, &'a Record>,
}

/// Group records by their `type`, keeping the last record of each type.
pub fn group_by_type(records: &[Record]) -> TypeIndex<'_> {
    let mut by_type = BTreeMap::new();
    for record in records {
        if let Some(t) = record.record_type().filter(|t| !t.is_empty()) {
            by_type.insert(t, record);
        }
    }
    TypeIndex { by_type }
}

impl<'a> TypeIndex<'a> {
    pub fn get(&self, record_type: &str) -> Option<&'a Record> {
        self.by_type.get(record_type).copied()
    }

    pub fn storage(&self) -> Option<&'a StorageSummary> {
        match self.get(TYPE_SUMMARY)? {
            Record::Summary(s) => Some(s),
            _ => None,
        }
    }

    pub fn counts(&self) -> Option<&'a CountSummary> {
        match self.get(TYPE_COUNTS)? {
            Record::Counts(c) => Some(c),
            _ => None,
        }
    }

    pub fn security_config(&self) -> Option<&'a SecurityConfig> {
        match self.get(TYPE_SECURITY_CONFIG)? {
            Record::SecurityConfig(s) => Some(s),
            _ => None,
        }
    }

    pub fn homebrew(&self) -> Option<&'a HomebrewSummary> {
        match self.get(TYPE_HOMEBREW_SUMMARY)? {
            Record::HomebrewSummary(h) => Some(h),
            _ => None,
        }
    }

    pub fn probe_failures(&self) -> Option<&'a ProbeFailuresSummary> {
        match self.get(TYPE_PROBE_FAILURES_SUMMARY)? {
            Record::ProbeFailuresSummary(p) => Some(p),
            _ => None,
        }
    }
}

/// Every warning identifier in the stream, across all `warning` records.
pub fn warning_codes(records: &[Record]) -> BTreeSet<String> {
    records
        .iter()
        .filter_map(|r| match r {
            Record::Warning(w) => w.identifier().map(str::to_string),
            _ => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::model::Warning;
    use serde_json::{json, Value};

    fn record(v: Value) -> Record {
        match v {
            Value::Object(m) => Record::from_object(m),
            _ => panic!("fixture must be an object"),
        }
    }

    #[test]
    fn test_last_record_of_type_wins() {
        let records = vec![
            record(json!({"type": "summary", "home_bytes": 1})),
            record(json!({"type": "summary", "home_bytes": 2})),
        ];
        let index = group_by_type(&records);
        assert_eq!(index.storage().and_then(|s| s.home_bytes), Some(2.0));
    }

    #[test]
    fn test_untyped_records_not_indexed() {
        let records = vec![
            record(json!({"home_bytes": 1})),
            record(json!({"type": ""})),
            record(json!({"type": "meta"})),
        ];
        let index = group_by_type(&records);
        assert!(index.get("").is_none());
        assert!(matches!(index.get("meta"), Some(Record::Other { .. })));
        assert!(index.storage().is_none());
    }

    #[test]
    fn test_warning_codes_collects_every_record() {
        let records = vec![
            Record::Warning(Warning {
                code: Some("b".into()),
                soft_failures: false,
            }),
            Record::Warning(Warning {
                code: None,
                soft_failures: true,
            }),
            Record::Warning(Warning {
                code: Some("a".into()),
                soft_failures: false,
            }),
        ];
        let codes: Vec<String> = warning_codes(&records).into_iter().collect();
        assert_eq!(codes, vec!["a", "b", "soft_failures"]);
    }
}
