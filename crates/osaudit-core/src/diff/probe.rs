//! Probe-failure differ.
//!
//! Correlates probe-failure items of two snapshots by probe id. Probes
//! whose count, exit-code distribution and expected-ness all match are
//! unchanged and produce no entry at all.

use std::collections::{BTreeMap, BTreeSet};

use crate::classify::{topic_rank, ClassificationTables};
use crate::diff::model::{ProbeEntry, ProbeStatus};
use crate::record::{ProbeFailureItem, ProbeFailuresSummary};

/// Diff two `probe_failures_summary` records. Either side may be absent.
///
/// Entries come back ordered by (severity, status, probe id).
pub fn diff_probe_failures(
    baseline: Option<&ProbeFailuresSummary>,
    current: Option<&ProbeFailuresSummary>,
    tables: &ClassificationTables,
) -> Vec<ProbeEntry> {
    let base = baseline.map(ProbeFailuresSummary::by_probe).unwrap_or_default();
    let curr = current.map(ProbeFailuresSummary::by_probe).unwrap_or_default();

    let mut entries = Vec::new();

    for (probe, item) in &curr {
        if !base.contains_key(probe) {
            entries.push(entry(ProbeStatus::New, probe, None, Some(*item), tables));
        }
    }

    for (probe, base_item) in &base {
        match curr.get(probe) {
            None => entries.push(entry(
                ProbeStatus::Resolved,
                probe,
                Some(*base_item),
                None,
                tables,
            )),
            Some(curr_item) if is_changed(probe, base_item, curr_item, tables) => {
                entries.push(entry(
                    ProbeStatus::Changed,
                    probe,
                    Some(*base_item),
                    Some(*curr_item),
                    tables,
                ))
            }
            Some(_) => {}
        }
    }

    entries.sort_by(|a, b| a.sort_key().cmp(&b.sort_key()));
    entries
}

fn entry(
    status: ProbeStatus,
    probe: &str,
    baseline: Option<&ProbeFailureItem>,
    current: Option<&ProbeFailureItem>,
    tables: &ClassificationTables,
) -> ProbeEntry {
    // Resolved probes are classified by what they used to fail with.
    let no_codes = BTreeMap::new();
    let codes = current
        .or(baseline)
        .map(|i| &i.exit_codes)
        .unwrap_or(&no_codes);
    let expected_state = tables.expected_state(probe, codes);

    let exit_code_delta = match (status, baseline, current) {
        (ProbeStatus::Changed, Some(b), Some(c)) => exit_code_delta(&b.exit_codes, &c.exit_codes),
        _ => BTreeMap::new(),
    };

    ProbeEntry {
        status,
        probe: probe.to_string(),
        topic: tables.topic(probe).to_string(),
        severity: tables.severity(probe),
        expected_state,
        baseline: baseline.cloned(),
        current: current.cloned(),
        exit_code_delta,
    }
}

/// A probe failing in both snapshots changed if its count, its exit-code
/// distribution or its expected-ness differs.
pub fn is_changed(
    probe: &str,
    baseline: &ProbeFailureItem,
    current: &ProbeFailureItem,
    tables: &ClassificationTables,
) -> bool {
    if baseline.count != current.count {
        return true;
    }
    if !exit_code_delta(&baseline.exit_codes, &current.exit_codes).is_empty() {
        return true;
    }
    tables.expected_state(probe, &baseline.exit_codes)
        != tables.expected_state(probe, &current.exit_codes)
}

/// Per-code `current - baseline` over the union of codes, a missing code
/// counting as 0. Zero deltas are omitted; deltas beyond the `i64` range
/// are clamped.
pub fn exit_code_delta(
    baseline: &BTreeMap<i64, u64>,
    current: &BTreeMap<i64, u64>,
) -> BTreeMap<i64, i64> {
    let codes: BTreeSet<i64> = baseline.keys().chain(current.keys()).copied().collect();
    codes
        .into_iter()
        .filter_map(|code| {
            let b = i128::from(baseline.get(&code).copied().unwrap_or(0));
            let c = i128::from(current.get(&code).copied().unwrap_or(0));
            let d = clamp_i64(c - b);
            (d != 0).then_some((code, d))
        })
        .collect()
}

fn clamp_i64(v: i128) -> i64 {
    i64::try_from(v).unwrap_or(if v > 0 { i64::MAX } else { i64::MIN })
}

/// Entries of one display topic, in sort-key order.
#[derive(Debug, Clone, PartialEq)]
pub struct TopicGroup<'a> {
    pub topic: &'a str,
    pub entries: Vec<&'a ProbeEntry>,
}

/// Group sorted entries by topic, topics in display priority order.
pub fn group_by_topic(entries: &[ProbeEntry]) -> Vec<TopicGroup<'_>> {
    let mut groups: BTreeMap<(usize, &str), TopicGroup<'_>> = BTreeMap::new();
    for e in entries {
        groups
            .entry(topic_rank(&e.topic))
            .or_insert_with(|| TopicGroup {
                topic: &e.topic,
                entries: Vec::new(),
            })
            .entries
            .push(e);
    }
    groups.into_values().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classify::{ExpectedState, Severity};

    fn item(probe: &str, count: u64, codes: &[(i64, u64)]) -> ProbeFailureItem {
        ProbeFailureItem {
            probe: probe.to_string(),
            count,
            exit_codes: codes.iter().copied().collect(),
            ..Default::default()
        }
    }

    fn summary(items: Vec<ProbeFailureItem>) -> ProbeFailuresSummary {
        ProbeFailuresSummary {
            run_id: None,
            items,
        }
    }

    #[test]
    fn test_new_resolved_changed() {
        let t = ClassificationTables::builtin();
        let base = summary(vec![
            item("network.lsof_listen", 2, &[(1, 2)]),
            item("execution.ps_list", 1, &[(1, 1)]),
            item("identity.dscl_list_users", 3, &[(70, 3)]),
        ]);
        let curr = summary(vec![
            item("network.lsof_listen", 4, &[(1, 4)]),
            item("network.ifconfig_iface", 5, &[(1, 5)]),
            item("identity.dscl_list_users", 3, &[(70, 3)]),
        ]);

        let entries = diff_probe_failures(Some(&base), Some(&curr), &t);
        let got: Vec<(ProbeStatus, &str)> = entries
            .iter()
            .map(|e| (e.status, e.probe.as_str()))
            .collect();
        assert_eq!(
            got,
            vec![
                (ProbeStatus::New, "network.ifconfig_iface"),
                (ProbeStatus::Changed, "network.lsof_listen"),
                (ProbeStatus::Resolved, "execution.ps_list"),
            ]
        );
        assert_eq!(entries[1].exit_code_delta, BTreeMap::from([(1, 2)]));
    }

    #[test]
    fn test_missing_code_equals_zero_count() {
        let t = ClassificationTables::builtin();
        let base = summary(vec![item("network.lsof_listen", 2, &[(1, 2)])]);
        let curr = summary(vec![item("network.lsof_listen", 2, &[(1, 2), (9, 0)])]);
        assert!(diff_probe_failures(Some(&base), Some(&curr), &t).is_empty());
    }

    #[test]
    fn test_redistributed_codes_with_same_count_changed() {
        let t = ClassificationTables::builtin();
        let base = item("network.lsof_listen", 4, &[(1, 2), (2, 2)]);
        let curr = item("network.lsof_listen", 4, &[(1, 3), (2, 1)]);
        assert!(is_changed("network.lsof_listen", &base, &curr, &t));
    }

    #[test]
    fn test_mixed_to_mixed_with_shifted_codes_is_changed() {
        let t = ClassificationTables::builtin();
        let base = item("config.fdesetup_status", 2, &[(1, 1), (255, 1)]);
        let curr = item("config.fdesetup_status", 2, &[(1, 1), (127, 1)]);
        assert_eq!(
            t.expected_state("config.fdesetup_status", &curr.exit_codes),
            ExpectedState::Mixed
        );
        assert!(is_changed("config.fdesetup_status", &base, &curr, &t));
    }

    #[test]
    fn test_huge_counts_keep_the_delta_sign() {
        let base = BTreeMap::from([(1, 1u64), (2, u64::MAX)]);
        let curr = BTreeMap::from([(1, u64::MAX), (2, 0u64)]);

        let delta = exit_code_delta(&base, &curr);

        assert_eq!(delta.get(&1), Some(&i64::MAX));
        assert_eq!(delta.get(&2), Some(&i64::MIN));
    }

    #[test]
    fn test_absent_summaries() {
        let t = ClassificationTables::builtin();
        assert!(diff_probe_failures(None, None, &t).is_empty());

        let curr = summary(vec![item("config.fdesetup_status", 1, &[(1, 1)])]);
        let entries = diff_probe_failures(None, Some(&curr), &t);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].status, ProbeStatus::New);
        assert_eq!(entries[0].expected_state, ExpectedState::Expected);
        assert_eq!(entries[0].severity, Severity::High);
    }

    #[test]
    fn test_resolved_uses_baseline_classification() {
        let t = ClassificationTables::builtin();
        let base = summary(vec![item("config.fdesetup_status", 2, &[(1, 1), (255, 1)])]);
        let entries = diff_probe_failures(Some(&base), None, &t);
        assert_eq!(entries[0].status, ProbeStatus::Resolved);
        assert_eq!(entries[0].expected_state, ExpectedState::Mixed);
    }

    #[test]
    fn test_group_by_topic_priority() {
        let t = ClassificationTables::builtin();
        let curr = summary(vec![
            item("misc.thing", 2, &[(1, 2)]),
            item("network.ifconfig_iface", 5, &[(1, 5)]),
            item("config.fdesetup_status", 1, &[(255, 1)]),
            item("network.lsof_listen", 1, &[(1, 1)]),
        ]);
        let entries = diff_probe_failures(None, Some(&curr), &t);
        let groups = group_by_topic(&entries);
        let topics: Vec<&str> = groups.iter().map(|g| g.topic).collect();
        assert_eq!(topics, vec!["Security", "Network", "Other"]);
        let network: Vec<&str> = groups[1].entries.iter().map(|e| e.probe.as_str()).collect();
        assert_eq!(network, vec!["network.ifconfig_iface", "network.lsof_listen"]);
    }
}
