//! Display formatting for report lines.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;

use crate::record::ProbeFailureItem;

const BYTE_UNITS: [&str; 5] = ["B", "K", "M", "G", "T"];

/// Humanize a byte count with 1024-based units.
///
/// Formats the absolute value; callers apply the sign themselves.
pub fn humanize_bytes(n: f64) -> String {
    let mut v = n.abs();
    for unit in BYTE_UNITS {
        if v < 1024.0 {
            if unit == "B" {
                return format!("{}{}", v as u64, unit);
            }
            return format!("{:.1}{}", v, unit);
        }
        v /= 1024.0;
    }
    format!("{:.1}P", v)
}

/// Format a millisecond epoch timestamp as UTC `YYYY-MM-DD HH:MM:SS`.
///
/// `0` means unset and renders as `N/A`.
pub fn format_ts_ms(ts_ms: u64) -> String {
    if ts_ms == 0 {
        return "N/A".to_string();
    }
    i64::try_from(ts_ms)
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|t| t.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| ts_ms.to_string())
}

/// How a run of failures was spread over time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanKind {
    /// Exactly one failure
    SingleShot,
    /// Several failures with no measurable elapsed time
    TightBurst,
    Span,
}

impl SpanKind {
    pub fn of(count: u64, duration_ms: u64) -> Self {
        if count == 1 {
            SpanKind::SingleShot
        } else if count > 1 && duration_ms == 0 {
            SpanKind::TightBurst
        } else {
            SpanKind::Span
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SpanKind::SingleShot => "single-shot",
            SpanKind::TightBurst => "tight burst",
            SpanKind::Span => "span",
        }
    }
}

/// Span text for a new probe: a label, or the first→last range with the
/// failure rate when the span is at least one second long.
pub fn format_span(item: &ProbeFailureItem) -> String {
    match SpanKind::of(item.count, item.duration_ms) {
        SpanKind::Span => {
            let range = format!(
                "{} → {}",
                format_ts_ms(item.first_ts_ms),
                format_ts_ms(item.last_ts_ms)
            );
            // Sub-second spans would print a meaningless rate.
            if item.duration_ms >= 1000 && item.failure_rate > 0.0 {
                format!("{} ({:.2}/s)", range, item.failure_rate)
            } else {
                range
            }
        }
        kind => kind.as_str().to_string(),
    }
}

/// `code:count` pairs in ascending code order, comma separated
pub fn format_exit_codes(exit_codes: &BTreeMap<i64, u64>) -> String {
    exit_codes
        .iter()
        .map(|(code, n)| format!("{}:{}", code, n))
        .collect::<Vec<_>>()
        .join(",")
}

/// `code:+N` / `code:-N` pairs in ascending code order, comma-space separated
pub fn format_exit_code_delta(delta: &BTreeMap<i64, i64>) -> String {
    delta
        .iter()
        .filter(|(_, d)| **d != 0)
        .map(|(code, d)| format!("{}:{:+}", code, d))
        .collect::<Vec<_>>()
        .join(", ")
}

/// `+` for growth or no change, `-` for shrinkage
pub fn sign_of(delta: f64) -> &'static str {
    if delta < 0.0 {
        "-"
    } else {
        "+"
    }
}
