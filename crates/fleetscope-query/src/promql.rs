use chrono::{DateTime, Duration, Local, Utc};
use std::collections::BTreeMap;

use fleetscope_types::{MetricRow, MetricSeries, MetricTable, TimeWindow};

/// Finest resolution ever requested: one point per five minutes
pub const MIN_STEP_SECS: i64 = 300;

/// Label whose value names a series column
const SERIES_LABEL: &str = "status";
const FALLBACK_COLUMN: &str = "value";

/// Step in seconds for a window: `max(hours × 60, 300)`
pub fn step_for(window: TimeWindow) -> i64 {
    (window.hours() * 60).max(MIN_STEP_SECS)
}

/// Parameters of a `query_range` request
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MetricRangeQuery {
    pub query: String,
    /// Unix seconds
    pub start: i64,
    /// Unix seconds
    pub end: i64,
    /// Seconds
    pub step: i64,
}

impl MetricRangeQuery {
    /// Range query over `[now - window, now]`
    pub fn new(metric: &str, window: TimeWindow, now: DateTime<Utc>) -> Self {
        let start = now - Duration::hours(window.hours());
        Self {
            query: metric.to_string(),
            start: start.timestamp(),
            end: now.timestamp(),
            step: step_for(window),
        }
    }
}

/// Reshape range-query series into one row per distinct timestamp.
///
/// A series' column is its `status` label, or `value` without one. Two series
/// mapping to the same column overwrite each other; the later one wins.
pub fn build_table(series: &[MetricSeries]) -> MetricTable {
    let mut columns: Vec<String> = Vec::new();
    // Keyed by whole milliseconds so float timestamps compare exactly
    let mut rows: BTreeMap<i64, (f64, BTreeMap<String, f64>)> = BTreeMap::new();

    for s in series {
        let column = s
            .metric
            .get(SERIES_LABEL)
            .filter(|v| !v.is_empty())
            .cloned()
            .unwrap_or_else(|| FALLBACK_COLUMN.to_string());

        if !columns.contains(&column) {
            columns.push(column.clone());
        }

        for (ts, text) in &s.values {
            let key = (ts * 1000.0).round() as i64;
            let (_, values) = rows.entry(key).or_insert_with(|| (*ts, BTreeMap::new()));
            values.insert(column.clone(), parse_sample(text));
        }
    }

    let rows = rows
        .into_values()
        .map(|(timestamp, values)| MetricRow {
            timestamp,
            time: format_sample_time(timestamp),
            values,
        })
        .collect();

    MetricTable { columns, rows }
}

fn parse_sample(text: &str) -> f64 {
    text.trim().parse().unwrap_or(f64::NAN)
}

/// `HH:mm` in local time for a unix-seconds sample time
pub fn format_sample_time(secs: f64) -> String {
    DateTime::from_timestamp(secs.floor() as i64, 0)
        .map(|ts| ts.with_timezone(&Local).format("%H:%M").to_string())
        .unwrap_or_default()
}
