//! Shared types for fleetscope
//!
//! This crate contains the transport DTOs exchanged with the robot registry,
//! metrics and log backends, plus the view rows built from them.

use chrono::{DateTime, Utc};
use ratatui::style::Color;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use thiserror::Error;

// ============================================================================
// Robot Registry Types
// ============================================================================

/// A robot as reported by the registry
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Robot {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub status: String,
}

impl Robot {
    /// Known status of this robot, if the registry reported one we understand
    pub fn known_status(&self) -> Option<RobotStatus> {
        RobotStatus::parse(&self.status)
    }

    /// Display color for the status chip
    pub fn status_color(&self) -> Color {
        self.known_status()
            .map(|s| s.color())
            .unwrap_or(Color::Gray)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RobotStatus {
    Idle,
    Online,
    Offline,
    Busy,
    Error,
}

impl RobotStatus {
    /// All statuses in the order offered by the status selector
    pub const ALL: [RobotStatus; 5] = [
        Self::Idle,
        Self::Online,
        Self::Offline,
        Self::Busy,
        Self::Error,
    ];

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "idle" => Some(Self::Idle),
            "online" => Some(Self::Online),
            "offline" => Some(Self::Offline),
            "busy" => Some(Self::Busy),
            "error" => Some(Self::Error),
            _ => None,
        }
    }

    /// Wire representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Online => "online",
            Self::Offline => "offline",
            Self::Busy => "busy",
            Self::Error => "error",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Online => "Online",
            Self::Offline => "Offline",
            Self::Busy => "Busy",
            Self::Error => "Error",
        }
    }

    pub fn color(&self) -> Color {
        match self {
            Self::Online => Color::Green,
            Self::Offline | Self::Error => Color::Red,
            Self::Busy => Color::Yellow,
            Self::Idle => Color::Gray,
        }
    }

    /// Cycle through None → idle → ... → error → None
    pub fn cycle(current: Option<Self>) -> Option<Self> {
        match current {
            None => Some(Self::ALL[0]),
            Some(s) => {
                let idx = Self::ALL.iter().position(|x| *x == s).unwrap_or(0);
                Self::ALL.get(idx + 1).copied()
            }
        }
    }

    /// Cycle backwards through the same sequence
    pub fn cycle_back(current: Option<Self>) -> Option<Self> {
        match current {
            None => Self::ALL.last().copied(),
            Some(s) => {
                let idx = Self::ALL.iter().position(|x| *x == s).unwrap_or(0);
                idx.checked_sub(1).map(|i| Self::ALL[i])
            }
        }
    }
}

/// Local validation failures; a request that fails validation is never sent
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("robot name is required")]
    MissingName,
    #[error("robot type is required")]
    MissingType,
    #[error("robot id is required")]
    MissingRobotId,
    #[error("unknown robot status: {0}")]
    UnknownStatus(String),
}

fn parse_status(raw: &str) -> Result<Option<RobotStatus>, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    RobotStatus::parse(trimmed)
        .map(Some)
        .ok_or_else(|| ValidationError::UnknownStatus(trimmed.to_string()))
}

fn non_empty(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Body of `POST /robots`
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AddRobotRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RobotStatus>,
}

impl AddRobotRequest {
    /// Build from raw form input. Name and type must be non-empty after trimming;
    /// an empty status is left out of the request.
    pub fn new(name: &str, kind: &str, status: &str) -> Result<Self, ValidationError> {
        let name = non_empty(name).ok_or(ValidationError::MissingName)?;
        let kind = non_empty(kind).ok_or(ValidationError::MissingType)?;
        let status = parse_status(status)?;
        Ok(Self { name, kind, status })
    }
}

/// Body of `PATCH /robot`; only fields that are set get serialized
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct UpdateRobotRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<RobotStatus>,
}

impl UpdateRobotRequest {
    /// Build from raw form input, keeping only trimmed non-empty fields
    pub fn new(name: &str, kind: &str, status: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            name: non_empty(name),
            kind: non_empty(kind),
            status: parse_status(status)?,
        })
    }

    /// True when no field would be transmitted
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.kind.is_none() && self.status.is_none()
    }
}

/// Trim and check a robot id before it is used as an update target
pub fn robot_id(raw: &str) -> Result<String, ValidationError> {
    non_empty(raw).ok_or(ValidationError::MissingRobotId)
}

// ============================================================================
// Backend Response Envelopes
// ============================================================================

/// `{status, data}` wrapper shared by the metrics and log APIs
#[derive(Clone, Debug, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(default)]
    pub status: Option<String>,
    pub data: T,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct LogQueryData {
    #[serde(default)]
    pub result: Vec<LogStream>,
}

/// One label-grouped stream of `[timestampNanos, line]` pairs
#[derive(Clone, Debug, Default, Deserialize)]
pub struct LogStream {
    #[serde(default)]
    pub stream: HashMap<String, String>,
    #[serde(default)]
    pub values: Vec<(String, String)>,
}

#[derive(Clone, Debug, Default, Deserialize)]
pub struct MetricQueryData {
    #[serde(default)]
    pub result: Vec<MetricSeries>,
}

/// One series of `[unixSeconds, valueText]` samples
#[derive(Clone, Debug, Default, Deserialize)]
pub struct MetricSeries {
    #[serde(default)]
    pub metric: HashMap<String, String>,
    #[serde(default)]
    pub values: Vec<(f64, String)>,
}

// ============================================================================
// Log Types
// ============================================================================

/// Log severity level
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Fatal,
    #[default]
    Unknown,
}

impl LogLevel {
    /// Levels offered by the level filter, in selector order
    pub const FILTERS: [LogLevel; 4] = [Self::Error, Self::Warn, Self::Info, Self::Debug];

    /// Text matched against log lines when this level is used as a filter
    pub fn as_query(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
            Self::Fatal => "fatal",
            Self::Unknown => "",
        }
    }

    /// Get display color for this level
    pub fn color(&self) -> Color {
        match self {
            Self::Trace => Color::DarkGray,
            Self::Debug => Color::Cyan,
            Self::Info => Color::Green,
            Self::Warn => Color::Yellow,
            Self::Error => Color::Red,
            Self::Fatal => Color::Magenta,
            Self::Unknown => Color::White,
        }
    }

    /// Short display string (3 chars)
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "TRC",
            Self::Debug => "DBG",
            Self::Info => "INF",
            Self::Warn => "WRN",
            Self::Error => "ERR",
            Self::Fatal => "FTL",
            Self::Unknown => "???",
        }
    }

    /// Next level filter: None → error → warn → info → debug → None
    pub fn next_filter(current: Option<Self>) -> Option<Self> {
        match current {
            None => Some(Self::FILTERS[0]),
            Some(level) => Self::FILTERS
                .iter()
                .position(|l| *l == level)
                .and_then(|i| Self::FILTERS.get(i + 1).copied()),
        }
    }

    /// Previous level filter, reverse of [`LogLevel::next_filter`]
    pub fn prev_filter(current: Option<Self>) -> Option<Self> {
        match current {
            None => Self::FILTERS.last().copied(),
            Some(level) => Self::FILTERS
                .iter()
                .position(|l| *l == level)
                .and_then(|i| i.checked_sub(1))
                .map(|i| Self::FILTERS[i]),
        }
    }
}

/// A single log row ready for display
#[derive(Clone, Debug, PartialEq)]
pub struct LogEntry {
    /// Nanoseconds since epoch, as returned by the backend
    pub timestamp: String,

    /// Extracted message (or the raw line)
    pub message: String,

    /// Level detected from the message, for coloring only
    pub level: LogLevel,
}

impl LogEntry {
    pub fn new(timestamp: String, message: String) -> Self {
        Self {
            timestamp,
            message,
            level: LogLevel::Unknown,
        }
    }

    pub fn nanos(&self) -> Option<i64> {
        self.timestamp.parse().ok()
    }

    /// Parsed timestamp, if the backend sent a valid nanosecond value
    pub fn time(&self) -> Option<DateTime<Utc>> {
        self.nanos().map(DateTime::from_timestamp_nanos)
    }
}

// ============================================================================
// Metric Types
// ============================================================================

/// Time window for metric range queries
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum TimeWindow {
    #[default]
    Last1h,
    Last3h,
    Last6h,
    Last12h,
    Last24h,
}

impl TimeWindow {
    pub const ALL: [TimeWindow; 5] = [
        Self::Last1h,
        Self::Last3h,
        Self::Last6h,
        Self::Last12h,
        Self::Last24h,
    ];

    pub fn hours(&self) -> i64 {
        match self {
            Self::Last1h => 1,
            Self::Last3h => 3,
            Self::Last6h => 6,
            Self::Last12h => 12,
            Self::Last24h => 24,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Last1h => "Last 1 hour",
            Self::Last3h => "Last 3 hours",
            Self::Last6h => "Last 6 hours",
            Self::Last12h => "Last 12 hours",
            Self::Last24h => "Last 24 hours",
        }
    }

    /// Cycle to the next window
    pub fn next(&self) -> Self {
        match self {
            Self::Last1h => Self::Last3h,
            Self::Last3h => Self::Last6h,
            Self::Last6h => Self::Last12h,
            Self::Last12h => Self::Last24h,
            Self::Last24h => Self::Last1h,
        }
    }

    /// Cycle to the previous window
    pub fn prev(&self) -> Self {
        match self {
            Self::Last1h => Self::Last24h,
            Self::Last3h => Self::Last1h,
            Self::Last6h => Self::Last3h,
            Self::Last12h => Self::Last6h,
            Self::Last24h => Self::Last12h,
        }
    }
}

/// One row of the metric table: a timestamp and the value of each series at it
#[derive(Clone, Debug, PartialEq)]
pub struct MetricRow {
    /// Sample time in unix seconds
    pub timestamp: f64,
    /// `HH:mm` label
    pub time: String,
    /// Column key → value; a series with no sample here has no entry
    pub values: BTreeMap<String, f64>,
}

/// Time-indexed table built from a range query
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MetricTable {
    /// Column keys in first-seen order
    pub columns: Vec<String>,
    pub rows: Vec<MetricRow>,
}

impl MetricTable {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// `(unixSeconds, value)` points of one column, skipping rows without it
    pub fn points(&self, column: &str) -> Vec<(f64, f64)> {
        self.rows
            .iter()
            .filter_map(|row| row.values.get(column).map(|v| (row.timestamp, *v)))
            .filter(|(_, v)| v.is_finite())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_request_requires_name_and_type() {
        assert_eq!(
            AddRobotRequest::new("", "arm", ""),
            Err(ValidationError::MissingName)
        );
        assert_eq!(
            AddRobotRequest::new("robot1", "  ", ""),
            Err(ValidationError::MissingType)
        );
    }

    #[test]
    fn test_add_request_omits_empty_status() {
        let req = AddRobotRequest::new(" robot1 ", "arm", "").unwrap();
        assert_eq!(req.name, "robot1");
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body, serde_json::json!({"name": "robot1", "type": "arm"}));
    }

    #[test]
    fn test_add_request_serializes_status() {
        let req = AddRobotRequest::new("robot1", "arm", "busy").unwrap();
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body["status"], "busy");
    }

    #[test]
    fn test_unknown_status_rejected() {
        assert_eq!(
            AddRobotRequest::new("robot1", "arm", "sleeping"),
            Err(ValidationError::UnknownStatus("sleeping".to_string()))
        );
    }

    #[test]
    fn test_update_request_keeps_only_set_fields() {
        let req = UpdateRobotRequest::new("  ", "gripper", "").unwrap();
        let body = serde_json::to_value(&req).unwrap();
        assert_eq!(body, serde_json::json!({"type": "gripper"}));

        let empty = UpdateRobotRequest::new("", "", "").unwrap();
        assert!(empty.is_empty());
        assert_eq!(serde_json::to_string(&empty).unwrap(), "{}");
    }

    #[test]
    fn test_robot_id_trimmed() {
        assert_eq!(robot_id(" 42 "), Ok("42".to_string()));
        assert_eq!(robot_id("   "), Err(ValidationError::MissingRobotId));
    }

    #[test]
    fn test_robot_deserializes_type_field() {
        let robot: Robot = serde_json::from_str(
            r#"{"id":"a1","name":"r2","type":"astromech","status":"online"}"#,
        )
        .unwrap();
        assert_eq!(robot.kind, "astromech");
        assert_eq!(robot.known_status(), Some(RobotStatus::Online));
    }

    #[test]
    fn test_status_cycle_wraps_through_none() {
        let mut current = None;
        let mut seen = Vec::new();
        for _ in 0..6 {
            current = RobotStatus::cycle(current);
            seen.push(current);
        }
        assert_eq!(seen[0], Some(RobotStatus::Idle));
        assert_eq!(seen[4], Some(RobotStatus::Error));
        assert_eq!(seen[5], None);
        assert_eq!(RobotStatus::cycle_back(None), Some(RobotStatus::Error));
        assert_eq!(RobotStatus::cycle_back(Some(RobotStatus::Idle)), None);
    }

    #[test]
    fn test_level_filter_cycle() {
        assert_eq!(LogLevel::next_filter(None), Some(LogLevel::Error));
        assert_eq!(LogLevel::next_filter(Some(LogLevel::Debug)), None);
        assert_eq!(LogLevel::prev_filter(None), Some(LogLevel::Debug));
        assert_eq!(LogLevel::prev_filter(Some(LogLevel::Error)), None);
    }

    #[test]
    fn test_time_window_cycle() {
        let mut window = TimeWindow::default();
        for _ in 0..TimeWindow::ALL.len() {
            window = window.next();
        }
        assert_eq!(window, TimeWindow::Last1h);
        assert_eq!(TimeWindow::Last1h.prev(), TimeWindow::Last24h);
    }

    #[test]
    fn test_log_entry_time() {
        let entry = LogEntry::new("1704067200000000000".to_string(), "x".to_string());
        assert_eq!(entry.time().unwrap().timestamp(), 1_704_067_200);

        let bad = LogEntry::new("not-a-number".to_string(), "x".to_string());
        assert!(bad.time().is_none());
    }

    #[test]
    fn test_metric_series_accepts_integer_timestamps() {
        let series: MetricSeries =
            serde_json::from_str(r#"{"metric":{"status":"200"},"values":[[1000,"1.5"]]}"#)
                .unwrap();
        assert_eq!(series.values[0].0, 1000.0);
    }
}
