//! Query building and response shaping for fleetscope
//!
//! This crate turns filter state into backend query strings, reshapes backend
//! responses into display rows, and tracks per-query request generations.

mod highlight;
mod logql;
mod normalize;
mod promql;
mod schedule;
mod slot;

pub use highlight::SearchHighlighter;
pub use logql::{LOG_LIMIT, LogFilter, LogQuery, to_nanos};
pub use normalize::{LogLine, LogParser, format_log_time, normalize_logs};
pub use promql::{MIN_STEP_SECS, MetricRangeQuery, build_table, format_sample_time, step_for};
pub use schedule::RefreshSchedule;
pub use slot::QuerySlot;

// Re-export types used in our public API
pub use fleetscope_types::{LogEntry, LogLevel, MetricTable, TimeWindow};
