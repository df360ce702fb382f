use chrono::{DateTime, Utc};

use fleetscope_types::LogLevel;

/// Maximum number of lines requested per log query
pub const LOG_LIMIT: u32 = 100;

/// Filter state of the log screen
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct LogFilter {
    /// Free-text regex, matched case-sensitively by the backend
    pub search: String,
    pub level: Option<LogLevel>,
    /// Value of the `app` label (empty = any)
    pub service: String,
    /// Value of the `pod` label (empty = any)
    pub pod: String,
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
}

impl LogFilter {
    pub fn start(&self) -> Option<DateTime<Utc>> {
        self.start
    }

    pub fn end(&self) -> Option<DateTime<Utc>> {
        self.end
    }

    /// Set the lower time bound; rejected when it would fall after the end
    pub fn set_start(&mut self, start: Option<DateTime<Utc>>) -> Result<(), &'static str> {
        check_range(start)?;
        if let (Some(s), Some(e)) = (start, self.end) {
            if s > e {
                return Err("start must not be after end");
            }
        }
        self.start = start;
        Ok(())
    }

    /// Set the upper time bound; rejected when it would fall before the start
    pub fn set_end(&mut self, end: Option<DateTime<Utc>>) -> Result<(), &'static str> {
        check_range(end)?;
        if let (Some(s), Some(e)) = (self.start, end) {
            if e < s {
                return Err("end must not be before start");
            }
        }
        self.end = end;
        Ok(())
    }

    /// `{app="...",pod="..."}` built from the non-empty label selections
    pub fn label_selector(&self) -> String {
        let mut labels = Vec::new();
        if !self.service.is_empty() {
            labels.push(format!("app={}", quote(&self.service)));
        }
        if !self.pod.is_empty() {
            labels.push(format!("pod={}", quote(&self.pod)));
        }
        format!("{{{}}}", labels.join(","))
    }

    /// `|~ "..."` line filters, level first then search text
    pub fn content_filters(&self) -> Vec<String> {
        let level = self.level.map(|l| l.as_query()).unwrap_or_default();
        [level, self.search.as_str()]
            .into_iter()
            .filter(|value| !value.is_empty())
            .map(|value| format!("|~ {}", quote(value)))
            .collect()
    }

    /// Build the query for the current filter state
    pub fn to_query(&self) -> LogQuery {
        LogQuery {
            label_selector: self.label_selector(),
            content_filters: self.content_filters(),
            start_nanos: self.start.and_then(to_nanos),
            end_nanos: self.end.and_then(to_nanos),
            limit: LOG_LIMIT,
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

/// A log range query, rebuilt whenever the filter changes
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LogQuery {
    pub label_selector: String,
    pub content_filters: Vec<String>,
    pub start_nanos: Option<i64>,
    pub end_nanos: Option<i64>,
    pub limit: u32,
}

impl LogQuery {
    /// Query expression: selector, a space, then the joined line filters.
    /// The trailing space is kept when there are no line filters.
    pub fn expr(&self) -> String {
        format!("{} {}", self.label_selector, self.content_filters.join(" "))
    }
}

/// Instant → nanoseconds since epoch, at millisecond precision.
/// `None` outside 1677-09-21 ..= 2262-04-11.
pub fn to_nanos(instant: DateTime<Utc>) -> Option<i64> {
    instant.timestamp_millis().checked_mul(1_000_000)
}

fn check_range(bound: Option<DateTime<Utc>>) -> Result<(), &'static str> {
    match bound {
        Some(instant) if to_nanos(instant).is_none() => Err("time is out of range"),
        _ => Ok(()),
    }
}

/// Double-quoted string literal with `\` and `"` escaped
fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('"');
    for c in value.chars() {
        if c == '\\' || c == '"' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}
