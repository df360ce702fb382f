use chrono::Local;
use serde_json::Value;

use fleetscope_types::{LogEntry, LogLevel, LogQueryData};

/// A backend log line, classified once
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LogLine {
    /// JSON object carrying a string `log` field
    Structured { log: String },
    /// Anything else, kept verbatim
    Raw(String),
}

impl LogLine {
    pub fn parse(line: &str) -> Self {
        match Self::structured_log(line) {
            Some(log) => Self::Structured { log },
            None => Self::Raw(line.to_string()),
        }
    }

    fn structured_log(line: &str) -> Option<String> {
        let trimmed = line.trim();
        if !trimmed.starts_with('{') {
            return None;
        }
        let value: Value = serde_json::from_str(trimmed).ok()?;
        value.get("log")?.as_str().map(str::to_string)
    }

    pub fn into_message(self) -> String {
        match self {
            Self::Structured { log } => log,
            Self::Raw(raw) => raw,
        }
    }
}

/// Flatten a log query response into display rows.
///
/// Only the first stream is consumed; rows keep backend order.
pub fn normalize_logs(data: &LogQueryData) -> Vec<LogEntry> {
    let Some(stream) = data.result.first() else {
        return Vec::new();
    };
    if data.result.len() > 1 {
        tracing::debug!(
            streams = data.result.len(),
            "log response has several streams, showing the first"
        );
    }

    stream
        .values
        .iter()
        .map(|(timestamp, line)| LogParser::parse(timestamp, line))
        .collect()
}

/// `yyyy-MM-dd HH:mm:ss.SSS` in local time, or the raw value if unparsable
pub fn format_log_time(entry: &LogEntry) -> String {
    match entry.time() {
        Some(ts) => ts
            .with_timezone(&Local)
            .format("%Y-%m-%d %H:%M:%S%.3f")
            .to_string(),
        None => entry.timestamp.clone(),
    }
}

/// Turns raw backend lines into log rows
pub struct LogParser;

impl LogParser {
    /// Parse a `[timestamp, line]` pair into a LogEntry
    pub fn parse(timestamp: &str, line: &str) -> LogEntry {
        let message = LogLine::parse(line).into_message();
        let mut entry = LogEntry::new(timestamp.to_string(), message);
        entry.level = Self::detect_level(&entry.message);
        entry
    }

    /// Detect a log level from plain text patterns
    pub fn detect_level(content: &str) -> LogLevel {
        let upper = content.to_uppercase();

        // Bracketed patterns first: [ERROR], [WARN], ...
        let bracket_patterns = [
            ("[FATAL]", LogLevel::Fatal),
            ("[PANIC]", LogLevel::Fatal),
            ("[CRITICAL]", LogLevel::Fatal),
            ("[ERROR]", LogLevel::Error),
            ("[ERR]", LogLevel::Error),
            ("[WARN]", LogLevel::Warn),
            ("[WARNING]", LogLevel::Warn),
            ("[INFO]", LogLevel::Info),
            ("[DEBUG]", LogLevel::Debug),
            ("[TRACE]", LogLevel::Trace),
        ];

        for (pattern, level) in bracket_patterns {
            if upper.contains(pattern) {
                return level;
            }
        }

        let colon_patterns = [
            ("FATAL:", LogLevel::Fatal),
            ("ERROR:", LogLevel::Error),
            ("WARNING:", LogLevel::Warn),
            ("WARN:", LogLevel::Warn),
            ("INFO:", LogLevel::Info),
            ("DEBUG:", LogLevel::Debug),
            ("TRACE:", LogLevel::Trace),
        ];

        for (pattern, level) in colon_patterns {
            if upper.contains(pattern) {
                return level;
            }
        }

        let spaced_patterns = [
            (" FATAL ", LogLevel::Fatal),
            (" ERROR ", LogLevel::Error),
            (" WARN ", LogLevel::Warn),
            (" WARNING ", LogLevel::Warn),
            (" INFO ", LogLevel::Info),
            (" DEBUG ", LogLevel::Debug),
            (" TRACE ", LogLevel::Trace),
        ];

        for (pattern, level) in spaced_patterns {
            if upper.contains(pattern) {
                return level;
            }
        }

        let start_patterns = [
            ("FATAL", LogLevel::Fatal),
            ("ERROR", LogLevel::Error),
            ("WARN", LogLevel::Warn),
            ("INFO", LogLevel::Info),
            ("DEBUG", LogLevel::Debug),
            ("TRACE", LogLevel::Trace),
        ];

        let trimmed_upper = upper.trim_start();
        for (pattern, level) in start_patterns {
            if trimmed_upper.starts_with(pattern) {
                return level;
            }
        }

        LogLevel::Unknown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fleetscope_types::LogStream;

    fn stream(values: &[(&str, &str)]) -> LogStream {
        LogStream {
            values: values
                .iter()
                .map(|(t, l)| (t.to_string(), l.to_string()))
                .collect(),
            ..Default::default()
        }
    }

    #[test]
    fn test_structured_line_uses_log_field() {
        assert_eq!(
            LogLine::parse(r#"{"log":"hello"}"#),
            LogLine::Structured {
                log: "hello".to_string()
            }
        );
        assert_eq!(LogParser::parse("1", r#"{"log":"hello"}"#).message, "hello");
    }

    #[test]
    fn test_plain_text_kept_verbatim() {
        assert_eq!(
            LogLine::parse("plain text"),
            LogLine::Raw("plain text".to_string())
        );
    }

    #[test]
    fn test_json_without_log_field_falls_back_to_raw() {
        let line = r#"{"msg":"hello"}"#;
        assert_eq!(LogLine::parse(line), LogLine::Raw(line.to_string()));

        let numeric = r#"{"log":42}"#;
        assert_eq!(LogLine::parse(numeric).into_message(), numeric);

        let broken = r#"{"log":"unterminated"#;
        assert_eq!(LogLine::parse(broken).into_message(), broken);
    }

    #[test]
    fn test_only_first_stream_consumed_in_order() {
        let data = LogQueryData {
            result: vec![
                stream(&[("3", "newest"), ("2", r#"{"log":"middle"}"#), ("1", "oldest")]),
                stream(&[("9", "other stream")]),
            ],
        };
        let entries = normalize_logs(&data);
        let messages: Vec<_> = entries.iter().map(|e| e.message.as_str()).collect();
        assert_eq!(messages, vec!["newest", "middle", "oldest"]);
        assert_eq!(entries[0].timestamp, "3");
    }

    #[test]
    fn test_empty_result() {
        assert!(normalize_logs(&LogQueryData::default()).is_empty());
    }

    #[test]
    fn test_detect_level() {
        assert_eq!(LogParser::detect_level("[ERROR] boom"), LogLevel::Error);
        assert_eq!(LogParser::detect_level("warning: low disk"), LogLevel::Warn);
        assert_eq!(LogParser::detect_level("2024 INFO started"), LogLevel::Info);
        assert_eq!(LogParser::detect_level("nothing here"), LogLevel::Unknown);
    }

    #[test]
    fn test_format_log_time_falls_back_to_raw() {
        let entry = LogEntry::new("garbage".to_string(), "x".to_string());
        assert_eq!(format_log_time(&entry), "garbage");

        let entry = LogEntry::new("1704067200123000000".to_string(), "x".to_string());
        assert!(format_log_time(&entry).ends_with(".123"));
    }
}
