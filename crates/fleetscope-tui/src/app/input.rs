use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};

const LOCAL_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Parse a time bound typed by the user.
///
/// Accepts RFC 3339 or a local `YYYY-MM-DD HH:MM[:SS]` (a bare date means
/// midnight). Blank input clears the bound.
pub fn parse_instant(text: &str) -> Result<Option<DateTime<Utc>>, String> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(text) {
        return Ok(Some(dt.with_timezone(&Utc)));
    }

    let naive = LOCAL_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .ok_or_else(|| format!("Invalid time '{text}', expected YYYY-MM-DD HH:MM[:SS]"))?;

    Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|dt| Some(dt.with_timezone(&Utc)))
        .ok_or_else(|| format!("'{text}' does not exist in the local time zone"))
}

/// Render a bound back into the editable local form
pub fn format_instant(instant: DateTime<Utc>) -> String {
    instant
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M:%S")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_clears() {
        assert_eq!(parse_instant("  "), Ok(None));
    }

    #[test]
    fn test_rfc3339() {
        let parsed = parse_instant("2024-01-01T00:00:00Z").unwrap().unwrap();
        assert_eq!(parsed.timestamp(), 1_704_067_200);

        let offset = parse_instant("2024-01-01T02:00:00+02:00").unwrap().unwrap();
        assert_eq!(offset, parsed);
    }

    #[test]
    fn test_local_formats_round_trip() {
        let parsed = parse_instant("2024-03-10 14:30").unwrap().unwrap();
        assert_eq!(format_instant(parsed), "2024-03-10 14:30:00");

        let with_secs = parse_instant("2024-03-10 14:30:15").unwrap().unwrap();
        assert_eq!(with_secs.timestamp() - parsed.timestamp(), 15);

        let date_only = parse_instant("2024-03-10").unwrap().unwrap();
        assert_eq!(format_instant(date_only), "2024-03-10 00:00:00");
    }

    #[test]
    fn test_garbage_rejected() {
        assert!(parse_instant("yesterday").is_err());
        assert!(parse_instant("2024-13-01 00:00").is_err());
    }
}
