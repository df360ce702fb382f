use chrono::{DateTime, Utc};

/// Cached state of one query key.
///
/// Every issued request gets the next generation number. An outcome is applied
/// only if it carries the newest generation, so a slow older response can never
/// overwrite a newer one.
#[derive(Clone, Debug)]
pub struct QuerySlot<T> {
    data: Option<T>,
    error: Option<String>,
    last_fetched_at: Option<DateTime<Utc>>,
    issued: u64,
    resolved: u64,
}

impl<T> Default for QuerySlot<T> {
    fn default() -> Self {
        Self {
            data: None,
            error: None,
            last_fetched_at: None,
            issued: 0,
            resolved: 0,
        }
    }
}

impl<T> QuerySlot<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new request and return its generation
    pub fn begin(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Apply an outcome. Returns false (and changes nothing) when a newer
    /// request has been issued since this one.
    pub fn resolve(
        &mut self,
        generation: u64,
        outcome: Result<T, String>,
        at: DateTime<Utc>,
    ) -> bool {
        if generation != self.issued || generation <= self.resolved {
            tracing::debug!(generation, latest = self.issued, "dropping stale response");
            return false;
        }

        self.resolved = generation;
        self.last_fetched_at = Some(at);
        match outcome {
            Ok(data) => {
                self.data = Some(data);
                self.error = None;
            }
            Err(e) => {
                // Keep the last good data visible next to the error
                self.error = Some(e);
            }
        }
        true
    }

    /// Drop cached data and error; pending requests become stale
    pub fn reset(&mut self) {
        self.data = None;
        self.error = None;
        self.last_fetched_at = None;
        self.resolved = self.issued;
    }

    pub fn data(&self) -> Option<&T> {
        self.data.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn last_fetched_at(&self) -> Option<DateTime<Utc>> {
        self.last_fetched_at
    }

    /// Latest issued generation
    pub fn generation(&self) -> u64 {
        self.issued
    }

    /// True while the newest request has not resolved
    pub fn is_loading(&self) -> bool {
        self.resolved < self.issued
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_latest_generation_wins() {
        let now = Utc::now();
        let mut slot: QuerySlot<&str> = QuerySlot::new();
        let first = slot.begin();
        let second = slot.begin();
        assert!(slot.is_loading());

        // Newer response lands first
        assert!(slot.resolve(second, Ok("new"), now));
        // Older response arrives late and is ignored
        assert!(!slot.resolve(first, Ok("old"), now));
        assert_eq!(slot.data(), Some(&"new"));
        assert!(!slot.is_loading());
    }

    #[test]
    fn test_superseded_response_ignored_while_newer_pending() {
        let now = Utc::now();
        let mut slot: QuerySlot<u32> = QuerySlot::new();
        let first = slot.begin();
        let _second = slot.begin();

        assert!(!slot.resolve(first, Ok(1), now));
        assert_eq!(slot.data(), None);
        assert!(slot.is_loading());
    }

    #[test]
    fn test_error_keeps_previous_data() {
        let now = Utc::now();
        let mut slot: QuerySlot<u32> = QuerySlot::new();
        let g = slot.begin();
        slot.resolve(g, Ok(7), now);

        let g = slot.begin();
        assert!(slot.resolve(g, Err("connection refused".to_string()), now));
        assert_eq!(slot.data(), Some(&7));
        assert_eq!(slot.error(), Some("connection refused"));

        let g = slot.begin();
        slot.resolve(g, Ok(8), now);
        assert_eq!(slot.error(), None);
        assert_eq!(slot.last_fetched_at(), Some(now));
    }

    #[test]
    fn test_duplicate_resolution_ignored() {
        let now = Utc::now();
        let mut slot: QuerySlot<u32> = QuerySlot::new();
        let g = slot.begin();
        assert!(slot.resolve(g, Ok(1), now));
        assert!(!slot.resolve(g, Ok(2), now));
        assert_eq!(slot.data(), Some(&1));
    }

    #[test]
    fn test_reset_makes_in_flight_stale() {
        let now = Utc::now();
        let mut slot: QuerySlot<u32> = QuerySlot::new();
        let g = slot.begin();
        slot.reset();
        assert!(!slot.is_loading());
        assert!(!slot.resolve(g, Ok(1), now));
        assert_eq!(slot.data(), None);
    }
}
