use std::time::{Duration, Instant};

/// Fixed-interval refresh timer for one query key.
///
/// Any execution (timer, filter change, manual refresh) calls [`mark`], so the
/// next automatic run is always one full interval after the last request.
///
/// [`mark`]: RefreshSchedule::mark
#[derive(Clone, Debug)]
pub struct RefreshSchedule {
    interval: Duration,
    last_run: Option<Instant>,
}

impl RefreshSchedule {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            last_run: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Whether an automatic refresh should run at `now`
    pub fn is_due(&self, now: Instant) -> bool {
        match self.last_run {
            Some(last) => now.saturating_duration_since(last) >= self.interval,
            None => true,
        }
    }

    /// Record that a request was issued at `now`
    pub fn mark(&mut self, now: Instant) {
        self.last_run = Some(now);
    }

    /// Forget the last run so the next check is due immediately
    pub fn clear(&mut self) {
        self.last_run = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_due_after_interval() {
        let t0 = Instant::now();
        let mut schedule = RefreshSchedule::new(Duration::from_secs(5));
        assert!(schedule.is_due(t0));

        schedule.mark(t0);
        assert!(!schedule.is_due(t0 + Duration::from_millis(4999)));
        assert!(schedule.is_due(t0 + Duration::from_secs(5)));
    }

    #[test]
    fn test_manual_run_pushes_next_tick() {
        let t0 = Instant::now();
        let mut schedule = RefreshSchedule::new(Duration::from_secs(30));
        schedule.mark(t0);
        schedule.mark(t0 + Duration::from_secs(20));
        assert!(!schedule.is_due(t0 + Duration::from_secs(31)));
        assert!(schedule.is_due(t0 + Duration::from_secs(50)));
    }

    #[test]
    fn test_clear() {
        let t0 = Instant::now();
        let mut schedule = RefreshSchedule::new(Duration::from_secs(5));
        schedule.mark(t0);
        schedule.clear();
        assert!(schedule.is_due(t0));
    }
}
