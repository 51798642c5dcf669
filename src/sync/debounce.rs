use tokio::time::Duration;
use tokio::time::Instant;

/// Coalesces bursts of changes into one snapshot after a quiet period.
#[derive(Debug)]
pub struct Debouncer {
    quiet: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(quiet: Duration) -> Self {
        Self {
            quiet,
            deadline: None,
        }
    }
    /// Records a change, pushing the deadline out.
    pub fn touch(&mut self, now: Instant) {
        self.deadline = Some(now + self.quiet);
    }
    /// Schedules a flush at `now` regardless of recent activity.
    pub fn arm(&mut self, now: Instant) {
        self.deadline = Some(now);
    }
    /// True once, when the deadline has passed.
    pub fn poll(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(d) if now >= d => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
    /// Drops any pending deadline, returning whether one was set.
    pub fn flush(&mut self) -> bool {
        self.deadline.take().is_some()
    }
    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn fires_after_quiet_period() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(150));
        d.touch(t0);
        assert!(!d.poll(t0 + Duration::from_millis(100)));
        d.touch(t0 + Duration::from_millis(100));
        assert!(!d.poll(t0 + Duration::from_millis(200)));
        assert!(d.poll(t0 + Duration::from_millis(250)));
        assert!(!d.poll(t0 + Duration::from_millis(400)));
    }
    #[test]
    fn arm_fires_immediately_and_flush_cancels() {
        let t0 = Instant::now();
        let mut d = Debouncer::new(Duration::from_millis(150));
        d.arm(t0);
        assert!(d.poll(t0));
        d.touch(t0);
        assert!(d.flush());
        assert!(!d.flush());
        assert!(d.deadline().is_none());
    }
}
