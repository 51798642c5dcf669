use crate::*;
use std::time::Duration;

/// Timing knobs for a participant's connection.
#[derive(Debug, Clone, Copy)]
pub struct SyncConfig {
    pub heartbeat: Duration,
    pub misses: u32,
    pub debounce: Duration,
    pub backoff_base: Duration,
    pub backoff_cap: Duration,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            heartbeat: Duration::from_millis(HEARTBEAT_INTERVAL_MS),
            misses: HEARTBEAT_MISSES,
            debounce: Duration::from_millis(SNAPSHOT_DEBOUNCE_MS),
            backoff_base: Duration::from_millis(BACKOFF_BASE_MS),
            backoff_cap: Duration::from_millis(BACKOFF_CAP_MS),
        }
    }
}

/// Liveness check. Each tick sends a ping; a tick that finds the previous
/// ping unanswered counts as a miss.
#[derive(Debug)]
pub struct Heartbeat {
    misses: u32,
    limit: u32,
    awaiting: bool,
}

/// What the session should do on a heartbeat tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Beat {
    Ping,
    Dead,
}

impl Heartbeat {
    pub fn new(config: SyncConfig) -> Self {
        Self {
            misses: 0,
            limit: config.misses,
            awaiting: false,
        }
    }
    pub fn tick(&mut self) -> Beat {
        if self.awaiting {
            self.misses += 1;
        }
        self.awaiting = true;
        match self.misses >= self.limit {
            true => Beat::Dead,
            false => Beat::Ping,
        }
    }
    pub fn pong(&mut self) {
        self.misses = 0;
        self.awaiting = false;
    }
    pub fn misses(&self) -> u32 {
        self.misses
    }
}

/// Exponential reconnect delay.
#[derive(Debug)]
pub struct Backoff {
    base: Duration,
    cap: Duration,
    attempt: u32,
}

impl Backoff {
    pub fn new(config: SyncConfig) -> Self {
        Self {
            base: config.backoff_base,
            cap: config.backoff_cap,
            attempt: 0,
        }
    }
    /// Delay before the next attempt; doubles each call up to the cap.
    pub fn next(&mut self) -> Duration {
        let factor = 2u32.saturating_pow(self.attempt);
        self.attempt = self.attempt.saturating_add(1);
        self.base.saturating_mul(factor).min(self.cap)
    }
    pub fn attempt(&self) -> u32 {
        self.attempt
    }
    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn three_unanswered_pings_are_fatal() {
        let mut beat = Heartbeat::new(SyncConfig::default());
        assert_eq!(beat.tick(), Beat::Ping);
        assert_eq!(beat.tick(), Beat::Ping);
        assert_eq!(beat.tick(), Beat::Ping);
        assert_eq!(beat.tick(), Beat::Dead);
    }
    #[test]
    fn pong_clears_misses() {
        let mut beat = Heartbeat::new(SyncConfig::default());
        beat.tick();
        beat.tick();
        assert_eq!(beat.misses(), 1);
        beat.pong();
        assert_eq!(beat.misses(), 0);
        assert_eq!(beat.tick(), Beat::Ping);
    }
    #[test]
    fn backoff_doubles_to_cap() {
        let mut backoff = Backoff::new(SyncConfig::default());
        let delays = (0..7).map(|_| backoff.next().as_millis()).collect::<Vec<_>>();
        assert_eq!(delays, vec![500, 1000, 2000, 4000, 8000, 10000, 10000]);
        backoff.reset();
        assert_eq!(backoff.next(), Duration::from_millis(500));
    }
}
