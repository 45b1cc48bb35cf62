//! Duplicate-alert suppression
//!
//! One entry per symbol that has ever alerted, never pruned. The gate is the
//! sole owner of this map; the scan loop consults it right before sending and
//! records only after a confirmed successful send, so a failed notification
//! never suppresses its own retry on the next cycle.

use std::collections::HashMap;
use std::time::{Duration, Instant};

#[derive(Debug)]
pub struct DedupGate {
    cooldown: Duration,
    last_alert: HashMap<String, Instant>,
}

impl DedupGate {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            last_alert: HashMap::new(),
        }
    }

    /// True if the symbol has never alerted or its cooldown has elapsed.
    pub fn should_alert(&self, symbol: &str, now: Instant) -> bool {
        match self.last_alert.get(symbol) {
            Some(&last) => now.duration_since(last) >= self.cooldown,
            None => true,
        }
    }

    /// Record a confirmed send for `symbol` at `now`.
    pub fn record_alert(&mut self, symbol: &str, now: Instant) {
        self.last_alert.insert(symbol.to_string(), now);
    }

    /// Number of symbols that have ever alerted.
    pub fn len(&self) -> usize {
        self.last_alert.len()
    }

    pub fn is_empty(&self) -> bool {
        self.last_alert.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_symbol_may_alert() {
        let gate = DedupGate::new(Duration::from_secs(600));
        assert!(gate.should_alert("BTCUSDT", Instant::now()));
    }

    #[test]
    fn suppresses_within_cooldown_window() {
        let mut gate = DedupGate::new(Duration::from_secs(600));
        let start = Instant::now();

        gate.record_alert("BTCUSDT", start);
        assert!(!gate.should_alert("BTCUSDT", start));
        assert!(!gate.should_alert("BTCUSDT", start + Duration::from_secs(599)));

        // Window boundary is inclusive: exactly cooldown apart may alert.
        assert!(gate.should_alert("BTCUSDT", start + Duration::from_secs(600)));
    }

    #[test]
    fn suppression_is_per_symbol() {
        let mut gate = DedupGate::new(Duration::from_secs(600));
        let now = Instant::now();

        gate.record_alert("BTCUSDT", now);
        assert!(!gate.should_alert("BTCUSDT", now));
        assert!(gate.should_alert("ETHUSDT", now));
        assert_eq!(gate.len(), 1);
    }

    #[test]
    fn re_recording_extends_the_window() {
        let mut gate = DedupGate::new(Duration::from_secs(600));
        let start = Instant::now();

        gate.record_alert("BTCUSDT", start);
        gate.record_alert("BTCUSDT", start + Duration::from_secs(600));
        assert!(!gate.should_alert("BTCUSDT", start + Duration::from_secs(1100)));
        assert!(gate.should_alert("BTCUSDT", start + Duration::from_secs(1200)));
        assert_eq!(gate.len(), 1);
    }
}
