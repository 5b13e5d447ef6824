use std::collections::HashMap;
use std::time::{Duration, Instant};

// Prune the expired entries once the map grows past this many keys.
const PRUNE_WATERMARK: usize = 256;

/// Time-windowed admission gate for raw scan keys.
///
/// A key that was admitted stays suppressed until `cooldown` has elapsed,
/// so a QR code sitting in frame (or a face re-detected every tick) only
/// produces one accepted event per window. Expiry is checked lazily against
/// the caller-supplied `now`, so no sweep thread is needed and tests can
/// fabricate times.
#[derive(Debug)]
pub struct DedupCache {
    cooldown: Duration,
    entries: HashMap<String, Instant>,
}

impl DedupCache {
    pub fn new(cooldown: Duration) -> Self {
        Self {
            cooldown,
            entries: HashMap::new(),
        }
    }

    /// Returns `true` and records the key if no live entry exists for it,
    /// `false` if the key is still inside its cooldown window.
    pub fn offer(&mut self, raw_key: &str, now: Instant) -> bool {
        if let Some(expires_at) = self.entries.get(raw_key) {
            if now < *expires_at {
                return false;
            }
        }

        if self.entries.len() >= PRUNE_WATERMARK {
            self.entries.retain(|_, expires_at| now < *expires_at);
        }

        self.entries
            .insert(raw_key.to_string(), now + self.cooldown);
        true
    }

    pub fn cooldown(&self) -> Duration {
        self.cooldown
    }

    /// Count of live entries as of `now`.
    pub fn live_len(&self, now: Instant) -> usize {
        self.entries
            .values()
            .filter(|expires_at| now < **expires_at)
            .count()
    }
}
