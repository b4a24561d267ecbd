//! Named wall-clock timers (spec §3, §4.7): `create` stores `now`, `get`
//! returns elapsed milliseconds, `set(ms)` backdates the timer so that
//! `get()` immediately after reads `ms`.

use std::collections::HashMap;

/// The process-wide registry of named timers, storing each timer's
/// starting instant in host clock ticks (milliseconds).
#[derive(Clone, Debug, Default)]
pub struct TimerStore {
    timers: HashMap<String, u64>,
}

impl TimerStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create(&mut self, name: &str, now_ms: u64) {
        self.timers.insert(name.to_lowercase(), now_ms);
    }

    pub fn remove(&mut self, name: &str) {
        self.timers.remove(&name.to_lowercase());
    }

    pub fn exists(&self, name: &str) -> bool {
        self.timers.contains_key(&name.to_lowercase())
    }

    /// Elapsed milliseconds since the timer was created/set, or `0` if the
    /// timer does not exist (UO Steam auto-creates timers on first read).
    pub fn get(&self, name: &str, now_ms: u64) -> u64 {
        self.timers
            .get(&name.to_lowercase())
            .map_or(0, |started| now_ms.saturating_sub(*started))
    }

    /// Backdates the timer so it reads `elapsed_ms` as of `now_ms`.
    pub fn set(&mut self, name: &str, elapsed_ms: u64, now_ms: u64) {
        self.timers
            .insert(name.to_lowercase(), now_ms.saturating_sub(elapsed_ms));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_then_get_round_trips_within_a_tick() {
        let mut store = TimerStore::new();
        store.set("t", 500, 1_000);
        assert_eq!(store.get("t", 1_000), 500);
    }

    #[test]
    fn create_starts_at_zero_elapsed() {
        let mut store = TimerStore::new();
        store.create("t", 1_000);
        assert_eq!(store.get("t", 1_000), 0);
        assert_eq!(store.get("t", 1_200), 200);
    }

    #[test]
    fn remove_clears_timer() {
        let mut store = TimerStore::new();
        store.create("t", 0);
        store.remove("t");
        assert!(!store.exists("t"));
    }
}
