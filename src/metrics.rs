//! Event counter bank for pool observability
//!
//! A fixed bank of counters addressable by stable event id. One bank is
//! process-wide; pools can also be built against a private bank so callers
//! can read deltas in isolation.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

/// Stable event ids understood by the counter bank
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PoolEvent {
    /// One failed acquisition attempt against a single replica
    DistributedConnectionFailTry,
    /// One acquisition that exhausted every replica in every try
    DistributedConnectionFailAtAll,
}

impl PoolEvent {
    /// Number of distinct event ids
    pub const COUNT: usize = 2;

    /// Every event id, in bank order
    pub const ALL: [PoolEvent; PoolEvent::COUNT] = [
        PoolEvent::DistributedConnectionFailTry,
        PoolEvent::DistributedConnectionFailAtAll,
    ];

    /// Stable display name of the event
    pub fn name(&self) -> &'static str {
        match self {
            PoolEvent::DistributedConnectionFailTry => "DistributedConnectionFailTry",
            PoolEvent::DistributedConnectionFailAtAll => "DistributedConnectionFailAtAll",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// Fixed bank of event counters
#[derive(Debug, Default)]
pub struct EventCounters {
    counters: [AtomicU64; PoolEvent::COUNT],
}

impl EventCounters {
    pub fn new() -> Self {
        Self::default()
    }

    /// The process-wide counter bank
    pub fn global() -> Arc<EventCounters> {
        static GLOBAL: OnceLock<Arc<EventCounters>> = OnceLock::new();
        GLOBAL.get_or_init(|| Arc::new(EventCounters::new())).clone()
    }

    pub fn increment(&self, event: PoolEvent) {
        self.counters[event.index()].fetch_add(1, Ordering::Relaxed);
    }

    pub fn value(&self, event: PoolEvent) -> u64 {
        self.counters[event.index()].load(Ordering::Relaxed)
    }

    /// Current value of every counter, in bank order
    pub fn snapshot(&self) -> Vec<(PoolEvent, u64)> {
        PoolEvent::ALL
            .iter()
            .map(|&event| (event, self.value(event)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counters_start_at_zero() {
        let bank = EventCounters::new();
        for event in PoolEvent::ALL {
            assert_eq!(bank.value(event), 0);
        }
    }

    #[test]
    fn test_increment_is_per_event() {
        let bank = EventCounters::new();
        bank.increment(PoolEvent::DistributedConnectionFailTry);
        bank.increment(PoolEvent::DistributedConnectionFailTry);
        bank.increment(PoolEvent::DistributedConnectionFailAtAll);

        assert_eq!(bank.value(PoolEvent::DistributedConnectionFailTry), 2);
        assert_eq!(bank.value(PoolEvent::DistributedConnectionFailAtAll), 1);
    }

    #[test]
    fn test_snapshot_reports_bank_order() {
        let bank = EventCounters::new();
        bank.increment(PoolEvent::DistributedConnectionFailAtAll);

        let snapshot = bank.snapshot();
        assert_eq!(snapshot.len(), PoolEvent::COUNT);
        assert_eq!(
            snapshot[0],
            (PoolEvent::DistributedConnectionFailTry, 0)
        );
        assert_eq!(
            snapshot[1],
            (PoolEvent::DistributedConnectionFailAtAll, 1)
        );
    }

    #[test]
    fn test_event_names_are_stable() {
        assert_eq!(
            PoolEvent::DistributedConnectionFailTry.name(),
            "DistributedConnectionFailTry"
        );
        assert_eq!(
            PoolEvent::DistributedConnectionFailAtAll.name(),
            "DistributedConnectionFailAtAll"
        );
    }

    #[test]
    fn test_global_bank_is_shared() {
        let a = EventCounters::global();
        let b = EventCounters::global();
        assert!(Arc::ptr_eq(&a, &b));
    }
}
