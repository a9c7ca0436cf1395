//! Replica selection ordering
//!
//! A pure function from a state snapshot (and, in multi-acquire mode, the
//! set of still-available replicas) to the order in which replicas are
//! tried.

use super::registry::StateSnapshot;
use super::tracker::AllocationTracker;

/// One replica in try order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Candidate {
    /// Index into the registry.
    pub replica: usize,
    /// Slot in the tracker's available prefix; equals `replica` when no
    /// tracker is in play.
    pub slot: usize,
}

/// Order the available replicas by ascending `(priority, error_count,
/// random)`. Ties on priority and error count are broken by the per-round
/// random draw, which spreads load uniformly across equivalent replicas and
/// changes every round so repeated calls do not pin traffic.
pub(crate) fn try_order(
    states: &StateSnapshot,
    tracker: Option<&AllocationTracker>,
) -> Vec<Candidate> {
    let available = tracker.map_or(states.len(), AllocationTracker::unallocated_len);

    let mut candidates: Vec<Candidate> = (0..available)
        .map(|slot| Candidate {
            replica: tracker.map_or(slot, |t| t.handle(slot)),
            slot,
        })
        .collect();

    candidates.sort_by_key(|candidate| states[candidate.replica]);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pooling::registry::ReplicaState;

    fn state(priority: i64, error_count: u64, random: u32) -> ReplicaState {
        ReplicaState {
            priority,
            error_count,
            random,
        }
    }

    #[test]
    fn test_priority_dominates() {
        let states = vec![state(2, 0, 0), state(0, 50, 9), state(1, 0, 0)];
        let order: Vec<usize> = try_order(&states, None).iter().map(|c| c.replica).collect();
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn test_error_count_breaks_priority_ties() {
        let states = vec![state(0, 3, 0), state(0, 1, 100), state(0, 2, 0)];
        let order: Vec<usize> = try_order(&states, None).iter().map(|c| c.replica).collect();
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn test_random_breaks_full_ties() {
        let states = vec![state(0, 0, 30), state(0, 0, 10), state(0, 0, 20)];
        let order: Vec<usize> = try_order(&states, None).iter().map(|c| c.replica).collect();
        assert_eq!(order, vec![1, 2, 0]);
    }

    #[test]
    fn test_order_is_deterministic_for_fixed_snapshot() {
        let states = vec![
            state(1, 4, 7),
            state(0, 0, 42),
            state(0, 2, 3),
            state(1, 0, 0),
        ];
        let first = try_order(&states, None);
        let second = try_order(&states, None);
        assert_eq!(first, second);

        let mut expected: Vec<usize> = (0..states.len()).collect();
        expected.sort_by_key(|&i| states[i]);
        let produced: Vec<usize> = first.iter().map(|c| c.replica).collect();
        assert_eq!(produced, expected);
    }

    #[test]
    fn test_tracker_restricts_to_available_replicas() {
        let states = vec![state(0, 0, 1), state(0, 0, 2), state(0, 0, 3)];
        let mut tracker = AllocationTracker::new(3);
        // Retire replica 0; slot 0 now holds replica 2.
        tracker.mark_allocated(0);

        let order = try_order(&states, Some(&tracker));
        assert_eq!(order.len(), 2);
        assert!(order.iter().all(|c| c.replica != 0));

        // Slots must point back into the tracker's available prefix.
        for candidate in &order {
            assert_eq!(tracker.handle(candidate.slot), candidate.replica);
        }
    }

    #[test]
    fn test_empty_tracker_produces_empty_order() {
        let states = vec![state(0, 0, 1)];
        let mut tracker = AllocationTracker::new(1);
        tracker.mark_allocated(0);
        assert!(try_order(&states, Some(&tracker)).is_empty());
    }
}
