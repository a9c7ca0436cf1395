//! Replica set ownership, health state, and the decay clock

use crate::exception::{PoolError, PoolResult};
use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};
use tracing::debug;

/// Health triple for one replica at snapshot time.
///
/// The derived ordering is lexicographic over `(priority, error_count,
/// random)`: lower priority wins, then fewer recent errors, then the
/// per-round random draw spreads load across otherwise equal replicas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReplicaState {
    pub priority: i64,
    pub error_count: u64,
    pub random: u32,
}

/// Consistent copy of every replica's state, taken under the registry lock.
/// Immutable once returned; later registry mutation does not perturb an
/// in-flight selection.
pub type StateSnapshot = Vec<ReplicaState>;

/// State mutated only under the registry mutex.
struct DecayState {
    /// When the error counters were last halved. `None` until the first
    /// snapshot.
    last_decrease_time: Option<Instant>,
    /// One pseudo-random stream per replica, re-rolled every snapshot.
    rngs: Vec<SmallRng>,
}

/// Owns the underlying pools of one shard together with their health state.
///
/// The registry holds exactly one mutex, taken only while producing a
/// snapshot; failure recording is a lock-free atomic increment so that an
/// `try_acquire` awaiting network I/O never serializes other selections.
pub struct ReplicaRegistry<P> {
    providers: Vec<Arc<P>>,
    priorities: Vec<i64>,
    error_counts: Vec<AtomicU64>,
    decrease_error_period: Duration,
    shared: Mutex<DecayState>,
}

impl<P> ReplicaRegistry<P> {
    /// Build a registry over a fixed, non-empty replica set. Lower priority
    /// means more preferred. The replica order is stable for the lifetime
    /// of the registry; the position index is the canonical replica key.
    pub fn new(replicas: Vec<(Arc<P>, i64)>, decrease_error_period: Duration) -> PoolResult<Self> {
        if replicas.is_empty() {
            return Err(PoolError::configuration("replica set must not be empty"));
        }
        if decrease_error_period.is_zero() {
            return Err(PoolError::configuration(
                "decrease error period must be greater than 0",
            ));
        }

        let seed_base = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_err(|e| PoolError::clock(format!("system clock is before the Unix epoch: {e}")))?
            .as_nanos() as u64;

        // Seeds must differ per replica even when constructed in the same
        // instant, so the index is spread over the whole seed word.
        let rngs = (0..replicas.len())
            .map(|index| {
                SmallRng::seed_from_u64(seed_base ^ (index as u64).wrapping_mul(0x9e3779b97f4a7c15))
            })
            .collect();

        let (providers, priorities): (Vec<_>, Vec<_>) = replicas.into_iter().unzip();
        let error_counts = (0..providers.len()).map(|_| AtomicU64::new(0)).collect();

        Ok(Self {
            providers,
            priorities,
            error_counts,
            decrease_error_period,
            shared: Mutex::new(DecayState {
                last_decrease_time: None,
                rngs,
            }),
        })
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// The underlying pool at the given replica index.
    pub fn provider(&self, index: usize) -> &Arc<P> {
        &self.providers[index]
    }

    /// Record one failed acquisition against a replica. Lock-free; the
    /// increment influences future snapshots, not one already taken.
    pub fn record_failure(&self, index: usize) {
        self.error_counts[index].fetch_add(1, Ordering::Relaxed);
    }

    /// Raw error counter readout, without applying decay.
    pub fn error_counts(&self) -> Vec<u64> {
        self.error_counts
            .iter()
            .map(|count| count.load(Ordering::Relaxed))
            .collect()
    }

    /// Produce a consistent snapshot of every replica's state.
    ///
    /// Under the registry mutex: apply the error decay, then copy each
    /// `(priority, error_count, random)` triple out with a freshly rolled
    /// random. The lock is released before the snapshot is used.
    pub fn snapshot(&self) -> StateSnapshot {
        let mut guard = self
            .shared
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        self.apply_decay(&mut guard);

        let mut states = Vec::with_capacity(self.providers.len());
        for (index, rng) in guard.rngs.iter_mut().enumerate() {
            states.push(ReplicaState {
                priority: self.priorities[index],
                error_count: self.error_counts[index].load(Ordering::Relaxed),
                random: rng.next_u32(),
            });
        }
        states
    }

    /// Halve every error counter once per elapsed decay period.
    ///
    /// The decay timestamp advances only when the shift is non-zero, so
    /// frequent snapshots never starve the decay. Counters are shifted with
    /// `fetch_update`: an increment racing with the decay lands before or
    /// after the shift but is never lost.
    fn apply_decay(&self, shared: &mut DecayState) {
        let now = Instant::now();
        let Some(last) = shared.last_decrease_time else {
            shared.last_decrease_time = Some(now);
            return;
        };

        let elapsed = now.duration_since(last);
        let shift = (elapsed.as_nanos() / self.decrease_error_period.as_nanos()) as u64;
        if shift == 0 {
            return;
        }
        shared.last_decrease_time = Some(now);

        if shift >= u64::BITS as u64 {
            for count in &self.error_counts {
                count.store(0, Ordering::Relaxed);
            }
        } else {
            for count in &self.error_counts {
                // The update closure never aborts, so this cannot fail.
                let _ = count.fetch_update(Ordering::Relaxed, Ordering::Relaxed, |value| {
                    Some(value >> shift)
                });
            }
        }
        debug!(shift, "halved replica error counters");
    }
}
