//! The failover allocator: retries across the replica ordering

use crate::config::{AcquireSettings, FailoverConfig};
use crate::exception::{PoolError, PoolResult};
use crate::metrics::{EventCounters, PoolEvent};
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::warn;

use super::policy;
use super::provider::ConnectionProvider;
use super::registry::ReplicaRegistry;
use super::tracker::AllocationTracker;

/// Failover-aware aggregator over the per-replica pools of one shard.
///
/// Acquisition snapshots the replica health state, orders replicas by
/// ascending `(priority, error_count, random)`, and walks the ordering up
/// to `max_tries` times. Transient per-replica failures are logged,
/// counted, and hidden from the caller; only exhausting every replica in
/// every try surfaces as an error.
pub struct FailoverPool<P: ConnectionProvider> {
    registry: ReplicaRegistry<P>,
    max_tries: usize,
    events: Arc<EventCounters>,
}

impl<P: ConnectionProvider> FailoverPool<P> {
    /// Build a pool over `(provider, priority)` pairs; lower priority means
    /// more preferred. Events are reported to the process-wide counter
    /// bank.
    pub fn new(replicas: Vec<(Arc<P>, i64)>, config: FailoverConfig) -> PoolResult<Self> {
        FailoverPoolBuilder::from_replicas(replicas)
            .config(config)
            .build()
    }

    pub fn builder() -> FailoverPoolBuilder<P> {
        FailoverPoolBuilder::default()
    }

    /// Number of replicas behind this pool.
    pub fn replica_count(&self) -> usize {
        self.registry.len()
    }

    /// Raw per-replica error counter readout, for observability.
    pub fn error_counts(&self) -> Vec<u64> {
        self.registry.error_counts()
    }

    /// Acquire one live connection handle.
    ///
    /// Returns `Ok(None)` instead of failing when every replica is down and
    /// `skip_unavailable_shards` is set.
    pub async fn acquire(&self, settings: &AcquireSettings) -> PoolResult<Option<P::Handle>> {
        let mut fail_messages = String::new();

        if let Some(handle) = self
            .acquire_replica(settings, None, &mut fail_messages)
            .await
        {
            Ok(Some(handle))
        } else if settings.skip_unavailable_shards {
            Ok(None)
        } else {
            Err(PoolError::AllConnectionTriesFailed {
                log: fail_messages,
            })
        }
    }

    /// Acquire up to `max_parallel_replicas` handles, each from a distinct
    /// replica.
    ///
    /// Failing to fill the first slot is fatal (unless
    /// `skip_unavailable_shards` is set); once one handle is obtained,
    /// later failures stop the collection and return what was gathered.
    pub async fn acquire_many(&self, settings: &AcquireSettings) -> PoolResult<Vec<P::Handle>> {
        let mut tracker = AllocationTracker::new(self.registry.len());
        let mut connections = Vec::with_capacity(settings.max_parallel_replicas);

        for slot in 0..settings.max_parallel_replicas {
            let mut fail_messages = String::new();

            match self
                .acquire_replica(settings, Some(&mut tracker), &mut fail_messages)
                .await
            {
                Some(handle) => connections.push(handle),
                None if slot == 0 && !settings.skip_unavailable_shards => {
                    return Err(PoolError::AllConnectionTriesFailed {
                        log: fail_messages,
                    });
                }
                None => break,
            }
        }

        Ok(connections)
    }

    /// Allocate one handle from the (possibly tracker-restricted) replica
    /// set, retrying the full ordering up to `max_tries` times.
    ///
    /// Each failed attempt is logged, counted against the
    /// `DistributedConnectionFailTry` event, appended to `fail_messages`,
    /// and recorded on the replica's error counter.
    async fn acquire_replica(
        &self,
        settings: &AcquireSettings,
        mut tracker: Option<&mut AllocationTracker>,
        fail_messages: &mut String,
    ) -> Option<P::Handle> {
        let states = self.registry.snapshot();
        let order = policy::try_order(&states, tracker.as_deref());

        for try_no in 0..self.max_tries {
            for candidate in &order {
                match self
                    .registry
                    .provider(candidate.replica)
                    .try_acquire(settings)
                    .await
                {
                    Ok(handle) => {
                        if let Some(tracker) = tracker.as_mut() {
                            tracker.mark_allocated(candidate.slot);
                        }
                        return Some(handle);
                    }
                    Err(error) => {
                        self.events
                            .increment(PoolEvent::DistributedConnectionFailTry);
                        warn!(
                            try_no = try_no + 1,
                            replica = candidate.replica,
                            %error,
                            "connection attempt failed"
                        );
                        // Writing into a String cannot fail.
                        let _ = writeln!(fail_messages, "{error}");
                        self.registry.record_failure(candidate.replica);
                    }
                }
            }
        }

        self.events
            .increment(PoolEvent::DistributedConnectionFailAtAll);
        None
    }
}

/// Builder for [`FailoverPool`], covering custom event counter banks.
pub struct FailoverPoolBuilder<P> {
    replicas: Vec<(Arc<P>, i64)>,
    config: FailoverConfig,
    events: Option<Arc<EventCounters>>,
}

impl<P> Default for FailoverPoolBuilder<P> {
    fn default() -> Self {
        Self {
            replicas: Vec::new(),
            config: FailoverConfig::default(),
            events: None,
        }
    }
}

impl<P: ConnectionProvider> FailoverPoolBuilder<P> {
    fn from_replicas(replicas: Vec<(Arc<P>, i64)>) -> Self {
        Self {
            replicas,
            ..Self::default()
        }
    }

    /// Register one replica; lower priority means more preferred.
    pub fn replica(mut self, provider: Arc<P>, priority: i64) -> Self {
        self.replicas.push((provider, priority));
        self
    }

    pub fn config(mut self, config: FailoverConfig) -> Self {
        self.config = config;
        self
    }

    pub fn max_tries(mut self, max_tries: usize) -> Self {
        self.config.max_tries = max_tries;
        self
    }

    pub fn decrease_error_period(mut self, period: std::time::Duration) -> Self {
        self.config.decrease_error_period = period;
        self
    }

    /// Report events to a private counter bank instead of the process-wide
    /// one.
    pub fn events(mut self, events: Arc<EventCounters>) -> Self {
        self.events = Some(events);
        self
    }

    pub fn build(self) -> PoolResult<FailoverPool<P>> {
        self.config.validate().map_err(PoolError::configuration)?;
        let registry = ReplicaRegistry::new(self.replicas, self.config.decrease_error_period)?;

        Ok(FailoverPool {
            registry,
            max_tries: self.config.max_tries,
            events: self.events.unwrap_or_else(EventCounters::global),
        })
    }
}
