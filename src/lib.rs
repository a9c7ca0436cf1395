//! # mirrorpool
//!
//! Failover-aware connection pool aggregator for replicated shards.
//!
//! Given a fixed set of underlying single-endpoint connection pools (one
//! per replica of a shard), `mirrorpool` hands out live connection handles
//! while hiding transient failures:
//!
//! - Replicas are tried in ascending `(priority, error_count, random)`
//!   order: static preference first, then observed health, with a
//!   per-round random draw spreading load across equivalent replicas
//! - Per-replica error counters decay by halving once per configured
//!   period, so a recovered replica regains preference without probing
//! - Multi-acquire allocates up to `max_parallel_replicas` handles from
//!   distinct replicas for parallel fan-out
//! - Total failure surfaces one aggregated error carrying every per-try
//!   failure message, or an empty result under `skip_unavailable_shards`
//!
//! The underlying pools are collaborators behind the
//! [`ConnectionProvider`] trait; this crate does not establish connections,
//! frame protocols, or bound per-replica capacity.
//!
//! ```no_run
//! use mirrorpool::{AcquireSettings, FailoverConfig, FailoverPool};
//! # use std::sync::Arc;
//! # use async_trait::async_trait;
//! # struct Endpoint;
//! # #[async_trait]
//! # impl mirrorpool::ConnectionProvider for Endpoint {
//! #     type Handle = ();
//! #     async fn try_acquire(
//! #         &self,
//! #         _: &AcquireSettings,
//! #     ) -> mirrorpool::PoolResult<()> {
//! #         Ok(())
//! #     }
//! # }
//! # async fn demo() -> mirrorpool::PoolResult<()> {
//! let pool = FailoverPool::builder()
//!     .replica(Arc::new(Endpoint), 0)
//!     .replica(Arc::new(Endpoint), 1)
//!     .config(FailoverConfig::default())
//!     .build()?;
//!
//! let _handle = pool.acquire(&AcquireSettings::default()).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod exception;
pub mod metrics;
pub mod pooling;

pub use config::{AcquireSettings, FailoverConfig};
pub use exception::{PoolError, PoolResult};
pub use metrics::{EventCounters, PoolEvent};
pub use pooling::{
    ConnectionProvider, FailoverPool, FailoverPoolBuilder, ReplicaRegistry, ReplicaState,
    StateSnapshot,
};
