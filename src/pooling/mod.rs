//! Failover-aware aggregation over per-replica connection pools
//!
//! This module hands out live connection handles for one shard served by
//! several replica endpoints:
//! - Per-replica health tracking with time-decayed error counters
//! - Replica ordering by `(priority, error_count, random)` for preference
//!   plus uniform load spread across equivalent replicas
//! - Retries that hide transient per-replica failures
//! - Multi-acquire of distinct replicas for parallel fan-out

pub mod failover;
pub(crate) mod policy;
pub mod provider;
pub mod registry;
pub(crate) mod tracker;

pub use failover::{FailoverPool, FailoverPoolBuilder};
pub use provider::ConnectionProvider;
pub use registry::{ReplicaRegistry, ReplicaState, StateSnapshot};
