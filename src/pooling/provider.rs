//! The capability the aggregator consumes from each underlying pool

use crate::config::AcquireSettings;
use crate::exception::PoolResult;
use async_trait::async_trait;

/// One underlying single-endpoint connection pool, as seen by the
/// failover aggregator.
///
/// Implementations must be safe to call concurrently and must report every
/// failure through the error channel with a human-readable message rather
/// than panicking. `try_acquire` may await for as long as the underlying
/// pool needs; a saturated underlying pool therefore stalls the aggregator.
#[async_trait]
pub trait ConnectionProvider: Send + Sync {
    /// Handle to one live connection. The caller owns it exclusively;
    /// dropping it returns the connection per the underlying pool's
    /// contract.
    type Handle: Send;

    /// Create or select a live connection from this endpoint.
    async fn try_acquire(&self, settings: &AcquireSettings) -> PoolResult<Self::Handle>;
}
