use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use tokio::sync::OnceCell;
use tracing::{debug, warn};

use crate::rpc::{DaemonGateway, GatewayResult};

/// Height → block timestamp memo for one analysis run.
///
/// Each height is fetched at most once. Concurrent callers for the same
/// height wait on the same in-flight lookup, and failures are cached as
/// `None` so a bad height is never retried within the run.
#[derive(Debug, Default)]
pub struct TimestampCache {
    entries: Mutex<HashMap<u64, Arc<OnceCell<Option<u64>>>>>,
}

impl TimestampCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn resolve<G: DaemonGateway>(&self, gateway: &G, height: u64) -> Option<u64> {
        let cell = {
            let mut entries = self.entries.lock().unwrap_or_else(PoisonError::into_inner);
            entries.entry(height).or_default().clone()
        };

        if let Some(cached) = cell.get() {
            debug!(height, "timestamp cache hit");
            return *cached;
        }

        *cell
            .get_or_init(|| async {
                match gateway.get_block_timestamp(height).await {
                    GatewayResult::Found(ts) => Some(ts),
                    GatewayResult::NotFound => {
                        warn!(height, "block header not found");
                        None
                    }
                    GatewayResult::Failed(e) => {
                        warn!(height, "block header lookup failed: {e}");
                        None
                    }
                }
            })
            .await
    }

    /// Number of distinct heights seen so far.
    pub fn len(&self) -> usize {
        self.entries
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }
}
