use futures::stream::{self, StreamExt};
use tracing::{info, warn};

use super::Candidate;
use super::pipeline::AnalysisContext;
use crate::rpc::{DaemonGateway, GatewayResult};

/// Output heights for `indices`, in order. Lookup failures become `None`.
///
/// With `batch` set, one `get_outs` call is tried first; if it fails or comes
/// back with the wrong number of entries each index is looked up on its own.
pub async fn resolve_heights<G: DaemonGateway>(
    gateway: &G,
    indices: &[u64],
    batch: bool,
    concurrency: usize,
) -> Vec<Option<u64>> {
    if batch && !indices.is_empty() {
        match gateway.get_output_heights(indices).await {
            GatewayResult::Found(heights) if heights.len() == indices.len() => return heights,
            GatewayResult::Found(heights) => warn!(
                expected = indices.len(),
                got = heights.len(),
                "get_outs returned a short answer, falling back to per-output lookups"
            ),
            GatewayResult::NotFound => {
                warn!("get_outs returned nothing, falling back to per-output lookups")
            }
            GatewayResult::Failed(e) => {
                warn!("batched get_outs failed: {e}, falling back to per-output lookups")
            }
        }
    }

    stream::iter(indices.iter().copied())
        .map(|index| resolve_height(gateway, index))
        .buffered(concurrency.max(1))
        .collect()
        .await
}

async fn resolve_height<G: DaemonGateway>(gateway: &G, index: u64) -> Option<u64> {
    match gateway.get_output_heights(&[index]).await {
        GatewayResult::Found(heights) => {
            let height = heights.into_iter().next().flatten();
            if height.is_none() {
                warn!(index, "output has no height");
            }
            height
        }
        GatewayResult::NotFound => {
            warn!(index, "output not found");
            None
        }
        GatewayResult::Failed(e) => {
            warn!(index, "output lookup failed: {e}");
            None
        }
    }
}

/// `max(0, tx_timestamp - out_timestamp)`, or unknown.
pub fn age_seconds(tx_timestamp: u64, out_timestamp: Option<u64>) -> Option<u64> {
    out_timestamp.map(|ts| tx_timestamp.saturating_sub(ts))
}

/// Resolve every ring member to height, timestamp and age.
///
/// Always returns one candidate per index, in ring order.
pub async fn resolve_candidates<G: DaemonGateway>(
    ctx: &AnalysisContext<G>,
    indices: &[u64],
    tx_timestamp: u64,
) -> Vec<Candidate> {
    let settings = &ctx.settings;
    let concurrency = settings.max_concurrent_lookups.max(1);
    let interval = settings.progress_interval.max(1);
    let total = indices.len();

    info!(ring_size = total, "fetching output heights");
    let heights =
        resolve_heights(&ctx.gateway, indices, settings.batch_outputs, concurrency).await;

    info!("fetching block timestamps");
    let timestamps: Vec<Option<u64>> = stream::iter(heights.iter().copied())
        .map(|height| async move {
            match height {
                Some(h) => ctx.cache.resolve(&ctx.gateway, h).await,
                None => None,
            }
        })
        .buffered(concurrency)
        .enumerate()
        .map(|(i, ts)| {
            if i % interval == 0 || i + 1 == total {
                info!("resolved {}/{}", i + 1, total);
            }
            ts
        })
        .collect()
        .await;

    indices
        .iter()
        .zip(heights)
        .zip(timestamps)
        .map(|((&global_index, out_height), out_timestamp)| Candidate {
            global_index,
            out_height,
            out_timestamp,
            age_seconds: age_seconds(tx_timestamp, out_timestamp),
        })
        .collect()
}
