use tracing::info;

use super::cache::TimestampCache;
use super::resolver::resolve_candidates;
use super::tx::extract_ring;
use super::{AnalysisError, Transaction};
use crate::config::AnalysisConfig;
use crate::report::RankedReport;
use crate::rpc::{DaemonGateway, GatewayResult};

/// Everything one analysis run owns: the daemon handle and the run-scoped
/// timestamp cache.
pub struct AnalysisContext<G> {
    pub gateway: G,
    pub cache: TimestampCache,
    pub settings: AnalysisConfig,
}

impl<G: DaemonGateway> AnalysisContext<G> {
    pub fn new(gateway: G, settings: AnalysisConfig) -> Self {
        Self {
            gateway,
            cache: TimestampCache::new(),
            settings,
        }
    }
}

/// Fetch and decode the transaction under analysis. Every failure is fatal.
pub async fn fetch_transaction<G: DaemonGateway>(
    ctx: &AnalysisContext<G>,
    tx_hash: &str,
) -> Result<Transaction, AnalysisError> {
    info!("Fetching TX {tx_hash}");
    match ctx.gateway.get_transaction(tx_hash).await {
        GatewayResult::Found(entry) => Transaction::from_entry(tx_hash, entry),
        GatewayResult::NotFound => Err(AnalysisError::TxNotFound(tx_hash.to_string())),
        GatewayResult::Failed(e) => Err(AnalysisError::TxFetch(e)),
    }
}

/// Run the full analysis for one transaction hash.
pub async fn run_analysis<G: DaemonGateway>(
    ctx: &AnalysisContext<G>,
    tx_hash: &str,
) -> Result<RankedReport, AnalysisError> {
    let tx = fetch_transaction(ctx, tx_hash).await?;
    let indices = extract_ring(&tx)?;
    let key_image = &tx.ring_input()?.key_image;
    info!(
        height = tx.block_height,
        ring_size = indices.len(),
        "analyzing first ring input"
    );

    let candidates = resolve_candidates(ctx, &indices, tx.block_timestamp).await;
    let report = RankedReport::build(&tx, key_image, &candidates);
    info!(
        known = report.known_ages(),
        ring_size = report.ring_size(),
        distinct_heights = ctx.cache.len(),
        "analysis complete"
    );
    Ok(report)
}
