pub mod cache;
pub mod pipeline;
pub mod resolver;
pub mod tx;

use serde::{Deserialize, Serialize};

use crate::report::ReportError;
use crate::rpc::RpcError;

/// A mined transaction as needed by the ring analysis.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub hash: String,
    pub block_height: u64,
    pub block_timestamp: u64,
    pub ring_inputs: Vec<RingInput>,
}

/// One `txin_to_key` input: relative key offsets plus its key image.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RingInput {
    pub key_offsets: Vec<u64>,
    pub key_image: String,
}

/// A ring member. `None` fields are unknown, never zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub global_index: u64,
    pub out_height: Option<u64>,
    pub out_timestamp: Option<u64>,
    pub age_seconds: Option<u64>,
}

/// Conditions that abort an analysis run.
#[derive(Debug, thiserror::Error)]
pub enum AnalysisError {
    #[error("transaction {0} not found")]
    TxNotFound(String),
    #[error("failed to fetch transaction: {0}")]
    TxFetch(#[source] RpcError),
    #[error("transaction {0} is still in the pool")]
    Unconfirmed(String),
    #[error("malformed transaction: {0}")]
    MalformedTransaction(String),
    #[error("no ring input in transaction (coinbase?)")]
    NoRingInput,
    #[error("report: {0}")]
    Report(#[from] ReportError),
}
