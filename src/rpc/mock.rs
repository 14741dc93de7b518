use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use serde_json::json;

use super::types::TxEntry;
use super::{DaemonGateway, GatewayResult, RpcError};

#[derive(Debug, Default, Clone)]
pub struct CallLog {
    pub transactions: usize,
    pub outs: Vec<Vec<u64>>,
    pub headers: HashMap<u64, usize>,
}

impl CallLog {
    pub fn header_calls(&self) -> usize {
        self.headers.values().sum()
    }
}

/// In-memory daemon with scripted failures and a call log.
#[derive(Default)]
pub struct MockGateway {
    pub txs: HashMap<String, TxEntry>,
    pub output_heights: HashMap<u64, u64>,
    pub block_timestamps: HashMap<u64, u64>,
    pub failing_outputs: HashSet<u64>,
    pub failing_heights: HashSet<u64>,
    pub batch_fails: bool,
    pub calls: Mutex<CallLog>,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a mined transaction whose first input is a ring with `offsets`.
    pub fn with_ring_tx(mut self, hash: &str, offsets: &[u64], height: u64, timestamp: u64) -> Self {
        let as_json = json!({
            "version": 2,
            "vin": [{"key": {"amount": 0, "key_offsets": offsets, "k_image": "ki00"}}],
            "vout": []
        });
        self.txs.insert(
            hash.to_string(),
            TxEntry {
                tx_hash: hash.to_string(),
                as_json: as_json.to_string(),
                block_height: Some(height),
                block_timestamp: Some(timestamp),
                in_pool: false,
            },
        );
        self
    }

    pub fn with_raw_tx(mut self, entry: TxEntry) -> Self {
        self.txs.insert(entry.tx_hash.clone(), entry);
        self
    }

    pub fn with_output(mut self, index: u64, height: u64) -> Self {
        self.output_heights.insert(index, height);
        self
    }

    pub fn with_block(mut self, height: u64, timestamp: u64) -> Self {
        self.block_timestamps.insert(height, timestamp);
        self
    }

    pub fn calls(&self) -> CallLog {
        self.calls.lock().unwrap().clone()
    }
}

impl DaemonGateway for MockGateway {
    async fn get_transaction(&self, tx_hash: &str) -> GatewayResult<TxEntry> {
        self.calls.lock().unwrap().transactions += 1;
        match self.txs.get(tx_hash) {
            Some(entry) => GatewayResult::Found(entry.clone()),
            None => GatewayResult::NotFound,
        }
    }

    async fn get_block_timestamp(&self, height: u64) -> GatewayResult<u64> {
        *self.calls.lock().unwrap().headers.entry(height).or_insert(0) += 1;
        // let concurrent callers interleave
        tokio::task::yield_now().await;
        if self.failing_heights.contains(&height) {
            return GatewayResult::Failed(RpcError::Malformed(format!("header {height}")));
        }
        match self.block_timestamps.get(&height) {
            Some(ts) => GatewayResult::Found(*ts),
            None => GatewayResult::NotFound,
        }
    }

    async fn get_output_heights(&self, indices: &[u64]) -> GatewayResult<Vec<Option<u64>>> {
        self.calls.lock().unwrap().outs.push(indices.to_vec());
        if self.batch_fails && indices.len() > 1 {
            return GatewayResult::Failed(RpcError::BadStatus("BUSY".into()));
        }
        if indices.iter().any(|i| self.failing_outputs.contains(i)) {
            return GatewayResult::Failed(RpcError::Malformed("outs".into()));
        }
        GatewayResult::Found(
            indices
                .iter()
                .map(|i| self.output_heights.get(i).copied())
                .collect(),
        )
    }
}
