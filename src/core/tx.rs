use serde::Deserialize;

use super::{AnalysisError, RingInput, Transaction};
use crate::rpc::types::TxEntry;

/// The parts of the daemon's `as_json` body we read.
#[derive(Debug, Deserialize)]
struct TxJson {
    #[serde(default)]
    vin: Vec<VinJson>,
}

/// `vin` items are externally tagged (`{"key": …}` or `{"gen": …}`).
#[derive(Debug, Deserialize)]
struct VinJson {
    key: Option<KeyInputJson>,
}

#[derive(Debug, Deserialize)]
struct KeyInputJson {
    #[serde(default)]
    key_offsets: Vec<u64>,
    #[serde(default)]
    k_image: String,
}

impl Transaction {
    /// Build from a `get_transactions` entry.
    pub fn from_entry(hash: &str, entry: TxEntry) -> Result<Self, AnalysisError> {
        if !entry.tx_hash.is_empty() && !entry.tx_hash.eq_ignore_ascii_case(hash) {
            return Err(AnalysisError::MalformedTransaction(format!(
                "daemon returned {} for {hash}",
                entry.tx_hash
            )));
        }
        if entry.in_pool {
            return Err(AnalysisError::Unconfirmed(hash.to_string()));
        }
        let (Some(block_height), Some(block_timestamp)) = (entry.block_height, entry.block_timestamp)
        else {
            return Err(AnalysisError::MalformedTransaction(
                "missing block_height or block_timestamp".into(),
            ));
        };

        let body: TxJson = serde_json::from_str(&entry.as_json)
            .map_err(|e| AnalysisError::MalformedTransaction(format!("as_json: {e}")))?;

        let ring_inputs = body
            .vin
            .into_iter()
            .filter_map(|vin| vin.key)
            .map(|key| RingInput {
                key_offsets: key.key_offsets,
                key_image: key.k_image,
            })
            .collect();

        Ok(Self {
            hash: hash.to_string(),
            block_height,
            block_timestamp,
            ring_inputs,
        })
    }

    /// First input carrying both a key image and ring offsets. Later inputs
    /// are not analyzed.
    pub fn ring_input(&self) -> Result<&RingInput, AnalysisError> {
        self.ring_inputs
            .iter()
            .find(|input| !input.key_image.is_empty() && !input.key_offsets.is_empty())
            .ok_or(AnalysisError::NoRingInput)
    }
}

/// Relative key offsets → absolute global output indices (running sum from 0).
pub fn decode_offsets(offsets: &[u64]) -> Result<Vec<u64>, AnalysisError> {
    let mut acc: u64 = 0;
    offsets
        .iter()
        .map(|&delta| -> Result<u64, AnalysisError> {
            acc = acc.checked_add(delta).ok_or_else(|| {
                AnalysisError::MalformedTransaction("key offsets overflow u64".into())
            })?;
            Ok(acc)
        })
        .collect()
}

/// Global indices of the analyzed ring.
pub fn extract_ring(tx: &Transaction) -> Result<Vec<u64>, AnalysisError> {
    decode_offsets(&tx.ring_input()?.key_offsets)
}
