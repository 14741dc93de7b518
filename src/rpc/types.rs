use serde::{Deserialize, Serialize};

pub const STATUS_OK: &str = "OK";

/// `/json_rpc` envelope. monerod echoes `id` back verbatim.
#[derive(Debug, Serialize)]
pub struct JsonRpcRequest<'a, P> {
    pub jsonrpc: &'static str,
    pub id: &'static str,
    pub method: &'a str,
    pub params: P,
}

#[derive(Debug, Deserialize)]
pub struct JsonRpcResponse<T> {
    pub result: Option<T>,
    pub error: Option<JsonRpcError>,
}

#[derive(Debug, Deserialize)]
pub struct JsonRpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Serialize)]
pub struct GetTransactionsRequest<'a> {
    pub txs_hashes: Vec<&'a str>,
    pub decode_as_json: bool,
}

#[derive(Debug, Deserialize)]
pub struct GetTransactionsResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub txs: Vec<TxEntry>,
    #[serde(default)]
    pub missed_tx: Vec<String>,
}

/// One entry of `get_transactions.txs`. `as_json` is itself a JSON document.
#[derive(Debug, Clone, Deserialize)]
pub struct TxEntry {
    #[serde(default)]
    pub tx_hash: String,
    pub as_json: String,
    #[serde(default)]
    pub block_height: Option<u64>,
    #[serde(default)]
    pub block_timestamp: Option<u64>,
    #[serde(default)]
    pub in_pool: bool,
}

#[derive(Debug, Serialize)]
pub struct HeightParams {
    pub height: u64,
}

#[derive(Debug, Deserialize)]
pub struct BlockHeaderResult {
    pub block_header: BlockHeader,
}

#[derive(Debug, Deserialize)]
pub struct BlockHeader {
    pub timestamp: u64,
}

#[derive(Debug, Serialize)]
pub struct GetOutsRequest {
    pub outputs: Vec<OutputRequest>,
}

#[derive(Debug, Serialize)]
pub struct OutputRequest {
    pub amount: u64,
    pub index: u64,
}

#[derive(Debug, Deserialize)]
pub struct GetOutsResponse {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub outs: Vec<OutEntry>,
}

#[derive(Debug, Deserialize)]
pub struct OutEntry {
    #[serde(default)]
    pub height: Option<u64>,
}
