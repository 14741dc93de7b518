pub mod types;

#[cfg(test)]
pub mod mock;

use std::time::Duration;

use reqwest::Client;
use serde::Serialize;
use serde::de::DeserializeOwned;

use types::{
    BlockHeaderResult, GetOutsRequest, GetOutsResponse, GetTransactionsRequest,
    GetTransactionsResponse, HeightParams, JsonRpcRequest, JsonRpcResponse, OutputRequest,
    STATUS_OK, TxEntry,
};

/// Outcome of a single gateway call.
///
/// `NotFound` means the daemon answered but had nothing for the request;
/// `Failed` covers transport errors, non-200 statuses and malformed bodies.
#[derive(Debug)]
pub enum GatewayResult<T> {
    Found(T),
    NotFound,
    Failed(RpcError),
}

impl<T> GatewayResult<T> {
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> GatewayResult<U> {
        match self {
            GatewayResult::Found(v) => GatewayResult::Found(f(v)),
            GatewayResult::NotFound => GatewayResult::NotFound,
            GatewayResult::Failed(e) => GatewayResult::Failed(e),
        }
    }
}

/// The daemon surface the analysis engine consumes.
#[allow(async_fn_in_trait)]
pub trait DaemonGateway {
    /// `get_transactions` for one hash, decoded as JSON.
    async fn get_transaction(&self, tx_hash: &str) -> GatewayResult<TxEntry>;

    /// `get_block_header_by_height` → header timestamp.
    async fn get_block_timestamp(&self, height: u64) -> GatewayResult<u64>;

    /// `get_outs` for a set of global indices (amount 0). The returned vector
    /// is order-preserving; an entry without a height is `None`.
    async fn get_output_heights(&self, indices: &[u64]) -> GatewayResult<Vec<Option<u64>>>;
}

/// Minimal monerod RPC client.
pub struct MoneroRpc {
    url: String,
    client: Client,
}

impl MoneroRpc {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, RpcError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(RpcError::Http)?;
        Ok(Self {
            url: url.trim_end_matches('/').to_string(),
            client,
        })
    }

    async fn post<B: Serialize, R: DeserializeOwned>(
        &self,
        endpoint: &str,
        body: &B,
    ) -> Result<R, RpcError> {
        let resp = self
            .client
            .post(format!("{}/{endpoint}", self.url))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(RpcError::Http)?;

        let status = resp.status();
        if !status.is_success() {
            return Err(RpcError::Status(status));
        }

        let text = resp.text().await.map_err(RpcError::Http)?;
        serde_json::from_str(&text).map_err(|e| RpcError::Malformed(format!("{endpoint}: {e}")))
    }

    async fn json_rpc<P: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        params: P,
    ) -> GatewayResult<R> {
        let body = JsonRpcRequest {
            jsonrpc: "2.0",
            id: "0",
            method,
            params,
        };
        let resp: JsonRpcResponse<R> = match self.post("json_rpc", &body).await {
            Ok(resp) => resp,
            Err(e) => return GatewayResult::Failed(e),
        };
        if let Some(err) = resp.error {
            return GatewayResult::Failed(RpcError::Rpc {
                code: err.code,
                message: err.message,
            });
        }
        match resp.result {
            Some(result) => GatewayResult::Found(result),
            None => GatewayResult::NotFound,
        }
    }
}

impl DaemonGateway for MoneroRpc {
    async fn get_transaction(&self, tx_hash: &str) -> GatewayResult<TxEntry> {
        let body = GetTransactionsRequest {
            txs_hashes: vec![tx_hash],
            decode_as_json: true,
        };
        let resp: GetTransactionsResponse = match self.post("get_transactions", &body).await {
            Ok(resp) => resp,
            Err(e) => return GatewayResult::Failed(e),
        };
        if resp.status != STATUS_OK {
            return GatewayResult::Failed(RpcError::BadStatus(resp.status));
        }
        if resp.missed_tx.iter().any(|h| h == tx_hash) {
            return GatewayResult::NotFound;
        }
        match resp.txs.into_iter().next() {
            Some(entry) => GatewayResult::Found(entry),
            None => GatewayResult::NotFound,
        }
    }

    async fn get_block_timestamp(&self, height: u64) -> GatewayResult<u64> {
        self.json_rpc::<_, BlockHeaderResult>("get_block_header_by_height", HeightParams { height })
            .await
            .map(|r| r.block_header.timestamp)
    }

    async fn get_output_heights(&self, indices: &[u64]) -> GatewayResult<Vec<Option<u64>>> {
        let body = GetOutsRequest {
            outputs: indices
                .iter()
                .map(|&index| OutputRequest { amount: 0, index })
                .collect(),
        };
        let resp: GetOutsResponse = match self.post("get_outs", &body).await {
            Ok(resp) => resp,
            Err(e) => return GatewayResult::Failed(e),
        };
        if resp.status != STATUS_OK {
            return GatewayResult::Failed(RpcError::BadStatus(resp.status));
        }
        GatewayResult::Found(resp.outs.into_iter().map(|o| o.height).collect())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum RpcError {
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),
    #[error("HTTP status {0}")]
    Status(reqwest::StatusCode),
    #[error("RPC error {code}: {message}")]
    Rpc { code: i64, message: String },
    #[error("daemon status {0:?}")]
    BadStatus(String),
    #[error("malformed response: {0}")]
    Malformed(String),
}
