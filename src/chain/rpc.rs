//! Tendermint / CometBFT JSON-RPC over HTTP.
//!
//! Only the endpoints the wallet needs are covered: `status` and the three
//! `broadcast_tx_*` methods. Integer fields are accepted both as JSON numbers
//! and as strings, since Tendermint encodes 64 bit values as strings.

use std::fmt::Display;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::de::{self, DeserializeOwned, Deserializer};
use serde::{Deserialize, Serialize};

use crate::error::{Result, WalletError};

/// JSON-RPC 2.0 request
#[derive(Serialize, Debug)]
struct Request<'a, T> {
    jsonrpc: &'a str,
    id: u64,
    method: &'a str,
    params: T,
}

/// JSON-RPC 2.0 error object
#[derive(Deserialize, Debug, Clone)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
    #[serde(default)]
    pub data: Option<String>,
}

impl Display for RpcError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "(code: {}, message: {}", self.code, self.message)?;
        if let Some(data) = &self.data {
            write!(f, ", data: {}", data)?;
        }
        write!(f, ")")
    }
}

#[derive(Deserialize, Debug)]
struct Response<R> {
    #[serde(default = "Option::default")]
    result: Option<R>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Serialize, Debug)]
struct TxParams {
    tx: String,
}

#[derive(Serialize, Debug)]
struct EmptyParams {}

/// Subset of the `status` result the wallet reads
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct NodeStatus {
    pub node_info: NodeInfo,
    #[serde(default)]
    pub sync_info: SyncInfo,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct NodeInfo {
    #[serde(default)]
    pub network: String,
    #[serde(default)]
    pub moniker: String,
    #[serde(default)]
    pub version: String,
}

#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct SyncInfo {
    #[serde(default, deserialize_with = "string_or_number")]
    pub latest_block_height: i64,
    #[serde(default)]
    pub catching_up: bool,
}

/// ABCI event attribute
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct EventAttribute {
    #[serde(default)]
    pub key: String,
    #[serde(default)]
    pub value: Option<String>,
    #[serde(default)]
    pub index: bool,
}

/// ABCI event emitted while checking or executing a transaction
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Event {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub attributes: Vec<EventAttribute>,
}

/// Result of `broadcast_tx_async` and `broadcast_tx_sync`
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ResultBroadcastTx {
    #[serde(default, deserialize_with = "string_or_number")]
    pub code: u32,
    #[serde(default, deserialize_with = "base64_bytes")]
    pub data: Vec<u8>,
    #[serde(default)]
    pub log: String,
    #[serde(default)]
    pub codespace: String,
    #[serde(default)]
    pub hash: String,
}

/// CheckTx or DeliverTx (CometBFT: tx_result) section of a commit result
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct TxResult {
    #[serde(default, deserialize_with = "string_or_number")]
    pub code: u32,
    #[serde(default, deserialize_with = "base64_bytes")]
    pub data: Vec<u8>,
    #[serde(default)]
    pub log: String,
    #[serde(default)]
    pub info: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub gas_wanted: i64,
    #[serde(default, deserialize_with = "string_or_number")]
    pub gas_used: i64,
    #[serde(default)]
    pub events: Vec<Event>,
    #[serde(default)]
    pub codespace: String,
}

impl TxResult {
    pub fn is_ok(&self) -> bool {
        self.code == 0
    }
}

/// Result of `broadcast_tx_commit`
#[derive(Deserialize, Debug, Clone, Default, PartialEq)]
pub struct ResultBroadcastTxCommit {
    #[serde(default)]
    pub check_tx: TxResult,
    #[serde(default, alias = "tx_result")]
    pub deliver_tx: TxResult,
    #[serde(default)]
    pub hash: String,
    #[serde(default, deserialize_with = "string_or_number")]
    pub height: i64,
}

/// Low-level Tendermint RPC client
#[derive(Debug)]
pub struct RpcClient {
    id: AtomicU64,
    client: reqwest::Client,
    url: String,
    connect_timeout: Duration,
    request_timeout: Duration,
    commit_timeout: Duration,
}

impl RpcClient {
    /// `address` may use the `tcp://` scheme Tendermint configs use; it is
    /// rewritten to plain http.
    pub fn new(
        address: &str,
        connect_timeout: Duration,
        request_timeout: Duration,
        commit_timeout: Duration,
    ) -> Result<Self> {
        let url = normalize_rpc_url(address)?;
        let client = reqwest::Client::builder()
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| WalletError::Config(format!("failed to build RPC client: {}", e)))?;

        Ok(Self {
            id: AtomicU64::new(0),
            client,
            url,
            connect_timeout,
            request_timeout,
            commit_timeout,
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn connect_timeout(&self) -> Duration {
        self.connect_timeout
    }

    pub async fn status(&self) -> Result<NodeStatus> {
        let status: NodeStatus = self.request("status", EmptyParams {}, self.request_timeout).await?;
        if status.node_info.network.is_empty() {
            return Err(WalletError::Connectivity(
                "malformed node status: empty network".to_string(),
            ));
        }
        Ok(status)
    }

    pub async fn broadcast_tx_async(&self, tx_bytes: &[u8]) -> Result<ResultBroadcastTx> {
        self.request("broadcast_tx_async", tx_params(tx_bytes), self.request_timeout)
            .await
    }

    pub async fn broadcast_tx_sync(&self, tx_bytes: &[u8]) -> Result<ResultBroadcastTx> {
        self.request("broadcast_tx_sync", tx_params(tx_bytes), self.request_timeout)
            .await
    }

    /// Blocks until the transaction is included in a block or the node gives up
    pub async fn broadcast_tx_commit(&self, tx_bytes: &[u8]) -> Result<ResultBroadcastTxCommit> {
        self.request("broadcast_tx_commit", tx_params(tx_bytes), self.commit_timeout)
            .await
    }

    async fn request<P: Serialize, R: DeserializeOwned>(
        &self,
        method: &str,
        params: P,
        timeout: Duration,
    ) -> Result<R> {
        let id = self.id.fetch_add(1, Ordering::SeqCst);
        let payload = Request {
            jsonrpc: "2.0",
            id,
            method,
            params,
        };

        log::debug!("RPC request {} (id {}) to {}", method, id, self.url);

        let res = self
            .client
            .post(&self.url)
            .timeout(timeout)
            .json(&payload)
            .send()
            .await
            .map_err(|e| WalletError::Connectivity(format!("{} request failed: {}", method, e)))?;

        let body = res
            .bytes()
            .await
            .map_err(|e| WalletError::Connectivity(format!("{} response failed: {}", method, e)))?;

        parse_response(method, &body)
    }
}

fn parse_response<R: DeserializeOwned>(method: &str, body: &[u8]) -> Result<R> {
    let response: Response<R> = serde_json::from_slice(body).map_err(|e| {
        WalletError::Connectivity(format!(
            "malformed {} response: {}. Response: {}",
            method,
            e,
            String::from_utf8_lossy(body)
        ))
    })?;

    if let Some(error) = response.error {
        return Err(WalletError::Connectivity(format!("{} returned an error {}", method, error)));
    }

    response
        .result
        .ok_or_else(|| WalletError::Connectivity(format!("{} response has no result", method)))
}

fn tx_params(tx_bytes: &[u8]) -> TxParams {
    TxParams {
        tx: BASE64.encode(tx_bytes),
    }
}

fn normalize_rpc_url(address: &str) -> Result<String> {
    let address = address.trim();
    if address.is_empty() {
        return Err(WalletError::Config("empty RPC address".to_string()));
    }

    let url = if let Some(rest) = address.strip_prefix("tcp://") {
        format!("http://{}", rest)
    } else if address.starts_with("http://") || address.starts_with("https://") {
        address.to_string()
    } else {
        format!("http://{}", address)
    };

    Ok(url)
}

fn string_or_number<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr + Deserialize<'de>,
    T::Err: Display,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw<T> {
        Str(String),
        Num(T),
    }

    match Raw::<T>::deserialize(deserializer)? {
        Raw::Str(s) => s.parse().map_err(de::Error::custom),
        Raw::Num(n) => Ok(n),
    }
}

fn base64_bytes<'de, D>(deserializer: D) -> std::result::Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(s) if !s.is_empty() => BASE64.decode(s).map_err(de::Error::custom),
        _ => Ok(vec![]),
    }
}
