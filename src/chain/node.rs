//! Raw node access: gRPC for queries and simulation, Tendermint RPC for
//! status and broadcasting

use std::time::Duration;

use async_trait::async_trait;
use tonic::transport::{Channel, ClientTlsConfig, Endpoint};
use tonic::{Code, Status};

use crate::chain::proto::{
    Any, AuthQueryClient, GasInfo, QueryAccountRequest, ServiceClient, SimulateRequest,
};
use crate::chain::rpc::{NodeStatus, ResultBroadcastTx, ResultBroadcastTxCommit, RpcClient};
use crate::config::ChainConfig;
use crate::error::{Result, WalletError};

/// Transport the chain client talks through
///
/// Implementations only move bytes and map transport failures; decoding and
/// gas math live in [`crate::chain::ChainClient`].
#[async_trait]
pub trait NodeClient: Send + Sync {
    /// Tendermint `status`
    async fn status(&self) -> Result<NodeStatus>;

    /// Raw account returned by `cosmos.auth.v1beta1.Query/Account`
    async fn account(&self, address: &str) -> Result<Any>;

    /// `cosmos.tx.v1beta1.Service/Simulate`
    async fn simulate(&self, tx_bytes: &[u8]) -> Result<GasInfo>;

    async fn broadcast_tx_async(&self, tx_bytes: &[u8]) -> Result<ResultBroadcastTx>;

    async fn broadcast_tx_sync(&self, tx_bytes: &[u8]) -> Result<ResultBroadcastTx>;

    async fn broadcast_tx_commit(&self, tx_bytes: &[u8]) -> Result<ResultBroadcastTxCommit>;
}

/// Node reached over the network
#[derive(Debug, Clone)]
pub struct RemoteNode {
    channel: Channel,
    rpc: std::sync::Arc<RpcClient>,
}

impl RemoteNode {
    /// Dial the gRPC endpoint and prepare the RPC client
    pub async fn connect(config: &ChainConfig) -> Result<Self> {
        let grpc_url = grpc_url(&config.grpc_addr)?;
        log::info!("Connecting to gRPC endpoint {}", grpc_url);

        let mut endpoint = Endpoint::from_shared(grpc_url.clone())
            .map_err(|e| WalletError::Config(format!("invalid gRPC address {}: {}", grpc_url, e)))?
            .timeout(Duration::from_secs(config.request_timeout))
            .connect_timeout(Duration::from_secs(config.connection_timeout));

        if grpc_url.starts_with("https://") {
            endpoint = endpoint
                .tls_config(ClientTlsConfig::new())
                .map_err(|e| WalletError::Config(format!("invalid TLS config: {}", e)))?;
        }

        let channel = endpoint.connect().await.map_err(|e| {
            WalletError::Config(format!("error while connecting to {}: {}", grpc_url, e))
        })?;

        let rpc = RpcClient::new(
            &config.rpc_addr,
            Duration::from_secs(config.connection_timeout),
            Duration::from_secs(config.request_timeout),
            Duration::from_secs(config.commit_timeout),
        )?;

        log::info!("Connected to {} (RPC {})", grpc_url, rpc.url());

        Ok(Self {
            channel,
            rpc: std::sync::Arc::new(rpc),
        })
    }
}

#[async_trait]
impl NodeClient for RemoteNode {
    async fn status(&self) -> Result<NodeStatus> {
        self.rpc.status().await
    }

    async fn account(&self, address: &str) -> Result<Any> {
        let mut client = AuthQueryClient::new(self.channel.clone());
        let request = tonic::Request::new(QueryAccountRequest {
            address: address.to_string(),
        });

        let response = client.account(request).await.map_err(|status| match status.code() {
            Code::NotFound => WalletError::NotFound(format!("account {} not found", address)),
            Code::InvalidArgument => WalletError::Validation(status.message().to_string()),
            _ => connectivity("account query", &status),
        })?;

        response
            .into_inner()
            .account
            .ok_or_else(|| WalletError::NotFound(format!("account {} not found", address)))
    }

    async fn simulate(&self, tx_bytes: &[u8]) -> Result<GasInfo> {
        let mut client = ServiceClient::new(self.channel.clone());
        let request = tonic::Request::new(SimulateRequest {
            tx_bytes: tx_bytes.to_vec(),
            ..Default::default()
        });

        let response = client.simulate(request).await.map_err(|status| {
            if is_transport_failure(&status) {
                connectivity("simulation", &status)
            } else {
                WalletError::Simulation(status.message().to_string())
            }
        })?;

        response
            .into_inner()
            .gas_info
            .ok_or_else(|| WalletError::Simulation("no gas info in simulation response".to_string()))
    }

    async fn broadcast_tx_async(&self, tx_bytes: &[u8]) -> Result<ResultBroadcastTx> {
        self.rpc.broadcast_tx_async(tx_bytes).await
    }

    async fn broadcast_tx_sync(&self, tx_bytes: &[u8]) -> Result<ResultBroadcastTx> {
        self.rpc.broadcast_tx_sync(tx_bytes).await
    }

    async fn broadcast_tx_commit(&self, tx_bytes: &[u8]) -> Result<ResultBroadcastTxCommit> {
        self.rpc.broadcast_tx_commit(tx_bytes).await
    }
}

fn is_transport_failure(status: &Status) -> bool {
    matches!(
        status.code(),
        Code::Unavailable | Code::DeadlineExceeded | Code::Cancelled
    )
}

fn connectivity(operation: &str, status: &Status) -> WalletError {
    WalletError::Connectivity(format!(
        "{} failed ({:?}): {}",
        operation,
        status.code(),
        status.message()
    ))
}

/// A bare `host:port` is dialed in plain text
fn grpc_url(address: &str) -> Result<String> {
    let address = address.trim();
    if address.is_empty() {
        return Err(WalletError::Config("empty gRPC address".to_string()));
    }

    if address.starts_with("http://") || address.starts_with("https://") {
        Ok(address.to_string())
    } else {
        Ok(format!("http://{}", address))
    }
}
