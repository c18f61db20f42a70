use std::sync::Arc;

use crate::chain::account_types::{Account, AccountInfo};
use crate::chain::address;
use crate::chain::coin::{self, GasPrice};
use crate::chain::node::{NodeClient, RemoteNode};
use crate::chain::proto::Coin;
use crate::chain::response::{BroadcastMode, BroadcastResult, ResultStage};
use crate::chain::rpc::NodeStatus;
use crate::chain::tx_builder::SignedTx;
use crate::config::ChainConfig;
use crate::error::{Result, WalletError};

/// Connection to one chain: account queries, fees, simulation and broadcasting
///
/// Cloning is cheap; clones share the underlying gRPC channel and HTTP client.
#[derive(Clone)]
pub struct ChainClient {
    prefix: String,
    gas_price: GasPrice,
    gas_adjustment: f64,
    node: Arc<dyn NodeClient>,
}

impl ChainClient {
    /// Connect to the endpoints in `config`
    pub async fn connect(config: &ChainConfig) -> Result<Self> {
        config.validate()?;
        let node = RemoteNode::connect(config).await?;
        Self::new(config, Arc::new(node))
    }

    /// Build a client over an already established transport
    pub fn new(config: &ChainConfig, node: Arc<dyn NodeClient>) -> Result<Self> {
        if config.bech32_prefix.is_empty() {
            return Err(WalletError::Config("bech32_prefix must not be empty".to_string()));
        }
        if config.gas_adjustment.is_infinite() {
            return Err(WalletError::Config("gas_adjustment must be finite".to_string()));
        }
        let gas_price = config.parse_gas_price()?;

        Ok(Self {
            prefix: config.bech32_prefix.clone(),
            gas_price,
            gas_adjustment: config.effective_gas_adjustment(),
            node,
        })
    }

    pub fn account_prefix(&self) -> &str {
        &self.prefix
    }

    pub fn gas_price(&self) -> &GasPrice {
        &self.gas_price
    }

    pub fn fee_denom(&self) -> &str {
        &self.gas_price.denom
    }

    pub fn gas_adjustment(&self) -> f64 {
        self.gas_adjustment
    }

    /// Decode `address` and check it belongs to this chain
    pub fn parse_address(&self, address: &str) -> Result<Vec<u8>> {
        address::decode(address, &self.prefix)
    }

    pub async fn get_node_status(&self) -> Result<NodeStatus> {
        self.node.status().await
    }

    pub async fn get_chain_id(&self) -> Result<String> {
        let status = self.node.status().await?;
        Ok(status.node_info.network)
    }

    /// Fresh account number and sequence; never cached
    pub async fn get_account(&self, address: &str) -> Result<AccountInfo> {
        let any = self.node.account(address).await?;
        log::debug!("Decoding account with type_url: {}", any.type_url);

        let account = Account::decode_any(&any)?;
        let info = account.account_info()?;
        log::debug!(
            "Account {} ({}): number {}, sequence {}",
            address,
            account.account_type(),
            info.account_number,
            info.sequence
        );
        Ok(info)
    }

    /// Fee for `gas` at the configured gas price
    pub fn get_fees(&self, gas: u64) -> Result<Vec<Coin>> {
        self.gas_price.fee_for(gas)
    }

    /// Simulate `tx` and return the gas used scaled by the gas adjustment
    pub async fn simulate_tx(&self, tx: &SignedTx) -> Result<u64> {
        let gas_info = self.node.simulate(&tx.to_bytes()).await?;
        let adjusted = coin::adjust_gas(gas_info.gas_used, self.gas_adjustment)?;

        log::debug!(
            "Simulation used {} gas, adjusted to {} (x{})",
            gas_info.gas_used,
            adjusted,
            self.gas_adjustment
        );
        Ok(adjusted)
    }

    pub async fn broadcast_tx(&self, tx: &SignedTx, mode: BroadcastMode) -> Result<BroadcastResult> {
        match mode {
            BroadcastMode::Async => self.broadcast_tx_async(tx).await,
            BroadcastMode::Sync => self.broadcast_tx_sync(tx).await,
            BroadcastMode::Commit => self.broadcast_tx_commit(tx).await,
        }
    }

    /// Hand the transaction to the node without waiting for CheckTx
    pub async fn broadcast_tx_async(&self, tx: &SignedTx) -> Result<BroadcastResult> {
        let res = self.node.broadcast_tx_async(&tx.to_bytes()).await?;
        let result = BroadcastResult::from_broadcast_tx(res, ResultStage::Submitted);
        log_result(BroadcastMode::Async, &result);
        Ok(result)
    }

    /// Wait for CheckTx
    pub async fn broadcast_tx_sync(&self, tx: &SignedTx) -> Result<BroadcastResult> {
        let res = self.node.broadcast_tx_sync(&tx.to_bytes()).await?;
        let result = BroadcastResult::from_broadcast_tx(res, ResultStage::CheckTx);
        log_result(BroadcastMode::Sync, &result);
        Ok(result)
    }

    /// Wait until the transaction is in a block
    pub async fn broadcast_tx_commit(&self, tx: &SignedTx) -> Result<BroadcastResult> {
        let res = self.node.broadcast_tx_commit(&tx.to_bytes()).await?;
        let result = BroadcastResult::from_broadcast_tx_commit(res);
        log_result(BroadcastMode::Commit, &result);
        Ok(result)
    }
}

impl std::fmt::Debug for ChainClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainClient")
            .field("prefix", &self.prefix)
            .field("gas_price", &self.gas_price.to_string())
            .field("gas_adjustment", &self.gas_adjustment)
            .finish_non_exhaustive()
    }
}

fn log_result(mode: BroadcastMode, result: &BroadcastResult) {
    if result.is_success() {
        log::info!("Broadcast ({}) {} accepted at height {}", mode, result.tx_hash, result.height);
    } else {
        log::warn!(
            "Broadcast ({}) {} rejected: code {} ({}) {}",
            mode,
            result.tx_hash,
            result.code,
            result.codespace,
            result.raw_log
        );
    }
}
