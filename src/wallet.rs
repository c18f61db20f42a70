use crate::chain::tx_builder::TxBuilder;
use crate::chain::{
    BroadcastMode, BroadcastResult, ChainClient, FeeSetting, GasSetting, KeyPair, SignedTx,
    TransactionRequest,
};
use crate::config::AccountConfig;
use crate::error::{Result, ResultExt, WalletError};

/// Gas limit of the envelope sent to simulation
pub const SIMULATION_GAS_LIMIT: u64 = 200_000;

/// Signs and broadcasts transactions for one key on one chain
///
/// Every build reads the account sequence fresh from the chain and nothing is
/// locked in between. Two builds running at the same time therefore sign with
/// the same sequence and only the first one to be committed is accepted.
/// Callers that send concurrently must serialize builds themselves or set
/// sequences explicitly with [`TransactionRequest::with_sequence`].
#[derive(Debug)]
pub struct Wallet {
    keys: KeyPair,
    client: ChainClient,
}

impl Wallet {
    /// Derive the key described by `account` and bind it to `client`
    pub fn new(account: &AccountConfig, client: ChainClient) -> Result<Self> {
        let keys = KeyPair::derive(&account.mnemonic, &account.passphrase, &account.hd_path)?;
        Ok(Self::from_keys(keys, client))
    }

    pub fn from_keys(keys: KeyPair, client: ChainClient) -> Self {
        Self { keys, client }
    }

    pub fn keys(&self) -> &KeyPair {
        &self.keys
    }

    pub fn client(&self) -> &ChainClient {
        &self.client
    }

    /// Account address under the chain's prefix
    pub fn address(&self) -> Result<String> {
        self.keys.address(self.client.account_prefix())
    }

    /// Resolve account, gas and fee for `request` and sign it
    pub async fn build_tx(&self, request: &TransactionRequest) -> Result<SignedTx> {
        let (builder, account_number) = self.prepare(request).await?;

        let gas_limit = match request.gas {
            GasSetting::Auto => self.estimate_gas(&builder).await?,
            GasSetting::Limit(limit) => limit,
            GasSetting::Unset => {
                return Err(WalletError::Validation(
                    "no gas limit set, use with_gas_limit or with_gas_auto".to_string(),
                ))
            }
        };

        let fee = match &request.fee {
            FeeSetting::Amount(amount) => amount.clone(),
            FeeSetting::Auto | FeeSetting::Unset => self.client.get_fees(gas_limit)?,
        };

        let chain_id = self
            .client
            .get_chain_id()
            .await
            .context("error while getting the chain id")?;

        let tx = builder
            .with_gas_limit(gas_limit)
            .with_fee(fee)
            .sign(&chain_id, account_number)?;

        log::info!(
            "Built transaction {} with {} message(s), gas {}, sequence {}",
            tx.tx_hash(),
            tx.messages().len(),
            tx.gas_limit(),
            tx.sequence().unwrap_or_default()
        );
        Ok(tx)
    }

    /// Estimate the gas `request` needs, already scaled by the gas adjustment.
    /// Runs the simulation regardless of the request's gas setting.
    pub async fn simulate_tx(&self, request: &TransactionRequest) -> Result<u64> {
        let (builder, _) = self.prepare(request).await?;
        self.estimate_gas(&builder).await
    }

    pub async fn broadcast_tx(&self, request: &TransactionRequest, mode: BroadcastMode) -> Result<BroadcastResult> {
        let tx = self.build_tx(request).await?;
        self.client.broadcast_tx(&tx, mode).await
    }

    pub async fn broadcast_tx_async(&self, request: &TransactionRequest) -> Result<BroadcastResult> {
        self.broadcast_tx(request, BroadcastMode::Async).await
    }

    pub async fn broadcast_tx_sync(&self, request: &TransactionRequest) -> Result<BroadcastResult> {
        self.broadcast_tx(request, BroadcastMode::Sync).await
    }

    pub async fn broadcast_tx_commit(&self, request: &TransactionRequest) -> Result<BroadcastResult> {
        self.broadcast_tx(request, BroadcastMode::Commit).await
    }

    /// Validate the request and draft the body against the current account.
    /// Returns the draft and the account number to sign with.
    async fn prepare(&self, request: &TransactionRequest) -> Result<(TxBuilder<'_>, u64)> {
        if request.messages.is_empty() {
            return Err(WalletError::Validation(
                "transaction must contain at least one message".to_string(),
            ));
        }

        let address = self.address()?;
        let account = self
            .client
            .get_account(&address)
            .await
            .context("error while getting the account from the chain")?;

        let sequence = request.sequence.unwrap_or(account.sequence);

        let mut builder = TxBuilder::new(&self.keys, request.messages.clone(), request.memo.clone())
            .with_sequence(sequence);

        if let Some(granter) = &request.fee_granter {
            self.client
                .parse_address(granter)
                .context("invalid fee granter")?;
            builder = builder.with_fee_granter(granter.clone());
        }

        log::debug!(
            "Preparing transaction for {} (account {}, sequence {})",
            address,
            account.account_number,
            sequence
        );
        Ok((builder, account.account_number))
    }

    async fn estimate_gas(&self, builder: &TxBuilder<'_>) -> Result<u64> {
        let fee = self.client.get_fees(SIMULATION_GAS_LIMIT)?;
        let sim_tx = builder
            .clone()
            .with_gas_limit(SIMULATION_GAS_LIMIT)
            .with_fee(fee)
            .build_simulation_tx();

        self.client
            .simulate_tx(&sim_tx)
            .await
            .context("error while simulating the transaction")
    }
}
