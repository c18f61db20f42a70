//! In-memory node used by unit tests
//!
//! Records every call and plays a tiny chain: one account whose sequence is
//! bumped by each committed transaction that carries the expected sequence.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use prost::Message;

use crate::chain::proto::{Any, BaseAccount, Coin, GasInfo};
use crate::chain::rpc::{NodeInfo, NodeStatus, ResultBroadcastTx, ResultBroadcastTxCommit, SyncInfo, TxResult};
use crate::chain::tx_builder::{SignedTx, TxBuilder};
use crate::chain::wallet::{KeyPair, DEFAULT_HD_PATH};
use crate::chain::NodeClient;
use crate::error::{Result, WalletError};

const BASE_ACCOUNT_TYPE_URL: &str = "/cosmos.auth.v1beta1.BaseAccount";

#[derive(Debug, Default)]
struct MockState {
    chain_id: String,
    height: i64,
    account: Option<BaseAccount>,
    raw_account: Option<Any>,
    gas_used: u64,
    simulation_error: Option<String>,
    offline: bool,
    sync_responses: VecDeque<ResultBroadcastTx>,
    commit_responses: VecDeque<(TxResult, TxResult)>,
    calls: Vec<String>,
    simulated: Vec<Vec<u8>>,
    broadcast: Vec<Vec<u8>>,
}

#[derive(Debug, Clone, Default)]
pub struct MockNode {
    state: Arc<Mutex<MockState>>,
}

impl MockNode {
    pub fn new(chain_id: &str) -> Self {
        let node = Self::default();
        {
            let mut state = node.state.lock().unwrap();
            state.chain_id = chain_id.to_string();
            state.height = 1;
            state.gas_used = 50_000;
        }
        node
    }

    pub fn set_account(&self, address: &str, account_number: u64, sequence: u64) {
        self.state.lock().unwrap().account = Some(BaseAccount {
            address: address.to_string(),
            pub_key: None,
            account_number,
            sequence,
        });
    }

    /// Returned for every address instead of the base account
    pub fn set_raw_account(&self, any: Any) {
        self.state.lock().unwrap().raw_account = Some(any);
    }

    pub fn sequence(&self) -> Option<u64> {
        self.state.lock().unwrap().account.as_ref().map(|a| a.sequence)
    }

    pub fn set_gas_used(&self, gas_used: u64) {
        self.state.lock().unwrap().gas_used = gas_used;
    }

    pub fn fail_simulation(&self, message: &str) {
        self.state.lock().unwrap().simulation_error = Some(message.to_string());
    }

    /// Every call fails as if the node were unreachable
    pub fn set_offline(&self, offline: bool) {
        self.state.lock().unwrap().offline = offline;
    }

    pub fn push_sync_response(&self, response: ResultBroadcastTx) {
        self.state.lock().unwrap().sync_responses.push_back(response);
    }

    pub fn push_commit_response(&self, check_tx: TxResult, deliver_tx: TxResult) {
        self.state
            .lock()
            .unwrap()
            .commit_responses
            .push_back((check_tx, deliver_tx));
    }

    /// Names of the node methods called so far, in order
    pub fn calls(&self) -> Vec<String> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn simulated_txs(&self) -> Vec<SignedTx> {
        decode_all(&self.state.lock().unwrap().simulated)
    }

    pub fn broadcast_txs(&self) -> Vec<SignedTx> {
        decode_all(&self.state.lock().unwrap().broadcast)
    }

    fn record(&self, call: &str) -> Result<std::sync::MutexGuard<'_, MockState>> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call.to_string());
        if state.offline {
            return Err(WalletError::Connectivity(format!("{}: connection refused", call)));
        }
        Ok(state)
    }
}

#[async_trait]
impl NodeClient for MockNode {
    async fn status(&self) -> Result<NodeStatus> {
        let state = self.record("status")?;
        Ok(NodeStatus {
            node_info: NodeInfo {
                network: state.chain_id.clone(),
                moniker: "mock".to_string(),
                version: "0.37.2".to_string(),
            },
            sync_info: SyncInfo {
                latest_block_height: state.height,
                catching_up: false,
            },
        })
    }

    async fn account(&self, address: &str) -> Result<Any> {
        let state = self.record("account")?;
        if let Some(raw) = &state.raw_account {
            return Ok(raw.clone());
        }

        match &state.account {
            Some(account) if account.address == address => Ok(Any {
                type_url: BASE_ACCOUNT_TYPE_URL.to_string(),
                value: account.encode_to_vec(),
            }),
            _ => Err(WalletError::NotFound(format!("account {} not found", address))),
        }
    }

    async fn simulate(&self, tx_bytes: &[u8]) -> Result<GasInfo> {
        let mut state = self.record("simulate")?;
        state.simulated.push(tx_bytes.to_vec());

        if let Some(message) = &state.simulation_error {
            return Err(WalletError::Simulation(message.clone()));
        }

        let tx = SignedTx::from_bytes(tx_bytes)?;
        Ok(GasInfo {
            gas_wanted: tx.gas_limit(),
            gas_used: state.gas_used,
        })
    }

    async fn broadcast_tx_async(&self, tx_bytes: &[u8]) -> Result<ResultBroadcastTx> {
        let mut state = self.record("broadcast_tx_async")?;
        state.broadcast.push(tx_bytes.to_vec());
        Ok(ResultBroadcastTx {
            hash: hash(tx_bytes),
            ..Default::default()
        })
    }

    async fn broadcast_tx_sync(&self, tx_bytes: &[u8]) -> Result<ResultBroadcastTx> {
        let mut state = self.record("broadcast_tx_sync")?;
        state.broadcast.push(tx_bytes.to_vec());

        let mut response = state.sync_responses.pop_front().unwrap_or_else(|| ResultBroadcastTx {
            log: "[]".to_string(),
            ..Default::default()
        });
        response.hash = hash(tx_bytes);
        Ok(response)
    }

    async fn broadcast_tx_commit(&self, tx_bytes: &[u8]) -> Result<ResultBroadcastTxCommit> {
        let mut state = self.record("broadcast_tx_commit")?;
        state.broadcast.push(tx_bytes.to_vec());

        let tx = SignedTx::from_bytes(tx_bytes)?;
        let scripted = state.commit_responses.pop_front();
        let (check_tx, deliver_tx) = match scripted {
            Some(scripted) => scripted,
            None => execute(&state, &tx),
        };

        let committed = check_tx.is_ok() && deliver_tx.is_ok();
        if committed {
            state.height += 1;
        }
        if check_tx.is_ok() {
            if let Some(account) = state.account.as_mut() {
                account.sequence += 1;
            }
        }

        Ok(ResultBroadcastTxCommit {
            height: if check_tx.is_ok() { state.height } else { 0 },
            check_tx,
            deliver_tx,
            hash: hash(tx_bytes),
        })
    }
}

/// Accept the transaction when it carries the account's current sequence
fn execute(state: &MockState, tx: &SignedTx) -> (TxResult, TxResult) {
    let expected = state.account.as_ref().map(|a| a.sequence).unwrap_or_default();
    let got = tx.sequence().unwrap_or_default();

    if expected != got {
        let check_tx = TxResult {
            code: 32,
            codespace: "sdk".to_string(),
            log: format!(
                "account sequence mismatch, expected {}, got {}: incorrect account sequence",
                expected, got
            ),
            gas_wanted: tx.gas_limit() as i64,
            ..Default::default()
        };
        return (check_tx, TxResult::default());
    }

    let check_tx = TxResult {
        gas_wanted: tx.gas_limit() as i64,
        gas_used: 30_000,
        ..Default::default()
    };
    let deliver_tx = TxResult {
        log: r#"[{"msg_index":0,"log":"","events":[{"type":"message","attributes":[{"key":"action","value":"/cosmos.bank.v1beta1.MsgSend"}]}]}]"#.to_string(),
        gas_wanted: tx.gas_limit() as i64,
        gas_used: state.gas_used as i64,
        ..Default::default()
    };
    (check_tx, deliver_tx)
}

fn hash(tx_bytes: &[u8]) -> String {
    use sha2::{Digest, Sha256};
    hex::encode_upper(Sha256::digest(tx_bytes))
}

fn decode_all(txs: &[Vec<u8>]) -> Vec<SignedTx> {
    txs.iter()
        .map(|bytes| SignedTx::from_bytes(bytes).unwrap())
        .collect()
}

/// A signed transaction with no particular meaning
pub fn dummy_tx() -> SignedTx {
    let keys = KeyPair::derive(
        "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about",
        "",
        DEFAULT_HD_PATH,
    )
    .unwrap();
    let msg = Any {
        type_url: "/cosmos.bank.v1beta1.MsgSend".to_string(),
        value: vec![],
    };

    TxBuilder::new(&keys, vec![msg], "")
        .with_gas_limit(100_000)
        .with_fee(vec![Coin {
            denom: "udaric".to_string(),
            amount: "1000".to_string(),
        }])
        .sign("test", 0)
        .unwrap()
}
