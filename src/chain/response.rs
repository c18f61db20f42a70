//! Broadcast modes and the normalized result every mode returns

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::chain::rpc::{Event, ResultBroadcastTx, ResultBroadcastTxCommit, TxResult};
use crate::error::WalletError;

/// How long a broadcast waits for the node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BroadcastMode {
    /// Return as soon as the node received the bytes
    Async,
    /// Return after CheckTx
    #[default]
    Sync,
    /// Return after the transaction was included in a block
    Commit,
}

impl FromStr for BroadcastMode {
    type Err = WalletError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "async" => Ok(BroadcastMode::Async),
            "sync" => Ok(BroadcastMode::Sync),
            "commit" | "block" => Ok(BroadcastMode::Commit),
            other => Err(WalletError::Validation(format!(
                "unknown broadcast mode {}, expected async, sync or commit",
                other
            ))),
        }
    }
}

impl fmt::Display for BroadcastMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BroadcastMode::Async => "async",
            BroadcastMode::Sync => "sync",
            BroadcastMode::Commit => "commit",
        };
        write!(f, "{}", s)
    }
}

/// Which node phase the result fields come from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResultStage {
    /// Async broadcast: nothing was checked yet
    #[default]
    Submitted,
    /// Mempool admission (sync broadcast, or a commit rejected before execution)
    CheckTx,
    /// Block execution (commit broadcast that passed CheckTx)
    DeliverTx,
}

/// One entry of the JSON array found in `raw_log` on success
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct AbciMessageLog {
    #[serde(default)]
    pub msg_index: u32,
    #[serde(default)]
    pub log: String,
    #[serde(default)]
    pub events: Vec<Event>,
}

/// Broadcast outcome, the same shape for every mode
///
/// A nonzero `code` means the node rejected or failed the transaction. That is
/// still a successful broadcast call; inspect `code`, `codespace` and
/// `raw_log` to find out why.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BroadcastResult {
    pub height: i64,
    pub tx_hash: String,
    pub codespace: String,
    pub code: u32,
    /// Result data as upper-case hex
    pub data: String,
    pub raw_log: String,
    pub logs: Vec<AbciMessageLog>,
    pub info: String,
    pub gas_wanted: i64,
    pub gas_used: i64,
    pub events: Vec<Event>,
    pub stage: ResultStage,
}

impl BroadcastResult {
    pub fn is_success(&self) -> bool {
        self.code == 0
    }

    /// Rejected before execution; the sequence was not consumed
    pub fn is_check_tx_failure(&self) -> bool {
        self.code != 0 && self.stage == ResultStage::CheckTx
    }

    /// Values of every event attribute named `key` under events of `kind`
    pub fn attribute_values<'a>(&'a self, kind: &'a str, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.events
            .iter()
            .chain(self.logs.iter().flat_map(|log| log.events.iter()))
            .filter(move |event| event.kind == kind)
            .flat_map(|event| event.attributes.iter())
            .filter(move |attr| attr.key == key)
            .filter_map(|attr| attr.value.as_deref())
    }

    /// Result of an async or sync broadcast
    pub fn from_broadcast_tx(res: ResultBroadcastTx, stage: ResultStage) -> Self {
        Self {
            tx_hash: res.hash,
            codespace: res.codespace,
            code: res.code,
            data: hex::encode_upper(&res.data),
            logs: parse_abci_logs(&res.log),
            raw_log: res.log,
            stage,
            ..Default::default()
        }
    }

    /// Result of a commit broadcast. A failed CheckTx means the transaction
    /// never executed, so only the CheckTx fields are reported.
    pub fn from_broadcast_tx_commit(res: ResultBroadcastTxCommit) -> Self {
        let (section, stage) = if !res.check_tx.is_ok() {
            (res.check_tx, ResultStage::CheckTx)
        } else {
            (res.deliver_tx, ResultStage::DeliverTx)
        };

        let height = match stage {
            ResultStage::DeliverTx => res.height,
            _ => 0,
        };

        Self::from_tx_result(section, res.hash, height, stage)
    }

    fn from_tx_result(section: TxResult, tx_hash: String, height: i64, stage: ResultStage) -> Self {
        Self {
            height,
            tx_hash,
            codespace: section.codespace,
            code: section.code,
            data: hex::encode_upper(&section.data),
            logs: parse_abci_logs(&section.log),
            raw_log: section.log,
            info: section.info,
            gas_wanted: section.gas_wanted,
            gas_used: section.gas_used,
            events: section.events,
            stage,
        }
    }
}

/// Parse the structured logs of a successful transaction. Failed transactions
/// carry a plain text log, which yields an empty list.
pub fn parse_abci_logs(raw_log: &str) -> Vec<AbciMessageLog> {
    serde_json::from_str(raw_log).unwrap_or_default()
}
