pub mod account_types;
pub mod address;
pub mod client;
pub mod coin;
pub mod messages;
pub mod node;
pub mod proto;
pub mod response;
pub mod rpc;
pub mod transaction;
pub mod tx_builder;
pub mod wallet;

#[cfg(test)]
pub(crate) mod mock;

pub use account_types::{Account, AccountInfo};
pub use client::ChainClient;
pub use coin::GasPrice;
pub use messages::{MessageBuilder, SendMsg};
pub use node::{NodeClient, RemoteNode};
pub use proto::{Any, Coin};
pub use response::{AbciMessageLog, BroadcastMode, BroadcastResult, ResultStage};
pub use transaction::{FeeSetting, GasSetting, TransactionRequest};
pub use tx_builder::SignedTx;
pub use wallet::{KeyPair, TransactionSigner};
