// Library exports for cosmos_wallet

pub mod chain;
pub mod config;
pub mod error;
pub mod wallet;

// Re-export main types for convenience
pub use chain::{BroadcastMode, BroadcastResult, ChainClient, SignedTx, TransactionRequest};
pub use config::{AccountConfig, ChainConfig, Config};
pub use error::{Result, WalletError};
pub use wallet::Wallet;
