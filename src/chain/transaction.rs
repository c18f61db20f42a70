//! Transaction request: what the caller wants to put on chain
//!
//! Gas and fee are only resolved when the request is built against live chain
//! state, so construction performs no validation besides taking a message.

use crate::chain::proto::{Any, Coin};

/// How the gas limit of a transaction is chosen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GasSetting {
    /// Nothing requested; the builder rejects it
    #[default]
    Unset,
    /// Explicit gas limit
    Limit(u64),
    /// Simulate the transaction and use the adjusted gas used
    Auto,
}

/// How the fee of a transaction is chosen
#[derive(Debug, Clone, PartialEq, Default)]
pub enum FeeSetting {
    /// Nothing requested; computed from the gas price like `Auto`
    #[default]
    Unset,
    /// Explicit fee coins
    Amount(Vec<Coin>),
    /// Resolved gas times the configured gas price
    Auto,
}

#[derive(Debug, Clone, Default)]
pub struct TransactionRequest {
    pub messages: Vec<Any>,
    pub memo: String,
    pub gas: GasSetting,
    pub fee: FeeSetting,
    pub fee_granter: Option<String>,
    pub sequence: Option<u64>,
}

impl TransactionRequest {
    /// Create a request carrying at least one message
    pub fn new(msg: impl Into<Any>) -> Self {
        Self {
            messages: vec![msg.into()],
            ..Default::default()
        }
    }

    /// Create a request from a list of messages. An empty list is accepted
    /// here and rejected when the transaction is built.
    pub fn from_messages(messages: Vec<Any>) -> Self {
        Self {
            messages,
            ..Default::default()
        }
    }

    pub fn with_message(mut self, msg: impl Into<Any>) -> Self {
        self.messages.push(msg.into());
        self
    }

    pub fn with_memo(mut self, memo: impl Into<String>) -> Self {
        self.memo = memo.into();
        self
    }

    /// Use an explicit gas limit. Ignored when auto gas is also requested.
    pub fn with_gas_limit(mut self, limit: u64) -> Self {
        if self.gas != GasSetting::Auto {
            self.gas = GasSetting::Limit(limit);
        }
        self
    }

    /// Estimate gas by simulating the transaction
    pub fn with_gas_auto(mut self) -> Self {
        self.gas = GasSetting::Auto;
        self
    }

    pub fn with_fee_amount(mut self, amount: Vec<Coin>) -> Self {
        self.fee = FeeSetting::Amount(amount);
        self
    }

    /// Compute the fee from the resolved gas and the configured gas price
    pub fn with_fee_auto(mut self) -> Self {
        self.fee = FeeSetting::Auto;
        self
    }

    /// Let `granter` pay the fees. A fee grant from the granter to the signer
    /// must exist on chain.
    pub fn with_fee_granter(mut self, granter: impl Into<String>) -> Self {
        self.fee_granter = Some(granter.into());
        self
    }

    /// Sign with this sequence instead of the one read from chain. Lets a
    /// caller pipeline transactions before the first one is included.
    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = Some(sequence);
        self
    }
}
