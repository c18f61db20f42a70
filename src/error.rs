use thiserror::Error;

pub type Result<T> = std::result::Result<T, WalletError>;

/// Errors returned by the wallet, the chain client and the key material.
///
/// A node rejecting a transaction is not an error: it is reported through a
/// nonzero `code` inside [`crate::chain::BroadcastResult`].
#[derive(Debug, Error)]
pub enum WalletError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("invalid mnemonic: {0}")]
    InvalidMnemonic(String),

    #[error("connectivity error: {0}")]
    Connectivity(String),

    #[error("not found: {0}")]
    NotFound(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("simulation failed: {0}")]
    Simulation(String),

    #[error("signing error: {0}")]
    Signing(String),

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("{context}: {source}")]
    Context {
        context: String,
        #[source]
        source: Box<WalletError>,
    },
}

impl WalletError {
    /// Wrap this error with one line describing the operation that failed.
    pub fn context(self, context: impl Into<String>) -> Self {
        WalletError::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The innermost error, skipping every context layer.
    pub fn root(&self) -> &WalletError {
        match self {
            WalletError::Context { source, .. } => source.root(),
            other => other,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self.root(), WalletError::NotFound(_))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self.root(), WalletError::Validation(_))
    }

    pub fn is_connectivity(&self) -> bool {
        matches!(self.root(), WalletError::Connectivity(_))
    }

    pub fn is_simulation(&self) -> bool {
        matches!(self.root(), WalletError::Simulation(_))
    }
}

/// Adds call-site context to fallible wallet operations.
pub trait ResultExt<T> {
    fn context(self, context: &str) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: &str) -> Result<T> {
        self.map_err(|e| e.context(context))
    }
}

impl From<prost::EncodeError> for WalletError {
    fn from(e: prost::EncodeError) -> Self {
        WalletError::Encoding(e.to_string())
    }
}

impl From<prost::DecodeError> for WalletError {
    fn from(e: prost::DecodeError) -> Self {
        WalletError::Encoding(e.to_string())
    }
}
