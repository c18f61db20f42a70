mod keys;
mod signer;

pub use keys::{KeyPair, DEFAULT_HD_PATH};
pub use signer::TransactionSigner;
