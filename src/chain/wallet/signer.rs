use secp256k1::ecdsa::Signature;
use secp256k1::{Message, PublicKey, Secp256k1, SecretKey};
use sha2::{Digest, Sha256};

use crate::error::{Result, WalletError};

/// Transaction signer for Cosmos SDK chains
/// Produces 64 byte compact secp256k1 signatures over sha256 digests
pub struct TransactionSigner {
    secp: Secp256k1<secp256k1::All>,
}

impl TransactionSigner {
    pub fn new() -> Self {
        Self {
            secp: Secp256k1::new(),
        }
    }

    /// Hash `bytes` with sha256 and sign the digest
    /// RFC 6979 nonces make the signature deterministic; libsecp256k1 always
    /// returns the low-S form the chain requires
    pub fn sign_bytes(&self, bytes: &[u8], private_key: &SecretKey) -> Result<Vec<u8>> {
        let digest: [u8; 32] = Sha256::digest(bytes).into();
        let message = Message::from_digest_slice(&digest)
            .map_err(|e| WalletError::Signing(format!("invalid message digest: {}", e)))?;

        let signature = self.secp.sign_ecdsa(&message, private_key);
        Ok(signature.serialize_compact().to_vec())
    }

    /// Check a compact signature produced by [`TransactionSigner::sign_bytes`]
    pub fn verify_bytes(&self, bytes: &[u8], signature: &[u8], public_key: &[u8]) -> Result<bool> {
        let digest: [u8; 32] = Sha256::digest(bytes).into();
        let message = Message::from_digest_slice(&digest)
            .map_err(|e| WalletError::Signing(format!("invalid message digest: {}", e)))?;
        let signature = Signature::from_compact(signature)
            .map_err(|e| WalletError::Signing(format!("invalid signature: {}", e)))?;
        let public_key = PublicKey::from_slice(public_key)
            .map_err(|e| WalletError::Signing(format!("invalid public key: {}", e)))?;

        Ok(self.secp.verify_ecdsa(&message, &signature, &public_key).is_ok())
    }
}

impl Default for TransactionSigner {
    fn default() -> Self {
        Self::new()
    }
}
