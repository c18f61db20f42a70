//! Bech32 account address codec.
//!
//! The human-readable prefix is always an explicit argument. Nothing here
//! remembers a prefix between calls, so one process can serve several
//! chains with the same key.

use bech32::{Bech32, Hrp};
use ripemd::Ripemd160;
use sha2::{Digest, Sha256};

use crate::error::{Result, WalletError};

/// Maximum address length accepted by the Cosmos SDK address verifier.
const MAX_ADDR_LEN: usize = 255;

/// Hash a compressed secp256k1 public key into the 20 byte account address:
/// ripemd160(sha256(pubkey))
pub fn account_address_bytes(public_key: &[u8]) -> [u8; 20] {
    let sha = Sha256::digest(public_key);
    let ripemd = Ripemd160::digest(sha);
    let mut bytes = [0u8; 20];
    bytes.copy_from_slice(&ripemd);
    bytes
}

/// Encode raw address bytes under the given prefix.
pub fn encode(prefix: &str, bytes: &[u8]) -> Result<String> {
    let hrp = Hrp::parse(prefix)
        .map_err(|e| WalletError::Validation(format!("invalid bech32 prefix {}: {}", prefix, e)))?;
    bech32::encode::<Bech32>(hrp, bytes)
        .map_err(|e| WalletError::Encoding(format!("failed to encode bech32 address: {}", e)))
}

/// Decode an address and check that it was encoded under `expected_prefix`.
pub fn decode(address: &str, expected_prefix: &str) -> Result<Vec<u8>> {
    if address.trim().is_empty() {
        return Err(WalletError::Validation(
            "empty address string is not allowed".to_string(),
        ));
    }

    let (hrp, bytes) = bech32::decode(address)
        .map_err(|e| WalletError::Validation(format!("invalid address {}: {}", address, e)))?;

    let prefix = hrp.to_string().to_lowercase();
    if prefix != expected_prefix {
        return Err(WalletError::Validation(format!(
            "invalid bech32 prefix: expected {}, got {}",
            expected_prefix, prefix
        )));
    }

    verify_address_format(&bytes)?;
    Ok(bytes)
}

fn verify_address_format(bytes: &[u8]) -> Result<()> {
    if bytes.is_empty() {
        return Err(WalletError::Validation("addresses cannot be empty".to_string()));
    }
    if bytes.len() > MAX_ADDR_LEN {
        return Err(WalletError::Validation(format!(
            "address max length is {}, got {}",
            MAX_ADDR_LEN,
            bytes.len()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const RECEIVER: &str = "desmos1q62k9kvjy7v2wh0yt9jqaepnzezz3s49j9gnpk";

    #[test]
    fn test_round_trip() {
        let bytes = decode(RECEIVER, "desmos").unwrap();
        assert_eq!(bytes.len(), 20);
        assert_eq!(encode("desmos", &bytes).unwrap(), RECEIVER);
    }

    #[test]
    fn test_same_bytes_different_prefix() {
        let bytes = decode(RECEIVER, "desmos").unwrap();
        let cosmos = encode("cosmos", &bytes).unwrap();

        assert!(cosmos.starts_with("cosmos1"));
        assert_eq!(decode(&cosmos, "cosmos").unwrap(), bytes);
    }

    #[test]
    fn test_prefix_mismatch() {
        let err = decode(RECEIVER, "cosmos").unwrap_err();
        assert!(err.is_validation());
        assert!(err.to_string().contains("expected cosmos, got desmos"));
    }

    #[test]
    fn test_invalid_addresses() {
        assert!(decode("", "desmos").unwrap_err().is_validation());
        assert!(decode("   ", "desmos").unwrap_err().is_validation());
        // Last character changed, checksum no longer matches
        assert!(decode("desmos1q62k9kvjy7v2wh0yt9jqaepnzezz3s49j9gnpq", "desmos")
            .unwrap_err()
            .is_validation());
        assert!(decode("not an address", "desmos").unwrap_err().is_validation());
    }

    #[test]
    fn test_account_address_bytes() {
        // Public key for "abandon ... about" at m/44'/118'/0'/0/0
        let pubkey = hex::decode("024f4e2ad99c34d60b9ba6283c9431a8418af8673212961f97a77b6377fcd05b62").unwrap();
        let bytes = account_address_bytes(&pubkey);
        assert_eq!(
            encode("cosmos", &bytes).unwrap(),
            "cosmos19rl4cm2hmr8afy4kldpxz3fka4jguq0auqdal4"
        );
    }
}
