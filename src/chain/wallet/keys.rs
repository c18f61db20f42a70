use bip32::{DerivationPath, XPrv};
use bip39::Mnemonic;
use prost::Message;
use secp256k1::{PublicKey, Secp256k1, SecretKey};
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::chain::address;
use crate::chain::proto::{Any, Secp256k1PubKey, SECP256K1_PUBKEY_TYPE_URL};
use crate::chain::wallet::TransactionSigner;
use crate::error::{Result, WalletError};

/// Default Cosmos Hub derivation path
pub const DEFAULT_HD_PATH: &str = "m/44'/118'/0'/0/0";

/// secp256k1 key pair derived from a BIP39 mnemonic
/// Private key bytes are zeroized on drop
#[derive(Zeroize, ZeroizeOnDrop)]
pub struct KeyPair {
    private_key_bytes: [u8; 32],
    #[zeroize(skip)] // Public data doesn't need zeroizing
    public_key_bytes: [u8; 33],
    #[zeroize(skip)]
    signer: TransactionSigner,
}

impl KeyPair {
    /// Derive the key pair for `hd_path` from a mnemonic and optional passphrase
    pub fn derive(mnemonic_str: &str, passphrase: &str, hd_path: &str) -> Result<Self> {
        let mnemonic = Mnemonic::parse(mnemonic_str)
            .map_err(|e| WalletError::InvalidMnemonic(e.to_string()))?;

        let path: DerivationPath = hd_path
            .parse()
            .map_err(|e: bip32::Error| {
                WalletError::InvalidMnemonic(format!("invalid derivation path {}: {}", hd_path, e))
            })?;

        let mut seed = mnemonic.to_seed(passphrase);
        let derived = XPrv::derive_from_path(&seed, &path);
        seed.zeroize();

        let xprv = derived
            .map_err(|e| WalletError::InvalidMnemonic(format!("failed to derive key: {}", e)))?;

        Self::from_private_key(xprv.to_bytes())
    }

    /// Build a key pair from raw private key bytes
    pub fn from_private_key(mut private_key: [u8; 32]) -> Result<Self> {
        let secret_key = SecretKey::from_slice(&private_key)
            .map_err(|e| WalletError::Signing(format!("invalid private key: {}", e)));

        let secret_key = match secret_key {
            Ok(key) => key,
            Err(e) => {
                private_key.zeroize();
                return Err(e);
            }
        };

        let secp = Secp256k1::new();
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);

        let key_pair = Self {
            private_key_bytes: private_key,
            public_key_bytes: public_key.serialize(),
            signer: TransactionSigner::new(),
        };
        private_key.zeroize();

        Ok(key_pair)
    }

    /// Compressed public key (33 bytes)
    pub fn public_key_bytes(&self) -> [u8; 33] {
        self.public_key_bytes
    }

    /// Public key wrapped the way it appears in a transaction's SignerInfo
    pub fn public_key_any(&self) -> Any {
        Any {
            type_url: SECP256K1_PUBKEY_TYPE_URL.to_string(),
            value: Secp256k1PubKey {
                key: self.public_key_bytes.to_vec(),
            }
            .encode_to_vec(),
        }
    }

    /// Raw 20 byte account address
    pub fn address_bytes(&self) -> [u8; 20] {
        address::account_address_bytes(&self.public_key_bytes)
    }

    /// Bech32 account address under `prefix`
    pub fn address(&self, prefix: &str) -> Result<String> {
        address::encode(prefix, &self.address_bytes())
    }

    /// Sign `bytes` (sha256 + secp256k1 ECDSA), returning the 64 byte compact signature
    pub fn sign(&self, bytes: &[u8]) -> Result<Vec<u8>> {
        let secret_key = SecretKey::from_slice(&self.private_key_bytes)
            .map_err(|e| WalletError::Signing(format!("invalid private key: {}", e)))?;
        self.signer.sign_bytes(bytes, &secret_key)
    }
}

impl std::fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &hex::encode(self.public_key_bytes))
            .finish_non_exhaustive()
    }
}
