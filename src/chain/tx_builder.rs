//! Transaction envelope assembly and SIGN_MODE_DIRECT signing

use prost::Message;
use sha2::{Digest, Sha256};

use crate::chain::proto::{
    mode_info, Any, AuthInfo, Coin, Fee, ModeInfo, SignDoc, SignMode, SignerInfo, TxBody, TxRaw,
    SECP256K1_PUBKEY_TYPE_URL,
};
use crate::chain::wallet::KeyPair;
use crate::error::{Result, WalletError};

/// Encoded transaction plus the decoded parts it was built from
#[derive(Debug, Clone, PartialEq)]
pub struct SignedTx {
    body: TxBody,
    auth_info: AuthInfo,
    raw: TxRaw,
}

impl SignedTx {
    fn new(body: TxBody, auth_info: AuthInfo, signature: Vec<u8>) -> Self {
        let raw = TxRaw {
            body_bytes: body.encode_to_vec(),
            auth_info_bytes: auth_info.encode_to_vec(),
            signatures: vec![signature],
        };
        Self { body, auth_info, raw }
    }

    /// Decode a TxRaw as it goes over the wire
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let raw = TxRaw::decode(bytes)?;
        let body = TxBody::decode(raw.body_bytes.as_slice())?;
        let auth_info = AuthInfo::decode(raw.auth_info_bytes.as_slice())?;
        Ok(Self { body, auth_info, raw })
    }

    pub fn body(&self) -> &TxBody {
        &self.body
    }

    pub fn auth_info(&self) -> &AuthInfo {
        &self.auth_info
    }

    pub fn raw(&self) -> &TxRaw {
        &self.raw
    }

    pub fn messages(&self) -> &[Any] {
        &self.body.messages
    }

    pub fn memo(&self) -> &str {
        &self.body.memo
    }

    pub fn gas_limit(&self) -> u64 {
        self.auth_info.fee.as_ref().map(|fee| fee.gas_limit).unwrap_or_default()
    }

    pub fn fee(&self) -> &[Coin] {
        self.auth_info.fee.as_ref().map(|fee| fee.amount.as_slice()).unwrap_or_default()
    }

    pub fn fee_granter(&self) -> &str {
        self.auth_info.fee.as_ref().map(|fee| fee.granter.as_str()).unwrap_or_default()
    }

    /// Sequence of the single signer
    pub fn sequence(&self) -> Option<u64> {
        self.auth_info.signer_infos.first().map(|info| info.sequence)
    }

    pub fn signatures(&self) -> &[Vec<u8>] {
        &self.raw.signatures
    }

    /// Wire encoding of the TxRaw
    pub fn to_bytes(&self) -> Vec<u8> {
        self.raw.encode_to_vec()
    }

    /// Upper-case hex sha256 of the wire encoding, as Tendermint reports it
    pub fn tx_hash(&self) -> String {
        hex::encode_upper(Sha256::digest(self.to_bytes()))
    }
}

/// Builds the unsigned parts of a transaction for one signer
#[derive(Clone)]
pub struct TxBuilder<'a> {
    keys: &'a KeyPair,
    body: TxBody,
    sequence: u64,
    gas_limit: u64,
    fee: Vec<Coin>,
    fee_granter: String,
}

impl<'a> TxBuilder<'a> {
    pub fn new(keys: &'a KeyPair, messages: Vec<Any>, memo: impl Into<String>) -> Self {
        Self {
            keys,
            body: TxBody {
                messages,
                memo: memo.into(),
                ..Default::default()
            },
            sequence: 0,
            gas_limit: 0,
            fee: vec![],
            fee_granter: String::new(),
        }
    }

    pub fn with_sequence(mut self, sequence: u64) -> Self {
        self.sequence = sequence;
        self
    }

    pub fn with_gas_limit(mut self, gas_limit: u64) -> Self {
        self.gas_limit = gas_limit;
        self
    }

    pub fn with_fee(mut self, fee: Vec<Coin>) -> Self {
        self.fee = fee;
        self
    }

    pub fn with_fee_granter(mut self, granter: impl Into<String>) -> Self {
        self.fee_granter = granter.into();
        self
    }

    /// Envelope for gas estimation: the signer is described by an empty public
    /// key of the right type and the signature is empty. The node skips
    /// signature checks in simulation mode, so nothing is signed.
    pub fn build_simulation_tx(&self) -> SignedTx {
        let placeholder_key = Any {
            type_url: SECP256K1_PUBKEY_TYPE_URL.to_string(),
            value: vec![],
        };
        SignedTx::new(self.body.clone(), self.auth_info(placeholder_key), vec![])
    }

    /// Sign the transaction for `chain_id` and `account_number`
    pub fn sign(&self, chain_id: &str, account_number: u64) -> Result<SignedTx> {
        if chain_id.is_empty() {
            return Err(WalletError::Signing("chain id must not be empty".to_string()));
        }

        let auth_info = self.auth_info(self.keys.public_key_any());

        let sign_doc = SignDoc {
            body_bytes: self.body.encode_to_vec(),
            auth_info_bytes: auth_info.encode_to_vec(),
            chain_id: chain_id.to_string(),
            account_number,
        };

        let signature = self.keys.sign(&sign_doc.encode_to_vec())?;

        log::debug!(
            "Signed transaction for chain {} (account {}, sequence {})",
            chain_id,
            account_number,
            self.sequence
        );

        Ok(SignedTx::new(self.body.clone(), auth_info, signature))
    }

    fn auth_info(&self, public_key: Any) -> AuthInfo {
        let signer_info = SignerInfo {
            public_key: Some(public_key),
            mode_info: Some(ModeInfo {
                sum: Some(mode_info::Sum::Single(mode_info::Single {
                    mode: SignMode::Direct as i32,
                })),
            }),
            sequence: self.sequence,
        };

        AuthInfo {
            signer_infos: vec![signer_info],
            fee: Some(Fee {
                amount: self.fee.clone(),
                gas_limit: self.gas_limit,
                payer: String::new(),
                granter: self.fee_granter.clone(),
            }),
            ..Default::default()
        }
    }
}

/// Bytes a signature over `tx` commits to
pub fn sign_doc_bytes(tx: &SignedTx, chain_id: &str, account_number: u64) -> Vec<u8> {
    SignDoc {
        body_bytes: tx.raw.body_bytes.clone(),
        auth_info_bytes: tx.raw.auth_info_bytes.clone(),
        chain_id: chain_id.to_string(),
        account_number,
    }
    .encode_to_vec()
}
