//! Polymorphic account decoding for Cosmos SDK auth queries
//!
//! The auth module returns the account wrapped in a google.protobuf.Any whose
//! concrete type depends on the account kind. Every supported kind embeds a
//! BaseAccount somewhere; that is all the transaction builder needs.

use prost::Message;

use crate::chain::proto::{
    Any, BaseAccount, BaseVestingAccount, ContinuousVestingAccount, DelayedVestingAccount,
    ModuleAccount, PeriodicVestingAccount, PermanentLockedAccount,
};
use crate::error::{Result, WalletError};

/// Every account type the auth query can hand back
#[derive(Debug, Clone)]
pub enum Account {
    Base(BaseAccount),
    Module(ModuleAccount),
    BaseVesting(BaseVestingAccount),
    ContinuousVesting(ContinuousVestingAccount),
    DelayedVesting(DelayedVestingAccount),
    PeriodicVesting(PeriodicVestingAccount),
    PermanentLocked(PermanentLockedAccount),
    // Kept so callers can see what the node returned
    Unsupported {
        type_url: String,
        raw_value: Vec<u8>,
    },
}

/// Account number and sequence of one address, as the chain reports them
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountInfo {
    pub address: String,
    pub account_number: u64,
    pub sequence: u64,
}

impl From<&BaseAccount> for AccountInfo {
    fn from(base: &BaseAccount) -> Self {
        Self {
            address: base.address.clone(),
            account_number: base.account_number,
            sequence: base.sequence,
        }
    }
}

impl Account {
    /// Decode the Any wrapper returned by `cosmos.auth.v1beta1.Query/Account`
    pub fn decode_any(any: &Any) -> Result<Self> {
        let value = any.value.as_slice();
        let account = match any.type_url.as_str() {
            "/cosmos.auth.v1beta1.BaseAccount" => Account::Base(BaseAccount::decode(value)?),
            "/cosmos.auth.v1beta1.ModuleAccount" => Account::Module(ModuleAccount::decode(value)?),
            "/cosmos.vesting.v1beta1.BaseVestingAccount" => {
                Account::BaseVesting(BaseVestingAccount::decode(value)?)
            }
            "/cosmos.vesting.v1beta1.ContinuousVestingAccount" => {
                Account::ContinuousVesting(ContinuousVestingAccount::decode(value)?)
            }
            "/cosmos.vesting.v1beta1.DelayedVestingAccount" => {
                Account::DelayedVesting(DelayedVestingAccount::decode(value)?)
            }
            "/cosmos.vesting.v1beta1.PeriodicVestingAccount" => {
                Account::PeriodicVesting(PeriodicVestingAccount::decode(value)?)
            }
            "/cosmos.vesting.v1beta1.PermanentLockedAccount" => {
                Account::PermanentLocked(PermanentLockedAccount::decode(value)?)
            }
            unsupported_type => {
                log::warn!("Encountered unsupported account type: {}", unsupported_type);
                Account::Unsupported {
                    type_url: unsupported_type.to_string(),
                    raw_value: any.value.clone(),
                }
            }
        };

        Ok(account)
    }

    /// The embedded BaseAccount, if this account type has one
    pub fn base_account(&self) -> Option<&BaseAccount> {
        match self {
            Account::Base(acc) => Some(acc),
            Account::Module(acc) => acc.base_account.as_ref(),
            Account::BaseVesting(acc) => acc.base_account.as_ref(),
            Account::ContinuousVesting(acc) => acc
                .base_vesting_account
                .as_ref()
                .and_then(|bva| bva.base_account.as_ref()),
            Account::DelayedVesting(acc) => acc
                .base_vesting_account
                .as_ref()
                .and_then(|bva| bva.base_account.as_ref()),
            Account::PeriodicVesting(acc) => acc
                .base_vesting_account
                .as_ref()
                .and_then(|bva| bva.base_account.as_ref()),
            Account::PermanentLocked(acc) => acc
                .base_vesting_account
                .as_ref()
                .and_then(|bva| bva.base_account.as_ref()),
            Account::Unsupported { .. } => None,
        }
    }

    /// Account number and sequence, or an error when the type carries none.
    ///
    /// A missing BaseAccount is never turned into a zero-valued record: zero
    /// is a legitimate sequence and must not hide a decoding problem.
    pub fn account_info(&self) -> Result<AccountInfo> {
        self.base_account().map(AccountInfo::from).ok_or_else(|| {
            WalletError::Encoding(format!(
                "account type {} does not expose a base account",
                self.account_type()
            ))
        })
    }

    pub fn account_type(&self) -> &str {
        match self {
            Account::Base(_) => "BaseAccount",
            Account::Module(_) => "ModuleAccount",
            Account::BaseVesting(_) => "BaseVestingAccount",
            Account::ContinuousVesting(_) => "ContinuousVestingAccount",
            Account::DelayedVesting(_) => "DelayedVestingAccount",
            Account::PeriodicVesting(_) => "PeriodicVestingAccount",
            Account::PermanentLocked(_) => "PermanentLockedAccount",
            Account::Unsupported { type_url, .. } => type_url,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base(sequence: u64) -> BaseAccount {
        BaseAccount {
            address: "desmos1test".to_string(),
            pub_key: None,
            account_number: 12345,
            sequence,
        }
    }

    #[test]
    fn test_decode_base_account() {
        let any = Any {
            type_url: "/cosmos.auth.v1beta1.BaseAccount".to_string(),
            value: base(5).encode_to_vec(),
        };

        let account = Account::decode_any(&any).unwrap();
        assert_eq!(account.account_type(), "BaseAccount");

        let info = account.account_info().unwrap();
        assert_eq!(info.address, "desmos1test");
        assert_eq!(info.sequence, 5);
        assert_eq!(info.account_number, 12345);
    }

    #[test]
    fn test_zero_sequence_is_valid() {
        let any = Any {
            type_url: "/cosmos.auth.v1beta1.BaseAccount".to_string(),
            value: base(0).encode_to_vec(),
        };

        let info = Account::decode_any(&any).unwrap().account_info().unwrap();
        assert_eq!(info.sequence, 0);
    }

    #[test]
    fn test_decode_vesting_account() {
        let vesting = ContinuousVestingAccount {
            base_vesting_account: Some(BaseVestingAccount {
                base_account: Some(base(9)),
                ..Default::default()
            }),
            ..Default::default()
        };
        let any = Any {
            type_url: "/cosmos.vesting.v1beta1.ContinuousVestingAccount".to_string(),
            value: vesting.encode_to_vec(),
        };

        let info = Account::decode_any(&any).unwrap().account_info().unwrap();
        assert_eq!(info.sequence, 9);
    }

    #[test]
    fn test_unsupported_account() {
        let any = Any {
            type_url: "/unknown.v1.Account".to_string(),
            value: vec![1, 2, 3],
        };

        let account = Account::decode_any(&any).unwrap();
        assert_eq!(account.account_type(), "/unknown.v1.Account");
        assert!(account.base_account().is_none());
        assert!(matches!(account.account_info(), Err(WalletError::Encoding(_))));
    }

    #[test]
    fn test_garbage_bytes() {
        let any = Any {
            type_url: "/cosmos.auth.v1beta1.BaseAccount".to_string(),
            value: vec![0xff, 0xff, 0xff],
        };
        assert!(matches!(Account::decode_any(&any), Err(WalletError::Encoding(_))));
    }
}
