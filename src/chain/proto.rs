//! Proto definitions for Cosmos SDK chain integration
//! Generated types and tonic clients come from the cosmos-sdk-proto crate

pub use cosmos_sdk_proto::Any;

pub use cosmos_sdk_proto::cosmos::base::abci::v1beta1::GasInfo;
pub use cosmos_sdk_proto::cosmos::base::v1beta1::Coin;
pub use cosmos_sdk_proto::cosmos::tx::v1beta1::{
    mode_info, AuthInfo, Fee, ModeInfo, SignDoc, SignerInfo, SimulateRequest,
    SimulateResponse, TxBody, TxRaw, service_client::ServiceClient,
};
pub use cosmos_sdk_proto::cosmos::tx::signing::v1beta1::SignMode;
pub use cosmos_sdk_proto::cosmos::auth::v1beta1::{
    BaseAccount, ModuleAccount, QueryAccountRequest, QueryAccountResponse,
    query_client::QueryClient as AuthQueryClient,
};
pub use cosmos_sdk_proto::cosmos::vesting::v1beta1::{
    BaseVestingAccount, ContinuousVestingAccount, DelayedVestingAccount,
    PeriodicVestingAccount, PermanentLockedAccount,
};
pub use cosmos_sdk_proto::cosmos::bank::v1beta1::MsgSend as ProtoMsgSend;
pub use cosmos_sdk_proto::cosmos::crypto::secp256k1::PubKey as Secp256k1PubKey;

pub const SECP256K1_PUBKEY_TYPE_URL: &str = "/cosmos.crypto.secp256k1.PubKey";
