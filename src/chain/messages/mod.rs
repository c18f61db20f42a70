mod bank;

pub use bank::SendMsg;

use prost::Message;

use crate::chain::proto::Any;

/// Helper trait for turning typed messages into the opaque Any payloads a
/// transaction carries
pub trait MessageBuilder {
    /// Proto message this builder produces
    type Msg: Message;

    /// Proto type URL, e.g. `/cosmos.bank.v1beta1.MsgSend`
    const TYPE_URL: &'static str;

    /// Build the proto message
    fn build_msg(&self) -> Self::Msg;

    /// Encode the message and wrap it in an Any
    fn to_any(&self) -> Any {
        Any {
            type_url: Self::TYPE_URL.to_string(),
            value: self.build_msg().encode_to_vec(),
        }
    }
}
