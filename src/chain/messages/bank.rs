use super::MessageBuilder;
use crate::chain::proto::{Any, Coin, ProtoMsgSend};

/// Bank transfer from one account to another
#[derive(Debug, Clone, PartialEq)]
pub struct SendMsg {
    pub from_address: String,
    pub to_address: String,
    pub amount: Vec<Coin>,
}

impl SendMsg {
    pub fn new(from_address: impl Into<String>, to_address: impl Into<String>, amount: Vec<Coin>) -> Self {
        Self {
            from_address: from_address.into(),
            to_address: to_address.into(),
            amount,
        }
    }
}

impl MessageBuilder for SendMsg {
    type Msg = ProtoMsgSend;

    const TYPE_URL: &'static str = "/cosmos.bank.v1beta1.MsgSend";

    fn build_msg(&self) -> ProtoMsgSend {
        ProtoMsgSend {
            from_address: self.from_address.clone(),
            to_address: self.to_address.clone(),
            amount: self.amount.clone(),
        }
    }
}

impl From<SendMsg> for Any {
    fn from(msg: SendMsg) -> Self {
        msg.to_any()
    }
}
