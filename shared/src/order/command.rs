//! Inbound command set and engine replies
//!
//! Commands form a closed set: transports parse whatever they speak
//! (chat callbacks, HTTP, a test harness) into one of these variants
//! and hand it to the engine. The engine matches on the tag in exactly
//! one place and never inspects transport details.

use serde::{Deserialize, Serialize};

use super::notice::BroadcastContent;
use super::types::{Delivery, OrderDigest, PaymentProof, RejectOutcome, VariantOffer};

// ==================== Quantity Choice ====================

/// 数量选择：固定档位按钮，或进入自定义输入
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum QuantityChoice {
    /// 选定一个固定档位数量
    Tier(u32),
    /// 请求自定义数量输入
    Custom,
}

// ==================== Store Commands ====================

/// 门店指令 - 买家与操作员发给引擎的全部指令
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "command", content = "params")]
pub enum StoreCommand {
    /// 买家进入购买流程（开启新会话，展示货架）
    BeginPurchase { buyer: String, buyer_name: String },

    /// 买家选定类别
    SubmitVariantChoice {
        buyer: String,
        buyer_name: String,
        variant: String,
    },

    /// 买家接受或拒绝条款
    SubmitTermsDecision { buyer: String, accepted: bool },

    /// 买家选择数量（档位或进入自定义）
    SubmitQuantityChoice {
        buyer: String,
        choice: QuantityChoice,
    },

    /// 买家提交自定义数量文本
    SubmitCustomQuantity { buyer: String, text: String },

    /// 买家声称已付款
    SubmitPaymentClaim { buyer: String, order_id: String },

    /// 买家请求上传付款凭证
    BeginProofUpload { buyer: String, order_id: String },

    /// 买家提交付款凭证
    SubmitPaymentProof {
        buyer: String,
        order_id: String,
        proof: PaymentProof,
    },

    /// 操作员确认收款（触发原子分配与交付）
    SubmitOperatorVerify { operator: String, order_id: String },

    /// 操作员拒绝付款
    SubmitOperatorReject { operator: String, order_id: String },

    /// 操作员补货
    SubmitRestock {
        operator: String,
        variant: String,
        codes: Vec<String>,
    },

    /// 操作员向全体已注册买家广播
    SubmitBroadcast {
        operator: String,
        content: BroadcastContent,
    },

    /// 买家放弃当前流程
    Cancel { buyer: String },
}

impl StoreCommand {
    /// The actor who issued this command
    pub fn actor(&self) -> &str {
        match self {
            Self::BeginPurchase { buyer, .. }
            | Self::SubmitVariantChoice { buyer, .. }
            | Self::SubmitTermsDecision { buyer, .. }
            | Self::SubmitQuantityChoice { buyer, .. }
            | Self::SubmitCustomQuantity { buyer, .. }
            | Self::SubmitPaymentClaim { buyer, .. }
            | Self::BeginProofUpload { buyer, .. }
            | Self::SubmitPaymentProof { buyer, .. }
            | Self::Cancel { buyer } => buyer,
            Self::SubmitOperatorVerify { operator, .. }
            | Self::SubmitOperatorReject { operator, .. }
            | Self::SubmitRestock { operator, .. }
            | Self::SubmitBroadcast { operator, .. } => operator,
        }
    }
}

// ==================== Store Replies ====================

/// 指令回执 - 返回给指令发起方的成功结果
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reply", content = "data")]
pub enum StoreReply {
    /// 货架已展示
    PurchaseOpened { offers: Vec<VariantOffer> },

    /// 条款待确认
    TermsPresented { variant: String },

    /// 条款被拒绝，流程结束
    TermsDeclined,

    /// 数量档位待选择
    QuantityOptions {
        variant: String,
        stock: u32,
        tiers: Vec<(u32, i64)>,
    },

    /// 等待自定义数量输入
    CustomQuantityPrompt,

    /// 账单已生成
    InvoiceIssued { digest: OrderDigest },

    /// 付款声明已登记，等待人工验证
    ClaimRegistered { order_id: String },

    /// 可以上传凭证
    ProofUploadReady { order_id: String },

    /// 凭证已转发给操作员
    ProofForwarded { order_id: String },

    /// 验证通过，兑换码已交付
    Delivered(Delivery),

    /// 拒绝已登记
    Rejected {
        order_id: String,
        outcome: RejectOutcome,
    },

    /// 补货完成
    Restocked {
        variant: String,
        added: u32,
        stock: u32,
    },

    /// 广播已排队
    BroadcastQueued { recipients: usize },

    /// 流程已放弃
    Cancelled,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_wire_format() {
        let cmd = StoreCommand::SubmitOperatorVerify {
            operator: "op-1".to_string(),
            order_id: "ORD202501011200309917".to_string(),
        };
        let json = serde_json::to_string(&cmd).unwrap();
        assert_eq!(
            json,
            r#"{"command":"SubmitOperatorVerify","params":{"operator":"op-1","order_id":"ORD202501011200309917"}}"#
        );
    }

    #[test]
    fn test_command_parses_from_tagged_json() {
        let json = r#"{"command":"SubmitQuantityChoice","params":{"buyer":"b1","choice":{"kind":"tier","value":5}}}"#;
        let cmd: StoreCommand = serde_json::from_str(json).unwrap();
        assert_eq!(
            cmd,
            StoreCommand::SubmitQuantityChoice {
                buyer: "b1".to_string(),
                choice: QuantityChoice::Tier(5),
            }
        );
    }

    #[test]
    fn test_command_actor() {
        let cmd = StoreCommand::Cancel {
            buyer: "b9".to_string(),
        };
        assert_eq!(cmd.actor(), "b9");

        let cmd = StoreCommand::SubmitRestock {
            operator: "op-1".to_string(),
            variant: "500".to_string(),
            codes: vec![],
        };
        assert_eq!(cmd.actor(), "op-1");
    }

    #[test]
    fn test_reply_wire_format() {
        let reply = StoreReply::ClaimRegistered {
            order_id: "ORD1".to_string(),
        };
        let json = serde_json::to_string(&reply).unwrap();
        assert_eq!(
            json,
            r#"{"reply":"ClaimRegistered","data":{"order_id":"ORD1"}}"#
        );
    }
}
