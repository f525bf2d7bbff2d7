//! Outbound notice payloads
//!
//! 引擎在状态转换提交后生成这些载荷，经 NotificationGateway 推送。
//! 推送失败只记录，绝不回滚已提交的状态。

use serde::{Deserialize, Serialize};

use super::types::{OrderDigest, PaymentProof};

// ==================== Buyer Notices ====================

/// 买家通知 (引擎 -> 网关 -> 买家)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "notice", content = "data")]
pub enum BuyerNotice {
    /// 账单已生成，附付款时限
    Invoice {
        digest: OrderDigest,
        payment_window_mins: u64,
    },

    /// 验证通过，送达兑换码
    CodesDelivered {
        order_id: String,
        variant: String,
        codes: Vec<String>,
    },

    /// 付款被拒绝
    PaymentRejected { order_id: String },
}

// ==================== Operator Notices ====================

/// 操作员通知 (引擎 -> 网关 -> 全体操作员)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "notice", content = "data")]
pub enum OperatorNotice {
    /// 买家声称已付款，等待审批
    PaymentClaimed { digest: OrderDigest },

    /// 买家提交了付款凭证
    ProofSubmitted {
        digest: OrderDigest,
        proof: PaymentProof,
    },

    /// 超过付款时限仍未处理的订单（每单只上报一次）
    StalePending { digests: Vec<OrderDigest> },
}

// ==================== Broadcast ====================

/// 广播内容 (操作员 -> 已注册买家)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum BroadcastContent {
    /// 纯文字
    Text(String),

    /// 附件（图片等）加可选说明文字
    Attachment {
        handle: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        caption: Option<String>,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::order::types::OrderStatus;

    fn digest() -> OrderDigest {
        OrderDigest {
            order_id: "ORD1".to_string(),
            buyer_name: "Ana".to_string(),
            variant: "1000".to_string(),
            quantity: 5,
            amount: 335,
            status: OrderStatus::Pending,
            created_at: 1_000,
        }
    }

    #[test]
    fn test_buyer_notice_wire_format() {
        let notice = BuyerNotice::CodesDelivered {
            order_id: "ORD1".to_string(),
            variant: "₹1000 Off".to_string(),
            codes: vec!["C1".to_string(), "C2".to_string()],
        };
        let json = serde_json::to_string(&notice).unwrap();
        assert!(json.starts_with(r#"{"notice":"CodesDelivered""#));
        let back: BuyerNotice = serde_json::from_str(&json).unwrap();
        assert_eq!(back, notice);
    }

    #[test]
    fn test_operator_notice_carries_proof() {
        let notice = OperatorNotice::ProofSubmitted {
            digest: digest(),
            proof: PaymentProof::Attachment("file-77".to_string()),
        };
        let json = serde_json::to_string(&notice).unwrap();
        assert!(json.contains(r#""kind":"attachment""#));
        assert!(json.contains("file-77"));
    }

    #[test]
    fn test_broadcast_caption_omitted_when_absent() {
        let content = BroadcastContent::Attachment {
            handle: "file-1".to_string(),
            caption: None,
        };
        let json = serde_json::to_string(&content).unwrap();
        assert!(!json.contains("caption"));
    }
}
