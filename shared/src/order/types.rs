//! Shared types for the purchase workflow

use serde::{Deserialize, Serialize};

// ============================================================================
// Order Status
// ============================================================================

/// 订单状态（粗粒度，细粒度流程状态在会话里）
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OrderStatus {
    /// 等待付款验证
    #[default]
    Pending,
    /// 已验证收款
    Paid,
    /// 操作员拒绝（可被后续验证覆盖）
    Rejected,
}

/// 拒绝结果
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RejectOutcome {
    /// 本次拒绝生效
    Rejected,
    /// 订单早已是拒绝状态，本次为无操作
    AlreadyRejected,
}

// ============================================================================
// Order Record
// ============================================================================

/// Durable order record
///
/// Created when a buyer locks in a quantity; survives session loss.
/// `delivered` flips to true exactly once, inside the allocation
/// critical section, and never flips back.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Order {
    /// Order ID (assigned by the ledger)
    pub id: String,
    /// Opaque stable buyer identifier
    pub buyer_id: String,
    /// Buyer display name captured at creation
    pub buyer_name: String,
    /// Variant this order draws codes from
    pub variant: String,
    /// Number of codes ordered
    pub quantity: u32,
    /// Invoice amount in whole currency units
    pub amount: i64,
    /// Order status
    pub status: OrderStatus,
    /// Whether codes have been handed out
    pub delivered: bool,
    /// Creation timestamp (unix millis)
    pub created_at: i64,
    /// Verification timestamp (unix millis)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verified_at: Option<i64>,
}

impl Order {
    /// Create a new pending, undelivered order
    pub fn new(
        id: impl Into<String>,
        buyer_id: impl Into<String>,
        buyer_name: impl Into<String>,
        variant: impl Into<String>,
        quantity: u32,
        amount: i64,
        created_at: i64,
    ) -> Self {
        Self {
            id: id.into(),
            buyer_id: buyer_id.into(),
            buyer_name: buyer_name.into(),
            variant: variant.into(),
            quantity,
            amount,
            status: OrderStatus::Pending,
            delivered: false,
            created_at,
            verified_at: None,
        }
    }

    /// Whether the order still awaits verification
    pub fn is_pending(&self) -> bool {
        self.status == OrderStatus::Pending
    }

    /// Whether payment has been verified
    pub fn is_paid(&self) -> bool {
        self.status == OrderStatus::Paid
    }

    /// Mark payment verified and codes handed out.
    ///
    /// Sets status, the delivered flag and the verification timestamp
    /// together so the record can never show one without the others.
    pub fn mark_delivered(&mut self, now: i64) {
        self.status = OrderStatus::Paid;
        self.delivered = true;
        self.verified_at = Some(now);
    }

    /// Compact operator-facing view
    pub fn digest(&self) -> OrderDigest {
        OrderDigest {
            order_id: self.id.clone(),
            buyer_name: self.buyer_name.clone(),
            variant: self.variant.clone(),
            quantity: self.quantity,
            amount: self.amount,
            status: self.status,
            created_at: self.created_at,
        }
    }
}

/// Order digest - what approval controls and reports show
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OrderDigest {
    /// Order ID
    pub order_id: String,
    /// Buyer display name
    pub buyer_name: String,
    /// Variant ID
    pub variant: String,
    /// Number of codes ordered
    pub quantity: u32,
    /// Invoice amount in whole currency units
    pub amount: i64,
    /// Order status
    pub status: OrderStatus,
    /// Creation timestamp (unix millis)
    pub created_at: i64,
}

// ============================================================================
// Allocation Outcome
// ============================================================================

/// Codes reserved for a verified order, ready to hand out
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Delivery {
    /// Order ID
    pub order_id: String,
    /// Buyer the codes belong to
    pub buyer_id: String,
    /// Variant the codes were drawn from
    pub variant: String,
    /// The reserved codes, in shelf order
    pub codes: Vec<String>,
}

// ============================================================================
// Catalog Offer
// ============================================================================

/// One sellable variant as presented to buyers
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct VariantOffer {
    /// Variant ID
    pub id: String,
    /// Buyer-facing display name
    pub display: String,
    /// Codes currently available
    pub stock: u32,
    /// Tier prices as (quantity, amount) pairs, ascending by quantity
    pub tiers: Vec<(u32, i64)>,
}

// ============================================================================
// Payment Proof
// ============================================================================

/// 买家提交的付款凭证
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum PaymentProof {
    /// 转账参考号等文字凭证
    Reference(String),
    /// 截图等附件，由转运层提供句柄
    Attachment(String),
}
