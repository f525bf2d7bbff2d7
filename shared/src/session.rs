//! Per-buyer purchase session
//!
//! A session tracks one buyer's progress through the purchase flow. It
//! is transient: dropping a session never corrupts durable state, and
//! an order already created stays valid in the ledger without it.

use serde::{Deserialize, Serialize};

use crate::util::now_millis;

// ==================== Flow State ====================

/// 购买流程状态（每买家一条，严格按序推进）
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FlowState {
    /// 正在挑选类别
    #[default]
    SelectingVariant,
    /// 等待条款确认
    TermsPending,
    /// 等待数量选择
    QuantityPending,
    /// 等待自定义数量输入
    CustomQuantityPending,
    /// 账单已出，等待买家声明付款
    PaymentPending,
    /// 等待买家上传凭证
    ProofPending,
    /// 等待操作员验证
    VerificationPending,
}

// ==================== Session Context ====================

/// Session context - one buyer's position in the purchase flow
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionContext {
    /// Opaque stable buyer identifier
    pub buyer_id: String,
    /// Buyer display name (stamped onto orders created in this session)
    pub buyer_name: String,
    /// Current flow state
    pub state: FlowState,
    /// Variant chosen so far
    #[serde(skip_serializing_if = "Option::is_none")]
    pub variant: Option<String>,
    /// Order created in this session
    #[serde(skip_serializing_if = "Option::is_none")]
    pub order_id: Option<String>,
    /// Session start (unix millis)
    pub started_at: i64,
    /// Last transition (unix millis)
    pub updated_at: i64,
}

impl SessionContext {
    /// Start a fresh session at the variant menu
    pub fn new(buyer_id: impl Into<String>, buyer_name: impl Into<String>) -> Self {
        let now = now_millis();
        Self {
            buyer_id: buyer_id.into(),
            buyer_name: buyer_name.into(),
            state: FlowState::SelectingVariant,
            variant: None,
            order_id: None,
            started_at: now,
            updated_at: now,
        }
    }

    /// Move to the next flow state and refresh the activity stamp
    pub fn advance(&mut self, state: FlowState) {
        self.state = state;
        self.updated_at = now_millis();
    }

    /// Whether the session has sat untouched for at least `ttl_millis`
    pub fn is_idle_since(&self, ttl_millis: i64, now: i64) -> bool {
        now - self.updated_at >= ttl_millis
    }

    /// Whether the buyer may abandon the flow right now.
    ///
    /// Once an operator is reviewing a payment claim the buyer can no
    /// longer pull the session out from under the review.
    pub fn can_cancel(&self) -> bool {
        self.state != FlowState::VerificationPending
    }
}
