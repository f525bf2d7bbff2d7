//! Error types for the store core
//!
//! Every variant is an expected, recoverable outcome that is reported
//! back to the actor whose command triggered it. A failing operation
//! never leaves the inventory pool or the order ledger half-mutated.

use thiserror::Error;

/// Unified error type for store operations
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    /// No codes available at all for the named scope
    #[error("out of stock for {scope}")]
    OutOfStock { scope: String },

    /// Codes exist, but fewer than requested
    #[error("not enough stock: {available} available, {requested} requested")]
    InsufficientStock { available: u32, requested: u32 },

    /// Quantity outside the accepted bounds or not a number
    #[error("invalid quantity: {message}")]
    InvalidQuantity { message: String },

    /// Actor is not in the configured operator set
    #[error("operator action from an unrecognized actor")]
    Unauthorized,

    /// No order with this id (or not visible to this actor)
    #[error("order not found: {order_id}")]
    OrderNotFound { order_id: String },

    /// Codes were already handed out for this order
    #[error("codes already delivered for order {order_id}")]
    AlreadyDelivered { order_id: String },

    /// Event arrived in a flow state that does not accept it
    #[error("invalid transition: {message}")]
    InvalidTransition { message: String },

    /// Variant id not present in the catalog
    #[error("unknown variant: {variant}")]
    UnknownVariant { variant: String },
}

impl StoreError {
    // ========== Convenient constructors ==========

    /// Create an OutOfStock error
    pub fn out_of_stock(scope: impl Into<String>) -> Self {
        Self::OutOfStock { scope: scope.into() }
    }

    /// Create an InvalidQuantity error
    pub fn invalid_quantity(message: impl Into<String>) -> Self {
        Self::InvalidQuantity { message: message.into() }
    }

    /// Create an OrderNotFound error
    pub fn order_not_found(order_id: impl Into<String>) -> Self {
        Self::OrderNotFound { order_id: order_id.into() }
    }

    /// Create an AlreadyDelivered error
    pub fn already_delivered(order_id: impl Into<String>) -> Self {
        Self::AlreadyDelivered { order_id: order_id.into() }
    }

    /// Create an InvalidTransition error
    pub fn invalid_transition(message: impl Into<String>) -> Self {
        Self::InvalidTransition { message: message.into() }
    }

    /// Create an UnknownVariant error
    pub fn unknown_variant(variant: impl Into<String>) -> Self {
        Self::UnknownVariant { variant: variant.into() }
    }

    // ========== Error inspection methods ==========

    /// Stable machine-readable code for logs and wire mapping
    pub fn code(&self) -> &'static str {
        match self {
            Self::OutOfStock { .. } => "out_of_stock",
            Self::InsufficientStock { .. } => "insufficient_stock",
            Self::InvalidQuantity { .. } => "invalid_quantity",
            Self::Unauthorized => "unauthorized",
            Self::OrderNotFound { .. } => "order_not_found",
            Self::AlreadyDelivered { .. } => "already_delivered",
            Self::InvalidTransition { .. } => "invalid_transition",
            Self::UnknownVariant { .. } => "unknown_variant",
        }
    }

    /// Whether the same actor can retry the same step and hope to succeed
    ///
    /// Quantity and stock problems clear up with different input or a
    /// restock; guard violations and authorization failures do not.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::InsufficientStock { .. } | Self::InvalidQuantity { .. }
        )
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;
