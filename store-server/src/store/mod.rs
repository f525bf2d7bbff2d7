//! Store Engine Module
//!
//! This module implements the purchase workflow around a finite pool of
//! single-use codes:
//!
//! - **catalog**: Variants and tier pricing
//! - **inventory**: Per-variant FIFO shelves, atomic reserve/restock
//! - **ledger**: Durable order records behind per-order locks
//! - **session**: Transient per-buyer flow state
//! - **allocation**: Verification as one atomic check-and-deliver step
//! - **registry**: Buyers known to the store (broadcast audience)
//! - **manager**: The StoreFront facade dispatching every command
//!
//! # Architecture
//!
//! ```text
//! Command → StoreFront → session FSM → OrderLedger (order created)
//!                 ↓
//!        operator verify → AllocationCoordinator
//!                              ↓ (per-order critical section)
//!                         InventoryPool.reserve → mark delivered
//!                              ↓
//!                          Notifier → NotificationGateway
//! ```
//!
//! # Data Flow
//!
//! 1. Transport parses input into a StoreCommand
//! 2. StoreFront validates session, order ownership and authorization
//! 3. Buyer steps advance the session; quantity choice creates the Order
//! 4. Operator verify reserves codes and flips the order atomically
//! 5. Notices fan out through the gateway without blocking the reply

pub mod allocation;
pub mod catalog;
pub mod inventory;
pub mod ledger;
pub mod manager;
pub mod registry;
pub mod session;

// Re-exports
pub use allocation::AllocationCoordinator;
pub use catalog::{Catalog, CatalogError, VariantSpec};
pub use inventory::InventoryPool;
pub use ledger::OrderLedger;
pub use manager::{SalesSummary, StoreFront};
pub use registry::BuyerRegistry;
pub use session::SessionStore;

// Re-export shared types for convenience
pub use shared::order::{
    Delivery, Order, OrderDigest, OrderStatus, QuantityChoice, RejectOutcome, StoreCommand,
    StoreReply, VariantOffer,
};
