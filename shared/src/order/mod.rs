//! Order Workflow Module
//!
//! This module provides types for the purchase workflow:
//! - Commands: Requests from buyers and operators, plus engine replies
//! - Notices: Payloads pushed outward through the notification gateway
//! - Types: The durable order record and its projections

pub mod command;
pub mod notice;
pub mod types;

// Re-exports
pub use command::{QuantityChoice, StoreCommand, StoreReply};
pub use notice::{BroadcastContent, BuyerNotice, OperatorNotice};
pub use types::*;
