//! Shared types for the code store
//!
//! Common types used by both the store engine and gateway adapters:
//! order records, inbound commands, outbound notices, purchase session
//! state, and the error taxonomy.

pub mod error;
pub mod gateway;
pub mod order;
pub mod session;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

// Error re-exports (for convenient access)
pub use error::{StoreError, StoreResult};

// Gateway re-exports (for the NotificationGateway seam)
pub use gateway::{GatewayError, NotificationGateway};
