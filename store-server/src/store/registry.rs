//! Buyer registry - everyone who has ever talked to the store
//!
//! The broadcast audience. Buyers are added when they enter the flow
//! and are never removed.

use std::collections::HashSet;

use parking_lot::RwLock;

/// Set of known buyer ids
#[derive(Debug, Default)]
pub struct BuyerRegistry {
    inner: RwLock<HashSet<String>>,
}

impl BuyerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remember a buyer; recording twice is a no-op
    pub fn record(&self, buyer_id: &str) {
        self.inner.write().insert(buyer_id.to_string());
    }

    pub fn contains(&self, buyer_id: &str) -> bool {
        self.inner.read().contains(buyer_id)
    }

    /// Broadcast recipients: every known buyer except the excluded ids,
    /// in stable order
    pub fn recipients_excluding(&self, excluded: &HashSet<String>) -> Vec<String> {
        let known = self.inner.read();
        let mut recipients: Vec<String> = known
            .iter()
            .filter(|buyer_id| !excluded.contains(*buyer_id))
            .cloned()
            .collect();
        recipients.sort();
        recipients
    }

    pub fn len(&self) -> usize {
        self.inner.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }
}
