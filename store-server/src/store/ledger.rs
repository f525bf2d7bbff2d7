//! Order ledger - the durable record of every order
//!
//! Each order lives behind its own lock cell, so transitions on one
//! order are totally ordered without any lock spanning unrelated
//! orders. The ledger itself only ever inserts; status changes go
//! through the cell.

use std::hash::{Hash, Hasher};
use std::sync::Arc;

use chrono::Utc;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use parking_lot::{Mutex, RwLock};

use shared::order::{Order, OrderStatus};
use shared::util::now_millis;

/// Stable 4-digit suffix derived from the buyer id
fn buyer_suffix(buyer_id: &str) -> u32 {
    let mut hasher = std::collections::hash_map::DefaultHasher::new();
    buyer_id.hash(&mut hasher);
    (hasher.finish() % 10_000) as u32
}

/// Keyed store of orders with per-order lock cells
#[derive(Debug, Default)]
pub struct OrderLedger {
    cells: DashMap<String, Arc<Mutex<Order>>>,
    /// Order ids in creation order; reports walk this
    creation_log: RwLock<Vec<String>>,
}

impl OrderLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pending order and return a snapshot of it.
    ///
    /// The id is `ORD` + the wall-clock second + a 4-digit suffix from
    /// the buyer id. A collision (same buyer suffix, same second) bumps
    /// the suffix until the insert lands.
    pub fn create(
        &self,
        buyer_id: &str,
        buyer_name: &str,
        variant: &str,
        quantity: u32,
        amount: i64,
    ) -> Order {
        let mut stamp = Utc::now().format("%Y%m%d%H%M%S").to_string();
        let mut suffix = buyer_suffix(buyer_id);
        let mut attempts: u32 = 0;
        loop {
            let id = format!("ORD{stamp}{suffix:04}");
            match self.cells.entry(id.clone()) {
                Entry::Occupied(_) => {
                    suffix = (suffix + 1) % 10_000;
                    attempts += 1;
                    // A full second's worth of suffixes is taken; wait
                    // for the clock instead of spinning forever
                    if attempts % 10_000 == 0 {
                        stamp = Utc::now().format("%Y%m%d%H%M%S").to_string();
                    }
                }
                Entry::Vacant(slot) => {
                    let order = Order::new(
                        id.clone(),
                        buyer_id,
                        buyer_name,
                        variant,
                        quantity,
                        amount,
                        now_millis(),
                    );
                    slot.insert(Arc::new(Mutex::new(order.clone())));
                    self.creation_log.write().push(id);
                    return order;
                }
            }
        }
    }

    /// The lock cell for an order; transitions hold this for their
    /// whole critical section
    pub fn cell(&self, order_id: &str) -> Option<Arc<Mutex<Order>>> {
        self.cells.get(order_id).map(|entry| entry.value().clone())
    }

    /// Point-in-time copy of one order
    pub fn snapshot(&self, order_id: &str) -> Option<Order> {
        self.cell(order_id).map(|cell| cell.lock().clone())
    }

    /// Pending orders, oldest first
    pub fn list_pending(&self) -> Vec<Order> {
        self.in_creation_order()
            .filter(|order| order.status == OrderStatus::Pending)
            .collect()
    }

    /// Every order, oldest first
    pub fn all(&self) -> Vec<Order> {
        self.in_creation_order().collect()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    fn in_creation_order(&self) -> impl Iterator<Item = Order> {
        let ids = self.creation_log.read().clone();
        ids.into_iter().filter_map(|id| self.snapshot(&id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_id_shape() {
        let ledger = OrderLedger::new();
        let order = ledger.create("buyer-1", "Ana", "500", 2, 60);
        assert!(order.id.starts_with("ORD"));
        // ORD + 14-digit second stamp + 4-digit suffix
        assert_eq!(order.id.len(), 21);
        assert!(order.id[3..].chars().all(|c| c.is_ascii_digit()));
        assert_eq!(order.status, OrderStatus::Pending);
        assert!(!order.delivered);
    }

    #[test]
    fn test_same_buyer_same_second_gets_distinct_ids() {
        let ledger = OrderLedger::new();
        let a = ledger.create("buyer-1", "Ana", "500", 1, 30);
        let b = ledger.create("buyer-1", "Ana", "500", 1, 30);
        let c = ledger.create("buyer-1", "Ana", "500", 1, 30);
        assert_ne!(a.id, b.id);
        assert_ne!(b.id, c.id);
        assert_eq!(ledger.len(), 3);
    }

    #[test]
    fn test_snapshot_is_detached_copy() {
        let ledger = OrderLedger::new();
        let order = ledger.create("buyer-1", "Ana", "500", 1, 30);

        let before = ledger.snapshot(&order.id).unwrap();
        {
            let cell = ledger.cell(&order.id).unwrap();
            cell.lock().mark_delivered(5_000);
        }
        let after = ledger.snapshot(&order.id).unwrap();

        assert!(!before.delivered);
        assert!(after.delivered);
        assert_eq!(after.status, OrderStatus::Paid);
    }

    #[test]
    fn test_list_pending_in_creation_order() {
        let ledger = OrderLedger::new();
        let a = ledger.create("b1", "Ana", "500", 1, 30);
        let b = ledger.create("b2", "Ben", "500", 1, 30);
        let c = ledger.create("b3", "Cal", "500", 1, 30);

        ledger
            .cell(&b.id)
            .unwrap()
            .lock()
            .mark_delivered(now_millis());

        let pending: Vec<String> = ledger.list_pending().into_iter().map(|o| o.id).collect();
        assert_eq!(pending, vec![a.id, c.id]);
        assert_eq!(ledger.all().len(), 3);
    }

    #[test]
    fn test_unknown_order_lookups() {
        let ledger = OrderLedger::new();
        assert!(ledger.cell("ORD404").is_none());
        assert!(ledger.snapshot("ORD404").is_none());
        assert!(ledger.is_empty());
    }
}
