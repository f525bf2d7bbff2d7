//! Allocation coordinator - verification as one atomic step
//!
//! The only path that consumes inventory. `verify` holds the order's
//! lock cell across the delivered guard, the pool reservation and the
//! status flip, so two verifications of the same order can never both
//! reserve, and a reservation can never commit against a stale guard.
//!
//! Lock order is fixed: order cell first, pool second.

use std::collections::HashSet;
use std::sync::Arc;

use shared::order::{Delivery, OrderStatus, RejectOutcome};
use shared::util::now_millis;
use shared::{StoreError, StoreResult};

use super::inventory::InventoryPool;
use super::ledger::OrderLedger;

/// Coordinates operator decisions with the inventory pool
#[derive(Debug, Clone)]
pub struct AllocationCoordinator {
    ledger: Arc<OrderLedger>,
    pool: Arc<InventoryPool>,
    operators: Arc<HashSet<String>>,
}

impl AllocationCoordinator {
    pub fn new(
        ledger: Arc<OrderLedger>,
        pool: Arc<InventoryPool>,
        operators: Arc<HashSet<String>>,
    ) -> Self {
        Self {
            ledger,
            pool,
            operators,
        }
    }

    fn authorize(&self, operator: &str) -> StoreResult<()> {
        if self.operators.contains(operator) {
            Ok(())
        } else {
            Err(StoreError::Unauthorized)
        }
    }

    /// Verify payment for an order: reserve its codes and mark it
    /// delivered, atomically.
    ///
    /// Succeeds at most once per order. A second verification fails on
    /// the delivered guard without touching the pool; a reservation
    /// failure leaves the order pending and undelivered.
    pub fn verify(&self, operator: &str, order_id: &str) -> StoreResult<Delivery> {
        // 1. Authorize the actor
        self.authorize(operator)?;

        // 2. Find the order's lock cell
        let cell = self
            .ledger
            .cell(order_id)
            .ok_or_else(|| StoreError::order_not_found(order_id))?;

        // 3. Critical section: guard, reserve, flip under the order lock
        let mut order = cell.lock();
        if order.delivered {
            return Err(StoreError::already_delivered(&order.id));
        }

        // 4. All-or-nothing reservation; the pool takes its own lock
        //    nested inside the order lock
        let codes = self.pool.reserve(&order.variant, order.quantity)?;

        // 5. Commit the flip; from here the codes belong to this order
        order.mark_delivered(now_millis());
        tracing::info!(
            order_id = %order.id,
            buyer = %order.buyer_id,
            variant = %order.variant,
            quantity = order.quantity,
            operator = %operator,
            "payment verified, codes delivered"
        );

        Ok(Delivery {
            order_id: order.id.clone(),
            buyer_id: order.buyer_id.clone(),
            variant: order.variant.clone(),
            codes,
        })
    }

    /// Reject a payment. Never touches the pool.
    ///
    /// Rejecting an already-rejected order reports `AlreadyRejected`
    /// and changes nothing; a rejected order can still be verified
    /// later if the payment turns out to be real.
    pub fn reject(&self, operator: &str, order_id: &str) -> StoreResult<RejectOutcome> {
        self.authorize(operator)?;

        let cell = self
            .ledger
            .cell(order_id)
            .ok_or_else(|| StoreError::order_not_found(order_id))?;

        let mut order = cell.lock();
        match order.status {
            OrderStatus::Paid => Err(StoreError::already_delivered(&order.id)),
            OrderStatus::Rejected => Ok(RejectOutcome::AlreadyRejected),
            OrderStatus::Pending => {
                order.status = OrderStatus::Rejected;
                tracing::info!(order_id = %order.id, operator = %operator, "payment rejected");
                Ok(RejectOutcome::Rejected)
            }
        }
    }
}
