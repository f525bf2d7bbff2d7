//! StoreFront - command processing over the purchase workflow
//!
//! This module handles:
//! - Buyer flow validation and session transitions
//! - Order creation at quantity lock-in
//! - Operator actions (verify, reject, restock, broadcast)
//! - Query surfaces (stock, sales, pending orders)
//! - Notice emission (via Notifier, never blocking the reply)
//!
//! # Command Flow
//!
//! ```text
//! execute(cmd)
//!     ├─ 1. Route on the command tag (the only match site)
//!     ├─ 2. Validate actor, session state and order ownership
//!     ├─ 3. Mutate inside the owning lock (session cell, order cell or pool)
//!     ├─ 4. Hand notices to the Notifier (fire-and-forget)
//!     └─ 5. Return the reply to the originating actor
//! ```

#[cfg(test)]
mod tests;

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use parking_lot::Mutex;
use serde::{Deserialize, Serialize};

use shared::order::notice::{BuyerNotice, OperatorNotice};
use shared::order::{
    BroadcastContent, Order, OrderDigest, PaymentProof, QuantityChoice, RejectOutcome,
    StoreCommand, StoreReply, VariantOffer,
};
use shared::session::{FlowState, SessionContext};
use shared::{StoreError, StoreResult};

use crate::core::Config;
use crate::notify::Notifier;
use crate::store::allocation::AllocationCoordinator;
use crate::store::catalog::Catalog;
use crate::store::inventory::InventoryPool;
use crate::store::ledger::OrderLedger;
use crate::store::registry::BuyerRegistry;
use crate::store::session::SessionStore;

/// Operator sales report
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct SalesSummary {
    /// Orders ever created
    pub total_orders: usize,
    /// Orders with verified payment
    pub paid_orders: usize,
    /// Orders still awaiting a decision
    pub pending_orders: usize,
    /// Available codes per variant
    pub stock: BTreeMap<String, u32>,
}

/// Storefront facade over the purchase workflow
pub struct StoreFront {
    catalog: Arc<Catalog>,
    pool: Arc<InventoryPool>,
    ledger: Arc<OrderLedger>,
    sessions: Arc<SessionStore>,
    registry: Arc<BuyerRegistry>,
    allocator: AllocationCoordinator,
    notifier: Notifier,
    operators: Arc<HashSet<String>>,
    max_per_order: u32,
    payment_window_mins: u64,
}

impl std::fmt::Debug for StoreFront {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StoreFront")
            .field("operators", &self.operators.len())
            .field("max_per_order", &self.max_per_order)
            .field("orders", &self.ledger.len())
            .finish()
    }
}

impl StoreFront {
    /// Assemble the facade over already-built services
    pub fn new(
        config: &Config,
        catalog: Arc<Catalog>,
        pool: Arc<InventoryPool>,
        ledger: Arc<OrderLedger>,
        sessions: Arc<SessionStore>,
        registry: Arc<BuyerRegistry>,
        notifier: Notifier,
    ) -> Self {
        let operators = Arc::new(config.operator_set());
        let allocator = AllocationCoordinator::new(ledger.clone(), pool.clone(), operators.clone());
        Self {
            catalog,
            pool,
            ledger,
            sessions,
            registry,
            allocator,
            notifier,
            operators,
            max_per_order: config.max_per_order,
            payment_window_mins: config.payment_window_mins,
        }
    }

    /// Execute a command and return the reply for the originating actor.
    ///
    /// This is the only place that matches on the command tag; every
    /// transport funnels through here.
    pub fn execute(&self, cmd: StoreCommand) -> StoreResult<StoreReply> {
        let result = match cmd {
            StoreCommand::BeginPurchase { buyer, buyer_name } => {
                self.begin_purchase(&buyer, &buyer_name)
            }
            StoreCommand::SubmitVariantChoice {
                buyer,
                buyer_name,
                variant,
            } => self.choose_variant(&buyer, &buyer_name, &variant),
            StoreCommand::SubmitTermsDecision { buyer, accepted } => {
                self.decide_terms(&buyer, accepted)
            }
            StoreCommand::SubmitQuantityChoice { buyer, choice } => {
                self.choose_quantity(&buyer, choice)
            }
            StoreCommand::SubmitCustomQuantity { buyer, text } => {
                self.submit_custom_quantity(&buyer, &text)
            }
            StoreCommand::SubmitPaymentClaim { buyer, order_id } => {
                self.claim_payment(&buyer, &order_id)
            }
            StoreCommand::BeginProofUpload { buyer, order_id } => {
                self.begin_proof_upload(&buyer, &order_id)
            }
            StoreCommand::SubmitPaymentProof {
                buyer,
                order_id,
                proof,
            } => self.submit_proof(&buyer, &order_id, proof),
            StoreCommand::SubmitOperatorVerify { operator, order_id } => {
                self.verify_payment(&operator, &order_id)
            }
            StoreCommand::SubmitOperatorReject { operator, order_id } => {
                self.reject_payment(&operator, &order_id)
            }
            StoreCommand::SubmitRestock {
                operator,
                variant,
                codes,
            } => self.restock(&operator, &variant, &codes),
            StoreCommand::SubmitBroadcast { operator, content } => {
                self.broadcast(&operator, content)
            }
            StoreCommand::Cancel { buyer } => self.cancel(&buyer),
        };
        if let Err(err) = &result {
            tracing::debug!(code = err.code(), error = %err, "command refused");
        }
        result
    }

    // ==================== Buyer Flow ====================

    /// Open the purchase flow: register the buyer, check that there is
    /// anything to sell, and start a fresh session at the variant menu.
    pub fn begin_purchase(&self, buyer: &str, buyer_name: &str) -> StoreResult<StoreReply> {
        self.registry.record(buyer);
        if self.pool.total_available() == 0 {
            return Err(StoreError::out_of_stock("all variants"));
        }
        self.sessions.begin(buyer, buyer_name);
        tracing::info!(buyer = %buyer, "purchase flow opened");
        Ok(StoreReply::PurchaseOpened {
            offers: self.offers(),
        })
    }

    /// Pick a variant. Accepted from the menu state, or with no session
    /// at all (the menu keeps working after a session expires). A
    /// sold-out pick clears the menu session; any other flow state
    /// refuses the event untouched.
    pub fn choose_variant(
        &self,
        buyer: &str,
        buyer_name: &str,
        variant: &str,
    ) -> StoreResult<StoreReply> {
        self.registry.record(buyer);
        self.catalog.get(variant)?;

        let cell = match self.sessions.get(buyer) {
            Some(cell) => cell,
            None => self.sessions.begin(buyer, buyer_name),
        };
        let mut session = cell.lock();
        if session.state != FlowState::SelectingVariant {
            return Err(StoreError::invalid_transition(format!(
                "variant choice not expected in {:?}",
                session.state
            )));
        }

        if self.pool.stock(variant) == 0 {
            drop(session);
            self.sessions.remove(buyer);
            return Err(StoreError::out_of_stock(variant));
        }

        session.variant = Some(variant.to_string());
        session.advance(FlowState::TermsPending);
        Ok(StoreReply::TermsPresented {
            variant: variant.to_string(),
        })
    }

    /// Accept or decline the purchase terms
    pub fn decide_terms(&self, buyer: &str, accepted: bool) -> StoreResult<StoreReply> {
        let cell = self.session(buyer)?;
        let mut session = cell.lock();
        if session.state != FlowState::TermsPending {
            return Err(StoreError::invalid_transition(format!(
                "terms decision not expected in {:?}",
                session.state
            )));
        }

        if !accepted {
            drop(session);
            self.sessions.remove(buyer);
            tracing::info!(buyer = %buyer, "terms declined");
            return Ok(StoreReply::TermsDeclined);
        }

        self.registry.record(buyer);
        let variant = self.session_variant(&session)?;
        let stock = self.pool.stock(&variant);
        if stock == 0 {
            drop(session);
            self.sessions.remove(buyer);
            return Err(StoreError::out_of_stock(variant));
        }

        session.advance(FlowState::QuantityPending);
        let spec = self.catalog.get(&variant)?;
        Ok(StoreReply::QuantityOptions {
            variant,
            stock,
            tiers: spec.tier_list(),
        })
    }

    /// Pick a tier quantity, or switch to custom entry
    pub fn choose_quantity(&self, buyer: &str, choice: QuantityChoice) -> StoreResult<StoreReply> {
        let cell = self.session(buyer)?;
        let mut session = cell.lock();
        if session.state != FlowState::QuantityPending {
            return Err(StoreError::invalid_transition(format!(
                "quantity choice not expected in {:?}",
                session.state
            )));
        }
        match choice {
            QuantityChoice::Custom => {
                session.advance(FlowState::CustomQuantityPending);
                Ok(StoreReply::CustomQuantityPrompt)
            }
            QuantityChoice::Tier(quantity) => self.place_order(&mut session, quantity),
        }
    }

    /// Parse a custom quantity text. Bad input leaves the session in
    /// the entry state so the buyer can just type again.
    pub fn submit_custom_quantity(&self, buyer: &str, text: &str) -> StoreResult<StoreReply> {
        let cell = self.session(buyer)?;
        let mut session = cell.lock();
        if session.state != FlowState::CustomQuantityPending {
            return Err(StoreError::invalid_transition(format!(
                "custom quantity not expected in {:?}",
                session.state
            )));
        }
        let quantity: u32 = text
            .trim()
            .parse()
            .map_err(|_| StoreError::invalid_quantity(format!("not a number: {}", text.trim())))?;
        self.place_order(&mut session, quantity)
    }

    /// Buyer states the invoice is paid; hands the order to operators
    pub fn claim_payment(&self, buyer: &str, order_id: &str) -> StoreResult<StoreReply> {
        let order = self.owned_order(buyer, order_id)?;
        let cell = self.session(buyer)?;
        let mut session = cell.lock();
        self.expect_awaiting_payment(&session, order_id)?;

        session.advance(FlowState::VerificationPending);
        tracing::info!(order_id = %order_id, buyer = %buyer, "payment claimed, awaiting verification");
        self.notifier.operators(
            self.operator_list(),
            OperatorNotice::PaymentClaimed {
                digest: order.digest(),
            },
        );
        Ok(StoreReply::ClaimRegistered {
            order_id: order_id.to_string(),
        })
    }

    /// Buyer asks to attach payment evidence before claiming
    pub fn begin_proof_upload(&self, buyer: &str, order_id: &str) -> StoreResult<StoreReply> {
        self.owned_order(buyer, order_id)?;
        let cell = self.session(buyer)?;
        let mut session = cell.lock();
        self.expect_awaiting_payment(&session, order_id)?;

        session.advance(FlowState::ProofPending);
        Ok(StoreReply::ProofUploadReady {
            order_id: order_id.to_string(),
        })
    }

    /// Buyer submits payment evidence; forwards it to operators and
    /// registers the claim in one step
    pub fn submit_proof(
        &self,
        buyer: &str,
        order_id: &str,
        proof: PaymentProof,
    ) -> StoreResult<StoreReply> {
        let order = self.owned_order(buyer, order_id)?;
        let cell = self.session(buyer)?;
        let mut session = cell.lock();
        self.expect_awaiting_payment(&session, order_id)?;

        session.advance(FlowState::VerificationPending);
        tracing::info!(order_id = %order_id, buyer = %buyer, "payment proof submitted");
        self.notifier.operators(
            self.operator_list(),
            OperatorNotice::ProofSubmitted {
                digest: order.digest(),
                proof,
            },
        );
        Ok(StoreReply::ProofForwarded {
            order_id: order_id.to_string(),
        })
    }

    /// Abandon the current flow. Orders already created stay in the
    /// ledger; with no live session this is a quiet no-op.
    pub fn cancel(&self, buyer: &str) -> StoreResult<StoreReply> {
        if self.sessions.get(buyer).is_none() {
            return Ok(StoreReply::Cancelled);
        }
        if self.sessions.remove_if(buyer, SessionContext::can_cancel) {
            tracing::info!(buyer = %buyer, "flow cancelled");
            Ok(StoreReply::Cancelled)
        } else {
            Err(StoreError::invalid_transition(
                "verification in progress, cannot cancel",
            ))
        }
    }

    // ==================== Operator Actions ====================

    /// Verify payment: atomically reserve codes, flip the order and
    /// deliver to the buyer
    pub fn verify_payment(&self, operator: &str, order_id: &str) -> StoreResult<StoreReply> {
        let delivery = self.allocator.verify(operator, order_id)?;

        // The flow is finished for this buyer; a leftover session must
        // not keep resubmitting against a delivered order
        self.sessions.remove_if_bound(&delivery.buyer_id, order_id);

        let display = self
            .catalog
            .get(&delivery.variant)
            .map(|spec| spec.display.clone())
            .unwrap_or_else(|_| delivery.variant.clone());
        self.notifier.buyer(
            delivery.buyer_id.clone(),
            BuyerNotice::CodesDelivered {
                order_id: delivery.order_id.clone(),
                variant: display,
                codes: delivery.codes.clone(),
            },
        );
        Ok(StoreReply::Delivered(delivery))
    }

    /// Reject payment. Repeating a rejection is a no-op; the buyer only
    /// hears about the first one.
    pub fn reject_payment(&self, operator: &str, order_id: &str) -> StoreResult<StoreReply> {
        let outcome = self.allocator.reject(operator, order_id)?;
        if outcome == RejectOutcome::Rejected {
            if let Some(order) = self.ledger.snapshot(order_id) {
                self.sessions.remove_if_bound(&order.buyer_id, order_id);
                self.notifier.buyer(
                    order.buyer_id,
                    BuyerNotice::PaymentRejected {
                        order_id: order_id.to_string(),
                    },
                );
            }
        }
        Ok(StoreReply::Rejected {
            order_id: order_id.to_string(),
            outcome,
        })
    }

    /// Add codes to a variant shelf
    pub fn restock(&self, operator: &str, variant: &str, codes: &[String]) -> StoreResult<StoreReply> {
        self.authorize(operator)?;
        self.catalog.get(variant)?;
        let added = self.pool.restock(variant, codes)?;
        let stock = self.pool.stock(variant);
        tracing::info!(operator = %operator, variant = %variant, added, stock, "restocked");
        Ok(StoreReply::Restocked {
            variant: variant.to_string(),
            added,
            stock,
        })
    }

    /// Queue a broadcast to every registered buyer except operators
    pub fn broadcast(&self, operator: &str, content: BroadcastContent) -> StoreResult<StoreReply> {
        self.authorize(operator)?;
        let recipients = self.registry.recipients_excluding(&self.operators);
        let count = recipients.len();
        tracing::info!(operator = %operator, recipients = count, "broadcast queued");
        self.notifier.broadcast(recipients, content);
        Ok(StoreReply::BroadcastQueued { recipients: count })
    }

    // ==================== Queries ====================

    /// Available stock per variant (public, no authorization)
    pub fn stock_report(&self) -> BTreeMap<String, u32> {
        self.pool.stock_counts()
    }

    /// Sales totals and stock levels (operator only)
    pub fn sales_summary(&self, operator: &str) -> StoreResult<SalesSummary> {
        self.authorize(operator)?;
        let orders = self.ledger.all();
        Ok(SalesSummary {
            total_orders: orders.len(),
            paid_orders: orders.iter().filter(|o| o.is_paid()).count(),
            pending_orders: orders.iter().filter(|o| o.is_pending()).count(),
            stock: self.pool.stock_counts(),
        })
    }

    /// Orders awaiting a decision, oldest first (operator only)
    pub fn pending_report(&self, operator: &str) -> StoreResult<Vec<OrderDigest>> {
        self.authorize(operator)?;
        Ok(self
            .ledger
            .list_pending()
            .iter()
            .map(Order::digest)
            .collect())
    }

    /// Point-in-time snapshot of one order
    pub fn order(&self, order_id: &str) -> Option<Order> {
        self.ledger.snapshot(order_id)
    }

    /// Notices that failed at the gateway since startup
    pub fn notice_failures(&self) -> u64 {
        self.notifier.failure_count()
    }

    // ==================== Internals ====================

    fn authorize(&self, operator: &str) -> StoreResult<()> {
        if self.operators.contains(operator) {
            Ok(())
        } else {
            Err(StoreError::Unauthorized)
        }
    }

    fn offers(&self) -> Vec<VariantOffer> {
        self.catalog
            .specs()
            .map(|spec| spec.offer(self.pool.stock(&spec.id)))
            .collect()
    }

    fn session(&self, buyer: &str) -> StoreResult<Arc<Mutex<SessionContext>>> {
        self.sessions
            .get(buyer)
            .ok_or_else(|| StoreError::invalid_transition("no active session"))
    }

    fn session_variant(&self, session: &SessionContext) -> StoreResult<String> {
        session
            .variant
            .clone()
            .ok_or_else(|| StoreError::invalid_transition("no variant selected"))
    }

    /// An order is claimable or proof-attachable while the session sits
    /// in the invoice states and is bound to that same order
    fn expect_awaiting_payment(
        &self,
        session: &SessionContext,
        order_id: &str,
    ) -> StoreResult<()> {
        if !matches!(
            session.state,
            FlowState::PaymentPending | FlowState::ProofPending
        ) {
            return Err(StoreError::invalid_transition(format!(
                "payment step not expected in {:?}",
                session.state
            )));
        }
        if session.order_id.as_deref() != Some(order_id) {
            return Err(StoreError::invalid_transition(
                "claim does not match the active order",
            ));
        }
        Ok(())
    }

    fn operator_list(&self) -> Vec<String> {
        let mut operators: Vec<String> = self.operators.iter().cloned().collect();
        operators.sort();
        operators
    }

    /// Lock in a quantity: validate bounds and advisory stock, quote the
    /// amount, create the order and issue the invoice. The authoritative
    /// stock check happens later, at verification.
    fn place_order(&self, session: &mut SessionContext, quantity: u32) -> StoreResult<StoreReply> {
        let variant = self.session_variant(session)?;
        if quantity < 1 || quantity > self.max_per_order {
            return Err(StoreError::invalid_quantity(format!(
                "must be between 1 and {}",
                self.max_per_order
            )));
        }
        let available = self.pool.stock(&variant);
        if available == 0 {
            return Err(StoreError::out_of_stock(variant));
        }
        if available < quantity {
            return Err(StoreError::InsufficientStock {
                available,
                requested: quantity,
            });
        }
        let amount = self.catalog.quote(&variant, quantity)?;
        let order = self.ledger.create(
            &session.buyer_id,
            &session.buyer_name,
            &variant,
            quantity,
            amount,
        );
        session.order_id = Some(order.id.clone());
        session.advance(FlowState::PaymentPending);
        tracing::info!(
            order_id = %order.id,
            buyer = %order.buyer_id,
            variant = %variant,
            quantity,
            amount,
            "order created, invoice issued"
        );

        let digest = order.digest();
        self.notifier.buyer(
            order.buyer_id,
            BuyerNotice::Invoice {
                digest: digest.clone(),
                payment_window_mins: self.payment_window_mins,
            },
        );
        Ok(StoreReply::InvoiceIssued { digest })
    }

    /// Find an order and check the caller owns it. A foreign order id
    /// reads as not-found so buyers cannot discover each other's orders.
    fn owned_order(&self, buyer: &str, order_id: &str) -> StoreResult<Order> {
        let order = self
            .ledger
            .snapshot(order_id)
            .ok_or_else(|| StoreError::order_not_found(order_id))?;
        if order.buyer_id != buyer {
            return Err(StoreError::order_not_found(order_id));
        }
        Ok(order)
    }
}
