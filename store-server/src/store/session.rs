//! Session store - transient per-buyer flow state
//!
//! One live session per buyer, behind its own lock cell. Dropping a
//! session never touches the ledger or the pool; the sweeper prunes
//! sessions idle past the TTL.

use std::sync::Arc;

use dashmap::DashMap;
use parking_lot::Mutex;

use shared::session::SessionContext;

/// Keyed store of live purchase sessions
#[derive(Debug, Default)]
pub struct SessionStore {
    sessions: DashMap<String, Arc<Mutex<SessionContext>>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a fresh session for the buyer, replacing any previous one
    pub fn begin(&self, buyer_id: &str, buyer_name: &str) -> Arc<Mutex<SessionContext>> {
        let cell = Arc::new(Mutex::new(SessionContext::new(buyer_id, buyer_name)));
        self.sessions.insert(buyer_id.to_string(), cell.clone());
        cell
    }

    /// The buyer's live session cell, if any
    pub fn get(&self, buyer_id: &str) -> Option<Arc<Mutex<SessionContext>>> {
        self.sessions
            .get(buyer_id)
            .map(|entry| entry.value().clone())
    }

    /// Drop the buyer's session unconditionally
    pub fn remove(&self, buyer_id: &str) {
        self.sessions.remove(buyer_id);
    }

    /// Drop the buyer's session only when the predicate holds for it.
    /// Returns whether a session was removed.
    pub fn remove_if<F>(&self, buyer_id: &str, predicate: F) -> bool
    where
        F: FnOnce(&SessionContext) -> bool,
    {
        self.sessions
            .remove_if(buyer_id, |_, cell| predicate(&cell.lock()))
            .is_some()
    }

    /// Drop the buyer's session if it is bound to the given order
    pub fn remove_if_bound(&self, buyer_id: &str, order_id: &str) -> bool {
        self.remove_if(buyer_id, |session| {
            session.order_id.as_deref() == Some(order_id)
        })
    }

    /// Drop every session idle for at least `ttl_millis`; returns the
    /// buyer ids whose sessions were dropped
    pub fn remove_idle(&self, ttl_millis: i64, now: i64) -> Vec<String> {
        let mut dropped = Vec::new();
        self.sessions.retain(|buyer_id, cell| {
            let keep = !cell.lock().is_idle_since(ttl_millis, now);
            if !keep {
                dropped.push(buyer_id.clone());
            }
            keep
        });
        dropped
    }

    pub fn len(&self) -> usize {
        self.sessions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty()
    }
}
