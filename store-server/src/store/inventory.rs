//! Inventory pool - per-variant FIFO shelves of single-use codes
//!
//! The pool is the only component that hands codes out. `reserve` runs
//! the capacity check and the removal inside one critical section, so a
//! passing check can never be invalidated before the codes come off the
//! shelf. Callers must not pre-check stock and reserve as two steps;
//! any stock reads outside this module are advisory.

use std::collections::{BTreeMap, HashMap, HashSet, VecDeque};

use parking_lot::Mutex;

use shared::{StoreError, StoreResult};

/// Shared pool of codes across all variants
#[derive(Debug)]
pub struct InventoryPool {
    inner: Mutex<PoolState>,
}

#[derive(Debug, Default)]
struct PoolState {
    /// Unused codes per variant, oldest first
    shelves: HashMap<String, VecDeque<String>>,
    /// Every code currently sitting on some shelf
    available: HashSet<String>,
    /// Codes already handed out, across all variants; never shrinks
    consumed: HashSet<String>,
}

impl InventoryPool {
    /// Create a pool with one empty shelf per catalog variant
    pub fn new<I, S>(variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let shelves = variants
            .into_iter()
            .map(|v| (v.into(), VecDeque::new()))
            .collect();
        Self {
            inner: Mutex::new(PoolState {
                shelves,
                available: HashSet::new(),
                consumed: HashSet::new(),
            }),
        }
    }

    /// Available count for one variant (0 for an unknown variant)
    pub fn stock(&self, variant: &str) -> u32 {
        let state = self.inner.lock();
        state
            .shelves
            .get(variant)
            .map(|shelf| shelf.len() as u32)
            .unwrap_or(0)
    }

    /// Available count per variant, in stable order
    pub fn stock_counts(&self) -> BTreeMap<String, u32> {
        let state = self.inner.lock();
        state
            .shelves
            .iter()
            .map(|(variant, shelf)| (variant.clone(), shelf.len() as u32))
            .collect()
    }

    /// Total available count across all variants
    pub fn total_available(&self) -> u32 {
        let state = self.inner.lock();
        state.shelves.values().map(|shelf| shelf.len() as u32).sum()
    }

    /// Whether a code has ever been handed out
    pub fn is_consumed(&self, code: &str) -> bool {
        self.inner.lock().consumed.contains(code)
    }

    /// Atomically take `quantity` codes off the variant shelf, oldest
    /// first, and record them as consumed.
    ///
    /// All-or-nothing: when the shelf holds fewer than `quantity`, the
    /// call fails and the shelf is untouched.
    pub fn reserve(&self, variant: &str, quantity: u32) -> StoreResult<Vec<String>> {
        let mut state = self.inner.lock();
        let shelf = state
            .shelves
            .get_mut(variant)
            .ok_or_else(|| StoreError::unknown_variant(variant))?;
        let available = shelf.len() as u32;
        if available == 0 {
            return Err(StoreError::out_of_stock(variant));
        }
        if available < quantity {
            return Err(StoreError::InsufficientStock {
                available,
                requested: quantity,
            });
        }
        let codes: Vec<String> = shelf.drain(..quantity as usize).collect();
        let remaining = shelf.len();
        for code in &codes {
            state.available.remove(code);
            state.consumed.insert(code.clone());
        }
        tracing::debug!(variant = %variant, quantity, remaining, "codes reserved");
        Ok(codes)
    }

    /// Add codes to the variant shelf, returning how many were added.
    ///
    /// A code that is already on any shelf, or was ever handed out, is
    /// skipped. Submitting the same batch twice therefore adds nothing
    /// the second time.
    pub fn restock(&self, variant: &str, codes: &[String]) -> StoreResult<u32> {
        let mut state = self.inner.lock();
        if !state.shelves.contains_key(variant) {
            return Err(StoreError::unknown_variant(variant));
        }
        let mut accepted = Vec::new();
        for code in codes {
            if state.consumed.contains(code) || state.available.contains(code) {
                continue;
            }
            state.available.insert(code.clone());
            accepted.push(code.clone());
        }
        let added = accepted.len() as u32;
        if let Some(shelf) = state.shelves.get_mut(variant) {
            shelf.extend(accepted);
        }
        Ok(added)
    }
}
