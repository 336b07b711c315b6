//! # Cart Store
//!
//! Ordered sequence of cart lines for the current session.
//!
//! ## Cart Operations Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Cart Store Operations                                │
//! │                                                                         │
//! │  Session Action           Cart Method             Sequence Change       │
//! │  ──────────────           ───────────             ───────────────       │
//! │                                                                         │
//! │  AddStaged ──────────────► add(product) ────────► items.push(line)     │
//! │                                                                         │
//! │  RemoveLine(id) ─────────► remove(id) ──────────► items.remove(pos)    │
//! │                                                                         │
//! │  (checked positional) ───► remove_at(i) ────────► items.remove(i)      │
//! │                                                                         │
//! │  CheckoutResolved(Ok) ───► remove(id) per line ─► submitted lines gone │
//! │                                                                         │
//! │  NOTE: no network, no merging. Two scans of one product = two lines.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::{CartError, CartResult};
use crate::money::Money;
use crate::types::{CartItem, LineId, Product};
use crate::validation::validate_cart_size;
use crate::MAX_CART_ITEMS;

/// The shopping cart.
///
/// ## Invariants
/// - Never contains the sentinel product
/// - Order is insertion order; removal shifts later lines down by one
/// - `LineId`s are unique and never reused, even across `clear()`
/// - At most `MAX_CART_ITEMS` lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Cart {
    items: Vec<CartItem>,

    /// Next line identity to hand out.
    next_line: u64,
}

impl Cart {
    /// Creates a new empty cart.
    pub fn new() -> Self {
        Cart {
            items: Vec::new(),
            next_line: 1,
        }
    }

    /// Appends a snapshot of `product` as a new line.
    ///
    /// ## Returns
    /// - `Ok(LineId)` of the new line
    /// - `Err(CartError::NothingStaged)` for the sentinel product
    /// - `Err(CartError::Full)` when the cart is at capacity
    pub fn add(&mut self, product: &Product) -> CartResult<LineId> {
        if product.is_sentinel() {
            return Err(CartError::NothingStaged);
        }

        validate_cart_size(self.items.len()).map_err(|_| CartError::Full {
            max: MAX_CART_ITEMS,
        })?;

        let line = LineId::new(self.next_line);
        self.next_line += 1;

        self.items.push(CartItem {
            line,
            product: product.clone(),
            added_at: Utc::now(),
        });

        Ok(line)
    }

    /// Removes the line with the given identity.
    pub fn remove(&mut self, line: LineId) -> CartResult<CartItem> {
        let index = self.position(line).ok_or(CartError::LineNotFound(line))?;
        Ok(self.items.remove(index))
    }

    /// Removes the line at `index`; later lines shift down.
    ///
    /// Out of range is a reported precondition violation, not a no-op.
    pub fn remove_at(&mut self, index: usize) -> CartResult<CartItem> {
        if index >= self.items.len() {
            return Err(CartError::IndexOutOfRange {
                index,
                len: self.items.len(),
            });
        }
        Ok(self.items.remove(index))
    }

    /// Clears all lines from the cart.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Returns the number of lines.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Checks if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Lines in display order.
    pub fn items(&self) -> &[CartItem] {
        &self.items
    }

    pub fn iter(&self) -> std::slice::Iter<'_, CartItem> {
        self.items.iter()
    }

    /// Looks up a line by identity.
    pub fn get(&self, line: LineId) -> Option<&CartItem> {
        self.items.iter().find(|i| i.line == line)
    }

    /// Current display position of a line.
    pub fn position(&self, line: LineId) -> Option<usize> {
        self.items.iter().position(|i| i.line == line)
    }

    /// Line identity at a display position.
    pub fn line_at(&self, index: usize) -> Option<LineId> {
        self.items.get(index).map(|i| i.line)
    }

    /// Product snapshots in order, as submitted at checkout.
    pub fn products(&self) -> Vec<Product> {
        self.items.iter().map(|i| i.product.clone()).collect()
    }

    /// Sum of line prices. Informational; the backend's total is authoritative.
    pub fn total(&self) -> Money {
        self.items.iter().map(CartItem::price).sum()
    }
}

impl Default for Cart {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a Cart {
    type Item = &'a CartItem;
    type IntoIter = std::slice::Iter<'a, CartItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

/// Cart summary for display.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartSummary {
    pub line_count: usize,
    pub total: Money,
}

impl From<&Cart> for CartSummary {
    fn from(cart: &Cart) -> Self {
        CartSummary {
            line_count: cart.len(),
            total: cart.total(),
        }
    }
}
