//! # Domain Types
//!
//! Core domain types used throughout Till.
//!
//! ## Type Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Product      │   │    CartItem     │   │    Receipt      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (0=absent)  │   │  line (LineId)  │   │  total          │       │
//! │  │  name           │──►│  product (snap) │   │  line_count     │       │
//! │  │  code           │   │  added_at       │   │  completed_at   │       │
//! │  │  price          │   └─────────────────┘   └─────────────────┘       │
//! │  └─────────────────┘                                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐                              │
//! │  │     Ticket      │   │ IdempotencyKey  │                              │
//! │  │  request gen.   │   │  UUID v4        │                              │
//! │  └─────────────────┘   └─────────────────┘                              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Snapshot Pattern
//! A `CartItem` owns a copy of the product as it was when added. Later
//! lookups replace the staged product wholesale and never touch cart lines.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::money::Money;

// =============================================================================
// Product
// =============================================================================

/// A product as returned by the backend's master data.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Backend identifier. `0` is reserved for the sentinel.
    pub id: i64,

    /// Display name shown to the cashier.
    pub name: String,

    /// The scanned identifier (usually an EAN-13).
    pub code: String,

    /// Unit price in whole currency units.
    pub price: Money,
}

impl Product {
    /// The well-known empty product meaning "nothing staged".
    pub fn sentinel() -> Self {
        Product {
            id: 0,
            name: String::new(),
            code: String::new(),
            price: Money::zero(),
        }
    }

    /// Returns true if this is the sentinel (or indistinguishable from it).
    pub fn is_sentinel(&self) -> bool {
        self.id == 0 && self.name.is_empty()
    }
}

impl Default for Product {
    fn default() -> Self {
        Product::sentinel()
    }
}

// =============================================================================
// Line Identity
// =============================================================================

/// Stable identity of one cart line.
///
/// Assigned at add time from a per-cart counter and never reused, so removing
/// a line by identity cannot hit a neighbour after the list shifts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LineId(u64);

impl LineId {
    #[inline]
    pub const fn new(raw: u64) -> Self {
        LineId(raw)
    }

    #[inline]
    pub const fn get(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for LineId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// Cart Item
// =============================================================================

/// One line in the cart: a frozen copy of a staged product.
///
/// Lines are never quantity-merged. Scanning the same tea twice gives two
/// lines, each displayed as `x1`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartItem {
    /// Stable identity for removal.
    pub line: LineId,

    /// Product snapshot at time of add.
    pub product: Product,

    /// When this line was added.
    pub added_at: DateTime<Utc>,
}

impl CartItem {
    /// Line price (always a single unit).
    #[inline]
    pub fn price(&self) -> Money {
        self.product.price
    }
}

// =============================================================================
// Receipt
// =============================================================================

/// What a successful checkout reports back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    /// Total as computed by the backend (`TOTAL_AMT`).
    pub total: Money,

    /// Number of lines that were submitted.
    pub line_count: usize,

    /// When the client observed the success.
    pub completed_at: DateTime<Utc>,
}

impl Receipt {
    pub fn new(total: Money, line_count: usize) -> Self {
        Receipt {
            total,
            line_count,
            completed_at: Utc::now(),
        }
    }
}

// =============================================================================
// Request Tickets
// =============================================================================

/// Request-generation token.
///
/// Every dispatched lookup or checkout gets a fresh ticket. Outcomes are
/// delivered back with their ticket and the session applies only the one it
/// is still waiting for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Ticket(u64);

impl Ticket {
    #[inline]
    pub const fn new(raw: u64) -> Self {
        Ticket(raw)
    }

    #[inline]
    pub const fn get(&self) -> u64 {
        self.0
    }

    /// The ticket issued after this one.
    #[inline]
    pub const fn next(&self) -> Self {
        Ticket(self.0 + 1)
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// =============================================================================
// Idempotency Key
// =============================================================================

/// Key sent with a checkout so a retried submission of the same cart can be
/// recognised by a backend that supports it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    /// Mints a fresh random key.
    pub fn generate() -> Self {
        IdempotencyKey(Uuid::new_v4().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for IdempotencyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
