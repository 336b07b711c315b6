//! # Money Module
//!
//! Provides the `Money` type for prices and transaction totals.
//!
//! ## Whole Units Only
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  The backend prices in yen, which has no minor unit.                    │
//! │                                                                         │
//! │    PRICE: 150        → Money(150)  → "150円"                            │
//! │    TOTAL_AMT: 450    → Money(450)  → "450円"                            │
//! │                                                                         │
//! │  A JSON number like 150.0 is accepted only if it is integral.           │
//! │  150.5 never becomes Money: the wire layer rejects it.                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use till_core::money::Money;
//!
//! let tea = Money::from_amount(150);
//! let total: Money = [tea, tea].into_iter().sum();
//! assert_eq!(total.amount(), 300);
//! assert_eq!(total.display_with("円"), "300円");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::Add;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary amount in whole currency units.
///
/// ## Design Decisions
/// - **i64 (signed)**: a negative value is representable, so validation
///   rejects it explicitly instead of failing to parse
/// - **Single field tuple struct**: zero-cost over i64
/// - **Transparent serde**: serializes as a bare JSON integer, matching
///   the backend's `PRICE` / `TOTAL_AMT` fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from whole currency units.
    #[inline]
    pub const fn from_amount(amount: i64) -> Self {
        Money(amount)
    }

    /// Returns the amount in whole currency units.
    #[inline]
    pub const fn amount(&self) -> i64 {
        self.0
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Formats the amount followed by a currency suffix.
    ///
    /// ```rust
    /// use till_core::money::Money;
    ///
    /// assert_eq!(Money::from_amount(150).display_with("円"), "150円");
    /// assert_eq!(Money::from_amount(-20).display_with(" JPY"), "-20 JPY");
    /// ```
    pub fn display_with(&self, suffix: &str) -> String {
        format!("{}{}", self.0, suffix)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Bare amount, no currency. UI code goes through `display_with`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Saturates at the `i64` bounds instead of overflowing.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

/// Summing line prices into a cart total.
impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
