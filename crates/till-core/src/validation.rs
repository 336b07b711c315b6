//! # Validation Module
//!
//! Input validation for the cashier session and for decoded backend data.
//!
//! ## Validation Layers
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Validation Layers                                  │
//! │                                                                         │
//! │  Layer 1: Session reducer (this module)                                │
//! │  ├── Scanned code: trimmed, non-empty, bounded, printable              │
//! │  └── Fails before any request is dispatched                            │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 2: Wire decoding (till-client)                                  │
//! │  ├── Schema shape (serde)                                              │
//! │  └── THIS MODULE: validate_product on the decoded record               │
//! │           │                                                             │
//! │           ▼                                                             │
//! │  Layer 3: Backend                                                      │
//! │  └── Master data lookup, transaction rules                             │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use till_core::validation::normalize_product_code;
//!
//! assert_eq!(normalize_product_code("  4901234567894\n").unwrap(), "4901234567894");
//! assert!(normalize_product_code("   ").is_err());
//! ```

use crate::error::ValidationError;
use crate::types::Product;
use crate::MAX_CART_ITEMS;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Longest product code the client will send.
pub const MAX_CODE_LEN: usize = 64;

/// Longest operator code the client will send.
pub const MAX_OPERATOR_LEN: usize = 32;

/// Highest unit price accepted from the backend.
pub const MAX_PRICE: i64 = 100_000_000;

// =============================================================================
// String Validators
// =============================================================================

/// Trims and validates a scanned or typed product code.
///
/// ## Rules
/// - Surrounding whitespace is removed (scanners often append `\n`)
/// - Must not be empty after trimming
/// - At most `MAX_CODE_LEN` characters
/// - No control characters inside the code
/// - Not `.` or `..`, which URL path resolution would swallow
///
/// ## Returns
/// The trimmed code, ready to be placed in the request path.
pub fn normalize_product_code(raw: &str) -> ValidationResult<String> {
    let code = raw.trim();

    if code.is_empty() {
        return Err(ValidationError::Required {
            field: "product code".to_string(),
        });
    }

    if code.chars().count() > MAX_CODE_LEN {
        return Err(ValidationError::TooLong {
            field: "product code".to_string(),
            max: MAX_CODE_LEN,
        });
    }

    if code.chars().any(char::is_control) {
        return Err(ValidationError::InvalidFormat {
            field: "product code".to_string(),
            reason: "must not contain control characters".to_string(),
        });
    }

    if code == "." || code == ".." {
        return Err(ValidationError::InvalidFormat {
            field: "product code".to_string(),
            reason: "must not be a dot segment".to_string(),
        });
    }

    Ok(code.to_string())
}

/// Validates an operator (employee) code.
///
/// ## Rules
/// - Empty is allowed: the backend substitutes its own default operator
/// - At most `MAX_OPERATOR_LEN` characters
/// - No whitespace or control characters
pub fn validate_operator_code(code: &str) -> ValidationResult<()> {
    if code.chars().count() > MAX_OPERATOR_LEN {
        return Err(ValidationError::TooLong {
            field: "operator code".to_string(),
            max: MAX_OPERATOR_LEN,
        });
    }

    if code.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(ValidationError::InvalidFormat {
            field: "operator code".to_string(),
            reason: "must not contain whitespace".to_string(),
        });
    }

    Ok(())
}

// =============================================================================
// Numeric Validators
// =============================================================================

/// Validates a price amount.
///
/// ## Rules
/// - Must be non-negative (>= 0)
/// - Zero is allowed (free items)
/// - At most `MAX_PRICE`
pub fn validate_price(amount: i64) -> ValidationResult<()> {
    if !(0..=MAX_PRICE).contains(&amount) {
        return Err(ValidationError::OutOfRange {
            field: "price".to_string(),
            min: 0,
            max: MAX_PRICE,
        });
    }

    Ok(())
}

// =============================================================================
// Record Validators
// =============================================================================

/// Validates a product decoded from the backend before it may be staged.
///
/// A staged product must be fully populated: positive id, non-empty name and
/// code, a price within `0..=MAX_PRICE`. Anything else would let the sentinel (or a
/// half-filled record) reach the cart.
pub fn validate_product(product: &Product) -> ValidationResult<()> {
    if product.id <= 0 {
        return Err(ValidationError::OutOfRange {
            field: "PRD_ID".to_string(),
            min: 1,
            max: i64::MAX,
        });
    }

    if product.name.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "NAME".to_string(),
        });
    }

    if product.code.trim().is_empty() {
        return Err(ValidationError::Required {
            field: "CODE".to_string(),
        });
    }

    validate_price(product.price.amount())
}

// =============================================================================
// Collection Validators
// =============================================================================

/// Validates that one more line fits in the cart.
///
/// ## Rules
/// - Must not exceed MAX_CART_ITEMS (100)
pub fn validate_cart_size(current_items: usize) -> ValidationResult<()> {
    if current_items >= MAX_CART_ITEMS {
        return Err(ValidationError::OutOfRange {
            field: "cart items".to_string(),
            min: 0,
            max: MAX_CART_ITEMS as i64,
        });
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================
