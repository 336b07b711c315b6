//! # Error Types
//!
//! The error taxonomy of the POS session.
//!
//! ## Error Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Error Types                                     │
//! │                                                                         │
//! │  till-core errors (this file)                                          │
//! │  ├── LookupError      - Product lookup outcomes                        │
//! │  │   EmptyInput, InvalidCode, NotFound, BackendRejected, Unreachable   │
//! │  ├── CheckoutError    - Purchase submission outcomes                   │
//! │  │   EmptyCart, Failed                                                 │
//! │  ├── CartError        - Cart store precondition violations             │
//! │  ├── ValidationError  - Input validation failures                      │
//! │  └── PosError         - Umbrella shown by the status presenter         │
//! │                                                                         │
//! │  till-client errors (separate crate)                                   │
//! │  └── ClientError      - Config / HTTP client construction failures     │
//! │                                                                         │
//! │  Flow: ValidationError → LookupError → PosError → Status::Error → UI   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Design Principles
//! 1. Use `thiserror` for derive macros (not manual impl)
//! 2. `Display` is the user-facing message; the presenter prints it as is
//! 3. Errors are enum variants, never String
//! 4. Errors are `Clone` because they live inside the session state

use thiserror::Error;

use crate::types::LineId;

/// Fallback text when the backend rejects a lookup without a `detail`.
pub const GENERIC_BACKEND_MESSAGE: &str = "An error occurred";

/// Shown when a checkout is rejected or cannot reach the backend.
pub const CHECKOUT_FAILED_MESSAGE: &str = "Failed to register the transaction";

// =============================================================================
// Lookup Error
// =============================================================================

/// Why a product lookup did not stage a product.
///
/// ## Outcome Mapping
/// ```text
/// code.trim() == ""        → EmptyInput        (no request sent)
/// code fails validation    → InvalidCode       (no request sent)
/// HTTP 404                 → NotFound
/// HTTP other non-2xx       → BackendRejected { detail }
/// 200 with a bad body      → BackendRejected { detail: None }
/// no response at all       → Unreachable
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    /// Nothing was typed or scanned.
    #[error("Please enter a product code")]
    EmptyInput,

    /// The code is present but malformed.
    #[error("{0}")]
    InvalidCode(ValidationError),

    /// The backend does not know this code.
    #[error("Product is not registered in master data")]
    NotFound,

    /// The backend answered with a non-success status, or with a body that
    /// does not match the product schema.
    #[error("{}", .detail.as_deref().unwrap_or(GENERIC_BACKEND_MESSAGE))]
    BackendRejected { detail: Option<String> },

    /// The request never produced a response.
    ///
    /// The transport reason is kept for logs; the user sees a fixed message.
    #[error("A server error occurred.")]
    Unreachable { reason: String },
}

impl LookupError {
    /// Creates a `BackendRejected` carrying the server-provided detail.
    pub fn rejected(detail: impl Into<String>) -> Self {
        LookupError::BackendRejected {
            detail: Some(detail.into()),
        }
    }

    /// Creates a `BackendRejected` with the generic message.
    pub fn rejected_generic() -> Self {
        LookupError::BackendRejected { detail: None }
    }

    /// Creates an `Unreachable` from a transport failure description.
    pub fn unreachable(reason: impl Into<String>) -> Self {
        LookupError::Unreachable {
            reason: reason.into(),
        }
    }

    /// Returns true if the failure was decided locally, without a request.
    pub fn is_client_side(&self) -> bool {
        matches!(self, LookupError::EmptyInput | LookupError::InvalidCode(_))
    }
}

/// Missing input reads as `EmptyInput`; every other rejection as `InvalidCode`.
impl From<ValidationError> for LookupError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::Required { .. } => LookupError::EmptyInput,
            other => LookupError::InvalidCode(other),
        }
    }
}

// =============================================================================
// Checkout Error
// =============================================================================

/// Why a purchase was not completed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CheckoutError {
    /// Purchase attempted with nothing in the cart. Client-side only.
    #[error("The cart is empty")]
    EmptyCart,

    /// The backend rejected the transaction, returned an unusable body, or
    /// could not be reached. The cart is kept for a retry.
    #[error("{message}")]
    Failed { message: String },
}

impl CheckoutError {
    /// Creates a `Failed` with the standard message.
    pub fn failed() -> Self {
        CheckoutError::Failed {
            message: CHECKOUT_FAILED_MESSAGE.to_string(),
        }
    }

    /// Creates a `Failed` with a specific message.
    pub fn failed_with(message: impl Into<String>) -> Self {
        CheckoutError::Failed {
            message: message.into(),
        }
    }
}

// =============================================================================
// Cart Error
// =============================================================================

/// Cart store precondition violations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CartError {
    /// Add was requested with no product staged.
    #[error("No product is staged")]
    NothingStaged,

    /// Cart has reached `MAX_CART_ITEMS`.
    #[error("Cart cannot have more than {max} items")]
    Full { max: usize },

    /// Removal by line identity found no such line.
    #[error("Line {0} is not in the cart")]
    LineNotFound(LineId),

    /// Removal by position was out of range.
    #[error("Cart position {index} is out of range (cart has {len} items)")]
    IndexOutOfRange { index: usize, len: usize },
}

// =============================================================================
// Validation Error
// =============================================================================

/// Input validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required field is missing or empty.
    #[error("{field} is required")]
    Required { field: String },

    /// Field value is too long.
    #[error("{field} must be at most {max} characters")]
    TooLong { field: String, max: usize },

    /// Numeric value is out of range.
    #[error("{field} must be between {min} and {max}")]
    OutOfRange { field: String, min: i64, max: i64 },

    /// Invalid format.
    #[error("{field} has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },
}

// =============================================================================
// POS Error
// =============================================================================

/// Any error the status presenter can show.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PosError {
    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    Checkout(#[from] CheckoutError),

    #[error(transparent)]
    Cart(#[from] CartError),
}

/// Convenience type alias for cart operations.
pub type CartResult<T> = Result<T, CartError>;

// =============================================================================
// Unit Tests
// =============================================================================
