//! # till-core: Pure Session Logic for Till POS
//!
//! Everything the cashier screen decides, with no I/O. The register
//! controller in till-client performs the requests this crate asks for.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Till POS Architecture                            │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Terminal (apps/terminal)                     │   │
//! │  │    code entry ──► lookup panel ──► cart panel ──► purchase     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ Register::lookup / add / checkout      │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    till-client                                  │   │
//! │  │    Register controller, HttpBackend, config                    │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ Action in, Transition out              │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ till-core (THIS CRATE) ★                        │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │  session  │  │   cart    │  │   types   │  │ validation│  │   │
//! │  │   │  reducer  │  │  lines    │  │  Product  │  │   codes   │  │   │
//! │  │   │  effects  │  │  LineId   │  │  Ticket   │  │  records  │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO NETWORK • NO FILES • NO TERMINAL                          │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`session`] - The reducer: state, actions, effects
//! - [`cart`] - Ordered cart lines with stable identities
//! - [`types`] - Product, CartItem, Receipt, Ticket, IdempotencyKey
//! - [`money`] - Whole-unit money
//! - [`error`] - Lookup, checkout and cart errors
//! - [`validation`] - Code and record checks
//!
//! ## Example Usage
//!
//! ```rust
//! use till_core::session::{Action, Effect, Session};
//!
//! let session = Session::default().reduce(Action::InputChanged("4901234567894".into())).session;
//! let t = session.reduce(Action::LookupRequested);
//!
//! match t.effect {
//!     Some(Effect::FetchProduct { code, .. }) => assert_eq!(code, "4901234567894"),
//!     other => panic!("unexpected effect: {:?}", other),
//! }
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod cart;
pub mod error;
pub mod money;
pub mod session;
pub mod types;
pub mod validation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use cart::{Cart, CartSummary};
pub use error::{CartError, CheckoutError, LookupError, PosError, ValidationError};
pub use money::Money;
pub use session::{Action, CheckoutRequest, Effect, Ignored, LookupPanel, Session, Status, Transition};
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Maximum lines allowed in a single cart.
///
/// ## Business Reason
/// Keeps a stuck scanner from building an unbounded transaction.
pub const MAX_CART_ITEMS: usize = 100;
