//! # Session Reducer
//!
//! The whole cashier session as one explicit state record, advanced only by
//! `Session::reduce`.
//!
//! ## State Machine
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Session Transitions                                  │
//! │                                                                         │
//! │  Action                     State change                 Effect         │
//! │  ──────                     ────────────                 ──────         │
//! │  InputChanged(s)            input = s                    -              │
//! │  LookupRequested            validate input               FetchProduct   │
//! │    └ empty / invalid        status = Error               -              │
//! │  LookupResolved(t, Ok)      staged = p, status = Idle    -              │
//! │  LookupResolved(t, Err)     staged = ∅, status = Error   -              │
//! │  AddStaged                  cart += staged, staged = ∅,  -              │
//! │                             input = "", status = Idle                   │
//! │  RemoveLine(id)/RemoveAt(i) cart -= line                 -              │
//! │  CheckoutRequested                                                      │
//! │    └ cart empty             status = EmptyCartWarning    -              │
//! │    └ otherwise              pending = t                  SubmitTx       │
//! │  CheckoutResolved(t, Ok)    cart -= submitted lines,     -              │
//! │                             status = Idle, receipt                      │
//! │  CheckoutResolved(t, Err)   status = Error (cart kept)   -              │
//! │                                                                         │
//! │  Outcomes whose ticket is not the one pending are ignored.              │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The reducer performs no I/O. It returns an [`Effect`] describing the
//! request to make; the register controller in till-client performs it and
//! feeds the outcome back as another [`Action`].

use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::error::{CartError, CheckoutError, LookupError, PosError};
use crate::types::{IdempotencyKey, LineId, Product, Receipt, Ticket};
use crate::validation::normalize_product_code;

// =============================================================================
// Status
// =============================================================================

/// What the status region shows. Exactly one state at a time.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Status {
    /// Show the staged product, or placeholders.
    #[default]
    Idle,

    /// Show this error in place of the staged product.
    Error(PosError),

    /// Show the empty-cart notice in the cart panel.
    EmptyCartWarning,
}

impl Status {
    pub fn is_idle(&self) -> bool {
        matches!(self, Status::Idle)
    }

    /// User-facing text for the current state, if any.
    pub fn message(&self) -> Option<String> {
        match self {
            Status::Idle => None,
            Status::Error(e) => Some(e.to_string()),
            Status::EmptyCartWarning => Some(CheckoutError::EmptyCart.to_string()),
        }
    }

    pub fn error(&self) -> Option<&PosError> {
        match self {
            Status::Error(e) => Some(e),
            _ => None,
        }
    }
}

// =============================================================================
// Actions & Effects
// =============================================================================

/// Everything that can happen to a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// The code entry text changed.
    InputChanged(String),

    /// The lookup button was pressed.
    LookupRequested,

    /// A lookup dispatched with `ticket` finished.
    LookupResolved {
        ticket: Ticket,
        outcome: Result<Product, LookupError>,
    },

    /// The add-to-cart button was pressed.
    AddStaged,

    /// Remove a cart line by identity.
    RemoveLine(LineId),

    /// Remove a cart line by display position.
    RemoveAt(usize),

    /// The purchase button was pressed.
    CheckoutRequested,

    /// A checkout dispatched with `ticket` finished.
    CheckoutResolved {
        ticket: Ticket,
        outcome: Result<Receipt, CheckoutError>,
    },

    /// The operator code for subsequent checkouts changed.
    OperatorChanged(String),
}

/// A request the controller must perform on the session's behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// `GET {base}/products/{code}`
    FetchProduct { ticket: Ticket, code: String },

    /// `POST {base}/transactions`
    SubmitTransaction(CheckoutRequest),
}

/// Everything the checkout adapter needs, captured at dispatch time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckoutRequest {
    pub ticket: Ticket,

    /// Empty string lets the backend pick its default operator.
    pub operator_code: String,

    /// Cart snapshots in display order.
    pub items: Vec<Product>,

    pub idempotency_key: IdempotencyKey,
}

/// Why an action left the session untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ignored {
    /// Lookup outcome for a ticket that is no longer the latest.
    StaleLookup,

    /// Checkout outcome for a ticket that is not pending.
    StaleCheckout,

    /// Purchase pressed while a submission is still outstanding.
    CheckoutInFlight,

    /// Add pressed with nothing staged.
    NothingStaged,
}

/// Result of one reducer step.
#[derive(Debug, Clone)]
#[must_use]
pub struct Transition {
    pub session: Session,
    pub effect: Option<Effect>,
    pub ignored: Option<Ignored>,
}

impl Transition {
    fn applied(session: Session) -> Self {
        Transition {
            session,
            effect: None,
            ignored: None,
        }
    }

    fn with_effect(session: Session, effect: Effect) -> Self {
        Transition {
            session,
            effect: Some(effect),
            ignored: None,
        }
    }

    fn ignored(session: Session, reason: Ignored) -> Self {
        Transition {
            session,
            effect: None,
            ignored: Some(reason),
        }
    }
}

// =============================================================================
// Display Regions
// =============================================================================

/// What the lookup panel shows. The error and the product share one region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupPanel<'a> {
    Message(String),
    Staged(&'a Product),
    Placeholder,
}

// =============================================================================
// Session
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingCheckout {
    ticket: Ticket,
    lines: Vec<LineId>,
}

/// One cashier session. Nothing here outlives the process.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    input: String,
    staged: Option<Product>,
    cart: Cart,
    status: Status,
    last_receipt: Option<Receipt>,
    operator_code: String,
    next_ticket: Ticket,
    pending_lookup: Option<Ticket>,
    pending_checkout: Option<PendingCheckout>,
    checkout_key: Option<IdempotencyKey>,
}

impl Default for Session {
    fn default() -> Self {
        Session::new("")
    }
}

impl Session {
    /// Fresh session: empty input, nothing staged, empty cart.
    pub fn new(operator_code: impl Into<String>) -> Self {
        Session {
            input: String::new(),
            staged: None,
            cart: Cart::new(),
            status: Status::Idle,
            last_receipt: None,
            operator_code: operator_code.into(),
            next_ticket: Ticket::new(1),
            pending_lookup: None,
            pending_checkout: None,
            checkout_key: None,
        }
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    pub fn input(&self) -> &str {
        &self.input
    }

    pub fn staged(&self) -> Option<&Product> {
        self.staged.as_ref()
    }

    /// The staged product, or the sentinel when nothing is staged.
    pub fn staged_or_sentinel(&self) -> Product {
        self.staged.clone().unwrap_or_else(Product::sentinel)
    }

    /// Whether the add-to-cart control is enabled.
    pub fn can_add(&self) -> bool {
        self.staged.is_some()
    }

    pub fn cart(&self) -> &Cart {
        &self.cart
    }

    pub fn status(&self) -> &Status {
        &self.status
    }

    pub fn last_receipt(&self) -> Option<&Receipt> {
        self.last_receipt.as_ref()
    }

    pub fn operator_code(&self) -> &str {
        &self.operator_code
    }

    pub fn pending_lookup(&self) -> Option<Ticket> {
        self.pending_lookup
    }

    pub fn pending_checkout(&self) -> Option<Ticket> {
        self.pending_checkout.as_ref().map(|p| p.ticket)
    }

    /// Key that the next checkout of the current cart will carry.
    pub fn checkout_key(&self) -> Option<&IdempotencyKey> {
        self.checkout_key.as_ref()
    }

    /// Lookup panel content.
    pub fn lookup_panel(&self) -> LookupPanel<'_> {
        if let Status::Error(e) = &self.status {
            return LookupPanel::Message(e.to_string());
        }
        match &self.staged {
            Some(p) => LookupPanel::Staged(p),
            None => LookupPanel::Placeholder,
        }
    }

    /// Cart panel notice, shown above the lines.
    pub fn cart_warning(&self) -> Option<String> {
        match self.status {
            Status::EmptyCartWarning => self.status.message(),
            _ => None,
        }
    }

    // =========================================================================
    // Reducer
    // =========================================================================

    /// Applies one action and returns the next session plus any effect.
    pub fn reduce(self, action: Action) -> Transition {
        match action {
            Action::InputChanged(text) => {
                let mut next = self;
                next.input = text;
                Transition::applied(next)
            }
            Action::LookupRequested => self.request_lookup(),
            Action::LookupResolved { ticket, outcome } => self.resolve_lookup(ticket, outcome),
            Action::AddStaged => self.add_staged(),
            Action::RemoveLine(line) => {
                let mut next = self;
                let result = next.cart.remove(line).map(|_| ());
                next.after_removal(result)
            }
            Action::RemoveAt(index) => {
                let mut next = self;
                let result = next.cart.remove_at(index).map(|_| ());
                next.after_removal(result)
            }
            Action::CheckoutRequested => self.request_checkout(),
            Action::CheckoutResolved { ticket, outcome } => self.resolve_checkout(ticket, outcome),
            Action::OperatorChanged(code) => {
                let mut next = self;
                next.operator_code = code;
                Transition::applied(next)
            }
        }
    }

    fn issue_ticket(&mut self) -> Ticket {
        let ticket = self.next_ticket;
        self.next_ticket = ticket.next();
        ticket
    }

    fn request_lookup(mut self) -> Transition {
        let code = match normalize_product_code(&self.input) {
            Ok(code) => code,
            Err(e) => {
                let err = LookupError::from(e);
                // An older in-flight lookup must not overwrite this error.
                self.pending_lookup = None;
                self.status = Status::Error(err.into());
                return Transition::applied(self);
            }
        };

        let ticket = self.issue_ticket();
        self.pending_lookup = Some(ticket);
        if matches!(self.status, Status::Error(_)) {
            self.status = Status::Idle;
        }

        Transition::with_effect(self, Effect::FetchProduct { ticket, code })
    }

    fn resolve_lookup(mut self, ticket: Ticket, outcome: Result<Product, LookupError>) -> Transition {
        if self.pending_lookup != Some(ticket) {
            return Transition::ignored(self, Ignored::StaleLookup);
        }
        self.pending_lookup = None;

        match outcome {
            Ok(product) => {
                self.staged = Some(product);
                self.status = Status::Idle;
            }
            Err(e) => {
                self.staged = None;
                self.status = Status::Error(e.into());
            }
        }

        Transition::applied(self)
    }

    fn add_staged(mut self) -> Transition {
        let Some(product) = self.staged.take() else {
            return Transition::ignored(self, Ignored::NothingStaged);
        };

        match self.cart.add(&product) {
            Ok(_) => {
                self.input.clear();
                self.status = Status::Idle;
                self.last_receipt = None;
                self.checkout_key = None;
            }
            Err(e) => {
                self.staged = Some(product);
                self.status = Status::Error(e.into());
            }
        }

        Transition::applied(self)
    }

    fn after_removal(mut self, result: Result<(), CartError>) -> Transition {
        match result {
            Ok(()) => self.checkout_key = None,
            Err(e) => self.status = Status::Error(e.into()),
        }
        Transition::applied(self)
    }

    fn request_checkout(mut self) -> Transition {
        if self.pending_checkout.is_some() {
            return Transition::ignored(self, Ignored::CheckoutInFlight);
        }

        if self.cart.is_empty() {
            self.status = Status::EmptyCartWarning;
            return Transition::applied(self);
        }

        let ticket = self.issue_ticket();
        let idempotency_key = self
            .checkout_key
            .get_or_insert_with(IdempotencyKey::generate)
            .clone();

        self.pending_checkout = Some(PendingCheckout {
            ticket,
            lines: self.cart.iter().map(|i| i.line).collect(),
        });

        let request = CheckoutRequest {
            ticket,
            operator_code: self.operator_code.clone(),
            items: self.cart.products(),
            idempotency_key,
        };

        Transition::with_effect(self, Effect::SubmitTransaction(request))
    }

    fn resolve_checkout(
        mut self,
        ticket: Ticket,
        outcome: Result<Receipt, CheckoutError>,
    ) -> Transition {
        let pending = match self.pending_checkout.take() {
            Some(p) if p.ticket == ticket => p,
            other => {
                self.pending_checkout = other;
                return Transition::ignored(self, Ignored::StaleCheckout);
            }
        };

        match outcome {
            Ok(receipt) => {
                // Lines added while the submission was in flight stay.
                // Submitted lines the cashier removed meanwhile are already gone.
                for line in pending.lines {
                    if self.cart.get(line).is_some() {
                        let _ = self.cart.remove(line);
                    }
                }
                self.status = Status::Idle;
                self.last_receipt = Some(receipt);
                self.checkout_key = None;
            }
            Err(e) => {
                self.status = Status::Error(e.into());
            }
        }

        Transition::applied(self)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
