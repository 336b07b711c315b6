//! # Register Controller
//!
//! Drives a `Session` against a `PosBackend`.
//!
//! ## Dispatch Loop
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Register Dispatch                                  │
//! │                                                                         │
//! │   cashier action                                                       │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   Session::reduce(action) ──► Transition { session, effect, ignored }  │
//! │        │                                                                │
//! │        ├── no effect ─────────► done (redraw)                          │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   PendingLookup / PendingCheckout                                      │
//! │        │  .run(backend).await                                          │
//! │        ▼                                                                │
//! │   Action::LookupResolved / CheckoutResolved { ticket, outcome }        │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   Session::reduce(outcome)   (stale tickets are dropped here)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The one-call helpers (`lookup`, `checkout`) await sequentially. The
//! `begin_*` / `run` / `complete` split lets a caller hold several requests
//! open and resolve them in any order.

use tracing::{debug, warn};

use till_core::validation::validate_operator_code;
use till_core::{
    Action, CheckoutRequest, Effect, Ignored, LineId, Session, Ticket, ValidationError,
};

use crate::backend::PosBackend;

// =============================================================================
// Pending Requests
// =============================================================================

/// A lookup the session asked for that has not been performed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct PendingLookup {
    pub ticket: Ticket,
    pub code: String,
}

impl PendingLookup {
    /// Performs the lookup and packages the outcome for the reducer.
    pub async fn run<B: PosBackend + ?Sized>(self, backend: &B) -> Action {
        let outcome = backend.lookup(&self.code).await;
        Action::LookupResolved {
            ticket: self.ticket,
            outcome,
        }
    }
}

/// A checkout the session asked for that has not been performed yet.
#[derive(Debug, Clone, PartialEq, Eq)]
#[must_use]
pub struct PendingCheckout {
    pub request: CheckoutRequest,
}

impl PendingCheckout {
    pub fn ticket(&self) -> Ticket {
        self.request.ticket
    }

    /// Performs the submission and packages the outcome for the reducer.
    pub async fn run<B: PosBackend + ?Sized>(self, backend: &B) -> Action {
        let outcome = backend.checkout(&self.request).await;
        Action::CheckoutResolved {
            ticket: self.request.ticket,
            outcome,
        }
    }
}

/// What the session asked for after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Pending {
    Lookup(PendingLookup),
    Checkout(PendingCheckout),
}

impl From<Effect> for Pending {
    fn from(effect: Effect) -> Self {
        match effect {
            Effect::FetchProduct { ticket, code } => Pending::Lookup(PendingLookup { ticket, code }),
            Effect::SubmitTransaction(request) => Pending::Checkout(PendingCheckout { request }),
        }
    }
}

// =============================================================================
// Register
// =============================================================================

/// One till: a session plus the backend it talks to.
pub struct Register<B: PosBackend> {
    backend: B,
    session: Session,
}

impl<B: PosBackend> Register<B> {
    pub fn new(backend: B, operator_code: impl Into<String>) -> Self {
        Register {
            backend,
            session: Session::new(operator_code),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Feeds one action through the reducer.
    ///
    /// Returns the request the session wants performed, if any.
    pub fn dispatch(&mut self, action: Action) -> Option<Pending> {
        let session = std::mem::take(&mut self.session);
        let transition = session.reduce(action);
        self.session = transition.session;

        if let Some(reason) = transition.ignored {
            match reason {
                Ignored::StaleLookup | Ignored::StaleCheckout => {
                    debug!(?reason, "Dropped outcome of a superseded request")
                }
                Ignored::CheckoutInFlight => warn!("Checkout already in flight; ignoring purchase"),
                Ignored::NothingStaged => debug!("Nothing staged; ignoring add"),
            }
        }

        let pending = transition.effect.map(Pending::from);
        match &pending {
            Some(Pending::Lookup(p)) => debug!(code = %p.code, ticket = %p.ticket, "Dispatching lookup"),
            Some(Pending::Checkout(p)) => debug!(
                ticket = %p.request.ticket,
                lines = p.request.items.len(),
                "Dispatching checkout"
            ),
            None => {}
        }
        pending
    }

    /// Applies a finished request's outcome.
    pub fn complete(&mut self, outcome: Action) {
        // Outcomes never produce follow-up effects.
        let _ = self.dispatch(outcome);
    }

    // =========================================================================
    // Cashier Actions
    // =========================================================================

    /// Replaces the code entry text.
    pub fn set_input(&mut self, text: impl Into<String>) {
        let _ = self.dispatch(Action::InputChanged(text.into()));
    }

    /// Presses lookup without awaiting the request.
    pub fn begin_lookup(&mut self) -> Option<PendingLookup> {
        match self.dispatch(Action::LookupRequested) {
            Some(Pending::Lookup(p)) => Some(p),
            _ => None,
        }
    }

    /// Presses lookup and waits for the outcome.
    pub async fn lookup(&mut self) {
        if let Some(pending) = self.begin_lookup() {
            let outcome = pending.run(&self.backend).await;
            self.complete(outcome);
        }
    }

    /// Adds the staged product to the cart.
    pub fn add_staged(&mut self) {
        let _ = self.dispatch(Action::AddStaged);
    }

    /// Removes a cart line by identity.
    pub fn remove_line(&mut self, line: LineId) {
        let _ = self.dispatch(Action::RemoveLine(line));
    }

    /// Removes the cart line at a 0-based display position.
    pub fn remove_at(&mut self, index: usize) {
        let _ = self.dispatch(Action::RemoveAt(index));
    }

    /// Presses purchase without awaiting the request.
    pub fn begin_checkout(&mut self) -> Option<PendingCheckout> {
        match self.dispatch(Action::CheckoutRequested) {
            Some(Pending::Checkout(p)) => Some(p),
            _ => None,
        }
    }

    /// Presses purchase and waits for the outcome.
    pub async fn checkout(&mut self) {
        if let Some(pending) = self.begin_checkout() {
            let outcome = pending.run(&self.backend).await;
            self.complete(outcome);
        }
    }

    /// Changes the operator code used by later checkouts.
    pub fn set_operator(&mut self, code: impl Into<String>) -> Result<(), ValidationError> {
        let code = code.into();
        validate_operator_code(&code)?;
        let _ = self.dispatch(Action::OperatorChanged(code));
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;
    use till_core::{CheckoutError, LookupError, Money, Product, Receipt, Status};

    /// In-memory backend that records every call.
    #[derive(Default)]
    struct ScriptedBackend {
        products: HashMap<String, Result<Product, LookupError>>,
        checkouts: Mutex<VecDeque<Result<Receipt, CheckoutError>>>,
        lookups_seen: Mutex<Vec<String>>,
        checkouts_seen: Mutex<Vec<CheckoutRequest>>,
    }

    impl ScriptedBackend {
        fn with_product(mut self, product: Product) -> Self {
            self.products.insert(product.code.clone(), Ok(product));
            self
        }

        fn with_lookup_error(mut self, code: &str, err: LookupError) -> Self {
            self.products.insert(code.to_string(), Err(err));
            self
        }

        fn then_checkout(self, outcome: Result<Receipt, CheckoutError>) -> Self {
            self.checkouts.lock().unwrap().push_back(outcome);
            self
        }

        fn lookups(&self) -> Vec<String> {
            self.lookups_seen.lock().unwrap().clone()
        }

        fn checkouts(&self) -> Vec<CheckoutRequest> {
            self.checkouts_seen.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl PosBackend for ScriptedBackend {
        async fn lookup(&self, code: &str) -> Result<Product, LookupError> {
            self.lookups_seen.lock().unwrap().push(code.to_string());
            self.products
                .get(code)
                .cloned()
                .unwrap_or(Err(LookupError::NotFound))
        }

        async fn checkout(&self, request: &CheckoutRequest) -> Result<Receipt, CheckoutError> {
            self.checkouts_seen.lock().unwrap().push(request.clone());
            self.checkouts
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(CheckoutError::failed()))
        }
    }

    fn tea() -> Product {
        Product {
            id: 1,
            name: "Tea".into(),
            code: "4901234567894".into(),
            price: Money::from_amount(150),
        }
    }

    fn coffee() -> Product {
        Product {
            id: 2,
            name: "Coffee".into(),
            code: "4901234567900".into(),
            price: Money::from_amount(180),
        }
    }

    fn receipt(total: i64, lines: usize) -> Result<Receipt, CheckoutError> {
        Ok(Receipt::new(Money::from_amount(total), lines))
    }

    async fn scan_and_add<B: PosBackend>(register: &mut Register<B>, code: &str) {
        register.set_input(code);
        register.lookup().await;
        register.add_staged();
    }

    #[tokio::test]
    async fn test_blank_lookup_makes_no_call() {
        let mut register = Register::new(ScriptedBackend::default(), "");
        register.set_input("   ");
        register.lookup().await;

        assert!(register.backend().lookups().is_empty());
        assert_eq!(
            register.session().status(),
            &Status::Error(LookupError::EmptyInput.into())
        );
    }

    #[tokio::test]
    async fn test_lookup_sends_trimmed_code() {
        let mut register = Register::new(ScriptedBackend::default().with_product(tea()), "");
        register.set_input(" 4901234567894\n");
        register.lookup().await;

        assert_eq!(register.backend().lookups(), vec!["4901234567894"]);
        assert_eq!(register.session().staged(), Some(&tea()));
    }

    #[tokio::test]
    async fn test_empty_cart_checkout_makes_no_call() {
        let mut register = Register::new(ScriptedBackend::default(), "");
        register.checkout().await;

        assert!(register.backend().checkouts().is_empty());
        assert_eq!(register.session().status(), &Status::EmptyCartWarning);
    }

    #[tokio::test]
    async fn test_checkout_success_clears_cart() {
        let backend = ScriptedBackend::default()
            .with_product(tea())
            .with_product(coffee())
            .then_checkout(receipt(330, 2));
        let mut register = Register::new(backend, "E042");

        scan_and_add(&mut register, "4901234567894").await;
        scan_and_add(&mut register, "4901234567900").await;
        register.checkout().await;

        let sent = register.backend().checkouts();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].operator_code, "E042");
        assert_eq!(sent[0].items, vec![tea(), coffee()]);

        assert!(register.session().cart().is_empty());
        assert_eq!(register.session().last_receipt().unwrap().total.amount(), 330);
    }

    #[tokio::test]
    async fn test_checkout_failure_keeps_cart_and_retries_with_same_key() {
        let backend = ScriptedBackend::default()
            .with_product(tea())
            .then_checkout(Err(CheckoutError::failed()))
            .then_checkout(receipt(150, 1));
        let mut register = Register::new(backend, "");

        scan_and_add(&mut register, "4901234567894").await;
        register.checkout().await;

        assert_eq!(register.session().cart().products(), vec![tea()]);
        assert!(register.session().status().error().is_some());

        register.checkout().await;
        assert!(register.session().cart().is_empty());

        let sent = register.backend().checkouts();
        assert_eq!(sent.len(), 2);
        assert_eq!(sent[0].idempotency_key, sent[1].idempotency_key);
    }

    #[tokio::test]
    async fn test_last_lookup_wins_when_responses_reorder() {
        let backend = ScriptedBackend::default()
            .with_product(tea())
            .with_product(coffee());
        let mut register = Register::new(backend, "");

        register.set_input("4901234567894");
        let first = register.begin_lookup().unwrap();
        register.set_input("4901234567900");
        let second = register.begin_lookup().unwrap();

        let second_outcome = second.run(register.backend()).await;
        register.complete(second_outcome);
        let first_outcome = first.run(register.backend()).await;
        register.complete(first_outcome);

        assert_eq!(register.session().staged(), Some(&coffee()));
    }

    #[tokio::test]
    async fn test_double_purchase_submits_once() {
        let backend = ScriptedBackend::default()
            .with_product(tea())
            .then_checkout(receipt(150, 1));
        let mut register = Register::new(backend, "");
        scan_and_add(&mut register, "4901234567894").await;

        let pending = register.begin_checkout().unwrap();
        assert!(register.begin_checkout().is_none());

        let outcome = pending.run(register.backend()).await;
        register.complete(outcome);

        assert_eq!(register.backend().checkouts().len(), 1);
        assert!(register.session().cart().is_empty());
    }

    #[tokio::test]
    async fn test_rejected_lookup_shows_detail() {
        let backend = ScriptedBackend::default()
            .with_lookup_error("123", LookupError::rejected("Inventory service down"));
        let mut register = Register::new(backend, "");
        register.set_input("123");
        register.lookup().await;

        assert_eq!(
            register.session().status().message().as_deref(),
            Some("Inventory service down")
        );
    }

    #[test]
    fn test_set_operator_validates() {
        let mut register = Register::new(ScriptedBackend::default(), "");
        assert!(register.set_operator("has space").is_err());
        assert_eq!(register.session().operator_code(), "");

        register.set_operator("E042").unwrap();
        assert_eq!(register.session().operator_code(), "E042");
    }

    #[tokio::test]
    async fn test_remove_by_position_and_identity() {
        let backend = ScriptedBackend::default()
            .with_product(tea())
            .with_product(coffee());
        let mut register = Register::new(backend, "");
        scan_and_add(&mut register, "4901234567894").await;
        scan_and_add(&mut register, "4901234567900").await;
        scan_and_add(&mut register, "4901234567894").await;

        register.remove_at(0);
        assert_eq!(register.session().cart().products(), vec![coffee(), tea()]);

        let last = register.session().cart().line_at(1).unwrap();
        register.remove_line(last);
        assert_eq!(register.session().cart().products(), vec![coffee()]);
    }
}
