//! # Screen Rendering
//!
//! Draws the two panels from a session snapshot.
//!
//! ```text
//! ── Lookup ─────────────────────────
//!  Code: 4901234567894
//!  Tea
//!  150円
//!  [add] available
//! ── Cart ───────────────────────────
//!  1. Tea x1 150円
//!  Total 150円
//! ```

use std::fmt::Write;

use till_client::config::DisplayConfig;
use till_core::{CartSummary, LookupPanel, Session};

const RULE: &str = "───────────────────────────────";

/// Renders both regions.
pub fn render(session: &Session, display: &DisplayConfig) -> String {
    let mut out = String::new();
    render_lookup(&mut out, session, display);
    render_cart(&mut out, session, display);
    out
}

fn render_lookup(out: &mut String, session: &Session, display: &DisplayConfig) {
    let _ = writeln!(out, "── Lookup {}", RULE);
    let _ = writeln!(out, " Code: {}", session.input());

    match session.lookup_panel() {
        LookupPanel::Message(message) => {
            let _ = writeln!(out, " ! {}", message);
        }
        LookupPanel::Staged(product) => {
            let _ = writeln!(out, " {}", product.name);
            let _ = writeln!(out, " {}", display.format_price(product.price));
        }
        LookupPanel::Placeholder => {
            let _ = writeln!(out, " {}", display.product_placeholder);
            let _ = writeln!(out, " {}", display.price_placeholder);
        }
    }

    let add = if session.can_add() { "available" } else { "unavailable" };
    let _ = writeln!(out, " [add] {}", add);
}

fn render_cart(out: &mut String, session: &Session, display: &DisplayConfig) {
    let _ = writeln!(out, "── Cart {}", RULE);

    if let Some(warning) = session.cart_warning() {
        let _ = writeln!(out, " ! {}", warning);
    }

    let cart = session.cart();
    for (i, item) in cart.iter().enumerate() {
        let _ = writeln!(
            out,
            " {}. {} x1 {}",
            i + 1,
            item.product.name,
            display.format_price(item.price())
        );
    }

    let summary = CartSummary::from(cart);
    if summary.line_count > 0 {
        let _ = writeln!(out, " Total {}", display.format_price(summary.total));
    }

    if let Some(receipt) = session.last_receipt() {
        let _ = writeln!(
            out,
            " Purchase complete. Total: {}",
            display.format_price(receipt.total)
        );
    }

    if session.pending_checkout().is_some() {
        let _ = writeln!(out, " Submitting...");
    }
}
