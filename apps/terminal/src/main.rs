//! # Till Terminal Entry Point
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Till Terminal                                    │
//! │                                                                         │
//! │   stdin ──► commands::parse ──► Register ──► HttpBackend ──► backend   │
//! │                                     │                                   │
//! │   stdout ◄── view::render ◄─────────┘          stderr ◄── tracing      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The actual setup is in lib.rs so it can be tested.

use clap::Parser;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    till_terminal::run(till_terminal::Args::parse()).await
}
