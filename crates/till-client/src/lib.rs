//! # till-client: Backend Adapters for Till POS
//!
//! Runs the session's requests against the POS backend.
//!
//! ## Modules
//!
//! - [`backend`] - `PosBackend` trait and the reqwest `HttpBackend`
//! - [`register`] - `Register` controller: reducer in, effects out
//! - [`wire`] - JSON schemas and status classification
//! - [`config`] - Layered TOML / environment configuration
//! - [`error`] - Setup errors
//!
//! ## Example Usage
//!
//! ```rust,ignore
//! use till_client::{ClientConfig, HttpBackend, Register};
//!
//! let config = ClientConfig::load(None)?;
//! let backend = HttpBackend::new(&config.api)?;
//! let mut register = Register::new(backend, config.operator_code());
//!
//! register.set_input("4901234567894");
//! register.lookup().await;
//! register.add_staged();
//! register.checkout().await;
//! ```

pub mod backend;
pub mod config;
pub mod error;
pub mod register;
pub mod wire;

pub use backend::{HttpBackend, PosBackend};
pub use config::ClientConfig;
pub use error::{ClientError, ClientResult};
pub use register::{Pending, PendingCheckout, PendingLookup, Register};
