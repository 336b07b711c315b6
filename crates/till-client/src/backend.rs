//! # POS Backend
//!
//! The seam between the register and the network.
//!
//! ## Request Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    HttpBackend Request Flow                             │
//! │                                                                         │
//! │  lookup("4901234567894")                                               │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  GET {base}/products/4901234567894   (code percent-encoded)            │
//! │       │                                                                 │
//! │       ├── no response ──────────────► Unreachable  (error! logged)     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  wire::classify_lookup(status, body)                                   │
//! │                                                                         │
//! │  checkout(request)                                                     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  POST {base}/transactions                                              │
//! │       Idempotency-Key: <uuid>                                          │
//! │       {emp_cd, items}                                                  │
//! │       │                                                                 │
//! │       ├── no response ──────────────► Failed       (error! logged)     │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  wire::classify_checkout(status, body, lines)                          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use async_trait::async_trait;
use tracing::{debug, error, info, warn};
use url::Url;

use till_core::validation::normalize_product_code;
use till_core::{CheckoutError, CheckoutRequest, LookupError, Product, Receipt};

use crate::config::ApiConfig;
use crate::error::ClientResult;
use crate::wire::{self, TransactionRequest};

/// Header carrying the checkout idempotency key.
pub const IDEMPOTENCY_HEADER: &str = "Idempotency-Key";

/// Lookup and checkout as the register sees them.
///
/// Implementations never panic and never return transport errors directly;
/// every failure is already mapped to the domain taxonomy.
#[async_trait]
pub trait PosBackend: Send + Sync {
    /// Fetches one product by its (already trimmed) code.
    async fn lookup(&self, code: &str) -> Result<Product, LookupError>;

    /// Submits the cart as one transaction.
    async fn checkout(&self, request: &CheckoutRequest) -> Result<Receipt, CheckoutError>;
}

// =============================================================================
// HTTP Backend
// =============================================================================

/// `PosBackend` over HTTP/JSON with reqwest.
#[derive(Debug, Clone)]
pub struct HttpBackend {
    client: reqwest::Client,
    base: Url,
}

impl HttpBackend {
    /// Builds a client with the configured timeouts.
    pub fn new(config: &ApiConfig) -> ClientResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .build()?;

        Self::with_client(client, config)
    }

    /// Uses a caller-supplied client.
    pub fn with_client(client: reqwest::Client, config: &ApiConfig) -> ClientResult<Self> {
        let base = config.parsed_base_url()?;
        debug!(base = %base, "HTTP backend ready");
        Ok(HttpBackend { client, base })
    }

    pub fn base_url(&self) -> &Url {
        &self.base
    }

    /// Joins path segments onto the base URL, encoding each one.
    ///
    /// A trailing slash on the base is tolerated.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        // The base was checked to be able to carry a path.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

#[async_trait]
impl PosBackend for HttpBackend {
    async fn lookup(&self, code: &str) -> Result<Product, LookupError> {
        let code = normalize_product_code(code)?;
        let code = code.as_str();
        let url = self.endpoint(&["products", code]);
        debug!(code = %code, url = %url, "GET product");

        let response = self.client.get(url).send().await.map_err(|e| {
            error!(code = %code, error = %e, "Product lookup failed to reach backend");
            LookupError::unreachable(e.to_string())
        })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            error!(code = %code, error = %e, "Product lookup response was cut off");
            LookupError::unreachable(e.to_string())
        })?;

        let outcome = wire::classify_lookup(status, &body);
        match &outcome {
            Ok(product) => debug!(code = %code, id = product.id, "Product found"),
            Err(LookupError::NotFound) => info!(code = %code, "Product not in master data"),
            Err(e) => warn!(code = %code, status = status.as_u16(), error = %e, "Product lookup rejected"),
        }
        outcome
    }

    async fn checkout(&self, request: &CheckoutRequest) -> Result<Receipt, CheckoutError> {
        let url = self.endpoint(&["transactions"]);
        let lines = request.items.len();
        debug!(
            ticket = %request.ticket,
            lines,
            key = %request.idempotency_key,
            "POST transaction"
        );

        let response = self
            .client
            .post(url)
            .header(IDEMPOTENCY_HEADER, request.idempotency_key.as_str())
            .json(&TransactionRequest::from(request))
            .send()
            .await
            .map_err(|e| {
                error!(ticket = %request.ticket, error = %e, "Checkout failed to reach backend");
                CheckoutError::failed()
            })?;

        let status = response.status();
        let body = response.bytes().await.map_err(|e| {
            error!(ticket = %request.ticket, error = %e, "Checkout response was cut off");
            CheckoutError::failed()
        })?;

        let outcome = wire::classify_checkout(status, &body, lines);
        match &outcome {
            Ok(receipt) => info!(ticket = %request.ticket, total = receipt.total.amount(), lines, "Transaction registered"),
            Err(e) => warn!(ticket = %request.ticket, status = status.as_u16(), error = %e, "Checkout rejected"),
        }
        outcome
    }
}
