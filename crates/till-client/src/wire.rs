//! # Wire Schemas
//!
//! JSON shapes of the backend contract and the mapping from an HTTP status
//! plus body to a domain outcome.
//!
//! ## Endpoints
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Backend Contract                                │
//! │                                                                         │
//! │  GET {base}/products/{code}                                            │
//! │  ├── 200  {PRD_ID, NAME, CODE, PRICE}        → Ok(Product)             │
//! │  ├── 404                                     → NotFound                │
//! │  └── *    {detail?}                          → BackendRejected(detail) │
//! │                                                                         │
//! │  POST {base}/transactions                                              │
//! │  │   {emp_cd, items: [{PRD_ID, CODE, NAME, PRICE}, ...]}               │
//! │  ├── 2xx  {TOTAL_AMT}                        → Ok(Receipt)             │
//! │  └── *                                       → Failed                  │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Defensive Decoding
//! Every field is required. Numbers may arrive as `150` or `150.0`; anything
//! with a fractional part is a schema mismatch. A body that does not decode
//! never yields a partially-filled product.

use reqwest::StatusCode;
use serde::{Deserialize, Deserializer, Serialize};

use till_core::validation::validate_product;
use till_core::{CheckoutError, CheckoutRequest, LookupError, Money, Product, Receipt};

/// Shown when the backend accepted a transaction but its reply is unusable.
pub const UNREADABLE_RECEIPT_MESSAGE: &str =
    "The transaction may have been registered, but the response could not be read";

// =============================================================================
// Product Record
// =============================================================================

/// A product as it travels over the wire, both in lookup responses and in
/// transaction line items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductRecord {
    #[serde(rename = "PRD_ID", deserialize_with = "integral")]
    pub id: i64,

    #[serde(rename = "CODE")]
    pub code: String,

    #[serde(rename = "NAME")]
    pub name: String,

    #[serde(rename = "PRICE", deserialize_with = "integral")]
    pub price: i64,
}

impl From<&Product> for ProductRecord {
    fn from(p: &Product) -> Self {
        ProductRecord {
            id: p.id,
            code: p.code.clone(),
            name: p.name.clone(),
            price: p.price.amount(),
        }
    }
}

impl From<ProductRecord> for Product {
    fn from(r: ProductRecord) -> Self {
        Product {
            id: r.id,
            name: r.name,
            code: r.code,
            price: Money::from_amount(r.price),
        }
    }
}

// =============================================================================
// Transactions
// =============================================================================

/// Body of `POST /transactions`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRequest {
    pub emp_cd: String,
    pub items: Vec<ProductRecord>,
}

impl From<&CheckoutRequest> for TransactionRequest {
    fn from(req: &CheckoutRequest) -> Self {
        TransactionRequest {
            emp_cd: req.operator_code.clone(),
            items: req.items.iter().map(ProductRecord::from).collect(),
        }
    }
}

/// Success body of `POST /transactions`. Other fields are ignored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionResponse {
    #[serde(rename = "TOTAL_AMT", deserialize_with = "integral")]
    pub total: i64,
}

/// Error body. `detail` is only used when it is a non-empty string.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub detail: Option<serde_json::Value>,
}

impl ErrorBody {
    fn message(self) -> Option<String> {
        match self.detail {
            Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s),
            _ => None,
        }
    }
}

/// Accepts a JSON integer, or a float with no fractional part.
fn integral<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error;

    let n = serde_json::Number::deserialize(deserializer)?;
    if let Some(i) = n.as_i64() {
        return Ok(i);
    }
    match n.as_f64() {
        Some(f) if f.fract() == 0.0 && f >= i64::MIN as f64 && f < i64::MAX as f64 => Ok(f as i64),
        _ => Err(D::Error::custom(format!("expected a whole number, got {}", n))),
    }
}

// =============================================================================
// Outcome Classification
// =============================================================================

/// Maps a lookup response to its domain outcome.
pub fn classify_lookup(status: StatusCode, body: &[u8]) -> Result<Product, LookupError> {
    if status.is_success() {
        let record: ProductRecord =
            serde_json::from_slice(body).map_err(|_| LookupError::rejected_generic())?;
        let product = Product::from(record);
        validate_product(&product).map_err(|_| LookupError::rejected_generic())?;
        return Ok(product);
    }

    if status == StatusCode::NOT_FOUND {
        return Err(LookupError::NotFound);
    }

    let detail = serde_json::from_slice::<ErrorBody>(body)
        .ok()
        .and_then(ErrorBody::message);
    Err(LookupError::BackendRejected { detail })
}

/// Maps a checkout response to its domain outcome.
pub fn classify_checkout(
    status: StatusCode,
    body: &[u8],
    line_count: usize,
) -> Result<Receipt, CheckoutError> {
    if !status.is_success() {
        return Err(CheckoutError::failed());
    }

    match serde_json::from_slice::<TransactionResponse>(body) {
        Ok(resp) if resp.total >= 0 => Ok(Receipt::new(Money::from_amount(resp.total), line_count)),
        _ => Err(CheckoutError::failed_with(UNREADABLE_RECEIPT_MESSAGE)),
    }
}
