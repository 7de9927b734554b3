//! Wire shapes of Paddle Billing resources and request bodies.
//!
//! Update requests use `Option<Option<T>>` for nullable fields: `None` is not
//! sent at all, `Some(None)` is sent as `null` and clears the remote value.

pub mod customer;
pub mod discount;
pub mod notification_setting;
pub mod price;
pub mod product;

use std::collections::HashMap;

use serde_derive::{Deserialize, Serialize};
use serde_json::Value;

pub use customer::*;
pub use discount::*;
pub use notification_setting::*;
pub use price::*;
pub use product::*;

/// Free-form key-value metadata as Paddle stores it.
pub type CustomData = HashMap<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Status {
    Active,
    Archived,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Active => "active",
            Status::Archived => "archived",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Money {
    pub amount: String,
    pub currency_code: String,
}

/// A billing cycle or trial period length.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Duration {
    pub interval: String,
    pub frequency: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuantity {
    pub minimum: i64,
    pub maximum: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitPriceOverride {
    pub country_codes: Vec<String>,
    pub unit_price: Money,
}

/// Successful response body: `{"data": ..., "meta": ...}`
#[derive(Debug, Deserialize)]
pub struct Envelope<T> {
    pub data: T,
}

/// Error response body: `{"error": {...}, "meta": {...}}`
#[derive(Debug, Default, Deserialize)]
pub struct ErrorEnvelope {
    pub error: ApiErrorBody,
}

#[derive(Debug, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub detail: Option<String>,
}
