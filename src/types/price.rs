use serde_derive::{Deserialize, Serialize};

use super::{CustomData, Duration, Money, PriceQuantity, Status, UnitPriceOverride};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    pub id: String,
    pub product_id: String,
    pub description: String,
    #[serde(default)]
    pub name: Option<String>,
    pub tax_mode: String,
    pub unit_price: Money,
    #[serde(default)]
    pub unit_price_overrides: Vec<UnitPriceOverride>,
    #[serde(default)]
    pub billing_cycle: Option<Duration>,
    #[serde(default)]
    pub trial_period: Option<Duration>,
    #[serde(default)]
    pub quantity: Option<PriceQuantity>,
    #[serde(default)]
    pub custom_data: Option<CustomData>,
    pub status: Status,
    pub created_at: String,
    pub updated_at: String,
}

impl Price {
    /// Quantity limits, treating an all-zero pair as absent.
    pub fn quantity_limits(&self) -> Option<PriceQuantity> {
        self.quantity.filter(|q| q.minimum > 0 || q.maximum > 0)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreatePriceRequest {
    pub product_id: String,
    pub description: String,
    pub unit_price: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_mode: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub unit_price_overrides: Vec<UnitPriceOverride>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub billing_cycle: Option<Duration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub trial_period: Option<Duration>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<PriceQuantity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<CustomData>,
}

/// Patch body for a price. Unit price, overrides, billing cycle, trial period
/// and product linkage are deliberately absent: they cannot change in place.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdatePriceRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub quantity: Option<PriceQuantity>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<Option<CustomData>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

impl UpdatePriceRequest {
    pub fn archive() -> Self {
        Self {
            status: Some(Status::Archived),
            ..Self::default()
        }
    }
}
