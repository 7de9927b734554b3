use serde_derive::{Deserialize, Serialize};

use super::{CustomData, Status};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discount {
    pub id: String,
    pub status: Status,
    pub description: String,
    pub enabled_for_checkout: bool,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(rename = "type")]
    pub type_field: String,
    pub mode: String,
    pub amount: String,
    #[serde(default)]
    pub currency_code: Option<String>,
    pub recur: bool,
    #[serde(default)]
    pub maximum_recurring_intervals: Option<i64>,
    #[serde(default)]
    pub usage_limit: Option<i64>,
    #[serde(default)]
    pub restrict_to: Option<Vec<String>>,
    #[serde(default)]
    pub expires_at: Option<String>,
    #[serde(default)]
    pub custom_data: Option<CustomData>,
    #[serde(default)]
    pub times_used: i64,
    #[serde(default)]
    pub discount_group_id: Option<String>,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateDiscountRequest {
    pub description: String,
    #[serde(rename = "type")]
    pub type_field: String,
    pub amount: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled_for_checkout: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency_code: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recur: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maximum_recurring_intervals: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_limit: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restrict_to: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<CustomData>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_group_id: Option<String>,
}

/// Patch body for a discount. Mode, currency and the recurring interval cap
/// are fixed at creation and have no field here.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateDiscountRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub enabled_for_checkout: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<Option<String>>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub type_field: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recur: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub usage_limit: Option<Option<i64>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub restrict_to: Option<Option<Vec<String>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<Option<CustomData>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_group_id: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

impl UpdateDiscountRequest {
    pub fn archive() -> Self {
        Self {
            status: Some(Status::Archived),
            ..Self::default()
        }
    }
}
