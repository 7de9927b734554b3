use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info, warn};
use serde_derive::{Deserialize, Serialize};

use super::{absent_ok, ensure_in_place, require_id, same_list, Reconciler};
use crate::api::BillingApi;
use crate::context::Context;
use crate::custom_data;
use crate::error::Result;
use crate::types::{CreateDiscountRequest, Discount, UpdateDiscountRequest};
use crate::validators;

/// A discount that can be applied to checkouts or transactions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DiscountModel {
    pub id: Option<String>,
    pub status: Option<String>,
    pub description: String,
    pub enabled_for_checkout: Option<bool>,
    pub code: Option<String>,
    /// `percentage`, `flat` or `flat_per_seat`.
    #[serde(rename = "type")]
    pub discount_type: String,
    /// `standard` or `custom`; fixed at creation.
    pub mode: Option<String>,
    /// Percentages as `"10"`, flat amounts in the lowest denomination.
    pub amount: String,
    /// Required for flat discounts; fixed at creation.
    pub currency_code: Option<String>,
    pub recur: Option<bool>,
    pub maximum_recurring_intervals: Option<i64>,
    pub usage_limit: Option<i64>,
    pub restrict_to: Option<Vec<String>>,
    /// RFC 3339 timestamp.
    pub expires_at: Option<String>,
    pub custom_data: Option<HashMap<String, String>>,
    pub times_used: Option<i64>,
    pub discount_group_id: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl DiscountModel {
    pub fn from_remote(discount: Discount) -> Result<Self> {
        Ok(Self {
            custom_data: custom_data::encode(discount.custom_data.as_ref())?,
            id: Some(discount.id),
            status: Some(discount.status.as_str().to_string()),
            description: discount.description,
            enabled_for_checkout: Some(discount.enabled_for_checkout),
            code: discount.code,
            discount_type: discount.type_field,
            mode: Some(discount.mode),
            amount: discount.amount,
            currency_code: discount.currency_code,
            recur: Some(discount.recur),
            maximum_recurring_intervals: discount.maximum_recurring_intervals,
            usage_limit: discount.usage_limit,
            restrict_to: discount.restrict_to,
            expires_at: discount.expires_at,
            times_used: Some(discount.times_used),
            discount_group_id: discount.discount_group_id,
            created_at: Some(discount.created_at),
            updated_at: Some(discount.updated_at),
        })
    }

    fn absorb_computed(&mut self, discount: Discount) {
        self.status = Some(discount.status.as_str().to_string());
        self.enabled_for_checkout = Some(discount.enabled_for_checkout);
        self.recur = Some(discount.recur);
        self.mode = Some(discount.mode);
        self.times_used = Some(discount.times_used);
        self.updated_at = Some(discount.updated_at);
    }
}

pub struct DiscountReconciler {
    api: Arc<dyn BillingApi>,
}

impl DiscountReconciler {
    pub fn new(api: Arc<dyn BillingApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Reconciler for DiscountReconciler {
    type Model = DiscountModel;

    const TYPE_NAME: &'static str = "paddle_discount";

    fn id(model: &DiscountModel) -> Option<&str> {
        model.id.as_deref()
    }

    fn validate(&self, desired: &DiscountModel) -> Result<()> {
        validators::discount_type("type", Some(desired.discount_type.as_str()))?;
        validators::currency_code("currency_code", desired.currency_code.as_deref())?;
        if desired.discount_type == "percentage" {
            validators::percentage_amount("amount", Some(desired.amount.as_str()))?;
        }
        Ok(())
    }

    fn replacement_fields(
        &self,
        current: &DiscountModel,
        desired: &DiscountModel,
    ) -> Vec<&'static str> {
        let mut fields = Vec::new();
        // an unset mode is computed and keeps the remote value
        if desired.mode.is_some() && current.mode != desired.mode {
            fields.push("mode");
        }
        if current.currency_code != desired.currency_code {
            fields.push("currency_code");
        }
        if current.maximum_recurring_intervals != desired.maximum_recurring_intervals {
            fields.push("maximum_recurring_intervals");
        }
        fields
    }

    fn needs_update(&self, current: &DiscountModel, desired: &DiscountModel) -> bool {
        let checkout_changed = desired.enabled_for_checkout.is_some()
            && current.enabled_for_checkout != desired.enabled_for_checkout;
        let recur_changed = desired.recur.is_some() && current.recur != desired.recur;
        current.description != desired.description
            || current.discount_type != desired.discount_type
            || current.amount != desired.amount
            || current.code != desired.code
            || current.usage_limit != desired.usage_limit
            || !same_list(&current.restrict_to, &desired.restrict_to)
            || current.expires_at != desired.expires_at
            || current.custom_data != desired.custom_data
            || current.discount_group_id != desired.discount_group_id
            || checkout_changed
            || recur_changed
    }

    async fn create(&self, ctx: &Context, desired: DiscountModel) -> Result<DiscountModel> {
        self.validate(&desired)?;
        let req = CreateDiscountRequest {
            description: desired.description.clone(),
            type_field: desired.discount_type.clone(),
            amount: desired.amount.clone(),
            enabled_for_checkout: desired.enabled_for_checkout,
            code: desired.code.clone(),
            mode: desired.mode.clone(),
            currency_code: desired.currency_code.clone(),
            recur: desired.recur,
            maximum_recurring_intervals: desired.maximum_recurring_intervals,
            usage_limit: desired.usage_limit,
            restrict_to: desired.restrict_to.clone(),
            expires_at: desired.expires_at.clone(),
            custom_data: custom_data::decode(desired.custom_data.as_ref()),
            discount_group_id: desired.discount_group_id.clone(),
        };

        info!(
            "Creating {} discount '{}'",
            desired.discount_type, desired.description
        );
        let discount = self.api.create_discount(ctx, &req).await.map_err(|e| {
            e.during(
                "create discount",
                format!(
                    "code '{}' (type: {})",
                    desired.code.as_deref().unwrap_or_default(),
                    desired.discount_type
                ),
            )
        })?;

        let mut state = desired;
        state.id = Some(discount.id.clone());
        state.created_at = Some(discount.created_at.clone());
        state.absorb_computed(discount);
        Ok(state)
    }

    async fn read(&self, ctx: &Context, current: DiscountModel) -> Result<Option<DiscountModel>> {
        let id = require_id(Self::TYPE_NAME, &current.id)?;
        debug!("Reading discount {}", id);
        let found = absent_ok(self.api.get_discount(ctx, id).await)
            .map_err(|e| e.during("read discount", format!("ID {}", id)))?;
        match found {
            Some(discount) => DiscountModel::from_remote(discount).map(Some),
            None => {
                warn!("Discount {} no longer exists, dropping it from state", id);
                Ok(None)
            }
        }
    }

    async fn update(
        &self,
        ctx: &Context,
        current: &DiscountModel,
        desired: DiscountModel,
    ) -> Result<DiscountModel> {
        let id = require_id(Self::TYPE_NAME, &current.id)?;
        ensure_in_place(Self::TYPE_NAME, self.replacement_fields(current, &desired))?;
        self.validate(&desired)?;

        let req = UpdateDiscountRequest {
            description: Some(desired.description.clone()),
            type_field: Some(desired.discount_type.clone()),
            amount: Some(desired.amount.clone()),
            enabled_for_checkout: desired.enabled_for_checkout,
            recur: desired.recur,
            code: Some(desired.code.clone()),
            usage_limit: Some(desired.usage_limit),
            restrict_to: Some(desired.restrict_to.clone()),
            expires_at: Some(desired.expires_at.clone()),
            custom_data: Some(custom_data::decode(desired.custom_data.as_ref())),
            discount_group_id: Some(desired.discount_group_id.clone()),
            status: None,
        };

        info!("Updating discount {}", id);
        let discount = self
            .api
            .update_discount(ctx, id, &req)
            .await
            .map_err(|e| e.during("update discount", format!("ID {}", id)))?;

        let mut state = desired;
        state.id = current.id.clone();
        state.created_at = current.created_at.clone();
        state.absorb_computed(discount);
        Ok(state)
    }

    async fn delete(&self, ctx: &Context, current: &DiscountModel) -> Result<()> {
        let id = require_id(Self::TYPE_NAME, &current.id)?;
        info!("Archiving discount {}", id);
        absent_ok(
            self.api
                .update_discount(ctx, id, &UpdateDiscountRequest::archive())
                .await,
        )
        .map_err(|e| e.during("archive discount", format!("ID {}", id)))?;
        Ok(())
    }

    fn import(&self, id: &str) -> DiscountModel {
        DiscountModel {
            id: Some(id.to_string()),
            ..DiscountModel::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn reconciler() -> DiscountReconciler {
        DiscountReconciler::new(Arc::new(crate::api::Offline))
    }

    fn flat_usd() -> DiscountModel {
        DiscountModel {
            id: Some("dsc_01".into()),
            description: "Launch".into(),
            discount_type: "flat".into(),
            amount: "500".into(),
            currency_code: Some("USD".into()),
            mode: Some("standard".into()),
            ..DiscountModel::default()
        }
    }

    #[test]
    fn test_percentage_amount_only_checked_for_percentage_type() {
        let r = reconciler();
        let mut desired = flat_usd();
        desired.amount = "1500".into();
        assert!(r.validate(&desired).is_ok());

        desired.discount_type = "percentage".into();
        desired.currency_code = None;
        let err = r.validate(&desired).unwrap_err();
        assert!(err.to_string().contains("Invalid Percentage Amount"));
    }

    #[test]
    fn test_currency_change_requires_replacement() {
        let current = flat_usd();
        let mut desired = current.clone();
        desired.currency_code = Some("EUR".into());
        desired.maximum_recurring_intervals = Some(3);
        assert_eq!(
            reconciler().replacement_fields(&current, &desired),
            vec!["currency_code", "maximum_recurring_intervals"]
        );
    }

    #[test]
    fn test_unset_mode_is_not_a_replacement() {
        let current = flat_usd();
        let mut desired = current.clone();
        desired.mode = None;
        assert!(reconciler().replacement_fields(&current, &desired).is_empty());
    }

    #[tokio::test]
    async fn test_update_refuses_immutable_change_before_any_call() {
        let current = flat_usd();
        let mut desired = current.clone();
        desired.mode = Some("custom".into());
        let err = reconciler()
            .update(&Context::background(), &current, desired)
            .await
            .unwrap_err();
        match err {
            Error::RequiresReplacement { resource, fields } => {
                assert_eq!(resource, "paddle_discount");
                assert_eq!(fields, vec!["mode"]);
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
