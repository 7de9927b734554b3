use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info, warn};
use serde_derive::{Deserialize, Serialize};

use super::{absent_ok, ensure_in_place, require_id, same_list, Reconciler};
use crate::api::BillingApi;
use crate::context::Context;
use crate::custom_data;
use crate::error::{Error, Result};
use crate::types::{
    CreatePriceRequest, Duration, Money, Price, PriceQuantity, UnitPriceOverride,
    UpdatePriceRequest,
};
use crate::validators;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitPriceModel {
    /// Amount in the lowest denomination, as a string (`"2900"` for $29.00).
    pub amount: String,
    pub currency_code: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitPriceOverrideModel {
    pub country_codes: Vec<String>,
    pub unit_price: UnitPriceModel,
}

/// Used for both the billing cycle and the trial period.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BillingCycleModel {
    pub frequency: i64,
    pub interval: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuantityModel {
    pub minimum: i64,
    pub maximum: i64,
}

/// Prices determine how much and how often you charge for a product.
///
/// `product_id`, `unit_price`, `unit_price_overrides`, `billing_cycle` and
/// `trial_period` are fixed once created; changing any of them replaces the
/// price.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PriceModel {
    pub id: Option<String>,
    pub product_id: String,
    /// Internal description, not shown to customers.
    pub description: String,
    pub name: Option<String>,
    /// Optional and computed; defaults to `account_setting` remotely.
    pub tax_mode: Option<String>,
    pub unit_price: UnitPriceModel,
    pub unit_price_overrides: Option<Vec<UnitPriceOverrideModel>>,
    pub billing_cycle: Option<BillingCycleModel>,
    pub trial_period: Option<BillingCycleModel>,
    /// Optional and computed; Paddle fills in 1..100 when omitted.
    pub quantity: Option<QuantityModel>,
    pub custom_data: Option<HashMap<String, String>>,
    pub status: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl From<&UnitPriceModel> for Money {
    fn from(m: &UnitPriceModel) -> Self {
        Money {
            amount: m.amount.clone(),
            currency_code: m.currency_code.clone(),
        }
    }
}

impl From<Money> for UnitPriceModel {
    fn from(m: Money) -> Self {
        UnitPriceModel {
            amount: m.amount,
            currency_code: m.currency_code,
        }
    }
}

impl From<&BillingCycleModel> for Duration {
    fn from(d: &BillingCycleModel) -> Self {
        Duration {
            interval: d.interval.clone(),
            frequency: d.frequency,
        }
    }
}

impl From<Duration> for BillingCycleModel {
    fn from(d: Duration) -> Self {
        BillingCycleModel {
            frequency: d.frequency,
            interval: d.interval,
        }
    }
}

impl From<QuantityModel> for PriceQuantity {
    fn from(q: QuantityModel) -> Self {
        PriceQuantity {
            minimum: q.minimum,
            maximum: q.maximum,
        }
    }
}

impl From<PriceQuantity> for QuantityModel {
    fn from(q: PriceQuantity) -> Self {
        QuantityModel {
            minimum: q.minimum,
            maximum: q.maximum,
        }
    }
}

impl PriceModel {
    pub fn from_remote(price: Price) -> Result<Self> {
        let overrides = if price.unit_price_overrides.is_empty() {
            None
        } else {
            Some(
                price
                    .unit_price_overrides
                    .iter()
                    .map(|o| UnitPriceOverrideModel {
                        country_codes: o.country_codes.clone(),
                        unit_price: o.unit_price.clone().into(),
                    })
                    .collect(),
            )
        };
        Ok(Self {
            custom_data: custom_data::encode(price.custom_data.as_ref())?,
            quantity: price.quantity_limits().map(QuantityModel::from),
            id: Some(price.id),
            product_id: price.product_id,
            description: price.description,
            name: price.name,
            tax_mode: Some(price.tax_mode),
            unit_price: price.unit_price.into(),
            unit_price_overrides: overrides,
            billing_cycle: price.billing_cycle.map(BillingCycleModel::from),
            trial_period: price.trial_period.map(BillingCycleModel::from),
            status: Some(price.status.as_str().to_string()),
            created_at: Some(price.created_at),
            updated_at: Some(price.updated_at),
        })
    }

    fn overrides_for_request(&self) -> Vec<UnitPriceOverride> {
        self.unit_price_overrides
            .iter()
            .flatten()
            .map(|o| UnitPriceOverride {
                country_codes: o.country_codes.clone(),
                unit_price: Money::from(&o.unit_price),
            })
            .collect()
    }
}

fn absorb_created(desired: PriceModel, price: Price) -> PriceModel {
    let mut state = desired;
    state.status = Some(price.status.as_str().to_string());
    state.quantity = price.quantity_limits().map(QuantityModel::from);
    state.tax_mode = Some(price.tax_mode);
    state.created_at = Some(price.created_at);
    state.updated_at = Some(price.updated_at);
    state.id = Some(price.id);
    state
}

pub struct PriceReconciler {
    api: Arc<dyn BillingApi>,
}

impl PriceReconciler {
    pub fn new(api: Arc<dyn BillingApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Reconciler for PriceReconciler {
    type Model = PriceModel;

    const TYPE_NAME: &'static str = "paddle_price";

    fn id(model: &PriceModel) -> Option<&str> {
        model.id.as_deref()
    }

    fn validate(&self, desired: &PriceModel) -> Result<()> {
        validators::tax_mode("tax_mode", desired.tax_mode.as_deref())?;
        validators::currency_code(
            "unit_price.currency_code",
            Some(desired.unit_price.currency_code.as_str()),
        )?;
        for (i, o) in desired.unit_price_overrides.iter().flatten().enumerate() {
            validators::currency_code(
                &format!("unit_price_overrides[{}].unit_price.currency_code", i),
                Some(o.unit_price.currency_code.as_str()),
            )?;
            for (j, code) in o.country_codes.iter().enumerate() {
                validators::country_code(
                    &format!("unit_price_overrides[{}].country_codes[{}]", i, j),
                    Some(code.as_str()),
                )?;
            }
        }
        if let Some(cycle) = &desired.billing_cycle {
            validators::interval("billing_cycle.interval", Some(cycle.interval.as_str()))?;
        }
        if let Some(trial) = &desired.trial_period {
            validators::interval("trial_period.interval", Some(trial.interval.as_str()))?;
        }
        Ok(())
    }

    fn replacement_fields(&self, current: &PriceModel, desired: &PriceModel) -> Vec<&'static str> {
        let mut fields = Vec::new();
        if current.product_id != desired.product_id {
            fields.push("product_id");
        }
        if current.unit_price != desired.unit_price {
            fields.push("unit_price");
        }
        if !same_list(&current.unit_price_overrides, &desired.unit_price_overrides) {
            fields.push("unit_price_overrides");
        }
        if current.billing_cycle != desired.billing_cycle {
            fields.push("billing_cycle");
        }
        if current.trial_period != desired.trial_period {
            fields.push("trial_period");
        }
        fields
    }

    fn needs_update(&self, current: &PriceModel, desired: &PriceModel) -> bool {
        // unset computed attributes keep whatever the remote side chose
        let tax_mode_changed =
            desired.tax_mode.is_some() && current.tax_mode != desired.tax_mode;
        let quantity_changed =
            desired.quantity.is_some() && current.quantity != desired.quantity;
        current.description != desired.description
            || current.name != desired.name
            || tax_mode_changed
            || quantity_changed
            || current.custom_data != desired.custom_data
    }

    async fn create(&self, ctx: &Context, desired: PriceModel) -> Result<PriceModel> {
        self.validate(&desired)?;
        let req = CreatePriceRequest {
            product_id: desired.product_id.clone(),
            description: desired.description.clone(),
            unit_price: Money::from(&desired.unit_price),
            name: desired.name.clone(),
            tax_mode: desired.tax_mode.clone(),
            unit_price_overrides: desired.overrides_for_request(),
            billing_cycle: desired.billing_cycle.as_ref().map(Duration::from),
            trial_period: desired.trial_period.as_ref().map(Duration::from),
            quantity: desired.quantity.map(PriceQuantity::from),
            custom_data: custom_data::decode(desired.custom_data.as_ref()),
        };

        info!(
            "Creating price for product {} ({})",
            desired.product_id, desired.description
        );
        let mut price = self.api.create_price(ctx, &req).await.map_err(|e| {
            e.during(
                "create price",
                format!(
                    "product {} (description: {})",
                    desired.product_id, desired.description
                ),
            )
        })?;

        // Some responses omit the quantity defaults; fetch them once so the
        // recorded state matches what later reads will report.
        if price.quantity_limits().is_none() {
            debug!("Price {} created without quantity, reading back", price.id);
            match self.api.get_price(ctx, &price.id).await {
                Ok(fresh) => price = fresh,
                Err(e) => {
                    let id = price.id.clone();
                    let partial = absorb_created(desired, price);
                    return Err(Error::Incomplete {
                        resource: Self::TYPE_NAME,
                        record: serde_json::to_value(&partial)?,
                        source: Box::new(e.during("read back price", format!("ID {}", id))),
                        id,
                    });
                }
            }
        }

        Ok(absorb_created(desired, price))
    }

    async fn read(&self, ctx: &Context, current: PriceModel) -> Result<Option<PriceModel>> {
        let id = require_id(Self::TYPE_NAME, &current.id)?;
        debug!("Reading price {}", id);
        let found = absent_ok(self.api.get_price(ctx, id).await)
            .map_err(|e| e.during("read price", format!("ID {}", id)))?;
        match found {
            Some(price) => PriceModel::from_remote(price).map(Some),
            None => {
                warn!("Price {} no longer exists, dropping it from state", id);
                Ok(None)
            }
        }
    }

    async fn update(
        &self,
        ctx: &Context,
        current: &PriceModel,
        desired: PriceModel,
    ) -> Result<PriceModel> {
        let id = require_id(Self::TYPE_NAME, &current.id)?;
        ensure_in_place(Self::TYPE_NAME, self.replacement_fields(current, &desired))?;
        self.validate(&desired)?;

        if !self.needs_update(current, &desired) {
            debug!("Price {} has no mutable changes", id);
            let mut state = desired;
            state.id = current.id.clone();
            state.tax_mode = current.tax_mode.clone();
            state.quantity = current.quantity;
            state.status = current.status.clone();
            state.created_at = current.created_at.clone();
            state.updated_at = current.updated_at.clone();
            return Ok(state);
        }

        let req = UpdatePriceRequest {
            description: Some(desired.description.clone()),
            name: Some(desired.name.clone()),
            tax_mode: Some(
                desired
                    .tax_mode
                    .clone()
                    .or_else(|| current.tax_mode.clone())
                    .unwrap_or_else(|| "account_setting".to_string()),
            ),
            quantity: desired.quantity.map(PriceQuantity::from),
            custom_data: Some(custom_data::decode(desired.custom_data.as_ref())),
            status: None,
        };

        info!("Updating price {}", id);
        let price = self.api.update_price(ctx, id, &req).await.map_err(|e| {
            e.during(
                "update price",
                format!(
                    "ID {} (product: {}, description: {})",
                    id, desired.product_id, desired.description
                ),
            )
        })?;

        let mut state = desired;
        state.id = current.id.clone();
        state.created_at = current.created_at.clone();
        state.status = Some(price.status.as_str().to_string());
        state.quantity = price.quantity_limits().map(QuantityModel::from);
        state.tax_mode = Some(price.tax_mode);
        state.updated_at = Some(price.updated_at);
        Ok(state)
    }

    async fn delete(&self, ctx: &Context, current: &PriceModel) -> Result<()> {
        let id = require_id(Self::TYPE_NAME, &current.id)?;
        info!("Archiving price {}", id);
        absent_ok(
            self.api
                .update_price(ctx, id, &UpdatePriceRequest::archive())
                .await,
        )
        .map_err(|e| e.during("archive price", format!("ID {}", id)))?;
        Ok(())
    }

    fn import(&self, id: &str) -> PriceModel {
        PriceModel {
            id: Some(id.to_string()),
            ..PriceModel::default()
        }
    }
}
