use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info, warn};
use serde_derive::{Deserialize, Serialize};

use super::{absent_ok, require_id, Reconciler};
use crate::api::BillingApi;
use crate::context::Context;
use crate::custom_data;
use crate::error::Result;
use crate::types::{CreateCustomerRequest, Customer, UpdateCustomerRequest};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CustomerModel {
    pub id: Option<String>,
    pub name: Option<String>,
    pub email: String,
    /// Set by the customer during checkout, never by us.
    pub marketing_consent: Option<bool>,
    pub status: Option<String>,
    pub custom_data: Option<HashMap<String, String>>,
    /// IETF BCP 47 tag; Paddle defaults it to `en`.
    pub locale: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl CustomerModel {
    pub fn from_remote(customer: Customer) -> Result<Self> {
        Ok(Self {
            custom_data: custom_data::encode(customer.custom_data.as_ref())?,
            id: Some(customer.id),
            name: customer.name,
            email: customer.email,
            marketing_consent: Some(customer.marketing_consent),
            status: Some(customer.status.as_str().to_string()),
            locale: Some(customer.locale),
            created_at: Some(customer.created_at),
            updated_at: Some(customer.updated_at),
        })
    }
}

pub struct CustomerReconciler {
    api: Arc<dyn BillingApi>,
}

impl CustomerReconciler {
    pub fn new(api: Arc<dyn BillingApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Reconciler for CustomerReconciler {
    type Model = CustomerModel;

    const TYPE_NAME: &'static str = "paddle_customer";

    fn id(model: &CustomerModel) -> Option<&str> {
        model.id.as_deref()
    }

    fn validate(&self, _desired: &CustomerModel) -> Result<()> {
        Ok(())
    }

    fn replacement_fields(
        &self,
        _current: &CustomerModel,
        _desired: &CustomerModel,
    ) -> Vec<&'static str> {
        Vec::new()
    }

    fn needs_update(&self, current: &CustomerModel, desired: &CustomerModel) -> bool {
        let locale_changed = desired.locale.is_some() && current.locale != desired.locale;
        current.email != desired.email
            || current.name != desired.name
            || current.custom_data != desired.custom_data
            || locale_changed
    }

    async fn create(&self, ctx: &Context, desired: CustomerModel) -> Result<CustomerModel> {
        let req = CreateCustomerRequest {
            email: desired.email.clone(),
            name: desired.name.clone(),
            locale: desired.locale.clone(),
            custom_data: custom_data::decode(desired.custom_data.as_ref()),
        };

        info!("Creating customer {}", desired.email);
        let customer = self
            .api
            .create_customer(ctx, &req)
            .await
            .map_err(|e| e.during("create customer", format!("email '{}'", desired.email)))?;

        let mut state = desired;
        state.marketing_consent = Some(customer.marketing_consent);
        state.status = Some(customer.status.as_str().to_string());
        state.locale = Some(customer.locale);
        state.created_at = Some(customer.created_at);
        state.updated_at = Some(customer.updated_at);
        state.id = Some(customer.id);
        Ok(state)
    }

    async fn read(&self, ctx: &Context, current: CustomerModel) -> Result<Option<CustomerModel>> {
        let id = require_id(Self::TYPE_NAME, &current.id)?;
        debug!("Reading customer {}", id);
        let found = absent_ok(self.api.get_customer(ctx, id).await)
            .map_err(|e| e.during("read customer", format!("ID {}", id)))?;
        match found {
            Some(customer) => CustomerModel::from_remote(customer).map(Some),
            None => {
                warn!("Customer {} no longer exists, dropping it from state", id);
                Ok(None)
            }
        }
    }

    async fn update(
        &self,
        ctx: &Context,
        current: &CustomerModel,
        desired: CustomerModel,
    ) -> Result<CustomerModel> {
        let id = require_id(Self::TYPE_NAME, &current.id)?;

        let req = UpdateCustomerRequest {
            email: Some(desired.email.clone()),
            name: Some(desired.name.clone()),
            locale: desired.locale.clone(),
            custom_data: Some(custom_data::decode(desired.custom_data.as_ref())),
            status: None,
        };

        info!("Updating customer {}", id);
        let customer = self.api.update_customer(ctx, id, &req).await.map_err(|e| {
            e.during(
                "update customer",
                format!("ID {} (email: {})", id, desired.email),
            )
        })?;

        let mut state = desired;
        state.id = current.id.clone();
        state.created_at = current.created_at.clone();
        state.marketing_consent = Some(customer.marketing_consent);
        state.status = Some(customer.status.as_str().to_string());
        state.locale = Some(customer.locale);
        state.updated_at = Some(customer.updated_at);
        Ok(state)
    }

    async fn delete(&self, ctx: &Context, current: &CustomerModel) -> Result<()> {
        let id = require_id(Self::TYPE_NAME, &current.id)?;
        info!("Archiving customer {}", id);
        absent_ok(
            self.api
                .update_customer(ctx, id, &UpdateCustomerRequest::archive())
                .await,
        )
        .map_err(|e| e.during("archive customer", format!("ID {}", id)))?;
        Ok(())
    }

    fn import(&self, id: &str) -> CustomerModel {
        CustomerModel {
            id: Some(id.to_string()),
            ..CustomerModel::default()
        }
    }
}
