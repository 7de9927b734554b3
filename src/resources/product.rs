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
use crate::types::{CreateProductRequest, Product, UpdateProductRequest};
use crate::validators;

/// Products are the items that you sell. Prices determine how much you
/// charge for them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductModel {
    /// Paddle product ID (`pro_...`), computed.
    pub id: Option<String>,
    pub name: String,
    pub description: Option<String>,
    pub tax_category: String,
    pub image_url: Option<String>,
    /// Max 10 keys, 1KB total; enforced remotely.
    pub custom_data: Option<HashMap<String, String>>,
    /// `active` or `archived`, computed.
    pub status: Option<String>,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl ProductModel {
    /// Build a model from the remote record.
    pub fn from_remote(product: Product) -> Result<Self> {
        Ok(Self {
            custom_data: custom_data::encode(product.custom_data.as_ref())?,
            id: Some(product.id),
            name: product.name,
            description: product.description,
            tax_category: product.tax_category,
            image_url: product.image_url,
            status: Some(product.status.as_str().to_string()),
            created_at: Some(product.created_at),
            updated_at: Some(product.updated_at),
        })
    }
}

pub struct ProductReconciler {
    api: Arc<dyn BillingApi>,
}

impl ProductReconciler {
    pub fn new(api: Arc<dyn BillingApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Reconciler for ProductReconciler {
    type Model = ProductModel;

    const TYPE_NAME: &'static str = "paddle_product";

    fn id(model: &ProductModel) -> Option<&str> {
        model.id.as_deref()
    }

    fn validate(&self, desired: &ProductModel) -> Result<()> {
        validators::tax_category("tax_category", Some(desired.tax_category.as_str()))?;
        Ok(())
    }

    fn replacement_fields(&self, _current: &ProductModel, _desired: &ProductModel) -> Vec<&'static str> {
        Vec::new()
    }

    fn needs_update(&self, current: &ProductModel, desired: &ProductModel) -> bool {
        current.name != desired.name
            || current.description != desired.description
            || current.tax_category != desired.tax_category
            || current.image_url != desired.image_url
            || current.custom_data != desired.custom_data
    }

    async fn create(&self, ctx: &Context, desired: ProductModel) -> Result<ProductModel> {
        self.validate(&desired)?;
        let req = CreateProductRequest {
            name: desired.name.clone(),
            tax_category: desired.tax_category.clone(),
            description: desired.description.clone(),
            image_url: desired.image_url.clone(),
            custom_data: custom_data::decode(desired.custom_data.as_ref()),
        };

        info!("Creating product '{}'", desired.name);
        let product = self
            .api
            .create_product(ctx, &req)
            .await
            .map_err(|e| e.during("create product", format!("name '{}'", desired.name)))?;

        let mut state = desired;
        state.status = Some(product.status.as_str().to_string());
        state.created_at = Some(product.created_at);
        state.updated_at = Some(product.updated_at);
        state.id = Some(product.id);
        Ok(state)
    }

    async fn read(&self, ctx: &Context, current: ProductModel) -> Result<Option<ProductModel>> {
        let id = require_id(Self::TYPE_NAME, &current.id)?;
        debug!("Reading product {}", id);
        let found = absent_ok(self.api.get_product(ctx, id).await)
            .map_err(|e| e.during("read product", format!("ID {}", id)))?;
        match found {
            Some(product) => ProductModel::from_remote(product).map(Some),
            None => {
                warn!("Product {} no longer exists, dropping it from state", id);
                Ok(None)
            }
        }
    }

    async fn update(
        &self,
        ctx: &Context,
        current: &ProductModel,
        desired: ProductModel,
    ) -> Result<ProductModel> {
        let id = require_id(Self::TYPE_NAME, &current.id)?;
        self.validate(&desired)?;

        // unset optionals are cleared remotely rather than left stale
        let req = UpdateProductRequest {
            name: Some(desired.name.clone()),
            tax_category: Some(desired.tax_category.clone()),
            description: Some(desired.description.clone()),
            image_url: Some(desired.image_url.clone()),
            custom_data: Some(custom_data::decode(desired.custom_data.as_ref())),
            status: None,
        };

        info!("Updating product {}", id);
        let product = self.api.update_product(ctx, id, &req).await.map_err(|e| {
            e.during(
                "update product",
                format!("ID {} (name: {})", id, desired.name),
            )
        })?;

        let mut state = desired;
        state.id = current.id.clone();
        state.created_at = current.created_at.clone();
        state.status = Some(product.status.as_str().to_string());
        state.updated_at = Some(product.updated_at);
        Ok(state)
    }

    async fn delete(&self, ctx: &Context, current: &ProductModel) -> Result<()> {
        let id = require_id(Self::TYPE_NAME, &current.id)?;
        info!("Archiving product {}", id);
        absent_ok(
            self.api
                .update_product(ctx, id, &UpdateProductRequest::archive())
                .await,
        )
        .map_err(|e| e.during("archive product", format!("ID {}", id)))?;
        Ok(())
    }

    fn import(&self, id: &str) -> ProductModel {
        ProductModel {
            id: Some(id.to_string()),
            ..ProductModel::default()
        }
    }
}
