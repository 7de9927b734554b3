//! Read-only lookups by id. Unlike reconciler reads, a missing entity is an
//! error here.

use std::sync::Arc;

use log::debug;

use crate::api::BillingApi;
use crate::context::Context;
use crate::error::Result;
use crate::resources::{CustomerModel, DiscountModel, PriceModel, ProductModel};

#[derive(Clone)]
pub struct DataSources {
    api: Arc<dyn BillingApi>,
}

impl DataSources {
    pub fn new(api: Arc<dyn BillingApi>) -> Self {
        Self { api }
    }

    pub async fn lookup_product(&self, ctx: &Context, id: &str) -> Result<ProductModel> {
        debug!("Looking up product {}", id);
        let product = self
            .api
            .get_product(ctx, id)
            .await
            .map_err(|e| e.during("Error reading product", format!("ID {}", id)))?;
        ProductModel::from_remote(product)
    }

    pub async fn lookup_price(&self, ctx: &Context, id: &str) -> Result<PriceModel> {
        debug!("Looking up price {}", id);
        let price = self
            .api
            .get_price(ctx, id)
            .await
            .map_err(|e| e.during("Error reading price", format!("ID {}", id)))?;
        PriceModel::from_remote(price)
    }

    pub async fn lookup_discount(&self, ctx: &Context, id: &str) -> Result<DiscountModel> {
        debug!("Looking up discount {}", id);
        let discount = self
            .api
            .get_discount(ctx, id)
            .await
            .map_err(|e| e.during("Error reading discount", format!("ID {}", id)))?;
        DiscountModel::from_remote(discount)
    }

    pub async fn lookup_customer(&self, ctx: &Context, id: &str) -> Result<CustomerModel> {
        debug!("Looking up customer {}", id);
        let customer = self
            .api
            .get_customer(ctx, id)
            .await
            .map_err(|e| e.during("Error reading customer", format!("ID {}", id)))?;
        CustomerModel::from_remote(customer)
    }
}
