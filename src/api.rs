//! The remote billing API as seen by the reconcilers.
//!
//! [`crate::client::PaddleClient`] is the HTTP implementation. Anything else
//! that speaks the same calls (a recording fake in tests, a proxy) can be
//! handed to the provider instead.

use async_trait::async_trait;

use crate::context::Context;
use crate::error::Result;
use crate::types::{
    CreateCustomerRequest, CreateDiscountRequest, CreateNotificationSettingRequest,
    CreatePriceRequest, CreateProductRequest, Customer, Discount, NotificationSetting, Price,
    Product, UpdateCustomerRequest, UpdateDiscountRequest, UpdateNotificationSettingRequest,
    UpdatePriceRequest, UpdateProductRequest,
};

/// One method per remote call. `get_*` fails with [`crate::Error::NotFound`]
/// when the entity does not exist.
#[async_trait]
pub trait BillingApi: Send + Sync {
    async fn create_product(&self, ctx: &Context, req: &CreateProductRequest) -> Result<Product>;
    async fn get_product(&self, ctx: &Context, id: &str) -> Result<Product>;
    async fn update_product(
        &self,
        ctx: &Context,
        id: &str,
        req: &UpdateProductRequest,
    ) -> Result<Product>;

    async fn create_price(&self, ctx: &Context, req: &CreatePriceRequest) -> Result<Price>;
    async fn get_price(&self, ctx: &Context, id: &str) -> Result<Price>;
    async fn update_price(&self, ctx: &Context, id: &str, req: &UpdatePriceRequest)
        -> Result<Price>;

    async fn create_discount(&self, ctx: &Context, req: &CreateDiscountRequest)
        -> Result<Discount>;
    async fn get_discount(&self, ctx: &Context, id: &str) -> Result<Discount>;
    async fn update_discount(
        &self,
        ctx: &Context,
        id: &str,
        req: &UpdateDiscountRequest,
    ) -> Result<Discount>;

    async fn create_customer(&self, ctx: &Context, req: &CreateCustomerRequest)
        -> Result<Customer>;
    async fn get_customer(&self, ctx: &Context, id: &str) -> Result<Customer>;
    async fn update_customer(
        &self,
        ctx: &Context,
        id: &str,
        req: &UpdateCustomerRequest,
    ) -> Result<Customer>;

    async fn create_notification_setting(
        &self,
        ctx: &Context,
        req: &CreateNotificationSettingRequest,
    ) -> Result<NotificationSetting>;
    async fn get_notification_setting(&self, ctx: &Context, id: &str)
        -> Result<NotificationSetting>;
    async fn update_notification_setting(
        &self,
        ctx: &Context,
        id: &str,
        req: &UpdateNotificationSettingRequest,
    ) -> Result<NotificationSetting>;
    async fn delete_notification_setting(&self, ctx: &Context, id: &str) -> Result<()>;
}

/// Fails every call. Unit tests use it where a reconciler must not reach
/// the remote side.
#[cfg(test)]
pub(crate) struct Offline;

#[cfg(test)]
mod offline {
    use super::*;
    use crate::error::Error;

    #[async_trait]
    impl BillingApi for Offline {
        async fn create_product(&self, _: &Context, _: &CreateProductRequest) -> Result<Product> {
            Err(Error::Cancelled)
        }
        async fn get_product(&self, _: &Context, _: &str) -> Result<Product> {
            Err(Error::Cancelled)
        }
        async fn update_product(
            &self,
            _: &Context,
            _: &str,
            _: &UpdateProductRequest,
        ) -> Result<Product> {
            Err(Error::Cancelled)
        }
        async fn create_price(&self, _: &Context, _: &CreatePriceRequest) -> Result<Price> {
            Err(Error::Cancelled)
        }
        async fn get_price(&self, _: &Context, _: &str) -> Result<Price> {
            Err(Error::Cancelled)
        }
        async fn update_price(&self, _: &Context, _: &str, _: &UpdatePriceRequest) -> Result<Price> {
            Err(Error::Cancelled)
        }
        async fn create_discount(
            &self,
            _: &Context,
            _: &CreateDiscountRequest,
        ) -> Result<Discount> {
            Err(Error::Cancelled)
        }
        async fn get_discount(&self, _: &Context, _: &str) -> Result<Discount> {
            Err(Error::Cancelled)
        }
        async fn update_discount(
            &self,
            _: &Context,
            _: &str,
            _: &UpdateDiscountRequest,
        ) -> Result<Discount> {
            Err(Error::Cancelled)
        }
        async fn create_customer(
            &self,
            _: &Context,
            _: &CreateCustomerRequest,
        ) -> Result<Customer> {
            Err(Error::Cancelled)
        }
        async fn get_customer(&self, _: &Context, _: &str) -> Result<Customer> {
            Err(Error::Cancelled)
        }
        async fn update_customer(
            &self,
            _: &Context,
            _: &str,
            _: &UpdateCustomerRequest,
        ) -> Result<Customer> {
            Err(Error::Cancelled)
        }
        async fn create_notification_setting(
            &self,
            _: &Context,
            _: &CreateNotificationSettingRequest,
        ) -> Result<NotificationSetting> {
            Err(Error::Cancelled)
        }
        async fn get_notification_setting(
            &self,
            _: &Context,
            _: &str,
        ) -> Result<NotificationSetting> {
            Err(Error::Cancelled)
        }
        async fn update_notification_setting(
            &self,
            _: &Context,
            _: &str,
            _: &UpdateNotificationSettingRequest,
        ) -> Result<NotificationSetting> {
            Err(Error::Cancelled)
        }
        async fn delete_notification_setting(&self, _: &Context, _: &str) -> Result<()> {
            Err(Error::Cancelled)
        }
    }
}
