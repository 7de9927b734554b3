//! Per-entity reconcilers.
//!
//! Each entity type maps its declarative model onto the remote calls behind
//! [`BillingApi`]. The shape is the same for all of them:
//!
//! ```text
//! create  -> POST, copy id / computed defaults / timestamps back
//! read    -> GET, Ok(None) when the entity is gone
//! update  -> PATCH of mutable fields, or RequiresReplacement
//! delete  -> PATCH status=archived, or DELETE for notification settings
//! import  -> id only, a read fills in the rest
//! ```

pub mod customer;
pub mod discount;
pub mod notification_setting;
pub mod price;
pub mod product;

use std::fmt::Debug;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::context::Context;
use crate::error::{Error, Result};

pub use customer::{CustomerModel, CustomerReconciler};
pub use discount::{DiscountModel, DiscountReconciler};
pub use notification_setting::{
    merge_subscribed_events, NotificationSettingModel, NotificationSettingReconciler,
};
pub use price::{
    BillingCycleModel, PriceModel, PriceReconciler, QuantityModel, UnitPriceModel,
    UnitPriceOverrideModel,
};
pub use product::{ProductModel, ProductReconciler};

#[async_trait]
pub trait Reconciler: Send + Sync {
    type Model: Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static;

    /// Resource type name, e.g. `paddle_product`.
    const TYPE_NAME: &'static str;

    fn id(model: &Self::Model) -> Option<&str>;

    /// Run the field validators. Called before any remote call.
    fn validate(&self, desired: &Self::Model) -> Result<()>;

    /// Immutable fields whose desired value differs from the current one.
    fn replacement_fields(&self, current: &Self::Model, desired: &Self::Model)
        -> Vec<&'static str>;

    /// Whether any mutable, operator-controlled field differs.
    fn needs_update(&self, current: &Self::Model, desired: &Self::Model) -> bool;

    async fn create(&self, ctx: &Context, desired: Self::Model) -> Result<Self::Model>;

    /// Refresh `current` from the remote record. `Ok(None)` means it is gone
    /// and should be dropped from tracked state.
    async fn read(&self, ctx: &Context, current: Self::Model) -> Result<Option<Self::Model>>;

    async fn update(
        &self,
        ctx: &Context,
        current: &Self::Model,
        desired: Self::Model,
    ) -> Result<Self::Model>;

    /// Never fails because the entity is already gone.
    async fn delete(&self, ctx: &Context, current: &Self::Model) -> Result<()>;

    fn import(&self, id: &str) -> Self::Model;
}

pub(crate) fn require_id<'a>(resource: &'static str, id: &'a Option<String>) -> Result<&'a str> {
    id.as_deref()
        .filter(|id| !id.is_empty())
        .ok_or(Error::Unidentified { resource })
}

/// Fold a not-found error into `None`.
pub(crate) fn absent_ok<T>(res: Result<T>) -> Result<Option<T>> {
    match res {
        Ok(v) => Ok(Some(v)),
        Err(e) if e.is_not_found() => Ok(None),
        Err(e) => Err(e),
    }
}

/// Compare declared lists, treating an empty list like an unset one.
pub(crate) fn same_list<T: PartialEq>(a: &Option<Vec<T>>, b: &Option<Vec<T>>) -> bool {
    a.as_deref().unwrap_or_default() == b.as_deref().unwrap_or_default()
}

/// Fail with `RequiresReplacement` when any immutable field changed.
pub(crate) fn ensure_in_place(resource: &'static str, fields: Vec<&'static str>) -> Result<()> {
    if fields.is_empty() {
        Ok(())
    } else {
        Err(Error::RequiresReplacement { resource, fields })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_require_id() {
        assert_eq!(require_id("paddle_product", &Some("pro_01".into())).unwrap(), "pro_01");
        assert!(matches!(
            require_id("paddle_product", &None),
            Err(Error::Unidentified { .. })
        ));
        assert!(require_id("paddle_product", &Some(String::new())).is_err());
    }

    #[test]
    fn test_absent_ok() {
        let gone: Result<()> = Err(Error::NotFound {
            resource: "price",
            id: "pri_01".into(),
        });
        assert!(absent_ok(gone).unwrap().is_none());
        assert!(absent_ok::<()>(Err(Error::Cancelled)).is_err());
    }

    #[test]
    fn test_same_list_treats_empty_as_unset() {
        let empty: Option<Vec<String>> = Some(vec![]);
        assert!(same_list(&empty, &None));
        assert!(same_list(&None::<Vec<String>>, &None));
        assert!(!same_list(&Some(vec!["pro_01".to_string()]), &empty));
    }
}
