#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};

use justpaypaddle::types::*;
use justpaypaddle::{BillingApi, Context, Error, Result};

/// In-memory Paddle. Records are kept as JSON so patches apply the way the
/// API applies them: sent keys overwrite, `null` clears, unsent keys stay.
#[derive(Default)]
pub struct FakeBilling {
    inner: Mutex<Inner>,
}

#[derive(Default)]
struct Inner {
    seq: u32,
    records: HashMap<&'static str, HashMap<String, Value>>,
    calls: Vec<String>,
    bodies: Vec<(String, Value)>,
    omit_price_quantity: bool,
    fail_price_reads: bool,
}

impl FakeBilling {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every call made so far, as `"<verb> <resource>"`.
    pub fn calls(&self) -> Vec<String> {
        self.inner.lock().unwrap().calls.clone()
    }

    /// Bodies sent with `call`, oldest first.
    pub fn bodies(&self, call: &str) -> Vec<Value> {
        self.inner
            .lock()
            .unwrap()
            .bodies
            .iter()
            .filter(|(c, _)| c == call)
            .map(|(_, b)| b.clone())
            .collect()
    }

    pub fn record(&self, resource: &'static str, id: &str) -> Option<Value> {
        let inner = self.inner.lock().unwrap();
        inner.records.get(resource).and_then(|r| r.get(id)).cloned()
    }

    /// Drop an entity behind the reconciler's back.
    pub fn forget(&self, resource: &'static str, id: &str) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(records) = inner.records.get_mut(resource) {
            records.remove(id);
        }
    }

    /// Overwrite one field of a stored entity, as the API would report it.
    pub fn set_field(&self, resource: &'static str, id: &str, key: &str, value: Value) {
        let mut inner = self.inner.lock().unwrap();
        if let Some(record) = inner.records.get_mut(resource).and_then(|r| r.get_mut(id)) {
            record[key] = value;
        }
    }

    pub fn omit_price_quantity(&self) {
        self.inner.lock().unwrap().omit_price_quantity = true;
    }

    pub fn fail_price_reads(&self) {
        self.inner.lock().unwrap().fail_price_reads = true;
    }

    fn create<B: Serialize, T: DeserializeOwned>(
        &self,
        resource: &'static str,
        prefix: &str,
        body: &B,
        defaults: Value,
    ) -> Result<T> {
        let mut inner = self.inner.lock().unwrap();
        let mut record = serde_json::to_value(body)?;
        inner.calls.push(format!("create {}", resource));
        inner
            .bodies
            .push((format!("create {}", resource), record.clone()));
        inner.seq += 1;
        let id = format!("{}_{:02}", prefix, inner.seq);
        let stamp = format!("2024-01-01T00:00:{:02}Z", inner.seq);

        let obj = record.as_object_mut().expect("request body is an object");
        for (k, v) in defaults.as_object().cloned().unwrap_or_default() {
            obj.entry(k).or_insert(v);
        }
        if resource == "price" && inner.omit_price_quantity {
            obj.remove("quantity");
        }
        events_as_objects(obj);
        obj.insert("id".into(), json!(id));
        obj.insert("status".into(), json!("active"));
        obj.insert("created_at".into(), json!(stamp));
        obj.insert("updated_at".into(), json!(stamp));

        let mut stored = record.clone();
        if resource == "price" && inner.omit_price_quantity {
            // stored with Paddle's defaults, only the create response lacks them
            stored["quantity"] = json!({"minimum": 1, "maximum": 100});
        }
        inner.records.entry(resource).or_default().insert(id, stored);
        Ok(serde_json::from_value(record)?)
    }

    fn get<T: DeserializeOwned>(&self, resource: &'static str, id: &str) -> Result<T> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(format!("get {}", resource));
        if resource == "price" && inner.fail_price_reads {
            return Err(Error::Api {
                operation: "price request".into(),
                context: format!("ID {}", id),
                status: 500,
                code: Some("internal_error".into()),
                detail: "simulated outage".into(),
            });
        }
        let record = inner
            .records
            .get(resource)
            .and_then(|r| r.get(id))
            .cloned()
            .ok_or_else(|| Error::NotFound {
                resource,
                id: id.to_string(),
            })?;
        Ok(serde_json::from_value(record)?)
    }

    fn patch<B: Serialize, T: DeserializeOwned>(
        &self,
        resource: &'static str,
        id: &str,
        body: &B,
    ) -> Result<T> {
        let mut inner = self.inner.lock().unwrap();
        let mut patch = serde_json::to_value(body)?;
        inner.calls.push(format!("update {}", resource));
        inner
            .bodies
            .push((format!("update {}", resource), patch.clone()));
        inner.seq += 1;
        let stamp = format!("2024-01-01T00:01:{:02}Z", inner.seq);

        let record = inner
            .records
            .get_mut(resource)
            .and_then(|r| r.get_mut(id))
            .ok_or_else(|| Error::NotFound {
                resource,
                id: id.to_string(),
            })?;
        let patch = patch.as_object_mut().expect("patch body is an object");
        events_as_objects(patch);
        let target = record.as_object_mut().expect("stored record is an object");
        for (k, v) in patch.iter() {
            target.insert(k.clone(), v.clone());
        }
        target.insert("updated_at".into(), json!(stamp));
        Ok(serde_json::from_value(record.clone())?)
    }

    fn delete(&self, resource: &'static str, id: &str) -> Result<()> {
        let mut inner = self.inner.lock().unwrap();
        inner.calls.push(format!("delete {}", resource));
        inner
            .records
            .get_mut(resource)
            .and_then(|r| r.remove(id))
            .map(|_| ())
            .ok_or_else(|| Error::NotFound {
                resource,
                id: id.to_string(),
            })
    }
}

fn events_as_objects(obj: &mut Map<String, Value>) {
    if let Some(Value::Array(names)) = obj.get("subscribed_events").cloned() {
        let events: Vec<Value> = names
            .into_iter()
            .map(|n| match n {
                Value::String(name) => json!({ "name": name }),
                other => other,
            })
            .collect();
        obj.insert("subscribed_events".into(), Value::Array(events));
    }
}

#[async_trait]
impl BillingApi for FakeBilling {
    async fn create_product(&self, ctx: &Context, req: &CreateProductRequest) -> Result<Product> {
        ctx.run(async { self.create("product", "pro", req, json!({})) })
            .await
    }

    async fn get_product(&self, ctx: &Context, id: &str) -> Result<Product> {
        ctx.run(async { self.get("product", id) }).await
    }

    async fn update_product(
        &self,
        ctx: &Context,
        id: &str,
        req: &UpdateProductRequest,
    ) -> Result<Product> {
        ctx.run(async { self.patch("product", id, req) }).await
    }

    async fn create_price(&self, ctx: &Context, req: &CreatePriceRequest) -> Result<Price> {
        let defaults = json!({
            "tax_mode": "account_setting",
            "quantity": { "minimum": 1, "maximum": 100 }
        });
        ctx.run(async { self.create("price", "pri", req, defaults) })
            .await
    }

    async fn get_price(&self, ctx: &Context, id: &str) -> Result<Price> {
        ctx.run(async { self.get("price", id) }).await
    }

    async fn update_price(
        &self,
        ctx: &Context,
        id: &str,
        req: &UpdatePriceRequest,
    ) -> Result<Price> {
        ctx.run(async { self.patch("price", id, req) }).await
    }

    async fn create_discount(
        &self,
        ctx: &Context,
        req: &CreateDiscountRequest,
    ) -> Result<Discount> {
        let defaults = json!({
            "enabled_for_checkout": false,
            "mode": "standard",
            "recur": false,
            "times_used": 0
        });
        ctx.run(async { self.create("discount", "dsc", req, defaults) })
            .await
    }

    async fn get_discount(&self, ctx: &Context, id: &str) -> Result<Discount> {
        ctx.run(async { self.get("discount", id) }).await
    }

    async fn update_discount(
        &self,
        ctx: &Context,
        id: &str,
        req: &UpdateDiscountRequest,
    ) -> Result<Discount> {
        ctx.run(async { self.patch("discount", id, req) }).await
    }

    async fn create_customer(
        &self,
        ctx: &Context,
        req: &CreateCustomerRequest,
    ) -> Result<Customer> {
        let defaults = json!({ "marketing_consent": false, "locale": "en" });
        ctx.run(async { self.create("customer", "ctm", req, defaults) })
            .await
    }

    async fn get_customer(&self, ctx: &Context, id: &str) -> Result<Customer> {
        ctx.run(async { self.get("customer", id) }).await
    }

    async fn update_customer(
        &self,
        ctx: &Context,
        id: &str,
        req: &UpdateCustomerRequest,
    ) -> Result<Customer> {
        ctx.run(async { self.patch("customer", id, req) }).await
    }

    async fn create_notification_setting(
        &self,
        ctx: &Context,
        req: &CreateNotificationSettingRequest,
    ) -> Result<NotificationSetting> {
        let defaults = json!({
            "active": true,
            "api_version": 1,
            "include_sensitive_fields": false,
            "endpoint_secret_key": "pdl_ntfset_01_secret"
        });
        ctx.run(async { self.create("notification setting", "ntfset", req, defaults) })
            .await
    }

    async fn get_notification_setting(
        &self,
        ctx: &Context,
        id: &str,
    ) -> Result<NotificationSetting> {
        ctx.run(async { self.get("notification setting", id) })
            .await
    }

    async fn update_notification_setting(
        &self,
        ctx: &Context,
        id: &str,
        req: &UpdateNotificationSettingRequest,
    ) -> Result<NotificationSetting> {
        ctx.run(async { self.patch("notification setting", id, req) })
            .await
    }

    async fn delete_notification_setting(&self, ctx: &Context, id: &str) -> Result<()> {
        ctx.run(async { self.delete("notification setting", id) })
            .await
    }
}
