//! Tracked state and the drivers that move records through their lifecycle.
//!
//! ```text
//!            apply(Some)            apply(None)
//!   absent ----------> planned ----> present ----------> absent
//!                         |             |  taint / failed read-back
//!                         v             v
//!                      absent        tainted --apply--> replaced
//! ```

use std::collections::HashMap;
use std::sync::Arc;

use log::{debug, info, warn};
use serde_derive::{Deserialize, Serialize};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::context::Context;
use crate::error::{Error, Result};
use crate::resources::Reconciler;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Lifecycle {
    Absent,
    /// Create in flight.
    Planned,
    Present,
    /// Exists remotely but must be replaced on the next apply.
    Tainted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrackedResource {
    pub lifecycle: Lifecycle,
    pub record: Value,
}

/// What `apply` did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Change {
    Created,
    Updated,
    Replaced,
    Deleted,
    NoOp,
}

/// Resource address -> tracked record. Cheap to clone; clones share storage.
#[derive(Clone, Default)]
pub struct StateStore {
    inner: Arc<Mutex<HashMap<String, TrackedResource>>>,
}

impl StateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn set(&self, address: &str, tracked: TrackedResource) {
        let mut store = self.inner.lock().await;
        store.insert(address.to_string(), tracked);
    }

    pub async fn get(&self, address: &str) -> Option<TrackedResource> {
        let store = self.inner.lock().await;
        store.get(address).cloned()
    }

    pub async fn remove(&self, address: &str) -> Option<TrackedResource> {
        let mut store = self.inner.lock().await;
        store.remove(address)
    }

    /// `Absent` for addresses never seen.
    pub async fn lifecycle(&self, address: &str) -> Lifecycle {
        self.get(address)
            .await
            .map_or(Lifecycle::Absent, |tracked| tracked.lifecycle)
    }

    /// Decode the record at `address` as a model. Only present or tainted
    /// records exist remotely; anything else reads as `None`.
    pub async fn record<M: serde::de::DeserializeOwned>(&self, address: &str) -> Result<Option<M>> {
        match self.get(address).await {
            Some(tracked)
                if matches!(tracked.lifecycle, Lifecycle::Present | Lifecycle::Tainted) =>
            {
                Ok(Some(serde_json::from_value(tracked.record)?))
            }
            _ => Ok(None),
        }
    }

    pub async fn addresses(&self) -> Vec<String> {
        let store = self.inner.lock().await;
        let mut addresses: Vec<String> = store.keys().cloned().collect();
        addresses.sort();
        addresses
    }

    /// Serialize every tracked record, for persisting between runs.
    pub async fn to_json(&self) -> Result<String> {
        let store = self.inner.lock().await;
        Ok(serde_json::to_string_pretty(&*store)?)
    }

    pub fn from_json(raw: &str) -> Result<Self> {
        let records: HashMap<String, TrackedResource> = serde_json::from_str(raw)?;
        Ok(Self {
            inner: Arc::new(Mutex::new(records)),
        })
    }

    async fn put_model<M: serde::Serialize>(
        &self,
        address: &str,
        lifecycle: Lifecycle,
        model: &M,
    ) -> Result<()> {
        let record = serde_json::to_value(model)?;
        self.set(address, TrackedResource { lifecycle, record }).await;
        Ok(())
    }

    /// Mark the record for replacement at the next apply.
    pub async fn taint(&self, address: &str) -> Result<()> {
        let mut store = self.inner.lock().await;
        match store.get_mut(address) {
            Some(tracked) if tracked.lifecycle == Lifecycle::Present => {
                info!("Tainting {}", address);
                tracked.lifecycle = Lifecycle::Tainted;
                Ok(())
            }
            Some(tracked) if tracked.lifecycle == Lifecycle::Tainted => Ok(()),
            _ => Err(Error::config(
                "address",
                format!("{} is not tracked as present", address),
            )),
        }
    }
}

/// Drive `address` toward `desired`. `None` means the resource should not exist.
pub async fn apply<R: Reconciler>(
    reconciler: &R,
    store: &StateStore,
    ctx: &Context,
    address: &str,
    desired: Option<R::Model>,
) -> Result<Change> {
    if let Some(desired) = &desired {
        reconciler.validate(desired)?;
    }

    let lifecycle = store.lifecycle(address).await;
    let current: Option<R::Model> = store.record(address).await?;

    match (current, desired) {
        (None, None) => Ok(Change::NoOp),
        (Some(current), None) => {
            reconciler.delete(ctx, &current).await?;
            store.remove(address).await;
            info!("{} deleted", address);
            Ok(Change::Deleted)
        }
        (None, Some(desired)) => {
            create_at(reconciler, store, ctx, address, desired).await?;
            Ok(Change::Created)
        }
        (Some(current), Some(desired)) => {
            let fields = reconciler.replacement_fields(&current, &desired);
            if lifecycle == Lifecycle::Tainted || !fields.is_empty() {
                if !fields.is_empty() {
                    info!("{} must be replaced: {}", address, fields.join(", "));
                }
                reconciler.delete(ctx, &current).await?;
                store.remove(address).await;
                create_at(reconciler, store, ctx, address, desired).await?;
                return Ok(Change::Replaced);
            }
            if !reconciler.needs_update(&current, &desired) {
                debug!("{} is up to date", address);
                return Ok(Change::NoOp);
            }
            let updated = reconciler.update(ctx, &current, desired).await?;
            store.put_model(address, Lifecycle::Present, &updated).await?;
            Ok(Change::Updated)
        }
    }
}

async fn create_at<R: Reconciler>(
    reconciler: &R,
    store: &StateStore,
    ctx: &Context,
    address: &str,
    desired: R::Model,
) -> Result<()> {
    store.put_model(address, Lifecycle::Planned, &desired).await?;
    match reconciler.create(ctx, desired).await {
        Ok(created) => {
            info!(
                "{} created as {}",
                address,
                R::id(&created).unwrap_or_default()
            );
            store.put_model(address, Lifecycle::Present, &created).await
        }
        Err(Error::Incomplete {
            resource,
            id,
            record,
            source,
        }) => {
            warn!("{} created as {} but left tainted", address, id);
            store
                .set(
                    address,
                    TrackedResource {
                        lifecycle: Lifecycle::Tainted,
                        record: record.clone(),
                    },
                )
                .await;
            Err(Error::Incomplete {
                resource,
                id,
                record,
                source,
            })
        }
        Err(e) => {
            store.remove(address).await;
            Err(e)
        }
    }
}

/// Re-read the record at `address`. Returns false when it was dropped.
pub async fn refresh<R: Reconciler>(
    reconciler: &R,
    store: &StateStore,
    ctx: &Context,
    address: &str,
) -> Result<bool> {
    let lifecycle = store.lifecycle(address).await;
    let Some(current) = store.record::<R::Model>(address).await? else {
        return Ok(false);
    };
    match reconciler.read(ctx, current).await? {
        Some(fresh) => {
            // tainted records stay tainted across refreshes
            let lifecycle = match lifecycle {
                Lifecycle::Tainted => Lifecycle::Tainted,
                _ => Lifecycle::Present,
            };
            store.put_model(address, lifecycle, &fresh).await?;
            Ok(true)
        }
        None => {
            store.remove(address).await;
            Ok(false)
        }
    }
}

/// Start tracking an existing remote entity by id.
pub async fn import<R: Reconciler>(
    reconciler: &R,
    store: &StateStore,
    ctx: &Context,
    address: &str,
    id: &str,
) -> Result<R::Model> {
    let seeded = reconciler.import(id);
    match reconciler.read(ctx, seeded).await? {
        Some(model) => {
            store.put_model(address, Lifecycle::Present, &model).await?;
            info!("Imported {} as {}", id, address);
            Ok(model)
        }
        None => Err(Error::NotFound {
            resource: R::TYPE_NAME,
            id: id.to_string(),
        }),
    }
}
