use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use log::{debug, info, warn};
use serde_derive::{Deserialize, Serialize};

use super::{absent_ok, ensure_in_place, require_id, Reconciler};
use crate::api::BillingApi;
use crate::context::Context;
use crate::error::Result;
use crate::types::{
    CreateNotificationSettingRequest, NotificationSetting, UpdateNotificationSettingRequest,
};

/// Webhook or email destination for Paddle events.
#[derive(Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NotificationSettingModel {
    pub id: Option<String>,
    pub description: String,
    /// `url` or `email`; defaults to `url` and is fixed at creation.
    #[serde(rename = "type")]
    pub destination_type: Option<String>,
    /// HTTPS endpoint or email address.
    pub destination: String,
    pub active: Option<bool>,
    /// Event names, e.g. `transaction.completed`.
    pub subscribed_events: Vec<String>,
    /// Webhook signing secret, computed. Never printed.
    pub endpoint_secret_key: Option<String>,
    pub api_version: Option<i64>,
    pub include_sensitive_fields: Option<bool>,
    /// `platform` or `api`; unset receives all events.
    pub traffic_source: Option<String>,
}

impl fmt::Debug for NotificationSettingModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NotificationSettingModel")
            .field("id", &self.id)
            .field("description", &self.description)
            .field("destination_type", &self.destination_type)
            .field("destination", &self.destination)
            .field("active", &self.active)
            .field("subscribed_events", &self.subscribed_events)
            .field(
                "endpoint_secret_key",
                &self.endpoint_secret_key.as_ref().map(|_| "<redacted>"),
            )
            .field("api_version", &self.api_version)
            .field("include_sensitive_fields", &self.include_sensitive_fields)
            .field("traffic_source", &self.traffic_source)
            .finish()
    }
}

impl NotificationSettingModel {
    /// Build a model from the remote record, keeping events in API order.
    pub fn from_remote(setting: NotificationSetting) -> Self {
        let subscribed_events = setting.event_names();
        let traffic_source = setting.traffic_source();
        Self {
            id: Some(setting.id),
            description: setting.description,
            destination_type: Some(setting.type_field),
            destination: setting.destination,
            active: Some(setting.active),
            subscribed_events,
            endpoint_secret_key: Some(setting.endpoint_secret_key),
            api_version: Some(setting.api_version),
            include_sensitive_fields: Some(setting.include_sensitive_fields),
            traffic_source,
        }
    }

    fn absorb_computed(&mut self, setting: NotificationSetting) {
        self.traffic_source = setting.traffic_source();
        self.destination_type = Some(setting.type_field);
        self.active = Some(setting.active);
        self.endpoint_secret_key = Some(setting.endpoint_secret_key);
        self.api_version = Some(setting.api_version);
        self.include_sensitive_fields = Some(setting.include_sensitive_fields);
    }
}

/// Order remote events the way they were recorded.
///
/// Recorded events still present remotely come first in recorded order,
/// followed by remote events that were not recorded, in remote order.
/// Recorded events missing remotely are dropped.
pub fn merge_subscribed_events(recorded: &[String], remote: &[String]) -> Vec<String> {
    let mut merged: Vec<String> = recorded
        .iter()
        .filter(|event| remote.contains(event))
        .cloned()
        .collect();
    merged.extend(
        remote
            .iter()
            .filter(|event| !recorded.contains(event))
            .cloned(),
    );
    merged
}

pub struct NotificationSettingReconciler {
    api: Arc<dyn BillingApi>,
}

impl NotificationSettingReconciler {
    pub fn new(api: Arc<dyn BillingApi>) -> Self {
        Self { api }
    }
}

#[async_trait]
impl Reconciler for NotificationSettingReconciler {
    type Model = NotificationSettingModel;

    const TYPE_NAME: &'static str = "paddle_notification_setting";

    fn id(model: &NotificationSettingModel) -> Option<&str> {
        model.id.as_deref()
    }

    fn validate(&self, _desired: &NotificationSettingModel) -> Result<()> {
        Ok(())
    }

    fn replacement_fields(
        &self,
        current: &NotificationSettingModel,
        desired: &NotificationSettingModel,
    ) -> Vec<&'static str> {
        let declared = desired.destination_type.as_deref().unwrap_or("url");
        match current.destination_type.as_deref() {
            Some(recorded) if recorded != declared => vec!["type"],
            _ => Vec::new(),
        }
    }

    fn needs_update(
        &self,
        current: &NotificationSettingModel,
        desired: &NotificationSettingModel,
    ) -> bool {
        let active_changed = desired.active.is_some() && current.active != desired.active;
        let sensitive_changed = desired.include_sensitive_fields.is_some()
            && current.include_sensitive_fields != desired.include_sensitive_fields;
        current.description != desired.description
            || current.destination != desired.destination
            || current.subscribed_events != desired.subscribed_events
            || current.traffic_source != desired.traffic_source
            || active_changed
            || sensitive_changed
    }

    async fn create(
        &self,
        ctx: &Context,
        desired: NotificationSettingModel,
    ) -> Result<NotificationSettingModel> {
        let req = CreateNotificationSettingRequest {
            description: desired.description.clone(),
            type_field: desired
                .destination_type
                .clone()
                .unwrap_or_else(|| "url".to_string()),
            destination: desired.destination.clone(),
            subscribed_events: desired.subscribed_events.clone(),
            include_sensitive_fields: desired.include_sensitive_fields,
            traffic_source: desired.traffic_source.clone(),
        };

        info!(
            "Creating notification setting for {} ({} events)",
            desired.destination,
            desired.subscribed_events.len()
        );
        let setting = self
            .api
            .create_notification_setting(ctx, &req)
            .await
            .map_err(|e| e.during("create notification setting", desired.destination.clone()))?;

        let mut state = desired;
        state.id = Some(setting.id.clone());
        state.absorb_computed(setting);
        Ok(state)
    }

    async fn read(
        &self,
        ctx: &Context,
        current: NotificationSettingModel,
    ) -> Result<Option<NotificationSettingModel>> {
        let id = require_id(Self::TYPE_NAME, &current.id)?;
        debug!("Reading notification setting {}", id);
        let found = absent_ok(self.api.get_notification_setting(ctx, id).await)
            .map_err(|e| e.during("read notification setting", format!("ID {}", id)))?;
        let Some(setting) = found else {
            warn!(
                "Notification setting {} no longer exists, dropping it from state",
                id
            );
            return Ok(None);
        };

        let mut refreshed = NotificationSettingModel::from_remote(setting);
        refreshed.subscribed_events =
            merge_subscribed_events(&current.subscribed_events, &refreshed.subscribed_events);
        Ok(Some(refreshed))
    }

    async fn update(
        &self,
        ctx: &Context,
        current: &NotificationSettingModel,
        desired: NotificationSettingModel,
    ) -> Result<NotificationSettingModel> {
        let id = require_id(Self::TYPE_NAME, &current.id)?;
        ensure_in_place(Self::TYPE_NAME, self.replacement_fields(current, &desired))?;

        let req = UpdateNotificationSettingRequest {
            description: Some(desired.description.clone()),
            destination: Some(desired.destination.clone()),
            subscribed_events: Some(desired.subscribed_events.clone()),
            active: desired.active,
            include_sensitive_fields: desired.include_sensitive_fields,
            // empty string clears the filter
            traffic_source: Some(desired.traffic_source.clone().unwrap_or_default()),
        };

        info!("Updating notification setting {}", id);
        let setting = self
            .api
            .update_notification_setting(ctx, id, &req)
            .await
            .map_err(|e| e.during("update notification setting", format!("ID {}", id)))?;

        let mut state = desired;
        state.id = current.id.clone();
        state.absorb_computed(setting);
        Ok(state)
    }

    async fn delete(&self, ctx: &Context, current: &NotificationSettingModel) -> Result<()> {
        let id = require_id(Self::TYPE_NAME, &current.id)?;
        info!("Deleting notification setting {}", id);
        absent_ok(self.api.delete_notification_setting(ctx, id).await)
            .map_err(|e| e.during("delete notification setting", format!("ID {}", id)))?;
        Ok(())
    }

    fn import(&self, id: &str) -> NotificationSettingModel {
        NotificationSettingModel {
            id: Some(id.to_string()),
            ..NotificationSettingModel::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn events(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_merge_keeps_recorded_order() {
        let merged = merge_subscribed_events(&events(&["A", "B", "C"]), &events(&["D", "C", "B"]));
        assert_eq!(merged, events(&["B", "C", "D"]));
    }

    #[test]
    fn test_merge_with_nothing_recorded_uses_remote_order() {
        let merged = merge_subscribed_events(&[], &events(&["b", "a"]));
        assert_eq!(merged, events(&["b", "a"]));
    }

    #[test]
    fn test_merge_drops_events_gone_remotely() {
        let merged = merge_subscribed_events(&events(&["x", "y"]), &[]);
        assert!(merged.is_empty());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let model = NotificationSettingModel {
            endpoint_secret_key: Some("pdl_ntfset_secret".into()),
            ..NotificationSettingModel::default()
        };
        let printed = format!("{:?}", model);
        assert!(!printed.contains("pdl_ntfset_secret"));
        assert!(printed.contains("<redacted>"));
    }

    #[test]
    fn test_type_change_requires_replacement() {
        let r = NotificationSettingReconciler::new(Arc::new(crate::api::Offline));
        let current = NotificationSettingModel {
            destination_type: Some("url".into()),
            ..NotificationSettingModel::default()
        };
        let mut desired = current.clone();
        desired.destination_type = None;
        assert!(r.replacement_fields(&current, &desired).is_empty());
        desired.destination_type = Some("email".into());
        assert_eq!(r.replacement_fields(&current, &desired), vec!["type"]);
    }
}
