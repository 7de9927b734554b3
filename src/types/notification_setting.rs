use serde_derive::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationSetting {
    pub id: String,
    pub description: String,
    #[serde(rename = "type")]
    pub type_field: String,
    pub destination: String,
    pub active: bool,
    pub api_version: i64,
    #[serde(default)]
    pub include_sensitive_fields: bool,
    #[serde(default)]
    pub subscribed_events: Vec<SubscribedEvent>,
    #[serde(default)]
    pub endpoint_secret_key: String,
    #[serde(default)]
    pub traffic_source: Option<String>,
}

impl NotificationSetting {
    pub fn event_names(&self) -> Vec<String> {
        self.subscribed_events
            .iter()
            .map(|event| event.name.clone())
            .collect()
    }

    /// Traffic source with the API's empty string folded into `None`.
    pub fn traffic_source(&self) -> Option<String> {
        self.traffic_source.clone().filter(|source| !source.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubscribedEvent {
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub group: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateNotificationSettingRequest {
    pub description: String,
    #[serde(rename = "type")]
    pub type_field: String,
    pub destination: String,
    pub subscribed_events: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_sensitive_fields: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traffic_source: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateNotificationSettingRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub destination: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscribed_events: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_sensitive_fields: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub traffic_source: Option<String>,
}
