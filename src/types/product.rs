use serde_derive::{Deserialize, Serialize};

use super::{CustomData, Status};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    pub name: String,
    pub tax_category: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub custom_data: Option<CustomData>,
    pub status: Status,
    pub created_at: String,
    pub updated_at: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CreateProductRequest {
    pub name: String,
    pub tax_category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<CustomData>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct UpdateProductRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tax_category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<Option<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_data: Option<Option<CustomData>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<Status>,
}

impl UpdateProductRequest {
    pub fn archive() -> Self {
        Self {
            status: Some(Status::Archived),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_update_distinguishes_unsent_from_cleared() {
        let req = UpdateProductRequest {
            name: Some("Pro".to_string()),
            description: Some(None),
            ..UpdateProductRequest::default()
        };
        assert_eq!(
            serde_json::to_value(&req).unwrap(),
            json!({ "name": "Pro", "description": null })
        );
    }

    #[test]
    fn test_archive_sends_status_only() {
        assert_eq!(
            serde_json::to_value(UpdateProductRequest::archive()).unwrap(),
            json!({ "status": "archived" })
        );
    }
}
