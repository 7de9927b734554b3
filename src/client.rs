use std::fmt;
use std::str::FromStr;

use async_trait::async_trait;
use log::{debug, error};
use reqwest::{Method, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::api::BillingApi;
use crate::context::Context;
use crate::error::{Error, Result};
use crate::types::*;

const USER_AGENT: &str = env!("PADDLE_CLIENT_USER_AGENT");

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Sandbox,
    Production,
}

impl Environment {
    pub fn base_url(&self) -> &'static str {
        match self {
            Environment::Sandbox => "https://sandbox-api.paddle.com",
            Environment::Production => "https://api.paddle.com",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Sandbox => "sandbox",
            Environment::Production => "production",
        }
    }
}

impl FromStr for Environment {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "sandbox" => Ok(Environment::Sandbox),
            "production" => Ok(Environment::Production),
            other => Err(Error::config(
                "environment",
                format!(
                    "The environment must be either 'sandbox' or 'production', got: {}",
                    other
                ),
            )),
        }
    }
}

/// Authenticated Paddle Billing client. Cheap to clone; holds no session
/// state beyond the credentials.
#[derive(Clone)]
pub struct PaddleClient {
    api_key: String,
    base_url: String,
    environment: Environment,
    http: reqwest::Client,
}

impl fmt::Debug for PaddleClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PaddleClient")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .field("environment", &self.environment)
            .finish()
    }
}

impl PaddleClient {
    pub fn new(api_key: impl Into<String>, environment: Environment) -> Result<Self> {
        Self::with_base_url(api_key, environment, environment.base_url())
    }

    /// Point the client at an arbitrary host, e.g. a local mock server.
    pub fn with_base_url(
        api_key: impl Into<String>,
        environment: Environment,
        base_url: impl Into<String>,
    ) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| {
                Error::config(
                    "client",
                    format!("Unable to Create Paddle API Client: {}", e),
                )
            })?;
        Ok(Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            environment,
            http,
        })
    }

    pub fn environment(&self) -> Environment {
        self.environment
    }

    fn request(&self, method: Method, path: &str) -> RequestBuilder {
        let url = format!("{}{}", self.base_url, path);
        debug!("{} {}", method, url);
        self.http.request(method, url).bearer_auth(&self.api_key)
    }

    async fn get<T: DeserializeOwned>(
        &self,
        ctx: &Context,
        resource: &'static str,
        path: &str,
        id: &str,
    ) -> Result<T> {
        let request = self.request(Method::GET, &format!("{}/{}", path, id));
        ctx.run(async {
            let response = request.send().await?;
            read_data(response, resource, id).await
        })
        .await
    }

    async fn post<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        ctx: &Context,
        resource: &'static str,
        path: &str,
        body: &B,
    ) -> Result<T> {
        let request = self.request(Method::POST, path).json(body);
        ctx.run(async {
            let response = request.send().await?;
            read_data(response, resource, "").await
        })
        .await
    }

    async fn patch<B: Serialize + ?Sized, T: DeserializeOwned>(
        &self,
        ctx: &Context,
        resource: &'static str,
        path: &str,
        id: &str,
        body: &B,
    ) -> Result<T> {
        let request = self
            .request(Method::PATCH, &format!("{}/{}", path, id))
            .json(body);
        ctx.run(async {
            let response = request.send().await?;
            read_data(response, resource, id).await
        })
        .await
    }

    async fn delete(
        &self,
        ctx: &Context,
        resource: &'static str,
        path: &str,
        id: &str,
    ) -> Result<()> {
        let request = self.request(Method::DELETE, &format!("{}/{}", path, id));
        ctx.run(async {
            let response = request.send().await?;
            if response.status().is_success() {
                return Ok(());
            }
            Err(read_error(response, resource, id).await)
        })
        .await
    }
}

async fn read_data<T: DeserializeOwned>(
    response: Response,
    resource: &'static str,
    id: &str,
) -> Result<T> {
    if !response.status().is_success() {
        return Err(read_error(response, resource, id).await);
    }
    let envelope = response.json::<Envelope<T>>().await?;
    Ok(envelope.data)
}

async fn read_error(response: Response, resource: &'static str, id: &str) -> Error {
    let status = response.status();
    if status == StatusCode::NOT_FOUND {
        return Error::NotFound {
            resource,
            id: id.to_string(),
        };
    }
    let body = response.text().await.unwrap_or_default();
    let parsed = serde_json::from_str::<ErrorEnvelope>(&body).unwrap_or_default();
    let detail = parsed
        .error
        .detail
        .unwrap_or_else(|| format!("HTTP {}", status.as_u16()));
    error!("{} request failed with {}: {}", resource, status, detail);
    Error::Api {
        operation: format!("{} request", resource),
        context: if id.is_empty() {
            resource.to_string()
        } else {
            format!("ID {}", id)
        },
        status: status.as_u16(),
        code: parsed.error.code,
        detail,
    }
}

#[async_trait]
impl BillingApi for PaddleClient {
    async fn create_product(&self, ctx: &Context, req: &CreateProductRequest) -> Result<Product> {
        self.post(ctx, "product", "/products", req).await
    }

    async fn get_product(&self, ctx: &Context, id: &str) -> Result<Product> {
        self.get(ctx, "product", "/products", id).await
    }

    async fn update_product(
        &self,
        ctx: &Context,
        id: &str,
        req: &UpdateProductRequest,
    ) -> Result<Product> {
        self.patch(ctx, "product", "/products", id, req).await
    }

    async fn create_price(&self, ctx: &Context, req: &CreatePriceRequest) -> Result<Price> {
        self.post(ctx, "price", "/prices", req).await
    }

    async fn get_price(&self, ctx: &Context, id: &str) -> Result<Price> {
        self.get(ctx, "price", "/prices", id).await
    }

    async fn update_price(
        &self,
        ctx: &Context,
        id: &str,
        req: &UpdatePriceRequest,
    ) -> Result<Price> {
        self.patch(ctx, "price", "/prices", id, req).await
    }

    async fn create_discount(
        &self,
        ctx: &Context,
        req: &CreateDiscountRequest,
    ) -> Result<Discount> {
        self.post(ctx, "discount", "/discounts", req).await
    }

    async fn get_discount(&self, ctx: &Context, id: &str) -> Result<Discount> {
        self.get(ctx, "discount", "/discounts", id).await
    }

    async fn update_discount(
        &self,
        ctx: &Context,
        id: &str,
        req: &UpdateDiscountRequest,
    ) -> Result<Discount> {
        self.patch(ctx, "discount", "/discounts", id, req).await
    }

    async fn create_customer(
        &self,
        ctx: &Context,
        req: &CreateCustomerRequest,
    ) -> Result<Customer> {
        self.post(ctx, "customer", "/customers", req).await
    }

    async fn get_customer(&self, ctx: &Context, id: &str) -> Result<Customer> {
        self.get(ctx, "customer", "/customers", id).await
    }

    async fn update_customer(
        &self,
        ctx: &Context,
        id: &str,
        req: &UpdateCustomerRequest,
    ) -> Result<Customer> {
        self.patch(ctx, "customer", "/customers", id, req).await
    }

    async fn create_notification_setting(
        &self,
        ctx: &Context,
        req: &CreateNotificationSettingRequest,
    ) -> Result<NotificationSetting> {
        self.post(ctx, "notification setting", "/notification-settings", req)
            .await
    }

    async fn get_notification_setting(
        &self,
        ctx: &Context,
        id: &str,
    ) -> Result<NotificationSetting> {
        self.get(ctx, "notification setting", "/notification-settings", id)
            .await
    }

    async fn update_notification_setting(
        &self,
        ctx: &Context,
        id: &str,
        req: &UpdateNotificationSettingRequest,
    ) -> Result<NotificationSetting> {
        self.patch(ctx, "notification setting", "/notification-settings", id, req)
            .await
    }

    async fn delete_notification_setting(&self, ctx: &Context, id: &str) -> Result<()> {
        self.delete(ctx, "notification setting", "/notification-settings", id)
            .await
    }
}
