//! Provider root: resolves credentials and hands out reconcilers.

use std::sync::Arc;

use log::info;
use serde_derive::{Deserialize, Serialize};

use crate::api::BillingApi;
use crate::client::{Environment, PaddleClient};
use crate::datasources::DataSources;
use crate::env::{env_var_opt, load_env_file};
use crate::error::{Error, Result};
use crate::resources::{
    CustomerReconciler, DiscountReconciler, NotificationSettingReconciler, PriceReconciler,
    ProductReconciler,
};

pub const API_KEY_VAR: &str = "PADDLE_API_KEY";
pub const ENVIRONMENT_VAR: &str = "PADDLE_ENVIRONMENT";

/// Declared provider settings. A field left `None` falls back to its
/// environment variable.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    pub api_key: Option<String>,
    /// `sandbox` (default) or `production`.
    pub environment: Option<String>,
}

/// Credentials after config and environment have been merged.
#[derive(Clone, PartialEq)]
pub struct ResolvedConfig {
    pub api_key: String,
    pub environment: Environment,
}

impl std::fmt::Debug for ResolvedConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResolvedConfig")
            .field("api_key", &"***")
            .field("environment", &self.environment)
            .finish()
    }
}

impl ProviderConfig {
    /// Merge with values from `lookup`, consulted only for omitted fields.
    pub fn resolve_with<F>(&self, lookup: F) -> Result<ResolvedConfig>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = self
            .api_key
            .clone()
            .or_else(|| lookup(API_KEY_VAR))
            .unwrap_or_default();
        if api_key.is_empty() {
            return Err(Error::config(
                "api_key",
                format!(
                    "Missing Paddle API Key: set api_key in the configuration or use the {} \
                     environment variable. If either is already set, ensure the value is not empty.",
                    API_KEY_VAR
                ),
            ));
        }

        let environment = match self.environment.clone().or_else(|| lookup(ENVIRONMENT_VAR)) {
            Some(env) if !env.is_empty() => env.parse()?,
            _ => Environment::default(),
        };

        Ok(ResolvedConfig {
            api_key,
            environment,
        })
    }

    /// Merge with the process environment, after loading `.env`.
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        load_env_file();
        self.resolve_with(env_var_opt)
    }
}

/// Entry point: one shared API handle, one reconciler per entity type.
#[derive(Clone)]
pub struct Provider {
    api: Arc<dyn BillingApi>,
}

impl Provider {
    pub fn configure(config: &ProviderConfig) -> Result<Self> {
        let resolved = config.resolve()?;
        info!(
            "Configuring Paddle client for {}",
            resolved.environment.as_str()
        );
        let client = PaddleClient::new(resolved.api_key, resolved.environment)?;
        info!("Configured Paddle client");
        Ok(Self::with_api(Arc::new(client)))
    }

    /// Configure from `PADDLE_API_KEY` / `PADDLE_ENVIRONMENT` alone.
    pub fn from_env() -> Result<Self> {
        Self::configure(&ProviderConfig::default())
    }

    /// Use any [`BillingApi`] implementation, e.g. a fake in tests.
    pub fn with_api(api: Arc<dyn BillingApi>) -> Self {
        Self { api }
    }

    pub fn api(&self) -> Arc<dyn BillingApi> {
        Arc::clone(&self.api)
    }

    pub fn products(&self) -> ProductReconciler {
        ProductReconciler::new(self.api())
    }

    pub fn prices(&self) -> PriceReconciler {
        PriceReconciler::new(self.api())
    }

    pub fn discounts(&self) -> DiscountReconciler {
        DiscountReconciler::new(self.api())
    }

    pub fn customers(&self) -> CustomerReconciler {
        CustomerReconciler::new(self.api())
    }

    pub fn notification_settings(&self) -> NotificationSettingReconciler {
        NotificationSettingReconciler::new(self.api())
    }

    pub fn datasources(&self) -> DataSources {
        DataSources::new(self.api())
    }
}
