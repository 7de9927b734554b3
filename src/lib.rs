//! Declarative reconciliation of Paddle Billing catalog entities.
//!
//! Products, prices, discounts, customers and notification settings are
//! declared as plain models and driven to match the remote account through
//! per-entity [`resources::Reconciler`]s. [`state`] tracks what exists and
//! [`Provider`] wires everything to a [`PaddleClient`].

pub mod api;
pub mod client;
pub mod context;
pub mod custom_data;
pub mod datasources;
pub mod env;
pub mod error;
pub mod logger;
pub mod provider;
pub mod resources;
pub mod state;
pub mod types;
pub mod validators;

pub use api::BillingApi;
pub use client::{Environment, PaddleClient};
pub use context::{CancelHandle, Context};
pub use error::{Error, Result, ValidationError};
pub use provider::{Provider, ProviderConfig};
pub use resources::Reconciler;
pub use state::{Change, Lifecycle, StateStore};

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
