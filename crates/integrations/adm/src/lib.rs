//! Amazon Device Messaging (ADM) push service for Herald.
//!
//! Exchanges each provider's client credentials for an OAuth2 bearer token,
//! caches it on the provider record until shortly before it expires, and
//! posts one JSON message per device registration through the shared
//! dispatch engine.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//!
//! use herald_adm::{AdmConfig, AdmPushService};
//! use herald_executor::ExecutorConfig;
//! use herald_provider::PushServiceRegistry;
//!
//! let service = AdmPushService::new(AdmConfig::default(), ExecutorConfig::default())
//!     .expect("HTTP client");
//! let mut registry = PushServiceRegistry::new();
//! registry.register(Arc::new(service));
//! ```

pub mod client;
pub mod config;
pub mod error;
pub mod message;
pub mod provider;
pub mod token;
pub mod types;

#[cfg(test)]
mod mock;

pub use client::AdmClient;
pub use config::AdmConfig;
pub use error::AdmError;
pub use message::{build_message, encode_message};
pub use provider::{ADM_SERVICE_TYPE, AdmGateway, AdmPushService};
pub use token::TokenManager;
pub use types::AdmMessage;
