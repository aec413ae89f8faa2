use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use bytes::Bytes;
use herald_core::{
    Credential, DeliveryPoint, Notification, ProviderRecord, PushError, PushResult, TokenStatus,
};
use herald_executor::{DispatchEngine, ExecutorConfig};
use herald_provider::{PushContext, PushGateway, PushService, required};
use reqwest::Client;
use tokio::sync::mpsc;

use crate::client::{AdmClient, REGID_KEY};
use crate::config::AdmConfig;
use crate::error::AdmError;
use crate::message::encode_message;
use crate::token::TokenManager;

/// Push service type name under which ADM is registered.
pub const ADM_SERVICE_TYPE: &str = "adm";

/// ADM implementation of the gateway steps driven by the dispatch engine.
#[derive(Debug, Clone)]
pub struct AdmGateway {
    tokens: TokenManager,
    client: AdmClient,
}

impl AdmGateway {
    /// Create a gateway with its own HTTP client.
    pub fn new(config: AdmConfig) -> Result<Self, AdmError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self::with_client(config, client))
    }

    /// Create a gateway with a custom HTTP client.
    ///
    /// Useful for sharing a connection pool across services.
    pub fn with_client(config: AdmConfig, client: Client) -> Self {
        Self {
            tokens: TokenManager::new(client.clone(), &config),
            client: AdmClient::new(client, config),
        }
    }
}

impl PushGateway for AdmGateway {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        ADM_SERVICE_TYPE
    }

    async fn ensure_token(&self, provider: &ProviderRecord) -> Result<TokenStatus, PushError> {
        self.tokens.ensure_token(provider).await
    }

    fn encode(&self, notification: &Notification) -> Result<Bytes, PushError> {
        encode_message(notification)
    }

    async fn send(
        &self,
        credential: &Credential,
        destination: &DeliveryPoint,
        body: Bytes,
    ) -> Result<String, PushError> {
        self.client.send(credential, destination, body).await
    }
}

/// Amazon Device Messaging push service.
///
/// Providers need `service`, `clientid` and `clientsecret`; destinations need
/// `service`, `subscriber` and `regid`.
pub struct AdmPushService {
    gateway: Arc<AdmGateway>,
    engine: DispatchEngine,
}

impl AdmPushService {
    pub fn new(config: AdmConfig, executor: ExecutorConfig) -> Result<Self, AdmError> {
        Ok(Self::with_gateway(
            AdmGateway::new(config)?,
            DispatchEngine::new(executor),
        ))
    }

    pub fn with_gateway(gateway: AdmGateway, engine: DispatchEngine) -> Self {
        Self {
            gateway: Arc::new(gateway),
            engine,
        }
    }
}

fn pick(
    kv: &HashMap<String, String>,
    keys: &[&'static str],
) -> Result<BTreeMap<String, String>, PushError> {
    keys.iter()
        .map(|&key| required(kv, key).map(|v| (key.to_owned(), v.to_owned())))
        .collect()
}

impl PushService for AdmPushService {
    #[allow(clippy::unnecessary_literal_bound)]
    fn name(&self) -> &str {
        ADM_SERVICE_TYPE
    }

    fn build_provider(&self, kv: &HashMap<String, String>) -> Result<ProviderRecord, PushError> {
        let fixed = pick(kv, &["service", "clientid", "clientsecret"])?;
        let name = format!("{ADM_SERVICE_TYPE}:{}:{}", fixed["service"], fixed["clientid"]);
        Ok(ProviderRecord::new(name, ADM_SERVICE_TYPE, fixed))
    }

    fn build_destination(&self, kv: &HashMap<String, String>) -> Result<DeliveryPoint, PushError> {
        let fixed = pick(kv, &["service", "subscriber", REGID_KEY])?;
        Ok(DeliveryPoint::new(ADM_SERVICE_TYPE, fixed))
    }

    async fn push(
        &self,
        provider: &ProviderRecord,
        destinations: mpsc::Receiver<DeliveryPoint>,
        results: mpsc::Sender<PushResult>,
        notification: &Notification,
        ctx: &PushContext,
    ) {
        self.engine
            .push(&self.gateway, provider, destinations, results, notification, ctx)
            .await;
    }
}
