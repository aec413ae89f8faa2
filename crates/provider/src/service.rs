use std::collections::HashMap;

use async_trait::async_trait;
use herald_core::{DeliveryPoint, Notification, ProviderRecord, PushError, PushResult};
use tokio::sync::mpsc;

use crate::context::PushContext;

/// Strongly-typed push service trait with native `async fn`.
///
/// A push service turns flat configuration maps into provider and destination
/// records and delivers one notification to a stream of destinations.
///
/// This trait is **not** object-safe because it uses native `async fn` methods.
/// If you need dynamic dispatch, use [`DynPushService`] instead -- every
/// `PushService` automatically implements `DynPushService` via a blanket
/// implementation.
pub trait PushService: Send + Sync {
    /// Returns the push service type name (e.g. `"adm"`).
    fn name(&self) -> &str;

    /// Validate a flat configuration map and build a provider record.
    fn build_provider(&self, kv: &HashMap<String, String>) -> Result<ProviderRecord, PushError>;

    /// Validate a flat configuration map and build a destination.
    fn build_destination(&self, kv: &HashMap<String, String>) -> Result<DeliveryPoint, PushError>;

    /// Push `notification` to every destination arriving on `destinations`.
    ///
    /// Implementations must consume the whole input stream on every path and
    /// emit exactly one result per destination. Before fan-out they may emit
    /// a `ProviderUpdated` result and at most one provider-level failure.
    /// The result channel closes when `results` and every clone of it have
    /// been dropped, which happens once all results were sent.
    fn push(
        &self,
        provider: &ProviderRecord,
        destinations: mpsc::Receiver<DeliveryPoint>,
        results: mpsc::Sender<PushResult>,
        notification: &Notification,
        ctx: &PushContext,
    ) -> impl std::future::Future<Output = ()> + Send;
}

/// Object-safe push service trait for use behind `Arc<dyn DynPushService>`.
///
/// You generally should not implement this trait directly -- instead implement
/// [`PushService`] and rely on the blanket implementation.
#[async_trait]
pub trait DynPushService: Send + Sync {
    /// Returns the push service type name.
    fn name(&self) -> &str;

    /// Validate a flat configuration map and build a provider record.
    fn build_provider(&self, kv: &HashMap<String, String>) -> Result<ProviderRecord, PushError>;

    /// Validate a flat configuration map and build a destination.
    fn build_destination(&self, kv: &HashMap<String, String>) -> Result<DeliveryPoint, PushError>;

    /// Push `notification` to every destination arriving on `destinations`.
    async fn push(
        &self,
        provider: &ProviderRecord,
        destinations: mpsc::Receiver<DeliveryPoint>,
        results: mpsc::Sender<PushResult>,
        notification: &Notification,
        ctx: &PushContext,
    );
}

/// Blanket implementation: any type that implements [`PushService`] also
/// implements [`DynPushService`].
#[async_trait]
impl<T: PushService + Sync> DynPushService for T {
    fn name(&self) -> &str {
        PushService::name(self)
    }

    fn build_provider(&self, kv: &HashMap<String, String>) -> Result<ProviderRecord, PushError> {
        PushService::build_provider(self, kv)
    }

    fn build_destination(&self, kv: &HashMap<String, String>) -> Result<DeliveryPoint, PushError> {
        PushService::build_destination(self, kv)
    }

    async fn push(
        &self,
        provider: &ProviderRecord,
        destinations: mpsc::Receiver<DeliveryPoint>,
        results: mpsc::Sender<PushResult>,
        notification: &Notification,
        ctx: &PushContext,
    ) {
        PushService::push(self, provider, destinations, results, notification, ctx).await;
    }
}

/// Fetch a required, non-empty value from a configuration map.
pub fn required<'a>(
    kv: &'a HashMap<String, String>,
    key: &'static str,
) -> Result<&'a str, PushError> {
    kv.get(key)
        .map(String::as_str)
        .filter(|v| !v.is_empty())
        .ok_or(PushError::MissingField(key))
}
