use bytes::Bytes;
use herald_core::{Credential, DeliveryPoint, Notification, ProviderRecord, PushError, TokenStatus};

/// The gateway-specific steps a push is made of.
///
/// The dispatch engine drives these in order: [`ensure_token`] once,
/// [`encode`] once, then [`send`] once per destination, concurrently. The
/// encoded body is shared read-only by all sends.
///
/// Like [`PushService`](crate::PushService), this trait uses native
/// `async fn` and is not object-safe; the engine is generic over it.
///
/// [`ensure_token`]: PushGateway::ensure_token
/// [`encode`]: PushGateway::encode
/// [`send`]: PushGateway::send
pub trait PushGateway: Send + Sync + 'static {
    /// Returns the gateway's push service type name.
    fn name(&self) -> &str;

    /// Make sure the provider holds a non-expired bearer token, exchanging
    /// client credentials when needed.
    fn ensure_token(
        &self,
        provider: &ProviderRecord,
    ) -> impl std::future::Future<Output = Result<TokenStatus, PushError>> + Send;

    /// Build the wire message for a notification and serialize it.
    fn encode(&self, notification: &Notification) -> Result<Bytes, PushError>;

    /// Deliver the encoded message to one destination and return the
    /// gateway-assigned message id.
    fn send(
        &self,
        credential: &Credential,
        destination: &DeliveryPoint,
        body: Bytes,
    ) -> impl std::future::Future<Output = Result<String, PushError>> + Send;
}
