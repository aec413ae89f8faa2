use crate::credential::Credential;
use crate::destination::DeliveryPoint;
use crate::error::PushError;

/// What happened to one destination (or to the provider as a whole).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PushOutcome {
    /// The gateway accepted the message and assigned it an identifier.
    Delivered { message_id: String },
    /// The provider's token was refreshed. Not a failure: the host should
    /// persist the new credential and keep going.
    ProviderUpdated(Credential),
    /// The operation failed.
    Failed(PushError),
}

/// One entry of the result stream produced by a push.
///
/// Exactly one result is produced per input destination. Provider-level
/// results (`destination == None`) are emitted before fan-out: at most one
/// failure, optionally preceded by a `ProviderUpdated` result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PushResult {
    /// Name of the provider the push ran for.
    pub provider: String,
    /// The destination this result belongs to, or `None` for provider-level
    /// results.
    pub destination: Option<DeliveryPoint>,
    pub outcome: PushOutcome,
}

impl PushResult {
    /// Build a provider-level result.
    pub fn provider_level(provider: impl Into<String>, outcome: PushOutcome) -> Self {
        Self {
            provider: provider.into(),
            destination: None,
            outcome,
        }
    }

    /// Build a per-destination result from the outcome of one send.
    pub fn for_destination(
        provider: impl Into<String>,
        destination: DeliveryPoint,
        sent: Result<String, PushError>,
    ) -> Self {
        let outcome = match sent {
            Ok(message_id) => PushOutcome::Delivered { message_id },
            Err(e) => PushOutcome::Failed(e),
        };
        Self {
            provider: provider.into(),
            destination: Some(destination),
            outcome,
        }
    }

    /// Returns `true` if the message was delivered.
    pub fn is_delivered(&self) -> bool {
        matches!(self.outcome, PushOutcome::Delivered { .. })
    }

    /// The gateway-assigned message id, if delivered.
    pub fn message_id(&self) -> Option<&str> {
        match &self.outcome {
            PushOutcome::Delivered { message_id } => Some(message_id),
            _ => None,
        }
    }

    /// The failure, if any.
    pub fn error(&self) -> Option<&PushError> {
        match &self.outcome {
            PushOutcome::Failed(e) => Some(e),
            _ => None,
        }
    }
}
