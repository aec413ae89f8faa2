use std::time::Duration;

use thiserror::Error;

/// Broad classification of a [`PushError`], used by hosts to decide how a
/// failure should be reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Required configuration was missing or malformed. Detected before any
    /// network activity.
    Configuration,
    /// The gateway rejected the provider's credentials or scope.
    Auth,
    /// Network failure or a malformed response body.
    Transport,
    /// A single destination could not be delivered to.
    Destination,
    /// The notification could not be turned into a wire message.
    Notification,
    /// The caller cancelled the push.
    Cancelled,
    /// A worker failed unexpectedly.
    Internal,
}

/// Structured failure carried by a [`PushResult`](crate::PushResult).
///
/// Errors raised before fan-out (token acquisition, message building) are
/// fatal to the whole batch; errors raised while sending to one destination
/// only affect that destination.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PushError {
    /// A required configuration key was absent or empty.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// No push service is registered under the requested type name.
    #[error("unknown push service type: {0}")]
    UnknownServiceType(String),

    /// The provider record lacks a credential needed for the token exchange.
    #[error("provider {provider}: missing credential {field}")]
    MissingCredential {
        provider: String,
        field: &'static str,
    },

    /// The token endpoint rejected the provider's credentials.
    #[error("provider {provider}: authentication rejected ({status}): {reason}")]
    AuthRejected {
        provider: String,
        status: u16,
        reason: String,
    },

    /// The token exchange failed in transport or returned an undecodable body.
    #[error("provider {provider}: token exchange failed: {reason}")]
    TokenExchange { provider: String, reason: String },

    /// No bearer token was available when sending.
    #[error("no bearer token available")]
    NoToken,

    /// The destination has no usable registration identifier.
    #[error("invalid destination: {0}")]
    InvalidDestination(String),

    /// The push endpoint answered with a non-success status.
    #[error("gateway rejected ({status}): {body}")]
    GatewayRejected { status: u16, body: String },

    /// A network or transport-level error occurred while sending.
    #[error("transport error: {0}")]
    Transport(String),

    /// The notification carries no application data.
    #[error("empty notification")]
    EmptyNotification,

    /// The wire message could not be serialized.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The operation did not finish within its deadline.
    #[error("timeout after {0:?}")]
    Timeout(Duration),

    /// The caller cancelled the push before this operation finished.
    #[error("cancelled")]
    Cancelled,

    /// A worker failed unexpectedly.
    #[error("internal error: {0}")]
    Internal(String),
}

impl PushError {
    /// Returns the broad category of this error.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingField(_) | Self::UnknownServiceType(_) | Self::MissingCredential { .. } => {
                ErrorCategory::Configuration
            }
            Self::AuthRejected { .. } => ErrorCategory::Auth,
            Self::TokenExchange { .. } | Self::Transport(_) | Self::Timeout(_) => {
                ErrorCategory::Transport
            }
            Self::NoToken | Self::InvalidDestination(_) | Self::GatewayRejected { .. } => {
                ErrorCategory::Destination
            }
            Self::EmptyNotification | Self::Serialization(_) => ErrorCategory::Notification,
            Self::Cancelled => ErrorCategory::Cancelled,
            Self::Internal(_) => ErrorCategory::Internal,
        }
    }

    /// Returns `true` for errors that can only arise before fan-out and
    /// therefore always abort the whole batch. Timeouts and cancellation are
    /// batch-fatal only when they hit the token check.
    pub fn is_batch_fatal(&self) -> bool {
        matches!(
            self,
            Self::MissingField(_)
                | Self::UnknownServiceType(_)
                | Self::MissingCredential { .. }
                | Self::AuthRejected { .. }
                | Self::TokenExchange { .. }
                | Self::EmptyNotification
                | Self::Serialization(_)
        )
    }

    /// Returns `true` if the error is transient and the operation may succeed
    /// if the host pushes again later.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::TokenExchange { .. } | Self::Transport(_) | Self::Timeout(_) => true,
            Self::GatewayRejected { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }
}
