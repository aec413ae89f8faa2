use herald_core::PushError;
use thiserror::Error;

/// Errors specific to the ADM gateway.
///
/// These are internal errors that get converted into [`PushError`] at the
/// gateway boundary. Errors from the token exchange need the provider name and
/// go through [`AdmError::into_token_error`]; send-side errors use `From`.
/// A token endpoint rejection is not an `AdmError`: the token manager turns
/// it into [`PushError::AuthRejected`] directly.
#[derive(Debug, Error)]
pub enum AdmError {
    /// An HTTP-level transport error occurred.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A response body could not be decoded.
    #[error("decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// The message endpoint answered with a status other than 200.
    #[error("ADM rejected message ({status}): {body}")]
    Rejected { status: u16, body: String },

    /// The destination carries no registration id.
    #[error("destination has no regid")]
    MissingRegistration(String),

    /// No bearer token was cached when sending.
    #[error("no access token")]
    NoToken,
}

impl AdmError {
    /// Convert an error raised during the token exchange, attaching the
    /// provider name.
    pub fn into_token_error(self, provider: &str) -> PushError {
        PushError::TokenExchange {
            provider: provider.to_owned(),
            reason: self.to_string(),
        }
    }
}

impl From<AdmError> for PushError {
    fn from(err: AdmError) -> Self {
        match err {
            AdmError::Http(e) => PushError::Transport(e.to_string()),
            AdmError::Decode(e) => PushError::Serialization(e.to_string()),
            AdmError::Rejected { status, body } => PushError::GatewayRejected { status, body },
            AdmError::MissingRegistration(dp) => PushError::InvalidDestination(dp),
            AdmError::NoToken => PushError::NoToken,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn decode_error() -> AdmError {
        AdmError::Decode(serde_json::from_str::<u32>("not json").unwrap_err())
    }

    #[test]
    fn rejected_maps_to_gateway_rejected() {
        let err: PushError = AdmError::Rejected {
            status: 400,
            body: "InvalidRegistrationId".into(),
        }
        .into();
        assert_eq!(
            err,
            PushError::GatewayRejected {
                status: 400,
                body: "InvalidRegistrationId".into(),
            }
        );
        assert!(!err.is_retryable());
    }

    #[test]
    fn throttled_message_is_retryable() {
        let err: PushError = AdmError::Rejected {
            status: 429,
            body: "MaxRateExceeded".into(),
        }
        .into();
        assert!(err.is_retryable());
    }

    #[test]
    fn token_errors_carry_provider() {
        let err = decode_error().into_token_error("adm:app:id");
        assert!(matches!(
            err,
            PushError::TokenExchange { ref provider, .. } if provider == "adm:app:id"
        ));
        assert!(err.is_batch_fatal());
        assert!(err.is_retryable());
    }

    #[test]
    fn missing_registration_and_token() {
        let err: PushError = AdmError::MissingRegistration("adm:app:bob".into()).into();
        assert_eq!(err, PushError::InvalidDestination("adm:app:bob".into()));
        let err: PushError = AdmError::NoToken.into();
        assert_eq!(err, PushError::NoToken);
    }
}
