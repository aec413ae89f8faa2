use chrono::{TimeDelta, Utc};
use herald_core::{Credential, ProviderRecord, PushError, TokenStatus};
use herald_provider::inject_trace_context;
use reqwest::header::HeaderMap;
use reqwest::{Client, StatusCode};
use tracing::{debug, info, instrument, warn};

use crate::config::AdmConfig;
use crate::error::AdmError;
use crate::types::{TokenFailure, TokenRequest, TokenSuccess};

/// Seconds shaved off the advertised token lifetime.
const EXPIRY_MARGIN_SECS: i64 = 60;

/// Keeps a provider's ADM access token fresh.
///
/// The provider's credential lock is held for the whole
/// check-exchange-write sequence, so concurrent pushes for the same provider
/// trigger at most one exchange; the others wait and then see the fresh token.
#[derive(Debug, Clone)]
pub struct TokenManager {
    client: Client,
    token_url: String,
    scope: String,
}

impl TokenManager {
    pub fn new(client: Client, config: &AdmConfig) -> Self {
        Self {
            client,
            token_url: config.token_url.clone(),
            scope: config.scope.clone(),
        }
    }

    /// Make sure `provider` holds a token that is valid right now.
    ///
    /// Returns [`TokenStatus::Cached`] without any network call when the stored
    /// token has not expired. Otherwise exchanges the provider's client id and
    /// secret for a new token, stores it with an expiry 60 seconds before the
    /// real one, and returns [`TokenStatus::Refreshed`].
    #[instrument(skip_all, fields(provider = %provider.name()))]
    pub async fn ensure_token(&self, provider: &ProviderRecord) -> Result<TokenStatus, PushError> {
        let mut slot = provider.credential().lock().await;
        if slot.is_valid_at(Utc::now()) {
            debug!("cached ADM token still valid");
            return Ok(TokenStatus::Cached(slot.clone()));
        }

        let client_id = credential_field(provider, "clientid")?;
        let client_secret = credential_field(provider, "clientsecret")?;

        let response = self
            .exchange(client_id, client_secret)
            .await
            .map_err(|e| {
                warn!(error = %e, "ADM token exchange failed");
                e.into_token_error(provider.name())
            })?;
        let issued = match response {
            TokenResponse::Issued(issued) => issued,
            TokenResponse::Rejected { status, reason } => {
                warn!(status, %reason, "ADM rejected client credentials");
                return Err(PushError::AuthRejected {
                    provider: provider.name().to_owned(),
                    status,
                    reason,
                });
            }
        };

        let expires_at = TimeDelta::try_seconds(issued.expires_in.saturating_sub(EXPIRY_MARGIN_SECS))
            .and_then(|lifetime| Utc::now().checked_add_signed(lifetime))
            .ok_or_else(|| PushError::TokenExchange {
                provider: provider.name().to_owned(),
                reason: format!("expires_in out of range: {}", issued.expires_in),
            })?;

        let fresh = Credential {
            token: Some(issued.access_token),
            token_type: issued.token_type,
            expires_at: Some(expires_at),
        };
        *slot = fresh.clone();
        info!(%expires_at, "obtained ADM access token");
        Ok(TokenStatus::Refreshed(fresh))
    }

    async fn exchange(
        &self,
        client_id: &str,
        client_secret: &str,
    ) -> Result<TokenResponse, AdmError> {
        let form = TokenRequest::client_credentials(&self.scope, client_id, client_secret);
        let mut headers = HeaderMap::new();
        inject_trace_context(&mut headers);

        debug!(url = %self.token_url, "requesting ADM token");
        let response = self
            .client
            .post(&self.token_url)
            .headers(headers)
            .form(&form)
            .send()
            .await?;

        let status = response.status();
        let body = response.bytes().await?;
        if status != StatusCode::OK {
            let reason = serde_json::from_slice::<TokenFailure>(&body).map_or_else(
                |_| String::from_utf8_lossy(&body).trim().to_owned(),
                |failure| failure.reason(),
            );
            return Ok(TokenResponse::Rejected {
                status: status.as_u16(),
                reason,
            });
        }
        Ok(TokenResponse::Issued(serde_json::from_slice(&body)?))
    }
}

/// What the token endpoint answered, once the exchange itself succeeded.
enum TokenResponse {
    Issued(TokenSuccess),
    /// Any status other than 200. `reason` is the upper-cased error code or
    /// its explanation, else the description or the raw body.
    Rejected { status: u16, reason: String },
}

fn credential_field<'a>(
    provider: &'a ProviderRecord,
    field: &'static str,
) -> Result<&'a str, PushError> {
    provider
        .get(field)
        .filter(|v| !v.is_empty())
        .ok_or_else(|| PushError::MissingCredential {
            provider: provider.name().to_owned(),
            field,
        })
}
