use std::time::Duration;

/// OAuth2 token endpoint for Amazon Device Messaging.
pub const ADM_TOKEN_URL: &str = "https://api.amazon.com/auth/O2/token";

/// Base URL for per-registration message endpoints. The registration id and
/// `/messages` are appended to it.
pub const ADM_SERVICE_URL: &str = "https://api.amazon.com/messaging/registrations/";

/// Scope requested in the client-credentials exchange.
pub const ADM_SCOPE: &str = "messaging:push";

/// Configuration for the ADM gateway.
///
/// Credentials are not part of this struct; they live on each
/// [`ProviderRecord`](herald_core::ProviderRecord) so that one gateway can
/// serve many ADM accounts.
#[derive(Debug, Clone)]
pub struct AdmConfig {
    /// Token endpoint URL. Override this for testing against a mock server.
    pub token_url: String,

    /// Message endpoint base URL, ending in `/`.
    pub service_url: String,

    /// OAuth2 scope sent with every token request.
    pub scope: String,

    /// Request timeout applied by the HTTP client to every call.
    pub request_timeout: Duration,
}

impl Default for AdmConfig {
    fn default() -> Self {
        Self {
            token_url: ADM_TOKEN_URL.to_owned(),
            service_url: ADM_SERVICE_URL.to_owned(),
            scope: ADM_SCOPE.to_owned(),
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl AdmConfig {
    /// Override the token endpoint URL (useful for testing).
    #[must_use]
    pub fn with_token_url(mut self, url: impl Into<String>) -> Self {
        self.token_url = url.into();
        self
    }

    /// Override the message endpoint base URL (useful for testing).
    ///
    /// A missing trailing `/` is added.
    #[must_use]
    pub fn with_service_url(mut self, url: impl Into<String>) -> Self {
        let mut url = url.into();
        if !url.ends_with('/') {
            url.push('/');
        }
        self.service_url = url;
        self
    }

    /// Set the HTTP client timeout.
    #[must_use]
    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Message endpoint for one registration id.
    pub fn message_url(&self, regid: &str) -> String {
        format!("{}{regid}/messages", self.service_url)
    }
}
