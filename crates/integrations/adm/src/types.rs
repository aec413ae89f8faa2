use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Form-encoded body of a client-credentials token request.
///
/// The token endpoint expects `application/x-www-form-urlencoded` rather than
/// JSON.
#[derive(Debug, Clone, Serialize)]
pub struct TokenRequest<'a> {
    pub grant_type: &'static str,
    pub scope: &'a str,
    pub client_id: &'a str,
    pub client_secret: &'a str,
}

impl<'a> TokenRequest<'a> {
    pub fn client_credentials(scope: &'a str, client_id: &'a str, client_secret: &'a str) -> Self {
        Self {
            grant_type: "client_credentials",
            scope,
            client_id,
            client_secret,
        }
    }
}

/// Successful token response.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenSuccess {
    pub access_token: String,

    /// Token lifetime in seconds.
    pub expires_in: i64,

    #[serde(default)]
    pub scope: Option<String>,

    #[serde(default)]
    pub token_type: Option<String>,
}

/// Error body returned by the token endpoint on a non-200 status.
#[derive(Debug, Clone, Deserialize)]
pub struct TokenFailure {
    #[serde(default)]
    pub error: String,

    #[serde(default)]
    pub error_description: Option<String>,
}

impl TokenFailure {
    /// The upper-cased error code, replaced by a readable explanation for the
    /// codes that have one. Falls back to the description when no code is
    /// given.
    pub fn reason(&self) -> String {
        let code = self.error.to_uppercase();
        match code.as_str() {
            "" => self.error_description.clone().unwrap_or_default(),
            "INVALID_SCOPE" => {
                "ADM is not enabled. Enable it on the Amazon Mobile App Distribution Portal"
                    .to_owned()
            }
            _ => code,
        }
    }
}

/// JSON body posted to a registration's message endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmMessage {
    /// Application data delivered verbatim to the device.
    pub data: BTreeMap<String, String>,

    /// Messages sharing a key may be collapsed by ADM while the device is
    /// offline.
    #[serde(
        rename = "consolidationKey",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub consolidation_key: Option<String>,

    /// Seconds ADM keeps the message before discarding it.
    #[serde(rename = "expiresAfter", default, skip_serializing_if = "Option::is_none")]
    pub expires_after: Option<i64>,

    /// Checksum of `data`. Herald never sets it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub md5: Option<String>,
}
