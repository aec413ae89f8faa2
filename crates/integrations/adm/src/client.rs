use bytes::Bytes;
use herald_core::{Credential, DeliveryPoint, PushError};
use herald_provider::inject_trace_context;
use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderMap, HeaderValue};
use reqwest::{Client, StatusCode};
use tracing::{debug, instrument, warn};

use crate::config::AdmConfig;
use crate::error::AdmError;

/// Destination key holding the ADM registration id.
pub const REGID_KEY: &str = "regid";

const TYPE_VERSION_HEADER: &str = "x-amzn-type-version";
const TYPE_VERSION: &str = "com.amazon.device.messaging.ADMMessage@1.0";
const ACCEPT_TYPE_HEADER: &str = "x-amzn-accept-type";
const ACCEPT_TYPE: &str = "com.amazon.device.messaging.ADMSendResult@1.0";
const REQUEST_ID_HEADER: &str = "x-amzn-RequestId";

/// Sends one serialized ADM message to one registration.
#[derive(Debug, Clone)]
pub struct AdmClient {
    client: Client,
    config: AdmConfig,
}

impl AdmClient {
    pub fn new(client: Client, config: AdmConfig) -> Self {
        Self { client, config }
    }

    /// Post `body` to the destination's message endpoint using the cached
    /// bearer token and return the ADM request id. The id is empty if ADM
    /// accepted the message without sending an `x-amzn-RequestId` header.
    ///
    /// Fails with [`PushError::NoToken`] if `credential` has no token and
    /// [`PushError::InvalidDestination`] if the destination has no `regid`,
    /// both before any request is made. Any status other than 200 yields
    /// [`PushError::GatewayRejected`] with the raw response body.
    #[instrument(skip_all, fields(destination = %destination))]
    pub async fn send(
        &self,
        credential: &Credential,
        destination: &DeliveryPoint,
        body: Bytes,
    ) -> Result<String, PushError> {
        self.post_message(credential, destination, body)
            .await
            .map_err(PushError::from)
    }

    async fn post_message(
        &self,
        credential: &Credential,
        destination: &DeliveryPoint,
        body: Bytes,
    ) -> Result<String, AdmError> {
        let token = credential.token.as_deref().ok_or(AdmError::NoToken)?;
        let regid = destination
            .get(REGID_KEY)
            .filter(|r| !r.is_empty())
            .ok_or_else(|| AdmError::MissingRegistration(destination.to_string()))?;
        let url = self.config.message_url(regid);

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(TYPE_VERSION_HEADER, HeaderValue::from_static(TYPE_VERSION));
        headers.insert(ACCEPT_TYPE_HEADER, HeaderValue::from_static(ACCEPT_TYPE));
        inject_trace_context(&mut headers);

        debug!(%url, "posting ADM message");
        let response = self
            .client
            .post(&url)
            .headers(headers)
            .bearer_auth(token)
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await?;
            debug!(status = status.as_u16(), "ADM rejected message");
            return Err(AdmError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        let request_id = response
            .headers()
            .get(REQUEST_ID_HEADER)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_owned();
        if request_id.is_empty() {
            warn!("ADM accepted message without a request id");
        }
        Ok(request_id)
    }
}
