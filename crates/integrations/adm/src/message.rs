//! Notification to ADM wire message conversion.

use std::collections::BTreeMap;

use bytes::Bytes;
use herald_core::{MSG_GROUP_KEY, Notification, PushError, TTL_KEY};

use crate::types::AdmMessage;

/// Build the ADM message for `notification`.
///
/// `msggroup` becomes the consolidation key and `ttl` the expiry in seconds.
/// A `ttl` that is not a base-10 integer is dropped, as is a zero `ttl`. Every
/// other entry is copied into `data`. A notification that carries no
/// application data once those keys are removed is rejected.
pub fn build_message(notification: &Notification) -> Result<AdmMessage, PushError> {
    if notification.is_empty() {
        return Err(PushError::EmptyNotification);
    }

    let mut data = BTreeMap::new();
    let mut consolidation_key = None;
    let mut expires_after = None;
    for (key, value) in &notification.data {
        match key.as_str() {
            MSG_GROUP_KEY => consolidation_key = Some(value.clone()),
            TTL_KEY => expires_after = value.parse::<i64>().ok().filter(|ttl| *ttl != 0),
            _ => {
                data.insert(key.clone(), value.clone());
            }
        }
    }

    if data.is_empty() {
        return Err(PushError::EmptyNotification);
    }

    Ok(AdmMessage {
        data,
        consolidation_key,
        expires_after,
        md5: None,
    })
}

/// Build and serialize the message once, for sharing across every send of a
/// push.
pub fn encode_message(notification: &Notification) -> Result<Bytes, PushError> {
    let message = build_message(notification)?;
    serde_json::to_vec(&message)
        .map(Bytes::from)
        .map_err(|e| PushError::Serialization(e.to_string()))
}
