use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Reserved key selecting the gateway's group / consolidation key.
pub const MSG_GROUP_KEY: &str = "msggroup";

/// Reserved key carrying a relative time-to-live in seconds.
pub const TTL_KEY: &str = "ttl";

/// Application payload for one push, as string key/value pairs.
///
/// The keys [`MSG_GROUP_KEY`] and [`TTL_KEY`] are control fields interpreted by
/// the gateway; all other keys are opaque application data.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    /// Raw key/value data, control keys included.
    pub data: BTreeMap<String, String>,
}

impl Notification {
    /// Create an empty notification.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a key/value pair.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.data.insert(key.into(), value.into());
        self
    }

    /// Returns `true` if the notification carries no data at all.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Notification
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            data: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}
