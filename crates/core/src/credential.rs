use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::{Mutex, MutexGuard};

const TOKEN_KEY: &str = "token";
const TOKEN_TYPE_KEY: &str = "type";
const EXPIRE_KEY: &str = "expire";

/// Volatile bearer-token state of a provider.
///
/// `expires_at` already includes the gateway's safety margin: once it is
/// reached the token must be treated as invalid.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credential {
    /// Bearer token issued by the gateway's auth endpoint.
    pub token: Option<String>,
    /// Token type reported by the auth endpoint (usually `"bearer"`).
    pub token_type: Option<String>,
    /// Instant after which the token is no longer used.
    pub expires_at: Option<DateTime<Utc>>,
}

impl std::fmt::Debug for Credential {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credential")
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .field("token_type", &self.token_type)
            .field("expires_at", &self.expires_at)
            .finish()
    }
}

impl Credential {
    /// Returns `true` if a token is present and expires strictly after `now`.
    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.token.is_some() && self.expires_at.is_some_and(|exp| exp > now)
    }

    /// Flatten into the string map an external store persists.
    ///
    /// Keys are `token`, `type`, and `expire` (Unix seconds).
    pub fn to_volatile_map(&self) -> HashMap<String, String> {
        let mut map = HashMap::new();
        if let Some(token) = &self.token {
            map.insert(TOKEN_KEY.to_owned(), token.clone());
        }
        if let Some(token_type) = &self.token_type {
            map.insert(TOKEN_TYPE_KEY.to_owned(), token_type.clone());
        }
        if let Some(exp) = self.expires_at {
            map.insert(EXPIRE_KEY.to_owned(), exp.timestamp().to_string());
        }
        map
    }

    /// Restore from a map produced by [`to_volatile_map`](Self::to_volatile_map).
    ///
    /// An unparsable `expire` value is dropped, which makes the token look
    /// expired and forces a refresh on the next push.
    pub fn from_volatile_map(map: &HashMap<String, String>) -> Self {
        let expires_at = map
            .get(EXPIRE_KEY)
            .and_then(|s| s.parse::<i64>().ok())
            .and_then(|secs| DateTime::from_timestamp(secs, 0));
        Self {
            token: map.get(TOKEN_KEY).cloned(),
            token_type: map.get(TOKEN_TYPE_KEY).cloned(),
            expires_at,
        }
    }
}

/// Shared, lock-guarded slot holding a provider's [`Credential`].
///
/// Clones share the same slot. Holding the guard across the whole
/// check-refresh-write sequence ensures at most one refresh is in flight per
/// provider.
#[derive(Debug, Clone, Default)]
pub struct CredentialStore {
    inner: Arc<Mutex<Credential>>,
}

impl CredentialStore {
    /// Create a store pre-populated with a persisted credential.
    pub fn new(credential: Credential) -> Self {
        Self {
            inner: Arc::new(Mutex::new(credential)),
        }
    }

    /// Lock the slot for a read-check-refresh-write sequence.
    pub async fn lock(&self) -> MutexGuard<'_, Credential> {
        self.inner.lock().await
    }

    /// Return a copy of the current credential.
    pub async fn snapshot(&self) -> Credential {
        self.inner.lock().await.clone()
    }

    /// Replace the stored credential.
    pub async fn replace(&self, credential: Credential) {
        *self.inner.lock().await = credential;
    }
}

/// Outcome of ensuring a provider holds a usable token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenStatus {
    /// The cached token was still valid; no network call happened.
    Cached(Credential),
    /// A new token was obtained and written into the provider's store. The
    /// host should persist it.
    Refreshed(Credential),
}

impl TokenStatus {
    /// The credential to use for this push.
    pub fn credential(&self) -> &Credential {
        match self {
            Self::Cached(c) | Self::Refreshed(c) => c,
        }
    }

    /// Consume the status and return the credential.
    pub fn into_credential(self) -> Credential {
        match self {
            Self::Cached(c) | Self::Refreshed(c) => c,
        }
    }
}
