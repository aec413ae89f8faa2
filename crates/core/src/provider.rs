use std::collections::BTreeMap;

use crate::credential::{Credential, CredentialStore};

/// Account-level record shared by many destinations.
///
/// The `fixed` map holds immutable configuration (service name, client
/// credentials). The credential store holds volatile token state and is
/// shared between clones, so one record can serve concurrent pushes.
#[derive(Clone)]
pub struct ProviderRecord {
    name: String,
    service_type: String,
    fixed: BTreeMap<String, String>,
    credential: CredentialStore,
}

impl std::fmt::Debug for ProviderRecord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let fixed: BTreeMap<&str, &str> = self
            .fixed
            .iter()
            .map(|(k, v)| {
                if k.contains("secret") {
                    (k.as_str(), "[REDACTED]")
                } else {
                    (k.as_str(), v.as_str())
                }
            })
            .collect();
        f.debug_struct("ProviderRecord")
            .field("name", &self.name)
            .field("service_type", &self.service_type)
            .field("fixed", &fixed)
            .finish_non_exhaustive()
    }
}

impl ProviderRecord {
    /// Create a record with an empty credential slot.
    pub fn new(
        name: impl Into<String>,
        service_type: impl Into<String>,
        fixed: BTreeMap<String, String>,
    ) -> Self {
        Self {
            name: name.into(),
            service_type: service_type.into(),
            fixed,
            credential: CredentialStore::default(),
        }
    }

    /// Seed the credential slot with previously persisted state.
    #[must_use]
    pub fn with_credential(mut self, credential: Credential) -> Self {
        self.credential = CredentialStore::new(credential);
        self
    }

    /// Unique provider name, e.g. `adm:<service>:<clientid>`.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Push service type this record belongs to.
    pub fn service_type(&self) -> &str {
        &self.service_type
    }

    /// Look up a fixed configuration value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fixed.get(key).map(String::as_str)
    }

    /// The shared credential slot.
    pub fn credential(&self) -> &CredentialStore {
        &self.credential
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record() -> ProviderRecord {
        let fixed = BTreeMap::from([
            ("service".to_owned(), "app".to_owned()),
            ("clientid".to_owned(), "id-1".to_owned()),
            ("clientsecret".to_owned(), "hunter2".to_owned()),
        ]);
        ProviderRecord::new("adm:app:id-1", "adm", fixed)
    }

    #[test]
    fn accessors() {
        let rec = record();
        assert_eq!(rec.name(), "adm:app:id-1");
        assert_eq!(rec.service_type(), "adm");
        assert_eq!(rec.get("clientid"), Some("id-1"));
        assert!(rec.get("regid").is_none());
    }

    #[test]
    fn debug_redacts_secrets() {
        let debug = format!("{:?}", record());
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("hunter2"));
        assert!(debug.contains("id-1"));
    }

    #[tokio::test]
    async fn clone_shares_credential() {
        let rec = record();
        let clone = rec.clone();
        clone
            .credential()
            .replace(Credential {
                token: Some("t".into()),
                ..Credential::default()
            })
            .await;
        assert_eq!(rec.credential().snapshot().await.token.as_deref(), Some("t"));
    }
}
