use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// One addressable recipient (a device or app registration).
///
/// Immutable for the duration of a push. Gateway-specific keys such as the
/// registration id live in `fixed`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeliveryPoint {
    /// Push service type this destination belongs to.
    pub service_type: String,
    /// Fixed configuration (`service`, `subscriber`, registration id, ...).
    pub fixed: BTreeMap<String, String>,
}

impl DeliveryPoint {
    pub fn new(service_type: impl Into<String>, fixed: BTreeMap<String, String>) -> Self {
        Self {
            service_type: service_type.into(),
            fixed,
        }
    }

    /// Look up a fixed configuration value.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fixed.get(key).map(String::as_str)
    }

    pub fn service(&self) -> Option<&str> {
        self.get("service")
    }

    pub fn subscriber(&self) -> Option<&str> {
        self.get("subscriber")
    }
}

impl std::fmt::Display for DeliveryPoint {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.service_type,
            self.service().unwrap_or("-"),
            self.subscriber().unwrap_or("-")
        )
    }
}
