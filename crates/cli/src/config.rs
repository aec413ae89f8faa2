use std::collections::HashMap;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use herald_adm::AdmConfig;
use herald_executor::ExecutorConfig;
use serde::Deserialize;

/// Configuration for one `herald push` run, loaded from a TOML file.
///
/// # Example
///
/// ```toml
/// [executor]
/// max_concurrent = 8
///
/// [provider]
/// pushservicetype = "adm"
/// service = "myapp"
/// clientid = "amzn1.application-oa2-client.abc"
/// clientsecret = "..."
///
/// [[destinations]]
/// service = "myapp"
/// subscriber = "alice"
/// regid = "amzn1.adm-registration.v2.xyz"
/// ```
#[derive(Debug, Default, Deserialize)]
pub struct HeraldConfig {
    /// Dispatch engine tuning.
    #[serde(default)]
    pub executor: ExecutorSection,
    /// ADM endpoint overrides.
    #[serde(default)]
    pub adm: AdmSection,
    /// Flat provider configuration, including `pushservicetype`.
    #[serde(default)]
    pub provider: HashMap<String, String>,
    /// One flat map per destination.
    #[serde(default)]
    pub destinations: Vec<HashMap<String, String>>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ExecutorSection {
    /// Maximum sends in flight.
    pub max_concurrent: Option<usize>,
    /// Per-destination send deadline in seconds.
    pub send_timeout_seconds: Option<u64>,
    /// Token check deadline in seconds.
    pub token_timeout_seconds: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
pub struct AdmSection {
    pub token_url: Option<String>,
    pub service_url: Option<String>,
    /// HTTP client timeout in seconds.
    pub request_timeout_seconds: Option<u64>,
}

impl HeraldConfig {
    /// Read and parse a configuration file.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        toml::from_str(&contents)
            .with_context(|| format!("failed to parse config at {}", path.display()))
    }
}

impl ExecutorSection {
    pub fn to_executor_config(&self) -> ExecutorConfig {
        let mut config = ExecutorConfig::default();
        if let Some(n) = self.max_concurrent {
            config = config.with_max_concurrent(n);
        }
        if let Some(secs) = self.send_timeout_seconds {
            config = config.with_send_timeout(Duration::from_secs(secs));
        }
        if let Some(secs) = self.token_timeout_seconds {
            config = config.with_token_timeout(Duration::from_secs(secs));
        }
        config
    }
}

impl AdmSection {
    pub fn to_adm_config(&self) -> AdmConfig {
        let mut config = AdmConfig::default();
        if let Some(url) = &self.token_url {
            config = config.with_token_url(url);
        }
        if let Some(url) = &self.service_url {
            config = config.with_service_url(url);
        }
        if let Some(secs) = self.request_timeout_seconds {
            config = config.with_request_timeout(Duration::from_secs(secs));
        }
        config
    }
}
