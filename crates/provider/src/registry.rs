use std::collections::HashMap;
use std::sync::Arc;

use herald_core::{DeliveryPoint, ProviderRecord, PushError};
use tracing::debug;

use crate::service::{DynPushService, required};

/// Configuration key naming the push service type of a provider or
/// destination map.
pub const SERVICE_TYPE_KEY: &str = "pushservicetype";

/// A registry that maps push service type names to their implementations.
///
/// Services are stored behind `Arc<dyn DynPushService>` so they can be shared
/// across tasks safely. The registry is intended to be built once at startup
/// and then shared as an immutable reference or wrapped in an `Arc`.
pub struct PushServiceRegistry {
    services: HashMap<String, Arc<dyn DynPushService>>,
}

impl PushServiceRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            services: HashMap::new(),
        }
    }

    /// Register a push service. The service's name (from
    /// [`DynPushService::name`]) is used as the lookup key.
    ///
    /// If a service with the same name already exists, it is replaced.
    pub fn register(&mut self, service: Arc<dyn DynPushService>) {
        let name = service.name().to_owned();
        debug!(service = %name, "registered push service");
        self.services.insert(name, service);
    }

    /// Look up a push service by type name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn DynPushService>> {
        self.services.get(name).cloned()
    }

    /// Resolve the service a configuration map names via
    /// [`SERVICE_TYPE_KEY`].
    pub fn resolve(
        &self,
        kv: &HashMap<String, String>,
    ) -> Result<Arc<dyn DynPushService>, PushError> {
        let service_type = required(kv, SERVICE_TYPE_KEY)?;
        self.get(service_type)
            .ok_or_else(|| PushError::UnknownServiceType(service_type.to_owned()))
    }

    /// Build a provider record with the service named in the map.
    pub fn build_provider(&self, kv: &HashMap<String, String>) -> Result<ProviderRecord, PushError> {
        self.resolve(kv)?.build_provider(kv)
    }

    /// Build a destination with the service named in the map.
    pub fn build_destination(
        &self,
        kv: &HashMap<String, String>,
    ) -> Result<DeliveryPoint, PushError> {
        self.resolve(kv)?.build_destination(kv)
    }

    /// Return a sorted list of all registered service type names.
    pub fn list(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.services.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// Return the number of registered services.
    pub fn len(&self) -> usize {
        self.services.len()
    }

    /// Return `true` if no services are registered.
    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }
}

impl Default for PushServiceRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::Arc;

    use herald_core::{Notification, PushResult};
    use tokio::sync::mpsc;

    use super::*;
    use crate::context::PushContext;
    use crate::service::PushService;

    struct StubService {
        stub_name: String,
    }

    impl StubService {
        fn new(name: &str) -> Self {
            Self {
                stub_name: name.to_owned(),
            }
        }
    }

    impl PushService for StubService {
        fn name(&self) -> &str {
            &self.stub_name
        }

        fn build_provider(
            &self,
            kv: &HashMap<String, String>,
        ) -> Result<ProviderRecord, PushError> {
            let service = required(kv, "service")?;
            Ok(ProviderRecord::new(
                format!("{}:{service}", self.stub_name),
                self.stub_name.clone(),
                BTreeMap::new(),
            ))
        }

        fn build_destination(
            &self,
            kv: &HashMap<String, String>,
        ) -> Result<DeliveryPoint, PushError> {
            let regid = required(kv, "regid")?;
            Ok(DeliveryPoint::new(
                self.stub_name.clone(),
                BTreeMap::from([("regid".to_owned(), regid.to_owned())]),
            ))
        }

        async fn push(
            &self,
            _provider: &ProviderRecord,
            mut destinations: mpsc::Receiver<DeliveryPoint>,
            _results: mpsc::Sender<PushResult>,
            _notification: &Notification,
            _ctx: &PushContext,
        ) {
            while destinations.recv().await.is_some() {}
        }
    }

    fn kv(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect()
    }

    #[test]
    fn empty_registry() {
        let reg = PushServiceRegistry::new();
        assert!(reg.is_empty());
        assert_eq!(reg.len(), 0);
        assert!(reg.list().is_empty());
    }

    #[test]
    fn register_and_get() {
        let mut reg = PushServiceRegistry::new();
        reg.register(Arc::new(StubService::new("adm")));
        reg.register(Arc::new(StubService::new("apns")));

        assert_eq!(reg.len(), 2);
        let service = reg.get("adm").expect("adm service should exist");
        assert_eq!(service.name(), "adm");
        assert!(reg.get("gcm").is_none());
    }

    #[test]
    fn list_sorted() {
        let mut reg = PushServiceRegistry::new();
        reg.register(Arc::new(StubService::new("gcm")));
        reg.register(Arc::new(StubService::new("adm")));
        reg.register(Arc::new(StubService::new("apns")));

        assert_eq!(reg.list(), vec!["adm", "apns", "gcm"]);
    }

    #[test]
    fn register_replaces_existing() {
        let mut reg = PushServiceRegistry::new();
        reg.register(Arc::new(StubService::new("adm")));
        reg.register(Arc::new(StubService::new("adm")));
        assert_eq!(reg.len(), 1);
    }

    #[test]
    fn build_through_registry() {
        let mut reg = PushServiceRegistry::default();
        reg.register(Arc::new(StubService::new("adm")));

        let provider = reg
            .build_provider(&kv(&[("pushservicetype", "adm"), ("service", "app")]))
            .unwrap();
        assert_eq!(provider.name(), "adm:app");
        assert_eq!(provider.service_type(), "adm");

        let dp = reg
            .build_destination(&kv(&[("pushservicetype", "adm"), ("regid", "r-1")]))
            .unwrap();
        assert_eq!(dp.get("regid"), Some("r-1"));
    }

    #[test]
    fn unknown_or_missing_service_type() {
        let reg = PushServiceRegistry::new();

        let err = reg
            .build_provider(&kv(&[("pushservicetype", "wns")]))
            .unwrap_err();
        assert_eq!(err, PushError::UnknownServiceType("wns".into()));

        let err = reg.build_destination(&kv(&[("regid", "r")])).unwrap_err();
        assert_eq!(err, PushError::MissingField("pushservicetype"));
    }
}
