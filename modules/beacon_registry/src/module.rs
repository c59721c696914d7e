//! Module declaration and lifecycle

use crate::config::Config;
use crate::contract::BeaconApi;
use crate::domain::{Beacon, EventPublisher, StateRepository, TracingEventPublisher};
use crate::infra::storage::InMemoryStateRepository;
use anyhow::Result;
use parking_lot::RwLock;
use std::sync::Arc;

/// Beacon registry module
pub struct BeaconModule {
    config: RwLock<Config>,
    beacon: RwLock<Option<Arc<Beacon>>>,
}

impl Default for BeaconModule {
    fn default() -> Self {
        Self {
            config: RwLock::new(Config::default()),
            beacon: RwLock::new(None),
        }
    }
}

impl BeaconModule {
    /// Build the beacon on the given storage substrate
    pub fn init(&self, cfg: Config, repository: Arc<dyn StateRepository>) -> Result<Arc<Beacon>> {
        let mut slot = self.beacon.write();
        if slot.is_some() {
            anyhow::bail!("beacon module is already initialized");
        }

        let event_publisher: Arc<dyn EventPublisher> = Arc::new(TracingEventPublisher);
        let beacon = Beacon::new(cfg.clone(), repository, event_publisher);

        *self.config.write() = cfg;
        *slot = Some(beacon.clone());

        tracing::info!("Beacon module initialized");
        Ok(beacon)
    }

    /// Build the beacon on an in-memory substrate
    pub fn init_in_memory(&self, cfg: Config) -> Result<Arc<Beacon>> {
        self.init(cfg, Arc::new(InMemoryStateRepository::new()))
    }

    pub fn config(&self) -> Config {
        self.config.read().clone()
    }

    pub fn beacon(&self) -> Result<Arc<Beacon>> {
        self.beacon
            .read()
            .as_ref()
            .cloned()
            .ok_or_else(|| anyhow::anyhow!("Beacon not initialized"))
    }

    /// Native client for in-process callers
    pub fn client(&self) -> Result<Arc<dyn BeaconApi>> {
        let beacon = self.beacon()?;
        Ok(Arc::new(crate::api::native::NativeClient::new(beacon)))
    }
}
