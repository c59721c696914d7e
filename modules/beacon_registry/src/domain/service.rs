//! Domain service - the beacon registry
//!
//! State lives in an immutable `BeaconState` published through `ArcSwap`. Readers
//! load the current snapshot without locking. Writers are serialized, validate
//! their batch, build the next snapshot, persist it and only then swap it in, so
//! a rejected batch leaves bindings, settings and both counters untouched.

use crate::config::Config;
use crate::contract::{
    BeaconError, Binding, Call, GatewayHandle, ImplementationHandle, ModuleId, RegistrySnapshot,
    SettingId, SettingValue,
};
use arc_swap::ArcSwap;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::collections::hash_map::Entry;
use std::sync::{Arc, Weak};
use tracing::{debug, info, warn};

use super::events::{BeaconEvent, EventPublisher};
use super::gateway::Gateway;
use super::invocation::Module;
use super::repository::StateRepository;
use super::state::{BeaconState, ModuleEntry};
use super::validation;

/// Module registry binding module ids to gateways and implementations
pub struct Beacon {
    config: Config,
    state: ArcSwap<BeaconState>,
    /// Serializes `upgrade` and `configure`
    writer: Mutex<()>,
    deployments: DashMap<ImplementationHandle, Arc<dyn Module>>,
    repository: Arc<dyn StateRepository>,
    event_publisher: Arc<dyn EventPublisher>,
    /// Handed to every gateway this beacon allocates
    self_ref: Weak<Beacon>,
}

impl Beacon {
    /// Create a new beacon with empty tables and both counters at 0
    pub fn new(
        config: Config,
        repository: Arc<dyn StateRepository>,
        event_publisher: Arc<dyn EventPublisher>,
    ) -> Arc<Self> {
        Arc::new_cyclic(|self_ref| Self {
            config,
            state: ArcSwap::from_pointee(BeaconState::default()),
            writer: Mutex::new(()),
            deployments: DashMap::new(),
            repository,
            event_publisher,
            self_ref: self_ref.clone(),
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    // ===== Deployment =====

    /// Register an implementation artifact so `upgrade` can bind it
    pub fn deploy(&self, implementation: Arc<dyn Module>) -> ImplementationHandle {
        let handle = ImplementationHandle::generate();
        self.deployments.insert(handle, implementation);
        debug!(%handle, "implementation deployed");
        handle
    }

    /// Deployed artifact behind a handle
    pub fn implementation(&self, handle: &ImplementationHandle) -> Option<Arc<dyn Module>> {
        self.deployments
            .get(handle)
            .map(|module| Arc::clone(module.value()))
    }

    /// Create or update one binding per `(module_id, implementation)` pair.
    ///
    /// Unseen modules get a gateway allocated and bound to this beacon; seen
    /// modules only have their implementation replaced. The contracts version is
    /// bumped by exactly 1 per call. Returns the new contracts version.
    pub fn upgrade(
        &self,
        module_ids: &[ModuleId],
        implementations: &[ImplementationHandle],
    ) -> Result<u64, BeaconError> {
        validation::ensure_batch(
            module_ids.len(),
            implementations.len(),
            self.config.max_batch_size,
        )?;
        if let Some(unknown) = implementations
            .iter()
            .find(|handle| !self.deployments.contains_key(*handle))
        {
            return Err(BeaconError::UnknownImplementation(*unknown));
        }

        let writer = self.writer.lock();
        let current = self.state.load_full();
        let mut next = BeaconState::clone(&current);
        let mut changes = Vec::with_capacity(module_ids.len());

        for (module_id, implementation) in module_ids.iter().zip(implementations) {
            let change = match next.modules.entry(*module_id) {
                Entry::Occupied(mut occupied) => {
                    let entry = occupied.get_mut();
                    entry.binding.implementation = *implementation;
                    (entry.binding, false)
                }
                Entry::Vacant(vacant) => {
                    let gateway = Arc::new(Gateway::new(*module_id));
                    gateway.bind(self.self_ref.clone())?;
                    let binding = Binding {
                        module_id: *module_id,
                        implementation: *implementation,
                        gateway: gateway.handle(),
                    };
                    next.gateway_index.insert(binding.gateway, *module_id);
                    vacant.insert(ModuleEntry { binding, gateway });
                    (binding, true)
                }
            };
            changes.push(change);
        }
        next.contracts_version += 1;
        let version = next.contracts_version;

        self.commit(next)?;
        drop(writer);

        info!(
            contracts_version = version,
            modules = changes.len(),
            created = changes.iter().filter(|(_, is_new)| *is_new).count(),
            "modules upgraded"
        );
        self.publish(BeaconEvent::upgraded(version, &changes));

        Ok(version)
    }

    /// Write one setting per `(setting_id, value)` pair.
    ///
    /// The settings version is bumped by exactly 1 per call and the contracts
    /// version is left alone. Returns the new settings version.
    pub fn configure(
        &self,
        setting_ids: &[SettingId],
        values: &[SettingValue],
    ) -> Result<u64, BeaconError> {
        validation::ensure_batch(setting_ids.len(), values.len(), self.config.max_batch_size)?;

        let writer = self.writer.lock();
        let current = self.state.load_full();
        let mut next = BeaconState::clone(&current);
        let version = next.settings.configure(setting_ids, values)?;

        self.commit(next)?;
        drop(writer);

        info!(
            settings_version = version,
            settings = setting_ids.len(),
            "settings configured"
        );
        self.publish(BeaconEvent::configured(version, setting_ids));

        Ok(version)
    }

    // ===== Queries =====

    /// Gateway handle of a module
    pub fn get_proxy(&self, module_id: &ModuleId) -> Result<GatewayHandle, BeaconError> {
        self.state
            .load()
            .modules
            .get(module_id)
            .map(|entry| entry.binding.gateway)
            .ok_or(BeaconError::UnknownModule(*module_id))
    }

    /// Gateway object of a module, for invoking it
    pub fn gateway(&self, module_id: &ModuleId) -> Result<Arc<Gateway>, BeaconError> {
        self.state
            .load()
            .modules
            .get(module_id)
            .map(|entry| Arc::clone(&entry.gateway))
            .ok_or(BeaconError::UnknownModule(*module_id))
    }

    /// Gateway object behind a handle returned by `get_proxy`
    pub fn gateway_by_handle(&self, handle: &GatewayHandle) -> Option<Arc<Gateway>> {
        let state = self.state.load();
        state
            .gateway_index
            .get(handle)
            .and_then(|module_id| state.modules.get(module_id))
            .map(|entry| Arc::clone(&entry.gateway))
    }

    /// Current implementation of a module, `ImplementationHandle::NONE` if unregistered
    pub fn get_implementation(&self, module_id: &ModuleId) -> ImplementationHandle {
        self.state
            .load()
            .modules
            .get(module_id)
            .map(|entry| entry.binding.implementation)
            .unwrap_or(ImplementationHandle::NONE)
    }

    /// Current setting value, `SettingValue::ZERO` if never configured
    pub fn get_setting(&self, setting_id: &SettingId) -> SettingValue {
        self.state.load().settings.get(setting_id)
    }

    pub fn get_contracts_version(&self) -> u64 {
        self.state.load().contracts_version
    }

    pub fn get_settings_version(&self) -> u64 {
        self.state.load().settings.version()
    }

    pub fn binding(&self, module_id: &ModuleId) -> Option<Binding> {
        self.state
            .load()
            .modules
            .get(module_id)
            .map(|entry| entry.binding)
    }

    /// All bindings sorted by module id
    pub fn bindings(&self) -> Vec<Binding> {
        self.state.load().snapshot().bindings
    }

    /// Copy of the persisted-state layout
    pub fn export_state(&self) -> RegistrySnapshot {
        self.state.load().snapshot()
    }

    // ===== Invocation =====

    /// Invoke a module through its gateway
    pub fn call(&self, module_id: &ModuleId, call: Call) -> Result<serde_json::Value, BeaconError> {
        self.gateway(module_id)?.forward(call)
    }

    /// Current implementation and contracts version, read from one snapshot.
    ///
    /// Only the module's registered gateway resolves; any other gateway handle
    /// gets `NoImplementation`.
    pub(crate) fn resolve(
        &self,
        module_id: &ModuleId,
        gateway: GatewayHandle,
    ) -> Result<(Arc<dyn Module>, u64), BeaconError> {
        let state = self.state.load();
        let handle = state
            .modules
            .get(module_id)
            .filter(|entry| entry.binding.gateway == gateway)
            .map(|entry| entry.binding.implementation)
            .ok_or(BeaconError::NoImplementation(*module_id))?;
        let implementation = self
            .implementation(&handle)
            .ok_or(BeaconError::NoImplementation(*module_id))?;

        Ok((implementation, state.contracts_version))
    }

    // ===== Helper Methods =====

    /// Persist the next state, then make it current
    fn commit(&self, next: BeaconState) -> Result<(), BeaconError> {
        if let Err(e) = self.repository.save(&next.snapshot()) {
            warn!(error = %e, "failed to persist beacon state, batch discarded");
            return Err(BeaconError::internal(e));
        }
        self.state.store(Arc::new(next));
        Ok(())
    }

    fn publish(&self, event: BeaconEvent) {
        if !self.config.publish_events {
            return;
        }
        if let Err(e) = self.event_publisher.publish(event) {
            warn!(error = %e, "failed to publish beacon event");
        }
    }
}
