//! Immutable registry snapshot published by the beacon

use crate::contract::{Binding, GatewayHandle, ModuleId, RegistrySnapshot};
use std::collections::HashMap;
use std::sync::Arc;

use super::gateway::Gateway;
use super::settings::SettingsStore;

#[derive(Debug, Clone)]
pub(crate) struct ModuleEntry {
    pub binding: Binding,
    pub gateway: Arc<Gateway>,
}

/// Everything `upgrade` and `configure` mutate. Writers clone, edit and swap.
#[derive(Debug, Clone, Default)]
pub(crate) struct BeaconState {
    pub modules: HashMap<ModuleId, ModuleEntry>,
    pub gateway_index: HashMap<GatewayHandle, ModuleId>,
    pub contracts_version: u64,
    pub settings: SettingsStore,
}

impl BeaconState {
    pub fn snapshot(&self) -> RegistrySnapshot {
        let mut bindings: Vec<Binding> = self.modules.values().map(|e| e.binding).collect();
        bindings.sort_by(|a, b| a.module_id.cmp(&b.module_id));

        RegistrySnapshot {
            contracts_version: self.contracts_version,
            settings_version: self.settings.version(),
            bindings,
            settings: self.settings.entries(),
        }
    }
}
