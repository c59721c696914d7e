//! Native client implementation - wraps the beacon for in-process calls

use crate::contract::{
    BeaconApi, BeaconError, Call, GatewayHandle, ImplementationHandle, ModuleId, SettingId,
    SettingValue,
};
use crate::domain::{Beacon, Module};
use std::sync::Arc;

/// Native client implementation that directly calls the beacon
#[derive(Clone)]
pub struct NativeClient {
    beacon: Arc<Beacon>,
}

impl NativeClient {
    /// Create a new native client
    pub fn new(beacon: Arc<Beacon>) -> Self {
        Self { beacon }
    }
}

impl BeaconApi for NativeClient {
    fn deploy(&self, implementation: Arc<dyn Module>) -> ImplementationHandle {
        self.beacon.deploy(implementation)
    }

    fn upgrade(
        &self,
        module_ids: &[ModuleId],
        implementations: &[ImplementationHandle],
    ) -> Result<u64, BeaconError> {
        self.beacon.upgrade(module_ids, implementations)
    }

    fn configure(
        &self,
        setting_ids: &[SettingId],
        values: &[SettingValue],
    ) -> Result<u64, BeaconError> {
        self.beacon.configure(setting_ids, values)
    }

    fn get_proxy(&self, module_id: &ModuleId) -> Result<GatewayHandle, BeaconError> {
        self.beacon.get_proxy(module_id)
    }

    fn get_implementation(&self, module_id: &ModuleId) -> ImplementationHandle {
        self.beacon.get_implementation(module_id)
    }

    fn get_setting(&self, setting_id: &SettingId) -> SettingValue {
        self.beacon.get_setting(setting_id)
    }

    fn get_contracts_version(&self) -> u64 {
        self.beacon.get_contracts_version()
    }

    fn get_settings_version(&self) -> u64 {
        self.beacon.get_settings_version()
    }

    fn call(&self, module_id: &ModuleId, call: Call) -> Result<serde_json::Value, BeaconError> {
        self.beacon.call(module_id, call)
    }
}
