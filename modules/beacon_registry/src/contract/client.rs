//! Native client trait for inter-module communication
//!
//! This trait defines the API that hosts and other modules use to drive the beacon.
//! NO transport - direct function calls.

use super::{
    error::BeaconError,
    model::{Call, GatewayHandle, ImplementationHandle, ModuleId, SettingId, SettingValue},
};
use crate::domain::Module;
use std::sync::Arc;

/// Beacon registry API
pub trait BeaconApi: Send + Sync {
    // ===== Deployment =====

    /// Register an implementation artifact and return its handle
    fn deploy(&self, implementation: Arc<dyn Module>) -> ImplementationHandle;

    /// Bind each module to its implementation; one contracts version bump per call
    fn upgrade(
        &self,
        module_ids: &[ModuleId],
        implementations: &[ImplementationHandle],
    ) -> Result<u64, BeaconError>;

    /// Write each setting; one settings version bump per call
    fn configure(
        &self,
        setting_ids: &[SettingId],
        values: &[SettingValue],
    ) -> Result<u64, BeaconError>;

    // ===== Queries =====

    /// Gateway handle of a module
    fn get_proxy(&self, module_id: &ModuleId) -> Result<GatewayHandle, BeaconError>;

    /// Current implementation of a module, `ImplementationHandle::NONE` if unregistered
    fn get_implementation(&self, module_id: &ModuleId) -> ImplementationHandle;

    /// Current setting value, `SettingValue::ZERO` if never configured
    fn get_setting(&self, setting_id: &SettingId) -> SettingValue;

    fn get_contracts_version(&self) -> u64;

    fn get_settings_version(&self) -> u64;

    // ===== Invocation =====

    /// Invoke a module through its gateway
    fn call(&self, module_id: &ModuleId, call: Call) -> Result<serde_json::Value, BeaconError>;
}
