//! Per-implementation cache of peer gateways
//!
//! Only gateways are cached. A gateway never changes for a module id, so a cached
//! entry stays valid across upgrades of the peer; the implementation behind it is
//! still resolved on every call.

use crate::contract::{BeaconError, Call, GatewayHandle, ModuleId};
use dashmap::DashMap;
use std::sync::Arc;

use super::gateway::Gateway;
use super::service::Beacon;

/// Lazily populated `ModuleId -> Gateway` map
#[derive(Debug, Default)]
pub struct PeerCache {
    gateways: DashMap<ModuleId, Arc<Gateway>>,
}

impl PeerCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached gateway of `module_id`, asking the beacon only on first use
    pub fn resolve(&self, beacon: &Beacon, module_id: &ModuleId) -> Result<Arc<Gateway>, BeaconError> {
        if let Some(cached) = self.gateways.get(module_id) {
            return Ok(Arc::clone(cached.value()));
        }

        let gateway = beacon.gateway(module_id)?;
        tracing::debug!(peer = %module_id, gateway = %gateway.handle(), "peer gateway resolved");

        let entry = self.gateways.entry(*module_id).or_insert(gateway);
        Ok(Arc::clone(entry.value()))
    }

    /// Route a call to a peer module through its cached gateway
    pub fn call(
        &self,
        beacon: &Beacon,
        module_id: &ModuleId,
        call: Call,
    ) -> Result<serde_json::Value, BeaconError> {
        self.resolve(beacon, module_id)?.forward(call)
    }

    pub fn cached(&self, module_id: &ModuleId) -> Option<GatewayHandle> {
        self.gateways.get(module_id).map(|gateway| gateway.handle())
    }

    pub fn len(&self) -> usize {
        self.gateways.len()
    }

    pub fn is_empty(&self) -> bool {
        self.gateways.is_empty()
    }

    pub fn clear(&self) {
        self.gateways.clear();
    }
}
