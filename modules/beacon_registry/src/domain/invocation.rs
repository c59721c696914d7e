//! Invocation contract shared by every implementation behind a gateway

use crate::contract::{BeaconError, Call, Envelope, ModuleId};
use std::sync::Arc;

use super::gateway::Gateway;
use super::service::Beacon;

/// Business logic behind a gateway.
///
/// Errors returned from `invoke` reach the original caller unchanged.
pub trait Module: Send + Sync {
    fn invoke(&self, ctx: &CallContext<'_>) -> Result<serde_json::Value, BeaconError>;
}

/// Execution context of one forwarded call
pub struct CallContext<'a> {
    beacon: &'a Arc<Beacon>,
    gateway: &'a Gateway,
    envelope: &'a Envelope,
}

impl<'a> CallContext<'a> {
    pub(crate) fn new(beacon: &'a Arc<Beacon>, gateway: &'a Gateway, envelope: &'a Envelope) -> Self {
        Self {
            beacon,
            gateway,
            envelope,
        }
    }

    /// Registry the call was resolved through; used for peer resolution and settings
    pub fn beacon(&self) -> &Arc<Beacon> {
        self.beacon
    }

    /// Gateway executing the call
    pub fn gateway(&self) -> &Gateway {
        self.gateway
    }

    pub fn module_id(&self) -> ModuleId {
        self.gateway.module_id()
    }

    pub fn envelope(&self) -> &Envelope {
        self.envelope
    }

    pub fn call(&self) -> &Call {
        self.envelope.payload()
    }

    /// Contracts version appended by the gateway
    pub fn version(&self) -> u64 {
        self.envelope.version()
    }

    /// Persist the raw forwarded data into the gateway's diagnostic slot
    pub fn record(&self) {
        self.gateway.record(self.envelope.clone());
    }

    /// Error for a selector this implementation does not expose
    pub fn unknown_selector(&self) -> BeaconError {
        BeaconError::UnknownSelector {
            module: self.module_id(),
            selector: self.call().selector.clone(),
        }
    }
}
