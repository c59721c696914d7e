//! Forwarding gateway: the stable endpoint of a module
//!
//! A gateway never caches its implementation. Every call resolves the current
//! implementation and the contracts version from one beacon snapshot, so the
//! version an implementation observes is the one its code was selected under.

use crate::contract::{BeaconError, Call, Envelope, GatewayHandle, ModuleId};
use once_cell::sync::OnceCell;
use parking_lot::Mutex;
use std::fmt;
use std::sync::{Arc, Weak};

use super::invocation::CallContext;
use super::service::Beacon;

/// Stable forwarding endpoint for one module
pub struct Gateway {
    module_id: ModuleId,
    handle: GatewayHandle,
    /// Owning beacon, set when the beacon allocates the gateway
    beacon: OnceCell<Weak<Beacon>>,
    /// Set by the first successful `initialize`
    initialized: OnceCell<()>,
    /// Last envelope recorded by an implementation (or by the gateway when
    /// `record_forwarded_calls` is on)
    recorded: Mutex<Option<Envelope>>,
}

impl Gateway {
    pub(crate) fn new(module_id: ModuleId) -> Self {
        Self {
            module_id,
            handle: GatewayHandle::generate(),
            beacon: OnceCell::new(),
            initialized: OnceCell::new(),
            recorded: Mutex::new(None),
        }
    }

    /// Gateway that is not bound to any beacon yet.
    ///
    /// It is never the registered gateway of its module, so forwarding always
    /// fails with `NoImplementation`, even after `initialize`.
    pub fn detached(module_id: ModuleId) -> Self {
        Self::new(module_id)
    }

    pub fn handle(&self) -> GatewayHandle {
        self.handle
    }

    pub fn module_id(&self) -> ModuleId {
        self.module_id
    }

    /// Whether `initialize` has already succeeded
    pub fn is_initialized(&self) -> bool {
        self.initialized.get().is_some()
    }

    /// Point the gateway at its beacon. Succeeds exactly once.
    ///
    /// A gateway allocated by a beacon accepts only that beacon; a detached
    /// gateway is bound to the one given here.
    pub fn initialize(&self, beacon: &Arc<Beacon>) -> Result<(), BeaconError> {
        let requested = Arc::downgrade(beacon);
        match self.beacon.get() {
            Some(owner) if !Weak::ptr_eq(owner, &requested) => {
                return Err(BeaconError::AlreadyInitialized(self.module_id));
            }
            Some(_) => {}
            None => self.bind(requested)?,
        }
        self.initialized
            .set(())
            .map_err(|_| BeaconError::AlreadyInitialized(self.module_id))
    }

    pub(crate) fn bind(&self, beacon: Weak<Beacon>) -> Result<(), BeaconError> {
        self.beacon
            .set(beacon)
            .map_err(|_| BeaconError::AlreadyInitialized(self.module_id))
    }

    /// Forward a call to the module's current implementation.
    ///
    /// The implementation's result, success or failure, is returned as is.
    pub fn forward(&self, call: Call) -> Result<serde_json::Value, BeaconError> {
        let beacon = self
            .beacon
            .get()
            .and_then(Weak::upgrade)
            .ok_or(BeaconError::NoImplementation(self.module_id))?;

        let (implementation, version) = beacon.resolve(&self.module_id, self.handle)?;
        let envelope = Envelope::new(call, version);

        tracing::debug!(
            module = %self.module_id,
            selector = %envelope.payload().selector,
            version,
            "forwarding call"
        );

        if beacon.config().record_forwarded_calls {
            self.record(envelope.clone());
        }

        let ctx = CallContext::new(&beacon, self, &envelope);
        implementation.invoke(&ctx)
    }

    /// Most recently recorded forwarded data, version included
    pub fn recorded_call(&self) -> Option<Envelope> {
        self.recorded.lock().clone()
    }

    /// Version field of the most recently recorded forwarded data
    pub fn recorded_version(&self) -> Option<u64> {
        self.recorded.lock().as_ref().map(Envelope::version)
    }

    pub(crate) fn record(&self, envelope: Envelope) {
        *self.recorded.lock() = Some(envelope);
    }
}

impl fmt::Debug for Gateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gateway")
            .field("module_id", &self.module_id)
            .field("handle", &self.handle)
            .field("bound", &self.beacon.get().is_some())
            .field("initialized", &self.is_initialized())
            .finish()
    }
}
