//! Beacon Registry
//!
//! Upgradeable-module registry. The beacon binds module identifiers to their
//! current implementation, keeps a separately versioned settings store, and hands
//! out one stable forwarding gateway per module that always dispatches to the
//! implementation registered at call time.

// Public exports
pub mod contract;
pub use contract::{
    client::BeaconApi, error::BeaconError, Binding, Bytes32, Call, Envelope, GatewayHandle,
    ImplementationHandle, ModuleId, RegistrySnapshot, SettingId, SettingValue,
};

pub mod config;
pub use config::Config;

pub mod domain;
pub use domain::{
    Beacon, BeaconEvent, CallContext, EventPublisher, Gateway, Module, NoOpEventPublisher,
    PeerCache, StateRepository, TracingEventPublisher,
};

pub mod module;
pub use module::BeaconModule;

pub mod infra;
pub use infra::storage::{InMemoryStateRepository, JsonFileStateRepository};

// Internal modules (hidden from public API)
#[doc(hidden)]
pub mod api;
