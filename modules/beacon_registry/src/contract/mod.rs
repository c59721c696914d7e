//! Contract layer - public API for inter-module communication
//!
//! This layer contains transport-agnostic models and the native client trait.

pub mod client;
pub mod error;
pub mod model;

pub use client::BeaconApi;
pub use error::BeaconError;
pub use model::{
    Binding, Bytes32, Call, Envelope, GatewayHandle, ImplementationHandle, ModuleId,
    RegistrySnapshot, SettingId, SettingValue, WORD_SIZE,
};
