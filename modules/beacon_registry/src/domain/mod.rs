//! Domain layer - registry, gateways and invocation

pub mod events;
pub mod gateway;
pub mod invocation;
pub mod peer_cache;
pub mod repository;
pub mod service;
pub mod settings;
mod state;
pub mod validation;

pub use events::{BeaconEvent, EventPublisher, NoOpEventPublisher, TracingEventPublisher};
pub use gateway::Gateway;
pub use invocation::{CallContext, Module};
pub use peer_cache::PeerCache;
pub use repository::StateRepository;
pub use service::Beacon;
pub use settings::SettingsStore;
