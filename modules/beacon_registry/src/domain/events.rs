//! Domain events for the beacon registry
//!
//! One event is published per committed batch:
//! - `ModulesUpgraded`: an `upgrade` call bumped the contracts version
//! - `SettingsConfigured`: a `configure` call bumped the settings version

use crate::contract::{Binding, SettingId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Domain event types for the beacon
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum BeaconEvent {
    /// A batch of bindings was created or updated
    ModulesUpgraded(ModulesUpgradedEvent),
    /// A batch of settings was written
    SettingsConfigured(SettingsConfiguredEvent),
}

/// One binding touched by an upgrade
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UpgradedModule {
    /// Module identifier (symbolic name or hex)
    pub module_id: String,
    pub implementation: String,
    pub gateway: String,
    /// Whether the gateway was allocated by this upgrade
    pub is_new: bool,
}

/// Event data for an upgrade batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModulesUpgradedEvent {
    /// Contracts version after the batch
    pub contracts_version: u64,
    pub modules: Vec<UpgradedModule>,
    pub timestamp: DateTime<Utc>,
}

/// Event data for a configure batch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsConfiguredEvent {
    /// Settings version after the batch
    pub settings_version: u64,
    pub setting_ids: Vec<String>,
    pub timestamp: DateTime<Utc>,
}

/// Event publisher trait for publishing domain events
pub trait EventPublisher: Send + Sync {
    /// Publish an event after its batch has been committed
    fn publish(&self, event: BeaconEvent) -> anyhow::Result<()>;
}

/// No-op event publisher for testing or when events are disabled
pub struct NoOpEventPublisher;

impl EventPublisher for NoOpEventPublisher {
    fn publish(&self, _event: BeaconEvent) -> anyhow::Result<()> {
        Ok(())
    }
}

/// Publisher that writes every event to the `beacon::events` tracing target
pub struct TracingEventPublisher;

impl EventPublisher for TracingEventPublisher {
    fn publish(&self, event: BeaconEvent) -> anyhow::Result<()> {
        let payload = serde_json::to_string(&event)?;
        tracing::info!(target: "beacon::events", event = %payload, "beacon event");
        Ok(())
    }
}

impl BeaconEvent {
    /// Create a new ModulesUpgraded event from `(binding, is_new)` pairs
    pub fn upgraded(contracts_version: u64, changes: &[(Binding, bool)]) -> Self {
        BeaconEvent::ModulesUpgraded(ModulesUpgradedEvent {
            contracts_version,
            modules: changes
                .iter()
                .map(|(binding, is_new)| UpgradedModule {
                    module_id: binding.module_id.to_string(),
                    implementation: binding.implementation.to_string(),
                    gateway: binding.gateway.to_string(),
                    is_new: *is_new,
                })
                .collect(),
            timestamp: Utc::now(),
        })
    }

    /// Create a new SettingsConfigured event
    pub fn configured(settings_version: u64, setting_ids: &[SettingId]) -> Self {
        BeaconEvent::SettingsConfigured(SettingsConfiguredEvent {
            settings_version,
            setting_ids: setting_ids.iter().map(ToString::to_string).collect(),
            timestamp: Utc::now(),
        })
    }
}
