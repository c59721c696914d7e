//! Built-in implementation artifacts
//!
//! Artifacts register themselves through `inventory`; `beacon catalog` lists them
//! and plans refer to them by name.

use beacon_registry::{BeaconError, Call, CallContext, Module, ModuleId, PeerCache, SettingId};
use serde_json::{json, Value};
use std::sync::Arc;

/// Named factory for an implementation
pub struct Artifact {
    pub name: &'static str,
    pub description: &'static str,
    build: fn() -> Arc<dyn Module>,
}

impl Artifact {
    pub const fn new(
        name: &'static str,
        description: &'static str,
        build: fn() -> Arc<dyn Module>,
    ) -> Self {
        Self {
            name,
            description,
            build,
        }
    }

    pub fn build(&self) -> Arc<dyn Module> {
        (self.build)()
    }
}

inventory::collect!(Artifact);

/// All registered artifacts, sorted by name
pub fn artifacts() -> Vec<&'static Artifact> {
    let mut all: Vec<&'static Artifact> = inventory::iter::<Artifact>.into_iter().collect();
    all.sort_by_key(|artifact| artifact.name);
    all
}

pub fn find(name: &str) -> Option<&'static Artifact> {
    inventory::iter::<Artifact>
        .into_iter()
        .find(|artifact| artifact.name == name)
}

// ===== Demo implementations =====

/// Answers `whoami` with its artifact name
struct Whoami(&'static str);

impl Module for Whoami {
    fn invoke(&self, ctx: &CallContext<'_>) -> Result<Value, BeaconError> {
        match ctx.call().selector.as_str() {
            "whoami" => Ok(json!(self.0)),
            _ => Err(ctx.unknown_selector()),
        }
    }
}

/// Nebula revision that talks to pulsar and reads the collateral ratio
#[derive(Default)]
struct NebulaV2 {
    peers: PeerCache,
}

impl Module for NebulaV2 {
    fn invoke(&self, ctx: &CallContext<'_>) -> Result<Value, BeaconError> {
        match ctx.call().selector.as_str() {
            "whoami" => Ok(json!("NebulaV2")),
            "whoispulsar" => {
                let pulsar = ModuleId::new("pulsar")?;
                self.peers.call(ctx.beacon(), &pulsar, Call::new("whoami"))
            }
            "getCRatio" => {
                let ratio = ctx.beacon().get_setting(&SettingId::new("cratio")?);
                Ok(json!(ratio.as_text().unwrap_or_default()))
            }
            "getVersion" => Ok(json!(ctx.version())),
            _ => Err(ctx.unknown_selector()),
        }
    }
}

fn nebula_v1() -> Arc<dyn Module> {
    Arc::new(Whoami("NebulaV1"))
}

fn nebula_v2() -> Arc<dyn Module> {
    Arc::new(NebulaV2::default())
}

fn pulsar_v1() -> Arc<dyn Module> {
    Arc::new(Whoami("PulsarV1"))
}

fn pulsar_v2() -> Arc<dyn Module> {
    Arc::new(Whoami("PulsarV2"))
}

inventory::submit! {
    Artifact::new("NebulaV1", "whoami", nebula_v1)
}

inventory::submit! {
    Artifact::new("NebulaV2", "whoami, whoispulsar, getCRatio, getVersion", nebula_v2)
}

inventory::submit! {
    Artifact::new("PulsarV1", "whoami", pulsar_v1)
}

inventory::submit! {
    Artifact::new("PulsarV2", "whoami", pulsar_v2)
}
