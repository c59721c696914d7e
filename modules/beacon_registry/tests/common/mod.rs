//! Common test utilities: demo implementations, mock repositories and publishers
#![allow(dead_code)]

use beacon_registry::contract::*;
use beacon_registry::domain::{
    Beacon, BeaconEvent, CallContext, EventPublisher, Module, NoOpEventPublisher, PeerCache,
    StateRepository,
};
use beacon_registry::{Config, InMemoryStateRepository};
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

pub fn print_test_header(test_name: &str, purpose: &str) {
    println!("\n🧪 TEST: {}", test_name);
    println!("📋 PURPOSE: {}", purpose);
}

pub fn module_id(name: &str) -> ModuleId {
    ModuleId::new(name).unwrap()
}

pub fn setting_id(name: &str) -> SettingId {
    SettingId::new(name).unwrap()
}

pub fn value(text: &str) -> SettingValue {
    SettingValue::from_text(text).unwrap()
}

pub fn nebula() -> ModuleId {
    module_id("nebula")
}

pub fn pulsar() -> ModuleId {
    module_id("pulsar")
}

pub fn cratio() -> SettingId {
    setting_id("cratio")
}

/// Beacon on an in-memory repository with events discarded
pub fn new_beacon() -> Arc<Beacon> {
    new_beacon_with(Config::default())
}

pub fn new_beacon_with(config: Config) -> Arc<Beacon> {
    Beacon::new(
        config,
        Arc::new(InMemoryStateRepository::new()),
        Arc::new(NoOpEventPublisher),
    )
}

/// Invoke a module through its gateway
pub fn call(beacon: &Beacon, module: ModuleId, selector: &str) -> Result<Value, BeaconError> {
    beacon.gateway(&module)?.forward(Call::new(selector))
}

// ===== Demo implementations =====

/// Implementation that only answers `whoami`
pub struct Named(pub &'static str);

impl Module for Named {
    fn invoke(&self, ctx: &CallContext<'_>) -> Result<Value, BeaconError> {
        match ctx.call().selector.as_str() {
            "whoami" => Ok(json!(self.0)),
            _ => Err(ctx.unknown_selector()),
        }
    }
}

pub fn nebula_v1() -> Arc<dyn Module> {
    Arc::new(Named("NebulaV1"))
}

pub fn pulsar_v1() -> Arc<dyn Module> {
    Arc::new(Named("PulsarV1"))
}

pub fn pulsar_v2() -> Arc<dyn Module> {
    Arc::new(Named("PulsarV2"))
}

/// Second nebula revision: knows about pulsar, settings and its own version
#[derive(Default)]
pub struct NebulaV2 {
    pub peers: PeerCache,
}

impl Module for NebulaV2 {
    fn invoke(&self, ctx: &CallContext<'_>) -> Result<Value, BeaconError> {
        match ctx.call().selector.as_str() {
            "whoami" => Ok(json!("NebulaV2")),
            "whoispulsar" => self
                .peers
                .call(ctx.beacon(), &pulsar(), Call::new("whoami")),
            "getCRatio" => {
                let ratio = ctx.beacon().get_setting(&cratio());
                Ok(json!(ratio.as_text().unwrap_or_default()))
            }
            "getVersion" => Ok(json!(ctx.version())),
            "recordData" => {
                ctx.record();
                Ok(json!(ctx.version()))
            }
            "echo" => Ok(ctx.call().args.clone()),
            "fail" => Err(BeaconError::reverted("nebula refused")),
            _ => Err(ctx.unknown_selector()),
        }
    }
}

/// Implementation that counts invocations
#[derive(Default)]
pub struct Counter {
    pub calls: AtomicUsize,
}

impl Module for Counter {
    fn invoke(&self, _ctx: &CallContext<'_>) -> Result<Value, BeaconError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(json!(n))
    }
}

// ===== Mock repositories and publishers =====

/// In-memory repository that can be switched to fail and counts saves
#[derive(Default)]
pub struct FlakyRepository {
    inner: InMemoryStateRepository,
    pub failing: AtomicBool,
    pub saves: AtomicUsize,
}

impl FlakyRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub fn save_count(&self) -> usize {
        self.saves.load(Ordering::SeqCst)
    }
}

impl StateRepository for FlakyRepository {
    fn save(&self, snapshot: &RegistrySnapshot) -> anyhow::Result<()> {
        if self.failing.load(Ordering::SeqCst) {
            anyhow::bail!("disk full");
        }
        self.saves.fetch_add(1, Ordering::SeqCst);
        self.inner.save(snapshot)
    }

    fn load(&self) -> anyhow::Result<Option<RegistrySnapshot>> {
        self.inner.load()
    }
}

/// Publisher that keeps every event
#[derive(Default)]
pub struct RecordingPublisher {
    pub events: Mutex<Vec<BeaconEvent>>,
}

impl RecordingPublisher {
    pub fn events(&self) -> Vec<BeaconEvent> {
        self.events.lock().clone()
    }
}

impl EventPublisher for RecordingPublisher {
    fn publish(&self, event: BeaconEvent) -> anyhow::Result<()> {
        self.events.lock().push(event);
        Ok(())
    }
}

/// Publisher that always fails
pub struct FailingPublisher;

impl EventPublisher for FailingPublisher {
    fn publish(&self, _event: BeaconEvent) -> anyhow::Result<()> {
        anyhow::bail!("broker unavailable")
    }
}
