//! Deployment plans
//!
//! A plan is a YAML list of steps executed in order against one beacon. Each
//! `upgrade` and `configure` step is a single batch; `call` steps go through the
//! module's gateway and may pin the expected result.

use anyhow::{bail, Context, Result};
use beacon_registry::{Beacon, Call, ImplementationHandle, ModuleId, SettingId, SettingValue};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

use crate::catalog;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Plan {
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Upgrade {
        bindings: Vec<UpgradeEntry>,
    },
    Configure {
        settings: Vec<ConfigureEntry>,
    },
    Call {
        module: String,
        selector: String,
        #[serde(default)]
        args: Value,
        /// Fail the plan unless the call returns exactly this value
        #[serde(default)]
        expect: Option<Value>,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpgradeEntry {
    pub module: String,
    /// Catalog artifact name
    pub artifact: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigureEntry {
    pub setting: String,
    pub value: String,
}

impl Plan {
    pub fn from_yaml(body: &str) -> Result<Self> {
        serde_yaml::from_str(body).context("invalid plan")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let body = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read plan {}", path.display()))?;
        Self::from_yaml(&body)
    }
}

/// Result of one executed step
#[derive(Debug, Clone, PartialEq)]
pub enum StepOutcome {
    Upgraded { contracts_version: u64 },
    Configured { settings_version: u64 },
    Called {
        module: ModuleId,
        selector: String,
        result: Value,
    },
}

impl fmt::Display for StepOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StepOutcome::Upgraded { contracts_version } => {
                write!(f, "upgrade   -> contracts version {}", contracts_version)
            }
            StepOutcome::Configured { settings_version } => {
                write!(f, "configure -> settings version {}", settings_version)
            }
            StepOutcome::Called {
                module,
                selector,
                result,
            } => write!(f, "call      {}.{} -> {}", module, selector, result),
        }
    }
}

/// Executes plans against a beacon, deploying each catalog artifact once
pub struct PlanRunner {
    beacon: Arc<Beacon>,
    deployed: HashMap<&'static str, ImplementationHandle>,
}

impl PlanRunner {
    pub fn new(beacon: Arc<Beacon>) -> Self {
        Self {
            beacon,
            deployed: HashMap::new(),
        }
    }

    pub fn beacon(&self) -> &Arc<Beacon> {
        &self.beacon
    }

    /// Run every step in order, stopping at the first failure
    pub fn run(&mut self, plan: &Plan) -> Result<Vec<StepOutcome>> {
        let mut outcomes = Vec::with_capacity(plan.steps.len());
        for (index, step) in plan.steps.iter().enumerate() {
            let outcome = self
                .run_step(step)
                .with_context(|| format!("step {} failed", index + 1))?;
            debug!(step = index + 1, %outcome, "plan step completed");
            outcomes.push(outcome);
        }
        info!(
            steps = outcomes.len(),
            contracts_version = self.beacon.get_contracts_version(),
            settings_version = self.beacon.get_settings_version(),
            "plan completed"
        );
        Ok(outcomes)
    }

    fn run_step(&mut self, step: &Step) -> Result<StepOutcome> {
        match step {
            Step::Upgrade { bindings } => {
                let mut module_ids = Vec::with_capacity(bindings.len());
                let mut handles = Vec::with_capacity(bindings.len());
                for entry in bindings {
                    module_ids.push(ModuleId::new(&entry.module)?);
                    handles.push(self.deploy(&entry.artifact)?);
                }
                let contracts_version = self.beacon.upgrade(&module_ids, &handles)?;
                Ok(StepOutcome::Upgraded { contracts_version })
            }
            Step::Configure { settings } => {
                let mut setting_ids = Vec::with_capacity(settings.len());
                let mut values = Vec::with_capacity(settings.len());
                for entry in settings {
                    setting_ids.push(SettingId::new(&entry.setting)?);
                    values.push(SettingValue::from_text(&entry.value)?);
                }
                let settings_version = self.beacon.configure(&setting_ids, &values)?;
                Ok(StepOutcome::Configured { settings_version })
            }
            Step::Call {
                module,
                selector,
                args,
                expect,
            } => {
                let module = ModuleId::new(module)?;
                let result = self
                    .beacon
                    .call(&module, Call::new(selector.as_str()).with_args(args.clone()))?;
                if let Some(expected) = expect {
                    if *expected != result {
                        bail!(
                            "{}.{} returned {}, expected {}",
                            module,
                            selector,
                            result,
                            expected
                        );
                    }
                }
                Ok(StepOutcome::Called {
                    module,
                    selector: selector.clone(),
                    result,
                })
            }
        }
    }

    fn deploy(&mut self, artifact: &str) -> Result<ImplementationHandle> {
        let artifact = catalog::find(artifact)
            .with_context(|| format!("unknown artifact '{}'", artifact))?;
        if let Some(handle) = self.deployed.get(artifact.name) {
            return Ok(*handle);
        }
        let handle = self.beacon.deploy(artifact.build());
        self.deployed.insert(artifact.name, handle);
        Ok(handle)
    }
}
