//! State repository implementations

use crate::contract::RegistrySnapshot;
use crate::domain::repository::StateRepository;
use anyhow::{Context, Result};
use parking_lot::RwLock;
use std::fs;
use std::path::{Path, PathBuf};

use super::entity::PersistedState;

// ===== In-memory Repository =====

/// Keeps the last saved snapshot in memory; the default substrate
#[derive(Debug, Default)]
pub struct InMemoryStateRepository {
    latest: RwLock<Option<RegistrySnapshot>>,
}

impl InMemoryStateRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateRepository for InMemoryStateRepository {
    fn save(&self, snapshot: &RegistrySnapshot) -> Result<()> {
        *self.latest.write() = Some(snapshot.clone());
        Ok(())
    }

    fn load(&self) -> Result<Option<RegistrySnapshot>> {
        Ok(self.latest.read().clone())
    }
}

// ===== JSON File Repository =====

/// Writes the state as pretty JSON; replaces the file atomically on every save
#[derive(Debug, Clone)]
pub struct JsonFileStateRepository {
    path: PathBuf,
}

impl JsonFileStateRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "beacon-state".into());
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl StateRepository for JsonFileStateRepository {
    fn save(&self, snapshot: &RegistrySnapshot) -> Result<()> {
        let persisted = PersistedState::from(snapshot);
        let body = serde_json::to_vec_pretty(&persisted)?;

        let staging = self.staging_path();
        fs::write(&staging, body)
            .with_context(|| format!("failed to write {}", staging.display()))?;
        fs::rename(&staging, &self.path)
            .with_context(|| format!("failed to replace {}", self.path.display()))?;

        tracing::debug!(
            path = %self.path.display(),
            contracts_version = snapshot.contracts_version,
            settings_version = snapshot.settings_version,
            "beacon state saved"
        );
        Ok(())
    }

    fn load(&self) -> Result<Option<RegistrySnapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let body = fs::read_to_string(&self.path)
            .with_context(|| format!("failed to read {}", self.path.display()))?;
        let persisted: PersistedState = serde_json::from_str(&body)
            .with_context(|| format!("malformed state file {}", self.path.display()))?;

        RegistrySnapshot::try_from(persisted).map(Some)
    }
}
