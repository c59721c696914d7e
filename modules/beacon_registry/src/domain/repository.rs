//! Repository trait for the persistence substrate under the registry
//!
//! The host supplies the storage. Implementations are in infra/storage.

use crate::contract::RegistrySnapshot;
use anyhow::Result;

/// Durable home of the registry's module table, settings table and counters
pub trait StateRepository: Send + Sync {
    /// Persist the complete state that is about to become current
    fn save(&self, snapshot: &RegistrySnapshot) -> Result<()>;

    /// Last saved state, `None` if nothing was saved yet
    fn load(&self) -> Result<Option<RegistrySnapshot>>;
}
