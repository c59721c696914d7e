//! Persisted entities
//!
//! Words are stored as `0x`-prefixed hex and handles as UUID strings, so a saved
//! file stays readable and independent of in-memory layout.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Format revision written into every persisted state
pub const FORMAT_VERSION: u32 = 1;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedState {
    pub format_version: u32,
    pub contracts_version: u64,
    pub settings_version: u64,
    #[serde(default)]
    pub modules: Vec<BindingRow>,
    #[serde(default)]
    pub settings: Vec<SettingRow>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindingRow {
    pub module_id: String,
    /// Symbolic name, informational only
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub implementation: Uuid,
    pub gateway: Uuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingRow {
    pub setting_id: String,
    pub value: String,
}
