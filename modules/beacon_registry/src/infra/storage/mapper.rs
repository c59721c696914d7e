//! Mapping between contract snapshots and persisted entities

use crate::contract::{
    Binding, Bytes32, GatewayHandle, ImplementationHandle, ModuleId, RegistrySnapshot, SettingId,
    SettingValue,
};
use anyhow::{bail, Context, Result};

use super::entity::{BindingRow, PersistedState, SettingRow, FORMAT_VERSION};

impl From<&RegistrySnapshot> for PersistedState {
    fn from(snapshot: &RegistrySnapshot) -> Self {
        Self {
            format_version: FORMAT_VERSION,
            contracts_version: snapshot.contracts_version,
            settings_version: snapshot.settings_version,
            modules: snapshot
                .bindings
                .iter()
                .map(|binding| BindingRow {
                    module_id: binding.module_id.word().to_hex(),
                    name: binding.module_id.name().map(str::to_string),
                    implementation: binding.implementation.as_uuid(),
                    gateway: binding.gateway.as_uuid(),
                })
                .collect(),
            settings: snapshot
                .settings
                .iter()
                .map(|(id, value)| SettingRow {
                    setting_id: id.word().to_hex(),
                    value: value.word().to_hex(),
                })
                .collect(),
        }
    }
}

impl TryFrom<PersistedState> for RegistrySnapshot {
    type Error = anyhow::Error;

    fn try_from(state: PersistedState) -> Result<Self> {
        if state.format_version != FORMAT_VERSION {
            bail!(
                "unsupported state format version {} (expected {})",
                state.format_version,
                FORMAT_VERSION
            );
        }

        let bindings = state
            .modules
            .into_iter()
            .map(|row| {
                let word = Bytes32::from_hex(&row.module_id)
                    .with_context(|| format!("invalid module id '{}'", row.module_id))?;
                Ok(Binding {
                    module_id: ModuleId::from_word(word),
                    implementation: ImplementationHandle::from_uuid(row.implementation),
                    gateway: GatewayHandle::from_uuid(row.gateway),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let settings = state
            .settings
            .into_iter()
            .map(|row| {
                let id = Bytes32::from_hex(&row.setting_id)
                    .with_context(|| format!("invalid setting id '{}'", row.setting_id))?;
                let value = Bytes32::from_hex(&row.value)
                    .with_context(|| format!("invalid value for setting '{}'", row.setting_id))?;
                Ok((SettingId::from_word(id), SettingValue::from_word(value)))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(RegistrySnapshot {
            contracts_version: state.contracts_version,
            settings_version: state.settings_version,
            bindings,
            settings,
        })
    }
}
