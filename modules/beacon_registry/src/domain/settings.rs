//! Versioned key/value settings store embedded in the beacon

use crate::contract::{BeaconError, SettingId, SettingValue};
use std::collections::HashMap;

use super::validation;

/// Settings map plus its own version counter, independent of the contracts version
#[derive(Debug, Clone, Default)]
pub struct SettingsStore {
    values: HashMap<SettingId, SettingValue>,
    version: u64,
}

impl SettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a batch of writes and bump the version once.
    ///
    /// Lengths are checked before anything is written. Later entries win when an
    /// id repeats within the batch.
    pub fn configure(
        &mut self,
        setting_ids: &[SettingId],
        values: &[SettingValue],
    ) -> Result<u64, BeaconError> {
        validation::ensure_same_arity(setting_ids.len(), values.len())?;

        for (id, value) in setting_ids.iter().zip(values) {
            self.values.insert(*id, *value);
        }
        self.version += 1;
        Ok(self.version)
    }

    /// Current value, `SettingValue::ZERO` when never configured
    pub fn get(&self, setting_id: &SettingId) -> SettingValue {
        self.values
            .get(setting_id)
            .copied()
            .unwrap_or(SettingValue::ZERO)
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// All entries sorted by id
    pub fn entries(&self) -> Vec<(SettingId, SettingValue)> {
        let mut entries: Vec<_> = self.values.iter().map(|(k, v)| (*k, *v)).collect();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        entries
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(name: &str) -> SettingId {
        SettingId::new(name).unwrap()
    }

    fn value(text: &str) -> SettingValue {
        SettingValue::from_text(text).unwrap()
    }

    #[test]
    fn test_batch_bumps_version_once() {
        let mut store = SettingsStore::new();
        let version = store
            .configure(&[id("a"), id("b"), id("c")], &[value("1"), value("2"), value("3")])
            .unwrap();
        assert_eq!(version, 1);
        assert_eq!(store.len(), 3);
        assert_eq!(store.get(&id("b")), value("2"));
    }

    #[test]
    fn test_overwrite_still_bumps_version() {
        let mut store = SettingsStore::new();
        store.configure(&[id("cratio")], &[value("600")]).unwrap();
        store.configure(&[id("cratio")], &[value("500")]).unwrap();
        assert_eq!(store.version(), 2);
        assert_eq!(store.get(&id("cratio")), value("500"));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_arity_mismatch_leaves_store_untouched() {
        let mut store = SettingsStore::new();
        let err = store
            .configure(&[id("a"), id("b")], &[value("1")])
            .unwrap_err();
        assert_eq!(err, BeaconError::ArityMismatch { ids: 2, values: 1 });
        assert_eq!(store.version(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_unknown_setting_reads_zero() {
        let store = SettingsStore::new();
        assert_eq!(store.get(&id("missing")), SettingValue::ZERO);
    }

    #[test]
    fn test_duplicate_ids_last_write_wins() {
        let mut store = SettingsStore::new();
        store
            .configure(&[id("k"), id("k")], &[value("first"), value("second")])
            .unwrap();
        assert_eq!(store.get(&id("k")), value("second"));
        assert_eq!(store.version(), 1);
    }

    #[test]
    fn test_entries_are_sorted() {
        let mut store = SettingsStore::new();
        store
            .configure(&[id("zeta"), id("alpha")], &[value("z"), value("a")])
            .unwrap();
        let entries = store.entries();
        assert_eq!(entries[0].0, id("alpha"));
        assert_eq!(entries[1].0, id("zeta"));
    }
}
