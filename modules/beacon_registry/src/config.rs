//! Configuration for the beacon registry module

use serde::{Deserialize, Serialize};

/// Beacon configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    /// Maximum number of entries in one `upgrade` or `configure` batch (0 = unbounded)
    #[serde(default = "default_max_batch_size")]
    pub max_batch_size: usize,

    /// Record every forwarded envelope in its gateway's diagnostic slot
    #[serde(default)]
    pub record_forwarded_calls: bool,

    /// Publish a domain event per committed batch
    #[serde(default = "default_true")]
    pub publish_events: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_batch_size: default_max_batch_size(),
            record_forwarded_calls: false,
            publish_events: true,
        }
    }
}

fn default_max_batch_size() -> usize {
    256
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_fields_take_defaults() {
        let cfg: Config = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg.max_batch_size, 256);
        assert!(!cfg.record_forwarded_calls);
        assert!(cfg.publish_events);
    }

    #[test]
    fn test_unknown_fields_are_rejected() {
        let result: Result<Config, _> = serde_json::from_str(r#"{"max_batch": 3}"#);
        assert!(result.is_err());
    }
}
