//! Contract models for the beacon registry
//!
//! These models are transport-agnostic and used for inter-module communication.
//! NO serde derives on models - persisted forms live in `infra::storage::entity`.

use super::error::BeaconError;
use std::fmt;
use uuid::Uuid;

/// Width in bytes of every identifier and setting value
pub const WORD_SIZE: usize = 32;

/// Fixed-width 32-byte word backing identifiers and setting values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct Bytes32([u8; WORD_SIZE]);

impl Bytes32 {
    /// The all-zero word
    pub const ZERO: Self = Self([0u8; WORD_SIZE]);

    pub const fn from_bytes(bytes: [u8; WORD_SIZE]) -> Self {
        Self(bytes)
    }

    pub const fn as_bytes(&self) -> &[u8; WORD_SIZE] {
        &self.0
    }

    pub fn is_zero(&self) -> bool {
        self.0 == [0u8; WORD_SIZE]
    }

    /// Encode a short UTF-8 string right-padded with zero bytes.
    ///
    /// At most `WORD_SIZE - 1` bytes are accepted so the word always keeps a
    /// terminating zero.
    pub fn from_text(text: &str) -> Result<Self, BeaconError> {
        let raw = text.as_bytes();
        if raw.len() >= WORD_SIZE {
            return Err(BeaconError::InvalidIdentifier {
                value: text.to_string(),
                reason: format!("longer than {} bytes", WORD_SIZE - 1),
            });
        }

        let mut bytes = [0u8; WORD_SIZE];
        bytes[..raw.len()].copy_from_slice(raw);
        Ok(Self(bytes))
    }

    /// Decode the zero-terminated text.
    ///
    /// Returns `None` when the content is not valid UTF-8 or has non-zero bytes
    /// after the terminator.
    pub fn to_text(&self) -> Option<&str> {
        let end = self.0.iter().position(|&b| b == 0).unwrap_or(WORD_SIZE);
        if self.0[end..].iter().any(|&b| b != 0) {
            return None;
        }
        std::str::from_utf8(&self.0[..end]).ok()
    }

    /// `0x`-prefixed lowercase hex form
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Parse the `0x`-prefixed (or bare) hex form
    pub fn from_hex(value: &str) -> Result<Self, BeaconError> {
        let digits = value.strip_prefix("0x").unwrap_or(value);
        let decoded = hex::decode(digits).map_err(|e| BeaconError::InvalidIdentifier {
            value: value.to_string(),
            reason: e.to_string(),
        })?;
        let bytes: [u8; WORD_SIZE] =
            decoded
                .try_into()
                .map_err(|raw: Vec<u8>| BeaconError::InvalidIdentifier {
                    value: value.to_string(),
                    reason: format!("expected {} bytes, got {}", WORD_SIZE, raw.len()),
                })?;
        Ok(Self(bytes))
    }
}

impl fmt::Display for Bytes32 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.to_text() {
            Some(text) if !text.is_empty() => f.write_str(text),
            _ => f.write_str(&self.to_hex()),
        }
    }
}

macro_rules! word_identifier {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub struct $name(Bytes32);

        impl $name {
            /// Build the identifier from a symbolic name (1 to 31 bytes of UTF-8)
            pub fn new(name: &str) -> Result<Self, BeaconError> {
                if name.is_empty() {
                    return Err(BeaconError::InvalidIdentifier {
                        value: name.to_string(),
                        reason: concat!($kind, " name cannot be empty").to_string(),
                    });
                }
                Bytes32::from_text(name).map(Self)
            }

            pub const fn from_word(word: Bytes32) -> Self {
                Self(word)
            }

            pub const fn word(&self) -> &Bytes32 {
                &self.0
            }

            /// Symbolic name, if the word holds readable text
            pub fn name(&self) -> Option<&str> {
                self.0.to_text()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                fmt::Display::fmt(&self.0, f)
            }
        }
    };
}

word_identifier!(
    /// Opaque identifier of a module; stable for the module's lifetime
    ModuleId,
    "module"
);

word_identifier!(
    /// Key into the settings store
    SettingId,
    "setting"
);

/// Fixed-width opaque setting value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct SettingValue(Bytes32);

impl SettingValue {
    /// Well-known value of a setting that was never configured
    pub const ZERO: Self = Self(Bytes32::ZERO);

    pub fn from_text(text: &str) -> Result<Self, BeaconError> {
        Bytes32::from_text(text).map(Self)
    }

    pub const fn from_word(word: Bytes32) -> Self {
        Self(word)
    }

    pub const fn word(&self) -> &Bytes32 {
        &self.0
    }

    pub fn as_text(&self) -> Option<&str> {
        self.0.to_text()
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl fmt::Display for SettingValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

/// Handle of a deployed implementation artifact
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ImplementationHandle(Uuid);

impl ImplementationHandle {
    /// Well-known empty handle, returned for modules that were never registered
    pub const NONE: Self = Self(Uuid::nil());

    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }

    pub fn is_none(&self) -> bool {
        self.0.is_nil()
    }
}

impl fmt::Display for ImplementationHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "impl:{}", self.0)
    }
}

/// Handle of a module's forwarding gateway; assigned once per module
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GatewayHandle(Uuid);

impl GatewayHandle {
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }

    pub const fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub const fn as_uuid(&self) -> Uuid {
        self.0
    }
}

impl fmt::Display for GatewayHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "gateway:{}", self.0)
    }
}

/// Relation between a module, its stable gateway and its current implementation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Binding {
    pub module_id: ModuleId,
    /// Replaced on every upgrade touching the module
    pub implementation: ImplementationHandle,
    /// Assigned at first registration, never changes
    pub gateway: GatewayHandle,
}

/// Caller payload of an invocation addressed to a gateway
#[derive(Debug, Clone, PartialEq)]
pub struct Call {
    /// Name of the function to run
    pub selector: String,
    /// Arguments, `Null` when the function takes none
    pub args: serde_json::Value,
}

impl Call {
    pub fn new(selector: impl Into<String>) -> Self {
        Self {
            selector: selector.into(),
            args: serde_json::Value::Null,
        }
    }

    pub fn with_args(mut self, args: serde_json::Value) -> Self {
        self.args = args;
        self
    }
}

/// Forwarded invocation: the caller's payload plus the trailing contracts version
#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    payload: Call,
    version: u64,
}

impl Envelope {
    pub fn new(payload: Call, version: u64) -> Self {
        Self { payload, version }
    }

    pub fn payload(&self) -> &Call {
        &self.payload
    }

    /// Contracts version active when the gateway forwarded the call
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn into_payload(self) -> Call {
        self.payload
    }
}

/// Point-in-time copy of the registry's persisted-state layout
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RegistrySnapshot {
    pub contracts_version: u64,
    pub settings_version: u64,
    /// Sorted by module id
    pub bindings: Vec<Binding>,
    /// Sorted by setting id
    pub settings: Vec<(SettingId, SettingValue)>,
}
