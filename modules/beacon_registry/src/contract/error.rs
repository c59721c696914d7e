//! Contract error types for the beacon registry
//!
//! These errors are transport-agnostic and used for inter-module communication.
//! Implementation-level failures travel through gateways unchanged.

use super::model::{ImplementationHandle, ModuleId};

/// Beacon registry errors
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BeaconError {
    /// Batch sequences have different lengths; nothing was applied
    #[error("arity mismatch: {ids} identifiers but {values} values")]
    ArityMismatch { ids: usize, values: usize },

    /// Batch exceeds the configured maximum size; nothing was applied
    #[error("batch of {size} entries exceeds the limit of {max}")]
    BatchTooLarge { size: usize, max: usize },

    /// No gateway was ever allocated for this module
    #[error("unknown module: {0}")]
    UnknownModule(ModuleId),

    /// Gateway cannot resolve a current implementation
    #[error("no implementation registered for module {0}")]
    NoImplementation(ModuleId),

    /// Gateway is already bound to a beacon
    #[error("gateway for module {0} is already initialized")]
    AlreadyInitialized(ModuleId),

    /// Upgrade references a handle that was never deployed
    #[error("implementation {0} was never deployed")]
    UnknownImplementation(ImplementationHandle),

    /// Identifier or value text cannot be encoded as a 32-byte word
    #[error("invalid identifier '{value}': {reason}")]
    InvalidIdentifier { value: String, reason: String },

    /// Implementation does not expose the called function
    #[error("module {module} has no function '{selector}'")]
    UnknownSelector { module: ModuleId, selector: String },

    /// Implementation rejected the call
    #[error("call reverted: {reason}")]
    Reverted { reason: String },

    /// Infrastructure failure, e.g. the state could not be persisted
    #[error("internal error: {0}")]
    Internal(String),
}

impl BeaconError {
    pub fn reverted(reason: impl Into<String>) -> Self {
        Self::Reverted {
            reason: reason.into(),
        }
    }

    pub fn internal(err: impl std::fmt::Display) -> Self {
        Self::Internal(err.to_string())
    }
}
