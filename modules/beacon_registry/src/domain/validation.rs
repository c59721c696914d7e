//! Batch validation, run before any state is touched

use crate::contract::BeaconError;

/// Both batch sequences must have the same length
pub fn ensure_same_arity(ids: usize, values: usize) -> Result<(), BeaconError> {
    if ids != values {
        return Err(BeaconError::ArityMismatch { ids, values });
    }
    Ok(())
}

/// Arity check plus the configured size bound
///
/// A `max` of 0 disables the bound.
pub fn ensure_batch(ids: usize, values: usize, max: usize) -> Result<(), BeaconError> {
    ensure_same_arity(ids, values)?;

    if max > 0 && ids > max {
        return Err(BeaconError::BatchTooLarge { size: ids, max });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_equal_lengths_pass() {
        assert!(ensure_same_arity(0, 0).is_ok());
        assert!(ensure_same_arity(3, 3).is_ok());
    }

    #[test]
    fn test_mismatch_reports_both_lengths() {
        assert_eq!(
            ensure_same_arity(2, 3),
            Err(BeaconError::ArityMismatch { ids: 2, values: 3 })
        );
    }

    #[test]
    fn test_batch_bound() {
        assert!(ensure_batch(4, 4, 4).is_ok());
        assert_eq!(
            ensure_batch(5, 5, 4),
            Err(BeaconError::BatchTooLarge { size: 5, max: 4 })
        );
        assert!(ensure_batch(10_000, 10_000, 0).is_ok());
    }

    #[test]
    fn test_arity_is_checked_before_size() {
        assert_eq!(
            ensure_batch(5, 1, 4),
            Err(BeaconError::ArityMismatch { ids: 5, values: 1 })
        );
    }
}
