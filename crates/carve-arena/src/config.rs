//! Arena configuration parameters.

use carve_core::Scalar;

use crate::error::ArenaError;

/// Configuration for [`Arena`](crate::Arena) allocation.
///
/// Validated when an arena is sized; immutable afterwards.
#[derive(Clone, Debug)]
pub struct ArenaConfig {
    /// Maximum number of scalars a single arena may hold.
    ///
    /// Default: 268_435_456 (2GB at 8 bytes per scalar). Must be non-zero.
    pub max_len: usize,

    /// Value every scalar holds right after allocation.
    ///
    /// Default: `0.0`. Must be finite.
    pub initial_value: Scalar,
}

impl ArenaConfig {
    /// Default capacity: 2^28 scalars.
    pub const DEFAULT_MAX_LEN: usize = 1 << 28;

    /// Create a config with the given capacity and a zero initial value.
    pub fn new(max_len: usize) -> Self {
        Self {
            max_len,
            initial_value: 0.0,
        }
    }

    /// Check the structural invariants of this config.
    pub fn validate(&self) -> Result<(), ArenaError> {
        if self.max_len == 0 {
            return Err(ArenaError::InvalidConfig {
                reason: "max_len must be non-zero".to_string(),
            });
        }
        if !self.initial_value.is_finite() {
            return Err(ArenaError::InvalidConfig {
                reason: format!("initial_value must be finite, got {}", self.initial_value),
            });
        }
        Ok(())
    }

    /// Capacity of an arena at this config, in bytes.
    pub fn max_bytes(&self) -> usize {
        self.max_len.saturating_mul(std::mem::size_of::<Scalar>())
    }
}

impl Default for ArenaConfig {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_LEN)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_capacity_is_2gb() {
        let config = ArenaConfig::default();
        assert_eq!(config.max_bytes(), 2 * 1024 * 1024 * 1024);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_capacity_is_rejected() {
        let config = ArenaConfig::new(0);
        assert!(matches!(
            config.validate(),
            Err(ArenaError::InvalidConfig { .. })
        ));
    }

    #[test]
    fn non_finite_initial_value_is_rejected() {
        let config = ArenaConfig {
            initial_value: Scalar::NAN,
            ..ArenaConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
