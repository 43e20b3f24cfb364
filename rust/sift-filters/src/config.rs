//! Filter construction parameters.

use crate::rice::{MAX_P, MIN_P};
use sift_common::{Result, verify_arg};

/// Default Golomb-Rice parameter: one false positive in about `2^16` probes.
pub const DEFAULT_P: u8 = 16;

/// Number of encoded entries between two sparse-index checkpoints.
pub const DEFAULT_INDEX_GRANULARITY: usize = 128;

/// Configuration for filter construction.
#[derive(Debug, Clone)]
pub struct FilterConfig {
    /// Golomb-Rice parameter: remainders occupy `p` bits and the coding
    /// modulus is `1 << p`, which is also the approximate inverse of the
    /// false-positive rate.
    pub p: u8,
    /// Checkpoint interval for the sparse index, or `None` to build an
    /// unindexed filter that queries scan from the start.
    pub index_granularity: Option<usize>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            p: DEFAULT_P,
            index_granularity: None,
        }
    }
}

impl FilterConfig {
    /// Creates an unindexed configuration with the given parameter.
    pub fn new(p: u8) -> FilterConfig {
        FilterConfig {
            p,
            index_granularity: None,
        }
    }

    /// Enables the sparse index with a checkpoint every `granularity` entries.
    pub fn with_index(mut self, granularity: usize) -> FilterConfig {
        self.index_granularity = Some(granularity);
        self
    }

    /// The Golomb-Rice coding modulus, `2^p`.
    pub fn modulus(&self) -> u64 {
        1u64 << self.p
    }

    /// Validates the configuration and returns an error if invalid.
    pub fn validate(&self) -> Result<()> {
        verify_arg!(p, (MIN_P..=MAX_P).contains(&self.p));
        // Stricter than the coding itself needs: only the modulus `1 << p`
        // must be a power of two, not `p`. Deployed filter consumers reject
        // non-power-of-two parameters, so the check stays at this boundary.
        // TODO: relax to the plain 1..=63 domain once no deployed consumer
        // enforces power-of-two parameters.
        verify_arg!(p, self.p.is_power_of_two());
        if let Some(granularity) = self.index_granularity {
            verify_arg!(index_granularity, granularity > 0);
        }
        Ok(())
    }
}
