//! Filter construction.

use rayon::prelude::*;

use crate::bitstream::BitStream;
use crate::config::FilterConfig;
use crate::filter::Filter;
use crate::hash::{Key, keyed_hash};
use crate::index::{Checkpoint, SparseIndex};
use crate::{reduce, rice};
use sift_common::{Result, verify_arg};

/// Item count below which hashing stays on the calling thread.
const PARALLEL_HASH_THRESHOLD: usize = 1024;

/// Builds immutable [`Filter`]s from sets of byte-string items.
///
/// Every item is hashed under the caller's key, reduced into `[0, n * 2^p)`,
/// and the sorted values are delta-coded with Golomb-Rice codes. Large item
/// sets hash on rayon workers; each worker produces its own local results and
/// the sort is the single join barrier before the strictly sequential encode.
#[derive(Debug, Clone)]
pub struct FilterBuilder {
    config: FilterConfig,
}

impl FilterBuilder {
    /// Creates a builder producing unindexed filters with parameter `p`.
    pub fn new(p: u8) -> FilterBuilder {
        FilterBuilder {
            config: FilterConfig::new(p),
        }
    }

    /// Creates a builder from a full configuration.
    pub fn with_config(config: FilterConfig) -> FilterBuilder {
        FilterBuilder { config }
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Builds a filter over `items` keyed by `key`.
    ///
    /// Fails with `InvalidArgument` on an empty item set, an invalid
    /// configuration, or an item count too large for the reduced value domain
    /// `n * 2^p` to fit 64 bits. No partially built filter ever escapes a
    /// failed call.
    pub fn build<T>(&self, key: &Key, items: &[T]) -> Result<Filter>
    where
        T: AsRef<[u8]> + Sync,
    {
        self.config.validate()?;
        verify_arg!(items, !items.is_empty());
        let p = self.config.p;
        let n = items.len();
        verify_arg!(items, (n as u64) <= (u64::MAX >> p));

        let modulus_np = (n as u64) << p;
        let (np_hi, np_lo) = reduce::split_range(modulus_np);
        let to_value = |item: &T| reduce::reduce(keyed_hash(key, item.as_ref()), np_hi, np_lo);

        let mut values: Vec<u64> = if n >= PARALLEL_HASH_THRESHOLD {
            items.par_iter().map(to_value).collect()
        } else {
            items.iter().map(to_value).collect()
        };
        values.sort_unstable();

        // Each code depends on the previous value and the write position, so
        // encoding runs on one thread.
        let mut stream = BitStream::with_capacity(n * (p as usize + 2));
        let mut checkpoints = Vec::new();
        let mut last_value = 0u64;
        for (i, &value) in values.iter().enumerate() {
            if let Some(granularity) = self.config.index_granularity {
                if i % granularity == 0 {
                    checkpoints.push(Checkpoint {
                        value: last_value,
                        bit_pos: stream.bit_len(),
                    });
                }
            }
            rice::encode_one(&mut stream, value, last_value, p)?;
            last_value = value;
        }

        let index = self
            .config
            .index_granularity
            .map(|granularity| SparseIndex::new(granularity, checkpoints));
        let data = stream.into_bytes();
        log::debug!(
            "built filter: n={n}, p={p}, {} bytes, {} checkpoints",
            data.len(),
            index.as_ref().map_or(0, SparseIndex::len)
        );
        Ok(Filter::from_parts(p, n, data, index))
    }
}
