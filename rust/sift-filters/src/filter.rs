//! Immutable Golomb-coded set filter and its query engine.

use std::cmp::Ordering;

use crate::bitstream::{BitRead, BitReader};
use crate::hash::{Key, keyed_hash};
use crate::index::{Checkpoint, Seed, SparseIndex};
use crate::reduce;
use crate::rice::{self, MAX_P, MIN_P};
use sift_common::{Result, error::Error, verify_arg};

/// A built Golomb-coded set: metadata, the encoded bit stream, and an
/// optional sparse checkpoint index.
///
/// A filter is immutable once constructed. Queries take `&self`, allocate
/// nothing but a local read cursor, and may run concurrently without
/// synchronization. Probing an item that was inserted always answers `true`;
/// an item that was not inserted answers `true` with probability about
/// `1 / 2^p`.
#[derive(Debug, Clone)]
pub struct Filter {
    p: u8,
    n: usize,
    modulus_p: u64,
    modulus_np: u64,
    data: Vec<u8>,
    index: Option<SparseIndex>,
}

impl Filter {
    pub(crate) fn from_parts(
        p: u8,
        n: usize,
        data: Vec<u8>,
        index: Option<SparseIndex>,
    ) -> Filter {
        Filter {
            p,
            n,
            modulus_p: 1u64 << p,
            modulus_np: (n as u64) << p,
            data,
            index,
        }
    }

    /// Reassembles a filter from its out-of-band metadata and an encoded
    /// blob, e.g. one read back from a store.
    ///
    /// `p` and `n` must be the values the filter was built with; the blob
    /// itself carries neither. The returned filter is unindexed.
    pub fn from_encoded(p: u8, n: usize, data: Vec<u8>) -> Result<Filter> {
        verify_arg!(p, (MIN_P..=MAX_P).contains(&p));
        verify_arg!(n, n > 0);
        verify_arg!(n, (n as u64) <= (u64::MAX >> p));
        Ok(Filter::from_parts(p, n, data, None))
    }

    /// Like [`Filter::from_encoded`], but also rebuilds a sparse index with a
    /// checkpoint every `granularity` entries.
    ///
    /// This decodes the blob once, so a truncated or garbled blob is rejected
    /// here with `InvalidFormat` instead of surfacing later during queries.
    pub fn from_encoded_indexed(
        p: u8,
        n: usize,
        data: Vec<u8>,
        granularity: usize,
    ) -> Result<Filter> {
        verify_arg!(granularity, granularity > 0);
        let mut filter = Filter::from_encoded(p, n, data)?;
        filter.index = Some(filter.rebuild_index(granularity)?);
        Ok(filter)
    }

    fn rebuild_index(&self, granularity: usize) -> Result<SparseIndex> {
        let mut reader = BitReader::new(&self.data);
        let mut checkpoints = Vec::with_capacity(self.n.div_ceil(granularity));
        let mut last_value = 0u64;
        for i in 0..self.n {
            if i % granularity == 0 {
                checkpoints.push(Checkpoint {
                    value: last_value,
                    bit_pos: reader.position(),
                });
            }
            last_value = rice::decode_next(&mut reader, self.p, last_value)
                .map_err(|err| as_corruption(err, "rebuilding index"))?;
        }
        Ok(SparseIndex::new(granularity, checkpoints))
    }

    /// The Golomb-Rice parameter the filter was built with.
    pub fn p(&self) -> u8 {
        self.p
    }

    /// Number of items encoded into the filter.
    pub fn n(&self) -> usize {
        self.n
    }

    /// The coding modulus, `2^p`.
    pub fn modulus_p(&self) -> u64 {
        self.modulus_p
    }

    /// The reduced value domain, `n * 2^p`.
    pub fn modulus_np(&self) -> u64 {
        self.modulus_np
    }

    /// The encoded, byte-aligned filter blob. Metadata (`p`, `n`) travels
    /// out of band; the blob is only the Golomb-Rice bit stream.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn is_indexed(&self) -> bool {
        self.index.is_some()
    }

    pub fn index(&self) -> Option<&SparseIndex> {
        self.index.as_ref()
    }

    /// Maps an item into the filter's reduced value domain through the same
    /// hash + reduce pipeline used at build time.
    fn search_value(&self, key: &Key, item: &[u8]) -> u64 {
        let (np_hi, np_lo) = reduce::split_range(self.modulus_np);
        reduce::reduce(keyed_hash(key, item), np_hi, np_lo)
    }

    /// Tests whether `item` might be a member of the encoded set.
    ///
    /// Returns `Ok(true)` on a match (no false negatives: every item inserted
    /// at build time matches), `Ok(false)` when the walk proves absence, and
    /// `InvalidFormat` when the blob runs out of bits before its `n` entries
    /// were decoded, which means a corrupt filter rather than a miss.
    pub fn probe(&self, item: &[u8], key: &Key) -> Result<bool> {
        let search_value = self.search_value(key, item);
        let seed = match &self.index {
            Some(index) => index.seek_for(search_value),
            None => Seed::start(),
        };

        let mut reader = BitReader::new(&self.data);
        reader
            .seek(seed.bit_pos)
            .map_err(|err| as_corruption(err, "seeking to checkpoint"))?;

        let mut last_value = seed.last_value;
        for _ in seed.entries_consumed..self.n {
            let value = rice::decode_next(&mut reader, self.p, last_value)
                .map_err(|err| as_corruption(err, "decoding entry"))?;
            match value.cmp(&search_value) {
                Ordering::Equal => return Ok(true),
                Ordering::Greater => return Ok(false),
                Ordering::Less => last_value = value,
            }
        }
        Ok(false)
    }

    /// Tests whether any of `items` might be a member of the encoded set.
    ///
    /// The query items are reduced and sorted, then merge-joined against the
    /// filter's sequence, decoding each filter entry at most once. Agrees
    /// with `items.iter().any(|item| probe(item, key))` for every item set.
    pub fn probe_any<T>(&self, items: &[T], key: &Key) -> Result<bool>
    where
        T: AsRef<[u8]>,
    {
        if items.is_empty() {
            return Ok(false);
        }
        let mut candidates: Vec<u64> = items
            .iter()
            .map(|item| self.search_value(key, item.as_ref()))
            .collect();
        candidates.sort_unstable();

        let mut reader = BitReader::new(&self.data);
        let mut last_value = 0u64;
        let mut decoded = 0usize;
        let mut value = match self.decode_entry(&mut reader, last_value, &mut decoded)? {
            Some(value) => value,
            None => return Ok(false),
        };

        let mut pos = 0usize;
        loop {
            match candidates[pos].cmp(&value) {
                Ordering::Equal => return Ok(true),
                Ordering::Less => {
                    pos += 1;
                    if pos == candidates.len() {
                        return Ok(false);
                    }
                }
                Ordering::Greater => {
                    last_value = value;
                    match self.decode_entry(&mut reader, last_value, &mut decoded)? {
                        Some(next) => value = next,
                        None => return Ok(false),
                    }
                }
            }
        }
    }

    /// Decodes the next filter entry, or `None` once all `n` entries have
    /// been consumed.
    fn decode_entry(
        &self,
        reader: &mut BitReader<'_>,
        last_value: u64,
        decoded: &mut usize,
    ) -> Result<Option<u64>> {
        if *decoded == self.n {
            return Ok(None);
        }
        let value = rice::decode_next(reader, self.p, last_value)
            .map_err(|err| as_corruption(err, "decoding entry"))?;
        *decoded += 1;
        Ok(Some(value))
    }
}

/// Maps stream exhaustion inside an `n`-bounded walk to a corruption error.
///
/// A well-formed blob always holds `n` complete codes, so running out of bits
/// mid-walk means the blob is truncated or garbled; it is never how a lookup
/// legitimately terminates.
fn as_corruption(err: Error, context: &str) -> Error {
    if err.is_stream_exhausted() {
        Error::invalid_format(
            "filter data",
            format!("encoded stream ended while {context}"),
        )
    } else {
        err
    }
}
