//! Keyed item hashing.
//!
//! Items are mapped to 64-bit values with SipHash-2-4 under a 16-byte key.
//! The hash is the only randomized ingredient of a filter: the same key must
//! be supplied at build time and at query time, and filters produced under
//! different keys are not comparable.

use siphasher::sip::SipHasher24;
use std::hash::Hasher;

/// Size of a filter key in bytes.
pub const KEY_SIZE: usize = 16;

/// A 16-byte SipHash key shared between a filter's builder and its queries.
pub type Key = [u8; KEY_SIZE];

/// Hashes `item` with SipHash-2-4 keyed by `key`.
#[inline]
pub fn keyed_hash(key: &Key, item: &[u8]) -> u64 {
    let mut hasher = SipHasher24::new_with_key(key);
    hasher.write(item);
    hasher.finish()
}
