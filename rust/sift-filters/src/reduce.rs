//! Hash-to-range reduction without division.
//!
//! Maps a uniformly distributed 64-bit hash into `[0, range)` by taking the
//! high 64 bits of the 128-bit product `hash * range`, i.e.
//! `floor(hash * range / 2^64)`. Unlike `hash % range` this needs no division
//! and carries no modulo bias, which keeps the reduced values uniformly spread
//! over the target domain.

/// Splits `range` into the high/low 32-bit halves consumed by [`reduce`].
#[inline]
pub fn split_range(range: u64) -> (u64, u64) {
    (range >> 32, range & 0xFFFF_FFFF)
}

/// Reduces `hash` into `[0, range)` where `range = (range_hi << 32) | range_lo`.
///
/// Computes the exact high 64 bits of the widened product from 32-bit halves:
/// the four cross products are summed with the carry propagated out of the two
/// middle terms and the high half of the low term. Bit-exact with native
/// 128-bit multiplication for all inputs.
#[inline]
pub fn reduce(hash: u64, range_hi: u64, range_lo: u64) -> u64 {
    let hash_hi = hash >> 32;
    let hash_lo = hash & 0xFFFF_FFFF;

    let top = hash_hi * range_hi;
    let mid_a = hash_hi * range_lo;
    let mid_b = range_hi * hash_lo;
    let bottom = hash_lo * range_lo;

    let carry = ((mid_a & 0xFFFF_FFFF) + (mid_b & 0xFFFF_FFFF) + (bottom >> 32)) >> 32;

    top + (mid_a >> 32) + (mid_b >> 32) + carry
}
