//! Golomb-Rice coding of non-decreasing value sequences.
//!
//! Values are delta-coded against the previously encoded value and each delta
//! is split under the modulus `1 << p`: the quotient goes out in unary (a run
//! of ones closed by a zero), the remainder in exactly `p` binary bits. The
//! decoder is resumable: given any previously decoded value and the bit
//! position of the code that follows it, [`decode_next`] picks up mid-stream,
//! which is what the sparse checkpoint index relies on.

use crate::bitstream::{BitRead, BitStream};
use sift_common::{Result, verify_arg};

/// Smallest supported Golomb-Rice parameter.
pub const MIN_P: u8 = 1;

/// Largest supported Golomb-Rice parameter: the remainder must leave room in
/// a 64-bit value for at least one quotient step.
pub const MAX_P: u8 = 63;

/// Encodes one value against the previously encoded one.
///
/// `last_value` must be the value passed on the previous call (zero for the
/// first), and `value` must not be below it.
pub fn encode_one(stream: &mut BitStream, value: u64, last_value: u64, p: u8) -> Result<()> {
    debug_assert!((MIN_P..=MAX_P).contains(&p));
    verify_arg!(value, value >= last_value);
    let diff = value - last_value;
    let remainder = diff & ((1u64 << p) - 1);
    let mut quotient = (diff - remainder) >> p;
    while quotient > 0 {
        stream.write_bit(true);
        quotient -= 1;
    }
    stream.write_bit(false);
    stream.write_bits(remainder, p as usize)
}

/// Encodes a non-decreasing sequence of values into `stream`.
pub fn encode(stream: &mut BitStream, sorted_values: &[u64], p: u8) -> Result<()> {
    verify_arg!(p, (MIN_P..=MAX_P).contains(&p));
    let mut last_value = 0u64;
    for &value in sorted_values {
        encode_one(stream, value, last_value, p)?;
        last_value = value;
    }
    Ok(())
}

/// Decodes the next value from `reader`, delta-coded against `last_value`.
///
/// The unary quotient run is unbounded; arbitrarily long runs of ones are
/// well-formed and never capped.
pub fn decode_next<R: BitRead>(reader: &mut R, p: u8, last_value: u64) -> Result<u64> {
    debug_assert!((MIN_P..=MAX_P).contains(&p));
    let mut quotient = 0u64;
    while reader.read_bit()? {
        quotient += 1;
    }
    let remainder = reader.read_bits(p as usize)?;
    Ok(last_value + (quotient << p) + remainder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::bitstream::BitReader;

    fn round_trip(values: &[u64], p: u8) {
        let mut stream = BitStream::new();
        encode(&mut stream, values, p).unwrap();
        let bytes = stream.into_bytes();

        let mut reader = BitReader::new(&bytes);
        let mut last_value = 0u64;
        for &expected in values {
            let value = decode_next(&mut reader, p, last_value).unwrap();
            assert_eq!(value, expected, "p={p}");
            last_value = value;
        }
    }

    fn random_sorted_values(rng: &mut fastrand::Rng, count: usize, max: u64) -> Vec<u64> {
        let mut values: Vec<u64> = (0..count).map(|_| rng.u64(..max)).collect();
        values.sort_unstable();
        values
    }

    #[test]
    fn round_trips_fixed_sequences() {
        round_trip(&[0], 1);
        round_trip(&[0, 0, 0], 8);
        round_trip(&[1, 2, 3, 4, 5], 2);
        round_trip(&[100, 100, 5000, 5000, 1 << 24], 16);
        round_trip(&[u64::MAX >> 2], 50);
    }

    #[test]
    fn round_trips_random_sequences_across_parameters() {
        let mut rng = fastrand::Rng::with_seed(0x6010_4B21);
        for &p in &[1u8, 2, 5, 8, 16, 20, 32, 63] {
            for _ in 0..20 {
                let count = rng.usize(1..200);
                // Keep the value domain proportional to `count << p` so the
                // unary quotient runs stay short, as they do for real filters.
                let max = (((count as u128) << p).min(1u128 << 62)) as u64;
                let values = random_sorted_values(&mut rng, count, max);
                round_trip(&values, p);
            }
        }
    }

    #[test]
    fn zero_diff_is_terminator_plus_zero_remainder() {
        // diff = 0: no unary ones, one terminating zero, p zero remainder bits.
        let p = 16u8;
        let mut stream = BitStream::new();
        encode(&mut stream, &[0], p).unwrap();
        assert_eq!(stream.bit_len(), p as usize + 1);
        assert!(stream.into_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn quotient_runs_are_not_capped() {
        // A delta of 300 << p yields a 300-bit unary run.
        let p = 4u8;
        let value = 300u64 << p;
        let mut stream = BitStream::new();
        encode(&mut stream, &[value], p).unwrap();
        assert_eq!(stream.bit_len(), 300 + 1 + p as usize);

        let bytes = stream.into_bytes();
        let mut reader = BitReader::new(&bytes);
        assert_eq!(decode_next(&mut reader, p, 0).unwrap(), value);
    }

    #[test]
    fn decoding_resumes_from_recorded_position() {
        let p = 8u8;
        let values = [3u64, 77, 512, 513, 9000, 100_000];
        let mut stream = BitStream::new();

        // Encode the first half, record the resume point, encode the rest.
        encode(&mut stream, &values[..3], p).unwrap();
        let resume_pos = stream.bit_len();
        let mut last_value = values[2];
        for &value in &values[3..] {
            encode_one(&mut stream, value, last_value, p).unwrap();
            last_value = value;
        }

        let bytes = stream.into_bytes();
        let mut reader = BitReader::new(&bytes);
        reader.seek(resume_pos).unwrap();
        let mut last_value = values[2];
        for &expected in &values[3..] {
            last_value = decode_next(&mut reader, p, last_value).unwrap();
            assert_eq!(last_value, expected);
        }
    }

    #[test]
    fn rejects_descending_input() {
        let mut stream = BitStream::new();
        assert!(encode(&mut stream, &[10, 5], 8).is_err());
    }

    #[test]
    fn rejects_parameter_outside_domain() {
        let mut stream = BitStream::new();
        assert!(encode(&mut stream, &[1], 0).is_err());
        assert!(encode(&mut stream, &[1], 64).is_err());
    }

    #[test]
    fn truncated_stream_fails_mid_code() {
        let p = 8u8;
        let mut stream = BitStream::new();
        encode(&mut stream, &[300], p).unwrap();
        let mut bytes = stream.into_bytes();
        bytes.truncate(1);

        let mut reader = BitReader::new(&bytes);
        let err = decode_next(&mut reader, p, 0).unwrap_err();
        assert!(err.is_stream_exhausted());
    }
}
