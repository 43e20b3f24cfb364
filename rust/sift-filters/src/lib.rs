//! Golomb-coded set (GCS) filter support for Sift.
//!
//! A GCS filter reduces a set of byte-string items to a compact, queryable
//! blob: membership probes have no false negatives and a tunable false
//! positive rate of about `1 / 2^p`. The intended shape of use is one filter
//! per large item collection (e.g. per-block script sets served to light
//! blockchain clients), built once and queried many times by many parties.
//!
//! The crate provides:
//!
//! - The bit-level stream primitives used to pack and unpack variable-width
//!   codes ([`bitstream`])
//! - Division-free reduction of 64-bit hashes into a bounded domain
//!   ([`reduce`])
//! - The Golomb-Rice delta codec over sorted value sequences ([`rice`])
//! - Filter construction from keyed item sets ([`builder`]) and the immutable
//!   query side with single and batch probes ([`filter`])
//! - An optional sparse checkpoint index that turns linear-scan probes into
//!   seek-and-scan probes ([`index`])

pub mod bitstream;
pub mod builder;
pub mod config;
pub mod filter;
pub mod hash;
pub mod index;
pub mod reduce;
pub mod rice;


pub use builder::FilterBuilder;
pub use config::{DEFAULT_INDEX_GRANULARITY, DEFAULT_P, FilterConfig};
pub use filter::Filter;
pub use hash::{KEY_SIZE, Key};
