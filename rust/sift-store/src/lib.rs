//! Persistence of filter sequences to byte streams.
//!
//! The filter core deliberately knows nothing about storage: a filter's blob
//! is the raw Golomb-Rice bit stream, and its metadata (`p`, `n`) travels out
//! of band. This crate supplies the framing: a store is a flat sequence of
//! length-prefixed records, each carrying one filter's metadata and blob,
//! written to any [`std::io::Write`] and read back from any [`std::io::Read`].
//!
//! Record layout, little-endian:
//!
//! ```text
//! p: u8 | n: u32 | data_len: u32 | data: [u8; data_len]
//! ```
//!
//! Reading distinguishes the clean end of a store (EOF between records, which
//! ends iteration) from EOF inside a record, which is reported as corruption.
//! Filters come back unindexed; callers that want checkpoint-seek queries
//! rebuild the index with [`Filter::from_encoded_indexed`].

use std::io::{ErrorKind as IoErrorKind, Read, Write};

use byteorder::{LittleEndian, ReadBytesExt, WriteBytesExt};

use sift_common::{Result, error::Error, verify_arg};
use sift_filters::Filter;

/// Appends filter records to an underlying writer.
pub struct FilterStoreWriter<W: Write> {
    inner: W,
}

impl<W: Write> FilterStoreWriter<W> {
    pub fn new(inner: W) -> FilterStoreWriter<W> {
        FilterStoreWriter { inner }
    }

    /// Writes one filter record.
    pub fn put(&mut self, filter: &Filter) -> Result<()> {
        verify_arg!(filter, filter.n() as u64 <= u32::MAX as u64);
        verify_arg!(filter, filter.data().len() as u64 <= u32::MAX as u64);

        let io_err = |e| Error::io("writing filter record", e);
        self.inner.write_u8(filter.p()).map_err(io_err)?;
        self.inner
            .write_u32::<LittleEndian>(filter.n() as u32)
            .map_err(io_err)?;
        self.inner
            .write_u32::<LittleEndian>(filter.data().len() as u32)
            .map_err(io_err)?;
        self.inner.write_all(filter.data()).map_err(io_err)
    }

    /// Flushes and returns the underlying writer.
    pub fn into_inner(mut self) -> Result<W> {
        self.inner
            .flush()
            .map_err(|e| Error::io("flushing filter store", e))?;
        Ok(self.inner)
    }
}

/// Reads filter records back in insertion order.
///
/// Iterate to obtain each stored [`Filter`]; iteration ends at the end of the
/// underlying stream.
pub struct FilterStoreReader<R: Read> {
    inner: R,
}

impl<R: Read> FilterStoreReader<R> {
    pub fn new(inner: R) -> FilterStoreReader<R> {
        FilterStoreReader { inner }
    }

    fn read_record(&mut self) -> Result<Option<Filter>> {
        // EOF on the first byte of a record is the clean end of the store;
        // EOF anywhere later is a truncated record.
        let p = match self.inner.read_u8() {
            Ok(p) => p,
            Err(e) if e.kind() == IoErrorKind::UnexpectedEof => return Ok(None),
            Err(e) => return Err(Error::io("reading filter record", e)),
        };
        let n = self.inner.read_u32::<LittleEndian>().map_err(truncated)?;
        let data_len = self.inner.read_u32::<LittleEndian>().map_err(truncated)?;

        let mut data = vec![0u8; data_len as usize];
        self.inner.read_exact(&mut data).map_err(truncated)?;

        Filter::from_encoded(p, n as usize, data).map(Some)
    }
}

fn truncated(e: std::io::Error) -> Error {
    if e.kind() == IoErrorKind::UnexpectedEof {
        Error::invalid_format("filter store", "stream ended inside a record")
    } else {
        Error::io("reading filter record", e)
    }
}

impl<R: Read> Iterator for FilterStoreReader<R> {
    type Item = Result<Filter>;

    fn next(&mut self) -> Option<Result<Filter>> {
        self.read_record().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sift_common::error::ErrorKind;
    use sift_filters::{FilterBuilder, Key};
    use std::io::Cursor;

    fn test_key() -> Key {
        [0, 1, 2, 3, 4, 5, 6, 7, 8, 9, 10, 11, 12, 13, 14, 15]
    }

    fn sample_filter(prefix: &str, count: usize) -> Filter {
        let items: Vec<Vec<u8>> = (0..count)
            .map(|i| format!("{prefix}_{i:04}").into_bytes())
            .collect();
        FilterBuilder::new(16).build(&test_key(), &items).unwrap()
    }

    #[test]
    fn round_trips_filters_in_order() {
        let first = sample_filter("first", 10);
        let second = sample_filter("second", 35);

        let mut writer = FilterStoreWriter::new(Vec::new());
        writer.put(&first).unwrap();
        writer.put(&second).unwrap();
        let bytes = writer.into_inner().unwrap();

        let filters: Vec<Filter> = FilterStoreReader::new(Cursor::new(bytes))
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(filters.len(), 2);
        assert_eq!(filters[0].n(), 10);
        assert_eq!(filters[1].n(), 35);
        assert_eq!(filters[0].data(), first.data());
        assert_eq!(filters[1].data(), second.data());
    }

    #[test]
    fn restored_filters_answer_probes() {
        let filter = sample_filter("probe", 100);
        let mut writer = FilterStoreWriter::new(Vec::new());
        writer.put(&filter).unwrap();
        let bytes = writer.into_inner().unwrap();

        let restored = FilterStoreReader::new(Cursor::new(bytes))
            .next()
            .unwrap()
            .unwrap();
        for i in 0..100 {
            let item = format!("probe_{i:04}").into_bytes();
            assert!(restored.probe(&item, &test_key()).unwrap());
        }
    }

    #[test]
    fn empty_store_yields_nothing() {
        let mut reader = FilterStoreReader::new(Cursor::new(Vec::new()));
        assert!(reader.next().is_none());
    }

    #[test]
    fn truncation_inside_a_record_is_corruption() {
        let filter = sample_filter("trunc", 20);
        let mut writer = FilterStoreWriter::new(Vec::new());
        writer.put(&filter).unwrap();
        let mut bytes = writer.into_inner().unwrap();
        bytes.truncate(bytes.len() - 3);

        let result = FilterStoreReader::new(Cursor::new(bytes)).next().unwrap();
        let err = result.unwrap_err();
        assert!(matches!(err.kind(), ErrorKind::InvalidFormat { .. }));
    }

    #[test]
    fn round_trips_through_a_file() {
        let first = sample_filter("file_a", 50);
        let second = sample_filter("file_b", 75);

        let file = tempfile::tempfile().unwrap();
        let mut writer = FilterStoreWriter::new(file);
        writer.put(&first).unwrap();
        writer.put(&second).unwrap();
        let mut file = writer.into_inner().unwrap();

        use std::io::Seek;
        file.seek(std::io::SeekFrom::Start(0)).unwrap();
        let filters: Vec<Filter> = FilterStoreReader::new(file)
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(filters.len(), 2);
        assert_eq!(filters[0].n(), 50);
        assert_eq!(filters[1].n(), 75);
    }
}
