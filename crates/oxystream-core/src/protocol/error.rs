use thiserror::Error;

/// Errors returned by payload parsing and sample decoding.
///
/// Every variant is fatal for the packet that produced it: a sub-record
/// that under- or over-consumes bytes desynchronizes all sub-records that
/// follow it, so callers must not continue walking the same payload.
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("payload too short: need {needed} bytes, got {actual}")]
    TooShort { needed: usize, actual: usize },
    #[error("sub-record at offset {offset} declares size {size}, payload is {payload_len} bytes")]
    BadSubRecordSize {
        offset: usize,
        size: u32,
        payload_len: usize,
    },
    #[error("sample data truncated: need {needed} bytes for {count} samples, got {actual}")]
    SampleDataTruncated {
        needed: usize,
        count: u32,
        actual: usize,
    },
    #[error(
        "sample geometry overflows: {sample_count} samples of dimension {dimension} with {element_size}-byte elements"
    )]
    SampleGeometryOverflow {
        dimension: u32,
        sample_count: u32,
        element_size: usize,
    },
    #[error("channel config is not valid UTF-8")]
    ConfigNotUtf8,
    #[error("channel config XML parse error: {0}")]
    ConfigXml(#[from] roxmltree::Error),
}
