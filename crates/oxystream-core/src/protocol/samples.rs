//! Sample decode paths.
//!
//! Four paths selected by (sync/async) x (scalar/array). Scaling applies
//! to sync scalar samples only; sync arrays, async scalars and async
//! arrays are emitted unscaled, matching the wire producer's established
//! behavior. The asymmetry is pinned by tests.

use tracing::warn;

use super::dtype::ChannelDataType;
use super::error::ProtocolError;
use super::parser::{AsyncFixedHeader, SyncFixedHeader};
use crate::{DecodedChannelBlock, ScalingEntry};

/// Decode one element from an exact-size little-endian byte group.
///
/// 24-bit integers have no native 3-byte type: byte 0 is the low byte,
/// byte 1 the middle, byte 2 the high byte; the signed variant
/// sign-extends the high byte before combination.
fn element_value(data_type: ChannelDataType, bytes: &[u8]) -> f64 {
    match data_type {
        ChannelDataType::Int8 => bytes[0] as i8 as f64,
        ChannelDataType::UInt8 => bytes[0] as f64,
        ChannelDataType::Int16 => i16::from_le_bytes([bytes[0], bytes[1]]) as f64,
        ChannelDataType::UInt16 => u16::from_le_bytes([bytes[0], bytes[1]]) as f64,
        ChannelDataType::Int24 => {
            let high = bytes[2] as i8 as i32;
            (high * 65536 + bytes[1] as i32 * 256 + bytes[0] as i32) as f64
        }
        ChannelDataType::UInt24 => {
            (bytes[2] as u32 * 65536 + bytes[1] as u32 * 256 + bytes[0] as u32) as f64
        }
        ChannelDataType::Int32 => {
            i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64
        }
        ChannelDataType::UInt32 => {
            u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64
        }
        ChannelDataType::Int64 => i64::from_le_bytes([
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
        ]) as f64,
        ChannelDataType::UInt64 => u64::from_le_bytes([
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
        ]) as f64,
        ChannelDataType::Float32 => {
            f32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as f64
        }
        ChannelDataType::Float64 => f64::from_le_bytes([
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
        ]),
        // Undecodable types are filtered out before element decode.
        ChannelDataType::Complex64 | ChannelDataType::Complex128 | ChannelDataType::Unknown(_) => {
            0.0
        }
    }
}

fn undecodable(data_type: ChannelDataType, dimension: u32, sample_count: u32) -> bool {
    if !data_type.is_decodable() {
        warn!(?data_type, "data type has no decode path, emitting empty block");
        return true;
    }
    if sample_count == 0 || dimension == 0 {
        warn!(sample_count, dimension, "no data received for sub-record");
        return true;
    }
    false
}

/// Compute (bytes per record, total bytes) for a declared geometry.
///
/// Dimension and sample count come straight off the wire, so the
/// products are checked; an overflowing geometry can never be satisfied
/// by a real payload and is reported instead of wrapping.
fn record_span(
    dimension: u32,
    sample_count: u32,
    element_size: usize,
    timestamp_size: usize,
) -> Result<(usize, usize), ProtocolError> {
    let record = (dimension as usize)
        .checked_mul(element_size)
        .and_then(|values| values.checked_add(timestamp_size));
    let total = record.and_then(|record| record.checked_mul(sample_count as usize));
    match (record, total) {
        (Some(record), Some(total)) => Ok((record, total)),
        _ => Err(ProtocolError::SampleGeometryOverflow {
            dimension,
            sample_count,
            element_size,
        }),
    }
}

fn require_sample_bytes(
    samples: &[u8],
    needed: usize,
    sample_count: u32,
) -> Result<(), ProtocolError> {
    if samples.len() < needed {
        return Err(ProtocolError::SampleDataTruncated {
            needed,
            count: sample_count,
            actual: samples.len(),
        });
    }
    Ok(())
}

/// Decode a sync-fixed sub-record into time-tagged rows.
///
/// Per-sample time is the arithmetic progression
/// `(start_timestamp + i) / frequency`. Scalar values are converted to
/// f64 and scaled `value * factor + offset`; rows of multi-dimensional
/// channels carry their `dimension` values unscaled.
///
/// # Errors
/// Returns `ProtocolError::SampleDataTruncated` when the raw span is
/// shorter than the declared sample count requires, and
/// `ProtocolError::SampleGeometryOverflow` when the declared dimension
/// and count cannot describe a real payload.
pub fn decode_sync_fixed(
    header: &SyncFixedHeader,
    samples: &[u8],
    scaling: ScalingEntry,
) -> Result<DecodedChannelBlock, ProtocolError> {
    if undecodable(header.data_type, header.dimension, header.sample_count) {
        return Ok(DecodedChannelBlock::empty());
    }
    let elem = header.data_type.wire_size();
    let dim = header.dimension as usize;
    let (group, needed) = record_span(header.dimension, header.sample_count, elem, 0)?;
    require_sample_bytes(samples, needed, header.sample_count)?;

    let sample_time =
        |i: usize| header.start_timestamp.wrapping_add(i as u64) as f64 / header.frequency;

    let rows = samples[..needed]
        .chunks_exact(group)
        .enumerate()
        .map(|(i, group_bytes)| {
            let mut row = Vec::with_capacity(dim + 1);
            row.push(sample_time(i));
            if dim == 1 {
                let value = element_value(header.data_type, group_bytes);
                row.push(value * scaling.factor + scaling.offset);
            } else {
                row.extend(
                    group_bytes
                        .chunks_exact(elem)
                        .map(|bytes| element_value(header.data_type, bytes)),
                );
            }
            row
        })
        .collect();
    Ok(DecodedChannelBlock { rows })
}

/// Decode an async-fixed sub-record into time-tagged rows.
///
/// Scalar rows are `[timestamp / frequency, value]`; array rows are
/// `[timestamp in raw ticks, value_0 .. value_{dim-1}]`. Neither path
/// applies scaling.
///
/// # Errors
/// Returns `ProtocolError::SampleDataTruncated` when the raw span is
/// shorter than the declared sample count requires, and
/// `ProtocolError::SampleGeometryOverflow` when the declared dimension
/// and count cannot describe a real payload.
pub fn decode_async_fixed(
    header: &AsyncFixedHeader,
    samples: &[u8],
) -> Result<DecodedChannelBlock, ProtocolError> {
    if undecodable(header.data_type, header.dimension, header.sample_count) {
        return Ok(DecodedChannelBlock::empty());
    }
    let elem = header.data_type.wire_size();
    let dim = header.dimension as usize;
    let (record, needed) = record_span(header.dimension, header.sample_count, elem, 8)?;
    require_sample_bytes(samples, needed, header.sample_count)?;

    let rows = samples[..needed]
        .chunks_exact(record)
        .map(|record_bytes| {
            let ticks = u64::from_le_bytes([
                record_bytes[0],
                record_bytes[1],
                record_bytes[2],
                record_bytes[3],
                record_bytes[4],
                record_bytes[5],
                record_bytes[6],
                record_bytes[7],
            ]);
            let mut row = Vec::with_capacity(dim + 1);
            if dim == 1 {
                row.push(ticks as f64 / header.frequency);
                row.push(element_value(header.data_type, &record_bytes[8..]));
            } else {
                row.push(ticks as f64);
                row.extend(
                    record_bytes[8..]
                        .chunks_exact(elem)
                        .map(|bytes| element_value(header.data_type, bytes)),
                );
            }
            row
        })
        .collect();
    Ok(DecodedChannelBlock { rows })
}
