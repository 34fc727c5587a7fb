use serde::{Deserialize, Serialize};
use tracing::debug;

use super::dtype::ChannelDataType;
use super::error::ProtocolError;
use super::layout;
use super::reader::PayloadReader;

/// Closed dispatch over the seven known sub-record type codes.
///
/// `SyncVariable` and `AsyncVariable` are valid codes with no decode path
/// in this core; they are skipped size-consistently by the walker's caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubRecordType {
    PacketInfo,
    XmlConfig,
    SyncFixed,
    SyncVariable,
    AsyncFixed,
    AsyncVariable,
    Footer,
    Unknown(u32),
}

impl SubRecordType {
    pub fn from_code(code: u32) -> Self {
        match code {
            layout::SBT_PACKET_INFO => SubRecordType::PacketInfo,
            layout::SBT_XML_CONFIG => SubRecordType::XmlConfig,
            layout::SBT_SYNC_FIXED => SubRecordType::SyncFixed,
            layout::SBT_SYNC_VARIABLE => SubRecordType::SyncVariable,
            layout::SBT_ASYNC_FIXED => SubRecordType::AsyncFixed,
            layout::SBT_ASYNC_VARIABLE => SubRecordType::AsyncVariable,
            layout::SBT_PACKET_FOOTER => SubRecordType::Footer,
            other => SubRecordType::Unknown(other),
        }
    }
}

/// One self-describing segment of a packet payload.
#[derive(Debug)]
pub struct SubRecord<'a> {
    pub kind: SubRecordType,
    /// Body bytes after the 8-byte sub-record header.
    pub body: &'a [u8],
}

/// Walk the payload from offset 0, yielding sub-records in wire order.
///
/// The walk terminates at the payload end or after yielding a footer
/// sub-record. A zero or oversized length field yields a
/// [`ProtocolError::BadSubRecordSize`] and ends the walk: the declared
/// sizes must exactly partition the payload, and a bad size would
/// desynchronize everything after it.
pub fn sub_records(payload: &[u8]) -> SubRecordWalker<'_> {
    SubRecordWalker {
        payload,
        offset: 0,
        done: false,
    }
}

pub struct SubRecordWalker<'a> {
    payload: &'a [u8],
    offset: usize,
    done: bool,
}

impl<'a> Iterator for SubRecordWalker<'a> {
    type Item = Result<SubRecord<'a>, ProtocolError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done || self.offset >= self.payload.len() {
            return None;
        }
        match self.next_record() {
            Ok(record) => Some(Ok(record)),
            Err(err) => {
                self.done = true;
                Some(Err(err))
            }
        }
    }
}

impl<'a> SubRecordWalker<'a> {
    fn next_record(&mut self) -> Result<SubRecord<'a>, ProtocolError> {
        let reader = PayloadReader::new(self.payload);
        let size = reader.read_u32_le(self.offset)? as usize;
        let code = reader.read_u32_le(self.offset + 4)?;
        if size < layout::SUBRECORD_HEADER_SIZE || self.offset + size > self.payload.len() {
            return Err(ProtocolError::BadSubRecordSize {
                offset: self.offset,
                size: size as u32,
                payload_len: self.payload.len(),
            });
        }
        let body = reader.read_slice(
            self.offset + layout::SUBRECORD_HEADER_SIZE,
            size - layout::SUBRECORD_HEADER_SIZE,
        )?;
        self.offset += size;
        let kind = SubRecordType::from_code(code);
        if kind == SubRecordType::Footer {
            self.done = true;
        }
        Ok(SubRecord { kind, body })
    }
}

/// Stream metadata carried once per packet in the packet-info sub-record.
///
/// Plain value aggregate, constructed fresh for every packet. Callers poll
/// `stream_status` after each packet to detect end-of-stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PacketInfo {
    pub protocol_version: u32,
    pub stream_id: u32,
    pub sequence_number: u32,
    pub stream_status: u32,
    pub seed: u32,
    pub sub_record_count: u32,
}

impl PacketInfo {
    pub fn is_first_packet(&self) -> bool {
        self.stream_status & layout::STATUS_FIRST_PACKET != 0
    }

    pub fn is_last_packet(&self) -> bool {
        self.stream_status & layout::STATUS_LAST_PACKET != 0
    }

    pub fn has_error(&self) -> bool {
        self.stream_status & layout::STATUS_ERROR_PACKET != 0
    }
}

/// Parse the 24-byte packet-info body.
///
/// # Errors
/// Returns `ProtocolError::TooShort` when the body is truncated.
pub fn parse_packet_info(body: &[u8]) -> Result<PacketInfo, ProtocolError> {
    let reader = PayloadReader::new(body);
    reader.require_len(layout::PACKET_INFO_SIZE)?;
    let info = PacketInfo {
        protocol_version: reader.read_u32_le(0)?,
        stream_id: reader.read_u32_le(4)?,
        sequence_number: reader.read_u32_le(8)?,
        stream_status: reader.read_u32_le(12)?,
        seed: reader.read_u32_le(16)?,
        sub_record_count: reader.read_u32_le(20)?,
    };
    debug!(
        version = format_args!("{:#x}", info.protocol_version),
        stream_id = info.stream_id,
        sequence = info.sequence_number,
        status = format_args!("{:#x}", info.stream_status),
        seed = format_args!("{:#x}", info.seed),
        sub_records = info.sub_record_count,
        "packet info"
    );
    Ok(info)
}

/// Fixed-layout header of a synchronous channel sub-record.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SyncFixedHeader {
    pub data_type: ChannelDataType,
    pub dimension: u32,
    pub sample_count: u32,
    /// Start timestamp in timebase ticks; sample `i` lands at
    /// `(start_timestamp + i) / frequency` seconds.
    pub start_timestamp: u64,
    /// Timebase frequency in Hz.
    pub frequency: f64,
}

/// Fixed-layout header of an asynchronous channel sub-record. Each sample
/// carries its own 64-bit timestamp inline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AsyncFixedHeader {
    pub data_type: ChannelDataType,
    pub dimension: u32,
    pub sample_count: u32,
    pub frequency: f64,
}

/// Split a sync-fixed body into its header and raw sample bytes.
///
/// # Errors
/// Returns `ProtocolError::TooShort` when the 28-byte header is truncated.
pub fn parse_sync_fixed(body: &[u8]) -> Result<(SyncFixedHeader, &[u8]), ProtocolError> {
    let reader = PayloadReader::new(body);
    reader.require_len(layout::SYNC_FIXED_HEADER_SIZE)?;
    let header = SyncFixedHeader {
        data_type: ChannelDataType::from_code(reader.read_u32_le(0)?),
        dimension: reader.read_u32_le(4)?,
        sample_count: reader.read_u32_le(8)?,
        start_timestamp: reader.read_u64_le(12)?,
        frequency: reader.read_f64_le(20)?,
    };
    let samples = reader.tail(layout::SYNC_FIXED_HEADER_SIZE)?;
    Ok((header, samples))
}

/// Split an async-fixed body into its header and raw sample bytes.
///
/// # Errors
/// Returns `ProtocolError::TooShort` when the 20-byte header is truncated.
pub fn parse_async_fixed(body: &[u8]) -> Result<(AsyncFixedHeader, &[u8]), ProtocolError> {
    let reader = PayloadReader::new(body);
    reader.require_len(layout::ASYNC_FIXED_HEADER_SIZE)?;
    let header = AsyncFixedHeader {
        data_type: ChannelDataType::from_code(reader.read_u32_le(0)?),
        dimension: reader.read_u32_le(4)?,
        sample_count: reader.read_u32_le(8)?,
        frequency: reader.read_f64_le(12)?,
    };
    let samples = reader.tail(layout::ASYNC_FIXED_HEADER_SIZE)?;
    Ok((header, samples))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sub_record(code: u32, body: &[u8]) -> Vec<u8> {
        let mut bytes = Vec::new();
        bytes.extend_from_slice(&((body.len() + layout::SUBRECORD_HEADER_SIZE) as u32).to_le_bytes());
        bytes.extend_from_slice(&code.to_le_bytes());
        bytes.extend_from_slice(body);
        bytes
    }

    #[test]
    fn walker_yields_records_in_wire_order() {
        let mut payload = sub_record(layout::SBT_PACKET_INFO, &[0u8; 24]);
        payload.extend(sub_record(layout::SBT_SYNC_FIXED, &[1u8; 28]));

        let records: Vec<_> = sub_records(&payload).map(Result::unwrap).collect();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].kind, SubRecordType::PacketInfo);
        assert_eq!(records[1].kind, SubRecordType::SyncFixed);
        assert_eq!(records[1].body, &[1u8; 28]);
    }

    #[test]
    fn walker_stops_after_footer() {
        let mut payload = sub_record(layout::SBT_PACKET_FOOTER, &[]);
        payload.extend(sub_record(layout::SBT_PACKET_INFO, &[0u8; 24]));

        let records: Vec<_> = sub_records(&payload).map(Result::unwrap).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, SubRecordType::Footer);
    }

    #[test]
    fn walker_passes_unknown_types_through() {
        let payload = sub_record(0x99, &[0xaa; 4]);
        let records: Vec<_> = sub_records(&payload).map(Result::unwrap).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].kind, SubRecordType::Unknown(0x99));
    }

    #[test]
    fn zero_size_is_a_framing_error() {
        let mut payload = sub_record(layout::SBT_PACKET_INFO, &[0u8; 24]);
        payload[0..4].copy_from_slice(&0u32.to_le_bytes());

        let err = sub_records(&payload).next().unwrap().unwrap_err();
        assert!(matches!(
            err,
            ProtocolError::BadSubRecordSize { offset: 0, size: 0, .. }
        ));
    }

    #[test]
    fn oversized_record_is_a_framing_error() {
        let mut payload = sub_record(layout::SBT_PACKET_INFO, &[0u8; 24]);
        payload[0..4].copy_from_slice(&1000u32.to_le_bytes());

        let err = sub_records(&payload).next().unwrap().unwrap_err();
        assert!(matches!(err, ProtocolError::BadSubRecordSize { size: 1000, .. }));
    }

    #[test]
    fn walker_ends_walk_after_error() {
        let mut payload = sub_record(layout::SBT_PACKET_INFO, &[0u8; 24]);
        payload[0..4].copy_from_slice(&0u32.to_le_bytes());

        let mut walker = sub_records(&payload);
        assert!(walker.next().unwrap().is_err());
        assert!(walker.next().is_none());
    }

    #[test]
    fn parse_packet_info_fields() {
        let mut body = Vec::new();
        for field in [0x0105_0000u32, 7, 42, 0x3, 0xdead, 5] {
            body.extend_from_slice(&field.to_le_bytes());
        }
        let info = parse_packet_info(&body).unwrap();
        assert_eq!(info.protocol_version, layout::PROTOCOL_VERSION);
        assert_eq!(info.stream_id, 7);
        assert_eq!(info.sequence_number, 42);
        assert!(info.is_first_packet());
        assert!(info.is_last_packet());
        assert!(!info.has_error());
        assert_eq!(info.seed, 0xdead);
        assert_eq!(info.sub_record_count, 5);
    }

    #[test]
    fn parse_packet_info_rejects_short_body() {
        let err = parse_packet_info(&[0u8; 23]).unwrap_err();
        assert!(matches!(err, ProtocolError::TooShort { needed: 24, .. }));
    }

    #[test]
    fn parse_sync_fixed_splits_header_and_samples() {
        let mut body = Vec::new();
        body.extend_from_slice(&10u32.to_le_bytes()); // float32
        body.extend_from_slice(&1u32.to_le_bytes());
        body.extend_from_slice(&2u32.to_le_bytes());
        body.extend_from_slice(&100u64.to_le_bytes());
        body.extend_from_slice(&1000.0f64.to_le_bytes());
        body.extend_from_slice(&1.0f32.to_le_bytes());
        body.extend_from_slice(&2.0f32.to_le_bytes());

        let (header, samples) = parse_sync_fixed(&body).unwrap();
        assert_eq!(header.data_type, ChannelDataType::Float32);
        assert_eq!(header.dimension, 1);
        assert_eq!(header.sample_count, 2);
        assert_eq!(header.start_timestamp, 100);
        assert_eq!(header.frequency, 1000.0);
        assert_eq!(samples.len(), 8);
    }

    #[test]
    fn parse_async_fixed_splits_header_and_samples() {
        let mut body = Vec::new();
        body.extend_from_slice(&11u32.to_le_bytes()); // float64
        body.extend_from_slice(&1u32.to_le_bytes());
        body.extend_from_slice(&1u32.to_le_bytes());
        body.extend_from_slice(&50.0f64.to_le_bytes());
        body.extend_from_slice(&7u64.to_le_bytes());
        body.extend_from_slice(&3.5f64.to_le_bytes());

        let (header, samples) = parse_async_fixed(&body).unwrap();
        assert_eq!(header.data_type, ChannelDataType::Float64);
        assert_eq!(header.sample_count, 1);
        assert_eq!(header.frequency, 50.0);
        assert_eq!(samples.len(), 16);
    }
}
