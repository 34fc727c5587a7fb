//! End-to-end decode over synthetic byte streams.

use std::io::Cursor;

use oxystream_core::protocol::layout;
use oxystream_core::{FrameReader, FrameSource, OxygenReceiver, SessionError, SourceError};

fn sub_record(code: u32, body: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(&((body.len() + layout::SUBRECORD_HEADER_SIZE) as u32).to_le_bytes());
    bytes.extend_from_slice(&code.to_le_bytes());
    bytes.extend_from_slice(body);
    bytes
}

fn packet_info_body(status: u32, sub_records: u32) -> Vec<u8> {
    let mut body = Vec::new();
    for field in [layout::PROTOCOL_VERSION, 1, 0, status, 0, sub_records] {
        body.extend_from_slice(&field.to_le_bytes());
    }
    body
}

fn sync_fixed_f32_body(values: &[f32], start: u64, frequency: f64) -> Vec<u8> {
    let mut body = Vec::new();
    body.extend_from_slice(&10u32.to_le_bytes());
    body.extend_from_slice(&1u32.to_le_bytes());
    body.extend_from_slice(&(values.len() as u32).to_le_bytes());
    body.extend_from_slice(&start.to_le_bytes());
    body.extend_from_slice(&frequency.to_le_bytes());
    for value in values {
        body.extend_from_slice(&value.to_le_bytes());
    }
    body
}

fn frame(payload: &[u8]) -> Vec<u8> {
    let mut bytes = Vec::new();
    bytes.extend_from_slice(layout::START_TOKEN);
    bytes.extend_from_slice(&((payload.len() + layout::PACKET_HEADER_SIZE) as u32).to_le_bytes());
    bytes.extend_from_slice(payload);
    bytes
}

fn scenario_payload() -> Vec<u8> {
    let mut payload = sub_record(layout::SBT_PACKET_INFO, &packet_info_body(0, 3));
    payload.extend(sub_record(
        layout::SBT_XML_CONFIG,
        br#"<ChannelInfo><Channel><Scaling factor="1" offset="0"/></Channel></ChannelInfo>"#,
    ));
    payload.extend(sub_record(
        layout::SBT_SYNC_FIXED,
        &sync_fixed_f32_body(&[1.0, 2.0, 3.0], 0, 1.0),
    ));
    payload
}

#[test]
fn decodes_a_synthetic_stream_end_to_end() {
    let stream = frame(&scenario_payload());
    let source = FrameReader::new(Cursor::new(stream));
    let mut receiver = OxygenReceiver::with_source(source);

    let blocks = receiver.read_packet().unwrap().unwrap();
    assert_eq!(blocks.len(), 1);
    assert_eq!(
        blocks[0].rows,
        vec![vec![0.0, 1.0], vec![1.0, 2.0], vec![2.0, 3.0]]
    );
    assert_eq!(receiver.packet_info().stream_status, 0);
    assert!(!receiver.packet_info().is_last_packet());
}

#[test]
fn leading_garbage_decodes_identically_to_a_clean_stream() {
    let clean = frame(&scenario_payload());
    let mut dirty = b"\x00\xffnoise OXY>>GEN<<".to_vec();
    dirty.extend(frame(&scenario_payload()));

    let mut clean_receiver = OxygenReceiver::with_source(FrameReader::new(Cursor::new(clean)));
    let mut dirty_receiver = OxygenReceiver::with_source(FrameReader::new(Cursor::new(dirty)));

    let expected = clean_receiver.read_packet().unwrap().unwrap();
    let actual = dirty_receiver.read_packet().unwrap().unwrap();
    assert_eq!(actual, expected);
}

#[test]
fn drain_loop_observes_the_last_packet_flag() {
    let mut stream = frame(&sub_record(
        layout::SBT_PACKET_INFO,
        &packet_info_body(layout::STATUS_FIRST_PACKET, 1),
    ));
    stream.extend(frame(&sub_record(
        layout::SBT_PACKET_INFO,
        &packet_info_body(layout::STATUS_LAST_PACKET, 1),
    )));

    let mut receiver = OxygenReceiver::with_source(FrameReader::new(Cursor::new(stream)));
    receiver.read_packet().unwrap().unwrap();
    assert!(receiver.packet_info().is_first_packet());
    assert!(!receiver.packet_info().is_last_packet());
    receiver.read_packet().unwrap().unwrap();
    assert!(receiver.packet_info().is_last_packet());
}

#[test]
fn sub_record_sizes_partition_every_valid_payload() {
    let payload = scenario_payload();
    let mut declared = 0usize;
    let mut offset = 0usize;
    while offset < payload.len() {
        let size = u32::from_le_bytes([
            payload[offset],
            payload[offset + 1],
            payload[offset + 2],
            payload[offset + 3],
        ]) as usize;
        declared += size;
        offset += size;
    }
    assert_eq!(declared, payload.len());
}

#[test]
fn corrupted_size_field_is_reported_not_misread() {
    let mut payload = scenario_payload();
    // Corrupt the first sub-record's size so it no longer partitions the
    // payload.
    payload[0..4].copy_from_slice(&0xffffu32.to_le_bytes());
    let stream = frame(&payload);

    let mut receiver = OxygenReceiver::with_source(FrameReader::new(Cursor::new(stream)));
    let err = receiver.read_packet().unwrap_err();
    assert!(matches!(err, SessionError::Protocol(_)));
}

#[test]
fn unsupported_dtype_in_stream_yields_empty_block() {
    let mut body = Vec::new();
    body.extend_from_slice(&15u32.to_le_bytes()); // reserved code
    body.extend_from_slice(&1u32.to_le_bytes());
    body.extend_from_slice(&4u32.to_le_bytes());
    body.extend_from_slice(&0u64.to_le_bytes());
    body.extend_from_slice(&1.0f64.to_le_bytes());
    let stream = frame(&sub_record(layout::SBT_SYNC_FIXED, &body));

    let mut receiver = OxygenReceiver::with_source(FrameReader::new(Cursor::new(stream)));
    let blocks = receiver.read_packet().unwrap().unwrap();
    assert_eq!(blocks.len(), 1);
    assert!(blocks[0].is_empty());
}

#[test]
fn truncated_frame_body_fails_the_read() {
    let mut stream = frame(&scenario_payload());
    stream.truncate(stream.len() - 10);
    let mut source = FrameReader::new(Cursor::new(stream));
    let err = source.next_frame().unwrap_err();
    assert!(matches!(err, SourceError::Framing(_)));
}
