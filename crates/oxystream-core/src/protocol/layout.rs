//! Wire constants for the Oxygen data stream (source of truth).
//!
//! All integers on the wire are little-endian with fixed byte offsets.

/// Literal token that opens every packet.
pub const START_TOKEN: &[u8; 8] = b"OXYGEN<<";
/// Literal token that closes every packet. Not independently validated;
/// the protocol is length-delimited and the end token is consumed as part
/// of the size-bounded payload.
pub const END_TOKEN: &[u8; 8] = b">>OXYGEN";

/// Size of the start/end tokens in bytes.
pub const TOKEN_SIZE: usize = 8;
/// Outer packet header: 8-byte start token + 4-byte total packet size.
pub const PACKET_HEADER_SIZE: usize = 12;
/// Sub-record header: 4-byte size (including this header) + 4-byte type.
pub const SUBRECORD_HEADER_SIZE: usize = 8;
/// Packet-info body: six unsigned 32-bit fields.
pub const PACKET_INFO_SIZE: usize = 24;
/// Sync-fixed body header: 3x u32, u64 start timestamp, f64 frequency.
pub const SYNC_FIXED_HEADER_SIZE: usize = 28;
/// Async-fixed body header: 3x u32 + f64 frequency.
pub const ASYNC_FIXED_HEADER_SIZE: usize = 20;

/// Free-form product identification text sent once on connect.
pub const WELCOME_MSG_SIZE: usize = 64;

/// Stream protocol version this decoder targets.
pub const PROTOCOL_VERSION: u32 = 0x0105_0000;

pub const SBT_PACKET_INFO: u32 = 0x0000_0001;
pub const SBT_XML_CONFIG: u32 = 0x0000_0002;
pub const SBT_SYNC_FIXED: u32 = 0x0000_0003;
pub const SBT_SYNC_VARIABLE: u32 = 0x0000_0004;
pub const SBT_ASYNC_FIXED: u32 = 0x0000_0005;
pub const SBT_ASYNC_VARIABLE: u32 = 0x0000_0006;
pub const SBT_PACKET_FOOTER: u32 = 0x0000_0007;

/// Stream status bit: first packet of the stream.
pub const STATUS_FIRST_PACKET: u32 = 0x0000_0001;
/// Stream status bit: last packet of the stream (drain loop condition).
pub const STATUS_LAST_PACKET: u32 = 0x0000_0002;
/// Stream status value for a normal mid-stream packet.
pub const STATUS_NORMAL_PACKET: u32 = 0x0000_0000;
/// Stream status bit: the server flagged an error condition.
pub const STATUS_ERROR_PACKET: u32 = 0x1000_0000;
