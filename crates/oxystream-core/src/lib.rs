//! Core library for decoding Oxygen measurement data streams.
//!
//! This crate reconstructs typed, time-tagged channel sample blocks from
//! a continuous TCP byte stream: frame synchronization on an unreliable
//! stream boundary, sub-record dispatch, numeric decoding (including
//! non-byte-aligned 24-bit integers and array samples), per-sample
//! timestamp reconstruction for synchronous and asynchronous channels,
//! and linear scaling from the channel config metadata.
//!
//! Payload decoding is byte-oriented and side-effect free; all I/O is
//! isolated in the `source` module behind the [`FrameSource`] trait.
//! Protocol conventions are captured in `protocol::reader` so parsers
//! stay minimal.
//!
//! Invariants:
//! - Declared sub-record sizes exactly partition each packet payload; a
//!   mismatch is a fatal framing error for that packet.
//! - The scaling table is correlated to sample sub-records purely by
//!   arrival order across the session (a wire-protocol contract).
//! - One reader per connection; blocking reads are the only suspension
//!   point.
//!
//! # Examples
//! ```no_run
//! use oxystream_core::OxygenReceiver;
//!
//! let mut receiver = OxygenReceiver::connect("127.0.0.1", 10003)?;
//! loop {
//!     if let Some(blocks) = receiver.read_packet()? {
//!         for block in &blocks {
//!             println!("{} rows", block.rows.len());
//!         }
//!         if receiver.packet_info().is_last_packet() {
//!             break;
//!         }
//!     }
//! }
//! receiver.disconnect();
//! # Ok::<(), oxystream_core::SessionError>(())
//! ```

use serde::{Deserialize, Serialize};

pub mod protocol;
mod session;
pub mod source;

pub use protocol::dtype::ChannelDataType;
pub use protocol::error::ProtocolError;
pub use protocol::layout::{
    PROTOCOL_VERSION, STATUS_ERROR_PACKET, STATUS_FIRST_PACKET, STATUS_LAST_PACKET,
    STATUS_NORMAL_PACKET,
};
pub use protocol::parser::PacketInfo;
pub use session::{DEFAULT_TIMEOUT, OxygenReceiver, SessionError};
pub use source::{FrameReader, FrameSource, SourceError, TcpFrameSource};

/// Linear scaling applied to sync scalar samples: `value * factor + offset`.
///
/// Entries arrive positionally in channel config sub-records; a channel
/// without an entry decodes with the identity scaling.
///
/// # Examples
/// ```
/// use oxystream_core::ScalingEntry;
///
/// let identity = ScalingEntry::default();
/// assert_eq!(identity.factor, 1.0);
/// assert_eq!(identity.offset, 0.0);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScalingEntry {
    pub factor: f64,
    pub offset: f64,
}

impl Default for ScalingEntry {
    fn default() -> Self {
        Self {
            factor: 1.0,
            offset: 0.0,
        }
    }
}

/// Decoded samples of one channel sub-record.
///
/// Each row is `[time, value(s)]`: a timestamp in seconds (raw ticks for
/// async array channels) followed by one value per channel dimension.
/// Empty when the sub-record declared zero samples or an undecodable
/// data type.
///
/// # Examples
/// ```
/// use oxystream_core::DecodedChannelBlock;
///
/// let block = DecodedChannelBlock::empty();
/// assert!(block.is_empty());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DecodedChannelBlock {
    pub rows: Vec<Vec<f64>>,
}

impl DecodedChannelBlock {
    pub fn empty() -> Self {
        Self { rows: Vec::new() }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}
