use std::time::Duration;

use thiserror::Error;
use tracing::{debug, warn};

use crate::protocol::config::parse_channel_scaling;
use crate::protocol::error::ProtocolError;
use crate::protocol::parser::{self, PacketInfo, SubRecordType};
use crate::protocol::samples::{decode_async_fixed, decode_sync_fixed};
use crate::source::{FrameSource, SourceError, TcpFrameSource};
use crate::{DecodedChannelBlock, ScalingEntry};

/// Default read timeout applied to the stream socket.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("source error: {0}")]
    Source(#[from] SourceError),
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

/// Streaming session over one connection.
///
/// Owns the session-scoped state the wire protocol depends on: the
/// positional scaling table fed by XML config sub-records, the latest
/// packet info, and the per-packet channel index. The design assumes
/// exactly one reader per connection; concurrent callers must serialize
/// access externally.
pub struct OxygenReceiver<S: FrameSource = TcpFrameSource> {
    source: S,
    packet_info: PacketInfo,
    scaling: Vec<ScalingEntry>,
    xml_documents: Vec<String>,
    channel_index: usize,
}

impl OxygenReceiver<TcpFrameSource> {
    /// Connect to a streaming server with the default read timeout.
    ///
    /// # Errors
    /// Connection and resolution failures surface here; no retry is
    /// attempted internally.
    pub fn connect(host: &str, port: u16) -> Result<Self, SessionError> {
        Self::connect_with_timeout(host, port, DEFAULT_TIMEOUT)
    }

    /// Connect with an explicit read timeout.
    pub fn connect_with_timeout(
        host: &str,
        port: u16,
        timeout: Duration,
    ) -> Result<Self, SessionError> {
        let source = TcpFrameSource::connect(host, port, timeout)?;
        Ok(Self::with_source(source))
    }

    /// Close the underlying connection. After signaling stop on the
    /// control channel, keep calling [`Self::read_packet`] until
    /// [`PacketInfo::is_last_packet`] reports true before disconnecting,
    /// so no unread bytes are left in the socket buffer.
    pub fn disconnect(self) {
        self.source.shutdown();
    }
}

impl<S: FrameSource> OxygenReceiver<S> {
    /// Build a session over any frame source.
    pub fn with_source(source: S) -> Self {
        Self {
            source,
            packet_info: PacketInfo::default(),
            scaling: Vec::new(),
            xml_documents: Vec::new(),
            channel_index: 0,
        }
    }

    /// Read and decode one packet.
    ///
    /// Returns `Ok(None)` when no data arrived before the read timeout
    /// (retry later). On success, returns one decoded block per
    /// sync/async sub-record in encounter order. Decoding is append-only:
    /// a warning on a later sub-record never corrupts earlier blocks.
    ///
    /// # Errors
    /// Framing and self-consistency failures are fatal for this call;
    /// the connection state should be treated as suspect afterwards.
    pub fn read_packet(&mut self) -> Result<Option<Vec<DecodedChannelBlock>>, SessionError> {
        let payload = match self.source.next_frame()? {
            Some(payload) => payload,
            None => return Ok(None),
        };
        self.channel_index = 0;
        let mut blocks = Vec::new();
        for record in parser::sub_records(&payload) {
            let record = record?;
            match record.kind {
                SubRecordType::PacketInfo => {
                    self.packet_info = parser::parse_packet_info(record.body)?;
                }
                SubRecordType::XmlConfig => self.apply_channel_config(record.body)?,
                SubRecordType::SyncFixed => {
                    let (header, samples) = parser::parse_sync_fixed(record.body)?;
                    let scaling = self.scaling_for_current_channel();
                    blocks.push(decode_sync_fixed(&header, samples, scaling)?);
                    self.channel_index += 1;
                }
                SubRecordType::AsyncFixed => {
                    let (header, samples) = parser::parse_async_fixed(record.body)?;
                    blocks.push(decode_async_fixed(&header, samples)?);
                    self.channel_index += 1;
                }
                SubRecordType::SyncVariable | SubRecordType::AsyncVariable => {
                    debug!(kind = ?record.kind, "sub-record type has no decode path, skipping");
                }
                SubRecordType::Unknown(code) => {
                    warn!(code, "unknown sub-record type, skipping");
                }
                SubRecordType::Footer => {}
            }
        }
        Ok(Some(blocks))
    }

    /// Metadata from the most recent packet-info sub-record. Callers poll
    /// `stream_status` here to run the drain loop.
    pub fn packet_info(&self) -> &PacketInfo {
        &self.packet_info
    }

    /// Current positional scaling table for the session.
    pub fn scaling_table(&self) -> &[ScalingEntry] {
        &self.scaling
    }

    /// Raw XML config documents received during the session.
    pub fn xml_documents(&self) -> &[String] {
        &self.xml_documents
    }

    fn apply_channel_config(&mut self, body: &[u8]) -> Result<(), ProtocolError> {
        let text = std::str::from_utf8(body).map_err(|_| ProtocolError::ConfigNotUtf8)?;
        let text = text.trim_end_matches('\0').trim();
        let entries = parse_channel_scaling(text)?;
        debug!(channels = entries.len(), "channel config received");
        self.scaling.extend(entries);
        self.xml_documents.push(text.to_string());
        Ok(())
    }

    fn scaling_for_current_channel(&self) -> ScalingEntry {
        match self.scaling.get(self.channel_index) {
            Some(entry) => *entry,
            None => {
                warn!(
                    channel_index = self.channel_index,
                    "no scaling entry for channel, using identity"
                );
                ScalingEntry::default()
            }
        }
    }
}
