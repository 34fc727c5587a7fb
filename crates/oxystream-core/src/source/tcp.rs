use std::io::Read;
use std::net::{Shutdown, TcpStream};
use std::time::Duration;

use tracing::debug;

use super::frame::FrameReader;
use super::{FrameSource, SourceError};
use crate::protocol::layout;

/// Blocking TCP frame source.
///
/// Wraps a connected stream in a [`FrameReader`] after consuming the
/// 64-byte welcome message the server sends on connect. The read timeout
/// bounds every blocking read; a timeout between packets surfaces as
/// `Ok(None)` from [`FrameSource::next_frame`].
pub struct TcpFrameSource {
    frames: FrameReader<TcpStream>,
}

impl TcpFrameSource {
    /// Connect to a streaming server and consume its welcome message.
    ///
    /// # Errors
    /// Returns `SourceError::Io` when resolution or connection fails, and
    /// `SourceError::Framing` when the welcome message cannot be read in
    /// full.
    pub fn connect(host: &str, port: u16, timeout: Duration) -> Result<Self, SourceError> {
        let stream = TcpStream::connect((host, port))?;
        stream.set_read_timeout(Some(timeout))?;
        let mut source = Self {
            frames: FrameReader::new(stream),
        };
        source.read_welcome()?;
        Ok(source)
    }

    fn read_welcome(&mut self) -> Result<(), SourceError> {
        let mut welcome = [0u8; layout::WELCOME_MSG_SIZE];
        self.frames
            .get_mut()
            .read_exact(&mut welcome)
            .map_err(|err| SourceError::Framing(format!("could not read welcome message: {err}")))?;
        let product = String::from_utf8_lossy(&welcome);
        debug!(
            product = product.trim_end_matches('\0').trim(),
            "data stream product name"
        );
        Ok(())
    }

    /// Close both directions of the underlying connection.
    pub fn shutdown(&self) {
        let _ = self.frames.get_ref().shutdown(Shutdown::Both);
    }
}

impl FrameSource for TcpFrameSource {
    fn next_frame(&mut self) -> Result<Option<Vec<u8>>, SourceError> {
        self.frames.next_frame()
    }
}
