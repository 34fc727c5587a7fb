//! Frame acquisition sources.
//!
//! I/O lives here, isolated from the pure payload decoders in `protocol`.
//! The [`FrameSource`] trait lets the session pipeline run against a real
//! TCP connection or any in-memory byte stream in tests.

mod frame;
mod tcp;

pub use frame::FrameReader;
pub use tcp::TcpFrameSource;

use thiserror::Error;

/// A source of complete packet payloads.
pub trait FrameSource {
    /// Acquire the next complete payload.
    ///
    /// `Ok(None)` means no data arrived before the read timeout while
    /// waiting for a new packet to start; the caller is expected to
    /// retry. Errors mid-frame are fatal for the attempt since partial
    /// frames are not retained across calls.
    fn next_frame(&mut self) -> Result<Option<Vec<u8>>, SourceError>;
}

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("framing error: {0}")]
    Framing(String),
}
