use std::io::{self, Read};

use tracing::{debug, warn};

use super::{FrameSource, SourceError};
use crate::protocol::layout;

/// Frame synchronizer over any blocking byte stream.
///
/// Runs the SEARCHING_TOKEN -> HEADER_READ -> BODY_READ cycle once per
/// [`FrameSource::next_frame`] call and emits one opaque payload buffer
/// per successful cycle. Token search keeps a sliding window of the last
/// 8 bytes and resynchronizes one byte at a time, so leading garbage is
/// tolerated at O(n) cost in the garbage length. The window survives
/// across calls, so a start token split by a read timeout is still
/// recognized once the rest of it arrives.
pub struct FrameReader<R: Read> {
    inner: R,
    window: [u8; layout::TOKEN_SIZE],
    filled: usize,
}

impl<R: Read> FrameReader<R> {
    pub fn new(inner: R) -> Self {
        Self {
            inner,
            window: [0; layout::TOKEN_SIZE],
            filled: 0,
        }
    }

    pub fn get_ref(&self) -> &R {
        &self.inner
    }

    pub fn get_mut(&mut self) -> &mut R {
        &mut self.inner
    }

    pub fn into_inner(self) -> R {
        self.inner
    }
}

fn is_timeout(err: &io::Error) -> bool {
    // std maps socket read timeouts to WouldBlock on Unix and TimedOut on
    // Windows.
    matches!(
        err.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

fn framing(err: &io::Error, context: &str) -> SourceError {
    if is_timeout(err) {
        SourceError::Framing(format!("read timeout mid-frame while reading {context}"))
    } else {
        SourceError::Framing(format!("truncated {context}: {err}"))
    }
}

impl<R: Read> FrameSource for FrameReader<R> {
    fn next_frame(&mut self) -> Result<Option<Vec<u8>>, SourceError> {
        // SEARCHING_TOKEN: a timeout here is "no data yet", not an error.
        // Partially read token bytes stay in the window for the next call.
        let mut skipped = 0u64;
        loop {
            if self.filled == layout::TOKEN_SIZE {
                if &self.window == layout::START_TOKEN {
                    break;
                }
                self.window.rotate_left(1);
                self.filled -= 1;
                skipped += 1;
            }
            let mut byte = [0u8; 1];
            match self.inner.read_exact(&mut byte) {
                Ok(()) => {
                    self.window[self.filled] = byte[0];
                    self.filled += 1;
                }
                Err(err) if is_timeout(&err) => {
                    if skipped > 0 {
                        warn!(skipped, "no start token before read timeout");
                    } else {
                        debug!("no data available yet");
                    }
                    return Ok(None);
                }
                Err(err) => return Err(SourceError::Io(err)),
            }
        }
        self.filled = 0;
        if skipped > 0 {
            warn!(skipped, "resynchronized to start token");
        }

        // HEADER_READ: remaining 4 bytes of the 12-byte outer header.
        let mut size_bytes = [0u8; 4];
        self.inner
            .read_exact(&mut size_bytes)
            .map_err(|err| framing(&err, "packet size"))?;
        let total_size = u32::from_le_bytes(size_bytes) as usize;
        if total_size < layout::PACKET_HEADER_SIZE {
            return Err(SourceError::Framing(format!(
                "declared packet size {total_size} is smaller than the {}-byte header",
                layout::PACKET_HEADER_SIZE
            )));
        }

        // BODY_READ: exactly total_size - 12 payload bytes.
        let mut payload = vec![0u8; total_size - layout::PACKET_HEADER_SIZE];
        self.inner
            .read_exact(&mut payload)
            .map_err(|err| framing(&err, "packet body"))?;
        Ok(Some(payload))
    }
}
