use super::error::ProtocolError;

/// Bounds-checked little-endian access over a payload slice.
///
/// Parsers never index the payload directly; every read goes through this
/// reader so truncation surfaces as a [`ProtocolError::TooShort`] instead
/// of a panic.
pub struct PayloadReader<'a> {
    payload: &'a [u8],
}

impl<'a> PayloadReader<'a> {
    pub fn new(payload: &'a [u8]) -> Self {
        Self { payload }
    }

    pub fn len(&self) -> usize {
        self.payload.len()
    }

    pub fn is_empty(&self) -> bool {
        self.payload.is_empty()
    }

    pub fn require_len(&self, needed: usize) -> Result<(), ProtocolError> {
        if self.payload.len() < needed {
            return Err(ProtocolError::TooShort {
                needed,
                actual: self.payload.len(),
            });
        }
        Ok(())
    }

    pub fn read_slice(&self, offset: usize, len: usize) -> Result<&'a [u8], ProtocolError> {
        self.payload
            .get(offset..offset + len)
            .ok_or(ProtocolError::TooShort {
                needed: offset + len,
                actual: self.payload.len(),
            })
    }

    pub fn read_u32_le(&self, offset: usize) -> Result<u32, ProtocolError> {
        let bytes = self.read_slice(offset, 4)?;
        Ok(u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]))
    }

    pub fn read_u64_le(&self, offset: usize) -> Result<u64, ProtocolError> {
        let bytes = self.read_slice(offset, 8)?;
        Ok(u64::from_le_bytes([
            bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
        ]))
    }

    pub fn read_f64_le(&self, offset: usize) -> Result<f64, ProtocolError> {
        Ok(f64::from_bits(self.read_u64_le(offset)?))
    }

    /// Remaining bytes from `offset` to the end of the payload.
    pub fn tail(&self, offset: usize) -> Result<&'a [u8], ProtocolError> {
        self.payload.get(offset..).ok_or(ProtocolError::TooShort {
            needed: offset,
            actual: self.payload.len(),
        })
    }
}
