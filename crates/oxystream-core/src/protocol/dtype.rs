//! Channel sample data types.

use serde::{Deserialize, Serialize};

/// Sample element type carried in sync/async sub-record headers.
///
/// Sixteen wire codes are defined. Codes 0–13 name concrete element types;
/// the two complex types are recognized but have no numeric decode path,
/// and codes 14/15 are reserved. Undecodable types yield an empty channel
/// block with a warning rather than an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelDataType {
    /// 8-bit signed integer -- code 0.
    Int8,
    /// 8-bit unsigned integer -- code 1.
    UInt8,
    /// 16-bit signed integer -- code 2.
    Int16,
    /// 16-bit unsigned integer -- code 3.
    UInt16,
    /// 24-bit signed integer, 3 raw bytes per sample -- code 4.
    Int24,
    /// 24-bit unsigned integer, 3 raw bytes per sample -- code 5.
    UInt24,
    /// 32-bit signed integer -- code 6.
    Int32,
    /// 32-bit unsigned integer -- code 7.
    UInt32,
    /// 64-bit signed integer -- code 8.
    Int64,
    /// 64-bit unsigned integer -- code 9.
    UInt64,
    /// IEEE 754 single precision -- code 10.
    Float32,
    /// IEEE 754 double precision -- code 11.
    Float64,
    /// Complex single precision -- code 12, no decode path.
    Complex64,
    /// Complex double precision -- code 13, no decode path.
    Complex128,
    /// Reserved or unrecognized wire code.
    Unknown(u32),
}

impl ChannelDataType {
    /// Derive the data type from its wire code.
    pub fn from_code(code: u32) -> Self {
        match code {
            0 => ChannelDataType::Int8,
            1 => ChannelDataType::UInt8,
            2 => ChannelDataType::Int16,
            3 => ChannelDataType::UInt16,
            4 => ChannelDataType::Int24,
            5 => ChannelDataType::UInt24,
            6 => ChannelDataType::Int32,
            7 => ChannelDataType::UInt32,
            8 => ChannelDataType::Int64,
            9 => ChannelDataType::UInt64,
            10 => ChannelDataType::Float32,
            11 => ChannelDataType::Float64,
            12 => ChannelDataType::Complex64,
            13 => ChannelDataType::Complex128,
            other => ChannelDataType::Unknown(other),
        }
    }

    /// Size of one element on the wire, in bytes.
    pub const fn wire_size(&self) -> usize {
        match self {
            ChannelDataType::Int8 | ChannelDataType::UInt8 => 1,
            ChannelDataType::Int16 | ChannelDataType::UInt16 => 2,
            ChannelDataType::Int24 | ChannelDataType::UInt24 => 3,
            ChannelDataType::Int32 | ChannelDataType::UInt32 | ChannelDataType::Float32 => 4,
            ChannelDataType::Int64
            | ChannelDataType::UInt64
            | ChannelDataType::Float64
            | ChannelDataType::Complex64 => 8,
            ChannelDataType::Complex128 => 16,
            ChannelDataType::Unknown(_) => 0,
        }
    }

    /// Whether this type has a numeric decode path.
    pub const fn is_decodable(&self) -> bool {
        !matches!(
            self,
            ChannelDataType::Complex64 | ChannelDataType::Complex128 | ChannelDataType::Unknown(_)
        )
    }
}
