//! Packet payload decoding.
//!
//! The payload decoder follows a layered structure:
//! - `layout`: byte offsets, sizes and wire constants (source of truth)
//! - `reader`: safe little-endian byte access
//! - `parser`: sub-record dispatch and fixed-layout header decoding
//! - `samples`: the four sample decode paths
//! - `config`: XML channel-scaling extraction
//! - `error`: explicit, actionable errors
//!
//! Everything here is pure and operates on byte slices; socket I/O and
//! frame synchronization live in `source`.

pub mod config;
pub mod dtype;
pub mod error;
pub mod layout;
pub mod parser;
pub mod reader;
pub mod samples;
