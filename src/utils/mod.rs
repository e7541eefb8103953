//! Small helpers shared across the crate.

mod checksum;

pub use checksum::{bytes_to_hex, ChecksumAlgorithm};
