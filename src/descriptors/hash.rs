//! Structural hashing for tag descriptors.
//!
//! Descriptors are deduplicated across compilations by hash, so the hash has to be a pure
//! function of the descriptor's structure: the same descriptor built in two different
//! compilations, threads or processes must hash identically. [`DescriptorHash`] therefore
//! avoids `std`'s randomly keyed hashers entirely.
//!
//! # Hash Design
//!
//! Components are folded with the order-sensitive rolling function
//! `state = state * 33 ^ value`, seeded with `0x1505`. Strings are reduced to a `u64` with
//! FNV-1a before being folded in, and optional components contribute a presence marker so
//! that `None` and `Some("")` hash differently.
//!
//! # Example Usage
//!
//! ```rust
//! use tagscope::descriptors::DescriptorHash;
//!
//! let hash = DescriptorHash::new()
//!     .add_str("TagHelper")
//!     .add_str("InputTagHelper")
//!     .add_str("TestAssembly")
//!     .finalize();
//!
//! let again = DescriptorHash::new()
//!     .add_str("TagHelper")
//!     .add_str("InputTagHelper")
//!     .add_str("TestAssembly")
//!     .finalize();
//!
//! assert_eq!(hash, again);
//! ```

/// Seed of the rolling combiner
const COMBINER_SEED: u64 = 0x1505;
/// FNV-1a 64-bit offset basis
const FNV_OFFSET_BASIS: u64 = 0xcbf2_9ce4_8422_2325;
/// FNV-1a 64-bit prime
const FNV_PRIME: u64 = 0x0100_0000_01b3;

/// Deterministic FNV-1a digest of a byte string
#[must_use]
pub fn fnv1a(bytes: &[u8]) -> u64 {
    let mut state = FNV_OFFSET_BASIS;
    for byte in bytes {
        state ^= u64::from(*byte);
        state = state.wrapping_mul(FNV_PRIME);
    }
    state
}

/// Order-sensitive hash builder for descriptor structures.
///
/// Each `add_*` call folds one component into the state. Two builders fed the same
/// components in the same order always finish with the same value.
#[derive(Debug, Clone, Copy)]
pub struct DescriptorHash {
    /// Current rolling state
    state: u64,
}

impl DescriptorHash {
    /// Create a new hash builder with the combiner seed
    #[must_use]
    pub fn new() -> Self {
        DescriptorHash {
            state: COMBINER_SEED,
        }
    }

    /// Fold a raw value into the state: `state * 33 ^ value`
    fn mix(&mut self, value: u64) {
        self.state = self.state.wrapping_mul(33) ^ value;
    }

    /// Add a 64-bit value
    #[must_use]
    pub fn add_u64(mut self, value: u64) -> Self {
        self.mix(value);
        self
    }

    /// Add a length or index
    #[must_use]
    pub fn add_usize(self, value: usize) -> Self {
        self.add_u64(value as u64)
    }

    /// Add a boolean flag
    #[must_use]
    pub fn add_bool(self, value: bool) -> Self {
        self.add_u64(u64::from(value))
    }

    /// Add a string through its FNV-1a digest
    #[must_use]
    pub fn add_str(self, value: &str) -> Self {
        self.add_u64(fnv1a(value.as_bytes()))
    }

    /// Add an optional string, distinguishing `None` from every `Some`
    #[must_use]
    pub fn add_opt_str(self, value: Option<&str>) -> Self {
        match value {
            Some(value) => self.add_bool(true).add_str(value),
            None => self.add_bool(false),
        }
    }

    /// Add an already finalized hash of a nested component
    #[must_use]
    pub fn add_hash(self, hash: u64) -> Self {
        self.add_u64(hash)
    }

    /// Add a sequence of nested hashes, prefixed by its length
    #[must_use]
    pub fn add_sequence<I>(self, hashes: I) -> Self
    where
        I: ExactSizeIterator<Item = u64>,
    {
        let mut builder = self.add_usize(hashes.len());
        for hash in hashes {
            builder = builder.add_hash(hash);
        }
        builder
    }

    /// Finalize the hash and return the computed value
    #[must_use]
    pub fn finalize(self) -> u64 {
        self.state
    }
}

impl Default for DescriptorHash {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_deterministic() {
        let hash1 = DescriptorHash::new()
            .add_str("TagHelper")
            .add_str("my-tag")
            .add_bool(true)
            .finalize();

        let hash2 = DescriptorHash::new()
            .add_str("TagHelper")
            .add_str("my-tag")
            .add_bool(true)
            .finalize();

        assert_eq!(hash1, hash2, "Hash should be deterministic");
    }

    #[test]
    fn test_hash_order_sensitive() {
        let hash1 = DescriptorHash::new()
            .add_str("first")
            .add_str("second")
            .finalize();

        let hash2 = DescriptorHash::new()
            .add_str("second")
            .add_str("first")
            .finalize();

        assert_ne!(hash1, hash2, "Hash should be order-sensitive");
    }

    #[test]
    fn test_rolling_function() {
        let hash = DescriptorHash::new().add_u64(7).add_u64(11).finalize();
        let expected = (COMBINER_SEED.wrapping_mul(33) ^ 7).wrapping_mul(33) ^ 11;
        assert_eq!(hash, expected);
    }

    #[test]
    fn test_optional_presence_marker() {
        let none = DescriptorHash::new().add_opt_str(None).finalize();
        let empty = DescriptorHash::new().add_opt_str(Some("")).finalize();
        assert_ne!(none, empty);
    }

    #[test]
    fn test_fnv1a_known_values() {
        assert_eq!(fnv1a(b""), FNV_OFFSET_BASIS);
        assert_eq!(fnv1a(b"a"), 0xaf63_dc4c_8601_ec8c);
    }

    #[test]
    fn test_sequence_length_prefix() {
        let one = DescriptorHash::new().add_sequence([1u64].into_iter()).finalize();
        let two = DescriptorHash::new()
            .add_sequence([1u64, 0].into_iter())
            .finalize();
        assert_ne!(one, two);
    }
}
