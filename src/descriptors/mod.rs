//! Tag descriptor model, structural hashing and caching.
//!
//! A tag descriptor describes a custom tag: which elements it applies to, which attributes it
//! binds, and which children it accepts. Descriptors are assembled through consuming builders,
//! validated on `build()` (validation problems become `TS3xxx` diagnostics, never panics) and
//! immutable afterwards.
//!
//! # Key Components
//!
//! - [`TagDescriptor`] / [`TagDescriptorBuilder`] - The descriptor and its builder
//! - [`MatchingRule`] / [`RequiredAttribute`] - Conditions under which a descriptor applies
//! - [`BoundAttributeDescriptor`] - Attributes consumed as typed values
//! - [`AllowedChildDescriptor`] - Restrictions on direct children
//! - [`DescriptorHash`] - Deterministic rolling hash over descriptor structure
//! - [`DescriptorCache`] - Concurrent hash-keyed deduplication
//!
//! # Equality
//!
//! All descriptor types compare structurally and ignore their diagnostics. Equal descriptors
//! always have equal structural hashes, independent of process or thread.

mod attribute;
mod cache;
mod child;
mod descriptor;
mod hash;
mod rule;

pub use attribute::{BoundAttributeBuilder, BoundAttributeDescriptor};
pub use cache::DescriptorCache;
pub use child::{AllowedChildBuilder, AllowedChildDescriptor};
pub use descriptor::{TagDescriptor, TagDescriptorBuilder};
pub use hash::{fnv1a, DescriptorHash};
pub use rule::{
    MatchingRule, MatchingRuleBuilder, NameComparisonMode, RequiredAttribute,
    RequiredAttributeBuilder, TagStructure, ValueComparisonMode,
};

pub(crate) use rule::{names_equal, starts_with};

/// Tag name of a rule which targets every element
pub const ELEMENT_CATCH_ALL_TARGET: &str = "*";

/// Descriptor kind of ordinary tag helpers
pub const TAG_HELPER_KIND: &str = "TagHelper";

/// Characters which may not appear in tag, attribute or child names
const INVALID_NAME_CHARACTERS: &[char] = &[
    '@', '!', '<', '/', '?', '[', '>', ']', '=', '"', '\'', '*',
];

/// Return the first character of `name` which is whitespace or otherwise invalid in a name
#[must_use]
pub fn find_invalid_character(name: &str) -> Option<char> {
    name.chars()
        .find(|c| c.is_whitespace() || INVALID_NAME_CHARACTERS.contains(c))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_find_invalid_character() {
        assert_eq!(find_invalid_character("input"), None);
        assert_eq!(find_invalid_character("my-tag"), None);
        assert_eq!(find_invalid_character("a b"), Some(' '));
        assert_eq!(find_invalid_character("a\tb"), Some('\t'));
        assert_eq!(find_invalid_character("x=y"), Some('='));
        assert_eq!(find_invalid_character("*"), Some('*'));
        assert_eq!(find_invalid_character("@a!"), Some('@'));
    }
}
