//! Concurrent, hash-keyed memoization of tag descriptors.
//!
//! Repeated compilations of the same project discover the same descriptors over and over.
//! [`DescriptorCache`] lets every builder hand back one shared [`Arc`] per structurally
//! distinct descriptor.
//!
//! # Collision Handling
//!
//! Entries are keyed by [`TagDescriptor::structural_hash`]. Distinct descriptors may share a
//! hash, so every key maps to a small bucket of candidates and [`DescriptorCache::get_or_insert`]
//! always verifies full structural equality before returning a cached instance.
//!
//! # Thread Safety
//!
//! The cache is `Send + Sync`. Buckets live in a [`DashMap`]; all modifications of a bucket
//! happen under its shard lock, so readers never observe a half-inserted entry and concurrent
//! inserts of equal descriptors converge on a single shared instance.
//!
//! # Example
//!
//! ```rust
//! use std::sync::Arc;
//! use tagscope::descriptors::{DescriptorCache, TagDescriptorBuilder};
//!
//! let cache = DescriptorCache::new();
//! let build = || {
//!     TagDescriptorBuilder::new("TagHelper", "FormTagHelper", "TestAssembly")
//!         .tag_matching_rule(|rule| rule.tag_name("form"))
//!         .build_cached(&cache)
//! };
//!
//! let first = build();
//! let second = build();
//! assert!(Arc::ptr_eq(&first, &second));
//! assert_eq!(cache.len(), 1);
//! ```

use std::sync::{
    atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering},
    Arc,
};

use dashmap::{mapref::entry::Entry, DashMap};

use crate::descriptors::TagDescriptor;

/// Hash-keyed store of shared descriptors with collision verification.
#[derive(Debug)]
pub struct DescriptorCache {
    /// Candidate buckets keyed by structural hash
    entries: DashMap<u64, Vec<Arc<TagDescriptor>>>,
    /// When `false`, every lookup misses and nothing is stored
    enabled: AtomicBool,
    /// Maximum number of stored descriptors, if bounded
    limit: Option<usize>,
    /// Number of stored descriptors across all buckets
    count: AtomicUsize,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl DescriptorCache {
    /// Create an enabled, unbounded cache
    #[must_use]
    pub fn new() -> Self {
        DescriptorCache {
            entries: DashMap::new(),
            enabled: AtomicBool::new(true),
            limit: None,
            count: AtomicUsize::new(0),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// Create an enabled cache holding at most `limit` descriptors.
    ///
    /// Once full, new descriptors are handed back uncached; existing entries stay.
    #[must_use]
    pub fn with_limit(limit: usize) -> Self {
        DescriptorCache {
            limit: Some(limit),
            ..Self::new()
        }
    }

    /// Whether lookups and inserts are active
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::Acquire)
    }

    /// Enable or disable the cache. Disabling keeps existing entries but bypasses them.
    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.store(enabled, Ordering::Release);
    }

    /// Return the first cached candidate for `hash`.
    ///
    /// The candidate is only known to share the hash; use [`DescriptorCache::get_or_insert`]
    /// when structural equality matters.
    #[must_use]
    pub fn try_get(&self, hash: u64) -> Option<Arc<TagDescriptor>> {
        if !self.is_enabled() {
            return None;
        }

        let found = self
            .entries
            .get(&hash)
            .and_then(|bucket| bucket.first().cloned());
        self.record(found.is_some());
        found
    }

    /// Store `descriptor` under `hash`.
    ///
    /// An equal entry already in the bucket is replaced, so repeated calls leave exactly one
    /// entry; an unequal colliding descriptor is appended.
    pub fn set(&self, hash: u64, descriptor: Arc<TagDescriptor>) {
        if !self.is_enabled() {
            return;
        }

        match self.entries.entry(hash) {
            Entry::Occupied(mut occupied) => {
                let bucket = occupied.get_mut();
                match bucket.iter().position(|entry| **entry == *descriptor) {
                    Some(index) => bucket[index] = descriptor,
                    None => {
                        if self.reserve_slot() {
                            bucket.push(descriptor);
                        }
                    }
                }
            }
            Entry::Vacant(vacant) => {
                if self.reserve_slot() {
                    vacant.insert(vec![descriptor]);
                }
            }
        }
    }

    /// Return the cached instance structurally equal to `descriptor`, inserting it if absent
    pub fn get_or_insert(&self, descriptor: TagDescriptor) -> Arc<TagDescriptor> {
        if !self.is_enabled() {
            return Arc::new(descriptor);
        }

        let hash = descriptor.structural_hash();
        match self.entries.entry(hash) {
            Entry::Occupied(mut occupied) => {
                let bucket = occupied.get_mut();
                if let Some(existing) = bucket.iter().find(|entry| ***entry == descriptor) {
                    log::trace!("descriptor cache hit for '{}' ({hash:#018x})", descriptor.name());
                    self.record(true);
                    return existing.clone();
                }

                self.record(false);
                let shared = Arc::new(descriptor);
                if self.reserve_slot() {
                    bucket.push(shared.clone());
                }
                shared
            }
            Entry::Vacant(vacant) => {
                self.record(false);
                let shared = Arc::new(descriptor);
                if self.reserve_slot() {
                    vacant.insert(vec![shared.clone()]);
                }
                shared
            }
        }
    }

    /// Number of stored descriptors
    #[must_use]
    pub fn len(&self) -> usize {
        self.count.load(Ordering::Acquire)
    }

    /// `true` if no descriptor is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every entry and reset the counters.
    ///
    /// Each bucket leaves the stored count while its shard is locked, so inserts racing with
    /// the clear stay counted exactly when they stay stored.
    pub fn clear(&self) {
        self.entries.retain(|_, bucket| {
            self.count.fetch_sub(bucket.len(), Ordering::AcqRel);
            false
        });
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
    }

    /// Number of lookups that returned a cached descriptor
    #[must_use]
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::Relaxed)
    }

    /// Number of lookups that found nothing
    #[must_use]
    pub fn misses(&self) -> u64 {
        self.misses.load(Ordering::Relaxed)
    }

    fn record(&self, hit: bool) {
        if hit {
            self.hits.fetch_add(1, Ordering::Relaxed);
        } else {
            self.misses.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Claim room for one more entry, honouring the limit
    fn reserve_slot(&self) -> bool {
        let Some(limit) = self.limit else {
            self.count.fetch_add(1, Ordering::AcqRel);
            return true;
        };

        let reserved = self
            .count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
                (count < limit).then_some(count + 1)
            })
            .is_ok();
        if !reserved {
            log::warn!("descriptor cache limit of {limit} reached, returning uncached descriptor");
        }
        reserved
    }
}

impl Default for DescriptorCache {
    fn default() -> Self {
        Self::new()
    }
}
