//! Typed side-table for extension data attached to a document.

use std::{
    any::{Any, TypeId},
    collections::HashMap,
    fmt,
    marker::PhantomData,
};

/// Typed key into an [`ItemBag`].
///
/// Keys are usually declared as constants next to the extension that owns them:
///
/// ```rust
/// use tagscope::document::{ItemBag, ItemKey};
///
/// const VISIT_COUNT: ItemKey<u32> = ItemKey::new("my-extension.visit-count");
///
/// let mut items = ItemBag::default();
/// items.insert(&VISIT_COUNT, 3);
/// assert_eq!(items.get(&VISIT_COUNT), Some(&3));
/// ```
pub struct ItemKey<T> {
    name: &'static str,
    _marker: PhantomData<fn() -> T>,
}

impl<T> ItemKey<T> {
    /// Create a key with a unique name
    #[must_use]
    pub const fn new(name: &'static str) -> Self {
        ItemKey {
            name,
            _marker: PhantomData,
        }
    }

    /// The key name
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }
}

impl<T> fmt::Debug for ItemKey<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("ItemKey").field(&self.name).finish()
    }
}

impl<T> Clone for ItemKey<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for ItemKey<T> {}

/// Map from [`ItemKey`] to a value of the key's type.
///
/// Entries are addressed by key name and value type together, so two keys sharing a name but
/// not a type never alias.
#[derive(Default)]
pub struct ItemBag {
    items: HashMap<(&'static str, TypeId), Box<dyn Any + Send + Sync>>,
}

impl ItemBag {
    /// Store `value` under `key`, returning the previous value
    pub fn insert<T: Any + Send + Sync>(&mut self, key: &ItemKey<T>, value: T) -> Option<T> {
        self.items
            .insert((key.name, TypeId::of::<T>()), Box::new(value))
            .and_then(|previous| previous.downcast::<T>().ok())
            .map(|previous| *previous)
    }

    /// Borrow the value stored under `key`
    #[must_use]
    pub fn get<T: Any + Send + Sync>(&self, key: &ItemKey<T>) -> Option<&T> {
        self.items
            .get(&(key.name, TypeId::of::<T>()))
            .and_then(|value| value.downcast_ref::<T>())
    }

    /// Mutably borrow the value stored under `key`
    pub fn get_mut<T: Any + Send + Sync>(&mut self, key: &ItemKey<T>) -> Option<&mut T> {
        self.items
            .get_mut(&(key.name, TypeId::of::<T>()))
            .and_then(|value| value.downcast_mut::<T>())
    }

    /// Remove and return the value stored under `key`
    pub fn remove<T: Any + Send + Sync>(&mut self, key: &ItemKey<T>) -> Option<T> {
        self.items
            .remove(&(key.name, TypeId::of::<T>()))
            .and_then(|value| value.downcast::<T>().ok())
            .map(|value| *value)
    }

    /// `true` if a value is stored under `key`
    #[must_use]
    pub fn contains<T: Any + Send + Sync>(&self, key: &ItemKey<T>) -> bool {
        self.items.contains_key(&(key.name, TypeId::of::<T>()))
    }

    /// Number of stored values
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// `true` if nothing is stored
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl fmt::Debug for ItemBag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(self.items.keys().map(|(name, _)| name))
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COUNT: ItemKey<u32> = ItemKey::new("count");
    const COUNT_TEXT: ItemKey<String> = ItemKey::new("count");
    const NAMES: ItemKey<Vec<String>> = ItemKey::new("names");

    #[test]
    fn test_insert_and_get() {
        let mut bag = ItemBag::default();
        assert!(bag.is_empty());
        assert_eq!(bag.insert(&COUNT, 1), None);
        assert_eq!(bag.insert(&COUNT, 2), Some(1));
        assert_eq!(bag.get(&COUNT), Some(&2));
        assert_eq!(bag.len(), 1);
    }

    #[test]
    fn test_same_name_different_type() {
        let mut bag = ItemBag::default();
        bag.insert(&COUNT, 7);
        bag.insert(&COUNT_TEXT, "seven".to_string());

        assert_eq!(bag.get(&COUNT), Some(&7));
        assert_eq!(bag.get(&COUNT_TEXT).map(String::as_str), Some("seven"));
        assert_eq!(bag.len(), 2);
    }

    #[test]
    fn test_get_mut_and_remove() {
        let mut bag = ItemBag::default();
        bag.insert(&NAMES, Vec::new());
        if let Some(names) = bag.get_mut(&NAMES) {
            names.push("a".to_string());
        }
        assert!(bag.contains(&NAMES));
        assert_eq!(bag.remove(&NAMES), Some(vec!["a".to_string()]));
        assert!(!bag.contains(&NAMES));
    }
}
