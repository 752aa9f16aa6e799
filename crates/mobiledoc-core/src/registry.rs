//! Deduplicating, insertion-ordered stores for markups and cards.
//!
//! Entries are identified by their position: the first registration of a
//! value appends it, every later registration of a structurally equal value
//! returns the same index. Lookup goes through a canonical string key, so
//! registration is O(1) amortized while iteration still follows first-seen
//! order.

use indexmap::IndexMap;
use log::trace;

use crate::model::{Card, Markup};

/// Values that can live in a [`Registry`].
pub trait Registrable {
    /// Canonical encoding: two values are the same registry entry exactly
    /// when their keys are equal.
    fn registry_key(&self) -> String;
}

/// Insertion-ordered set of values addressed by index.
#[derive(Debug, Clone)]
pub struct Registry<T> {
    entries: IndexMap<String, T>,
}

/// Registry of inline formatting descriptors.
pub type MarkupRegistry = Registry<Markup>;

/// Registry of block card descriptors.
pub type CardRegistry = Registry<Card>;

impl<T: Registrable> Registry<T> {
    pub fn new() -> Self {
        Self {
            entries: IndexMap::new(),
        }
    }

    /// Register `value`, returning its index.
    ///
    /// An already-present value is not appended again.
    pub fn register(&mut self, value: T) -> usize {
        let key = value.registry_key();
        if let Some(index) = self.entries.get_index_of(&key) {
            return index;
        }
        let (index, _) = self.entries.insert_full(key, value);
        trace!("registry grew to {} entries", self.entries.len());
        index
    }

    /// Index of a structurally equal entry, without registering.
    pub fn position(&self, value: &T) -> Option<usize> {
        self.entries.get_index_of(&value.registry_key())
    }
}

impl<T> Registry<T> {
    /// Entry at `index`.
    pub fn get(&self, index: usize) -> Option<&T> {
        self.entries.get_index(index).map(|(_, value)| value)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Check whether `index` addresses an entry.
    pub fn contains_index(&self, index: usize) -> bool {
        index < self.entries.len()
    }

    /// Iterate entries in registration order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = &T> + '_ {
        self.entries.values()
    }

    /// Remember the current length so later registrations can be undone.
    pub(crate) fn checkpoint(&self) -> usize {
        self.entries.len()
    }

    /// Drop every entry registered after `checkpoint`.
    pub(crate) fn rollback(&mut self, checkpoint: usize) {
        if checkpoint < self.entries.len() {
            trace!(
                "registry rollback from {} to {} entries",
                self.entries.len(),
                checkpoint
            );
            self.entries.truncate(checkpoint);
        }
    }
}

impl<T: Registrable> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a, T> IntoIterator for &'a Registry<T> {
    type Item = &'a T;
    type IntoIter = indexmap::map::Values<'a, String, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.values()
    }
}
