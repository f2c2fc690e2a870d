//! Sequence accumulator.
//!
//! Holds the flat, ordered run of items assembled from pager pages. The
//! sequence only ever grows at its ends; a dataset switch discards it wholesale
//! and starts a new generation.

use std::collections::VecDeque;
use std::ops::Range;

use rustc_hash::FxHashSet;

use crate::item::{Item, ItemId, SourceKey};

/// The fields of a [`Sequence`] the window-sync classifier compares.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SequenceSnapshot {
    pub len: usize,
    pub first_id: Option<ItemId>,
    pub last_id: Option<ItemId>,
    /// Bumped every time the sequence is discarded for a new source.
    pub generation: u64,
}

impl SequenceSnapshot {
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

/// Ordered, duplicate-free list of items for one source.
#[derive(Debug)]
pub struct Sequence<P> {
    source: SourceKey,
    generation: u64,
    items: VecDeque<Item<P>>,
    ids: FxHashSet<ItemId>,
}

impl<P> Sequence<P> {
    pub fn new(source: SourceKey) -> Self {
        Self {
            source,
            generation: 0,
            items: VecDeque::new(),
            ids: FxHashSet::default(),
        }
    }

    pub fn source(&self) -> &SourceKey {
        &self.source
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Item<P>> {
        self.items.get(index)
    }

    pub fn first_id(&self) -> Option<ItemId> {
        self.items.front().map(Item::id)
    }

    pub fn last_id(&self) -> Option<ItemId> {
        self.items.back().map(Item::id)
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.ids.contains(&id)
    }

    /// Position of `id` in the sequence. Linear in the sequence length.
    pub fn index_of(&self, id: ItemId) -> Option<usize> {
        if !self.contains(id) {
            return None;
        }
        self.items.iter().position(|item| item.id() == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Item<P>> + '_ {
        self.items.iter()
    }

    /// Items in `range`, clamped to the sequence bounds.
    pub fn range(&self, range: Range<usize>) -> impl Iterator<Item = &Item<P>> + '_ {
        let end = range.end.min(self.items.len());
        let start = range.start.min(end);
        self.items.range(start..end)
    }

    pub fn snapshot(&self) -> SequenceSnapshot {
        SequenceSnapshot {
            len: self.items.len(),
            first_id: self.first_id(),
            last_id: self.last_id(),
            generation: self.generation,
        }
    }

    /// Adds `items` after the current last item, in order.
    ///
    /// Items whose id is already present are skipped. Returns how many were
    /// admitted.
    pub fn append(&mut self, items: impl IntoIterator<Item = Item<P>>) -> usize {
        let mut admitted = 0;
        for item in items {
            if self.ids.insert(item.id()) {
                self.items.push_back(item);
                admitted += 1;
            }
        }
        admitted
    }

    /// Adds `items` before the current first item.
    ///
    /// `items` are given in sequence order (the last of them ends up directly
    /// before the old first item). Duplicates are skipped. Returns how many were
    /// admitted.
    pub fn prepend(&mut self, items: impl IntoIterator<Item = Item<P>>) -> usize {
        let fresh: Vec<Item<P>> = items
            .into_iter()
            .filter(|item| !self.ids.contains(&item.id()))
            .collect();
        let mut admitted = 0;
        for item in fresh.into_iter().rev() {
            if self.ids.insert(item.id()) {
                self.items.push_front(item);
                admitted += 1;
            }
        }
        admitted
    }

    /// Discards every item and starts a new generation for `source`.
    pub fn reset(&mut self, source: SourceKey) {
        self.items.clear();
        self.ids.clear();
        self.source = source;
        self.generation = self.generation.wrapping_add(1);
    }
}
