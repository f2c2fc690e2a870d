//! Items, item keys and sequence-source identity.

use std::fmt;

/// Stable unique key of an [`Item`].
///
/// Identity survives re-fetches, so two fetches of the same verse compare equal
/// by id even when their payloads are distinct allocations.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One unit of the ordered sequence (for example a verse).
///
/// Items are immutable once fetched.
#[derive(Clone, Debug, PartialEq)]
pub struct Item<P> {
    id: ItemId,
    ordinal: u64,
    payload: P,
}

impl<P> Item<P> {
    pub fn new(id: ItemId, ordinal: u64, payload: P) -> Self {
        Self {
            id,
            ordinal,
            payload,
        }
    }

    #[inline]
    pub fn id(&self) -> ItemId {
        self.id
    }

    /// Position of the item in the remote source.
    #[inline]
    pub fn ordinal(&self) -> u64 {
        self.ordinal
    }

    #[inline]
    pub fn payload(&self) -> &P {
        &self.payload
    }
}

/// Identity of the source a [`Sequence`](crate::Sequence) is assembled from.
///
/// Two keys that differ in either field describe different datasets: the
/// starting ordinal is part of the identity, so jumping to another chapter of the
/// same book is a dataset switch.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct SourceKey {
    pub source: String,
    pub start: u64,
}

impl SourceKey {
    pub fn new(source: impl Into<String>, start: u64) -> Self {
        Self {
            source: source.into(),
            start,
        }
    }
}

impl fmt::Display for SourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.source, self.start)
    }
}
