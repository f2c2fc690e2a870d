//! Window-sync classifier.
//!
//! Reconciles an externally growing sequence with the local chunk window. Each
//! time the sequence may have changed, the classifier compares the previous and
//! current [`SequenceSnapshot`]s, names the kind of change ([`GrowthClass`]) and
//! moves the window bounds accordingly.
//!
//! Rules, in precedence order:
//!
//! 1. current sequence empty: reset to `[0, 1)`, class `None`
//! 2. previous sequence empty: `InitialLoad`, window `[0, min(1, total))`
//! 3. new generation, or both first and last ids changed: `DatasetSwitch`, same
//!    reset as an initial load
//! 4. grew and first id changed: `Prepend`, both bounds advance by the chunks
//!    the new items fill (one chunk for one full chunk of history)
//! 5. grew and last id changed: `Append`, `end` advances by one chunk
//! 6. anything else: `None`
//!
//! Rule 3 is checked before 4 and 5 because a simultaneous change of both ids
//! means the dataset was replaced, whatever happened to the length. The one
//! exception is a backward page that grew both ends at once: when the caller
//! passes a [`GrowthClass::Prepend`] hint, the generation is unchanged and the
//! sequence grew, the change is a prepend.
//!
//! A prepend of `n` items moves `start` by the whole chunks in `n` and `end` by
//! the chunks `n` touches, so every item rendered before the prepend is still
//! inside the window afterwards. A short backward page (less than a chunk)
//! leaves `start` in place.

use crate::chunk::{ChunkLayout, ChunkWindow};
use crate::sequence::SequenceSnapshot;

/// How the sequence changed since the last synchronization.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum GrowthClass {
    #[default]
    None,
    InitialLoad,
    DatasetSwitch,
    Prepend,
    Append,
}

/// Names the change between `previous` and `current`.
///
/// `hint` is the growth the caller expects (the engine passes `Prepend` while
/// merging a backward page); it only matters for the dual-growth case described
/// in the module docs.
pub fn classify(
    previous: &SequenceSnapshot,
    current: &SequenceSnapshot,
    hint: Option<GrowthClass>,
) -> GrowthClass {
    if current.is_empty() {
        return GrowthClass::None;
    }
    if previous.is_empty() {
        return GrowthClass::InitialLoad;
    }

    let first_changed = previous.first_id != current.first_id;
    let last_changed = previous.last_id != current.last_id;
    let grew = current.len > previous.len;

    if previous.generation != current.generation {
        return GrowthClass::DatasetSwitch;
    }
    if first_changed && last_changed {
        if grew && hint == Some(GrowthClass::Prepend) {
            return GrowthClass::Prepend;
        }
        return GrowthClass::DatasetSwitch;
    }
    if grew && first_changed {
        return GrowthClass::Prepend;
    }
    if grew && last_changed {
        return GrowthClass::Append;
    }
    GrowthClass::None
}

/// Window bounds that follow `class` for a sequence of `len` items, of which
/// `prepended` were inserted before the previous first item.
///
/// The result always satisfies `0 <= start < end <= max(total_chunks, 1)`.
pub fn apply_growth(
    class: GrowthClass,
    window: ChunkWindow,
    len: usize,
    prepended: usize,
    layout: ChunkLayout,
) -> ChunkWindow {
    let total_chunks = layout.total_chunks(len);
    let next = match class {
        GrowthClass::None if len == 0 => ChunkWindow::INITIAL,
        GrowthClass::None => window,
        GrowthClass::InitialLoad | GrowthClass::DatasetSwitch => {
            ChunkWindow::new(0, total_chunks.min(1))
        }
        GrowthClass::Prepend => ChunkWindow::new(
            window.start.saturating_add(layout.chunk_of(prepended)),
            window
                .end
                .saturating_add(layout.total_chunks(prepended))
                .min(total_chunks),
        ),
        GrowthClass::Append => {
            ChunkWindow::new(window.start, window.end.saturating_add(1).min(total_chunks))
        }
    };

    let clamped = next.clamped(total_chunks);
    if clamped != next {
        log::warn!(
            "window {:?} out of shape after {:?} over {} chunks, clamped to {:?}",
            next,
            class,
            total_chunks,
            clamped
        );
    }
    clamped
}

/// Stateful wrapper remembering the snapshot seen at the last synchronization.
#[derive(Clone, Debug)]
pub struct WindowSync {
    layout: ChunkLayout,
    previous: SequenceSnapshot,
}

impl WindowSync {
    pub fn new(layout: ChunkLayout) -> Self {
        Self {
            layout,
            previous: SequenceSnapshot::default(),
        }
    }

    pub fn layout(&self) -> ChunkLayout {
        self.layout
    }

    /// The snapshot recorded by the last call to [`WindowSync::sync`].
    pub fn previous(&self) -> &SequenceSnapshot {
        &self.previous
    }

    /// Classifies `current` against the last seen snapshot and returns the class
    /// together with the updated window. `current` becomes the new baseline.
    pub fn sync(
        &mut self,
        current: SequenceSnapshot,
        window: ChunkWindow,
        hint: Option<GrowthClass>,
    ) -> (GrowthClass, ChunkWindow) {
        let class = classify(&self.previous, &current, hint);
        let prepended = current.len.saturating_sub(self.previous.len);
        let next = apply_growth(class, window, current.len, prepended, self.layout);
        if class != GrowthClass::None || next != window {
            log::debug!(
                "window sync: {:?} len {} -> {}, window {:?} -> {:?}",
                class,
                self.previous.len,
                current.len,
                window,
                next
            );
        }
        self.previous = current;
        (class, next)
    }
}
