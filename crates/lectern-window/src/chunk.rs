//! Chunk arithmetic and the visible chunk window.
//!
//! Chunks are a pure indexing device: chunk `i` covers sequence indices
//! `[i * chunk_size, (i + 1) * chunk_size)`. Nothing is stored per chunk except
//! the measured heights kept by the measurer.

use std::ops::Range;

/// Fixed-size partition of the sequence.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChunkLayout {
    chunk_size: usize,
}

impl ChunkLayout {
    /// Creates a layout. A zero chunk size is bumped to one.
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
        }
    }

    #[inline]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Number of chunks needed to cover `len` items (`ceil(len / chunk_size)`).
    #[inline]
    pub fn total_chunks(&self, len: usize) -> usize {
        len.div_ceil(self.chunk_size)
    }

    /// Chunk containing sequence index `index`; also the number of whole
    /// chunks in `index` items.
    #[inline]
    pub fn chunk_of(&self, index: usize) -> usize {
        index / self.chunk_size
    }

    /// Sequence indices covered by `chunk`, clamped to `len`.
    pub fn chunk_items(&self, chunk: usize, len: usize) -> Range<usize> {
        let start = chunk.saturating_mul(self.chunk_size).min(len);
        let end = start.saturating_add(self.chunk_size).min(len);
        start..end
    }

    /// Sequence indices covered by `window`, clamped to `len`.
    pub fn window_items(&self, window: ChunkWindow, len: usize) -> Range<usize> {
        let start = window.start.saturating_mul(self.chunk_size).min(len);
        let end = window.end.saturating_mul(self.chunk_size).min(len);
        start..end.max(start)
    }
}

/// Contiguous range `[start, end)` of chunk indices currently materialized.
///
/// A well-formed window satisfies `start < end`; use [`ChunkWindow::clamped`] to
/// bring any window back into shape against the current chunk count.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ChunkWindow {
    pub start: usize,
    pub end: usize,
}

impl Default for ChunkWindow {
    fn default() -> Self {
        Self::INITIAL
    }
}

impl ChunkWindow {
    /// The window of an empty or freshly loaded sequence.
    pub const INITIAL: ChunkWindow = ChunkWindow { start: 0, end: 1 };

    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Number of chunks in the window.
    #[inline]
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    #[inline]
    pub fn contains(&self, chunk: usize) -> bool {
        chunk >= self.start && chunk < self.end
    }

    pub fn chunks(&self) -> Range<usize> {
        self.start..self.end
    }

    /// Returns a window satisfying `0 <= start < end <= max(total_chunks, 1)`.
    ///
    /// `end` is pulled down to the chunk count, then `start` is pulled below
    /// `end`. With no chunks at all the result is [`ChunkWindow::INITIAL`].
    pub fn clamped(self, total_chunks: usize) -> ChunkWindow {
        if total_chunks == 0 {
            return ChunkWindow::INITIAL;
        }
        let end = self.end.clamp(1, total_chunks);
        let start = self.start.min(end - 1);
        ChunkWindow { start, end }
    }

    /// Shrinks the window from the leading side so it spans at most `max` chunks.
    pub fn capped_from_start(self, max: usize) -> ChunkWindow {
        let max = max.max(1);
        if self.len() > max {
            ChunkWindow {
                start: self.end - max,
                end: self.end,
            }
        } else {
            self
        }
    }

    /// Shrinks the window from the trailing side so it spans at most `max` chunks.
    pub fn capped_from_end(self, max: usize) -> ChunkWindow {
        let max = max.max(1);
        if self.len() > max {
            ChunkWindow {
                start: self.start,
                end: self.start + max,
            }
        } else {
            self
        }
    }
}
