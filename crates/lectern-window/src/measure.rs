//! Visible-extent measurement and the chunk height cache.
//!
//! The measurer is the only writer of [`ChunkHeightCache`]. It measures every
//! chunk of the current window independently, so a chunk's entry stays valid
//! after that chunk is windowed out and can size the leading spacer.

use std::ops::Range;

use rustc_hash::FxHashMap;
use smallvec::SmallVec;

use crate::chunk::{ChunkLayout, ChunkWindow};
use crate::item::ItemId;

/// Chunk indices touched by one measurement pass.
pub type MeasuredChunks = SmallVec<[usize; 8]>;

/// Layout measurement capability supplied by the host renderer.
pub trait ExtentOracle {
    /// Total extent along the scroll axis of the rendered items in `rendered`.
    ///
    /// Indices are relative to the first rendered item. Returns `None` when the
    /// items are not laid out yet.
    fn rendered_extent(&self, rendered: Range<usize>) -> Option<f32>;
}

/// Last measured extent of each chunk, keyed by chunk index.
#[derive(Clone, Debug, Default)]
pub struct ChunkHeightCache {
    heights: FxHashMap<usize, f32>,
}

impl ChunkHeightCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, chunk: usize) -> Option<f32> {
        self.heights.get(&chunk).copied()
    }

    pub fn len(&self) -> usize {
        self.heights.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heights.is_empty()
    }

    /// Mean of the cached extents, or zero when nothing is cached.
    pub fn average(&self) -> f32 {
        if self.heights.is_empty() {
            return 0.0;
        }
        self.heights.values().sum::<f32>() / self.heights.len() as f32
    }

    /// Extent standing in for the chunks before `start_chunk`.
    ///
    /// Chunks that were never measured count as the cache average.
    pub fn leading_extent(&self, start_chunk: usize) -> f32 {
        let mut fallback = None;
        (0..start_chunk)
            .map(|chunk| {
                self.get(chunk)
                    .unwrap_or_else(|| *fallback.get_or_insert_with(|| self.average()))
            })
            .sum()
    }

    /// Moves every entry `chunks` indices up, after that many chunks of items
    /// were inserted before the first one.
    fn shift(&mut self, chunks: usize) {
        if chunks == 0 {
            return;
        }
        self.heights = self
            .heights
            .drain()
            .map(|(chunk, extent)| (chunk + chunks, extent))
            .collect();
    }

    fn insert(&mut self, chunk: usize, extent: f32) {
        self.heights.insert(chunk, extent);
    }

    fn clear(&mut self) {
        self.heights.clear();
    }
}

/// What the rendered item set looked like at the last measurement.
#[derive(Clone, Debug, PartialEq, Eq)]
struct RenderedSet {
    window: ChunkWindow,
    items: Range<usize>,
    first_id: Option<ItemId>,
    last_id: Option<ItemId>,
    revision: u64,
}

/// Measures the chunks of the current window and owns the height cache.
#[derive(Debug, Default)]
pub struct VisibleExtentMeasurer {
    cache: ChunkHeightCache,
    measured: Option<RenderedSet>,
    revision: u64,
}

impl VisibleExtentMeasurer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache(&self) -> &ChunkHeightCache {
        &self.cache
    }

    /// Forces the next [`measure`](Self::measure) to run even if the window did
    /// not move, e.g. after item content changed in place.
    pub fn invalidate(&mut self) {
        self.revision = self.revision.wrapping_add(1);
    }

    /// Drops every cached extent; used when the dataset is replaced.
    pub fn reset(&mut self) {
        self.cache.clear();
        self.measured = None;
        self.invalidate();
    }

    /// Re-keys the cache after `chunks` whole chunks were prepended.
    pub fn shift_chunks(&mut self, chunks: usize) {
        if chunks > 0 {
            log::trace!("shifting cached extents by {} chunks", chunks);
            self.cache.shift(chunks);
            self.measured = None;
        }
    }

    /// Remeasures every chunk in `window` if the rendered item set changed.
    ///
    /// `rendered_ids` are the ids of the first and last rendered items. Chunks
    /// the oracle cannot measure keep their previous entry. Returns the chunks
    /// written in this pass.
    pub fn measure(
        &mut self,
        window: ChunkWindow,
        layout: ChunkLayout,
        len: usize,
        rendered_ids: (Option<ItemId>, Option<ItemId>),
        oracle: &dyn ExtentOracle,
    ) -> MeasuredChunks {
        let items = layout.window_items(window, len);
        let current = RenderedSet {
            window,
            items: items.clone(),
            first_id: rendered_ids.0,
            last_id: rendered_ids.1,
            revision: self.revision,
        };
        if self.measured.as_ref() == Some(&current) {
            return MeasuredChunks::new();
        }

        let mut written = MeasuredChunks::new();
        let mut complete = true;
        for chunk in window.chunks() {
            let chunk_items = layout.chunk_items(chunk, len);
            if chunk_items.is_empty() {
                continue;
            }
            // Offset against the first rendered item so only this chunk's
            // items are spanned.
            let relative = (chunk_items.start - items.start)..(chunk_items.end - items.start);
            match oracle.rendered_extent(relative) {
                Some(extent) if extent.is_finite() && extent >= 0.0 => {
                    log::trace!("chunk {} measured at {:.1}", chunk, extent);
                    self.cache.insert(chunk, extent);
                    written.push(chunk);
                }
                _ => {
                    log::trace!("chunk {} not laid out, keeping cached extent", chunk);
                    complete = false;
                }
            }
        }

        // A partial pass is retried on the next layout.
        self.measured = complete.then_some(current);
        written
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    /// Every item is `item_height` tall; items from `rendered` on are not laid
    /// out.
    struct UniformOracle {
        item_height: f32,
        rendered: usize,
        calls: Cell<usize>,
    }

    impl UniformOracle {
        fn new(item_height: f32, rendered: usize) -> Self {
            Self {
                item_height,
                rendered,
                calls: Cell::new(0),
            }
        }
    }

    impl ExtentOracle for UniformOracle {
        fn rendered_extent(&self, rendered: Range<usize>) -> Option<f32> {
            self.calls.set(self.calls.get() + 1);
            if rendered.end > self.rendered {
                return None;
            }
            Some(rendered.len() as f32 * self.item_height)
        }
    }

    const IDS: (Option<ItemId>, Option<ItemId>) = (Some(ItemId(1)), Some(ItemId(200)));

    #[test]
    fn measures_each_chunk_independently() {
        let mut measurer = VisibleExtentMeasurer::new();
        let layout = ChunkLayout::new(50);
        let oracle = UniformOracle::new(20.0, 120);

        let written = measurer.measure(ChunkWindow::new(1, 4), layout, 170, IDS, &oracle);

        assert_eq!(written.as_slice(), &[1, 2, 3]);
        assert_eq!(measurer.cache().get(1), Some(1000.0));
        assert_eq!(measurer.cache().get(2), Some(1000.0));
        assert_eq!(measurer.cache().get(3), Some(400.0));
        assert_eq!(measurer.cache().get(0), None);
    }

    #[test]
    fn skips_unrendered_chunks_without_zeroing() {
        let mut measurer = VisibleExtentMeasurer::new();
        let layout = ChunkLayout::new(50);
        measurer.measure(
            ChunkWindow::new(0, 2),
            layout,
            100,
            IDS,
            &UniformOracle::new(20.0, 100),
        );

        measurer.invalidate();
        let written = measurer.measure(
            ChunkWindow::new(0, 2),
            layout,
            100,
            IDS,
            &UniformOracle::new(30.0, 0),
        );

        assert!(written.is_empty());
        assert_eq!(measurer.cache().get(0), Some(1000.0));
        assert_eq!(measurer.cache().get(1), Some(1000.0));
    }

    #[test]
    fn unchanged_render_is_not_remeasured() {
        let mut measurer = VisibleExtentMeasurer::new();
        let layout = ChunkLayout::new(50);
        let oracle = UniformOracle::new(20.0, 100);

        measurer.measure(ChunkWindow::new(0, 2), layout, 100, IDS, &oracle);
        let calls = oracle.calls.get();
        measurer.measure(ChunkWindow::new(0, 2), layout, 100, IDS, &oracle);
        assert_eq!(oracle.calls.get(), calls);

        measurer.invalidate();
        measurer.measure(ChunkWindow::new(0, 2), layout, 100, IDS, &oracle);
        assert!(oracle.calls.get() > calls);
    }

    #[test]
    fn height_survives_windowing_out() {
        let mut measurer = VisibleExtentMeasurer::new();
        let layout = ChunkLayout::new(50);
        measurer.measure(
            ChunkWindow::new(0, 2),
            layout,
            150,
            IDS,
            &UniformOracle::new(12.0, 100),
        );
        let h = measurer.cache().get(0).unwrap();

        measurer.measure(
            ChunkWindow::new(1, 3),
            layout,
            150,
            IDS,
            &UniformOracle::new(20.0, 100),
        );

        assert_eq!(measurer.cache().get(0), Some(h));
        assert_eq!(measurer.cache().leading_extent(1), h);
        assert_eq!(
            measurer.cache().leading_extent(2),
            h + measurer.cache().get(1).unwrap()
        );
    }

    #[test]
    fn zero_extent_is_a_measurement() {
        let mut measurer = VisibleExtentMeasurer::new();
        let layout = ChunkLayout::new(50);
        let oracle = UniformOracle::new(0.0, 100);

        let written = measurer.measure(ChunkWindow::new(0, 2), layout, 100, IDS, &oracle);
        assert_eq!(written.as_slice(), &[0, 1]);
        assert_eq!(measurer.cache().get(0), Some(0.0));

        let calls = oracle.calls.get();
        measurer.measure(ChunkWindow::new(0, 2), layout, 100, IDS, &oracle);
        assert_eq!(oracle.calls.get(), calls);
    }

    #[test]
    fn shift_moves_heights_with_their_items() {
        let mut measurer = VisibleExtentMeasurer::new();
        let layout = ChunkLayout::new(50);
        let oracle = UniformOracle::new(20.0, 100);
        measurer.measure(ChunkWindow::new(0, 2), layout, 100, IDS, &oracle);

        measurer.shift_chunks(2);
        assert_eq!(measurer.cache().get(0), None);
        assert_eq!(measurer.cache().get(2), Some(1000.0));
        assert_eq!(measurer.cache().get(3), Some(1000.0));
        assert_eq!(measurer.cache().leading_extent(3), 3000.0);

        // The shifted set is measured again at its new indices.
        let calls = oracle.calls.get();
        measurer.measure(ChunkWindow::new(0, 2), layout, 100, IDS, &oracle);
        assert!(oracle.calls.get() > calls);
    }

    #[test]
    fn leading_extent_estimates_unmeasured_chunks() {
        let mut cache = ChunkHeightCache::new();
        cache.insert(1, 300.0);
        cache.insert(2, 500.0);
        assert_eq!(cache.average(), 400.0);
        assert_eq!(cache.leading_extent(3), 400.0 + 300.0 + 500.0);
        assert_eq!(ChunkHeightCache::new().leading_extent(4), 0.0);
    }
}
