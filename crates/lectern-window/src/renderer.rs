//! Window renderer.
//!
//! Turns the window bounds, the sequence and the height cache into the ordered
//! list of things the host must render: a leading spacer standing in for the
//! windowed-out history, the loading indicators, the two sentinels and the
//! concrete items of the window.
//!
//! There is no trailing spacer. Chunks after the window have simply not been
//! rendered yet, so the natural end of the scroll container is the end of the
//! rendered items.

use std::ops::Range;

use crate::chunk::{ChunkLayout, ChunkWindow};
use crate::item::Item;
use crate::measure::ChunkHeightCache;
use crate::pager::{Direction, PagerState};
use crate::sequence::Sequence;

/// Everything the host needs to render one frame of the window.
#[derive(Clone, Debug, PartialEq)]
pub struct WindowFrame {
    /// Window the frame was composed for, after clamping.
    pub window: ChunkWindow,
    /// Sequence indices of the rendered items.
    pub items: Range<usize>,
    /// Extent of the spacer before the first rendered item.
    pub leading_spacer: f32,
    pub loading_previous: bool,
    pub loading_next: bool,
}

/// One entry of the render list, in document order.
#[derive(Clone, Debug, PartialEq)]
pub enum FrameNode<R> {
    Spacer(f32),
    LoadingIndicator(Direction),
    TopSentinel,
    Item(R),
    BottomSentinel,
}

impl WindowFrame {
    /// Composes a frame. Bounds that are out of shape are clamped first.
    pub fn compose(
        window: ChunkWindow,
        len: usize,
        layout: ChunkLayout,
        heights: &ChunkHeightCache,
        pager: &PagerState,
    ) -> WindowFrame {
        let total_chunks = layout.total_chunks(len);
        let clamped = window.clamped(total_chunks);
        if clamped != window {
            log::warn!(
                "render window {:?} out of shape for {} chunks, using {:?}",
                window,
                total_chunks,
                clamped
            );
        }

        WindowFrame {
            window: clamped,
            items: layout.window_items(clamped, len),
            leading_spacer: heights.leading_extent(clamped.start),
            loading_previous: pager.is_fetching_previous(),
            loading_next: pager.is_fetching_next(),
        }
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// Rendered items of `sequence`.
    pub fn visible_items<'a, P>(
        &self,
        sequence: &'a Sequence<P>,
    ) -> impl Iterator<Item = &'a Item<P>> + 'a {
        sequence.range(self.items.clone())
    }

    /// The full render list, with each item passed through `render_item`.
    pub fn nodes<P, R>(
        &self,
        sequence: &Sequence<P>,
        mut render_item: impl FnMut(&Item<P>) -> R,
    ) -> Vec<FrameNode<R>> {
        let mut nodes = Vec::with_capacity(self.items.len() + 5);
        if self.leading_spacer > 0.0 {
            nodes.push(FrameNode::Spacer(self.leading_spacer));
        }
        if self.loading_previous {
            nodes.push(FrameNode::LoadingIndicator(Direction::Previous));
        }
        nodes.push(FrameNode::TopSentinel);
        nodes.extend(self.visible_items(sequence).map(|item| FrameNode::Item(render_item(item))));
        nodes.push(FrameNode::BottomSentinel);
        if self.loading_next {
            nodes.push(FrameNode::LoadingIndicator(Direction::Next));
        }
        nodes
    }
}
