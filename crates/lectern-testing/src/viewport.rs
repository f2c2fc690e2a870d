//! A scroll container with a fixed-height viewport and a trivial block layout.
//!
//! Rendering lays a [`WindowFrame`] out top to bottom: the leading spacer, the
//! previous-page loading indicator, the top sentinel, the items and the bottom
//! sentinel followed by the next-page loading indicator. Sentinels take no
//! space. Edge signals emulate an intersection observer with a root margin.

use std::ops::Range;

use lectern_window::{
    EdgeSignal, ExtentOracle, Item, ItemId, ScrollHost, ScrollWindow, WindowFrame,
};

pub const DEFAULT_ROOT_MARGIN: f32 = 200.0;
pub const DEFAULT_INDICATOR_HEIGHT: f32 = 32.0;

#[derive(Clone, Copy, Debug, PartialEq)]
struct Block {
    id: ItemId,
    top: f32,
    height: f32,
}

#[derive(Debug)]
pub struct FakeViewport {
    height: f32,
    root_margin: f32,
    indicator_height: f32,
    scroll: f32,
    spacer: f32,
    items_top: f32,
    items_bottom: f32,
    content_height: f32,
    blocks: Vec<Block>,
    laid_out: bool,
}

impl FakeViewport {
    pub fn new(height: f32) -> Self {
        Self {
            height,
            root_margin: DEFAULT_ROOT_MARGIN,
            indicator_height: DEFAULT_INDICATOR_HEIGHT,
            scroll: 0.0,
            spacer: 0.0,
            items_top: 0.0,
            items_bottom: 0.0,
            content_height: 0.0,
            blocks: Vec::new(),
            laid_out: true,
        }
    }

    pub fn with_root_margin(mut self, margin: f32) -> Self {
        self.root_margin = margin;
        self
    }

    /// While unset, measurements report the items as not laid out.
    pub fn set_laid_out(&mut self, laid_out: bool) {
        self.laid_out = laid_out;
    }

    /// Lays out the engine's current frame.
    pub fn render<P>(&mut self, engine: &ScrollWindow<P>, height_of: impl Fn(&Item<P>) -> f32) {
        let frame = engine.frame();
        let items = frame
            .visible_items(engine.sequence())
            .map(|item| (item.id(), height_of(item)));
        self.layout(&frame, items);
    }

    fn layout(&mut self, frame: &WindowFrame, items: impl Iterator<Item = (ItemId, f32)>) {
        let mut y = frame.leading_spacer;
        self.spacer = frame.leading_spacer;
        if frame.loading_previous {
            y += self.indicator_height;
        }
        self.items_top = y;
        self.blocks.clear();
        for (id, height) in items {
            self.blocks.push(Block { id, top: y, height });
            y += height;
        }
        self.items_bottom = y;
        if frame.loading_next {
            y += self.indicator_height;
        }
        self.content_height = y;
        self.scroll = self.scroll.clamp(0.0, self.max_scroll());
        log::trace!(
            "laid out {} items, spacer {:.1}, content {:.1}",
            self.blocks.len(),
            self.spacer,
            self.content_height
        );
    }

    pub fn viewport_height(&self) -> f32 {
        self.height
    }

    pub fn content_height(&self) -> f32 {
        self.content_height
    }

    pub fn spacer(&self) -> f32 {
        self.spacer
    }

    pub fn max_scroll(&self) -> f32 {
        (self.content_height - self.height).max(0.0)
    }

    pub fn rendered_count(&self) -> usize {
        self.blocks.len()
    }

    pub fn rendered_ids(&self) -> impl Iterator<Item = ItemId> + '_ {
        self.blocks.iter().map(|block| block.id)
    }

    /// Content offset of `id`'s leading edge, if rendered.
    pub fn item_top(&self, id: ItemId) -> Option<f32> {
        self.blocks
            .iter()
            .find(|block| block.id == id)
            .map(|block| block.top)
    }

    /// Scrolls by `delta` and returns the distance actually travelled.
    pub fn scroll_by(&mut self, delta: f32) -> f32 {
        let before = self.scroll;
        self.scroll = (self.scroll + delta).clamp(0.0, self.max_scroll());
        self.scroll - before
    }

    pub fn scroll_to(&mut self, offset: f32) {
        self.scroll = offset.clamp(0.0, self.max_scroll());
    }

    pub fn at_bottom(&self) -> bool {
        self.scroll >= self.max_scroll()
    }

    fn observed(&self, y: f32) -> bool {
        y >= self.scroll - self.root_margin && y <= self.scroll + self.height + self.root_margin
    }

    /// Signal for the sentinel before the first rendered item.
    pub fn top_signal(&self) -> EdgeSignal {
        EdgeSignal::new(self.observed(self.items_top), self.scroll)
    }

    /// Signal for the sentinel after the last rendered item.
    pub fn bottom_signal(&self) -> EdgeSignal {
        let remaining = (self.content_height - (self.scroll + self.height)).max(0.0);
        EdgeSignal::new(self.observed(self.items_bottom), remaining)
    }
}

impl ExtentOracle for FakeViewport {
    fn rendered_extent(&self, rendered: Range<usize>) -> Option<f32> {
        if !self.laid_out || rendered.end > self.blocks.len() {
            return None;
        }
        Some(self.blocks[rendered].iter().map(|block| block.height).sum())
    }
}

impl ScrollHost for FakeViewport {
    fn scroll_offset(&self) -> f32 {
        self.scroll
    }

    fn set_scroll_offset(&mut self, offset: f32) {
        self.scroll_to(offset);
    }

    fn topmost_visible_item(&self) -> Option<(ItemId, f32)> {
        self.blocks
            .iter()
            .find(|block| block.top + block.height > self.scroll)
            .map(|block| (block.id, block.top - self.scroll))
    }

    fn item_offset(&self, id: ItemId) -> Option<f32> {
        self.item_top(id).map(|top| top - self.scroll)
    }
}
