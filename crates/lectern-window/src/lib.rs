//! Bidirectional, chunk-windowed virtualization for very long ordered sequences.
//!
//! A reading view over thousands of verses cannot keep every verse in the render
//! tree. This crate keeps a small window of fixed-size chunks materialized,
//! grows the underlying sequence through a cursor pager in both directions, and
//! keeps the reader's visual position stable while history is inserted above
//! the viewport.
//!
//! The pieces, leaves first:
//!
//! - [`Sequence`]: the append/prepend-growing item list for one source
//! - [`WindowSync`]: classifies sequence growth and moves the window bounds
//! - [`BottomEdgeController`] / [`TopEdgeController`]: decide, per edge, between
//!   revealing a buffered chunk and fetching a page
//! - [`VisibleExtentMeasurer`]: measures visible chunks into [`ChunkHeightCache`]
//! - [`ScrollAnchorPreserver`]: keeps the topmost item in place across prepends
//! - [`WindowFrame`]: the render list (leading spacer, sentinels, items)
//! - [`ScrollWindow`]: all of the above wired together
//!
//! The host supplies a [`CursorPager`], reports sentinel visibility as
//! [`EdgeSignal`]s, and implements [`ExtentOracle`] and [`ScrollHost`] over its
//! layout system.

mod anchor;
mod chunk;
mod classifier;
mod config;
mod edge;
mod engine;
mod error;
mod item;
mod measure;
mod pager;
mod renderer;
mod sequence;

pub use anchor::{AnchorRestore, ScrollAnchor, ScrollAnchorPreserver, ScrollHost};
pub use chunk::{ChunkLayout, ChunkWindow};
pub use classifier::{apply_growth, classify, GrowthClass, WindowSync};
pub use config::{
    WindowConfig, DEFAULT_CHUNK_SIZE, DEFAULT_EDGE_COOLDOWN, DEFAULT_FETCH_PROXIMITY,
    DEFAULT_MAX_VISIBLE_CHUNKS, DEFAULT_PAGE_LIMIT,
};
pub use edge::{
    apply_reveal, BottomEdgeController, BottomEdgeState, Cooldown, EdgeAction, EdgeSignal,
    TopEdgeController, TopEdgeState,
};
pub use engine::{EdgeOutcome, FetchCompletion, LayoutReport, ScrollWindow};
pub use error::{ConfigError, PagerError};
pub use item::{Item, ItemId, SourceKey};
pub use measure::{ChunkHeightCache, ExtentOracle, MeasuredChunks, VisibleExtentMeasurer};
pub use pager::{
    BeginRefusal, Cursor, CursorPager, Direction, FetchStatus, FetchTicket, FinishKind, Page,
    PageLink, PageRequest, PagerState,
};
pub use renderer::{FrameNode, WindowFrame};
pub use sequence::{Sequence, SequenceSnapshot};

pub use web_time::{Duration, Instant};
