//! Robot-style harness driving a [`ScrollWindow`] end to end.
//!
//! The robot owns the engine, a [`FakePager`], a [`FakeViewport`] and a
//! [`ManualClock`], and plays the host's event loop one frame at a time:
//!
//! 1. advance the clock by one frame
//! 2. lay out the current frame, then run the post-layout hook
//! 3. feed both sentinels' signals to the engine
//! 4. if that changed anything, lay out and run the post-layout hook again
//!
//! # Example
//!
//! ```
//! use lectern_testing::prelude::*;
//! use lectern_window::{SourceKey, WindowConfig};
//!
//! let mut robot = ReaderRobot::new(
//!     WindowConfig::default(),
//!     SourceKey::new("genesis", 1),
//!     verses(1..=1000),
//!     Delivery::Immediate,
//!     600.0,
//! )
//! .unwrap();
//!
//! robot.start();
//! robot.read_forward(2_000.0, 40.0);
//! assert!(robot.engine().window().len() <= 4);
//! ```

use lectern_window::{
    AnchorRestore, ConfigError, EdgeOutcome, FetchCompletion, Item, ItemId, LayoutReport,
    ScrollHost, ScrollWindow, SourceKey, WindowConfig,
};

use crate::book::{verse_height, Verse};
use crate::clock::ManualClock;
use crate::pager::{Delivery, FakePager};
use crate::viewport::FakeViewport;

/// Nominal frame period.
pub const FRAME_MILLIS: u64 = 16;

/// Counters collected while the robot runs.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RobotStats {
    pub frames: usize,
    pub reveals: usize,
    pub fetches: usize,
    pub anchor_adjustments: usize,
    pub missing_anchors: usize,
    pub max_rendered: usize,
}

pub struct ReaderRobot<P> {
    engine: ScrollWindow<P>,
    pager: FakePager<P>,
    viewport: FakeViewport,
    clock: ManualClock,
    height_of: fn(&Item<P>) -> f32,
    stats: RobotStats,
}

impl ReaderRobot<Verse> {
    /// A robot reading synthetic verses.
    pub fn new(
        config: WindowConfig,
        source: SourceKey,
        book: Vec<Item<Verse>>,
        delivery: Delivery,
        viewport_height: f32,
    ) -> Result<Self, ConfigError> {
        Self::with_heights(
            config,
            source,
            book,
            delivery,
            FakeViewport::new(viewport_height),
            verse_height,
        )
    }
}

impl<P: Clone> ReaderRobot<P> {
    pub fn with_heights(
        config: WindowConfig,
        source: SourceKey,
        book: Vec<Item<P>>,
        delivery: Delivery,
        viewport: FakeViewport,
        height_of: fn(&Item<P>) -> f32,
    ) -> Result<Self, ConfigError> {
        Ok(Self {
            engine: ScrollWindow::new(config, source)?,
            pager: FakePager::new(book, delivery),
            viewport,
            clock: ManualClock::new(),
            height_of,
            stats: RobotStats::default(),
        })
    }

    pub fn engine(&self) -> &ScrollWindow<P> {
        &self.engine
    }

    pub fn pager(&self) -> &FakePager<P> {
        &self.pager
    }

    pub fn pager_mut(&mut self) -> &mut FakePager<P> {
        &mut self.pager
    }

    pub fn viewport(&self) -> &FakeViewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut FakeViewport {
        &mut self.viewport
    }

    pub fn clock(&self) -> &ManualClock {
        &self.clock
    }

    pub fn stats(&self) -> RobotStats {
        self.stats
    }

    /// Issues the first page request and settles.
    pub fn start(&mut self) -> EdgeOutcome {
        let outcome = self.engine.load_initial(&mut self.pager);
        self.note(&outcome);
        self.commit();
        outcome
    }

    /// Lays out the current state and runs the post-layout hook.
    pub fn commit(&mut self) -> LayoutReport {
        self.viewport.render(&self.engine, self.height_of);
        let report = self.engine.after_layout(&mut self.viewport);
        match report.anchor {
            AnchorRestore::Adjusted { .. } => self.stats.anchor_adjustments += 1,
            AnchorRestore::TargetMissing { .. } => self.stats.missing_anchors += 1,
            AnchorRestore::Idle => {}
        }
        self.stats.max_rendered = self.stats.max_rendered.max(self.viewport.rendered_count());
        report
    }

    /// Runs one frame and returns what each edge did, top first.
    pub fn frame(&mut self) -> (EdgeOutcome, EdgeOutcome) {
        self.clock.advance_millis(FRAME_MILLIS);
        self.stats.frames += 1;
        self.commit();

        let now = self.clock.now();
        let top = self.engine.on_top_intersection(
            self.viewport.top_signal(),
            now,
            &mut self.pager,
            &self.viewport,
        );
        self.note(&top);
        let bottom =
            self.engine
                .on_bottom_intersection(self.viewport.bottom_signal(), now, &mut self.pager);
        self.note(&bottom);

        if top != EdgeOutcome::Idle || bottom != EdgeOutcome::Idle {
            self.commit();
        }
        (top, bottom)
    }

    pub fn frames(&mut self, count: usize) {
        for _ in 0..count {
            self.frame();
        }
    }

    /// Lets `millis` pass frame by frame.
    pub fn idle_for(&mut self, millis: u64) {
        self.frames(millis.div_ceil(FRAME_MILLIS) as usize);
    }

    /// User scroll by `delta` followed by one frame. Returns the distance
    /// actually scrolled.
    pub fn scroll_by(&mut self, delta: f32) -> f32 {
        let moved = self.viewport.scroll_by(delta);
        self.frame();
        moved
    }

    /// Scrolls down `distance` in steps of `step`, one frame per step.
    pub fn read_forward(&mut self, distance: f32, step: f32) -> f32 {
        self.read(distance, step.abs())
    }

    /// Scrolls up `distance` in steps of `step`, one frame per step.
    pub fn read_backward(&mut self, distance: f32, step: f32) -> f32 {
        self.read(distance, -step.abs())
    }

    fn read(&mut self, distance: f32, step: f32) -> f32 {
        let mut travelled = 0.0;
        let mut stalled = 0;
        while travelled < distance && stalled < 64 {
            let moved = self.scroll_by(step);
            if moved == 0.0 {
                stalled += 1;
            } else {
                stalled = 0;
            }
            travelled += moved.abs();
        }
        travelled
    }

    /// Resolves the oldest deferred page and lays out the result.
    pub fn resolve_next(&mut self) -> Option<FetchCompletion> {
        let (ticket, result) = self.pager.resolve_next()?;
        let completion = self.engine.complete_fetch(ticket, result);
        self.commit();
        Some(completion)
    }

    pub fn switch_source(&mut self, source: SourceKey) -> EdgeOutcome {
        self.engine.switch_source(source);
        self.viewport.scroll_to(0.0);
        self.start()
    }

    /// The topmost visible item and its offset from the viewport top.
    pub fn reading_position(&self) -> Option<(ItemId, f32)> {
        self.viewport.topmost_visible_item()
    }

    pub fn scroll_offset(&self) -> f32 {
        self.viewport.scroll_offset()
    }

    fn note(&mut self, outcome: &EdgeOutcome) {
        match outcome {
            EdgeOutcome::Revealed(_) => self.stats.reveals += 1,
            EdgeOutcome::FetchStarted(_) | EdgeOutcome::Fetched(_) => self.stats.fetches += 1,
            EdgeOutcome::Idle | EdgeOutcome::Refused(_) => {}
        }
    }
}
