//! The composed windowing engine.
//!
//! [`ScrollWindow`] owns the sequence, the window bounds, the pager bookkeeping,
//! both edge controllers, the measurer and the anchor preserver, and exposes the
//! entry points a host calls from its event loop:
//!
//! - intersection callbacks: [`on_bottom_intersection`](ScrollWindow::on_bottom_intersection),
//!   [`on_top_intersection`](ScrollWindow::on_top_intersection)
//! - network completions: [`complete_fetch`](ScrollWindow::complete_fetch)
//! - rendering: [`frame`](ScrollWindow::frame)
//! - after layout, before paint: [`after_layout`](ScrollWindow::after_layout)
//!
//! Everything runs on the UI thread. The only suspension point is the pager; a
//! fetch either resolves immediately ([`FetchStatus::Ready`]) or is completed
//! later by the host.

use web_time::Instant;

use crate::anchor::{AnchorRestore, ScrollAnchor, ScrollAnchorPreserver, ScrollHost};
use crate::chunk::{ChunkLayout, ChunkWindow};
use crate::classifier::{GrowthClass, WindowSync};
use crate::config::WindowConfig;
use crate::edge::{
    apply_reveal, BottomEdgeController, BottomEdgeState, EdgeAction, EdgeSignal,
    TopEdgeController, TopEdgeState,
};
use crate::error::{ConfigError, PagerError};
use crate::item::{ItemId, SourceKey};
use crate::measure::{ChunkHeightCache, ExtentOracle, MeasuredChunks, VisibleExtentMeasurer};
use crate::pager::{
    BeginRefusal, CursorPager, Direction, FetchStatus, FetchTicket, FinishKind, Page, PagerState,
};
use crate::renderer::WindowFrame;
use crate::sequence::Sequence;

/// Result of merging a finished fetch.
#[derive(Clone, Debug, PartialEq)]
pub enum FetchCompletion {
    /// The page was merged. `admitted` counts the items that were new.
    Applied {
        direction: Direction,
        growth: GrowthClass,
        admitted: usize,
    },
    /// The pager failed; the edge may retry on a later intersection.
    Failed(PagerError),
    /// The fetch was started for a sequence that has since been replaced.
    Stale,
    /// The ticket is not the one this edge was waiting for.
    Unexpected,
}

/// What an intersection callback led to.
#[derive(Clone, Debug, PartialEq)]
pub enum EdgeOutcome {
    Idle,
    /// A buffered chunk was revealed locally.
    Revealed(ChunkWindow),
    /// A fetch is in flight; the host completes it later.
    FetchStarted(FetchTicket),
    /// A fetch started and resolved synchronously.
    Fetched(FetchCompletion),
    /// The controller wanted a fetch but the pager state refused it.
    Refused(BeginRefusal),
}

/// What [`ScrollWindow::after_layout`] did.
#[derive(Clone, Debug, PartialEq)]
pub struct LayoutReport {
    pub measured: MeasuredChunks,
    pub anchor: AnchorRestore,
}

/// Bidirectional, chunk-windowed view over a cursor-paged sequence.
pub struct ScrollWindow<P> {
    config: WindowConfig,
    layout: ChunkLayout,
    sequence: Sequence<P>,
    sync: WindowSync,
    window: ChunkWindow,
    growth: GrowthClass,
    pager: PagerState,
    bottom: BottomEdgeController,
    top: TopEdgeController,
    measurer: VisibleExtentMeasurer,
    anchors: ScrollAnchorPreserver,
    /// Anchor captured when a backward fetch started, handed to the preserver
    /// once that fetch's page is merged.
    fetch_anchor: Option<(FetchTicket, ScrollAnchor)>,
}

impl<P> ScrollWindow<P> {
    pub fn new(config: WindowConfig, source: SourceKey) -> Result<Self, ConfigError> {
        config.validate()?;
        let layout = ChunkLayout::new(config.chunk_size);
        let sequence = Sequence::new(source);
        let pager = PagerState::new(sequence.generation());
        Ok(Self {
            bottom: BottomEdgeController::new(config.edge_cooldown, config.fetch_proximity),
            top: TopEdgeController::new(config.edge_cooldown, config.fetch_proximity),
            layout,
            sequence,
            sync: WindowSync::new(layout),
            window: ChunkWindow::INITIAL,
            growth: GrowthClass::None,
            pager,
            measurer: VisibleExtentMeasurer::new(),
            anchors: ScrollAnchorPreserver::new(),
            fetch_anchor: None,
            config,
        })
    }

    pub fn config(&self) -> &WindowConfig {
        &self.config
    }

    pub fn layout(&self) -> ChunkLayout {
        self.layout
    }

    pub fn source(&self) -> &SourceKey {
        self.sequence.source()
    }

    pub fn sequence(&self) -> &Sequence<P> {
        &self.sequence
    }

    pub fn window(&self) -> ChunkWindow {
        self.window
    }

    /// Growth class produced by the last synchronization.
    pub fn growth(&self) -> GrowthClass {
        self.growth
    }

    pub fn pager(&self) -> &PagerState {
        &self.pager
    }

    pub fn height_cache(&self) -> &ChunkHeightCache {
        self.measurer.cache()
    }

    pub fn pending_anchor(&self) -> Option<&ScrollAnchor> {
        self.anchors.pending()
    }

    pub fn total_chunks(&self) -> usize {
        self.layout.total_chunks(self.sequence.len())
    }

    /// Requests the first page of the current source.
    pub fn load_initial(&mut self, pager: &mut dyn CursorPager<P>) -> EdgeOutcome {
        if self.pager.loaded_first_page() {
            return EdgeOutcome::Idle;
        }
        self.start_fetch(Direction::Next, None, pager)
    }

    /// Replaces the dataset. The sequence, pager cursors, window, cached heights
    /// and any pending anchor are discarded; responses to fetches started before
    /// the switch are ignored when they arrive.
    pub fn switch_source(&mut self, source: SourceKey) {
        log::debug!("switching source {} -> {}", self.sequence.source(), source);
        self.sequence.reset(source);
        self.pager.reset(self.sequence.generation());
        self.window = ChunkWindow::INITIAL;
        self.growth = GrowthClass::None;
        self.measurer.reset();
        self.anchors.discard();
        self.fetch_anchor = None;
        self.bottom.reset();
        self.top.reset();
    }

    /// Handles an intersection callback for the sentinel after the last item.
    pub fn on_bottom_intersection(
        &mut self,
        signal: EdgeSignal,
        now: Instant,
        pager: &mut dyn CursorPager<P>,
    ) -> EdgeOutcome {
        let state = BottomEdgeState {
            len: self.sequence.len(),
            window: self.window,
            layout: self.layout,
            has_next: self.pager.has_next(),
            is_fetching_next: self.pager.is_fetching_next(),
        };
        match self.bottom.on_intersection(signal, &state, now) {
            action @ EdgeAction::RevealNext => {
                let revealed = apply_reveal(action, self.window)
                    .capped_from_start(self.config.max_visible_chunks)
                    .clamped(self.total_chunks());
                self.window = revealed;
                EdgeOutcome::Revealed(revealed)
            }
            EdgeAction::FetchNext => self.start_fetch(Direction::Next, None, pager),
            _ => EdgeOutcome::Idle,
        }
    }

    /// Handles an intersection callback for the sentinel before the first item.
    ///
    /// `host` is read to capture a scroll anchor before anything is inserted
    /// above the viewport.
    pub fn on_top_intersection(
        &mut self,
        signal: EdgeSignal,
        now: Instant,
        pager: &mut dyn CursorPager<P>,
        host: &dyn ScrollHost,
    ) -> EdgeOutcome {
        let state = TopEdgeState {
            window: self.window,
            max_visible_chunks: self.config.max_visible_chunks,
            has_previous: self.pager.has_previous(),
            is_fetching_previous: self.pager.is_fetching_previous(),
        };
        match self.top.on_intersection(signal, &state, now) {
            action @ EdgeAction::RevealPrevious { .. } => {
                if let Some(anchor) = ScrollAnchorPreserver::capture(host) {
                    self.anchors.stash(anchor);
                }
                let revealed = apply_reveal(action, self.window).clamped(self.total_chunks());
                self.window = revealed;
                EdgeOutcome::Revealed(revealed)
            }
            EdgeAction::FetchPrevious => {
                let anchor = ScrollAnchorPreserver::capture(host);
                self.start_fetch(Direction::Previous, anchor, pager)
            }
            _ => EdgeOutcome::Idle,
        }
    }

    fn start_fetch(
        &mut self,
        direction: Direction,
        anchor: Option<ScrollAnchor>,
        pager: &mut dyn CursorPager<P>,
    ) -> EdgeOutcome {
        let request =
            match self
                .pager
                .begin(direction, self.sequence.source(), self.config.page_limit)
            {
                Ok(request) => request,
                Err(refusal) => {
                    log::debug!("{} fetch refused: {:?}", direction, refusal);
                    return EdgeOutcome::Refused(refusal);
                }
            };

        if let Some(anchor) = anchor {
            self.fetch_anchor = Some((request.ticket, anchor));
        }
        log::debug!(
            "{} fetch started for {} (cursor {:?}, limit {})",
            direction,
            request.source,
            request.cursor,
            request.limit
        );

        match pager.fetch_page(&request) {
            FetchStatus::Pending => EdgeOutcome::FetchStarted(request.ticket),
            FetchStatus::Ready(result) => {
                EdgeOutcome::Fetched(self.complete_fetch(request.ticket, result))
            }
        }
    }

    /// Merges the outcome of the fetch identified by `ticket`.
    ///
    /// Backward pages are classified with a prepend hint, and the anchor
    /// captured when the fetch started is handed to the preserver, to be applied
    /// by the next [`after_layout`](Self::after_layout). A prepend shifts the
    /// window and the height cache by the whole chunks it admitted.
    pub fn complete_fetch(
        &mut self,
        ticket: FetchTicket,
        result: Result<Page<P>, PagerError>,
    ) -> FetchCompletion {
        match self.pager.finish(ticket, result.as_ref()) {
            FinishKind::Current => {}
            FinishKind::Stale => {
                log::debug!("dropping stale {} page {:?}", ticket.direction, ticket);
                return FetchCompletion::Stale;
            }
            FinishKind::Unexpected => {
                log::warn!("unexpected {} completion {:?}", ticket.direction, ticket);
                return FetchCompletion::Unexpected;
            }
        }

        let anchor = match self.fetch_anchor.take() {
            Some((anchored, anchor)) if anchored == ticket => Some(anchor),
            other => {
                self.fetch_anchor = other;
                None
            }
        };

        let page = match result {
            Ok(page) => page,
            Err(error) => {
                log::warn!("{} fetch failed: {}", ticket.direction, error);
                return FetchCompletion::Failed(error);
            }
        };

        let admitted = match ticket.direction {
            Direction::Next => self.sequence.append(page.items),
            Direction::Previous => self.sequence.prepend(page.items),
        };
        let hint = (ticket.direction == Direction::Previous).then_some(GrowthClass::Prepend);
        let growth = self.sync_window(hint);

        if growth == GrowthClass::Prepend {
            // Cached heights follow their items to the new chunk indices.
            self.measurer.shift_chunks(self.layout.chunk_of(admitted));
            if let Some(anchor) = anchor {
                self.anchors.stash(anchor);
            }
        }
        log::debug!(
            "{} page merged: {} new items, {:?}, window {:?}",
            ticket.direction,
            admitted,
            growth,
            self.window
        );
        FetchCompletion::Applied {
            direction: ticket.direction,
            growth,
            admitted,
        }
    }

    fn sync_window(&mut self, hint: Option<GrowthClass>) -> GrowthClass {
        let (growth, mut window) = self.sync.sync(self.sequence.snapshot(), self.window, hint);
        match growth {
            GrowthClass::Append => {
                window = window.capped_from_start(self.config.max_visible_chunks);
            }
            GrowthClass::Prepend => {
                window = window.capped_from_end(self.config.max_visible_chunks);
            }
            _ => {}
        }
        self.window = window;
        self.growth = growth;
        growth
    }

    /// The frame to render for the current state.
    pub fn frame(&self) -> WindowFrame {
        WindowFrame::compose(
            self.window,
            self.sequence.len(),
            self.layout,
            self.measurer.cache(),
            &self.pager,
        )
    }

    /// Forces the visible chunks to be remeasured after their content changed.
    pub fn invalidate_measurements(&mut self) {
        self.measurer.invalidate();
    }

    /// Measures the visible chunks if the rendered set changed.
    pub fn measure_visible(&mut self, oracle: &dyn ExtentOracle) -> MeasuredChunks {
        let frame = self.frame();
        let first = self.rendered_id(frame.items.start, frame.items.len());
        let last = self.rendered_id(frame.items.end.saturating_sub(1), frame.items.len());
        self.measurer.measure(
            frame.window,
            self.layout,
            self.sequence.len(),
            (first, last),
            oracle,
        )
    }

    fn rendered_id(&self, index: usize, rendered: usize) -> Option<ItemId> {
        if rendered == 0 {
            return None;
        }
        self.sequence.get(index).map(|item| item.id())
    }

    /// Applies a pending scroll anchor, if any.
    pub fn restore_anchor(&mut self, host: &mut dyn ScrollHost) -> AnchorRestore {
        self.anchors.restore(host)
    }

    /// Post-layout hook: remeasures the visible chunks, then restores any
    /// pending anchor. Call it once the frame's layout is committed and before
    /// it is painted; calling it a frame late costs one visible flicker.
    pub fn after_layout<H>(&mut self, host: &mut H) -> LayoutReport
    where
        H: ExtentOracle + ScrollHost,
    {
        let measured = self.measure_visible(&*host);
        let anchor = self.restore_anchor(host);
        LayoutReport { measured, anchor }
    }
}

impl<P> std::fmt::Debug for ScrollWindow<P> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScrollWindow")
            .field("source", self.sequence.source())
            .field("len", &self.sequence.len())
            .field("window", &self.window)
            .field("growth", &self.growth)
            .field("pager", &self.pager)
            .finish()
    }
}
