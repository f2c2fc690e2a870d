//! Edge intersection controllers.
//!
//! One controller watches a sentinel after the last rendered item, the other a
//! sentinel before the first. On every intersection callback the controller
//! decides between revealing an already buffered chunk, asking the pager for a
//! new page, or doing nothing. The controllers are pure decision makers: they
//! read a snapshot of the relevant state and return an [`EdgeAction`]; the
//! engine applies it.

use web_time::{Duration, Instant};

use crate::chunk::{ChunkLayout, ChunkWindow};

/// What a host's visibility primitive reported for one sentinel.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EdgeSignal {
    pub intersecting: bool,
    /// Distance (px) between the viewport edge and the true edge of the
    /// scrollable content on this side.
    pub distance_to_edge: f32,
}

impl EdgeSignal {
    pub fn new(intersecting: bool, distance_to_edge: f32) -> Self {
        Self {
            intersecting,
            distance_to_edge,
        }
    }

    /// An intersecting sentinel sitting right at the edge.
    pub fn at_edge() -> Self {
        Self::new(true, 0.0)
    }

    pub fn hidden() -> Self {
        Self::new(false, f32::INFINITY)
    }
}

/// Decision of an edge controller.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeAction {
    None,
    /// Grow the window by one buffered chunk after `end`.
    RevealNext,
    /// Grow the window by one buffered chunk before `start`; when `drop_last`
    /// is set the last chunk leaves the window to respect the visible cap.
    RevealPrevious { drop_last: bool },
    FetchNext,
    FetchPrevious,
}

impl EdgeAction {
    pub fn is_none(&self) -> bool {
        matches!(self, EdgeAction::None)
    }

    /// Whether this action needs a scroll anchor captured before it applies.
    pub fn needs_anchor(&self) -> bool {
        matches!(
            self,
            EdgeAction::RevealPrevious { .. } | EdgeAction::FetchPrevious
        )
    }
}

/// Suppresses repeated triggers within a fixed period.
#[derive(Clone, Debug)]
pub struct Cooldown {
    period: Duration,
    last_trigger: Option<Instant>,
}

impl Cooldown {
    pub fn new(period: Duration) -> Self {
        Self {
            period,
            last_trigger: None,
        }
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    pub fn is_cooling(&self, now: Instant) -> bool {
        match self.last_trigger {
            Some(last) => now.saturating_duration_since(last) < self.period,
            None => false,
        }
    }

    pub fn trigger(&mut self, now: Instant) {
        self.last_trigger = Some(now);
    }

    pub fn clear(&mut self) {
        self.last_trigger = None;
    }
}

/// State the bottom controller decides on.
#[derive(Clone, Copy, Debug)]
pub struct BottomEdgeState {
    pub len: usize,
    pub window: ChunkWindow,
    pub layout: ChunkLayout,
    pub has_next: bool,
    pub is_fetching_next: bool,
}

/// State the top controller decides on.
#[derive(Clone, Copy, Debug)]
pub struct TopEdgeState {
    pub window: ChunkWindow,
    pub max_visible_chunks: usize,
    pub has_previous: bool,
    pub is_fetching_previous: bool,
}

/// Decides what to do when the sentinel after the last rendered item moves.
#[derive(Clone, Debug)]
pub struct BottomEdgeController {
    cooldown: Cooldown,
    fetch_proximity: f32,
}

impl BottomEdgeController {
    pub fn new(cooldown: Duration, fetch_proximity: f32) -> Self {
        Self {
            cooldown: Cooldown::new(cooldown),
            fetch_proximity,
        }
    }

    pub fn on_intersection(
        &mut self,
        signal: EdgeSignal,
        state: &BottomEdgeState,
        now: Instant,
    ) -> EdgeAction {
        if !signal.intersecting || state.is_fetching_next || self.cooldown.is_cooling(now) {
            return EdgeAction::None;
        }

        let buffered_end = state.window.end.saturating_mul(state.layout.chunk_size());
        let action = if buffered_end < state.len {
            EdgeAction::RevealNext
        } else if signal.distance_to_edge <= self.fetch_proximity && state.has_next {
            EdgeAction::FetchNext
        } else {
            EdgeAction::None
        };

        if !action.is_none() {
            self.cooldown.trigger(now);
            log::debug!("bottom edge: {:?} at window {:?}", action, state.window);
        }
        action
    }

    pub fn reset(&mut self) {
        self.cooldown.clear();
    }
}

/// Decides what to do when the sentinel before the first rendered item moves.
#[derive(Clone, Debug)]
pub struct TopEdgeController {
    cooldown: Cooldown,
    fetch_proximity: f32,
}

impl TopEdgeController {
    pub fn new(cooldown: Duration, fetch_proximity: f32) -> Self {
        Self {
            cooldown: Cooldown::new(cooldown),
            fetch_proximity,
        }
    }

    pub fn on_intersection(
        &mut self,
        signal: EdgeSignal,
        state: &TopEdgeState,
        now: Instant,
    ) -> EdgeAction {
        if !signal.intersecting || state.is_fetching_previous || self.cooldown.is_cooling(now) {
            return EdgeAction::None;
        }

        let action = if state.window.start > 0 {
            // One chunk enters at the top; if that overflows the cap the last
            // one leaves at the bottom.
            let visible_after = state.window.len() + 1;
            EdgeAction::RevealPrevious {
                drop_last: visible_after > state.max_visible_chunks,
            }
        } else if signal.distance_to_edge <= self.fetch_proximity && state.has_previous {
            EdgeAction::FetchPrevious
        } else {
            EdgeAction::None
        };

        if !action.is_none() {
            self.cooldown.trigger(now);
            log::debug!("top edge: {:?} at window {:?}", action, state.window);
        }
        action
    }

    pub fn reset(&mut self) {
        self.cooldown.clear();
    }
}

/// Applies a reveal action to `window`. Fetch actions leave it unchanged; the
/// classifier moves the bounds once the page lands.
pub fn apply_reveal(action: EdgeAction, window: ChunkWindow) -> ChunkWindow {
    match action {
        EdgeAction::RevealNext => ChunkWindow::new(window.start, window.end.saturating_add(1)),
        EdgeAction::RevealPrevious { drop_last } => {
            let start = window.start.saturating_sub(1);
            let end = if drop_last {
                window.end.saturating_sub(1)
            } else {
                window.end
            };
            ChunkWindow::new(start, end)
        }
        EdgeAction::None | EdgeAction::FetchNext | EdgeAction::FetchPrevious => window,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const COOLDOWN: Duration = Duration::from_millis(300);

    fn bottom_state(len: usize, window: ChunkWindow) -> BottomEdgeState {
        BottomEdgeState {
            len,
            window,
            layout: ChunkLayout::new(50),
            has_next: true,
            is_fetching_next: false,
        }
    }

    fn top_state(window: ChunkWindow) -> TopEdgeState {
        TopEdgeState {
            window,
            max_visible_chunks: 3,
            has_previous: true,
            is_fetching_previous: false,
        }
    }

    #[test]
    fn bottom_reveals_buffered_chunk_before_fetching() {
        let mut controller = BottomEdgeController::new(COOLDOWN, 100.0);
        let action = controller.on_intersection(
            EdgeSignal::at_edge(),
            &bottom_state(200, ChunkWindow::new(0, 2)),
            Instant::now(),
        );
        assert_eq!(action, EdgeAction::RevealNext);
    }

    #[test]
    fn bottom_fetches_when_everything_is_revealed() {
        let mut controller = BottomEdgeController::new(COOLDOWN, 100.0);
        let action = controller.on_intersection(
            EdgeSignal::new(true, 40.0),
            &bottom_state(200, ChunkWindow::new(2, 4)),
            Instant::now(),
        );
        assert_eq!(action, EdgeAction::FetchNext);
    }

    #[test]
    fn bottom_waits_until_near_true_edge() {
        let mut controller = BottomEdgeController::new(COOLDOWN, 100.0);
        let action = controller.on_intersection(
            EdgeSignal::new(true, 400.0),
            &bottom_state(200, ChunkWindow::new(2, 4)),
            Instant::now(),
        );
        assert_eq!(action, EdgeAction::None);
    }

    #[test]
    fn bottom_ignores_hidden_sentinel_and_in_flight_fetch() {
        let mut controller = BottomEdgeController::new(COOLDOWN, 100.0);
        let now = Instant::now();
        let state = bottom_state(200, ChunkWindow::new(2, 4));
        assert_eq!(
            controller.on_intersection(EdgeSignal::hidden(), &state, now),
            EdgeAction::None
        );

        let busy = BottomEdgeState {
            is_fetching_next: true,
            ..state
        };
        assert_eq!(
            controller.on_intersection(EdgeSignal::at_edge(), &busy, now),
            EdgeAction::None
        );

        let exhausted = BottomEdgeState {
            has_next: false,
            ..state
        };
        assert_eq!(
            controller.on_intersection(EdgeSignal::at_edge(), &exhausted, now),
            EdgeAction::None
        );
    }

    #[test]
    fn cooldown_suppresses_second_trigger() {
        let mut controller = BottomEdgeController::new(COOLDOWN, 100.0);
        let state = bottom_state(200, ChunkWindow::new(2, 4));
        let start = Instant::now();

        let first = controller.on_intersection(EdgeSignal::at_edge(), &state, start);
        let second = controller.on_intersection(
            EdgeSignal::at_edge(),
            &state,
            start + Duration::from_millis(120),
        );
        let third = controller.on_intersection(
            EdgeSignal::at_edge(),
            &state,
            start + Duration::from_millis(301),
        );

        assert_eq!(first, EdgeAction::FetchNext);
        assert_eq!(second, EdgeAction::None);
        assert_eq!(third, EdgeAction::FetchNext);
    }

    #[test]
    fn no_op_does_not_start_cooldown() {
        let mut controller = BottomEdgeController::new(COOLDOWN, 100.0);
        let start = Instant::now();
        let far = controller.on_intersection(
            EdgeSignal::new(true, 500.0),
            &bottom_state(200, ChunkWindow::new(2, 4)),
            start,
        );
        let near = controller.on_intersection(
            EdgeSignal::at_edge(),
            &bottom_state(200, ChunkWindow::new(2, 4)),
            start + Duration::from_millis(10),
        );
        assert_eq!(far, EdgeAction::None);
        assert_eq!(near, EdgeAction::FetchNext);
    }

    #[test]
    fn top_reveals_and_drops_last_chunk_over_cap() {
        let mut controller = TopEdgeController::new(COOLDOWN, 100.0);
        let now = Instant::now();

        let action = controller.on_intersection(
            EdgeSignal::at_edge(),
            &top_state(ChunkWindow::new(2, 5)),
            now,
        );
        assert_eq!(action, EdgeAction::RevealPrevious { drop_last: true });
        assert_eq!(
            apply_reveal(action, ChunkWindow::new(2, 5)),
            ChunkWindow::new(1, 4)
        );

        let mut controller = TopEdgeController::new(COOLDOWN, 100.0);
        let action = controller.on_intersection(
            EdgeSignal::at_edge(),
            &top_state(ChunkWindow::new(2, 3)),
            now,
        );
        assert_eq!(action, EdgeAction::RevealPrevious { drop_last: false });
        assert_eq!(
            apply_reveal(action, ChunkWindow::new(2, 3)),
            ChunkWindow::new(1, 3)
        );
    }

    #[test]
    fn top_fetches_history_at_first_chunk() {
        let mut controller = TopEdgeController::new(COOLDOWN, 100.0);
        let action = controller.on_intersection(
            EdgeSignal::at_edge(),
            &top_state(ChunkWindow::new(0, 2)),
            Instant::now(),
        );
        assert_eq!(action, EdgeAction::FetchPrevious);
        assert!(action.needs_anchor());

        let mut controller = TopEdgeController::new(COOLDOWN, 100.0);
        let no_history = TopEdgeState {
            has_previous: false,
            ..top_state(ChunkWindow::new(0, 2))
        };
        assert_eq!(
            controller.on_intersection(EdgeSignal::at_edge(), &no_history, Instant::now()),
            EdgeAction::None
        );
    }
}
