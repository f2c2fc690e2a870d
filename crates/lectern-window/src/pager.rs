//! Cursor pager interface and per-edge fetch bookkeeping.
//!
//! The pager itself is a collaborator supplied by the host (usually a thin
//! client over a remote API). [`PagerState`] is the engine-side record of the
//! cursors, has-more flags and in-flight fetches for both edges.

use std::fmt;

use crate::error::PagerError;
use crate::item::{Item, SourceKey};

/// Which edge of the sequence a page extends.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Direction {
    Next,
    Previous,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Next => f.write_str("next"),
            Direction::Previous => f.write_str("previous"),
        }
    }
}

/// Opaque continuation token issued by the pager.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Cursor(pub String);

impl Cursor {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Continuation in one direction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PageLink {
    pub has_more: bool,
    pub cursor: Option<Cursor>,
}

/// One page of items, in sequence order.
#[derive(Clone, Debug, PartialEq)]
pub struct Page<P> {
    pub items: Vec<Item<P>>,
    /// Whether more items exist past this page in the fetch direction.
    pub has_more: bool,
    /// Cursor continuing in the fetch direction.
    pub cursor: Option<Cursor>,
    /// Link in the opposite direction. Only meaningful on the first page of a
    /// session, where the engine has no backward cursor yet.
    pub reverse: Option<PageLink>,
}

impl<P> Page<P> {
    pub fn new(items: Vec<Item<P>>, has_more: bool, cursor: Option<Cursor>) -> Self {
        Self {
            items,
            has_more,
            cursor,
            reverse: None,
        }
    }

    pub fn with_reverse(mut self, reverse: PageLink) -> Self {
        self.reverse = Some(reverse);
        self
    }
}

/// Identifies one fetch for its whole lifetime.
///
/// `generation` ties the fetch to the sequence it was started for; completions
/// carrying an older generation are stale and dropped.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct FetchTicket {
    pub direction: Direction,
    pub generation: u64,
    pub serial: u64,
}

/// What the engine asks the pager for.
#[derive(Clone, Debug, PartialEq)]
pub struct PageRequest {
    pub ticket: FetchTicket,
    pub source: SourceKey,
    /// `None` for the first page of a session: start at `source.start`.
    pub cursor: Option<Cursor>,
    pub limit: usize,
}

impl PageRequest {
    #[inline]
    pub fn direction(&self) -> Direction {
        self.ticket.direction
    }
}

/// Result of handing a request to a pager.
#[derive(Debug)]
pub enum FetchStatus<P> {
    /// The fetch already resolved; the engine applies it immediately.
    Ready(Result<Page<P>, PagerError>),
    /// The fetch is in flight; the host reports the outcome later through
    /// [`ScrollWindow::complete_fetch`](crate::ScrollWindow::complete_fetch).
    Pending,
}

/// Source of pages, driven by the engine.
///
/// The engine never has more than one request per direction outstanding.
pub trait CursorPager<P> {
    fn fetch_page(&mut self, request: &PageRequest) -> FetchStatus<P>;
}

impl<P, F> CursorPager<P> for F
where
    F: FnMut(&PageRequest) -> FetchStatus<P>,
{
    fn fetch_page(&mut self, request: &PageRequest) -> FetchStatus<P> {
        self(request)
    }
}

/// Why [`PagerState::begin`] refused to start a fetch.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BeginRefusal {
    InFlight,
    Exhausted,
}

/// How a finished fetch relates to the current state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FinishKind {
    /// The fetch belongs to the current generation and was in flight.
    Current,
    /// The fetch belongs to an abandoned generation.
    Stale,
    /// Current generation, but not the fetch this edge was waiting for.
    Unexpected,
}

#[derive(Clone, Debug)]
struct EdgeState {
    cursor: Option<Cursor>,
    has_more: bool,
    in_flight: Option<FetchTicket>,
}

impl EdgeState {
    fn fresh(has_more: bool) -> Self {
        Self {
            cursor: None,
            has_more,
            in_flight: None,
        }
    }
}

/// Cursors, has-more flags and in-flight tickets for both edges.
#[derive(Clone, Debug)]
pub struct PagerState {
    next: EdgeState,
    previous: EdgeState,
    generation: u64,
    serial: u64,
    loaded_first_page: bool,
}

impl Default for PagerState {
    fn default() -> Self {
        Self::new(0)
    }
}

impl PagerState {
    /// State for a fresh session. Nothing is known yet, so only the forward
    /// edge may fetch (the first page).
    pub fn new(generation: u64) -> Self {
        Self {
            next: EdgeState::fresh(true),
            previous: EdgeState::fresh(false),
            generation,
            serial: 0,
            loaded_first_page: false,
        }
    }

    /// Forgets everything and adopts `generation`. In-flight fetches of the old
    /// generation become stale.
    pub fn reset(&mut self, generation: u64) {
        let serial = self.serial;
        *self = Self::new(generation);
        self.serial = serial;
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn has_next(&self) -> bool {
        self.next.has_more
    }

    pub fn has_previous(&self) -> bool {
        self.previous.has_more
    }

    pub fn is_fetching_next(&self) -> bool {
        self.next.in_flight.is_some()
    }

    pub fn is_fetching_previous(&self) -> bool {
        self.previous.in_flight.is_some()
    }

    pub fn is_fetching(&self, direction: Direction) -> bool {
        self.edge(direction).in_flight.is_some()
    }

    pub fn has_more(&self, direction: Direction) -> bool {
        self.edge(direction).has_more
    }

    pub fn loaded_first_page(&self) -> bool {
        self.loaded_first_page
    }

    fn edge(&self, direction: Direction) -> &EdgeState {
        match direction {
            Direction::Next => &self.next,
            Direction::Previous => &self.previous,
        }
    }

    fn edge_mut(&mut self, direction: Direction) -> &mut EdgeState {
        match direction {
            Direction::Next => &mut self.next,
            Direction::Previous => &mut self.previous,
        }
    }

    /// Marks a fetch in `direction` as in flight and builds its request.
    pub fn begin(
        &mut self,
        direction: Direction,
        source: &SourceKey,
        limit: usize,
    ) -> Result<PageRequest, BeginRefusal> {
        let generation = self.generation;
        self.serial = self.serial.wrapping_add(1);
        let serial = self.serial;

        let edge = self.edge_mut(direction);
        if edge.in_flight.is_some() {
            return Err(BeginRefusal::InFlight);
        }
        if !edge.has_more {
            return Err(BeginRefusal::Exhausted);
        }

        let ticket = FetchTicket {
            direction,
            generation,
            serial,
        };
        edge.in_flight = Some(ticket);
        Ok(PageRequest {
            ticket,
            source: source.clone(),
            cursor: edge.cursor.clone(),
            limit,
        })
    }

    /// Records the outcome of the fetch identified by `ticket`.
    ///
    /// The matching in-flight slot is always cleared, success or failure, so the
    /// edge can never stay stuck in a fetching state. Links are only adopted
    /// from successful, current pages.
    pub fn finish<P>(
        &mut self,
        ticket: FetchTicket,
        result: Result<&Page<P>, &PagerError>,
    ) -> FinishKind {
        if ticket.generation != self.generation {
            return FinishKind::Stale;
        }

        let edge = self.edge_mut(ticket.direction);
        if edge.in_flight != Some(ticket) {
            return FinishKind::Unexpected;
        }
        edge.in_flight = None;

        if let Ok(page) = result {
            edge.has_more = page.has_more;
            if page.cursor.is_some() || !page.has_more {
                edge.cursor = page.cursor.clone();
            }
            if !self.loaded_first_page {
                self.loaded_first_page = true;
                if let Some(reverse) = &page.reverse {
                    let opposite = self.edge_mut(opposite(ticket.direction));
                    opposite.has_more = reverse.has_more;
                    opposite.cursor = reverse.cursor.clone();
                }
            }
        }
        FinishKind::Current
    }
}

fn opposite(direction: Direction) -> Direction {
    match direction {
        Direction::Next => Direction::Previous,
        Direction::Previous => Direction::Next,
    }
}
