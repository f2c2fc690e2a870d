//! In-memory cursor pager over a fixed book of items.
//!
//! Cursors are positions in the book: a forward cursor names the next item to
//! fetch, a backward cursor names the item just after the page to fetch.
//! Requests can resolve immediately or queue until the test resolves them, and
//! failures can be injected.

use std::collections::VecDeque;

use lectern_window::{
    Cursor, CursorPager, Direction, FetchStatus, FetchTicket, Item, Page, PageLink, PageRequest,
    PagerError,
};

/// When requests resolve.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delivery {
    /// Every request resolves inside `fetch_page`.
    Immediate,
    /// Requests queue until [`FakePager::resolve_next`] is called.
    Deferred,
}

pub struct FakePager<P> {
    book: Vec<Item<P>>,
    delivery: Delivery,
    queue: VecDeque<PageRequest>,
    requests: Vec<PageRequest>,
    failures: usize,
}

impl<P: Clone> FakePager<P> {
    /// `book` must be in ordinal order.
    pub fn new(book: Vec<Item<P>>, delivery: Delivery) -> Self {
        Self {
            book,
            delivery,
            queue: VecDeque::new(),
            requests: Vec::new(),
            failures: 0,
        }
    }

    /// Every request seen so far, in order.
    pub fn requests(&self) -> &[PageRequest] {
        &self.requests
    }

    pub fn request_count(&self, direction: Direction) -> usize {
        self.requests
            .iter()
            .filter(|request| request.direction() == direction)
            .count()
    }

    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// The next `count` requests fail with a transport error.
    pub fn fail_next(&mut self, count: usize) {
        self.failures = count;
    }

    /// Resolves the oldest queued request.
    pub fn resolve_next(&mut self) -> Option<(FetchTicket, Result<Page<P>, PagerError>)> {
        let request = self.queue.pop_front()?;
        let result = self.serve(&request);
        Some((request.ticket, result))
    }

    fn serve(&mut self, request: &PageRequest) -> Result<Page<P>, PagerError> {
        if self.failures > 0 {
            self.failures -= 1;
            return Err(PagerError::Transport {
                reason: "injected failure".to_string(),
            });
        }

        let cursor = match &request.cursor {
            Some(cursor) => Some(
                cursor
                    .as_str()
                    .parse::<usize>()
                    .map_err(|_| PagerError::InvalidCursor)?,
            ),
            None => None,
        };
        let len = self.book.len();
        let limit = request.limit.max(1);

        let page = match (request.direction(), cursor) {
            (Direction::Next, None) => {
                let first = self
                    .book
                    .iter()
                    .position(|item| item.ordinal() >= request.source.start)
                    .unwrap_or(len);
                let end = (first + limit).min(len);
                Page::new(
                    self.book[first..end].to_vec(),
                    end < len,
                    Some(Cursor::new(end.to_string())),
                )
                .with_reverse(PageLink {
                    has_more: first > 0,
                    cursor: Some(Cursor::new(first.to_string())),
                })
            }
            (Direction::Next, Some(first)) => {
                let first = first.min(len);
                let end = (first + limit).min(len);
                Page::new(
                    self.book[first..end].to_vec(),
                    end < len,
                    Some(Cursor::new(end.to_string())),
                )
            }
            (Direction::Previous, Some(end)) => {
                let end = end.min(len);
                let first = end.saturating_sub(limit);
                Page::new(
                    self.book[first..end].to_vec(),
                    first > 0,
                    Some(Cursor::new(first.to_string())),
                )
            }
            (Direction::Previous, None) => return Err(PagerError::InvalidCursor),
        };
        Ok(page)
    }
}

impl<P: Clone> CursorPager<P> for FakePager<P> {
    fn fetch_page(&mut self, request: &PageRequest) -> FetchStatus<P> {
        self.requests.push(request.clone());
        match self.delivery {
            Delivery::Immediate => FetchStatus::Ready(self.serve(request)),
            Delivery::Deferred => {
                self.queue.push_back(request.clone());
                FetchStatus::Pending
            }
        }
    }
}
