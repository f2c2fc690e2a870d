//! Scroll-anchor preservation across prepends.
//!
//! Before chunks are inserted above the viewport, the topmost visible item and
//! its offset from the viewport's leading edge are recorded. Once the new
//! layout is committed (and before it is painted), the scroll offset is moved
//! by however far that item travelled, so the reading position stays put.

use crate::item::ItemId;

/// Scroll container operations the preserver relies on.
pub trait ScrollHost {
    /// Current scroll offset of the container.
    fn scroll_offset(&self) -> f32;

    fn set_scroll_offset(&mut self, offset: f32);

    /// The first item whose box intersects the viewport, with the offset of its
    /// leading edge relative to the viewport's leading edge (negative when it is
    /// partially scrolled past).
    fn topmost_visible_item(&self) -> Option<(ItemId, f32)>;

    /// Offset of `id`'s leading edge relative to the viewport's leading edge,
    /// or `None` when it is not rendered.
    fn item_offset(&self, id: ItemId) -> Option<f32>;
}

/// Snapshot taken just before a prepend-class mutation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ScrollAnchor {
    pub item_id: ItemId,
    pub offset_from_viewport: f32,
}

/// What [`ScrollAnchorPreserver::restore`] did.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AnchorRestore {
    /// No anchor was pending.
    Idle,
    /// The scroll offset moved by `delta`.
    Adjusted { item_id: ItemId, delta: f32 },
    /// The anchored item is gone; the scroll position was left alone.
    TargetMissing { item_id: ItemId },
}

/// Holds at most one pending anchor and consumes it exactly once.
#[derive(Debug, Default)]
pub struct ScrollAnchorPreserver {
    pending: Option<ScrollAnchor>,
}

impl ScrollAnchorPreserver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the current anchor from `host`. Must run before the DOM mutation
    /// it compensates for.
    pub fn capture(host: &dyn ScrollHost) -> Option<ScrollAnchor> {
        let (item_id, offset_from_viewport) = host.topmost_visible_item()?;
        log::debug!(
            "anchor captured on {} at {:.1}",
            item_id,
            offset_from_viewport
        );
        Some(ScrollAnchor {
            item_id,
            offset_from_viewport,
        })
    }

    /// Queues `anchor` for the next [`restore`](Self::restore). A newer anchor
    /// replaces an unconsumed one.
    pub fn stash(&mut self, anchor: ScrollAnchor) {
        self.pending = Some(anchor);
    }

    pub fn pending(&self) -> Option<&ScrollAnchor> {
        self.pending.as_ref()
    }

    pub fn discard(&mut self) {
        self.pending = None;
    }

    /// Repositions `host` so the anchored item sits at its recorded offset
    /// again. Must run after the mutation's layout is committed.
    pub fn restore(&mut self, host: &mut dyn ScrollHost) -> AnchorRestore {
        let Some(anchor) = self.pending.take() else {
            return AnchorRestore::Idle;
        };

        let Some(current) = host.item_offset(anchor.item_id) else {
            log::warn!("anchor target {} no longer rendered", anchor.item_id);
            return AnchorRestore::TargetMissing {
                item_id: anchor.item_id,
            };
        };

        let delta = current - anchor.offset_from_viewport;
        if delta != 0.0 {
            let offset = host.scroll_offset();
            host.set_scroll_offset(offset + delta);
        }
        log::debug!("anchor {} restored, scroll moved by {:.1}", anchor.item_id, delta);
        AnchorRestore::Adjusted {
            item_id: anchor.item_id,
            delta,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Items of a fixed height stacked from `first_id`, viewed through a
    /// viewport scrolled to `scroll`.
    struct Column {
        first_id: u64,
        count: u64,
        item_height: f32,
        scroll: f32,
    }

    impl Column {
        fn top_of(&self, id: ItemId) -> Option<f32> {
            let index = id.0.checked_sub(self.first_id)?;
            (index < self.count).then(|| index as f32 * self.item_height)
        }
    }

    impl ScrollHost for Column {
        fn scroll_offset(&self) -> f32 {
            self.scroll
        }

        fn set_scroll_offset(&mut self, offset: f32) {
            self.scroll = offset;
        }

        fn topmost_visible_item(&self) -> Option<(ItemId, f32)> {
            let index = (self.scroll / self.item_height).floor() as u64;
            (index < self.count).then(|| {
                (
                    ItemId(self.first_id + index),
                    index as f32 * self.item_height - self.scroll,
                )
            })
        }

        fn item_offset(&self, id: ItemId) -> Option<f32> {
            self.top_of(id).map(|top| top - self.scroll)
        }
    }

    #[test]
    fn restore_cancels_height_added_above() {
        let mut column = Column {
            first_id: 100,
            count: 50,
            item_height: 20.0,
            scroll: 130.0,
        };
        let anchor = ScrollAnchorPreserver::capture(&column).unwrap();
        assert_eq!(anchor.item_id, ItemId(106));
        assert_eq!(anchor.offset_from_viewport, -10.0);

        // Fifty items land above the anchor.
        column.first_id = 50;
        column.count = 100;

        let mut preserver = ScrollAnchorPreserver::new();
        preserver.stash(anchor);
        let outcome = preserver.restore(&mut column);

        assert_eq!(
            outcome,
            AnchorRestore::Adjusted {
                item_id: ItemId(106),
                delta: 1000.0
            }
        );
        assert_eq!(column.item_offset(ItemId(106)), Some(-10.0));
        assert_eq!(column.topmost_visible_item().unwrap().0, ItemId(106));
    }

    #[test]
    fn anchor_is_consumed_once() {
        let mut column = Column {
            first_id: 1,
            count: 10,
            item_height: 10.0,
            scroll: 0.0,
        };
        let mut preserver = ScrollAnchorPreserver::new();
        preserver.stash(ScrollAnchorPreserver::capture(&column).unwrap());

        assert!(matches!(
            preserver.restore(&mut column),
            AnchorRestore::Adjusted { .. }
        ));
        assert_eq!(preserver.restore(&mut column), AnchorRestore::Idle);
        assert!(preserver.pending().is_none());
    }

    #[test]
    fn missing_target_is_a_no_op() {
        let mut column = Column {
            first_id: 1,
            count: 10,
            item_height: 10.0,
            scroll: 35.0,
        };
        let mut preserver = ScrollAnchorPreserver::new();
        preserver.stash(ScrollAnchor {
            item_id: ItemId(500),
            offset_from_viewport: 0.0,
        });

        assert_eq!(
            preserver.restore(&mut column),
            AnchorRestore::TargetMissing {
                item_id: ItemId(500)
            }
        );
        assert_eq!(column.scroll, 35.0);
    }
}
