use lectern_testing::prelude::*;
use lectern_window::{
    Direction, EdgeOutcome, FetchCompletion, GrowthClass, ItemId, PagerError, SourceKey,
    WindowConfig,
};

const VIEWPORT: f32 = 600.0;
const STEP: f32 = 40.0;

fn robot(start: u64, delivery: Delivery) -> ReaderRobot<Verse> {
    ReaderRobot::new(
        WindowConfig::default(),
        SourceKey::new("book", start),
        verses(1..=3000),
        delivery,
        VIEWPORT,
    )
    .unwrap()
}

/// Scrolls one step and checks that the item read before the step moved by
/// exactly the scrolled distance.
fn step_and_check(robot: &mut ReaderRobot<Verse>, delta: f32) -> f32 {
    let (id, offset) = robot.reading_position().expect("nothing rendered");
    let moved = robot.scroll_by(delta);
    if let Some(top) = robot.viewport().item_top(id) {
        assert_approx_eq(
            top - robot.scroll_offset(),
            offset - moved,
            0.5,
            &format!("{} jumped", id),
        );
    }
    assert_window_valid(robot.engine(), "after step");
    assert_within_cap(robot.engine(), "after step");
    moved
}

#[test]
fn forward_reading_keeps_a_bounded_window() {
    let mut robot = robot(1, Delivery::Immediate);
    robot.start();
    assert_eq!(robot.engine().growth(), GrowthClass::InitialLoad);
    assert!(!robot.engine().pager().has_previous());

    for _ in 0..1500 {
        step_and_check(&mut robot, STEP);
    }

    let engine = robot.engine();
    assert!(engine.sequence().len() > 600, "{:?}", engine);
    assert!(engine.window().start > 0, "{:?}", engine);
    assert!(robot.stats().max_rendered <= 200);
    assert_eq!(robot.pager().request_count(Direction::Previous), 0);
    assert_eq!(robot.stats().missing_anchors, 0);
}

#[test]
fn leading_spacer_matches_windowed_out_history() {
    let mut robot = robot(1, Delivery::Immediate);
    robot.start();
    while robot.engine().window().start < 2 {
        step_and_check(&mut robot, STEP);
    }

    let frame = robot.engine().frame();
    let history: f32 = verses(1..=frame.items.start as u64)
        .iter()
        .map(verse_height)
        .sum();
    assert_approx_eq(robot.viewport().spacer(), history, 0.5, "spacer");
    assert_eq!(
        robot.viewport().rendered_ids().next(),
        Some(ItemId(frame.items.start as u64 + 1))
    );
}

#[test]
fn backward_reading_holds_the_reading_position() {
    let mut robot = robot(2001, Delivery::Immediate);
    robot.start();
    assert!(robot.engine().pager().has_previous());

    // The first frame sees the top sentinel at the very top and loads history.
    let (top, _) = robot.frame();
    assert!(matches!(
        top,
        EdgeOutcome::Fetched(FetchCompletion::Applied {
            direction: Direction::Previous,
            growth: GrowthClass::Prepend,
            ..
        })
    ));
    assert_item_at(&robot, ItemId(2001), 0.0, "after prepend");

    // Revealing the buffered chunk above must not move the reader either.
    robot.idle_for(400);
    assert_eq!(robot.engine().window().start, 0);
    assert_item_at(&robot, ItemId(2001), 0.0, "after reveal");
    assert!(robot.stats().anchor_adjustments >= 2);

    for _ in 0..600 {
        step_and_check(&mut robot, -STEP);
    }

    let engine = robot.engine();
    assert!(engine.sequence().first_id().unwrap() < ItemId(1900), "{:?}", engine);
    assert!(robot.pager().request_count(Direction::Previous) >= 3);
    assert_eq!(robot.stats().missing_anchors, 0);
}

#[test]
fn short_first_page_of_history_keeps_the_reading_position() {
    // Verse 26 starts half a chunk in, so history arrives as 25 verses.
    let mut robot = robot(26, Delivery::Immediate);
    robot.start();

    let (top, _) = robot.frame();
    assert_eq!(
        top,
        EdgeOutcome::Fetched(FetchCompletion::Applied {
            direction: Direction::Previous,
            growth: GrowthClass::Prepend,
            admitted: 25,
        })
    );
    assert_eq!(robot.engine().window().start, 0);
    assert_item_at(&robot, ItemId(26), 0.0, "after short prepend");
    assert_eq!(robot.viewport().spacer(), 0.0);
    assert_eq!(robot.stats().missing_anchors, 0);
}

#[test]
fn backward_reading_reaches_an_unaligned_book_start() {
    let mut robot = robot(1026, Delivery::Immediate);
    robot.start();

    for _ in 0..4000 {
        let engine = robot.engine();
        if robot.scroll_offset() == 0.0
            && engine.window().start == 0
            && !engine.pager().has_previous()
        {
            break;
        }
        step_and_check(&mut robot, -STEP);
    }

    assert_eq!(robot.engine().sequence().first_id(), Some(ItemId(1)));
    assert_item_at(&robot, ItemId(1), 0.0, "book start");
    assert_eq!(robot.stats().missing_anchors, 0);
}

#[test]
fn first_paint_without_layout_measures_on_the_next_commit() {
    let mut robot = robot(1, Delivery::Immediate);
    robot.viewport_mut().set_laid_out(false);
    robot.start();
    assert!(robot.engine().height_cache().is_empty());
    assert_eq!(robot.engine().frame().leading_spacer, 0.0);

    robot.viewport_mut().set_laid_out(true);
    let report = robot.commit();
    assert_eq!(report.measured.as_slice(), &[0]);
    let chunk: f32 = verses(1..=50).iter().map(verse_height).sum();
    assert_eq!(robot.engine().height_cache().get(0), Some(chunk));
}

#[test]
fn deferred_backward_page_lands_under_the_captured_anchor() {
    let mut robot = robot(2001, Delivery::Deferred);
    robot.start();
    assert!(matches!(
        robot.resolve_next(),
        Some(FetchCompletion::Applied {
            growth: GrowthClass::InitialLoad,
            ..
        })
    ));

    let (top, _) = robot.frame();
    assert!(matches!(top, EdgeOutcome::FetchStarted(_)));
    assert!(robot.engine().frame().loading_previous);
    assert!(robot.engine().pending_anchor().is_none());

    assert!(matches!(
        robot.resolve_next(),
        Some(FetchCompletion::Applied {
            direction: Direction::Previous,
            growth: GrowthClass::Prepend,
            admitted: 50,
        })
    ));
    assert!(!robot.engine().frame().loading_previous);
    assert_item_at(&robot, ItemId(2001), 0.0, "after deferred prepend");
}

#[test]
fn in_flight_fetch_gates_the_edge_until_it_settles() {
    let mut robot = robot(1, Delivery::Deferred);
    robot.start();
    robot.frames(5);
    assert_eq!(robot.pager().request_count(Direction::Next), 1);
    robot.resolve_next();

    robot.viewport_mut().scroll_to(f32::MAX);
    let (_, bottom) = robot.frame();
    assert!(matches!(bottom, EdgeOutcome::FetchStarted(_)));
    assert!(robot.engine().frame().loading_next);

    robot.viewport_mut().scroll_to(f32::MAX);
    robot.frames(30);
    assert_eq!(robot.pager().request_count(Direction::Next), 2);
    assert_eq!(robot.pager().pending(), 1);

    robot.pager_mut().fail_next(1);
    assert!(matches!(
        robot.resolve_next(),
        Some(FetchCompletion::Failed(PagerError::Transport { .. }))
    ));
    assert!(!robot.engine().pager().is_fetching_next());
    assert_eq!(robot.engine().sequence().len(), 50);

    // The edge is free again; the next intersection retries.
    robot.viewport_mut().scroll_to(f32::MAX);
    let (_, bottom) = robot.frame();
    assert!(matches!(bottom, EdgeOutcome::FetchStarted(_)));
    assert!(matches!(
        robot.resolve_next(),
        Some(FetchCompletion::Applied {
            direction: Direction::Next,
            growth: GrowthClass::Append,
            admitted: 50,
        })
    ));
    assert_eq!(robot.engine().window().end, 2);
}

#[test]
fn switching_sources_drops_pages_of_the_old_one() {
    let mut robot = robot(1, Delivery::Deferred);
    robot.start();
    robot.resolve_next();
    robot.viewport_mut().scroll_to(f32::MAX);
    robot.frame();
    assert_eq!(robot.pager().pending(), 1);

    let outcome = robot.switch_source(SourceKey::new("book", 1001));
    assert!(matches!(outcome, EdgeOutcome::FetchStarted(_)));

    assert_eq!(robot.resolve_next(), Some(FetchCompletion::Stale));
    assert!(matches!(
        robot.resolve_next(),
        Some(FetchCompletion::Applied {
            growth: GrowthClass::DatasetSwitch,
            ..
        })
    ));

    let engine = robot.engine();
    assert_eq!(engine.sequence().first_id(), Some(ItemId(1001)));
    assert_eq!(engine.sequence().len(), 50);
    assert_eq!(engine.window().start, 0);
    assert_eq!(robot.scroll_offset(), 0.0);
    assert_eq!(robot.viewport().spacer(), 0.0);
}
