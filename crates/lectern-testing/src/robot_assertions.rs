//! Assertion helpers for reader robots.

use lectern_window::{ChunkWindow, ItemId, ScrollWindow};

use crate::robot::ReaderRobot;

/// Assert that a value is within `tolerance` of `expected`.
pub fn assert_approx_eq(actual: f32, expected: f32, tolerance: f32, msg: &str) {
    let diff = (actual - expected).abs();
    assert!(
        diff <= tolerance,
        "{}: expected {} (±{}), got {} (diff: {})",
        msg,
        expected,
        tolerance,
        actual,
        diff
    );
}

/// Assert that the window bounds are in shape for the engine's sequence.
pub fn assert_window_valid<P>(engine: &ScrollWindow<P>, msg: &str) {
    let window = engine.window();
    let total = engine.total_chunks();
    if total == 0 {
        assert_eq!(window, ChunkWindow::INITIAL, "{}: empty sequence", msg);
        return;
    }
    assert!(
        window.start < window.end && window.end <= total,
        "{}: window {:?} out of shape for {} chunks",
        msg,
        window,
        total
    );
}

/// Assert that the window holds at most the configured number of chunks.
pub fn assert_within_cap<P>(engine: &ScrollWindow<P>, msg: &str) {
    let cap = engine.config().max_visible_chunks;
    assert!(
        engine.window().len() <= cap,
        "{}: window {:?} exceeds {} chunks",
        msg,
        engine.window(),
        cap
    );
}

/// Assert that `id` sits `offset` px below the viewport top.
pub fn assert_item_at<P: Clone>(robot: &ReaderRobot<P>, id: ItemId, offset: f32, msg: &str) {
    let actual = robot
        .viewport()
        .item_top(id)
        .map(|top| top - robot.scroll_offset());
    match actual {
        Some(actual) => assert_approx_eq(actual, offset, 0.5, msg),
        None => panic!("{}: {} is not rendered", msg, id),
    }
}
