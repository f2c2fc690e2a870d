use anyhow::{Context, Result};
use lectern_testing::prelude::*;
use lectern_window::{FrameNode, SourceKey, WindowConfig};

const BOOK_LEN: u64 = 5_000;
const VIEWPORT: f32 = 720.0;
const STEP: f32 = 48.0;

fn main() -> Result<()> {
    #[cfg(feature = "logging")]
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    let mut args = std::env::args().skip(1);
    let start: u64 = match args.next() {
        Some(arg) => arg
            .parse()
            .with_context(|| format!("start verse must be a number, got {arg:?}"))?,
        None => 2_500,
    };
    let distance: f32 = match args.next() {
        Some(arg) => arg
            .parse()
            .with_context(|| format!("distance must be a number of pixels, got {arg:?}"))?,
        None => 40_000.0,
    };
    anyhow::ensure!(
        (1..=BOOK_LEN).contains(&start),
        "start verse must be within 1..={BOOK_LEN}"
    );

    println!("=== Lectern Reader Demo ===");
    println!("Reading a {BOOK_LEN}-verse book from verse {start}, {distance}px each way");
    println!();

    let mut robot = ReaderRobot::new(
        WindowConfig::default(),
        SourceKey::new("book", start),
        verses(1..=BOOK_LEN),
        Delivery::Immediate,
        VIEWPORT,
    )
    .context("invalid window configuration")?;

    robot.start();
    report(&robot, "opened");

    let down = robot.read_forward(distance, STEP);
    report(&robot, &format!("read forward {down:.0}px"));

    let up = robot.read_backward(distance * 2.0, STEP);
    report(&robot, &format!("read backward {up:.0}px"));

    let frame = robot.engine().frame();
    let nodes = frame.nodes(robot.engine().sequence(), |item| item.payload().reference.clone());
    println!("Render list head:");
    for node in nodes.iter().take(6) {
        match node {
            FrameNode::Spacer(extent) => println!("  spacer {extent:.0}px"),
            FrameNode::LoadingIndicator(direction) => println!("  loading {direction}"),
            FrameNode::TopSentinel => println!("  top sentinel"),
            FrameNode::Item(reference) => println!("  verse {reference}"),
            FrameNode::BottomSentinel => println!("  bottom sentinel"),
        }
    }

    let stats = robot.stats();
    println!();
    println!(
        "{} frames, {} reveals, {} fetches, {} anchor corrections, at most {} verses rendered",
        stats.frames, stats.reveals, stats.fetches, stats.anchor_adjustments, stats.max_rendered
    );
    if stats.missing_anchors > 0 {
        log::warn!("{} anchors lost their target", stats.missing_anchors);
    }
    Ok(())
}

fn report(robot: &ReaderRobot<Verse>, label: &str) {
    let engine = robot.engine();
    let position = robot
        .reading_position()
        .map(|(id, offset)| format!("{id} at {offset:.0}px"))
        .unwrap_or_else(|| "nothing".to_string());
    println!(
        "{label:<28} sequence {:>5} verses ({}..{}), window {:?}, reading {position}",
        engine.sequence().len(),
        engine.sequence().first_id().map_or(0, |id| id.0),
        engine.sequence().last_id().map_or(0, |id| id.0),
        engine.window(),
    );
}
