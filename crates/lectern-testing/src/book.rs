//! Synthetic books of verses.

use std::ops::RangeInclusive;

use lectern_window::{Item, ItemId};

/// Payload of a synthetic verse.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Verse {
    pub reference: String,
    pub text: String,
}

/// Verses with ids and ordinals equal to their number.
pub fn verses(numbers: RangeInclusive<u64>) -> Vec<Item<Verse>> {
    numbers
        .map(|n| {
            Item::new(
                ItemId(n),
                n,
                Verse {
                    reference: format!("1:{n}"),
                    text: verse_text(n),
                },
            )
        })
        .collect()
}

fn verse_text(n: u64) -> String {
    let words = 6 + (n * 7 % 23) as usize;
    (0..words)
        .map(|w| if w == 0 { "And" } else { "word" })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Height a verse takes on screen: one line per eight words.
pub fn verse_height(item: &Item<Verse>) -> f32 {
    let words = item.payload().text.split_whitespace().count();
    let lines = words.div_ceil(8).max(1);
    lines as f32 * 18.0 + 6.0
}
