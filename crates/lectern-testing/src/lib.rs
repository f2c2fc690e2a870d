//! Testing utilities and harness for lectern

pub mod book;
pub mod clock;
pub mod pager;
pub mod robot;
pub mod robot_assertions;
pub mod viewport;

pub use book::{verse_height, verses, Verse};
pub use clock::ManualClock;
pub use pager::{Delivery, FakePager};
pub use robot::*;
pub use viewport::FakeViewport;

pub mod prelude {
    pub use crate::book::*;
    pub use crate::clock::ManualClock;
    pub use crate::pager::{Delivery, FakePager};
    pub use crate::robot::*;
    pub use crate::robot_assertions::*;
    pub use crate::viewport::FakeViewport;
}
