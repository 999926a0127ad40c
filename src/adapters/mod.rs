//! Port implementations.
//!
//! `live` talks to the real world, `recording` wraps a live adapter and
//! writes every call to a cassette, `replaying` serves calls from one.

pub mod live;
pub mod recording;
pub mod replaying;
