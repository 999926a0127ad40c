//! Cassettes: recorded port interactions that can be replayed in tests.

pub mod format;
pub mod recorder;
pub mod replayer;
pub mod session;
