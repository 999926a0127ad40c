//! Port traits for everything the checklist pipeline reads from or writes to.
//!
//! The core never talks to git, GitHub or the system clock directly; it goes
//! through these traits. Implementations live in `src/adapters/`.

pub mod changes;
pub mod clock;
pub mod issues;

pub use changes::ChangeSource;
pub use clock::Clock;
pub use issues::{
    Issue, IssueQuery, IssueRef, IssueState, IssueTracker, IssueUpdate, NewIssue, StateFilter,
    TrackerError, TrackerFuture,
};
