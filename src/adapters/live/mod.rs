//! Live adapters talking to the real system clock, git and GitHub.

pub mod clock;
pub mod git;
pub mod github;

pub use clock::SystemClock;
pub use git::GitChangeSource;
pub use github::GitHubIssueTracker;
