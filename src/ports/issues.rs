//! Issue tracker port: where checklists and deploy blockers live.

use std::future::Future;
use std::pin::Pin;

use serde::{Deserialize, Serialize};

/// Boxed future returned by [`IssueTracker`] methods, keeping the trait dyn-compatible.
pub type TrackerFuture<'a, T> = Pin<Box<dyn Future<Output = Result<T, TrackerError>> + Send + 'a>>;

/// Failures reported by an issue tracker.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    /// The request never produced a usable response.
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The tracker answered with an error status.
    #[error("issue tracker error: {message} (status: {status})")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Message returned by the tracker.
        message: String,
    },

    /// The token was missing or rejected.
    #[error("authentication required")]
    Unauthorized,

    /// The tracker refused further requests for now.
    #[error("rate limit exceeded")]
    RateLimited,

    /// A recorded failure served back from a cassette.
    #[error("{0}")]
    Replay(String),
}

/// Whether an issue is still open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueState {
    /// Open.
    Open,
    /// Closed.
    Closed,
}

/// Which issues a listing should return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StateFilter {
    /// Only open issues.
    Open,
    /// Open and closed issues.
    All,
}

impl StateFilter {
    /// Query-string value understood by the tracker.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::All => "all",
        }
    }
}

/// An issue as returned by [`IssueTracker::list_issues`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Issue {
    /// Tracker-assigned number.
    pub number: u64,
    /// Issue title.
    pub title: String,
    /// Issue body; empty when the issue has none.
    pub body: String,
    /// Open or closed.
    pub state: IssueState,
    /// Browser URL, used as the blocker reference.
    pub html_url: String,
    /// Label names.
    pub labels: Vec<String>,
}

/// Filter for [`IssueTracker::list_issues`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueQuery {
    /// Only issues carrying this label.
    pub label: String,
    /// Open only, or everything.
    pub state: StateFilter,
}

/// Payload for creating an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewIssue {
    /// Issue title.
    pub title: String,
    /// Issue body.
    pub body: String,
    /// Labels to apply.
    pub labels: Vec<String>,
    /// Logins to assign.
    pub assignees: Vec<String>,
}

/// Payload for replacing an issue's body.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueUpdate {
    /// Issue to update.
    pub number: u64,
    /// New body.
    pub body: String,
}

/// Identifies an issue after a write.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueRef {
    /// Tracker-assigned number.
    pub number: u64,
    /// Browser URL.
    pub html_url: String,
}

/// Reads and writes issues in an external tracker.
pub trait IssueTracker: Send + Sync {
    /// Lists issues matching `query`, most recently created first.
    ///
    /// # Errors
    ///
    /// Returns an error if the tracker cannot be reached or rejects the request.
    fn list_issues<'a>(&'a self, query: &'a IssueQuery) -> TrackerFuture<'a, Vec<Issue>>;

    /// Creates an issue.
    ///
    /// # Errors
    ///
    /// Returns an error if the issue cannot be created.
    fn create_issue<'a>(&'a self, issue: &'a NewIssue) -> TrackerFuture<'a, IssueRef>;

    /// Replaces the body of an existing issue.
    ///
    /// # Errors
    ///
    /// Returns an error if the issue cannot be found or updated.
    fn update_issue<'a>(&'a self, update: &'a IssueUpdate) -> TrackerFuture<'a, IssueRef>;
}
