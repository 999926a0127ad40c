//! Replaying adapter for the `IssueTracker` port.

use std::sync::Mutex;

use super::{next_matching_output, next_output, replay_result};
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::{Issue, IssueQuery, IssueRef, IssueTracker, IssueUpdate, NewIssue, TrackerFuture};

/// Returns recorded tracker responses. Listings are matched on their query.
pub struct ReplayingIssueTracker {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingIssueTracker {
    /// Serves responses from `replayer`.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }
}

impl IssueTracker for ReplayingIssueTracker {
    fn list_issues<'a>(&'a self, query: &'a IssueQuery) -> TrackerFuture<'a, Vec<Issue>> {
        let output = next_matching_output(&self.replayer, "issues", "list_issues", query);
        Box::pin(async move { replay_result(output, "issues::list_issues") })
    }

    fn create_issue<'a>(&'a self, _issue: &'a NewIssue) -> TrackerFuture<'a, IssueRef> {
        let output = next_output(&self.replayer, "issues", "create_issue");
        Box::pin(async move { replay_result(output, "issues::create_issue") })
    }

    fn update_issue<'a>(&'a self, _update: &'a IssueUpdate) -> TrackerFuture<'a, IssueRef> {
        let output = next_output(&self.replayer, "issues", "update_issue");
        Box::pin(async move { replay_result(output, "issues::update_issue") })
    }
}
