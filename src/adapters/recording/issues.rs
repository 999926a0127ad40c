//! Recording adapter for the `IssueTracker` port.

use super::record_result;
use crate::cassette::session::SharedRecorder;
use crate::ports::{Issue, IssueQuery, IssueRef, IssueTracker, IssueUpdate, NewIssue, TrackerFuture};

/// Records every tracker call, including failures.
pub struct RecordingIssueTracker {
    inner: Box<dyn IssueTracker>,
    recorder: SharedRecorder,
}

impl RecordingIssueTracker {
    /// Wraps `inner`.
    pub fn new(inner: Box<dyn IssueTracker>, recorder: SharedRecorder) -> Self {
        Self { inner, recorder }
    }
}

impl IssueTracker for RecordingIssueTracker {
    fn list_issues<'a>(&'a self, query: &'a IssueQuery) -> TrackerFuture<'a, Vec<Issue>> {
        Box::pin(async move {
            let result = self.inner.list_issues(query).await;
            record_result(&self.recorder, "issues", "list_issues", query, &result);
            result
        })
    }

    fn create_issue<'a>(&'a self, issue: &'a NewIssue) -> TrackerFuture<'a, IssueRef> {
        Box::pin(async move {
            let result = self.inner.create_issue(issue).await;
            record_result(&self.recorder, "issues", "create_issue", issue, &result);
            result
        })
    }

    fn update_issue<'a>(&'a self, update: &'a IssueUpdate) -> TrackerFuture<'a, IssueRef> {
        Box::pin(async move {
            let result = self.inner.update_issue(update).await;
            record_result(&self.recorder, "issues", "update_issue", update, &result);
            result
        })
    }
}
