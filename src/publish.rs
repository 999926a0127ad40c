//! Creates or updates the deploy checklist issue.
//!
//! The most recent open checklist is updated in place; when none is open a
//! new one is created. The merge range always starts at the tag of the most
//! recent closed checklist, so every run recomputes the full set of pull
//! requests in the release instead of only the ones merged since last time.

use serde::Serialize;

use crate::checklist::{reconcile, ChecklistDocument, ChecklistEntry, Observed, RenderOptions};
use crate::config::Config;
use crate::context::ServiceContext;
use crate::ports::{
    Issue, IssueQuery, IssueRef, IssueState, IssueUpdate, NewIssue, StateFilter, TrackerError,
};

/// Labels, titles and render settings for one repository.
#[derive(Debug, Clone)]
pub struct PublishSettings {
    /// Label identifying checklist issues.
    pub checklist_label: String,
    /// Label identifying deploy blockers.
    pub blocker_label: String,
    /// Title prefix for new checklists.
    pub title_prefix: String,
    /// Logins assigned to new checklists.
    pub assignees: Vec<String>,
    /// Text used when rendering the body.
    pub render: RenderOptions,
}

impl PublishSettings {
    /// Settings taken from the runtime configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            checklist_label: config.checklist_label.clone(),
            blocker_label: config.blocker_label.clone(),
            title_prefix: config.title_prefix.clone(),
            assignees: config.assignees.clone(),
            render: config.render_options(),
        }
    }
}

/// What a run was asked to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishRequest {
    /// Version being deployed to staging.
    pub release_tag: String,
    /// Start of the merge range; defaults to the last closed checklist's tag.
    pub from_tag: Option<String>,
}

/// The write a run will make.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum IssuePayload {
    /// Open a new checklist.
    Create(NewIssue),
    /// Replace the body of the open checklist.
    Update(IssueUpdate),
}

impl IssuePayload {
    /// The body either payload carries.
    #[must_use]
    pub fn body(&self) -> &str {
        match self {
            Self::Create(issue) => &issue.body,
            Self::Update(update) => &update.body,
        }
    }
}

/// The checklists a run cares about, picked from a newest-first listing.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChecklistSelection<'a> {
    /// Most recent open checklist; reconciled into and updated.
    pub current: Option<&'a Issue>,
    /// Most recent closed checklist; its tag starts the merge range.
    pub previous: Option<&'a Issue>,
}

/// Picks the current and previous checklist from `issues` (newest first).
///
/// Older open checklists are ignored.
#[must_use]
pub fn select_checklists(issues: &[Issue]) -> ChecklistSelection<'_> {
    let current = issues.iter().find(|issue| issue.state == IssueState::Open);
    let previous = issues.iter().find(|issue| issue.state == IssueState::Closed);

    let open_count = issues.iter().filter(|issue| issue.state == IssueState::Open).count();
    if open_count > 1 {
        tracing::warn!(
            open_count,
            using = current.map(|issue| issue.number),
            "Several checklists are open; updating the most recent one"
        );
    }

    ChecklistSelection { current, previous }
}

/// Result of [`prepare`]: the reconciled checklist and the write to make.
#[derive(Debug, Clone)]
pub struct PreparedPublish {
    /// Create or update payload.
    pub payload: IssuePayload,
    /// Reconciled checklist the payload body was rendered from.
    pub document: ChecklistDocument,
    /// Open checklist being updated and its body before this run.
    pub current: Option<(IssueRef, String)>,
}

impl PreparedPublish {
    /// True when an update would write the body the issue already has.
    #[must_use]
    pub fn is_unchanged(&self) -> bool {
        matches!(
            (&self.payload, &self.current),
            (IssuePayload::Update(update), Some((_, body))) if update.body == *body
        )
    }
}

/// What [`execute`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PublishOutcome {
    /// A new checklist was opened.
    Created(IssueRef),
    /// The open checklist was updated.
    Updated(IssueRef),
    /// The open checklist already had the rendered body; nothing was written.
    Unchanged(IssueRef),
}

impl PublishOutcome {
    /// The checklist issue the run ended on.
    #[must_use]
    pub fn issue(&self) -> &IssueRef {
        match self {
            Self::Created(issue) | Self::Updated(issue) | Self::Unchanged(issue) => issue,
        }
    }
}

/// Failures that abort a run. Nothing is written after a failure.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    /// No target release tag was given.
    #[error("release tag must not be empty")]
    MissingReleaseTag,

    /// Listing checklist issues failed.
    #[error("failed to list checklist issues: {0}")]
    ListChecklists(#[source] TrackerError),

    /// Listing deploy blockers failed.
    #[error("failed to list deploy blockers: {0}")]
    ListBlockers(#[source] TrackerError),

    /// Creating the checklist failed.
    #[error("failed to create checklist: {0}")]
    Create(#[source] TrackerError),

    /// Updating the checklist failed.
    #[error("failed to update checklist #{number}: {source}")]
    Update {
        /// Issue being updated.
        number: u64,
        /// Tracker failure.
        source: TrackerError,
    },
}

/// Gathers inputs, reconciles and renders, without writing anything.
///
/// # Errors
///
/// Returns an error if the release tag is empty or a tracker listing fails.
pub async fn prepare(
    ctx: &ServiceContext,
    settings: &PublishSettings,
    request: &PublishRequest,
) -> Result<PreparedPublish, PublishError> {
    let release_tag = request.release_tag.trim();
    if release_tag.is_empty() {
        return Err(PublishError::MissingReleaseTag);
    }

    let checklist_query =
        IssueQuery { label: settings.checklist_label.clone(), state: StateFilter::All };
    let blocker_query = IssueQuery { label: settings.blocker_label.clone(), state: StateFilter::Open };

    let (checklists, blockers) = tokio::join!(
        ctx.issues.list_issues(&checklist_query),
        ctx.issues.list_issues(&blocker_query),
    );
    let checklists = checklists.map_err(PublishError::ListChecklists)?;
    let blockers = blockers.map_err(PublishError::ListBlockers)?;

    let selection = select_checklists(&checklists);
    match selection.current {
        Some(issue) => tracing::info!(number = issue.number, "Updating open checklist"),
        None => tracing::info!("No open checklist; creating a new one"),
    }

    let previous_tag = selection
        .previous
        .map(|issue| ChecklistDocument::parse(&issue.body).release_tag)
        .filter(|tag| !tag.is_empty());
    let from_tag = request.from_tag.clone().or(previous_tag);

    let base = match selection.current {
        Some(issue) => ChecklistDocument::parse(&issue.body).with_issue_number(issue.number),
        None => ChecklistDocument::default(),
    };

    // Without a range start nothing was observed; keep what the checklist lists.
    let changes = if let Some(from_tag) = &from_tag {
        tracing::info!(from_tag = %from_tag, to_tag = release_tag, "Collecting merged pull requests");
        ctx.changes.list_merged_references(from_tag, release_tag)
    } else {
        tracing::warn!(
            to_tag = release_tag,
            kept = base.changes.len(),
            "No previous release tag found; keeping the pull requests already listed"
        );
        base.changes.iter().map(|entry| entry.reference.clone()).collect()
    };

    let observed = Observed {
        release_tag: Some(release_tag.to_string()),
        changes,
        blockers: blockers
            .iter()
            .filter(|issue| !issue.labels.contains(&settings.checklist_label))
            .map(|issue| ChecklistEntry::open(issue.html_url.as_str()))
            .collect(),
    };

    let document = reconcile(&base, &observed);
    let body = document.render(&settings.render);

    let (payload, current) = match selection.current {
        Some(issue) => (
            IssuePayload::Update(IssueUpdate { number: issue.number, body }),
            Some((
                IssueRef { number: issue.number, html_url: issue.html_url.clone() },
                issue.body.clone(),
            )),
        ),
        None => {
            let date = ctx.clock.now().format("%Y-%m-%d");
            let title = format!("{} {date}", settings.title_prefix);
            let issue = NewIssue {
                title,
                body,
                labels: vec![settings.checklist_label.clone()],
                assignees: settings.assignees.clone(),
            };
            (IssuePayload::Create(issue), None)
        }
    };

    Ok(PreparedPublish { payload, document, current })
}

/// Makes the write described by `prepared`.
///
/// # Errors
///
/// Returns an error if the tracker rejects the create or update call.
pub async fn execute(
    ctx: &ServiceContext,
    prepared: &PreparedPublish,
) -> Result<PublishOutcome, PublishError> {
    if prepared.is_unchanged() {
        if let Some((issue, _)) = &prepared.current {
            tracing::info!(number = issue.number, "Checklist already up to date");
            return Ok(PublishOutcome::Unchanged(issue.clone()));
        }
    }

    match &prepared.payload {
        IssuePayload::Create(issue) => {
            let created = ctx.issues.create_issue(issue).await.map_err(PublishError::Create)?;
            tracing::info!(number = created.number, url = %created.html_url, "Created checklist");
            Ok(PublishOutcome::Created(created))
        }
        IssuePayload::Update(update) => {
            let updated = ctx
                .issues
                .update_issue(update)
                .await
                .map_err(|source| PublishError::Update { number: update.number, source })?;
            tracing::info!(number = updated.number, url = %updated.html_url, "Updated checklist");
            Ok(PublishOutcome::Updated(updated))
        }
    }
}

/// [`prepare`] followed by [`execute`].
///
/// # Errors
///
/// Returns the first failure of either step.
pub async fn publish(
    ctx: &ServiceContext,
    settings: &PublishSettings,
    request: &PublishRequest,
) -> Result<PublishOutcome, PublishError> {
    let prepared = prepare(ctx, settings, request).await?;
    execute(ctx, &prepared).await
}


#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use chrono::{DateTime, TimeZone, Utc};

    use super::*;
    use crate::checklist::BlockerSection;
    use crate::ports::{ChangeSource, Clock, IssueTracker, TrackerFuture};

    const CHECKLIST_LABEL: &str = "StagingDeployCash";
    const BLOCKER_LABEL: &str = "DeployBlockerCash";

    struct FixedClock;
    impl Clock for FixedClock {
        fn now(&self) -> DateTime<Utc> {
            Utc.with_ymd_and_hms(2024, 3, 9, 15, 0, 0).unwrap()
        }
    }

    struct FixedChanges {
        references: Vec<String>,
        calls: Mutex<Vec<(String, String)>>,
    }
    impl ChangeSource for FixedChanges {
        fn list_merged_references(&self, from_tag: &str, to_tag: &str) -> Vec<String> {
            self.calls.lock().unwrap().push((from_tag.into(), to_tag.into()));
            self.references.clone()
        }
    }

    #[derive(Default)]
    struct FakeTracker {
        checklists: Vec<Issue>,
        blockers: Vec<Issue>,
        fail_listing: bool,
        writes: Mutex<Vec<String>>,
    }
    impl IssueTracker for FakeTracker {
        fn list_issues<'a>(&'a self, query: &'a IssueQuery) -> TrackerFuture<'a, Vec<Issue>> {
            Box::pin(async move {
                if self.fail_listing {
                    return Err(TrackerError::Unauthorized);
                }
                Ok(if query.label == CHECKLIST_LABEL {
                    self.checklists.clone()
                } else {
                    self.blockers.clone()
                })
            })
        }
        fn create_issue<'a>(&'a self, issue: &'a NewIssue) -> TrackerFuture<'a, IssueRef> {
            Box::pin(async move {
                self.writes.lock().unwrap().push(format!("create {}", issue.title));
                Ok(IssueRef { number: 100, html_url: "https://github.com/acme/app/issues/100".into() })
            })
        }
        fn update_issue<'a>(&'a self, update: &'a IssueUpdate) -> TrackerFuture<'a, IssueRef> {
            Box::pin(async move {
                self.writes.lock().unwrap().push(format!("update {}", update.number));
                Ok(IssueRef {
                    number: update.number,
                    html_url: format!("https://github.com/acme/app/issues/{}", update.number),
                })
            })
        }
    }

    fn pr(n: u64) -> String {
        format!("https://github.com/acme/app/pull/{n}")
    }

    fn settings() -> PublishSettings {
        PublishSettings {
            checklist_label: CHECKLIST_LABEL.into(),
            blocker_label: BLOCKER_LABEL.into(),
            title_prefix: "Deploy Checklist:".into(),
            assignees: vec!["applausebot".into()],
            render: RenderOptions {
                compare_url: "https://github.com/acme/app/compare/production...staging".into(),
                reviewer_team: "acme/qa".into(),
            },
        }
    }

    fn checklist_issue(number: u64, state: IssueState, document: &ChecklistDocument) -> Issue {
        Issue {
            number,
            title: format!("Deploy Checklist #{number}"),
            body: document.render(&settings().render),
            state,
            html_url: format!("https://github.com/acme/app/issues/{number}"),
            labels: vec![CHECKLIST_LABEL.into()],
        }
    }

    fn blocker_issue(number: u64) -> Issue {
        Issue {
            number,
            title: "Crash on launch".into(),
            body: String::new(),
            state: IssueState::Open,
            html_url: format!("https://github.com/acme/app/issues/{number}"),
            labels: vec![BLOCKER_LABEL.into()],
        }
    }

    fn context(tracker: FakeTracker, references: Vec<String>) -> ServiceContext {
        ServiceContext::new(
            Box::new(FixedClock),
            Box::new(tracker),
            Box::new(FixedChanges { references, calls: Mutex::new(Vec::new()) }),
        )
    }

    fn request(tag: &str) -> PublishRequest {
        PublishRequest { release_tag: tag.into(), from_tag: None }
    }

    #[test]
    fn selection_prefers_most_recent_open_and_closed() {
        let doc = ChecklistDocument::new("1.0.0-0");
        let issues = vec![
            checklist_issue(9, IssueState::Open, &doc),
            checklist_issue(8, IssueState::Closed, &doc),
            checklist_issue(7, IssueState::Open, &doc),
            checklist_issue(6, IssueState::Closed, &doc),
        ];
        let selection = select_checklists(&issues);
        assert_eq!(selection.current.map(|i| i.number), Some(9));
        assert_eq!(selection.previous.map(|i| i.number), Some(8));
        assert_eq!(select_checklists(&[]), ChecklistSelection::default());
    }

    #[tokio::test]
    async fn creates_dated_checklist_when_none_is_open() {
        let tracker = FakeTracker {
            checklists: vec![checklist_issue(5, IssueState::Closed, &ChecklistDocument::new("1.0.1-9"))],
            ..FakeTracker::default()
        };
        let ctx = context(tracker, vec![pr(6), pr(7), pr(8)]);

        let prepared = prepare(&ctx, &settings(), &request("1.0.2-1")).await.unwrap();
        let IssuePayload::Create(issue) = &prepared.payload else {
            panic!("expected a create payload, got {:?}", prepared.payload);
        };
        assert_eq!(issue.title, "Deploy Checklist: 2024-03-09");
        assert_eq!(issue.labels, vec![CHECKLIST_LABEL.to_string()]);
        assert_eq!(issue.assignees, vec!["applausebot".to_string()]);
        assert!(issue.body.starts_with("**Release Version:** `1.0.2-1`"));
        assert!(!issue.body.contains("**Deploy Blockers:**"));
        assert_eq!(
            prepared.document.changes,
            vec![
                ChecklistEntry::open(pr(6)),
                ChecklistEntry::open(pr(7)),
                ChecklistEntry::open(pr(8)),
            ]
        );

        let outcome = execute(&ctx, &prepared).await.unwrap();
        assert_eq!(outcome.issue().number, 100);
        assert!(matches!(outcome, PublishOutcome::Created(_)));
    }

    #[tokio::test]
    async fn merge_range_starts_at_last_closed_checklist() {
        let changes = FixedChanges { references: Vec::new(), calls: Mutex::new(Vec::new()) };
        let tracker = FakeTracker {
            checklists: vec![
                checklist_issue(11, IssueState::Open, &ChecklistDocument::new("1.0.2-1")),
                checklist_issue(10, IssueState::Closed, &ChecklistDocument::new("1.0.1-9")),
            ],
            ..FakeTracker::default()
        };
        let changes = std::sync::Arc::new(changes);

        struct Shared(std::sync::Arc<FixedChanges>);
        impl ChangeSource for Shared {
            fn list_merged_references(&self, from_tag: &str, to_tag: &str) -> Vec<String> {
                self.0.list_merged_references(from_tag, to_tag)
            }
        }

        let ctx = ServiceContext::new(
            Box::new(FixedClock),
            Box::new(tracker),
            Box::new(Shared(std::sync::Arc::clone(&changes))),
        );
        prepare(&ctx, &settings(), &request("1.0.2-2")).await.unwrap();

        let calls = changes.calls.lock().unwrap().clone();
        assert_eq!(calls, vec![("1.0.1-9".to_string(), "1.0.2-2".to_string())]);
    }

    #[tokio::test]
    async fn updates_open_checklist_preserving_progress() {
        let previous = ChecklistDocument {
            release_tag: "1.0.2-1".into(),
            changes: vec![
                ChecklistEntry::open(pr(6)),
                ChecklistEntry { reference: pr(7), qa_checked: true, accessibility_checked: false },
                ChecklistEntry::open(pr(8)),
            ],
            blockers: BlockerSection::new(vec![
                ChecklistEntry::open(pr(6)),
                ChecklistEntry::open(pr(9)),
                ChecklistEntry::checked(pr(10)),
            ]),
            issue_number: None,
        };
        let tracker = FakeTracker {
            checklists: vec![
                checklist_issue(29, IssueState::Open, &previous),
                checklist_issue(28, IssueState::Closed, &ChecklistDocument::new("1.0.1-9")),
            ],
            blockers: [6, 9, 10, 11, 12]
                .into_iter()
                .map(|n| Issue { html_url: pr(n), ..blocker_issue(n) })
                .collect(),
            ..FakeTracker::default()
        };
        let ctx = context(tracker, vec![pr(6), pr(7), pr(8), pr(9), pr(10)]);

        let prepared = prepare(&ctx, &settings(), &request("1.0.2-2")).await.unwrap();
        let IssuePayload::Update(update) = &prepared.payload else {
            panic!("expected an update payload");
        };
        assert_eq!(update.number, 29);

        let doc = &prepared.document;
        assert_eq!(doc.release_tag, "1.0.2-2");
        assert_eq!(doc.issue_number, Some(29));
        assert_eq!(doc.changes.len(), 5);
        assert!(doc.changes[1].qa_checked);
        assert!(doc.changes[3..].iter().all(|e| !e.qa_checked && !e.accessibility_checked));

        let blockers: Vec<&str> = doc.blocker_entries().iter().map(|e| e.reference.as_str()).collect();
        assert_eq!(blockers, vec![pr(6), pr(9), pr(10), pr(11), pr(12)]);
        assert!(doc.blocker_entries()[2].qa_checked);
        assert!(!doc.blocker_entries()[3].qa_checked);

        assert_eq!(ChecklistDocument::parse(&update.body).with_issue_number(29), *doc);

        let outcome = execute(&ctx, &prepared).await.unwrap();
        assert!(matches!(outcome, PublishOutcome::Updated(ref issue) if issue.number == 29));
    }

    #[tokio::test]
    async fn identical_body_is_not_written() {
        let current = ChecklistDocument {
            release_tag: "1.0.2-2".into(),
            changes: vec![ChecklistEntry::checked(pr(6))],
            blockers: None,
            issue_number: None,
        };
        let tracker = FakeTracker {
            checklists: vec![
                checklist_issue(29, IssueState::Open, &current),
                checklist_issue(28, IssueState::Closed, &ChecklistDocument::new("1.0.2-1")),
            ],
            ..FakeTracker::default()
        };
        let ctx = context(tracker, vec![pr(6)]);

        let outcome = publish(&ctx, &settings(), &request("1.0.2-2")).await.unwrap();
        assert!(matches!(outcome, PublishOutcome::Unchanged(ref issue) if issue.number == 29));
    }

    #[tokio::test]
    async fn without_previous_tag_no_changes_are_listed() {
        let ctx = context(FakeTracker::default(), vec![pr(1)]);
        let prepared = prepare(&ctx, &settings(), &request("1.0.0-0")).await.unwrap();
        assert!(prepared.document.changes.is_empty());
        assert!(matches!(prepared.payload, IssuePayload::Create(_)));
    }

    #[tokio::test]
    async fn unknown_range_start_keeps_listed_progress() {
        let current = ChecklistDocument {
            release_tag: "1.0.2-1".into(),
            changes: vec![ChecklistEntry::checked(pr(6)), ChecklistEntry::checked(pr(7))],
            blockers: None,
            issue_number: None,
        };
        let tracker = FakeTracker {
            checklists: vec![checklist_issue(29, IssueState::Open, &current)],
            ..FakeTracker::default()
        };
        // A query would add pr1; with no closed checklist none must be made.
        let ctx = context(tracker, vec![pr(1)]);

        let prepared = prepare(&ctx, &settings(), &request("1.0.2-2")).await.unwrap();
        assert_eq!(prepared.document.release_tag, "1.0.2-2");
        assert_eq!(
            prepared.document.changes,
            vec![ChecklistEntry::checked(pr(6)), ChecklistEntry::checked(pr(7))]
        );
        let IssuePayload::Update(update) = &prepared.payload else {
            panic!("expected an update payload");
        };
        assert!(update.body.contains(&format!("- {}\r\n  - [x] QA", pr(6))));
    }

    #[tokio::test]
    async fn explicit_from_tag_overrides_previous_checklist() {
        let ctx = context(FakeTracker::default(), vec![pr(1)]);
        let request = PublishRequest { release_tag: "1.0.0-1".into(), from_tag: Some("1.0.0-0".into()) };
        let prepared = prepare(&ctx, &settings(), &request).await.unwrap();
        assert_eq!(prepared.document.changes, vec![ChecklistEntry::open(pr(1))]);
    }

    #[tokio::test]
    async fn tracker_failure_aborts_before_writing() {
        let tracker = FakeTracker { fail_listing: true, ..FakeTracker::default() };
        let ctx = context(tracker, Vec::new());
        let err = publish(&ctx, &settings(), &request("1.0.0-0")).await.unwrap_err();
        assert!(err.to_string().contains("authentication required"));
    }

    #[tokio::test]
    async fn empty_tag_is_rejected() {
        let ctx = context(FakeTracker::default(), Vec::new());
        let err = prepare(&ctx, &settings(), &request("  ")).await.unwrap_err();
        assert!(matches!(err, PublishError::MissingReleaseTag));
    }

    #[test]
    fn payload_serializes_with_action_tag() {
        let payload = IssuePayload::Update(IssueUpdate { number: 3, body: "b".into() });
        let json = serde_json::to_value(&payload).unwrap();
        assert_eq!(json["action"], "update");
        assert_eq!(json["number"], 3);
        assert_eq!(payload.body(), "b");
    }
}
