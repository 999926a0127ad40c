//! Deploy checklist document model.
//!
//! A checklist is parsed from the body of the previous checklist issue,
//! merged with freshly observed references, and rendered back to markdown.
//! None of this touches the network; see [`crate::publish`] for that.

pub mod parse;
pub mod reconcile;
pub mod render;

use serde::{Deserialize, Serialize};

pub use reconcile::{reconcile, Observed};
pub use render::RenderOptions;

/// Header line that carries the release tag.
pub(crate) const RELEASE_VERSION_PREFIX: &str = "**Release Version:**";
/// Header line that carries the compare link.
pub(crate) const COMPARE_CHANGES_PREFIX: &str = "**Compare Changes:**";
/// Header that opens the merged pull request section.
pub(crate) const CHANGES_HEADER: &str =
    "**This release contains changes from the following pull requests:**";
/// Header that opens the deploy blocker section.
pub(crate) const BLOCKERS_HEADER: &str = "**Deploy Blockers:**";
/// Label of the first checkbox under each entry.
pub(crate) const QA_LABEL: &str = "QA";
/// Label of the second checkbox under each entry.
pub(crate) const ACCESSIBILITY_LABEL: &str = "Accessibility";

/// Trims `reference` and returns it if it can stand on a `- <reference>` line.
///
/// Empty references, multi-line ones and ones starting with `[` (read back as
/// checkboxes) are rejected.
pub(crate) fn normalize_reference(reference: &str) -> Option<&str> {
    let reference = reference.trim();
    if reference.is_empty() || reference.starts_with('[') || reference.contains(['\r', '\n']) {
        return None;
    }
    Some(reference)
}

/// One pull request or issue listed in the checklist, with its two checkboxes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistEntry {
    /// URL of the pull request or issue. Unique within its section.
    pub reference: String,
    /// Whether the "QA" box is ticked.
    pub qa_checked: bool,
    /// Whether the "Accessibility" box is ticked.
    pub accessibility_checked: bool,
}

impl ChecklistEntry {
    /// An entry with both boxes open.
    #[must_use]
    pub fn open(reference: impl Into<String>) -> Self {
        Self { reference: reference.into(), qa_checked: false, accessibility_checked: false }
    }

    /// An entry with both boxes ticked.
    #[must_use]
    pub fn checked(reference: impl Into<String>) -> Self {
        Self { reference: reference.into(), qa_checked: true, accessibility_checked: true }
    }
}

/// The deploy blockers section. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BlockerSection {
    entries: Vec<ChecklistEntry>,
}

impl BlockerSection {
    /// Wraps `entries`, or returns `None` when there are none to show.
    #[must_use]
    pub fn new(entries: Vec<ChecklistEntry>) -> Option<Self> {
        if entries.is_empty() {
            None
        } else {
            Some(Self { entries })
        }
    }

    /// Blocker entries in display order.
    #[must_use]
    pub fn entries(&self) -> &[ChecklistEntry] {
        &self.entries
    }
}

/// Full state of one checklist issue.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChecklistDocument {
    /// Release version the checklist covers, e.g. `1.0.2-1`. Empty when unknown.
    pub release_tag: String,
    /// Merged pull requests, in first-seen order.
    pub changes: Vec<ChecklistEntry>,
    /// Open deploy blockers; `None` omits the section.
    pub blockers: Option<BlockerSection>,
    /// Number of the tracker issue this document lives in, once published.
    pub issue_number: Option<u64>,
}

impl ChecklistDocument {
    /// An empty document for `release_tag`.
    #[must_use]
    pub fn new(release_tag: impl Into<String>) -> Self {
        Self { release_tag: release_tag.into(), ..Self::default() }
    }

    /// Attaches the tracker issue number.
    #[must_use]
    pub fn with_issue_number(mut self, number: u64) -> Self {
        self.issue_number = Some(number);
        self
    }

    /// Blocker entries, empty when the section is absent.
    #[must_use]
    pub fn blocker_entries(&self) -> &[ChecklistEntry] {
        self.blockers.as_ref().map_or(&[], BlockerSection::entries)
    }

}
