//! Renders a [`ChecklistDocument`] to the canonical issue body.

use std::fmt::Write as _;

use super::{
    ChecklistDocument, ChecklistEntry, ACCESSIBILITY_LABEL, BLOCKERS_HEADER, CHANGES_HEADER,
    COMPARE_CHANGES_PREFIX, QA_LABEL, RELEASE_VERSION_PREFIX,
};

const CRLF: &str = "\r\n";

/// Repository-specific text that is not part of the document itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    /// Link shown on the "Compare Changes" line.
    pub compare_url: String,
    /// Team mentioned in the closing `cc` line, without the `@`.
    pub reviewer_team: String,
}

impl ChecklistDocument {
    /// Renders the issue body. Identical input always yields identical bytes.
    #[must_use]
    pub fn render(&self, options: &RenderOptions) -> String {
        let mut body = String::new();

        let _ = write!(body, "{RELEASE_VERSION_PREFIX} `{}`{CRLF}", self.release_tag);
        let _ = write!(body, "{COMPARE_CHANGES_PREFIX} {}{CRLF}", options.compare_url);
        body.push_str(CRLF);

        if !self.changes.is_empty() {
            write_section(&mut body, CHANGES_HEADER, &self.changes);
        }
        if let Some(blockers) = &self.blockers {
            write_section(&mut body, BLOCKERS_HEADER, blockers.entries());
        }

        let _ = write!(body, "cc @{}{CRLF}", options.reviewer_team);
        body
    }
}

fn write_section(body: &mut String, header: &str, entries: &[ChecklistEntry]) {
    let _ = write!(body, "{header}{CRLF}{CRLF}");
    for entry in entries {
        let _ = write!(body, "- {}{CRLF}", entry.reference);
        write_checkbox(body, entry.qa_checked, QA_LABEL);
        write_checkbox(body, entry.accessibility_checked, ACCESSIBILITY_LABEL);
        body.push_str(CRLF);
    }
}

fn write_checkbox(body: &mut String, checked: bool, label: &str) {
    let mark = if checked { 'x' } else { ' ' };
    let _ = write!(body, "  - [{mark}] {label}{CRLF}");
}
