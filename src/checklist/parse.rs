//! Recovers a [`ChecklistDocument`] from a checklist issue body.
//!
//! Parsing never fails. Anything that does not look like a checklist comes
//! back as the empty document so a fresh one can still be produced.

use super::{
    normalize_reference, BlockerSection, ChecklistDocument, ChecklistEntry, BLOCKERS_HEADER,
    CHANGES_HEADER, RELEASE_VERSION_PREFIX,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Section {
    Preamble,
    Changes,
    Blockers,
}

/// Accumulates entries for one section, keeping the first of any duplicate.
#[derive(Default)]
struct SectionBuilder {
    entries: Vec<ChecklistEntry>,
    /// Index of the entry still collecting checkbox lines, and how many it has.
    open: Option<(usize, u8)>,
}

impl SectionBuilder {
    fn start_entry(&mut self, reference: &str) {
        if self.entries.iter().any(|e| e.reference == reference) {
            self.open = None;
            return;
        }
        self.entries.push(ChecklistEntry::open(reference));
        self.open = Some((self.entries.len() - 1, 0));
    }

    fn checkbox(&mut self, checked: bool) {
        let Some((index, seen)) = self.open else {
            return;
        };
        let entry = &mut self.entries[index];
        match seen {
            0 => entry.qa_checked = checked,
            1 => entry.accessibility_checked = checked,
            _ => return,
        }
        self.open = Some((index, seen + 1));
    }

    fn close(&mut self) {
        self.open = None;
    }
}

impl ChecklistDocument {
    /// Parses a checklist body. A body without a release version line yields
    /// the empty document.
    #[must_use]
    pub fn parse(body: &str) -> Self {
        let mut release_tag: Option<String> = None;
        let mut section = Section::Preamble;
        let mut changes = SectionBuilder::default();
        let mut blockers = SectionBuilder::default();

        for raw in body.split('\n') {
            let line = raw.strip_suffix('\r').unwrap_or(raw);
            let trimmed = line.trim();

            if let Some(rest) = trimmed.strip_prefix(RELEASE_VERSION_PREFIX) {
                if release_tag.is_none() {
                    release_tag = Some(rest.trim().trim_matches('`').trim().to_string());
                }
                continue;
            }
            if trimmed == CHANGES_HEADER {
                section = Section::Changes;
                blockers.close();
                continue;
            }
            if trimmed == BLOCKERS_HEADER {
                section = Section::Blockers;
                changes.close();
                continue;
            }

            let builder = match section {
                Section::Preamble => continue,
                Section::Changes => &mut changes,
                Section::Blockers => &mut blockers,
            };

            if let Some(checked) = checkbox_state(line) {
                builder.checkbox(checked);
            } else if let Some(reference) = bullet_reference(line) {
                builder.start_entry(reference);
            } else if !trimmed.is_empty() {
                // Footer or free text ends whatever entry was open.
                builder.close();
                if trimmed.starts_with("cc @") {
                    section = Section::Preamble;
                }
            }
        }

        let Some(release_tag) = release_tag else {
            tracing::debug!("Checklist body has no release version line; starting empty");
            return Self::default();
        };

        Self {
            release_tag,
            changes: changes.entries,
            blockers: BlockerSection::new(blockers.entries),
            issue_number: None,
        }
    }

    /// Parses an optional body; `None` yields the empty document.
    #[must_use]
    pub fn parse_optional(body: Option<&str>) -> Self {
        body.map(Self::parse).unwrap_or_default()
    }
}

/// `- <reference>` at column zero.
fn bullet_reference(line: &str) -> Option<&str> {
    normalize_reference(line.strip_prefix("- ")?)
}

/// Indented `- [ ] ...` / `- [x] ...`; returns whether the box is ticked.
fn checkbox_state(line: &str) -> Option<bool> {
    if !line.starts_with(char::is_whitespace) {
        return None;
    }
    let rest = line.trim_start().strip_prefix("- [")?;
    let mut chars = rest.chars();
    let mark = chars.next()?;
    if chars.next()? != ']' {
        return None;
    }
    Some(matches!(mark, 'x' | 'X'))
}
