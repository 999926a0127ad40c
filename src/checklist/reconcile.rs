//! Merges freshly observed references into a previous checklist.
//!
//! Ticked boxes are human progress and are carried forward for every
//! reference that is still part of the release. References that dropped out
//! of the observed sets are removed.

use std::collections::{HashMap, HashSet};

use super::{normalize_reference, BlockerSection, ChecklistDocument, ChecklistEntry};

/// What the current run observed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Observed {
    /// Target release tag; `None` keeps the previous document's tag.
    pub release_tag: Option<String>,
    /// Every pull request merged in the release range, not only new ones.
    pub changes: Vec<String>,
    /// Currently open blockers with the state reported by the tracker.
    pub blockers: Vec<ChecklistEntry>,
}

/// Produces the next checklist from `previous` and `observed`.
///
/// Entries that survive keep their relative order and checkbox state; new
/// change entries are appended open, new blockers are appended with the
/// state they were observed with.
#[must_use]
pub fn reconcile(previous: &ChecklistDocument, observed: &Observed) -> ChecklistDocument {
    let changes = merge_entries(
        &previous.changes,
        observed.changes.iter().map(|reference| ChecklistEntry::open(reference.as_str())),
    );
    let blockers = merge_entries(previous.blocker_entries(), observed.blockers.iter().cloned());

    let release_tag =
        observed.release_tag.clone().unwrap_or_else(|| previous.release_tag.clone());

    tracing::debug!(
        release_tag = %release_tag,
        changes = changes.len(),
        blockers = blockers.len(),
        "Reconciled checklist"
    );

    ChecklistDocument {
        release_tag,
        changes,
        blockers: BlockerSection::new(blockers),
        issue_number: previous.issue_number,
    }
}

fn merge_entries(
    previous: &[ChecklistEntry],
    observed: impl Iterator<Item = ChecklistEntry>,
) -> Vec<ChecklistEntry> {
    let mut incoming: Vec<ChecklistEntry> = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();
    for mut entry in observed {
        let Some(reference) = normalize_reference(&entry.reference) else {
            tracing::debug!(reference = %entry.reference, "Skipping reference that cannot be listed");
            continue;
        };
        entry.reference = reference.to_string();
        if seen.insert(entry.reference.clone()) {
            incoming.push(entry);
        }
    }

    let known: HashMap<&str, &ChecklistEntry> =
        previous.iter().map(|e| (e.reference.as_str(), e)).collect();

    let mut merged: Vec<ChecklistEntry> =
        previous.iter().filter(|e| seen.contains(&e.reference)).cloned().collect();
    merged.extend(incoming.into_iter().filter(|e| !known.contains_key(e.reference.as_str())));
    merged
}
