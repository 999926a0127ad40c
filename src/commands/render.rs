//! `deploy-checklist render` command.

use std::path::Path;

use crate::checklist::{reconcile, ChecklistDocument, ChecklistEntry, Observed, RenderOptions};

/// Execute the `render` command: reconcile the given references into the
/// previous body (if any) and print the result. Touches no network.
///
/// # Errors
///
/// Returns an error string if the previous body cannot be read.
pub fn run(
    options: &RenderOptions,
    previous: Option<&Path>,
    tag: Option<&str>,
    changes: &[String],
    blockers: &[String],
) -> Result<(), String> {
    let previous_body = previous
        .map(|path| {
            std::fs::read_to_string(path)
                .map_err(|e| format!("Failed to read {}: {e}", path.display()))
        })
        .transpose()?;

    let body = render_body(options, previous_body.as_deref(), tag, changes, blockers);
    print!("{body}");
    Ok(())
}

/// Reconciles `changes` and `blockers` into `previous` and renders the body.
#[must_use]
pub fn render_body(
    options: &RenderOptions,
    previous: Option<&str>,
    tag: Option<&str>,
    changes: &[String],
    blockers: &[String],
) -> String {
    let previous = ChecklistDocument::parse_optional(previous);
    let observed = Observed {
        release_tag: tag.map(String::from),
        changes: changes.to_vec(),
        blockers: blockers.iter().map(|b| ChecklistEntry::open(b.as_str())).collect(),
    };
    reconcile(&previous, &observed).render(options)
}
