//! `deploy-checklist publish` command.

use crate::context::ServiceContext;
use crate::publish::{self, PublishOutcome, PublishRequest, PublishSettings};

/// Execute the `publish` command against `ctx`.
///
/// A dry run prints the create/update payload as JSON and writes nothing.
/// Otherwise the checklist URL is printed.
///
/// # Errors
///
/// Returns an error string if the runtime cannot start or publishing fails.
pub fn run(
    ctx: &ServiceContext,
    settings: &PublishSettings,
    request: &PublishRequest,
    dry_run: bool,
) -> Result<(), String> {
    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| format!("Failed to start async runtime: {e}"))?;

    let prepared = runtime
        .block_on(publish::prepare(ctx, settings, request))
        .map_err(|e| e.to_string())?;

    if dry_run {
        let json = serde_json::to_string_pretty(&prepared.payload)
            .map_err(|e| format!("Failed to serialize payload: {e}"))?;
        println!("{json}");
        return Ok(());
    }

    let outcome = runtime.block_on(publish::execute(ctx, &prepared)).map_err(|e| e.to_string())?;
    let verb = match &outcome {
        PublishOutcome::Created(_) => "Created",
        PublishOutcome::Updated(_) => "Updated",
        PublishOutcome::Unchanged(_) => "Unchanged",
    };
    eprintln!("{verb} checklist #{}", outcome.issue().number);
    println!("{}", outcome.issue().html_url);
    Ok(())
}
