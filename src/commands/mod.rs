//! Command dispatch and handlers.

pub mod publish;
pub mod render;

use crate::cassette::session::RecordingSession;
use crate::cli::Command;
use crate::checklist::RenderOptions;
use crate::config::{Config, DEFAULT_REVIEWERS};
use crate::context::ServiceContext;
use crate::publish::{PublishRequest, PublishSettings};

/// Dispatch a parsed command to its handler.
///
/// When `CHECKLIST_RECORD` names a directory, every port interaction of a
/// `publish` run is written to per-port cassettes under it.
///
/// # Errors
///
/// Returns an error string if configuration is invalid or the handler fails.
pub fn dispatch(command: &Command) -> Result<(), String> {
    match command {
        Command::Publish { tag, from_tag, dry_run } => {
            let config = Config::from_env().map_err(|e| e.to_string())?;
            let request = PublishRequest { release_tag: tag.clone(), from_tag: from_tag.clone() };
            dispatch_publish(&config, &request, *dry_run)
        }
        Command::Render { previous, tag, changes, blockers, compare_url, reviewers } => {
            let options = render_options(compare_url.as_deref(), reviewers.as_deref())?;
            render::run(&options, previous.as_deref(), tag.as_deref(), changes, blockers)
        }
    }
}

/// Render settings from flags, falling back to the repository configuration
/// only when no compare link was given.
fn render_options(
    compare_url: Option<&str>,
    reviewers: Option<&str>,
) -> Result<RenderOptions, String> {
    let mut options = match compare_url {
        Some(url) => RenderOptions {
            compare_url: url.to_string(),
            reviewer_team: DEFAULT_REVIEWERS.to_string(),
        },
        None => Config::from_env().map_err(|e| e.to_string())?.render_options(),
    };
    if let Some(team) = reviewers {
        options.reviewer_team = team.to_string();
    }
    Ok(options)
}

fn dispatch_publish(config: &Config, request: &PublishRequest, dry_run: bool) -> Result<(), String> {
    let settings = PublishSettings::from_config(config);

    let Some(root) = &config.record_dir else {
        let ctx = ServiceContext::live(config)?;
        return publish::run(&ctx, &settings, request, dry_run);
    };

    let session = RecordingSession::new(root, Some(&request.release_tag))?;
    let ctx = ServiceContext::recording(config, &session)?;
    let result = publish::run(&ctx, &settings, request, dry_run);

    // Adapters hold recorder handles until the context is gone.
    drop(ctx);
    finish_recording(session)?;

    result
}

/// Finish a recording session and print the output directory.
fn finish_recording(session: RecordingSession) -> Result<(), String> {
    let output_dir = session.finish()?;
    eprintln!("Recording saved to: {}", output_dir.display());
    Ok(())
}
