//! Service context bundling one trait object per port.

use std::path::Path;

use crate::adapters::live::{GitChangeSource, GitHubIssueTracker, SystemClock};
use crate::adapters::recording::{RecordingChangeSource, RecordingClock, RecordingIssueTracker};
use crate::adapters::replaying::{ReplayingChangeSource, ReplayingClock, ReplayingIssueTracker};
use crate::cassette::format::Cassette;
use crate::cassette::replayer::CassetteReplayer;
use crate::cassette::session::RecordingSession;
use crate::config::Config;
use crate::ports::{ChangeSource, Clock, IssueTracker};

/// Every external boundary the publish pipeline uses.
///
/// Constructors wire up live, recording or replaying adapters.
pub struct ServiceContext {
    /// Clock for dating new checklists.
    pub clock: Box<dyn Clock>,
    /// Tracker holding checklist and blocker issues.
    pub issues: Box<dyn IssueTracker>,
    /// Source of merged pull requests between tags.
    pub changes: Box<dyn ChangeSource>,
}

impl ServiceContext {
    /// Wires arbitrary port implementations together.
    #[must_use]
    pub fn new(
        clock: Box<dyn Clock>,
        issues: Box<dyn IssueTracker>,
        changes: Box<dyn ChangeSource>,
    ) -> Self {
        Self { clock, issues, changes }
    }

    /// Live adapters: system clock, GitHub, local git history.
    ///
    /// # Errors
    ///
    /// Returns an error if no API token is configured.
    pub fn live(config: &Config) -> Result<Self, String> {
        let token = config.require_token().map_err(|e| e.to_string())?;
        Ok(Self {
            clock: Box::new(SystemClock),
            issues: Box::new(GitHubIssueTracker::new(
                &config.api_url,
                &config.repository.owner,
                &config.repository.name,
                token,
            )),
            changes: Box::new(GitChangeSource::new(config.repository_url())),
        })
    }

    /// Live adapters whose calls are written into `session`.
    ///
    /// # Errors
    ///
    /// Returns an error if no API token is configured.
    pub fn recording(config: &Config, session: &RecordingSession) -> Result<Self, String> {
        let live = Self::live(config)?;
        Ok(Self {
            clock: Box::new(RecordingClock::new(live.clock, session.clock.clone())),
            issues: Box::new(RecordingIssueTracker::new(live.issues, session.issues.clone())),
            changes: Box::new(RecordingChangeSource::new(live.changes, session.changes.clone())),
        })
    }

    /// Replays every port from one cassette file.
    ///
    /// # Errors
    ///
    /// Returns an error if the cassette cannot be read or parsed.
    pub fn replaying(path: &Path) -> Result<Self, String> {
        let cassette = Cassette::load(path)?;
        Ok(Self::replaying_cassettes(&cassette, &cassette, &cassette))
    }

    /// Replays the per-port cassettes a recording session wrote to `dir`.
    ///
    /// # Errors
    ///
    /// Returns an error if any of the three cassettes cannot be read or parsed.
    pub fn replaying_dir(dir: &Path) -> Result<Self, String> {
        let load = |port: &str| Cassette::load(&dir.join(format!("{port}.cassette.yaml")));
        Ok(Self::replaying_cassettes(&load("clock")?, &load("issues")?, &load("changes")?))
    }

    fn replaying_cassettes(clock: &Cassette, issues: &Cassette, changes: &Cassette) -> Self {
        Self {
            clock: Box::new(ReplayingClock::new(CassetteReplayer::new(clock))),
            issues: Box::new(ReplayingIssueTracker::new(CassetteReplayer::new(issues))),
            changes: Box::new(ReplayingChangeSource::new(CassetteReplayer::new(changes))),
        }
    }
}
