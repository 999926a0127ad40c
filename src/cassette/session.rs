//! Recording session: one cassette per port in a single directory.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Utc;

use super::recorder::CassetteRecorder;

/// Shared recorder handle used by recording adapters.
pub type SharedRecorder = Arc<Mutex<CassetteRecorder>>;

/// Per-port recorders for one run.
pub struct RecordingSession {
    /// Recorder for the clock port.
    pub clock: SharedRecorder,
    /// Recorder for the issue tracker port.
    pub issues: SharedRecorder,
    /// Recorder for the change source port.
    pub changes: SharedRecorder,
    output_dir: PathBuf,
}

impl RecordingSession {
    /// Creates `<root>/<timestamp>/` and a recorder per port inside it.
    ///
    /// # Errors
    ///
    /// Returns an error if the directory already exists or cannot be created.
    pub fn new(root: &Path, release_tag: Option<&str>) -> Result<Self, String> {
        let timestamp = Utc::now().format("%Y-%m-%dT%H-%M-%S").to_string();
        let output_dir = root.join(&timestamp);

        if output_dir.exists() {
            return Err(format!("Cassette directory already exists: {}", output_dir.display()));
        }
        std::fs::create_dir_all(&output_dir)
            .map_err(|e| format!("Failed to create cassette directory: {e}"))?;

        let make_recorder = |port: &str| -> SharedRecorder {
            let path = output_dir.join(format!("{port}.cassette.yaml"));
            let mut recorder = CassetteRecorder::new(path, format!("{timestamp}-{port}"));
            if let Some(tag) = release_tag {
                recorder = recorder.with_release_tag(tag);
            }
            Arc::new(Mutex::new(recorder))
        };

        Ok(Self {
            clock: make_recorder("clock"),
            issues: make_recorder("issues"),
            changes: make_recorder("changes"),
            output_dir,
        })
    }

    /// Writes every cassette. Recording adapters must be dropped first.
    ///
    /// # Errors
    ///
    /// Returns an error if an adapter still holds a recorder or a write fails.
    pub fn finish(self) -> Result<PathBuf, String> {
        fn finish_one(recorder: SharedRecorder, port: &str) -> Result<(), String> {
            let recorder = Arc::try_unwrap(recorder)
                .map_err(|_| format!("Recording adapter for {port} still has references"))?
                .into_inner()
                .map_err(|e| format!("Recorder lock for {port} poisoned: {e}"))?;
            if recorder.is_empty() {
                tracing::debug!(port, "Writing empty cassette");
            } else {
                tracing::debug!(port, interactions = recorder.len(), "Writing cassette");
            }
            recorder.finish().map_err(|e| format!("Failed to write {port} cassette: {e}"))?;
            Ok(())
        }

        finish_one(self.clock, "clock")?;
        finish_one(self.issues, "issues")?;
        finish_one(self.changes, "changes")?;
        Ok(self.output_dir)
    }
}
