//! Replaying adapter for the `ChangeSource` port.

use std::sync::Mutex;

use super::next_output;
use crate::cassette::replayer::CassetteReplayer;
use crate::ports::ChangeSource;

/// Returns recorded merged-reference lists.
pub struct ReplayingChangeSource {
    replayer: Mutex<CassetteReplayer>,
}

impl ReplayingChangeSource {
    /// Serves lists from `replayer`.
    #[must_use]
    pub fn new(replayer: CassetteReplayer) -> Self {
        Self { replayer: Mutex::new(replayer) }
    }
}

impl ChangeSource for ReplayingChangeSource {
    fn list_merged_references(&self, from_tag: &str, to_tag: &str) -> Vec<String> {
        let output = next_output(&self.replayer, "changes", "list_merged_references");
        serde_json::from_value(output).unwrap_or_else(|e| {
            tracing::warn!(from_tag, to_tag, error = %e, "Recorded change list is malformed");
            Vec::new()
        })
    }
}
