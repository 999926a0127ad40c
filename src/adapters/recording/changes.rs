//! Recording adapter for the `ChangeSource` port.

use serde::Serialize;

use super::record_interaction;
use crate::cassette::session::SharedRecorder;
use crate::ports::ChangeSource;

/// Records every merged-references query.
pub struct RecordingChangeSource {
    inner: Box<dyn ChangeSource>,
    recorder: SharedRecorder,
}

impl RecordingChangeSource {
    /// Wraps `inner`.
    pub fn new(inner: Box<dyn ChangeSource>, recorder: SharedRecorder) -> Self {
        Self { inner, recorder }
    }
}

#[derive(Serialize)]
struct RangeInput<'a> {
    from_tag: &'a str,
    to_tag: &'a str,
}

impl ChangeSource for RecordingChangeSource {
    fn list_merged_references(&self, from_tag: &str, to_tag: &str) -> Vec<String> {
        let references = self.inner.list_merged_references(from_tag, to_tag);
        let input = RangeInput { from_tag, to_tag };
        record_interaction(&self.recorder, "changes", "list_merged_references", &input, &references);
        references
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;
    use crate::cassette::format::Cassette;
    use crate::cassette::recorder::CassetteRecorder;

    struct Fixed;
    impl ChangeSource for Fixed {
        fn list_merged_references(&self, _from: &str, _to: &str) -> Vec<String> {
            vec!["https://github.com/acme/app/pull/1".into()]
        }
    }

    #[test]
    fn records_range_and_references() {
        let dir = std::env::temp_dir().join("deploy_checklist_rec_changes_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("changes.cassette.yaml");

        let recorder = Arc::new(Mutex::new(CassetteRecorder::new(&path, "changes")));
        {
            let source = RecordingChangeSource::new(Box::new(Fixed), Arc::clone(&recorder));
            assert_eq!(source.list_merged_references("1.0.0-0", "1.0.0-1").len(), 1);
        }
        Arc::try_unwrap(recorder).unwrap().into_inner().unwrap().finish().unwrap();

        let cassette = Cassette::load(&path).unwrap();
        let interaction = &cassette.interactions[0];
        assert_eq!(interaction.method, "list_merged_references");
        assert_eq!(interaction.input["from_tag"], "1.0.0-0");
        assert_eq!(interaction.output[0], "https://github.com/acme/app/pull/1");

        let _ = std::fs::remove_dir_all(&dir);
    }
}
