//! Replaying adapters: answer port calls from a cassette.

pub mod changes;
pub mod clock;
pub mod issues;

pub use changes::ReplayingChangeSource;
pub use clock::ReplayingClock;
pub use issues::ReplayingIssueTracker;

use std::sync::Mutex;

use serde::de::DeserializeOwned;

use crate::cassette::replayer::CassetteReplayer;
use crate::ports::TrackerError;

/// Takes the output of the next `port::method` interaction.
pub(crate) fn next_output(
    replayer: &Mutex<CassetteReplayer>,
    port: &str,
    method: &str,
) -> serde_json::Value {
    let mut replayer = replayer.lock().expect("replayer lock poisoned");
    replayer.next_interaction(port, method).output
}

/// Takes the output of the next `port::method` interaction recorded with `input`.
pub(crate) fn next_matching_output<I: serde::Serialize>(
    replayer: &Mutex<CassetteReplayer>,
    port: &str,
    method: &str,
    input: &I,
) -> serde_json::Value {
    let input = serde_json::to_value(input).unwrap_or(serde_json::Value::Null);
    let mut replayer = replayer.lock().expect("replayer lock poisoned");
    replayer.next_matching(port, method, &input).output
}

/// Decodes an `{"ok": ..}` / `{"err": ..}` output recorded by `record_result`.
pub(crate) fn replay_result<T: DeserializeOwned>(
    output: serde_json::Value,
    context: &str,
) -> Result<T, TrackerError> {
    if let Some(err) = output.get("err") {
        let message = err.as_str().unwrap_or("unknown error").to_string();
        return Err(TrackerError::Replay(message));
    }
    let value = output.get("ok").cloned().unwrap_or(output);
    serde_json::from_value(value)
        .map_err(|e| TrackerError::Replay(format!("{context}: failed to deserialize: {e}")))
}
