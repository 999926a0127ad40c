//! Recording adapters: delegate to an inner port and log every call.

pub mod changes;
pub mod clock;
pub mod issues;

pub use changes::RecordingChangeSource;
pub use clock::RecordingClock;
pub use issues::RecordingIssueTracker;

use serde::Serialize;

use crate::cassette::session::SharedRecorder;

/// Records a call whose return value is not a `Result`.
pub(crate) fn record_interaction<I, O>(
    recorder: &SharedRecorder,
    port: &str,
    method: &str,
    input: &I,
    output: &O,
) where
    I: Serialize,
    O: Serialize,
{
    let input = serde_json::to_value(input).unwrap_or(serde_json::Value::Null);
    let output = serde_json::to_value(output).unwrap_or(serde_json::Value::Null);
    recorder.lock().expect("recorder lock poisoned").record(port, method, input, output);
}

/// Records a fallible call as `{"ok": value}` or `{"err": message}`.
pub(crate) fn record_result<I, T, E>(
    recorder: &SharedRecorder,
    port: &str,
    method: &str,
    input: &I,
    result: &Result<T, E>,
) where
    I: Serialize,
    T: Serialize,
    E: std::fmt::Display,
{
    let output = match result {
        Ok(value) => serde_json::json!({ "ok": value }),
        Err(e) => serde_json::json!({ "err": e.to_string() }),
    };
    let input = serde_json::to_value(input).unwrap_or(serde_json::Value::Null);
    recorder.lock().expect("recorder lock poisoned").record(port, method, input, output);
}
