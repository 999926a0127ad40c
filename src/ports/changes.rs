//! Change source port: which pull requests went into a release range.

/// Lists the changes merged between two release tags.
pub trait ChangeSource: Send + Sync {
    /// Returns the references (pull request URLs) merged after `from_tag`
    /// up to and including `to_tag`, oldest first.
    ///
    /// An unknown tag or any other failure yields an empty list; the
    /// checklist is still regenerated in that case.
    fn list_merged_references(&self, from_tag: &str, to_tag: &str) -> Vec<String>;
}
