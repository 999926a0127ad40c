//! Change source backed by the local git history.

use std::collections::BTreeSet;
use std::process::Command;
use std::sync::LazyLock;

use regex::Regex;

use crate::ports::ChangeSource;

static MERGE_COMMIT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"Merge pull request #(\d+) from (\S+)").expect("merge commit pattern is valid")
});

/// Branches created to cherry-pick onto staging; their merges are not new work.
const CHERRY_PICK_SUFFIX: &str = "-cherry-pick-staging";

/// Reads merge commits with `git log` and turns them into pull request URLs.
pub struct GitChangeSource {
    repository_url: String,
}

impl GitChangeSource {
    /// `repository_url` is the web URL pull request numbers are appended to.
    #[must_use]
    pub fn new(repository_url: impl Into<String>) -> Self {
        Self { repository_url: repository_url.into() }
    }

    fn pull_request_url(&self, number: u64) -> String {
        format!("{}/pull/{number}", self.repository_url)
    }

    fn git_log(from_tag: &str, to_tag: &str) -> Result<String, String> {
        let range = format!("{from_tag}...{to_tag}");
        let output = Command::new("git")
            .args(["log", "--format=%B", &range])
            .output()
            .map_err(|e| format!("failed to run git: {e}"))?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!("git log {range} failed: {}", stderr.trim()));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl ChangeSource for GitChangeSource {
    fn list_merged_references(&self, from_tag: &str, to_tag: &str) -> Vec<String> {
        let log = match Self::git_log(from_tag, to_tag) {
            Ok(log) => log,
            Err(e) => {
                tracing::warn!(from_tag, to_tag, error = %e, "Could not list merged pull requests");
                return Vec::new();
            }
        };
        let numbers = merged_pull_numbers(&log);
        tracing::info!(from_tag, to_tag, count = numbers.len(), "Found merged pull requests");
        numbers.into_iter().map(|n| self.pull_request_url(n)).collect()
    }
}

/// Pull request numbers from merge commit messages, ascending and deduplicated.
#[must_use]
pub fn merged_pull_numbers(log: &str) -> Vec<u64> {
    MERGE_COMMIT
        .captures_iter(log)
        .filter(|caps| !caps[2].ends_with(CHERRY_PICK_SUFFIX))
        .filter_map(|caps| caps[1].parse::<u64>().ok())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
