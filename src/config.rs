//! Runtime configuration read from the environment.
//!
//! A `.env` file in the working directory is loaded first (via `dotenvy`),
//! so local runs can mirror the variables CI provides.

use std::path::PathBuf;

use crate::checklist::RenderOptions;

const DEFAULT_API_URL: &str = "https://api.github.com";
const DEFAULT_SERVER_URL: &str = "https://github.com";
const DEFAULT_CHECKLIST_LABEL: &str = "StagingDeployCash";
const DEFAULT_BLOCKER_LABEL: &str = "DeployBlockerCash";
pub(crate) const DEFAULT_REVIEWERS: &str = "Expensify/applauseleads";
const DEFAULT_ASSIGNEES: &str = "applausebot";
const DEFAULT_TITLE_PREFIX: &str = "Deploy Checklist:";

/// Configuration problems detected at startup.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("{0} is not set")]
    Missing(&'static str),

    /// A variable is set but unusable.
    #[error("{name} is invalid: {reason}")]
    Invalid {
        /// Variable name.
        name: &'static str,
        /// What is wrong with it.
        reason: String,
    },
}

/// `owner/name` of the repository the checklist lives in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Repository {
    /// Owning user or organization.
    pub owner: String,
    /// Repository name.
    pub name: String,
}

impl Repository {
    /// Parses `owner/name`.
    ///
    /// # Errors
    ///
    /// Returns an error unless the value is exactly two non-empty segments.
    pub fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().split_once('/') {
            Some((owner, name)) if !owner.is_empty() && !name.is_empty() && !name.contains('/') => {
                Ok(Self { owner: owner.to_string(), name: name.to_string() })
            }
            _ => Err(ConfigError::Invalid {
                name: "GITHUB_REPOSITORY",
                reason: format!("expected owner/repo, got {value:?}"),
            }),
        }
    }
}

/// Everything the CLI needs to know about its environment.
#[derive(Debug, Clone)]
pub struct Config {
    /// API token; only required for talking to the tracker.
    pub token: Option<String>,
    /// Repository holding the checklist issues.
    pub repository: Repository,
    /// REST API base URL.
    pub api_url: String,
    /// Web base URL, used for compare and pull request links.
    pub server_url: String,
    /// Label carried by every checklist issue.
    pub checklist_label: String,
    /// Label carried by deploy blocker issues.
    pub blocker_label: String,
    /// Team mentioned at the bottom of the checklist.
    pub reviewer_team: String,
    /// Logins assigned to new checklists.
    pub assignees: Vec<String>,
    /// Title prefix for new checklists; the date is appended.
    pub title_prefix: String,
    /// When set, every port interaction is recorded into this directory.
    pub record_dir: Option<PathBuf>,
}

impl Config {
    /// Loads `.env` (if present) and reads the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or malformed.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Ok(path) = dotenvy::dotenv() {
            tracing::debug!(path = %path.display(), "Loaded .env");
        }
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns an error if a required variable is missing or malformed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let or_default = |name: &str, default: &str| get(name).unwrap_or_else(|| default.to_string());

        let repository = get("GITHUB_REPOSITORY").ok_or(ConfigError::Missing("GITHUB_REPOSITORY"))?;

        Ok(Self {
            token: get("GITHUB_TOKEN").or_else(|| get("GH_TOKEN")),
            repository: Repository::parse(&repository)?,
            api_url: or_default("GITHUB_API_URL", DEFAULT_API_URL).trim_end_matches('/').to_string(),
            server_url: or_default("GITHUB_SERVER_URL", DEFAULT_SERVER_URL)
                .trim_end_matches('/')
                .to_string(),
            checklist_label: or_default("CHECKLIST_LABEL", DEFAULT_CHECKLIST_LABEL),
            blocker_label: or_default("BLOCKER_LABEL", DEFAULT_BLOCKER_LABEL),
            reviewer_team: or_default("CHECKLIST_REVIEWERS", DEFAULT_REVIEWERS),
            assignees: or_default("CHECKLIST_ASSIGNEES", DEFAULT_ASSIGNEES)
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect(),
            title_prefix: or_default("CHECKLIST_TITLE_PREFIX", DEFAULT_TITLE_PREFIX),
            record_dir: get("CHECKLIST_RECORD").map(PathBuf::from),
        })
    }

    /// The API token.
    ///
    /// # Errors
    ///
    /// Returns an error if neither `GITHUB_TOKEN` nor `GH_TOKEN` was set.
    pub fn require_token(&self) -> Result<&str, ConfigError> {
        self.token.as_deref().ok_or(ConfigError::Missing("GITHUB_TOKEN"))
    }

    /// Web URL of the repository.
    #[must_use]
    pub fn repository_url(&self) -> String {
        format!("{}/{}/{}", self.server_url, self.repository.owner, self.repository.name)
    }

    /// Link comparing what is on staging with what is in production.
    #[must_use]
    pub fn compare_url(&self) -> String {
        format!("{}/compare/production...staging", self.repository_url())
    }

    /// Render settings for checklist bodies.
    #[must_use]
    pub fn render_options(&self) -> RenderOptions {
        RenderOptions { compare_url: self.compare_url(), reviewer_team: self.reviewer_team.clone() }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn config_from(vars: &[(&str, &str)]) -> Result<Config, ConfigError> {
        let vars: HashMap<String, String> =
            vars.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        Config::from_lookup(|name| vars.get(name).cloned())
    }

    #[test]
    fn applies_defaults() {
        let config = config_from(&[("GITHUB_REPOSITORY", "acme/app")]).unwrap();
        assert_eq!(config.repository, Repository { owner: "acme".into(), name: "app".into() });
        assert_eq!(config.api_url, "https://api.github.com");
        assert_eq!(config.checklist_label, "StagingDeployCash");
        assert_eq!(config.blocker_label, "DeployBlockerCash");
        assert_eq!(config.assignees, vec!["applausebot".to_string()]);
        assert!(config.token.is_none());
        assert!(config.record_dir.is_none());
        assert_eq!(config.compare_url(), "https://github.com/acme/app/compare/production...staging");
    }

    #[test]
    fn reads_overrides() {
        let config = config_from(&[
            ("GITHUB_REPOSITORY", "acme/app"),
            ("GH_TOKEN", "secret"),
            ("GITHUB_SERVER_URL", "https://git.example.com/"),
            ("CHECKLIST_ASSIGNEES", "alice, bob,,"),
            ("CHECKLIST_REVIEWERS", "acme/qa"),
        ])
        .unwrap();
        assert_eq!(config.require_token().unwrap(), "secret");
        assert_eq!(config.assignees, vec!["alice".to_string(), "bob".to_string()]);
        assert_eq!(config.render_options().reviewer_team, "acme/qa");
        assert_eq!(config.repository_url(), "https://git.example.com/acme/app");
    }

    #[test]
    fn github_token_wins_over_gh_token() {
        let config = config_from(&[
            ("GITHUB_REPOSITORY", "acme/app"),
            ("GITHUB_TOKEN", "primary"),
            ("GH_TOKEN", "fallback"),
        ])
        .unwrap();
        assert_eq!(config.token.as_deref(), Some("primary"));
    }

    #[test]
    fn missing_repository_is_an_error() {
        let err = config_from(&[]).unwrap_err();
        assert!(err.to_string().contains("GITHUB_REPOSITORY"));
    }

    #[test]
    fn malformed_repository_is_an_error() {
        assert!(config_from(&[("GITHUB_REPOSITORY", "acme")]).is_err());
        assert!(config_from(&[("GITHUB_REPOSITORY", "acme/app/extra")]).is_err());
    }

    #[test]
    fn missing_token_is_reported_when_required() {
        let config = config_from(&[("GITHUB_REPOSITORY", "acme/app")]).unwrap();
        assert!(config.require_token().unwrap_err().to_string().contains("GITHUB_TOKEN"));
    }
}
