//! GitHub REST adapter for the `IssueTracker` port.

use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;

use crate::ports::{
    Issue, IssueQuery, IssueRef, IssueState, IssueTracker, IssueUpdate, NewIssue, TrackerError,
    TrackerFuture,
};

const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("deploy-checklist/", env!("CARGO_PKG_VERSION"));
const PER_PAGE: u32 = 100;

/// Issue tracker backed by the GitHub Issues API of one repository.
#[derive(Debug, Clone)]
pub struct GitHubIssueTracker {
    client: Client,
    api_url: String,
    owner: String,
    repo: String,
    token: String,
}

impl GitHubIssueTracker {
    /// Creates a client for `owner/repo` at `api_url`.
    pub fn new(
        api_url: impl Into<String>,
        owner: impl Into<String>,
        repo: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            api_url: api_url.into(),
            owner: owner.into(),
            repo: repo.into(),
            token: token.into(),
        }
    }

    fn repo_url(&self, path: &str) -> String {
        format!("{}/repos/{}/{}/{path}", self.api_url, self.owner, self.repo)
    }

    fn request(&self, method: Method, url: &str) -> RequestBuilder {
        self.client
            .request(method, url)
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
            .header("User-Agent", USER_AGENT)
            .header("X-GitHub-Api-Version", API_VERSION)
    }

    async fn error_from(response: Response) -> TrackerError {
        let status = response.status().as_u16();
        match status {
            401 => TrackerError::Unauthorized,
            403 | 429
                if response
                    .headers()
                    .get("x-ratelimit-remaining")
                    .and_then(|v| v.to_str().ok())
                    .is_some_and(|v| v == "0") =>
            {
                TrackerError::RateLimited
            }
            _ => {
                let message = response
                    .json::<ErrorBody>()
                    .await
                    .map(|e| e.message)
                    .unwrap_or_else(|_| format!("HTTP {status}"));
                TrackerError::Api { status, message }
            }
        }
    }

    async fn send_for_issue(&self, builder: RequestBuilder) -> Result<IssueRef, TrackerError> {
        let response = builder.send().await?;
        if !response.status().is_success() {
            return Err(Self::error_from(response).await);
        }
        let issue: WireIssue = response.json().await?;
        Ok(IssueRef { number: issue.number, html_url: issue.html_url })
    }
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

#[derive(Deserialize)]
struct WireLabel {
    name: String,
}

#[derive(Deserialize)]
struct WireIssue {
    number: u64,
    #[serde(default)]
    title: String,
    body: Option<String>,
    state: IssueState,
    html_url: String,
    #[serde(default)]
    labels: Vec<WireLabel>,
}

impl From<WireIssue> for Issue {
    fn from(wire: WireIssue) -> Self {
        Self {
            number: wire.number,
            title: wire.title,
            body: wire.body.unwrap_or_default(),
            state: wire.state,
            html_url: wire.html_url,
            labels: wire.labels.into_iter().map(|l| l.name).collect(),
        }
    }
}

impl IssueTracker for GitHubIssueTracker {
    fn list_issues<'a>(&'a self, query: &'a IssueQuery) -> TrackerFuture<'a, Vec<Issue>> {
        Box::pin(async move {
            let url = self.repo_url("issues");
            let per_page = PER_PAGE.to_string();
            let response = self
                .request(Method::GET, &url)
                .query(&[
                    ("labels", query.label.as_str()),
                    ("state", query.state.as_str()),
                    ("sort", "created"),
                    ("direction", "desc"),
                    ("per_page", per_page.as_str()),
                ])
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(Self::error_from(response).await);
            }

            let issues: Vec<WireIssue> = response.json().await?;
            tracing::debug!(label = %query.label, count = issues.len(), "Listed issues");
            Ok(issues.into_iter().map(Issue::from).collect())
        })
    }

    fn create_issue<'a>(&'a self, issue: &'a NewIssue) -> TrackerFuture<'a, IssueRef> {
        Box::pin(async move {
            let url = self.repo_url("issues");
            self.send_for_issue(self.request(Method::POST, &url).json(issue)).await
        })
    }

    fn update_issue<'a>(&'a self, update: &'a IssueUpdate) -> TrackerFuture<'a, IssueRef> {
        Box::pin(async move {
            let url = self.repo_url(&format!("issues/{}", update.number));
            let body = serde_json::json!({ "body": update.body });
            self.send_for_issue(self.request(Method::PATCH, &url).json(&body)).await
        })
    }
}
