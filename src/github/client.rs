use super::response::{BranchResponse, PullResponse};
use crate::{
    error::Error,
    poller::SnapshotProvider,
    snapshot::{CommitSnapshot, PrAction, PrRecord, PrStatus},
};
use reqwest::{
    header::{ACCEPT, USER_AGENT},
    Client, RequestBuilder, StatusCode,
};
use serde::de::DeserializeOwned;
use std::time::Duration;

const GITHUB_API_BASE: &str = "https://api.github.com";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// Read-only GitHub REST client. Without a token it still works at
/// GitHub's anonymous rate limit.
pub struct GithubClient {
    client: Client,
    base_url: String,
    token: Option<String>,
}

impl GithubClient {
    pub fn new(token: Option<String>) -> Result<Self, Error> {
        Self::with_base_url(GITHUB_API_BASE, token)
    }

    pub fn with_base_url(base_url: impl Into<String>, token: Option<String>) -> Result<Self, Error> {
        let client = Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|cause| Error::Transport {
                operation: "build github client",
                cause,
            })?;

        Ok(GithubClient {
            client,
            base_url: base_url.into(),
            token,
        })
    }

    fn get(&self, uri: String) -> RequestBuilder {
        let mut builder = self
            .client
            .get(uri)
            .header(ACCEPT, "application/vnd.github+json")
            .header("X-GitHub-Api-Version", "2022-11-28")
            .header(USER_AGENT, "pulltrigger");

        if let Some(token) = &self.token {
            builder = builder.bearer_auth(token);
        }

        builder
    }

    async fn fetch_json<T>(
        &self,
        uri: String,
        operation: &'static str,
        target: &str,
    ) -> Result<T, Error>
    where
        T: DeserializeOwned,
    {
        let response = self
            .get(uri)
            .send()
            .await
            .map_err(|cause| Error::Transport { operation, cause })?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(Error::NotFound {
                target: target.to_owned(),
            });
        }

        let response = response
            .error_for_status()
            .map_err(|cause| Error::Transport { operation, cause })?;

        let text = response
            .text()
            .await
            .map_err(|cause| Error::Transport { operation, cause })?;

        serde_json::from_str(&text).map_err(|cause| Error::Parse {
            what: target.to_owned(),
            cause,
        })
    }
}

impl SnapshotProvider for GithubClient {
    async fn fetch_commit(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> Result<CommitSnapshot, Error> {
        let uri = format!(
            "{}/repos/{}/{}/branches/{}",
            self.base_url, owner, repo, branch
        );
        let target = format!("branch {}/{}@{}", owner, repo, branch);

        let response: BranchResponse = self.fetch_json(uri, "fetch branch head", &target).await?;

        Ok(CommitSnapshot {
            id: response.commit.sha,
            message: response.commit.commit.message,
            author_email: response
                .commit
                .commit
                .author
                .map(|author| author.email)
                .unwrap_or_default(),
        })
    }

    async fn fetch_recent_prs(
        &self,
        owner: &str,
        repo: &str,
        limit: u32,
    ) -> Result<Vec<PrRecord>, Error> {
        let uri = format!(
            "{}/repos/{}/{}/pulls?state=all&sort=updated&direction=desc&per_page={}",
            self.base_url, owner, repo, limit
        );
        let target = format!("pull requests of {}/{}", owner, repo);

        let pulls: Vec<PullResponse> = self
            .fetch_json(uri, "fetch recent pull requests", &target)
            .await?;

        Ok(pulls.into_iter().map(PrRecord::from).collect())
    }
}

impl From<PullResponse> for PrRecord {
    fn from(pull: PullResponse) -> Self {
        // Creation and update timestamps coincide only while nothing has
        // happened since opening.
        let action = if pull.created_at == pull.updated_at {
            PrAction::Opened
        } else {
            PrAction::Updated
        };

        let status = if pull.merged_at.is_some() {
            PrStatus::Merged
        } else if pull.state == "closed" {
            PrStatus::Closed
        } else {
            PrStatus::Open
        };

        PrRecord {
            number: pull.number,
            title: pull.title,
            action,
            status,
            branch: pull.head.branch,
            commit_id: pull.head.sha,
        }
    }
}
