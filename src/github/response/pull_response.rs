use chrono::{DateTime, Utc};
use serde::Deserialize;

/// One entry of `GET /repos/{owner}/{repo}/pulls`.
#[derive(Debug, Deserialize)]
pub struct PullResponse {
    pub number: u64,
    pub title: String,
    pub state: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub merged_at: Option<DateTime<Utc>>,
    pub head: PullHead,
}

#[derive(Debug, Deserialize)]
pub struct PullHead {
    #[serde(rename = "ref")]
    pub branch: String,
    pub sha: String,
}
