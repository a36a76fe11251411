use serde::{Deserialize, Serialize};

/// One fresh read of a branch head.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSnapshot {
    pub id: String,
    pub message: String,
    pub author_email: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrAction {
    Opened,
    Updated,
    Closed,
}

impl PrAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            PrAction::Opened => "opened",
            PrAction::Updated => "updated",
            PrAction::Closed => "closed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PrStatus {
    Open,
    Closed,
    Merged,
}

/// A pull request as tracked across polls. `number` is the natural key;
/// the serde names match the on-disk PR state file format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrRecord {
    #[serde(rename = "pr_number")]
    pub number: u64,
    #[serde(rename = "pr_title")]
    pub title: String,
    #[serde(rename = "pr_action")]
    pub action: PrAction,
    #[serde(rename = "pr_state")]
    pub status: PrStatus,
    #[serde(rename = "pr_branch")]
    pub branch: String,
    #[serde(rename = "pr_commit_id")]
    pub commit_id: String,
}
