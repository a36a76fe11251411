use crate::snapshot::{CommitSnapshot, PrAction, PrRecord, PrStatus};
use serde::Serialize;

const TRIGGER_PUSH: &str = "push";
const TRIGGER_PULL_REQUEST: &str = "Pull Request";

/// Outbound notification body. The pr_* fields and clone_url are only
/// present on the "Pull Request" variant; push events omit them entirely.
#[derive(Debug, Clone, Serialize)]
pub struct EventPayload {
    pub trigger_event: &'static str,
    pub r#ref: String,
    pub after: String,
    pub repo_url: String,
    pub user_email: String,
    pub commit_message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pr_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pr_action: Option<PrAction>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pr_number: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pr_state: Option<PrStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pr_branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub clone_url: Option<String>,
}

impl EventPayload {
    pub fn push(owner: &str, repo: &str, branch: &str, commit: &CommitSnapshot) -> Self {
        let commit_message = if commit.message.is_empty() {
            format!("Commit {} detected by pulltrigger", commit.id)
        } else {
            commit.message.to_owned()
        };

        EventPayload {
            trigger_event: TRIGGER_PUSH,
            r#ref: format!("refs/heads/{}", branch),
            after: commit.id.to_owned(),
            repo_url: repo_url(owner, repo),
            user_email: commit.author_email.to_owned(),
            commit_message,
            pr_title: None,
            pr_action: None,
            pr_number: None,
            pr_state: None,
            pr_branch: None,
            clone_url: None,
        }
    }

    pub fn pull_request(owner: &str, repo: &str, record: &PrRecord) -> Self {
        EventPayload {
            trigger_event: TRIGGER_PULL_REQUEST,
            r#ref: format!("refs/pull/{}/head", record.number),
            after: record.commit_id.to_owned(),
            repo_url: repo_url(owner, repo),
            // PR author emails are not part of the tracked record
            user_email: String::new(),
            commit_message: format!(
                "PR #{} {}: {}",
                record.number,
                record.action.as_str(),
                record.title
            ),
            pr_title: Some(record.title.to_owned()),
            pr_action: Some(record.action),
            pr_number: Some(record.number),
            pr_state: Some(record.status),
            pr_branch: Some(record.branch.to_owned()),
            clone_url: Some(format!("https://github.com/{}/{}.git", owner, repo)),
        }
    }
}

fn repo_url(owner: &str, repo: &str) -> String {
    format!("https://github.com/{}/{}", owner, repo)
}
