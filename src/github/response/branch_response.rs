use serde::Deserialize;

/// `GET /repos/{owner}/{repo}/branches/{branch}`, reduced to the fields
/// the poller reads.
#[derive(Debug, Deserialize)]
pub struct BranchResponse {
    pub commit: BranchCommit,
}

#[derive(Debug, Deserialize)]
pub struct BranchCommit {
    pub sha: String,
    pub commit: CommitDetail,
}

#[derive(Debug, Deserialize)]
pub struct CommitDetail {
    #[serde(default)]
    pub message: String,
    pub author: Option<CommitAuthor>,
}

#[derive(Debug, Deserialize)]
pub struct CommitAuthor {
    #[serde(default)]
    pub email: String,
}
