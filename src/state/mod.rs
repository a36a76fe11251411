//! Durable per-repository state: one JSON file for the last announced
//! commit, one for the last processed pull request set. A missing file is
//! first-run, not an error. Writes go to a sibling temp file and are
//! renamed into place so a crash mid-write never leaves an unparseable
//! file behind a previously valid one.

use crate::{error::Error, snapshot::PrRecord};
use chrono::Utc;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitState {
    #[serde(default)]
    pub latest_commit: String,
    #[serde(default)]
    pub latest_fetch_timestamp: String,
}

impl CommitState {
    /// State for a freshly observed head, stamped with the current time.
    pub fn now(latest_commit: String) -> Self {
        CommitState {
            latest_commit,
            latest_fetch_timestamp: Utc::now().to_rfc3339(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrState {
    #[serde(rename = "PR", default)]
    pub prs: Vec<PrRecord>,
    #[serde(default)]
    pub latest_fetch_timestamp: String,
}

impl PrState {
    pub fn now(prs: Vec<PrRecord>) -> Self {
        PrState {
            prs,
            latest_fetch_timestamp: Utc::now().to_rfc3339(),
        }
    }
}

pub struct StateStore {
    commit_path: PathBuf,
    pr_path: PathBuf,
}

impl StateStore {
    pub fn new(dir: impl AsRef<Path>, owner: &str, branch: &str) -> Self {
        let dir = dir.as_ref();
        StateStore {
            commit_path: dir.join(format!("{}-{}-commit-state.json", owner, branch)),
            pr_path: dir.join(format!("{}-{}-pr-state.json", owner, branch)),
        }
    }

    pub async fn load_commit_state(&self) -> Result<CommitState, Error> {
        load(&self.commit_path).await
    }

    pub async fn save_commit_state(&self, state: &CommitState) -> Result<(), Error> {
        save(&self.commit_path, state).await
    }

    pub async fn load_pr_state(&self) -> Result<PrState, Error> {
        load(&self.pr_path).await
    }

    pub async fn save_pr_state(&self, state: &PrState) -> Result<(), Error> {
        save(&self.pr_path, state).await
    }
}

async fn load<T>(path: &Path) -> Result<T, Error>
where
    T: DeserializeOwned + Default,
{
    let text = match tokio::fs::read_to_string(path).await {
        Ok(text) => text,
        Err(cause) if cause.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
        Err(cause) => {
            return Err(Error::Io {
                path: path.display().to_string(),
                cause,
            })
        }
    };

    serde_json::from_str(&text).map_err(|cause| Error::Parse {
        what: path.display().to_string(),
        cause,
    })
}

async fn save<T>(path: &Path, state: &T) -> Result<(), Error>
where
    T: Serialize,
{
    let text = serde_json::to_string_pretty(state).map_err(|cause| Error::Parse {
        what: path.display().to_string(),
        cause,
    })?;

    let tmp = path.with_extension("json.tmp");
    let io_err = |cause| Error::Io {
        path: path.display().to_string(),
        cause,
    };

    tokio::fs::write(&tmp, text).await.map_err(io_err)?;
    tokio::fs::rename(&tmp, path).await.map_err(io_err)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::snapshot::{PrAction, PrStatus};
    use tempdir::TempDir;

    fn record(number: u64) -> PrRecord {
        PrRecord {
            number,
            title: format!("PR {}", number),
            action: PrAction::Opened,
            status: PrStatus::Open,
            branch: "main".to_owned(),
            commit_id: "abc123".to_owned(),
        }
    }

    #[tokio::test]
    async fn missing_files_load_as_empty_state() -> anyhow::Result<()> {
        let dir = TempDir::new("state")?;
        let store = StateStore::new(dir.path(), "octo", "main");

        assert_eq!(store.load_commit_state().await?, CommitState::default());
        assert_eq!(store.load_pr_state().await?, PrState::default());

        Ok(())
    }

    #[tokio::test]
    async fn commit_state_round_trips() -> anyhow::Result<()> {
        let dir = TempDir::new("state")?;
        let store = StateStore::new(dir.path(), "octo", "main");

        let state = CommitState::now("abc123".to_owned());
        store.save_commit_state(&state).await?;

        assert_eq!(store.load_commit_state().await?, state);

        Ok(())
    }

    #[tokio::test]
    async fn pr_state_round_trips() -> anyhow::Result<()> {
        let dir = TempDir::new("state")?;
        let store = StateStore::new(dir.path(), "octo", "main");

        let state = PrState::now(vec![record(5), record(7)]);
        store.save_pr_state(&state).await?;

        assert_eq!(store.load_pr_state().await?, state);

        Ok(())
    }

    #[tokio::test]
    async fn pr_state_file_uses_wire_field_names() -> anyhow::Result<()> {
        let dir = TempDir::new("state")?;
        let store = StateStore::new(dir.path(), "octo", "main");

        store.save_pr_state(&PrState::now(vec![record(5)])).await?;

        let path = dir.path().join("octo-main-pr-state.json");
        let value: serde_json::Value = serde_json::from_str(&std::fs::read_to_string(path)?)?;

        assert_eq!(value["PR"][0]["pr_number"], 5);
        assert_eq!(value["PR"][0]["pr_title"], "PR 5");
        assert_eq!(value["PR"][0]["pr_action"], "opened");
        assert_eq!(value["PR"][0]["pr_state"], "open");
        assert_eq!(value["PR"][0]["pr_branch"], "main");
        assert_eq!(value["PR"][0]["pr_commit_id"], "abc123");
        assert!(value["latest_fetch_timestamp"].is_string());

        Ok(())
    }

    #[tokio::test]
    async fn corrupt_state_file_is_a_parse_error() -> anyhow::Result<()> {
        let dir = TempDir::new("state")?;
        let store = StateStore::new(dir.path(), "octo", "main");

        std::fs::write(dir.path().join("octo-main-commit-state.json"), "not json")?;

        assert!(matches!(
            store.load_commit_state().await,
            Err(Error::Parse { .. })
        ));

        Ok(())
    }

    #[tokio::test]
    async fn save_replaces_rather_than_appends() -> anyhow::Result<()> {
        let dir = TempDir::new("state")?;
        let store = StateStore::new(dir.path(), "octo", "main");

        store
            .save_commit_state(&CommitState::now("abc123".to_owned()))
            .await?;
        store
            .save_commit_state(&CommitState::now("def456".to_owned()))
            .await?;

        assert_eq!(store.load_commit_state().await?.latest_commit, "def456");

        Ok(())
    }
}
