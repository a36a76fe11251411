use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::env;

pub const DEFAULT_CONFIG_FILE_NAME: &str = "config.json";

const TOKEN_ENV_VAR: &str = "GITHUB_PAT_TOKEN";
const DEFAULT_FREQUENCY_SECS: u64 = 60;
const DEFAULT_PR_FETCH_LIMIT: u32 = 3;
const DEFAULT_STATE_DIR: &str = ".";

/// Parameters for one (owner, repo, branch) polling scope. The token is
/// taken from the environment only and is never persisted or logged.
#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(rename = "OWNER", default)]
    pub owner: String,
    #[serde(rename = "REPO", default)]
    pub repo: String,
    #[serde(rename = "BRANCH", default)]
    pub branch: String,
    #[serde(rename = "EVENT_LISTENER_URL", default)]
    pub event_listener_url: String,
    #[serde(rename = "FREQUENCY", default = "Config::default_frequency")]
    pub frequency: u64,
    #[serde(rename = "PR_FETCH_LIMIT", default = "Config::default_pr_fetch_limit")]
    pub pr_fetch_limit: u32,
    #[serde(rename = "STATE_DIR", default = "Config::default_state_dir")]
    pub state_dir: String,
    #[serde(skip)]
    pub github_token: Option<String>,
}

impl Config {
    pub async fn load(path: &str) -> Result<Config> {
        let text = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("cannot read config file {}", path))?;

        let mut config = serde_json::from_str::<Config>(&text)
            .with_context(|| format!("cannot parse config file {}", path))?;

        config.github_token = env::var(TOKEN_ENV_VAR).ok().filter(|t| !t.is_empty());

        config.validate()?;

        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.owner.is_empty() {
            missing.push("OWNER");
        }
        if self.repo.is_empty() {
            missing.push("REPO");
        }
        if self.branch.is_empty() {
            missing.push("BRANCH");
        }
        if self.event_listener_url.is_empty() {
            missing.push("EVENT_LISTENER_URL");
        }
        if !missing.is_empty() {
            bail!("missing required configuration keys: {}", missing.join(", "));
        }

        if self.frequency == 0 {
            bail!("FREQUENCY must be greater than zero");
        }

        Ok(())
    }

    fn default_frequency() -> u64 {
        DEFAULT_FREQUENCY_SECS
    }

    fn default_pr_fetch_limit() -> u32 {
        DEFAULT_PR_FETCH_LIMIT
    }

    fn default_state_dir() -> String {
        DEFAULT_STATE_DIR.to_owned()
    }
}
