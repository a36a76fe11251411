mod config;
mod detect;
mod error;
mod event;
mod github;
mod logger;
mod notify;
mod poller;
mod snapshot;
mod state;

use anyhow::{Context, Result};
use config::Config;
use github::client::GithubClient;
use notify::Dispatcher;
use poller::{Poller, SnapshotProvider};
use state::StateStore;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> Result<()> {
    logger::init()?;

    log::info!("Starting");
    let config = Config::load(config::DEFAULT_CONFIG_FILE_NAME)
        .await
        .context("Cannot load config file")?;

    let client =
        GithubClient::new(config.github_token.clone()).context("Cannot build the github client")?;

    // startup probe: an unreachable repository is fatal before the loop
    let initial = client
        .fetch_commit(&config.owner, &config.repo, &config.branch)
        .await
        .context("Cannot fetch the initial commit")?;
    log::info!(
        "initial commit at {}/{}@{}: {}",
        config.owner,
        config.repo,
        config.branch,
        initial.id
    );

    let store = StateStore::new(&config.state_dir, &config.owner, &config.branch);
    let dispatcher =
        Dispatcher::new(config.event_listener_url.as_str())
            .context("Cannot build the event dispatcher")?;

    let cancel = CancellationToken::new();
    spawn_signal_listener(cancel.clone());

    Poller::new(config, client, store, dispatcher).run(cancel).await;

    Ok(())
}

/// SIGINT and SIGTERM both request a clean shutdown of the poll loop.
fn spawn_signal_listener(cancel: CancellationToken) {
    tokio::spawn(async move {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(stream) => stream,
                Err(err) => {
                    log::error!("cannot install SIGTERM handler: {}", err);
                    return;
                }
            };

        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }

        cancel.cancel();
    });
}
