//! The poll loop: on every tick, run the commit pipeline and the pull
//! request pipeline sequentially. Each pipeline is fetch -> detect ->
//! notify -> persist, and the persist only ever happens after the notify
//! has been attempted (commit state strictly requires notify success).
//! Errors are cycle-local: logged, and the loop proceeds to the next tick.

use crate::{
    config::Config,
    detect,
    error::Error,
    event::EventPayload,
    notify::Dispatcher,
    snapshot::{CommitSnapshot, PrRecord},
    state::{CommitState, PrState, StateStore},
};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

/// Boundary to the source-control API. The live implementation is
/// `github::client::GithubClient`; tests substitute canned snapshots.
pub trait SnapshotProvider {
    async fn fetch_commit(
        &self,
        owner: &str,
        repo: &str,
        branch: &str,
    ) -> Result<CommitSnapshot, Error>;

    async fn fetch_recent_prs(
        &self,
        owner: &str,
        repo: &str,
        limit: u32,
    ) -> Result<Vec<PrRecord>, Error>;
}

pub struct Poller<P> {
    config: Config,
    provider: P,
    store: StateStore,
    dispatcher: Dispatcher,
}

impl<P: SnapshotProvider> Poller<P> {
    pub fn new(config: Config, provider: P, store: StateStore, dispatcher: Dispatcher) -> Self {
        Poller {
            config,
            provider,
            store,
            dispatcher,
        }
    }

    /// Runs until `cancel` fires. An explicit initial pass establishes
    /// state before the first interval elapses; after that the loop wakes
    /// on every tick. Cycles never overlap: a tick that lands while a
    /// cycle is still running is absorbed by the interval.
    pub async fn run(&self, cancel: CancellationToken) {
        self.run_cycle().await;

        log::info!(
            "polling {}/{} at {} branch every {} seconds",
            self.config.owner,
            self.config.repo,
            self.config.branch,
            self.config.frequency
        );

        let mut interval = tokio::time::interval(Duration::from_secs(self.config.frequency));
        interval.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // the first tick of a fresh interval fires immediately; the
        // initial pass above already covered it
        interval.tick().await;

        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    log::info!("termination signal received, exiting");
                    return;
                }
                _ = interval.tick() => {
                    self.run_cycle().await;
                }
            }
        }
    }

    /// One full cycle. The two pipelines are independent: a failure in
    /// one is logged and does not touch the other.
    async fn run_cycle(&self) {
        if let Err(err) = self.commit_cycle().await {
            log::error!(
                "commit pipeline failed for {}/{}@{}: {}",
                self.config.owner,
                self.config.repo,
                self.config.branch,
                err
            );
        }

        if let Err(err) = self.pr_cycle().await {
            log::error!(
                "pull request pipeline failed for {}/{}: {}",
                self.config.owner,
                self.config.repo,
                err
            );
        }
    }

    async fn commit_cycle(&self) -> Result<(), Error> {
        let stored = self.store.load_commit_state().await?;
        let fresh = self
            .provider
            .fetch_commit(&self.config.owner, &self.config.repo, &self.config.branch)
            .await?;

        if !detect::commit_changed(&stored, &fresh.id) {
            return Ok(());
        }

        log::info!(
            "new commit detected: {} (was: {})",
            fresh.id,
            if stored.latest_commit.is_empty() {
                "<none>"
            } else {
                stored.latest_commit.as_str()
            }
        );

        let payload = EventPayload::push(
            &self.config.owner,
            &self.config.repo,
            &self.config.branch,
            &fresh,
        );

        // delivery failure leaves the stored commit untouched, so the
        // change is re-detected and re-sent next cycle
        self.dispatcher.send(&payload).await?;

        self.store
            .save_commit_state(&CommitState::now(fresh.id.clone()))
            .await?;

        log::info!("triggered push event and updated commit to {}", fresh.id);

        Ok(())
    }

    async fn pr_cycle(&self) -> Result<(), Error> {
        let stored = self.store.load_pr_state().await?;
        let fresh = self
            .provider
            .fetch_recent_prs(
                &self.config.owner,
                &self.config.repo,
                self.config.pr_fetch_limit,
            )
            .await?;

        let changes = detect::compare_prs(&stored.prs, &fresh);
        if changes.is_empty() {
            return Ok(());
        }

        for change in &changes {
            let payload = EventPayload::pull_request(&self.config.owner, &self.config.repo, change);

            match self.dispatcher.send(&payload).await {
                Ok(()) => log::info!(
                    "triggered pull request event for #{} ({})",
                    change.number,
                    change.action.as_str()
                ),
                // log-only: the full fresh snapshot is persisted below
                // either way, so a lost PR event is not re-sent
                Err(err) => log::error!(
                    "failed to deliver pull request event for #{}: {}",
                    change.number,
                    err
                ),
            }
        }

        self.store.save_pr_state(&PrState::now(fresh)).await?;

        Ok(())
    }
}
