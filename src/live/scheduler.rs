use crate::live::client::FeedSource;
use crate::snapshot::{RefreshOutcome, SalesSnapshot, SnapshotLoader};
use log::info;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::{self, MissedTickBehavior};

/// Periodically reloads the whole sheet and publishes every replaced snapshot.
///
/// Subscribers hold a `watch::Receiver` and always observe a complete
/// snapshot; a failed fetch keeps the last good one published.
pub struct RefreshTask<S: FeedSource> {
    source: S,
    interval: Duration,
    loader: SnapshotLoader,
    publisher: watch::Sender<Arc<SalesSnapshot>>,
}

impl<S: FeedSource + 'static> RefreshTask<S> {
    pub fn new(source: S, interval: Duration) -> (Self, watch::Receiver<Arc<SalesSnapshot>>) {
        let loader = SnapshotLoader::new();
        let (publisher, receiver) = watch::channel(loader.current());

        (
            Self {
                source,
                interval,
                loader,
                publisher,
            },
            receiver,
        )
    }

    pub fn subscribe(&self) -> watch::Receiver<Arc<SalesSnapshot>> {
        self.publisher.subscribe()
    }

    pub async fn refresh_once(&mut self) -> RefreshOutcome {
        let loaded = self.source.fetch().await;
        let outcome = self.loader.apply(loaded);

        if let RefreshOutcome::Replaced { .. } = outcome {
            self.publisher.send_replace(self.loader.current());
        }

        outcome
    }

    /// Runs until the task is aborted. Refresh failures never end the loop.
    pub async fn run(mut self) {
        info!(
            "Refresh task started with interval {} ms",
            self.interval.as_millis()
        );
        let mut interval = time::interval(self.interval);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            interval.tick().await;
            self.refresh_once().await;
        }
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }
}
