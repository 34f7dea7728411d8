pub mod client;
pub mod models;
pub mod provider;

pub use client::{FeedClient, FetchError};
pub use models::{Match, MatchStatus, Team};
pub use provider::MatchFeed;

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::task::{JoinHandle, JoinSet};
use tracing::{debug, error, info, warn};

/// Outcome of one poll attempt, consumed immediately by the match store.
pub type PollResult = Result<Vec<Match>, FetchError>;

type Callback = Box<dyn FnMut(PollResult) + Send>;

/// Running poll schedule. Stopping (or dropping) it guarantees that the
/// callback is never invoked again, even by fetches still in flight.
pub struct PollHandle {
    slot: Arc<Mutex<Option<Callback>>>,
    ticker: JoinHandle<()>,
}

impl PollHandle {
    /// Stop polling. Once this returns no further results are delivered.
    pub fn stop(mut self) {
        self.shutdown();
    }

    fn shutdown(&mut self) {
        let stopped = self
            .slot
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .is_some();
        self.ticker.abort();
        if stopped {
            info!("Match poller stopped");
        }
    }
}

impl Drop for PollHandle {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Spawns the poll schedule: one fetch right away, then one every `interval`.
///
/// Fetches may overlap when the feed is slower than the interval. Each runs
/// in its own task and results are delivered in completion order, so the
/// most recently resolved response is the one that ends up applied.
/// Failures are delivered like any other result and never end the schedule.
pub fn start_poller<F>(feed: Arc<dyn MatchFeed>, interval: Duration, on_result: F) -> PollHandle
where
    F: FnMut(PollResult) + Send + 'static,
{
    let slot: Arc<Mutex<Option<Callback>>> = Arc::new(Mutex::new(Some(Box::new(on_result))));
    let ticker_slot = Arc::clone(&slot);

    let ticker = tokio::spawn(async move {
        info!(
            "Match poller started (feed={}, interval={:?})",
            feed.name(),
            interval
        );

        let mut inflight = JoinSet::new();
        let mut ticks = tokio::time::interval(interval);
        ticks.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);
        let mut seq: u64 = 0;

        loop {
            tokio::select! {
                _ = ticks.tick() => {
                    seq += 1;
                    let dispatched = seq;
                    let feed = Arc::clone(&feed);
                    let slot = Arc::clone(&ticker_slot);
                    inflight.spawn(async move {
                        let result = feed.fetch_matches().await;
                        match &result {
                            Ok(matches) => debug!("Poll #{} returned {} matches", dispatched, matches.len()),
                            Err(e) => warn!("Poll #{} failed: {}", dispatched, e),
                        }
                        deliver(&slot, result);
                    });
                }
                Some(joined) = inflight.join_next() => {
                    if let Err(e) = joined {
                        if e.is_panic() {
                            error!("Fetch task panicked: {}", e);
                        }
                    }
                }
            }
        }
    });

    PollHandle { slot, ticker }
}

fn deliver(slot: &Mutex<Option<Callback>>, result: PollResult) {
    let mut guard = slot.lock().unwrap_or_else(PoisonError::into_inner);
    match guard.as_mut() {
        Some(on_result) => on_result(result),
        None => debug!("Poller stopped, discarding late result"),
    }
}
