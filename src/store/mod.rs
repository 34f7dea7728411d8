//! Latest known match list plus loading/error status.
//!
//! The store is replaced wholesale on every successful poll; there is no
//! incremental merge. On a failed poll the previous list is kept and the
//! error is surfaced next to it, so a flaky feed degrades to stale data
//! rather than a blank page.

pub mod view;

pub use view::{visible, Filter, ViewState};

use chrono::{DateTime, Utc};
use std::collections::HashSet;
use tracing::{info, warn};

use crate::feed::{Match, PollResult};

#[derive(Debug, Clone, PartialEq)]
pub struct MatchStore {
    matches: Vec<Match>,
    error: Option<String>,
    loading: bool,
    last_updated: Option<DateTime<Utc>>,
    consecutive_failures: u32,
}

impl Default for MatchStore {
    fn default() -> Self {
        MatchStore {
            matches: Vec::new(),
            error: None,
            loading: true,
            last_updated: None,
            consecutive_failures: 0,
        }
    }
}

impl MatchStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn apply_result(&mut self, result: PollResult) {
        self.apply_result_at(result, Utc::now());
    }

    pub fn apply_result_at(&mut self, result: PollResult, now: DateTime<Utc>) {
        self.loading = false;
        match result {
            Ok(matches) => {
                warn_duplicate_titles(&matches);
                if matches.len() != self.matches.len() {
                    info!("Match list now has {} matches", matches.len());
                }
                if self.consecutive_failures > 0 {
                    info!(
                        "Feed recovered after {} failed polls",
                        self.consecutive_failures
                    );
                }
                self.matches = matches;
                self.error = None;
                self.last_updated = Some(now);
                self.consecutive_failures = 0;
            }
            Err(e) => {
                self.consecutive_failures += 1;
                self.error = Some(e.user_message().to_string());
            }
        }
    }

    pub fn matches(&self) -> &[Match] {
        &self.matches
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.last_updated
    }
}

// Titles are the only identity the feed gives us; two rows sharing one
// will share expansion and animation state.
fn warn_duplicate_titles(matches: &[Match]) {
    let mut seen = HashSet::new();
    for m in matches {
        if !seen.insert(m.title.as_str()) {
            warn!("Duplicate match title in feed: '{}'", m.title);
        }
    }
}
