use async_trait::async_trait;

use super::client::FetchError;
use super::models::Match;

/// Trait that every match feed source must implement.
#[async_trait]
pub trait MatchFeed: Send + Sync {
    /// Fetch the full current list of matches.
    async fn fetch_matches(&self) -> Result<Vec<Match>, FetchError>;

    /// Human-readable name for logging.
    fn name(&self) -> &str;
}
