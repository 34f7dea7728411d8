use serde::{Deserialize, Serialize};

/// A single match as published by the feed.
///
/// `title` doubles as the identity key across polls; the feed offers no
/// other stable identifier.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Match {
    pub title: String,
    pub home_team: Team,
    pub away_team: Team,
    pub home_score: u32,
    pub away_score: u32,
    pub status: MatchStatus,
    /// Kick-off timestamp exactly as sent by the feed
    #[serde(default)]
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    pub name: String,
    /// Venue or region
    #[serde(default)]
    pub place: String,
    #[serde(default)]
    pub players: Vec<Player>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub username: String,
    #[serde(default)]
    pub kills: u32,
}

/// Match lifecycle as reported by the feed. Unknown labels are kept
/// verbatim in `Other` so new feed states never fail decoding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum MatchStatus {
    Scheduled,
    Ongoing,
    Finished,
    Other(String),
}

impl MatchStatus {
    pub fn label(&self) -> &str {
        match self {
            MatchStatus::Scheduled => "Scheduled",
            MatchStatus::Ongoing => "Ongoing",
            MatchStatus::Finished => "Finished",
            MatchStatus::Other(s) => s,
        }
    }
}

impl From<String> for MatchStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "Scheduled" => MatchStatus::Scheduled,
            "Ongoing" => MatchStatus::Ongoing,
            "Finished" => MatchStatus::Finished,
            _ => MatchStatus::Other(s),
        }
    }
}

impl From<MatchStatus> for String {
    fn from(status: MatchStatus) -> Self {
        match status {
            MatchStatus::Other(s) => s,
            known => known.label().to_string(),
        }
    }
}

/// Envelope of the feed response: `{ "data": { "matches": [...] } }`
#[derive(Debug, Deserialize)]
pub(crate) struct FeedEnvelope {
    pub data: FeedData,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FeedData {
    pub matches: Vec<Match>,
}
