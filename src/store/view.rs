use serde::{Deserialize, Serialize};

use crate::feed::{Match, MatchStatus};

/// Which subset of matches the list shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Filter {
    #[default]
    All,
    Live,
    Finished,
}

impl Filter {
    pub const ALL: [Filter; 3] = [Filter::All, Filter::Live, Filter::Finished];

    /// Parse a filter name; anything unrecognised falls back to `All`.
    pub fn parse_lossy(s: &str) -> Filter {
        match s.trim().to_lowercase().as_str() {
            "live" => Filter::Live,
            "finished" => Filter::Finished,
            _ => Filter::All,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Filter::All => "All matches",
            Filter::Live => "Live",
            Filter::Finished => "Finished",
        }
    }

    pub fn admits(self, m: &Match) -> bool {
        match self {
            Filter::All => true,
            Filter::Live => m.status == MatchStatus::Ongoing,
            Filter::Finished => m.status == MatchStatus::Finished,
        }
    }
}

/// Visible subsequence of `matches` under `filter`, in input order.
pub fn visible(matches: &[Match], filter: Filter) -> Vec<&Match> {
    matches.iter().filter(|m| filter.admits(m)).collect()
}

/// User-driven UI state: the active filter and the single expanded row.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ViewState {
    pub filter: Filter,
    pub expanded: Option<String>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_filter(&mut self, filter: Filter) {
        self.filter = filter;
    }

    /// Collapse `title` if it is open, otherwise make it the only open row.
    pub fn toggle_details(&mut self, title: &str) {
        if self.expanded.as_deref() == Some(title) {
            self.expanded = None;
        } else {
            self.expanded = Some(title.to_string());
        }
    }

    pub fn is_expanded(&self, title: &str) -> bool {
        self.expanded.as_deref() == Some(title)
    }
}
