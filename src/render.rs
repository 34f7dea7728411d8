//! Pure mapping from session state to the structure the page displays.

use chrono::{DateTime, Local};
use serde::Serialize;

use crate::animation::{ScoreAnimations, Side};
use crate::feed::{Match, Team};
use crate::store::{visible, Filter, MatchStore, ViewState};

pub const HEADING: &str = "Match Tracker";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RenderedView {
    pub heading: String,
    pub loading: bool,
    pub error: Option<String>,
    pub filters: Vec<FilterButton>,
    pub rows: Vec<MatchRow>,
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterButton {
    pub filter: Filter,
    pub label: &'static str,
    pub active: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchRow {
    pub key: String,
    pub home_team: String,
    pub away_team: String,
    pub home_score: u32,
    pub away_score: u32,
    pub status: String,
    pub toggle_label: &'static str,
    pub details: Option<MatchDetails>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatchDetails {
    pub time: String,
    pub home_place: String,
    pub away_place: String,
    pub home_players: Vec<String>,
    pub away_players: Vec<String>,
}

impl RenderedView {
    /// What the page shows before the session has produced anything.
    pub fn loading() -> Self {
        let scores = ScoreAnimations::new(Default::default(), Default::default());
        render(&MatchStore::new(), &ViewState::new(), &scores)
    }
}

pub fn render(store: &MatchStore, view: &ViewState, scores: &ScoreAnimations) -> RenderedView {
    let filters = Filter::ALL
        .iter()
        .map(|&filter| FilterButton {
            filter,
            label: filter.label(),
            active: filter == view.filter,
        })
        .collect();

    let rows = visible(store.matches(), view.filter)
        .into_iter()
        .map(|m| render_row(m, view, scores))
        .collect();

    RenderedView {
        heading: HEADING.to_string(),
        loading: store.is_loading(),
        error: store.error().map(str::to_string),
        filters,
        rows,
        updated_at: store
            .last_updated()
            .map(|t| t.with_timezone(&Local).format("%H:%M:%S").to_string()),
    }
}

fn render_row(m: &Match, view: &ViewState, scores: &ScoreAnimations) -> MatchRow {
    let expanded = view.is_expanded(&m.title);
    MatchRow {
        key: m.title.clone(),
        home_team: m.home_team.name.clone(),
        away_team: m.away_team.name.clone(),
        home_score: scores.displayed(&m.title, Side::Home).unwrap_or(m.home_score),
        away_score: scores.displayed(&m.title, Side::Away).unwrap_or(m.away_score),
        status: m.status.label().to_string(),
        toggle_label: if expanded { "Hide details" } else { "Show details" },
        details: expanded.then(|| MatchDetails {
            time: format_time(&m.time),
            home_place: m.home_team.place.clone(),
            away_place: m.away_team.place.clone(),
            home_players: player_lines(&m.home_team),
            away_players: player_lines(&m.away_team),
        }),
    }
}

fn player_lines(team: &Team) -> Vec<String> {
    team.players
        .iter()
        .map(|p| format!("{} - Kills: {}", p.username, p.kills))
        .collect()
}

/// Local wall-clock rendering for RFC 3339 timestamps; anything else is
/// shown as received.
fn format_time(raw: &str) -> String {
    match DateTime::parse_from_rfc3339(raw) {
        Ok(t) => t.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string(),
        Err(_) => raw.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::animation::Easing;
    use crate::feed::models::fixtures::game;
    use crate::feed::{FetchError, MatchStatus};
    use std::time::Duration;
    use tokio::time::Instant;

    fn settled(store: &MatchStore, view: &ViewState) -> ScoreAnimations {
        let now = Instant::now();
        let mut anims = ScoreAnimations::new(Duration::ZERO, Easing::Linear);
        anims.sync(&visible(store.matches(), view.filter), now);
        anims.tick(now);
        anims
    }

    #[test]
    fn test_initial_view_is_loading() {
        let v = RenderedView::loading();
        assert!(v.loading);
        assert!(v.rows.is_empty());
        assert_eq!(v.heading, "Match Tracker");
        let labels: Vec<_> = v.filters.iter().map(|f| f.label).collect();
        assert_eq!(labels, vec!["All matches", "Live", "Finished"]);
        assert!(v.filters[0].active);
    }

    #[test]
    fn test_rows_follow_filter() {
        let mut store = MatchStore::new();
        store.apply_result(Ok(vec![
            game("a", MatchStatus::Ongoing, 1, 0),
            game("b", MatchStatus::Finished, 2, 2),
        ]));
        let mut view = ViewState::new();
        view.set_filter(Filter::Finished);
        let out = render(&store, &view, &settled(&store, &view));
        assert_eq!(out.rows.len(), 1);
        assert_eq!(out.rows[0].key, "b");
        assert_eq!(out.rows[0].home_score, 2);
        assert!(out.filters[2].active);
        assert!(!out.filters[0].active);
    }

    #[test]
    fn test_expanded_row_has_details() {
        let mut store = MatchStore::new();
        store.apply_result(Ok(vec![
            game("a", MatchStatus::Ongoing, 1, 0),
            game("b", MatchStatus::Ongoing, 0, 0),
        ]));
        let mut view = ViewState::new();
        view.toggle_details("b");
        let out = render(&store, &view, &settled(&store, &view));

        assert_eq!(out.rows[0].toggle_label, "Show details");
        assert!(out.rows[0].details.is_none());
        assert_eq!(out.rows[1].toggle_label, "Hide details");
        let details = out.rows[1].details.as_ref().unwrap();
        assert_eq!(details.home_place, "Home Arena");
        assert_eq!(details.home_players, vec!["home_one - Kills: 3", "home_two - Kills: 1"]);
        assert_eq!(details.away_players.len(), 2);
    }

    #[test]
    fn test_error_and_stale_rows_together() {
        let mut store = MatchStore::new();
        store.apply_result(Ok(vec![game("a", MatchStatus::Ongoing, 1, 0)]));
        store.apply_result(Err(FetchError::Malformed("eof".into())));
        let view = ViewState::new();
        let out = render(&store, &view, &settled(&store, &view));
        assert!(out.error.is_some());
        assert_eq!(out.rows.len(), 1);
        assert!(out.updated_at.is_some());
    }

    #[test]
    fn test_format_time_falls_back_to_raw() {
        assert_eq!(format_time("tomorrow"), "tomorrow");
        assert_eq!(format_time(""), "");
        assert_eq!(format_time("2024-05-01T18:00:00Z").len(), 19);
    }
}
