//! The session owns every piece of mutable state and is its only writer.
//!
//! Poll results and user interactions arrive as [`Action`]s over an mpsc
//! channel; each one is applied in full before the next render is published
//! on a `watch` channel, so readers never see a half-applied match list.

use std::time::Duration;
use tokio::sync::{mpsc, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info};

use crate::animation::{Easing, ScoreAnimations};
use crate::feed::PollResult;
use crate::render::{render, RenderedView};
use crate::store::{visible, Filter, MatchStore, ViewState};

#[derive(Debug)]
pub enum Action {
    Poll(PollResult),
    SetFilter(Filter),
    ToggleDetails(String),
}

pub struct Session {
    store: MatchStore,
    view: ViewState,
    scores: ScoreAnimations,
    frame_interval: Duration,
}

impl Session {
    pub fn new(animation: Duration, easing: Easing, frame_interval: Duration) -> Self {
        Session {
            store: MatchStore::new(),
            view: ViewState::new(),
            scores: ScoreAnimations::new(animation, easing),
            frame_interval,
        }
    }

    pub fn dispatch(&mut self, action: Action, now: Instant) {
        match action {
            Action::Poll(result) => self.store.apply_result(result),
            Action::SetFilter(filter) => {
                debug!("Filter set to {:?}", filter);
                self.view.set_filter(filter);
            }
            Action::ToggleDetails(title) => self.view.toggle_details(&title),
        }
        let shown = visible(self.store.matches(), self.view.filter);
        self.scores.sync(&shown, now);
    }

    /// Advance score animations to `now`.
    pub fn advance(&mut self, now: Instant) -> bool {
        self.scores.tick(now)
    }

    pub fn render(&self) -> RenderedView {
        render(&self.store, &self.view, &self.scores)
    }

    pub fn is_animating(&self) -> bool {
        self.scores.is_animating()
    }

    /// Event loop: apply actions as they arrive and, only while some score
    /// is animating, advance frames on `frame_interval`. Ends when every
    /// action sender has been dropped.
    pub async fn run(mut self, mut actions: mpsc::Receiver<Action>, views: watch::Sender<RenderedView>) {
        publish(&views, self.render());

        let mut frames = tokio::time::interval(self.frame_interval);
        frames.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                action = actions.recv() => {
                    let Some(action) = action else { break };
                    self.dispatch(action, Instant::now());
                }
                _ = frames.tick(), if self.is_animating() => {
                    self.advance(Instant::now());
                }
            }
            publish(&views, self.render());
        }

        info!("Session closed");
    }
}

fn publish(views: &watch::Sender<RenderedView>, next: RenderedView) {
    views.send_if_modified(|current| {
        if *current == next {
            false
        } else {
            *current = next;
            true
        }
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::models::fixtures::game;
    use crate::feed::{FetchError, MatchStatus};

    const D: Duration = Duration::from_millis(500);

    fn session() -> Session {
        Session::new(D, Easing::EaseOutCubic, Duration::from_millis(50))
    }

    fn settle(s: &mut Session, now: Instant) -> Instant {
        let done = now + D;
        s.advance(done);
        done
    }

    #[test]
    fn test_empty_feed_renders_empty_list() {
        let mut s = session();
        s.dispatch(Action::Poll(Ok(vec![])), Instant::now());
        let v = s.render();
        assert!(v.rows.is_empty());
        assert!(v.error.is_none());
        assert!(!v.loading);
    }

    #[test]
    fn test_live_filter_scenario() {
        let now = Instant::now();
        let mut s = session();
        s.dispatch(Action::Poll(Ok(vec![game("A", MatchStatus::Ongoing, 1, 0)])), now);
        s.dispatch(Action::SetFilter(Filter::Live), now);
        assert_eq!(s.render().rows.len(), 1);
        assert_eq!(s.render().rows[0].key, "A");
        s.dispatch(Action::SetFilter(Filter::Finished), now);
        assert!(s.render().rows.is_empty());
    }

    #[test]
    fn test_transport_error_scenario() {
        let mut s = session();
        s.dispatch(
            Action::Poll(Err(FetchError::Transport("dns failure".into()))),
            Instant::now(),
        );
        let v = s.render();
        assert!(!v.loading);
        assert_eq!(v.error.as_deref(), Some("Error: failed to load match information"));
        assert!(v.rows.is_empty());
    }

    #[test]
    fn test_single_expansion_scenario() {
        let now = Instant::now();
        let mut s = session();
        s.dispatch(
            Action::Poll(Ok(vec![
                game("A", MatchStatus::Ongoing, 0, 0),
                game("B", MatchStatus::Ongoing, 0, 0),
            ])),
            now,
        );
        s.dispatch(Action::ToggleDetails("A".into()), now);
        s.dispatch(Action::ToggleDetails("A".into()), now);
        assert!(s.render().rows.iter().all(|r| r.details.is_none()));

        s.dispatch(Action::ToggleDetails("A".into()), now);
        s.dispatch(Action::ToggleDetails("B".into()), now);
        let rows = s.render().rows;
        assert!(rows[0].details.is_none());
        assert!(rows[1].details.is_some());
    }

    #[test]
    fn test_score_change_animates_to_new_value() {
        let t0 = Instant::now();
        let mut s = session();
        s.dispatch(Action::Poll(Ok(vec![game("A", MatchStatus::Ongoing, 1, 0)])), t0);
        let t1 = settle(&mut s, t0);
        assert_eq!(s.render().rows[0].home_score, 1);
        assert!(!s.is_animating());

        s.dispatch(Action::Poll(Ok(vec![game("A", MatchStatus::Ongoing, 3, 0)])), t1);
        assert_eq!(s.render().rows[0].home_score, 1);
        s.advance(t1 + D / 2);
        let mid = s.render().rows[0].home_score;
        assert!((1..=3).contains(&mid));
        s.advance(t1 + D);
        assert_eq!(s.render().rows[0].home_score, 3);
        assert!(!s.is_animating());
    }

    #[test]
    fn test_filtering_out_cancels_animation() {
        let now = Instant::now();
        let mut s = session();
        s.dispatch(Action::Poll(Ok(vec![game("A", MatchStatus::Ongoing, 5, 5)])), now);
        assert!(s.is_animating());
        s.dispatch(Action::SetFilter(Filter::Finished), now);
        assert!(!s.is_animating());
    }

    #[test]
    fn test_repeated_poll_is_idempotent() {
        let now = Instant::now();
        let mut s = session();
        let matches = vec![game("A", MatchStatus::Finished, 2, 1)];
        s.dispatch(Action::Poll(Ok(matches.clone())), now);
        let t = settle(&mut s, now);
        let once = s.render();
        s.dispatch(Action::Poll(Ok(matches)), t);
        let twice = s.render();
        assert_eq!(twice.rows, once.rows);
        assert_eq!(twice.error, once.error);
        assert!(!s.is_animating());
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_publishes_and_settles() {
        let (tx, rx) = mpsc::channel(16);
        let (view_tx, mut view_rx) = watch::channel(RenderedView::loading());
        let task = tokio::spawn(session().run(rx, view_tx));

        tx.send(Action::Poll(Ok(vec![game("A", MatchStatus::Ongoing, 4, 2)])))
            .await
            .unwrap();
        tokio::time::sleep(Duration::from_secs(1)).await;

        let view = view_rx.borrow_and_update().clone();
        assert!(!view.loading);
        assert_eq!(view.rows[0].home_score, 4);
        assert_eq!(view.rows[0].away_score, 2);

        drop(tx);
        task.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_is_quiet_without_changes() {
        let (tx, rx) = mpsc::channel(16);
        let (view_tx, mut view_rx) = watch::channel(RenderedView::loading());
        let task = tokio::spawn(session().run(rx, view_tx));

        let failed = || Action::Poll(Err(FetchError::Transport("timeout".into())));
        tx.send(failed()).await.unwrap();
        tokio::time::sleep(Duration::from_millis(100)).await;
        assert!(view_rx.borrow_and_update().error.is_some());

        tx.send(failed()).await.unwrap();
        tokio::time::sleep(Duration::from_secs(2)).await;
        assert!(!view_rx.has_changed().unwrap());

        drop(tx);
        task.await.unwrap();
    }
}
