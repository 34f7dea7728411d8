use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{
        sse::{Event, KeepAlive, Sse},
        Html, IntoResponse,
    },
    routing::{get, post},
    Json, Router,
};
use futures_util::stream::{self, Stream};
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tower_http::cors::CorsLayer;
use tracing::error;

use crate::render::RenderedView;
use crate::session::Action;
use crate::store::Filter;

#[derive(Clone)]
pub struct AppState {
    pub actions: mpsc::Sender<Action>,
    pub views: watch::Receiver<RenderedView>,
}

/// Build the Axum router for the dashboard.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/api/view", get(view_handler))
        .route("/api/stream", get(stream_handler))
        .route("/api/filter", post(filter_handler))
        .route("/api/matches/:title/toggle", post(toggle_handler))
        .layer(CorsLayer::permissive())
        .with_state(Arc::new(state))
}

async fn index_handler() -> impl IntoResponse {
    Html(DASHBOARD_HTML)
}

/// GET /api/view
async fn view_handler(State(state): State<Arc<AppState>>) -> Json<RenderedView> {
    Json(state.views.borrow().clone())
}

/// GET /api/stream: the current view, then every change, as SSE
async fn stream_handler(
    State(state): State<Arc<AppState>>,
) -> Sse<impl Stream<Item = Result<Event, axum::Error>>> {
    Sse::new(view_events(state.views.clone())).keep_alive(KeepAlive::default())
}

fn view_events(
    views: watch::Receiver<RenderedView>,
) -> impl Stream<Item = Result<Event, axum::Error>> {
    stream::unfold((views, true), |(mut views, first)| async move {
        if !first && views.changed().await.is_err() {
            return None;
        }
        let event = {
            let view = views.borrow_and_update();
            Event::default().event("view").json_data(&*view)
        };
        Some((event, (views, false)))
    })
}

#[derive(Debug, Deserialize)]
struct FilterRequest {
    filter: String,
}

/// POST /api/filter  {"filter": "all" | "live" | "finished"}
async fn filter_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<FilterRequest>,
) -> StatusCode {
    send_action(&state, Action::SetFilter(Filter::parse_lossy(&req.filter))).await
}

/// POST /api/matches/:title/toggle
async fn toggle_handler(
    State(state): State<Arc<AppState>>,
    Path(title): Path<String>,
) -> StatusCode {
    send_action(&state, Action::ToggleDetails(title)).await
}

async fn send_action(state: &AppState, action: Action) -> StatusCode {
    match state.actions.send(action).await {
        Ok(()) => StatusCode::ACCEPTED,
        Err(e) => {
            error!("Session is gone, dropping {:?}", e.0);
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}

/// Embedded single-file dashboard (HTML + CSS + JS)
const DASHBOARD_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<meta name="viewport" content="width=device-width, initial-scale=1.0">
<title>Match Tracker</title>
<style>
  :root {
    --bg: #0f1117;
    --card: #1a1d27;
    --border: #2a2d3a;
    --accent: #6c63ff;
    --green: #00c896;
    --red: #ff4f6a;
    --text: #e0e0e0;
    --muted: #8888aa;
  }
  * { box-sizing: border-box; margin: 0; padding: 0; }
  body { background: var(--bg); color: var(--text); font-family: 'Segoe UI', system-ui, sans-serif; }
  header { display: flex; align-items: center; gap: 1rem; padding: 1rem 2rem; border-bottom: 1px solid var(--border); }
  header h1 { font-size: 1.4rem; font-weight: 700; }
  main { padding: 1.5rem 2rem; display: grid; gap: 1rem; }
  .filters { display: flex; gap: .5rem; }
  .filters button, .toggle { background: none; border: 1px solid var(--border); color: var(--muted); padding: .35rem .9rem; border-radius: 6px; cursor: pointer; font-size: .85rem; }
  .filters button.active, .filters button:hover, .toggle:hover { border-color: var(--accent); color: var(--accent); }
  .banner { color: var(--red); }
  .match-list { list-style: none; display: grid; gap: .8rem; }
  .match-item { background: var(--card); border: 1px solid var(--border); border-radius: 10px; padding: 1rem 1.2rem; }
  .match-header { display: grid; grid-template-columns: 1fr auto 1fr; align-items: center; gap: 1rem; }
  .match-header strong:last-child { text-align: right; }
  .score { text-align: center; }
  .score .value { font-size: 1.6rem; font-weight: 700; font-variant-numeric: tabular-nums; }
  .score .status { color: var(--muted); font-size: .75rem; text-transform: uppercase; margin: .2rem 0 .5rem; }
  .match-details { margin-top: .9rem; padding-top: .8rem; border-top: 1px solid var(--border); list-style: none; font-size: .88rem; display: grid; gap: .3rem; }
  .match-details ul { list-style: none; padding-left: 1rem; color: var(--muted); }
  .empty { color: var(--muted); text-align: center; padding: 2rem; font-size: .9rem; }
</style>
</head>
<body>
<header>
  <h1 id="heading">Match Tracker</h1>
  <span style="margin-left:auto;color:var(--muted);font-size:.8rem;" id="last-updated"></span>
</header>
<main id="root"><p class="empty">Loading…</p></main>

<script>
const esc = s => String(s).replace(/[&<>"']/g, c => ({'&':'&amp;','<':'&lt;','>':'&gt;','"':'&quot;',"'":'&#39;'}[c]));

function post(url, body) {
  return fetch(url, {
    method: 'POST',
    headers: body ? { 'Content-Type': 'application/json' } : {},
    body: body ? JSON.stringify(body) : undefined,
  });
}

function setFilter(filter) { post('/api/filter', { filter }); }
function toggleDetails(key) { post('/api/matches/' + encodeURIComponent(key) + '/toggle'); }

function renderDetails(d) {
  const players = list => list.map(p => `<li>${esc(p)}</li>`).join('');
  return `<ul class="match-details">
    <li>Time: ${esc(d.time)}</li>
    <li>Home team venue: ${esc(d.home_place)}</li>
    <li>Away team venue: ${esc(d.away_place)}</li>
    <li>Home team players:</li><ul>${players(d.home_players)}</ul>
    <li>Away team players:</li><ul>${players(d.away_players)}</ul>
  </ul>`;
}

function renderRow(r) {
  return `<li class="match-item">
    <div class="match-header">
      <strong>${esc(r.away_team)}</strong>
      <div class="score">
        <div class="value">${r.home_score} : ${r.away_score}</div>
        <div class="status">${esc(r.status)}</div>
        <button class="toggle" data-key="${esc(r.key)}">${esc(r.toggle_label)}</button>
      </div>
      <strong>${esc(r.home_team)}</strong>
    </div>
    ${r.details ? renderDetails(r.details) : ''}
  </li>`;
}

function render(view) {
  const root = document.getElementById('root');
  document.getElementById('heading').textContent = view.heading;
  document.getElementById('last-updated').textContent = view.updated_at ? 'Updated ' + view.updated_at : '';

  if (view.loading) { root.innerHTML = '<p class="empty">Loading…</p>'; return; }
  if (view.error && !view.rows.length) { root.innerHTML = `<p class="banner">${esc(view.error)}</p>`; return; }

  const filters = view.filters.map(f =>
    `<button class="${f.active ? 'active' : ''}" data-filter="${f.filter}">${esc(f.label)}</button>`).join('');
  const banner = view.error ? `<p class="banner">${esc(view.error)}</p>` : '';
  const rows = view.rows.length
    ? `<ul class="match-list">${view.rows.map(renderRow).join('')}</ul>`
    : '<p class="empty">No matches</p>';
  root.innerHTML = `<div class="filters">${filters}</div>${banner}${rows}`;

  root.querySelectorAll('[data-filter]').forEach(b => b.onclick = () => setFilter(b.dataset.filter));
  root.querySelectorAll('[data-key]').forEach(b => b.onclick = () => toggleDetails(b.dataset.key));
}

const source = new EventSource('/api/stream');
source.addEventListener('view', e => render(JSON.parse(e.data)));
source.onerror = () => {
  document.getElementById('last-updated').textContent = 'Reconnecting…';
};
</script>
</body>
</html>"#;

#[cfg(test)]
mod tests {
    use super::*;
    use futures_util::StreamExt;

    fn test_state() -> (Arc<AppState>, mpsc::Receiver<Action>, watch::Sender<RenderedView>) {
        let (tx, rx) = mpsc::channel(8);
        let (view_tx, view_rx) = watch::channel(RenderedView::loading());
        let state = Arc::new(AppState {
            actions: tx,
            views: view_rx,
        });
        (state, rx, view_tx)
    }

    #[tokio::test]
    async fn test_filter_handler_dispatches() {
        let (state, mut rx, _views) = test_state();
        let req = FilterRequest { filter: "live".into() };
        assert_eq!(filter_handler(State(state), Json(req)).await, StatusCode::ACCEPTED);
        assert!(matches!(rx.recv().await, Some(Action::SetFilter(Filter::Live))));
    }

    #[tokio::test]
    async fn test_unknown_filter_falls_back_to_all() {
        let (state, mut rx, _views) = test_state();
        let req = FilterRequest { filter: "tomorrow".into() };
        filter_handler(State(state), Json(req)).await;
        assert!(matches!(rx.recv().await, Some(Action::SetFilter(Filter::All))));
    }

    #[tokio::test]
    async fn test_toggle_handler_dispatches_title() {
        let (state, mut rx, _views) = test_state();
        let status = toggle_handler(State(state), Path("Grand Final".to_string())).await;
        assert_eq!(status, StatusCode::ACCEPTED);
        match rx.recv().await {
            Some(Action::ToggleDetails(title)) => assert_eq!(title, "Grand Final"),
            other => panic!("unexpected action: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_actions_rejected_when_session_gone() {
        let (state, rx, _views) = test_state();
        drop(rx);
        let status = toggle_handler(State(state), Path("A".to_string())).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    }

    #[tokio::test]
    async fn test_view_handler_returns_current_view() {
        let (state, _rx, _views) = test_state();
        let Json(view) = view_handler(State(state)).await;
        assert!(view.loading);
    }

    #[tokio::test]
    async fn test_stream_sends_current_then_changes() {
        let (state, _rx, views) = test_state();
        let mut events = Box::pin(view_events(state.views.clone()));
        drop(state);

        assert!(matches!(events.next().await, Some(Ok(_))));

        views.send_modify(|v| v.loading = false);
        assert!(matches!(events.next().await, Some(Ok(_))));

        drop(views);
        assert!(events.next().await.is_none());
    }
}
