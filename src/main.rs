use anyhow::{Context, Result};
use clap::Parser;
use std::future::IntoFuture;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tracing::{error, info};

mod animation;
mod config;
mod dashboard;
mod feed;
mod render;
mod session;
mod store;

use config::Config;
use dashboard::AppState;
use feed::{start_poller, FeedClient, MatchFeed};
use render::RenderedView;
use session::{Action, Session};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialise tracing / logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = Config::parse();
    config.validate()?;

    let feed: Arc<dyn MatchFeed> =
        Arc::new(FeedClient::new(&config.feed_url, config.request_timeout())?);

    // Session owns all state; everyone else talks to it through `actions`.
    let (actions_tx, actions_rx) = mpsc::channel(1024);
    let (views_tx, views_rx) = watch::channel(RenderedView::loading());
    let session = Session::new(config.animation(), config.easing, config.frame_interval());
    let session_task = tokio::spawn(session.run(actions_rx, views_tx));

    let poll_tx = actions_tx.clone();
    let poller = start_poller(feed, config.poll_interval(), move |result| {
        if let Err(e) = poll_tx.try_send(Action::Poll(result)) {
            error!("Session queue full, poll result DROPPED: {}", e);
        }
    });

    let app = dashboard::router(AppState {
        actions: actions_tx,
        views: views_rx,
    });
    let addr: SocketAddr = config.dashboard_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind dashboard on {}", addr))?;
    info!("Dashboard listening on http://{}", addr);

    // Run dashboard server until Ctrl-C
    let served = tokio::select! {
        res = axum::serve(listener, app).into_future() => res.context("Dashboard server failed"),
        _ = shutdown_signal() => Ok(()),
    };

    poller.stop();
    session_task.abort();
    info!("Shut down");

    served
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown requested");
}
