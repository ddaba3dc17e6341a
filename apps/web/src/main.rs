mod auth;
mod bindings;
mod cache;
mod clock;
mod config;
mod edit;
mod errors;
mod gateway;
mod layout;
mod models;
mod routes;
mod session;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cache::ResumeListCache;
use crate::clock::{Clock, SystemClock};
use crate::config::Config;
use crate::gateway::HttpBackend;
use crate::layout::default_page_config;
use crate::routes::build_router;
use crate::session::SessionStore;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!(
                "{}={}",
                env!("CARGO_PKG_NAME").replace('-', "_"),
                &config.rust_log
            ))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resumate web v{}", env!("CARGO_PKG_VERSION"));

    let backend = HttpBackend::new(&config.backend_api_url, config.backend_timeout)?;
    info!(
        "Backend gateway initialized ({}, timeout {:?})",
        config.backend_api_url, config.backend_timeout
    );

    let clock: Arc<dyn Clock> = Arc::new(SystemClock);
    let sessions = SessionStore::new(
        config.bullet_debounce,
        config.edit_session_ttl,
        Arc::clone(&clock),
    );
    let resume_cache = ResumeListCache::new(config.resume_cache_ttl, clock);

    let page_config = default_page_config();
    info!(
        "Export page: {}x{}pt, {}pt margins",
        page_config.width_pt, page_config.height_pt, page_config.margin_pt
    );

    spawn_draft_sweeper(sessions.clone(), config.bullet_debounce);

    let state = AppState {
        backend: Arc::new(backend),
        sessions,
        resume_cache,
        config: config.clone(),
        page_config,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the browser app's deployed origin is configurable

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Commits debounced bullet drafts of every session once their delay has passed, and
/// evicts sessions that have gone idle.
fn spawn_draft_sweeper(sessions: SessionStore, debounce: std::time::Duration) {
    let period = (debounce / 2).max(std::time::Duration::from_millis(25));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        loop {
            ticker.tick().await;
            sessions.flush_due().await;
            sessions.evict_idle().await;
        }
    });
}
