// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! HTTP server assembly: shared state, router and lifecycle

use anyhow::Result;
use axum::extract::DefaultBodyLimit;
use axum::routing::{get, post};
use axum::Router;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use crate::api::edit_caption::edit_caption_handler;
use crate::api::handlers::{
    download_story_handler, health_handler, index_handler, session_info_handler,
};
use crate::api::narrate::narrate_handler;
use crate::api::upload_image::upload_image_handler;
use crate::config::Config;
use crate::session::SessionStore;
use crate::speech::SpeechSynthesizer;
use crate::vision::{FailingCaptioner, FixedCaptioner, ImageCaptioner};

/// How often the idle session sweep runs
const EVICTION_SWEEP_SECS: u64 = 60;

/// Shared state handed to every handler
#[derive(Clone)]
pub struct AppState {
    /// Caption model behind the captioner trait
    pub captioner: Arc<dyn ImageCaptioner>,
    /// TTS client for narration
    pub synthesizer: Arc<SpeechSynthesizer>,
    /// Active caption sessions
    pub store: Arc<SessionStore>,
    /// Process start, for uptime reporting
    pub started_at: Instant,
}

impl AppState {
    pub fn new(
        captioner: Arc<dyn ImageCaptioner>,
        synthesizer: Arc<SpeechSynthesizer>,
        store: Arc<SessionStore>,
    ) -> Self {
        Self {
            captioner,
            synthesizer,
            store,
            started_at: Instant::now(),
        }
    }

    /// State wired with a canned captioner and an unreachable TTS endpoint
    ///
    /// Used by tests that must run without model weights or network access.
    pub fn new_for_test() -> Self {
        let synthesizer = SpeechSynthesizer::new("http://127.0.0.1:9/translate_tts", "en")
            .expect("test synthesizer");
        Self::new(
            Arc::new(FixedCaptioner::new("a cat sitting on a chair")),
            Arc::new(synthesizer),
            Arc::new(SessionStore::default()),
        )
    }

    /// Like [`AppState::new_for_test`] but every caption attempt fails
    pub fn new_for_test_with_failing_captioner() -> Self {
        let mut state = Self::new_for_test();
        state.captioner = Arc::new(FailingCaptioner);
        state
    }
}

/// Build the application router
///
/// `max_upload_bytes` bounds the multipart upload body; everything else
/// uses axum's default limits.
pub fn build_router(state: AppState, max_upload_bytes: usize) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/health", get(health_handler))
        .route("/v1/upload", post(upload_image_handler))
        .route("/v1/caption", post(edit_caption_handler))
        .route("/v1/narrate", post(narrate_handler))
        .route("/v1/story/:id", get(download_story_handler))
        .route("/v1/session/:id", get(session_info_handler))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Run the HTTP server until a shutdown signal arrives
pub async fn serve(config: &Config, state: AppState) -> Result<()> {
    let evictor = spawn_eviction_task(state.store.clone());

    let app = build_router(state, config.max_upload_bytes);
    let addr: SocketAddr = config.listen_addr.parse()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;

    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    evictor.abort();
    Ok(())
}

/// Periodically sweep idle sessions out of the store
pub fn spawn_eviction_task(store: Arc<SessionStore>) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(Duration::from_secs(EVICTION_SWEEP_SECS));
        loop {
            interval.tick().await;
            let evicted = store.evict_idle().await;
            if evicted > 0 {
                debug!("Eviction sweep removed {} session(s)", evicted);
            }
        }
    })
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
    info!("Shutdown signal received, draining connections");
}
