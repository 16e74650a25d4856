// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
use anyhow::Result;
use clap::Parser;
use std::{env, sync::Arc, time::Duration};
use storylens::api::{serve, AppState};
use storylens::config::Config;
use storylens::session::SessionStore;
use storylens::speech::SpeechSynthesizer;
use storylens::vision::load_captioner;

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();

    // Initialize tracing subscriber for logging
    if env::var("RUST_LOG").is_err() {
        env::set_var("RUST_LOG", "info");
    }
    tracing_subscriber::fmt::init();

    let config = Config::parse();

    println!("🚀 Starting {}...", storylens::version::get_version_string());
    println!("📦 BUILD VERSION: {}", storylens::version::VERSION);
    println!();

    // The service cannot run without its caption model; bail out early
    // rather than serving requests that can only fail.
    let captioner = load_captioner(&config.caption_model_config()).await?;

    let synthesizer = Arc::new(SpeechSynthesizer::new(
        &config.tts_endpoint,
        &config.tts_lang,
    )?);

    let store = Arc::new(SessionStore::new(
        config.max_sessions,
        Duration::from_secs(config.session_idle_secs),
    ));

    let state = AppState::new(captioner, synthesizer, store);
    serve(&config, state).await
}
