// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Narration endpoint tests for POST /v1/narrate
//!
//! The TTS endpoint is mocked, so these verify the wiring: request
//! construction, fresh synthesis per call, and failure mapping.

use axum::http::{header, StatusCode};
use axum::Router;
use serde_json::json;
use std::sync::Arc;
use storylens::api::AppState;
use storylens::speech::SpeechSynthesizer;
use tower::ServiceExt;

use super::helpers::{
    get_request, json_request, multipart_upload_request, response_bytes, response_json,
    test_app_with_state, tiny_png_bytes,
};

const FAKE_MP3: &[u8] = &[0xFF, 0xFB, 0x90, 0x00, 0xAB, 0xCD];

fn app_with_tts(endpoint: &str) -> (Router, AppState) {
    let mut state = AppState::new_for_test();
    state.synthesizer = Arc::new(SpeechSynthesizer::new(endpoint, "en").unwrap());
    (test_app_with_state(state.clone()), state)
}

async fn upload_session(app: &Router) -> String {
    let response = app
        .clone()
        .oneshot(multipart_upload_request(
            &tiny_png_bytes(),
            Some("tiny.png"),
            None,
        ))
        .await
        .unwrap();
    let body = response_json(response).await;
    body["sessionId"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_narrate_returns_mp3_and_marks_audio_ready() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/translate_tts")
        .match_query(mockito::Matcher::UrlEncoded(
            "q".into(),
            "a cat sitting on a chair".into(),
        ))
        .with_header("content-type", "audio/mpeg")
        .with_body(FAKE_MP3)
        .create_async()
        .await;

    let (app, _state) = app_with_tts(&format!("{}/translate_tts", server.url()));
    let id = upload_session(&app).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/v1/narrate",
            json!({ "sessionId": id }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "audio/mp3"
    );
    assert_eq!(response_bytes(response).await, FAKE_MP3);
    mock.assert_async().await;

    let info = app
        .oneshot(get_request(&format!("/v1/session/{}", id)))
        .await
        .unwrap();
    let info_body = response_json(info).await;
    assert_eq!(info_body["state"], "audioReady");
}

#[tokio::test]
async fn test_narrate_speaks_the_edited_text() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/translate_tts")
        .match_query(mockito::Matcher::UrlEncoded(
            "q".into(),
            "a brand new story".into(),
        ))
        .with_body(FAKE_MP3)
        .create_async()
        .await;

    let (app, _state) = app_with_tts(&format!("{}/translate_tts", server.url()));
    let id = upload_session(&app).await;

    let edit = json_request(
        "POST",
        "/v1/caption",
        json!({ "sessionId": id, "caption": "a brand new story" }),
    );
    assert_eq!(
        app.clone().oneshot(edit).await.unwrap().status(),
        StatusCode::OK
    );

    let response = app
        .oneshot(json_request(
            "POST",
            "/v1/narrate",
            json!({ "sessionId": id }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    mock.assert_async().await;
}

#[tokio::test]
async fn test_narrate_twice_synthesizes_twice() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/translate_tts")
        .match_query(mockito::Matcher::Any)
        .with_body(FAKE_MP3)
        .expect(2)
        .create_async()
        .await;

    let (app, _state) = app_with_tts(&format!("{}/translate_tts", server.url()));
    let id = upload_session(&app).await;

    for _ in 0..2 {
        let response = app
            .clone()
            .oneshot(json_request(
                "POST",
                "/v1/narrate",
                json!({ "sessionId": id }),
            ))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    // No cache: both narrations reached the endpoint
    mock.assert_async().await;
}

#[tokio::test]
async fn test_upstream_failure_maps_to_502() {
    let mut server = mockito::Server::new_async().await;
    server
        .mock("GET", "/translate_tts")
        .match_query(mockito::Matcher::Any)
        .with_status(503)
        .create_async()
        .await;

    let (app, _state) = app_with_tts(&format!("{}/translate_tts", server.url()));
    let id = upload_session(&app).await;

    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/v1/narrate",
            json!({ "sessionId": id }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let body = response_json(response).await;
    assert_eq!(body["error"], "synthesis_failed");

    // The session still offers its caption; only the narration failed
    let info = app
        .oneshot(get_request(&format!("/v1/session/{}", id)))
        .await
        .unwrap();
    let info_body = response_json(info).await;
    assert_eq!(info_body["state"], "captionReady");
}

#[tokio::test]
async fn test_narrate_unknown_session_is_404() {
    let (app, _state) = app_with_tts("http://127.0.0.1:9/translate_tts");

    let response = app
        .oneshot(json_request(
            "POST",
            "/v1/narrate",
            json!({ "sessionId": "00000000-0000-4000-8000-000000000000" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}
