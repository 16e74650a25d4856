// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! End-to-end journey: upload an image, edit the caption, download the
//! story, narrate it, and watch the session advance through its states.

use axum::http::{header, StatusCode};
use serde_json::json;
use std::sync::Arc;
use storylens::api::AppState;
use storylens::speech::SpeechSynthesizer;
use tower::ServiceExt;

use super::helpers::{
    get_request, json_request, multipart_upload_request, response_bytes, response_json,
    test_app_with_state, tiny_png_bytes,
};

const FAKE_MP3: &[u8] = &[0xFF, 0xFB, 0x01, 0x02];

#[tokio::test]
async fn test_upload_edit_download_narrate_journey() {
    let mut server = mockito::Server::new_async().await;
    let tts_mock = server
        .mock("GET", "/translate_tts")
        .match_query(mockito::Matcher::UrlEncoded(
            "q".into(),
            "A quiet morning by the lake.".into(),
        ))
        .with_body(FAKE_MP3)
        .create_async()
        .await;

    let mut state = AppState::new_for_test();
    state.synthesizer = Arc::new(
        SpeechSynthesizer::new(&format!("{}/translate_tts", server.url()), "en").unwrap(),
    );
    let app = test_app_with_state(state);

    // Nothing going on yet
    let health = app.clone().oneshot(get_request("/health")).await.unwrap();
    assert_eq!(health.status(), StatusCode::OK);
    let health_body = response_json(health).await;
    assert_eq!(health_body["status"], "ok");
    assert_eq!(health_body["activeSessions"], 0);

    // 1. Upload
    let response = app
        .clone()
        .oneshot(multipart_upload_request(
            &tiny_png_bytes(),
            Some("morning.png"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let upload_body = response_json(response).await;
    let id = upload_body["sessionId"].as_str().unwrap().to_string();
    assert_eq!(upload_body["state"], "captionReady");
    assert_eq!(upload_body["caption"], "a cat sitting on a chair");
    assert_eq!(upload_body["wordCount"], 6);
    assert_eq!(upload_body["format"], "png");

    // 2. The session reflects the upload
    let info = app
        .clone()
        .oneshot(get_request(&format!("/v1/session/{}", id)))
        .await
        .unwrap();
    let info_body = response_json(info).await;
    assert_eq!(info_body["state"], "captionReady");
    assert_eq!(info_body["caption"], "a cat sitting on a chair");
    assert_eq!(info_body["image"]["format"], "png");

    // 3. Edit the caption into the user's own story
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/v1/caption",
            json!({ "sessionId": id, "caption": "A quiet morning by the lake." }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let edit_body = response_json(response).await;
    assert_eq!(edit_body["caption"], "A quiet morning by the lake.");
    assert_eq!(edit_body["wordCount"], 6);

    // 4. Download carries the edited text, not the generated one
    let response = app
        .clone()
        .oneshot(get_request(&format!("/v1/story/{}", id)))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response
            .headers()
            .get(header::CONTENT_DISPOSITION)
            .unwrap(),
        "attachment; filename=\"story.txt\""
    );
    assert_eq!(
        response_bytes(response).await,
        "A quiet morning by the lake.".as_bytes()
    );

    // 5. Narrate the story
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
    assert!(!response_bytes(response).await.is_empty());
    tts_mock.assert_async().await;

    // 6. The session ends up narrated, and health sees it
    let info = app
        .clone()
        .oneshot(get_request(&format!("/v1/session/{}", id)))
        .await
        .unwrap();
    let info_body = response_json(info).await;
    assert_eq!(info_body["state"], "audioReady");
    assert_eq!(info_body["wordCount"], 6);

    let health = app.clone().oneshot(get_request("/health")).await.unwrap();
    let health_body = response_json(health).await;
    assert_eq!(health_body["activeSessions"], 1);
}

#[tokio::test]
async fn test_new_upload_into_existing_session_resets_the_story() {
    let (app, state) = super::helpers::test_app();

    // First upload creates the session
    let response = app
        .clone()
        .oneshot(multipart_upload_request(
            &tiny_png_bytes(),
            Some("one.png"),
            None,
        ))
        .await
        .unwrap();
    let body = response_json(response).await;
    let id = body["sessionId"].as_str().unwrap().to_string();

    // Edit so the session carries user text
    let response = app
        .clone()
        .oneshot(json_request(
            "POST",
            "/v1/caption",
            json!({ "sessionId": id, "caption": "my words" }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    // Second upload into the same session replaces the story
    let response = app
        .clone()
        .oneshot(multipart_upload_request(
            &tiny_png_bytes(),
            Some("two.png"),
            Some(&id),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["sessionId"].as_str().unwrap(), id);
    assert_eq!(body["caption"], "a cat sitting on a chair");

    assert_eq!(state.store.len().await, 1);

    let response = app
        .oneshot(get_request(&format!("/v1/story/{}", id)))
        .await
        .unwrap();
    assert_eq!(
        response_bytes(response).await,
        "a cat sitting on a chair".as_bytes()
    );
}

#[tokio::test]
async fn test_index_page_serves_the_ui() {
    let (app, _state) = super::helpers::test_app();

    let response = app.oneshot(get_request("/")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let content_type = response
        .headers()
        .get(header::CONTENT_TYPE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(content_type.starts_with("text/html"));
    let body = String::from_utf8(response_bytes(response).await.to_vec()).unwrap();
    assert!(body.contains("AI Image Caption Generator"));
    assert!(body.contains("Upload an image"));
}
