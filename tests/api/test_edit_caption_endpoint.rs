// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1

//! Caption edit endpoint tests for POST /v1/caption

use axum::http::StatusCode;
use serde_json::json;
use storylens::session::CaptionSession;
use tower::ServiceExt;

use super::helpers::{json_request, multipart_upload_request, response_json, test_app, tiny_png_bytes};

/// Upload an image and return the fresh session id
async fn upload_session(app: &axum::Router) -> String {
    let response = app
        .clone()
        .oneshot(multipart_upload_request(
            &tiny_png_bytes(),
            Some("tiny.png"),
            None,
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    body["sessionId"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_edit_replaces_caption_text() {
    let (app, _state) = test_app();
    let id = upload_session(&app).await;

    let request = json_request(
        "POST",
        "/v1/caption",
        json!({ "sessionId": id, "caption": "a ginger cat enjoying the afternoon sun" }),
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["caption"], "a ginger cat enjoying the afternoon sun");
    assert_eq!(body["wordCount"], 7);
    assert_eq!(body["state"], "captionReady");
}

#[tokio::test]
async fn test_edit_to_empty_gives_zero_words() {
    let (app, _state) = test_app();
    let id = upload_session(&app).await;

    let request = json_request(
        "POST",
        "/v1/caption",
        json!({ "sessionId": id, "caption": "" }),
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["wordCount"], 0);
}

#[tokio::test]
async fn test_edit_unknown_session_is_404() {
    let (app, _state) = test_app();

    let request = json_request(
        "POST",
        "/v1/caption",
        json!({
            "sessionId": "00000000-0000-4000-8000-000000000000",
            "caption": "anything"
        }),
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = response_json(response).await;
    assert_eq!(body["error"], "not_found");
    assert!(body["requestId"].as_str().is_some());
}

#[tokio::test]
async fn test_edit_before_any_caption_is_409() {
    let (app, state) = test_app();
    let id = state.store.insert(CaptionSession::new()).await.unwrap();

    let request = json_request(
        "POST",
        "/v1/caption",
        json!({ "sessionId": id.to_string(), "caption": "too early" }),
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::CONFLICT);
    let body = response_json(response).await;
    assert_eq!(body["error"], "invalid_state");
}

#[tokio::test]
async fn test_edit_accepts_arbitrarily_long_text() {
    let (app, _state) = test_app();
    let id = upload_session(&app).await;

    // The story text carries no length bound; a rambling multi-page
    // edit is applied verbatim.
    let long_story = "once upon a time there was a cat ".repeat(1000);
    let request = json_request(
        "POST",
        "/v1/caption",
        json!({ "sessionId": id, "caption": long_story }),
    );
    let response = app.oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = response_json(response).await;
    assert_eq!(body["caption"].as_str().unwrap().len(), long_story.len());
    assert_eq!(body["wordCount"], 8000);
}

#[tokio::test]
async fn test_edit_malformed_body_is_rejected() {
    let (app, _state) = test_app();

    let request = json_request("POST", "/v1/caption", json!({ "caption": "no session" }));
    let response = app.oneshot(request).await.unwrap();

    // Serde rejects the body before the handler runs
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}
