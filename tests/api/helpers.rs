// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Shared helpers for driving the router in endpoint tests

use axum::body::Body;
use axum::http::{header, Request, Response};
use axum::Router;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use storylens::api::{build_router, AppState};

/// 1x1 red PNG image (base64)
pub const TINY_PNG_BASE64: &str = "iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mP8z8DwHwAFBQIAX8jx0gAAAABJRU5ErkJggg==";

/// 1x1 GIF image (base64), a format the service must reject
pub const TINY_GIF_BASE64: &str = "R0lGODlhAQABAIAAAP///wAAACH5BAEAAAAALAAAAAABAAEAAAICRAEAOw==";

const BOUNDARY: &str = "storylens-test-boundary";

const TEST_UPLOAD_LIMIT: usize = 25 * 1024 * 1024;

pub fn tiny_png_bytes() -> Vec<u8> {
    STANDARD.decode(TINY_PNG_BASE64).unwrap()
}

pub fn tiny_gif_bytes() -> Vec<u8> {
    STANDARD.decode(TINY_GIF_BASE64).unwrap()
}

/// Router plus the state behind it, so tests can inspect the store
pub fn test_app() -> (Router, AppState) {
    let state = AppState::new_for_test();
    let app = build_router(state.clone(), TEST_UPLOAD_LIMIT);
    (app, state)
}

/// Router over caller-assembled state (custom synthesizer, captioner...)
pub fn test_app_with_state(state: AppState) -> Router {
    build_router(state, TEST_UPLOAD_LIMIT)
}

/// Assemble a multipart POST /v1/upload request by hand
pub fn multipart_upload_request(
    image: &[u8],
    filename: Option<&str>,
    session_id: Option<&str>,
) -> Request<Body> {
    let mut body: Vec<u8> = Vec::new();

    body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
    match filename {
        Some(name) => body.extend_from_slice(
            format!(
                "Content-Disposition: form-data; name=\"image\"; filename=\"{}\"\r\n",
                name
            )
            .as_bytes(),
        ),
        None => {
            body.extend_from_slice(b"Content-Disposition: form-data; name=\"image\"\r\n");
        }
    }
    body.extend_from_slice(b"Content-Type: application/octet-stream\r\n\r\n");
    body.extend_from_slice(image);
    body.extend_from_slice(b"\r\n");

    if let Some(id) = session_id {
        body.extend_from_slice(format!("--{}\r\n", BOUNDARY).as_bytes());
        body.extend_from_slice(b"Content-Disposition: form-data; name=\"sessionId\"\r\n\r\n");
        body.extend_from_slice(id.as_bytes());
        body.extend_from_slice(b"\r\n");
    }

    body.extend_from_slice(format!("--{}--\r\n", BOUNDARY).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/v1/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", BOUNDARY),
        )
        .body(Body::from(body))
        .unwrap()
}

/// A JSON request with the given method, path and body
pub fn json_request(method: &str, uri: &str, body: serde_json::Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

/// A bare GET request
pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Drain a response body into raw bytes
pub async fn response_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), 16 * 1024 * 1024)
        .await
        .unwrap()
        .to_vec()
}

/// Drain a response body and parse it as JSON
pub async fn response_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response_bytes(response).await;
    serde_json::from_slice(&bytes).unwrap()
}
