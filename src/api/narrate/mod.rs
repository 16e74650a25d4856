// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Narration API endpoint module
//!
//! Provides POST /v1/narrate for synthesizing a session's caption as MP3.

pub mod handler;
pub mod request;
pub mod response;

pub use handler::narrate_handler;
pub use request::NarrateRequest;
pub use response::NarrateResponse;
