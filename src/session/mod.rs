// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Caption session tracking
//!
//! State machine per session plus a bounded in-memory store keyed by id.

pub mod state;
pub mod store;

pub use state::{CaptionSession, SessionError, SessionState};
pub use store::{SessionStore, StoreError, DEFAULT_IDLE_TIMEOUT_SECS, DEFAULT_MAX_SESSIONS};
