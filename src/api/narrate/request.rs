// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Narration request types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to narrate a session's current caption
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NarrateRequest {
    /// Session whose caption should be spoken
    pub session_id: Uuid,
}
