// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Caption edit response types

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::session::SessionState;

/// Response after a caption edit is applied
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditCaptionResponse {
    /// Session the edit applied to
    pub session_id: Uuid,
    /// Caption text now held by the session
    pub caption: String,
    /// Whitespace-delimited word count of the new text
    pub word_count: usize,
    /// Session state after the edit (any prior narration is invalidated)
    pub state: SessionState,
}
