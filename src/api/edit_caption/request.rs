// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Caption edit request types and validation

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Request to replace a session's caption text
///
/// The text itself is unconstrained: any length, any characters. The
/// only bound on the request is the server's JSON body limit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditCaptionRequest {
    /// Session whose caption is being edited
    pub session_id: Uuid,

    /// Replacement text. Empty text is allowed; the story just becomes
    /// blank until the user types something.
    #[serde(default)]
    pub caption: String,
}
