// Copyright (c) 2025 Fabstir
// SPDX-License-Identifier: BUSL-1.1
//! Per-session caption workflow state machine
//!
//! A session walks Idle -> ImageDisplayed -> CaptionReady -> AudioReady.
//! Uploading a new image restarts the walk from ImageDisplayed, and
//! editing the caption drops AudioReady back to CaptionReady so stale
//! narration can never be replayed against newer text.

use crate::vision::ImageInfo;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use thiserror::Error;
use uuid::Uuid;

/// Workflow stage of a caption session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SessionState {
    /// No image uploaded yet
    Idle,
    /// Image accepted, caption not generated yet
    ImageDisplayed,
    /// Caption available for editing, download and narration
    CaptionReady,
    /// Narration has been produced for the current caption text
    AudioReady,
}

impl SessionState {
    /// Whether a caption exists in this state
    pub fn has_caption(&self) -> bool {
        matches!(self, SessionState::CaptionReady | SessionState::AudioReady)
    }
}

/// Errors from operations attempted in the wrong state
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SessionError {
    #[error("Cannot {action} in state {from:?}")]
    InvalidTransition {
        from: SessionState,
        action: &'static str,
    },
}

/// One user's caption workflow
///
/// Fields are private so every mutation goes through a guarded method.
#[derive(Debug)]
pub struct CaptionSession {
    id: Uuid,
    state: SessionState,
    caption: Option<String>,
    image_info: Option<ImageInfo>,
    created_at: Instant,
    updated_at: Instant,
}

impl CaptionSession {
    /// Create a fresh idle session
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            id: Uuid::new_v4(),
            state: SessionState::Idle,
            caption: None,
            image_info: None,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn caption(&self) -> Option<&str> {
        self.caption.as_deref()
    }

    pub fn image_info(&self) -> Option<&ImageInfo> {
        self.image_info.as_ref()
    }

    /// Whitespace-delimited word count of the current caption
    pub fn word_count(&self) -> usize {
        self.caption
            .as_deref()
            .map(|c| c.split_whitespace().count())
            .unwrap_or(0)
    }

    /// How long since the session was last touched
    pub fn idle_for(&self) -> std::time::Duration {
        self.updated_at.elapsed()
    }

    /// Seconds since the session was created
    pub fn age_secs(&self) -> u64 {
        self.created_at.elapsed().as_secs()
    }

    /// Accept a new image, restarting the workflow
    ///
    /// Allowed from every state. Any previous caption and narration are
    /// discarded because they describe an image that is no longer shown.
    pub fn attach_image(&mut self, info: ImageInfo) {
        self.image_info = Some(info);
        self.caption = None;
        self.state = SessionState::ImageDisplayed;
        self.touch();
    }

    /// Record the generated caption for the attached image
    pub fn set_caption(&mut self, text: String) -> Result<(), SessionError> {
        if self.state != SessionState::ImageDisplayed {
            return Err(SessionError::InvalidTransition {
                from: self.state,
                action: "set a generated caption",
            });
        }
        self.caption = Some(text);
        self.state = SessionState::CaptionReady;
        self.touch();
        Ok(())
    }

    /// Replace the caption text with a user edit
    ///
    /// Empty text is a legal edit (the word count simply drops to zero).
    /// Any existing narration is invalidated.
    pub fn edit_caption(&mut self, text: String) -> Result<(), SessionError> {
        if !self.state.has_caption() {
            return Err(SessionError::InvalidTransition {
                from: self.state,
                action: "edit the caption",
            });
        }
        self.caption = Some(text);
        self.state = SessionState::CaptionReady;
        self.touch();
        Ok(())
    }

    /// The text served as the downloadable story file
    pub fn story_text(&self) -> Result<&str, SessionError> {
        match self.caption.as_deref() {
            Some(text) if self.state.has_caption() => Ok(text),
            _ => Err(SessionError::InvalidTransition {
                from: self.state,
                action: "download the story",
            }),
        }
    }

    /// The text to narrate, guarded on a caption being present
    pub fn caption_for_narration(&self) -> Result<String, SessionError> {
        match self.caption.as_deref() {
            Some(text) if self.state.has_caption() => Ok(text.to_string()),
            _ => Err(SessionError::InvalidTransition {
                from: self.state,
                action: "narrate the caption",
            }),
        }
    }

    /// Mark that narration exists for the current caption text
    ///
    /// Narrating again from AudioReady is allowed and is a no-op on state;
    /// audio is synthesized fresh on every request either way.
    pub fn mark_narrated(&mut self) -> Result<(), SessionError> {
        if !self.state.has_caption() {
            return Err(SessionError::InvalidTransition {
                from: self.state,
                action: "mark narration complete",
            });
        }
        self.state = SessionState::AudioReady;
        self.touch();
        Ok(())
    }

    fn touch(&mut self) {
        self.updated_at = Instant::now();
    }
}

impl Default for CaptionSession {
    fn default() -> Self {
        Self::new()
    }
}
