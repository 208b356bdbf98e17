//! Editable form state for creating or editing a post.
//!
//! Holds raw user input and turns it into a payload only after the checks a
//! compose dialog enforces: some content, at least one platform and a valid
//! schedule time.

use crate::error::ApiError;
use crate::types::{parse_scheduled_time, InsertPost, Post, PostStatus, UpdatePost, INSTAGRAM};

/// `datetime-local` input format.
pub const INPUT_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PostDraft {
    pub content: String,
    /// Empty means no media.
    pub media_url: String,
    pub platforms: Vec<String>,
    pub scheduled_time: String,
}

impl Default for PostDraft {
    fn default() -> Self {
        Self {
            content: String::new(),
            media_url: String::new(),
            platforms: vec![INSTAGRAM.to_string()],
            scheduled_time: String::new(),
        }
    }
}

impl PostDraft {
    /// Pre-filled form for editing `post`.
    pub fn from_post(post: &Post) -> Self {
        Self {
            content: post.content.clone(),
            media_url: post.media_url.clone().unwrap_or_default(),
            platforms: post.platforms.clone(),
            scheduled_time: post.scheduled_time.format(INPUT_TIME_FORMAT).to_string(),
        }
    }

    /// Add `platform` if absent, remove it if present. Order of the rest is kept.
    pub fn toggle_platform(&mut self, platform: &str) {
        if let Some(pos) = self.platforms.iter().position(|p| p == platform) {
            self.platforms.remove(pos);
        } else {
            self.platforms.push(platform.to_string());
        }
    }

    pub fn to_insert(&self) -> Result<InsertPost, ApiError> {
        if self.content.trim().is_empty() {
            return Err(ApiError::InvalidInput("Please enter some content".to_string()));
        }
        if self.platforms.is_empty() {
            return Err(ApiError::InvalidInput(
                "Please select at least one platform".to_string(),
            ));
        }
        let scheduled_time = parse_scheduled_time(&self.scheduled_time)?;
        let media_url = self.media_url.trim();

        Ok(InsertPost {
            content: self.content.clone(),
            platforms: self.platforms.clone(),
            media_url: (!media_url.is_empty()).then(|| media_url.to_string()),
            scheduled_time,
            status: Some(PostStatus::Scheduled.as_str().to_string()),
        })
    }

    /// Full replacement of the editable fields, for saving an edited post.
    pub fn to_update(&self) -> Result<UpdatePost, ApiError> {
        self.to_insert().map(UpdatePost::from)
    }
}
