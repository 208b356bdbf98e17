//! Domain DTOs for the post scheduling API.
//!
//! # Design
//! These types mirror the backend's JSON contract (camelCase field names) but
//! are defined independently from the mock-server crate; integration tests
//! catch schema drift between the two.
//!
//! `scheduledTime` arrives as text but is held as a UTC date value from the
//! moment it is parsed, so every payload the client transmits carries a
//! normalized timestamp.

use std::fmt;

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::ApiError;

pub const INSTAGRAM: &str = "instagram";
pub const LINKEDIN: &str = "linkedin";

/// Platform tags the dashboard knows how to render.
pub const KNOWN_PLATFORMS: [&str; 2] = [INSTAGRAM, LINKEDIN];

/// A scheduled post as stored by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Post {
    pub id: i64,
    pub content: String,
    #[serde(default)]
    pub media_url: Option<String>,
    pub platforms: Vec<String>,
    #[serde(deserialize_with = "de_scheduled_time")]
    pub scheduled_time: DateTime<Utc>,
    pub status: String,
}

impl Post {
    /// `None` for status values outside the three with defined UI behaviour.
    pub fn known_status(&self) -> Option<PostStatus> {
        PostStatus::parse(&self.status)
    }

    pub fn targets(&self, platform: &str) -> bool {
        self.platforms.iter().any(|p| p == platform)
    }
}

/// Request payload for creating a post. Omitting `status` lets the backend
/// default it to `scheduled`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct InsertPost {
    pub content: String,
    pub platforms: Vec<String>,
    #[serde(default)]
    pub media_url: Option<String>,
    #[serde(deserialize_with = "de_scheduled_time")]
    pub scheduled_time: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl InsertPost {
    pub fn new(
        content: impl Into<String>,
        platforms: Vec<String>,
        scheduled_time: DateTime<Utc>,
    ) -> Self {
        Self {
            content: content.into(),
            platforms,
            media_url: None,
            scheduled_time,
            status: None,
        }
    }

    pub fn with_media_url(mut self, url: impl Into<String>) -> Self {
        self.media_url = Some(url.into());
        self
    }

    pub fn with_status(mut self, status: PostStatus) -> Self {
        self.status = Some(status.as_str().to_string());
        self
    }
}

/// Request payload for updating an existing post. Only the fields present in
/// the JSON are applied; omitted fields remain unchanged on the server.
///
/// `media_url` is doubly optional: `None` leaves the media untouched,
/// `Some(None)` clears it with an explicit `null`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePost {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "de_explicit_null"
    )]
    pub media_url: Option<Option<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub platforms: Option<Vec<String>>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        deserialize_with = "de_opt_scheduled_time"
    )]
    pub scheduled_time: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

impl UpdatePost {
    pub fn is_empty(&self) -> bool {
        self.content.is_none()
            && self.media_url.is_none()
            && self.platforms.is_none()
            && self.scheduled_time.is_none()
            && self.status.is_none()
    }
}

impl From<InsertPost> for UpdatePost {
    fn from(post: InsertPost) -> Self {
        Self {
            content: Some(post.content),
            media_url: Some(post.media_url),
            platforms: Some(post.platforms),
            scheduled_time: Some(post.scheduled_time),
            status: post.status,
        }
    }
}

/// The post states with defined dashboard behaviour. Transitions out of
/// `Scheduled` are owned by the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostStatus {
    Scheduled,
    Published,
    Failed,
}

impl PostStatus {
    pub const ALL: [PostStatus; 3] = [PostStatus::Scheduled, PostStatus::Published, PostStatus::Failed];

    pub fn as_str(self) -> &'static str {
        match self {
            PostStatus::Scheduled => "scheduled",
            PostStatus::Published => "published",
            PostStatus::Failed => "failed",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        PostStatus::ALL.into_iter().find(|s| s.as_str() == raw)
    }
}

impl fmt::Display for PostStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Parse a scheduled time given either as RFC 3339 or as a `datetime-local`
/// value (`YYYY-MM-DDThh:mm[:ss]`, read as UTC).
pub fn parse_scheduled_time(input: &str) -> Result<DateTime<Utc>, ApiError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ApiError::InvalidInput("Please select a scheduled time".to_string()));
    }
    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
        .map(|naive| naive.and_utc())
        .ok_or_else(|| ApiError::InvalidInput(format!("invalid scheduled time `{trimmed}`")))
}

fn de_scheduled_time<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_scheduled_time(&raw).map_err(serde::de::Error::custom)
}

fn de_opt_scheduled_time<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse_scheduled_time(&raw)
            .map(Some)
            .map_err(serde::de::Error::custom),
        None => Ok(None),
    }
}

// A present `null` becomes `Some(None)`; an absent field stays `None` via `default`.
fn de_explicit_null<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn june_first() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 10, 0, 0).unwrap()
    }

    #[test]
    fn post_uses_camel_case_and_emits_null_media() {
        let post = Post {
            id: 1,
            content: "Hello".to_string(),
            media_url: None,
            platforms: vec![INSTAGRAM.to_string()],
            scheduled_time: june_first(),
            status: "scheduled".to_string(),
        };
        let json = serde_json::to_value(&post).unwrap();
        assert_eq!(json["mediaUrl"], serde_json::Value::Null);
        assert_eq!(json["scheduledTime"], "2024-06-01T10:00:00Z");
        assert_eq!(json["platforms"][0], "instagram");
    }

    #[test]
    fn post_accepts_missing_media_url() {
        let post: Post = serde_json::from_str(
            r#"{"id":3,"content":"c","platforms":["linkedin"],"scheduledTime":"2024-06-01T10:00:00.000Z","status":"failed"}"#,
        )
        .unwrap();
        assert_eq!(post.media_url, None);
        assert_eq!(post.scheduled_time, june_first());
        assert_eq!(post.known_status(), Some(PostStatus::Failed));
    }

    #[test]
    fn post_keeps_unknown_status() {
        let post: Post = serde_json::from_str(
            r#"{"id":3,"content":"c","platforms":[],"scheduledTime":"2024-06-01T10:00:00Z","status":"queued"}"#,
        )
        .unwrap();
        assert_eq!(post.status, "queued");
        assert_eq!(post.known_status(), None);
    }

    #[test]
    fn insert_post_rejects_missing_content() {
        let result: Result<InsertPost, _> =
            serde_json::from_str(r#"{"platforms":["instagram"],"scheduledTime":"2024-06-01T10:00:00Z"}"#);
        assert!(result.is_err());
    }

    #[test]
    fn insert_post_rejects_platforms_of_wrong_type() {
        let result: Result<InsertPost, _> = serde_json::from_str(
            r#"{"content":"x","platforms":"instagram","scheduledTime":"2024-06-01T10:00:00Z"}"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn insert_post_accepts_datetime_local_time() {
        let input: InsertPost = serde_json::from_str(
            r#"{"content":"x","platforms":["instagram"],"scheduledTime":"2024-06-01T10:00"}"#,
        )
        .unwrap();
        assert_eq!(input.scheduled_time, june_first());
        assert_eq!(input.status, None);
    }

    #[test]
    fn insert_post_omits_absent_status() {
        let input = InsertPost::new("x", vec![INSTAGRAM.to_string()], june_first());
        let json = serde_json::to_value(&input).unwrap();
        assert!(json.get("status").is_none());
        assert_eq!(json["mediaUrl"], serde_json::Value::Null);

        let json = serde_json::to_value(input.with_status(PostStatus::Scheduled)).unwrap();
        assert_eq!(json["status"], "scheduled");
    }

    #[test]
    fn update_post_serializes_only_present_fields() {
        let update = UpdatePost {
            content: Some("x".to_string()),
            ..Default::default()
        };
        let json = serde_json::to_value(&update).unwrap();
        assert_eq!(json, serde_json::json!({ "content": "x" }));
    }

    #[test]
    fn update_post_distinguishes_clear_from_unchanged_media() {
        let cleared: UpdatePost = serde_json::from_str(r#"{"mediaUrl":null}"#).unwrap();
        assert_eq!(cleared.media_url, Some(None));

        let untouched: UpdatePost = serde_json::from_str(r#"{}"#).unwrap();
        assert_eq!(untouched.media_url, None);
        assert!(untouched.is_empty());

        let json = serde_json::to_string(&cleared).unwrap();
        assert_eq!(json, r#"{"mediaUrl":null}"#);
    }

    #[test]
    fn parse_scheduled_time_rejects_garbage_and_blank() {
        assert!(matches!(parse_scheduled_time(""), Err(ApiError::InvalidInput(_))));
        assert!(matches!(parse_scheduled_time("tomorrow"), Err(ApiError::InvalidInput(_))));
        assert_eq!(parse_scheduled_time("2024-06-01T12:00:00+02:00").unwrap(), june_first());
    }

    #[test]
    fn status_parse_covers_known_values_only() {
        assert_eq!(PostStatus::parse("published"), Some(PostStatus::Published));
        assert_eq!(PostStatus::parse("Published"), None);
    }
}
