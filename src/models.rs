use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use ts_rs::TS;
use utoipa::ToSchema;

// --- Enumerations (stored as TEXT, parsed on row decode) ---

/// Role
///
/// Access level of a user record. Derived from the admin allowlist at
/// account creation; promotion is one-directional.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    #[default]
    User,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Admin => "admin",
        }
    }
}

impl TryFrom<String> for Role {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "user" => Ok(Role::User),
            "admin" => Ok(Role::Admin),
            other => Err(format!("unknown role: {other}")),
        }
    }
}

/// PostStatus
///
/// Moderation state of a post. Every new post starts in Pending; only an
/// administrator action moves it to Approved or Denied.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema, Default)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum PostStatus {
    #[default]
    Pending,
    Approved,
    Denied,
}

impl PostStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PostStatus::Pending => "pending",
            PostStatus::Approved => "approved",
            PostStatus::Denied => "denied",
        }
    }
}

impl TryFrom<String> for PostStatus {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "pending" => Ok(PostStatus::Pending),
            "approved" => Ok(PostStatus::Approved),
            "denied" => Ok(PostStatus::Denied),
            other => Err(format!("unknown post status: {other}")),
        }
    }
}

/// MediaKind
///
/// Storage family of an attachment, derived from the original file extension
/// at submission time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum MediaKind {
    Image,
    Video,
    Audio,
    Document,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
            MediaKind::Audio => "audio",
            MediaKind::Document => "document",
        }
    }
}

impl TryFrom<String> for MediaKind {
    type Error = String;
    fn try_from(value: String) -> Result<Self, Self::Error> {
        match value.as_str() {
            "image" => Ok(MediaKind::Image),
            "video" => Ok(MediaKind::Video),
            "audio" => Ok(MediaKind::Audio),
            "document" => Ok(MediaKind::Document),
            other => Err(format!("unknown media kind: {other}")),
        }
    }
}

// --- Core Application Schemas (Mapped to Database) ---

/// User
///
/// Canonical identity record. `google_id` is the provider-issued subject and
/// the stable key linking bearer credentials to this row.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct User {
    pub id: i64,
    pub google_id: String,
    pub email: String,
    pub name: String,
    pub profile_pic: Option<String>,
    #[sqlx(try_from = "String")]
    pub role: Role,
    #[ts(type = "string")]
    pub date_created: DateTime<Utc>,
}

/// Post
///
/// A submitted story. `user_id` is nullable for legacy rows imported before
/// accounts existed.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Post {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub tag: Option<String>,
    pub user_id: Option<i64>,
    #[sqlx(try_from = "String")]
    pub status: PostStatus,
    #[ts(type = "string")]
    pub date_created: DateTime<Utc>,
}

/// Media
///
/// A stored attachment belonging to a post. `public_id` is the object key in
/// the storage provider, kept so the object can be removed when the post is
/// deleted.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow)]
#[ts(export)]
pub struct Media {
    pub id: i64,
    pub post_id: i64,
    pub url: String,
    #[sqlx(try_from = "String")]
    pub media_type: MediaKind,
    pub caption: Option<String>,
    pub public_id: Option<String>,
    pub filename: Option<String>,
    #[ts(type = "string")]
    pub uploaded_at: DateTime<Utc>,
}

/// Tag
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Tag {
    pub id: i64,
    pub name: String,
    pub display_order: i32,
    pub image_url: Option<String>,
    #[ts(type = "string")]
    pub date_created: DateTime<Utc>,
}

/// Announcement
///
/// Site-wide notice shown between `date_start` and `date_end` while
/// `is_active` holds. A missing `date_end` means no expiration.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, FromRow, Default)]
#[ts(export)]
pub struct Announcement {
    pub id: i64,
    pub user_id: i64,
    pub title: String,
    pub content: String,
    #[ts(type = "string")]
    pub date_created: DateTime<Utc>,
    #[ts(type = "string")]
    pub date_start: DateTime<Utc>,
    #[ts(type = "string | null")]
    pub date_end: Option<DateTime<Utc>>,
    pub is_active: bool,
}

// --- Response Schemas ---

/// PostResponse
///
/// A post enriched with its attachments and author display data, the shape
/// every post-returning endpoint serves.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct PostResponse {
    pub id: i64,
    pub title: String,
    pub content: String,
    pub tag: Option<String>,
    pub status: PostStatus,
    #[ts(type = "string")]
    pub date_created: DateTime<Utc>,
    pub author: Option<String>,
    pub profile_pic: Option<String>,
    pub media: Vec<Media>,
}

/// UserProfile
///
/// The `user` object inside `GET /api/auth/user` responses.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UserProfile {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub profile_pic: Option<String>,
    pub role: Role,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        UserProfile {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            profile_pic: user.profile_pic.clone(),
            role: user.role,
        }
    }
}

/// DecisionResponse
///
/// Result of an approve/deny transition. `email_sent` reports the
/// best-effort notification outcome and never affects the status code.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct DecisionResponse {
    pub message: String,
    pub status: PostStatus,
    pub email_sent: bool,
}

// --- Request Payloads (Input Schemas) ---

/// DecisionRequest
///
/// Optional body for the deny endpoint; `feedback` is forwarded verbatim
/// into the notification email.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct DecisionRequest {
    pub feedback: Option<String>,
}

/// UpdatePostRequest
///
/// Administrator partial edit of a post. Absent fields are left unchanged;
/// status is never touched here.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdatePostRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub tag: Option<String>,
}

/// CreateTagRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateTagRequest {
    pub name: String,
    pub display_order: Option<i32>,
    pub image_url: Option<String>,
}

/// UpdateTagRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateTagRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display_order: Option<i32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

/// CreateAnnouncementRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct CreateAnnouncementRequest {
    pub title: String,
    pub content: String,
    #[ts(type = "string | null")]
    pub date_start: Option<DateTime<Utc>>,
    #[ts(type = "string | null")]
    pub date_end: Option<DateTime<Utc>>,
}

/// UpdateAnnouncementRequest
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateAnnouncementRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(type = "string | null")]
    pub date_start: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    #[ts(type = "string | null")]
    pub date_end: Option<DateTime<Utc>>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

/// ContactRequest
///
/// Contact-form submission; relayed by email to the organization inbox.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct ContactRequest {
    pub name: String,
    pub email: String,
    pub message: String,
}

/// UpdateUserRoleRequest
///
/// Explicit role change from the admin user list.
#[derive(Debug, Clone, Serialize, Deserialize, TS, ToSchema, Default)]
#[ts(export)]
pub struct UpdateUserRoleRequest {
    pub role: Role,
}

/// NewUser
///
/// Insert payload for a user record created at first login. The role has
/// already been derived from the admin allowlist by the user directory.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub google_id: String,
    pub email: String,
    pub name: String,
    pub profile_pic: Option<String>,
    pub role: Role,
}

/// NewMedia
///
/// Internal record describing an attachment that survived upload, ready for
/// its database row. Built by the submission handler, consumed by the
/// repository inside the post-creation transaction.
#[derive(Debug, Clone)]
pub struct NewMedia {
    pub url: String,
    pub media_type: MediaKind,
    pub caption: Option<String>,
    pub public_id: Option<String>,
    pub filename: Option<String>,
}
