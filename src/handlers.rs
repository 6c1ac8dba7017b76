use crate::{
    AppState,
    auth::{AdminUser, AuthUser, TokenIssuer},
    error::{ApiError, ApiResult},
    models::{
        Announcement, ContactRequest, CreateAnnouncementRequest, CreateTagRequest,
        DecisionRequest, DecisionResponse, NewMedia, Post, PostResponse, PostStatus, Tag,
        UpdateAnnouncementRequest, UpdatePostRequest, UpdateTagRequest, UpdateUserRoleRequest,
        User, UserProfile,
    },
    storage::media_kind_for,
};
use axum::{
    Json,
    body::Bytes,
    extract::{Multipart, Path, Query, State},
    http::StatusCode,
    response::Redirect,
};
use serde::Deserialize;
use serde_json::json;
use std::collections::HashMap;
use uuid::Uuid;

/// Maximum number of attachments processed per submission; extra files are
/// ignored rather than rejected.
pub const MAX_MEDIA_PER_POST: usize = 5;

// --- Query Structs ---

/// LoginQuery
///
/// Accepted query parameters for the login redirect. `returnTo` is carried
/// through the OAuth round trip in the `state` parameter.
#[derive(Deserialize, utoipa::IntoParams)]
pub struct LoginQuery {
    #[serde(rename = "returnTo")]
    pub return_to: Option<String>,
}

/// CallbackQuery
#[derive(Deserialize, utoipa::IntoParams)]
pub struct CallbackQuery {
    pub code: Option<String>,
    pub state: Option<String>,
}

// --- Auth Handlers ---

/// login
///
/// [Public Route] Entry point of the login flow: redirects the browser to
/// the identity provider's consent screen.
#[utoipa::path(
    get,
    path = "/api/auth/login",
    params(LoginQuery),
    responses((status = 302, description = "Redirect to identity provider"))
)]
pub async fn login(
    State(state): State<AppState>,
    Query(query): Query<LoginQuery>,
) -> Redirect {
    let redirect_uri = callback_uri(&state);
    let url = state
        .oauth
        .authorize_url(&redirect_uri, query.return_to.as_deref())
        .await;
    Redirect::temporary(&url)
}

/// login_callback
///
/// [Public Route] Provider redirect target. Exchanges the authorization code
/// for a verified identity, resolves (or lazily creates) the user record,
/// and sends the browser back to the frontend with a freshly issued bearer
/// token in the query string. This is the only place a user row is created
/// or promoted.
#[utoipa::path(
    get,
    path = "/api/auth/login/callback",
    params(CallbackQuery),
    responses(
        (status = 302, description = "Redirect to frontend with token"),
        (status = 400, description = "Missing code or unverified email"),
        (status = 500, description = "Provider exchange failed")
    )
)]
pub async fn login_callback(
    State(state): State<AppState>,
    Query(query): Query<CallbackQuery>,
) -> ApiResult<Redirect> {
    let code = query
        .code
        .ok_or_else(|| ApiError::Validation("Authorization code not provided".to_string()))?;

    let identity = state.oauth.verify_code(&code, &callback_uri(&state)).await?;
    let user = state.directory.resolve_or_create(&identity).await?;
    let token = TokenIssuer::from_config(&state.config).issue(&user)?;

    let mut destination = format!(
        "{}?token={}",
        state.config.frontend_origin,
        urlencoding::encode(&token)
    );
    if let Some(return_to) = query.state.as_deref().filter(|s| !s.is_empty()) {
        destination.push_str("&returnTo=");
        destination.push_str(&urlencoding::encode(return_to));
    }

    Ok(Redirect::temporary(&destination))
}

/// logout
///
/// [Public Route] Stateless acknowledgment. Tokens carry no server-side
/// state; the client discards its copy.
#[utoipa::path(
    post,
    path = "/api/auth/logout",
    responses((status = 200, description = "Logged out"))
)]
pub async fn logout() -> Json<serde_json::Value> {
    Json(json!({ "success": true, "message": "Logged out" }))
}

/// get_auth_user
///
/// [Authenticated Route] Returns the session profile for the presented
/// bearer credential.
#[utoipa::path(
    get,
    path = "/api/auth/user",
    responses((status = 200, description = "Session profile", body = UserProfile))
)]
pub async fn get_auth_user(AuthUser { user }: AuthUser) -> Json<serde_json::Value> {
    Json(json!({
        "authenticated": true,
        "user": UserProfile::from(&user),
    }))
}

fn callback_uri(state: &AppState) -> String {
    format!(
        "{}/api/auth/login/callback",
        state.config.public_base_url.trim_end_matches('/')
    )
}

// --- Post Handlers ---

/// get_posts
///
/// [Public Route] Lists approved posts, newest first. Pending and denied
/// posts are never visible here regardless of caller.
#[utoipa::path(
    get,
    path = "/api/posts",
    responses((status = 200, description = "Approved posts", body = [PostResponse]))
)]
pub async fn get_posts(State(state): State<AppState>) -> ApiResult<Json<Vec<PostResponse>>> {
    let posts = state.repo.list_posts_by_status(PostStatus::Approved).await?;
    Ok(Json(posts))
}

/// get_post_details
///
/// [Public Route] Single approved post by id. Non-approved posts answer 404
/// so their existence is not observable.
#[utoipa::path(
    get,
    path = "/api/posts/{id}",
    params(("id" = i64, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Found", body = PostResponse),
        (status = 404, description = "Not found or not approved")
    )
)]
pub async fn get_post_details(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<PostResponse>> {
    let post = state
        .repo
        .get_post_response(id)
        .await?
        .filter(|p| p.status == PostStatus::Approved)
        .ok_or_else(|| ApiError::NotFound("Post".to_string()))?;
    Ok(Json(post))
}

// One attachment as it arrived in the multipart stream, before the kind
// check and upload decide whether it survives.
struct PendingFile {
    filename: String,
    content_type: String,
    bytes: Vec<u8>,
}

/// create_post
///
/// [Authenticated Route] Submits a new post. Multipart form with `title`,
/// `content`, optional `tag`, and up to five `media_N` files with optional
/// `media_N_caption` fields.
///
/// Every submission lands in `pending`. Individual attachments that have an
/// unsupported extension or fail to upload are skipped without aborting the
/// submission; the persisted `media` array in the response reports what
/// survived. The post row and its media rows are written in one
/// transaction.
#[utoipa::path(
    post,
    path = "/api/posts",
    responses(
        (status = 201, description = "Created", body = PostResponse),
        (status = 400, description = "Missing required field"),
        (status = 401, description = "Not authenticated")
    )
)]
pub async fn create_post(
    AuthUser { user }: AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<PostResponse>)> {
    let mut title: Option<String> = None;
    let mut content: Option<String> = None;
    let mut tag: Option<String> = None;
    let mut files: HashMap<usize, PendingFile> = HashMap::new();
    let mut captions: HashMap<usize, String> = HashMap::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Malformed form data: {e}")))?
    {
        let Some(name) = field.name().map(str::to_string) else {
            continue;
        };

        match name.as_str() {
            "title" => title = Some(read_text(field).await?),
            "content" => content = Some(read_text(field).await?),
            "tag" => tag = Some(read_text(field).await?),
            _ => {
                if let Some(index) = media_caption_index(&name) {
                    captions.insert(index, read_text(field).await?);
                } else if let Some(index) = media_index(&name) {
                    let filename = field.file_name().unwrap_or("upload.bin").to_string();
                    let content_type = field
                        .content_type()
                        .unwrap_or("application/octet-stream")
                        .to_string();
                    let bytes = field
                        .bytes()
                        .await
                        .map_err(|e| ApiError::Validation(format!("Malformed form data: {e}")))?
                        .to_vec();
                    files.insert(
                        index,
                        PendingFile {
                            filename,
                            content_type,
                            bytes,
                        },
                    );
                }
                // Unknown fields are ignored.
            }
        }
    }

    let title = title
        .filter(|t| !t.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("Title is required".to_string()))?;
    let content = content
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ApiError::Validation("Content is required".to_string()))?;
    let tag = tag.filter(|t| !t.trim().is_empty());

    // Attachments are processed in field order, capped at the per-post
    // limit. A failed or unsupported file is skipped; uploads that already
    // succeeded are kept.
    let mut entries: Vec<(usize, PendingFile)> = files.into_iter().collect();
    entries.sort_unstable_by_key(|(index, _)| *index);

    let mut media = Vec::new();
    for (index, file) in entries.into_iter().take(MAX_MEDIA_PER_POST) {
        let Some(kind) = media_kind_for(&file.filename) else {
            tracing::warn!(filename = %file.filename, "skipping attachment with unsupported extension");
            continue;
        };

        let extension = std::path::Path::new(&file.filename)
            .extension()
            .and_then(std::ffi::OsStr::to_str)
            .unwrap_or("bin");
        let key = format!("uploads/{}.{}", Uuid::new_v4(), extension);

        match state
            .storage
            .upload(&key, &file.content_type, file.bytes)
            .await
        {
            Ok(url) => media.push(NewMedia {
                url,
                media_type: kind,
                caption: captions.remove(&index),
                public_id: Some(key),
                filename: Some(file.filename),
            }),
            Err(e) => {
                tracing::warn!(filename = %file.filename, "attachment upload failed, skipping: {}", e);
            }
        }
    }

    let post = state
        .repo
        .create_post(&user, &title, &content, tag.as_deref(), media)
        .await?;

    Ok((StatusCode::CREATED, Json(post)))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> ApiResult<String> {
    field
        .text()
        .await
        .map_err(|e| ApiError::Validation(format!("Malformed form data: {e}")))
}

// "media_3" -> 3
fn media_index(name: &str) -> Option<usize> {
    name.strip_prefix("media_")?.parse().ok()
}

// "media_3_caption" -> 3
fn media_caption_index(name: &str) -> Option<usize> {
    name.strip_prefix("media_")?
        .strip_suffix("_caption")?
        .parse()
        .ok()
}

/// get_my_posts
///
/// [Authenticated Route] The caller's own posts in every status, newest
/// first.
#[utoipa::path(
    get,
    path = "/api/user/posts",
    responses((status = 200, description = "Own posts", body = [PostResponse]))
)]
pub async fn get_my_posts(
    AuthUser { user }: AuthUser,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<PostResponse>>> {
    let posts = state.repo.list_posts_by_user(user.id).await?;
    Ok(Json(posts))
}

/// delete_my_post
///
/// [Authenticated Route] Owner deletion, any status. Cascades to media rows
/// and best-effort removes the stored objects.
#[utoipa::path(
    delete,
    path = "/api/user/posts/{id}",
    params(("id" = i64, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not found or not owner")
    )
)]
pub async fn delete_my_post(
    AuthUser { user }: AuthUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<serde_json::Value>> {
    let media = state
        .repo
        .delete_post_owned(id, user.id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post".to_string()))?;

    cleanup_stored_media(&state, media).await;
    Ok(Json(json!({ "message": "Post deleted" })))
}

/// Removes the stored objects behind deleted media rows. Failures are logged
/// and otherwise ignored; the database rows are already gone.
async fn cleanup_stored_media(state: &AppState, media: Vec<crate::models::Media>) {
    for item in media {
        if let Some(key) = item.public_id {
            if let Err(e) = state.storage.delete(&key).await {
                tracing::warn!(key = %key, "failed to delete stored object: {}", e);
            }
        }
    }
}

// --- Admin: Moderation ---

/// admin_get_posts
///
/// [Admin Route] Every post in the system regardless of status.
#[utoipa::path(
    get,
    path = "/api/admin/posts",
    responses((status = 200, description = "All posts", body = [PostResponse]))
)]
pub async fn admin_get_posts(
    AdminUser { .. }: AdminUser,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<PostResponse>>> {
    Ok(Json(state.repo.list_all_posts().await?))
}

/// admin_get_pending_posts
///
/// [Admin Route] The moderation queue: pending posts only.
#[utoipa::path(
    get,
    path = "/api/admin/posts/pending",
    responses((status = 200, description = "Pending posts", body = [PostResponse]))
)]
pub async fn admin_get_pending_posts(
    AdminUser { .. }: AdminUser,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<PostResponse>>> {
    Ok(Json(state.repo.list_posts_by_status(PostStatus::Pending).await?))
}

/// approve_post
///
/// [Admin Route] `pending -> approved`. Notifies the post owner when an
/// email is on file; a failed send is reported in `email_sent` and never
/// rolls back the approval.
#[utoipa::path(
    post,
    path = "/api/admin/posts/{id}/approve",
    params(("id" = i64, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Approved", body = DecisionResponse),
        (status = 400, description = "Not in pending state"),
        (status = 403, description = "Not an administrator"),
        (status = 404, description = "Not found")
    )
)]
pub async fn approve_post(
    AdminUser { .. }: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<DecisionResponse>> {
    decide_post(&state, id, PostStatus::Approved, None).await
}

/// deny_post
///
/// [Admin Route] `pending -> denied`, with optional feedback forwarded
/// verbatim into the notification email. Same best-effort notification
/// semantics as approval.
#[utoipa::path(
    post,
    path = "/api/admin/posts/{id}/deny",
    params(("id" = i64, Path, description = "Post ID")),
    request_body = DecisionRequest,
    responses(
        (status = 200, description = "Denied", body = DecisionResponse),
        (status = 400, description = "Not in pending state"),
        (status = 403, description = "Not an administrator"),
        (status = 404, description = "Not found")
    )
)]
pub async fn deny_post(
    AdminUser { .. }: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    body: Bytes,
) -> ApiResult<Json<DecisionResponse>> {
    // The body is optional; an empty one means no feedback.
    let feedback = if body.is_empty() {
        None
    } else {
        serde_json::from_slice::<DecisionRequest>(&body)
            .map_err(|e| ApiError::Validation(format!("Malformed JSON body: {e}")))?
            .feedback
    };
    decide_post(&state, id, PostStatus::Denied, feedback).await
}

/// Shared approve/deny transition. The status change commits first; the
/// notification outcome only decorates the response.
async fn decide_post(
    state: &AppState,
    id: i64,
    decision: PostStatus,
    feedback: Option<String>,
) -> ApiResult<Json<DecisionResponse>> {
    let post = state
        .repo
        .get_post(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post".to_string()))?;

    if post.status != PostStatus::Pending {
        return Err(ApiError::Validation(format!(
            "Only pending posts can be {}",
            decision.as_str()
        )));
    }

    let post = state
        .repo
        .set_post_status(id, decision)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post".to_string()))?;

    let email_sent = match post.user_id {
        Some(owner_id) => match state.repo.find_user_by_id(owner_id).await? {
            Some(owner) => {
                state
                    .notifier
                    .send_decision(&owner.email, decision, &post.title, feedback.as_deref())
                    .await
            }
            None => false,
        },
        None => false,
    };

    if !email_sent {
        tracing::warn!(post_id = id, "decision notification was not delivered");
    }

    Ok(Json(DecisionResponse {
        message: format!("Post {}", decision.as_str()),
        status: decision,
        email_sent,
    }))
}

/// admin_update_post
///
/// [Admin Route] Partial edit of title/content/tag. Moderation status is
/// not touched here.
#[utoipa::path(
    put,
    path = "/api/admin/posts/{id}",
    params(("id" = i64, Path, description = "Post ID")),
    request_body = UpdatePostRequest,
    responses(
        (status = 200, description = "Updated", body = Post),
        (status = 404, description = "Not found")
    )
)]
pub async fn admin_update_post(
    AdminUser { .. }: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdatePostRequest>,
) -> ApiResult<Json<Post>> {
    let post = state
        .repo
        .update_post(id, payload)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post".to_string()))?;
    Ok(Json(post))
}

/// admin_delete_post
///
/// [Admin Route] Force delete any post, cascading to its media.
#[utoipa::path(
    delete,
    path = "/api/admin/posts/{id}",
    params(("id" = i64, Path, description = "Post ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not found")
    )
)]
pub async fn admin_delete_post(
    AdminUser { .. }: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<serde_json::Value>> {
    let media = state
        .repo
        .delete_post(id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Post".to_string()))?;

    cleanup_stored_media(&state, media).await;
    Ok(Json(json!({ "message": "Post deleted" })))
}

// --- Admin: Users ---

/// admin_get_users
///
/// [Admin Route] Full user listing for oversight.
#[utoipa::path(
    get,
    path = "/api/admin/users",
    responses((status = 200, description = "All users", body = [User]))
)]
pub async fn admin_get_users(
    AdminUser { .. }: AdminUser,
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<User>>> {
    Ok(Json(state.repo.list_users().await?))
}

/// admin_update_user_role
///
/// [Admin Route] Explicit role change from the user list. This is the
/// manual counterpart of the allowlist-driven promotion at login.
#[utoipa::path(
    patch,
    path = "/api/admin/users/{id}",
    params(("id" = i64, Path, description = "User ID")),
    request_body = UpdateUserRoleRequest,
    responses(
        (status = 200, description = "Updated", body = User),
        (status = 404, description = "Not found")
    )
)]
pub async fn admin_update_user_role(
    AdminUser { .. }: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateUserRoleRequest>,
) -> ApiResult<Json<User>> {
    let user = state
        .repo
        .set_user_role(id, payload.role)
        .await?
        .ok_or_else(|| ApiError::NotFound("User".to_string()))?;
    Ok(Json(user))
}

// --- Tags ---

/// get_tags
///
/// [Public Route] All tags in display order.
#[utoipa::path(
    get,
    path = "/api/tags",
    responses((status = 200, description = "Tags", body = [Tag]))
)]
pub async fn get_tags(State(state): State<AppState>) -> ApiResult<Json<Vec<Tag>>> {
    Ok(Json(state.repo.list_tags().await?))
}

/// create_tag
#[utoipa::path(
    post,
    path = "/api/admin/tags",
    request_body = CreateTagRequest,
    responses((status = 201, description = "Created", body = Tag))
)]
pub async fn create_tag(
    AdminUser { .. }: AdminUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateTagRequest>,
) -> ApiResult<(StatusCode, Json<Tag>)> {
    if payload.name.trim().is_empty() {
        return Err(ApiError::Validation("Tag name is required".to_string()));
    }
    let tag = state.repo.create_tag(payload).await?;
    Ok((StatusCode::CREATED, Json(tag)))
}

/// update_tag
#[utoipa::path(
    put,
    path = "/api/admin/tags/{id}",
    params(("id" = i64, Path, description = "Tag ID")),
    request_body = UpdateTagRequest,
    responses(
        (status = 200, description = "Updated", body = Tag),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_tag(
    AdminUser { .. }: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateTagRequest>,
) -> ApiResult<Json<Tag>> {
    let tag = state
        .repo
        .update_tag(id, payload)
        .await?
        .ok_or_else(|| ApiError::NotFound("Tag".to_string()))?;
    Ok(Json(tag))
}

/// delete_tag
#[utoipa::path(
    delete,
    path = "/api/admin/tags/{id}",
    params(("id" = i64, Path, description = "Tag ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_tag(
    AdminUser { .. }: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<serde_json::Value>> {
    if state.repo.delete_tag(id).await? {
        Ok(Json(json!({ "message": "Tag deleted" })))
    } else {
        Err(ApiError::NotFound("Tag".to_string()))
    }
}

// --- Announcements ---

/// get_announcements
///
/// [Public Route] Active announcements whose display window covers now.
#[utoipa::path(
    get,
    path = "/api/announcements",
    responses((status = 200, description = "Active announcements", body = [Announcement]))
)]
pub async fn get_announcements(
    State(state): State<AppState>,
) -> ApiResult<Json<Vec<Announcement>>> {
    Ok(Json(state.repo.list_active_announcements().await?))
}

/// create_announcement
#[utoipa::path(
    post,
    path = "/api/admin/announcements",
    request_body = CreateAnnouncementRequest,
    responses((status = 201, description = "Created", body = Announcement))
)]
pub async fn create_announcement(
    AdminUser { user }: AdminUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateAnnouncementRequest>,
) -> ApiResult<(StatusCode, Json<Announcement>)> {
    if payload.title.trim().is_empty() {
        return Err(ApiError::Validation("Title is required".to_string()));
    }
    if payload.content.trim().is_empty() {
        return Err(ApiError::Validation("Content is required".to_string()));
    }
    let announcement = state.repo.create_announcement(user.id, payload).await?;
    Ok((StatusCode::CREATED, Json(announcement)))
}

/// update_announcement
#[utoipa::path(
    put,
    path = "/api/admin/announcements/{id}",
    params(("id" = i64, Path, description = "Announcement ID")),
    request_body = UpdateAnnouncementRequest,
    responses(
        (status = 200, description = "Updated", body = Announcement),
        (status = 404, description = "Not found")
    )
)]
pub async fn update_announcement(
    AdminUser { .. }: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UpdateAnnouncementRequest>,
) -> ApiResult<Json<Announcement>> {
    let announcement = state
        .repo
        .update_announcement(id, payload)
        .await?
        .ok_or_else(|| ApiError::NotFound("Announcement".to_string()))?;
    Ok(Json(announcement))
}

/// delete_announcement
#[utoipa::path(
    delete,
    path = "/api/admin/announcements/{id}",
    params(("id" = i64, Path, description = "Announcement ID")),
    responses(
        (status = 200, description = "Deleted"),
        (status = 404, description = "Not found")
    )
)]
pub async fn delete_announcement(
    AdminUser { .. }: AdminUser,
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> ApiResult<Json<serde_json::Value>> {
    if state.repo.delete_announcement(id).await? {
        Ok(Json(json!({ "message": "Announcement deleted" })))
    } else {
        Err(ApiError::NotFound("Announcement".to_string()))
    }
}

// --- Contact ---

/// submit_contact_form
///
/// [Public Route] Relays a contact-form message to the organization inbox.
/// The send is best-effort; the response reports the outcome in
/// `email_sent` and the request itself always succeeds once validated.
#[utoipa::path(
    post,
    path = "/api/contact",
    request_body = ContactRequest,
    responses(
        (status = 200, description = "Accepted"),
        (status = 400, description = "Missing field")
    )
)]
pub async fn submit_contact_form(
    State(state): State<AppState>,
    Json(payload): Json<ContactRequest>,
) -> ApiResult<Json<serde_json::Value>> {
    if payload.name.trim().is_empty()
        || payload.email.trim().is_empty()
        || payload.message.trim().is_empty()
    {
        return Err(ApiError::Validation(
            "Name, email and message are required".to_string(),
        ));
    }

    let email_sent = state
        .notifier
        .send_contact_form(
            &state.config.contact_recipient,
            &payload.name,
            &payload.email,
            &payload.message,
        )
        .await;

    if !email_sent {
        tracing::warn!("contact form message was not delivered");
    }

    Ok(Json(json!({
        "message": "Message received",
        "email_sent": email_sent,
    })))
}
