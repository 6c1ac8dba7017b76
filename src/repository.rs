use crate::models::{
    Announcement, CreateAnnouncementRequest, CreateTagRequest, Media, NewMedia, NewUser, Post,
    PostResponse, PostStatus, Role, Tag, UpdateAnnouncementRequest, UpdatePostRequest,
    UpdateTagRequest, User,
};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{FromRow, PgPool};
use std::collections::HashMap;
use std::sync::Arc;

/// Repository
///
/// Abstract contract for all persistence operations. Handlers only ever see
/// this trait; the concrete backing (Postgres in production, an in-memory
/// store in tests) is injected through the application state.
///
/// Write failures propagate as `sqlx::Error` so the handler boundary can
/// turn them into 500 responses; multi-row writes happen inside a single
/// transaction in the implementation.
#[async_trait]
pub trait Repository: Send + Sync {
    // --- Users ---
    async fn find_user_by_subject(&self, google_id: &str) -> Result<Option<User>, sqlx::Error>;
    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, sqlx::Error>;
    async fn create_user(&self, user: NewUser) -> Result<User, sqlx::Error>;
    async fn set_user_role(&self, id: i64, role: Role) -> Result<Option<User>, sqlx::Error>;
    async fn list_users(&self) -> Result<Vec<User>, sqlx::Error>;

    // --- Posts ---
    // Listing with a status filter. Newest first.
    async fn list_posts_by_status(
        &self,
        status: PostStatus,
    ) -> Result<Vec<PostResponse>, sqlx::Error>;
    // Admin access: every post regardless of status.
    async fn list_all_posts(&self) -> Result<Vec<PostResponse>, sqlx::Error>;
    // Owner access: the caller's own posts, any status.
    async fn list_posts_by_user(&self, user_id: i64) -> Result<Vec<PostResponse>, sqlx::Error>;
    async fn get_post(&self, id: i64) -> Result<Option<Post>, sqlx::Error>;
    async fn get_post_response(&self, id: i64) -> Result<Option<PostResponse>, sqlx::Error>;
    // Creates the post row and its media rows in one transaction.
    async fn create_post(
        &self,
        author: &User,
        title: &str,
        content: &str,
        tag: Option<&str>,
        media: Vec<NewMedia>,
    ) -> Result<PostResponse, sqlx::Error>;
    async fn set_post_status(
        &self,
        id: i64,
        status: PostStatus,
    ) -> Result<Option<Post>, sqlx::Error>;
    async fn update_post(
        &self,
        id: i64,
        req: UpdatePostRequest,
    ) -> Result<Option<Post>, sqlx::Error>;
    // Deletes any post (admin). Returns the cascaded media rows so the
    // caller can clean up stored objects.
    async fn delete_post(&self, id: i64) -> Result<Option<Vec<Media>>, sqlx::Error>;
    // Deletes only when `user_id` owns the post.
    async fn delete_post_owned(
        &self,
        id: i64,
        user_id: i64,
    ) -> Result<Option<Vec<Media>>, sqlx::Error>;

    // --- Tags ---
    async fn list_tags(&self) -> Result<Vec<Tag>, sqlx::Error>;
    async fn create_tag(&self, req: CreateTagRequest) -> Result<Tag, sqlx::Error>;
    async fn update_tag(&self, id: i64, req: UpdateTagRequest)
    -> Result<Option<Tag>, sqlx::Error>;
    async fn delete_tag(&self, id: i64) -> Result<bool, sqlx::Error>;

    // --- Announcements ---
    async fn list_active_announcements(&self) -> Result<Vec<Announcement>, sqlx::Error>;
    async fn create_announcement(
        &self,
        user_id: i64,
        req: CreateAnnouncementRequest,
    ) -> Result<Announcement, sqlx::Error>;
    async fn update_announcement(
        &self,
        id: i64,
        req: UpdateAnnouncementRequest,
    ) -> Result<Option<Announcement>, sqlx::Error>;
    async fn delete_announcement(&self, id: i64) -> Result<bool, sqlx::Error>;
}

/// RepositoryState
///
/// The shared handle handlers pull from the application state.
pub type RepositoryState = Arc<dyn Repository>;

/// PgRepository
///
/// Postgres-backed implementation over a connection pool.
pub struct PgRepository {
    pool: PgPool,
}

impl PgRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

/// init_schema
///
/// Creates every table on startup when absent. The production deployment
/// runs against a managed database; this keeps local and test setups
/// self-contained.
pub async fn init_schema(pool: &PgPool) -> Result<(), sqlx::Error> {
    sqlx::raw_sql(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id           BIGSERIAL PRIMARY KEY,
            google_id    TEXT NOT NULL UNIQUE,
            email        TEXT NOT NULL UNIQUE,
            name         TEXT NOT NULL,
            profile_pic  TEXT,
            role         TEXT NOT NULL DEFAULT 'user',
            date_created TIMESTAMPTZ NOT NULL DEFAULT NOW()
        );

        CREATE TABLE IF NOT EXISTS posts (
            id           BIGSERIAL PRIMARY KEY,
            title        TEXT NOT NULL,
            content      TEXT NOT NULL,
            tag          TEXT,
            user_id      BIGINT REFERENCES users(id),
            status       TEXT NOT NULL DEFAULT 'pending',
            date_created TIMESTAMPTZ NOT NULL DEFAULT NOW()
        );

        CREATE TABLE IF NOT EXISTS media (
            id          BIGSERIAL PRIMARY KEY,
            post_id     BIGINT NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
            url         TEXT NOT NULL,
            media_type  TEXT NOT NULL,
            caption     TEXT,
            public_id   TEXT,
            filename    TEXT,
            uploaded_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        );

        CREATE TABLE IF NOT EXISTS tags (
            id            BIGSERIAL PRIMARY KEY,
            name          TEXT NOT NULL UNIQUE,
            display_order INTEGER NOT NULL DEFAULT 0,
            image_url     TEXT,
            date_created  TIMESTAMPTZ NOT NULL DEFAULT NOW()
        );

        CREATE TABLE IF NOT EXISTS announcements (
            id           BIGSERIAL PRIMARY KEY,
            user_id      BIGINT NOT NULL REFERENCES users(id),
            title        TEXT NOT NULL,
            content      TEXT NOT NULL,
            date_created TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            date_start   TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            date_end     TIMESTAMPTZ,
            is_active    BOOLEAN NOT NULL DEFAULT TRUE
        );
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

// Post row joined with its author's display fields.
#[derive(FromRow)]
struct PostAuthorRow {
    id: i64,
    title: String,
    content: String,
    tag: Option<String>,
    #[sqlx(try_from = "String")]
    status: PostStatus,
    date_created: chrono::DateTime<Utc>,
    author: Option<String>,
    profile_pic: Option<String>,
}

const POST_AUTHOR_SELECT: &str = r#"
    SELECT p.id, p.title, p.content, p.tag, p.status, p.date_created,
           u.name AS author, u.profile_pic
    FROM posts p
    LEFT JOIN users u ON p.user_id = u.id
"#;

const POST_COLUMNS: &str = "id, title, content, tag, user_id, status, date_created";

const MEDIA_COLUMNS: &str =
    "id, post_id, url, media_type, caption, public_id, filename, uploaded_at";

impl PgRepository {
    /// Fetches the media rows for a set of posts and assembles the enriched
    /// response objects, preserving the input order.
    async fn assemble(&self, rows: Vec<PostAuthorRow>) -> Result<Vec<PostResponse>, sqlx::Error> {
        let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();

        let mut media_by_post: HashMap<i64, Vec<Media>> = HashMap::new();
        if !ids.is_empty() {
            let media: Vec<Media> = sqlx::query_as(&format!(
                "SELECT {MEDIA_COLUMNS} FROM media WHERE post_id = ANY($1) ORDER BY id"
            ))
            .bind(&ids)
            .fetch_all(&self.pool)
            .await?;
            for m in media {
                media_by_post.entry(m.post_id).or_default().push(m);
            }
        }

        Ok(rows
            .into_iter()
            .map(|r| PostResponse {
                media: media_by_post.remove(&r.id).unwrap_or_default(),
                id: r.id,
                title: r.title,
                content: r.content,
                tag: r.tag,
                status: r.status,
                date_created: r.date_created,
                author: r.author,
                profile_pic: r.profile_pic,
            })
            .collect())
    }

    async fn media_for_post(&self, post_id: i64) -> Result<Vec<Media>, sqlx::Error> {
        sqlx::query_as(&format!(
            "SELECT {MEDIA_COLUMNS} FROM media WHERE post_id = $1 ORDER BY id"
        ))
        .bind(post_id)
        .fetch_all(&self.pool)
        .await
    }
}

#[async_trait]
impl Repository for PgRepository {
    async fn find_user_by_subject(&self, google_id: &str) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM users WHERE google_id = $1")
            .bind(google_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn create_user(&self, user: NewUser) -> Result<User, sqlx::Error> {
        sqlx::query_as(
            r#"INSERT INTO users (google_id, email, name, profile_pic, role)
               VALUES ($1, $2, $3, $4, $5)
               RETURNING *"#,
        )
        .bind(&user.google_id)
        .bind(&user.email)
        .bind(&user.name)
        .bind(&user.profile_pic)
        .bind(user.role.as_str())
        .fetch_one(&self.pool)
        .await
    }

    async fn set_user_role(&self, id: i64, role: Role) -> Result<Option<User>, sqlx::Error> {
        sqlx::query_as("UPDATE users SET role = $1 WHERE id = $2 RETURNING *")
            .bind(role.as_str())
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn list_users(&self) -> Result<Vec<User>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM users ORDER BY date_created ASC")
            .fetch_all(&self.pool)
            .await
    }

    async fn list_posts_by_status(
        &self,
        status: PostStatus,
    ) -> Result<Vec<PostResponse>, sqlx::Error> {
        let rows: Vec<PostAuthorRow> = sqlx::query_as(&format!(
            "{POST_AUTHOR_SELECT} WHERE p.status = $1 ORDER BY p.date_created DESC"
        ))
        .bind(status.as_str())
        .fetch_all(&self.pool)
        .await?;
        self.assemble(rows).await
    }

    async fn list_all_posts(&self) -> Result<Vec<PostResponse>, sqlx::Error> {
        let rows: Vec<PostAuthorRow> =
            sqlx::query_as(&format!("{POST_AUTHOR_SELECT} ORDER BY p.date_created DESC"))
                .fetch_all(&self.pool)
                .await?;
        self.assemble(rows).await
    }

    async fn list_posts_by_user(&self, user_id: i64) -> Result<Vec<PostResponse>, sqlx::Error> {
        let rows: Vec<PostAuthorRow> = sqlx::query_as(&format!(
            "{POST_AUTHOR_SELECT} WHERE p.user_id = $1 ORDER BY p.date_created DESC"
        ))
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;
        self.assemble(rows).await
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, sqlx::Error> {
        sqlx::query_as(&format!("SELECT {POST_COLUMNS} FROM posts WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn get_post_response(&self, id: i64) -> Result<Option<PostResponse>, sqlx::Error> {
        let row: Option<PostAuthorRow> =
            sqlx::query_as(&format!("{POST_AUTHOR_SELECT} WHERE p.id = $1"))
                .bind(id)
                .fetch_optional(&self.pool)
                .await?;
        match row {
            Some(row) => Ok(self.assemble(vec![row]).await?.pop()),
            None => Ok(None),
        }
    }

    async fn create_post(
        &self,
        author: &User,
        title: &str,
        content: &str,
        tag: Option<&str>,
        media: Vec<NewMedia>,
    ) -> Result<PostResponse, sqlx::Error> {
        // Post row plus all media rows commit or roll back together.
        let mut tx = self.pool.begin().await?;

        let post: Post = sqlx::query_as(&format!(
            r#"INSERT INTO posts (title, content, tag, user_id, status)
               VALUES ($1, $2, $3, $4, 'pending')
               RETURNING {POST_COLUMNS}"#
        ))
        .bind(title)
        .bind(content)
        .bind(tag)
        .bind(author.id)
        .fetch_one(&mut *tx)
        .await?;

        let mut attached = Vec::with_capacity(media.len());
        for m in media {
            let row: Media = sqlx::query_as(&format!(
                r#"INSERT INTO media (post_id, url, media_type, caption, public_id, filename)
                   VALUES ($1, $2, $3, $4, $5, $6)
                   RETURNING {MEDIA_COLUMNS}"#
            ))
            .bind(post.id)
            .bind(&m.url)
            .bind(m.media_type.as_str())
            .bind(&m.caption)
            .bind(&m.public_id)
            .bind(&m.filename)
            .fetch_one(&mut *tx)
            .await?;
            attached.push(row);
        }

        tx.commit().await?;

        Ok(PostResponse {
            id: post.id,
            title: post.title,
            content: post.content,
            tag: post.tag,
            status: post.status,
            date_created: post.date_created,
            author: Some(author.name.clone()),
            profile_pic: author.profile_pic.clone(),
            media: attached,
        })
    }

    async fn set_post_status(
        &self,
        id: i64,
        status: PostStatus,
    ) -> Result<Option<Post>, sqlx::Error> {
        sqlx::query_as(&format!(
            "UPDATE posts SET status = $1 WHERE id = $2 RETURNING {POST_COLUMNS}"
        ))
        .bind(status.as_str())
        .bind(id)
        .fetch_optional(&self.pool)
        .await
    }

    async fn update_post(
        &self,
        id: i64,
        req: UpdatePostRequest,
    ) -> Result<Option<Post>, sqlx::Error> {
        sqlx::query_as(&format!(
            r#"UPDATE posts
               SET title = COALESCE($2, title),
                   content = COALESCE($3, content),
                   tag = COALESCE($4, tag)
               WHERE id = $1
               RETURNING {POST_COLUMNS}"#
        ))
        .bind(id)
        .bind(req.title)
        .bind(req.content)
        .bind(req.tag)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_post(&self, id: i64) -> Result<Option<Vec<Media>>, sqlx::Error> {
        let media = self.media_for_post(id).await?;
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok((result.rows_affected() > 0).then_some(media))
    }

    async fn delete_post_owned(
        &self,
        id: i64,
        user_id: i64,
    ) -> Result<Option<Vec<Media>>, sqlx::Error> {
        let media = self.media_for_post(id).await?;
        let result = sqlx::query("DELETE FROM posts WHERE id = $1 AND user_id = $2")
            .bind(id)
            .bind(user_id)
            .execute(&self.pool)
            .await?;
        Ok((result.rows_affected() > 0).then_some(media))
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, sqlx::Error> {
        sqlx::query_as("SELECT * FROM tags ORDER BY display_order ASC, name ASC")
            .fetch_all(&self.pool)
            .await
    }

    async fn create_tag(&self, req: CreateTagRequest) -> Result<Tag, sqlx::Error> {
        sqlx::query_as(
            r#"INSERT INTO tags (name, display_order, image_url)
               VALUES ($1, $2, $3)
               RETURNING *"#,
        )
        .bind(&req.name)
        .bind(req.display_order.unwrap_or(0))
        .bind(&req.image_url)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_tag(
        &self,
        id: i64,
        req: UpdateTagRequest,
    ) -> Result<Option<Tag>, sqlx::Error> {
        sqlx::query_as(
            r#"UPDATE tags
               SET name = COALESCE($2, name),
                   display_order = COALESCE($3, display_order),
                   image_url = COALESCE($4, image_url)
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(req.name)
        .bind(req.display_order)
        .bind(req.image_url)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_tag(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM tags WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    async fn list_active_announcements(&self) -> Result<Vec<Announcement>, sqlx::Error> {
        sqlx::query_as(
            r#"SELECT * FROM announcements
               WHERE is_active = TRUE
                 AND date_start <= NOW()
                 AND (date_end IS NULL OR date_end >= NOW())
               ORDER BY date_start DESC"#,
        )
        .fetch_all(&self.pool)
        .await
    }

    async fn create_announcement(
        &self,
        user_id: i64,
        req: CreateAnnouncementRequest,
    ) -> Result<Announcement, sqlx::Error> {
        sqlx::query_as(
            r#"INSERT INTO announcements (user_id, title, content, date_start, date_end)
               VALUES ($1, $2, $3, COALESCE($4, NOW()), $5)
               RETURNING *"#,
        )
        .bind(user_id)
        .bind(&req.title)
        .bind(&req.content)
        .bind(req.date_start)
        .bind(req.date_end)
        .fetch_one(&self.pool)
        .await
    }

    async fn update_announcement(
        &self,
        id: i64,
        req: UpdateAnnouncementRequest,
    ) -> Result<Option<Announcement>, sqlx::Error> {
        sqlx::query_as(
            r#"UPDATE announcements
               SET title = COALESCE($2, title),
                   content = COALESCE($3, content),
                   date_start = COALESCE($4, date_start),
                   date_end = COALESCE($5, date_end),
                   is_active = COALESCE($6, is_active)
               WHERE id = $1
               RETURNING *"#,
        )
        .bind(id)
        .bind(req.title)
        .bind(req.content)
        .bind(req.date_start)
        .bind(req.date_end)
        .bind(req.is_active)
        .fetch_optional(&self.pool)
        .await
    }

    async fn delete_announcement(&self, id: i64) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM announcements WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
