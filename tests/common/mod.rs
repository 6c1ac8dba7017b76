#![allow(dead_code)]

use async_trait::async_trait;
use chrono::Utc;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicI64, Ordering},
};
use story_archive::{
    AppState,
    auth::TokenIssuer,
    config::AppConfig,
    create_router,
    directory::{AdminAllowlist, UserDirectory},
    models::{
        Announcement, CreateAnnouncementRequest, CreateTagRequest, Media, NewMedia, NewUser,
        Post, PostResponse, PostStatus, Role, Tag, UpdateAnnouncementRequest, UpdatePostRequest,
        UpdateTagRequest, User,
    },
    notifier::{MockNotifier, Notifier},
    oauth::GoogleOAuthClient,
    repository::{Repository, RepositoryState},
    storage::{MockStorageService, StorageService},
};
use tokio::net::TcpListener;

// --- In-Memory Repository ---

/// Trait-level stand-in for Postgres so HTTP scenarios run without a
/// database. Visibility filtering, ordering, and ownership checks mirror
/// the SQL implementation.
#[derive(Default)]
pub struct InMemoryRepository {
    next_id: AtomicI64,
    pub users: Mutex<Vec<User>>,
    pub posts: Mutex<Vec<Post>>,
    pub media: Mutex<Vec<Media>>,
    pub tags: Mutex<Vec<Tag>>,
    pub announcements: Mutex<Vec<Announcement>>,
}

impl InMemoryRepository {
    pub fn new() -> Self {
        Self {
            next_id: AtomicI64::new(1),
            ..Default::default()
        }
    }

    fn next_id(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    fn to_response(&self, post: &Post) -> PostResponse {
        let users = self.users.lock().unwrap();
        let author = post
            .user_id
            .and_then(|id| users.iter().find(|u| u.id == id));
        let media = self
            .media
            .lock()
            .unwrap()
            .iter()
            .filter(|m| m.post_id == post.id)
            .cloned()
            .collect();
        PostResponse {
            id: post.id,
            title: post.title.clone(),
            content: post.content.clone(),
            tag: post.tag.clone(),
            status: post.status,
            date_created: post.date_created,
            author: author.map(|u| u.name.clone()),
            profile_pic: author.and_then(|u| u.profile_pic.clone()),
            media,
        }
    }

    fn newest_first(&self, mut posts: Vec<Post>) -> Vec<PostResponse> {
        posts.sort_by(|a, b| {
            b.date_created
                .cmp(&a.date_created)
                .then(b.id.cmp(&a.id))
        });
        posts.iter().map(|p| self.to_response(p)).collect()
    }
}

#[async_trait]
impl Repository for InMemoryRepository {
    async fn find_user_by_subject(&self, google_id: &str) -> Result<Option<User>, sqlx::Error> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.google_id == google_id)
            .cloned())
    }

    async fn find_user_by_id(&self, id: i64) -> Result<Option<User>, sqlx::Error> {
        Ok(self
            .users
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == id)
            .cloned())
    }

    async fn create_user(&self, user: NewUser) -> Result<User, sqlx::Error> {
        let mut users = self.users.lock().unwrap();
        // Mirrors the unique index on google_id.
        if users.iter().any(|u| u.google_id == user.google_id) {
            return Err(sqlx::Error::RowNotFound);
        }
        let record = User {
            id: self.next_id(),
            google_id: user.google_id,
            email: user.email,
            name: user.name,
            profile_pic: user.profile_pic,
            role: user.role,
            date_created: Utc::now(),
        };
        users.push(record.clone());
        Ok(record)
    }

    async fn set_user_role(&self, id: i64, role: Role) -> Result<Option<User>, sqlx::Error> {
        let mut users = self.users.lock().unwrap();
        Ok(users.iter_mut().find(|u| u.id == id).map(|u| {
            u.role = role;
            u.clone()
        }))
    }

    async fn list_users(&self) -> Result<Vec<User>, sqlx::Error> {
        Ok(self.users.lock().unwrap().clone())
    }

    async fn list_posts_by_status(
        &self,
        status: PostStatus,
    ) -> Result<Vec<PostResponse>, sqlx::Error> {
        let posts: Vec<Post> = self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.status == status)
            .cloned()
            .collect();
        Ok(self.newest_first(posts))
    }

    async fn list_all_posts(&self) -> Result<Vec<PostResponse>, sqlx::Error> {
        let posts = self.posts.lock().unwrap().clone();
        Ok(self.newest_first(posts))
    }

    async fn list_posts_by_user(&self, user_id: i64) -> Result<Vec<PostResponse>, sqlx::Error> {
        let posts: Vec<Post> = self
            .posts
            .lock()
            .unwrap()
            .iter()
            .filter(|p| p.user_id == Some(user_id))
            .cloned()
            .collect();
        Ok(self.newest_first(posts))
    }

    async fn get_post(&self, id: i64) -> Result<Option<Post>, sqlx::Error> {
        Ok(self
            .posts
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned())
    }

    async fn get_post_response(&self, id: i64) -> Result<Option<PostResponse>, sqlx::Error> {
        let post = self.get_post(id).await?;
        Ok(post.map(|p| self.to_response(&p)))
    }

    async fn create_post(
        &self,
        author: &User,
        title: &str,
        content: &str,
        tag: Option<&str>,
        media: Vec<NewMedia>,
    ) -> Result<PostResponse, sqlx::Error> {
        let post = Post {
            id: self.next_id(),
            title: title.to_string(),
            content: content.to_string(),
            tag: tag.map(str::to_string),
            user_id: Some(author.id),
            status: PostStatus::Pending,
            date_created: Utc::now(),
        };
        self.posts.lock().unwrap().push(post.clone());

        for m in media {
            let row = Media {
                id: self.next_id(),
                post_id: post.id,
                url: m.url,
                media_type: m.media_type,
                caption: m.caption,
                public_id: m.public_id,
                filename: m.filename,
                uploaded_at: Utc::now(),
            };
            self.media.lock().unwrap().push(row);
        }

        Ok(self.to_response(&post))
    }

    async fn set_post_status(
        &self,
        id: i64,
        status: PostStatus,
    ) -> Result<Option<Post>, sqlx::Error> {
        let mut posts = self.posts.lock().unwrap();
        Ok(posts.iter_mut().find(|p| p.id == id).map(|p| {
            p.status = status;
            p.clone()
        }))
    }

    async fn update_post(
        &self,
        id: i64,
        req: UpdatePostRequest,
    ) -> Result<Option<Post>, sqlx::Error> {
        let mut posts = self.posts.lock().unwrap();
        Ok(posts.iter_mut().find(|p| p.id == id).map(|p| {
            if let Some(title) = req.title {
                p.title = title;
            }
            if let Some(content) = req.content {
                p.content = content;
            }
            if let Some(tag) = req.tag {
                p.tag = Some(tag);
            }
            p.clone()
        }))
    }

    async fn delete_post(&self, id: i64) -> Result<Option<Vec<Media>>, sqlx::Error> {
        let mut posts = self.posts.lock().unwrap();
        let before = posts.len();
        posts.retain(|p| p.id != id);
        if posts.len() == before {
            return Ok(None);
        }
        let mut media = self.media.lock().unwrap();
        let removed: Vec<Media> = media.iter().filter(|m| m.post_id == id).cloned().collect();
        media.retain(|m| m.post_id != id);
        Ok(Some(removed))
    }

    async fn delete_post_owned(
        &self,
        id: i64,
        user_id: i64,
    ) -> Result<Option<Vec<Media>>, sqlx::Error> {
        {
            let posts = self.posts.lock().unwrap();
            let owned = posts
                .iter()
                .any(|p| p.id == id && p.user_id == Some(user_id));
            if !owned {
                return Ok(None);
            }
        }
        self.delete_post(id).await
    }

    async fn list_tags(&self) -> Result<Vec<Tag>, sqlx::Error> {
        let mut tags = self.tags.lock().unwrap().clone();
        tags.sort_by(|a, b| {
            a.display_order
                .cmp(&b.display_order)
                .then(a.name.cmp(&b.name))
        });
        Ok(tags)
    }

    async fn create_tag(&self, req: CreateTagRequest) -> Result<Tag, sqlx::Error> {
        let tag = Tag {
            id: self.next_id(),
            name: req.name,
            display_order: req.display_order.unwrap_or(0),
            image_url: req.image_url,
            date_created: Utc::now(),
        };
        self.tags.lock().unwrap().push(tag.clone());
        Ok(tag)
    }

    async fn update_tag(
        &self,
        id: i64,
        req: UpdateTagRequest,
    ) -> Result<Option<Tag>, sqlx::Error> {
        let mut tags = self.tags.lock().unwrap();
        Ok(tags.iter_mut().find(|t| t.id == id).map(|t| {
            if let Some(name) = req.name {
                t.name = name;
            }
            if let Some(order) = req.display_order {
                t.display_order = order;
            }
            if let Some(url) = req.image_url {
                t.image_url = Some(url);
            }
            t.clone()
        }))
    }

    async fn delete_tag(&self, id: i64) -> Result<bool, sqlx::Error> {
        let mut tags = self.tags.lock().unwrap();
        let before = tags.len();
        tags.retain(|t| t.id != id);
        Ok(tags.len() != before)
    }

    async fn list_active_announcements(&self) -> Result<Vec<Announcement>, sqlx::Error> {
        let now = Utc::now();
        let mut active: Vec<Announcement> = self
            .announcements
            .lock()
            .unwrap()
            .iter()
            .filter(|a| a.is_active && a.date_start <= now && a.date_end.is_none_or(|e| e >= now))
            .cloned()
            .collect();
        active.sort_by(|a, b| b.date_start.cmp(&a.date_start));
        Ok(active)
    }

    async fn create_announcement(
        &self,
        user_id: i64,
        req: CreateAnnouncementRequest,
    ) -> Result<Announcement, sqlx::Error> {
        let now = Utc::now();
        let announcement = Announcement {
            id: self.next_id(),
            user_id,
            title: req.title,
            content: req.content,
            date_created: now,
            date_start: req.date_start.unwrap_or(now),
            date_end: req.date_end,
            is_active: true,
        };
        self.announcements.lock().unwrap().push(announcement.clone());
        Ok(announcement)
    }

    async fn update_announcement(
        &self,
        id: i64,
        req: UpdateAnnouncementRequest,
    ) -> Result<Option<Announcement>, sqlx::Error> {
        let mut announcements = self.announcements.lock().unwrap();
        Ok(announcements.iter_mut().find(|a| a.id == id).map(|a| {
            if let Some(title) = req.title {
                a.title = title;
            }
            if let Some(content) = req.content {
                a.content = content;
            }
            if let Some(start) = req.date_start {
                a.date_start = start;
            }
            if let Some(end) = req.date_end {
                a.date_end = Some(end);
            }
            if let Some(active) = req.is_active {
                a.is_active = active;
            }
            a.clone()
        }))
    }

    async fn delete_announcement(&self, id: i64) -> Result<bool, sqlx::Error> {
        let mut announcements = self.announcements.lock().unwrap();
        let before = announcements.len();
        announcements.retain(|a| a.id != id);
        Ok(announcements.len() != before)
    }
}

// --- Test App Harness ---

pub struct TestApp {
    pub address: String,
    pub repo: Arc<InMemoryRepository>,
    pub notifier: Arc<MockNotifier>,
    pub config: AppConfig,
}

/// Builds the application state around the in-memory repository and mocks,
/// then serves it on an ephemeral port.
pub async fn spawn_app_with(
    repo: Arc<InMemoryRepository>,
    storage: Arc<dyn StorageService>,
    notifier: Arc<MockNotifier>,
) -> TestApp {
    let config = AppConfig::default();
    let repo_state: RepositoryState = repo.clone();
    let directory = UserDirectory::new(repo_state.clone(), AdminAllowlist::from_config(&config));

    let state = AppState {
        repo: repo_state,
        storage,
        notifier: notifier.clone() as Arc<dyn Notifier>,
        oauth: GoogleOAuthClient::from_config(&config),
        directory,
        config: config.clone(),
    };
    let router = create_router(state);

    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });

    TestApp {
        address,
        repo,
        notifier,
        config,
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_with(
        Arc::new(InMemoryRepository::new()),
        Arc::new(MockStorageService::new()),
        Arc::new(MockNotifier::new()),
    )
    .await
}

// --- Seeding Helpers ---

pub async fn seed_user(app: &TestApp, google_id: &str, email: &str, role: Role) -> User {
    app.repo
        .create_user(NewUser {
            google_id: google_id.to_string(),
            email: email.to_string(),
            name: format!("Test {google_id}"),
            profile_pic: None,
            role,
        })
        .await
        .expect("seed user")
}

pub async fn seed_post(app: &TestApp, owner: &User, title: &str, status: PostStatus) -> Post {
    let created = app
        .repo
        .create_post(owner, title, "content", None, vec![])
        .await
        .expect("seed post");
    if status != PostStatus::Pending {
        app.repo
            .set_post_status(created.id, status)
            .await
            .expect("seed status");
    }
    app.repo.get_post(created.id).await.unwrap().unwrap()
}

/// Issues a bearer token for a seeded user with the test config's secret.
pub fn token_for(app: &TestApp, user: &User) -> String {
    TokenIssuer::from_config(&app.config)
        .issue(user)
        .expect("issue token")
}

pub fn bearer(token: &str) -> String {
    format!("Bearer {token}")
}
