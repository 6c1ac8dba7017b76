use async_trait::async_trait;
use aws_sdk_s3 as s3;
use s3::primitives::ByteStream;
use std::sync::Arc;

use crate::models::MediaKind;

/// StorageService
///
/// Contract for the object-storage layer holding post attachments. The real
/// client talks to an S3-compatible endpoint; tests swap in the mock. Errors
/// are plain strings because callers treat every storage failure the same
/// way: log it, skip the file, keep going.
#[async_trait]
pub trait StorageService: Send + Sync {
    /// Provisions the configured bucket when absent. Called at startup in
    /// local environments; no-op in production.
    async fn ensure_bucket_exists(&self);

    /// Uploads one object and returns its public URL.
    async fn upload(
        &self,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, String>;

    /// Removes one object. Best-effort: used when a post is deleted.
    async fn delete(&self, key: &str) -> Result<(), String>;
}

/// StorageState
///
/// The shared handle handlers pull from the application state.
pub type StorageState = Arc<dyn StorageService>;

/// media_kind_for
///
/// Derives the storage family of an upload from its file extension. Returns
/// None for extensions outside the supported families; such files are
/// skipped at submission time.
pub fn media_kind_for(filename: &str) -> Option<MediaKind> {
    let ext = std::path::Path::new(filename)
        .extension()
        .and_then(std::ffi::OsStr::to_str)?
        .to_lowercase();

    match ext.as_str() {
        "jpg" | "jpeg" | "png" | "gif" | "webp" | "svg" => Some(MediaKind::Image),
        "mp4" | "mov" | "avi" | "webm" | "mkv" => Some(MediaKind::Video),
        "mp3" | "wav" | "ogg" | "m4a" => Some(MediaKind::Audio),
        "pdf" | "doc" | "docx" | "txt" => Some(MediaKind::Document),
        _ => None,
    }
}

/// sanitize_key
///
/// Strips directory-navigation components from a user-influenced key
/// segment.
pub fn sanitize_key(key: &str) -> String {
    key.split('/')
        .filter(|segment| !segment.is_empty() && *segment != ".." && *segment != ".")
        .collect::<Vec<_>>()
        .join("/")
}

/// S3StorageClient
///
/// Concrete implementation over the AWS SDK. Path-style addressing is forced
/// so the same client works against MinIO locally and hosted S3-compatible
/// gateways in production.
#[derive(Clone)]
pub struct S3StorageClient {
    client: s3::Client,
    endpoint: String,
    bucket_name: String,
}

impl S3StorageClient {
    pub async fn new(
        endpoint: &str,
        region: &str,
        access_key: &str,
        secret_key: &str,
        bucket: &str,
    ) -> Self {
        let credentials =
            s3::config::Credentials::new(access_key, secret_key, None, None, "static");

        let config = s3::Config::builder()
            .credentials_provider(credentials)
            .endpoint_url(endpoint)
            .region(s3::config::Region::new(region.to_string()))
            .behavior_version_latest()
            .force_path_style(true)
            .build();

        Self {
            client: s3::Client::from_conf(config),
            endpoint: endpoint.trim_end_matches('/').to_string(),
            bucket_name: bucket.to_string(),
        }
    }
}

#[async_trait]
impl StorageService for S3StorageClient {
    async fn ensure_bucket_exists(&self) {
        // CreateBucket is idempotent; safe to call at every startup.
        let _ = self
            .client
            .create_bucket()
            .bucket(&self.bucket_name)
            .send()
            .await;
    }

    async fn upload(
        &self,
        key: &str,
        content_type: &str,
        bytes: Vec<u8>,
    ) -> Result<String, String> {
        let key = sanitize_key(key);

        self.client
            .put_object()
            .bucket(&self.bucket_name)
            .key(&key)
            .content_type(content_type)
            .body(ByteStream::from(bytes))
            .send()
            .await
            .map_err(|e| e.to_string())?;

        // Path-style public URL, matching the forced addressing mode.
        Ok(format!("{}/{}/{}", self.endpoint, self.bucket_name, key))
    }

    async fn delete(&self, key: &str) -> Result<(), String> {
        self.client
            .delete_object()
            .bucket(&self.bucket_name)
            .key(key)
            .send()
            .await
            .map_err(|e| e.to_string())?;
        Ok(())
    }
}

/// MockStorageService
///
/// In-memory stand-in for unit and integration tests. Returns deterministic
/// URLs; `should_fail` simulates a provider outage.
#[derive(Clone)]
pub struct MockStorageService {
    pub should_fail: bool,
}

impl MockStorageService {
    pub fn new() -> Self {
        Self { should_fail: false }
    }

    pub fn new_failing() -> Self {
        Self { should_fail: true }
    }
}

impl Default for MockStorageService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    async fn ensure_bucket_exists(&self) {}

    async fn upload(
        &self,
        key: &str,
        _content_type: &str,
        _bytes: Vec<u8>,
    ) -> Result<String, String> {
        if self.should_fail {
            return Err("Mock Storage Error: Simulation requested".to_string());
        }
        Ok(format!(
            "http://localhost:9000/mock-bucket/{}",
            sanitize_key(key)
        ))
    }

    async fn delete(&self, _key: &str) -> Result<(), String> {
        if self.should_fail {
            return Err("Mock Storage Error: Simulation requested".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kind_derivation_by_extension() {
        assert_eq!(media_kind_for("photo.JPG"), Some(MediaKind::Image));
        assert_eq!(media_kind_for("clip.mp4"), Some(MediaKind::Video));
        assert_eq!(media_kind_for("oral_history.mp3"), Some(MediaKind::Audio));
        assert_eq!(media_kind_for("scan.pdf"), Some(MediaKind::Document));
        assert_eq!(media_kind_for("malware.exe"), None);
        assert_eq!(media_kind_for("no_extension"), None);
    }

    #[test]
    fn key_sanitization() {
        assert_eq!(sanitize_key("uploads/../etc/passwd"), "uploads/etc/passwd");
        assert_eq!(sanitize_key("./a//b"), "a/b");
    }
}
