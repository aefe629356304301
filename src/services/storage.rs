use std::path::PathBuf;

use tokio::fs;
use uuid::Uuid;

use crate::config::Config;
use crate::error::{AppError, AppResult};

/// Upload limits for location galleries.
pub const MAX_IMAGES_PER_LOCATION: usize = 5;
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

pub fn is_supported_image(content_type: &str) -> bool {
    matches!(
        content_type,
        "image/jpeg" | "image/png" | "image/webp" | "image/gif"
    )
}

pub fn extension_for(content_type: &str) -> &'static str {
    match content_type {
        "image/png" => "png",
        "image/webp" => "webp",
        "image/gif" => "gif",
        _ => "jpg",
    }
}

/// Stores uploaded images under the configured media root and builds the
/// public URLs served from `/media`.
#[derive(Clone)]
pub struct MediaStore {
    root: PathBuf,
    public_base_url: String,
}

impl MediaStore {
    pub fn new(config: &Config) -> Self {
        Self {
            root: config.media_root.clone(),
            public_base_url: config.public_base_url.clone(),
        }
    }

    pub fn root(&self) -> &PathBuf {
        &self.root
    }

    /// Write image bytes to disk and return the path relative to the media
    /// root, e.g. `locations/<uuid>.jpg`.
    pub async fn save_location_image(&self, content_type: &str, data: &[u8]) -> AppResult<String> {
        let rel_path = format!("locations/{}.{}", Uuid::new_v4(), extension_for(content_type));
        let full_path = self.root.join(&rel_path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)
                .await
                .map_err(|e| AppError::Internal(format!("Failed to create media directory: {}", e)))?;
        }

        fs::write(&full_path, data)
            .await
            .map_err(|e| AppError::Internal(format!("Failed to store image: {}", e)))?;

        Ok(rel_path)
    }

    pub fn public_url(&self, rel_path: &str) -> String {
        format!("{}/media/{}", self.public_base_url, rel_path)
    }

    /// Remove every file in a stored batch, e.g. when the upload that wrote
    /// them could not be persisted.
    pub async fn remove_all(&self, rel_paths: &[String]) {
        for rel_path in rel_paths {
            self.remove(rel_path).await;
        }
    }

    /// Best-effort removal; a missing file is not worth failing a delete for.
    pub async fn remove(&self, rel_path: &str) {
        let full_path = self.root.join(rel_path);
        if let Err(e) = fs::remove_file(&full_path).await {
            tracing::warn!(path = %full_path.display(), error = %e, "Failed to remove media file");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store(root: PathBuf) -> MediaStore {
        MediaStore {
            root,
            public_base_url: "https://example.com".to_string(),
        }
    }

    #[test]
    fn test_supported_image_types() {
        assert!(is_supported_image("image/jpeg"));
        assert!(is_supported_image("image/png"));
        assert!(!is_supported_image("application/pdf"));
        assert!(!is_supported_image("text/html"));
    }

    #[test]
    fn test_extension_mapping() {
        assert_eq!(extension_for("image/png"), "png");
        assert_eq!(extension_for("image/jpeg"), "jpg");
        assert_eq!(extension_for("image/webp"), "webp");
    }

    #[test]
    fn test_public_url() {
        let store = test_store(PathBuf::from("media"));
        assert_eq!(
            store.public_url("locations/abc.jpg"),
            "https://example.com/media/locations/abc.jpg"
        );
    }

    #[tokio::test]
    async fn test_save_and_remove_round_trip() {
        let root = std::env::temp_dir().join(format!("media-test-{}", Uuid::new_v4()));
        let store = test_store(root.clone());

        let rel = store
            .save_location_image("image/png", b"not really a png")
            .await
            .unwrap();
        assert!(rel.starts_with("locations/"));
        assert!(rel.ends_with(".png"));
        assert!(root.join(&rel).exists());

        store.remove(&rel).await;
        assert!(!root.join(&rel).exists());

        tokio::fs::remove_dir_all(&root).await.ok();
    }

    #[tokio::test]
    async fn test_remove_all_cleans_up_batch() {
        let root = std::env::temp_dir().join(format!("media-test-{}", Uuid::new_v4()));
        let store = test_store(root.clone());

        let first = store
            .save_location_image("image/png", b"first")
            .await
            .unwrap();
        let second = store
            .save_location_image("image/jpeg", b"second")
            .await
            .unwrap();

        store.remove_all(&[first.clone(), second.clone()]).await;
        assert!(!root.join(&first).exists());
        assert!(!root.join(&second).exists());

        tokio::fs::remove_dir_all(&root).await.ok();
    }
}
