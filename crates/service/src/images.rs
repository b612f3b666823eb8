use std::path::{Path, PathBuf};
use std::sync::Arc;

use tokio::fs;
use tracing::info;
use uuid::Uuid;

use crate::errors::ServiceError;

/// Upload extensions accepted by the management service.
pub const ALLOWED_EXTENSIONS: &[&str] = &["png", "jpg", "jpeg", "gif", "webp"];

/// 图片存储：上传文件以 uuid 命名落盘，按文件名对外提供。
#[derive(Clone)]
pub struct ImageStore {
    dir: PathBuf,
}

impl ImageStore {
    pub async fn new<P: Into<PathBuf>>(dir: P) -> Result<Arc<Self>, ServiceError> {
        let dir = dir.into();
        fs::create_dir_all(&dir).await?;
        Ok(Arc::new(Self { dir }))
    }

    /// Directory the stored images live in; `/img/{name}` serves from here.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Validate the original filename, then persist the bytes under a
    /// collision-resistant generated name keeping the (lowercased)
    /// extension. Returns the stored name.
    pub async fn save(&self, original_name: &str, bytes: &[u8]) -> Result<String, ServiceError> {
        if original_name.is_empty() {
            return Err(ServiceError::Validation("文件名不能为空".into()));
        }
        if !is_allowed(original_name) {
            return Err(ServiceError::Validation(
                "仅支持png/jpg/jpeg/gif/webp格式".into(),
            ));
        }

        let safe = sanitize(original_name);
        let ext = extension(&safe).to_ascii_lowercase();
        let stored = format!("{}.{ext}", Uuid::new_v4().simple());

        fs::create_dir_all(&self.dir).await.ok();
        fs::write(self.dir.join(&stored), bytes).await?;
        info!(original = %original_name, stored = %stored, size = bytes.len(), "image stored");
        Ok(stored)
    }
}

fn is_allowed(name: &str) -> bool {
    ALLOWED_EXTENSIONS.contains(&extension(name).to_ascii_lowercase().as_str())
}

/// Extension without the dot; a leading-dot-only name has none.
fn extension(name: &str) -> &str {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    match base.rfind('.') {
        Some(i) if i > 0 => &base[i + 1..],
        _ => "",
    }
}

/// Keep only filesystem-safe characters; path separators were already
/// stripped by `extension`'s basename logic, this drops everything else.
fn sanitize(name: &str) -> String {
    let base = name.rsplit(['/', '\\']).next().unwrap_or(name);
    base.chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_store() -> Arc<ImageStore> {
        let dir = std::env::temp_dir().join(format!("img_{}", Uuid::new_v4()));
        ImageStore::new(&dir).await.expect("store init")
    }

    #[tokio::test]
    async fn save_stores_under_generated_name() -> Result<(), anyhow::Error> {
        let store = setup_store().await;
        let stored = store.save("团建照片 Lunch.PNG", b"fake-png").await?;

        assert_ne!(stored, "团建照片 Lunch.PNG");
        assert!(stored.ends_with(".png"));
        let bytes = fs::read(store.dir().join(&stored)).await?;
        assert_eq!(bytes, b"fake-png");

        // a second upload of the same name gets a distinct stored name
        let stored2 = store.save("团建照片 Lunch.PNG", b"fake-png").await?;
        assert_ne!(stored, stored2);
        Ok(())
    }

    #[tokio::test]
    async fn rejects_bad_filenames() {
        let store = setup_store().await;

        let err = store.save("", b"x").await.unwrap_err();
        assert_eq!(err.to_string(), "文件名不能为空");

        let err = store.save("notes.txt", b"x").await.unwrap_err();
        assert_eq!(err.to_string(), "仅支持png/jpg/jpeg/gif/webp格式");

        let err = store.save("no-extension", b"x").await.unwrap_err();
        assert_eq!(err.to_string(), "仅支持png/jpg/jpeg/gif/webp格式");

        // a bare dotfile has no extension to accept
        let err = store.save(".png", b"x").await.unwrap_err();
        assert_eq!(err.to_string(), "仅支持png/jpg/jpeg/gif/webp格式");
    }

    #[tokio::test]
    async fn path_components_are_stripped() -> Result<(), anyhow::Error> {
        let store = setup_store().await;
        let stored = store.save("../../etc/evil.jpg", b"x").await?;
        assert!(stored.ends_with(".jpg"));
        assert!(!stored.contains('/'));
        assert!(fs::metadata(store.dir().join(&stored)).await.is_ok());
        Ok(())
    }

    #[test]
    fn extension_handling() {
        assert_eq!(extension("a.b.PNG"), "PNG");
        assert_eq!(extension("noext"), "");
        assert_eq!(extension(".hidden"), "");
        assert_eq!(extension("dir/pic.gif"), "gif");
    }
}
