//! Environment/runtime helpers
//!
//! Sanity checks to ensure expected directories exist at startup.

use std::path::Path;
use tracing::warn;

/// Ensure the storage directories exist; warn when the assets directory is
/// missing so a misconfigured deployment still serves the API.
pub async fn ensure_env(assets_dir: &Path, data_dir: &Path) -> anyhow::Result<()> {
    if tokio::fs::metadata(assets_dir).await.is_err() {
        warn!(assets_dir = %assets_dir.display(), "assets directory not found; entry pages may 404");
    }
    tokio::fs::create_dir_all(data_dir)
        .await
        .map_err(|e| anyhow::anyhow!("cannot create {}: {e}", data_dir.display()))?;
    tokio::fs::create_dir_all(data_dir.join("img"))
        .await
        .map_err(|e| anyhow::anyhow!("cannot create image dir under {}: {e}", data_dir.display()))?;
    Ok(())
}
