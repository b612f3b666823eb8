//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` to keep binary crates importing
//! `service::runtime::ensure_env` without depending directly on `common`.

use std::path::Path;

/// Ensure the storage directories exist; warn on a missing assets directory.
pub async fn ensure_env(assets_dir: &Path, data_dir: &Path) -> anyhow::Result<()> {
    common::env::ensure_env(assets_dir, data_dir).await
}
