//! File storage capability
//!
//! Certificate files are resolved through this seam so constrained targets
//! can back it with whatever medium they have (flash, SD, an in-memory
//! bundle). The default reads from the local filesystem.

use async_trait::async_trait;
use gforms_domain::{GFormsError, Result};

/// Read-only file access for trust material
#[async_trait]
pub trait FileStorage: Send + Sync {
    /// Read the full contents of `path`
    async fn read(&self, path: &str) -> Result<Vec<u8>>;
}

/// Local filesystem storage
#[derive(Debug, Default, Clone, Copy)]
pub struct LocalStorage;

#[async_trait]
impl FileStorage for LocalStorage {
    async fn read(&self, path: &str) -> Result<Vec<u8>> {
        tokio::fs::read(path)
            .await
            .map_err(|e| GFormsError::Storage(format!("failed to read {path}: {e}")))
    }
}
