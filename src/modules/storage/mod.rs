//! External file-storage collaborator.
//!
//! The marketplace core only records and forgets references to stored
//! objects; the bytes live behind the [`FileStore`] trait.

pub mod minio;

#[cfg(test)]
pub mod memory;

use async_trait::async_trait;

use crate::core::error::Result;

pub use minio::MinioStore;

/// Boundary contract for the object store.
#[async_trait]
pub trait FileStore: Send + Sync {
    /// Store `data` under `key` and return a download URL for it.
    async fn store(&self, key: &str, data: Vec<u8>, content_type: &str) -> Result<String>;

    /// Remove the object stored under `key`.
    async fn delete(&self, key: &str) -> Result<()>;
}
