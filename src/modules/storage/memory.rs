//! In-memory object store used by tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::core::error::{AppError, Result};
use crate::modules::storage::FileStore;

#[derive(Default)]
pub struct MemoryStore {
    objects: Mutex<HashMap<String, Vec<u8>>>,
    /// Keys containing this marker fail on store, to exercise partial-batch
    /// upload behavior.
    fail_marker: Option<String>,
    /// When set, every delete fails, to exercise best-effort cleanup.
    fail_deletes: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_on(marker: &str) -> Self {
        Self {
            fail_marker: Some(marker.to_string()),
            ..Self::default()
        }
    }

    pub fn with_failing_deletes() -> Self {
        Self {
            fail_deletes: true,
            ..Self::default()
        }
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }
}

#[async_trait]
impl FileStore for MemoryStore {
    async fn store(&self, key: &str, data: Vec<u8>, _content_type: &str) -> Result<String> {
        if let Some(marker) = &self.fail_marker {
            if key.contains(marker.as_str()) {
                return Err(AppError::ExternalServiceError(format!(
                    "simulated storage failure for '{}'",
                    key
                )));
            }
        }
        self.objects.lock().unwrap().insert(key.to_string(), data);
        Ok(format!("memory://{}", key))
    }

    async fn delete(&self, key: &str) -> Result<()> {
        if self.fail_deletes {
            return Err(AppError::ExternalServiceError(format!(
                "simulated delete failure for '{}'",
                key
            )));
        }
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }
}
