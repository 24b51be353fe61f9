use std::collections::HashMap;

use async_trait::async_trait;
use thiserror::Error;

use crate::value::Record;

#[derive(Debug, Error)]
pub enum SourceError {
    #[cfg(feature = "runtime")]
    #[error(transparent)]
    Mongo(#[from] mongodb::error::Error),

    #[error("collection '{0}' is unavailable")]
    Unavailable(String),
}

/// Read-only access to the named collections of a document store.
#[async_trait]
pub trait DocumentSource: Send + Sync {
    /// Fetches every record in `collection`, in storage order.
    async fn fetch_all(&self, collection: &str) -> Result<Vec<Record>, SourceError>;
}

/// In-memory collections, used for tests and offline runs.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    collections: HashMap<String, Vec<Record>>,
    failing: Vec<String>,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_collection(mut self, name: impl Into<String>, records: Vec<Record>) -> Self {
        self.collections.insert(name.into(), records);
        self
    }

    /// Makes every read of `name` fail with [`SourceError::Unavailable`].
    pub fn with_failing_collection(mut self, name: impl Into<String>) -> Self {
        self.failing.push(name.into());
        self
    }
}

#[async_trait]
impl DocumentSource for MemorySource {
    async fn fetch_all(&self, collection: &str) -> Result<Vec<Record>, SourceError> {
        if self.failing.iter().any(|name| name == collection) {
            return Err(SourceError::Unavailable(collection.to_string()));
        }
        // Like a document store, an unknown collection reads as empty.
        Ok(self.collections.get(collection).cloned().unwrap_or_default())
    }
}
