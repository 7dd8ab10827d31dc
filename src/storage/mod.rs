mod fs;

use async_trait::async_trait;
use bytes::Bytes;
use std::path::Path;

pub use self::fs::FsBucket;

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("invalid object name {0:?}")]
    InvalidName(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Where an uploaded object ended up.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub name: String,
    /// URL browsers load the image from
    pub public_url: String,
    /// Backend-native location, handed to the labeling service
    pub source_uri: String,
}

/// An object read back from a bucket.
#[derive(Debug, Clone)]
pub struct ObjectData {
    pub data: Bytes,
    pub content_type: String,
}

/// A bucket of publicly readable binary objects.
#[async_trait]
pub trait ObjectStore: Send + Sync {
    fn bucket(&self) -> &str;

    /// Store `data` under `name`, replacing any existing object.
    async fn put(
        &self,
        name: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<StoredObject, StorageError>;

    async fn get(&self, name: &str) -> Result<Option<ObjectData>, StorageError>;
}

/// Generate a fresh object name, keeping the upload's file extension.
pub fn object_name(filename: Option<&str>) -> String {
    let id = uuid::Uuid::now_v7();
    let ext = filename
        .and_then(|f| Path::new(f).extension())
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .filter(|e| !e.is_empty() && e.len() <= 8 && e.chars().all(|c| c.is_ascii_alphanumeric()));

    match ext {
        Some(ext) => format!("{}.{}", id, ext),
        None => id.to_string(),
    }
}

/// Object names are flat: no separators, no dot-prefixed names.
pub fn validate_name(name: &str) -> Result<(), StorageError> {
    let valid = !name.is_empty()
        && !name.starts_with('.')
        && !name.contains(['/', '\\'])
        && !name.contains("..")
        && !name.chars().any(|c| c.is_control());
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidName(name.to_string()))
    }
}
