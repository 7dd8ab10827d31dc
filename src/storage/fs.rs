use async_trait::async_trait;
use bytes::Bytes;
use std::path::{Path, PathBuf};

use super::{validate_name, ObjectData, ObjectStore, StorageError, StoredObject};

/// A bucket kept as a directory on local disk.
///
/// Objects are served publicly under `public_prefix`.
pub struct FsBucket {
    bucket: String,
    root: PathBuf,
    public_prefix: String,
}

impl FsBucket {
    /// Open (creating if needed) `<base_dir>/<bucket>`.
    pub fn open(base_dir: &Path, bucket: &str, public_prefix: &str) -> Result<Self, StorageError> {
        validate_name(bucket).map_err(|_| StorageError::InvalidName(bucket.to_string()))?;
        let root = base_dir.join(bucket);
        std::fs::create_dir_all(&root)?;
        tracing::info!("Bucket {} at {}", bucket, root.display());

        Ok(Self {
            bucket: bucket.to_string(),
            root,
            public_prefix: public_prefix.trim_end_matches('/').to_string(),
        })
    }

    fn path_for(&self, name: &str) -> Result<PathBuf, StorageError> {
        validate_name(name)?;
        Ok(self.root.join(name))
    }
}

#[async_trait]
impl ObjectStore for FsBucket {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put(
        &self,
        name: &str,
        data: Bytes,
        content_type: &str,
    ) -> Result<StoredObject, StorageError> {
        let path = self.path_for(name)?;
        tokio::fs::write(&path, &data).await?;
        tracing::debug!(
            "Stored {} ({} bytes, {}) in bucket {}",
            name,
            data.len(),
            content_type,
            self.bucket
        );

        Ok(StoredObject {
            name: name.to_string(),
            public_url: format!("{}/{}", self.public_prefix, name),
            source_uri: format!("file://{}", path.display()),
        })
    }

    async fn get(&self, name: &str) -> Result<Option<ObjectData>, StorageError> {
        let path = self.path_for(name)?;
        match tokio::fs::read(&path).await {
            Ok(data) => Ok(Some(ObjectData {
                data: Bytes::from(data),
                content_type: mime_guess::from_path(&path)
                    .first_or_octet_stream()
                    .to_string(),
            })),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_writes_file_and_reports_urls() {
        let tmp = tempfile::tempdir().unwrap();
        let bucket = FsBucket::open(tmp.path(), "photos", "/media/").unwrap();

        let stored = bucket
            .put("cat.png", Bytes::from_static(b"png-bytes"), "image/png")
            .await
            .unwrap();

        assert_eq!(stored.name, "cat.png");
        assert_eq!(stored.public_url, "/media/cat.png");
        assert!(stored.source_uri.starts_with("file://"));
        assert_eq!(
            std::fs::read(tmp.path().join("photos/cat.png")).unwrap(),
            b"png-bytes"
        );
    }

    #[tokio::test]
    async fn get_returns_data_with_guessed_type() {
        let tmp = tempfile::tempdir().unwrap();
        let bucket = FsBucket::open(tmp.path(), "photos", "/media").unwrap();
        bucket
            .put("cat.png", Bytes::from_static(b"png-bytes"), "image/png")
            .await
            .unwrap();

        let object = bucket.get("cat.png").await.unwrap().unwrap();
        assert_eq!(&object.data[..], b"png-bytes");
        assert_eq!(object.content_type, "image/png");
        assert!(bucket.get("dog.png").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn rejects_names_outside_bucket() {
        let tmp = tempfile::tempdir().unwrap();
        let bucket = FsBucket::open(tmp.path(), "photos", "/media").unwrap();

        let result = bucket
            .put("../escape.png", Bytes::from_static(b"x"), "image/png")
            .await;
        assert!(matches!(result, Err(StorageError::InvalidName(_))));
        assert!(matches!(
            bucket.get("../escape.png").await,
            Err(StorageError::InvalidName(_))
        ));
    }

    #[test]
    fn reports_its_bucket_name() {
        let tmp = tempfile::tempdir().unwrap();
        let bucket = FsBucket::open(tmp.path(), "photos", "/media").unwrap();
        assert_eq!(bucket.bucket(), "photos");
        assert!(tmp.path().join("photos").is_dir());
    }

    #[test]
    fn open_rejects_bad_bucket_name() {
        let tmp = tempfile::tempdir().unwrap();
        assert!(FsBucket::open(tmp.path(), "../up", "/media").is_err());
    }
}
