//! Turning a selected file into a durable URL for the payload's `cvUrl`.

use crate::{Result, SubmitError};
use async_trait::async_trait;
use intake_core::FileRef;
use url::Url;

#[async_trait]
pub trait AttachmentResolver: Send + Sync {
    /// Return a URL that stays valid after the wizard exits.
    async fn resolve(&self, file: &FileRef) -> Result<String>;
}

/// Resolves to a `file://` URL of the canonical local path.
///
/// Suitable when the receiving side shares a filesystem with the wizard, and
/// for offline runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct LocalFileResolver;

#[async_trait]
impl AttachmentResolver for LocalFileResolver {
    async fn resolve(&self, file: &FileRef) -> Result<String> {
        let fail = |reason: String| SubmitError::Attachment {
            path: file.path().to_path_buf(),
            reason,
        };

        let path = tokio::fs::canonicalize(file.path())
            .await
            .map_err(|e| fail(e.to_string()))?;
        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|e| fail(e.to_string()))?;
        if !metadata.is_file() {
            return Err(fail("not a regular file".into()));
        }

        let url = Url::from_file_path(&path).map_err(|()| fail("path is not absolute".into()))?;
        tracing::debug!(file = %file.name, %url, "attachment resolved locally");
        Ok(url.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_resolves_existing_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cv.pdf");
        std::fs::write(&path, b"%PDF-1.4").unwrap();

        let url = LocalFileResolver
            .resolve(&FileRef::from_path(&path))
            .await
            .unwrap();
        assert!(url.starts_with("file://"));
        assert!(url.ends_with("/cv.pdf"));
    }

    #[tokio::test]
    async fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = FileRef::from_path(dir.path().join("nope.pdf"));
        let err = LocalFileResolver.resolve(&missing).await.unwrap_err();
        assert!(matches!(err, SubmitError::Attachment { .. }));
    }

    #[tokio::test]
    async fn test_directory_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let err = LocalFileResolver
            .resolve(&FileRef::from_path(dir.path()))
            .await
            .unwrap_err();
        assert_eq!(err.summary(), "not a regular file");
    }
}
