//! Image reference validation.
//!
//! Before an item enters the store, each attached image URI is checked by
//! trying to load it. Failures drop that URI only; they never fail the
//! operation that carried it.

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;

use stockbook_inventory::ImageSet;

use crate::error::ImageError;

/// Something that can tell whether an image URI is loadable.
#[async_trait]
pub trait ImageLoader: Send + Sync {
    async fn load(&self, uri: &str) -> Result<(), ImageError>;
}

#[async_trait]
impl<L> ImageLoader for Arc<L>
where
    L: ImageLoader + ?Sized,
{
    async fn load(&self, uri: &str) -> Result<(), ImageError> {
        (**self).load(uri).await
    }
}

/// Loads images from the local filesystem.
///
/// Accepts `file://` URIs and plain paths. A URI is loadable when it names a
/// readable, non-empty regular file. Other schemes are rejected.
#[derive(Debug, Default, Clone, Copy)]
pub struct FsImageLoader;

impl FsImageLoader {
    pub fn new() -> Self {
        Self
    }

    fn resolve(uri: &str) -> Result<PathBuf, ImageError> {
        if let Some(path) = uri.strip_prefix("file://") {
            return Ok(PathBuf::from(path));
        }
        if uri.contains("://") || uri.trim().is_empty() {
            return Err(ImageError::UnsupportedScheme(uri.to_string()));
        }
        Ok(PathBuf::from(uri))
    }
}

#[async_trait]
impl ImageLoader for FsImageLoader {
    async fn load(&self, uri: &str) -> Result<(), ImageError> {
        let path = Self::resolve(uri)?;

        let metadata = tokio::fs::metadata(&path)
            .await
            .map_err(|source| ImageError::Unreadable {
                uri: uri.to_string(),
                source,
            })?;

        if !metadata.is_file() {
            return Err(ImageError::NotAFile(uri.to_string()));
        }
        if metadata.len() == 0 {
            return Err(ImageError::Empty(uri.to_string()));
        }
        Ok(())
    }
}

/// Drop every URI `loader` cannot load, checking them one at a time in order.
///
/// The main image is kept when it survives; otherwise the first survivor
/// becomes main.
pub async fn validate_images(loader: &dyn ImageLoader, mut images: ImageSet) -> ImageSet {
    let mut verdicts = Vec::with_capacity(images.len());

    for uri in images.uris() {
        match loader.load(uri).await {
            Ok(()) => verdicts.push(true),
            Err(err) => {
                tracing::warn!(uri = %uri, error = %err, "dropping image that failed to load");
                verdicts.push(false);
            }
        }
    }

    let mut verdicts = verdicts.into_iter();
    images.retain(|_| verdicts.next().unwrap_or(false));
    images
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    struct RejectContaining(&'static str);

    #[async_trait]
    impl ImageLoader for RejectContaining {
        async fn load(&self, uri: &str) -> Result<(), ImageError> {
            if uri.contains(self.0) {
                Err(ImageError::Rejected(uri.to_string()))
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn failing_uris_are_dropped() {
        let images = ImageSet::new(
            vec!["ok-a".into(), "broken-b".into(), "ok-c".into()],
            2,
        );

        let validated = validate_images(&RejectContaining("broken"), images).await;
        assert_eq!(validated.uris(), ["ok-a", "ok-c"]);
        assert_eq!(validated.main_uri(), Some("ok-c"));
    }

    #[tokio::test]
    async fn fs_loader_checks_files() {
        let dir = tempfile::tempdir().unwrap();
        let good = dir.path().join("good.png");
        let empty = dir.path().join("empty.png");
        std::fs::File::create(&good).unwrap().write_all(b"\x89PNG").unwrap();
        std::fs::File::create(&empty).unwrap();

        let loader = FsImageLoader::new();
        assert!(loader.load(good.to_str().unwrap()).await.is_ok());
        assert!(loader.load(&format!("file://{}", good.display())).await.is_ok());
        assert!(matches!(loader.load(empty.to_str().unwrap()).await, Err(ImageError::Empty(_))));
        assert!(matches!(
            loader.load(dir.path().to_str().unwrap()).await,
            Err(ImageError::NotAFile(_))
        ));
        assert!(matches!(
            loader.load(&format!("file://{}/missing.png", dir.path().display())).await,
            Err(ImageError::Unreadable { .. })
        ));
        assert!(matches!(
            loader.load("https://example.com/a.png").await,
            Err(ImageError::UnsupportedScheme(_))
        ));
    }
}
