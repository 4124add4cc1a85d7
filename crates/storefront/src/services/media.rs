//! Uploaded media on the local filesystem.
//!
//! Files live under the media root in one directory per category and are
//! named with a random UUID, so stored paths never contain user input. The
//! returned relative path (`products/<uuid>.png`) is what the database keeps
//! and what `/media/...` serves.

use std::path::{Path, PathBuf};

use thiserror::Error;
use uuid::Uuid;

/// Image extensions accepted for uploads and previews.
pub const IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "webp"];

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

/// Errors from storing media files.
#[derive(Debug, Error)]
pub enum MediaError {
    /// The upload had no content.
    #[error("file is empty")]
    Empty,

    /// The file is not one of the accepted image types.
    #[error("unsupported image type: {0}")]
    UnsupportedType(String),

    /// Writing to the media root failed.
    #[error("media storage I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Directory a stored file belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaCategory {
    /// Product display images.
    Products,
    /// Customiser template images.
    Templates,
    /// Rendered design previews.
    DesignPreviews,
}

impl MediaCategory {
    /// Directory name under the media root.
    #[must_use]
    pub const fn dir(self) -> &'static str {
        match self {
            Self::Products => "products",
            Self::Templates => "templates",
            Self::DesignPreviews => "design_previews",
        }
    }
}

/// File storage rooted at the configured media directory.
#[derive(Debug, Clone)]
pub struct MediaStorage {
    root: PathBuf,
}

impl MediaStorage {
    /// Create storage rooted at `root`. Directories are created on first write.
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// The media root.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `bytes` as a new file and return its path relative to the root.
    ///
    /// The file is written under a temporary name and renamed into place, so
    /// a partially written file is never visible under its final name.
    ///
    /// # Errors
    ///
    /// Returns `MediaError::Empty` for no content,
    /// `MediaError::UnsupportedType` for a non-image extension, or
    /// `MediaError::Io` if the write fails.
    pub async fn store(
        &self,
        category: MediaCategory,
        extension: &str,
        bytes: &[u8],
    ) -> Result<String, MediaError> {
        if bytes.is_empty() {
            return Err(MediaError::Empty);
        }
        let extension = normalize_extension(extension)?;

        let dir = self.root.join(category.dir());
        tokio::fs::create_dir_all(&dir).await?;

        let name = format!("{}.{extension}", Uuid::new_v4().simple());
        let partial = dir.join(format!(".{name}.part"));
        tokio::fs::write(&partial, bytes).await?;

        if let Err(e) = tokio::fs::rename(&partial, dir.join(&name)).await {
            let _ = tokio::fs::remove_file(&partial).await;
            return Err(e.into());
        }

        let relative = format!("{}/{name}", category.dir());
        tracing::debug!(path = %relative, size = bytes.len(), "Stored media file");
        Ok(relative)
    }

    /// Delete a file previously returned by [`Self::store`].
    ///
    /// # Errors
    ///
    /// Returns `MediaError::Io` if the file cannot be removed.
    pub async fn remove(&self, relative: &str) -> Result<(), MediaError> {
        tokio::fs::remove_file(self.root.join(relative)).await?;
        tracing::debug!(path = %relative, "Removed media file");
        Ok(())
    }
}

/// Lowercase an extension and check it is an accepted image type.
///
/// # Errors
///
/// Returns `MediaError::UnsupportedType` otherwise.
pub fn normalize_extension(extension: &str) -> Result<&'static str, MediaError> {
    let lower = extension.trim_start_matches('.').to_ascii_lowercase();
    IMAGE_EXTENSIONS
        .iter()
        .find(|ext| **ext == lower)
        .copied()
        .ok_or(MediaError::UnsupportedType(lower))
}

/// Extension of an uploaded file name, checked against the accepted types.
///
/// # Errors
///
/// Returns `MediaError::UnsupportedType` if the name has no accepted extension.
pub fn upload_extension(file_name: &str) -> Result<&'static str, MediaError> {
    let extension = Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .ok_or_else(|| MediaError::UnsupportedType(file_name.to_string()))?;
    normalize_extension(extension)
}

/// Pixel size read from a PNG header, or `None` for anything else.
#[must_use]
pub fn png_dimensions(bytes: &[u8]) -> Option<(u32, u32)> {
    // Signature, then the IHDR chunk: length, type, width, height.
    if bytes.get(..8)? != PNG_SIGNATURE || bytes.get(12..16)? != *b"IHDR" {
        return None;
    }
    let width = u32::from_be_bytes(bytes.get(16..20)?.try_into().ok()?);
    let height = u32::from_be_bytes(bytes.get(20..24)?.try_into().ok()?);

    (width > 0 && height > 0).then_some((width, height))
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
pub(crate) mod tests {
    use super::*;

    /// A PNG header (signature and IHDR) for an image of the given size.
    pub(crate) fn png_header(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = PNG_SIGNATURE.to_vec();
        bytes.extend_from_slice(&13u32.to_be_bytes());
        bytes.extend_from_slice(b"IHDR");
        bytes.extend_from_slice(&width.to_be_bytes());
        bytes.extend_from_slice(&height.to_be_bytes());
        bytes.extend_from_slice(&[8, 6, 0, 0, 0]);
        bytes
    }

    pub(crate) fn temp_storage() -> MediaStorage {
        MediaStorage::new(std::env::temp_dir().join(format!("printshop-media-{}", Uuid::new_v4())))
    }

    #[test]
    fn test_png_dimensions() {
        assert_eq!(png_dimensions(&png_header(600, 700)), Some((600, 700)));
    }

    #[test]
    fn test_png_dimensions_rejects_other_data() {
        assert_eq!(png_dimensions(b"GIF89a..."), None);
        assert_eq!(png_dimensions(&png_header(600, 700)[..20]), None);
        assert_eq!(png_dimensions(&png_header(0, 700)), None);
    }

    #[test]
    fn test_extensions() {
        assert_eq!(upload_extension("Shirt.PNG").unwrap(), "png");
        assert_eq!(upload_extension("photo.jpeg").unwrap(), "jpeg");
        assert!(matches!(
            upload_extension("notes.txt"),
            Err(MediaError::UnsupportedType(_))
        ));
        assert!(upload_extension("no-extension").is_err());
    }

    #[tokio::test]
    async fn test_store_writes_under_category() {
        let storage = temp_storage();
        let bytes = png_header(10, 10);

        let path = storage
            .store(MediaCategory::DesignPreviews, "PNG", &bytes)
            .await
            .unwrap();

        assert!(path.starts_with("design_previews/"));
        assert!(path.ends_with(".png"));
        let written = tokio::fs::read(storage.root().join(&path)).await.unwrap();
        assert_eq!(written, bytes);

        tokio::fs::remove_dir_all(storage.root()).await.unwrap();
    }

    #[tokio::test]
    async fn test_store_rejects_empty() {
        let storage = temp_storage();
        assert!(matches!(
            storage.store(MediaCategory::Products, "png", &[]).await,
            Err(MediaError::Empty)
        ));
    }
}
