//! Saving customiser designs.
//!
//! A save writes the design row first, then decodes the browser's preview
//! (a base64 `data:` URL) and stores it as an image file. A preview that
//! cannot be decoded or stored never fails the save: the row stays without a
//! preview and a warning is logged.

use std::future::Future;

use base64::{Engine, engine::general_purpose::STANDARD};
use thiserror::Error;
use tracing::instrument;

use printshop_core::{DesignId, GarmentSize, ProductId, UserId};

use super::media::{MediaCategory, MediaError, MediaStorage, normalize_extension};
use crate::db::{DesignRepository, RepositoryError};
use crate::models::{Design, NewDesign};

/// Errors from decoding a preview data URL.
#[derive(Debug, Error)]
pub enum PreviewError {
    /// The value does not start with `data:` or has no `,` separator.
    #[error("not a data URL")]
    NotADataUrl,

    /// The data URL is not base64 encoded.
    #[error("data URL is not base64 encoded")]
    NotBase64,

    /// The media type is not an accepted image type.
    #[error("unsupported preview type: {0}")]
    UnsupportedType(String),

    /// The payload is not valid base64.
    #[error("invalid base64 payload: {0}")]
    Decode(#[from] base64::DecodeError),

    /// The payload decoded to nothing.
    #[error("preview is empty")]
    Empty,
}

/// A decoded preview image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedPreview {
    pub extension: &'static str,
    pub bytes: Vec<u8>,
}

/// Decode a `data:image/<type>;base64,<payload>` URL.
///
/// # Errors
///
/// Returns a `PreviewError` describing the first problem found.
pub fn decode_data_url(data_url: &str) -> Result<DecodedPreview, PreviewError> {
    let rest = data_url
        .trim()
        .strip_prefix("data:")
        .ok_or(PreviewError::NotADataUrl)?;
    let (header, payload) = rest.split_once(',').ok_or(PreviewError::NotADataUrl)?;

    let mut params = header.split(';');
    let media_type = params.next().unwrap_or_default().to_ascii_lowercase();
    if !params.any(|p| p.eq_ignore_ascii_case("base64")) {
        return Err(PreviewError::NotBase64);
    }

    let extension = media_type
        .strip_prefix("image/")
        .and_then(|subtype| normalize_extension(subtype).ok())
        .ok_or_else(|| PreviewError::UnsupportedType(media_type.clone()))?;

    let bytes = STANDARD.decode(payload)?;
    if bytes.is_empty() {
        return Err(PreviewError::Empty);
    }

    Ok(DecodedPreview { extension, bytes })
}

/// Storage for design rows.
pub trait DesignStore {
    /// Insert a design without a preview.
    fn insert_design(
        &self,
        new: &NewDesign,
    ) -> impl Future<Output = Result<Design, RepositoryError>> + Send;

    /// Record the stored preview path of a design.
    fn attach_preview(
        &self,
        id: DesignId,
        preview: &str,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

impl DesignStore for DesignRepository<'_> {
    fn insert_design(
        &self,
        new: &NewDesign,
    ) -> impl Future<Output = Result<Design, RepositoryError>> + Send {
        self.create(new)
    }

    fn attach_preview(
        &self,
        id: DesignId,
        preview: &str,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send {
        self.set_preview(id, preview)
    }
}

/// A design submitted from the customiser.
#[derive(Debug, Clone)]
pub struct DesignSubmission {
    pub user_id: UserId,
    pub product_id: ProductId,
    pub design_data: String,
    pub preview_data_url: String,
    pub size: Option<GarmentSize>,
}

#[derive(Debug, Error)]
enum PreviewFailure {
    #[error(transparent)]
    Decode(#[from] PreviewError),
    #[error(transparent)]
    Store(#[from] MediaError),
    #[error(transparent)]
    Record(#[from] RepositoryError),
}

/// Persist a design and, best effort, its preview image.
///
/// The returned design carries the preview path only if every preview step
/// succeeded.
///
/// # Errors
///
/// Returns `RepositoryError` only if the design row itself cannot be written.
#[instrument(
    skip(store, media, submission),
    fields(user_id = %submission.user_id, product_id = %submission.product_id)
)]
pub async fn save_design<S: DesignStore + Sync>(
    store: &S,
    media: &MediaStorage,
    submission: DesignSubmission,
) -> Result<Design, RepositoryError> {
    let mut design = store
        .insert_design(&NewDesign {
            user_id: submission.user_id,
            product_id: submission.product_id,
            design_data: submission.design_data,
            size: submission.size,
        })
        .await?;

    match store_preview(store, media, design.id, &submission.preview_data_url).await {
        Ok(path) => design.preview = Some(path),
        Err(e) => {
            tracing::warn!(design_id = %design.id, error = %e, "Design saved without preview");
        }
    }

    tracing::info!(design_id = %design.id, "Design saved");
    Ok(design)
}

async fn store_preview<S: DesignStore + Sync>(
    store: &S,
    media: &MediaStorage,
    id: DesignId,
    data_url: &str,
) -> Result<String, PreviewFailure> {
    let preview = decode_data_url(data_url)?;
    let path = media
        .store(MediaCategory::DesignPreviews, preview.extension, &preview.bytes)
        .await?;

    if let Err(e) = store.attach_preview(id, &path).await {
        // Nothing references the file once recording fails
        if let Err(remove) = media.remove(&path).await {
            tracing::warn!(path = %path, error = %remove, "Could not remove orphaned preview");
        }
        return Err(e.into());
    }

    Ok(path)
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use std::sync::Mutex;

    use chrono::Utc;

    use super::*;
    use crate::services::media::tests::{png_header, temp_storage};

    #[derive(Default)]
    struct FakeDesigns {
        rows: Mutex<Vec<Design>>,
        fail_attach: bool,
    }

    impl DesignStore for FakeDesigns {
        async fn insert_design(&self, new: &NewDesign) -> Result<Design, RepositoryError> {
            let mut rows = self.rows.lock().unwrap();
            let design = Design {
                id: DesignId::new(i32::try_from(rows.len()).unwrap() + 1),
                user_id: new.user_id,
                product_id: new.product_id,
                design_data: new.design_data.clone(),
                preview: None,
                size: new.size,
                created_at: Utc::now(),
            };
            rows.push(design.clone());
            Ok(design)
        }

        async fn attach_preview(&self, id: DesignId, preview: &str) -> Result<(), RepositoryError> {
            if self.fail_attach {
                return Err(RepositoryError::NotFound);
            }
            let mut rows = self.rows.lock().unwrap();
            let row = rows
                .iter_mut()
                .find(|d| d.id == id)
                .ok_or(RepositoryError::NotFound)?;
            row.preview = Some(preview.to_string());
            Ok(())
        }
    }

    fn submission(preview_data_url: String) -> DesignSubmission {
        DesignSubmission {
            user_id: UserId::new(4),
            product_id: ProductId::new(2),
            design_data: r#"{"elements":[]}"#.to_string(),
            preview_data_url,
            size: Some(GarmentSize::M),
        }
    }

    #[test]
    fn test_decode_png_data_url() {
        let bytes = png_header(4, 4);
        let url = format!("data:image/png;base64,{}", STANDARD.encode(&bytes));

        let preview = decode_data_url(&url).unwrap();
        assert_eq!(preview.extension, "png");
        assert_eq!(preview.bytes, bytes);
    }

    #[test]
    fn test_decode_rejects_malformed_urls() {
        assert!(matches!(
            decode_data_url("image/png;base64,AAAA"),
            Err(PreviewError::NotADataUrl)
        ));
        assert!(matches!(
            decode_data_url("data:image/png;base64"),
            Err(PreviewError::NotADataUrl)
        ));
        assert!(matches!(
            decode_data_url("data:image/png,AAAA"),
            Err(PreviewError::NotBase64)
        ));
        assert!(matches!(
            decode_data_url("data:text/html;base64,AAAA"),
            Err(PreviewError::UnsupportedType(_))
        ));
        assert!(matches!(
            decode_data_url("data:image/png;base64,%%%"),
            Err(PreviewError::Decode(_))
        ));
        assert!(matches!(
            decode_data_url("data:image/png;base64,"),
            Err(PreviewError::Empty)
        ));
    }

    #[tokio::test]
    async fn test_save_stores_preview() {
        let store = FakeDesigns::default();
        let media = temp_storage();
        let url = format!("data:image/png;base64,{}", STANDARD.encode(png_header(8, 8)));

        let design = save_design(&store, &media, submission(url)).await.unwrap();

        let path = design.preview.clone().unwrap();
        assert!(path.starts_with("design_previews/"));
        assert_eq!(store.rows.lock().unwrap()[0].preview, Some(path.clone()));
        assert!(media.root().join(&path).exists());

        tokio::fs::remove_dir_all(media.root()).await.unwrap();
    }

    #[tokio::test]
    async fn test_malformed_preview_keeps_row() {
        let store = FakeDesigns::default();
        let media = temp_storage();

        let design = save_design(&store, &media, submission("not a data url".to_string()))
            .await
            .unwrap();

        assert_eq!(design.preview, None);
        let rows = store.rows.lock().unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].design_data, r#"{"elements":[]}"#);
        assert_eq!(rows[0].size, Some(GarmentSize::M));
        assert!(!media.root().exists());
    }

    #[tokio::test]
    async fn test_unrecorded_preview_file_is_removed() {
        let store = FakeDesigns {
            fail_attach: true,
            ..FakeDesigns::default()
        };
        let media = temp_storage();
        let url = format!("data:image/png;base64,{}", STANDARD.encode(png_header(8, 8)));

        let design = save_design(&store, &media, submission(url)).await.unwrap();

        assert_eq!(design.preview, None);
        assert_eq!(store.rows.lock().unwrap().len(), 1);

        let dir = media.root().join(MediaCategory::DesignPreviews.dir());
        let mut entries = tokio::fs::read_dir(&dir).await.unwrap();
        assert!(entries.next_entry().await.unwrap().is_none());

        tokio::fs::remove_dir_all(media.root()).await.unwrap();
    }
}
