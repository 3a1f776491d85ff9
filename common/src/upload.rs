use crate::error::DraftError;

/// Most images a product can carry.
pub const MAX_IMAGES: usize = 3;
/// Largest accepted image, inclusive.
pub const MAX_IMAGE_BYTES: u64 = 2 * 1024 * 1024;

/// A file picked by the user, as far as upload validation cares.
///
/// Handles are cloned into the multipart payload, so cloning must be cheap
/// (browser `File` objects are reference counted).
pub trait ImageFile: Clone {
    fn name(&self) -> &str;
    /// MIME type reported by the picker, e.g. `image/png`.
    fn content_type(&self) -> &str;
    fn size(&self) -> u64;

    fn is_image(&self) -> bool {
        self.content_type()
            .get(..6)
            .is_some_and(|prefix| prefix.eq_ignore_ascii_case("image/"))
    }
}

/// Check a picker batch. Any bad file rejects the whole batch.
pub fn validate_batch<F: ImageFile>(files: &[F]) -> Result<(), DraftError> {
    if files.len() > MAX_IMAGES {
        return Err(DraftError::TooManyImages { max: MAX_IMAGES });
    }
    if let Some(bad) = files
        .iter()
        .find(|f| !f.is_image() || f.size() > MAX_IMAGE_BYTES)
    {
        tracing::debug!(
            "Rejecting image batch: {} ({}, {} bytes)",
            bad.name(),
            bad.content_type(),
            bad.size()
        );
        return Err(DraftError::InvalidImage {
            max_mb: MAX_IMAGE_BYTES / (1024 * 1024),
        });
    }
    Ok(())
}
