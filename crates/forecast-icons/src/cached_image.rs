use std::sync::Arc;

use image::{DynamicImage, GenericImageView};

/// A decoded icon held by the cache.
///
/// Cloning is cheap and shares the pixels; no holder owns the image
/// exclusively.
#[derive(Clone)]
pub struct CachedImage {
    inner: Arc<DynamicImage>,
}

impl CachedImage {
    pub fn new(image: DynamicImage) -> Self {
        Self {
            inner: Arc::new(image),
        }
    }

    /// Decode an encoded image (PNG, JPEG).
    pub fn decode(bytes: &[u8]) -> Result<Self, image::ImageError> {
        image::load_from_memory(bytes).map(Self::new)
    }

    pub fn width(&self) -> u32 {
        self.inner.width()
    }

    pub fn height(&self) -> u32 {
        self.inner.height()
    }

    pub fn as_image(&self) -> &DynamicImage {
        &self.inner
    }

    /// True when both handles refer to the same decoded image.
    pub fn ptr_eq(&self, other: &CachedImage) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }
}

impl From<DynamicImage> for CachedImage {
    fn from(image: DynamicImage) -> Self {
        Self::new(image)
    }
}

impl std::fmt::Debug for CachedImage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedImage")
            .field("width", &self.width())
            .field("height", &self.height())
            .finish()
    }
}
