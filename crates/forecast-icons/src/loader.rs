//! Read-through icon loader.

use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use url::Url;

use crate::cache::{ImageCache, MemoryImageCache};
use crate::cached_image::CachedImage;
use crate::error::IconError;
use crate::fetcher::{HttpImageFetcher, ImageFetcher};

/// Looks icons up in a shared cache and downloads misses in the background.
///
/// `fetch` never stores: the caller decides whether a downloaded image is
/// still wanted and calls `store` itself. Downloads can't be cancelled and
/// two downloads for the same key race; whichever `store` runs last wins.
pub struct ImageCacheLoader<C = MemoryImageCache, F = HttpImageFetcher> {
    cache: Arc<C>,
    fetcher: Arc<F>,
    runtime: Handle,
}

impl<C, F> Clone for ImageCacheLoader<C, F> {
    fn clone(&self) -> Self {
        Self {
            cache: Arc::clone(&self.cache),
            fetcher: Arc::clone(&self.fetcher),
            runtime: self.runtime.clone(),
        }
    }
}

impl<C, F> ImageCacheLoader<C, F>
where
    C: ImageCache + 'static,
    F: ImageFetcher,
{
    /// Downloads are spawned on `runtime`, so the loader can be driven
    /// from threads outside it.
    pub fn new(cache: Arc<C>, fetcher: Arc<F>, runtime: Handle) -> Self {
        Self {
            cache,
            fetcher,
            runtime,
        }
    }

    pub fn cache(&self) -> &Arc<C> {
        &self.cache
    }

    /// Cached icon for `key`, without blocking.
    pub fn fetch_cached(&self, key: &str) -> Option<CachedImage> {
        let hit = self.cache.get(key);
        if hit.is_some() {
            tracing::debug!("Icon cache hit for {}", key);
        } else {
            tracing::debug!("Icon cache miss for {}", key);
        }
        hit
    }

    /// Download `url` in the background.
    ///
    /// `completion` runs exactly once on a runtime worker thread, with the
    /// decoded image or the reason the download failed. Dropping the
    /// returned handle does not cancel the download.
    pub fn fetch<CB>(&self, url: Url, completion: CB) -> JoinHandle<()>
    where
        CB: FnOnce(Result<CachedImage, IconError>) + Send + 'static,
    {
        let fetcher = Arc::clone(&self.fetcher);
        let download = self.runtime.spawn(async move { fetcher.fetch(&url).await });

        self.runtime.spawn(async move {
            let result = match download.await {
                Ok(result) => result,
                Err(e) => Err(IconError::Task(e.to_string())),
            };
            if let Err(e) = &result {
                tracing::warn!("Icon download failed: {}", e);
            }
            completion(result);
        })
    }

    /// Insert or overwrite the icon for `key`.
    pub fn store(&self, key: &str, image: CachedImage) {
        self.cache.set(key, image);
    }

    /// Cached icon for `key`, downloading and storing it on a miss.
    pub async fn load(&self, key: &str, url: &Url) -> Result<CachedImage, IconError> {
        if let Some(image) = self.fetch_cached(key) {
            return Ok(image);
        }

        let image = self.fetcher.fetch(url).await?;
        self.store(key, image.clone());
        Ok(image)
    }
}
