//! Weather icon loading for the forecast screen.
//!
//! A read-through image cache keyed by icon identifier: synchronous
//! lookups, asynchronous downloads that report back through a completion
//! callback, and explicit stores by the caller.

pub mod cache;
pub mod cached_image;
pub mod error;
pub mod fetcher;
pub mod loader;
pub mod retry;

pub use cache::{ImageCache, MemoryImageCache};
pub use cached_image::CachedImage;
pub use error::IconError;
pub use fetcher::{HttpImageFetcher, ImageFetcher};
pub use loader::ImageCacheLoader;
pub use retry::RetryConfig;
