//! Decoded images, kept by locator so that tiling the same image again
//! does not fetch and decode it a second time.
//!
//! The cache is bounded by the total size of the decoded rasters, and evicts
//! the least recently used images first. Concurrent requests for an image
//! that is not cached yet share a single load.

use std::future::Future;
use std::sync::Arc;

use image::DynamicImage;
use log::debug;
use moka::future::Cache;

use crate::TilerError;

pub type LoadedImage = Arc<DynamicImage>;

pub struct ImageCache {
    cache: Option<Cache<String, LoadedImage>>,
}

/// Size of the decoded raster in memory
fn weight(image: &DynamicImage) -> u32 {
    let bytes = u64::from(image.width())
        * u64::from(image.height())
        * u64::from(image.color().bytes_per_pixel());
    // moka weights are u32, very large images are capped
    bytes.min(u64::from(u32::MAX)) as u32
}

impl ImageCache {
    /// A cache holding at most `max_size_bytes` of decoded pixels.
    /// A size of zero disables caching.
    pub fn new(max_size_bytes: u64) -> Self {
        let cache = (max_size_bytes > 0).then(|| {
            Cache::builder()
                .weigher(|_uri: &String, image: &LoadedImage| weight(image))
                .max_capacity(max_size_bytes)
                .build()
        });
        ImageCache { cache }
    }

    pub fn disabled() -> Self {
        ImageCache { cache: None }
    }

    /// Return the cached image for `uri`, or run `load` to get it.
    /// Failed loads are not cached.
    pub async fn get_or_load<F>(&self, uri: &str, load: F) -> Result<LoadedImage, TilerError>
        where F: Future<Output=Result<LoadedImage, TilerError>>
    {
        match &self.cache {
            Some(cache) => {
                let image = cache.try_get_with(uri.to_string(), load).await?;
                debug!("{} images in the cache ({} bytes)", cache.entry_count(), cache.weighted_size());
                Ok(image)
            }
            None => load.await,
        }
    }

    pub async fn contains(&self, uri: &str) -> bool {
        match &self.cache {
            Some(cache) => cache.get(uri).await.is_some(),
            None => false,
        }
    }

    pub async fn size_bytes(&self) -> u64 {
        match &self.cache {
            Some(cache) => {
                cache.run_pending_tasks().await;
                cache.weighted_size()
            }
            None => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn image(width: u32, height: u32) -> LoadedImage {
        Arc::new(DynamicImage::new_rgba8(width, height))
    }

    #[tokio::test]
    async fn test_second_load_is_cached() {
        let cache = ImageCache::new(1024 * 1024);
        let loads = AtomicUsize::new(0);
        for _ in 0..3 {
            let img = cache.get_or_load("a.png", async {
                loads.fetch_add(1, Ordering::SeqCst);
                Ok(image(4, 4))
            }).await.unwrap();
            assert_eq!(img.width(), 4);
        }
        assert_eq!(loads.load(Ordering::SeqCst), 1);
        assert!(cache.contains("a.png").await);
        assert_eq!(cache.size_bytes().await, 4 * 4 * 4);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let cache = ImageCache::new(1024 * 1024);
        let failed = cache.get_or_load("bad.png", async {
            Err(TilerError::InvalidDataUrl { uri: "bad.png".into() })
        }).await;
        assert!(failed.is_err());
        assert!(!cache.contains("bad.png").await);
        let loaded = cache.get_or_load("bad.png", async { Ok(image(1, 1)) }).await;
        assert!(loaded.is_ok());
    }

    #[tokio::test]
    async fn test_disabled_cache_always_loads() {
        let cache = ImageCache::new(0);
        let loads = AtomicUsize::new(0);
        for _ in 0..2 {
            cache.get_or_load("a.png", async {
                loads.fetch_add(1, Ordering::SeqCst);
                Ok(image(1, 1))
            }).await.unwrap();
        }
        assert_eq!(loads.load(Ordering::SeqCst), 2);
        assert!(!cache.contains("a.png").await);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_concurrent_loads_are_shared() {
        let cache = Arc::new(ImageCache::new(1024 * 1024));
        let loads = Arc::new(AtomicUsize::new(0));
        let tasks = (0..8).map(|_| {
            let cache = Arc::clone(&cache);
            let loads = Arc::clone(&loads);
            tokio::spawn(async move {
                cache.get_or_load("same.png", async move {
                    loads.fetch_add(1, Ordering::SeqCst);
                    tokio::time::sleep(std::time::Duration::from_millis(50)).await;
                    Ok(image(3, 2))
                }).await
            })
        }).collect::<Vec<_>>();
        for task in tasks {
            let img = task.await.unwrap().unwrap();
            assert_eq!((img.width(), img.height()), (3, 2));
        }
        assert_eq!(loads.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_cache_is_bounded() {
        // room for a single 16x16 rgba image
        let cache = ImageCache::new(16 * 16 * 4);
        for uri in ["a.png", "b.png", "c.png"] {
            cache.get_or_load(uri, async { Ok(image(16, 16)) }).await.unwrap();
        }
        assert!(cache.size_bytes().await <= 16 * 16 * 4);
    }
}
