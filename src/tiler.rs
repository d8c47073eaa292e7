use std::sync::Arc;

use futures::stream::{self, StreamExt};
use image::DynamicImage;
use log::{debug, info, warn};
use reqwest::Client;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use crate::TilerError;
use crate::arguments::Arguments;
use crate::encoder::{Encoder, PngDataUrlEncoder};
use crate::grid::TileGrid;
use crate::image_cache::{ImageCache, LoadedImage};
use crate::network::{client, load_image};
use crate::result::{ResultShape, TileRecord, TileResult, TilerEvent, TilingRequest};
use crate::tile::{image_size, Tile};

/// Edge length of the tiles, in pixels, unless configured otherwise
pub const TILE_SIZE: u32 = 2048;

#[derive(Debug, Clone, Copy)]
pub struct TilerConfig {
    pub tile_size: u32,
    pub shape: ResultShape,
    /// Maximum number of requests processed at the same time by [Tiler::serve]
    pub parallelism: usize,
}

impl Default for TilerConfig {
    fn default() -> Self {
        TilerConfig { tile_size: TILE_SIZE, shape: ResultShape::Tiles, parallelism: 4 }
    }
}

/// Cuts `image` into a row-major list of `tile_size`x`tile_size` tiles,
/// and encodes each of them.
pub fn tile_image(
    image: &DynamicImage,
    tile_size: u32,
    shape: ResultShape,
    encoder: &dyn Encoder,
) -> Result<TileResult, TilerError> {
    if tile_size == 0 {
        return Err(TilerError::InvalidTileSize { tile_size });
    }
    let size = image_size(image);
    let grid = TileGrid::new(size, tile_size);
    debug!("Cutting an image of size {} into {} tiles", size, grid.tile_count());
    let tiles = grid
        .map(|position| {
            let tile = Tile::extract(image, position, tile_size)?;
            let url = encoder.encode(&tile)?;
            Ok(TileRecord { x: position.x, y: position.y, url })
        })
        .collect::<Result<Vec<_>, TilerError>>()?;
    Ok(TileResult::new(shape, size, tiles))
}

struct TilerInner {
    config: TilerConfig,
    http: Client,
    cache: ImageCache,
    encoder: Box<dyn Encoder>,
    sink: mpsc::Sender<TilerEvent>,
}

/// Loads images and reports their tiles on a channel.
///
/// Every request produces exactly one [TilerEvent] on the sink, once all its
/// tiles are ready or once it failed.
#[derive(Clone)]
pub struct Tiler {
    inner: Arc<TilerInner>,
}

impl Tiler {
    pub fn new(
        config: TilerConfig,
        http: Client,
        cache: ImageCache,
        encoder: Box<dyn Encoder>,
        sink: mpsc::Sender<TilerEvent>,
    ) -> Result<Self, TilerError> {
        if config.tile_size == 0 {
            return Err(TilerError::InvalidTileSize { tile_size: config.tile_size });
        }
        let inner = TilerInner { config, http, cache, encoder, sink };
        Ok(Tiler { inner: Arc::new(inner) })
    }

    pub fn from_args(args: &Arguments, sink: mpsc::Sender<TilerEvent>) -> Result<Self, TilerError> {
        let config = TilerConfig {
            tile_size: args.tile_size,
            shape: args.shape,
            parallelism: args.parallelism,
        };
        let http = client(args.headers(), args)?;
        let cache = ImageCache::new(args.cache_size.saturating_mul(1024 * 1024));
        let encoder = Box::new(PngDataUrlEncoder { compression: args.compression });
        Tiler::new(config, http, cache, encoder, sink)
    }

    pub fn cache(&self) -> &ImageCache {
        &self.inner.cache
    }

    async fn load(&self, source: &str) -> Result<LoadedImage, TilerError> {
        let http = &self.inner.http;
        self.inner.cache.get_or_load(source, load_image(source, http)).await
    }

    /// Load the image at `source` and cut it into tiles
    pub async fn tile(&self, source: &str) -> Result<TileResult, TilerError> {
        let image = self.load(source).await?;
        let inner = Arc::clone(&self.inner);
        tokio::task::spawn_blocking(move || {
            let TilerConfig { tile_size, shape, .. } = inner.config;
            tile_image(&image, tile_size, shape, inner.encoder.as_ref())
        }).await?
    }

    /// Tile the image and send the outcome to the sink
    async fn deliver(&self, source: String) {
        let event = match self.tile(&source).await {
            Ok(result) => {
                info!("Cut '{}' into {} tiles", source, result.len());
                TilerEvent::TilesReady { source, result }
            }
            Err(e) => {
                warn!("Unable to tile '{}': {}", source, e);
                TilerEvent::TilingFailed { source, reason: e.to_string() }
            }
        };
        if let Err(e) = self.inner.sink.send(event).await {
            warn!("{}", TilerError::ChannelClosed { source: e });
        }
    }

    /// Start tiling the image at `source` in the background.
    /// The result is sent to the sink when it is ready.
    pub fn request_tiling<S: Into<String>>(&self, source: S) -> JoinHandle<()> {
        let tiler = self.clone();
        let source = source.into();
        debug!("Received a tiling request for '{}'", source);
        tokio::spawn(async move { tiler.deliver(source).await })
    }

    /// Handle every request received on the channel, until it is closed
    /// and all the pending requests have been answered.
    pub async fn serve(self, requests: mpsc::Receiver<TilingRequest>) {
        let parallelism = self.inner.config.parallelism.max(1);
        let requests = stream::unfold(requests, |mut requests| async move {
            requests.recv().await.map(|request| (request, requests))
        });
        requests
            .for_each_concurrent(parallelism, |TilingRequest { source }| {
                let task = self.request_tiling(source);
                async move {
                    if let Err(e) = task.await {
                        warn!("Tiling task failed: {}", e);
                    }
                }
            })
            .await;
        debug!("The request channel is closed");
    }
}
