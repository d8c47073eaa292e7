use log::debug;

pub use data_url::{data_url, parse_data_url};
pub use png_encoder::encode_png;

use crate::TilerError;
use crate::tile::Tile;

pub mod data_url;
pub mod png_encoder;

/// Turns extracted tiles into transportable payloads
pub trait Encoder: Send + Sync + 'static {
    fn encode(&self, tile: &Tile) -> Result<String, TilerError>;
}

/// Encodes tiles as base64 PNG data URLs
#[derive(Debug, Clone, Copy)]
pub struct PngDataUrlEncoder {
    pub compression: u8,
}

impl Encoder for PngDataUrlEncoder {
    fn encode(&self, tile: &Tile) -> Result<String, TilerError> {
        let png = encode_png(&tile.image, self.compression)?;
        debug!("Encoded tile at {} ({} bytes of png)", tile.position, png.len());
        Ok(data_url(&png))
    }
}
