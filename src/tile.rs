use image::{DynamicImage, GenericImage, GenericImageView, RgbaImage};

use crate::{TilerError, Vec2d};

/// A square window of a source image, anchored at `position`
#[derive(Clone)]
pub struct Tile {
    pub image: RgbaImage,
    pub position: Vec2d,
}

impl Tile {
    /// Copy the `tile_size`x`tile_size` window starting at `position`.
    /// The part of the window that falls outside of the source stays transparent.
    pub fn extract(source: &DynamicImage, position: Vec2d, tile_size: u32) -> Result<Tile, TilerError> {
        let mut image = RgbaImage::new(tile_size, tile_size);
        let source_size = image_size(source);
        let Vec2d { x: width, y: height } = (source_size - position).min(tile_size);
        if width > 0 && height > 0 {
            let window = source.view(position.x, position.y, width, height);
            image.copy_from(&window, 0, 0).map_err(|_| TilerError::TileCopyError {
                x: position.x,
                y: position.y,
                twidth: width,
                theight: height,
                width: source_size.x,
                height: source_size.y,
            })?;
        }
        Ok(Tile { image, position })
    }

    pub fn size(&self) -> Vec2d { image_size(&self.image) }
}

pub fn image_size<T: GenericImageView>(image: &T) -> Vec2d {
    let (x, y) = image.dimensions();
    Vec2d { x, y }
}

impl std::fmt::Debug for Tile {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("Tile")
            .field("x", &self.position.x)
            .field("y", &self.position.y)
            .field("width", &self.image.width())
            .field("height", &self.image.height())
            .finish()
    }
}
