use crate::Vec2d;

/// The origins of the tiles covering an image, in row-major order:
/// left to right, then top to bottom.
#[derive(Debug, Clone)]
pub struct TileGrid {
    image_size: Vec2d,
    tile_size: u32,
    next: Option<Vec2d>,
}

impl TileGrid {
    /// `tile_size` must not be zero
    pub fn new(image_size: Vec2d, tile_size: u32) -> Self {
        assert!(tile_size > 0, "tile size must be positive");
        let next = if image_size.is_empty() { None } else { Some(Vec2d::default()) };
        TileGrid { image_size, tile_size, next }
    }

    /// Number of tiles along each axis
    pub fn dimensions(&self) -> Vec2d {
        self.image_size.ceil_div(self.tile_size)
    }

    pub fn tile_count(&self) -> u64 {
        self.dimensions().area()
    }

    /// Position of the tile with the given index in iteration order
    pub fn origin_at(&self, index: u64) -> Option<Vec2d> {
        let Vec2d { x: columns, .. } = self.dimensions();
        if index >= self.tile_count() { return None; }
        let column = (index % u64::from(columns)) as u32;
        let row = (index / u64::from(columns)) as u32;
        Some(Vec2d { x: column, y: row } * self.tile_size)
    }
}

impl Iterator for TileGrid {
    type Item = Vec2d;

    fn next(&mut self) -> Option<Vec2d> {
        let current = self.next?;
        let step = u64::from(self.tile_size);
        self.next = if u64::from(current.x) + step < u64::from(self.image_size.x) {
            Some(Vec2d { x: current.x + self.tile_size, y: current.y })
        } else if u64::from(current.y) + step < u64::from(self.image_size.y) {
            Some(Vec2d { x: 0, y: current.y + self.tile_size })
        } else {
            None
        };
        Some(current)
    }
}
