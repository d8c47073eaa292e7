use std::str::FromStr;

use serde::Serialize;

use crate::Vec2d;

/// One encoded tile, with the position of its top-left corner in the source image
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TileRecord {
    pub x: u32,
    pub y: u32,
    pub url: String,
}

/// The layout in which tiling results are reported
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResultShape {
    /// `[{x, y, url}, ...]`
    #[default]
    Tiles,
    /// `{width, height, urls}`, positions are implied by the index and the tile size
    Urls,
}

impl FromStr for ResultShape {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tiles" => Ok(ResultShape::Tiles),
            "urls" => Ok(ResultShape::Urls),
            _ => Err(format!("Invalid result shape '{}'. Expected 'tiles' or 'urls'", s)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum TileResult {
    Tiles(Vec<TileRecord>),
    Urls { width: u32, height: u32, urls: Vec<String> },
}

impl TileResult {
    /// Arrange tiles, listed in row-major order, in the requested shape
    pub fn new(shape: ResultShape, image_size: Vec2d, tiles: Vec<TileRecord>) -> Self {
        match shape {
            ResultShape::Tiles => TileResult::Tiles(tiles),
            ResultShape::Urls => TileResult::Urls {
                width: image_size.x,
                height: image_size.y,
                urls: tiles.into_iter().map(|t| t.url).collect(),
            },
        }
    }

    pub fn len(&self) -> usize {
        match self {
            TileResult::Tiles(tiles) => tiles.len(),
            TileResult::Urls { urls, .. } => urls.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A request to tile the image at `source`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TilingRequest {
    pub source: String,
}

impl From<String> for TilingRequest {
    fn from(source: String) -> Self {
        TilingRequest { source }
    }
}

impl From<&str> for TilingRequest {
    fn from(source: &str) -> Self {
        TilingRequest { source: source.to_string() }
    }
}

/// What the tiler reports back, once per request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TilerEvent {
    TilesReady { source: String, result: TileResult },
    TilingFailed { source: String, reason: String },
}

impl TilerEvent {
    pub fn source(&self) -> &str {
        match self {
            TilerEvent::TilesReady { source, .. } => source,
            TilerEvent::TilingFailed { source, .. } => source,
        }
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, TilerEvent::TilingFailed { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<TileRecord> {
        vec![
            TileRecord { x: 0, y: 0, url: "a".into() },
            TileRecord { x: 2048, y: 0, url: "b".into() },
        ]
    }

    #[test]
    fn test_tiles_shape() {
        let result = TileResult::new(ResultShape::Tiles, Vec2d { x: 4096, y: 10 }, records());
        assert_eq!(
            serde_json::to_string(&result).unwrap(),
            r#"[{"x":0,"y":0,"url":"a"},{"x":2048,"y":0,"url":"b"}]"#
        );
    }

    #[test]
    fn test_urls_shape() {
        let result = TileResult::new(ResultShape::Urls, Vec2d { x: 4096, y: 10 }, records());
        assert_eq!(result.len(), 2);
        assert_eq!(
            serde_json::to_string(&result).unwrap(),
            r#"{"width":4096,"height":10,"urls":["a","b"]}"#
        );
    }

    #[test]
    fn test_events() {
        let ready = TilerEvent::TilesReady {
            source: "img.png".into(),
            result: TileResult::Tiles(vec![]),
        };
        assert_eq!(
            serde_json::to_string(&ready).unwrap(),
            r#"{"event":"tiles_ready","source":"img.png","result":[]}"#
        );
        let failed = TilerEvent::TilingFailed { source: "x".into(), reason: "nope".into() };
        assert!(failed.is_failure());
        assert_eq!(
            serde_json::to_string(&failed).unwrap(),
            r#"{"event":"tiling_failed","source":"x","reason":"nope"}"#
        );
    }

    #[test]
    fn test_parse_shape() {
        assert_eq!("tiles".parse::<ResultShape>(), Ok(ResultShape::Tiles));
        assert_eq!("urls".parse::<ResultShape>(), Ok(ResultShape::Urls));
        assert!("grid".parse::<ResultShape>().is_err());
    }
}
