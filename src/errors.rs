use std::sync::Arc;

use custom_error::custom_error;
use reqwest::{self, header};
use tokio::sync::mpsc::error::SendError;

use crate::result::TilerEvent;

custom_error! {
    pub TilerError
    Networking{source: reqwest::Error} = "network error: {source}",
    Image{source: image::ImageError} = "invalid image error: {source}",
    Io{source: std::io::Error} = "Input/Output error: {source}",
    PngError{source: png::EncodingError} = "PNG encoding error: {source}",
    Base64{source: base64::DecodeError} = "invalid base64 payload: {source}",
    InvalidDataUrl{uri: String} = "Malformed data URL: '{uri}' \
                                   expected 'data:[<mime>][;base64],<data>'",
    InvalidTileSize{tile_size: u32} = "Invalid tile size {tile_size}: \
                                       tiles must be at least one pixel wide",
    TileCopyError{x: u32, y: u32, twidth: u32, theight: u32, width: u32, height: u32} =
                                "Unable to copy a {twidth}x{theight} window \
                                 at position {x},{y} \
                                 from an image of size {width}x{height}",
    InvalidHeaderName{source: header::InvalidHeaderName} = "Invalid header name: {source}",
    InvalidHeaderValue{source: header::InvalidHeaderValue} = "Invalid header value: {source}",
    AsyncError{source: tokio::task::JoinError} = "Unable get the result from a thread: {source}",
    Json{source: serde_json::Error} = "Unable to serialize the tiling result: {source}",
    ChannelClosed{source: SendError<TilerEvent>} = "Unable to deliver the tiling result: {source}",
    Load{source: Arc<TilerError>} = "{source}",
    FailedRequests{failed: u64, total: u64} = "{failed} out of {total} tiling requests failed",
}
