use std::collections::HashMap;
use std::sync::Arc;

use image::DynamicImage;
use log::debug;
use reqwest::{Client, header};
use tokio::fs;

use crate::arguments::Arguments;
use crate::encoder::parse_data_url;
use crate::TilerError;

/// Fetch data from an URL, a data URL, or a path to a local file.
/// If uri doesnt start with "http(s)://" or "data:", it is considered to be a path
/// to a local file
pub async fn fetch_uri(uri: &str, http: &Client) -> Result<Vec<u8>, TilerError> {
    if uri.starts_with("http://") || uri.starts_with("https://") {
        debug!("Loading url: '{}'", uri);
        let response = http.get(uri).send()
            .await?.error_for_status()?;
        let bytes = response.bytes().await?;
        debug!("Loaded url: '{}' ({} bytes)", uri, bytes.len());
        Ok(bytes.to_vec())
    } else if uri.starts_with("data:") {
        debug!("Decoding a data url of {} bytes", uri.len());
        parse_data_url(uri)
    } else {
        debug!("Loading file: '{}'", uri);
        let result = fs::read(uri).await?;
        debug!("Loaded file: '{}'", uri);
        Ok(result)
    }
}

/// Fetch and decode the image behind a locator.
/// Decoding happens on a blocking thread.
pub async fn load_image(uri: &str, http: &Client) -> Result<Arc<DynamicImage>, TilerError> {
    let bytes = fetch_uri(uri, http).await?;
    let image = tokio::task::spawn_blocking(move || {
        image::load_from_memory(&bytes)
    }).await??;
    debug!("Decoded '{}': {}x{}", uri, image.width(), image.height());
    Ok(Arc::new(image))
}

pub fn client<'a, I: Iterator<Item=(&'a String, &'a String)>>(
    headers: I,
    args: &Arguments,
) -> Result<reqwest::Client, TilerError> {
    let defaults = default_headers();
    let header_map = defaults
        .iter()
        .chain(headers.map(|(k, v)| (k, v)))
        .map(|(name, value)| Ok((name.parse()?, value.parse()?)))
        .collect::<Result<header::HeaderMap, TilerError>>()?;
    debug!("Creating an http client with the following headers: {:?}", header_map);
    let client = reqwest::Client::builder()
        .default_headers(header_map)
        .timeout(args.timeout)
        .connect_timeout(args.connect_timeout)
        .build()?;
    Ok(client)
}

pub fn default_headers() -> HashMap<String, String> {
    let user_agent = format!("{}/{}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
    HashMap::from([("User-Agent".to_string(), user_agent)])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fetch_data_url() {
        let http = Client::new();
        let bytes = fetch_uri("data:text/plain;base64,aGVsbG8=", &http).await.unwrap();
        assert_eq!(bytes, b"hello");
    }

    #[tokio::test]
    async fn test_fetch_missing_file() {
        let http = Client::new();
        let err = fetch_uri("/this/file/does/not/exist.png", &http).await.unwrap_err();
        assert!(matches!(err, TilerError::Io { .. }), "unexpected error: {}", err);
    }

    #[tokio::test]
    async fn test_load_invalid_image() {
        let http = Client::new();
        let err = load_image("data:image/png;base64,aGVsbG8=", &http).await.unwrap_err();
        assert!(matches!(err, TilerError::Image { .. }), "unexpected error: {}", err);
    }

    #[test]
    fn test_client_rejects_bad_header() {
        let args = Arguments::default();
        let name = "Bad Header".to_string();
        let value = "x".to_string();
        assert!(client(std::iter::once((&name, &value)), &args).is_err());
    }
}
