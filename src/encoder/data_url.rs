use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::TilerError;

const PNG_DATA_URL_PREFIX: &str = "data:image/png;base64,";

/// Wrap png bytes in a data URL that can be used directly as an image source
pub fn data_url(png: &[u8]) -> String {
    let mut url = String::with_capacity(PNG_DATA_URL_PREFIX.len() + png.len() * 4 / 3 + 4);
    url.push_str(PNG_DATA_URL_PREFIX);
    STANDARD.encode_string(png, &mut url);
    url
}

/// Extract the payload of a `data:[<mime>][;base64],<data>` URL
pub fn parse_data_url(uri: &str) -> Result<Vec<u8>, TilerError> {
    let invalid = || TilerError::InvalidDataUrl { uri: uri.chars().take(64).collect() };
    let rest = uri.strip_prefix("data:").ok_or_else(invalid)?;
    let (header, payload) = rest.split_once(',').ok_or_else(invalid)?;
    if header.split(';').any(|param| param.eq_ignore_ascii_case("base64")) {
        let payload: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        Ok(STANDARD.decode(payload)?)
    } else {
        Ok(payload.as_bytes().to_vec())
    }
}

#[test]
fn test_data_url() {
    assert_eq!(data_url(b"abc"), "data:image/png;base64,YWJj");
    assert_eq!(parse_data_url("data:image/png;base64,YWJj").unwrap(), b"abc");
    assert_eq!(parse_data_url("data:;base64,YW Jj").unwrap(), b"abc");
    assert_eq!(parse_data_url("data:text/plain,hello").unwrap(), b"hello");
    assert!(parse_data_url("data:image/png;base64").is_err());
    assert!(parse_data_url("data:image/png;base64,!!!").is_err());
    assert!(parse_data_url("http://example.com").is_err());
}
