use image::RgbaImage;

use crate::TilerError;

/// Maps a compression level between 0 and 100 to the png crate's presets
pub fn png_compression(compression: u8) -> png::Compression {
    match compression {
        0..=19 => png::Compression::Fast,
        20..=60 => png::Compression::Default,
        _ => png::Compression::Best,
    }
}

/// Encode an RGBA raster as an 8-bit RGBA PNG file held in memory
pub fn encode_png(image: &RgbaImage, compression: u8) -> Result<Vec<u8>, TilerError> {
    let mut bytes = Vec::new();
    let mut encoder = png::Encoder::new(&mut bytes, image.width(), image.height());
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);
    encoder.set_compression(png_compression(compression));
    let mut writer = encoder.write_header()?;
    writer.write_image_data(image.as_raw())?;
    writer.finish()?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use image::{GenericImageView, Rgba};
    use itertools::Itertools;

    use super::*;

    #[test]
    fn test_png_create() {
        let mut image = RgbaImage::new(2, 2);
        image.put_pixel(0, 1, Rgba([1, 2, 3, 4]));
        let bytes = encode_png(&image, 1).unwrap();
        let decoded = image::load_from_memory_with_format(&bytes, image::ImageFormat::Png).unwrap();
        assert_eq!(decoded.dimensions(), (2, 2));
        let empty = Rgba::from([0u8, 0, 0, 0]);
        assert_eq!(
            decoded.to_rgba8().pixels().copied().collect_vec(),
            vec![
                empty, empty,
                Rgba::from([1, 2, 3, 4]), empty,
            ]
        );
    }

    #[test]
    fn test_compression_levels_decode_identically() {
        let image = RgbaImage::from_fn(16, 16, |x, y| Rgba([x as u8 * 16, y as u8 * 16, 0, 255]));
        let fast = encode_png(&image, 0).unwrap();
        let best = encode_png(&image, 100).unwrap();
        let decode = |b: &[u8]| image::load_from_memory(b).unwrap().to_rgba8();
        assert_eq!(decode(&fast), image);
        assert_eq!(decode(&best), image);
    }
}
