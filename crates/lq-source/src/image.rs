use std::path::Path;

use anyhow::{Context, Result};
use lq_core::error::CoreError;
use lq_core::frame::PixelBuffer;

/// Décode une image encodée (PNG, JPEG, BMP, GIF) en niveaux de gris 8-bit.
///
/// Les images couleur sont converties en luminance.
///
/// # Errors
/// Returns [`CoreError::MalformedInput`] if the bytes cannot be decoded.
///
/// # Example
/// ```
/// use lq_source::image::decode_gray;
/// assert!(decode_gray("junk.png", b"not a png").is_err());
/// ```
pub fn decode_gray(name: &str, bytes: &[u8]) -> Result<PixelBuffer, CoreError> {
    let img = image::load_from_memory(bytes).map_err(|e| CoreError::MalformedInput {
        name: name.to_string(),
        reason: e.to_string(),
    })?;
    let luma = img.to_luma8();
    let (width, height) = luma.dimensions();
    Ok(PixelBuffer {
        data: luma.into_raw(),
        width,
        height,
    })
}

/// Charge une image depuis le disque en niveaux de gris.
///
/// # Errors
/// Returns an error if the file cannot be read or decoded.
///
/// # Example
/// ```no_run
/// use lq_source::image::load_gray;
/// use std::path::Path;
/// let buf = load_gray(Path::new("image1.png")).unwrap();
/// ```
pub fn load_gray(path: &Path) -> Result<PixelBuffer> {
    let bytes =
        std::fs::read(path).with_context(|| format!("Impossible de charger {}", path.display()))?;
    Ok(decode_gray(&path.display().to_string(), &bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, ImageFormat, RgbImage};
    use std::io::Cursor;

    fn encode_png(img: &image::DynamicImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    #[test]
    fn decodes_gray_png() {
        let src = GrayImage::from_raw(3, 2, vec![0, 50, 100, 150, 200, 250]).unwrap();
        let bytes = encode_png(&image::DynamicImage::ImageLuma8(src));
        let buf = decode_gray("g.png", &bytes).unwrap();
        assert_eq!(buf.dimensions(), (3, 2));
        assert_eq!(buf.data, vec![0, 50, 100, 150, 200, 250]);
    }

    #[test]
    fn color_png_is_converted_to_luma() {
        let src = RgbImage::from_pixel(2, 2, image::Rgb([255, 255, 255]));
        let bytes = encode_png(&image::DynamicImage::ImageRgb8(src));
        let buf = decode_gray("rgb.png", &bytes).unwrap();
        assert_eq!(buf.len(), 4);
        assert!(buf.data.iter().all(|&v| v == 255));
    }

    #[test]
    fn garbage_is_malformed_input() {
        let err = decode_gray("broken.png", &[0x89, b'P', b'N', b'G', 0, 0]).unwrap_err();
        assert!(matches!(err, CoreError::MalformedInput { ref name, .. } if name == "broken.png"));
    }
}
