use anyhow::{Context, Result};
use fast_image_resize::images::Image;
use fast_image_resize::{PixelType, ResizeOptions, Resizer as FirResizer};
use lq_core::error::CoreError;
use lq_core::frame::PixelBuffer;

/// Resizer réutilisable wrappant fast_image_resize, mono-canal U8.
///
/// # Example
/// ```
/// use lq_source::resize::Resizer;
/// let r = Resizer::new();
/// ```
pub struct Resizer {
    inner: FirResizer,
    options: ResizeOptions,
    /// Scratch copy of the source (the API wants `&mut` on the source slice).
    src_buf: Vec<u8>,
}

impl Resizer {
    /// Create a new resizer.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: FirResizer::new(),
            options: ResizeOptions::new(),
            src_buf: Vec::new(),
        }
    }

    /// Resize `src` into `dst`. Dimensions of `dst` determine output size.
    ///
    /// # Errors
    /// Returns an error if either buffer has a zero dimension or the resize fails.
    ///
    /// # Example
    /// ```
    /// use lq_source::resize::Resizer;
    /// use lq_core::frame::PixelBuffer;
    /// let mut r = Resizer::new();
    /// let src = PixelBuffer::filled(100, 100, 10);
    /// let mut dst = PixelBuffer::new(50, 50);
    /// r.resize_into(&src, &mut dst).unwrap();
    /// ```
    pub fn resize_into(&mut self, src: &PixelBuffer, dst: &mut PixelBuffer) -> Result<()> {
        for (width, height) in [src.dimensions(), dst.dimensions()] {
            if width == 0 || height == 0 {
                return Err(CoreError::InvalidDimensions { width, height }.into());
            }
        }
        if src.dimensions() == dst.dimensions() {
            dst.data.copy_from_slice(&src.data);
            return Ok(());
        }

        self.src_buf.clear();
        self.src_buf.extend_from_slice(&src.data);

        let src_image =
            Image::from_slice_u8(src.width, src.height, &mut self.src_buf, PixelType::U8)
                .context("Invalid source dimensions")?;

        let mut dst_image =
            Image::from_slice_u8(dst.width, dst.height, &mut dst.data, PixelType::U8)
                .context("Invalid destination dimensions")?;

        self.inner
            .resize(&src_image, &mut dst_image, Some(&self.options))
            .context("Resize failed")?;

        Ok(())
    }
}

impl Default for Resizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience for one-shot usage.
///
/// # Errors
/// Returns an error if the resize operation fails.
///
/// # Example
/// ```
/// use lq_source::resize::resize_gray;
/// use lq_core::frame::PixelBuffer;
/// let src = PixelBuffer::new(300, 200);
/// let dst = resize_gray(&src, 256, 256).unwrap();
/// assert_eq!(dst.dimensions(), (256, 256));
/// ```
pub fn resize_gray(src: &PixelBuffer, width: u32, height: u32) -> Result<PixelBuffer> {
    let mut dst = PixelBuffer::new(width, height);
    Resizer::new().resize_into(src, &mut dst)?;
    Ok(dst)
}

/// Ramène `buffer` à `width`×`height` si nécessaire, avec un avertissement.
///
/// # Errors
/// Returns an error if the resize fails.
pub fn conform(name: &str, buffer: PixelBuffer, width: u32, height: u32) -> Result<PixelBuffer> {
    if buffer.dimensions() == (width, height) {
        return Ok(buffer);
    }
    log::warn!(
        "Image {name} : dimensions {}x{}, attendu {width}x{height} (redimensionnée)",
        buffer.width,
        buffer.height
    );
    resize_gray(&buffer, width, height)
        .with_context(|| format!("Redimensionnement impossible de {name}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_size_is_a_copy() {
        let data: Vec<u8> = (0..16).collect();
        let src = PixelBuffer::from_raw(4, 4, data.clone()).unwrap();
        let dst = resize_gray(&src, 4, 4).unwrap();
        assert_eq!(dst.data, data);
    }

    #[test]
    fn uniform_image_stays_uniform() {
        let src = PixelBuffer::filled(64, 48, 120);
        let dst = resize_gray(&src, 32, 32).unwrap();
        assert_eq!(dst.dimensions(), (32, 32));
        assert!(dst.data.iter().all(|&v| v.abs_diff(120) <= 1));
    }

    #[test]
    fn zero_dimension_is_rejected() {
        let src = PixelBuffer::new(0, 10);
        let err = resize_gray(&src, 8, 8).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::InvalidDimensions { width: 0, height: 10 })
        ));
    }
}
