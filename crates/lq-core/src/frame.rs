use crate::error::CoreError;

/// Grille d'intensité mono-canal, 8-bit, row-major.
///
/// Chaque échantillon au repos est dans [0, 255] par construction (`u8`).
/// Les étapes de normalisation produisent de nouveaux buffers, jamais de
/// mutation en place.
///
/// # Example
/// ```
/// use lq_core::frame::PixelBuffer;
/// let buf = PixelBuffer::new(4, 2);
/// assert_eq!(buf.data.len(), 8);
/// assert!(buf.data.iter().all(|&v| v == 0));
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PixelBuffer {
    /// Samples, row-major, 1 byte per pixel.
    pub data: Vec<u8>,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl PixelBuffer {
    /// Crée un buffer noir aux dimensions données.
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self::filled(width, height, 0)
    }

    /// Crée un buffer uniforme de valeur `value`.
    ///
    /// # Example
    /// ```
    /// use lq_core::frame::PixelBuffer;
    /// let buf = PixelBuffer::filled(3, 3, 100);
    /// assert_eq!(buf.data, vec![100; 9]);
    /// ```
    #[must_use]
    pub fn filled(width: u32, height: u32, value: u8) -> Self {
        Self {
            data: vec![value; width as usize * height as usize],
            width,
            height,
        }
    }

    /// Wrap raw samples, checking that the length matches the dimensions.
    ///
    /// # Errors
    /// Returns [`CoreError::BufferSize`] if `data.len() != width * height`.
    ///
    /// # Example
    /// ```
    /// use lq_core::frame::PixelBuffer;
    /// assert!(PixelBuffer::from_raw(2, 2, vec![0, 1, 2, 3]).is_ok());
    /// assert!(PixelBuffer::from_raw(2, 2, vec![0, 1, 2]).is_err());
    /// ```
    pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Result<Self, CoreError> {
        let expected = width as usize * height as usize;
        if data.len() != expected {
            return Err(CoreError::BufferSize {
                expected,
                found: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    /// Nombre d'échantillons.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// `true` si le buffer ne contient aucun échantillon.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Dimensions `(width, height)`.
    #[inline]
    #[must_use]
    pub fn dimensions(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Nouveau buffer de mêmes dimensions, échantillons fournis par `f`.
    ///
    /// Used by the correction stages: copy-on-transform, `self` is left untouched.
    ///
    /// # Example
    /// ```
    /// use lq_core::frame::PixelBuffer;
    /// let src = PixelBuffer::filled(2, 1, 10);
    /// let dst = src.map(|v| v * 2);
    /// assert_eq!(dst.data, vec![20, 20]);
    /// assert_eq!(src.data, vec![10, 10]);
    /// ```
    #[must_use]
    pub fn map(&self, f: impl Fn(u8) -> u8) -> Self {
        Self {
            data: self.data.iter().map(|&v| f(v)).collect(),
            width: self.width,
            height: self.height,
        }
    }
}

/// Image nommée d'un lot. Immutable après ingestion.
///
/// # Example
/// ```
/// use lq_core::frame::{NamedImage, PixelBuffer};
/// let img = NamedImage::new("image1.png", PixelBuffer::filled(2, 2, 50));
/// assert_eq!(img.name, "image1.png");
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NamedImage {
    /// Stable identifier, unique within a batch.
    pub name: String,
    /// Grayscale samples.
    pub buffer: PixelBuffer,
}

impl NamedImage {
    /// Associe un nom à un buffer.
    #[must_use]
    pub fn new(name: impl Into<String>, buffer: PixelBuffer) -> Self {
        Self {
            name: name.into(),
            buffer,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn from_raw_rejects_length_mismatch() {
        let err = PixelBuffer::from_raw(3, 3, vec![0; 8]).unwrap_err();
        assert_eq!(
            err,
            CoreError::BufferSize {
                expected: 9,
                found: 8
            }
        );
    }

    #[test]
    fn map_keeps_dimensions() {
        let src = PixelBuffer::filled(5, 3, 7);
        let dst = src.map(|v| v.saturating_add(250));
        assert_eq!(dst.dimensions(), (5, 3));
        assert!(dst.data.iter().all(|&v| v == 255));
    }
}
