use lq_core::error::CoreError;
use lq_core::frame::{NamedImage, PixelBuffer};
use rayon::prelude::*;

/// Below this many samples, summing on the current thread is faster than a rayon split.
const PARALLEL_THRESHOLD: usize = 1 << 16;

/// Somme exacte des échantillons (entière, donc indépendante de l'ordre de réduction).
#[inline]
fn sample_sum(samples: &[u8]) -> u64 {
    if samples.len() >= PARALLEL_THRESHOLD {
        samples.par_iter().map(|&v| u64::from(v)).sum()
    } else {
        samples.iter().map(|&v| u64::from(v)).sum()
    }
}

/// Moyenne arithmétique de tous les échantillons d'un buffer.
///
/// Calculée en précision réelle sur la somme exacte, jamais tronquée.
/// Un buffer vide a une moyenne de 0.0.
///
/// # Example
/// ```
/// use lq_core::frame::PixelBuffer;
/// use lq_engine::intensity::mean;
/// let buf = PixelBuffer::from_raw(2, 1, vec![10, 11]).unwrap();
/// assert_eq!(mean(&buf), 10.5);
/// ```
#[must_use]
pub fn mean(buffer: &PixelBuffer) -> f64 {
    if buffer.is_empty() {
        return 0.0;
    }
    sample_sum(&buffer.data) as f64 / buffer.len() as f64
}

/// Moyenne globale sur l'ensemble des échantillons du lot.
///
/// Defined over the pooled samples, not as a mean of per-image means: a
/// large image weighs more than a small one.
///
/// # Errors
/// Returns [`CoreError::EmptyBatch`] if the batch holds no sample at all.
///
/// # Example
/// ```
/// use lq_core::frame::{NamedImage, PixelBuffer};
/// use lq_engine::intensity::global_mean;
/// let images = vec![
///     NamedImage::new("a", PixelBuffer::filled(2, 2, 0)),
///     NamedImage::new("b", PixelBuffer::filled(1, 1, 100)),
/// ];
/// assert_eq!(global_mean(&images).unwrap(), 20.0);
/// ```
pub fn global_mean(images: &[NamedImage]) -> Result<f64, CoreError> {
    let (sum, count) = images.iter().fold((0u64, 0usize), |(sum, count), img| {
        (sum + sample_sum(&img.buffer.data), count + img.buffer.len())
    });
    if count == 0 {
        return Err(CoreError::EmptyBatch);
    }
    Ok(sum as f64 / count as f64)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mean_of_uniform_buffer() {
        assert_eq!(mean(&PixelBuffer::filled(8, 8, 77)), 77.0);
    }

    #[test]
    fn mean_of_empty_buffer_is_zero() {
        assert_eq!(mean(&PixelBuffer::new(0, 0)), 0.0);
    }

    #[test]
    fn mean_large_buffer_matches_sequential() {
        let data: Vec<u8> = (0..300 * 300).map(|i| (i % 251) as u8).collect();
        let expected = data.iter().map(|&v| f64::from(v)).sum::<f64>() / data.len() as f64;
        let buf = PixelBuffer::from_raw(300, 300, data).unwrap();
        assert!((mean(&buf) - expected).abs() < 1e-9);
    }

    #[test]
    fn global_mean_pools_samples_instead_of_averaging_means() {
        let images = vec![
            NamedImage::new("big", PixelBuffer::filled(2, 2, 0)),
            NamedImage::new("small", PixelBuffer::filled(1, 1, 100)),
        ];
        let pooled = global_mean(&images).unwrap();
        let mean_of_means = images.iter().map(|i| mean(&i.buffer)).sum::<f64>() / 2.0;
        assert_eq!(pooled, 20.0);
        assert_eq!(mean_of_means, 50.0);
    }

    #[test]
    fn global_mean_of_empty_batch_fails() {
        assert_eq!(global_mean(&[]), Err(CoreError::EmptyBatch));
        let no_samples = vec![NamedImage::new("void", PixelBuffer::new(0, 0))];
        assert_eq!(global_mean(&no_samples), Err(CoreError::EmptyBatch));
    }
}
