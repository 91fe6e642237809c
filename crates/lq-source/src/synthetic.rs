use std::f64::consts::TAU;

use anyhow::Result;
use lq_core::MAX_INTENSITY;
use lq_core::config::SyntheticConfig;
use lq_core::frame::{NamedImage, PixelBuffer};
use lq_core::traits::BatchSource;

/// Générateur de lot de test : images uniformes d'intensités croissantes,
/// plus un bruit gaussien.
///
/// Intensities are linearly spaced in `[min_intensity, max_intensity]`.
/// Déterministe pour une graine donnée.
///
/// # Example
/// ```
/// use lq_core::config::SyntheticConfig;
/// use lq_core::traits::BatchSource;
/// use lq_source::synthetic::SyntheticSource;
///
/// let config = SyntheticConfig { count: 3, size: 8, noise_sigma: 0.0, ..Default::default() };
/// let images = SyntheticSource::new(config).load().unwrap();
/// assert_eq!(images.len(), 3);
/// assert_eq!(images[0].name, "image1.png");
/// ```
pub struct SyntheticSource {
    config: SyntheticConfig,
}

impl SyntheticSource {
    /// Crée un générateur.
    #[must_use]
    pub fn new(config: SyntheticConfig) -> Self {
        Self { config }
    }

    /// Intensité moyenne visée pour l'image `index`.
    #[must_use]
    pub fn intensity_at(&self, index: usize) -> f64 {
        let SyntheticConfig {
            count,
            min_intensity,
            max_intensity,
            ..
        } = self.config;
        if count < 2 {
            return min_intensity;
        }
        min_intensity + (max_intensity - min_intensity) * index as f64 / (count - 1) as f64
    }

    /// Génère le lot complet.
    #[must_use]
    pub fn generate(&self) -> Vec<NamedImage> {
        let mut rng = fastrand::Rng::with_seed(self.config.seed);
        let size = self.config.size;
        let samples = size as usize * size as usize;
        let sigma = self.config.noise_sigma;

        (0..self.config.count)
            .map(|i| {
                let intensity = self.intensity_at(i);
                let data = (0..samples)
                    .map(|_| {
                        let noise = if sigma > 0.0 {
                            gaussian(&mut rng) * sigma
                        } else {
                            0.0
                        };
                        (intensity + noise).clamp(0.0, MAX_INTENSITY) as u8
                    })
                    .collect();
                NamedImage::new(
                    format!("image{}.png", i + 1),
                    PixelBuffer {
                        data,
                        width: size,
                        height: size,
                    },
                )
            })
            .collect()
    }
}

impl BatchSource for SyntheticSource {
    fn load(&mut self) -> Result<Vec<NamedImage>> {
        let images = self.generate();
        log::info!(
            "{} images synthétiques {}x{} générées ({:.1} → {:.1}, σ={})",
            images.len(),
            self.config.size,
            self.config.size,
            self.config.min_intensity,
            self.config.max_intensity,
            self.config.noise_sigma
        );
        Ok(images)
    }

    fn describe(&self) -> String {
        format!("lot synthétique (graine {})", self.config.seed)
    }
}

/// Standard normal sample, Box-Muller.
#[inline]
fn gaussian(rng: &mut fastrand::Rng) -> f64 {
    // 1 - u keeps the log argument in (0, 1].
    let u1 = 1.0 - rng.f64();
    let u2 = rng.f64();
    (-2.0 * u1.ln()).sqrt() * (TAU * u2).cos()
}
