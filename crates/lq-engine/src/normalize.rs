use lq_core::MAX_INTENSITY;
use lq_core::frame::{NamedImage, PixelBuffer};
use serde::Serialize;

use crate::intensity::mean;
use crate::stats::within_tolerance;

/// Étape de correction à laquelle la normalisation s'est arrêtée.
///
/// Le moteur applique au plus trois étapes, dans cet ordre, sans boucler.
///
/// # Example
/// ```
/// use lq_engine::normalize::CorrectionStage;
/// assert_eq!(CorrectionStage::Additive.count(), 2);
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrectionStage {
    /// Mise à l'échelle multiplicative `target / mean`.
    Linear,
    /// Décalage additif `target - mean` (dérive de quantification).
    Additive,
    /// Second facteur multiplicatif (dérive due au clipping de l'étape additive).
    Proportional,
}

impl CorrectionStage {
    /// Number of stages applied when stopping at this one.
    #[must_use]
    pub fn count(self) -> u8 {
        match self {
            Self::Linear => 1,
            Self::Additive => 2,
            Self::Proportional => 3,
        }
    }
}

/// Buffer corrigé et trace des corrections appliquées.
#[derive(Clone, Debug)]
pub struct Normalized {
    /// Buffer final.
    pub buffer: PixelBuffer,
    /// Dernière étape appliquée.
    pub stage: CorrectionStage,
    /// Facteur de l'étape linéaire (1.0 si la moyenne source est nulle).
    pub factor: f64,
    /// Décalage de l'étape additive, si elle a eu lieu.
    pub adjustment: Option<f64>,
    /// Facteur de l'étape proportionnelle, si elle a eu lieu.
    pub secondary_factor: Option<f64>,
}

/// Clip to [0, 255] then truncate toward zero.
///
/// Applied identically at every stage boundary. NaN maps to 0.
///
/// # Example
/// ```
/// use lq_engine::normalize::quantize;
/// assert_eq!(quantize(124.99), 124);
/// assert_eq!(quantize(-3.0), 0);
/// assert_eq!(quantize(400.0), 255);
/// ```
#[inline]
#[must_use]
pub fn quantize(value: f64) -> u8 {
    value.clamp(0.0, MAX_INTENSITY) as u8
}

/// `target / avg`, or 1.0 when `avg` is not positive (nothing to rescale).
#[inline]
#[must_use]
pub fn proportional_factor(avg: f64, target: f64) -> f64 {
    if avg > 0.0 { target / avg } else { 1.0 }
}

/// Multiplie chaque échantillon par `factor`, puis clip + quantification.
#[must_use]
pub fn scale(buffer: &PixelBuffer, factor: f64) -> PixelBuffer {
    buffer.map(|v| quantize(f64::from(v) * factor))
}

/// Ajoute `delta` à chaque échantillon, puis clip + quantification.
#[must_use]
pub fn offset(buffer: &PixelBuffer, delta: f64) -> PixelBuffer {
    buffer.map(|v| quantize(f64::from(v) + delta))
}

/// Normalise une image vers `target` et retourne uniquement le buffer corrigé.
///
/// # Example
/// ```
/// use lq_core::frame::{NamedImage, PixelBuffer};
/// use lq_engine::normalize::normalize;
/// let img = NamedImage::new("a", PixelBuffer::filled(4, 4, 100));
/// let out = normalize(&img, 150.0);
/// assert!(out.data.iter().all(|&v| v == 150));
/// ```
#[must_use]
pub fn normalize(image: &NamedImage, target: f64) -> PixelBuffer {
    normalize_traced(image, target).buffer
}

/// Normalise une image vers `target` en au plus trois étapes.
///
/// 1. linear scale by `target / mean` (1.0 for a zero-mean buffer);
/// 2. if the mean is still off by more than the tolerance, add `target - mean`;
/// 3. if still off, rescale once more by `target / mean`. The result of this
///    stage is final whether or not it lands within tolerance.
///
/// Deterministic, no state shared between images. Each stage produces a new
/// buffer.
///
/// # Example
/// ```
/// use lq_core::frame::{NamedImage, PixelBuffer};
/// use lq_engine::normalize::{CorrectionStage, normalize_traced};
/// let img = NamedImage::new("black", PixelBuffer::filled(4, 4, 0));
/// let out = normalize_traced(&img, 100.0);
/// assert_eq!(out.factor, 1.0);
/// assert_eq!(out.stage, CorrectionStage::Additive);
/// ```
#[must_use]
pub fn normalize_traced(image: &NamedImage, target: f64) -> Normalized {
    let current = mean(&image.buffer);
    let factor = proportional_factor(current, target);
    if current <= 0.0 {
        log::warn!(
            "{} : intensité moyenne nulle, facteur 1.0 utilisé",
            image.name
        );
    }
    log::debug!(
        "{} - moyenne courante {current:.3}, facteur {factor:.5}",
        image.name
    );

    let stage1 = scale(&image.buffer, factor);
    let avg1 = mean(&stage1);
    log::debug!("{} - après mise à l'échelle : {avg1:.3}", image.name);
    if within_tolerance(avg1, target) {
        return Normalized {
            buffer: stage1,
            stage: CorrectionStage::Linear,
            factor,
            adjustment: None,
            secondary_factor: None,
        };
    }

    log::warn!(
        "{} : hors tolérance après mise à l'échelle ({avg1:.3} vs {target:.3}), ajustement fin",
        image.name
    );
    let adjustment = target - avg1;
    let stage2 = offset(&stage1, adjustment);
    let avg2 = mean(&stage2);
    log::debug!("{} - après ajustement : {avg2:.3}", image.name);
    if within_tolerance(avg2, target) {
        return Normalized {
            buffer: stage2,
            stage: CorrectionStage::Additive,
            factor,
            adjustment: Some(adjustment),
            secondary_factor: None,
        };
    }

    log::warn!("{} : ajustement secondaire nécessaire", image.name);
    let secondary = proportional_factor(avg2, target);
    let stage3 = scale(&stage2, secondary);
    log::debug!(
        "{} - après ajustement secondaire : {:.3}",
        image.name,
        mean(&stage3)
    );

    Normalized {
        buffer: stage3,
        stage: CorrectionStage::Proportional,
        factor,
        adjustment: Some(adjustment),
        secondary_factor: Some(secondary),
    }
}
