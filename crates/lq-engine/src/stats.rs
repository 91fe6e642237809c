use lq_core::frame::PixelBuffer;
use serde::Serialize;

use crate::intensity::mean;
use crate::normalize::{CorrectionStage, Normalized};

/// Écart maximal (inclus) entre la moyenne corrigée et la cible.
pub const TOLERANCE: f64 = 1.0;

/// Note maximale, atteinte quand toutes les images passent.
pub const MAX_SCORE: f64 = 10.0;

/// `|avg - target| <= TOLERANCE`. Ties at exactly 1.0 pass.
///
/// # Example
/// ```
/// use lq_engine::stats::within_tolerance;
/// assert!(within_tolerance(101.0, 100.0));
/// assert!(!within_tolerance(101.01, 100.0));
/// ```
#[inline]
#[must_use]
pub fn within_tolerance(avg: f64, target: f64) -> bool {
    (avg - target).abs() <= TOLERANCE
}

/// Statistiques d'une image corrigée, dérivées du buffer et de la cible.
#[derive(Clone, Debug, Serialize)]
pub struct ImageResult {
    /// Nom de l'image source.
    #[serde(rename = "filename")]
    pub name: String,
    /// Buffer corrigé. Non sérialisé.
    #[serde(skip)]
    pub buffer: PixelBuffer,
    /// Moyenne du buffer corrigé.
    pub average_intensity: f64,
    /// `|average_intensity - target|`.
    pub difference_from_target: f64,
    /// `difference_from_target <= TOLERANCE`.
    pub within_threshold: bool,
    /// Moyenne avant correction.
    pub source_average: f64,
    /// Étape à laquelle la correction s'est arrêtée.
    pub stage: CorrectionStage,
}

/// Per-image statistics without the session bookkeeping fields.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Evaluation {
    /// Mean of the corrected buffer.
    pub average_intensity: f64,
    /// Absolute distance to the target.
    pub difference_from_target: f64,
    /// Whether the distance is within [`TOLERANCE`].
    pub within_threshold: bool,
}

/// Évalue un buffer corrigé par rapport à la cible. Fonction pure.
///
/// # Example
/// ```
/// use lq_core::frame::PixelBuffer;
/// use lq_engine::stats::evaluate;
/// let e = evaluate(&PixelBuffer::filled(2, 2, 124), 125.0);
/// assert_eq!(e.difference_from_target, 1.0);
/// assert!(e.within_threshold);
/// ```
#[must_use]
pub fn evaluate(corrected: &PixelBuffer, target: f64) -> Evaluation {
    let average_intensity = mean(corrected);
    let difference_from_target = (average_intensity - target).abs();
    Evaluation {
        average_intensity,
        difference_from_target,
        within_threshold: within_tolerance(average_intensity, target),
    }
}

impl ImageResult {
    /// Construit le résultat d'une image à partir de sa normalisation.
    ///
    /// Les statistiques sont recalculées depuis le buffer corrigé via [`evaluate`].
    #[must_use]
    pub fn from_normalized(
        name: impl Into<String>,
        normalized: Normalized,
        source_average: f64,
        target: f64,
    ) -> Self {
        let eval = evaluate(&normalized.buffer, target);
        Self {
            name: name.into(),
            buffer: normalized.buffer,
            average_intensity: eval.average_intensity,
            difference_from_target: eval.difference_from_target,
            within_threshold: eval.within_threshold,
            source_average,
            stage: normalized.stage,
        }
    }
}

/// Nombre d'images dans la tolérance.
#[must_use]
pub fn count_within(results: &[ImageResult]) -> usize {
    results.iter().filter(|r| r.within_threshold).count()
}

/// `10 * passed / total`, ou 0 pour un lot vide.
///
/// # Example
/// ```
/// use lq_engine::stats::score;
/// assert_eq!(score(&[]), 0.0);
/// ```
#[must_use]
pub fn score(results: &[ImageResult]) -> f64 {
    if results.is_empty() {
        return 0.0;
    }
    MAX_SCORE * count_within(results) as f64 / results.len() as f64
}
