use std::time::Instant;

use lq_core::MAX_INTENSITY;
use lq_core::error::CoreError;
use lq_core::frame::{NamedImage, PixelBuffer};
use rayon::prelude::*;
use serde::Serialize;

use crate::intensity::{global_mean, mean};
use crate::normalize::normalize_traced;
use crate::stats::{ImageResult, count_within, score};

/// Origine de l'intensité cible d'une session.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetSource {
    /// Fournie par l'appelant.
    Explicit,
    /// Moyenne globale du lot.
    GlobalAverage,
}

/// Rapport final d'un run. Seule sortie visible du moteur.
#[derive(Clone, Debug, Serialize)]
pub struct SessionReport {
    /// Moyenne globale du lot d'entrée (absente pour un lot vide).
    pub global_average: Option<f64>,
    /// Cible effective appliquée à chaque image.
    pub target: f64,
    /// Origine de la cible.
    pub target_source: TargetSource,
    /// Nombre d'images traitées.
    pub image_count: usize,
    /// Durée de la normalisation et du scoring, en secondes.
    #[serde(rename = "processing_time")]
    pub processing_time_secs: f64,
    /// Résultats, dans l'ordre d'entrée.
    #[serde(rename = "normalized_images")]
    pub results: Vec<ImageResult>,
    /// Nombre d'images dans la tolérance.
    pub images_within_threshold: usize,
    /// `10 * images_within_threshold / image_count`.
    pub score: f64,
}

impl SessionReport {
    /// Buffers corrigés, dans l'ordre d'entrée.
    pub fn corrected(&self) -> impl Iterator<Item = &PixelBuffer> {
        self.results.iter().map(|r| &r.buffer)
    }

    /// `true` si toutes les images sont dans la tolérance (et le lot non vide).
    #[must_use]
    pub fn all_within_threshold(&self) -> bool {
        self.image_count > 0 && self.images_within_threshold == self.image_count
    }
}

/// Orchestrateur : moyenne globale → normalisation → statistiques → rapport.
///
/// Ne porte aucune politique numérique ; seul le parallélisme est réglable.
///
/// # Example
/// ```
/// use lq_core::frame::{NamedImage, PixelBuffer};
/// use lq_engine::session::Session;
///
/// let images = vec![
///     NamedImage::new("dark", PixelBuffer::filled(8, 8, 50)),
///     NamedImage::new("bright", PixelBuffer::filled(8, 8, 150)),
/// ];
/// let report = Session::new().run(&images, None).unwrap();
/// assert_eq!(report.target, 100.0);
/// assert_eq!(report.score, 10.0);
/// ```
#[derive(Clone, Copy, Debug)]
pub struct Session {
    parallel: bool,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// Session parallèle (rayon) par défaut.
    #[must_use]
    pub fn new() -> Self {
        Self { parallel: true }
    }

    /// Active ou désactive la normalisation parallèle.
    #[must_use]
    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Exécute un run complet sur `images`.
    ///
    /// With `target = None` the pooled global mean of the batch is used.
    /// An explicit target skips that computation, so an empty batch then
    /// yields an empty report instead of an error.
    ///
    /// # Errors
    /// - [`CoreError::InvalidTarget`] if `target` is outside [0, 255] or not finite.
    /// - [`CoreError::EmptyBatch`] if `images` holds no sample and `target` is `None`.
    pub fn run(
        &self,
        images: &[NamedImage],
        target: Option<f64>,
    ) -> Result<SessionReport, CoreError> {
        if let Some(value) = target {
            validate_target(value)?;
        }

        let global_average = match target {
            None => Some(global_mean(images)?),
            Some(_) => global_mean(images).ok(),
        };
        let (target, target_source) = match (target, global_average) {
            (Some(t), _) => (t, TargetSource::Explicit),
            (None, Some(avg)) => (avg, TargetSource::GlobalAverage),
            (None, None) => return Err(CoreError::EmptyBatch),
        };
        log::info!(
            "Normalisation de {} images vers {target:.3} ({target_source:?})",
            images.len()
        );

        let start = Instant::now();
        let results: Vec<ImageResult> = if self.parallel {
            images.par_iter().map(|img| process_one(img, target)).collect()
        } else {
            images.iter().map(|img| process_one(img, target)).collect()
        };
        let images_within_threshold = count_within(&results);
        let score = score(&results);
        let processing_time_secs = start.elapsed().as_secs_f64();

        log::info!("Traitement terminé en {processing_time_secs:.2} s");
        log::info!(
            "Score : {score:.1}/10 ({images_within_threshold}/{} images dans la tolérance)",
            results.len()
        );

        Ok(SessionReport {
            global_average,
            target,
            target_source,
            image_count: results.len(),
            processing_time_secs,
            results,
            images_within_threshold,
            score,
        })
    }
}

/// Rejette une cible hors de [0, 255].
///
/// # Errors
/// Returns [`CoreError::InvalidTarget`] for NaN, infinities and out-of-range values.
///
/// # Example
/// ```
/// use lq_engine::session::validate_target;
/// assert!(validate_target(255.0).is_ok());
/// assert!(validate_target(-0.5).is_err());
/// ```
pub fn validate_target(value: f64) -> Result<(), CoreError> {
    if (0.0..=MAX_INTENSITY).contains(&value) {
        Ok(())
    } else {
        Err(CoreError::InvalidTarget { value })
    }
}

fn process_one(image: &NamedImage, target: f64) -> ImageResult {
    let source_average = mean(&image.buffer);
    let normalized = normalize_traced(image, target);
    ImageResult::from_normalized(image.name.clone(), normalized, source_average, target)
}
