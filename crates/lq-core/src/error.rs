use thiserror::Error;

/// Errors originating from the core module.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CoreError {
    /// No images and no explicit target: the global average is undefined.
    #[error("Lot vide : aucune image pour calculer la moyenne globale")]
    EmptyBatch,

    /// Explicit target outside [0, 255] (or not a finite number).
    #[error("Intensité cible invalide : {value} (attendu entre 0 et 255)")]
    InvalidTarget {
        /// The rejected target value.
        value: f64,
    },

    /// Image data that cannot be decoded.
    #[error("Image corrompue {name} : {reason}")]
    MalformedInput {
        /// Name of the offending image.
        name: String,
        /// Decoder message.
        reason: String,
    },

    /// Sample count does not match `width * height`.
    #[error("Taille de buffer invalide : {found} échantillons, {expected} attendus")]
    BufferSize {
        /// `width * height`.
        expected: usize,
        /// Length of the supplied data.
        found: usize,
    },

    /// Invalid width/height dimensions.
    #[error("Dimensions invalides : {width}×{height}")]
    InvalidDimensions {
        /// Width value.
        width: u32,
        /// Height value.
        height: u32,
    },

    /// Invalid configuration value or structure.
    #[error("Configuration invalide : {0}")]
    Config(String),

    /// Referenced file does not exist.
    #[error("Fichier introuvable : {path}")]
    FileNotFound {
        /// Path that was not found.
        path: String,
    },
}
