/// Types partagés, configuration et erreurs pour lumeq.
///
/// This crate contains the pixel buffer types, the batch source trait
/// and the TOML configuration used across the lumeq workspace.

pub mod config;
pub mod error;
pub mod frame;
pub mod traits;

pub use config::NormalizeConfig;
pub use error::CoreError;
pub use frame::{NamedImage, PixelBuffer};
pub use traits::BatchSource;

/// Borne supérieure d'un échantillon 8-bit, en précision réelle.
pub const MAX_INTENSITY: f64 = 255.0;
