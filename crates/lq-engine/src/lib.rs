/// Moteur d'égalisation d'intensité pour lumeq.
///
/// Pipeline : moyenne par image → cible globale → buffers corrigés →
/// statistiques par image → rapport de session.

pub mod intensity;
pub mod normalize;
pub mod session;
pub mod stats;

pub use normalize::{CorrectionStage, Normalized, normalize, normalize_traced};
pub use session::{Session, SessionReport, TargetSource};
pub use stats::{ImageResult, TOLERANCE, evaluate, score};
