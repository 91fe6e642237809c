use crate::frame::NamedImage;

/// Fournit un lot ordonné d'images en niveaux de gris.
///
/// Implémenté par : `FolderSource`, `SyntheticSource`.
///
/// Toutes les images doivent être décodées avant le calcul de la moyenne
/// globale : `load` retourne le lot complet, jamais un lot partiel.
///
/// # Example
/// ```
/// use lq_core::traits::BatchSource;
/// use lq_core::frame::{NamedImage, PixelBuffer};
///
/// struct DummySource;
/// impl BatchSource for DummySource {
///     fn load(&mut self) -> anyhow::Result<Vec<NamedImage>> {
///         Ok(vec![NamedImage::new("a", PixelBuffer::new(1, 1))])
///     }
///     fn describe(&self) -> String { "dummy".into() }
/// }
///
/// let images = DummySource.load().unwrap();
/// assert_eq!(images.len(), 1);
/// ```
pub trait BatchSource {
    /// Charge toutes les images du lot, dans un ordre stable.
    ///
    /// # Errors
    /// Returns an error if the batch cannot be read or an image cannot be decoded.
    fn load(&mut self) -> anyhow::Result<Vec<NamedImage>>;

    /// Nom lisible pour les logs.
    fn describe(&self) -> String;
}
