use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use image::GrayImage;
use lq_core::error::CoreError;
use lq_core::frame::PixelBuffer;
use lq_engine::session::SessionReport;
use rayon::prelude::*;

/// Nom du fichier de sortie de la `index`-ième image (1-based).
///
/// # Example
/// ```
/// use lq_export::writer::output_name;
/// assert_eq!(output_name("normalized_image", 0), "normalized_image1.png");
/// ```
#[must_use]
pub fn output_name(prefix: &str, index: usize) -> String {
    format!("{prefix}{}.png", index + 1)
}

/// Écrit un buffer en PNG niveaux de gris.
///
/// # Errors
/// Returns an error if the buffer is inconsistent or the file cannot be written.
pub fn save_png(buffer: &PixelBuffer, path: &Path) -> Result<()> {
    let img = GrayImage::from_raw(buffer.width, buffer.height, buffer.data.clone()).ok_or(
        CoreError::BufferSize {
            expected: buffer.width as usize * buffer.height as usize,
            found: buffer.len(),
        },
    )?;
    img.save_with_format(path, image::ImageFormat::Png)
        .with_context(|| format!("Écriture impossible de {}", path.display()))
}

/// Écrit chaque buffer corrigé sous `dir/<prefix><n>.png`, dans l'ordre du rapport.
///
/// Crée `dir` si nécessaire. Retourne les chemins écrits.
///
/// # Errors
/// Returns an error if the directory cannot be created or a file cannot be written.
///
/// # Example
/// ```no_run
/// use lq_core::frame::{NamedImage, PixelBuffer};
/// use lq_engine::session::Session;
/// use lq_export::writer::write_normalized;
/// use std::path::Path;
///
/// let images = vec![NamedImage::new("a.png", PixelBuffer::filled(4, 4, 80))];
/// let report = Session::new().run(&images, Some(120.0)).unwrap();
/// let paths = write_normalized(&report, Path::new("out"), "normalized_image").unwrap();
/// ```
pub fn write_normalized(report: &SessionReport, dir: &Path, prefix: &str) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("Création impossible de {}", dir.display()))?;

    let paths = report
        .corrected()
        .enumerate()
        .map(|(i, buffer)| (dir.join(output_name(prefix, i)), buffer))
        .collect::<Vec<_>>();

    paths
        .par_iter()
        .map(|(path, buffer)| save_png(buffer, path))
        .collect::<Result<Vec<()>>>()?;

    for path in &paths {
        log::info!("Image normalisée écrite : {}", path.0.display());
    }
    Ok(paths.into_iter().map(|(path, _)| path).collect())
}
