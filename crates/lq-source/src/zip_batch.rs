use std::fs::File;
use std::io::{Read, Seek};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use lq_core::config::BatchConfig;
use lq_core::error::CoreError;
use lq_core::frame::NamedImage;
use lq_core::traits::BatchSource;
use rayon::prelude::*;
use zip::ZipArchive;

use crate::folder_batch::{has_extension, warn_on_count};
use crate::image::decode_gray;
use crate::resize::conform;

/// Source qui lit les images d'une archive zip.
///
/// Ordre : celui des entrées dans l'archive. Le nom de chaque image est le
/// nom de base de son entrée. Les dossiers, les entrées cachées et les
/// extensions non reconnues sont ignorés.
///
/// # Example
/// ```no_run
/// use lq_core::config::BatchConfig;
/// use lq_core::traits::BatchSource;
/// use lq_source::zip_batch::ZipSource;
/// use std::path::Path;
///
/// let mut source = ZipSource::new(Path::new("test_images.zip"), &BatchConfig::default()).unwrap();
/// let images = source.load().unwrap();
/// ```
pub struct ZipSource {
    path: PathBuf,
    extensions: Vec<String>,
    width: u32,
    height: u32,
    expected_count: usize,
}

impl ZipSource {
    /// Crée une source lisant l'archive `path`.
    ///
    /// # Errors
    /// Retourne [`CoreError::FileNotFound`] si l'archive n'existe pas.
    pub fn new(path: &Path, config: &BatchConfig) -> Result<Self> {
        if !path.is_file() {
            return Err(CoreError::FileNotFound {
                path: path.display().to_string(),
            }
            .into());
        }
        Ok(Self {
            path: path.to_path_buf(),
            extensions: config.extensions.clone(),
            width: config.width,
            height: config.height,
            expected_count: config.expected_count,
        })
    }
}

/// Extrait les entrées images d'une archive : `(nom de base, octets encodés)`.
///
/// # Errors
/// Returns [`CoreError::MalformedInput`] if the archive is not a readable zip,
/// or an I/O error if an entry cannot be read.
pub fn read_entries<R: Read + Seek>(
    reader: R,
    archive_name: &str,
    extensions: &[String],
) -> Result<Vec<(String, Vec<u8>)>> {
    let malformed = |e: zip::result::ZipError| CoreError::MalformedInput {
        name: archive_name.to_string(),
        reason: e.to_string(),
    };
    let mut archive = ZipArchive::new(reader).map_err(malformed)?;

    let mut entries = Vec::new();
    for i in 0..archive.len() {
        let mut file = archive.by_index(i).map_err(malformed)?;
        let entry_name = file.name().to_string();
        let base = entry_name.rsplit('/').next().unwrap_or_default().to_string();
        if file.is_dir()
            || base.is_empty()
            || base.starts_with('.')
            || !has_extension(Path::new(&base), extensions)
        {
            continue;
        }
        let mut bytes = Vec::with_capacity(file.size() as usize);
        file.read_to_end(&mut bytes)
            .with_context(|| format!("Lecture impossible de {entry_name} dans {archive_name}"))?;
        entries.push((base, bytes));
    }
    Ok(entries)
}

impl BatchSource for ZipSource {
    fn load(&mut self) -> Result<Vec<NamedImage>> {
        let archive_name = self.path.display().to_string();
        let file = File::open(&self.path)
            .with_context(|| format!("Impossible d'ouvrir {archive_name}"))?;
        let entries = read_entries(file, &archive_name, &self.extensions)?;
        warn_on_count(entries.len(), self.expected_count, &archive_name);

        // Decoding is parallel; the indexed collect keeps archive order.
        let images = entries
            .par_iter()
            .map(|(name, bytes)| -> Result<NamedImage> {
                let buffer = decode_gray(name, bytes)?;
                let buffer = conform(name, buffer, self.width, self.height)?;
                Ok(NamedImage::new(name.clone(), buffer))
            })
            .collect::<Result<Vec<_>>>()?;

        log::info!("{} images extraites de {archive_name}", images.len());
        Ok(images)
    }

    fn describe(&self) -> String {
        format!("archive {}", self.path.display())
    }
}
