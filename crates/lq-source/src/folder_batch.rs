use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use lq_core::config::BatchConfig;
use lq_core::error::CoreError;
use lq_core::frame::NamedImage;
use lq_core::traits::BatchSource;
use rayon::prelude::*;

use crate::image::load_gray;
use crate::resize::conform;

/// Source qui charge toutes les images d'un dossier (récursivement).
///
/// Ordre stable : chemins triés. Le nom de chaque image est son chemin
/// relatif à la racine, avec `/` comme séparateur.
///
/// # Example
/// ```no_run
/// use lq_core::config::BatchConfig;
/// use lq_core::traits::BatchSource;
/// use lq_source::folder_batch::FolderSource;
/// use std::path::Path;
///
/// let mut source = FolderSource::new(Path::new("images/"), &BatchConfig::default()).unwrap();
/// let images = source.load().unwrap();
/// ```
pub struct FolderSource {
    root: PathBuf,
    files: Vec<PathBuf>,
    width: u32,
    height: u32,
    expected_count: usize,
}

impl FolderSource {
    /// Crée une source explorant `root`.
    ///
    /// # Errors
    /// Retourne [`CoreError::FileNotFound`] si le dossier n'existe pas, ou une
    /// erreur d'E/S s'il ne peut être lu.
    pub fn new(root: &Path, config: &BatchConfig) -> Result<Self> {
        if !root.is_dir() {
            return Err(CoreError::FileNotFound {
                path: root.display().to_string(),
            }
            .into());
        }
        let mut files = Vec::new();
        Self::scan_dir(root, &config.extensions, &mut files)
            .with_context(|| format!("Lecture impossible de {}", root.display()))?;
        files.sort();

        Ok(Self {
            root: root.to_path_buf(),
            files,
            width: config.width,
            height: config.height,
            expected_count: config.expected_count,
        })
    }

    /// Fichiers retenus, dans l'ordre de chargement.
    #[must_use]
    pub fn files(&self) -> &[PathBuf] {
        &self.files
    }

    /// Extrait récursivement les images reconnues. Les entrées cachées sont ignorées,
    /// les liens vers des dossiers ne sont pas suivis.
    fn scan_dir(dir: &Path, extensions: &[String], files: &mut Vec<PathBuf>) -> Result<()> {
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let file_type = entry.file_type()?;
            let path = entry.path();
            let hidden = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.starts_with('.'));
            if hidden {
                continue;
            }
            if file_type.is_dir() {
                Self::scan_dir(&path, extensions, files)?;
            } else if file_type.is_symlink() && path.is_dir() {
                log::debug!("Lien vers un dossier ignoré : {}", path.display());
            } else if has_extension(&path, extensions) {
                files.push(path);
            }
        }
        Ok(())
    }

    fn name_of(&self, path: &Path) -> String {
        let rel = path.strip_prefix(&self.root).unwrap_or(path);
        rel.components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/")
    }

    /// Charge une image et la ramène à la résolution attendue.
    fn load_one(&self, path: &Path) -> Result<NamedImage> {
        let name = self.name_of(path);
        let buffer = conform(&name, load_gray(path)?, self.width, self.height)?;
        Ok(NamedImage::new(name, buffer))
    }
}

impl BatchSource for FolderSource {
    fn load(&mut self) -> Result<Vec<NamedImage>> {
        warn_on_count(
            self.files.len(),
            self.expected_count,
            &self.root.display().to_string(),
        );

        // Indexed collect keeps path order.
        let images = self
            .files
            .par_iter()
            .map(|path| self.load_one(path))
            .collect::<Result<Vec<_>>>()?;

        log::info!("{} images chargées", images.len());
        Ok(images)
    }

    fn describe(&self) -> String {
        format!("dossier {}", self.root.display())
    }
}

/// Avertit d'un lot vide ou d'un nombre d'images inattendu. Jamais une erreur.
pub(crate) fn warn_on_count(found: usize, expected: usize, origin: &str) {
    if found == 0 {
        log::warn!("Aucune image trouvée dans {origin}");
    } else if found != expected {
        log::warn!("{expected} images attendues, {found} trouvées");
    }
    log::info!("{found} images trouvées dans {origin}");
}

/// `true` si l'extension de `path` figure dans `extensions` (minuscules, sans point).
pub(crate) fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|ext| {
            let ext = ext.to_lowercase();
            extensions.iter().any(|e| *e == ext)
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::GrayImage;

    fn write_png(path: &Path, width: u32, height: u32, value: u8) {
        GrayImage::from_pixel(width, height, image::Luma([value]))
            .save(path)
            .unwrap();
    }

    fn config(width: u32, height: u32) -> BatchConfig {
        BatchConfig {
            width,
            height,
            expected_count: 3,
            ..BatchConfig::default()
        }
    }

    #[test]
    fn loads_sorted_pngs_recursively() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        write_png(&dir.path().join("b.png"), 8, 8, 20);
        write_png(&dir.path().join("a.png"), 8, 8, 10);
        fs::rename(dir.path().join("a.png"), dir.path().join("a.PNG")).unwrap();
        write_png(&dir.path().join("sub").join("c.png"), 8, 8, 30);
        fs::write(dir.path().join("notes.txt"), "ignore me").unwrap();
        fs::write(dir.path().join(".hidden.png"), "not even a png").unwrap();

        let mut source = FolderSource::new(dir.path(), &config(8, 8)).unwrap();
        let images = source.load().unwrap();

        let names: Vec<&str> = images.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["a.PNG", "b.png", "sub/c.png"]);
        assert_eq!(images[0].buffer.data[0], 10);
        assert_eq!(images[2].buffer.data[0], 30);
    }

    #[test]
    fn mismatched_resolution_is_resized() {
        let dir = tempfile::tempdir().unwrap();
        write_png(&dir.path().join("small.png"), 4, 6, 90);

        let mut source = FolderSource::new(dir.path(), &config(16, 16)).unwrap();
        let images = source.load().unwrap();
        assert_eq!(images.len(), 1);
        assert_eq!(images[0].buffer.dimensions(), (16, 16));
    }

    #[test]
    fn empty_folder_yields_empty_batch() {
        let dir = tempfile::tempdir().unwrap();
        let mut source = FolderSource::new(dir.path(), &config(8, 8)).unwrap();
        assert!(source.load().unwrap().is_empty());
    }

    #[test]
    fn corrupt_image_propagates_malformed_input() {
        let dir = tempfile::tempdir().unwrap();
        write_png(&dir.path().join("good.png"), 8, 8, 10);
        fs::write(dir.path().join("bad.png"), b"\x89PNG garbage").unwrap();

        let mut source = FolderSource::new(dir.path(), &config(8, 8)).unwrap();
        let err = source.load().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::MalformedInput { .. })
        ));
    }

    #[test]
    fn missing_folder_is_file_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope");
        let err = FolderSource::new(&missing, &config(8, 8)).err().unwrap();
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::FileNotFound { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn directory_symlinks_are_not_followed() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("sub")).unwrap();
        write_png(&dir.path().join("sub").join("a.png"), 8, 8, 10);
        std::os::unix::fs::symlink(dir.path(), dir.path().join("sub").join("loop")).unwrap();

        let source = FolderSource::new(dir.path(), &config(8, 8)).unwrap();
        assert_eq!(source.files(), [dir.path().join("sub").join("a.png")]);
    }
}
