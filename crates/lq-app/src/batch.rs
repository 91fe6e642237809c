use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use lq_core::config::NormalizeConfig;
use lq_core::traits::BatchSource;
use lq_engine::session::{Session, SessionReport};
use lq_export::{summary_lines, write_normalized, write_report};
use lq_source::{FolderSource, SyntheticSource, ZipSource};

/// Où lire le lot.
#[derive(Debug, Clone)]
pub enum Input {
    /// Dossier d'images.
    Folder(PathBuf),
    /// Archive zip d'images.
    Zip(PathBuf),
    /// Lot généré depuis `[synthetic]`.
    Synthetic,
}

impl Input {
    /// `--input` : une archive si l'extension est `.zip`, un dossier sinon.
    #[must_use]
    pub fn from_path(path: PathBuf) -> Self {
        let is_zip = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("zip"));
        if is_zip { Self::Zip(path) } else { Self::Folder(path) }
    }
}

/// Paramètres d'un run, résolus depuis la CLI.
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Source du lot.
    pub input: Input,
    /// Dossier recevant les images normalisées et le rapport.
    pub output: PathBuf,
    /// Cible explicite, sinon moyenne globale.
    pub target: Option<f64>,
    /// `false` avec `--no-write`.
    pub write: bool,
}

/// Construit la source correspondant à l'entrée demandée.
///
/// # Errors
/// Retourne une erreur si le dossier d'entrée est introuvable ou illisible.
pub fn open_source(input: &Input, config: &NormalizeConfig) -> Result<Box<dyn BatchSource>> {
    Ok(match input {
        Input::Folder(dir) => Box::new(FolderSource::new(dir, &config.batch)?),
        Input::Zip(path) => Box::new(ZipSource::new(path, &config.batch)?),
        Input::Synthetic => Box::new(SyntheticSource::new(config.synthetic.clone())),
    })
}

/// Run complet : source → session → écriture des images et du rapport.
///
/// # Errors
/// Retourne une erreur si le chargement, la normalisation ou l'écriture échoue.
pub fn run(options: &RunOptions, config: &NormalizeConfig) -> Result<SessionReport> {
    let mut source = open_source(&options.input, config)?;
    log::info!("Chargement depuis {}", source.describe());
    let images = source
        .load()
        .with_context(|| format!("Chargement impossible depuis {}", source.describe()))?;

    let report = Session::new()
        .with_parallel(config.batch.parallel)
        .run(&images, options.target)?;

    if options.write {
        persist(&report, &options.output, config)?;
    } else {
        log::info!("--no-write : aucune écriture");
    }

    for line in summary_lines(&report) {
        log::info!("{line}");
    }
    Ok(report)
}

fn persist(report: &SessionReport, dir: &Path, config: &NormalizeConfig) -> Result<()> {
    let written = write_normalized(report, dir, &config.output.file_prefix)?;
    log::info!("{} images écrites dans {}", written.len(), dir.display());
    if config.output.write_report {
        write_report(report, &dir.join(&config.output.report_name))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use lq_core::CoreError;
    use lq_core::config::SyntheticConfig;

    fn small_config() -> NormalizeConfig {
        NormalizeConfig {
            synthetic: SyntheticConfig {
                size: 16,
                noise_sigma: 0.0,
                ..SyntheticConfig::default()
            },
            ..NormalizeConfig::default()
        }
    }

    #[test]
    fn synthetic_run_writes_images_and_report() {
        let dir = tempfile::tempdir().unwrap();
        let options = RunOptions {
            input: Input::Synthetic,
            output: dir.path().to_path_buf(),
            target: None,
            write: true,
        };
        let report = run(&options, &small_config()).unwrap();

        assert_eq!(report.image_count, 10);
        assert!(dir.path().join("normalized_image1.png").exists());
        assert!(dir.path().join("normalized_image10.png").exists());
        assert!(dir.path().join("report.json").exists());
    }

    #[test]
    fn no_write_leaves_output_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("out");
        let options = RunOptions {
            input: Input::Synthetic,
            output: out.clone(),
            target: Some(120.0),
            write: false,
        };
        let report = run(&options, &small_config()).unwrap();
        assert_eq!(report.target, 120.0);
        assert!(!out.exists());
    }

    #[test]
    fn empty_folder_without_target_is_empty_batch() {
        let dir = tempfile::tempdir().unwrap();
        let options = RunOptions {
            input: Input::Folder(dir.path().to_path_buf()),
            output: dir.path().join("out"),
            target: None,
            write: true,
        };
        let err = run(&options, &small_config()).unwrap_err();
        assert_eq!(err.downcast_ref::<CoreError>(), Some(&CoreError::EmptyBatch));
    }

    #[test]
    fn input_kind_follows_extension() {
        assert!(matches!(
            Input::from_path(PathBuf::from("lot/test_images.ZIP")),
            Input::Zip(_)
        ));
        assert!(matches!(
            Input::from_path(PathBuf::from("lot/images")),
            Input::Folder(_)
        ));
    }

    #[test]
    fn zip_run_normalizes_archive_images() {
        let dir = tempfile::tempdir().unwrap();
        let archive = dir.path().join("test_images.zip");
        let mut zip = zip::ZipWriter::new(std::fs::File::create(&archive).unwrap());
        for (name, value) in [("image1.png", 60u8), ("image2.png", 140)] {
            let mut bytes = Vec::new();
            image::GrayImage::from_pixel(16, 16, image::Luma([value]))
                .write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png)
                .unwrap();
            zip.start_file(name, zip::write::SimpleFileOptions::default())
                .unwrap();
            std::io::Write::write_all(&mut zip, &bytes).unwrap();
        }
        zip.finish().unwrap();

        let options = RunOptions {
            input: Input::from_path(archive),
            output: dir.path().join("out"),
            target: None,
            write: true,
        };
        let mut config = small_config();
        config.batch.width = 16;
        config.batch.height = 16;
        let report = run(&options, &config).unwrap();

        assert_eq!(report.target, 100.0);
        assert_eq!(report.results[0].name, "image1.png");
        assert_eq!(report.score, 10.0);
        assert!(dir.path().join("out").join("normalized_image2.png").exists());
    }
}
