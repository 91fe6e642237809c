use std::path::PathBuf;

use clap::Parser;
use lq_engine::session::validate_target;

/// lumeq : égalisation de luminosité d'un lot d'images en niveaux de gris.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Dossier ou archive .zip d'images à normaliser (PNG par défaut, voir `[batch] extensions`).
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Générer un lot de test à la place d'un dossier (voir `[synthetic]`).
    #[arg(long, default_value_t = false)]
    pub synthetic: bool,

    /// Dossier de sortie des images normalisées et du rapport.
    #[arg(short, long, default_value = ".")]
    pub output: PathBuf,

    /// Intensité cible dans [0, 255]. Défaut : moyenne globale du lot.
    #[arg(long)]
    pub target: Option<f64>,

    /// Fichier de configuration TOML. Défaut : config/default.toml.
    #[arg(short, long, default_value = "config/default.toml")]
    pub config: PathBuf,

    /// N'écrire ni images ni rapport, afficher seulement le résumé.
    #[arg(long, default_value_t = false)]
    pub no_write: bool,

    /// Niveau de log : error, warn, info, debug, trace.
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Cli {
    /// Validate that exactly one image source is provided.
    ///
    /// # Errors
    /// Returns an error if zero or both sources are specified.
    pub fn validate_source(&self) -> anyhow::Result<()> {
        match (self.input.is_some(), self.synthetic) {
            (false, false) => {
                anyhow::bail!("Aucune source spécifiée. Utilisez --input <DOSSIER|ARCHIVE.zip> ou --synthetic.")
            }
            (true, true) => {
                anyhow::bail!("Une seule source à la fois. Spécifiez --input OU --synthetic.")
            }
            _ => Ok(()),
        }
    }

    /// Validate the explicit target, if any, before any image is loaded.
    ///
    /// # Errors
    /// Returns [`lq_core::CoreError::InvalidTarget`] if the target lies outside
    /// [0, 255] or is not finite.
    pub fn validate_target(&self) -> anyhow::Result<()> {
        if let Some(t) = self.target {
            validate_target(t)?;
        }
        Ok(())
    }
}
