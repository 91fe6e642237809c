use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Configuration complète d'un run de normalisation.
///
/// Sérialisable en TOML. Chaque champ a une valeur par défaut saine.
/// L'intensité cible n'en fait pas partie : c'est un paramètre par run.
///
/// # Example
/// ```
/// use lq_core::config::NormalizeConfig;
/// let config = NormalizeConfig::default();
/// assert_eq!(config.batch.width, 256);
/// assert_eq!(config.batch.expected_count, 10);
/// ```
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct NormalizeConfig {
    /// Ingestion du lot.
    pub batch: BatchConfig,
    /// Écriture des résultats.
    pub output: OutputConfig,
    /// Générateur de lot synthétique.
    pub synthetic: SyntheticConfig,
}

/// Batch ingestion settings.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct BatchConfig {
    /// Résolution attendue (largeur). Les images différentes sont redimensionnées.
    pub width: u32,
    /// Résolution attendue (hauteur).
    pub height: u32,
    /// Nombre d'images attendu. Un écart n'est qu'un avertissement.
    pub expected_count: usize,
    /// Extensions reconnues, sans le point, insensibles à la casse.
    pub extensions: Vec<String>,
    /// Normaliser les images en parallèle (rayon).
    pub parallel: bool,
}

/// Output settings.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct OutputConfig {
    /// Préfixe des fichiers écrits : `<prefix><n>.png`.
    pub file_prefix: String,
    /// Écrire le rapport JSON à côté des images.
    pub write_report: bool,
    /// Nom du rapport JSON.
    pub report_name: String,
}

/// Synthetic batch settings: uniform images with Gaussian noise.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct SyntheticConfig {
    /// Nombre d'images.
    pub count: usize,
    /// Côté des images carrées, en pixels.
    pub size: u32,
    /// Intensité moyenne de la première image.
    pub min_intensity: f64,
    /// Intensité moyenne de la dernière image.
    pub max_intensity: f64,
    /// Écart-type du bruit gaussien. 0 = images uniformes.
    pub noise_sigma: f64,
    /// Graine du générateur.
    pub seed: u64,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            width: 256,
            height: 256,
            expected_count: 10,
            extensions: vec!["png".into()],
            parallel: true,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            file_prefix: "normalized_image".into(),
            write_report: true,
            report_name: "report.json".into(),
        }
    }
}

impl Default for SyntheticConfig {
    fn default() -> Self {
        Self {
            count: 10,
            size: 256,
            min_intensity: 50.0,
            max_intensity: 200.0,
            noise_sigma: 15.0,
            seed: 42,
        }
    }
}

impl NormalizeConfig {
    /// Clamp all numeric fields to their valid ranges.
    /// Called after TOML deserialization to prevent out-of-range values.
    pub fn clamp_all(&mut self) {
        self.batch.width = self.batch.width.clamp(1, 16384);
        self.batch.height = self.batch.height.clamp(1, 16384);
        self.synthetic.size = self.synthetic.size.clamp(1, 16384);

        // TOML accepts nan/inf; f64::clamp panics on a NaN bound.
        let defaults = SyntheticConfig::default();
        for (field, value, fallback) in [
            (
                "min_intensity",
                &mut self.synthetic.min_intensity,
                defaults.min_intensity,
            ),
            (
                "max_intensity",
                &mut self.synthetic.max_intensity,
                defaults.max_intensity,
            ),
            (
                "noise_sigma",
                &mut self.synthetic.noise_sigma,
                defaults.noise_sigma,
            ),
        ] {
            if !value.is_finite() {
                log::warn!("[synthetic] {field} = {value} invalide, défaut {fallback} utilisé");
                *value = fallback;
            }
        }
        self.synthetic.min_intensity = self.synthetic.min_intensity.clamp(0.0, 255.0);
        self.synthetic.max_intensity = self
            .synthetic
            .max_intensity
            .clamp(self.synthetic.min_intensity, 255.0);
        self.synthetic.noise_sigma = self.synthetic.noise_sigma.clamp(0.0, 128.0);
        if self.batch.extensions.is_empty() {
            self.batch.extensions = BatchConfig::default().extensions;
        }
        for ext in &mut self.batch.extensions {
            *ext = ext.trim_start_matches('.').to_lowercase();
        }
        if self.output.file_prefix.is_empty() {
            self.output.file_prefix = OutputConfig::default().file_prefix;
        }
    }
}

/// Structure TOML intermédiaire pour désérialisation avec valeurs optionnelles.
#[derive(Deserialize)]
struct ConfigFile {
    batch: Option<BatchSection>,
    output: Option<OutputSection>,
    synthetic: Option<SyntheticSection>,
}

#[derive(Deserialize)]
struct BatchSection {
    width: Option<u32>,
    height: Option<u32>,
    expected_count: Option<usize>,
    extensions: Option<Vec<String>>,
    parallel: Option<bool>,
}

#[derive(Deserialize)]
struct OutputSection {
    file_prefix: Option<String>,
    write_report: Option<bool>,
    report_name: Option<String>,
}

#[derive(Deserialize)]
struct SyntheticSection {
    count: Option<usize>,
    size: Option<u32>,
    min_intensity: Option<f64>,
    max_intensity: Option<f64>,
    noise_sigma: Option<f64>,
    seed: Option<u64>,
}

/// Charge un fichier TOML et fusionne avec les valeurs par défaut.
///
/// # Errors
/// Returns an error if the file cannot be read or parsed.
///
/// # Example
/// ```no_run
/// use lq_core::config::load_config;
/// use std::path::Path;
/// let config = load_config(Path::new("config/default.toml")).unwrap();
/// ```
pub fn load_config(path: &Path) -> Result<NormalizeConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Impossible de lire {}", path.display()))?;
    let config = parse_config(&content)
        .with_context(|| format!("Erreur de parsing TOML dans {}", path.display()))?;
    log::debug!("Configuration chargée depuis {}", path.display());
    Ok(config)
}

/// Parse TOML content, merging every present field over the defaults.
///
/// # Errors
/// Returns [`CoreError::Config`] if the content is not valid TOML for this schema.
///
/// # Example
/// ```
/// use lq_core::config::parse_config;
/// let config = parse_config("[batch]\nwidth = 64\n").unwrap();
/// assert_eq!(config.batch.width, 64);
/// assert_eq!(config.batch.height, 256);
/// ```
pub fn parse_config(content: &str) -> Result<NormalizeConfig> {
    let file: ConfigFile =
        toml::from_str(content).map_err(|e| CoreError::Config(e.message().to_string()))?;
    let mut config = NormalizeConfig::default();

    if let Some(b) = file.batch {
        if let Some(v) = b.width {
            config.batch.width = v;
        }
        if let Some(v) = b.height {
            config.batch.height = v;
        }
        if let Some(v) = b.expected_count {
            config.batch.expected_count = v;
        }
        if let Some(v) = b.extensions {
            config.batch.extensions = v;
        }
        if let Some(v) = b.parallel {
            config.batch.parallel = v;
        }
    }

    if let Some(o) = file.output {
        if let Some(v) = o.file_prefix {
            config.output.file_prefix = v;
        }
        if let Some(v) = o.write_report {
            config.output.write_report = v;
        }
        if let Some(v) = o.report_name {
            config.output.report_name = v;
        }
    }

    if let Some(s) = file.synthetic {
        if let Some(v) = s.count {
            config.synthetic.count = v;
        }
        if let Some(v) = s.size {
            config.synthetic.size = v;
        }
        if let Some(v) = s.min_intensity {
            config.synthetic.min_intensity = v;
        }
        if let Some(v) = s.max_intensity {
            config.synthetic.max_intensity = v;
        }
        if let Some(v) = s.noise_sigma {
            config.synthetic.noise_sigma = v;
        }
        if let Some(v) = s.seed {
            config.synthetic.seed = v;
        }
    }

    config.clamp_all();
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_yields_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config, NormalizeConfig::default());
    }

    #[test]
    fn partial_sections_merge_over_defaults() {
        let config = parse_config(
            "[batch]\nparallel = false\nextensions = [\".PNG\", \"jpg\"]\n\n[synthetic]\nseed = 7\n",
        )
        .unwrap();
        assert!(!config.batch.parallel);
        assert_eq!(config.batch.extensions, vec!["png", "jpg"]);
        assert_eq!(config.batch.width, 256);
        assert_eq!(config.synthetic.seed, 7);
        assert_eq!(config.output.file_prefix, "normalized_image");
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let config = parse_config(
            "[synthetic]\nmin_intensity = -10.0\nmax_intensity = 400.0\n\n[batch]\nwidth = 0\n",
        )
        .unwrap();
        assert_eq!(config.synthetic.min_intensity, 0.0);
        assert_eq!(config.synthetic.max_intensity, 255.0);
        assert_eq!(config.batch.width, 1);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let err = parse_config("[batch]\nwidth = \"large\"\n").unwrap_err();
        assert!(matches!(
            err.downcast_ref::<CoreError>(),
            Some(CoreError::Config(_))
        ));
    }

    #[test]
    fn load_config_reads_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("lumeq.toml");
        std::fs::write(&path, "[output]\nfile_prefix = \"eq_\"\n").unwrap();
        let config = load_config(&path).unwrap();
        assert_eq!(config.output.file_prefix, "eq_");
    }

    #[test]
    fn shipped_default_toml_matches_defaults() {
        let config = parse_config(include_str!("../../../config/default.toml")).unwrap();
        assert_eq!(config, NormalizeConfig::default());
    }

    #[test]
    fn non_finite_synthetic_values_fall_back_to_defaults() {
        let config =
            parse_config("[synthetic]\nmin_intensity = nan\nmax_intensity = inf\nnoise_sigma = -inf\n")
                .unwrap();
        assert_eq!(config.synthetic.min_intensity, 50.0);
        assert_eq!(config.synthetic.max_intensity, 200.0);
        assert_eq!(config.synthetic.noise_sigma, 15.0);
    }
}
