use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use lq_engine::session::{SessionReport, TargetSource};

/// Sérialise le rapport en JSON indenté dans `path`.
///
/// Les dossiers parents sont créés si nécessaire.
///
/// # Errors
/// Returns an error if serialization fails or the file cannot be written.
pub fn write_report(report: &SessionReport, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Création impossible de {}", parent.display()))?;
    }
    let json = serde_json::to_string_pretty(report).context("Sérialisation du rapport")?;
    fs::write(path, json).with_context(|| format!("Écriture impossible de {}", path.display()))?;
    log::info!("Rapport écrit : {}", path.display());
    Ok(())
}

/// Résumé textuel d'une session : en-tête statistique puis une ligne par image.
///
/// # Example
/// ```
/// use lq_core::frame::{NamedImage, PixelBuffer};
/// use lq_engine::session::Session;
/// use lq_export::report::summary_lines;
///
/// let images = vec![NamedImage::new("a.png", PixelBuffer::filled(4, 4, 100))];
/// let report = Session::new().run(&images, Some(150.0)).unwrap();
/// let lines = summary_lines(&report);
/// assert!(lines.iter().any(|l| l == "Score: 10.0/10"));
/// ```
#[must_use]
pub fn summary_lines(report: &SessionReport) -> Vec<String> {
    let mut lines = Vec::with_capacity(report.results.len() + 6);

    if let Some(global) = report.global_average {
        lines.push(format!("Global average intensity: {global:.2}"));
    }
    let origin = match report.target_source {
        TargetSource::Explicit => "explicit",
        TargetSource::GlobalAverage => "global average",
    };
    lines.push(format!("Target intensity: {:.2} ({origin})", report.target));
    lines.push(format!(
        "Processing time: {:.2} seconds",
        report.processing_time_secs
    ));
    lines.push(format!("Images processed: {}", report.image_count));
    lines.push(format!(
        "Images within threshold: {}/{}",
        report.images_within_threshold, report.image_count
    ));
    lines.push(format!("Score: {:.1}/10", report.score));

    for r in &report.results {
        let status = if r.within_threshold { "PASSED" } else { "FAILED" };
        lines.push(format!(
            "{status} {}: Avg={:.2}, Diff={:.2}",
            r.name, r.average_intensity, r.difference_from_target
        ));
    }
    lines
}
