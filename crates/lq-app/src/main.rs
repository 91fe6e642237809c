use anyhow::Result;
use clap::Parser;
use lq_core::config::{NormalizeConfig, load_config};

pub mod batch;
pub mod cli;

fn main() -> Result<()> {
    // 1. Parser CLI
    let cli = cli::Cli::parse();

    // 2. Initialiser le logging
    env_logger::Builder::new()
        .filter_level(cli.log_level.parse().unwrap_or(log::LevelFilter::Warn))
        .init();

    // 3. Valider la source et la cible avant tout chargement
    cli.validate_source()?;
    cli.validate_target()?;

    // 4. Charger la config
    let config = resolve_config(&cli)?;

    // 5. Lancer le run
    let input = match cli.input {
        Some(ref path) => batch::Input::from_path(path.clone()),
        None => batch::Input::Synthetic,
    };
    let options = batch::RunOptions {
        input,
        output: cli.output.clone(),
        target: cli.target,
        write: !cli.no_write,
    };
    let report = batch::run(&options, &config)?;

    if !report.all_within_threshold() {
        log::warn!(
            "{}/{} images dans la tolérance (score {:.1}/10)",
            report.images_within_threshold,
            report.image_count,
            report.score
        );
    }
    Ok(())
}

/// Config from --config, or defaults when the file is absent.
fn resolve_config(cli: &cli::Cli) -> Result<NormalizeConfig> {
    if cli.config.exists() {
        load_config(&cli.config)
    } else {
        log::warn!(
            "Config introuvable : {}. Utilisation des défauts.",
            cli.config.display()
        );
        Ok(NormalizeConfig::default())
    }
}

