use std::fmt::Write as _;
use std::fs;

use anyhow::{Context, Result, bail};
use sadj_arima::SeasonalArimaModel;
use sadj_seats::SeatsConfig;
use sadj_ucm::{CanonicalDecomposer, ModelValidator, Validation};
use tracing::info;

use crate::cli::InspectArgs;
use crate::config::SadjConfig;
use crate::convert::{build_model, build_seats_config};

/// Execute the `inspect` subcommand.
pub fn run(args: InspectArgs) -> Result<()> {
    let text = fs::read_to_string(&args.config)
        .with_context(|| format!("failed to read config {}", args.config.display()))?;
    let cfg: SadjConfig = toml::from_str(&text).context("failed to parse config")?;

    let seats_config = build_seats_config(&cfg.decomposition, &cfg.series)?;
    let model = build_model(&cfg.model, &cfg.series)?;
    print!("{}", report(&model, &seats_config)?);
    Ok(())
}

/// Validates and decomposes `model` at unit variance and renders the
/// canonical components.
fn report(model: &SeasonalArimaModel, config: &SeatsConfig) -> Result<String> {
    let mut out = String::new();
    writeln!(out, "model     {model}")?;

    let validated = match ModelValidator::new(*config.validator()).validate(model) {
        Validation::Valid => model.clone(),
        Validation::Changed {
            model: replaced,
            cut_off,
            simplified,
        } => {
            writeln!(
                out,
                "validated {replaced} (cut off: {cut_off}, simplified: {simplified})"
            )?;
            replaced
        }
        Validation::Invalid { reason } => bail!("invalid model: {reason}"),
    };

    let decomposition = CanonicalDecomposer::new(config.decomposer())
        .decompose(&validated.with_variance(1.0))
        .with_context(|| format!("{validated} has no canonical decomposition"))?;
    info!(components = decomposition.model.iter().count(), "decomposed");

    if let Some(v) = decomposition.clamped_noise {
        writeln!(out, "noise     clamped from {v:.3e}")?;
    }
    if let Some(d) = decomposition.noise_deficit {
        writeln!(out, "noise     deficit {d:.3e} added to the aggregate")?;
    }
    write!(out, "{}", decomposition.model)?;
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn airline_report_lists_components() {
        let model = SeasonalArimaModel::airline(12, -0.4, -0.5, 1.0).unwrap();
        let text = report(&model, &SeatsConfig::default()).unwrap();
        assert!(text.starts_with("model     (0,1,1)(0,1,1)12"));
        for name in ["trend", "seasonal", "irregular"] {
            assert!(text.contains(name), "{name} missing from\n{text}");
        }
    }

    #[test]
    fn non_decomposable_model_is_an_error() {
        let model = SeasonalArimaModel::airline(12, 0.5, 0.5, 1.0).unwrap();
        assert!(report(&model, &SeatsConfig::default()).is_err());
    }
}
