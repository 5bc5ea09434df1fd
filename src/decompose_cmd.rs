use std::fs::{self, File};
use std::io::{self, BufWriter};

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::cli::DecomposeArgs;
use crate::config::SadjConfig;
use crate::convert::{build_model, build_seats_config, parse_method};
use crate::series::{read_series, write_csv};

/// Execute the `decompose` subcommand.
pub fn run(args: DecomposeArgs) -> Result<()> {
    let text = fs::read_to_string(&args.config)
        .with_context(|| format!("failed to read config {}", args.config.display()))?;
    let cfg: SadjConfig = toml::from_str(&text).context("failed to parse config")?;

    let mut seats_config = build_seats_config(&cfg.decomposition, &cfg.series)?;
    if let Some(ref m) = args.method {
        seats_config = seats_config.with_method(parse_method(m)?);
    }
    let model = build_model(&cfg.model, &cfg.series)?;

    let input = args
        .input
        .or(cfg.series.path)
        .context("no input series: pass --input or set series.path")?;
    let series = read_series(&input)?;
    info!(
        path = %input.display(),
        n = series.len(),
        %model,
        method = %seats_config.method(),
        "decomposing"
    );

    let result = sadj_seats::decompose(&series, &model, &seats_config)
        .context("decomposition failed")?;

    for w in &result.warnings {
        warn!("{w}");
    }
    if let Some(a) = result.approximation {
        info!(state = %a.state, rounds = a.rounds, model = %result.model, "model approximated");
    }
    info!(
        ser = result.ser,
        cut_off = result.flags.cut_off,
        changed = result.flags.changed,
        seasonal = result.flags.seasonality_present,
        "decomposition complete"
    );

    match args.output {
        Some(path) => {
            let file = File::create(&path)
                .with_context(|| format!("failed to create {}", path.display()))?;
            write_csv(&mut BufWriter::new(file), &result)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), "output written");
        }
        None => write_csv(&mut io::stdout().lock(), &result)?,
    }
    Ok(())
}
