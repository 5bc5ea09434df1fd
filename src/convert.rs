//! Pure conversion functions: TOML config structs -> crate API config types.

use anyhow::{Context, Result, anyhow, bail};

use sadj_arima::{SeasonalArimaModel, SeasonalArimaSpec};
use sadj_seats::{
    ApproximationConfig, ApproximationMode, EstimationMethod, Horizon, SeatsConfig,
    SelectorConfig, TransitionTable, ValidatorConfig,
};

use crate::config::*;

/// Parses an approximation mode name.
pub fn parse_mode(s: &str) -> Result<ApproximationMode> {
    match s.to_lowercase().as_str() {
        "none" => Ok(ApproximationMode::None),
        "legacy" => Ok(ApproximationMode::Legacy),
        "noisy" => Ok(ApproximationMode::Noisy),
        other => bail!("unknown approximation mode: {other:?}"),
    }
}

/// Parses a transition table name.
pub fn parse_table(s: &str) -> Result<TransitionTable> {
    match s.to_lowercase().replace(['-', '_'], "").as_str() {
        "original" => Ok(TransitionTable::Original),
        "knownanswer" => Ok(TransitionTable::KnownAnswer),
        other => bail!("unknown transition table: {other:?}"),
    }
}

/// Parses an estimation method name.
pub fn parse_method(s: &str) -> Result<EstimationMethod> {
    s.parse::<EstimationMethod>().map_err(|e| anyhow!(e))
}

/// Parses a forecast horizon: `"24"` periods or `"2y"` years.
pub fn parse_horizon(s: &str) -> Result<Horizon> {
    let s = s.trim();
    if let Some(years) = s.strip_suffix(['y', 'Y']) {
        let n = years
            .trim()
            .parse()
            .with_context(|| format!("invalid horizon: {s:?}"))?;
        return Ok(Horizon::Years(n));
    }
    let n = s
        .parse()
        .with_context(|| format!("invalid horizon: {s:?}"))?;
    Ok(Horizon::Count(n))
}

/// Builds a [`SeatsConfig`] from the decomposition and series sections.
pub fn build_seats_config(dec: &DecompositionToml, series: &SeriesToml) -> Result<SeatsConfig> {
    let approximation = ApproximationConfig::new()
        .with_mode(parse_mode(&dec.approximation)?)
        .with_table(parse_table(&dec.table)?)
        .with_exact_likelihood(dec.exact_likelihood);
    let cfg = SeatsConfig::new()
        .with_validator(ValidatorConfig::new().with_xl(dec.xl))
        .with_selector(
            SelectorConfig::new()
                .with_rmod(dec.rmod)
                .with_epsphi(dec.epsphi),
        )
        .with_approximation(approximation)
        .with_method(parse_method(&dec.method)?)
        .with_horizon(parse_horizon(&dec.horizon)?)
        .with_log(series.log)
        .with_mean_correction(dec.mean);
    cfg.validate()?;
    Ok(cfg)
}

/// Builds the fitted model from the `[model]` section.
///
/// The period comes from `model.period`, else `series.frequency`; when both
/// are given they must agree.
pub fn build_model(model: &ModelToml, series: &SeriesToml) -> Result<SeasonalArimaModel> {
    let period = match model.period {
        Some(p) if p != series.frequency && series.frequency > 1 => {
            bail!(
                "model period {p} differs from series frequency {}",
                series.frequency
            )
        }
        Some(p) => p,
        None => series.frequency,
    };
    let [p, d, q] = model.regular;
    let [bp, bd, bq] = model.seasonal;
    // a non-seasonal frequency with no seasonal orders is a regular model
    let spec = if period <= 1 && bp + bd + bq == 0 {
        SeasonalArimaSpec::regular(p, d, q)
    } else {
        SeasonalArimaSpec::new(p, d, q, bp, bd, bq, period)?
    };
    let m = SeasonalArimaModel::new(
        spec,
        model.phi.clone(),
        model.bphi.clone(),
        model.theta.clone(),
        model.btheta.clone(),
        model.variance,
    )
    .with_context(|| format!("invalid coefficients for {spec}"))?;
    Ok(m)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(s: &str) -> SadjConfig {
        toml::from_str(s).unwrap()
    }

    #[test]
    fn names_parse_case_insensitively() {
        assert_eq!(parse_mode("Noisy").unwrap(), ApproximationMode::Noisy);
        assert_eq!(parse_table("known-answer").unwrap(), TransitionTable::KnownAnswer);
        assert_eq!(parse_method("kalman").unwrap(), EstimationMethod::Smoother);
        assert!(parse_mode("loud").is_err());
        assert!(parse_table("guess").is_err());
        assert!(parse_method("x11").is_err());
    }

    #[test]
    fn horizons() {
        assert_eq!(parse_horizon("24").unwrap(), Horizon::Count(24));
        assert_eq!(parse_horizon("2y").unwrap(), Horizon::Years(2));
        assert_eq!(parse_horizon(" 0 ").unwrap(), Horizon::Count(0));
        assert!(parse_horizon("two").is_err());
        assert!(parse_horizon("-1").is_err());
    }

    #[test]
    fn airline_from_toml() {
        let cfg = parse(
            r#"
            [model]
            theta = [-0.4]
            btheta = [-0.5]
            variance = 0.02
            [series]
            frequency = 4
            "#,
        );
        let m = build_model(&cfg.model, &cfg.series).unwrap();
        assert_eq!(m.spec().to_string(), "(0,1,1)(0,1,1)4");
        assert_eq!(m.btheta(), &[-0.5]);
        assert_eq!(m.variance(), 0.02);
    }

    #[test]
    fn period_conflict_and_coefficient_mismatch() {
        let cfg = parse(
            r#"
            [model]
            period = 4
            theta = [-0.4]
            btheta = [-0.5]
            "#,
        );
        let err = build_model(&cfg.model, &cfg.series).unwrap_err();
        assert!(err.to_string().contains("differs"));

        let cfg = parse(
            r#"
            [model]
            theta = [-0.4, 0.1]
            btheta = [-0.5]
            "#,
        );
        assert!(build_model(&cfg.model, &cfg.series).is_err());
    }

    #[test]
    fn seats_config_from_toml() {
        let cfg = parse(
            r#"
            [model]
            theta = [-0.4]
            btheta = [-0.5]
            [series]
            log = true
            [decomposition]
            approximation = "noisy"
            table = "known_answer"
            method = "matrix"
            horizon = "36"
            mean = true
            exact_likelihood = false
            "#,
        );
        let c = build_seats_config(&cfg.decomposition, &cfg.series).unwrap();
        assert!(c.log());
        assert!(c.mean_correction());
        assert_eq!(c.method(), EstimationMethod::ExactMatrix);
        assert_eq!(c.horizon(), Horizon::Count(36));
        assert_eq!(c.approximation().mode(), ApproximationMode::Noisy);
        assert_eq!(c.approximation().table(), TransitionTable::KnownAnswer);
        assert!(!c.approximation().exact_likelihood());
    }

    #[test]
    fn out_of_range_thresholds_fail() {
        let cfg = parse(
            r#"
            [model]
            theta = [-0.4]
            btheta = [-0.5]
            [decomposition]
            xl = 0.5
            "#,
        );
        let err = build_seats_config(&cfg.decomposition, &cfg.series).unwrap_err();
        assert!(err.to_string().contains("xl"));
    }
}
