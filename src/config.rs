use std::path::PathBuf;

use serde::Deserialize;

/// Top-level sadj configuration.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SadjConfig {
    /// The fitted seasonal ARIMA model.
    pub model: ModelToml,

    /// Input series settings.
    #[serde(default)]
    pub series: SeriesToml,

    /// Decomposition settings.
    #[serde(default)]
    pub decomposition: DecompositionToml,
}

/// `(p,d,q)(P,D,Q)s` orders and coefficient tails.
///
/// Coefficients follow the `1 + c₁B + …` sign convention.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ModelToml {
    #[serde(default = "default_regular")]
    pub regular: [usize; 3],
    #[serde(default = "default_seasonal")]
    pub seasonal: [usize; 3],
    /// Seasonal period; falls back to `series.frequency`.
    #[serde(default)]
    pub period: Option<usize>,
    #[serde(default)]
    pub phi: Vec<f64>,
    #[serde(default)]
    pub bphi: Vec<f64>,
    #[serde(default)]
    pub theta: Vec<f64>,
    #[serde(default)]
    pub btheta: Vec<f64>,
    /// Innovation variance.
    #[serde(default = "default_variance")]
    pub variance: f64,
}

fn default_regular() -> [usize; 3] {
    [0, 1, 1]
}
fn default_seasonal() -> [usize; 3] {
    [0, 1, 1]
}
fn default_variance() -> f64 {
    1.0
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SeriesToml {
    pub path: Option<PathBuf>,
    #[serde(default = "default_frequency")]
    pub frequency: usize,
    #[serde(default)]
    pub log: bool,
}

impl Default for SeriesToml {
    fn default() -> Self {
        Self {
            path: None,
            frequency: default_frequency(),
            log: false,
        }
    }
}

fn default_frequency() -> usize {
    12
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DecompositionToml {
    #[serde(default = "default_rmod")]
    pub rmod: f64,
    #[serde(default = "default_epsphi")]
    pub epsphi: f64,
    #[serde(default = "default_xl")]
    pub xl: f64,
    #[serde(default = "default_approximation")]
    pub approximation: String,
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(default = "default_method")]
    pub method: String,
    /// `"<n>"` periods or `"<n>y"` years.
    #[serde(default = "default_horizon")]
    pub horizon: String,
    #[serde(default)]
    pub mean: bool,
    /// Exact maximum likelihood when re-estimating approximations; `false`
    /// uses conditional sum of squares.
    #[serde(default = "default_true")]
    pub exact_likelihood: bool,
}

impl Default for DecompositionToml {
    fn default() -> Self {
        Self {
            rmod: default_rmod(),
            epsphi: default_epsphi(),
            xl: default_xl(),
            approximation: default_approximation(),
            table: default_table(),
            method: default_method(),
            horizon: default_horizon(),
            mean: false,
            exact_likelihood: true,
        }
    }
}

fn default_rmod() -> f64 {
    0.5
}
fn default_epsphi() -> f64 {
    2.0
}
fn default_xl() -> f64 {
    0.95
}
fn default_approximation() -> String {
    "legacy".to_string()
}
fn default_table() -> String {
    "original".to_string()
}
fn default_method() -> String {
    "wk".to_string()
}
fn default_horizon() -> String {
    "1y".to_string()
}
fn default_true() -> bool {
    true
}
