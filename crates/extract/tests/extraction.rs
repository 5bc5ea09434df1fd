//! Integration tests: the three estimators on a decomposed airline model.

use approx::assert_abs_diff_eq;
use rand::SeedableRng;
use rand_distr::{Distribution, Normal};
use sadj_arima::{SeasonalArimaModel, SeasonalArimaSpec};
use sadj_extract::{ComponentEstimator, EstimationMethod, ExactMatrix, KalmanSmoother};
use sadj_ucm::{CanonicalDecomposer, ComponentKind, DecomposerConfig, UnobservedComponentsModel};

const METHODS: [EstimationMethod; 3] = [
    EstimationMethod::WienerKolmogorov,
    EstimationMethod::Smoother,
    EstimationMethod::ExactMatrix,
];

fn simulate(model: &SeasonalArimaModel, n: usize, seed: u64) -> Vec<f64> {
    let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
    let normal = Normal::new(0.0, 1.0).unwrap();
    let (ar, ma) = (model.ar(), model.ma());
    let (phi, theta) = (ar.coefficients(), ma.coefficients());
    let e: Vec<f64> = (0..n).map(|_| normal.sample(&mut rng)).collect();
    let mut y = vec![0.0; n];
    for t in 0..n {
        let ma_part: f64 = (0..theta.len().min(t + 1)).map(|j| theta[j] * e[t - j]).sum();
        let ar_part: f64 = (1..phi.len().min(t + 1)).map(|j| phi[j] * y[t - j]).sum();
        y[t] = 100.0 + ma_part - ar_part;
    }
    y
}

fn airline() -> (Vec<f64>, UnobservedComponentsModel) {
    let model = SeasonalArimaModel::airline(12, -0.4, -0.5, 1.0).unwrap();
    let ucm = CanonicalDecomposer::default().decompose(&model).unwrap().model;
    (simulate(&model, 96, 11), ucm)
}

#[test]
fn every_method_reconstructs_the_series() {
    let (y, ucm) = airline();
    for method in METHODS {
        let est = method.estimator().estimate(&y, &ucm, 12, 1.0).unwrap();
        assert!(
            est.reconstruction_error() < 1e-6,
            "{method}: {}",
            est.reconstruction_error()
        );
        for (kind, c) in est.iter() {
            assert_eq!(c.len(), y.len(), "{method} {kind}");
            assert_eq!(c.horizon(), 12, "{method} {kind}");
            assert!(c.stdev.iter().all(|s| s.is_finite() && *s >= 0.0));
        }
    }
}

#[test]
fn four_components_reconstruct_the_series() {
    // the AR root 0.3 is below rmod and becomes a transitory
    let spec = SeasonalArimaSpec::new(1, 1, 1, 0, 1, 1, 12).unwrap();
    let model =
        SeasonalArimaModel::new(spec, vec![-0.3], vec![], vec![-0.4], vec![-0.5], 1.0).unwrap();
    let ucm = CanonicalDecomposer::default().decompose(&model).unwrap().model;
    for kind in ComponentKind::ALL {
        assert!(ucm.has(kind), "{kind} missing");
    }
    let y = simulate(&model, 96, 11);
    for method in METHODS {
        let est = method.estimator().estimate(&y, &ucm, 12, 1.0).unwrap();
        let err = est.reconstruction_error();
        assert!(err < 1e-8, "{method}: {err}");
        assert!(est.component(ComponentKind::Transitory).is_some(), "{method}");
    }
}

#[test]
fn noisy_decomposition_reconstructs_the_series() {
    // canonical noise is about -1.9, so only the noisy decomposer accepts it
    let spec = SeasonalArimaSpec::new(0, 1, 2, 0, 1, 1, 4).unwrap();
    let model =
        SeasonalArimaModel::new(spec, vec![], vec![], vec![1.2, 0.5], vec![0.6], 1.0).unwrap();
    let d = CanonicalDecomposer::new(DecomposerConfig::new().with_noisy(true))
        .decompose(&model)
        .unwrap();
    assert!(d.noise_deficit.is_some());
    assert!(!d.model.has(ComponentKind::Irregular));

    let y = simulate(&model, 64, 5);
    for method in METHODS {
        let est = method.estimator().estimate(&y, &d.model, 4, 1.0).unwrap();
        let err = est.reconstruction_error();
        assert!(err < 1e-6, "{method}: {err}");
        for (kind, c) in est.iter() {
            assert!(c.values.iter().all(|v| v.is_finite()), "{method} {kind}");
        }
    }
}

#[test]
fn methods_agree_in_sample() {
    let (y, ucm) = airline();
    let wk = EstimationMethod::WienerKolmogorov
        .estimator()
        .estimate(&y, &ucm, 0, 1.0)
        .unwrap();
    let ks = KalmanSmoother.estimate(&y, &ucm, 0, 1.0).unwrap();
    let exact = ExactMatrix.estimate(&y, &ucm, 0, 1.0).unwrap();
    for kind in [ComponentKind::Trend, ComponentKind::Seasonal, ComponentKind::Irregular] {
        let (a, b, c) = (
            wk.component(kind).unwrap(),
            ks.component(kind).unwrap(),
            exact.component(kind).unwrap(),
        );
        for t in 0..y.len() {
            assert_abs_diff_eq!(a.values[t], b.values[t], epsilon = 1e-5);
            assert_abs_diff_eq!(b.values[t], c.values[t], epsilon = 1e-6);
            assert_abs_diff_eq!(b.stdev[t], c.stdev[t], epsilon = 1e-6);
        }
    }
}

#[test]
fn seasonal_forecasts_repeat_and_sum() {
    let (y, ucm) = airline();
    let est = KalmanSmoother.estimate(&y, &ucm, 24, 1.0).unwrap();
    let seasonal = est.component(ComponentKind::Seasonal).unwrap();
    // the seasonal forecast function is periodic with zero annual sum
    for h in 0..12 {
        assert_abs_diff_eq!(seasonal.forecasts[h], seasonal.forecasts[h + 12], epsilon = 1e-8);
    }
    assert_abs_diff_eq!(seasonal.forecasts[..12].iter().sum::<f64>(), 0.0, epsilon = 1e-8);
    // components forecast the series
    for h in 0..24 {
        let sum: f64 = est.iter().map(|(_, c)| c.forecasts[h]).sum();
        assert_abs_diff_eq!(sum, est.series.forecasts[h], epsilon = 1e-6);
    }
}

#[test]
fn standard_errors_scale_with_ser() {
    let (y, ucm) = airline();
    let unit = KalmanSmoother.estimate(&y, &ucm, 3, 1.0).unwrap();
    let scaled = KalmanSmoother.estimate(&y, &ucm, 3, 2.5).unwrap();
    let (a, b) = (
        unit.component(ComponentKind::Trend).unwrap(),
        scaled.component(ComponentKind::Trend).unwrap(),
    );
    assert_eq!(a.values, b.values);
    for t in 0..y.len() {
        assert_abs_diff_eq!(b.stdev[t], 2.5 * a.stdev[t], epsilon = 1e-10);
    }
    assert_abs_diff_eq!(
        scaled.series.forecast_stdev[0],
        2.5 * unit.series.forecast_stdev[0],
        epsilon = 1e-10
    );
}
