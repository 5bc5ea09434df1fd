//! Integration tests for sadj-ucm: canonical decompositions of common
//! seasonal models.

use approx::assert_abs_diff_eq;
use sadj_arima::{SeasonalArimaModel, SeasonalArimaSpec};
use sadj_ucm::{
    CanonicalDecomposer, ComponentKind, DecomposerConfig, ModelValidator, Validation,
    ValidatorConfig,
};

fn decompose(model: &SeasonalArimaModel) -> sadj_ucm::Decomposition {
    CanonicalDecomposer::new(DecomposerConfig::new())
        .decompose(model)
        .unwrap()
}

#[test]
fn airline_reference_values() {
    let model = SeasonalArimaModel::airline(12, 0.5, -0.6, 1.0).unwrap();
    let d = decompose(&model);
    let ucm = &d.model;

    let trend = ucm.component(ComponentKind::Trend).unwrap();
    assert_abs_diff_eq!(trend.variance(), 0.35996454, epsilon = 1e-6);
    let ma = trend.ma().coefficients();
    assert_eq!(ma.len(), 3);
    assert_abs_diff_eq!(ma[1], 0.0416687, epsilon = 1e-6);
    assert_abs_diff_eq!(ma[2], -0.9583313, epsilon = 1e-6);

    let seasonal = ucm.component(ComponentKind::Seasonal).unwrap();
    assert_abs_diff_eq!(seasonal.variance(), 0.0659509, epsilon = 1e-6);
    assert_eq!(seasonal.differencing().degree(), 11);

    let irregular = ucm.component(ComponentKind::Irregular).unwrap();
    assert_abs_diff_eq!(irregular.variance(), 0.04024858130468502, epsilon = 1e-8);
    assert!(!ucm.has(ComponentKind::Transitory));
    assert!(d.clamped_noise.is_none());
    assert!(!d.changed_aggregate());
}

#[test]
fn closure_holds_for_a_range_of_airlines() {
    for period in [4, 12] {
        for theta in [-0.8, -0.4, 0.0, 0.3] {
            for btheta in [-0.9, -0.5, -0.1] {
                let model = SeasonalArimaModel::airline(period, theta, btheta, 1.0).unwrap();
                let d = decompose(&model);
                let err = d.model.closure_error(500);
                assert!(err < 1e-6, "closure {err} for {model}");
                for kind in ComponentKind::ALL {
                    if let Some(min) = d.model.min_spectrum(kind) {
                        assert!(min >= -1e-9, "{kind} minimum {min} for {model}");
                    }
                }
            }
        }
    }
}

#[test]
fn canonical_components_have_zero_minimum() {
    let model = SeasonalArimaModel::airline(4, -0.3, -0.7, 1.0).unwrap();
    let d = decompose(&model);
    for kind in [ComponentKind::Trend, ComponentKind::Seasonal] {
        let min = d.model.min_spectrum(kind).unwrap();
        assert_abs_diff_eq!(min, 0.0, epsilon = 1e-7);
    }
}

#[test]
fn transitory_from_stationary_ar() {
    // a small positive AR root is transitory
    let spec = SeasonalArimaSpec::new(1, 1, 1, 0, 1, 1, 12).unwrap();
    let model =
        SeasonalArimaModel::new(spec, vec![-0.3], vec![], vec![-0.6], vec![-0.5], 1.0).unwrap();
    let d = decompose(&model);
    let t = d.model.component(ComponentKind::Transitory).unwrap();
    assert_eq!(t.stationary_ar().degree(), 1);
    assert!(d.model.closure_error(300) < 1e-6);
}

#[test]
fn non_seasonal_model_puts_noise_in_trend() {
    let spec = SeasonalArimaSpec::regular(0, 2, 2);
    let model =
        SeasonalArimaModel::new(spec, vec![], vec![], vec![-1.2, 0.4], vec![], 1.0).unwrap();
    let d = decompose(&model);
    assert!(d.model.has(ComponentKind::Trend));
    assert!(!d.model.has(ComponentKind::Seasonal));
    assert!(!d.model.has(ComponentKind::Irregular));
    assert!(d.model.closure_error(300) < 1e-6);
}

#[test]
fn validated_model_decomposes() {
    let model = SeasonalArimaModel::airline(12, -0.99, -0.97, 1.0).unwrap();
    let validator = ModelValidator::new(ValidatorConfig::new());
    let validation = validator.validate(&model);
    assert!(matches!(validation, Validation::Changed { cut_off: true, .. }));
    let valid = validation.model(&model).unwrap();
    assert_eq!(validator.validate(valid), Validation::Valid);
    let d = decompose(valid);
    assert!(d.model.closure_error(300) < 1e-6);
}
