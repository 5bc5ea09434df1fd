//! Unobserved-components ARIMA models.

use std::f64::consts::PI;
use std::fmt;

use sadj_arima::{ArimaProcess, Polynomial, SymmetricPolynomial};

/// The four additive components of a decomposition.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ComponentKind {
    /// Low-frequency movements, including the regular unit roots.
    Trend,
    /// Movements at the seasonal frequencies.
    Seasonal,
    /// Stationary short-term movements not assigned elsewhere.
    Transitory,
    /// White noise.
    Irregular,
}

impl ComponentKind {
    /// All kinds in decomposition order.
    pub const ALL: [ComponentKind; 4] = [
        ComponentKind::Trend,
        ComponentKind::Seasonal,
        ComponentKind::Transitory,
        ComponentKind::Irregular,
    ];

    /// Position in [`ComponentKind::ALL`].
    pub fn index(self) -> usize {
        match self {
            ComponentKind::Trend => 0,
            ComponentKind::Seasonal => 1,
            ComponentKind::Transitory => 2,
            ComponentKind::Irregular => 3,
        }
    }

    /// Lower-case name, used for series names.
    pub fn name(self) -> &'static str {
        match self {
            ComponentKind::Trend => "trend",
            ComponentKind::Seasonal => "seasonal",
            ComponentKind::Transitory => "transitory",
            ComponentKind::Irregular => "irregular",
        }
    }
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// An ARIMA model written as a sum of up to four component models.
///
/// Absent components contribute nothing. The aggregate is kept alongside so
/// that closure can be checked and so that signal extraction can use the
/// model of the observed series directly.
#[derive(Clone, Debug)]
pub struct UnobservedComponentsModel {
    aggregate: ArimaProcess,
    components: [Option<ArimaProcess>; 4],
}

impl UnobservedComponentsModel {
    /// Creates a model from the aggregate and the components indexed by
    /// [`ComponentKind::index`].
    pub fn new(aggregate: ArimaProcess, components: [Option<ArimaProcess>; 4]) -> Self {
        Self {
            aggregate,
            components,
        }
    }

    /// The model of the observed series.
    pub fn aggregate(&self) -> &ArimaProcess {
        &self.aggregate
    }

    /// The component of the given kind, if present.
    pub fn component(&self, kind: ComponentKind) -> Option<&ArimaProcess> {
        self.components[kind.index()].as_ref()
    }

    /// True when the component is present.
    pub fn has(&self, kind: ComponentKind) -> bool {
        self.components[kind.index()].is_some()
    }

    /// Present components in decomposition order.
    pub fn iter(&self) -> impl Iterator<Item = (ComponentKind, &ArimaProcess)> {
        ComponentKind::ALL
            .into_iter()
            .filter_map(|k| self.component(k).map(|c| (k, c)))
    }

    /// Pseudo-spectrum of a component at `ω`; zero when absent.
    pub fn spectrum(&self, kind: ComponentKind, omega: f64) -> f64 {
        self.component(kind).map_or(0.0, |c| c.spectrum(omega))
    }

    /// Pseudo-spectrum of the aggregate at `ω`.
    pub fn aggregate_spectrum(&self, omega: f64) -> f64 {
        self.aggregate.spectrum(omega)
    }

    /// Largest relative difference between the sum of the component
    /// spectra and the aggregate spectrum over `points` mid-point frequencies
    /// in `(0, π)`.
    pub fn closure_error(&self, points: usize) -> f64 {
        let mut worst = 0.0_f64;
        for k in 0..points {
            let omega = PI * (k as f64 + 0.5) / points as f64;
            let total = self.aggregate_spectrum(omega);
            if !total.is_finite() {
                continue;
            }
            let sum: f64 = ComponentKind::ALL
                .iter()
                .map(|kind| self.spectrum(*kind, omega))
                .sum();
            worst = worst.max((sum - total).abs() / total.abs().max(f64::MIN_POSITIVE));
        }
        worst
    }

    /// Minimum of a component's pseudo-spectrum over `[0, π]`, `None` when
    /// the component is absent.
    pub fn min_spectrum(&self, kind: ComponentKind) -> Option<f64> {
        let c = self.component(kind)?;
        Some(pseudo_spectrum_min(&c.numerator(), &c.denominator(), 1440))
    }

    /// Spectral numerator of the sum of every present component except
    /// `kind`, expressed over the denominator `Π_{j≠kind} |AR_j|²`.
    ///
    /// Returns `(numerator, full AR operator of the sum)`.
    pub fn complement(&self, kind: ComponentKind) -> (SymmetricPolynomial, Polynomial) {
        let others: Vec<&ArimaProcess> = self
            .iter()
            .filter(|(k, _)| *k != kind)
            .map(|(_, c)| c)
            .collect();
        let mut numerator = SymmetricPolynomial::zero();
        let mut ar = Polynomial::one();
        for (i, c) in others.iter().enumerate() {
            let mut term = c.numerator();
            for (j, o) in others.iter().enumerate() {
                if i != j {
                    term = term.mul(&o.denominator());
                }
            }
            numerator = numerator.add(&term);
            ar = &ar * &c.ar();
        }
        (numerator, ar)
    }
}

impl fmt::Display for UnobservedComponentsModel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (kind, c) in self.iter() {
            writeln!(f, "{kind}:")?;
            writeln!(f, "  AR   {}", c.ar())?;
            writeln!(f, "  MA   {}", c.ma())?;
            writeln!(f, "  var  {:.8}", c.variance())?;
        }
        Ok(())
    }
}

/// Minimum of `S(ω)/D(ω)` over `[0, π]`: a grid of `points + 1`
/// frequencies refined by golden-section search around the best point.
///
/// Frequencies where `D` vanishes are skipped; the ratio is infinite there.
pub(crate) fn pseudo_spectrum_min(
    num: &SymmetricPolynomial,
    den: &SymmetricPolynomial,
    points: usize,
) -> f64 {
    let step = PI / points as f64;
    let dmax = (0..=points)
        .map(|k| den.eval(step * k as f64).abs())
        .fold(0.0_f64, f64::max);
    let floor = 1e-13 * dmax.max(f64::MIN_POSITIVE);
    let ratio = |omega: f64| {
        let d = den.eval(omega);
        if d <= floor {
            f64::INFINITY
        } else {
            num.eval(omega) / d
        }
    };

    let (mut best, mut best_k) = (f64::INFINITY, 0);
    for k in 0..=points {
        let v = ratio(step * k as f64);
        if v < best {
            best = v;
            best_k = k;
        }
    }

    let golden = (5.0_f64.sqrt() - 1.0) / 2.0;
    let mut a = step * best_k.saturating_sub(1) as f64;
    let mut b = step * (best_k + 1).min(points) as f64;
    let mut c = b - golden * (b - a);
    let mut d = a + golden * (b - a);
    let (mut fc, mut fd) = (ratio(c), ratio(d));
    for _ in 0..200 {
        if b - a < 1e-12 {
            break;
        }
        if fc < fd {
            b = d;
            d = c;
            fd = fc;
            c = b - golden * (b - a);
            fc = ratio(c);
        } else {
            a = c;
            c = d;
            fc = fd;
            d = a + golden * (b - a);
            fd = ratio(d);
        }
    }
    best.min(fc).min(fd)
}
