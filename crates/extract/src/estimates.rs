//! Estimated component series.

use sadj_ucm::ComponentKind;

/// One estimated series with its standard errors and forecasts.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ComponentSeries {
    /// In-sample estimates.
    pub values: Vec<f64>,
    /// Standard errors of the in-sample estimates.
    pub stdev: Vec<f64>,
    /// Forecasts beyond the sample.
    pub forecasts: Vec<f64>,
    /// Standard errors of the forecasts.
    pub forecast_stdev: Vec<f64>,
}

impl ComponentSeries {
    /// Number of in-sample points.
    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Forecast horizon.
    pub fn horizon(&self) -> usize {
        self.forecasts.len()
    }
}

/// The output of a [`ComponentEstimator`](crate::ComponentEstimator).
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ComponentEstimates {
    /// The observed series with zero standard errors, followed by its own
    /// forecasts.
    pub series: ComponentSeries,
    components: [Option<ComponentSeries>; 4],
}

impl ComponentEstimates {
    /// Assembles estimates; `components` is indexed by
    /// [`ComponentKind::index`].
    pub fn new(series: ComponentSeries, components: [Option<ComponentSeries>; 4]) -> Self {
        Self { series, components }
    }

    /// Estimates of one component, `None` when the model lacks it.
    pub fn component(&self, kind: ComponentKind) -> Option<&ComponentSeries> {
        self.components[kind.index()].as_ref()
    }

    /// Mutable access, used when post-processing a component in place.
    pub fn component_mut(&mut self, kind: ComponentKind) -> Option<&mut ComponentSeries> {
        self.components[kind.index()].as_mut()
    }

    /// Inserts or replaces one component.
    pub fn set_component(&mut self, kind: ComponentKind, series: ComponentSeries) {
        self.components[kind.index()] = Some(series);
    }

    /// Present components in decomposition order.
    pub fn iter(&self) -> impl Iterator<Item = (ComponentKind, &ComponentSeries)> {
        ComponentKind::ALL
            .into_iter()
            .filter_map(|k| self.component(k).map(|c| (k, c)))
    }

    /// Largest absolute gap between the series and the sum of its
    /// components, in sample.
    pub fn reconstruction_error(&self) -> f64 {
        let mut worst = 0.0_f64;
        for (t, y) in self.series.values.iter().enumerate() {
            let sum: f64 = self.iter().map(|(_, c)| c.values[t]).sum();
            worst = worst.max((sum - y).abs());
        }
        worst
    }
}
