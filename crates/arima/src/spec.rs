//! Seasonal ARIMA order specification.

use std::fmt;

use crate::error::ArimaError;

/// Orders of a seasonal ARIMA `(p,d,q)(P,D,Q)ₛ` model.
///
/// The value carries no coefficients; see
/// [`SeasonalArimaModel`](crate::SeasonalArimaModel) for a concrete model.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct SeasonalArimaSpec {
    p: usize,
    d: usize,
    q: usize,
    bp: usize,
    bd: usize,
    bq: usize,
    period: usize,
}

impl SeasonalArimaSpec {
    /// Creates a `(p,d,q)(bp,bd,bq)` specification with the given period.
    ///
    /// # Errors
    ///
    /// [`ArimaError::InvalidOrder`] when `period == 0`, or when seasonal
    /// orders are requested for a non-seasonal (`period == 1`) series.
    ///
    /// # Example
    ///
    /// ```
    /// use sadj_arima::SeasonalArimaSpec;
    ///
    /// let spec = SeasonalArimaSpec::new(0, 1, 1, 0, 1, 1, 12).unwrap();
    /// assert!(spec.is_airline());
    /// assert_eq!(spec.to_string(), "(0,1,1)(0,1,1)12");
    /// ```
    pub fn new(
        p: usize,
        d: usize,
        q: usize,
        bp: usize,
        bd: usize,
        bq: usize,
        period: usize,
    ) -> Result<Self, ArimaError> {
        if period == 0 {
            return Err(ArimaError::InvalidOrder {
                reason: "period must be at least 1".to_string(),
            });
        }
        if period == 1 && bp + bd + bq > 0 {
            return Err(ArimaError::InvalidOrder {
                reason: "seasonal orders require a period above 1".to_string(),
            });
        }
        Ok(Self {
            p,
            d,
            q,
            bp,
            bd,
            bq,
            period,
        })
    }

    /// Non-seasonal `(p,d,q)` specification.
    pub fn regular(p: usize, d: usize, q: usize) -> Self {
        Self {
            p,
            d,
            q,
            bp: 0,
            bd: 0,
            bq: 0,
            period: 1,
        }
    }

    /// The airline specification `(0,1,1)(0,1,1)ₛ`.
    ///
    /// A period of 1 yields the non-seasonal `(0,1,1)`.
    pub fn airline(period: usize) -> Self {
        if period <= 1 {
            return Self::regular(0, 1, 1);
        }
        Self {
            p: 0,
            d: 1,
            q: 1,
            bp: 0,
            bd: 1,
            bq: 1,
            period,
        }
    }

    /// Regular AR order.
    pub fn p(&self) -> usize {
        self.p
    }

    /// Regular differencing order.
    pub fn d(&self) -> usize {
        self.d
    }

    /// Regular MA order.
    pub fn q(&self) -> usize {
        self.q
    }

    /// Seasonal AR order.
    pub fn bp(&self) -> usize {
        self.bp
    }

    /// Seasonal differencing order.
    pub fn bd(&self) -> usize {
        self.bd
    }

    /// Seasonal MA order.
    pub fn bq(&self) -> usize {
        self.bq
    }

    /// Seasonal period.
    pub fn period(&self) -> usize {
        self.period
    }

    /// Replaces the regular orders.
    pub fn with_regular(self, p: usize, d: usize, q: usize) -> Self {
        Self { p, d, q, ..self }
    }

    /// Replaces the seasonal orders. Ignored for non-seasonal specifications.
    pub fn with_seasonal(self, bp: usize, bd: usize, bq: usize) -> Self {
        if self.period == 1 {
            return self;
        }
        Self { bp, bd, bq, ..self }
    }

    /// True for `(0,1,1)(0,1,1)ₛ` with `s > 1`.
    pub fn is_airline(&self) -> bool {
        self.period > 1
            && (self.p, self.d, self.q, self.bp, self.bd, self.bq) == (0, 1, 1, 0, 1, 1)
    }

    /// True when the model has any seasonal term.
    pub fn is_seasonal(&self) -> bool {
        self.bp + self.bd + self.bq > 0
    }

    /// Degree of the full differencing operator `d + s·D`.
    pub fn differencing_degree(&self) -> usize {
        self.d + self.period * self.bd
    }

    /// Degree of the full stationary AR operator `p + s·P`.
    pub fn ar_degree(&self) -> usize {
        self.p + self.period * self.bp
    }

    /// Degree of the full MA operator `q + s·Q`.
    pub fn ma_degree(&self) -> usize {
        self.q + self.period * self.bq
    }

    /// Number of free ARMA coefficients.
    pub fn n_coefficients(&self) -> usize {
        self.p + self.q + self.bp + self.bq
    }

    /// Sum of all orders, used as a size measure of the model.
    pub fn order_sum(&self) -> usize {
        self.p + self.d + self.q + self.bp + self.bd + self.bq
    }
}

impl fmt::Display for SeasonalArimaSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.p, self.d, self.q)?;
        if self.period > 1 {
            write!(f, "({},{},{}){}", self.bp, self.bd, self.bq, self.period)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spec_accessors() {
        let spec = SeasonalArimaSpec::new(2, 1, 0, 1, 1, 1, 4).unwrap();
        assert_eq!((spec.p(), spec.d(), spec.q()), (2, 1, 0));
        assert_eq!((spec.bp(), spec.bd(), spec.bq()), (1, 1, 1));
        assert_eq!(spec.period(), 4);
        assert_eq!(spec.ar_degree(), 6);
        assert_eq!(spec.differencing_degree(), 5);
        assert_eq!(spec.ma_degree(), 4);
        assert_eq!(spec.n_coefficients(), 4);
    }

    #[test]
    fn zero_period_rejected() {
        let err = SeasonalArimaSpec::new(0, 1, 1, 0, 0, 0, 0).unwrap_err();
        assert!(matches!(err, ArimaError::InvalidOrder { .. }));
    }

    #[test]
    fn seasonal_orders_need_period() {
        assert!(SeasonalArimaSpec::new(0, 1, 1, 0, 1, 1, 1).is_err());
        assert!(SeasonalArimaSpec::new(1, 1, 1, 0, 0, 0, 1).is_ok());
    }

    #[test]
    fn airline_detection() {
        assert!(SeasonalArimaSpec::airline(12).is_airline());
        assert!(!SeasonalArimaSpec::airline(1).is_airline());
        let spec = SeasonalArimaSpec::airline(4).with_regular(1, 1, 1);
        assert!(!spec.is_airline());
    }

    #[test]
    fn display_format() {
        assert_eq!(
            SeasonalArimaSpec::airline(12).to_string(),
            "(0,1,1)(0,1,1)12"
        );
        assert_eq!(SeasonalArimaSpec::regular(1, 1, 0).to_string(), "(1,1,0)");
    }

    #[test]
    fn spec_is_copy() {
        let a = SeasonalArimaSpec::airline(12);
        let b = a;
        assert_eq!(a, b);
    }
}
