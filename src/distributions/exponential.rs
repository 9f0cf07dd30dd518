use crate::distributions::OneD;
use crate::error::{Result, TransportError, check_range};
use crate::unitf64::UnitF64;

//=====================================================================
// f(x) = c * exp(-lambda * x) on [lower, upper], upper may be infinite.
//=====================================================================
#[derive(Debug, Clone, PartialEq)]
pub struct ExponentialDistribution {
    multiplier: f64,
    exponent: f64,
    lower: f64,
    upper: f64,
}

impl ExponentialDistribution {
    pub fn new(multiplier: f64, exponent: f64, lower: f64, upper: f64) -> Result<Self> {
        if !(multiplier > 0.0) || !(exponent > 0.0 && exponent.is_finite()) || !lower.is_finite() || !(upper > lower) {
            return Err(TransportError::data_integrity(
                "exponential distribution",
                format!("invalid parameters c = {}, lambda = {} on [{}, {}]", multiplier, exponent, lower, upper),
            ));
        }
        Ok(Self { multiplier, exponent, lower, upper })
    }

    // Decay time distribution of a precursor with the given decay constant
    pub fn decay(decay_constant: f64) -> Result<Self> {
        Self::new(decay_constant, decay_constant, 0.0, f64::INFINITY)
    }

    // exp(-lambda * (upper - lower)), 0 for an unbounded domain
    fn tail(&self) -> f64 {
        (-self.exponent * (self.upper - self.lower)).exp()
    }
}

impl OneD for ExponentialDistribution {
    fn evaluate(&self, x: f64) -> Result<f64> {
        check_range("exponential distribution argument", x, self.lower, self.upper)?;
        Ok(self.multiplier * (-self.exponent * x).exp())
    }

    fn evaluate_pdf(&self, x: f64) -> Result<f64> {
        check_range("exponential distribution argument", x, self.lower, self.upper)?;
        Ok(self.exponent * (-self.exponent * (x - self.lower)).exp() / (1.0 - self.tail()))
    }

    fn evaluate_cdf(&self, x: f64) -> Result<f64> {
        check_range("exponential distribution argument", x, self.lower, self.upper)?;
        Ok(-(-self.exponent * (x - self.lower)).exp_m1() / (1.0 - self.tail()))
    }

    fn sample_with_random_number(&self, random_number: UnitF64) -> f64 {
        self.lower - (1.0 - random_number.0 * (1.0 - self.tail())).ln() / self.exponent
    }

    fn lower_bound(&self) -> f64 {
        self.lower
    }

    fn upper_bound(&self) -> f64 {
        self.upper
    }

    fn normalization_constant(&self) -> f64 {
        self.multiplier / self.exponent * (-self.exponent * self.lower).exp() * (1.0 - self.tail())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::{assert_abs_diff_eq, assert_relative_eq};

    #[test]
    fn test_decay_time() {
        let distribution = ExponentialDistribution::decay(0.1).unwrap();
        assert_abs_diff_eq!(distribution.sample_with_random_number(UnitF64(0.5)), 6.931471805599452, epsilon = 1e-9);
        assert_abs_diff_eq!(distribution.normalization_constant(), 1.0, epsilon = 1e-15);
        assert_relative_eq!(distribution.evaluate_cdf(6.931471805599452).unwrap(), 0.5, max_relative = 1e-12);
    }

    #[test]
    fn test_truncated() {
        let distribution = ExponentialDistribution::new(2.0, 1.0, 0.0, 1.0).unwrap();
        assert_relative_eq!(distribution.evaluate_cdf(1.0).unwrap(), 1.0, max_relative = 1e-12);
        let x = distribution.sample_with_random_number(UnitF64(0.3));
        assert_relative_eq!(distribution.evaluate_cdf(x).unwrap(), 0.3, max_relative = 1e-12);
        assert_relative_eq!(distribution.normalization_constant(), 2.0 * (1.0 - (-1.0f64).exp()), max_relative = 1e-12);
        assert!(distribution.evaluate(1.5).is_err());
    }
}
