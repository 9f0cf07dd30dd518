use crate::distributions::OneD;
use crate::error::{Result, TransportError, check_range};
use crate::unitf64::UnitF64;

// Constant value over [lower, upper]
#[derive(Debug, Clone, PartialEq)]
pub struct UniformDistribution {
    lower: f64,
    upper: f64,
    value: f64,
}

impl UniformDistribution {
    pub fn new(lower: f64, upper: f64, value: f64) -> Result<Self> {
        if !(lower < upper) || !(value > 0.0) || !upper.is_finite() || !lower.is_finite() {
            return Err(TransportError::data_integrity(
                "uniform distribution",
                format!("invalid domain [{}, {}] or value {}", lower, upper, value),
            ));
        }
        Ok(Self { lower, upper, value })
    }

    pub fn isotropic_cosine() -> Self {
        Self { lower: -1.0, upper: 1.0, value: 0.5 }
    }
}

impl OneD for UniformDistribution {
    fn evaluate(&self, x: f64) -> Result<f64> {
        check_range("uniform distribution argument", x, self.lower, self.upper)?;
        Ok(self.value)
    }

    fn evaluate_pdf(&self, x: f64) -> Result<f64> {
        check_range("uniform distribution argument", x, self.lower, self.upper)?;
        Ok(1.0 / (self.upper - self.lower))
    }

    fn evaluate_cdf(&self, x: f64) -> Result<f64> {
        check_range("uniform distribution argument", x, self.lower, self.upper)?;
        Ok((x - self.lower) / (self.upper - self.lower))
    }

    fn sample_with_random_number(&self, random_number: UnitF64) -> f64 {
        self.lower + random_number.0 * (self.upper - self.lower)
    }

    fn lower_bound(&self) -> f64 {
        self.lower
    }

    fn upper_bound(&self) -> f64 {
        self.upper
    }

    fn normalization_constant(&self) -> f64 {
        self.value * (self.upper - self.lower)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_abs_diff_eq;

    #[test]
    fn test_uniform() {
        let distribution = UniformDistribution::new(2.0, 6.0, 3.0).unwrap();
        assert_abs_diff_eq!(distribution.evaluate(3.0).unwrap(), 3.0);
        assert_abs_diff_eq!(distribution.evaluate_pdf(3.0).unwrap(), 0.25);
        assert_abs_diff_eq!(distribution.evaluate_cdf(3.0).unwrap(), 0.25);
        assert_abs_diff_eq!(distribution.sample_with_random_number(UnitF64(0.5)), 4.0);
        assert_abs_diff_eq!(distribution.normalization_constant(), 12.0);
        assert!(distribution.evaluate(7.0).is_err());
        assert!(UniformDistribution::new(1.0, 1.0, 1.0).is_err());
    }
}
