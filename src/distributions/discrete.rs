use crate::distributions::OneD;
use crate::error::{Result, TransportError};
use crate::unitf64::UnitF64;
use crate::utils::check_ascending;

//=====================================================================
// Discrete outcomes with weights. Sampling is a direct draw, nothing
// is interpolated. The CDF is 0 below the first outcome and 1 above
// the last one.
//=====================================================================
#[derive(Debug, Clone, PartialEq)]
pub struct DiscreteDistribution {
    values: Vec<f64>,
    weights: Vec<f64>,
    cdf: Vec<f64>,
    normalization: f64,
}

impl DiscreteDistribution {
    pub fn new(values: Vec<f64>, weights: Vec<f64>) -> Result<Self> {
        if values.is_empty() || values.len() != weights.len() {
            return Err(TransportError::data_integrity(
                "discrete distribution",
                format!("found {} values and {} weights", values.len(), weights.len()),
            ));
        }
        check_ascending(&values, "discrete distribution")?;
        if weights.iter().any(|weight| !(weight.is_finite() && *weight >= 0.0)) {
            return Err(TransportError::data_integrity("discrete distribution", "weights must be non-negative"));
        }
        let normalization: f64 = weights.iter().sum();
        if !(normalization > 0.0) {
            return Err(TransportError::data_integrity("discrete distribution", "weights sum to zero"));
        }

        let mut running = 0.0;
        let mut cdf: Vec<f64> = weights
            .iter()
            .map(|weight| {
                running += weight;
                running / normalization
            })
            .collect();
        if let Some(last) = cdf.last_mut() {
            *last = 1.0;
        }
        Ok(Self { values, weights, cdf, normalization })
    }

    // Outcomes given by their cumulative probabilities
    pub fn from_cdf(values: Vec<f64>, cdf: Vec<f64>) -> Result<Self> {
        let mut previous = 0.0;
        let weights = cdf
            .iter()
            .map(|&value| {
                let weight = value - previous;
                previous = value;
                weight
            })
            .collect();
        Self::new(values, weights)
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn probabilities(&self) -> impl Iterator<Item = f64> + '_ {
        self.weights.iter().map(|weight| weight / self.normalization)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn sample_index_with_random_number(&self, random_number: UnitF64) -> usize {
        self.cdf
            .partition_point(|&value| value <= random_number.0)
            .min(self.values.len() - 1)
    }
}

impl OneD for DiscreteDistribution {
    fn evaluate(&self, x: f64) -> Result<f64> {
        Ok(match self.values.binary_search_by(|value| value.total_cmp(&x)) {
            Ok(index) => self.weights[index],
            Err(_) => 0.0,
        })
    }

    fn evaluate_pdf(&self, x: f64) -> Result<f64> {
        Ok(self.evaluate(x)? / self.normalization)
    }

    fn evaluate_cdf(&self, x: f64) -> Result<f64> {
        let count = self.values.partition_point(|&value| value <= x);
        Ok(if count == 0 { 0.0 } else { self.cdf[count - 1] })
    }

    fn sample_with_random_number(&self, random_number: UnitF64) -> f64 {
        self.values[self.sample_index_with_random_number(random_number)]
    }

    fn lower_bound(&self) -> f64 {
        self.values[0]
    }

    fn upper_bound(&self) -> f64 {
        self.values[self.values.len() - 1]
    }

    fn normalization_constant(&self) -> f64 {
        self.normalization
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_abs_diff_eq;

    #[test]
    fn test_direct_draws() {
        let distribution = DiscreteDistribution::new(vec![0.1, 0.5, 0.9], vec![1.0, 2.0, 1.0]).unwrap();
        assert_eq!(distribution.sample_with_random_number(UnitF64(0.0)), 0.1);
        assert_eq!(distribution.sample_with_random_number(UnitF64(0.25)), 0.5);
        assert_eq!(distribution.sample_with_random_number(UnitF64(0.74)), 0.5);
        assert_eq!(distribution.sample_with_random_number(UnitF64(0.99)), 0.9);
        assert_eq!(distribution.sample_index_with_random_number(UnitF64(1.0)), 2);
    }

    #[test]
    fn test_evaluation() {
        let distribution = DiscreteDistribution::new(vec![0.1, 0.5, 0.9], vec![1.0, 2.0, 1.0]).unwrap();
        assert_abs_diff_eq!(distribution.evaluate(0.5).unwrap(), 2.0);
        assert_abs_diff_eq!(distribution.evaluate_pdf(0.5).unwrap(), 0.5);
        assert_abs_diff_eq!(distribution.evaluate(0.3).unwrap(), 0.0);
        assert_abs_diff_eq!(distribution.evaluate_cdf(0.0).unwrap(), 0.0);
        assert_abs_diff_eq!(distribution.evaluate_cdf(0.5).unwrap(), 0.75);
        assert_abs_diff_eq!(distribution.evaluate_cdf(5.0).unwrap(), 1.0);
    }

    #[test]
    fn test_from_cdf() {
        let distribution = DiscreteDistribution::from_cdf(vec![1.0, 2.0], vec![0.25, 1.0]).unwrap();
        let probabilities: Vec<f64> = distribution.probabilities().collect();
        assert_abs_diff_eq!(probabilities[0], 0.25);
        assert_abs_diff_eq!(probabilities[1], 0.75);
        assert!(DiscreteDistribution::new(vec![1.0], vec![0.0]).is_err());
    }
}
