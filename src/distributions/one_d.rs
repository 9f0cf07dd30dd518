use std::sync::Arc;

use lazy_static::lazy_static;

use crate::distributions::{
    DiscreteDistribution, EquiprobableBinsDistribution, ExponentialDistribution, TabularDistribution,
    UniformDistribution,
};
use crate::error::{Result, TransportError};
use crate::unitf64::UnitF64;
use crate::utils::RandomNumberStream;

//=====================================================================
// Capabilities shared by every one-dimensional distribution.
//
// `evaluate` returns the (possibly unnormalized) tabulated value,
// `evaluate_pdf` the normalized density and `evaluate_cdf` the
// cumulative probability. Sampling inverts the CDF with one draw.
//=====================================================================
pub trait OneD {
    fn evaluate(&self, x: f64) -> Result<f64>;

    fn evaluate_pdf(&self, x: f64) -> Result<f64>;

    fn evaluate_cdf(&self, x: f64) -> Result<f64>;

    fn sample_with_random_number(&self, random_number: UnitF64) -> f64;

    fn lower_bound(&self) -> f64;

    fn upper_bound(&self) -> f64;

    // Integral of `evaluate` over the whole domain
    fn normalization_constant(&self) -> f64;

    fn sample<R: RandomNumberStream + ?Sized>(&self, rng: &mut R) -> f64 {
        self.sample_with_random_number(rng.next_unit())
    }

    fn sample_and_record_trials<R: RandomNumberStream + ?Sized>(&self, rng: &mut R, trials: &mut u64) -> f64 {
        *trials += 1;
        self.sample(rng)
    }

    // Sample restricted to [lower_bound, max_value]
    fn sample_with_random_number_in_subrange(&self, random_number: UnitF64, max_value: f64) -> Result<f64> {
        if max_value < self.lower_bound() {
            return Err(TransportError::out_of_range(
                "subrange upper bound",
                max_value,
                self.lower_bound(),
                self.upper_bound(),
            ));
        }
        if max_value >= self.upper_bound() {
            return Ok(self.sample_with_random_number(random_number));
        }
        let fraction = self.evaluate_cdf(max_value)?;
        let sample = self.sample_with_random_number(UnitF64::new_unchecked(random_number.0 * fraction));
        Ok(sample.min(max_value))
    }

    fn sample_in_subrange<R: RandomNumberStream + ?Sized>(&self, rng: &mut R, max_value: f64) -> Result<f64> {
        self.sample_with_random_number_in_subrange(rng.next_unit(), max_value)
    }

    fn contains(&self, x: f64) -> bool {
        x >= self.lower_bound() && x <= self.upper_bound()
    }
}

//=====================================================================
// Closed set of one-dimensional distributions.
//=====================================================================
#[derive(Debug, Clone, PartialEq)]
pub enum OneDDistribution {
    Tabular(TabularDistribution),
    Discrete(DiscreteDistribution),
    Uniform(UniformDistribution),
    EquiprobableBins(EquiprobableBinsDistribution),
    Exponential(ExponentialDistribution),
}

lazy_static! {
    static ref ISOTROPIC_COSINE: Arc<OneDDistribution> =
        Arc::new(OneDDistribution::Uniform(UniformDistribution::isotropic_cosine()));
}

impl OneDDistribution {
    // Uniform cosine distribution on [-1, 1], one instance shared by all users
    pub fn isotropic() -> Arc<OneDDistribution> {
        Arc::clone(&ISOTROPIC_COSINE)
    }

    pub fn is_continuous(&self) -> bool {
        !matches!(self, OneDDistribution::Discrete(_))
    }
}

macro_rules! dispatch {
    ($self:ident, $inner:ident => $body:expr) => {
        match $self {
            OneDDistribution::Tabular($inner) => $body,
            OneDDistribution::Discrete($inner) => $body,
            OneDDistribution::Uniform($inner) => $body,
            OneDDistribution::EquiprobableBins($inner) => $body,
            OneDDistribution::Exponential($inner) => $body,
        }
    };
}

impl OneD for OneDDistribution {
    fn evaluate(&self, x: f64) -> Result<f64> {
        dispatch!(self, d => d.evaluate(x))
    }

    fn evaluate_pdf(&self, x: f64) -> Result<f64> {
        dispatch!(self, d => d.evaluate_pdf(x))
    }

    fn evaluate_cdf(&self, x: f64) -> Result<f64> {
        dispatch!(self, d => d.evaluate_cdf(x))
    }

    fn sample_with_random_number(&self, random_number: UnitF64) -> f64 {
        dispatch!(self, d => d.sample_with_random_number(random_number))
    }

    fn lower_bound(&self) -> f64 {
        dispatch!(self, d => d.lower_bound())
    }

    fn upper_bound(&self) -> f64 {
        dispatch!(self, d => d.upper_bound())
    }

    fn normalization_constant(&self) -> f64 {
        dispatch!(self, d => d.normalization_constant())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_abs_diff_eq;

    use crate::distributions::TabularScheme;
    use crate::utils::MockRng;

    #[test]
    fn test_isotropic_is_shared() {
        let first = OneDDistribution::isotropic();
        let second = OneDDistribution::isotropic();
        assert!(Arc::ptr_eq(&first, &second));
        assert_abs_diff_eq!(first.evaluate_pdf(0.3).unwrap(), 0.5);
        assert_abs_diff_eq!(first.sample_with_random_number(UnitF64(0.75)), 0.5);
    }

    #[test]
    fn test_subrange_sampling() {
        let distribution = OneDDistribution::Tabular(
            TabularDistribution::new(TabularScheme::Histogram, vec![0.0, 1.0, 2.0], vec![1.0, 1.0, 1.0]).unwrap(),
        );
        let mut rng = MockRng::new(vec![0.0, 0.5, 0.999999]);
        assert_abs_diff_eq!(distribution.sample_in_subrange(&mut rng, 1.0).unwrap(), 0.0);
        assert_abs_diff_eq!(distribution.sample_in_subrange(&mut rng, 1.0).unwrap(), 0.5);
        assert!(distribution.sample_in_subrange(&mut rng, 1.0).unwrap() <= 1.0);
        assert!(distribution.sample_with_random_number_in_subrange(UnitF64(0.5), -1.0).is_err());
    }

    #[test]
    fn test_trial_counting() {
        let distribution = OneDDistribution::isotropic();
        let mut rng = MockRng::new(vec![0.1, 0.2]);
        let mut trials = 0;
        distribution.sample_and_record_trials(&mut rng, &mut trials);
        distribution.sample_and_record_trials(&mut rng, &mut trials);
        assert_eq!(trials, 2);
    }
}
