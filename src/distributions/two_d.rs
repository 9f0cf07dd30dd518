use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::distributions::{OneD, OneDDistribution};
use crate::error::{Result, TransportError};
use crate::unitf64::UnitF64;
use crate::utils::{RandomNumberStream, check_ascending, search_bin};

// How the secondary distributions of two neighbouring grid points are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum TwoDSamplingPolicy {
    Correlated,
    UnitBase,
    Exact,
}

// Interpolation along the primary grid, secondary values always combine linearly
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum TwoDGridInterpolation {
    LinLinLin,
    LogLogLog,
}

// What happens for primary values outside of the grid
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum TwoDBoundaryPolicy {
    Clamp,
    Zero,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum GridPosition {
    Outside,
    On(usize),
    Between { lower: usize, fraction: f64 },
}

const CORRELATED_BISECTION_STEPS: usize = 64;

//=====================================================================
// Energy-indexed family of one-dimensional distributions, the
// "scattering function" of an energy-angle or energy-energy table.
//
// Evaluation never caches, so repeated calls with the same arguments
// return identical results.
//=====================================================================
#[derive(Debug, Clone)]
pub struct TwoDDistribution {
    grid: Vec<f64>,
    distributions: Vec<Arc<OneDDistribution>>,
    policy: TwoDSamplingPolicy,
    interpolation: TwoDGridInterpolation,
    boundary: TwoDBoundaryPolicy,
}

impl TwoDDistribution {
    pub fn new(
        grid: Vec<f64>,
        distributions: Vec<Arc<OneDDistribution>>,
        policy: TwoDSamplingPolicy,
        interpolation: TwoDGridInterpolation,
        boundary: TwoDBoundaryPolicy,
    ) -> Result<Self> {
        if grid.is_empty() || grid.len() != distributions.len() {
            return Err(TransportError::data_integrity(
                "two-dimensional distribution",
                format!("found {} grid points and {} distributions", grid.len(), distributions.len()),
            ));
        }
        check_ascending(&grid, "two-dimensional distribution grid")?;
        if interpolation == TwoDGridInterpolation::LogLogLog && !(grid[0] > 0.0) {
            return Err(TransportError::data_integrity(
                "two-dimensional distribution grid",
                "logarithmic interpolation needs a positive grid",
            ));
        }
        Ok(Self { grid, distributions, policy, interpolation, boundary })
    }

    pub fn grid(&self) -> &[f64] {
        &self.grid
    }

    pub fn distributions(&self) -> &[Arc<OneDDistribution>] {
        &self.distributions
    }

    pub fn policy(&self) -> TwoDSamplingPolicy {
        self.policy
    }

    pub fn lower_bound_of_primary(&self) -> f64 {
        self.grid[0]
    }

    pub fn upper_bound_of_primary(&self) -> f64 {
        self.grid[self.grid.len() - 1]
    }

    fn locate(&self, primary: f64) -> Result<GridPosition> {
        let (lower, upper) = (self.lower_bound_of_primary(), self.upper_bound_of_primary());
        if primary.is_nan() || primary < lower || primary > upper {
            return match self.boundary {
                TwoDBoundaryPolicy::Clamp if primary < lower => Ok(GridPosition::On(0)),
                TwoDBoundaryPolicy::Clamp if primary > upper => Ok(GridPosition::On(self.grid.len() - 1)),
                TwoDBoundaryPolicy::Zero if !primary.is_nan() => Ok(GridPosition::Outside),
                _ => Err(TransportError::out_of_range("two-dimensional primary value", primary, lower, upper)),
            };
        }
        if self.grid.len() == 1 {
            return Ok(GridPosition::On(0));
        }
        let bin = search_bin(&self.grid, primary);
        if primary == self.grid[bin] {
            return Ok(GridPosition::On(bin));
        }
        if primary == self.grid[bin + 1] {
            return Ok(GridPosition::On(bin + 1));
        }
        let (e0, e1) = (self.grid[bin], self.grid[bin + 1]);
        let fraction = match self.interpolation {
            TwoDGridInterpolation::LinLinLin => (primary - e0) / (e1 - e0),
            TwoDGridInterpolation::LogLogLog => (primary / e0).ln() / (e1 / e0).ln(),
        };
        Ok(GridPosition::Between { lower: bin, fraction })
    }

    fn interpolate_secondary(&self, lower: f64, upper: f64, fraction: f64) -> f64 {
        lower + fraction * (upper - lower)
    }

    // Secondary value reached by the same random number in both bins
    fn correlated_value(&self, lower: &OneDDistribution, upper: &OneDDistribution, fraction: f64, random_number: UnitF64) -> f64 {
        let lower_value = lower.sample_with_random_number(random_number);
        let upper_value = upper.sample_with_random_number(random_number);
        self.interpolate_secondary(lower_value, upper_value, fraction)
    }

    // Random number which the correlated sampler maps onto `secondary`
    fn correlated_random_number(&self, lower: &OneDDistribution, upper: &OneDDistribution, fraction: f64, secondary: f64) -> f64 {
        let (mut low, mut high) = (0.0, 1.0);
        for _ in 0..CORRELATED_BISECTION_STEPS {
            let middle = 0.5 * (low + high);
            if self.correlated_value(lower, upper, fraction, UnitF64(middle)) < secondary {
                low = middle;
            } else {
                high = middle;
            }
        }
        0.5 * (low + high)
    }

    // Secondary domain at a primary value
    pub fn secondary_bounds(&self, primary: f64) -> Result<(f64, f64)> {
        match self.locate(primary)? {
            GridPosition::Outside => Err(TransportError::out_of_range(
                "two-dimensional primary value",
                primary,
                self.lower_bound_of_primary(),
                self.upper_bound_of_primary(),
            )),
            GridPosition::On(index) => {
                Ok((self.distributions[index].lower_bound(), self.distributions[index].upper_bound()))
            }
            GridPosition::Between { lower, fraction } => {
                let (low, high) = (&self.distributions[lower], &self.distributions[lower + 1]);
                Ok(match self.policy {
                    TwoDSamplingPolicy::Exact => (
                        low.lower_bound().min(high.lower_bound()),
                        low.upper_bound().max(high.upper_bound()),
                    ),
                    _ => (
                        self.interpolate_secondary(low.lower_bound(), high.lower_bound(), fraction),
                        self.interpolate_secondary(low.upper_bound(), high.upper_bound(), fraction),
                    ),
                })
            }
        }
    }

    // Position of `secondary` mapped into a bin by the unit-base transform
    fn unit_base_image(&self, distribution: &OneDDistribution, bounds: (f64, f64), secondary: f64) -> f64 {
        let width = bounds.1 - bounds.0;
        let eta = if width > 0.0 { (secondary - bounds.0) / width } else { 0.0 };
        distribution.lower_bound() + eta * (distribution.upper_bound() - distribution.lower_bound())
    }

    fn width(distribution: &OneDDistribution) -> f64 {
        distribution.upper_bound() - distribution.lower_bound()
    }

    pub fn evaluate(&self, primary: f64, secondary: f64) -> Result<f64> {
        self.evaluate_with(primary, secondary, |distribution, x| distribution.evaluate(x), |distribution| {
            distribution.normalization_constant()
        })
    }

    pub fn evaluate_pdf(&self, primary: f64, secondary: f64) -> Result<f64> {
        self.evaluate_with(primary, secondary, |distribution, x| distribution.evaluate_pdf(x), |_| 1.0)
    }

    // `value` is evaluate or evaluate_pdf of a bin, `scale` its matching normalization
    fn evaluate_with<V, S>(&self, primary: f64, secondary: f64, value: V, scale: S) -> Result<f64>
    where
        V: Fn(&OneDDistribution, f64) -> Result<f64>,
        S: Fn(&OneDDistribution) -> f64,
    {
        let value_or_zero = |distribution: &OneDDistribution, x: f64| {
            if distribution.contains(x) { value(distribution, x) } else { Ok(0.0) }
        };
        let (lower, fraction) = match self.locate(primary)? {
            GridPosition::Outside => return Ok(0.0),
            GridPosition::On(index) => return value_or_zero(&self.distributions[index], secondary),
            GridPosition::Between { lower, fraction } => (lower, fraction),
        };
        let (low, high) = (&*self.distributions[lower], &*self.distributions[lower + 1]);

        match self.policy {
            TwoDSamplingPolicy::Exact => {
                Ok((1.0 - fraction) * value_or_zero(low, secondary)? + fraction * value_or_zero(high, secondary)?)
            }
            TwoDSamplingPolicy::UnitBase => {
                let bounds = self.secondary_bounds(primary)?;
                if secondary < bounds.0 || secondary > bounds.1 {
                    return Ok(0.0);
                }
                let width = bounds.1 - bounds.0;
                if !(width > 0.0) {
                    return Ok(0.0);
                }
                let low_value = value_or_zero(low, self.unit_base_image(low, bounds, secondary))? * Self::width(low);
                let high_value = value_or_zero(high, self.unit_base_image(high, bounds, secondary))? * Self::width(high);
                Ok(((1.0 - fraction) * low_value + fraction * high_value) / width)
            }
            TwoDSamplingPolicy::Correlated => {
                let bounds = self.secondary_bounds(primary)?;
                if secondary < bounds.0 || secondary > bounds.1 {
                    return Ok(0.0);
                }
                let random_number = UnitF64(self.correlated_random_number(low, high, fraction, secondary));
                let low_value = low.sample_with_random_number(random_number);
                let high_value = high.sample_with_random_number(random_number);
                let low_pdf = value_or_zero(low, low_value)? / scale(low);
                let high_pdf = value_or_zero(high, high_value)? / scale(high);
                if !(low_pdf > 0.0 && high_pdf > 0.0) {
                    return Ok(0.0);
                }
                // dx/du along the correlated path
                let derivative = (1.0 - fraction) / low_pdf + fraction / high_pdf;
                let normalization = (1.0 - fraction) * scale(low) + fraction * scale(high);
                Ok(normalization / derivative)
            }
        }
    }

    pub fn evaluate_cdf(&self, primary: f64, secondary: f64) -> Result<f64> {
        let cdf_or_bound = |distribution: &OneDDistribution, x: f64| {
            if x <= distribution.lower_bound() {
                Ok(0.0)
            } else if x >= distribution.upper_bound() {
                Ok(1.0)
            } else {
                distribution.evaluate_cdf(x)
            }
        };
        let (lower, fraction) = match self.locate(primary)? {
            GridPosition::Outside => return Ok(0.0),
            GridPosition::On(index) => return cdf_or_bound(&self.distributions[index], secondary),
            GridPosition::Between { lower, fraction } => (lower, fraction),
        };
        let (low, high) = (&*self.distributions[lower], &*self.distributions[lower + 1]);

        match self.policy {
            TwoDSamplingPolicy::Exact => {
                Ok((1.0 - fraction) * cdf_or_bound(low, secondary)? + fraction * cdf_or_bound(high, secondary)?)
            }
            TwoDSamplingPolicy::UnitBase => {
                let bounds = self.secondary_bounds(primary)?;
                let low_cdf = cdf_or_bound(low, self.unit_base_image(low, bounds, secondary))?;
                let high_cdf = cdf_or_bound(high, self.unit_base_image(high, bounds, secondary))?;
                Ok((1.0 - fraction) * low_cdf + fraction * high_cdf)
            }
            TwoDSamplingPolicy::Correlated => {
                let bounds = self.secondary_bounds(primary)?;
                if secondary <= bounds.0 {
                    return Ok(0.0);
                }
                if secondary >= bounds.1 {
                    return Ok(1.0);
                }
                Ok(self.correlated_random_number(low, high, fraction, secondary))
            }
        }
    }

    pub fn sample<R: RandomNumberStream + ?Sized>(&self, primary: f64, rng: &mut R) -> Result<f64> {
        self.sample_bounded(primary, rng, None)
    }

    pub fn sample_and_record_trials<R: RandomNumberStream + ?Sized>(
        &self,
        primary: f64,
        rng: &mut R,
        trials: &mut u64,
    ) -> Result<f64> {
        *trials += 1;
        self.sample(primary, rng)
    }

    // Sample restricted to secondary values no greater than `max_secondary`
    pub fn sample_in_subrange<R: RandomNumberStream + ?Sized>(
        &self,
        primary: f64,
        rng: &mut R,
        max_secondary: f64,
    ) -> Result<f64> {
        self.sample_bounded(primary, rng, Some(max_secondary))
    }

    fn sample_bounded<R: RandomNumberStream + ?Sized>(
        &self,
        primary: f64,
        rng: &mut R,
        max_secondary: Option<f64>,
    ) -> Result<f64> {
        let sample_one = |distribution: &OneDDistribution, rng: &mut R, max: Option<f64>| match max {
            Some(max) => distribution.sample_in_subrange(rng, max),
            None => Ok(distribution.sample(rng)),
        };
        let (lower, fraction) = match self.locate(primary)? {
            GridPosition::Outside => {
                return Err(TransportError::out_of_range(
                    "two-dimensional primary value",
                    primary,
                    self.lower_bound_of_primary(),
                    self.upper_bound_of_primary(),
                ));
            }
            GridPosition::On(index) => return sample_one(&self.distributions[index], rng, max_secondary),
            GridPosition::Between { lower, fraction } => (lower, fraction),
        };
        let (low, high) = (&*self.distributions[lower], &*self.distributions[lower + 1]);

        match self.policy {
            TwoDSamplingPolicy::Correlated => {
                let mut random_number = rng.next_uniform();
                if let Some(max) = max_secondary {
                    random_number *= self.evaluate_cdf(primary, max)?;
                }
                Ok(self.correlated_value(low, high, fraction, UnitF64::new_unchecked(random_number)))
            }
            TwoDSamplingPolicy::Exact => {
                let chosen = if rng.next_uniform() < fraction { high } else { low };
                sample_one(chosen, rng, max_secondary)
            }
            TwoDSamplingPolicy::UnitBase => {
                let bounds = self.secondary_bounds(primary)?;
                let chosen = if rng.next_uniform() < fraction { high } else { low };
                let chosen_max = max_secondary.map(|max| self.unit_base_image(chosen, bounds, max));
                let sample = sample_one(chosen, rng, chosen_max)?;
                let eta = if Self::width(chosen) > 0.0 { (sample - chosen.lower_bound()) / Self::width(chosen) } else { 0.0 };
                Ok(bounds.0 + eta * (bounds.1 - bounds.0))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::{assert_abs_diff_eq, assert_relative_eq};

    use crate::distributions::{TabularDistribution, TabularScheme, UniformDistribution};
    use crate::utils::MockRng;

    fn uniform(lower: f64, upper: f64) -> Arc<OneDDistribution> {
        Arc::new(OneDDistribution::Uniform(UniformDistribution::new(lower, upper, 1.0 / (upper - lower)).unwrap()))
    }

    fn two_d(policy: TwoDSamplingPolicy, boundary: TwoDBoundaryPolicy) -> TwoDDistribution {
        TwoDDistribution::new(
            vec![1.0, 3.0],
            vec![uniform(0.0, 1.0), uniform(0.0, 3.0)],
            policy,
            TwoDGridInterpolation::LinLinLin,
            boundary,
        )
        .unwrap()
    }

    #[test]
    fn test_exact_policy_interpolates_values() {
        let distribution = two_d(TwoDSamplingPolicy::Exact, TwoDBoundaryPolicy::Clamp);
        // Halfway: 0.5 * 1 + 0.5 * 1/3 inside both, 0.5 * 1/3 beyond the lower bin
        assert_relative_eq!(distribution.evaluate_pdf(2.0, 0.5).unwrap(), 2.0 / 3.0, max_relative = 1e-12);
        assert_relative_eq!(distribution.evaluate_pdf(2.0, 2.0).unwrap(), 1.0 / 6.0, max_relative = 1e-12);
        assert_abs_diff_eq!(distribution.evaluate_pdf(2.0, 4.0).unwrap(), 0.0);
        assert_relative_eq!(distribution.evaluate_cdf(2.0, 3.0).unwrap(), 1.0, max_relative = 1e-12);
    }

    #[test]
    fn test_unit_base_scales_the_domain() {
        let distribution = two_d(TwoDSamplingPolicy::UnitBase, TwoDBoundaryPolicy::Clamp);
        assert_eq!(distribution.secondary_bounds(2.0).unwrap(), (0.0, 2.0));
        assert_relative_eq!(distribution.evaluate_pdf(2.0, 1.0).unwrap(), 0.5, max_relative = 1e-12);
        assert_relative_eq!(distribution.evaluate_cdf(2.0, 1.0).unwrap(), 0.5, max_relative = 1e-12);

        // The bin choice uses the first draw, the sample the second
        let mut rng = MockRng::new(vec![0.9, 0.25]);
        assert_relative_eq!(distribution.sample(2.0, &mut rng).unwrap(), 0.5, max_relative = 1e-12);
    }

    #[test]
    fn test_correlated_sampling_and_cdf() {
        let distribution = two_d(TwoDSamplingPolicy::Correlated, TwoDBoundaryPolicy::Clamp);
        let mut rng = MockRng::new(vec![0.5]);
        // Medians 0.5 and 1.5 interpolate to 1.0
        assert_relative_eq!(distribution.sample(2.0, &mut rng).unwrap(), 1.0, max_relative = 1e-12);
        assert_abs_diff_eq!(distribution.evaluate_cdf(2.0, 1.0).unwrap(), 0.5, epsilon = 1e-12);
        assert_relative_eq!(distribution.evaluate_pdf(2.0, 1.0).unwrap(), 0.5, max_relative = 1e-9);
    }

    #[test]
    fn test_boundary_policies() {
        let clamp = two_d(TwoDSamplingPolicy::Exact, TwoDBoundaryPolicy::Clamp);
        assert_abs_diff_eq!(clamp.evaluate_pdf(0.5, 0.5).unwrap(), 1.0);
        assert_abs_diff_eq!(clamp.evaluate_pdf(10.0, 0.5).unwrap(), 1.0 / 3.0);

        let zero = two_d(TwoDSamplingPolicy::Exact, TwoDBoundaryPolicy::Zero);
        assert_abs_diff_eq!(zero.evaluate_pdf(0.5, 0.5).unwrap(), 0.0);
        let mut rng = MockRng::new(vec![0.5]);
        assert!(zero.sample(0.5, &mut rng).is_err());

        let error = two_d(TwoDSamplingPolicy::Exact, TwoDBoundaryPolicy::Error);
        assert!(matches!(error.evaluate(10.0, 0.5), Err(TransportError::OutOfRange { .. })));
    }

    #[test]
    fn test_evaluation_is_idempotent() {
        let tables = vec![
            Arc::new(OneDDistribution::Tabular(
                TabularDistribution::new(TabularScheme::LinLin, vec![-1.0, 0.0, 1.0], vec![0.1, 0.5, 2.0]).unwrap(),
            )),
            Arc::new(OneDDistribution::Tabular(
                TabularDistribution::new(TabularScheme::LinLin, vec![-1.0, 0.5, 1.0], vec![0.2, 0.2, 5.0]).unwrap(),
            )),
        ];
        for policy in [TwoDSamplingPolicy::Correlated, TwoDSamplingPolicy::UnitBase, TwoDSamplingPolicy::Exact] {
            let distribution = TwoDDistribution::new(
                vec![1e-3, 10.0],
                tables.clone(),
                policy,
                TwoDGridInterpolation::LogLogLog,
                TwoDBoundaryPolicy::Clamp,
            )
            .unwrap();
            let first = distribution.evaluate(0.3, 0.25).unwrap();
            let second = distribution.evaluate(0.3, 0.25).unwrap();
            assert_eq!(first.to_bits(), second.to_bits());

            let mut previous = 0.0;
            for i in 0..=50 {
                let cdf = distribution.evaluate_cdf(0.3, -1.0 + 2.0 * i as f64 / 50.0).unwrap();
                assert!(cdf >= previous - 1e-12, "{} cdf decreased", policy);
                previous = cdf;
            }
        }
    }

    #[test]
    fn test_subrange_sampling_respects_bound() {
        let distribution = two_d(TwoDSamplingPolicy::Correlated, TwoDBoundaryPolicy::Clamp);
        let mut rng = MockRng::new(vec![0.999]);
        assert!(distribution.sample_in_subrange(2.0, &mut rng, 0.5).unwrap() <= 0.5 + 1e-12);
    }
}
