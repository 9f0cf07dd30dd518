use std::sync::Arc;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

use crate::constants::ELASTIC_ANGLE_COSINE_PEAK;
use crate::distributions::TwoDDistribution;
use crate::error::{Result, check_positive, check_range};
use crate::particle::{ParticleBank, ParticleState, rotate_direction};
use crate::scattering::electron::ScreenedRutherfordElasticDistribution;
use crate::scattering::{ScatterParticle, ScatteringDistribution, ScatteringSample, Subshell};
use crate::utils::{RandomNumberStream, search_bin};

// How the tabulated region and the screened Rutherford peak are joined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize)]
pub enum ElasticUnionSampling {
    // Region weights evaluated at the incoming energy
    OneDUnion,
    // An energy grid point is chosen first, then the region at that point
    TwoDUnion,
    // Region weights interpolated from their values on the energy grid
    Simplified,
}

//=====================================================================
// Analog elastic scattering: the tabulated angular distribution on
// [-1, ELASTIC_ANGLE_COSINE_PEAK] joined with the screened Rutherford
// peak above it. Values are relative to the cutoff cross section, the
// analog cross section being (1 + ratio) times the cutoff one.
//=====================================================================
#[derive(Debug, Clone)]
pub struct AnalogElasticDistribution {
    angular: Arc<TwoDDistribution>,
    peak: ScreenedRutherfordElasticDistribution,
    sampling: ElasticUnionSampling,
    // Peak ratio on the angular energy grid
    grid_ratios: Vec<f64>,
}

impl AnalogElasticDistribution {
    pub fn new(angular: Arc<TwoDDistribution>, atomic_number: u32, sampling: ElasticUnionSampling) -> Result<Self> {
        let peak = ScreenedRutherfordElasticDistribution::new(Arc::clone(&angular), atomic_number);
        let grid_ratios = angular
            .grid()
            .iter()
            .map(|&energy| peak.cross_section_ratio(energy))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { angular, peak, sampling, grid_ratios })
    }

    pub fn sampling(&self) -> ElasticUnionSampling {
        self.sampling
    }

    fn interpolated_ratio(&self, incoming_energy: f64) -> f64 {
        let grid = self.angular.grid();
        let last = grid.len() - 1;
        if incoming_energy <= grid[0] {
            return self.grid_ratios[0];
        }
        if incoming_energy >= grid[last] {
            return self.grid_ratios[last];
        }
        let bin = search_bin(grid, incoming_energy);
        let fraction = (incoming_energy - grid[bin]) / (grid[bin + 1] - grid[bin]);
        self.grid_ratios[bin] + fraction * (self.grid_ratios[bin + 1] - self.grid_ratios[bin])
    }

    // Screened Rutherford cross section over the cutoff cross section
    pub fn cross_section_ratio(&self, incoming_energy: f64) -> Result<f64> {
        check_positive("incoming electron energy", incoming_energy)?;
        match self.sampling {
            ElasticUnionSampling::Simplified => Ok(self.interpolated_ratio(incoming_energy)),
            _ => self.peak.cross_section_ratio(incoming_energy),
        }
    }

    // Analog cross section over the cutoff cross section
    pub fn analog_to_cutoff_ratio(&self, incoming_energy: f64) -> Result<f64> {
        Ok(1.0 + self.cross_section_ratio(incoming_energy)?)
    }

    fn sample_region<R: RandomNumberStream + ?Sized>(&self, energy: f64, ratio: f64, rng: &mut R) -> Result<f64> {
        if rng.next_uniform() * (1.0 + ratio) < 1.0 {
            self.angular.sample(energy, rng)
        } else {
            let eta = self.peak.screening_parameter(energy);
            Ok(ScreenedRutherfordElasticDistribution::sample_peak_cosine(eta, rng.next_unit()))
        }
    }

    pub fn sample_cosine<R: RandomNumberStream + ?Sized>(&self, incoming_energy: f64, rng: &mut R) -> Result<f64> {
        let cosine = match self.sampling {
            ElasticUnionSampling::OneDUnion | ElasticUnionSampling::Simplified => {
                let ratio = self.cross_section_ratio(incoming_energy)?;
                self.sample_region(incoming_energy, ratio, rng)?
            }
            ElasticUnionSampling::TwoDUnion => {
                check_positive("incoming electron energy", incoming_energy)?;
                let grid = self.angular.grid();
                let last = grid.len() - 1;
                let index = if incoming_energy <= grid[0] {
                    0
                } else if incoming_energy >= grid[last] {
                    last
                } else {
                    let bin = search_bin(grid, incoming_energy);
                    let fraction = (incoming_energy - grid[bin]) / (grid[bin + 1] - grid[bin]);
                    if rng.next_uniform() < fraction { bin + 1 } else { bin }
                };
                self.sample_region(grid[index], self.grid_ratios[index], rng)?
            }
        };
        Ok(cosine.clamp(-1.0, 1.0))
    }

    fn check_arguments(incoming_energy: f64, cosine: f64) -> Result<()> {
        check_positive("incoming electron energy", incoming_energy)?;
        check_range("scattering angle cosine", cosine, -1.0, 1.0)
    }
}

impl ScatteringDistribution for AnalogElasticDistribution {
    fn evaluate(&self, incoming_energy: f64, cosine: f64) -> Result<f64> {
        Self::check_arguments(incoming_energy, cosine)?;
        if cosine <= ELASTIC_ANGLE_COSINE_PEAK {
            self.angular.evaluate_pdf(incoming_energy, cosine)
        } else {
            self.peak.evaluate(incoming_energy, cosine)
        }
    }

    fn evaluate_pdf(&self, incoming_energy: f64, cosine: f64) -> Result<f64> {
        Ok(self.evaluate(incoming_energy, cosine)? / self.analog_to_cutoff_ratio(incoming_energy)?)
    }

    fn evaluate_cdf(&self, incoming_energy: f64, cosine: f64) -> Result<f64> {
        Self::check_arguments(incoming_energy, cosine)?;
        let ratio = self.cross_section_ratio(incoming_energy)?;
        let cdf = if cosine <= ELASTIC_ANGLE_COSINE_PEAK {
            self.angular.evaluate_cdf(incoming_energy, cosine)?
        } else {
            let eta = self.peak.screening_parameter(incoming_energy);
            1.0 + ratio * ScreenedRutherfordElasticDistribution::peak_cdf_value(eta, cosine)
        };
        Ok((cdf / (1.0 + ratio)).clamp(0.0, 1.0))
    }

    fn sample_and_record_trials<R: RandomNumberStream + ?Sized>(
        &self,
        incoming_energy: f64,
        rng: &mut R,
        trials: &mut u64,
    ) -> Result<ScatteringSample> {
        *trials += 1;
        Ok(ScatteringSample { energy: incoming_energy, cosine: self.sample_cosine(incoming_energy, rng)? })
    }
}

impl ScatterParticle for AnalogElasticDistribution {
    fn scatter<R: RandomNumberStream + ?Sized>(
        &self,
        particle: &mut ParticleState,
        _bank: &mut ParticleBank,
        rng: &mut R,
    ) -> Result<Option<Subshell>> {
        let cosine = self.sample_cosine(particle.energy, rng)?;
        particle.direction = rotate_direction(particle.direction, cosine, rng);
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::distributions::TwoDSamplingPolicy;
    use crate::scattering::electron::test_elastic_angular;
    use crate::utils::MockRng;

    fn analog(sampling: ElasticUnionSampling) -> AnalogElasticDistribution {
        AnalogElasticDistribution::new(test_elastic_angular(TwoDSamplingPolicy::Exact), 6, sampling).unwrap()
    }

    #[test]
    fn test_cdf_joins_both_regions() {
        let distribution = analog(ElasticUnionSampling::OneDUnion);
        let ratio = distribution.cross_section_ratio(100.0).unwrap();
        assert!(ratio > 0.005 && ratio < 0.006);
        assert_relative_eq!(
            distribution.evaluate_cdf(100.0, ELASTIC_ANGLE_COSINE_PEAK).unwrap(),
            1.0 / (1.0 + ratio),
            max_relative = 1e-12
        );
        assert_relative_eq!(distribution.evaluate_cdf(100.0, 1.0).unwrap(), 1.0, max_relative = 1e-12);
        assert_relative_eq!(distribution.evaluate_cdf(100.0, -1.0).unwrap(), 0.0);
    }

    #[test]
    fn test_one_d_union_region_choice() {
        let distribution = analog(ElasticUnionSampling::OneDUnion);
        let mut rng = MockRng::new(vec![0.0, 0.0]);
        assert_relative_eq!(distribution.sample_cosine(100.0, &mut rng).unwrap(), -1.0);

        let mut rng = MockRng::new(vec![0.999, 0.5]);
        let cosine = distribution.sample_cosine(100.0, &mut rng).unwrap();
        assert!(cosine >= ELASTIC_ANGLE_COSINE_PEAK && cosine <= 1.0);
    }

    #[test]
    fn test_two_d_union_samples_at_grid_points() {
        let distribution = analog(ElasticUnionSampling::TwoDUnion);
        // Lower grid point, tabulated region, lowest cosine
        let mut rng = MockRng::new(vec![0.9, 0.0, 0.0]);
        assert_relative_eq!(distribution.sample_cosine(50.0, &mut rng).unwrap(), -1.0);
        assert_eq!(rng.draws(), 3);
    }

    #[test]
    fn test_simplified_ratio_matches_grid() {
        let simplified = analog(ElasticUnionSampling::Simplified);
        let exact = analog(ElasticUnionSampling::OneDUnion);
        for &energy in &[1e-5, 100.0] {
            assert_relative_eq!(
                simplified.cross_section_ratio(energy).unwrap(),
                exact.cross_section_ratio(energy).unwrap(),
                max_relative = 1e-12
            );
        }
        let midpoint = simplified.cross_section_ratio(50.0).unwrap();
        let (low, high) = (exact.cross_section_ratio(1e-5).unwrap(), exact.cross_section_ratio(100.0).unwrap());
        assert!(midpoint > low.min(high) && midpoint < low.max(high));
    }
}
