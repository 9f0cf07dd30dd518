use std::sync::Arc;

use crate::constants::{ELASTIC_ANGLE_COSINE_PEAK, ELECTRON_REST_MASS_ENERGY, FINE_STRUCTURE_CONSTANT};
use crate::distributions::TwoDDistribution;
use crate::error::{Result, check_positive, check_range};
use crate::particle::{ParticleBank, ParticleState, rotate_direction};
use crate::scattering::{ScatterParticle, ScatteringDistribution, ScatteringSample, Subshell};
use crate::unitf64::UnitF64;
use crate::utils::RandomNumberStream;

const PEAK_WIDTH: f64 = 1.0 - ELASTIC_ANGLE_COSINE_PEAK;

// Moliere screening parameter eta of an electron with kinetic energy E
pub fn screening_parameter(incoming_energy: f64, atomic_number: u32) -> f64 {
    let z = atomic_number as f64;
    let total = incoming_energy + ELECTRON_REST_MASS_ENERGY;
    let momentum_squared = incoming_energy * (incoming_energy + 2.0 * ELECTRON_REST_MASS_ENERGY);
    let beta_squared = momentum_squared / (total * total);
    let coupling = FINE_STRUCTURE_CONSTANT * z;
    0.25 * (FINE_STRUCTURE_CONSTANT / 0.885).powi(2) * z.powf(2.0 / 3.0) * ELECTRON_REST_MASS_ENERGY.powi(2)
        / momentum_squared
        * (1.13 + 3.76 * coupling * coupling / beta_squared)
}

//=====================================================================
// Screened Rutherford peak above the tabulated cosine range
// [ELASTIC_ANGLE_COSINE_PEAK, 1].
//
// The density is eta (eta + d) / d / (eta + 1 - mu)^2 with
// d = 1 - ELASTIC_ANGLE_COSINE_PEAK. Its scale follows from continuity
// with the tabulated pdf at the peak cosine, which fixes the ratio of
// the peak cross section to the tabulated (cutoff) cross section.
//=====================================================================
#[derive(Debug, Clone)]
pub struct ScreenedRutherfordElasticDistribution {
    angular: Arc<TwoDDistribution>,
    atomic_number: u32,
}

impl ScreenedRutherfordElasticDistribution {
    pub fn new(angular: Arc<TwoDDistribution>, atomic_number: u32) -> Self {
        Self { angular, atomic_number }
    }

    pub fn atomic_number(&self) -> u32 {
        self.atomic_number
    }

    pub fn screening_parameter(&self, incoming_energy: f64) -> f64 {
        screening_parameter(incoming_energy, self.atomic_number)
    }

    // Tabulated pdf at the peak cosine
    fn peak_pdf(&self, incoming_energy: f64) -> Result<f64> {
        self.angular.evaluate_pdf(incoming_energy, ELASTIC_ANGLE_COSINE_PEAK)
    }

    // Screened Rutherford cross section over the cutoff cross section
    pub fn cross_section_ratio(&self, incoming_energy: f64) -> Result<f64> {
        check_positive("incoming electron energy", incoming_energy)?;
        let eta = self.screening_parameter(incoming_energy);
        Ok(self.peak_pdf(incoming_energy)? * PEAK_WIDTH * (eta + PEAK_WIDTH) / eta)
    }

    pub fn peak_pdf_value(eta: f64, cosine: f64) -> f64 {
        eta * (eta + PEAK_WIDTH) / PEAK_WIDTH / (eta + (1.0 - cosine)).powi(2)
    }

    // Zero at the peak cosine, one at mu = 1
    pub fn peak_cdf_value(eta: f64, cosine: f64) -> f64 {
        ((eta + PEAK_WIDTH) / PEAK_WIDTH * eta / (eta + (1.0 - cosine)) - eta / PEAK_WIDTH).clamp(0.0, 1.0)
    }

    pub fn sample_peak_cosine(eta: f64, random_number: UnitF64) -> f64 {
        let u = random_number.0;
        (1.0 - eta * PEAK_WIDTH * (1.0 - u) / (eta + u * PEAK_WIDTH)).clamp(ELASTIC_ANGLE_COSINE_PEAK, 1.0)
    }

    fn check_arguments(incoming_energy: f64, cosine: f64) -> Result<()> {
        check_positive("incoming electron energy", incoming_energy)?;
        check_range("scattering angle cosine", cosine, -1.0, 1.0)
    }
}

impl ScatteringDistribution for ScreenedRutherfordElasticDistribution {
    // Continuous with the tabulated pdf at the peak cosine
    fn evaluate(&self, incoming_energy: f64, cosine: f64) -> Result<f64> {
        Self::check_arguments(incoming_energy, cosine)?;
        if cosine < ELASTIC_ANGLE_COSINE_PEAK {
            return Ok(0.0);
        }
        let eta = self.screening_parameter(incoming_energy);
        Ok(self.peak_pdf(incoming_energy)? * ((eta + PEAK_WIDTH) / (eta + (1.0 - cosine))).powi(2))
    }

    fn evaluate_pdf(&self, incoming_energy: f64, cosine: f64) -> Result<f64> {
        Self::check_arguments(incoming_energy, cosine)?;
        if cosine < ELASTIC_ANGLE_COSINE_PEAK {
            return Ok(0.0);
        }
        Ok(Self::peak_pdf_value(self.screening_parameter(incoming_energy), cosine))
    }

    fn evaluate_cdf(&self, incoming_energy: f64, cosine: f64) -> Result<f64> {
        Self::check_arguments(incoming_energy, cosine)?;
        if cosine <= ELASTIC_ANGLE_COSINE_PEAK {
            return Ok(0.0);
        }
        Ok(Self::peak_cdf_value(self.screening_parameter(incoming_energy), cosine))
    }

    fn sample_and_record_trials<R: RandomNumberStream + ?Sized>(
        &self,
        incoming_energy: f64,
        rng: &mut R,
        trials: &mut u64,
    ) -> Result<ScatteringSample> {
        check_positive("incoming electron energy", incoming_energy)?;
        *trials += 1;
        let cosine = Self::sample_peak_cosine(self.screening_parameter(incoming_energy), rng.next_unit());
        Ok(ScatteringSample { energy: incoming_energy, cosine })
    }
}

impl ScatterParticle for ScreenedRutherfordElasticDistribution {
    fn scatter<R: RandomNumberStream + ?Sized>(
        &self,
        particle: &mut ParticleState,
        _bank: &mut ParticleBank,
        rng: &mut R,
    ) -> Result<Option<Subshell>> {
        let sample = self.sample(particle.energy, rng)?;
        particle.direction = rotate_direction(particle.direction, sample.cosine, rng);
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::distributions::TwoDSamplingPolicy;
    use crate::scattering::electron::test_elastic_angular;
    use crate::utils::GaussKronrodIntegrator;

    #[test]
    fn test_screening_parameter_decreases_with_energy() {
        let low = screening_parameter(1e-3, 6);
        let high = screening_parameter(1.0, 6);
        assert!(low > high && high > 0.0);
        assert!(screening_parameter(1.0, 82) > high);
    }

    #[test]
    fn test_peak_pdf_is_normalized() {
        let eta = 2.5e-7;
        let (integral, _) = GaussKronrodIntegrator::default()
            .integrate(|mu| ScreenedRutherfordElasticDistribution::peak_pdf_value(eta, mu), ELASTIC_ANGLE_COSINE_PEAK, 1.0)
            .unwrap();
        assert_relative_eq!(integral, 1.0, max_relative = 1e-8);
        assert_relative_eq!(ScreenedRutherfordElasticDistribution::peak_cdf_value(eta, 1.0), 1.0, max_relative = 1e-12);
    }

    #[test]
    fn test_peak_cdf_is_monotone() {
        let eta = 1e-6;
        let cdf = |mu: f64| ScreenedRutherfordElasticDistribution::peak_cdf_value(eta, mu);
        assert_relative_eq!(cdf(ELASTIC_ANGLE_COSINE_PEAK), 0.0, epsilon = 1e-9);
        let values: Vec<f64> = (0..=4).map(|i| cdf(ELASTIC_ANGLE_COSINE_PEAK + 0.25 * i as f64 * PEAK_WIDTH)).collect();
        assert!(values.windows(2).all(|pair| pair[0] <= pair[1]));
        // With eta = d the cdf is x / (2 - x), x the covered fraction of the peak width
        assert_relative_eq!(values[1], 1.0 / 7.0, max_relative = 1e-6);
        assert_relative_eq!(values[2], 1.0 / 3.0, max_relative = 1e-6);
        assert_relative_eq!(values[4], 1.0, epsilon = 1e-9);
    }

    #[test]
    fn test_sampling_inverts_cdf() {
        let eta = 1e-6;
        for &u in &[0.0, 0.3, 0.75] {
            let cosine = ScreenedRutherfordElasticDistribution::sample_peak_cosine(eta, UnitF64(u));
            assert_relative_eq!(ScreenedRutherfordElasticDistribution::peak_cdf_value(eta, cosine), u, epsilon = 1e-6);
        }
        assert_relative_eq!(
            ScreenedRutherfordElasticDistribution::sample_peak_cosine(eta, UnitF64(0.0)),
            ELASTIC_ANGLE_COSINE_PEAK
        );
    }

    #[test]
    fn test_continuity_with_tabulated_pdf() {
        let angular = test_elastic_angular(TwoDSamplingPolicy::Exact);
        let distribution = ScreenedRutherfordElasticDistribution::new(Arc::clone(&angular), 6);
        let peak = distribution.evaluate(100.0, ELASTIC_ANGLE_COSINE_PEAK).unwrap();
        assert_relative_eq!(peak, angular.evaluate_pdf(100.0, ELASTIC_ANGLE_COSINE_PEAK).unwrap(), max_relative = 1e-12);

        // The peak integral is the cross section ratio
        let (integral, _) = GaussKronrodIntegrator::default()
            .integrate(|mu| distribution.evaluate(100.0, mu).unwrap(), ELASTIC_ANGLE_COSINE_PEAK, 1.0)
            .unwrap();
        assert_relative_eq!(integral, distribution.cross_section_ratio(100.0).unwrap(), max_relative = 1e-8);
        assert_eq!(distribution.evaluate_pdf(100.0, 0.5).unwrap(), 0.0);
    }
}
