use std::sync::Arc;

use crate::distributions::TwoDDistribution;
use crate::error::{Result, check_positive, check_range};
use crate::particle::{ParticleBank, ParticleState, rotate_direction};
use crate::scattering::{ScatterParticle, ScatteringDistribution, ScatteringSample, Subshell};
use crate::utils::RandomNumberStream;

//=====================================================================
// Elastic scattering from the tabulated angular distributions, limited
// to cosines at or below a cutoff cosine.
//=====================================================================
#[derive(Debug, Clone)]
pub struct CutoffElasticDistribution {
    angular: Arc<TwoDDistribution>,
    cutoff_cosine: f64,
}

impl CutoffElasticDistribution {
    pub fn new(angular: Arc<TwoDDistribution>, cutoff_cosine: f64) -> Result<Self> {
        check_range("elastic cutoff angle cosine", cutoff_cosine, -1.0, 1.0)?;
        Ok(Self { angular, cutoff_cosine })
    }

    pub fn angular(&self) -> &Arc<TwoDDistribution> {
        &self.angular
    }

    pub fn cutoff_cosine(&self) -> f64 {
        self.cutoff_cosine
    }

    // Share of the tabulated distribution below the cutoff cosine
    pub fn cutoff_fraction(&self, incoming_energy: f64) -> Result<f64> {
        self.angular.evaluate_cdf(incoming_energy, self.cutoff_cosine)
    }

    pub fn sample_cosine<R: RandomNumberStream + ?Sized>(&self, incoming_energy: f64, rng: &mut R) -> Result<f64> {
        check_positive("incoming electron energy", incoming_energy)?;
        Ok(self.angular.sample_in_subrange(incoming_energy, rng, self.cutoff_cosine)?.clamp(-1.0, 1.0))
    }

    fn check_arguments(incoming_energy: f64, cosine: f64) -> Result<()> {
        check_positive("incoming electron energy", incoming_energy)?;
        check_range("scattering angle cosine", cosine, -1.0, 1.0)
    }
}

impl ScatteringDistribution for CutoffElasticDistribution {
    fn evaluate(&self, incoming_energy: f64, cosine: f64) -> Result<f64> {
        Self::check_arguments(incoming_energy, cosine)?;
        if cosine > self.cutoff_cosine {
            return Ok(0.0);
        }
        self.angular.evaluate(incoming_energy, cosine)
    }

    fn evaluate_pdf(&self, incoming_energy: f64, cosine: f64) -> Result<f64> {
        Self::check_arguments(incoming_energy, cosine)?;
        if cosine > self.cutoff_cosine {
            return Ok(0.0);
        }
        let fraction = self.cutoff_fraction(incoming_energy)?;
        Ok(if fraction > 0.0 { self.angular.evaluate_pdf(incoming_energy, cosine)? / fraction } else { 0.0 })
    }

    fn evaluate_cdf(&self, incoming_energy: f64, cosine: f64) -> Result<f64> {
        Self::check_arguments(incoming_energy, cosine)?;
        if cosine >= self.cutoff_cosine {
            return Ok(1.0);
        }
        let fraction = self.cutoff_fraction(incoming_energy)?;
        Ok(if fraction > 0.0 { (self.angular.evaluate_cdf(incoming_energy, cosine)? / fraction).min(1.0) } else { 0.0 })
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

impl ScatterParticle for CutoffElasticDistribution {
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
