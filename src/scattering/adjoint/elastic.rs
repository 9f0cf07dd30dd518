use crate::error::Result;
use crate::particle::{ParticleBank, ParticleState, rotate_direction};
use crate::scattering::electron::CutoffElasticDistribution;
use crate::scattering::{ScatterAdjoint, Subshell};
use crate::utils::RandomNumberStream;

// Elastic scattering is self-adjoint, the forward cutoff angles are reused
#[derive(Debug, Clone)]
pub struct AdjointElasticDistribution {
    forward: CutoffElasticDistribution,
}

impl AdjointElasticDistribution {
    pub fn new(forward: CutoffElasticDistribution) -> Self {
        Self { forward }
    }

    pub fn forward(&self) -> &CutoffElasticDistribution {
        &self.forward
    }
}

impl ScatterAdjoint for AdjointElasticDistribution {
    fn scatter_adjoint<R: RandomNumberStream + ?Sized>(
        &self,
        particle: &mut ParticleState,
        _bank: &mut ParticleBank,
        rng: &mut R,
    ) -> Result<Option<Subshell>> {
        let cosine = self.forward.sample_cosine(particle.energy, rng)?;
        particle.direction = rotate_direction(particle.direction, cosine, rng);
        Ok(None)
    }
}
