mod bremsstrahlung;
mod elastic;
mod excitation;

pub use bremsstrahlung::AdjointBremsstrahlungDistribution;
pub use elastic::AdjointElasticDistribution;
pub use excitation::AdjointAtomicExcitationDistribution;

use crate::error::Result;
use crate::particle::{ParticleBank, ParticleState};
use crate::scattering::{ScatterAdjoint, Subshell};
use crate::utils::RandomNumberStream;

#[derive(Debug, Clone)]
pub enum AdjointElectronScatteringDistribution {
    Elastic(AdjointElasticDistribution),
    Bremsstrahlung(AdjointBremsstrahlungDistribution),
    AtomicExcitation(AdjointAtomicExcitationDistribution),
}

impl ScatterAdjoint for AdjointElectronScatteringDistribution {
    fn scatter_adjoint<R: RandomNumberStream + ?Sized>(
        &self,
        particle: &mut ParticleState,
        bank: &mut ParticleBank,
        rng: &mut R,
    ) -> Result<Option<Subshell>> {
        match self {
            Self::Elastic(distribution) => distribution.scatter_adjoint(particle, bank, rng),
            Self::Bremsstrahlung(distribution) => distribution.scatter_adjoint(particle, bank, rng),
            Self::AtomicExcitation(distribution) => distribution.scatter_adjoint(particle, bank, rng),
        }
    }
}
