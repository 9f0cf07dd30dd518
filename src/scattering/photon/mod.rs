mod absorption;
mod coherent;
mod doppler;
mod incoherent;

pub use absorption::{PairProduction, PairProductionMode, PhotoelectricAbsorption, PhotoelectricShell};
pub use coherent::{FormFactorCoherentScattering, ThompsonScattering};
pub use doppler::{
    ComptonShell, DopplerBroadenedIncoherentScattering, DopplerSample, IncoherentAngularModel, compton_line_energy,
    doppler_broadened_energy, full_compton_profile, maximum_electron_momentum,
};
pub use incoherent::{
    KleinNishinaScattering, WallerHartreeScattering, klein_nishina_differential, momentum_transfer, sample_klein_nishina,
};

use crate::error::Result;
use crate::particle::{ParticleBank, ParticleState};
use crate::scattering::{ScatterParticle, Subshell};
use crate::utils::RandomNumberStream;

//=====================================================================
// Closed set of photon scattering distributions.
//=====================================================================
#[derive(Debug, Clone)]
pub enum PhotonScatteringDistribution {
    Thompson(ThompsonScattering),
    FormFactorCoherent(FormFactorCoherentScattering),
    KleinNishina(KleinNishinaScattering),
    WallerHartree(WallerHartreeScattering),
    DopplerBroadened(DopplerBroadenedIncoherentScattering),
    Photoelectric(PhotoelectricAbsorption),
    PairProduction(PairProduction),
}

impl ScatterParticle for PhotonScatteringDistribution {
    fn scatter<R: RandomNumberStream + ?Sized>(
        &self,
        particle: &mut ParticleState,
        bank: &mut ParticleBank,
        rng: &mut R,
    ) -> Result<Option<Subshell>> {
        match self {
            Self::Thompson(distribution) => distribution.scatter(particle, bank, rng),
            Self::FormFactorCoherent(distribution) => distribution.scatter(particle, bank, rng),
            Self::KleinNishina(distribution) => distribution.scatter(particle, bank, rng),
            Self::WallerHartree(distribution) => distribution.scatter(particle, bank, rng),
            Self::DopplerBroadened(distribution) => distribution.scatter(particle, bank, rng),
            Self::Photoelectric(distribution) => distribution.scatter(particle, bank, rng),
            Self::PairProduction(distribution) => distribution.scatter(particle, bank, rng),
        }
    }
}
