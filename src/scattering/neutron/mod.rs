mod angular;
mod elastic;
mod energy_law;
mod fission;
mod inelastic;
mod kinematics;

pub use angular::NeutronAngularDistribution;
pub use elastic::ElasticNeutronScattering;
pub use energy_law::{
    EnergyLaw, GeneralEvaporation, KalbachMann, KalbachTable, LevelScattering, NuclearTemperatureSpectrum, WattSpectrum,
};
pub use fission::{DelayedNeutronEmission, FissionNeutronScattering};
pub use inelastic::InelasticNeutronScattering;
pub use kinematics::{center_of_mass_to_lab, elastic_lab_kinematics};

use crate::error::Result;
use crate::particle::{ParticleBank, ParticleState};
use crate::scattering::{ScatterParticle, Subshell};
use crate::utils::RandomNumberStream;

//=====================================================================
// Closed set of neutron scattering distributions. Absorption releases
// no neutron and ends the history.
//=====================================================================
#[derive(Debug, Clone)]
pub enum NeutronScatteringDistribution {
    Absorption,
    Elastic(ElasticNeutronScattering),
    Inelastic(InelasticNeutronScattering),
    Fission(FissionNeutronScattering),
}

impl ScatterParticle for NeutronScatteringDistribution {
    fn scatter<R: RandomNumberStream + ?Sized>(
        &self,
        particle: &mut ParticleState,
        bank: &mut ParticleBank,
        rng: &mut R,
    ) -> Result<Option<Subshell>> {
        match self {
            NeutronScatteringDistribution::Absorption => {
                particle.kill();
                Ok(None)
            }
            NeutronScatteringDistribution::Elastic(distribution) => distribution.scatter(particle, bank, rng),
            NeutronScatteringDistribution::Inelastic(distribution) => distribution.scatter(particle, bank, rng),
            NeutronScatteringDistribution::Fission(distribution) => distribution.scatter(particle, bank, rng),
        }
    }
}
