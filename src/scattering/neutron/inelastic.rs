use crate::blocks::ExitingNeutronFrameOfReference;
use crate::error::{Result, check_positive};
use crate::particle::{ParticleBank, ParticleState, rotate_direction};
use crate::scattering::neutron::{EnergyLaw, NeutronAngularDistribution, center_of_mass_to_lab};
use crate::scattering::{ScatterParticle, Subshell};
use crate::utils::RandomNumberStream;

//=====================================================================
// Neutron emission described by an energy law and an angular
// distribution, in the frame named by the reaction's TYR entry.
//=====================================================================
#[derive(Debug, Clone)]
pub struct InelasticNeutronScattering {
    atomic_weight_ratio: f64,
    frame: ExitingNeutronFrameOfReference,
    angular: NeutronAngularDistribution,
    law: EnergyLaw,
}

impl InelasticNeutronScattering {
    pub fn new(
        atomic_weight_ratio: f64,
        frame: ExitingNeutronFrameOfReference,
        angular: NeutronAngularDistribution,
        law: EnergyLaw,
    ) -> Result<Self> {
        check_positive("atomic weight ratio", atomic_weight_ratio)?;
        Ok(Self { atomic_weight_ratio, frame, angular, law })
    }

    pub fn law(&self) -> &EnergyLaw {
        &self.law
    }

    pub fn frame(&self) -> ExitingNeutronFrameOfReference {
        self.frame
    }

    // Outgoing lab (energy, cosine)
    pub fn sample<R: RandomNumberStream + ?Sized>(&self, incoming_energy: f64, rng: &mut R) -> Result<(f64, f64)> {
        let (energy, correlated_cosine) = self.law.sample(incoming_energy, rng)?;
        let cosine = match correlated_cosine {
            Some(cosine) => cosine,
            None => self.angular.sample_cosine(incoming_energy, rng)?,
        };
        match self.frame {
            ExitingNeutronFrameOfReference::CenterOfMass => {
                center_of_mass_to_lab(incoming_energy, energy, cosine, self.atomic_weight_ratio)
            }
            _ => Ok((energy, cosine)),
        }
    }
}

impl ScatterParticle for InelasticNeutronScattering {
    fn scatter<R: RandomNumberStream + ?Sized>(
        &self,
        particle: &mut ParticleState,
        _bank: &mut ParticleBank,
        rng: &mut R,
    ) -> Result<Option<Subshell>> {
        let (energy, cosine) = self.sample(particle.energy, rng)?;
        particle.energy = energy;
        particle.direction = rotate_direction(particle.direction, cosine, rng);
        Ok(None)
    }
}
