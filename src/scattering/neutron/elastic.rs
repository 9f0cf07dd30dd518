use crate::error::{Result, check_positive};
use crate::particle::{ParticleBank, ParticleState, rotate_direction};
use crate::scattering::neutron::{NeutronAngularDistribution, elastic_lab_kinematics};
use crate::scattering::{ScatterParticle, Subshell};
use crate::utils::RandomNumberStream;

// Elastic scattering off a target at rest, angles tabulated in the CM frame
#[derive(Debug, Clone)]
pub struct ElasticNeutronScattering {
    atomic_weight_ratio: f64,
    angular: NeutronAngularDistribution,
}

impl ElasticNeutronScattering {
    pub fn new(atomic_weight_ratio: f64, angular: NeutronAngularDistribution) -> Result<Self> {
        check_positive("atomic weight ratio", atomic_weight_ratio)?;
        Ok(Self { atomic_weight_ratio, angular })
    }

    pub fn angular(&self) -> &NeutronAngularDistribution {
        &self.angular
    }

    // Outgoing lab (energy, cosine)
    pub fn sample<R: RandomNumberStream + ?Sized>(&self, incoming_energy: f64, rng: &mut R) -> Result<(f64, f64)> {
        check_positive("incoming neutron energy", incoming_energy)?;
        let cosine_cm = self.angular.sample_cosine(incoming_energy, rng)?;
        elastic_lab_kinematics(incoming_energy, cosine_cm, self.atomic_weight_ratio)
    }
}

impl ScatterParticle for ElasticNeutronScattering {
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

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::particle::ParticleType;
    use crate::utils::MockRng;

    #[test]
    fn test_backscatter_loses_the_most_energy() {
        let elastic = ElasticNeutronScattering::new(11.9, NeutronAngularDistribution::isotropic()).unwrap();
        let mut neutron = ParticleState::new(ParticleType::Neutron, 1.0);
        let mut bank = ParticleBank::new();
        // Isotropic draw 0 gives a CM cosine of -1, then the azimuth
        let mut rng = MockRng::new(vec![0.0, 0.3]);
        elastic.scatter(&mut neutron, &mut bank, &mut rng).unwrap();

        assert_relative_eq!(neutron.energy, (10.9_f64 / 12.9).powi(2), max_relative = 1e-12);
        assert_relative_eq!(neutron.direction[2], -1.0, max_relative = 1e-9);
        assert!(bank.is_empty());
    }
}
