use crate::error::{Result, check_positive};
use crate::interpolation::InterpolationTable;
use crate::particle::{ParticleBank, ParticleState};
use crate::scattering::{ScatterAdjoint, Subshell};
use crate::utils::RandomNumberStream;

// Adjoint atomic excitation: the adjoint electron gains the excitation energy
#[derive(Debug, Clone)]
pub struct AdjointAtomicExcitationDistribution {
    energy_gain: InterpolationTable,
}

impl AdjointAtomicExcitationDistribution {
    pub fn new(energy_gain: InterpolationTable) -> Self {
        Self { energy_gain }
    }

    pub fn energy_gain(&self, incoming_energy: f64) -> Result<f64> {
        check_positive("incoming adjoint electron energy", incoming_energy)?;
        Ok(self.energy_gain.interpolate_clamped(incoming_energy)?.max(0.0))
    }
}

impl ScatterAdjoint for AdjointAtomicExcitationDistribution {
    fn scatter_adjoint<R: RandomNumberStream + ?Sized>(
        &self,
        particle: &mut ParticleState,
        _bank: &mut ParticleBank,
        _rng: &mut R,
    ) -> Result<Option<Subshell>> {
        particle.energy += self.energy_gain(particle.energy)?;
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::interpolation::InterpolationScheme;
    use crate::particle::ParticleType;
    use crate::utils::MockRng;

    #[test]
    fn test_adjoint_electron_gains_energy() {
        let distribution = AdjointAtomicExcitationDistribution::new(
            InterpolationTable::from_x_and_y(vec![1e-5, 100.0], vec![1e-5, 2e-5], InterpolationScheme::LinLin).unwrap(),
        );
        let mut particle = ParticleState::new(ParticleType::AdjointElectron, 1e-5);
        let mut bank = ParticleBank::new();
        let mut rng = MockRng::new(vec![]);
        distribution.scatter_adjoint(&mut particle, &mut bank, &mut rng).unwrap();
        assert_relative_eq!(particle.energy, 2e-5, max_relative = 1e-12);
        assert_eq!(particle.direction, [0.0, 0.0, 1.0]);
        assert!(bank.is_empty());
        assert!(distribution.energy_gain(-1.0).is_err());
    }
}
