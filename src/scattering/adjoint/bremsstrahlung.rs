use crate::distributions::TwoDDistribution;
use crate::error::{Result, check_positive};
use crate::particle::{ParticleBank, ParticleState};
use crate::scattering::{ScatterAdjoint, ScatteringDistribution, ScatteringSample, Subshell};
use crate::utils::RandomNumberStream;

//=====================================================================
// Adjoint bremsstrahlung: the adjoint electron absorbs a photon whose
// energy is drawn from the tabulated energy-gain spectrum. The
// direction is unchanged.
//=====================================================================
#[derive(Debug, Clone)]
pub struct AdjointBremsstrahlungDistribution {
    energy_gains: TwoDDistribution,
}

impl AdjointBremsstrahlungDistribution {
    pub fn new(energy_gains: TwoDDistribution) -> Self {
        Self { energy_gains }
    }

    pub fn sample_energy_gain<R: RandomNumberStream + ?Sized>(&self, incoming_energy: f64, rng: &mut R) -> Result<f64> {
        check_positive("incoming adjoint electron energy", incoming_energy)?;
        Ok(self.energy_gains.sample(incoming_energy, rng)?.max(0.0))
    }
}

impl ScatteringDistribution for AdjointBremsstrahlungDistribution {
    fn evaluate(&self, incoming_energy: f64, energy_gain: f64) -> Result<f64> {
        check_positive("incoming adjoint electron energy", incoming_energy)?;
        self.energy_gains.evaluate(incoming_energy, energy_gain)
    }

    fn evaluate_pdf(&self, incoming_energy: f64, energy_gain: f64) -> Result<f64> {
        check_positive("incoming adjoint electron energy", incoming_energy)?;
        self.energy_gains.evaluate_pdf(incoming_energy, energy_gain)
    }

    fn evaluate_cdf(&self, incoming_energy: f64, energy_gain: f64) -> Result<f64> {
        check_positive("incoming adjoint electron energy", incoming_energy)?;
        self.energy_gains.evaluate_cdf(incoming_energy, energy_gain)
    }

    fn sample_and_record_trials<R: RandomNumberStream + ?Sized>(
        &self,
        incoming_energy: f64,
        rng: &mut R,
        trials: &mut u64,
    ) -> Result<ScatteringSample> {
        *trials += 1;
        let gain = self.sample_energy_gain(incoming_energy, rng)?;
        Ok(ScatteringSample { energy: incoming_energy + gain, cosine: 1.0 })
    }
}

impl ScatterAdjoint for AdjointBremsstrahlungDistribution {
    fn scatter_adjoint<R: RandomNumberStream + ?Sized>(
        &self,
        particle: &mut ParticleState,
        _bank: &mut ParticleBank,
        rng: &mut R,
    ) -> Result<Option<Subshell>> {
        particle.energy += self.sample_energy_gain(particle.energy, rng)?;
        Ok(None)
    }
}
