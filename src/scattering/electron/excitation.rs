use crate::error::{Result, check_positive};
use crate::interpolation::InterpolationTable;
use crate::particle::{ParticleBank, ParticleState};
use crate::scattering::{ScatterParticle, ScatteringDistribution, ScatteringSample, Subshell};
use crate::utils::RandomNumberStream;

// Atomic excitation: a deterministic, energy dependent energy loss with no deflection
#[derive(Debug, Clone)]
pub struct AtomicExcitationDistribution {
    energy_loss: InterpolationTable,
}

impl AtomicExcitationDistribution {
    pub fn new(energy_loss: InterpolationTable) -> Self {
        Self { energy_loss }
    }

    pub fn energy_loss(&self, incoming_energy: f64) -> Result<f64> {
        check_positive("incoming electron energy", incoming_energy)?;
        Ok(self.energy_loss.interpolate_clamped(incoming_energy)?.max(0.0))
    }

    pub fn outgoing_energy(&self, incoming_energy: f64) -> Result<f64> {
        Ok(incoming_energy - self.energy_loss(incoming_energy)?)
    }
}

impl ScatteringDistribution for AtomicExcitationDistribution {
    // Delta function in outgoing energy
    fn evaluate(&self, incoming_energy: f64, outgoing_energy: f64) -> Result<f64> {
        Ok(if outgoing_energy == self.outgoing_energy(incoming_energy)? { 1.0 } else { 0.0 })
    }

    fn evaluate_pdf(&self, incoming_energy: f64, outgoing_energy: f64) -> Result<f64> {
        self.evaluate(incoming_energy, outgoing_energy)
    }

    fn evaluate_cdf(&self, incoming_energy: f64, outgoing_energy: f64) -> Result<f64> {
        Ok(if outgoing_energy >= self.outgoing_energy(incoming_energy)? { 1.0 } else { 0.0 })
    }

    fn sample_and_record_trials<R: RandomNumberStream + ?Sized>(
        &self,
        incoming_energy: f64,
        _rng: &mut R,
        trials: &mut u64,
    ) -> Result<ScatteringSample> {
        *trials += 1;
        Ok(ScatteringSample { energy: self.outgoing_energy(incoming_energy)?, cosine: 1.0 })
    }
}

impl ScatterParticle for AtomicExcitationDistribution {
    fn scatter<R: RandomNumberStream + ?Sized>(
        &self,
        particle: &mut ParticleState,
        _bank: &mut ParticleBank,
        _rng: &mut R,
    ) -> Result<Option<Subshell>> {
        let energy = self.outgoing_energy(particle.energy)?;
        if energy > 0.0 {
            particle.energy = energy;
        } else {
            particle.energy = 0.0;
            particle.kill();
        }
        Ok(None)
    }
}
