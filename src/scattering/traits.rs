use crate::error::Result;
use crate::particle::{ParticleBank, ParticleState};
use crate::scattering::Subshell;
use crate::utils::RandomNumberStream;

// Outgoing energy (MeV) and direction cosine relative to the incoming direction
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScatteringSample {
    pub energy: f64,
    pub cosine: f64,
}

//=====================================================================
// Capabilities of the scattering distributions. A distribution
// implements the subset that makes sense for its physics, a reaction
// asks for exactly the capability it uses.
//=====================================================================

// Distribution over one outgoing variable (a cosine or an energy) at a
// given incoming energy
pub trait ScatteringDistribution {
    fn evaluate(&self, incoming_energy: f64, outgoing: f64) -> Result<f64>;

    fn evaluate_pdf(&self, incoming_energy: f64, outgoing: f64) -> Result<f64>;

    fn evaluate_cdf(&self, incoming_energy: f64, outgoing: f64) -> Result<f64>;

    fn sample_and_record_trials<R: RandomNumberStream + ?Sized>(
        &self,
        incoming_energy: f64,
        rng: &mut R,
        trials: &mut u64,
    ) -> Result<ScatteringSample>;

    fn sample<R: RandomNumberStream + ?Sized>(&self, incoming_energy: f64, rng: &mut R) -> Result<ScatteringSample> {
        let mut trials = 0;
        self.sample_and_record_trials(incoming_energy, rng, &mut trials)
    }
}

pub trait IntegratedCrossSection {
    // Integral of `evaluate` over the full outgoing domain
    fn evaluate_integrated_cross_section(&self, incoming_energy: f64, precision: f64) -> Result<f64>;
}

// Collision of a forward particle. Secondaries go to the bank, the
// return value names the subshell of interaction when there is one.
pub trait ScatterParticle: Send + Sync {
    fn scatter<R: RandomNumberStream + ?Sized>(
        &self,
        particle: &mut ParticleState,
        bank: &mut ParticleBank,
        rng: &mut R,
    ) -> Result<Option<Subshell>>;
}

// Collision of an adjoint particle
pub trait ScatterAdjoint: Send + Sync {
    fn scatter_adjoint<R: RandomNumberStream + ?Sized>(
        &self,
        particle: &mut ParticleState,
        bank: &mut ParticleBank,
        rng: &mut R,
    ) -> Result<Option<Subshell>>;
}
