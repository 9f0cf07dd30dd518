use std::f64::consts::PI;

use crate::constants::ELECTRON_REST_MASS_ENERGY;
use crate::distributions::TwoDDistribution;
use crate::error::{Result, TransportError, check_positive};
use crate::particle::{ParticleBank, ParticleState, ParticleType, rotate_direction_with_azimuth};
use crate::scattering::{ScatterParticle, ScatteringDistribution, ScatteringSample, Subshell};
use crate::utils::RandomNumberStream;

// Cosine of an electron leaving a free-electron collision with kinetic
// energy `outgoing_energy`, both energies in MeV
pub fn binary_collision_cosine(incoming_energy: f64, outgoing_energy: f64) -> f64 {
    let tau = incoming_energy / ELECTRON_REST_MASS_ENERGY;
    let t = outgoing_energy / ELECTRON_REST_MASS_ENERGY;
    if !(t > 0.0) {
        return 0.0;
    }
    (t * (tau + 2.0) / (tau * (t + 2.0))).sqrt().min(1.0)
}

//=====================================================================
// Electroionization of one subshell. The knock-on energy is sampled
// below the energy left after paying the binding energy, the primary
// keeps the remainder. Both electrons leave in the same plane on
// opposite sides of the incoming direction.
//=====================================================================
#[derive(Debug, Clone)]
pub struct ElectroionizationSubshellDistribution {
    subshell: Subshell,
    binding_energy: f64,
    knock_on_energies: TwoDDistribution,
}

impl ElectroionizationSubshellDistribution {
    pub fn new(subshell: Subshell, binding_energy: f64, knock_on_energies: TwoDDistribution) -> Result<Self> {
        check_positive("subshell binding energy", binding_energy)?;
        Ok(Self { subshell, binding_energy, knock_on_energies })
    }

    pub fn subshell(&self) -> Subshell {
        self.subshell
    }

    pub fn binding_energy(&self) -> f64 {
        self.binding_energy
    }

    fn check_energy(&self, incoming_energy: f64) -> Result<()> {
        if !(incoming_energy > self.binding_energy) {
            return Err(TransportError::out_of_range(
                "electroionization incoming energy",
                incoming_energy,
                self.binding_energy,
                f64::INFINITY,
            ));
        }
        Ok(())
    }

    pub fn sample_knock_on_energy<R: RandomNumberStream + ?Sized>(&self, incoming_energy: f64, rng: &mut R) -> Result<f64> {
        self.check_energy(incoming_energy)?;
        let available = incoming_energy - self.binding_energy;
        let (lower, _) = self.knock_on_energies.secondary_bounds(incoming_energy)?;
        if available <= lower {
            return Ok(available);
        }
        Ok(self.knock_on_energies.sample_in_subrange(incoming_energy, rng, available)?.clamp(0.0, available))
    }
}

impl ScatteringDistribution for ElectroionizationSubshellDistribution {
    // Knock-on energy spectrum
    fn evaluate(&self, incoming_energy: f64, knock_on_energy: f64) -> Result<f64> {
        self.check_energy(incoming_energy)?;
        self.knock_on_energies.evaluate(incoming_energy, knock_on_energy)
    }

    fn evaluate_pdf(&self, incoming_energy: f64, knock_on_energy: f64) -> Result<f64> {
        self.check_energy(incoming_energy)?;
        self.knock_on_energies.evaluate_pdf(incoming_energy, knock_on_energy)
    }

    fn evaluate_cdf(&self, incoming_energy: f64, knock_on_energy: f64) -> Result<f64> {
        self.check_energy(incoming_energy)?;
        self.knock_on_energies.evaluate_cdf(incoming_energy, knock_on_energy)
    }

    // Outgoing primary energy and cosine
    fn sample_and_record_trials<R: RandomNumberStream + ?Sized>(
        &self,
        incoming_energy: f64,
        rng: &mut R,
        trials: &mut u64,
    ) -> Result<ScatteringSample> {
        *trials += 1;
        let knock_on = self.sample_knock_on_energy(incoming_energy, rng)?;
        let energy = incoming_energy - self.binding_energy - knock_on;
        Ok(ScatteringSample { energy, cosine: binary_collision_cosine(incoming_energy, energy) })
    }
}

impl ScatterParticle for ElectroionizationSubshellDistribution {
    fn scatter<R: RandomNumberStream + ?Sized>(
        &self,
        particle: &mut ParticleState,
        bank: &mut ParticleBank,
        rng: &mut R,
    ) -> Result<Option<Subshell>> {
        let incoming_energy = particle.energy;
        let knock_on_energy = self.sample_knock_on_energy(incoming_energy, rng)?;
        let primary_energy = incoming_energy - self.binding_energy - knock_on_energy;
        let azimuth = 2.0 * PI * rng.next_uniform();

        if knock_on_energy > 0.0 {
            let cosine = binary_collision_cosine(incoming_energy, knock_on_energy);
            let direction = rotate_direction_with_azimuth(particle.direction, cosine, azimuth + PI);
            bank.push(particle.spawn_secondary(ParticleType::Electron, knock_on_energy, direction));
        }

        if primary_energy > 0.0 {
            let cosine = binary_collision_cosine(incoming_energy, primary_energy);
            particle.direction = rotate_direction_with_azimuth(particle.direction, cosine, azimuth);
            particle.energy = primary_energy;
        } else {
            particle.energy = 0.0;
            particle.kill();
        }
        Ok(Some(self.subshell))
    }
}
