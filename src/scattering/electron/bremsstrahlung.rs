use std::f64::consts::PI;

use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

use crate::constants::{ELECTRON_REST_MASS_ENERGY, MAX_SAMPLING_TRIALS};
use crate::distributions::TwoDDistribution;
use crate::error::{Result, check_positive};
use crate::particle::{ParticleBank, ParticleState, ParticleType, rotate_direction};
use crate::scattering::{ScatterParticle, ScatteringDistribution, ScatteringSample, Subshell};
use crate::utils::RandomNumberStream;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize)]
pub enum BremsstrahlungAngularModel {
    Dipole,
    TwoBS,
}

// Electron speed over c
fn beta(kinetic_energy: f64) -> f64 {
    let total = kinetic_energy + ELECTRON_REST_MASS_ENERGY;
    (kinetic_energy * (kinetic_energy + 2.0 * ELECTRON_REST_MASS_ENERGY)).sqrt() / total
}

// Inversion of the dipole angular distribution
pub fn sample_dipole_cosine(kinetic_energy: f64, random_number: f64) -> f64 {
    let beta = beta(kinetic_energy);
    ((2.0 * random_number + beta - 1.0) / (2.0 * random_number * beta - beta + 1.0)).clamp(-1.0, 1.0)
}

//=====================================================================
// Koch and Motz 2BS photon angle.
//
// With y = E0 theta (E0 the total electron energy in units of m_e c^2)
// the 2BS formula is the envelope dy^2 / (1 + y^2)^2 times a rejection
// function g(y). The maximum of g is taken from its values at
// y = 0, 1 and y_max.
//=====================================================================
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TwoBSRejection {
    total_energy: f64,
    outgoing_total_energy: f64,
    photon_energy: f64,
    screening: f64,
}

impl TwoBSRejection {
    pub fn new(kinetic_energy: f64, photon_energy: f64, atomic_number: u32) -> Self {
        let total_energy = 1.0 + kinetic_energy / ELECTRON_REST_MASS_ENERGY;
        let photon_energy = photon_energy / ELECTRON_REST_MASS_ENERGY;
        Self {
            total_energy,
            outgoing_total_energy: total_energy - photon_energy,
            photon_energy,
            screening: (atomic_number as f64).cbrt() / 111.0,
        }
    }

    pub fn maximum_y_squared(&self) -> f64 {
        (PI * self.total_energy).powi(2)
    }

    pub fn rejection_function(&self, y_squared: f64) -> f64 {
        let (e0, e) = (self.total_energy, self.outgoing_total_energy);
        let denominator = 1.0 + y_squared;
        let inverse_m = (self.photon_energy / (2.0 * e0 * e)).powi(2) + (self.screening / denominator).powi(2);
        let log_m = -inverse_m.ln();
        16.0 * y_squared * e / (denominator * denominator * e0) - (e0 + e).powi(2) / (e0 * e0)
            + ((e0 * e0 + e * e) / (e0 * e0) - 4.0 * y_squared * e / (denominator * denominator * e0)) * log_m
    }

    pub fn maximum_rejection_value(&self) -> f64 {
        [0.0, 1.0, self.maximum_y_squared()]
            .iter()
            .map(|&y_squared| self.rejection_function(y_squared))
            .fold(f64::MIN, f64::max)
    }

    pub fn cosine_from_y_squared(&self, y_squared: f64) -> f64 {
        (y_squared.sqrt() / self.total_energy).min(PI).cos()
    }

    // None when every trial was rejected
    pub fn sample_cosine<R: RandomNumberStream + ?Sized>(&self, rng: &mut R, trials: &mut u64) -> Option<f64> {
        let maximum = self.maximum_rejection_value();
        if !(maximum > 0.0) {
            return None;
        }
        let t_max = self.maximum_y_squared();
        for _ in 0..MAX_SAMPLING_TRIALS {
            *trials += 1;
            let u = rng.next_uniform();
            let y_squared = u * t_max / (1.0 + t_max * (1.0 - u));
            if rng.next_uniform() * maximum <= self.rejection_function(y_squared) {
                return Some(self.cosine_from_y_squared(y_squared));
            }
        }
        None
    }
}

//=====================================================================
// Bremsstrahlung energy loss with the emitted photon's direction.
//
// The photon energy is drawn from the tabulated spectrum below the
// electron energy, the electron keeps its direction. The photon is
// banked only when photons are transported.
//=====================================================================
#[derive(Debug, Clone)]
pub struct BremsstrahlungDistribution {
    photon_energies: TwoDDistribution,
    angular_model: BremsstrahlungAngularModel,
    atomic_number: u32,
    bank_photons: bool,
}

impl BremsstrahlungDistribution {
    pub fn new(
        photon_energies: TwoDDistribution,
        angular_model: BremsstrahlungAngularModel,
        atomic_number: u32,
        bank_photons: bool,
    ) -> Self {
        Self { photon_energies, angular_model, atomic_number, bank_photons }
    }

    pub fn angular_model(&self) -> BremsstrahlungAngularModel {
        self.angular_model
    }

    pub fn sample_photon_energy<R: RandomNumberStream + ?Sized>(&self, incoming_energy: f64, rng: &mut R) -> Result<f64> {
        check_positive("incoming electron energy", incoming_energy)?;
        Ok(self.photon_energies.sample_in_subrange(incoming_energy, rng, incoming_energy)?.min(incoming_energy))
    }

    pub fn sample_photon_cosine<R: RandomNumberStream + ?Sized>(
        &self,
        incoming_energy: f64,
        photon_energy: f64,
        rng: &mut R,
        trials: &mut u64,
    ) -> f64 {
        match self.angular_model {
            BremsstrahlungAngularModel::Dipole => {
                *trials += 1;
                sample_dipole_cosine(incoming_energy, rng.next_uniform())
            }
            BremsstrahlungAngularModel::TwoBS => {
                let rejection = TwoBSRejection::new(incoming_energy, photon_energy, self.atomic_number);
                match rejection.sample_cosine(rng, trials) {
                    Some(cosine) => cosine,
                    None => {
                        log::warn!(
                            "2BS photon angle rejection at {} MeV did not converge in {} trials, using the dipole angle",
                            incoming_energy,
                            MAX_SAMPLING_TRIALS
                        );
                        sample_dipole_cosine(incoming_energy, rng.next_uniform())
                    }
                }
            }
        }
    }
}

impl ScatteringDistribution for BremsstrahlungDistribution {
    // Photon energy spectrum at the incoming energy
    fn evaluate(&self, incoming_energy: f64, photon_energy: f64) -> Result<f64> {
        check_positive("incoming electron energy", incoming_energy)?;
        self.photon_energies.evaluate(incoming_energy, photon_energy)
    }

    fn evaluate_pdf(&self, incoming_energy: f64, photon_energy: f64) -> Result<f64> {
        check_positive("incoming electron energy", incoming_energy)?;
        self.photon_energies.evaluate_pdf(incoming_energy, photon_energy)
    }

    fn evaluate_cdf(&self, incoming_energy: f64, photon_energy: f64) -> Result<f64> {
        check_positive("incoming electron energy", incoming_energy)?;
        self.photon_energies.evaluate_cdf(incoming_energy, photon_energy)
    }

    // Outgoing electron energy, the electron direction is unchanged
    fn sample_and_record_trials<R: RandomNumberStream + ?Sized>(
        &self,
        incoming_energy: f64,
        rng: &mut R,
        trials: &mut u64,
    ) -> Result<ScatteringSample> {
        *trials += 1;
        let photon_energy = self.sample_photon_energy(incoming_energy, rng)?;
        Ok(ScatteringSample { energy: incoming_energy - photon_energy, cosine: 1.0 })
    }
}

impl ScatterParticle for BremsstrahlungDistribution {
    fn scatter<R: RandomNumberStream + ?Sized>(
        &self,
        particle: &mut ParticleState,
        bank: &mut ParticleBank,
        rng: &mut R,
    ) -> Result<Option<Subshell>> {
        let photon_energy = self.sample_photon_energy(particle.energy, rng)?;
        if self.bank_photons && photon_energy > 0.0 {
            let mut trials = 0;
            let cosine = self.sample_photon_cosine(particle.energy, photon_energy, rng, &mut trials);
            let direction = rotate_direction(particle.direction, cosine, rng);
            bank.push(particle.spawn_secondary(ParticleType::Photon, photon_energy, direction));
        }
        particle.energy -= photon_energy;
        if !(particle.energy > 0.0) {
            particle.kill();
        }
        Ok(None)
    }
}
