use std::f64::consts::PI;

use crate::constants::{
    BARNS_PER_CM2, CLASSICAL_ELECTRON_RADIUS, ELECTRON_REST_MASS_ENERGY, KAHN_SAMPLING_CUTOFF_ENERGY,
    MAX_SAMPLING_TRIALS, PLANCK_CONSTANT_TIMES_SPEED_OF_LIGHT,
};
use crate::error::{Result, TransportError, check_positive, check_range};
use crate::interpolation::{InterpolationScheme, InterpolationTable};
use crate::particle::{ParticleBank, ParticleState, rotate_direction};
use crate::scattering::{IntegratedCrossSection, ScatterParticle, ScatteringDistribution, ScatteringSample, Subshell};
use crate::utils::{GaussKronrodIntegrator, RandomNumberStream};

// Klein-Nishina dsigma/dmu in barns
pub fn klein_nishina_differential(incoming_energy: f64, cosine: f64) -> f64 {
    let alpha = incoming_energy / ELECTRON_REST_MASS_ENERGY;
    let ratio = 1.0 / (1.0 + alpha * (1.0 - cosine));
    PI * CLASSICAL_ELECTRON_RADIUS * CLASSICAL_ELECTRON_RADIUS
        * BARNS_PER_CM2
        * ratio
        * ratio
        * (ratio + 1.0 / ratio - 1.0 + cosine * cosine)
}

// Momentum transfer sin(theta/2)/lambda in inverse cm
pub fn momentum_transfer(incoming_energy: f64, cosine: f64) -> f64 {
    incoming_energy / PLANCK_CONSTANT_TIMES_SPEED_OF_LIGHT * ((1.0 - cosine) / 2.0).max(0.0).sqrt()
}

// Koblinger's direct sampling of k/k'
fn koblinger_inverse_ratio<R: RandomNumberStream + ?Sized>(alpha: f64, rng: &mut R) -> f64 {
    let beta = 1.0 + 2.0 * alpha;
    let gamma = 1.0 - beta.powi(-2);
    let s = rng.next_uniform() * (4.0 / alpha + 0.5 * gamma + (1.0 - (1.0 + beta) / (alpha * alpha)) * beta.ln());
    let r = rng.next_uniform();
    if s <= 2.0 / alpha {
        1.0 + 2.0 * alpha * r
    } else if s <= 4.0 / alpha {
        beta / (1.0 + 2.0 * alpha * r)
    } else if s <= 4.0 / alpha + 0.5 * gamma {
        1.0 / (1.0 - gamma * r).sqrt()
    } else {
        beta.powf(r)
    }
}

//=====================================================================
// Free electron (Klein-Nishina) sampling of the outgoing photon.
//
// Below the Kahn cutoff Kahn's rejection scheme is used, above it
// Koblinger's direct method. A rejection loop that hits the trial cap
// finishes with one direct draw.
//=====================================================================
pub fn sample_klein_nishina<R: RandomNumberStream + ?Sized>(
    incoming_energy: f64,
    kahn_cutoff_energy: f64,
    rng: &mut R,
    trials: &mut u64,
) -> ScatteringSample {
    let alpha = incoming_energy / ELECTRON_REST_MASS_ENERGY;
    let beta = 1.0 + 2.0 * alpha;

    let mut inverse_ratio = None;
    if incoming_energy < kahn_cutoff_energy {
        for _ in 0..MAX_SAMPLING_TRIALS {
            *trials += 1;
            let r1 = rng.next_uniform();
            let r2 = rng.next_uniform();
            let r3 = rng.next_uniform();
            if r1 <= beta / (beta + 8.0) {
                let x = 1.0 + 2.0 * alpha * r2;
                if r3 <= 4.0 * (1.0 / x - 1.0 / (x * x)) {
                    inverse_ratio = Some(x);
                    break;
                }
            } else {
                let x = beta / (1.0 + 2.0 * alpha * r2);
                let cosine = 1.0 + (1.0 - x) / alpha;
                if r3 <= 0.5 * (cosine * cosine + 1.0 / x) {
                    inverse_ratio = Some(x);
                    break;
                }
            }
        }
    }
    let x = match inverse_ratio {
        Some(x) => x,
        None => {
            *trials += 1;
            koblinger_inverse_ratio(alpha, rng)
        }
    };
    ScatteringSample { energy: incoming_energy / x, cosine: (1.0 + (1.0 - x) / alpha).clamp(-1.0, 1.0) }
}

fn check_arguments(incoming_energy: f64, cosine: f64) -> Result<()> {
    check_positive("incoming photon energy", incoming_energy)?;
    check_range("scattering angle cosine", cosine, -1.0, 1.0)
}

// Normalized CDF on [-1, cosine] of a differential cross section
fn integrated_cdf<F: Fn(f64) -> Result<f64>>(differential: F, cosine: f64, total: f64) -> Result<f64> {
    if !(total > 0.0) {
        return Err(TransportError::data_integrity("incoherent scattering", "integrated cross section vanishes"));
    }
    let (partial, _) = GaussKronrodIntegrator::default().try_integrate(&differential, -1.0, cosine)?;
    Ok((partial / total).clamp(0.0, 1.0))
}

fn scatter_photon(particle: &mut ParticleState, sample: ScatteringSample, rng: &mut (impl RandomNumberStream + ?Sized)) {
    particle.energy = sample.energy;
    particle.direction = rotate_direction(particle.direction, sample.cosine, rng);
}

//=====================================================================
// Incoherent scattering off a free electron at rest.
//=====================================================================
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KleinNishinaScattering {
    kahn_cutoff_energy: f64,
}

impl Default for KleinNishinaScattering {
    fn default() -> Self {
        Self { kahn_cutoff_energy: KAHN_SAMPLING_CUTOFF_ENERGY }
    }
}

impl KleinNishinaScattering {
    pub fn new(kahn_cutoff_energy: f64) -> Self {
        Self { kahn_cutoff_energy }
    }

    pub fn kahn_cutoff_energy(&self) -> f64 {
        self.kahn_cutoff_energy
    }
}

impl ScatteringDistribution for KleinNishinaScattering {
    fn evaluate(&self, incoming_energy: f64, cosine: f64) -> Result<f64> {
        check_arguments(incoming_energy, cosine)?;
        Ok(klein_nishina_differential(incoming_energy, cosine))
    }

    fn evaluate_pdf(&self, incoming_energy: f64, cosine: f64) -> Result<f64> {
        let total = self.evaluate_integrated_cross_section(incoming_energy, 1e-10)?;
        Ok(self.evaluate(incoming_energy, cosine)? / total)
    }

    fn evaluate_cdf(&self, incoming_energy: f64, cosine: f64) -> Result<f64> {
        check_arguments(incoming_energy, cosine)?;
        let total = self.evaluate_integrated_cross_section(incoming_energy, 1e-10)?;
        integrated_cdf(|mu| Ok(klein_nishina_differential(incoming_energy, mu)), cosine, total)
    }

    fn sample_and_record_trials<R: RandomNumberStream + ?Sized>(
        &self,
        incoming_energy: f64,
        rng: &mut R,
        trials: &mut u64,
    ) -> Result<ScatteringSample> {
        check_positive("incoming photon energy", incoming_energy)?;
        Ok(sample_klein_nishina(incoming_energy, self.kahn_cutoff_energy, rng, trials))
    }
}

impl IntegratedCrossSection for KleinNishinaScattering {
    fn evaluate_integrated_cross_section(&self, incoming_energy: f64, precision: f64) -> Result<f64> {
        check_positive("incoming photon energy", incoming_energy)?;
        let (value, _) = GaussKronrodIntegrator::new(precision)
            .integrate(|mu| klein_nishina_differential(incoming_energy, mu), -1.0, 1.0)?;
        Ok(value)
    }
}

impl ScatterParticle for KleinNishinaScattering {
    fn scatter<R: RandomNumberStream + ?Sized>(
        &self,
        particle: &mut ParticleState,
        _bank: &mut ParticleBank,
        rng: &mut R,
    ) -> Result<Option<Subshell>> {
        let sample = self.sample(particle.energy, rng)?;
        scatter_photon(particle, sample, rng);
        Ok(None)
    }
}

//=====================================================================
// Incoherent scattering with the Waller-Hartree scattering function
// S(x, Z) accounting for electron binding.
//=====================================================================
#[derive(Debug, Clone)]
pub struct WallerHartreeScattering {
    free: KleinNishinaScattering,
    scattering_function: InterpolationTable,
    maximum_value: f64,
}

impl WallerHartreeScattering {
    // `momentum` in inverse cm, as returned by `momentum_transfer`
    pub fn new(momentum: Vec<f64>, scattering_function: Vec<f64>, kahn_cutoff_energy: f64) -> Result<Self> {
        let maximum_value = scattering_function.iter().copied().fold(0.0, f64::max);
        if !(maximum_value > 0.0) {
            return Err(TransportError::data_integrity("incoherent scattering function", "function vanishes everywhere"));
        }
        let scattering_function = InterpolationTable::from_x_and_y(momentum, scattering_function, InterpolationScheme::LinLin)?;
        Ok(Self { free: KleinNishinaScattering::new(kahn_cutoff_energy), scattering_function, maximum_value })
    }

    pub fn evaluate_scattering_function(&self, incoming_energy: f64, cosine: f64) -> Result<f64> {
        Ok(self.scattering_function.interpolate_clamped(momentum_transfer(incoming_energy, cosine))?)
    }

    fn differential(&self, incoming_energy: f64, cosine: f64) -> Result<f64> {
        Ok(klein_nishina_differential(incoming_energy, cosine) * self.evaluate_scattering_function(incoming_energy, cosine)?)
    }
}

impl ScatteringDistribution for WallerHartreeScattering {
    fn evaluate(&self, incoming_energy: f64, cosine: f64) -> Result<f64> {
        check_arguments(incoming_energy, cosine)?;
        self.differential(incoming_energy, cosine)
    }

    fn evaluate_pdf(&self, incoming_energy: f64, cosine: f64) -> Result<f64> {
        let total = self.evaluate_integrated_cross_section(incoming_energy, 1e-10)?;
        Ok(self.evaluate(incoming_energy, cosine)? / total)
    }

    fn evaluate_cdf(&self, incoming_energy: f64, cosine: f64) -> Result<f64> {
        check_arguments(incoming_energy, cosine)?;
        let total = self.evaluate_integrated_cross_section(incoming_energy, 1e-10)?;
        integrated_cdf(|mu| self.differential(incoming_energy, mu), cosine, total)
    }

    // Klein-Nishina candidates accepted with probability S(x) / max S
    fn sample_and_record_trials<R: RandomNumberStream + ?Sized>(
        &self,
        incoming_energy: f64,
        rng: &mut R,
        trials: &mut u64,
    ) -> Result<ScatteringSample> {
        check_positive("incoming photon energy", incoming_energy)?;
        let mut candidate = ScatteringSample { energy: incoming_energy, cosine: 1.0 };
        for _ in 0..MAX_SAMPLING_TRIALS {
            candidate = sample_klein_nishina(incoming_energy, self.free.kahn_cutoff_energy(), rng, trials);
            let acceptance = self.evaluate_scattering_function(incoming_energy, candidate.cosine)? / self.maximum_value;
            if rng.next_uniform() <= acceptance {
                return Ok(candidate);
            }
        }
        log::warn!(
            "Waller-Hartree rejection at {} MeV did not converge in {} trials",
            incoming_energy,
            MAX_SAMPLING_TRIALS
        );
        Ok(candidate)
    }
}

impl IntegratedCrossSection for WallerHartreeScattering {
    fn evaluate_integrated_cross_section(&self, incoming_energy: f64, precision: f64) -> Result<f64> {
        check_positive("incoming photon energy", incoming_energy)?;
        let (value, _) =
            GaussKronrodIntegrator::new(precision).try_integrate(|mu| self.differential(incoming_energy, mu), -1.0, 1.0)?;
        Ok(value)
    }
}

impl ScatterParticle for WallerHartreeScattering {
    fn scatter<R: RandomNumberStream + ?Sized>(
        &self,
        particle: &mut ParticleState,
        _bank: &mut ParticleBank,
        rng: &mut R,
    ) -> Result<Option<Subshell>> {
        let sample = self.sample(particle.energy, rng)?;
        scatter_photon(particle, sample, rng);
        Ok(None)
    }
}
