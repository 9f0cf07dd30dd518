use std::f64::consts::PI;

use crate::constants::{BARNS_PER_CM2, CLASSICAL_ELECTRON_RADIUS, MAX_SAMPLING_TRIALS, PLANCK_CONSTANT_TIMES_SPEED_OF_LIGHT};
use crate::distributions::{OneD, TabularDistribution, TabularScheme};
use crate::error::{Result, check_positive, check_range};
use crate::particle::{ParticleBank, ParticleState, rotate_direction};
use crate::scattering::photon::incoherent::momentum_transfer;
use crate::scattering::{IntegratedCrossSection, ScatterParticle, ScatteringDistribution, ScatteringSample, Subshell};
use crate::utils::{GaussKronrodIntegrator, RandomNumberStream};

fn thompson_differential(cosine: f64) -> f64 {
    PI * CLASSICAL_ELECTRON_RADIUS * CLASSICAL_ELECTRON_RADIUS * BARNS_PER_CM2 * (1.0 + cosine * cosine)
}

fn check_arguments(incoming_energy: f64, cosine: f64) -> Result<()> {
    check_positive("incoming photon energy", incoming_energy)?;
    check_range("scattering angle cosine", cosine, -1.0, 1.0)
}

//=====================================================================
// Coherent scattering off a free electron, (1 + mu^2) in the cosine.
//=====================================================================
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ThompsonScattering;

impl ThompsonScattering {
    // Composition sampling of 3/8 (1 + mu^2) with two draws: the uniform
    // part carries 3/4 of the weight, the 3/2 mu^2 part is inverted with a
    // cube root. The cosine is negative iff the second draw is below 0.5.
    pub fn sample_cosine<R: RandomNumberStream + ?Sized>(rng: &mut R) -> f64 {
        let selector = rng.next_uniform();
        let random_number = rng.next_uniform();
        let cosine = if selector < 0.75 { 2.0 * random_number - 1.0 } else { (2.0 * random_number - 1.0).cbrt() };
        cosine.clamp(-1.0, 1.0)
    }
}

impl ScatteringDistribution for ThompsonScattering {
    fn evaluate(&self, incoming_energy: f64, cosine: f64) -> Result<f64> {
        check_arguments(incoming_energy, cosine)?;
        Ok(thompson_differential(cosine))
    }

    fn evaluate_pdf(&self, incoming_energy: f64, cosine: f64) -> Result<f64> {
        check_arguments(incoming_energy, cosine)?;
        Ok(0.375 * (1.0 + cosine * cosine))
    }

    fn evaluate_cdf(&self, incoming_energy: f64, cosine: f64) -> Result<f64> {
        check_arguments(incoming_energy, cosine)?;
        Ok(0.375 * (cosine + cosine.powi(3) / 3.0 + 4.0 / 3.0))
    }

    fn sample_and_record_trials<R: RandomNumberStream + ?Sized>(
        &self,
        incoming_energy: f64,
        rng: &mut R,
        trials: &mut u64,
    ) -> Result<ScatteringSample> {
        check_positive("incoming photon energy", incoming_energy)?;
        *trials += 1;
        Ok(ScatteringSample { energy: incoming_energy, cosine: Self::sample_cosine(rng) })
    }
}

impl IntegratedCrossSection for ThompsonScattering {
    fn evaluate_integrated_cross_section(&self, incoming_energy: f64, _precision: f64) -> Result<f64> {
        check_positive("incoming photon energy", incoming_energy)?;
        Ok(8.0 / 3.0 * PI * CLASSICAL_ELECTRON_RADIUS * CLASSICAL_ELECTRON_RADIUS * BARNS_PER_CM2)
    }
}

impl ScatterParticle for ThompsonScattering {
    fn scatter<R: RandomNumberStream + ?Sized>(
        &self,
        particle: &mut ParticleState,
        _bank: &mut ParticleBank,
        rng: &mut R,
    ) -> Result<Option<Subshell>> {
        let sample = self.sample(particle.energy, rng)?;
        particle.direction = rotate_direction(particle.direction, sample.cosine, rng);
        Ok(None)
    }
}

//=====================================================================
// Coherent scattering with an atomic form factor F(x).
//
// The squared form factor is tabulated against x^2 (inverse cm^2) and
// sampled up to the kinematic limit x^2 = (E / hc)^2, the Thompson
// factor (1 + mu^2) / 2 is then applied by rejection.
//=====================================================================
#[derive(Debug, Clone)]
pub struct FormFactorCoherentScattering {
    squared_form_factor: TabularDistribution,
}

impl FormFactorCoherentScattering {
    // `momentum` in inverse cm
    pub fn new(momentum: &[f64], form_factor: &[f64]) -> Result<Self> {
        let squared_momentum = momentum.iter().map(|x| x * x).collect();
        let squared_form_factor = form_factor.iter().map(|f| f * f).collect();
        Ok(Self { squared_form_factor: TabularDistribution::new(TabularScheme::LinLin, squared_momentum, squared_form_factor)? })
    }

    // F(x)^2, vanishing beyond the table
    pub fn evaluate_squared_form_factor(&self, incoming_energy: f64, cosine: f64) -> Result<f64> {
        let x = momentum_transfer(incoming_energy, cosine);
        let squared = x * x;
        if squared > self.squared_form_factor.upper_bound() {
            return Ok(0.0);
        }
        self.squared_form_factor.evaluate(squared)
    }

    fn differential(&self, incoming_energy: f64, cosine: f64) -> Result<f64> {
        Ok(thompson_differential(cosine) * self.evaluate_squared_form_factor(incoming_energy, cosine)?)
    }
}

impl ScatteringDistribution for FormFactorCoherentScattering {
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
        let (partial, _) =
            GaussKronrodIntegrator::default().try_integrate(|mu| self.differential(incoming_energy, mu), -1.0, cosine)?;
        Ok((partial / total).clamp(0.0, 1.0))
    }

    fn sample_and_record_trials<R: RandomNumberStream + ?Sized>(
        &self,
        incoming_energy: f64,
        rng: &mut R,
        trials: &mut u64,
    ) -> Result<ScatteringSample> {
        check_positive("incoming photon energy", incoming_energy)?;
        let wavenumber = incoming_energy / PLANCK_CONSTANT_TIMES_SPEED_OF_LIGHT;
        let max_squared_momentum = wavenumber * wavenumber;

        let mut cosine = 1.0;
        for _ in 0..MAX_SAMPLING_TRIALS {
            *trials += 1;
            let squared_momentum = self.squared_form_factor.sample_in_subrange(rng, max_squared_momentum)?;
            cosine = (1.0 - 2.0 * squared_momentum / max_squared_momentum).clamp(-1.0, 1.0);
            if rng.next_uniform() <= 0.5 * (1.0 + cosine * cosine) {
                return Ok(ScatteringSample { energy: incoming_energy, cosine });
            }
        }
        log::warn!(
            "coherent form factor rejection at {} MeV did not converge in {} trials",
            incoming_energy,
            MAX_SAMPLING_TRIALS
        );
        Ok(ScatteringSample { energy: incoming_energy, cosine })
    }
}

impl IntegratedCrossSection for FormFactorCoherentScattering {
    fn evaluate_integrated_cross_section(&self, incoming_energy: f64, precision: f64) -> Result<f64> {
        check_positive("incoming photon energy", incoming_energy)?;
        let (value, _) =
            GaussKronrodIntegrator::new(precision).try_integrate(|mu| self.differential(incoming_energy, mu), -1.0, 1.0)?;
        Ok(value)
    }
}

impl ScatterParticle for FormFactorCoherentScattering {
    fn scatter<R: RandomNumberStream + ?Sized>(
        &self,
        particle: &mut ParticleState,
        _bank: &mut ParticleBank,
        rng: &mut R,
    ) -> Result<Option<Subshell>> {
        let sample = self.sample(particle.energy, rng)?;
        particle.direction = rotate_direction(particle.direction, sample.cosine, rng);
        Ok(None)
    }
}
