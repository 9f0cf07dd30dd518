use crate::blocks::{NU, NuFormulation, PrecursorGroup};
use crate::distributions::{ExponentialDistribution, OneD};
use crate::error::{Result, TransportError, check_positive};
use crate::particle::{ParticleBank, ParticleState, rotate_direction, sample_isotropic_direction};
use crate::scattering::neutron::{EnergyLaw, InelasticNeutronScattering};
use crate::scattering::{ScatterParticle, Subshell};
use crate::unitf64::UnitF64;
use crate::utils::RandomNumberStream;

//=====================================================================
// Delayed neutron emission after fission.
//
// A precursor group is picked from the group probabilities at the
// incoming energy, the emission is delayed by an exponential decay
// time of that group and the neutron leaves isotropically with an
// energy from the group's own spectrum.
//=====================================================================
#[derive(Debug, Clone)]
pub struct DelayedNeutronEmission {
    groups: Vec<PrecursorGroup>,
    decay_times: Vec<ExponentialDistribution>,
    spectra: Vec<EnergyLaw>,
}

impl DelayedNeutronEmission {
    pub fn new(groups: Vec<PrecursorGroup>, spectra: Vec<EnergyLaw>) -> Result<Self> {
        if groups.is_empty() || groups.len() != spectra.len() {
            return Err(TransportError::data_integrity(
                "delayed neutron emission",
                format!("{} precursor groups for {} energy spectra", groups.len(), spectra.len()),
            ));
        }
        let decay_times = groups
            .iter()
            .map(|group| ExponentialDistribution::decay(group.decay_constant))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { groups, decay_times, spectra })
    }

    pub fn num_groups(&self) -> usize {
        self.groups.len()
    }

    // Precursor group index for a random number, probabilities are renormalized
    pub fn sample_group(&self, incoming_energy: f64, random_number: UnitF64) -> Result<usize> {
        let probabilities = self
            .groups
            .iter()
            .map(|group| Ok(group.probability.interpolate_clamped(incoming_energy)?.max(0.0)))
            .collect::<Result<Vec<f64>>>()?;
        let total: f64 = probabilities.iter().sum();
        if !(total > 0.0) {
            return Err(TransportError::data_integrity(
                "delayed neutron emission",
                format!("precursor group probabilities vanish at {} MeV", incoming_energy),
            ));
        }
        let target = random_number.0 * total;
        let mut cumulative = 0.0;
        for (index, probability) in probabilities.iter().enumerate() {
            cumulative += probability;
            if target < cumulative {
                return Ok(index);
            }
        }
        Ok(probabilities.len() - 1)
    }

    // Emission delay (s) of a group, -ln(1 - U) / lambda, finite for U in [0, 1)
    pub fn sample_emission_time(&self, group: usize, random_number: UnitF64) -> f64 {
        self.decay_times[group].sample_with_random_number(random_number)
    }

    pub fn emit<R: RandomNumberStream + ?Sized>(&self, particle: &mut ParticleState, rng: &mut R) -> Result<()> {
        let group = self.sample_group(particle.energy, rng.next_unit())?;
        particle.time += self.sample_emission_time(group, rng.next_unit());
        let (energy, _) = self.spectra[group].sample(particle.energy, rng)?;
        particle.energy = energy;
        particle.direction = sample_isotropic_direction(rng);
        Ok(())
    }
}

//=====================================================================
// Fission neutron emission. Every emitted neutron is delayed with the
// probability nu_delayed / nu_total and prompt otherwise.
//=====================================================================
#[derive(Debug, Clone)]
pub struct FissionNeutronScattering {
    prompt: InelasticNeutronScattering,
    nu: NU,
    delayed_nu: Option<NuFormulation>,
    delayed: Option<DelayedNeutronEmission>,
}

impl FissionNeutronScattering {
    pub fn new(
        prompt: InelasticNeutronScattering,
        nu: NU,
        delayed_nu: Option<NuFormulation>,
        delayed: Option<DelayedNeutronEmission>,
    ) -> Self {
        if delayed_nu.is_some() != delayed.is_some() {
            log::warn!("delayed nu and delayed neutron spectra are not both present, delayed emission is disabled");
        }
        Self { prompt, nu, delayed_nu, delayed }
    }

    pub fn delayed_fraction(&self, incoming_energy: f64) -> Result<f64> {
        check_positive("incoming neutron energy", incoming_energy)?;
        match (&self.delayed_nu, &self.delayed) {
            (Some(delayed_nu), Some(_)) => {
                let total = self.nu.evaluate_total(incoming_energy, Some(delayed_nu))?;
                check_positive("total nu", total)?;
                Ok((delayed_nu.evaluate(incoming_energy)? / total).clamp(0.0, 1.0))
            }
            _ => Ok(0.0),
        }
    }
}

impl ScatterParticle for FissionNeutronScattering {
    fn scatter<R: RandomNumberStream + ?Sized>(
        &self,
        particle: &mut ParticleState,
        _bank: &mut ParticleBank,
        rng: &mut R,
    ) -> Result<Option<Subshell>> {
        let delayed_fraction = self.delayed_fraction(particle.energy)?;
        if let Some(delayed) = &self.delayed {
            if rng.next_uniform() < delayed_fraction {
                delayed.emit(particle, rng)?;
                return Ok(None);
            }
        }
        let (energy, cosine) = self.prompt.sample(particle.energy, rng)?;
        particle.energy = energy;
        particle.direction = rotate_direction(particle.direction, cosine, rng);
        Ok(None)
    }
}
