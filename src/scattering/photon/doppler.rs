use crate::blocks::HalfComptonProfile;
use crate::constants::{ELECTRON_REST_MASS_ENERGY, FINE_STRUCTURE_CONSTANT, MAX_SAMPLING_TRIALS};
use crate::distributions::{DiscreteDistribution, OneD, TabularDistribution, TabularScheme};
use crate::error::{Result, TransportError, check_positive, check_range};
use crate::interpolation::InterpolationScheme;
use crate::particle::{ParticleBank, ParticleState, rotate_direction};
use crate::scattering::photon::incoherent::{KleinNishinaScattering, WallerHartreeScattering, klein_nishina_differential};
use crate::scattering::{IntegratedCrossSection, ScatterParticle, ScatteringDistribution, ScatteringSample, Subshell};
use crate::utils::{GaussKronrodIntegrator, RandomNumberStream};

// Mirror a half Compton profile (atomic units) into a full profile over
// momentum in units of m_e c.
pub fn full_compton_profile(half: &HalfComptonProfile) -> Result<TabularDistribution> {
    let scheme = TabularScheme::from_interpolation(half.interpolation)?;
    if half.momentum.len() < 2 || half.momentum.len() != half.profile.len() || half.momentum[0] < 0.0 {
        return Err(TransportError::data_integrity(
            "Compton profile",
            "half profile must start at non-negative momentum with matching lengths",
        ));
    }
    let n = half.momentum.len();
    let skip_origin = half.momentum[0] == 0.0;

    let mut momentum = Vec::with_capacity(2 * n);
    let mut profile = Vec::with_capacity(2 * n);
    for k in (0..n).rev() {
        if k == 0 && skip_origin {
            break;
        }
        momentum.push(-half.momentum[k]);
        // A histogram value belongs to the bin to its right
        let value = match half.interpolation {
            InterpolationScheme::Histogram if k > 0 => half.profile[k - 1],
            _ => half.profile[k],
        };
        profile.push(value);
    }
    momentum.extend_from_slice(&half.momentum);
    profile.extend_from_slice(&half.profile);

    TabularDistribution::new(
        scheme,
        momentum.into_iter().map(|pz| pz * FINE_STRUCTURE_CONSTANT).collect(),
        profile.into_iter().map(|j| j / FINE_STRUCTURE_CONSTANT).collect(),
    )
}

// Largest electron momentum projection (m_e c) that leaves the electron
// unbound, negative when the shell cannot be ionized at this angle
pub fn maximum_electron_momentum(incoming_energy: f64, binding_energy: f64, cosine: f64) -> f64 {
    let e = incoming_energy / ELECTRON_REST_MASS_ENERGY;
    let eb = binding_energy / ELECTRON_REST_MASS_ENERGY;
    let remaining = e - eb;
    let numerator = e * remaining * (1.0 - cosine) - eb;
    let denominator = (e * e + remaining * remaining - 2.0 * e * remaining * cosine).sqrt();
    numerator / denominator
}

// Outgoing photon energy for an electron momentum projection, None when
// the kinematics have no real positive solution
pub fn doppler_broadened_energy(incoming_energy: f64, cosine: f64, momentum: f64) -> Option<f64> {
    let e = incoming_energy / ELECTRON_REST_MASS_ENERGY;
    let kappa = 1.0 + e * (1.0 - cosine);
    let squared = momentum * momentum;
    let discriminant = kappa * kappa - 2.0 * kappa * cosine + 1.0 - squared * (1.0 - cosine * cosine);
    let denominator = kappa * kappa - squared;
    if discriminant < 0.0 || denominator <= 0.0 {
        return None;
    }
    let energy = incoming_energy * (kappa - squared * cosine + momentum * discriminant.sqrt()) / denominator;
    (energy > 0.0 && energy.is_finite()).then_some(energy)
}

pub fn compton_line_energy(incoming_energy: f64, cosine: f64) -> f64 {
    incoming_energy / (1.0 + incoming_energy / ELECTRON_REST_MASS_ENERGY * (1.0 - cosine))
}

#[derive(Debug, Clone)]
pub struct ComptonShell {
    pub subshell: Subshell,
    pub binding_energy: f64,
    pub occupancy: f64,
    profile: TabularDistribution,
}

impl ComptonShell {
    pub fn new(subshell: Subshell, binding_energy: f64, occupancy: f64, half_profile: &HalfComptonProfile) -> Result<Self> {
        if !(binding_energy >= 0.0 && occupancy >= 0.0) {
            return Err(TransportError::data_integrity(
                format!("Compton shell {}", subshell),
                format!("binding energy {} and occupancy {} must be non-negative", binding_energy, occupancy),
            ));
        }
        Ok(Self { subshell, binding_energy, occupancy, profile: full_compton_profile(half_profile)? })
    }

    pub fn profile(&self) -> &TabularDistribution {
        &self.profile
    }

    // Fraction of the shell's electrons below a momentum projection
    fn profile_cdf(&self, momentum: f64) -> Result<f64> {
        if momentum <= self.profile.lower_bound() {
            Ok(0.0)
        } else if momentum >= self.profile.upper_bound() {
            Ok(1.0)
        } else {
            self.profile.evaluate_cdf(momentum)
        }
    }
}

// Angular model the broadened energy is applied on top of
#[derive(Debug, Clone)]
pub enum IncoherentAngularModel {
    Free(KleinNishinaScattering),
    WallerHartree(WallerHartreeScattering),
}

impl IncoherentAngularModel {
    fn sample_cosine<R: RandomNumberStream + ?Sized>(&self, incoming_energy: f64, rng: &mut R, trials: &mut u64) -> Result<f64> {
        let sample = match self {
            Self::Free(model) => model.sample_and_record_trials(incoming_energy, rng, trials)?,
            Self::WallerHartree(model) => model.sample_and_record_trials(incoming_energy, rng, trials)?,
        };
        Ok(sample.cosine)
    }
}

// Outcome of the broadening retry loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DopplerSample {
    pub energy: f64,
    pub subshell: Option<Subshell>,
    pub trials: u64,
}

//=====================================================================
// Doppler broadened incoherent scattering.
//
// The scattering cosine comes from the angular model. The struck shell
// is picked from its occupancy and an electron momentum projection is
// drawn from the shell's profile below the largest allowed value. The
// draw is repeated while the result is not energetically possible, up
// to MAX_SAMPLING_TRIALS attempts, after which the Compton line energy
// is used.
//=====================================================================
#[derive(Debug, Clone)]
pub struct DopplerBroadenedIncoherentScattering {
    angular: IncoherentAngularModel,
    shells: Vec<ComptonShell>,
    shell_selection: DiscreteDistribution,
}

impl DopplerBroadenedIncoherentScattering {
    // `shell_cdf` holds the cumulative shell selection probabilities
    pub fn new(angular: IncoherentAngularModel, shells: Vec<ComptonShell>, shell_cdf: &[f64]) -> Result<Self> {
        if shells.is_empty() || shells.len() != shell_cdf.len() {
            return Err(TransportError::data_integrity(
                "Doppler broadening",
                format!("{} Compton shells for {} selection probabilities", shells.len(), shell_cdf.len()),
            ));
        }
        let indices = (0..shells.len()).map(|index| index as f64).collect();
        let shell_selection = DiscreteDistribution::from_cdf(indices, shell_cdf.to_vec())?;
        Ok(Self { angular, shells, shell_selection })
    }

    pub fn shells(&self) -> &[ComptonShell] {
        &self.shells
    }

    pub fn sample_broadened_energy<R: RandomNumberStream + ?Sized>(
        &self,
        incoming_energy: f64,
        cosine: f64,
        rng: &mut R,
    ) -> Result<DopplerSample> {
        check_positive("incoming photon energy", incoming_energy)?;
        check_range("scattering angle cosine", cosine, -1.0, 1.0)?;

        for attempt in 1..=MAX_SAMPLING_TRIALS {
            let shell = &self.shells[self.shell_selection.sample_index_with_random_number(rng.next_unit())];
            if incoming_energy <= shell.binding_energy {
                continue;
            }
            let max_momentum = maximum_electron_momentum(incoming_energy, shell.binding_energy, cosine);
            if max_momentum < 0.0 || max_momentum < shell.profile.lower_bound() {
                continue;
            }
            let momentum = shell.profile.sample_in_subrange(rng, max_momentum)?;
            if let Some(energy) = doppler_broadened_energy(incoming_energy, cosine, momentum) {
                return Ok(DopplerSample { energy, subshell: Some(shell.subshell), trials: attempt });
            }
        }
        log::debug!(
            "Doppler broadening at {} MeV, mu = {} fell back to the Compton line",
            incoming_energy,
            cosine
        );
        Ok(DopplerSample {
            energy: compton_line_energy(incoming_energy, cosine),
            subshell: None,
            trials: MAX_SAMPLING_TRIALS,
        })
    }

    fn profile_terms(&self, incoming_energy: f64, cosine: f64) -> Result<f64> {
        let mut compton_profile_terms = 0.0;
        for shell in self.shells.iter().filter(|shell| incoming_energy > shell.binding_energy) {
            let max_momentum = maximum_electron_momentum(incoming_energy, shell.binding_energy, cosine);
            compton_profile_terms += shell.occupancy * shell.profile_cdf(max_momentum)?;
        }
        Ok(compton_profile_terms)
    }

    fn differential(&self, incoming_energy: f64, cosine: f64) -> Result<f64> {
        Ok(klein_nishina_differential(incoming_energy, cosine) * self.profile_terms(incoming_energy, cosine)?)
    }
}

impl ScatteringDistribution for DopplerBroadenedIncoherentScattering {
    // Klein-Nishina times the occupancy weighted profile fractions below
    // each shell's maximum momentum
    fn evaluate(&self, incoming_energy: f64, cosine: f64) -> Result<f64> {
        check_positive("incoming photon energy", incoming_energy)?;
        check_range("scattering angle cosine", cosine, -1.0, 1.0)?;
        self.differential(incoming_energy, cosine)
    }

    fn evaluate_pdf(&self, incoming_energy: f64, cosine: f64) -> Result<f64> {
        let total = self.evaluate_integrated_cross_section(incoming_energy, 1e-10)?;
        Ok(self.evaluate(incoming_energy, cosine)? / total)
    }

    fn evaluate_cdf(&self, incoming_energy: f64, cosine: f64) -> Result<f64> {
        check_range("scattering angle cosine", cosine, -1.0, 1.0)?;
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
        let cosine = self.angular.sample_cosine(incoming_energy, rng, trials)?;
        let broadened = self.sample_broadened_energy(incoming_energy, cosine, rng)?;
        *trials += broadened.trials;
        Ok(ScatteringSample { energy: broadened.energy, cosine })
    }
}

impl IntegratedCrossSection for DopplerBroadenedIncoherentScattering {
    fn evaluate_integrated_cross_section(&self, incoming_energy: f64, precision: f64) -> Result<f64> {
        check_positive("incoming photon energy", incoming_energy)?;
        let total = GaussKronrodIntegrator::new(precision)
            .try_integrate(|mu| self.differential(incoming_energy, mu), -1.0, 1.0)?
            .0;
        if !(total > 0.0) {
            return Err(TransportError::data_integrity(
                "Doppler broadening",
                format!("no shell can scatter at {} MeV", incoming_energy),
            ));
        }
        Ok(total)
    }
}

impl ScatterParticle for DopplerBroadenedIncoherentScattering {
    fn scatter<R: RandomNumberStream + ?Sized>(
        &self,
        particle: &mut ParticleState,
        _bank: &mut ParticleBank,
        rng: &mut R,
    ) -> Result<Option<Subshell>> {
        let mut trials = 0;
        let cosine = self.angular.sample_cosine(particle.energy, rng, &mut trials)?;
        let broadened = self.sample_broadened_energy(particle.energy, cosine, rng)?;
        particle.energy = broadened.energy;
        particle.direction = rotate_direction(particle.direction, cosine, rng);
        Ok(broadened.subshell)
    }
}
