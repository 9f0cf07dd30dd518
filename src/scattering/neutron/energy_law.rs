use std::f64::consts::FRAC_PI_2;

use crate::constants::MAX_SAMPLING_TRIALS;
use crate::distributions::{EquiprobableBinsDistribution, OneD, TabularDistribution, TabularScheme, TwoDDistribution};
use crate::error::{Result, TransportError, check_positive};
use crate::interpolation::InterpolationTable;
use crate::utils::{RandomNumberStream, search_bin};

//=====================================================================
// Secondary energy laws of the DLW block. Sampling returns the
// outgoing energy and, for laws that correlate energy and angle, the
// outgoing cosine. Energies are in the frame given by the reaction's
// TYR entry.
//=====================================================================
#[derive(Debug, Clone)]
pub enum EnergyLaw {
    EquiprobableBins(TwoDDistribution),
    LevelScattering(LevelScattering),
    ContinuousTabular(TwoDDistribution),
    GeneralEvaporation(GeneralEvaporation),
    SimpleMaxwellFission(NuclearTemperatureSpectrum),
    Evaporation(NuclearTemperatureSpectrum),
    Watt(WattSpectrum),
    KalbachMann(KalbachMann),
}

impl EnergyLaw {
    // ACE law number
    pub fn law(&self) -> u32 {
        match self {
            EnergyLaw::EquiprobableBins(_) => 1,
            EnergyLaw::LevelScattering(_) => 3,
            EnergyLaw::ContinuousTabular(_) => 4,
            EnergyLaw::GeneralEvaporation(_) => 5,
            EnergyLaw::SimpleMaxwellFission(_) => 7,
            EnergyLaw::Evaporation(_) => 9,
            EnergyLaw::Watt(_) => 11,
            EnergyLaw::KalbachMann(_) => 44,
        }
    }

    pub fn sample<R: RandomNumberStream + ?Sized>(&self, incoming_energy: f64, rng: &mut R) -> Result<(f64, Option<f64>)> {
        check_positive("incoming neutron energy", incoming_energy)?;
        let energy = match self {
            EnergyLaw::EquiprobableBins(table) | EnergyLaw::ContinuousTabular(table) => {
                table.sample(incoming_energy, rng)?
            }
            EnergyLaw::LevelScattering(law) => law.outgoing_energy(incoming_energy),
            EnergyLaw::GeneralEvaporation(law) => law.sample(incoming_energy, rng)?,
            EnergyLaw::SimpleMaxwellFission(law) => law.sample_maxwell(incoming_energy, rng)?,
            EnergyLaw::Evaporation(law) => law.sample_evaporation(incoming_energy, rng)?,
            EnergyLaw::Watt(law) => law.sample(incoming_energy, rng)?,
            EnergyLaw::KalbachMann(law) => {
                let (energy, cosine) = law.sample(incoming_energy, rng)?;
                return Ok((energy, Some(cosine)));
            }
        };
        Ok((energy.max(0.0), None))
    }
}

//=====================================================================
// Law 3: E_out = b * (E - a) with a = (A + 1)/A |Q| and b = (A/(A + 1))^2
//=====================================================================
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelScattering {
    pub threshold: f64,
    pub mass_ratio: f64,
}

impl LevelScattering {
    pub fn new(threshold: f64, mass_ratio: f64) -> Self {
        Self { threshold, mass_ratio }
    }

    pub fn from_q_value(q_value: f64, atomic_weight_ratio: f64) -> Self {
        let a = atomic_weight_ratio;
        Self::new((a + 1.0) / a * q_value.abs(), (a / (a + 1.0)).powi(2))
    }

    pub fn outgoing_energy(&self, incoming_energy: f64) -> f64 {
        self.mass_ratio * (incoming_energy - self.threshold).max(0.0)
    }
}

//=====================================================================
// Law 5: E_out = x * theta(E), x drawn from equiprobable bins
//=====================================================================
#[derive(Debug, Clone)]
pub struct GeneralEvaporation {
    pub temperature: InterpolationTable,
    pub scale: EquiprobableBinsDistribution,
}

impl GeneralEvaporation {
    fn sample<R: RandomNumberStream + ?Sized>(&self, incoming_energy: f64, rng: &mut R) -> Result<f64> {
        let temperature = self.temperature.interpolate_clamped(incoming_energy)?;
        Ok(self.scale.sample(rng) * temperature)
    }
}

//=====================================================================
// Laws 7 and 9: spectra parametrized by a nuclear temperature theta(E)
// and cut off at E - U.
//=====================================================================
#[derive(Debug, Clone)]
pub struct NuclearTemperatureSpectrum {
    pub temperature: InterpolationTable,
    pub restriction_energy: f64,
}

// -theta (ln r1 + ln r2 cos^2(pi r3 / 2)), a draw from sqrt(E) exp(-E/theta)
fn maxwell_variate<R: RandomNumberStream + ?Sized>(temperature: f64, rng: &mut R) -> f64 {
    let r1 = 1.0 - rng.next_uniform();
    let r2 = 1.0 - rng.next_uniform();
    let c = (FRAC_PI_2 * rng.next_uniform()).cos();
    -temperature * (r1.ln() + r2.ln() * c * c)
}

// Rejection loop shared by the restricted spectra. After the trial cap
// the last candidate is clamped onto the allowed range.
fn sample_restricted<R, F>(maximum_energy: f64, law: u32, rng: &mut R, mut candidate: F) -> Result<f64>
where
    R: RandomNumberStream + ?Sized,
    F: FnMut(&mut R) -> Result<f64>,
{
    if maximum_energy <= 0.0 {
        return Ok(0.0);
    }
    let mut last = 0.0;
    for _ in 0..MAX_SAMPLING_TRIALS {
        last = candidate(&mut *rng)?;
        if (0.0..=maximum_energy).contains(&last) {
            return Ok(last);
        }
    }
    log::warn!("law {} rejection sampling did not converge in {} trials", law, MAX_SAMPLING_TRIALS);
    Ok(last.clamp(0.0, maximum_energy))
}

impl NuclearTemperatureSpectrum {
    fn parameters(&self, incoming_energy: f64) -> Result<(f64, f64)> {
        let temperature = self.temperature.interpolate_clamped(incoming_energy)?;
        check_positive("nuclear temperature", temperature)?;
        Ok((temperature, incoming_energy - self.restriction_energy))
    }

    fn sample_maxwell<R: RandomNumberStream + ?Sized>(&self, incoming_energy: f64, rng: &mut R) -> Result<f64> {
        let (temperature, maximum) = self.parameters(incoming_energy)?;
        sample_restricted(maximum, 7, rng, |rng| Ok(maxwell_variate(temperature, rng)))
    }

    fn sample_evaporation<R: RandomNumberStream + ?Sized>(&self, incoming_energy: f64, rng: &mut R) -> Result<f64> {
        let (temperature, maximum) = self.parameters(incoming_energy)?;
        sample_restricted(maximum, 9, rng, |rng| {
            let r1 = 1.0 - rng.next_uniform();
            let r2 = 1.0 - rng.next_uniform();
            Ok(-temperature * (r1 * r2).ln())
        })
    }
}

//=====================================================================
// Law 11: energy dependent Watt spectrum exp(-E/a) sinh(sqrt(b E))
//=====================================================================
#[derive(Debug, Clone)]
pub struct WattSpectrum {
    pub a: InterpolationTable,
    pub b: InterpolationTable,
    pub restriction_energy: f64,
}

impl WattSpectrum {
    fn sample<R: RandomNumberStream + ?Sized>(&self, incoming_energy: f64, rng: &mut R) -> Result<f64> {
        let a = self.a.interpolate_clamped(incoming_energy)?;
        let b = self.b.interpolate_clamped(incoming_energy)?;
        check_positive("Watt parameter a", a)?;
        let maximum = incoming_energy - self.restriction_energy;
        sample_restricted(maximum, 11, rng, |rng| {
            let w = maxwell_variate(a, rng);
            let shift = (2.0 * rng.next_uniform() - 1.0) * (a * a * b * w).sqrt();
            Ok(w + 0.25 * a * a * b + shift)
        })
    }
}

//=====================================================================
// Law 44: Kalbach-Mann correlated energy-angle distribution.
//=====================================================================
#[derive(Debug, Clone)]
pub struct KalbachTable {
    pub outgoing: TabularDistribution,
    pub precompound_fraction: Vec<f64>,
    pub angular_slope: Vec<f64>,
}

#[derive(Debug, Clone)]
pub struct KalbachMann {
    energies: Vec<f64>,
    tables: Vec<KalbachTable>,
}

impl KalbachMann {
    pub fn new(energies: Vec<f64>, tables: Vec<KalbachTable>) -> Result<Self> {
        if energies.is_empty() || energies.len() != tables.len() {
            return Err(TransportError::data_integrity(
                "Kalbach-Mann distribution",
                format!("{} incoming energies for {} tables", energies.len(), tables.len()),
            ));
        }
        for table in &tables {
            let points = table.outgoing.x().len();
            if table.precompound_fraction.len() != points || table.angular_slope.len() != points {
                return Err(TransportError::data_integrity(
                    "Kalbach-Mann distribution",
                    "R and A arrays must match the outgoing energy grid",
                ));
            }
        }
        Ok(Self { energies, tables })
    }

    fn parameter(table: &KalbachTable, values: &[f64], bin: usize, energy: f64) -> f64 {
        let x = table.outgoing.x();
        if table.outgoing.scheme() == TabularScheme::Histogram || bin + 1 >= x.len() || x[bin + 1] == x[bin] {
            return values[bin];
        }
        let fraction = (energy - x[bin]) / (x[bin + 1] - x[bin]);
        values[bin] + fraction * (values[bin + 1] - values[bin])
    }

    // Kalbach angular distribution with precompound fraction r and slope a
    pub fn sample_cosine(precompound_fraction: f64, slope: f64, r3: f64, r4: f64) -> f64 {
        if slope.abs() < 1e-12 {
            return 2.0 * r4 - 1.0;
        }
        let cosine = if r3 > precompound_fraction {
            let t = (2.0 * r4 - 1.0) * slope.sinh();
            (t + (t * t + 1.0).sqrt()).ln() / slope
        } else {
            (r4 * slope.exp() + (1.0 - r4) * (-slope).exp()).ln() / slope
        };
        cosine.clamp(-1.0, 1.0)
    }

    fn sample<R: RandomNumberStream + ?Sized>(&self, incoming_energy: f64, rng: &mut R) -> Result<(f64, f64)> {
        let last = self.energies.len() - 1;
        let (lower, fraction) = if incoming_energy <= self.energies[0] || last == 0 {
            (0, 0.0)
        } else if incoming_energy >= self.energies[last] {
            (last, 0.0)
        } else {
            let bin = search_bin(&self.energies, incoming_energy);
            let fraction = (incoming_energy - self.energies[bin]) / (self.energies[bin + 1] - self.energies[bin]);
            (bin, fraction)
        };
        let chosen = if lower < last && rng.next_uniform() < fraction { lower + 1 } else { lower };
        let table = &self.tables[chosen];
        let (sampled, bin) = table.outgoing.sample_with_bin_index(rng.next_unit());

        // Unit-base stretch onto the interpolated outgoing range
        let energy = if lower < last {
            let (low, high) = (&self.tables[lower].outgoing, &self.tables[lower + 1].outgoing);
            let first = low.lower_bound() + fraction * (high.lower_bound() - low.lower_bound());
            let end = low.upper_bound() + fraction * (high.upper_bound() - low.upper_bound());
            let width = table.outgoing.upper_bound() - table.outgoing.lower_bound();
            if width > 0.0 {
                first + (sampled - table.outgoing.lower_bound()) * (end - first) / width
            } else {
                first
            }
        } else {
            sampled
        };

        let precompound_fraction = Self::parameter(table, &table.precompound_fraction, bin, sampled);
        let slope = Self::parameter(table, &table.angular_slope, bin, sampled);
        let r3 = rng.next_uniform();
        let r4 = rng.next_uniform();
        Ok((energy.max(0.0), Self::sample_cosine(precompound_fraction, slope, r3, r4)))
    }
}
