use crate::blocks::{NU, NuFormulation};
use crate::error::{Result, TransportError};
use crate::interpolation::InterpolationTable;
use crate::utils::RandomNumberStream;

//=====================================================================
// Number of particles leaving a reaction per incoming particle,
// including the incoming particle itself when it survives.
//
// Non-integer averages are sampled as floor(nu) plus one with the
// probability of the fractional part.
//=====================================================================
#[derive(Debug, Clone)]
pub enum Multiplicity {
    Absorption,
    Fixed(u32),
    EnergyDependent(InterpolationTable),
    Fission { nu: NU, delayed_nu: Option<NuFormulation> },
}

impl Multiplicity {
    pub fn average(&self, incoming_energy: f64) -> Result<f64> {
        match self {
            Multiplicity::Absorption => Ok(0.0),
            Multiplicity::Fixed(count) => Ok(*count as f64),
            Multiplicity::EnergyDependent(table) => Ok(table.interpolate_clamped(incoming_energy)?),
            Multiplicity::Fission { nu, delayed_nu } => nu.evaluate_total(incoming_energy, delayed_nu.as_ref()),
        }
    }

    // Fixed multiplicities draw no random number
    pub fn sample<R: RandomNumberStream + ?Sized>(&self, incoming_energy: f64, rng: &mut R) -> Result<u32> {
        match self {
            Multiplicity::Absorption => Ok(0),
            Multiplicity::Fixed(count) => Ok(*count),
            _ => {
                let average = self.average(incoming_energy)?;
                if !(average >= 0.0 && average.is_finite()) {
                    return Err(TransportError::data_integrity(
                        "reaction multiplicity",
                        format!("average multiplicity {} at {} MeV", average, incoming_energy),
                    ));
                }
                let whole = average.floor();
                let extra = if rng.next_uniform() < average - whole { 1 } else { 0 };
                Ok(whole as u32 + extra)
            }
        }
    }
}

impl std::fmt::Display for Multiplicity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Multiplicity::Absorption => write!(f, "Absorption"),
            Multiplicity::Fixed(count) => write!(f, "Fixed({})", count),
            Multiplicity::EnergyDependent(_) => write!(f, "EnergyDependent"),
            Multiplicity::Fission { .. } => write!(f, "Fission"),
        }
    }
}
