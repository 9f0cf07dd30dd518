use crate::error::{Result, TransportError};
use crate::interpolation::InterpolationTable;
use crate::utils::float_to_index;

//=====================================================================
// NU data block
//
// Contains information on the number of neutrons released per fission,
// for both total and (sometimes) prompt neutrons.
//=====================================================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NU {
    pub prompt: Option<NuFormulation>,
    pub total: Option<NuFormulation>,
}

impl NU {
    // Decode a NU block. A single array is the total nu unless delayed
    // data is present, in which case it is the prompt nu.
    pub fn process(data: &[f64], has_delayed_data: bool) -> Result<Self> {
        let flag = *data
            .first()
            .ok_or_else(|| TransportError::data_integrity("NU block", "block is empty"))?;

        if flag < 0.0 {
            // Both blocks, |flag| is the prompt array length
            let prompt_length = float_to_index(-flag, "NU block")?;
            let prompt_end = 1 + prompt_length;
            if data.len() < prompt_end {
                return Err(TransportError::data_integrity("NU block", "prompt nu array is truncated"));
            }
            let prompt = NuFormulation::process(&data[1..prompt_end])?;
            let total = NuFormulation::process(&data[prompt_end..])?;
            return Ok(NU { prompt: Some(prompt), total: Some(total) });
        }

        let formulation = NuFormulation::process(data)?;
        if has_delayed_data {
            Ok(NU { prompt: Some(formulation), total: None })
        } else {
            Ok(NU { prompt: None, total: Some(formulation) })
        }
    }

    // Total nu, reconstructed from prompt + delayed when only prompt is tabulated
    pub fn evaluate_total(&self, energy: f64, delayed: Option<&NuFormulation>) -> Result<f64> {
        match (&self.total, &self.prompt, delayed) {
            (Some(total), _, _) => total.evaluate(energy),
            (None, Some(prompt), Some(delayed)) => Ok(prompt.evaluate(energy)? + delayed.evaluate(energy)?),
            (None, Some(prompt), None) => prompt.evaluate(energy),
            (None, None, _) => Err(TransportError::data_integrity("NU block", "neither prompt nor total nu is present")),
        }
    }
}

impl std::fmt::Display for NU {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut desc = String::new();
        if self.prompt.is_some() {
            desc.push_str("Prompt ");
        }
        if self.total.is_some() {
            desc.push_str("Total ");
        }
        write!(f, "NU( {})", desc)
    }
}

//=====================================================================
// NU may be given in one of two forms: polynomial or tabulated
//=====================================================================
#[derive(Debug, Clone, PartialEq)]
pub enum NuFormulation {
    Polynomial(Vec<f64>),
    Tabulated(InterpolationTable),
}

impl NuFormulation {
    // Decode LNU followed by its data
    pub fn process(data: &[f64]) -> Result<Self> {
        let lnu = float_to_index(data.first().copied().unwrap_or(0.0), "NU array")?;
        match lnu {
            1 => {
                let num_coefficients = float_to_index(data.get(1).copied().unwrap_or(-1.0), "NU array")?;
                let coefficients = data.get(2..2 + num_coefficients).ok_or_else(|| {
                    TransportError::data_integrity("NU array", "polynomial coefficients are truncated")
                })?;
                Ok(NuFormulation::Polynomial(coefficients.to_vec()))
            }
            2 => {
                let table = InterpolationTable::process(&data[1..])
                    .map_err(|err| TransportError::data_integrity("NU array", err.to_string()))?;
                Ok(NuFormulation::Tabulated(table))
            }
            other => Err(TransportError::data_integrity(
                "NU array",
                format!("unknown nu formulation {}, expected 1 or 2", other),
            )),
        }
    }

    // Evaluate at an energy (given in MeV), tabulated data is held
    // constant outside of its grid
    pub fn evaluate(&self, energy: f64) -> Result<f64> {
        match self {
            NuFormulation::Polynomial(coefficients) => {
                // Horner's rule
                Ok(coefficients.iter().rev().fold(0.0, |acc, coef| acc * energy + coef))
            }
            NuFormulation::Tabulated(table) => Ok(table.interpolate_clamped(energy)?),
        }
    }
}
