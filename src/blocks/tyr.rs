use crate::error::{Result, TransportError};
use crate::utils::float_to_int;

//=====================================================================
// TYR data block entries
//
// Each reaction's TYR value describes how many neutrons it releases
// and the frame of reference (center of mass vs. laboratory) in which
// its secondary distributions are tabulated.
//=====================================================================

// Types of neutron release
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberOfExitingNeutrons {
    Discrete(u32),
    EnergyDependent,
    Fission,
    Absorption,
}

// Scattering system type which describes the cross section tables used to determine the exiting neutrons’ angles.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitingNeutronFrameOfReference {
    CenterOfMass,
    Laboratory,
    NoRelease,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitingNeutronData {
    pub neutron_release: NumberOfExitingNeutrons,
    pub frame_of_reference: ExitingNeutronFrameOfReference,
}

impl ExitingNeutronData {
    // 0 = absorption, +/- 1-4 = discrete, +/- 19 = fission, |value| > 100 = energy dependent yield
    pub fn from_tyr(value: f64, mt: u32) -> Result<Self> {
        let value = float_to_int(value, "TYR block")?;
        let neutron_release = match value.abs() {
            0 => NumberOfExitingNeutrons::Absorption,
            n @ 1..=4 => NumberOfExitingNeutrons::Discrete(n as u32),
            19 => NumberOfExitingNeutrons::Fission,
            n if n > 100 => NumberOfExitingNeutrons::EnergyDependent,
            _ => {
                return Err(TransportError::data_integrity(
                    format!("TYR block (MT {})", mt),
                    format!("allowable values are 0, +/- 1-4, 19, and > 100, found {}", value),
                ));
            }
        };
        let frame_of_reference = match value {
            0 => ExitingNeutronFrameOfReference::NoRelease,
            n if n > 0 => ExitingNeutronFrameOfReference::Laboratory,
            _ => ExitingNeutronFrameOfReference::CenterOfMass,
        };
        Ok(Self { neutron_release, frame_of_reference })
    }

    // Location (relative to DLW) of the energy dependent yield table
    pub fn yield_table_offset(value: f64) -> Option<usize> {
        let value = value.abs().round() as usize;
        (value > 100).then(|| value - 100)
    }
}

impl std::fmt::Display for ExitingNeutronData {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?} ({:?})", self.neutron_release, self.frame_of_reference)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decoding() {
        assert_eq!(
            ExitingNeutronData::from_tyr(19.0, 18).unwrap(),
            ExitingNeutronData {
                neutron_release: NumberOfExitingNeutrons::Fission,
                frame_of_reference: ExitingNeutronFrameOfReference::Laboratory,
            }
        );
        assert_eq!(
            ExitingNeutronData::from_tyr(-2.0, 16).unwrap().neutron_release,
            NumberOfExitingNeutrons::Discrete(2)
        );
        assert_eq!(
            ExitingNeutronData::from_tyr(-1.0, 51).unwrap().frame_of_reference,
            ExitingNeutronFrameOfReference::CenterOfMass
        );
        assert_eq!(
            ExitingNeutronData::from_tyr(0.0, 102).unwrap().neutron_release,
            NumberOfExitingNeutrons::Absorption
        );
        assert_eq!(
            ExitingNeutronData::from_tyr(-105.0, 5).unwrap().neutron_release,
            NumberOfExitingNeutrons::EnergyDependent
        );
        assert_eq!(ExitingNeutronData::yield_table_offset(-105.0), Some(5));
    }

    #[test]
    fn test_invalid_value_names_reaction() {
        let err = ExitingNeutronData::from_tyr(7.0, 33).unwrap_err();
        assert!(err.to_string().contains("MT 33"));
    }
}
