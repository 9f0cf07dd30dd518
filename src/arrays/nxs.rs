use crate::error::{Result, TransportError};

pub const NXS_LENGTH: usize = 16;

//=====================================================================
// Represents the NXS array from an ACE file. The NXS array holds the
// counts and sizes which describe the structure of the XSS array.
//=====================================================================
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct NxsArray(pub [i64; NXS_LENGTH]);

impl NxsArray {
    pub fn from_raw(values: &[i64], table_name: &str) -> Result<Self> {
        let array: [i64; NXS_LENGTH] = values.try_into().map_err(|_| {
            TransportError::invalid_table(
                table_name,
                format!("NXS must hold {} entries, found {}", NXS_LENGTH, values.len()),
            )
        })?;
        Ok(Self(array))
    }

    // Zero-based lookup, out of range indices read as 0
    #[inline]
    pub fn query(&self, index: usize) -> i64 {
        self.0.get(index).copied().unwrap_or(0)
    }

    // Zero-based lookup of a count, negative values read as 0
    #[inline]
    pub fn count(&self, index: usize) -> usize {
        self.query(index).max(0) as usize
    }
}

//=====================================================================
// Named view of the NXS array of a continuous-energy neutron table.
//=====================================================================
#[derive(Clone, Debug, PartialEq)]
pub struct NeutronNxs {
    pub xxs_len: usize, // Number of entries in XXS array
    pub za: usize,      // ZA of isotope
    pub nes: usize,     // Number of energies
    pub ntr: usize,     // Number of reactions excluding elastic scattering
    pub nr: usize,      // Number of reactions having secondary neutrons excluding elastic scattering
    pub ntrp: usize,    // Number of photon production reactions
    pub ntype: usize,   // Number of particle types for which production data is given
    pub npcr: usize,    // Number of delayed neutron precurser families
    pub s: usize,       // Excited state
    pub z: usize,       // Atomic number
    pub a: usize,       // Atomic mass number
}

impl From<&NxsArray> for NeutronNxs {
    fn from(nxs: &NxsArray) -> Self {
        Self {
            xxs_len: nxs.count(0),
            za: nxs.count(1),
            nes: nxs.count(2),
            ntr: nxs.count(3),
            nr: nxs.count(4),
            ntrp: nxs.count(5),
            ntype: nxs.count(6),
            npcr: nxs.count(7),
            s: nxs.count(8),
            z: nxs.count(9),
            a: nxs.count(10),
        }
    }
}

//=====================================================================
// Named view of the NXS array of an electron-photon table.
//=====================================================================
#[derive(Clone, Debug, PartialEq)]
pub struct ElectronPhotonNxs {
    pub xxs_len: usize, // Number of entries in XXS array
    pub z: usize,       // Atomic number
    pub nes: usize,     // Number of photon energies
    pub nflo: usize,    // Number of fluorescence edges
    pub nsh: usize,     // Number of shells with Compton profiles
    pub nepr: usize,    // Table format revision
    pub nssh: usize,    // Number of electron subshells
    pub nxl: usize,     // Number of electron energies
    pub nx: usize,      // Number of atomic excitation energies
    pub na: usize,      // Number of elastic angular distribution energies
    pub nb: usize,      // Number of bremsstrahlung spectrum energies
}

impl From<&NxsArray> for ElectronPhotonNxs {
    fn from(nxs: &NxsArray) -> Self {
        Self {
            xxs_len: nxs.count(0),
            z: nxs.count(1),
            nes: nxs.count(2),
            nflo: nxs.count(3),
            nsh: nxs.count(4),
            nepr: nxs.count(5),
            nssh: nxs.count(6),
            nxl: nxs.count(7),
            nx: nxs.count(8),
            na: nxs.count(9),
            nb: nxs.count(10),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_is_lenient() {
        let mut raw = [0i64; NXS_LENGTH];
        raw[2] = 3;
        raw[7] = -4;
        let nxs = NxsArray::from_raw(&raw, "test").unwrap();
        assert_eq!(nxs.query(2), 3);
        assert_eq!(nxs.query(40), 0);
        assert_eq!(nxs.count(7), 0);
    }

    #[test]
    fn test_wrong_length_is_invalid() {
        assert!(matches!(
            NxsArray::from_raw(&[1, 2, 3], "short"),
            Err(TransportError::InvalidTable { .. })
        ));
    }

    #[test]
    fn test_named_views() {
        let mut raw = [0i64; NXS_LENGTH];
        raw[..11].copy_from_slice(&[100, 1001, 3, 2, 1, 0, 0, 1, 0, 1, 1]);
        let nxs = NxsArray::from_raw(&raw, "test").unwrap();
        let neutron = NeutronNxs::from(&nxs);
        assert_eq!(neutron.za, 1001);
        assert_eq!(neutron.nes, 3);
        assert_eq!(neutron.npcr, 1);
        let electron_photon = ElectronPhotonNxs::from(&nxs);
        assert_eq!(electron_photon.z, 1001);
        assert_eq!(electron_photon.nssh, 0);
    }
}
