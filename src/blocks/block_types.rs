use std::fmt::{Debug, Display};
use std::hash::Hash;

use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter};

use crate::arrays::NxsArray;
use crate::error::{Result, TransportError};
use crate::interpolation::InterpolationTable;
use crate::utils::float_to_index;

//=====================================================================
// Layout knowledge shared by every kind of ACE table: where a block's
// start offset lives in JXS, and, for blocks whose size is fixed by
// the format, how long the block must be.
//=====================================================================
pub trait BlockLayout: Copy + Eq + Hash + Debug + Display + IntoEnumIterator + Send + Sync + 'static {
    // Zero-based position of the block's start offset in JXS
    fn jxs_index(&self) -> usize;

    // Length dictated by the format, None when only the offset gap is known
    fn formula_length(&self, _start: usize, _nxs: &NxsArray, _xss: &[f64]) -> Result<Option<usize>> {
        Ok(None)
    }

    // The end-of-table marker, its offset is the last word of the table
    fn is_sentinel(&self) -> bool {
        false
    }

    // Blocks nested inside another block take no part in gap differencing
    fn is_overlapping(&self) -> bool {
        false
    }
}

fn read_count<B: Display>(block: B, xss: &[f64], index: usize) -> Result<usize> {
    let value = xss.get(index).copied().ok_or_else(|| {
        TransportError::data_integrity(format!("{} block", block), format!("length formula reads past the end of XSS (entry {})", index))
    })?;
    float_to_index(value, &format!("{} block", block))
}

fn table_length<B: Display>(block: B, xss: &[f64], index: usize) -> Result<usize> {
    InterpolationTable::get_table_length(index, xss)
        .map_err(|err| TransportError::data_integrity(format!("{} block", block), err.to_string()))
}

//=====================================================================
// Enum of all block types in continuous neutron ACE files.
//=====================================================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display)]
pub enum NeutronBlock {
    ESZ,    // Energy table
    NU,     // Fission nu data
    MTR,    // MT array
    LQR,    // Q-value array
    TYR,    // Reaction type array
    LSIG,   // Table of cross section locators
    SIG,    // Cross sections
    LAND,   // Table of angular distribution locators
    AND,    // Angular distributions
    LDLW,   // Table of energy distribution locators
    DLW,    // Energy distributions
    GPD,    // Photon production data
    MTRP,   // Photon production MT array
    LSIGP,  // Table of photon production cross section locators
    SIGP,   // Photon production cross sections
    LANDP,  // Table of photon production angular distribution locators
    ANDP,   // Photon production angular distributions
    LDLWP,  // Table of photon production energy distribution locators
    DLWP,   // Photon production energy distributions
    YP,     // Table of yield multipliers
    FIS,    // Total fission cross section
    END,    // Last word of the conventional table
    LUND,   // Probability tables
    DNU,    // Delayed nu-bar data
    BDD,    // Basic delayed neutron precursor data
    DNEDL,  // Table of delayed neutron energy distribution locators
    DNED,   // Delayed neutron energy distributions
    PTYPE,  // Particle type array
    NTRO,   // Array containing number of particle production reactions
    NEXT,   // Table of particle production locators
}

// Length of one nu array (LNU followed by polynomial or tabulated data)
fn nu_array_length(block: NeutronBlock, xss: &[f64], start: usize) -> Result<usize> {
    match read_count(block, xss, start)? {
        1 => Ok(2 + read_count(block, xss, start + 1)?),
        2 => Ok(1 + table_length(block, xss, start + 1)?),
        other => Err(TransportError::data_integrity(
            format!("{} block", block),
            format!("unknown nu formulation {}, expected 1 (polynomial) or 2 (tabulated)", other),
        )),
    }
}

impl BlockLayout for NeutronBlock {
    #[inline]
    fn jxs_index(&self) -> usize {
        match self {
            NeutronBlock::ESZ =>  0,
            NeutronBlock::NU =>  1,
            NeutronBlock::MTR =>  2,
            NeutronBlock::LQR =>  3,
            NeutronBlock::TYR =>  4,
            NeutronBlock::LSIG =>  5,
            NeutronBlock::SIG =>  6,
            NeutronBlock::LAND =>  7,
            NeutronBlock::AND =>  8,
            NeutronBlock::LDLW =>  9,
            NeutronBlock::DLW => 10,
            NeutronBlock::GPD => 11,
            NeutronBlock::MTRP => 12,
            NeutronBlock::LSIGP => 13,
            NeutronBlock::SIGP => 14,
            NeutronBlock::LANDP => 15,
            NeutronBlock::ANDP => 16,
            NeutronBlock::LDLWP => 17,
            NeutronBlock::DLWP => 18,
            NeutronBlock::YP => 19,
            NeutronBlock::FIS => 20,
            NeutronBlock::END => 21,
            NeutronBlock::LUND => 22,
            NeutronBlock::DNU => 23,
            NeutronBlock::BDD => 24,
            NeutronBlock::DNEDL => 25,
            NeutronBlock::DNED => 26,
            NeutronBlock::PTYPE => 29,
            NeutronBlock::NTRO => 30,
            NeutronBlock::NEXT => 31,
        }
    }

    fn formula_length(&self, start: usize, nxs: &NxsArray, xss: &[f64]) -> Result<Option<usize>> {
        let nes = nxs.count(2);
        let ntr = nxs.count(3);
        let nr = nxs.count(4);
        let ntrp = nxs.count(5);
        let npcr = nxs.count(7);

        let length = match self {
            NeutronBlock::ESZ => 5 * nes,
            NeutronBlock::MTR | NeutronBlock::LQR | NeutronBlock::TYR | NeutronBlock::LSIG => ntr,
            NeutronBlock::LAND => nr + 1,
            NeutronBlock::LDLW => nr,
            NeutronBlock::MTRP | NeutronBlock::LSIGP | NeutronBlock::LANDP | NeutronBlock::LDLWP => ntrp,
            NeutronBlock::DNEDL => npcr,
            NeutronBlock::YP => 1 + read_count(*self, xss, start)?,
            // IE, NE, then NE cross section values
            NeutronBlock::FIS => read_count(*self, xss, start + 1)? + 2,
            NeutronBlock::NU => {
                let flag = xss.get(start).copied().unwrap_or(0.0);
                if flag < 0.0 {
                    // Prompt and total arrays, |flag| is the prompt array length
                    let prompt_length = read_count(*self, &[-flag], 0)?;
                    1 + prompt_length + nu_array_length(*self, xss, start + 1 + prompt_length)?
                } else {
                    nu_array_length(*self, xss, start)?
                }
            }
            NeutronBlock::DNU => nu_array_length(*self, xss, start)?,
            NeutronBlock::BDD => {
                // Per precursor group: decay constant, then the probability table
                let mut length = 0;
                for _ in 0..npcr {
                    length += 1 + table_length(*self, xss, start + length + 1)?;
                }
                length
            }
            _ => return Ok(None),
        };
        Ok(Some(length))
    }

    fn is_sentinel(&self) -> bool {
        matches!(self, NeutronBlock::END)
    }

    fn is_overlapping(&self) -> bool {
        matches!(self, NeutronBlock::FIS)
    }
}

//=====================================================================
// Enum of all block types in electron-photon ACE files.
//=====================================================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display)]
pub enum ElectronPhotonBlock {
    ESZG,    // Photon energy grid and log cross sections
    JINC,    // Incoherent scattering function
    JCOH,    // Coherent form factors
    JFLO,    // Fluorescence data
    LHNM,    // Photon heating numbers
    LNEPS,   // Number of electrons per Compton shell
    LBEPS,   // Binding energy per Compton shell
    LPIPS,   // Cumulative interaction probability per Compton shell
    LSWD,    // Compton profile locators
    SWD,     // Compton profiles
    SUBSH,   // Electron subshell ENDF designators
    SUBSHEN, // Electron subshell binding energies
    OCCUP,   // Electron subshell occupancies
    ESZE,    // Electron energy grid and cross sections
    EXCIT,   // Atomic excitation energy loss
    ELASI,   // Elastic angular distribution index
    ELAS,    // Elastic angular distributions
    BREMI,   // Bremsstrahlung spectrum index
    BREME,   // Bremsstrahlung photon spectra
    EIONI,   // Electroionization knock-on index per subshell
    EION,    // Electroionization knock-on spectra
    END,     // Last word of the table
}

impl BlockLayout for ElectronPhotonBlock {
    #[inline]
    fn jxs_index(&self) -> usize {
        match self {
            ElectronPhotonBlock::ESZG => 0,
            ElectronPhotonBlock::JINC => 1,
            ElectronPhotonBlock::JCOH => 2,
            ElectronPhotonBlock::JFLO => 3,
            ElectronPhotonBlock::LHNM => 4,
            ElectronPhotonBlock::LNEPS => 5,
            ElectronPhotonBlock::LBEPS => 6,
            ElectronPhotonBlock::LPIPS => 7,
            ElectronPhotonBlock::LSWD => 8,
            ElectronPhotonBlock::SWD => 9,
            ElectronPhotonBlock::SUBSH => 10,
            ElectronPhotonBlock::SUBSHEN => 11,
            ElectronPhotonBlock::OCCUP => 12,
            ElectronPhotonBlock::ESZE => 13,
            ElectronPhotonBlock::EXCIT => 14,
            ElectronPhotonBlock::ELASI => 15,
            ElectronPhotonBlock::ELAS => 16,
            ElectronPhotonBlock::BREMI => 17,
            ElectronPhotonBlock::BREME => 18,
            ElectronPhotonBlock::EIONI => 19,
            ElectronPhotonBlock::EION => 20,
            ElectronPhotonBlock::END => 31,
        }
    }

    fn formula_length(&self, start: usize, nxs: &NxsArray, xss: &[f64]) -> Result<Option<usize>> {
        let nes = nxs.count(2);
        let nflo = nxs.count(3);
        let nsh = nxs.count(4);
        let nssh = nxs.count(6);
        let nxl = nxs.count(7);
        let nx = nxs.count(8);
        let na = nxs.count(9);
        let nb = nxs.count(10);

        let length = match self {
            ElectronPhotonBlock::ESZG => 5 * nes,
            ElectronPhotonBlock::JFLO => 4 * nflo,
            ElectronPhotonBlock::LHNM => nes,
            ElectronPhotonBlock::LNEPS
            | ElectronPhotonBlock::LBEPS
            | ElectronPhotonBlock::LPIPS
            | ElectronPhotonBlock::LSWD => nsh,
            ElectronPhotonBlock::SUBSH | ElectronPhotonBlock::SUBSHEN | ElectronPhotonBlock::OCCUP => nssh,
            // Energy, five cross sections, and one ionization cross section per subshell
            ElectronPhotonBlock::ESZE => (6 + nssh) * nxl,
            ElectronPhotonBlock::EXCIT => 2 * nx,
            ElectronPhotonBlock::ELASI => 3 * na,
            ElectronPhotonBlock::BREMI => 3 * nb,
            ElectronPhotonBlock::EIONI => {
                // Per subshell: number of energies, then energies, lengths, and locators
                let mut length = 0;
                for _ in 0..nssh {
                    length += 1 + 3 * read_count(*self, xss, start + length)?;
                }
                length
            }
            _ => return Ok(None),
        };
        Ok(Some(length))
    }

    fn is_sentinel(&self) -> bool {
        matches!(self, ElectronPhotonBlock::END)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", NeutronBlock::ESZ), "ESZ");
        assert_eq!(format!("{}", NeutronBlock::DNEDL), "DNEDL");
        assert_eq!(format!("{}", ElectronPhotonBlock::SWD), "SWD");
    }

    #[test]
    fn test_iter() {
        assert_eq!(NeutronBlock::iter().count(), 30);
        assert_eq!(ElectronPhotonBlock::iter().count(), 22);
    }

    #[test]
    fn test_jxs_positions_are_unique() {
        let neutron: HashSet<usize> = NeutronBlock::iter().map(|block| block.jxs_index()).collect();
        assert_eq!(neutron.len(), 30);
        let electron_photon: HashSet<usize> = ElectronPhotonBlock::iter().map(|block| block.jxs_index()).collect();
        assert_eq!(electron_photon.len(), 22);
    }

    #[test]
    fn test_fixed_formulas() {
        let mut raw = [0i64; 16];
        raw[2] = 3; // NES
        raw[3] = 4; // NTR
        raw[4] = 2; // NR
        let nxs = NxsArray::from_raw(&raw, "test").unwrap();
        assert_eq!(NeutronBlock::ESZ.formula_length(0, &nxs, &[]).unwrap(), Some(15));
        assert_eq!(NeutronBlock::TYR.formula_length(0, &nxs, &[]).unwrap(), Some(4));
        assert_eq!(NeutronBlock::LAND.formula_length(0, &nxs, &[]).unwrap(), Some(3));
        assert_eq!(NeutronBlock::AND.formula_length(0, &nxs, &[]).unwrap(), None);
    }

    #[test]
    fn test_data_driven_formulas() {
        let nxs = NxsArray::from_raw(&[0i64; 16], "test").unwrap();
        // FIS: IE = 1, NE = 3, then three values
        let xss = [1.0, 3.0, 0.1, 0.2, 0.3];
        assert_eq!(NeutronBlock::FIS.formula_length(0, &nxs, &xss).unwrap(), Some(5));

        // NU: polynomial total nu with two coefficients
        let xss = [1.0, 2.0, 2.4, 0.1];
        assert_eq!(NeutronBlock::NU.formula_length(0, &nxs, &xss).unwrap(), Some(4));

        // NU: prompt (polynomial, 3 entries) followed by tabulated total
        let xss = [-3.0, 1.0, 1.0, 2.5, 2.0, 0.0, 2.0, 1e-11, 20.0, 2.4, 3.0];
        assert_eq!(NeutronBlock::NU.formula_length(0, &nxs, &xss).unwrap(), Some(11));

        // Truncated data is an integrity error
        assert!(NeutronBlock::FIS.formula_length(3, &nxs, &xss[..4]).is_err());
    }
}
