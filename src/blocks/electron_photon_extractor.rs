use std::ops::Deref;

use crate::arrays::{Arrays, ElectronPhotonNxs};
use crate::blocks::{BlockExtractor, ElectronPhotonBlock};
use crate::error::{Result, TransportError};
use crate::interpolation::InterpolationScheme;
use crate::utils::{check_ascending, float_to_index, float_to_int};

//=====================================================================
// Secondary tables tabulated on an incoming energy grid, as found in
// ELAS, BREME and EION: for every incoming energy a grid of outgoing
// values and the matching cumulative distribution.
//=====================================================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EnergyTables {
    pub energies: Vec<f64>,
    pub values: Vec<Vec<f64>>,
    pub cdfs: Vec<Vec<f64>>,
}

impl EnergyTables {
    pub fn len(&self) -> usize {
        self.energies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.energies.is_empty()
    }
}

//=====================================================================
// Half of a Compton profile as tabulated in SWD, momentum projections
// in atomic units.
//=====================================================================
#[derive(Debug, Clone, PartialEq)]
pub struct HalfComptonProfile {
    pub interpolation: InterpolationScheme,
    pub momentum: Vec<f64>,
    pub profile: Vec<f64>,
}

//=====================================================================
// Subshell data shared by Doppler broadening and electroionization.
//=====================================================================
#[derive(Debug, Clone, PartialEq)]
pub struct SubshellData {
    pub designators: Vec<u32>,
    pub binding_energies: Vec<f64>,
    pub occupancies: Vec<f64>,
}

//=====================================================================
// Typed access to the blocks of an electron-photon table.
//
// The photon section stores logarithms of energies and cross sections,
// a logarithmic cross section of exactly 0.0 marks a vanishing cross
// section. The accessors below return the linear values.
//=====================================================================
#[derive(Debug, Clone)]
pub struct ElectronPhotonTableExtractor {
    extractor: BlockExtractor<ElectronPhotonBlock>,
    nxs: ElectronPhotonNxs,
}

impl Deref for ElectronPhotonTableExtractor {
    type Target = BlockExtractor<ElectronPhotonBlock>;
    fn deref(&self) -> &Self::Target {
        &self.extractor
    }
}

// Columns of the ESZE block after the energy grid
const ESZE_ELASTIC_TRANSPORT: usize = 1;
const ESZE_CUTOFF_ELASTIC: usize = 2;
const ESZE_BREMSSTRAHLUNG: usize = 3;
const ESZE_EXCITATION: usize = 4;
const ESZE_ELECTROIONIZATION: usize = 5;
const ESZE_FIRST_SUBSHELL: usize = 6;

impl ElectronPhotonTableExtractor {
    pub fn new(arrays: Arrays) -> Result<Self> {
        let nxs = ElectronPhotonNxs::from(&arrays.nxs);
        let extractor = BlockExtractor::new(arrays)?;
        log::debug!(
            "table '{}': Z = {}, {} photon energies, {} electron energies, {} subshells",
            extractor.table_name(),
            nxs.z,
            nxs.nes,
            nxs.nxl,
            nxs.nssh
        );
        Ok(Self { extractor, nxs })
    }

    pub fn nxs(&self) -> &ElectronPhotonNxs {
        &self.nxs
    }

    pub fn atomic_number(&self) -> u32 {
        self.nxs.z as u32
    }

    fn context(&self, block: ElectronPhotonBlock) -> String {
        format!("{} block of table '{}'", block, self.table_name())
    }

    fn column(&self, block: ElectronPhotonBlock, column: usize, rows: usize) -> Result<&[f64]> {
        let data = self.extractor.extract_block_required(block)?;
        data.get(column * rows..(column + 1) * rows)
            .ok_or_else(|| TransportError::data_integrity(self.context(block), format!("column {} is truncated", column)))
    }

    fn split(&self, block: ElectronPhotonBlock, parts: usize) -> Result<Vec<&[f64]>> {
        let data = self.extractor.extract_block_required(block)?;
        if data.is_empty() || data.len() % parts != 0 {
            return Err(TransportError::data_integrity(
                self.context(block),
                format!("{} entries cannot be split into {} equal columns", data.len(), parts),
            ));
        }
        Ok(data.chunks(data.len() / parts).collect())
    }

    //=================================================================
    // Photon data
    //=================================================================
    pub fn extract_eszg_block(&self) -> &[f64] {
        self.extractor.extract_block(ElectronPhotonBlock::ESZG)
    }

    pub fn extract_photon_energy_grid(&self) -> Result<Vec<f64>> {
        let log_energy = self.column(ElectronPhotonBlock::ESZG, 0, self.nxs.nes)?;
        check_ascending(log_energy, &self.context(ElectronPhotonBlock::ESZG))?;
        Ok(log_energy.iter().map(|value| value.exp()).collect())
    }

    fn photon_cross_section(&self, column: usize) -> Result<Vec<f64>> {
        let log_values = self.column(ElectronPhotonBlock::ESZG, column, self.nxs.nes)?;
        Ok(log_values.iter().map(|&value| if value == 0.0 { 0.0 } else { value.exp() }).collect())
    }

    pub fn extract_incoherent_cross_section(&self) -> Result<Vec<f64>> {
        self.photon_cross_section(1)
    }

    pub fn extract_coherent_cross_section(&self) -> Result<Vec<f64>> {
        self.photon_cross_section(2)
    }

    pub fn extract_photoelectric_cross_section(&self) -> Result<Vec<f64>> {
        self.photon_cross_section(3)
    }

    pub fn extract_pair_production_cross_section(&self) -> Result<Vec<f64>> {
        self.photon_cross_section(4)
    }

    // Momentum transfer grid (inverse Angstrom) and scattering function
    pub fn extract_incoherent_scattering_function(&self) -> Result<(&[f64], &[f64])> {
        let columns = self.split(ElectronPhotonBlock::JINC, 2)?;
        Ok((columns[0], columns[1]))
    }

    // Momentum transfer grid (inverse Angstrom), integrated form factor and form factor
    pub fn extract_coherent_form_factor(&self) -> Result<(&[f64], &[f64], &[f64])> {
        let columns = self.split(ElectronPhotonBlock::JCOH, 3)?;
        Ok((columns[0], columns[1], columns[2]))
    }

    pub fn extract_jflo_block(&self) -> &[f64] {
        self.extractor.extract_block(ElectronPhotonBlock::JFLO)
    }

    pub fn extract_heating_numbers(&self) -> &[f64] {
        self.extractor.extract_block(ElectronPhotonBlock::LHNM)
    }

    //=================================================================
    // Compton profiles
    //=================================================================
    pub fn extract_compton_shell_occupancies(&self) -> &[f64] {
        self.extractor.extract_block(ElectronPhotonBlock::LNEPS)
    }

    pub fn extract_compton_shell_binding_energies(&self) -> &[f64] {
        self.extractor.extract_block(ElectronPhotonBlock::LBEPS)
    }

    pub fn extract_compton_shell_cumulative_probabilities(&self) -> &[f64] {
        self.extractor.extract_block(ElectronPhotonBlock::LPIPS)
    }

    // SWD locators are zero-based offsets from the start of SWD
    pub fn extract_compton_profiles(&self) -> Result<Vec<HalfComptonProfile>> {
        let context = self.context(ElectronPhotonBlock::SWD);
        let swd = self.extractor.extract_block_required(ElectronPhotonBlock::SWD)?;
        self.extractor
            .extract_block_required(ElectronPhotonBlock::LSWD)?
            .iter()
            .map(|&locator| {
                let start = float_to_index(locator, &context)?;
                let read = |index: usize| {
                    swd.get(index).copied().ok_or_else(|| {
                        TransportError::data_integrity(context.clone(), format!("profile at {} is truncated", start))
                    })
                };
                let interpolation = InterpolationScheme::from_ace(read(start)?)?;
                let num_points = float_to_index(read(start + 1)?, &context)?;
                let end = start + 2 + 3 * num_points;
                if end > swd.len() {
                    return Err(TransportError::data_integrity(context.clone(), format!("profile at {} is truncated", start)));
                }
                let momentum = swd[start + 2..start + 2 + num_points].to_vec();
                check_ascending(&momentum, &context)?;
                let profile = swd[start + 2 + num_points..start + 2 + 2 * num_points].to_vec();
                Ok(HalfComptonProfile { interpolation, momentum, profile })
            })
            .collect()
    }

    //=================================================================
    // Subshells
    //=================================================================
    pub fn extract_subshell_data(&self) -> Result<SubshellData> {
        let context = self.context(ElectronPhotonBlock::SUBSH);
        let designators = self
            .extractor
            .extract_block_required(ElectronPhotonBlock::SUBSH)?
            .iter()
            .map(|&value| Ok(float_to_int(value, &context)?.max(0) as u32))
            .collect::<Result<Vec<_>>>()?;
        let binding_energies = self.extractor.extract_block_required(ElectronPhotonBlock::SUBSHEN)?.to_vec();
        let occupancies = self.extractor.extract_block_required(ElectronPhotonBlock::OCCUP)?.to_vec();

        if binding_energies.len() != designators.len() || occupancies.len() != designators.len() {
            return Err(TransportError::data_integrity(context, "subshell blocks disagree on the number of subshells"));
        }
        Ok(SubshellData { designators, binding_energies, occupancies })
    }

    //=================================================================
    // Electron data
    //=================================================================
    pub fn extract_esze_block(&self) -> &[f64] {
        self.extractor.extract_block(ElectronPhotonBlock::ESZE)
    }

    pub fn extract_electron_energy_grid(&self) -> Result<&[f64]> {
        let energy = self.column(ElectronPhotonBlock::ESZE, 0, self.nxs.nxl)?;
        check_ascending(energy, &self.context(ElectronPhotonBlock::ESZE))?;
        Ok(energy)
    }

    pub fn extract_elastic_transport_cross_section(&self) -> Result<&[f64]> {
        self.column(ElectronPhotonBlock::ESZE, ESZE_ELASTIC_TRANSPORT, self.nxs.nxl)
    }

    pub fn extract_cutoff_elastic_cross_section(&self) -> Result<&[f64]> {
        self.column(ElectronPhotonBlock::ESZE, ESZE_CUTOFF_ELASTIC, self.nxs.nxl)
    }

    pub fn extract_bremsstrahlung_cross_section(&self) -> Result<&[f64]> {
        self.column(ElectronPhotonBlock::ESZE, ESZE_BREMSSTRAHLUNG, self.nxs.nxl)
    }

    pub fn extract_excitation_cross_section(&self) -> Result<&[f64]> {
        self.column(ElectronPhotonBlock::ESZE, ESZE_EXCITATION, self.nxs.nxl)
    }

    pub fn extract_electroionization_cross_section(&self) -> Result<&[f64]> {
        self.column(ElectronPhotonBlock::ESZE, ESZE_ELECTROIONIZATION, self.nxs.nxl)
    }

    pub fn extract_subshell_electroionization_cross_section(&self, subshell_index: usize) -> Result<&[f64]> {
        if subshell_index >= self.nxs.nssh {
            return Err(TransportError::data_integrity(
                self.context(ElectronPhotonBlock::ESZE),
                format!("subshell {} of {} requested", subshell_index, self.nxs.nssh),
            ));
        }
        self.column(ElectronPhotonBlock::ESZE, ESZE_FIRST_SUBSHELL + subshell_index, self.nxs.nxl)
    }

    // Incoming energies and the mean energy lost to excitation
    pub fn extract_excitation_energy_loss(&self) -> Result<(&[f64], &[f64])> {
        let energies = self.column(ElectronPhotonBlock::EXCIT, 0, self.nxs.nx)?;
        check_ascending(energies, &self.context(ElectronPhotonBlock::EXCIT))?;
        Ok((energies, self.column(ElectronPhotonBlock::EXCIT, 1, self.nxs.nx)?))
    }

    // Index block of NE energies, NE lengths and NE 1-based locators
    // into the data block, each table holding values then their CDF.
    fn extract_energy_tables(&self, index: &[f64], data_block: ElectronPhotonBlock) -> Result<EnergyTables> {
        let context = self.context(data_block);
        let num_energies = index.len() / 3;
        let data = self.extractor.extract_block_required(data_block)?;

        let energies = index[..num_energies].to_vec();
        check_ascending(&energies, &context)?;

        let mut tables = EnergyTables { energies, ..Default::default() };
        for i in 0..num_energies {
            let length = float_to_index(index[num_energies + i], &context)?;
            let locator = float_to_index(index[2 * num_energies + i], &context)?;
            if locator == 0 || locator - 1 + 2 * length > data.len() {
                return Err(TransportError::data_integrity(
                    context,
                    format!("table {} of length {} at {} runs past the block", i, length, locator),
                ));
            }
            let start = locator - 1;
            tables.values.push(data[start..start + length].to_vec());
            tables.cdfs.push(data[start + length..start + 2 * length].to_vec());
        }
        Ok(tables)
    }

    // Elastic scattering cosines below the cutoff and their CDF
    pub fn extract_elastic_angular_tables(&self) -> Result<EnergyTables> {
        let index = self.extractor.extract_block_required(ElectronPhotonBlock::ELASI)?;
        self.extract_energy_tables(index, ElectronPhotonBlock::ELAS)
    }

    // Bremsstrahlung photon energies and their CDF
    pub fn extract_bremsstrahlung_tables(&self) -> Result<EnergyTables> {
        let index = self.extractor.extract_block_required(ElectronPhotonBlock::BREMI)?;
        self.extract_energy_tables(index, ElectronPhotonBlock::BREME)
    }

    // Knock-on electron energies and their CDF, one set per subshell
    pub fn extract_electroionization_tables(&self) -> Result<Vec<EnergyTables>> {
        let context = self.context(ElectronPhotonBlock::EIONI);
        let index = self.extractor.extract_block_required(ElectronPhotonBlock::EIONI)?;
        let mut position = 0;
        let mut subshells = Vec::with_capacity(self.nxs.nssh);
        for _ in 0..self.nxs.nssh {
            let num_energies = float_to_index(
                *index.get(position).ok_or_else(|| TransportError::data_integrity(context.clone(), "index is truncated"))?,
                &context,
            )?;
            let subshell_index = index
                .get(position + 1..position + 1 + 3 * num_energies)
                .ok_or_else(|| TransportError::data_integrity(context.clone(), "index is truncated"))?;
            subshells.push(self.extract_energy_tables(subshell_index, ElectronPhotonBlock::EION)?);
            position += 1 + 3 * num_energies;
        }
        Ok(subshells)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::utils::testing::ELECTRON_PHOTON_TEST_TABLE;

    #[test]
    fn test_photon_data() {
        let table = &*ELECTRON_PHOTON_TEST_TABLE;
        let energies = table.extract_photon_energy_grid().unwrap();
        assert_eq!(energies.len(), 3);
        assert_relative_eq!(energies[0], 1e-3, max_relative = 1e-12);
        assert_relative_eq!(energies[2], 20.0, max_relative = 1e-12);

        let pair = table.extract_pair_production_cross_section().unwrap();
        assert_eq!(pair[0], 0.0);
        assert_eq!(pair[1], 0.0);
        assert_relative_eq!(pair[2], 0.5, max_relative = 1e-12);

        let (momentum, scattering_function) = table.extract_incoherent_scattering_function().unwrap();
        assert_eq!(momentum.len(), scattering_function.len());
        let (momentum, _, form_factor) = table.extract_coherent_form_factor().unwrap();
        assert_eq!(momentum.len(), form_factor.len());
    }

    #[test]
    fn test_compton_profiles_and_subshells() {
        let table = &*ELECTRON_PHOTON_TEST_TABLE;
        let profiles = table.extract_compton_profiles().unwrap();
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[0].interpolation, InterpolationScheme::LinLin);
        assert_eq!(profiles[0].momentum[0], 0.0);

        let subshells = table.extract_subshell_data().unwrap();
        assert_eq!(subshells.designators, vec![1, 3]);
        assert_eq!(subshells.occupancies, vec![2.0, 4.0]);
    }

    #[test]
    fn test_electron_data() {
        let table = &*ELECTRON_PHOTON_TEST_TABLE;
        assert_eq!(table.extract_electron_energy_grid().unwrap(), &[1e-5, 1.0, 100.0]);
        assert_eq!(table.extract_subshell_electroionization_cross_section(1).unwrap().len(), 3);
        assert!(table.extract_subshell_electroionization_cross_section(2).is_err());

        let elastic = table.extract_elastic_angular_tables().unwrap();
        assert_eq!(elastic.len(), 2);
        assert_eq!(*elastic.cdfs[0].last().unwrap(), 1.0);

        let bremsstrahlung = table.extract_bremsstrahlung_tables().unwrap();
        assert_eq!(bremsstrahlung.len(), 2);

        let ionization = table.extract_electroionization_tables().unwrap();
        assert_eq!(ionization.len(), 2);
        assert_eq!(ionization[1].energies.len(), 2);
    }
}
