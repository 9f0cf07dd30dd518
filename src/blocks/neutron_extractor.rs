use std::ops::Deref;

use crate::arrays::{Arrays, NeutronNxs};
use crate::blocks::{BlockExtractor, NU, NeutronBlock, NuFormulation};
use crate::constants::SHAKES_PER_SECOND;
use crate::error::{Result, TransportError};
use crate::interpolation::InterpolationTable;
use crate::utils::{check_ascending, float_to_index, float_to_int};

//=====================================================================
// One tabulated reaction cross section read from SIG. The values start
// at `threshold_index` on the table's energy grid.
//=====================================================================
#[derive(Debug, Clone, PartialEq)]
pub struct TabulatedCrossSection {
    pub threshold_index: usize,
    pub values: Vec<f64>,
}

//=====================================================================
// A delayed neutron precursor group from BDD. The decay constant is
// stored in 1/s.
//=====================================================================
#[derive(Debug, Clone, PartialEq)]
pub struct PrecursorGroup {
    pub decay_constant: f64,
    pub probability: InterpolationTable,
}

//=====================================================================
// Typed access to the blocks of a continuous-energy neutron table.
//=====================================================================
#[derive(Debug, Clone)]
pub struct NeutronTableExtractor {
    extractor: BlockExtractor<NeutronBlock>,
    nxs: NeutronNxs,
}

impl Deref for NeutronTableExtractor {
    type Target = BlockExtractor<NeutronBlock>;
    fn deref(&self) -> &Self::Target {
        &self.extractor
    }
}

impl NeutronTableExtractor {
    pub fn new(arrays: Arrays) -> Result<Self> {
        let nxs = NeutronNxs::from(&arrays.nxs);
        let extractor = BlockExtractor::new(arrays)?;
        log::debug!(
            "table '{}': {} energies, {} reactions, {} precursor groups",
            extractor.table_name(),
            nxs.nes,
            nxs.ntr,
            nxs.npcr
        );
        Ok(Self { extractor, nxs })
    }

    pub fn nxs(&self) -> &NeutronNxs {
        &self.nxs
    }

    fn context(&self, block: &str) -> String {
        format!("{} block of table '{}'", block, self.table_name())
    }

    // ESZ holds five columns of NES entries
    fn esz_column(&self, column: usize) -> Result<&[f64]> {
        let esz = self.extractor.extract_block_required(NeutronBlock::ESZ)?;
        let nes = self.nxs.nes;
        esz.get(column * nes..(column + 1) * nes).ok_or_else(|| {
            TransportError::data_integrity(self.context("ESZ"), format!("column {} is truncated", column))
        })
    }

    //=================================================================
    // ESZ
    //=================================================================
    pub fn extract_esz_block(&self) -> &[f64] {
        self.extractor.extract_block(NeutronBlock::ESZ)
    }

    pub fn extract_energy_grid(&self) -> Result<&[f64]> {
        let energy = self.esz_column(0)?;
        check_ascending(energy, &self.context("ESZ"))?;
        Ok(energy)
    }

    pub fn extract_total_cross_section(&self) -> Result<&[f64]> {
        self.esz_column(1)
    }

    pub fn extract_absorption_cross_section(&self) -> Result<&[f64]> {
        self.esz_column(2)
    }

    pub fn extract_elastic_cross_section(&self) -> Result<&[f64]> {
        self.esz_column(3)
    }

    pub fn extract_average_heating_numbers(&self) -> Result<&[f64]> {
        self.esz_column(4)
    }

    //=================================================================
    // Reaction tables
    //=================================================================
    pub fn extract_mt_numbers(&self) -> Result<Vec<u32>> {
        self.extractor
            .extract_block(NeutronBlock::MTR)
            .iter()
            .map(|&value| {
                let mt = float_to_int(value, &self.context("MTR"))?;
                u32::try_from(mt).map_err(|_| TransportError::data_integrity(self.context("MTR"), format!("invalid MT {}", mt)))
            })
            .collect()
    }

    pub fn extract_q_values(&self) -> &[f64] {
        self.extractor.extract_block(NeutronBlock::LQR)
    }

    pub fn extract_tyr_block(&self) -> &[f64] {
        self.extractor.extract_block(NeutronBlock::TYR)
    }

    pub fn extract_lsig_block(&self) -> &[f64] {
        self.extractor.extract_block(NeutronBlock::LSIG)
    }

    pub fn extract_sig_block(&self) -> &[f64] {
        self.extractor.extract_block(NeutronBlock::SIG)
    }

    // Cross section of the reaction at position `index` of MTR
    pub fn extract_reaction_cross_section(&self, index: usize) -> Result<TabulatedCrossSection> {
        let context = self.context("SIG");
        let locator = self
            .extract_lsig_block()
            .get(index)
            .ok_or_else(|| TransportError::data_integrity(self.context("LSIG"), format!("no locator for reaction {}", index)))?;
        let locator = float_to_index(*locator, &self.context("LSIG"))?;
        if locator == 0 {
            return Err(TransportError::data_integrity(self.context("LSIG"), "locators are 1-based"));
        }

        let sig = self.extractor.extract_block_required(NeutronBlock::SIG)?;
        let read = |offset: usize| {
            sig.get(offset)
                .copied()
                .ok_or_else(|| TransportError::data_integrity(context.clone(), format!("entry {} is past the end of the block", offset)))
        };
        let first_energy = float_to_index(read(locator - 1)?, &context)?;
        let num_values = float_to_index(read(locator)?, &context)?;
        let values = sig
            .get(locator + 1..locator + 1 + num_values)
            .ok_or_else(|| TransportError::data_integrity(context.clone(), "cross section values are truncated"))?;

        if first_energy == 0 || first_energy - 1 + num_values != self.nxs.nes {
            return Err(TransportError::data_integrity(
                context,
                format!(
                    "{} values starting at energy {} do not reach the end of the {} point energy grid",
                    num_values, first_energy, self.nxs.nes
                ),
            ));
        }
        Ok(TabulatedCrossSection { threshold_index: first_energy - 1, values: values.to_vec() })
    }

    //=================================================================
    // Secondary neutron distributions
    //=================================================================
    pub fn extract_land_block(&self) -> &[f64] {
        self.extractor.extract_block(NeutronBlock::LAND)
    }

    pub fn extract_and_block(&self) -> &[f64] {
        self.extractor.extract_block(NeutronBlock::AND)
    }

    pub fn extract_ldlw_block(&self) -> &[f64] {
        self.extractor.extract_block(NeutronBlock::LDLW)
    }

    pub fn extract_dlw_block(&self) -> &[f64] {
        self.extractor.extract_block(NeutronBlock::DLW)
    }

    //=================================================================
    // Fission
    //=================================================================
    pub fn extract_fis_block(&self) -> &[f64] {
        self.extractor.extract_block(NeutronBlock::FIS)
    }

    pub fn extract_nu_block(&self) -> &[f64] {
        self.extractor.extract_block(NeutronBlock::NU)
    }

    pub fn extract_dnu_block(&self) -> &[f64] {
        self.extractor.extract_block(NeutronBlock::DNU)
    }

    pub fn extract_bdd_block(&self) -> &[f64] {
        self.extractor.extract_block(NeutronBlock::BDD)
    }

    pub fn extract_dnedl_block(&self) -> &[f64] {
        self.extractor.extract_block(NeutronBlock::DNEDL)
    }

    pub fn extract_dned_block(&self) -> &[f64] {
        self.extractor.extract_block(NeutronBlock::DNED)
    }

    pub fn extract_nu(&self) -> Result<Option<NU>> {
        if !self.has_data(NeutronBlock::NU) {
            return Ok(None);
        }
        NU::process(self.extract_nu_block(), self.has_data(NeutronBlock::DNU)).map(Some)
    }

    pub fn extract_delayed_nu(&self) -> Result<Option<NuFormulation>> {
        if !self.has_data(NeutronBlock::DNU) {
            return Ok(None);
        }
        NuFormulation::process(self.extract_dnu_block()).map(Some)
    }

    pub fn extract_precursor_groups(&self) -> Result<Vec<PrecursorGroup>> {
        let bdd = self.extract_bdd_block();
        let context = self.context("BDD");
        let mut groups = Vec::with_capacity(self.nxs.npcr);
        let mut position = 0;
        for _ in 0..self.nxs.npcr {
            let decay_constant = *bdd
                .get(position)
                .ok_or_else(|| TransportError::data_integrity(context.clone(), "precursor group is truncated"))?;
            let length = InterpolationTable::get_table_length(position + 1, bdd)?;
            let probability = InterpolationTable::process(&bdd[position + 1..position + 1 + length])?;
            groups.push(PrecursorGroup { decay_constant: decay_constant * SHAKES_PER_SECOND, probability });
            position += 1 + length;
        }
        Ok(groups)
    }
}
