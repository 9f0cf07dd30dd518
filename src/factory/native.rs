use std::path::Path;

use anyhow::{Context, ensure};
use serde::{Deserialize, Serialize};

use crate::blocks::{EnergyTables, SubshellData};
use crate::error::{Result, TransportError};
use crate::factory::ElectronDataSource;

// Secondary tables grouped by incoming energy, as stored in native data
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NativeEnergyTables {
    pub energies: Vec<f64>,
    pub values: Vec<Vec<f64>>,
    pub cdfs: Vec<Vec<f64>>,
}

impl NativeEnergyTables {
    pub fn energies(&self) -> &[f64] {
        &self.energies
    }

    // Values and CDF tabulated at exactly `energy`
    pub fn table_at(&self, energy: f64) -> Option<(&[f64], &[f64])> {
        let index = self.energies.iter().position(|&e| e == energy)?;
        Some((self.values.get(index)?.as_slice(), self.cdfs.get(index)?.as_slice()))
    }

    fn to_energy_tables(&self, context: &str) -> Result<EnergyTables> {
        if self.values.len() != self.energies.len() || self.cdfs.len() != self.energies.len() {
            return Err(TransportError::data_integrity(
                context,
                format!(
                    "{} energies with {} value tables and {} CDFs",
                    self.energies.len(),
                    self.values.len(),
                    self.cdfs.len()
                ),
            ));
        }
        if let Some(i) = (0..self.values.len()).find(|&i| self.values[i].len() != self.cdfs[i].len()) {
            return Err(TransportError::data_integrity(
                context,
                format!("table {} has {} values and {} CDF points", i, self.values[i].len(), self.cdfs[i].len()),
            ));
        }
        Ok(EnergyTables { energies: self.energies.clone(), values: self.values.clone(), cdfs: self.cdfs.clone() })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NativeSubshell {
    // ENDF subshell designator
    pub designator: u32,
    pub binding_energy: f64,
    pub occupancy: f64,
    pub cross_section: Vec<f64>,
    pub knock_on_energies: NativeEnergyTables,
}

//=====================================================================
// Electron data of one element in the native layout, read from TOML.
// Every cross section is tabulated on `energy_grid`.
//
//   name = "6000.native"
//   atomic_number = 6
//   energy_grid = [1e-3, 10.0]
//   ...
//   [elastic_angles]
//   energies = [1e-3, 10.0]
//   values = [[-1.0, 0.999999], [-1.0, 0.999999]]
//   cdfs = [[0.0, 1.0], [0.0, 1.0]]
//=====================================================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NativeElectronData {
    pub name: String,
    pub atomic_number: u32,
    pub energy_grid: Vec<f64>,
    pub cutoff_elastic_cross_section: Vec<f64>,
    pub bremsstrahlung_cross_section: Vec<f64>,
    pub excitation_cross_section: Vec<f64>,
    pub excitation_energies: Vec<f64>,
    pub excitation_energy_loss: Vec<f64>,
    pub elastic_angles: NativeEnergyTables,
    pub bremsstrahlung_photon_energies: NativeEnergyTables,
    #[serde(default)]
    pub subshells: Vec<NativeSubshell>,
}

impl NativeElectronData {
    pub fn from_toml_str(string: &str) -> anyhow::Result<Self> {
        let data: Self = toml::from_str(string).context("Could not parse native electron data")?;
        data.validate().with_context(|| format!("Invalid native electron data '{}'", data.name))?;
        Ok(data)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let string = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read native electron data from {}", path.display()))?;
        Self::from_toml_str(&string).with_context(|| format!("Invalid native electron data in {}", path.display()))
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let grid_length = self.energy_grid.len();
        ensure!(grid_length >= 2, "the energy grid needs at least two points, found {}", grid_length);
        for (name, values) in [
            ("cutoff elastic", &self.cutoff_elastic_cross_section),
            ("bremsstrahlung", &self.bremsstrahlung_cross_section),
            ("excitation", &self.excitation_cross_section),
        ] {
            ensure!(
                values.len() == grid_length,
                "{} cross section has {} values on a grid of {}",
                name,
                values.len(),
                grid_length
            );
        }
        ensure!(
            self.excitation_energies.len() == self.excitation_energy_loss.len(),
            "{} excitation energies with {} energy losses",
            self.excitation_energies.len(),
            self.excitation_energy_loss.len()
        );
        for subshell in &self.subshells {
            ensure!(
                subshell.cross_section.len() == grid_length,
                "subshell {} cross section has {} values on a grid of {}",
                subshell.designator,
                subshell.cross_section.len(),
                grid_length
            );
        }
        Ok(())
    }

    pub fn elastic_angular_energy_grid(&self) -> &[f64] {
        self.elastic_angles.energies()
    }

    // Tabulated elastic cosines at a grid energy of the angular tables
    pub fn cutoff_elastic_angles_at(&self, energy: f64) -> Option<&[f64]> {
        self.elastic_angles.table_at(energy).map(|(cosines, _)| cosines)
    }

    fn context(&self, quantity: &str) -> String {
        format!("native {} data of '{}'", quantity, self.name)
    }
}

impl ElectronDataSource for NativeElectronData {
    fn source_name(&self) -> &str {
        &self.name
    }

    fn atomic_number(&self) -> u32 {
        self.atomic_number
    }

    fn electron_energy_grid(&self) -> Result<Vec<f64>> {
        Ok(self.energy_grid.clone())
    }

    fn cutoff_elastic_cross_section(&self) -> Result<Vec<f64>> {
        Ok(self.cutoff_elastic_cross_section.clone())
    }

    fn elastic_angular_tables(&self) -> Result<EnergyTables> {
        self.elastic_angles.to_energy_tables(&self.context("elastic angle"))
    }

    fn bremsstrahlung_cross_section(&self) -> Result<Vec<f64>> {
        Ok(self.bremsstrahlung_cross_section.clone())
    }

    fn bremsstrahlung_tables(&self) -> Result<EnergyTables> {
        self.bremsstrahlung_photon_energies.to_energy_tables(&self.context("bremsstrahlung photon energy"))
    }

    fn excitation_cross_section(&self) -> Result<Vec<f64>> {
        Ok(self.excitation_cross_section.clone())
    }

    fn excitation_energy_loss(&self) -> Result<(Vec<f64>, Vec<f64>)> {
        Ok((self.excitation_energies.clone(), self.excitation_energy_loss.clone()))
    }

    fn subshells(&self) -> Result<SubshellData> {
        Ok(SubshellData {
            designators: self.subshells.iter().map(|subshell| subshell.designator).collect(),
            binding_energies: self.subshells.iter().map(|subshell| subshell.binding_energy).collect(),
            occupancies: self.subshells.iter().map(|subshell| subshell.occupancy).collect(),
        })
    }

    fn electroionization_cross_section(&self, subshell_index: usize) -> Result<Vec<f64>> {
        self.subshells.get(subshell_index).map(|subshell| subshell.cross_section.clone()).ok_or_else(|| {
            TransportError::data_integrity(
                self.context("subshell"),
                format!("subshell {} of {} requested", subshell_index, self.subshells.len()),
            )
        })
    }

    fn electroionization_tables(&self) -> Result<Vec<EnergyTables>> {
        self.subshells
            .iter()
            .map(|subshell| {
                subshell
                    .knock_on_energies
                    .to_energy_tables(&self.context(&format!("subshell {} knock-on energy", subshell.designator)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::factory::ElectroatomicReactionFactory;
    use crate::reactions::{ElectroatomicReactionType, ReactionType};
    use crate::scattering::Subshell;
    use crate::settings::{ElasticElectronMode, ParticleMode, SimulationProperties};
    use crate::utils::testing::NATIVE_TEST_DATA;

    #[test]
    fn test_getters() {
        let data = NativeElectronData::from_toml_str(NATIVE_TEST_DATA).unwrap();
        assert_eq!(data.source_name(), "6000.native");
        assert_eq!(data.elastic_angular_energy_grid(), &[1e-3, 10.0]);
        assert_eq!(data.cutoff_elastic_angles_at(10.0).unwrap(), &[-1.0, 0.9, 0.999999]);
        assert!(data.cutoff_elastic_angles_at(5.0).is_none());
        assert_eq!(data.subshells().unwrap().designators, vec![1]);
        assert!(data.electroionization_cross_section(1).is_err());
    }

    #[test]
    fn test_reactions_from_native_data() {
        let data = NativeElectronData::from_toml_str(NATIVE_TEST_DATA).unwrap();
        let mut properties = SimulationProperties::default();
        properties.general.mode = ParticleMode::Electron;
        properties.electron.elastic_mode = ElasticElectronMode::Cutoff;
        let reactions = ElectroatomicReactionFactory::new(&data, &properties).unwrap().create_reactions().unwrap();
        assert_eq!(reactions.len(), 4);
        assert_eq!(
            reactions[3].reaction_type(),
            ReactionType::from(ElectroatomicReactionType::SubshellElectroionization(Subshell::K))
        );
        assert_relative_eq!(reactions[1].evaluate_cross_section(10.0).unwrap(), 6.0, max_relative = 1e-12);
    }

    #[test]
    fn test_invalid_data() {
        let truncated = NATIVE_TEST_DATA
            .replace("bremsstrahlung_cross_section = [8.0, 6.0]", "bremsstrahlung_cross_section = [8.0]");
        let err = NativeElectronData::from_toml_str(&truncated).unwrap_err();
        assert!(format!("{:#}", err).contains("bremsstrahlung cross section has 1 values"));
        assert!(NativeElectronData::from_toml_str("name = 3").is_err());

        let mut data = NativeElectronData::from_toml_str(NATIVE_TEST_DATA).unwrap();
        data.elastic_angles.cdfs.pop();
        assert!(matches!(data.elastic_angular_tables(), Err(TransportError::DataIntegrity { .. })));
    }
}
