use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::{Context, ensure};

use crate::collision::{AdjointElectronMaterial, ElectronMaterial, Material, NeutronMaterial, PhotonMaterial};
use crate::error::{Result, TransportError};
use crate::particle::{ParticleBank, ParticleState, ParticleType};
use crate::scattering::Subshell;
use crate::utils::RandomNumberStream;

//=====================================================================
// Routes a collision in a cell to the material filling that cell for
// the colliding particle type.
//
// Positrons collide with the electron materials. A known cell without
// a material for the particle type behaves as void for it.
//=====================================================================
#[derive(Debug, Default)]
pub struct CollisionHandler {
    neutron_materials: HashMap<u64, Arc<NeutronMaterial>>,
    photon_materials: HashMap<u64, Arc<PhotonMaterial>>,
    electron_materials: HashMap<u64, Arc<ElectronMaterial>>,
    adjoint_electron_materials: HashMap<u64, Arc<AdjointElectronMaterial>>,
    void_cells: HashSet<u64>,
}

fn assign<D>(
    materials: &mut HashMap<u64, Arc<Material<D>>>,
    void_cells: &HashSet<u64>,
    material: Arc<Material<D>>,
    cells: &[u64],
    particle_name: &str,
) -> anyhow::Result<()> {
    for &cell in cells {
        ensure!(!void_cells.contains(&cell), "cell {} is void", cell);
        if let Some(existing) = materials.get(&cell) {
            anyhow::bail!("cell {} already holds {} material '{}'", cell, particle_name, existing.name());
        }
    }
    for &cell in cells {
        materials.insert(cell, Arc::clone(&material));
    }
    Ok(())
}

impl CollisionHandler {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_neutron_material(&mut self, material: Arc<NeutronMaterial>, cells: &[u64]) -> anyhow::Result<()> {
        let name = material.name().to_string();
        assign(&mut self.neutron_materials, &self.void_cells, material, cells, "a neutron")
            .with_context(|| format!("Could not assign neutron material '{}'", name))
    }

    pub fn add_photon_material(&mut self, material: Arc<PhotonMaterial>, cells: &[u64]) -> anyhow::Result<()> {
        let name = material.name().to_string();
        assign(&mut self.photon_materials, &self.void_cells, material, cells, "a photon")
            .with_context(|| format!("Could not assign photon material '{}'", name))
    }

    pub fn add_electron_material(&mut self, material: Arc<ElectronMaterial>, cells: &[u64]) -> anyhow::Result<()> {
        let name = material.name().to_string();
        assign(&mut self.electron_materials, &self.void_cells, material, cells, "an electron")
            .with_context(|| format!("Could not assign electron material '{}'", name))
    }

    pub fn add_adjoint_electron_material(
        &mut self,
        material: Arc<AdjointElectronMaterial>,
        cells: &[u64],
    ) -> anyhow::Result<()> {
        let name = material.name().to_string();
        assign(&mut self.adjoint_electron_materials, &self.void_cells, material, cells, "an adjoint electron")
            .with_context(|| format!("Could not assign adjoint electron material '{}'", name))
    }

    pub fn add_void_cell(&mut self, cell: u64) -> anyhow::Result<()> {
        ensure!(!self.has_material(cell), "cell {} already holds a material and cannot be void", cell);
        self.void_cells.insert(cell);
        Ok(())
    }

    fn has_material(&self, cell: u64) -> bool {
        self.neutron_materials.contains_key(&cell)
            || self.photon_materials.contains_key(&cell)
            || self.electron_materials.contains_key(&cell)
            || self.adjoint_electron_materials.contains_key(&cell)
    }

    pub fn is_known_cell(&self, cell: u64) -> bool {
        self.void_cells.contains(&cell) || self.has_material(cell)
    }

    fn check_cell(&self, cell: u64) -> Result<()> {
        if !self.is_known_cell(cell) {
            return Err(TransportError::UnknownCell { cell });
        }
        Ok(())
    }

    pub fn is_cell_void(&self, cell: u64, particle_type: ParticleType) -> Result<bool> {
        self.check_cell(cell)?;
        Ok(match particle_type {
            ParticleType::Neutron => !self.neutron_materials.contains_key(&cell),
            ParticleType::Photon => !self.photon_materials.contains_key(&cell),
            ParticleType::Electron | ParticleType::Positron => !self.electron_materials.contains_key(&cell),
            ParticleType::AdjointElectron => !self.adjoint_electron_materials.contains_key(&cell),
        })
    }

    // Zero in void
    pub fn macroscopic_total_cross_section(&self, cell: u64, particle: &ParticleState) -> Result<f64> {
        self.check_cell(cell)?;
        let energy = particle.energy;
        let cross_section = match particle.particle_type {
            ParticleType::Neutron => {
                self.neutron_materials.get(&cell).map(|m| m.macroscopic_total_cross_section(energy))
            }
            ParticleType::Photon => self.photon_materials.get(&cell).map(|m| m.macroscopic_total_cross_section(energy)),
            ParticleType::Electron | ParticleType::Positron => {
                self.electron_materials.get(&cell).map(|m| m.macroscopic_total_cross_section(energy))
            }
            ParticleType::AdjointElectron => {
                self.adjoint_electron_materials.get(&cell).map(|m| m.macroscopic_total_cross_section(energy))
            }
        };
        cross_section.unwrap_or(Ok(0.0))
    }

    // Samples the target and the reaction in the cell's material and
    // lets the reaction act on the particle. Void leaves it untouched.
    pub fn collide_with_cell_material<R: RandomNumberStream + ?Sized>(
        &self,
        cell: u64,
        particle: &mut ParticleState,
        bank: &mut ParticleBank,
        rng: &mut R,
    ) -> Result<Option<Subshell>> {
        self.check_cell(cell)?;
        let subshell = match particle.particle_type {
            ParticleType::Neutron => match self.neutron_materials.get(&cell) {
                Some(material) => material.collide(particle, bank, rng)?,
                None => None,
            },
            ParticleType::Photon => match self.photon_materials.get(&cell) {
                Some(material) => material.collide(particle, bank, rng)?,
                None => None,
            },
            ParticleType::Electron | ParticleType::Positron => match self.electron_materials.get(&cell) {
                Some(material) => material.collide(particle, bank, rng)?,
                None => None,
            },
            ParticleType::AdjointElectron => match self.adjoint_electron_materials.get(&cell) {
                Some(material) => material.collide_adjoint(particle, bank, rng)?,
                None => None,
            },
        };
        Ok(subshell)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::collision::{Nuclide, Photoatom};
    use crate::settings::{ParticleMode, SimulationProperties};
    use crate::utils::MockRng;
    use crate::utils::testing::{ELECTRON_PHOTON_TEST_TABLE, NEUTRON_TEST_TABLE, TEST_ATOMIC_WEIGHT_RATIO};

    fn handler() -> CollisionHandler {
        let properties = SimulationProperties::default();
        let nuclide =
            Nuclide::from_neutron_table(&NEUTRON_TEST_TABLE, TEST_ATOMIC_WEIGHT_RATIO, &properties).unwrap();
        let material = Material::new("graphite", vec![(0.08, Arc::new(nuclide))]).unwrap();

        let mut handler = CollisionHandler::new();
        handler.add_neutron_material(Arc::new(material), &[1, 2]).unwrap();
        handler.add_void_cell(3).unwrap();
        handler
    }

    #[test]
    fn test_neutron_collision() {
        let handler = handler();
        let mut particle = ParticleState::new(ParticleType::Neutron, 1.0).in_cell(1);
        let mut bank = ParticleBank::new();
        let cross_section = handler.macroscopic_total_cross_section(1, &particle).unwrap();
        assert_relative_eq!(cross_section, 0.08 * 5.2, max_relative = 1e-12);

        // Capture
        let mut rng = MockRng::new(vec![0.99]);
        handler.collide_with_cell_material(1, &mut particle, &mut bank, &mut rng).unwrap();
        assert!(!particle.is_alive());
        assert_eq!(particle.collision_number, 1);
    }

    #[test]
    fn test_void_and_unknown_cells() {
        let handler = handler();
        let mut bank = ParticleBank::new();
        let mut rng = MockRng::new(vec![]);

        let mut particle = ParticleState::new(ParticleType::Neutron, 1.0);
        let before = particle.clone();
        assert_eq!(handler.collide_with_cell_material(3, &mut particle, &mut bank, &mut rng).unwrap(), None);
        assert_eq!(particle, before);
        assert!(handler.is_cell_void(3, ParticleType::Neutron).unwrap());

        // Cell 1 has no photon material
        let mut photon = ParticleState::new(ParticleType::Photon, 1.0);
        handler.collide_with_cell_material(1, &mut photon, &mut bank, &mut rng).unwrap();
        assert_eq!(photon.collision_number, 0);
        assert_eq!(handler.macroscopic_total_cross_section(1, &photon).unwrap(), 0.0);

        assert!(matches!(
            handler.collide_with_cell_material(9, &mut particle, &mut bank, &mut rng),
            Err(TransportError::UnknownCell { cell: 9 })
        ));
        assert!(handler.is_cell_void(9, ParticleType::Neutron).is_err());
    }

    #[test]
    fn test_photon_collision() {
        let mut properties = SimulationProperties::default();
        properties.general.mode = ParticleMode::Photon;
        let photoatom = Photoatom::from_electron_photon_table(&ELECTRON_PHOTON_TEST_TABLE, &properties).unwrap();
        let material = Material::new("carbon", vec![(0.1, Arc::new(photoatom))]).unwrap();
        let mut handler = CollisionHandler::new();
        handler.add_photon_material(Arc::new(material), &[4]).unwrap();

        // Photoelectric absorption dominates at 10 keV
        let mut photon = ParticleState::new(ParticleType::Photon, 1e-2);
        let mut bank = ParticleBank::new();
        let mut rng = MockRng::new(vec![0.99, 0.5, 0.5, 0.5]);
        handler.collide_with_cell_material(4, &mut photon, &mut bank, &mut rng).unwrap();
        assert!(!photon.is_alive());
        assert!(bank.is_empty());
    }

    #[test]
    fn test_assignment_conflicts() {
        let mut handler = handler();
        let properties = SimulationProperties::default();
        let nuclide =
            Nuclide::from_neutron_table(&NEUTRON_TEST_TABLE, TEST_ATOMIC_WEIGHT_RATIO, &properties).unwrap();
        let material = Arc::new(Material::new("other", vec![(0.01, Arc::new(nuclide))]).unwrap());

        let err = handler.add_neutron_material(material.clone(), &[2]).unwrap_err();
        assert!(format!("{:#}", err).contains("already holds a neutron material 'graphite'"));
        assert!(handler.add_neutron_material(material.clone(), &[3]).is_err());
        assert!(handler.add_void_cell(1).is_err());
        handler.add_neutron_material(material, &[5]).unwrap();
        assert!(handler.is_known_cell(5));
    }
}
