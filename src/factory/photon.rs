use std::sync::Arc;

use crate::blocks::ElectronPhotonTableExtractor;
use crate::error::{Result, TransportError};
use crate::interpolation::InterpolationScheme;
use crate::particle::ParticleType;
use crate::reactions::{CrossSection, EmittedParticles, PhotoatomicReactionType, Reaction};
use crate::scattering::Subshell;
use crate::scattering::photon::{
    ComptonShell, DopplerBroadenedIncoherentScattering, FormFactorCoherentScattering, IncoherentAngularModel,
    KleinNishinaScattering, PairProduction, PairProductionMode, PhotoelectricAbsorption, PhotoelectricShell,
    PhotonScatteringDistribution, ThompsonScattering, WallerHartreeScattering,
};
use crate::settings::{CoherentModel, IncoherentModel, SimulationProperties};
use crate::utils::HashGridSearcher;

pub type PhotoatomicReaction = Reaction<PhotonScatteringDistribution>;

// JINC and JCOH tabulate momentum transfer in inverse Angstrom
const INVERSE_ANGSTROM_IN_INVERSE_CM: f64 = 1e8;

//=====================================================================
// Builds the photoatomic reactions of an electron-photon table with
// the models selected in the photon properties. Cross sections are
// log-log on the ESZG grid and start at their first nonzero value.
//=====================================================================
pub struct PhotoatomicReactionFactory<'a> {
    table: &'a ElectronPhotonTableExtractor,
    properties: &'a SimulationProperties,
    energy_grid: Arc<Vec<f64>>,
    grid_searcher: Option<Arc<HashGridSearcher>>,
}

impl<'a> PhotoatomicReactionFactory<'a> {
    pub fn new(table: &'a ElectronPhotonTableExtractor, properties: &'a SimulationProperties) -> Result<Self> {
        let energy_grid = Arc::new(table.extract_photon_energy_grid()?);
        let grid_searcher = match properties.general.hash_grid_bins {
            0 => None,
            bins => Some(Arc::new(HashGridSearcher::new(energy_grid.clone(), bins)?)),
        };
        Ok(Self { table, properties, energy_grid, grid_searcher })
    }

    fn model_error(&self, reaction_type: PhotoatomicReactionType) -> impl Fn(TransportError) -> TransportError + '_ {
        move |err| TransportError::model_construction(self.table.table_name(), reaction_type, err)
    }

    fn cross_section(&self, values: Vec<f64>, reaction_type: PhotoatomicReactionType) -> Result<CrossSection> {
        let threshold_index = values.iter().position(|&value| value > 0.0).ok_or_else(|| {
            TransportError::data_integrity(
                format!("ESZG block of table '{}'", self.table.table_name()),
                format!("{} cross section vanishes on the whole grid", reaction_type),
            )
        })?;
        let cross_section =
            CrossSection::new(self.energy_grid.clone(), values[threshold_index..].to_vec(), threshold_index)?
                .with_scheme(InterpolationScheme::LogLog);
        match &self.grid_searcher {
            Some(searcher) => cross_section.with_grid_searcher(searcher.clone()),
            None => Ok(cross_section),
        }
    }

    fn scaled_momentum(momentum: &[f64]) -> Vec<f64> {
        momentum.iter().map(|x| x * INVERSE_ANGSTROM_IN_INVERSE_CM).collect()
    }

    pub fn create_coherent_reaction(&self) -> Result<PhotoatomicReaction> {
        let reaction_type = PhotoatomicReactionType::Coherent;
        let build = || -> Result<PhotoatomicReaction> {
            let cross_section = self.cross_section(self.table.extract_coherent_cross_section()?, reaction_type)?;
            let distribution = match self.properties.photon.coherent_model {
                CoherentModel::Thompson => PhotonScatteringDistribution::Thompson(ThompsonScattering),
                CoherentModel::FormFactor => {
                    let (momentum, _, form_factor) = self.table.extract_coherent_form_factor()?;
                    PhotonScatteringDistribution::FormFactorCoherent(FormFactorCoherentScattering::new(
                        &Self::scaled_momentum(momentum),
                        form_factor,
                    )?)
                }
            };
            Ok(Reaction::new(reaction_type.into(), cross_section, distribution))
        };
        build().map_err(self.model_error(reaction_type))
    }

    fn waller_hartree(&self) -> Result<WallerHartreeScattering> {
        let (momentum, scattering_function) = self.table.extract_incoherent_scattering_function()?;
        WallerHartreeScattering::new(
            Self::scaled_momentum(momentum),
            scattering_function.to_vec(),
            self.properties.photon.kahn_cutoff_energy(),
        )
    }

    // Compton shell i belongs to SUBSH designator i
    fn compton_shells(&self) -> Result<Vec<ComptonShell>> {
        let occupancies = self.table.extract_compton_shell_occupancies();
        let binding_energies = self.table.extract_compton_shell_binding_energies();
        let profiles = self.table.extract_compton_profiles()?;
        let designators = self.table.extract_subshell_data()?.designators;
        if occupancies.len() != binding_energies.len() || occupancies.len() != profiles.len() {
            return Err(TransportError::data_integrity(
                format!("Compton profile blocks of table '{}'", self.table.table_name()),
                format!(
                    "{} occupancies, {} binding energies and {} profiles",
                    occupancies.len(),
                    binding_energies.len(),
                    profiles.len()
                ),
            ));
        }
        occupancies
            .iter()
            .zip(binding_energies)
            .zip(&profiles)
            .enumerate()
            .map(|(index, ((&occupancy, &binding_energy), profile))| {
                let subshell = designators.get(index).map_or(Subshell::Unknown(index as u32), |&d| Subshell::from(d));
                ComptonShell::new(subshell, binding_energy, occupancy, profile)
            })
            .collect()
    }

    pub fn create_incoherent_reaction(&self) -> Result<PhotoatomicReaction> {
        let reaction_type = PhotoatomicReactionType::Incoherent;
        let kahn_cutoff_energy = self.properties.photon.kahn_cutoff_energy();
        let build = || -> Result<PhotoatomicReaction> {
            let cross_section = self.cross_section(self.table.extract_incoherent_cross_section()?, reaction_type)?;
            let distribution = match self.properties.photon.incoherent_model {
                IncoherentModel::KleinNishina => {
                    PhotonScatteringDistribution::KleinNishina(KleinNishinaScattering::new(kahn_cutoff_energy))
                }
                IncoherentModel::WallerHartree => PhotonScatteringDistribution::WallerHartree(self.waller_hartree()?),
                IncoherentModel::DopplerBroadened => {
                    let angular = if self.table.extract_incoherent_scattering_function().is_ok() {
                        IncoherentAngularModel::WallerHartree(self.waller_hartree()?)
                    } else {
                        log::debug!(
                            "table '{}' has no incoherent scattering function, broadening free electron scattering",
                            self.table.table_name()
                        );
                        IncoherentAngularModel::Free(KleinNishinaScattering::new(kahn_cutoff_energy))
                    };
                    PhotonScatteringDistribution::DopplerBroadened(DopplerBroadenedIncoherentScattering::new(
                        angular,
                        self.compton_shells()?,
                        self.table.extract_compton_shell_cumulative_probabilities(),
                    )?)
                }
            };
            Ok(Reaction::new(reaction_type.into(), cross_section, distribution))
        };
        build().map_err(self.model_error(reaction_type))
    }

    pub fn create_photoelectric_reaction(&self) -> Result<PhotoatomicReaction> {
        let reaction_type = PhotoatomicReactionType::Photoelectric;
        let create_photoelectrons =
            self.properties.photon.create_photoelectrons && self.properties.transports(ParticleType::Electron);
        let build = || -> Result<PhotoatomicReaction> {
            let cross_section = self.cross_section(self.table.extract_photoelectric_cross_section()?, reaction_type)?;
            let subshells = self.table.extract_subshell_data()?;
            let shells = subshells
                .designators
                .iter()
                .zip(&subshells.binding_energies)
                .zip(&subshells.occupancies)
                .map(|((&designator, &binding_energy), &occupancy)| PhotoelectricShell {
                    subshell: Subshell::from(designator),
                    binding_energy,
                    occupancy,
                })
                .collect();
            let distribution = PhotoelectricAbsorption::new(shells, create_photoelectrons)?;
            let emitted = EmittedParticles { electrons: u32::from(create_photoelectrons), ..Default::default() };
            Ok(Reaction::new(reaction_type.into(), cross_section, PhotonScatteringDistribution::Photoelectric(distribution))
                .with_emitted_particles(emitted))
        };
        build().map_err(self.model_error(reaction_type))
    }

    pub fn create_pair_production_reaction(&self) -> Result<PhotoatomicReaction> {
        let reaction_type = PhotoatomicReactionType::PairProduction;
        let mut mode = self.properties.photon.pair_production_mode;
        if mode == PairProductionMode::Detailed && !self.properties.transports(ParticleType::Electron) {
            log::debug!("electrons are not transported, pair production falls back to {}", PairProductionMode::Simple);
            mode = PairProductionMode::Simple;
        }
        let build = || -> Result<PhotoatomicReaction> {
            let cross_section =
                self.cross_section(self.table.extract_pair_production_cross_section()?, reaction_type)?;
            let emitted = match mode {
                PairProductionMode::Simple => EmittedParticles { photons: 1, ..Default::default() },
                PairProductionMode::Detailed => EmittedParticles { electrons: 1, positrons: 1, ..Default::default() },
            };
            Ok(Reaction::new(
                reaction_type.into(),
                cross_section,
                PhotonScatteringDistribution::PairProduction(PairProduction::new(mode)),
            )
            .with_emitted_particles(emitted))
        };
        build().map_err(self.model_error(reaction_type))
    }

    // Every photoatomic reaction of the table, ordered by reaction type
    pub fn create_reactions(&self) -> Result<Vec<PhotoatomicReaction>> {
        let reactions = vec![
            self.create_coherent_reaction()?,
            self.create_incoherent_reaction()?,
            self.create_photoelectric_reaction()?,
            self.create_pair_production_reaction()?,
        ];
        log::debug!("table '{}': {} photoatomic reactions", self.table.table_name(), reactions.len());
        Ok(reactions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use crate::particle::{ParticleBank, ParticleState};
    use crate::settings::ParticleMode;
    use crate::utils::testing::ELECTRON_PHOTON_TEST_TABLE;
    use crate::utils::{MockRng, RngStream};

    fn properties(mode: ParticleMode) -> SimulationProperties {
        let mut properties = SimulationProperties::default();
        properties.general.mode = mode;
        properties
    }

    #[test]
    fn test_cross_sections() {
        let properties = properties(ParticleMode::Photon);
        let factory = PhotoatomicReactionFactory::new(&ELECTRON_PHOTON_TEST_TABLE, &properties).unwrap();
        let reactions = factory.create_reactions().unwrap();
        assert_eq!(reactions.len(), 4);
        assert!(reactions.windows(2).all(|pair| pair[0].reaction_type() < pair[1].reaction_type()));

        let incoherent = factory.create_incoherent_reaction().unwrap();
        assert_relative_eq!(incoherent.evaluate_cross_section(1.0).unwrap(), 1.5, max_relative = 1e-12);
        // Log-log between the tabulated points
        let energy = 20f64.sqrt();
        assert_relative_eq!(incoherent.evaluate_cross_section(energy).unwrap(), (1.5f64 * 0.4).sqrt(), max_relative = 1e-9);

        let pair = factory.create_pair_production_reaction().unwrap();
        assert_relative_eq!(pair.threshold_energy(), 20.0, max_relative = 1e-12);
        assert_eq!(pair.evaluate_cross_section(10.0).unwrap(), 0.0);
        assert_eq!(pair.number_of_emitted_photons(pair.threshold_energy()), 1);
    }

    #[test]
    fn test_models_follow_properties() {
        let mut properties = properties(ParticleMode::Photon);
        properties.photon.coherent_model = CoherentModel::Thompson;
        properties.photon.incoherent_model = IncoherentModel::KleinNishina;
        properties.photon.pair_production_mode = PairProductionMode::Detailed;
        let factory = PhotoatomicReactionFactory::new(&ELECTRON_PHOTON_TEST_TABLE, &properties).unwrap();

        let coherent = factory.create_coherent_reaction().unwrap();
        assert!(matches!(coherent.distribution(), PhotonScatteringDistribution::Thompson(_)));
        let incoherent = factory.create_incoherent_reaction().unwrap();
        assert!(matches!(incoherent.distribution(), PhotonScatteringDistribution::KleinNishina(_)));

        // Without electron transport the pair annihilates on the spot
        let pair = factory.create_pair_production_reaction().unwrap();
        let PhotonScatteringDistribution::PairProduction(distribution) = pair.distribution() else {
            panic!("expected pair production");
        };
        assert_eq!(distribution.mode(), PairProductionMode::Simple);

        let properties = {
            let mut properties = properties.clone();
            properties.general.mode = ParticleMode::PhotonElectron;
            properties
        };
        let factory = PhotoatomicReactionFactory::new(&ELECTRON_PHOTON_TEST_TABLE, &properties).unwrap();
        let pair = factory.create_pair_production_reaction().unwrap();
        assert_eq!(pair.number_of_emitted_positrons(pair.threshold_energy()), 1);
    }

    #[test]
    fn test_doppler_broadened_incoherent() {
        let properties = properties(ParticleMode::Photon);
        let factory = PhotoatomicReactionFactory::new(&ELECTRON_PHOTON_TEST_TABLE, &properties).unwrap();
        let reaction = factory.create_incoherent_reaction().unwrap();
        let PhotonScatteringDistribution::DopplerBroadened(distribution) = reaction.distribution() else {
            panic!("expected Doppler broadening");
        };
        let subshells: Vec<Subshell> = distribution.shells().iter().map(|shell| shell.subshell).collect();
        assert_eq!(subshells, vec![Subshell::K, Subshell::L1]);

        let mut rng = RngStream::new(StdRng::seed_from_u64(7));
        let mut bank = ParticleBank::new();
        for _ in 0..200 {
            let mut photon = ParticleState::new(ParticleType::Photon, 1.0);
            reaction.react(&mut photon, &mut bank, &mut rng).unwrap();
            assert!(photon.is_alive());
            assert!(photon.energy > 0.0 && photon.energy <= 1.0);
        }
        assert!(bank.is_empty());
    }

    #[test]
    fn test_photoelectrons_follow_particle_mode() {
        let properties = properties(ParticleMode::PhotonElectron);
        let factory = PhotoatomicReactionFactory::new(&ELECTRON_PHOTON_TEST_TABLE, &properties).unwrap();
        let reaction = factory.create_photoelectric_reaction().unwrap();
        assert_eq!(reaction.number_of_emitted_electrons(1.0), 1);

        let mut photon = ParticleState::new(ParticleType::Photon, 1.0);
        let mut bank = ParticleBank::new();
        // Shell selection, then the photoelectron direction
        let mut rng = MockRng::new(vec![0.1, 0.5, 0.0]);
        let subshell = reaction.react(&mut photon, &mut bank, &mut rng).unwrap();
        assert_eq!(subshell, Some(Subshell::K));
        assert!(!photon.is_alive());
        assert_relative_eq!(bank.pop().unwrap().energy, 1.0 - 2.9e-4, max_relative = 1e-12);

        let properties = self::properties(ParticleMode::Photon);
        let factory = PhotoatomicReactionFactory::new(&ELECTRON_PHOTON_TEST_TABLE, &properties).unwrap();
        assert_eq!(factory.create_photoelectric_reaction().unwrap().number_of_emitted_electrons(1.0), 0);
    }
}
