use std::sync::Arc;

use crate::blocks::{ElectronPhotonTableExtractor, EnergyTables, SubshellData};
use crate::distributions::{OneDDistribution, TabularDistribution, TwoDBoundaryPolicy, TwoDDistribution};
use crate::error::{Result, TransportError};
use crate::interpolation::{InterpolationScheme, InterpolationTable};
use crate::particle::ParticleType;
use crate::reactions::{CrossSection, ElectroatomicReactionType, EmittedParticles, Reaction};
use crate::scattering::Subshell;
use crate::scattering::electron::{
    AnalogElasticDistribution, AtomicExcitationDistribution, BremsstrahlungDistribution, CutoffElasticDistribution,
    ElectroionizationSubshellDistribution, ElectronScatteringDistribution, HybridElasticDistribution,
    MomentPreservingBuilder, MomentPreservingElasticDistribution, ScreenedRutherfordElasticDistribution,
};
use crate::settings::{ElasticElectronMode, ElectronProperties, SimulationProperties};
use crate::utils::{GaussKronrodIntegrator, HashGridSearcher};

pub type ElectroatomicReaction = Reaction<ElectronScatteringDistribution>;

//=====================================================================
// Electron data as the reaction factories consume it, one getter per
// quantity. Implemented by the ACE electron-photon extractor and by
// the native data container.
//=====================================================================
pub trait ElectronDataSource {
    // Name used in error messages
    fn source_name(&self) -> &str;
    fn atomic_number(&self) -> u32;
    fn electron_energy_grid(&self) -> Result<Vec<f64>>;

    // Elastic cross section of the tabulated cosines below the peak
    fn cutoff_elastic_cross_section(&self) -> Result<Vec<f64>>;
    fn elastic_angular_tables(&self) -> Result<EnergyTables>;

    fn bremsstrahlung_cross_section(&self) -> Result<Vec<f64>>;
    fn bremsstrahlung_tables(&self) -> Result<EnergyTables>;

    fn excitation_cross_section(&self) -> Result<Vec<f64>>;
    // Incoming energies and the mean energy lost to excitation
    fn excitation_energy_loss(&self) -> Result<(Vec<f64>, Vec<f64>)>;

    fn subshells(&self) -> Result<SubshellData>;
    fn electroionization_cross_section(&self, subshell_index: usize) -> Result<Vec<f64>>;
    // Knock-on energy tables, one per subshell
    fn electroionization_tables(&self) -> Result<Vec<EnergyTables>>;
}

impl ElectronDataSource for ElectronPhotonTableExtractor {
    fn source_name(&self) -> &str {
        self.table_name()
    }

    fn atomic_number(&self) -> u32 {
        ElectronPhotonTableExtractor::atomic_number(self)
    }

    fn electron_energy_grid(&self) -> Result<Vec<f64>> {
        Ok(self.extract_electron_energy_grid()?.to_vec())
    }

    fn cutoff_elastic_cross_section(&self) -> Result<Vec<f64>> {
        Ok(self.extract_cutoff_elastic_cross_section()?.to_vec())
    }

    fn elastic_angular_tables(&self) -> Result<EnergyTables> {
        self.extract_elastic_angular_tables()
    }

    fn bremsstrahlung_cross_section(&self) -> Result<Vec<f64>> {
        Ok(self.extract_bremsstrahlung_cross_section()?.to_vec())
    }

    fn bremsstrahlung_tables(&self) -> Result<EnergyTables> {
        self.extract_bremsstrahlung_tables()
    }

    fn excitation_cross_section(&self) -> Result<Vec<f64>> {
        Ok(self.extract_excitation_cross_section()?.to_vec())
    }

    fn excitation_energy_loss(&self) -> Result<(Vec<f64>, Vec<f64>)> {
        let (energies, loss) = self.extract_excitation_energy_loss()?;
        Ok((energies.to_vec(), loss.to_vec()))
    }

    fn subshells(&self) -> Result<SubshellData> {
        self.extract_subshell_data()
    }

    fn electroionization_cross_section(&self, subshell_index: usize) -> Result<Vec<f64>> {
        Ok(self.extract_subshell_electroionization_cross_section(subshell_index)?.to_vec())
    }

    fn electroionization_tables(&self) -> Result<Vec<EnergyTables>> {
        self.extract_electroionization_tables()
    }
}

// Secondary tables as a two-dimensional distribution with the
// electron sampling settings, clamped outside of the energy grid
pub(crate) fn two_d_from_tables(tables: &EnergyTables, electron: &ElectronProperties) -> Result<TwoDDistribution> {
    let distributions = tables
        .values
        .iter()
        .zip(&tables.cdfs)
        .map(|(values, cdf)| {
            Ok(Arc::new(OneDDistribution::Tabular(TabularDistribution::from_cdf(values.clone(), cdf.clone())?)))
        })
        .collect::<Result<Vec<_>>>()?;
    TwoDDistribution::new(
        tables.energies.clone(),
        distributions,
        electron.sampling_policy,
        electron.grid_interpolation,
        TwoDBoundaryPolicy::Clamp,
    )
}

//=====================================================================
// Builds the electroatomic reactions of one element: elastic in the
// configured mode, bremsstrahlung, atomic excitation and one
// electroionization reaction per subshell. Cross sections are log-log
// on the electron energy grid.
//=====================================================================
pub struct ElectroatomicReactionFactory<'a, S: ElectronDataSource + ?Sized> {
    data: &'a S,
    properties: &'a SimulationProperties,
    energy_grid: Arc<Vec<f64>>,
    grid_searcher: Option<Arc<HashGridSearcher>>,
}

impl<'a, S: ElectronDataSource + ?Sized> ElectroatomicReactionFactory<'a, S> {
    pub fn new(data: &'a S, properties: &'a SimulationProperties) -> Result<Self> {
        let energy_grid = Arc::new(data.electron_energy_grid()?);
        let grid_searcher = match properties.general.hash_grid_bins {
            0 => None,
            bins => Some(Arc::new(HashGridSearcher::new(energy_grid.clone(), bins)?)),
        };
        Ok(Self { data, properties, energy_grid, grid_searcher })
    }

    pub fn energy_grid(&self) -> &Arc<Vec<f64>> {
        &self.energy_grid
    }

    fn model_error(&self, reaction_type: ElectroatomicReactionType) -> impl Fn(TransportError) -> TransportError + '_ {
        move |err| TransportError::model_construction(self.data.source_name(), reaction_type, err)
    }

    // Starts at the first positive value above `lowest_energy`
    pub(crate) fn cross_section(
        &self,
        values: Vec<f64>,
        lowest_energy: f64,
        reaction_type: impl std::fmt::Display,
    ) -> Result<CrossSection> {
        let threshold_index = values
            .iter()
            .zip(self.energy_grid.iter())
            .position(|(&value, &energy)| value > 0.0 && energy > lowest_energy)
            .ok_or_else(|| {
                TransportError::data_integrity(
                    format!("electron data of '{}'", self.data.source_name()),
                    format!("{} cross section vanishes on the whole grid", reaction_type),
                )
            })?;
        let values = values.get(threshold_index..).map(<[f64]>::to_vec).unwrap_or_default();
        let cross_section = CrossSection::new(self.energy_grid.clone(), values, threshold_index)?
            .with_scheme(InterpolationScheme::LogLog);
        match &self.grid_searcher {
            Some(searcher) => cross_section.with_grid_searcher(searcher.clone()),
            None => Ok(cross_section),
        }
    }

    pub(crate) fn elastic_angular(&self) -> Result<Arc<TwoDDistribution>> {
        Ok(Arc::new(two_d_from_tables(&self.data.elastic_angular_tables()?, &self.properties.electron)?))
    }

    // Cutoff elastic cross section times an energy dependent ratio
    pub(crate) fn scaled_cutoff_cross_section<F>(&self, ratio: F) -> Result<Vec<f64>>
    where
        F: Fn(f64) -> Result<f64>,
    {
        let cutoff = self.data.cutoff_elastic_cross_section()?;
        if cutoff.len() != self.energy_grid.len() {
            return Err(TransportError::data_integrity(
                format!("electron data of '{}'", self.data.source_name()),
                format!("{} cutoff elastic values on a grid of {}", cutoff.len(), self.energy_grid.len()),
            ));
        }
        cutoff.iter().zip(self.energy_grid.iter()).map(|(&value, &energy)| Ok(value * ratio(energy)?)).collect()
    }

    fn moment_preserving_builder(&self) -> Result<MomentPreservingBuilder> {
        let electron = &self.properties.electron;
        Ok(MomentPreservingBuilder::new(
            self.data.atomic_number(),
            electron.elastic_cutoff_angle_cosine,
            electron.moment_preserving_angles,
        )?
        .with_integrator(GaussKronrodIntegrator::new(electron.quadrature_tolerance)))
    }

    pub fn create_elastic_reaction(&self) -> Result<ElectroatomicReaction> {
        let electron = &self.properties.electron;
        let reaction_type = match electron.elastic_mode {
            ElasticElectronMode::Analog => ElectroatomicReactionType::AnalogElastic,
            ElasticElectronMode::Cutoff => ElectroatomicReactionType::CutoffElastic,
            ElasticElectronMode::ScreenedRutherford => ElectroatomicReactionType::ScreenedRutherfordElastic,
            ElasticElectronMode::Hybrid => ElectroatomicReactionType::HybridElastic,
            ElasticElectronMode::MomentPreserving => ElectroatomicReactionType::MomentPreservingElastic,
        };
        let build = || -> Result<ElectroatomicReaction> {
            let angular = self.elastic_angular()?;
            let atomic_number = self.data.atomic_number();
            let (values, distribution) = match electron.elastic_mode {
                ElasticElectronMode::Analog => {
                    let elastic =
                        AnalogElasticDistribution::new(angular, atomic_number, electron.analog_union_sampling)?;
                    let values = self.scaled_cutoff_cross_section(|energy| elastic.analog_to_cutoff_ratio(energy))?;
                    (values, ElectronScatteringDistribution::AnalogElastic(elastic))
                }
                ElasticElectronMode::Cutoff => {
                    let elastic = CutoffElasticDistribution::new(angular, electron.elastic_cutoff_angle_cosine)?;
                    let values = self.scaled_cutoff_cross_section(|energy| elastic.cutoff_fraction(energy))?;
                    (values, ElectronScatteringDistribution::CutoffElastic(elastic))
                }
                ElasticElectronMode::ScreenedRutherford => {
                    let elastic = ScreenedRutherfordElasticDistribution::new(angular, atomic_number);
                    let values = self.scaled_cutoff_cross_section(|energy| elastic.cross_section_ratio(energy))?;
                    (values, ElectronScatteringDistribution::ScreenedRutherfordElastic(elastic))
                }
                ElasticElectronMode::Hybrid => {
                    let elastic = HybridElasticDistribution::new(angular, &self.moment_preserving_builder()?)?;
                    let values = self.scaled_cutoff_cross_section(|energy| elastic.cross_section_ratio(energy))?;
                    (values, ElectronScatteringDistribution::HybridElastic(elastic))
                }
                ElasticElectronMode::MomentPreserving => {
                    let builder = self.moment_preserving_builder()?;
                    let elastic = MomentPreservingElasticDistribution::new(&angular, &builder)?;
                    let values = self.scaled_cutoff_cross_section(|energy| elastic.cross_section_ratio(energy))?;
                    (values, ElectronScatteringDistribution::MomentPreservingElastic(elastic))
                }
            };
            let cross_section = self.cross_section(values, 0.0, reaction_type)?;
            Ok(Reaction::new(reaction_type.into(), cross_section, distribution))
        };
        build().map_err(self.model_error(reaction_type))
    }

    pub fn create_bremsstrahlung_reaction(&self) -> Result<ElectroatomicReaction> {
        let reaction_type = ElectroatomicReactionType::Bremsstrahlung;
        let bank_photons = self.properties.transports(ParticleType::Photon);
        let build = || -> Result<ElectroatomicReaction> {
            let cross_section = self.cross_section(self.data.bremsstrahlung_cross_section()?, 0.0, reaction_type)?;
            let photon_energies = two_d_from_tables(&self.data.bremsstrahlung_tables()?, &self.properties.electron)?;
            let distribution = BremsstrahlungDistribution::new(
                photon_energies,
                self.properties.electron.bremsstrahlung_angular_model,
                self.data.atomic_number(),
                bank_photons,
            );
            let distribution = ElectronScatteringDistribution::Bremsstrahlung(distribution);
            Ok(Reaction::new(reaction_type.into(), cross_section, distribution)
                .with_emitted_particles(EmittedParticles { photons: bank_photons as u32, ..Default::default() }))
        };
        build().map_err(self.model_error(reaction_type))
    }

    pub fn create_atomic_excitation_reaction(&self) -> Result<ElectroatomicReaction> {
        let reaction_type = ElectroatomicReactionType::AtomicExcitation;
        let build = || -> Result<ElectroatomicReaction> {
            let cross_section = self.cross_section(self.data.excitation_cross_section()?, 0.0, reaction_type)?;
            let (energies, loss) = self.data.excitation_energy_loss()?;
            let energy_loss = InterpolationTable::from_x_and_y(energies, loss, InterpolationScheme::LinLin)?;
            Ok(Reaction::new(
                reaction_type.into(),
                cross_section,
                ElectronScatteringDistribution::AtomicExcitation(AtomicExcitationDistribution::new(energy_loss)),
            ))
        };
        build().map_err(self.model_error(reaction_type))
    }

    // One reaction per subshell, each starting above its binding energy
    pub fn create_electroionization_reactions(&self) -> Result<Vec<ElectroatomicReaction>> {
        let subshells = self.data.subshells()?;
        let tables = self.data.electroionization_tables()?;
        if tables.len() != subshells.designators.len() {
            return Err(TransportError::model_construction(
                self.data.source_name(),
                ElectroatomicReactionType::Electroionization,
                format!("{} knock-on tables for {} subshells", tables.len(), subshells.designators.len()),
            ));
        }

        let mut reactions = Vec::with_capacity(tables.len());
        for (index, knock_on_tables) in tables.iter().enumerate() {
            let subshell = Subshell::from(subshells.designators[index]);
            let binding_energy = subshells.binding_energies[index];
            let reaction_type = ElectroatomicReactionType::SubshellElectroionization(subshell);
            let build = || -> Result<ElectroatomicReaction> {
                let values = self.data.electroionization_cross_section(index)?;
                let cross_section = self.cross_section(values, binding_energy, reaction_type)?;
                let knock_on_energies = two_d_from_tables(knock_on_tables, &self.properties.electron)?;
                let distribution = ElectronScatteringDistribution::Electroionization(
                    ElectroionizationSubshellDistribution::new(subshell, binding_energy, knock_on_energies)?,
                );
                Ok(Reaction::new(reaction_type.into(), cross_section, distribution)
                    .with_emitted_particles(EmittedParticles { electrons: 1, ..Default::default() }))
            };
            reactions.push(build().map_err(self.model_error(reaction_type))?);
        }
        Ok(reactions)
    }

    // All reactions, ordered by reaction type
    pub fn create_reactions(&self) -> Result<Vec<ElectroatomicReaction>> {
        let mut reactions = vec![
            self.create_elastic_reaction()?,
            self.create_bremsstrahlung_reaction()?,
            self.create_atomic_excitation_reaction()?,
        ];
        reactions.extend(self.create_electroionization_reactions()?);
        reactions.sort_by_key(|reaction| reaction.reaction_type());
        log::debug!("built {} electroatomic reactions for '{}'", reactions.len(), self.data.source_name());
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
    use crate::reactions::ReactionType;
    use crate::settings::ParticleMode;
    use crate::utils::RngStream;
    use crate::utils::testing::ELECTRON_PHOTON_TEST_TABLE;

    fn properties(mode: ParticleMode, elastic_mode: ElasticElectronMode) -> SimulationProperties {
        let mut properties = SimulationProperties::default();
        properties.general.mode = mode;
        properties.electron.elastic_mode = elastic_mode;
        properties
    }

    #[test]
    fn test_create_reactions() {
        let properties = properties(ParticleMode::Electron, ElasticElectronMode::Analog);
        let factory = ElectroatomicReactionFactory::new(&*ELECTRON_PHOTON_TEST_TABLE, &properties).unwrap();
        let reaction_types: Vec<_> =
            factory.create_reactions().unwrap().iter().map(|reaction| reaction.reaction_type()).collect();
        assert_eq!(
            reaction_types,
            vec![
                ReactionType::from(ElectroatomicReactionType::AnalogElastic),
                ReactionType::from(ElectroatomicReactionType::Bremsstrahlung),
                ReactionType::from(ElectroatomicReactionType::AtomicExcitation),
                ReactionType::from(ElectroatomicReactionType::SubshellElectroionization(Subshell::K)),
                ReactionType::from(ElectroatomicReactionType::SubshellElectroionization(Subshell::L1)),
            ]
        );
    }

    #[test]
    fn test_elastic_cross_sections() {
        let table = &*ELECTRON_PHOTON_TEST_TABLE;

        // Share of each tabulated distribution below mu = 0.9
        let cutoff = properties(ParticleMode::Electron, ElasticElectronMode::Cutoff);
        let reaction = ElectroatomicReactionFactory::new(table, &cutoff).unwrap().create_elastic_reaction().unwrap();
        assert_eq!(reaction.reaction_type(), ReactionType::from(ElectroatomicReactionType::CutoffElastic));
        assert_relative_eq!(reaction.evaluate_cross_section(100.0).unwrap(), 1e3 * 0.1, max_relative = 1e-9);
        assert_relative_eq!(
            reaction.evaluate_cross_section(1e-5).unwrap(),
            2e5 * (0.5 + 0.9 * 0.5 / 0.999999),
            max_relative = 1e-9
        );

        let analog = properties(ParticleMode::Electron, ElasticElectronMode::Analog);
        let reaction = ElectroatomicReactionFactory::new(table, &analog).unwrap().create_elastic_reaction().unwrap();
        let ElectronScatteringDistribution::AnalogElastic(distribution) = reaction.distribution() else {
            panic!("expected analog elastic scattering");
        };
        let ratio = distribution.analog_to_cutoff_ratio(100.0).unwrap();
        assert!(ratio > 1.0);
        assert_relative_eq!(reaction.evaluate_cross_section(100.0).unwrap(), 1e3 * ratio, max_relative = 1e-9);

        let hybrid = properties(ParticleMode::Electron, ElasticElectronMode::Hybrid);
        let reaction = ElectroatomicReactionFactory::new(table, &hybrid).unwrap().create_elastic_reaction().unwrap();
        let ElectronScatteringDistribution::HybridElastic(distribution) = reaction.distribution() else {
            panic!("expected hybrid elastic scattering");
        };
        let ratio = distribution.cross_section_ratio(1e-5).unwrap();
        assert_relative_eq!(reaction.evaluate_cross_section(1e-5).unwrap(), 2e5 * ratio, max_relative = 1e-9);
    }

    #[test]
    fn test_bremsstrahlung_photons_follow_mode() {
        let table = &*ELECTRON_PHOTON_TEST_TABLE;
        let electron_only = properties(ParticleMode::Electron, ElasticElectronMode::Cutoff);
        let reaction =
            ElectroatomicReactionFactory::new(table, &electron_only).unwrap().create_bremsstrahlung_reaction().unwrap();
        assert_eq!(reaction.number_of_emitted_photons(1.0), 0);
        assert_relative_eq!(reaction.evaluate_cross_section(1.0).unwrap(), 5.0, max_relative = 1e-12);

        let coupled = properties(ParticleMode::PhotonElectron, ElasticElectronMode::Cutoff);
        let reaction =
            ElectroatomicReactionFactory::new(table, &coupled).unwrap().create_bremsstrahlung_reaction().unwrap();
        assert_eq!(reaction.number_of_emitted_photons(1.0), 1);

        let mut rng = RngStream::new(StdRng::seed_from_u64(3));
        for _ in 0..50 {
            let mut particle = ParticleState::new(ParticleType::Electron, 50.0);
            let mut bank = ParticleBank::new();
            reaction.react(&mut particle, &mut bank, &mut rng).unwrap();
            let photon = bank.pop().unwrap();
            assert_eq!(photon.particle_type, ParticleType::Photon);
            assert_relative_eq!(particle.energy + photon.energy, 50.0, max_relative = 1e-12);
        }
    }

    #[test]
    fn test_atomic_excitation() {
        let properties = properties(ParticleMode::Electron, ElasticElectronMode::Cutoff);
        let reaction = ElectroatomicReactionFactory::new(&*ELECTRON_PHOTON_TEST_TABLE, &properties)
            .unwrap()
            .create_atomic_excitation_reaction()
            .unwrap();
        let mut particle = ParticleState::new(ParticleType::Electron, 100.0);
        let mut bank = ParticleBank::new();
        let mut rng = RngStream::new(StdRng::seed_from_u64(1));
        reaction.react(&mut particle, &mut bank, &mut rng).unwrap();
        assert_relative_eq!(particle.energy, 100.0 - 2e-5, max_relative = 1e-12);
        assert_eq!(particle.collision_number, 1);
        assert!(bank.is_empty());
    }

    #[test]
    fn test_electroionization_starts_above_binding_energy() {
        let properties = properties(ParticleMode::Electron, ElasticElectronMode::Cutoff);
        let reactions = ElectroatomicReactionFactory::new(&*ELECTRON_PHOTON_TEST_TABLE, &properties)
            .unwrap()
            .create_electroionization_reactions()
            .unwrap();
        assert_eq!(reactions.len(), 2);
        let k_shell = &reactions[0];
        assert_eq!(k_shell.cross_section().threshold_index(), 1);
        assert_eq!(k_shell.evaluate_cross_section(1e-5).unwrap(), 0.0);
        assert_relative_eq!(k_shell.evaluate_cross_section(100.0).unwrap(), 50.0, max_relative = 1e-12);
        assert_eq!(k_shell.number_of_emitted_electrons(10.0), 1);

        let mut rng = RngStream::new(StdRng::seed_from_u64(11));
        let mut particle = ParticleState::new(ParticleType::Electron, 100.0);
        let mut bank = ParticleBank::new();
        let subshell = k_shell.react(&mut particle, &mut bank, &mut rng).unwrap();
        assert_eq!(subshell, Some(Subshell::K));
        let knock_on = bank.pop().unwrap();
        assert_eq!(knock_on.particle_type, ParticleType::Electron);
        assert_relative_eq!(particle.energy + knock_on.energy + 2.9e-4, 100.0, max_relative = 1e-12);
    }
}
