use std::collections::HashMap;
use std::sync::Arc;

use dashmap::DashMap;
use rayon::prelude::*;

use crate::blocks::{
    ExitingNeutronData, ExitingNeutronFrameOfReference, NeutronBlock, NeutronTableExtractor, NumberOfExitingNeutrons,
};
use crate::error::{Result, TransportError};
use crate::factory::{angular_from_land, build_energy_law, read_index, read_slice, read_value};
use crate::interpolation::InterpolationTable;
use crate::reactions::{CrossSection, Multiplicity, NuclearReactionType, Reaction};
use crate::scattering::neutron::{
    DelayedNeutronEmission, ElasticNeutronScattering, EnergyLaw, FissionNeutronScattering, InelasticNeutronScattering,
    NeutronAngularDistribution, NeutronScatteringDistribution,
};
use crate::settings::SimulationProperties;
use crate::utils::HashGridSearcher;

pub type NeutronReaction = Reaction<NeutronScatteringDistribution>;

//=====================================================================
// Builds the neutron reactions of one continuous-energy table.
//
// Reactions follow the MTR order: the first NR of them release
// neutrons and own LAND/LDLW entries (LAND[0] belongs to elastic), the
// rest only carry a cross section. All cross sections share the ESZ
// energy grid and one hash grid searcher.
//=====================================================================
pub struct NeutronReactionFactory<'a> {
    table: &'a NeutronTableExtractor,
    atomic_weight_ratio: f64,
    energy_grid: Arc<Vec<f64>>,
    grid_searcher: Option<Arc<HashGridSearcher>>,
}

impl<'a> NeutronReactionFactory<'a> {
    pub fn new(
        table: &'a NeutronTableExtractor,
        atomic_weight_ratio: f64,
        properties: &SimulationProperties,
    ) -> Result<Self> {
        let energy_grid = Arc::new(table.extract_energy_grid()?.to_vec());
        let grid_searcher = match properties.general.hash_grid_bins {
            0 => None,
            bins => Some(Arc::new(HashGridSearcher::new(energy_grid.clone(), bins)?)),
        };
        Ok(Self { table, atomic_weight_ratio, energy_grid, grid_searcher })
    }

    pub fn energy_grid(&self) -> &Arc<Vec<f64>> {
        &self.energy_grid
    }

    fn context(&self, block: &str, reaction_type: NuclearReactionType) -> String {
        format!("{} block of table '{}' ({})", block, self.table.table_name(), reaction_type)
    }

    fn cross_section(&self, threshold_index: usize, values: Vec<f64>) -> Result<CrossSection> {
        let cross_section = CrossSection::new(self.energy_grid.clone(), values, threshold_index)?;
        match &self.grid_searcher {
            Some(searcher) => cross_section.with_grid_searcher(searcher.clone()),
            None => Ok(cross_section),
        }
    }

    fn model_error(&self, reaction_type: NuclearReactionType) -> impl Fn(TransportError) -> TransportError + '_ {
        move |err| TransportError::model_construction(self.table.table_name(), reaction_type, err)
    }

    pub fn create_elastic_reaction(&self) -> Result<NeutronReaction> {
        let reaction_type = NuclearReactionType::Elastic;
        self.elastic_reaction().map_err(self.model_error(reaction_type))
    }

    fn elastic_reaction(&self) -> Result<NeutronReaction> {
        let reaction_type = NuclearReactionType::Elastic;
        let context = self.context("LAND", reaction_type);
        let land_entry = read_value(self.table.extract_land_block(), 0, &context)?;
        let angular = angular_from_land(self.table.extract_and_block(), land_entry, &context)?
            .ok_or_else(|| TransportError::data_integrity(&context, "elastic angles cannot come with an energy law"))?;
        let cross_section = self.cross_section(0, self.table.extract_elastic_cross_section()?.to_vec())?;
        let distribution = ElasticNeutronScattering::new(self.atomic_weight_ratio, angular)?;
        Ok(Reaction::new(reaction_type.into(), cross_section, NeutronScatteringDistribution::Elastic(distribution)))
    }

    // Reaction at position `index` of MTR
    pub fn create_reaction(&self, index: usize) -> Result<NeutronReaction> {
        let mt_numbers = self.table.extract_mt_numbers()?;
        let mt = *mt_numbers.get(index).ok_or_else(|| {
            TransportError::data_integrity(
                format!("MTR block of table '{}'", self.table.table_name()),
                format!("no reaction at position {} of {}", index, mt_numbers.len()),
            )
        })?;
        let reaction_type = NuclearReactionType::from(mt);
        self.reaction(index, reaction_type).map_err(self.model_error(reaction_type))
    }

    fn reaction(&self, index: usize, reaction_type: NuclearReactionType) -> Result<NeutronReaction> {
        let q_value = read_value(self.table.extract_q_values(), index, &self.context("LQR", reaction_type))?;
        let tyr = read_value(self.table.extract_tyr_block(), index, &self.context("TYR", reaction_type))?;
        let exiting = ExitingNeutronData::from_tyr(tyr, reaction_type.mt())?;
        if exiting.neutron_release != NumberOfExitingNeutrons::Absorption && index >= self.table.nxs().nr {
            return Err(TransportError::data_integrity(
                self.context("TYR", reaction_type),
                format!("releases neutrons but is not among the first {} reactions", self.table.nxs().nr),
            ));
        }

        let tabulated = self.table.extract_reaction_cross_section(index)?;
        let cross_section = self.cross_section(tabulated.threshold_index, tabulated.values)?;

        let frame = exiting.frame_of_reference;
        let (distribution, multiplicity) = match exiting.neutron_release {
            NumberOfExitingNeutrons::Absorption => (NeutronScatteringDistribution::Absorption, Multiplicity::Absorption),
            NumberOfExitingNeutrons::Discrete(count) => (
                NeutronScatteringDistribution::Inelastic(self.inelastic(index, reaction_type, frame)?),
                Multiplicity::Fixed(count),
            ),
            NumberOfExitingNeutrons::EnergyDependent => (
                NeutronScatteringDistribution::Inelastic(self.inelastic(index, reaction_type, frame)?),
                Multiplicity::EnergyDependent(self.energy_dependent_yield(tyr, reaction_type)?),
            ),
            NumberOfExitingNeutrons::Fission => self.fission(index, reaction_type, frame)?,
        };
        log::debug!(
            "table '{}': {} with Q = {} MeV, {} from energy index {}",
            self.table.table_name(),
            reaction_type,
            q_value,
            multiplicity,
            cross_section.threshold_index()
        );

        Ok(Reaction::new(reaction_type.into(), cross_section, distribution)
            .with_q_value(q_value)
            .with_multiplicity(multiplicity))
    }

    fn inelastic(
        &self,
        index: usize,
        reaction_type: NuclearReactionType,
        frame: ExitingNeutronFrameOfReference,
    ) -> Result<InelasticNeutronScattering> {
        let land_context = self.context("LAND", reaction_type);
        let land_entry = read_value(self.table.extract_land_block(), index + 1, &land_context)?;
        let angular = angular_from_land(self.table.extract_and_block(), land_entry, &land_context)?;

        let dlw_context = self.context("DLW", reaction_type);
        let locator = read_index(self.table.extract_ldlw_block(), index, &self.context("LDLW", reaction_type))?;
        let law = build_energy_law(self.table.extract_dlw_block(), locator, &dlw_context)?;

        let angular = match (angular, &law) {
            (Some(angular), _) => angular,
            // Never sampled, the law returns the cosine
            (None, EnergyLaw::KalbachMann(_)) => NeutronAngularDistribution::isotropic(),
            (None, law) => {
                return Err(TransportError::data_integrity(
                    land_context,
                    format!("angles are given with the energy law but law {} has none", law.law()),
                ));
            }
        };
        InelasticNeutronScattering::new(self.atomic_weight_ratio, frame, angular, law)
    }

    // |TYR| - 101 is the start of the yield table relative to DLW
    fn energy_dependent_yield(&self, tyr: f64, reaction_type: NuclearReactionType) -> Result<InterpolationTable> {
        let context = self.context("DLW", reaction_type);
        let start = ExitingNeutronData::yield_table_offset(tyr)
            .and_then(|offset| offset.checked_sub(1))
            .ok_or_else(|| TransportError::data_integrity(&context, format!("TYR = {} has no yield table", tyr)))?;
        let dlw = self.table.extract_dlw_block();
        let length = InterpolationTable::get_table_length(start, dlw)?;
        Ok(InterpolationTable::process(read_slice(dlw, start, length, &context)?)?)
    }

    fn fission(
        &self,
        index: usize,
        reaction_type: NuclearReactionType,
        frame: ExitingNeutronFrameOfReference,
    ) -> Result<(NeutronScatteringDistribution, Multiplicity)> {
        let nu = self
            .table
            .extract_nu()?
            .ok_or_else(|| TransportError::missing_block(self.table.table_name(), NeutronBlock::NU))?;
        let delayed_nu = self.table.extract_delayed_nu()?;
        let delayed = match delayed_nu {
            Some(_) => self.delayed_emission()?,
            None => None,
        };
        let prompt = self.inelastic(index, reaction_type, frame)?;
        let distribution = FissionNeutronScattering::new(prompt, nu.clone(), delayed_nu.clone(), delayed);
        Ok((NeutronScatteringDistribution::Fission(distribution), Multiplicity::Fission { nu, delayed_nu }))
    }

    // Precursor groups from BDD with their spectra from DNEDL/DNED
    fn delayed_emission(&self) -> Result<Option<DelayedNeutronEmission>> {
        let groups = self.table.extract_precursor_groups()?;
        if groups.is_empty() {
            return Ok(None);
        }
        let table_name = self.table.table_name();
        let dnedl_context = format!("DNEDL block of table '{}'", table_name);
        let dned_context = format!("DNED block of table '{}'", table_name);
        let dnedl = self.table.extract_dnedl_block();
        let dned = self.table.extract_dned_block();
        let spectra = (0..groups.len())
            .map(|group| build_energy_law(dned, read_index(dnedl, group, &dnedl_context)?, &dned_context))
            .collect::<Result<Vec<_>>>()?;
        DelayedNeutronEmission::new(groups, spectra).map(Some)
    }

    //=================================================================
    // All reactions of the table, elastic included. Summation MTs are
    // skipped. The remaining reactions are built in parallel; one that
    // fails is reported and left out without affecting the others.
    //=================================================================
    pub fn create_reactions(&self) -> Result<HashMap<NuclearReactionType, NeutronReaction>> {
        let reactions = DashMap::new();
        reactions.insert(NuclearReactionType::Elastic, self.create_elastic_reaction()?);

        let mt_numbers = self.table.extract_mt_numbers()?;
        mt_numbers.par_iter().enumerate().for_each(|(index, &mt)| {
            let reaction_type = NuclearReactionType::from(mt);
            if reaction_type.is_summation() {
                log::debug!("table '{}': skipping summation {}", self.table.table_name(), reaction_type);
                return;
            }
            match self.reaction(index, reaction_type).map_err(self.model_error(reaction_type)) {
                Ok(reaction) => {
                    reactions.insert(reaction_type, reaction);
                }
                Err(err) => log::warn!("{}", err),
            }
        });

        // Convert DashMap back to a standard HashMap
        Ok(reactions.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::{assert_abs_diff_eq, assert_relative_eq};

    use crate::arrays::Arrays;
    use crate::particle::{ParticleBank, ParticleState, ParticleType};
    use crate::reactions::ReactionType;
    use crate::utils::MockRng;
    use crate::utils::testing::{NEUTRON_TEST_TABLE, TEST_ATOMIC_WEIGHT_RATIO, neutron_test_arrays};

    fn factory(table: &NeutronTableExtractor) -> NeutronReactionFactory<'_> {
        NeutronReactionFactory::new(table, TEST_ATOMIC_WEIGHT_RATIO, &SimulationProperties::default()).unwrap()
    }

    #[test]
    fn test_create_reactions() {
        let reactions = factory(&NEUTRON_TEST_TABLE).create_reactions().unwrap();
        assert_eq!(reactions.len(), 4);
        for mt in [2, 51, 18, 102] {
            assert!(reactions.contains_key(&NuclearReactionType::from(mt)));
        }

        let elastic = &reactions[&NuclearReactionType::Elastic];
        assert_abs_diff_eq!(elastic.evaluate_cross_section(1.0).unwrap(), 4.2, epsilon = 1e-12);
        assert!(matches!(elastic.distribution(), NeutronScatteringDistribution::Elastic(_)));

        let capture = &reactions[&NuclearReactionType::Capture];
        assert_eq!(capture.q_value(), 6.0);
        assert!(matches!(capture.multiplicity(), Multiplicity::Absorption));
    }

    #[test]
    fn test_level_inelastic_reaction() {
        let reaction = factory(&NEUTRON_TEST_TABLE).create_reaction(0).unwrap();
        assert_eq!(reaction.threshold_energy(), 1.0);
        assert_eq!(reaction.q_value(), -4.5);
        assert_abs_diff_eq!(reaction.evaluate_cross_section(5.0).unwrap(), 0.8 * 4.0 / 19.0, epsilon = 1e-12);

        // Isotropic CM cosine 0 then the azimuth
        let mut neutron = ParticleState::new(ParticleType::Neutron, 5.0);
        let mut bank = ParticleBank::new();
        let mut rng = MockRng::new(vec![0.5, 0.0]);
        reaction.react(&mut neutron, &mut bank, &mut rng).unwrap();
        let expected = 0.10368968211045047 + 5.0 / (12.9 * 12.9);
        assert_relative_eq!(neutron.energy, expected, max_relative = 1e-12);
        assert_eq!(neutron.collision_number, 1);
        assert!(bank.is_empty());
    }

    #[test]
    fn test_fission_reaction() {
        let reaction = factory(&NEUTRON_TEST_TABLE).create_reaction(1).unwrap();
        assert_eq!(reaction.reaction_type(), ReactionType::from(NuclearReactionType::Fission));
        assert_abs_diff_eq!(reaction.multiplicity().average(1e-11).unwrap(), 2.515, epsilon = 1e-12);

        let NeutronScatteringDistribution::Fission(fission) = reaction.distribution() else {
            panic!("expected fission");
        };
        assert_abs_diff_eq!(fission.delayed_fraction(1e-11).unwrap(), 0.015 / 2.515, epsilon = 1e-12);
    }

    #[test]
    fn test_capture_kills() {
        let reaction = factory(&NEUTRON_TEST_TABLE).create_reaction(2).unwrap();
        let mut neutron = ParticleState::new(ParticleType::Neutron, 1.0);
        let mut bank = ParticleBank::new();
        reaction.react(&mut neutron, &mut bank, &mut MockRng::new(vec![])).unwrap();
        assert!(!neutron.is_alive());
        assert!(bank.is_empty());
        assert!(factory(&NEUTRON_TEST_TABLE).create_reaction(3).is_err());
    }

    #[test]
    fn test_failing_reaction_does_not_affect_others() {
        // Point the MT 51 LDLW locator past the end of DLW
        let arrays = neutron_test_arrays();
        let mut xss = arrays.xss.as_ref().clone();
        xss[90] = 500.0;
        let broken = NeutronTableExtractor::new(Arrays::new("broken", &arrays.nxs.0, &arrays.jxs.0, xss).unwrap()).unwrap();

        let err = factory(&broken).create_reaction(0).unwrap_err();
        assert!(matches!(err, TransportError::ModelConstruction { ref table, ref reaction, .. }
            if table == "broken" && reaction == "MT 51"));

        let reactions = factory(&broken).create_reactions().unwrap();
        assert_eq!(reactions.len(), 3);
        assert!(!reactions.contains_key(&NuclearReactionType::from(51)));
    }

    #[test]
    fn test_without_grid_searcher() {
        let mut properties = SimulationProperties::default();
        properties.general.hash_grid_bins = 0;
        let factory = NeutronReactionFactory::new(&NEUTRON_TEST_TABLE, TEST_ATOMIC_WEIGHT_RATIO, &properties).unwrap();
        let reaction = factory.create_reaction(2).unwrap();
        assert_abs_diff_eq!(reaction.evaluate_cross_section(10.5).unwrap(), 0.15, epsilon = 1e-12);
    }
}
