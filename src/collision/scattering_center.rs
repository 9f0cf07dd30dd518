//=====================================================================
// A nuclide or an atom: the reactions of one table, ordered by
// reaction type, with the total cross section as their sum.
//=====================================================================

use anyhow::Context;

use crate::blocks::{ElectronPhotonTableExtractor, NeutronTableExtractor};
use crate::error::{Result, TransportError};
use crate::factory::{
    AdjointElectroatomicReactionFactory, ElectroatomicReactionFactory, ElectronDataSource, NeutronReactionFactory,
    PhotoatomicReactionFactory,
};
use crate::particle::{ParticleBank, ParticleState};
use crate::reactions::{Reaction, ReactionType};
use crate::scattering::adjoint::AdjointElectronScatteringDistribution;
use crate::scattering::electron::ElectronScatteringDistribution;
use crate::scattering::neutron::NeutronScatteringDistribution;
use crate::scattering::photon::PhotonScatteringDistribution;
use crate::scattering::{ScatterAdjoint, ScatterParticle, Subshell};
use crate::settings::SimulationProperties;
use crate::utils::RandomNumberStream;

#[derive(Clone, Debug)]
pub struct ScatteringCenter<D> {
    name: String,
    reactions: Vec<Reaction<D>>,
}

pub type Nuclide = ScatteringCenter<NeutronScatteringDistribution>;
pub type Photoatom = ScatteringCenter<PhotonScatteringDistribution>;
pub type Electroatom = ScatteringCenter<ElectronScatteringDistribution>;
pub type AdjointElectroatom = ScatteringCenter<AdjointElectronScatteringDistribution>;

impl<D> ScatteringCenter<D> {
    pub fn new(name: impl Into<String>, mut reactions: Vec<Reaction<D>>) -> Result<Self> {
        let name = name.into();
        if reactions.is_empty() {
            return Err(TransportError::data_integrity(format!("scattering center '{}'", name), "no reactions"));
        }
        reactions.sort_by_key(|reaction| reaction.reaction_type());
        Ok(Self { name, reactions })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn reactions(&self) -> &[Reaction<D>] {
        &self.reactions
    }

    pub fn reaction(&self, reaction_type: impl Into<ReactionType>) -> Option<&Reaction<D>> {
        let reaction_type = reaction_type.into();
        self.reactions
            .binary_search_by_key(&reaction_type, |reaction| reaction.reaction_type())
            .ok()
            .map(|index| &self.reactions[index])
    }

    pub fn total_cross_section(&self, energy: f64) -> Result<f64> {
        self.reactions.iter().map(|reaction| reaction.evaluate_cross_section(energy)).sum()
    }

    // One draw, proportional to the reaction cross sections at `energy`
    pub fn sample_reaction<R: RandomNumberStream + ?Sized>(&self, energy: f64, rng: &mut R) -> Result<&Reaction<D>> {
        let cross_sections =
            self.reactions.iter().map(|reaction| reaction.evaluate_cross_section(energy)).collect::<Result<Vec<_>>>()?;
        let total: f64 = cross_sections.iter().sum();
        if !(total > 0.0) {
            return Err(TransportError::data_integrity(
                format!("scattering center '{}'", self.name),
                format!("no reaction is open at {} MeV", energy),
            ));
        }

        let target = rng.next_uniform() * total;
        let mut cumulative = 0.0;
        let mut last_open = 0;
        for (index, &cross_section) in cross_sections.iter().enumerate() {
            if cross_section > 0.0 {
                last_open = index;
            }
            cumulative += cross_section;
            if cumulative > target {
                return Ok(&self.reactions[index]);
            }
        }
        // Rounding in the cumulative sum
        Ok(&self.reactions[last_open])
    }
}

impl<D: ScatterParticle> ScatteringCenter<D> {
    pub fn collide<R: RandomNumberStream + ?Sized>(
        &self,
        particle: &mut ParticleState,
        bank: &mut ParticleBank,
        rng: &mut R,
    ) -> Result<Option<Subshell>> {
        self.sample_reaction(particle.energy, rng)?.react(particle, bank, rng)
    }
}

impl<D: ScatterAdjoint> ScatteringCenter<D> {
    pub fn collide_adjoint<R: RandomNumberStream + ?Sized>(
        &self,
        particle: &mut ParticleState,
        bank: &mut ParticleBank,
        rng: &mut R,
    ) -> Result<Option<Subshell>> {
        self.sample_reaction(particle.energy, rng)?.react_adjoint(particle, bank, rng)
    }
}

impl Nuclide {
    pub fn from_neutron_table(
        table: &NeutronTableExtractor,
        atomic_weight_ratio: f64,
        properties: &SimulationProperties,
    ) -> anyhow::Result<Self> {
        let reactions = NeutronReactionFactory::new(table, atomic_weight_ratio, properties)
            .and_then(|factory| factory.create_reactions())
            .with_context(|| format!("Could not build the neutron reactions of '{}'", table.table_name()))?;
        Ok(Self::new(table.table_name(), reactions.into_values().collect())?)
    }
}

impl Photoatom {
    pub fn from_electron_photon_table(
        table: &ElectronPhotonTableExtractor,
        properties: &SimulationProperties,
    ) -> anyhow::Result<Self> {
        let reactions = PhotoatomicReactionFactory::new(table, properties)
            .and_then(|factory| factory.create_reactions())
            .with_context(|| format!("Could not build the photoatomic reactions of '{}'", table.table_name()))?;
        Ok(Self::new(table.table_name(), reactions)?)
    }
}

impl Electroatom {
    pub fn from_electron_data<S: ElectronDataSource + ?Sized>(
        data: &S,
        properties: &SimulationProperties,
    ) -> anyhow::Result<Self> {
        let reactions = ElectroatomicReactionFactory::new(data, properties)
            .and_then(|factory| factory.create_reactions())
            .with_context(|| format!("Could not build the electroatomic reactions of '{}'", data.source_name()))?;
        Ok(Self::new(data.source_name(), reactions)?)
    }
}

impl AdjointElectroatom {
    pub fn from_electron_data<S: ElectronDataSource + ?Sized>(
        data: &S,
        properties: &SimulationProperties,
    ) -> anyhow::Result<Self> {
        let reactions = AdjointElectroatomicReactionFactory::new(data, properties)
            .and_then(|factory| factory.create_reactions())
            .with_context(|| {
                format!("Could not build the adjoint electroatomic reactions of '{}'", data.source_name())
            })?;
        Ok(Self::new(data.source_name(), reactions)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::particle::ParticleType;
    use crate::reactions::NuclearReactionType;
    use crate::utils::MockRng;
    use crate::utils::testing::{NEUTRON_TEST_TABLE, TEST_ATOMIC_WEIGHT_RATIO};

    fn nuclide() -> Nuclide {
        Nuclide::from_neutron_table(&NEUTRON_TEST_TABLE, TEST_ATOMIC_WEIGHT_RATIO, &SimulationProperties::default())
            .unwrap()
    }

    #[test]
    fn test_reactions_are_ordered() {
        let nuclide = nuclide();
        assert_eq!(nuclide.name(), "6012.test");
        let mts: Vec<_> = nuclide
            .reactions()
            .iter()
            .map(|reaction| match reaction.reaction_type() {
                ReactionType::Nuclear(reaction_type) => reaction_type.mt(),
                other => panic!("unexpected {}", other),
            })
            .collect();
        assert_eq!(mts, vec![2, 18, 51, 102]);
        assert!(nuclide.reaction(NuclearReactionType::Capture).is_some());
        assert!(nuclide.reaction(NuclearReactionType::N2N).is_none());
    }

    #[test]
    fn test_total_cross_section_is_the_sum() {
        // Elastic 4.2, fission 0.8, MT 51 at its threshold 0.0, capture 0.2
        assert_relative_eq!(nuclide().total_cross_section(1.0).unwrap(), 5.2, max_relative = 1e-12);
    }

    #[test]
    fn test_sample_reaction() {
        let nuclide = nuclide();
        let sampled = |random_number: f64| {
            let mut rng = MockRng::new(vec![random_number]);
            nuclide.sample_reaction(1.0, &mut rng).unwrap().reaction_type()
        };
        assert_eq!(sampled(0.1), ReactionType::from(NuclearReactionType::Elastic));
        assert_eq!(sampled(0.9), ReactionType::from(NuclearReactionType::Fission));
        assert_eq!(sampled(0.99), ReactionType::from(NuclearReactionType::Capture));
        assert!(nuclide.sample_reaction(-1.0, &mut MockRng::new(vec![0.5])).is_err());
    }

    #[test]
    fn test_capture_collision() {
        let nuclide = nuclide();
        let mut particle = ParticleState::new(ParticleType::Neutron, 1.0);
        let mut bank = ParticleBank::new();
        nuclide.collide(&mut particle, &mut bank, &mut MockRng::new(vec![0.99])).unwrap();
        assert!(!particle.is_alive());
        assert_eq!(particle.collision_number, 1);
        assert!(bank.is_empty());
    }

    #[test]
    fn test_empty_center_is_rejected() {
        let reactions: Vec<Reaction<NeutronScatteringDistribution>> = Vec::new();
        assert!(ScatteringCenter::new("empty", reactions).is_err());
    }
}
