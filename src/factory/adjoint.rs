use crate::error::{Result, TransportError};
use crate::interpolation::{InterpolationScheme, InterpolationTable};
use crate::reactions::{AdjointElectroatomicReactionType, Reaction};
use crate::scattering::adjoint::{
    AdjointAtomicExcitationDistribution, AdjointBremsstrahlungDistribution, AdjointElasticDistribution,
    AdjointElectronScatteringDistribution,
};
use crate::scattering::electron::CutoffElasticDistribution;
use crate::settings::SimulationProperties;

use super::electron::two_d_from_tables;
use super::{ElectroatomicReactionFactory, ElectronDataSource};

pub type AdjointElectroatomicReaction = Reaction<AdjointElectronScatteringDistribution>;

//=====================================================================
// Adjoint electroatomic reactions built from the forward electron
// data: elastic reuses the cutoff angles, bremsstrahlung and atomic
// excitation turn the forward energy losses into energy gains.
// Nothing is built unless adjoint transport is enabled.
//=====================================================================
pub struct AdjointElectroatomicReactionFactory<'a, S: ElectronDataSource + ?Sized> {
    forward: ElectroatomicReactionFactory<'a, S>,
    data: &'a S,
    properties: &'a SimulationProperties,
}

impl<'a, S: ElectronDataSource + ?Sized> AdjointElectroatomicReactionFactory<'a, S> {
    pub fn new(data: &'a S, properties: &'a SimulationProperties) -> Result<Self> {
        Ok(Self { forward: ElectroatomicReactionFactory::new(data, properties)?, data, properties })
    }

    fn model_error(
        &self,
        reaction_type: AdjointElectroatomicReactionType,
    ) -> impl Fn(TransportError) -> TransportError + '_ {
        move |err| TransportError::model_construction(self.data.source_name(), reaction_type, err)
    }

    pub fn create_elastic_reaction(&self) -> Result<AdjointElectroatomicReaction> {
        let reaction_type = AdjointElectroatomicReactionType::Elastic;
        let build = || -> Result<AdjointElectroatomicReaction> {
            let cutoff = CutoffElasticDistribution::new(
                self.forward.elastic_angular()?,
                self.properties.electron.elastic_cutoff_angle_cosine,
            )?;
            let values = self.forward.scaled_cutoff_cross_section(|energy| cutoff.cutoff_fraction(energy))?;
            let cross_section = self.forward.cross_section(values, 0.0, reaction_type)?;
            Ok(Reaction::new(
                reaction_type.into(),
                cross_section,
                AdjointElectronScatteringDistribution::Elastic(AdjointElasticDistribution::new(cutoff)),
            ))
        };
        build().map_err(self.model_error(reaction_type))
    }

    // Gains are tabulated like the forward photon energies
    pub fn create_bremsstrahlung_reaction(&self) -> Result<AdjointElectroatomicReaction> {
        let reaction_type = AdjointElectroatomicReactionType::Bremsstrahlung;
        let build = || -> Result<AdjointElectroatomicReaction> {
            let cross_section =
                self.forward.cross_section(self.data.bremsstrahlung_cross_section()?, 0.0, reaction_type)?;
            let energy_gains = two_d_from_tables(&self.data.bremsstrahlung_tables()?, &self.properties.electron)?;
            Ok(Reaction::new(
                reaction_type.into(),
                cross_section,
                AdjointElectronScatteringDistribution::Bremsstrahlung(AdjointBremsstrahlungDistribution::new(
                    energy_gains,
                )),
            ))
        };
        build().map_err(self.model_error(reaction_type))
    }

    pub fn create_atomic_excitation_reaction(&self) -> Result<AdjointElectroatomicReaction> {
        let reaction_type = AdjointElectroatomicReactionType::AtomicExcitation;
        let build = || -> Result<AdjointElectroatomicReaction> {
            let cross_section =
                self.forward.cross_section(self.data.excitation_cross_section()?, 0.0, reaction_type)?;
            let (energies, gain) = self.data.excitation_energy_loss()?;
            let energy_gain = InterpolationTable::from_x_and_y(energies, gain, InterpolationScheme::LinLin)?;
            Ok(Reaction::new(
                reaction_type.into(),
                cross_section,
                AdjointElectronScatteringDistribution::AtomicExcitation(AdjointAtomicExcitationDistribution::new(
                    energy_gain,
                )),
            ))
        };
        build().map_err(self.model_error(reaction_type))
    }

    pub fn create_reactions(&self) -> Result<Vec<AdjointElectroatomicReaction>> {
        if !self.properties.adjoint.enabled {
            log::debug!("adjoint transport is disabled, no adjoint reactions for '{}'", self.data.source_name());
            return Ok(Vec::new());
        }
        let mut reactions = vec![
            self.create_elastic_reaction()?,
            self.create_bremsstrahlung_reaction()?,
            self.create_atomic_excitation_reaction()?,
        ];
        reactions.sort_by_key(|reaction| reaction.reaction_type());
        Ok(reactions)
    }
}
