use crate::error::Result;
use crate::particle::{ParticleBank, ParticleState};
use crate::reactions::{CrossSection, Multiplicity, ReactionType};
use crate::scattering::{ScatterAdjoint, ScatterParticle, Subshell};
use crate::utils::RandomNumberStream;

// Secondary particles a reaction creates per collision, besides the
// particles counted by its multiplicity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EmittedParticles {
    pub photons: u32,
    pub electrons: u32,
    pub positrons: u32,
}

//=====================================================================
// A reaction couples a cross section to the scattering distribution it
// samples from. `D` carries the capability the collision needs:
// forward reactions need ScatterParticle, adjoint ones ScatterAdjoint.
//=====================================================================
#[derive(Clone, Debug)]
pub struct Reaction<D> {
    reaction_type: ReactionType,
    q_value: f64,
    cross_section: CrossSection,
    multiplicity: Multiplicity,
    emitted: EmittedParticles,
    distribution: D,
}

impl<D> Reaction<D> {
    pub fn new(reaction_type: ReactionType, cross_section: CrossSection, distribution: D) -> Self {
        Self {
            reaction_type,
            q_value: 0.0,
            cross_section,
            multiplicity: Multiplicity::Fixed(1),
            emitted: EmittedParticles::default(),
            distribution,
        }
    }

    pub fn with_q_value(mut self, q_value: f64) -> Self {
        self.q_value = q_value;
        self
    }

    pub fn with_multiplicity(mut self, multiplicity: Multiplicity) -> Self {
        self.multiplicity = multiplicity;
        self
    }

    pub fn with_emitted_particles(mut self, emitted: EmittedParticles) -> Self {
        self.emitted = emitted;
        self
    }

    pub fn reaction_type(&self) -> ReactionType {
        self.reaction_type
    }

    pub fn q_value(&self) -> f64 {
        self.q_value
    }

    pub fn cross_section(&self) -> &CrossSection {
        &self.cross_section
    }

    pub fn multiplicity(&self) -> &Multiplicity {
        &self.multiplicity
    }

    pub fn distribution(&self) -> &D {
        &self.distribution
    }

    pub fn threshold_energy(&self) -> f64 {
        self.cross_section.threshold_energy()
    }

    // Microscopic cross section (barns), zero below threshold
    pub fn evaluate_cross_section(&self, energy: f64) -> Result<f64> {
        self.cross_section.evaluate(energy)
    }

    fn emitted_below_threshold(&self, energy: f64, count: u32) -> u32 {
        if energy < self.threshold_energy() { 0 } else { count }
    }

    pub fn number_of_emitted_photons(&self, energy: f64) -> u32 {
        self.emitted_below_threshold(energy, self.emitted.photons)
    }

    pub fn number_of_emitted_electrons(&self, energy: f64) -> u32 {
        self.emitted_below_threshold(energy, self.emitted.electrons)
    }

    pub fn number_of_emitted_positrons(&self, energy: f64) -> u32 {
        self.emitted_below_threshold(energy, self.emitted.positrons)
    }
}

impl<D: ScatterParticle> Reaction<D> {
    // Copies beyond the first are scattered and banked before the
    // incoming particle itself is scattered
    pub fn react<R: RandomNumberStream + ?Sized>(
        &self,
        particle: &mut ParticleState,
        bank: &mut ParticleBank,
        rng: &mut R,
    ) -> Result<Option<Subshell>> {
        let count = self.multiplicity.sample(particle.energy, rng)?;
        if count == 0 {
            particle.increment_collision_number();
            particle.kill();
            return Ok(None);
        }
        for _ in 1..count {
            let mut copy = particle.spawn_copy();
            self.distribution.scatter(&mut copy, bank, rng)?;
            bank.push(copy);
        }
        let subshell = self.distribution.scatter(particle, bank, rng)?;
        particle.increment_collision_number();
        Ok(subshell)
    }
}

impl<D: ScatterAdjoint> Reaction<D> {
    pub fn react_adjoint<R: RandomNumberStream + ?Sized>(
        &self,
        particle: &mut ParticleState,
        bank: &mut ParticleBank,
        rng: &mut R,
    ) -> Result<Option<Subshell>> {
        let subshell = self.distribution.scatter_adjoint(particle, bank, rng)?;
        particle.increment_collision_number();
        Ok(subshell)
    }
}

impl<D> std::fmt::Display for Reaction<D> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Reaction({}, Q = {}, threshold = {} MeV, {})",
            self.reaction_type,
            self.q_value,
            self.threshold_energy(),
            self.multiplicity
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Arc;

    use approx::assert_relative_eq;

    use crate::blocks::ExitingNeutronFrameOfReference;
    use crate::interpolation::{InterpolationScheme, InterpolationTable};
    use crate::particle::ParticleType;
    use crate::reactions::{AdjointElectroatomicReactionType, NuclearReactionType, PhotoatomicReactionType};
    use crate::scattering::adjoint::AdjointAtomicExcitationDistribution;
    use crate::scattering::neutron::{EnergyLaw, InelasticNeutronScattering, LevelScattering, NeutronAngularDistribution};
    use crate::scattering::photon::ThompsonScattering;
    use crate::utils::MockRng;

    fn cross_section() -> CrossSection {
        CrossSection::new(Arc::new(vec![1e-3, 1.0, 2.0, 20.0]), vec![0.5, 1.0, 1.5], 1).unwrap()
    }

    // Lab frame n,2n with a fixed outgoing energy
    fn n2n() -> Reaction<InelasticNeutronScattering> {
        let distribution = InelasticNeutronScattering::new(
            11.9,
            ExitingNeutronFrameOfReference::Laboratory,
            NeutronAngularDistribution::isotropic(),
            EnergyLaw::LevelScattering(LevelScattering::new(1.0, 0.5)),
        )
        .unwrap();
        Reaction::new(NuclearReactionType::N2N.into(), cross_section(), distribution)
            .with_q_value(-1.0)
            .with_multiplicity(Multiplicity::Fixed(2))
    }

    #[test]
    fn test_cross_section_threshold() {
        let reaction = n2n();
        assert_eq!(reaction.threshold_energy(), 1.0);
        assert_eq!(reaction.evaluate_cross_section(0.5).unwrap(), 0.0);
        assert_eq!(reaction.evaluate_cross_section(1.0).unwrap(), 0.5);
        assert_relative_eq!(reaction.evaluate_cross_section(1.5).unwrap(), 0.75, max_relative = 1e-12);
    }

    #[test]
    fn test_multiplicity_banks_copies_first() {
        let reaction = n2n();
        let mut neutron = ParticleState::new(ParticleType::Neutron, 5.0);
        neutron.time = 1.0;
        let mut bank = ParticleBank::new();
        // Isotropic cosine and azimuth, for the copy then the original
        let mut rng = MockRng::new(vec![0.5, 0.0, 0.75, 0.0]);
        reaction.react(&mut neutron, &mut bank, &mut rng).unwrap();

        assert_eq!(bank.len(), 1);
        let copy = bank.pop().unwrap();
        assert_relative_eq!(copy.energy, 2.0, max_relative = 1e-12);
        assert_relative_eq!(copy.direction[2], 0.0, epsilon = 1e-12);
        assert_eq!(copy.generation_number, 1);
        assert_eq!(copy.time, 1.0);

        assert_relative_eq!(neutron.energy, 2.0, max_relative = 1e-12);
        assert_relative_eq!(neutron.direction[2], 0.5, epsilon = 1e-12);
        assert_eq!(neutron.collision_number, 1);
        assert_eq!(rng.draws(), 4);
    }

    #[test]
    fn test_absorption_kills() {
        let reaction = n2n().with_multiplicity(Multiplicity::Absorption);
        let mut neutron = ParticleState::new(ParticleType::Neutron, 5.0);
        let mut bank = ParticleBank::new();
        reaction.react(&mut neutron, &mut bank, &mut MockRng::new(vec![])).unwrap();
        assert!(!neutron.is_alive());
        assert!(bank.is_empty());
    }

    #[test]
    fn test_emitted_particle_counts() {
        let reaction = Reaction::new(PhotoatomicReactionType::Coherent.into(), cross_section(), ThompsonScattering)
            .with_emitted_particles(EmittedParticles { photons: 0, electrons: 1, positrons: 0 });
        assert_eq!(reaction.number_of_emitted_electrons(0.5), 0);
        assert_eq!(reaction.number_of_emitted_electrons(1.5), 1);
        assert_eq!(reaction.number_of_emitted_photons(1.5), 0);
        assert_eq!(reaction.number_of_emitted_positrons(1.5), 0);
    }

    #[test]
    fn test_adjoint_reaction() {
        let gain = InterpolationTable::from_x_and_y(vec![1e-3, 20.0], vec![1e-3, 1e-3], InterpolationScheme::LinLin)
            .unwrap();
        let reaction = Reaction::new(
            AdjointElectroatomicReactionType::AtomicExcitation.into(),
            cross_section(),
            AdjointAtomicExcitationDistribution::new(gain),
        );
        let mut particle = ParticleState::new(ParticleType::AdjointElectron, 1.0);
        let mut bank = ParticleBank::new();
        reaction.react_adjoint(&mut particle, &mut bank, &mut MockRng::new(vec![])).unwrap();
        assert_relative_eq!(particle.energy, 1.001, max_relative = 1e-12);
        assert_eq!(particle.collision_number, 1);
    }
}
