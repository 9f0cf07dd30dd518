use std::sync::Arc;

use anyhow::ensure;

use crate::collision::ScatteringCenter;
use crate::error::{Result, TransportError};
use crate::particle::{ParticleBank, ParticleState};
use crate::scattering::adjoint::AdjointElectronScatteringDistribution;
use crate::scattering::electron::ElectronScatteringDistribution;
use crate::scattering::neutron::NeutronScatteringDistribution;
use crate::scattering::photon::PhotonScatteringDistribution;
use crate::scattering::{ScatterAdjoint, ScatterParticle, Subshell};
use crate::utils::RandomNumberStream;

//=====================================================================
// Scattering centers mixed by number density (atoms per barn-cm).
// Macroscopic cross sections are in 1/cm.
//
// A single-component material selects its target without drawing a
// random number.
//=====================================================================
#[derive(Clone, Debug)]
pub struct Material<D> {
    name: String,
    components: Vec<(f64, Arc<ScatteringCenter<D>>)>,
}

pub type NeutronMaterial = Material<NeutronScatteringDistribution>;
pub type PhotonMaterial = Material<PhotonScatteringDistribution>;
pub type ElectronMaterial = Material<ElectronScatteringDistribution>;
pub type AdjointElectronMaterial = Material<AdjointElectronScatteringDistribution>;

impl<D> Material<D> {
    pub fn new(name: impl Into<String>, components: Vec<(f64, Arc<ScatteringCenter<D>>)>) -> anyhow::Result<Self> {
        let name = name.into();
        ensure!(!components.is_empty(), "material '{}' has no components", name);
        for (number_density, center) in &components {
            ensure!(
                *number_density > 0.0 && number_density.is_finite(),
                "material '{}' has a number density of {} for '{}'",
                name,
                number_density,
                center.name()
            );
        }
        Ok(Self { name, components })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn components(&self) -> &[(f64, Arc<ScatteringCenter<D>>)] {
        &self.components
    }

    pub fn macroscopic_total_cross_section(&self, energy: f64) -> Result<f64> {
        self.components
            .iter()
            .map(|(number_density, center)| -> Result<f64> { Ok(number_density * center.total_cross_section(energy)?) })
            .sum()
    }

    pub fn sample_target<R: RandomNumberStream + ?Sized>(&self, energy: f64, rng: &mut R) -> Result<&ScatteringCenter<D>> {
        if let [(_, center)] = self.components.as_slice() {
            return Ok(&**center);
        }
        let weights = self
            .components
            .iter()
            .map(|(number_density, center)| Ok(number_density * center.total_cross_section(energy)?))
            .collect::<Result<Vec<_>>>()?;
        let total: f64 = weights.iter().sum();
        if !(total > 0.0) {
            return Err(TransportError::data_integrity(
                format!("material '{}'", self.name),
                format!("vanishing macroscopic cross section at {} MeV", energy),
            ));
        }

        let target = rng.next_uniform() * total;
        let mut cumulative = 0.0;
        for (weight, (_, center)) in weights.iter().zip(&self.components) {
            cumulative += weight;
            if cumulative > target {
                return Ok(&**center);
            }
        }
        // Rounding in the cumulative sum
        let last = weights.iter().rposition(|&weight| weight > 0.0).unwrap_or(self.components.len() - 1);
        Ok(&*self.components[last].1)
    }
}

impl<D: ScatterParticle> Material<D> {
    pub fn collide<R: RandomNumberStream + ?Sized>(
        &self,
        particle: &mut ParticleState,
        bank: &mut ParticleBank,
        rng: &mut R,
    ) -> Result<Option<Subshell>> {
        self.sample_target(particle.energy, rng)?.collide(particle, bank, rng)
    }
}

impl<D: ScatterAdjoint> Material<D> {
    pub fn collide_adjoint<R: RandomNumberStream + ?Sized>(
        &self,
        particle: &mut ParticleState,
        bank: &mut ParticleBank,
        rng: &mut R,
    ) -> Result<Option<Subshell>> {
        self.sample_target(particle.energy, rng)?.collide_adjoint(particle, bank, rng)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::collision::Nuclide;
    use crate::factory::NeutronReactionFactory;
    use crate::settings::SimulationProperties;
    use crate::utils::MockRng;
    use crate::utils::testing::{NEUTRON_TEST_TABLE, TEST_ATOMIC_WEIGHT_RATIO};

    fn nuclide(name: &str) -> Arc<Nuclide> {
        let properties = SimulationProperties::default();
        let factory = NeutronReactionFactory::new(&NEUTRON_TEST_TABLE, TEST_ATOMIC_WEIGHT_RATIO, &properties).unwrap();
        Arc::new(Nuclide::new(name, factory.create_reactions().unwrap().into_values().collect()).unwrap())
    }

    #[test]
    fn test_macroscopic_cross_section() {
        let material = Material::new("mixture", vec![(0.1, nuclide("first")), (0.3, nuclide("second"))]).unwrap();
        assert_relative_eq!(material.macroscopic_total_cross_section(1.0).unwrap(), 0.4 * 5.2, max_relative = 1e-12);
    }

    #[test]
    fn test_sample_target() {
        let material = Material::new("mixture", vec![(0.1, nuclide("first")), (0.3, nuclide("second"))]).unwrap();
        let target = |random_number: f64| {
            let mut rng = MockRng::new(vec![random_number]);
            material.sample_target(1.0, &mut rng).unwrap().name().to_string()
        };
        assert_eq!(target(0.2), "first");
        assert_eq!(target(0.3), "second");

        let single = Material::new("pure", vec![(0.1, nuclide("only"))]).unwrap();
        let mut rng = MockRng::new(vec![]);
        assert_eq!(single.sample_target(1.0, &mut rng).unwrap().name(), "only");
    }

    #[test]
    fn test_invalid_materials() {
        let empty: Vec<(f64, Arc<Nuclide>)> = Vec::new();
        assert!(Material::new("empty", empty).is_err());
        let err = Material::new("negative", vec![(-0.1, nuclide("first"))]).unwrap_err();
        assert!(err.to_string().contains("'negative'"));
    }
}
