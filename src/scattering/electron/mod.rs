mod analog_elastic;
mod bremsstrahlung;
mod cutoff_elastic;
mod electroionization;
mod excitation;
mod moment_preserving;
mod screened_rutherford;

pub use analog_elastic::{AnalogElasticDistribution, ElasticUnionSampling};
pub use bremsstrahlung::{BremsstrahlungAngularModel, BremsstrahlungDistribution, TwoBSRejection, sample_dipole_cosine};
pub use cutoff_elastic::CutoffElasticDistribution;
pub use electroionization::{ElectroionizationSubshellDistribution, binary_collision_cosine};
pub use excitation::AtomicExcitationDistribution;
pub use moment_preserving::{
    HybridElasticDistribution, MomentPreservingBuilder, MomentPreservingElasticDistribution, MomentPreservingPoint,
    gauss_rule_from_moments,
};
pub use screened_rutherford::{ScreenedRutherfordElasticDistribution, screening_parameter};

use crate::error::Result;
use crate::particle::{ParticleBank, ParticleState};
use crate::scattering::{ScatterParticle, Subshell};
use crate::utils::RandomNumberStream;

//=====================================================================
// Closed set of electron (and positron) scattering distributions.
//=====================================================================
#[derive(Debug, Clone)]
pub enum ElectronScatteringDistribution {
    CutoffElastic(CutoffElasticDistribution),
    ScreenedRutherfordElastic(ScreenedRutherfordElasticDistribution),
    AnalogElastic(AnalogElasticDistribution),
    HybridElastic(HybridElasticDistribution),
    MomentPreservingElastic(MomentPreservingElasticDistribution),
    Bremsstrahlung(BremsstrahlungDistribution),
    AtomicExcitation(AtomicExcitationDistribution),
    Electroionization(ElectroionizationSubshellDistribution),
}

impl ScatterParticle for ElectronScatteringDistribution {
    fn scatter<R: RandomNumberStream + ?Sized>(
        &self,
        particle: &mut ParticleState,
        bank: &mut ParticleBank,
        rng: &mut R,
    ) -> Result<Option<Subshell>> {
        match self {
            Self::CutoffElastic(distribution) => distribution.scatter(particle, bank, rng),
            Self::ScreenedRutherfordElastic(distribution) => distribution.scatter(particle, bank, rng),
            Self::AnalogElastic(distribution) => distribution.scatter(particle, bank, rng),
            Self::HybridElastic(distribution) => distribution.scatter(particle, bank, rng),
            Self::MomentPreservingElastic(distribution) => distribution.scatter(particle, bank, rng),
            Self::Bremsstrahlung(distribution) => distribution.scatter(particle, bank, rng),
            Self::AtomicExcitation(distribution) => distribution.scatter(particle, bank, rng),
            Self::Electroionization(distribution) => distribution.scatter(particle, bank, rng),
        }
    }
}

// Two-energy elastic angular table shared by the elastic tests
#[cfg(test)]
pub(crate) fn test_elastic_angular(
    policy: crate::distributions::TwoDSamplingPolicy,
) -> std::sync::Arc<crate::distributions::TwoDDistribution> {
    use std::sync::Arc;

    use crate::constants::ELASTIC_ANGLE_COSINE_PEAK;
    use crate::distributions::{OneDDistribution, TabularDistribution, TwoDBoundaryPolicy, TwoDDistribution, TwoDGridInterpolation};

    let table = |cosines: Vec<f64>, cdf: Vec<f64>| {
        Arc::new(OneDDistribution::Tabular(TabularDistribution::from_cdf(cosines, cdf).unwrap()))
    };
    Arc::new(
        TwoDDistribution::new(
            vec![1e-5, 100.0],
            vec![
                table(vec![-1.0, 0.0, ELASTIC_ANGLE_COSINE_PEAK], vec![0.0, 0.5, 1.0]),
                table(vec![-1.0, 0.9, ELASTIC_ANGLE_COSINE_PEAK], vec![0.0, 0.1, 1.0]),
            ],
            policy,
            TwoDGridInterpolation::LinLinLin,
            TwoDBoundaryPolicy::Clamp,
        )
        .unwrap(),
    )
}
