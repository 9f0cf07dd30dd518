use std::sync::Arc;

use crate::distributions::{OneD, OneDDistribution, TwoDDistribution};
use crate::error::{Result, check_range};
use crate::utils::RandomNumberStream;

//=====================================================================
// Angular distribution of an emitted neutron, tabulated against the
// incoming energy or isotropic.
//=====================================================================
#[derive(Debug, Clone)]
pub enum NeutronAngularDistribution {
    Isotropic(Arc<OneDDistribution>),
    Tabulated(TwoDDistribution),
}

impl NeutronAngularDistribution {
    pub fn isotropic() -> Self {
        NeutronAngularDistribution::Isotropic(OneDDistribution::isotropic())
    }

    pub fn is_isotropic(&self) -> bool {
        matches!(self, NeutronAngularDistribution::Isotropic(_))
    }

    pub fn evaluate_pdf(&self, incoming_energy: f64, cosine: f64) -> Result<f64> {
        check_range("scattering angle cosine", cosine, -1.0, 1.0)?;
        match self {
            NeutronAngularDistribution::Isotropic(distribution) => distribution.evaluate_pdf(cosine),
            NeutronAngularDistribution::Tabulated(table) => table.evaluate_pdf(incoming_energy, cosine),
        }
    }

    pub fn sample_cosine<R: RandomNumberStream + ?Sized>(&self, incoming_energy: f64, rng: &mut R) -> Result<f64> {
        let cosine = match self {
            NeutronAngularDistribution::Isotropic(distribution) => distribution.sample(rng),
            NeutronAngularDistribution::Tabulated(table) => table.sample(incoming_energy, rng)?,
        };
        Ok(cosine.clamp(-1.0, 1.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_abs_diff_eq;

    use crate::utils::MockRng;

    #[test]
    fn test_isotropic() {
        let distribution = NeutronAngularDistribution::isotropic();
        let mut rng = MockRng::new(vec![0.25]);
        assert_abs_diff_eq!(distribution.sample_cosine(1.0, &mut rng).unwrap(), -0.5);
        assert_abs_diff_eq!(distribution.evaluate_pdf(1.0, 0.2).unwrap(), 0.5);
        assert!(distribution.evaluate_pdf(1.0, 1.2).is_err());
    }
}
