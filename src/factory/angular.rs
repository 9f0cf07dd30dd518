use std::sync::Arc;

use crate::distributions::{
    EquiprobableBinsDistribution, OneDDistribution, TabularDistribution, TabularScheme, TwoDBoundaryPolicy,
    TwoDDistribution, TwoDGridInterpolation, TwoDSamplingPolicy,
};
use crate::error::{Result, TransportError};
use crate::factory::{read_index, read_slice, read_value};
use crate::interpolation::InterpolationScheme;
use crate::scattering::neutron::NeutronAngularDistribution;
use crate::utils::float_to_int;

const EQUIPROBABLE_COSINE_BOUNDS: usize = 33;

//=====================================================================
// Angular distribution starting at 1-based `locator` in AND:
//   NE, E(1..NE), LC(1..NE)
// LC > 0 points at 33 equiprobable cosine bounds, LC < 0 at a tabular
// distribution JJ, NP, CSOUT(NP), PDF(NP), CDF(NP), and LC = 0 means
// isotropic. Locators are relative to the start of AND.
//=====================================================================
pub fn build_angular_distribution(and: &[f64], locator: usize, context: &str) -> Result<NeutronAngularDistribution> {
    if locator == 0 {
        return Err(TransportError::data_integrity(context, "AND locators are 1-based"));
    }
    let start = locator - 1;
    let num_energies = read_index(and, start, context)?;
    let energies = read_slice(and, start + 1, num_energies, context)?.to_vec();
    let locators = read_slice(and, start + 1 + num_energies, num_energies, context)?;

    let mut distributions = Vec::with_capacity(num_energies);
    for &value in locators {
        let lc = value.round() as i64;
        let distribution = match lc {
            0 => OneDDistribution::isotropic(),
            lc if lc > 0 => {
                let bounds = read_slice(and, lc as usize - 1, EQUIPROBABLE_COSINE_BOUNDS, context)?;
                Arc::new(OneDDistribution::EquiprobableBins(EquiprobableBinsDistribution::new(bounds.to_vec())?))
            }
            lc => Arc::new(OneDDistribution::Tabular(tabular_cosines(and, lc.unsigned_abs() as usize - 1, context)?)),
        };
        distributions.push(distribution);
    }

    let isotropic = OneDDistribution::isotropic();
    if distributions.iter().all(|distribution| Arc::ptr_eq(distribution, &isotropic)) {
        return Ok(NeutronAngularDistribution::isotropic());
    }
    Ok(NeutronAngularDistribution::Tabulated(TwoDDistribution::new(
        energies,
        distributions,
        TwoDSamplingPolicy::UnitBase,
        TwoDGridInterpolation::LinLinLin,
        TwoDBoundaryPolicy::Clamp,
    )?))
}

// JJ, NP, CSOUT(NP), PDF(NP), CDF(NP) with JJ = 1 histogram, 2 lin-lin
fn tabular_cosines(and: &[f64], start: usize, context: &str) -> Result<TabularDistribution> {
    let scheme = match InterpolationScheme::from_ace(read_value(and, start, context)?)? {
        InterpolationScheme::Histogram => TabularScheme::Histogram,
        InterpolationScheme::LinLin => TabularScheme::LinLin,
        other => {
            return Err(TransportError::data_integrity(
                context,
                format!("angular distributions are histogram or lin-lin, found {:?}", other),
            ));
        }
    };
    let num_points = read_index(and, start + 1, context)?;
    let cosines = read_slice(and, start + 2, num_points, context)?.to_vec();
    let pdf = read_slice(and, start + 2 + num_points, num_points, context)?.to_vec();
    if cosines.first().is_some_and(|&mu| mu < -1.0) || cosines.last().is_some_and(|&mu| mu > 1.0) {
        return Err(TransportError::data_integrity(context, "tabulated cosines leave [-1, 1]"));
    }
    TabularDistribution::new(scheme, cosines, pdf)
}

// LAND entry of a reaction: > 0 a locator into AND, 0 isotropic,
// -1 angles given with the energy law
pub fn angular_from_land(and: &[f64], land_entry: f64, context: &str) -> Result<Option<NeutronAngularDistribution>> {
    match float_to_int(land_entry, context)? {
        -1 => Ok(None),
        0 => Ok(Some(NeutronAngularDistribution::isotropic())),
        locator if locator > 0 => build_angular_distribution(and, locator as usize, context).map(Some),
        other => Err(TransportError::data_integrity(context, format!("invalid LAND locator {}", other))),
    }
}
