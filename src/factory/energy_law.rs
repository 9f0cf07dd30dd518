use std::sync::Arc;

use crate::distributions::{
    EquiprobableBinsDistribution, OneDDistribution, TabularDistribution, TabularScheme, TwoDBoundaryPolicy,
    TwoDDistribution, TwoDGridInterpolation, TwoDSamplingPolicy,
};
use crate::error::{Result, TransportError};
use crate::factory::{read_index, read_slice, read_value};
use crate::interpolation::InterpolationTable;
use crate::scattering::neutron::{
    EnergyLaw, GeneralEvaporation, KalbachMann, KalbachTable, LevelScattering, NuclearTemperatureSpectrum,
    WattSpectrum,
};
use crate::utils::float_to_index;

//=====================================================================
// Energy law starting at 1-based `locator` in a DLW style block:
//   LNW, LAW, IDAT, NR, NBT(NR), INT(NR), NE, E(NE), P(NE)
// with the law data at IDAT. IDAT and the locators inside the law data
// are relative to the start of the block. Only the first law of a
// chain is used.
//=====================================================================
pub fn build_energy_law(dlw: &[f64], locator: usize, context: &str) -> Result<EnergyLaw> {
    if locator == 0 {
        return Err(TransportError::data_integrity(context, "energy law locators are 1-based"));
    }
    let start = locator - 1;
    let next_law = read_index(dlw, start, context)?;
    let law = read_index(dlw, start + 1, context)?;
    let data = read_index(dlw, start + 2, context)?;
    if next_law != 0 {
        log::warn!("{}: more than one energy law, only law {} is used", context, law);
    }
    if data == 0 {
        return Err(TransportError::data_integrity(context, "law data locators are 1-based"));
    }
    let data = data - 1;

    match law {
        1 => equiprobable_energy_bins(dlw, data, context),
        3 => Ok(EnergyLaw::LevelScattering(LevelScattering::new(
            read_value(dlw, data, context)?,
            read_value(dlw, data + 1, context)?,
        ))),
        4 => continuous_tabular(dlw, data, context),
        5 => {
            let (temperature, length) = interpolation_table(dlw, data)?;
            let num_bounds = read_index(dlw, data + length, context)?;
            let bounds = read_slice(dlw, data + length + 1, num_bounds, context)?;
            Ok(EnergyLaw::GeneralEvaporation(GeneralEvaporation {
                temperature,
                scale: EquiprobableBinsDistribution::new(bounds.to_vec())?,
            }))
        }
        7 => Ok(EnergyLaw::SimpleMaxwellFission(temperature_spectrum(dlw, data, context)?)),
        9 => Ok(EnergyLaw::Evaporation(temperature_spectrum(dlw, data, context)?)),
        11 => {
            let (a, a_length) = interpolation_table(dlw, data)?;
            let (b, b_length) = interpolation_table(dlw, data + a_length)?;
            let restriction_energy = read_value(dlw, data + a_length + b_length, context)?;
            Ok(EnergyLaw::Watt(WattSpectrum { a, b, restriction_energy }))
        }
        44 => kalbach_mann(dlw, data, context),
        other => Err(TransportError::data_integrity(context, format!("energy law {} is not supported", other))),
    }
}

fn interpolation_table(dlw: &[f64], start: usize) -> Result<(InterpolationTable, usize)> {
    let length = InterpolationTable::get_table_length(start, dlw)?;
    let table = InterpolationTable::process(&dlw[start.min(dlw.len())..])?;
    Ok((table, length))
}

// theta(E) followed by the restriction energy U
fn temperature_spectrum(dlw: &[f64], start: usize, context: &str) -> Result<NuclearTemperatureSpectrum> {
    let (temperature, length) = interpolation_table(dlw, start)?;
    Ok(NuclearTemperatureSpectrum { temperature, restriction_energy: read_value(dlw, start + length, context)? })
}

// NR, NBT(NR), INT(NR), NE, E(NE): the incoming energy grid of laws 1, 4 and 44.
// Returns the grid and the position right after it.
fn incoming_energies<'a>(dlw: &'a [f64], start: usize, context: &str) -> Result<(&'a [f64], usize)> {
    let num_regions = read_index(dlw, start, context)?;
    if num_regions > 1 {
        log::debug!("{}: {} interpolation regions on the incoming grid, lin-lin is used", context, num_regions);
    }
    let position = start + 1 + 2 * num_regions;
    let num_energies = read_index(dlw, position, context)?;
    let energies = read_slice(dlw, position + 1, num_energies, context)?;
    Ok((energies, position + 1 + num_energies))
}

fn energy_table(energies: &[f64], distributions: Vec<Arc<OneDDistribution>>) -> Result<TwoDDistribution> {
    TwoDDistribution::new(
        energies.to_vec(),
        distributions,
        TwoDSamplingPolicy::UnitBase,
        TwoDGridInterpolation::LinLinLin,
        TwoDBoundaryPolicy::Clamp,
    )
}

// Law 1: NET equiprobable outgoing energy bounds per incoming energy
fn equiprobable_energy_bins(dlw: &[f64], start: usize, context: &str) -> Result<EnergyLaw> {
    let (energies, position) = incoming_energies(dlw, start, context)?;
    let num_bounds = read_index(dlw, position, context)?;
    let distributions = (0..energies.len())
        .map(|i| {
            let bounds = read_slice(dlw, position + 1 + i * num_bounds, num_bounds, context)?;
            Ok(Arc::new(OneDDistribution::EquiprobableBins(EquiprobableBinsDistribution::new(bounds.to_vec())?)))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(EnergyLaw::EquiprobableBins(energy_table(energies, distributions)?))
}

// INTT, NP, E_out(NP), PDF(NP), CDF(NP) at a 1-based locator. INTT = 10 ND + scheme
// where ND counts leading discrete lines.
fn outgoing_energy_distribution(dlw: &[f64], locator: usize, context: &str) -> Result<(TabularDistribution, usize)> {
    if locator == 0 {
        return Err(TransportError::data_integrity(context, "outgoing distribution locators are 1-based"));
    }
    let start = locator - 1;
    let intt = read_index(dlw, start, context)?;
    if intt >= 10 {
        log::warn!("{}: {} discrete lines are treated as part of the continuum", context, intt / 10);
    }
    let scheme = match intt % 10 {
        1 => TabularScheme::Histogram,
        2 => TabularScheme::LinLin,
        other => {
            return Err(TransportError::data_integrity(
                context,
                format!("outgoing energy scheme {} is neither histogram nor lin-lin", other),
            ));
        }
    };
    let num_points = read_index(dlw, start + 1, context)?;
    let outgoing = read_slice(dlw, start + 2, num_points, context)?.to_vec();
    let pdf = read_slice(dlw, start + 2 + num_points, num_points, context)?.to_vec();
    Ok((TabularDistribution::new(scheme, outgoing, pdf)?, start + 2 + 3 * num_points))
}

// Law 4: NE locators to tabulated outgoing energy distributions
fn continuous_tabular(dlw: &[f64], start: usize, context: &str) -> Result<EnergyLaw> {
    let (energies, position) = incoming_energies(dlw, start, context)?;
    let locators = read_slice(dlw, position, energies.len(), context)?;
    let distributions = locators
        .iter()
        .map(|&locator| {
            let (distribution, _) = outgoing_energy_distribution(dlw, float_to_index(locator, context)?, context)?;
            Ok(Arc::new(OneDDistribution::Tabular(distribution)))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(EnergyLaw::ContinuousTabular(energy_table(energies, distributions)?))
}

// Law 44: law 4 tables followed by the precompound fractions R(NP) and slopes A(NP)
fn kalbach_mann(dlw: &[f64], start: usize, context: &str) -> Result<EnergyLaw> {
    let (energies, position) = incoming_energies(dlw, start, context)?;
    let locators = read_slice(dlw, position, energies.len(), context)?;
    let tables = locators
        .iter()
        .map(|&locator| {
            let (outgoing, end) = outgoing_energy_distribution(dlw, float_to_index(locator, context)?, context)?;
            let num_points = outgoing.x().len();
            Ok(KalbachTable {
                precompound_fraction: read_slice(dlw, end, num_points, context)?.to_vec(),
                angular_slope: read_slice(dlw, end + num_points, num_points, context)?.to_vec(),
                outgoing,
            })
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(EnergyLaw::KalbachMann(KalbachMann::new(energies.to_vec(), tables)?))
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::{assert_abs_diff_eq, assert_relative_eq};

    use crate::utils::MockRng;
    use crate::utils::testing::{NEUTRON_TEST_TABLE, TEST_ATOMIC_WEIGHT_RATIO};

    // Law header with one law and an energy independent probability
    fn header(law: f64, data: f64) -> Vec<f64> {
        vec![0.0, law, data, 0.0, 2.0, 1.0, 20.0, 1.0, 1.0]
    }

    #[test]
    fn test_level_scattering_law() {
        let table = &*NEUTRON_TEST_TABLE;
        let law = build_energy_law(table.extract_dlw_block(), 1, "MT 51").unwrap();
        assert_eq!(law.law(), 3);

        let a = TEST_ATOMIC_WEIGHT_RATIO;
        let expected = (a / (a + 1.0)).powi(2) * (5.0 - (a + 1.0) / a * 4.5);
        let (energy, cosine) = law.sample(5.0, &mut MockRng::new(vec![])).unwrap();
        assert_relative_eq!(energy, expected, max_relative = 1e-12);
        assert!(cosine.is_none());
    }

    #[test]
    fn test_evaporation_law() {
        let table = &*NEUTRON_TEST_TABLE;
        let law = build_energy_law(table.extract_dlw_block(), 12, "MT 18").unwrap();
        assert_eq!(law.law(), 9);
        // -theta ln((1 - r1)(1 - r2)) with theta(20 MeV) = 1.4
        let (energy, _) = law.sample(20.0, &mut MockRng::new(vec![0.5, 0.5])).unwrap();
        assert_relative_eq!(energy, 1.4 * 4f64.ln(), max_relative = 1e-12);
    }

    #[test]
    fn test_continuous_tabular_law() {
        let mut dlw = header(4.0, 10.0);
        dlw.extend([0.0, 2.0, 1.0, 20.0, 16.0, 16.0]);
        dlw.extend([2.0, 2.0, 0.0, 2.0, 0.5, 0.5, 0.0, 1.0]);
        let law = build_energy_law(&dlw, 1, "test").unwrap();
        assert_eq!(law.law(), 4);
        let (energy, _) = law.sample(1.0, &mut MockRng::new(vec![0.25])).unwrap();
        assert_abs_diff_eq!(energy, 0.5, epsilon = 1e-12);
    }

    #[test]
    fn test_kalbach_mann_law() {
        let mut dlw = header(44.0, 10.0);
        // Outgoing table sits right after the single locator, at 1-based 14
        dlw.extend([0.0, 1.0, 1.0, 14.0]);
        dlw.extend([2.0, 2.0, 0.0, 2.0, 0.5, 0.5, 0.0, 1.0, 0.2, 0.2, 1.0, 1.0]);
        let law = build_energy_law(&dlw, 1, "test").unwrap();
        assert_eq!(law.law(), 44);

        // Flat pdf on [0, 2]: E' = 2 r; r3 above R takes the sinh branch
        let (energy, cosine) = law.sample(1.0, &mut MockRng::new(vec![0.25, 0.5, 0.75])).unwrap();
        assert_relative_eq!(energy, 0.5, max_relative = 1e-12);
        assert_relative_eq!(cosine.unwrap(), (0.5 * 1.0f64.sinh()).asinh(), max_relative = 1e-12);

        // r3 below R takes the exponential branch
        let (energy, cosine) = law.sample(1.0, &mut MockRng::new(vec![0.75, 0.1, 0.75])).unwrap();
        assert_relative_eq!(energy, 1.5, max_relative = 1e-12);
        let expected = (0.75 * 1.0f64.exp() + 0.25 * (-1.0f64).exp()).ln();
        assert_relative_eq!(cosine.unwrap(), expected, max_relative = 1e-12);
    }

    #[test]
    fn test_general_evaporation_and_watt_laws() {
        let mut dlw = header(5.0, 10.0);
        dlw.extend([0.0, 2.0, 1.0, 20.0, 2.0, 2.0, 3.0, 0.0, 1.0, 2.0]);
        let EnergyLaw::GeneralEvaporation(law) = build_energy_law(&dlw, 1, "test").unwrap() else {
            panic!("expected law 5");
        };
        assert_eq!(law.scale.num_bins(), 2);

        let mut dlw = header(11.0, 10.0);
        dlw.extend([0.0, 2.0, 1.0, 20.0, 1.0, 1.0]);
        dlw.extend([0.0, 2.0, 1.0, 20.0, 2.0, 2.0]);
        dlw.push(-3.0);
        let EnergyLaw::Watt(law) = build_energy_law(&dlw, 1, "test").unwrap() else {
            panic!("expected law 11");
        };
        assert_eq!(law.restriction_energy, -3.0);
    }

    #[test]
    fn test_law_chain_and_unsupported_laws() {
        // A second law in the chain is ignored
        let mut dlw = header(3.0, 10.0);
        dlw[0] = 12.0;
        dlw.extend([1.0, 0.5]);
        assert_eq!(build_energy_law(&dlw, 1, "test").unwrap().law(), 3);

        let mut dlw = header(61.0, 10.0);
        dlw.extend([0.0, 0.0]);
        assert!(build_energy_law(&dlw, 1, "test").is_err());
        assert!(build_energy_law(&dlw, 0, "test").is_err());
    }
}
