use crate::distributions::OneD;
use crate::error::{Result, TransportError, check_range};
use crate::unitf64::UnitF64;
use crate::utils::{check_ascending, search_bin};

//=====================================================================
// Bins of equal probability, uniform inside each bin. The ACE angular
// distributions use 32 bins bounded by 33 cosines.
//=====================================================================
#[derive(Debug, Clone, PartialEq)]
pub struct EquiprobableBinsDistribution {
    bounds: Vec<f64>,
}

impl EquiprobableBinsDistribution {
    pub fn new(bounds: Vec<f64>) -> Result<Self> {
        if bounds.len() < 2 {
            return Err(TransportError::data_integrity(
                "equiprobable bin distribution",
                format!("needs at least two bin bounds, found {}", bounds.len()),
            ));
        }
        check_ascending(&bounds, "equiprobable bin distribution")?;
        Ok(Self { bounds })
    }

    pub fn num_bins(&self) -> usize {
        self.bounds.len() - 1
    }

    pub fn bounds(&self) -> &[f64] {
        &self.bounds
    }
}

impl OneD for EquiprobableBinsDistribution {
    fn evaluate(&self, x: f64) -> Result<f64> {
        self.evaluate_pdf(x)
    }

    fn evaluate_pdf(&self, x: f64) -> Result<f64> {
        check_range("equiprobable bin argument", x, self.lower_bound(), self.upper_bound())?;
        let bin = search_bin(&self.bounds, x);
        Ok(1.0 / (self.num_bins() as f64 * (self.bounds[bin + 1] - self.bounds[bin])))
    }

    fn evaluate_cdf(&self, x: f64) -> Result<f64> {
        check_range("equiprobable bin argument", x, self.lower_bound(), self.upper_bound())?;
        let bin = search_bin(&self.bounds, x);
        let fraction = (x - self.bounds[bin]) / (self.bounds[bin + 1] - self.bounds[bin]);
        Ok((bin as f64 + fraction) / self.num_bins() as f64)
    }

    fn sample_with_random_number(&self, random_number: UnitF64) -> f64 {
        let scaled = random_number.0 * self.num_bins() as f64;
        let bin = (scaled as usize).min(self.num_bins() - 1);
        let fraction = scaled - bin as f64;
        self.bounds[bin] + fraction * (self.bounds[bin + 1] - self.bounds[bin])
    }

    fn lower_bound(&self) -> f64 {
        self.bounds[0]
    }

    fn upper_bound(&self) -> f64 {
        self.bounds[self.bounds.len() - 1]
    }

    fn normalization_constant(&self) -> f64 {
        1.0
    }
}
