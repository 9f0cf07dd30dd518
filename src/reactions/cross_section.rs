use std::sync::Arc;

use crate::error::{Result, TransportError};
use crate::interpolation::InterpolationScheme;
use crate::utils::{HashGridSearcher, check_ascending, search_bin};

//=====================================================================
// Cross section (barns) on a shared energy grid, starting at the
// reaction's threshold index.
//
// Values cover grid[threshold_index..], so below the threshold energy
// the cross section is exactly zero. Above the last grid point the
// last value is held.
//=====================================================================
#[derive(Debug, Clone)]
pub struct CrossSection {
    energy_grid: Arc<Vec<f64>>,
    values: Vec<f64>,
    threshold_index: usize,
    scheme: InterpolationScheme,
    searcher: Option<Arc<HashGridSearcher>>,
}

impl CrossSection {
    pub fn new(energy_grid: Arc<Vec<f64>>, values: Vec<f64>, threshold_index: usize) -> Result<Self> {
        if energy_grid.len() < threshold_index || values.len() != energy_grid.len() - threshold_index {
            return Err(TransportError::data_integrity(
                "cross section",
                format!(
                    "{} values do not cover a grid of {} points from threshold index {}",
                    values.len(),
                    energy_grid.len(),
                    threshold_index
                ),
            ));
        }
        if values.is_empty() {
            return Err(TransportError::data_integrity("cross section", "no values above the threshold"));
        }
        check_ascending(&energy_grid, "cross section energy grid")?;
        Ok(Self { energy_grid, values, threshold_index, scheme: InterpolationScheme::LinLin, searcher: None })
    }

    // Cross section spanning the whole grid
    pub fn from_e_and_sigma(energy_grid: Vec<f64>, values: Vec<f64>) -> Result<Self> {
        Self::new(Arc::new(energy_grid), values, 0)
    }

    pub fn with_scheme(mut self, scheme: InterpolationScheme) -> Self {
        self.scheme = scheme;
        self
    }

    // The searcher must hash the same grid
    pub fn with_grid_searcher(mut self, searcher: Arc<HashGridSearcher>) -> Result<Self> {
        if !Arc::ptr_eq(searcher.grid(), &self.energy_grid) && searcher.grid().as_slice() != self.energy_grid.as_slice() {
            return Err(TransportError::data_integrity(
                "cross section",
                "the grid searcher was built for a different energy grid",
            ));
        }
        self.searcher = Some(searcher);
        Ok(self)
    }

    pub fn energy_grid(&self) -> &Arc<Vec<f64>> {
        &self.energy_grid
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn threshold_index(&self) -> usize {
        self.threshold_index
    }

    pub fn threshold_energy(&self) -> f64 {
        self.energy_grid[self.threshold_index]
    }

    pub fn max_energy(&self) -> f64 {
        self.energy_grid[self.energy_grid.len() - 1]
    }

    fn lower_grid_index(&self, energy: f64) -> usize {
        match &self.searcher {
            Some(searcher) => searcher.find_lower_index(energy),
            None => search_bin(&self.energy_grid, energy),
        }
    }

    pub fn evaluate(&self, energy: f64) -> Result<f64> {
        if energy.is_nan() {
            return Err(TransportError::out_of_range("cross section energy", energy, 0.0, f64::INFINITY));
        }
        if energy < self.threshold_energy() {
            return Ok(0.0);
        }
        let last = self.values.len() - 1;
        if energy >= self.max_energy() || last == 0 {
            return Ok(self.values[last]);
        }
        let index = self.lower_grid_index(energy).max(self.threshold_index);
        let local = index - self.threshold_index;
        if local >= last {
            return Ok(self.values[last]);
        }
        let (e0, e1) = (self.energy_grid[index], self.energy_grid[index + 1]);
        Ok(self.scheme.interpolate(e0, e1, self.values[local], self.values[local + 1], energy)?)
    }
}
