use std::sync::Arc;

use crate::error::{Result, TransportError};
use crate::utils::{check_ascending, search_bin};

//=====================================================================
// Hash-based energy grid searcher.
//
// The logarithm of the grid range is cut into equal-width hash bins,
// each remembering the first grid bin it overlaps. A lookup hashes the
// value and only searches the handful of grid points between two
// neighbouring hash entries.
//=====================================================================
#[derive(Debug, Clone)]
pub struct HashGridSearcher {
    grid: Arc<Vec<f64>>,
    log_min: f64,
    hash_width: f64,
    hash_indices: Vec<usize>,
}

impl HashGridSearcher {
    pub fn new(grid: Arc<Vec<f64>>, num_hashes: usize) -> Result<Self> {
        if grid.len() < 2 {
            return Err(TransportError::data_integrity(
                "hash grid searcher",
                format!("a grid needs at least two points, found {}", grid.len()),
            ));
        }
        check_ascending(&grid, "hash grid searcher")?;
        if grid[0] <= 0.0 {
            return Err(TransportError::data_integrity(
                "hash grid searcher",
                format!("logarithmic hashing requires a positive grid, first point is {}", grid[0]),
            ));
        }

        let num_hashes = num_hashes.max(1);
        let log_min = grid[0].ln();
        let log_max = grid[grid.len() - 1].ln();
        let hash_width = (log_max - log_min) / num_hashes as f64;

        let hash_indices = (0..=num_hashes)
            .map(|k| {
                if k == num_hashes {
                    grid.len() - 2
                } else {
                    search_bin(&grid, (log_min + k as f64 * hash_width).exp())
                }
            })
            .collect();

        Ok(Self { grid, log_min, hash_width, hash_indices })
    }

    pub fn grid(&self) -> &Arc<Vec<f64>> {
        &self.grid
    }

    // Index of the bin containing value, clamped to the first/last bin
    pub fn find_lower_index(&self, value: f64) -> usize {
        let last_bin = self.grid.len() - 2;
        if value <= self.grid[0] {
            return 0;
        }
        if value >= self.grid[self.grid.len() - 1] {
            return last_bin;
        }

        let hash = ((value.ln() - self.log_min) / self.hash_width) as usize;
        let hash = hash.min(self.hash_indices.len() - 2);
        // One bin of slack on either side absorbs rounding in the hash
        let lower = self.hash_indices[hash].saturating_sub(1);
        let upper = (self.hash_indices[hash + 1] + 3).min(self.grid.len());

        lower + search_bin(&self.grid[lower..upper], value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matches_binary_search() {
        let grid: Vec<f64> = (0..200).map(|i| 1e-11 * 1.15_f64.powi(i)).collect();
        let grid = Arc::new(grid);
        let searcher = HashGridSearcher::new(grid.clone(), 37).unwrap();

        for i in 0..1000 {
            let value = grid[0] * (grid[199] / grid[0]).powf(i as f64 / 999.0);
            assert_eq!(searcher.find_lower_index(value), search_bin(&grid, value), "value {}", value);
        }
    }

    #[test]
    fn test_grid_points_and_clamping() {
        let grid = Arc::new(vec![1.0, 2.0, 5.0, 10.0]);
        let searcher = HashGridSearcher::new(grid, 4).unwrap();
        assert_eq!(searcher.find_lower_index(0.5), 0);
        assert_eq!(searcher.find_lower_index(2.0), 1);
        assert_eq!(searcher.find_lower_index(5.0), 2);
        assert_eq!(searcher.find_lower_index(10.0), 2);
        assert_eq!(searcher.find_lower_index(50.0), 2);
    }

    #[test]
    fn test_rejects_bad_grids() {
        assert!(HashGridSearcher::new(Arc::new(vec![1.0]), 4).is_err());
        assert!(HashGridSearcher::new(Arc::new(vec![0.0, 1.0]), 4).is_err());
        assert!(HashGridSearcher::new(Arc::new(vec![2.0, 1.0]), 4).is_err());
    }
}
