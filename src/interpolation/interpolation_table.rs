use std::ops::Deref;

use thiserror::Error;

use crate::interpolation::{InterpolationRegion, InterpolationScheme, XY};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum InterpolationError {
    #[error("invalid interpolation table: empty")]
    EmptyTable,
    #[error("interpolation region for x={0} not found")]
    OutOfBounds(f64),
    #[error("unknown ENDF interpolation flag {0}")]
    UnknownScheme(f64),
    #[error("{0} interpolation is not supported")]
    UnsupportedScheme(InterpolationScheme),
    #[error("malformed interpolation table: {0}")]
    Malformed(String),
}

//=====================================================================
// Multi-region interpolation table, in the ENDF/ACE layout
//     NR, NBT(1..NR), INT(1..NR), N, X(1..N), Y(1..N)
// Neighbouring regions share their boundary point.
//=====================================================================
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InterpolationTable(pub Vec<InterpolationRegion>);

impl Deref for InterpolationTable {
    type Target = Vec<InterpolationRegion>;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

// Reads an integer count from raw ACE data
fn read_count(data: &[f64], index: usize) -> Result<usize, InterpolationError> {
    let value = *data
        .get(index)
        .ok_or_else(|| InterpolationError::Malformed(format!("table truncated at entry {}", index)))?;
    let rounded = value.round();
    if rounded < 0.0 || (value - rounded).abs() > 1e-6 {
        return Err(InterpolationError::Malformed(format!(
            "expected a non-negative integer at entry {}, found {}",
            index, value
        )));
    }
    Ok(rounded as usize)
}

impl InterpolationTable {
    // Single region table
    pub fn from_x_and_y(x: Vec<f64>, y: Vec<f64>, interpolation_scheme: InterpolationScheme) -> Result<Self, InterpolationError> {
        Ok(Self(vec![InterpolationRegion::from_x_and_y(x, y, interpolation_scheme)?]))
    }

    pub fn process(data: &[f64]) -> Result<Self, InterpolationError> {
        // First, get the number of interpolation regions
        let num_interp_regions = read_count(data, 0)?;

        // If the number of regions is zero, this means we use linear-linear interpolation
        if num_interp_regions == 0 {
            let num_data_points = read_count(data, 1)?;
            let x_start = 2;
            let y_start = x_start + num_data_points;
            let y_end = y_start + num_data_points;
            if data.len() < y_end {
                return Err(InterpolationError::Malformed(format!(
                    "expected {} data points, table holds {} entries",
                    num_data_points,
                    data.len()
                )));
            }

            let x = data[x_start..y_start].to_vec();
            let y = data[y_start..y_end].to_vec();

            return Self::from_x_and_y(x, y, InterpolationScheme::LinLin);
        }

        // Split out raw data into interpolation bounds, regions, and xy data
        let bounds_start = 1;
        let schemes_start = bounds_start + num_interp_regions;
        let schemes_end = schemes_start + num_interp_regions;
        let num_data_points = read_count(data, schemes_end)?;
        let x_start = schemes_end + 1;
        let y_start = x_start + num_data_points;
        let y_end = y_start + num_data_points;
        if data.len() < y_end {
            return Err(InterpolationError::Malformed(format!(
                "expected {} data points, table holds {} entries",
                num_data_points,
                data.len()
            )));
        }

        // Bounds, converted to zero-indexed region ends
        let mut bounds = vec![0];
        for i in bounds_start..schemes_start {
            let bound = read_count(data, i)?;
            if bound == 0 || bound > num_data_points {
                return Err(InterpolationError::Malformed(format!(
                    "region boundary {} lies outside of the {} data points",
                    bound, num_data_points
                )));
            }
            bounds.push(bound - 1);
        }

        let schemes = data[schemes_start..schemes_end]
            .iter()
            .map(|&value| InterpolationScheme::from_ace(value))
            .collect::<Result<Vec<_>, _>>()?;

        let data_points: Vec<XY> = data[x_start..y_start]
            .iter()
            .zip(&data[y_start..y_end])
            .map(|(&x, &y)| XY { x, y })
            .collect();

        let regions = bounds
            .windows(2)
            .zip(schemes)
            .map(|(range, scheme)| {
                if range[1] < range[0] {
                    return Err(InterpolationError::Malformed("region boundaries are not ascending".to_string()));
                }
                Ok(InterpolationRegion {
                    data: data_points[range[0]..=range[1]].to_vec(),
                    interpolation_scheme: scheme,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(InterpolationTable(regions))
    }

    // Number of XSS entries occupied by a table starting at table_start
    pub fn get_table_length(table_start: usize, array_containing_table: &[f64]) -> Result<usize, InterpolationError> {
        let num_interp_regions = read_count(array_containing_table, table_start)?;
        let mut table_length = 1 + 2 * num_interp_regions;
        let num_data_points_per_vec = read_count(array_containing_table, table_start + table_length)?;
        table_length += 1 + 2 * num_data_points_per_vec;
        Ok(table_length)
    }

    pub fn x_min(&self) -> Result<f64, InterpolationError> {
        self.first().map(|region| region.x_min()).ok_or(InterpolationError::EmptyTable)
    }

    pub fn x_max(&self) -> Result<f64, InterpolationError> {
        self.last().map(|region| region.x_max()).ok_or(InterpolationError::EmptyTable)
    }

    // Interpolate a value from the table
    pub fn interpolate(&self, x_val: f64) -> Result<f64, InterpolationError> {
        if self.is_empty() {
            return Err(InterpolationError::EmptyTable);
        }
        let region = self
            .iter()
            .find(|region| region.contains(x_val))
            .ok_or(InterpolationError::OutOfBounds(x_val))?;

        // Find the index of the bin that x_val falls into
        let idx = match region.data.binary_search_by(|xy| xy.x.total_cmp(&x_val)) {
            // We are exactly on a data point, exit early by returning the value
            Ok(idx) => return Ok(region.data[idx].y),
            // We are inside a bin
            Err(idx) => idx - 1,
        };

        let start = &region.data[idx];
        let end = &region.data[idx + 1];

        region
            .interpolation_scheme
            .interpolate(start.x, end.x, start.y, end.y, x_val)
    }

    // Interpolate, holding the end values constant outside of the table
    pub fn interpolate_clamped(&self, x_val: f64) -> Result<f64, InterpolationError> {
        let (x_min, x_max) = (self.x_min()?, self.x_max()?);
        if x_val <= x_min {
            return Ok(self[0].data[0].y);
        }
        if x_val >= x_max {
            let region = &self[self.len() - 1];
            return Ok(region.data[region.data.len() - 1].y);
        }
        self.interpolate(x_val)
    }
}
