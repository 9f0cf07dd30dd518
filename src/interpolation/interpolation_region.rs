use crate::interpolation::{InterpolationError, InterpolationScheme};

//=====================================================================
// X/Y pair for interpolation.
//=====================================================================
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct XY {
    pub x: f64,
    pub y: f64,
}

//=====================================================================
// Interpolation region. This contains a set of X/Y pairs and the
// interpolation scheme to be used in the region.
//=====================================================================
#[derive(Debug, Clone, PartialEq)]
pub struct InterpolationRegion {
    pub data: Vec<XY>,
    pub interpolation_scheme: InterpolationScheme,
}

impl InterpolationRegion {
    pub fn from_x_and_y(x: Vec<f64>, y: Vec<f64>, interpolation_scheme: InterpolationScheme) -> Result<Self, InterpolationError> {
        if x.len() != y.len() {
            return Err(InterpolationError::Malformed(format!(
                "x ({}) and y ({}) vectors must be of the same length",
                x.len(),
                y.len()
            )));
        }
        if x.is_empty() {
            return Err(InterpolationError::EmptyTable);
        }

        let data = x.into_iter().zip(y).map(|(x, y)| XY { x, y }).collect();

        Ok(Self { data, interpolation_scheme })
    }

    #[inline]
    pub fn x_min(&self) -> f64 {
        self.data[0].x
    }

    #[inline]
    pub fn x_max(&self) -> f64 {
        self.data[self.data.len() - 1].x
    }

    pub fn contains(&self, x: f64) -> bool {
        self.x_min() <= x && x <= self.x_max()
    }
}
