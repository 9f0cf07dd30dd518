use num_enum::{IntoPrimitive, TryFromPrimitive};
use strum_macros::Display;

use crate::interpolation::InterpolationError;

//=====================================================================
// Enum for possible interpolation schemes from ENDF standard.
//=====================================================================
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Eq, Hash, Display, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum InterpolationScheme {
    Histogram = 1,
    LinLin = 2,
    LinLog = 3,
    LogLin = 4,
    LogLog = 5,
    Gamow = 6,
}

impl InterpolationScheme {
    // Decode an ENDF interpolation flag stored in an ACE array
    pub fn from_ace(value: f64) -> Result<Self, InterpolationError> {
        let flag = value.round();
        if (value - flag).abs() > 1e-6 || !(0.0..=255.0).contains(&flag) {
            return Err(InterpolationError::UnknownScheme(value));
        }
        Self::try_from(flag as u8).map_err(|_| InterpolationError::UnknownScheme(value))
    }

    // Interpolate between (x0, y0) and (x1, y1). Logarithmic schemes fall
    // back to linear when a coordinate they need the logarithm of is not
    // positive.
    pub fn interpolate(&self, x0: f64, x1: f64, y0: f64, y1: f64, x: f64) -> Result<f64, InterpolationError> {
        if x1 == x0 {
            return Ok(y0);
        }
        let linear = || y0 + (y1 - y0) * (x - x0) / (x1 - x0);
        let value = match self {
            InterpolationScheme::Histogram => y0,
            InterpolationScheme::LinLin => linear(),
            InterpolationScheme::LinLog => {
                if x0 > 0.0 && x > 0.0 {
                    y0 + (y1 - y0) * (x / x0).ln() / (x1 / x0).ln()
                } else {
                    linear()
                }
            }
            InterpolationScheme::LogLin => {
                if y0 > 0.0 && y1 > 0.0 {
                    y0 * ((x - x0) * (y1 / y0).ln() / (x1 - x0)).exp()
                } else {
                    linear()
                }
            }
            InterpolationScheme::LogLog => {
                if x0 > 0.0 && x > 0.0 && y0 > 0.0 && y1 > 0.0 {
                    y0 * ((x / x0).ln() * (y1 / y0).ln() / (x1 / x0).ln()).exp()
                } else {
                    linear()
                }
            }
            InterpolationScheme::Gamow => return Err(InterpolationError::UnsupportedScheme(*self)),
        };
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_abs_diff_eq;

    #[test]
    fn test_from_ace() {
        assert_eq!(InterpolationScheme::from_ace(1.0).unwrap(), InterpolationScheme::Histogram);
        assert_eq!(InterpolationScheme::from_ace(5.0).unwrap(), InterpolationScheme::LogLog);
        assert!(InterpolationScheme::from_ace(7.0).is_err());
        assert!(InterpolationScheme::from_ace(2.5).is_err());
        assert_eq!(u8::from(InterpolationScheme::LinLog), 3);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", InterpolationScheme::LinLin), "LinLin");
        assert_eq!(format!("{}", InterpolationScheme::Gamow), "Gamow");
    }

    #[test]
    fn test_schemes_between_two_points() {
        let (x0, x1, y0, y1) = (1.0, 10.0, 2.0, 20.0);
        assert_abs_diff_eq!(InterpolationScheme::Histogram.interpolate(x0, x1, y0, y1, 5.0).unwrap(), 2.0);
        assert_abs_diff_eq!(InterpolationScheme::LinLin.interpolate(x0, x1, y0, y1, 5.5).unwrap(), 11.0, epsilon = 1e-12);
        // y linear in ln(x), halfway in log space
        assert_abs_diff_eq!(InterpolationScheme::LinLog.interpolate(x0, x1, y0, y1, 10f64.sqrt()).unwrap(), 11.0, epsilon = 1e-12);
        // ln(y) linear in x
        assert_abs_diff_eq!(
            InterpolationScheme::LogLin.interpolate(x0, x1, y0, y1, 5.5).unwrap(),
            2.0 * 10f64.sqrt(),
            epsilon = 1e-12
        );
        // power law y = 2x
        assert_abs_diff_eq!(InterpolationScheme::LogLog.interpolate(x0, x1, y0, y1, 3.0).unwrap(), 6.0, epsilon = 1e-12);
        assert!(InterpolationScheme::Gamow.interpolate(x0, x1, y0, y1, 3.0).is_err());
    }

    #[test]
    fn test_log_schemes_fall_back_on_zero() {
        let value = InterpolationScheme::LogLog.interpolate(1.0, 3.0, 0.0, 2.0, 2.0).unwrap();
        assert_abs_diff_eq!(value, 1.0, epsilon = 1e-12);
    }
}
