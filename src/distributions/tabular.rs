use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::distributions::OneD;
use crate::error::{Result, TransportError, check_range};
use crate::interpolation::InterpolationScheme;
use crate::unitf64::UnitF64;
use crate::utils::{check_ascending, search_bin};

//=====================================================================
// Shape of a tabular distribution between two grid points. Each scheme
// has a closed form bin integral, and all but LinLog a closed form
// inverse of it. LogLogCos interpolates log-log in (1 - mu) and is
// meant for cosines bounded by 1.
//=====================================================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum TabularScheme {
    Histogram,
    LinLin,
    LinLog,
    LogLin,
    LogLog,
    LogLogCos,
}

impl TabularScheme {
    pub fn from_interpolation(scheme: InterpolationScheme) -> Result<Self> {
        match scheme {
            InterpolationScheme::Histogram => Ok(TabularScheme::Histogram),
            InterpolationScheme::LinLin => Ok(TabularScheme::LinLin),
            InterpolationScheme::LinLog => Ok(TabularScheme::LinLog),
            InterpolationScheme::LogLin => Ok(TabularScheme::LogLin),
            InterpolationScheme::LogLog => Ok(TabularScheme::LogLog),
            InterpolationScheme::Gamow => Err(TransportError::data_integrity(
                "tabular distribution",
                "Gamow interpolation cannot describe a distribution",
            )),
        }
    }
}

// Exponents closer than this to the closed form singularities use the limiting forms
const SINGULAR_EXPONENT: f64 = 1e-12;
const MAX_NEWTON_ITERATIONS: usize = 100;

//=====================================================================
// Piecewise-interpolated distribution over an ascending grid.
//=====================================================================
#[derive(Debug, Clone, PartialEq)]
pub struct TabularDistribution {
    scheme: TabularScheme,
    x: Vec<f64>,
    y: Vec<f64>,
    // Unnormalized integral from x[0] to x[i]
    cumulative: Vec<f64>,
}

impl TabularDistribution {
    pub fn new(scheme: TabularScheme, x: Vec<f64>, y: Vec<f64>) -> Result<Self> {
        let context = format!("{} tabular distribution", scheme);
        if x.len() < 2 || x.len() != y.len() {
            return Err(TransportError::data_integrity(
                context,
                format!("needs at least two points and equal grid lengths, found {} and {}", x.len(), y.len()),
            ));
        }
        check_ascending(&x, &context)?;
        if let Some(value) = y.iter().find(|value| !(value.is_finite() && **value >= 0.0)) {
            return Err(TransportError::data_integrity(context, format!("found invalid value {}", value)));
        }
        if scheme == TabularScheme::LogLogCos && (x[0] < -1.0 || x[x.len() - 1] > 1.0) {
            return Err(TransportError::data_integrity(context, "cosine grid must lie inside [-1, 1]"));
        }

        let mut distribution = Self { scheme, x, y, cumulative: Vec::new() };
        let mut cumulative = Vec::with_capacity(distribution.x.len());
        cumulative.push(0.0);
        for i in 0..distribution.x.len() - 1 {
            let integral = distribution.partial_integral(i, distribution.x[i + 1]);
            cumulative.push(cumulative[i] + integral);
        }
        if !(cumulative[cumulative.len() - 1] > 0.0) {
            return Err(TransportError::data_integrity(context, "distribution integrates to zero"));
        }
        distribution.cumulative = cumulative;
        Ok(distribution)
    }

    // Histogram distribution whose density reproduces a tabulated CDF
    pub fn from_cdf(x: Vec<f64>, cdf: Vec<f64>) -> Result<Self> {
        if x.len() < 2 || x.len() != cdf.len() {
            return Err(TransportError::data_integrity(
                "tabulated CDF",
                format!("needs at least two points and equal grid lengths, found {} and {}", x.len(), cdf.len()),
            ));
        }
        let mut density: Vec<f64> = x
            .windows(2)
            .zip(cdf.windows(2))
            .map(|(x, c)| (c[1] - c[0]) / (x[1] - x[0]))
            .collect();
        density.push(density[density.len() - 1]);
        Self::new(TabularScheme::Histogram, x, density)
    }

    pub fn scheme(&self) -> TabularScheme {
        self.scheme
    }

    pub fn x(&self) -> &[f64] {
        &self.x
    }

    pub fn y(&self) -> &[f64] {
        &self.y
    }

    // Scheme actually used in bin i. Logarithmic schemes fall back to
    // lin-lin where a logarithm they need is undefined.
    fn bin_scheme(&self, i: usize) -> TabularScheme {
        let (x0, x1, y0, y1) = (self.x[i], self.x[i + 1], self.y[i], self.y[i + 1]);
        let fallback = |valid: bool, scheme| if valid { scheme } else { TabularScheme::LinLin };
        match self.scheme {
            TabularScheme::LinLog => fallback(x0 > 0.0, TabularScheme::LinLog),
            TabularScheme::LogLin => fallback(y0 > 0.0 && y1 > 0.0, TabularScheme::LogLin),
            TabularScheme::LogLog => fallback(x0 > 0.0 && y0 > 0.0 && y1 > 0.0, TabularScheme::LogLog),
            TabularScheme::LogLogCos => fallback(1.0 - x1 > 0.0 && y0 > 0.0 && y1 > 0.0, TabularScheme::LogLogCos),
            scheme => scheme,
        }
    }

    fn bin_value(&self, i: usize, x: f64) -> f64 {
        let (x0, x1, y0, y1) = (self.x[i], self.x[i + 1], self.y[i], self.y[i + 1]);
        match self.bin_scheme(i) {
            TabularScheme::Histogram => y0,
            TabularScheme::LinLin => y0 + (y1 - y0) * (x - x0) / (x1 - x0),
            TabularScheme::LinLog => y0 + (y1 - y0) * (x / x0).ln() / (x1 / x0).ln(),
            TabularScheme::LogLin => y0 * ((x - x0) * (y1 / y0).ln() / (x1 - x0)).exp(),
            TabularScheme::LogLog => y0 * (x / x0).powf((y1 / y0).ln() / (x1 / x0).ln()),
            TabularScheme::LogLogCos => {
                let (t0, t1, t) = (1.0 - x0, 1.0 - x1, 1.0 - x);
                y0 * (t / t0).powf((y1 / y0).ln() / (t1 / t0).ln())
            }
        }
    }

    // Integral of the bin i density from x[i] to x
    fn partial_integral(&self, i: usize, x: f64) -> f64 {
        let (x0, x1, y0, y1) = (self.x[i], self.x[i + 1], self.y[i], self.y[i + 1]);
        let d = x - x0;
        match self.bin_scheme(i) {
            TabularScheme::Histogram => y0 * d,
            TabularScheme::LinLin => y0 * d + 0.5 * (y1 - y0) / (x1 - x0) * d * d,
            TabularScheme::LinLog => {
                let k = (y1 - y0) / (x1 / x0).ln();
                y0 * d + k * (x * (x / x0).ln() - d)
            }
            TabularScheme::LogLin => {
                let b = (y1 / y0).ln() / (x1 - x0);
                if (b * (x1 - x0)).abs() < SINGULAR_EXPONENT {
                    y0 * d
                } else {
                    y0 * (b * d).exp_m1() / b
                }
            }
            TabularScheme::LogLog => {
                let b = (y1 / y0).ln() / (x1 / x0).ln();
                if (b + 1.0).abs() < SINGULAR_EXPONENT {
                    y0 * x0 * (x / x0).ln()
                } else {
                    y0 * x0 / (b + 1.0) * ((x / x0).powf(b + 1.0) - 1.0)
                }
            }
            TabularScheme::LogLogCos => {
                let (t0, t1, t) = (1.0 - x0, 1.0 - x1, 1.0 - x);
                let b = (y1 / y0).ln() / (t1 / t0).ln();
                if (b + 1.0).abs() < SINGULAR_EXPONENT {
                    y0 * t0 * (t0 / t).ln()
                } else {
                    y0 * t0 / (b + 1.0) * (1.0 - (t / t0).powf(b + 1.0))
                }
            }
        }
    }

    // Point of bin i where the partial integral reaches `target`
    fn invert_bin(&self, i: usize, target: f64) -> f64 {
        let (x0, x1, y0, y1) = (self.x[i], self.x[i + 1], self.y[i], self.y[i + 1]);
        let x = match self.bin_scheme(i) {
            TabularScheme::Histogram => {
                if y0 > 0.0 { x0 + target / y0 } else { x0 }
            }
            TabularScheme::LinLin => {
                let slope = (y1 - y0) / (x1 - x0);
                let root = (y0 * y0 + 2.0 * slope * target).max(0.0).sqrt();
                if y0 + root > 0.0 { x0 + 2.0 * target / (y0 + root) } else { x0 }
            }
            TabularScheme::LinLog => self.invert_bin_numerically(i, target),
            TabularScheme::LogLin => {
                let b = (y1 / y0).ln() / (x1 - x0);
                if (b * (x1 - x0)).abs() < SINGULAR_EXPONENT {
                    x0 + target / y0
                } else {
                    x0 + (b * target / y0).ln_1p() / b
                }
            }
            TabularScheme::LogLog => {
                let b = (y1 / y0).ln() / (x1 / x0).ln();
                if (b + 1.0).abs() < SINGULAR_EXPONENT {
                    x0 * (target / (y0 * x0)).exp()
                } else {
                    x0 * (1.0 + target * (b + 1.0) / (y0 * x0)).max(0.0).powf(1.0 / (b + 1.0))
                }
            }
            TabularScheme::LogLogCos => {
                let (t0, t1) = (1.0 - x0, 1.0 - x1);
                let b = (y1 / y0).ln() / (t1 / t0).ln();
                let t = if (b + 1.0).abs() < SINGULAR_EXPONENT {
                    t0 * (-target / (y0 * t0)).exp()
                } else {
                    t0 * (1.0 - target * (b + 1.0) / (y0 * t0)).max(0.0).powf(1.0 / (b + 1.0))
                };
                1.0 - t
            }
        };
        x.clamp(x0, x1)
    }

    // Safeguarded Newton iteration, the partial integral is monotone
    fn invert_bin_numerically(&self, i: usize, target: f64) -> f64 {
        let (mut lower, mut upper) = (self.x[i], self.x[i + 1]);
        let bin_integral = self.partial_integral(i, upper);
        let mut x = lower + (upper - lower) * (target / bin_integral).clamp(0.0, 1.0);
        for _ in 0..MAX_NEWTON_ITERATIONS {
            let residual = self.partial_integral(i, x) - target;
            if residual.abs() <= 1e-14 * bin_integral.max(f64::MIN_POSITIVE) {
                break;
            }
            if residual > 0.0 {
                upper = x;
            } else {
                lower = x;
            }
            let slope = self.bin_value(i, x);
            let newton = x - residual / slope;
            x = if slope > 0.0 && newton > lower && newton < upper { newton } else { 0.5 * (lower + upper) };
        }
        x
    }

    fn check_domain(&self, x: f64) -> Result<usize> {
        check_range("tabular distribution argument", x, self.x[0], self.x[self.x.len() - 1])?;
        Ok(search_bin(&self.x, x))
    }

    // Sample and report the bin the sample fell in
    pub fn sample_with_bin_index(&self, random_number: UnitF64) -> (f64, usize) {
        let total = self.normalization_constant();
        let target = random_number.0 * total;
        let bin = self
            .cumulative
            .partition_point(|&value| value <= target)
            .saturating_sub(1)
            .min(self.x.len() - 2);
        (self.invert_bin(bin, target - self.cumulative[bin]), bin)
    }
}

impl OneD for TabularDistribution {
    fn evaluate(&self, x: f64) -> Result<f64> {
        let bin = self.check_domain(x)?;
        if x == self.x[bin + 1] {
            return Ok(self.y[bin + 1]);
        }
        Ok(self.bin_value(bin, x))
    }

    fn evaluate_pdf(&self, x: f64) -> Result<f64> {
        Ok(self.evaluate(x)? / self.normalization_constant())
    }

    fn evaluate_cdf(&self, x: f64) -> Result<f64> {
        let bin = self.check_domain(x)?;
        let cdf = (self.cumulative[bin] + self.partial_integral(bin, x)) / self.normalization_constant();
        Ok(cdf.clamp(0.0, 1.0))
    }

    fn sample_with_random_number(&self, random_number: UnitF64) -> f64 {
        self.sample_with_bin_index(random_number).0
    }

    fn lower_bound(&self) -> f64 {
        self.x[0]
    }

    fn upper_bound(&self) -> f64 {
        self.x[self.x.len() - 1]
    }

    fn normalization_constant(&self) -> f64 {
        self.cumulative[self.cumulative.len() - 1]
    }
}
