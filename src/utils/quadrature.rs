use crate::error::{Result, TransportError};

//=====================================================================
// Adaptive Gauss-Kronrod (7/15 point) quadrature.
//
// Intervals whose Kronrod/Gauss difference exceeds the tolerance are
// bisected until either every interval converges or the maximum
// number of subintervals is reached. Hitting the cap is logged and
// the best estimate is returned.
//=====================================================================
const KRONROD_NODES: [f64; 8] = [
    0.991455371120812639206854697526329,
    0.949107912342758524526189684047851,
    0.864864423359769072789712788640926,
    0.741531185599394439863864773280788,
    0.586087235467691130294144845693013,
    0.405845151377397166906606412076961,
    0.207784955007898467600689403773245,
    0.000000000000000000000000000000000,
];

const KRONROD_WEIGHTS: [f64; 8] = [
    0.022935322010529224963732008058970,
    0.063092092629978553290700663189204,
    0.104790010322250183839876322541518,
    0.140653259715525918745189590510238,
    0.169004726639267902826583426598550,
    0.190350578064785409913256402421014,
    0.204432940075298892414161999234649,
    0.209482141084727828012999174891714,
];

// Gauss weights for the odd Kronrod nodes (1, 3, 5, 7)
const GAUSS_WEIGHTS: [f64; 4] = [
    0.129484966168869693270611432679082,
    0.279705391489276667901467771423780,
    0.381830050505118944950369775488975,
    0.417959183673469387755102040816327,
];

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GaussKronrodIntegrator {
    pub relative_tolerance: f64,
    pub absolute_tolerance: f64,
    pub max_subintervals: usize,
}

impl Default for GaussKronrodIntegrator {
    fn default() -> Self {
        Self {
            relative_tolerance: 1e-10,
            absolute_tolerance: 1e-14,
            max_subintervals: 1000,
        }
    }
}

#[derive(Debug, Clone, Copy)]
struct Interval {
    lower: f64,
    upper: f64,
    value: f64,
    error: f64,
}

impl GaussKronrodIntegrator {
    pub fn new(relative_tolerance: f64) -> Self {
        Self { relative_tolerance, ..Self::default() }
    }

    // Integrate f over [lower, upper], returning (estimate, error estimate)
    pub fn integrate<F>(&self, f: F, lower: f64, upper: f64) -> Result<(f64, f64)>
    where
        F: Fn(f64) -> f64,
    {
        self.try_integrate(|x| Ok(f(x)), lower, upper)
    }

    // As `integrate`, the first integrand error aborts the quadrature
    pub fn try_integrate<F>(&self, f: F, lower: f64, upper: f64) -> Result<(f64, f64)>
    where
        F: Fn(f64) -> Result<f64>,
    {
        if !(lower.is_finite() && upper.is_finite()) {
            return Err(TransportError::out_of_range("integration limit", if lower.is_finite() { upper } else { lower }, f64::MIN, f64::MAX));
        }
        if lower == upper {
            return Ok((0.0, 0.0));
        }
        if lower > upper {
            let (value, error) = self.try_integrate(f, upper, lower)?;
            return Ok((-value, error));
        }

        let mut intervals = vec![Self::rule(&f, lower, upper)?];
        loop {
            let total: f64 = intervals.iter().map(|interval| interval.value).sum();
            let error: f64 = intervals.iter().map(|interval| interval.error).sum();
            let tolerance = self.absolute_tolerance.max(self.relative_tolerance * total.abs());

            if !total.is_finite() {
                return Err(TransportError::data_integrity(
                    "Gauss-Kronrod quadrature",
                    format!("integrand is not finite on [{}, {}]", lower, upper),
                ));
            }
            if error <= tolerance {
                return Ok((total, error));
            }
            if intervals.len() >= self.max_subintervals {
                log::warn!(
                    "Gauss-Kronrod quadrature on [{}, {}] stopped at {} subintervals (error {:e}, tolerance {:e})",
                    lower, upper, intervals.len(), error, tolerance
                );
                return Ok((total, error));
            }

            // Bisect the interval with the largest error
            let worst = intervals
                .iter()
                .enumerate()
                .max_by(|(_, a), (_, b)| a.error.total_cmp(&b.error))
                .map(|(index, _)| index)
                .unwrap_or(0);
            let interval = intervals.swap_remove(worst);
            let midpoint = 0.5 * (interval.lower + interval.upper);
            intervals.push(Self::rule(&f, interval.lower, midpoint)?);
            intervals.push(Self::rule(&f, midpoint, interval.upper)?);
        }
    }

    fn rule<F: Fn(f64) -> Result<f64>>(f: &F, lower: f64, upper: f64) -> Result<Interval> {
        let center = 0.5 * (lower + upper);
        let half_length = 0.5 * (upper - lower);

        let center_value = f(center)?;
        let mut kronrod = KRONROD_WEIGHTS[7] * center_value;
        let mut gauss = GAUSS_WEIGHTS[3] * center_value;

        for i in 0..7 {
            let offset = half_length * KRONROD_NODES[i];
            let pair = f(center - offset)? + f(center + offset)?;
            kronrod += KRONROD_WEIGHTS[i] * pair;
            if i % 2 == 1 {
                gauss += GAUSS_WEIGHTS[i / 2] * pair;
            }
        }

        Ok(Interval {
            lower,
            upper,
            value: kronrod * half_length,
            error: ((kronrod - gauss) * half_length).abs(),
        })
    }
}
