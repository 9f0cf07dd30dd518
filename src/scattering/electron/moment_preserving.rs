use std::sync::Arc;

use crate::constants::ELASTIC_ANGLE_COSINE_PEAK;
use crate::distributions::{
    DiscreteDistribution, OneD, OneDDistribution, TwoDBoundaryPolicy, TwoDDistribution, TwoDGridInterpolation,
    TwoDSamplingPolicy,
};
use crate::error::{Result, TransportError, check_positive, check_range};
use crate::interpolation::{InterpolationScheme, InterpolationTable};
use crate::particle::{ParticleBank, ParticleState, rotate_direction};
use crate::scattering::electron::{CutoffElasticDistribution, screening_parameter};
use crate::scattering::{ScatterParticle, ScatteringDistribution, ScatteringSample, Subshell};
use crate::utils::{GaussKronrodIntegrator, RandomNumberStream};

const PEAK_WIDTH: f64 = 1.0 - ELASTIC_ANGLE_COSINE_PEAK;
const NUMBER_OF_MOMENTS: usize = 4;

// Discrete nodes and weights matching the first 2n normalized moments,
// a Gauss rule for the weight function behind the moments. Only n = 1
// and n = 2 are supported, None when the moments admit no valid rule.
pub fn gauss_rule_from_moments(moments: &[f64], number_of_nodes: usize) -> Option<(Vec<f64>, Vec<f64>)> {
    let mean = *moments.get(1)?;
    if number_of_nodes == 1 {
        return Some((vec![mean], vec![1.0]));
    }
    if number_of_nodes != 2 {
        return None;
    }
    let (second, third) = (*moments.get(2)?, *moments.get(3)?);
    let variance = second - mean * mean;
    if !(variance > 0.0) {
        return None;
    }
    // Orthogonal polynomial t^2 + a t + b
    let a = (mean * second - third) / variance;
    let b = -second - a * mean;
    let discriminant = a * a - 4.0 * b;
    if !(discriminant > 0.0) {
        return None;
    }
    let root = discriminant.sqrt();
    let (low, high) = ((-a - root) / 2.0, (-a + root) / 2.0);
    let high_weight = (mean - low) / (high - low);
    (0.0..=1.0).contains(&high_weight).then(|| (vec![low, high], vec![1.0 - high_weight, high_weight]))
}

// Moment preserving data of one grid energy
#[derive(Debug, Clone, PartialEq)]
pub struct MomentPreservingPoint {
    // Tabulated share below the cutoff cosine
    pub cutoff_fraction: f64,
    // Analog weight above the cutoff cosine, relative to the cutoff cross section
    pub moment_preserving_ratio: f64,
    pub cosines: Vec<f64>,
    pub weights: Vec<f64>,
}

//=====================================================================
// Replaces the analog distribution above a cutoff cosine by a few
// discrete angles.
//
// Moments of s = (1 - mu) / (1 - mu_c) of the analog distribution above
// the cutoff are integrated on every grid energy, the tabulated part bin
// by bin and the screened Rutherford peak on its own interval.
//=====================================================================
#[derive(Debug, Clone)]
pub struct MomentPreservingBuilder {
    pub atomic_number: u32,
    pub cutoff_cosine: f64,
    pub number_of_angles: usize,
    pub integrator: GaussKronrodIntegrator,
}

impl MomentPreservingBuilder {
    pub fn new(atomic_number: u32, cutoff_cosine: f64, number_of_angles: usize) -> Result<Self> {
        check_range("moment preserving cutoff angle cosine", cutoff_cosine, -1.0, ELASTIC_ANGLE_COSINE_PEAK)?;
        if !(1..=2).contains(&number_of_angles) {
            return Err(TransportError::data_integrity(
                "moment preserving elastic",
                format!("{} discrete angles requested, 1 or 2 are supported", number_of_angles),
            ));
        }
        Ok(Self { atomic_number, cutoff_cosine, number_of_angles, integrator: GaussKronrodIntegrator::default() })
    }

    pub fn with_integrator(mut self, integrator: GaussKronrodIntegrator) -> Self {
        self.integrator = integrator;
        self
    }

    fn tabulated_moments(&self, distribution: &OneDDistribution, scale: f64) -> Result<[f64; NUMBER_OF_MOMENTS]> {
        let mut moments = [0.0; NUMBER_OF_MOMENTS];
        let lower = self.cutoff_cosine.max(distribution.lower_bound());
        let upper = distribution.upper_bound().min(ELASTIC_ANGLE_COSINE_PEAK);
        if lower >= upper {
            return Ok(moments);
        }
        let mut breakpoints = vec![lower];
        if let OneDDistribution::Tabular(tabular) = distribution {
            breakpoints.extend(tabular.x().iter().copied().filter(|&x| x > lower && x < upper));
        }
        breakpoints.push(upper);

        for (k, moment) in moments.iter_mut().enumerate() {
            for bin in breakpoints.windows(2) {
                // Interior point of the bin, pdf evaluation at the edges belongs to neighbours
                let integrand = |mu: f64| -> Result<f64> {
                    let pdf = distribution.evaluate_pdf(mu.clamp(bin[0], bin[1]))?;
                    Ok(((1.0 - mu) / scale).powi(k as i32) * pdf)
                };
                *moment += self.integrator.try_integrate(integrand, bin[0], bin[1])?.0;
            }
        }
        Ok(moments)
    }

    fn peak_moments(&self, energy: f64, peak_ratio: f64, scale: f64) -> Result<[f64; NUMBER_OF_MOMENTS]> {
        let mut moments = [0.0; NUMBER_OF_MOMENTS];
        let eta = screening_parameter(energy, self.atomic_number);
        let normalization = eta * (eta + PEAK_WIDTH) / PEAK_WIDTH;
        for (k, moment) in moments.iter_mut().enumerate() {
            let integrand = |t: f64| (t / scale).powi(k as i32) * normalization / (eta + t).powi(2);
            *moment = peak_ratio * self.integrator.integrate(integrand, 0.0, PEAK_WIDTH)?.0;
        }
        Ok(moments)
    }

    pub fn evaluate_point(&self, energy: f64, distribution: &OneDDistribution) -> Result<MomentPreservingPoint> {
        check_positive("moment preserving grid energy", energy)?;
        let cutoff_fraction = if self.cutoff_cosine >= distribution.upper_bound() {
            1.0
        } else {
            distribution.evaluate_cdf(self.cutoff_cosine)?
        };
        let peak_cosine = distribution.upper_bound().min(ELASTIC_ANGLE_COSINE_PEAK);
        let eta = screening_parameter(energy, self.atomic_number);
        let peak_ratio = distribution.evaluate_pdf(peak_cosine)? * PEAK_WIDTH * (eta + PEAK_WIDTH) / eta;

        let scale = 1.0 - self.cutoff_cosine;
        let tabulated = self.tabulated_moments(distribution, scale)?;
        let peak = self.peak_moments(energy, peak_ratio, scale)?;
        let moments: Vec<f64> = tabulated.iter().zip(peak.iter()).map(|(a, b)| a + b).collect();

        let mass = moments[0];
        if !(mass > 0.0) {
            return Err(TransportError::data_integrity(
                "moment preserving elastic",
                format!("no analog weight above mu = {} at {} MeV", self.cutoff_cosine, energy),
            ));
        }
        let normalized: Vec<f64> = moments.iter().map(|moment| moment / mass).collect();
        let (nodes, weights) = gauss_rule_from_moments(&normalized, self.number_of_angles)
            .or_else(|| gauss_rule_from_moments(&normalized, 1))
            .ok_or_else(|| TransportError::data_integrity("moment preserving elastic", "moments admit no discrete angles"))?;

        // Ascending cosines are descending nodes
        let mut pairs: Vec<(f64, f64)> = nodes
            .iter()
            .zip(weights.iter())
            .map(|(s, w)| ((1.0 - scale * s).clamp(self.cutoff_cosine, 1.0), *w))
            .collect();
        pairs.sort_by(|a, b| a.0.total_cmp(&b.0));
        pairs.dedup_by(|a, b| {
            let same = a.0 == b.0;
            if same {
                b.1 += a.1;
            }
            same
        });
        Ok(MomentPreservingPoint {
            cutoff_fraction,
            moment_preserving_ratio: mass,
            cosines: pairs.iter().map(|pair| pair.0).collect(),
            weights: pairs.iter().map(|pair| pair.1).collect(),
        })
    }

    // Discrete angle distribution over the grid of `angular`, with the
    // cached cutoff fractions and moment preserving ratios
    pub fn build(&self, angular: &TwoDDistribution) -> Result<(TwoDDistribution, InterpolationTable, InterpolationTable)> {
        let points = angular
            .grid()
            .iter()
            .zip(angular.distributions())
            .map(|(&energy, distribution)| self.evaluate_point(energy, distribution))
            .collect::<Result<Vec<_>>>()?;

        let grid = angular.grid().to_vec();
        let distributions = points
            .iter()
            .map(|point| {
                Ok(Arc::new(OneDDistribution::Discrete(DiscreteDistribution::new(
                    point.cosines.clone(),
                    point.weights.clone(),
                )?)))
            })
            .collect::<Result<Vec<_>>>()?;
        let discrete = TwoDDistribution::new(
            grid.clone(),
            distributions,
            TwoDSamplingPolicy::Exact,
            TwoDGridInterpolation::LinLinLin,
            TwoDBoundaryPolicy::Clamp,
        )?;
        let cutoff_fractions = InterpolationTable::from_x_and_y(
            grid.clone(),
            points.iter().map(|point| point.cutoff_fraction).collect(),
            InterpolationScheme::LinLin,
        )?;
        let ratios = InterpolationTable::from_x_and_y(
            grid,
            points.iter().map(|point| point.moment_preserving_ratio).collect(),
            InterpolationScheme::LinLin,
        )?;
        log::debug!(
            "built {} moment preserving elastic points above mu = {}",
            points.len(),
            self.cutoff_cosine
        );
        Ok((discrete, cutoff_fractions, ratios))
    }
}

fn check_arguments(incoming_energy: f64, cosine: f64) -> Result<()> {
    check_positive("incoming electron energy", incoming_energy)?;
    check_range("scattering angle cosine", cosine, -1.0, 1.0)
}

//=====================================================================
// Discrete moment preserving angles alone.
//=====================================================================
#[derive(Debug, Clone)]
pub struct MomentPreservingElasticDistribution {
    discrete: TwoDDistribution,
    ratios: InterpolationTable,
}

impl MomentPreservingElasticDistribution {
    pub fn new(angular: &TwoDDistribution, builder: &MomentPreservingBuilder) -> Result<Self> {
        let (discrete, _, ratios) = builder.build(angular)?;
        Ok(Self { discrete, ratios })
    }

    pub fn discrete(&self) -> &TwoDDistribution {
        &self.discrete
    }

    // Moment preserving cross section over the cutoff cross section
    pub fn cross_section_ratio(&self, incoming_energy: f64) -> Result<f64> {
        Ok(self.ratios.interpolate_clamped(incoming_energy)?)
    }
}

impl ScatteringDistribution for MomentPreservingElasticDistribution {
    fn evaluate(&self, incoming_energy: f64, cosine: f64) -> Result<f64> {
        Ok(self.evaluate_pdf(incoming_energy, cosine)? * self.cross_section_ratio(incoming_energy)?)
    }

    fn evaluate_pdf(&self, incoming_energy: f64, cosine: f64) -> Result<f64> {
        check_arguments(incoming_energy, cosine)?;
        self.discrete.evaluate_pdf(incoming_energy, cosine)
    }

    fn evaluate_cdf(&self, incoming_energy: f64, cosine: f64) -> Result<f64> {
        check_arguments(incoming_energy, cosine)?;
        self.discrete.evaluate_cdf(incoming_energy, cosine)
    }

    fn sample_and_record_trials<R: RandomNumberStream + ?Sized>(
        &self,
        incoming_energy: f64,
        rng: &mut R,
        trials: &mut u64,
    ) -> Result<ScatteringSample> {
        check_positive("incoming electron energy", incoming_energy)?;
        *trials += 1;
        Ok(ScatteringSample { energy: incoming_energy, cosine: self.discrete.sample(incoming_energy, rng)? })
    }
}

impl ScatterParticle for MomentPreservingElasticDistribution {
    fn scatter<R: RandomNumberStream + ?Sized>(
        &self,
        particle: &mut ParticleState,
        _bank: &mut ParticleBank,
        rng: &mut R,
    ) -> Result<Option<Subshell>> {
        let sample = self.sample(particle.energy, rng)?;
        particle.direction = rotate_direction(particle.direction, sample.cosine, rng);
        Ok(None)
    }
}

//=====================================================================
// Hybrid elastic scattering: the cutoff distribution below the cutoff
// cosine and the moment preserving angles above it. The probability of
// the cutoff part is cached on the energy grid.
//=====================================================================
#[derive(Debug, Clone)]
pub struct HybridElasticDistribution {
    cutoff: CutoffElasticDistribution,
    moment_preserving: MomentPreservingElasticDistribution,
    cutoff_fractions: InterpolationTable,
}

impl HybridElasticDistribution {
    pub fn new(angular: Arc<TwoDDistribution>, builder: &MomentPreservingBuilder) -> Result<Self> {
        let (discrete, cutoff_fractions, ratios) = builder.build(&angular)?;
        Ok(Self {
            cutoff: CutoffElasticDistribution::new(angular, builder.cutoff_cosine)?,
            moment_preserving: MomentPreservingElasticDistribution { discrete, ratios },
            cutoff_fractions,
        })
    }

    // Hybrid cross section over the cutoff cross section
    pub fn cross_section_ratio(&self, incoming_energy: f64) -> Result<f64> {
        Ok(self.cutoff_fractions.interpolate_clamped(incoming_energy)?
            + self.moment_preserving.cross_section_ratio(incoming_energy)?)
    }

    pub fn cutoff_probability(&self, incoming_energy: f64) -> Result<f64> {
        let cutoff = self.cutoff_fractions.interpolate_clamped(incoming_energy)?;
        let total = self.cross_section_ratio(incoming_energy)?;
        Ok(if total > 0.0 { cutoff / total } else { 1.0 })
    }

    pub fn sample_cosine<R: RandomNumberStream + ?Sized>(&self, incoming_energy: f64, rng: &mut R) -> Result<f64> {
        check_positive("incoming electron energy", incoming_energy)?;
        if rng.next_uniform() < self.cutoff_probability(incoming_energy)? {
            self.cutoff.sample_cosine(incoming_energy, rng)
        } else {
            self.moment_preserving.discrete().sample(incoming_energy, rng)
        }
    }
}

impl ScatteringDistribution for HybridElasticDistribution {
    fn evaluate(&self, incoming_energy: f64, cosine: f64) -> Result<f64> {
        check_arguments(incoming_energy, cosine)?;
        if cosine <= self.cutoff.cutoff_cosine() {
            self.cutoff.angular().evaluate_pdf(incoming_energy, cosine)
        } else {
            self.moment_preserving.evaluate(incoming_energy, cosine)
        }
    }

    fn evaluate_pdf(&self, incoming_energy: f64, cosine: f64) -> Result<f64> {
        let total = self.cross_section_ratio(incoming_energy)?;
        Ok(if total > 0.0 { self.evaluate(incoming_energy, cosine)? / total } else { 0.0 })
    }

    fn evaluate_cdf(&self, incoming_energy: f64, cosine: f64) -> Result<f64> {
        check_arguments(incoming_energy, cosine)?;
        let probability = self.cutoff_probability(incoming_energy)?;
        if cosine <= self.cutoff.cutoff_cosine() {
            Ok(probability * self.cutoff.evaluate_cdf(incoming_energy, cosine)?)
        } else {
            Ok(probability + (1.0 - probability) * self.moment_preserving.evaluate_cdf(incoming_energy, cosine)?)
        }
    }

    fn sample_and_record_trials<R: RandomNumberStream + ?Sized>(
        &self,
        incoming_energy: f64,
        rng: &mut R,
        trials: &mut u64,
    ) -> Result<ScatteringSample> {
        *trials += 1;
        Ok(ScatteringSample { energy: incoming_energy, cosine: self.sample_cosine(incoming_energy, rng)? })
    }
}

impl ScatterParticle for HybridElasticDistribution {
    fn scatter<R: RandomNumberStream + ?Sized>(
        &self,
        particle: &mut ParticleState,
        _bank: &mut ParticleBank,
        rng: &mut R,
    ) -> Result<Option<Subshell>> {
        let cosine = self.sample_cosine(particle.energy, rng)?;
        particle.direction = rotate_direction(particle.direction, cosine, rng);
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use approx::assert_relative_eq;

    use crate::scattering::electron::test_elastic_angular;
    use crate::utils::MockRng;

    #[test]
    fn test_two_point_rule_reproduces_moments() {
        // Moments of the uniform weight on [0, 1]
        let moments = [1.0, 0.5, 1.0 / 3.0, 0.25];
        let (nodes, weights) = gauss_rule_from_moments(&moments, 2).unwrap();
        let offset = 0.5 / 3.0_f64.sqrt();
        assert_relative_eq!(nodes[0], 0.5 - offset, max_relative = 1e-12);
        assert_relative_eq!(nodes[1], 0.5 + offset, max_relative = 1e-12);
        assert_relative_eq!(weights[0], 0.5, max_relative = 1e-12);
        for k in 0..4 {
            let rule: f64 = nodes.iter().zip(&weights).map(|(t, w)| w * t.powi(k as i32)).sum();
            assert_relative_eq!(rule, moments[k], max_relative = 1e-12);
        }
        // A point mass has no two point rule
        assert!(gauss_rule_from_moments(&[1.0, 0.5, 0.25, 0.125], 2).is_none());
    }

    #[test]
    fn test_points_preserve_mean_angle() {
        let angular = test_elastic_angular(TwoDSamplingPolicy::Exact);
        let builder = MomentPreservingBuilder::new(6, 0.9, 2).unwrap();
        let point = builder.evaluate_point(100.0, &angular.distributions()[1]).unwrap();

        // No tabulated weight between 0.9 and the first grid point above it
        assert_relative_eq!(point.cutoff_fraction, 0.1, max_relative = 1e-12);
        assert!(point.moment_preserving_ratio > 0.9);
        assert!(point.cosines.iter().all(|&mu| mu > 0.9 && mu <= 1.0));
        assert_relative_eq!(point.weights.iter().sum::<f64>(), 1.0, max_relative = 1e-12);
        assert!(point.cosines.windows(2).all(|pair| pair[0] < pair[1]));
    }

    #[test]
    fn test_hybrid_cutoff_probability() {
        let angular = test_elastic_angular(TwoDSamplingPolicy::Exact);
        let builder = MomentPreservingBuilder::new(6, 0.9, 1).unwrap();
        let hybrid = HybridElasticDistribution::new(Arc::clone(&angular), &builder).unwrap();
        let analog = crate::scattering::electron::AnalogElasticDistribution::new(
            angular,
            6,
            crate::scattering::electron::ElasticUnionSampling::OneDUnion,
        )
        .unwrap();
        // The hybrid keeps the analog cross section
        assert_relative_eq!(
            hybrid.cross_section_ratio(100.0).unwrap(),
            analog.analog_to_cutoff_ratio(100.0).unwrap(),
            max_relative = 1e-6
        );
        let probability = hybrid.cutoff_probability(100.0).unwrap();
        assert_relative_eq!(probability, 0.1 / hybrid.cross_section_ratio(100.0).unwrap(), max_relative = 1e-12);

        // Above the cutoff probability the single discrete angle is used
        let mut rng = MockRng::new(vec![0.99, 0.5]);
        let cosine = hybrid.sample_cosine(100.0, &mut rng).unwrap();
        assert!(cosine > 0.9);
        let mut rng = MockRng::new(vec![0.0, 0.5]);
        assert!(hybrid.sample_cosine(100.0, &mut rng).unwrap() <= 0.9);
    }

    #[test]
    fn test_moment_preserving_sampling() {
        let angular = test_elastic_angular(TwoDSamplingPolicy::Exact);
        let builder = MomentPreservingBuilder::new(6, 0.0, 2).unwrap();
        let distribution = MomentPreservingElasticDistribution::new(&angular, &builder).unwrap();
        let mut rng = MockRng::new(vec![0.0]);
        let sample = distribution.sample(1e-5, &mut rng).unwrap();
        assert_eq!(sample.cosine, distribution.discrete().distributions()[0].lower_bound());
        assert!(distribution.cross_section_ratio(1e-5).unwrap() > 0.49);
    }
}
