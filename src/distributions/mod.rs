mod discrete;
mod equiprobable_bins;
mod exponential;
mod one_d;
mod tabular;
mod two_d;
mod uniform;

pub use discrete::DiscreteDistribution;
pub use equiprobable_bins::EquiprobableBinsDistribution;
pub use exponential::ExponentialDistribution;
pub use one_d::{OneD, OneDDistribution};
pub use tabular::{TabularDistribution, TabularScheme};
pub use two_d::{TwoDBoundaryPolicy, TwoDDistribution, TwoDGridInterpolation, TwoDSamplingPolicy};
pub use uniform::UniformDistribution;
