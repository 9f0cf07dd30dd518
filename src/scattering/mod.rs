pub mod adjoint;
pub mod electron;
pub mod neutron;
pub mod photon;
mod subshell;
mod traits;

pub use subshell::Subshell;
pub use traits::{IntegratedCrossSection, ScatterAdjoint, ScatterParticle, ScatteringDistribution, ScatteringSample};
