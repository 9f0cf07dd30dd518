use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumIter, Serialize, Deserialize)]
pub enum ParticleType {
    Neutron,
    Photon,
    Electron,
    Positron,
    AdjointElectron,
}

impl ParticleType {
    pub fn is_adjoint(&self) -> bool {
        matches!(self, ParticleType::AdjointElectron)
    }

    pub fn is_charged(&self) -> bool {
        matches!(self, ParticleType::Electron | ParticleType::Positron | ParticleType::AdjointElectron)
    }
}
