use std::path::Path;

use anyhow::{Context, ensure};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter};

use crate::constants::{ELASTIC_ANGLE_COSINE_PEAK, KAHN_SAMPLING_CUTOFF_ENERGY};
use crate::distributions::{TwoDGridInterpolation, TwoDSamplingPolicy};
use crate::particle::ParticleType;
use crate::scattering::electron::{BremsstrahlungAngularModel, ElasticUnionSampling};
use crate::scattering::photon::PairProductionMode;

// Particles followed by the simulation, secondaries of other types are not banked
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumIter, Serialize, Deserialize)]
pub enum ParticleMode {
    #[default]
    Neutron,
    Photon,
    Electron,
    NeutronPhoton,
    PhotonElectron,
    NeutronPhotonElectron,
}

impl ParticleMode {
    pub fn transports(self, particle_type: ParticleType) -> bool {
        use ParticleMode::*;
        match particle_type {
            ParticleType::Neutron => matches!(self, Neutron | NeutronPhoton | NeutronPhotonElectron),
            ParticleType::Photon => matches!(self, Photon | NeutronPhoton | PhotonElectron | NeutronPhotonElectron),
            ParticleType::Electron | ParticleType::Positron | ParticleType::AdjointElectron => {
                matches!(self, Electron | PhotonElectron | NeutronPhotonElectron)
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumIter, Serialize, Deserialize)]
pub enum IncoherentModel {
    KleinNishina,
    WallerHartree,
    #[default]
    DopplerBroadened,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumIter, Serialize, Deserialize)]
pub enum CoherentModel {
    Thompson,
    #[default]
    FormFactor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Display, EnumIter, Serialize, Deserialize)]
pub enum ElasticElectronMode {
    #[default]
    Analog,
    Cutoff,
    ScreenedRutherford,
    Hybrid,
    MomentPreserving,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GeneralProperties {
    pub mode: ParticleMode,
    // Bins of the hash based energy grid searcher, 0 disables it
    pub hash_grid_bins: usize,
}

impl Default for GeneralProperties {
    fn default() -> Self {
        Self { mode: ParticleMode::default(), hash_grid_bins: 1000 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PhotonProperties {
    pub incoherent_model: IncoherentModel,
    // Overrides the (1 + sqrt 3) m_e c^2 switch between Kahn and Koblinger sampling
    pub kahn_cutoff_energy: Option<f64>,
    pub coherent_model: CoherentModel,
    pub pair_production_mode: PairProductionMode,
    pub create_photoelectrons: bool,
}

impl Default for PhotonProperties {
    fn default() -> Self {
        Self {
            incoherent_model: IncoherentModel::default(),
            kahn_cutoff_energy: None,
            coherent_model: CoherentModel::default(),
            pair_production_mode: PairProductionMode::Simple,
            create_photoelectrons: true,
        }
    }
}

impl PhotonProperties {
    pub fn kahn_cutoff_energy(&self) -> f64 {
        self.kahn_cutoff_energy.unwrap_or(KAHN_SAMPLING_CUTOFF_ENERGY)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ElectronProperties {
    pub elastic_mode: ElasticElectronMode,
    pub elastic_cutoff_angle_cosine: f64,
    pub analog_union_sampling: ElasticUnionSampling,
    pub moment_preserving_angles: usize,
    pub bremsstrahlung_angular_model: BremsstrahlungAngularModel,
    pub sampling_policy: TwoDSamplingPolicy,
    pub grid_interpolation: TwoDGridInterpolation,
    // Relative tolerance of the adaptive quadrature behind moment preserving data
    pub quadrature_tolerance: f64,
}

impl Default for ElectronProperties {
    fn default() -> Self {
        Self {
            elastic_mode: ElasticElectronMode::default(),
            elastic_cutoff_angle_cosine: 0.9,
            analog_union_sampling: ElasticUnionSampling::TwoDUnion,
            moment_preserving_angles: 1,
            bremsstrahlung_angular_model: BremsstrahlungAngularModel::TwoBS,
            sampling_policy: TwoDSamplingPolicy::UnitBase,
            grid_interpolation: TwoDGridInterpolation::LogLogLog,
            quadrature_tolerance: 1e-7,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdjointProperties {
    pub enabled: bool,
}

//=====================================================================
// Simulation properties read from a TOML document. Every section and
// every field is optional, missing values take their defaults.
//
//   [general]
//   mode = "PhotonElectron"
//
//   [electron]
//   elastic_mode = "Hybrid"
//   elastic_cutoff_angle_cosine = 0.9
//=====================================================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SimulationProperties {
    pub general: GeneralProperties,
    pub photon: PhotonProperties,
    pub electron: ElectronProperties,
    pub adjoint: AdjointProperties,
}

impl SimulationProperties {
    pub fn from_toml_str(string: &str) -> anyhow::Result<Self> {
        let properties: Self = toml::from_str(string).context("Could not parse the simulation properties")?;
        properties.validate()?;
        Ok(properties)
    }

    pub fn from_toml_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let string = std::fs::read_to_string(path)
            .with_context(|| format!("Could not read simulation properties from {}", path.display()))?;
        Self::from_toml_str(&string).with_context(|| format!("Invalid simulation properties in {}", path.display()))
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        let electron = &self.electron;
        let cutoff = electron.elastic_cutoff_angle_cosine;
        ensure!((-1.0..=1.0).contains(&cutoff), "elastic cutoff angle cosine {} is outside of [-1, 1]", cutoff);
        if matches!(electron.elastic_mode, ElasticElectronMode::Hybrid | ElasticElectronMode::MomentPreserving) {
            ensure!(
                cutoff <= ELASTIC_ANGLE_COSINE_PEAK,
                "moment preserving elastic scattering needs a cutoff cosine of at most {}, found {}",
                ELASTIC_ANGLE_COSINE_PEAK,
                cutoff
            );
            ensure!(
                (1..=2).contains(&electron.moment_preserving_angles),
                "1 or 2 moment preserving angles are supported, found {}",
                electron.moment_preserving_angles
            );
        }
        ensure!(
            electron.quadrature_tolerance > 0.0 && electron.quadrature_tolerance < 1.0,
            "quadrature tolerance {} is outside of (0, 1)",
            electron.quadrature_tolerance
        );
        if let Some(energy) = self.photon.kahn_cutoff_energy {
            ensure!(energy > 0.0, "Kahn sampling cutoff energy must be positive, found {}", energy);
        }
        Ok(())
    }

    pub fn transports(&self, particle_type: ParticleType) -> bool {
        match particle_type {
            ParticleType::AdjointElectron => self.adjoint.enabled,
            other => self.general.mode.transports(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let properties = SimulationProperties::from_toml_str("").unwrap();
        assert_eq!(properties, SimulationProperties::default());
        assert_eq!(properties.general.mode, ParticleMode::Neutron);
        assert_eq!(properties.photon.kahn_cutoff_energy(), KAHN_SAMPLING_CUTOFF_ENERGY);
        assert!(!properties.transports(ParticleType::Photon));
        assert!(!properties.transports(ParticleType::AdjointElectron));
    }

    #[test]
    fn test_sections() {
        let properties = SimulationProperties::from_toml_str(
            r#"
            [general]
            mode = "PhotonElectron"

            [photon]
            incoherent_model = "WallerHartree"
            kahn_cutoff_energy = 2.0
            pair_production_mode = "Detailed"

            [electron]
            elastic_mode = "Hybrid"
            elastic_cutoff_angle_cosine = 0.95
            bremsstrahlung_angular_model = "Dipole"
            sampling_policy = "Correlated"

            [adjoint]
            enabled = true
            "#,
        )
        .unwrap();
        assert!(properties.transports(ParticleType::Positron));
        assert!(!properties.transports(ParticleType::Neutron));
        assert!(properties.transports(ParticleType::AdjointElectron));
        assert_eq!(properties.photon.incoherent_model, IncoherentModel::WallerHartree);
        assert_eq!(properties.photon.kahn_cutoff_energy(), 2.0);
        assert_eq!(properties.photon.pair_production_mode, PairProductionMode::Detailed);
        assert_eq!(properties.electron.elastic_mode, ElasticElectronMode::Hybrid);
        assert_eq!(properties.electron.bremsstrahlung_angular_model, BremsstrahlungAngularModel::Dipole);
        assert_eq!(properties.electron.sampling_policy, TwoDSamplingPolicy::Correlated);
        // Untouched fields keep their defaults
        assert_eq!(properties.electron.grid_interpolation, TwoDGridInterpolation::LogLogLog);
    }

    #[test]
    fn test_invalid_properties() {
        assert!(SimulationProperties::from_toml_str("[electron]\nelastic_cutoff_angle_cosine = 1.5").is_err());
        assert!(SimulationProperties::from_toml_str("[general]\nmode = \"Muon\"").is_err());
        assert!(SimulationProperties::from_toml_str("[general]\nunknown = 1").is_err());
        assert!(
            SimulationProperties::from_toml_str("[electron]\nelastic_mode = \"Hybrid\"\nelastic_cutoff_angle_cosine = 1.0")
                .is_err()
        );
    }
}
