mod handler;
mod material;
mod scattering_center;

pub use handler::CollisionHandler;
pub use material::{AdjointElectronMaterial, ElectronMaterial, Material, NeutronMaterial, PhotonMaterial};
pub use scattering_center::{AdjointElectroatom, Electroatom, Nuclide, Photoatom, ScatteringCenter};
