mod block_directory;
mod block_types;
mod electron_photon_extractor;
mod neutron_extractor;
mod nu;
mod tyr;

pub use block_directory::{BlockDirectory, BlockEntry, BlockExtractor};
pub use block_types::{BlockLayout, ElectronPhotonBlock, NeutronBlock};
pub use electron_photon_extractor::{ElectronPhotonTableExtractor, EnergyTables, HalfComptonProfile, SubshellData};
pub use neutron_extractor::{NeutronTableExtractor, PrecursorGroup, TabulatedCrossSection};
pub use nu::{NU, NuFormulation};
pub use tyr::{ExitingNeutronData, ExitingNeutronFrameOfReference, NumberOfExitingNeutrons};
