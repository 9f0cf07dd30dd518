mod adjoint;
mod angular;
mod electron;
mod energy_law;
mod native;
mod neutron;
mod photon;

pub use adjoint::{AdjointElectroatomicReaction, AdjointElectroatomicReactionFactory};
pub use angular::{angular_from_land, build_angular_distribution};
pub use electron::{ElectroatomicReaction, ElectroatomicReactionFactory, ElectronDataSource};
pub use energy_law::build_energy_law;
pub use native::{NativeEnergyTables, NativeElectronData, NativeSubshell};
pub use neutron::{NeutronReaction, NeutronReactionFactory};
pub use photon::{PhotoatomicReaction, PhotoatomicReactionFactory};

use crate::error::{Result, TransportError};
use crate::utils::float_to_index;

// Bounds-checked reads into an extracted block; `context` names the
// block and table in the error

pub(crate) fn read_value(block: &[f64], index: usize, context: &str) -> Result<f64> {
    block.get(index).copied().ok_or_else(|| {
        TransportError::data_integrity(
            context,
            format!("entry {} is past the end of a {} entry block", index, block.len()),
        )
    })
}

pub(crate) fn read_index(block: &[f64], index: usize, context: &str) -> Result<usize> {
    float_to_index(read_value(block, index, context)?, context)
}

pub(crate) fn read_slice<'a>(block: &'a [f64], start: usize, length: usize, context: &str) -> Result<&'a [f64]> {
    block.get(start..start + length).ok_or_else(|| {
        TransportError::data_integrity(
            context,
            format!("entries {}..{} are past the end of a {} entry block", start, start + length, block.len()),
        )
    })
}
