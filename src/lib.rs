#![allow(clippy::upper_case_acronyms)]

mod constants;
mod error;
mod unitf64;

pub mod arrays;
pub mod blocks;
pub mod collision;
pub mod distributions;
pub mod factory;
pub mod interpolation;
pub mod particle;
pub mod reactions;
pub mod scattering;
pub mod settings;
pub mod utils;

pub use constants::*;
pub use error::{Result, TransportError};
pub use unitf64::UnitF64;
