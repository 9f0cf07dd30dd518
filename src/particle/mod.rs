mod bank;
mod direction;
mod particle_type;
mod state;

pub use bank::ParticleBank;
pub use direction::{rotate_direction, rotate_direction_with_azimuth, sample_isotropic_direction};
pub use particle_type::ParticleType;
pub use state::ParticleState;
