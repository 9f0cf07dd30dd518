use crate::particle::ParticleType;

//=====================================================================
// Mutable state of one particle during a history. Energies in MeV,
// times in seconds, directions are unit vectors.
//=====================================================================
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleState {
    pub particle_type: ParticleType,
    pub energy: f64,
    pub position: [f64; 3],
    pub direction: [f64; 3],
    pub weight: f64,
    pub time: f64,
    pub collision_number: u32,
    pub generation_number: u32,
    pub cell: Option<u64>,
    alive: bool,
}

impl ParticleState {
    // Particle at the origin travelling along +z with unit weight
    pub fn new(particle_type: ParticleType, energy: f64) -> Self {
        Self {
            particle_type,
            energy,
            position: [0.0; 3],
            direction: [0.0, 0.0, 1.0],
            weight: 1.0,
            time: 0.0,
            collision_number: 0,
            generation_number: 0,
            cell: None,
            alive: true,
        }
    }

    pub fn with_direction(mut self, direction: [f64; 3]) -> Self {
        self.direction = direction;
        self
    }

    pub fn in_cell(mut self, cell: u64) -> Self {
        self.cell = Some(cell);
        self
    }

    // Same type, phase space and weight, one generation later
    pub fn spawn_copy(&self) -> Self {
        Self {
            collision_number: 0,
            generation_number: self.generation_number + 1,
            ..self.clone()
        }
    }

    // New particle born at this particle's position and time
    pub fn spawn_secondary(&self, particle_type: ParticleType, energy: f64, direction: [f64; 3]) -> Self {
        Self {
            particle_type,
            energy,
            direction,
            collision_number: 0,
            generation_number: self.generation_number + 1,
            ..self.clone()
        }
    }

    pub fn increment_collision_number(&mut self) {
        self.collision_number += 1;
    }

    pub fn kill(&mut self) {
        self.alive = false;
    }

    pub fn is_alive(&self) -> bool {
        self.alive
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_spawned_particles_are_next_generation() {
        let mut neutron = ParticleState::new(ParticleType::Neutron, 2.0).in_cell(4);
        neutron.time = 1e-6;
        neutron.increment_collision_number();

        let copy = neutron.spawn_copy();
        assert_eq!(copy.generation_number, 1);
        assert_eq!(copy.collision_number, 0);
        assert_eq!(copy.energy, 2.0);
        assert_eq!(copy.cell, Some(4));

        let photon = neutron.spawn_secondary(ParticleType::Photon, 0.5, [1.0, 0.0, 0.0]);
        assert_eq!(photon.particle_type, ParticleType::Photon);
        assert_eq!(photon.time, 1e-6);
        assert_eq!(photon.direction, [1.0, 0.0, 0.0]);
    }

    #[test]
    fn test_kill() {
        let mut electron = ParticleState::new(ParticleType::Electron, 1.0);
        assert!(electron.is_alive());
        electron.kill();
        assert!(!electron.is_alive());
    }
}
