use std::collections::VecDeque;

use crate::particle::{ParticleState, ParticleType};

//=====================================================================
// Particles created during a history, waiting to be transported.
//
// Reactions only ever push, the history loop drains the bank from the
// front. One bank per in-flight history, no internal locking.
//=====================================================================
#[derive(Debug, Clone, Default)]
pub struct ParticleBank {
    queue: VecDeque<ParticleState>,
}

impl ParticleBank {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self { queue: VecDeque::with_capacity(capacity) }
    }

    pub fn push(&mut self, particle: ParticleState) {
        self.queue.push_back(particle);
    }

    pub fn pop(&mut self) -> Option<ParticleState> {
        self.queue.pop_front()
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    pub fn len(&self) -> usize {
        self.queue.len()
    }

    pub fn clear(&mut self) {
        self.queue.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParticleState> {
        self.queue.iter()
    }

    // Number of banked particles of one type
    pub fn count(&self, particle_type: ParticleType) -> usize {
        self.queue.iter().filter(|particle| particle.particle_type == particle_type).count()
    }
}

impl Extend<ParticleState> for ParticleBank {
    fn extend<T: IntoIterator<Item = ParticleState>>(&mut self, iter: T) {
        self.queue.extend(iter);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_in_first_out() {
        let mut bank = ParticleBank::new();
        assert!(bank.is_empty());
        bank.push(ParticleState::new(ParticleType::Neutron, 1.0));
        bank.push(ParticleState::new(ParticleType::Photon, 2.0));
        assert_eq!(bank.len(), 2);
        assert_eq!(bank.count(ParticleType::Photon), 1);

        assert_eq!(bank.pop().unwrap().energy, 1.0);
        assert_eq!(bank.pop().unwrap().energy, 2.0);
        assert!(bank.pop().is_none());
    }
}
