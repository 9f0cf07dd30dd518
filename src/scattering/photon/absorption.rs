use serde::{Deserialize, Serialize};
use strum_macros::Display;

use crate::constants::ELECTRON_REST_MASS_ENERGY;
use crate::error::{Result, TransportError, check_positive};
use crate::particle::{ParticleBank, ParticleState, ParticleType, sample_isotropic_direction};
use crate::scattering::{ScatterParticle, Subshell};
use crate::utils::RandomNumberStream;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhotoelectricShell {
    pub subshell: Subshell,
    pub binding_energy: f64,
    pub occupancy: f64,
}

//=====================================================================
// Photoelectric absorption. The photon is absorbed by a shell it can
// ionize, chosen by occupancy, and the photoelectron optionally leaves
// isotropically with the photon energy less the binding energy.
//=====================================================================
#[derive(Debug, Clone, Default)]
pub struct PhotoelectricAbsorption {
    shells: Vec<PhotoelectricShell>,
    create_photoelectrons: bool,
}

impl PhotoelectricAbsorption {
    pub fn new(shells: Vec<PhotoelectricShell>, create_photoelectrons: bool) -> Result<Self> {
        if let Some(shell) = shells.iter().find(|shell| !(shell.binding_energy >= 0.0 && shell.occupancy >= 0.0)) {
            return Err(TransportError::data_integrity(
                "photoelectric absorption",
                format!("shell {} has binding energy {} and occupancy {}", shell.subshell, shell.binding_energy, shell.occupancy),
            ));
        }
        Ok(Self { shells, create_photoelectrons })
    }

    // Shells the photon can ionize, weighted by occupancy
    pub fn sample_shell<R: RandomNumberStream + ?Sized>(&self, energy: f64, rng: &mut R) -> Option<&PhotoelectricShell> {
        let open = || self.shells.iter().filter(move |shell| shell.binding_energy < energy);
        let total: f64 = open().map(|shell| shell.occupancy).sum();
        if !(total > 0.0) {
            return None;
        }
        let target = rng.next_uniform() * total;
        let mut cumulative = 0.0;
        let mut last = None;
        for shell in open() {
            cumulative += shell.occupancy;
            last = Some(shell);
            if target < cumulative {
                return Some(shell);
            }
        }
        last
    }
}

impl ScatterParticle for PhotoelectricAbsorption {
    fn scatter<R: RandomNumberStream + ?Sized>(
        &self,
        particle: &mut ParticleState,
        bank: &mut ParticleBank,
        rng: &mut R,
    ) -> Result<Option<Subshell>> {
        check_positive("incoming photon energy", particle.energy)?;
        let shell = self.sample_shell(particle.energy, rng).copied();
        if let (Some(shell), true) = (shell, self.create_photoelectrons) {
            let direction = sample_isotropic_direction(rng);
            let energy = particle.energy - shell.binding_energy;
            bank.push(particle.spawn_secondary(ParticleType::Electron, energy, direction));
        }
        particle.kill();
        Ok(shell.map(|shell| shell.subshell))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize, Deserialize)]
pub enum PairProductionMode {
    // The positron annihilates on the spot into two back to back photons
    Simple,
    // The electron and the positron are both transported
    Detailed,
}

//=====================================================================
// Pair production above 2 m_e c^2.
//
// In simple mode the photon continues as one of the annihilation
// photons and the other is banked. In detailed mode the photon is
// absorbed and the pair, sharing the kinetic energy by one uniform
// draw, moves along the photon direction.
//=====================================================================
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PairProduction {
    mode: PairProductionMode,
}

impl PairProduction {
    pub fn new(mode: PairProductionMode) -> Self {
        Self { mode }
    }

    pub fn mode(&self) -> PairProductionMode {
        self.mode
    }
}

impl ScatterParticle for PairProduction {
    fn scatter<R: RandomNumberStream + ?Sized>(
        &self,
        particle: &mut ParticleState,
        bank: &mut ParticleBank,
        rng: &mut R,
    ) -> Result<Option<Subshell>> {
        let threshold = 2.0 * ELECTRON_REST_MASS_ENERGY;
        if !(particle.energy > threshold) {
            return Err(TransportError::out_of_range("pair production photon energy", particle.energy, threshold, f64::MAX));
        }
        match self.mode {
            PairProductionMode::Simple => {
                let direction = sample_isotropic_direction(rng);
                let opposite = [-direction[0], -direction[1], -direction[2]];
                bank.push(particle.spawn_secondary(ParticleType::Photon, ELECTRON_REST_MASS_ENERGY, opposite));
                particle.energy = ELECTRON_REST_MASS_ENERGY;
                particle.direction = direction;
            }
            PairProductionMode::Detailed => {
                let kinetic = particle.energy - threshold;
                let electron_energy = rng.next_uniform() * kinetic;
                bank.push(particle.spawn_secondary(ParticleType::Electron, electron_energy, particle.direction));
                bank.push(particle.spawn_secondary(ParticleType::Positron, kinetic - electron_energy, particle.direction));
                particle.kill();
            }
        }
        Ok(None)
    }
}
