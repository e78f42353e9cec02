//! Player owner
//!
//! A player is a core point mass steered by input, plus a swarm of particles
//! pulled toward the core. The pull is attractive far away and repulsive up
//! close, so the swarm settles into a ring whose radius grows with particle
//! mass.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use super::group::ParticleGroup;
use super::owner::{Color, OwnerHandle, OwnerId, ParticleOwner};
use super::particle::ParticleState;
use super::vector::Vector2;
use super::well::TimeWell;
use crate::consts::PHYSICS_STEP;
use crate::error::Result;

/// Swarm particles spawned per player
pub const SWARM_SIZE: usize = 9;

/// Force-law constants for a player and its swarm
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PlayerTuning {
    /// Overall strength of the core's pull
    pub force_coef: f64,
    /// Distance scale of the pull
    pub radius: f64,
    /// Per-unit-mass offset where pull turns into push
    pub gravity: f64,
    /// Velocity damping on swarm particles
    pub friction: f64,
    /// Velocity damping on the core itself
    pub pilot_friction: f64,
}

impl Default for PlayerTuning {
    fn default() -> Self {
        Self {
            force_coef: 0.1,
            radius: 10.0,
            gravity: 2.0,
            friction: 1.2,
            pilot_friction: 0.4,
        }
    }
}

/// An arena player
#[derive(Debug)]
pub struct Player {
    id: OwnerId,
    color: Color,
    tuning: PlayerTuning,
    core: RefCell<ParticleState>,
    input_force: Cell<Vector2>,
}

impl Player {
    pub fn new(id: impl Into<String>, color: Color, location: Vector2) -> Self {
        Self {
            id: OwnerId::new(id),
            color,
            tuning: PlayerTuning::default(),
            core: RefCell::new(ParticleState::at(location)),
            input_force: Cell::new(Vector2::ZERO),
        }
    }

    pub fn with_tuning(mut self, tuning: PlayerTuning) -> Self {
        self.tuning = tuning;
        self
    }

    pub fn tuning(&self) -> &PlayerTuning {
        &self.tuning
    }

    pub fn color(&self) -> Color {
        self.color
    }

    /// Snapshot of the core point mass
    pub fn core(&self) -> ParticleState {
        self.core.borrow().clone()
    }

    pub fn core_position(&self) -> Vector2 {
        self.core.borrow().position
    }

    /// Steering force from the input layer (held until changed)
    pub fn set_input_force(&self, force: Vector2) {
        self.input_force.set(force);
    }

    pub fn clear_input_force(&self) {
        self.input_force.set(Vector2::ZERO);
    }

    pub fn input_force(&self) -> Vector2 {
        self.input_force.get()
    }

    /// Integrate the core one frame under input force minus damping
    pub fn step(&self) -> Result<()> {
        let next = {
            let core = self.core.borrow();
            let force = self.input_force.get() - core.velocity * self.tuning.pilot_friction;
            core.integrate_under(force, PHYSICS_STEP)?
        };
        *self.core.borrow_mut() = next;
        Ok(())
    }

    /// Fresh swarm at the core position, masses spread around 1
    pub fn spawn_swarm(self: &Rc<Self>) -> ParticleGroup {
        let handle = OwnerHandle::new(self);
        let origin = self.core_position();
        let half = (SWARM_SIZE / 2) as i32;
        (-half..=half)
            .map(|i| {
                ParticleState::at(origin)
                    .with_owner(handle.clone())
                    .with_mass(1.0 + i as f64 / 20.0)
            })
            .collect()
    }

    /// Ring-skill time well centered on the core
    pub fn time_well(&self) -> TimeWell {
        TimeWell::ring(self.core_position())
    }
}

impl ParticleOwner for Player {
    fn identity(&self) -> &OwnerId {
        &self.id
    }

    fn force_on(&self, particle: &ParticleState) -> Vector2 {
        let t = &self.tuning;
        let to_core = self.core_position() - particle.position;
        let dist = to_core.length();
        let coef = t.force_coef * (dist / t.radius - t.gravity * particle.mass).atan();
        to_core * coef - particle.velocity * t.friction
    }

    fn color_of(&self, _particle: &ParticleState) -> Option<Color> {
        Some(self.color)
    }
}
