//! Particle simulation and spatial history
//!
//! All physics and time-travel logic lives here. This module must stay
//! deterministic:
//! - Fixed unit timestep only
//! - Stable iteration order (cells by key, particles by insertion)
//! - No rendering or platform dependencies

pub mod container;
pub mod frame;
pub mod group;
pub mod manager;
pub mod owner;
pub mod particle;
pub mod player;
pub mod vector;
pub mod well;

pub use container::ParticleContainer;
pub use frame::{CellKey, KeyFn, ParticleFrameManager, Placement, StepSummary, unit_cell_key};
pub use group::ParticleGroup;
pub use manager::{ParticleManager, grid_cell_key};
pub use owner::{Color, OwnerHandle, OwnerId, ParticleOwner, TestOwner};
pub use particle::{ParticleRecord, ParticleState};
pub use player::{Player, PlayerTuning, SWARM_SIZE};
pub use vector::{Vector2, Vector2Ext};
pub use well::TimeWell;
