//! Rewind Arena - particle engine for a two-player time-bending arena
//!
//! Core modules:
//! - `sim`: Deterministic particle physics and per-cell rewindable history
//! - `renderer`: Packed vertex feed for whatever draws the particles
//! - `settings`: World/grid configuration
//! - `error`: Engine error type

pub mod error;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::{Result, SimError};
pub use settings::EngineSettings;

/// Engine configuration constants
pub mod consts {
    /// Fixed physics step per frame (world time units)
    pub const PHYSICS_STEP: f64 = 1.0;

    /// Mass given to particles that don't specify one
    pub const DEFAULT_MASS: f64 = 1.0;

    /// History slots per cell
    pub const DEFAULT_CONTAINER_CAPACITY: usize = 200;
    /// World time covered by one history slot (0 < slice <= 1 recommended)
    pub const DEFAULT_TIME_SLICE: f64 = 1.0;

    /// Ring skill band, world units from the caster's core
    pub const RING_INNER_RADIUS: f64 = 20.0;
    pub const RING_OUTER_RADIUS: f64 = 100.0;
    /// How far the ring skill rewinds the cells it covers
    pub const RING_REWIND_PERIOD: f64 = 40.0;
}
