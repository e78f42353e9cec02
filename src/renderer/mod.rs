//! Renderer feed
//!
//! The engine does not draw anything; it hands the renderer a packed vertex
//! per live particle.

pub mod vertex;

pub use vertex::{ParticleVertex, colors};
