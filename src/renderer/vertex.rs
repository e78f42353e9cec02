//! Vertex types for particle rendering

use bytemuck::{Pod, Zeroable};

use crate::sim::ParticleState;

/// One particle as the renderer consumes it: position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ParticleVertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl ParticleVertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    /// Vertex at the particle's position, colored by its owner
    pub fn from_particle(particle: &ParticleState) -> Self {
        let color = particle
            .color()
            .map(|c| c.to_rgba())
            .unwrap_or(colors::UNOWNED);
        Self::new(
            particle.position.x as f32,
            particle.position.y as f32,
            color,
        )
    }
}

/// Fallback colors
pub mod colors {
    /// Particles whose owner gives no color (or is gone)
    pub const UNOWNED: [f32; 4] = [0.5, 0.5, 0.5, 1.0];
}
