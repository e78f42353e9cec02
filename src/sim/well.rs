//! Time wells: annular rewind regions
//!
//! A well is a band around a center point:
//! - inner_radius / outer_radius: radial extent of the band
//! - period: how far cells inside the band are rewound
//!
//! Cells are tested by their key corner, so the band is resolved at grid
//! granularity.

use serde::{Deserialize, Serialize};

use super::frame::CellKey;
use super::vector::Vector2;
use crate::consts::{RING_INNER_RADIUS, RING_OUTER_RADIUS, RING_REWIND_PERIOD};

/// Annulus that rewinds every cell inside it by `period`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TimeWell {
    pub center: Vector2,
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub period: f64,
}

impl TimeWell {
    /// Radii may be given in either order
    pub fn new(center: Vector2, inner_radius: f64, outer_radius: f64, period: f64) -> Self {
        Self {
            center,
            inner_radius: inner_radius.min(outer_radius),
            outer_radius: inner_radius.max(outer_radius),
            period,
        }
    }

    /// Ring-skill well around `center`
    pub fn ring(center: Vector2) -> Self {
        Self::new(center, RING_INNER_RADIUS, RING_OUTER_RADIUS, RING_REWIND_PERIOD)
    }

    /// Centerline radius of the band
    #[inline]
    pub fn mid_radius(&self) -> f64 {
        (self.inner_radius + self.outer_radius) / 2.0
    }

    /// Radial thickness of the band
    #[inline]
    pub fn width(&self) -> f64 {
        self.outer_radius - self.inner_radius
    }

    /// Check if a point lies in the band (both edges inclusive)
    pub fn contains_point(&self, point: Vector2) -> bool {
        let r = point.distance(self.center);
        r >= self.inner_radius && r <= self.outer_radius
    }

    /// Rewind period for one cell: `period` inside the band, 0 outside
    pub fn period_at(&self, key: CellKey) -> f64 {
        if self.contains_point(key.corner()) {
            self.period
        } else {
            0.0
        }
    }

    /// Per-cell period function for `ParticleManager::rewind_by`
    pub fn as_period_fn(self) -> impl Fn(CellKey) -> f64 {
        move |key| self.period_at(key)
    }
}
