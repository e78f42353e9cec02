//! 2D vector value type
//!
//! `Vector2` is glam's f64 vector; arithmetic, `length`, `distance` and `dot`
//! come from glam. The containment predicates the arena needs live on
//! [`Vector2Ext`].

use glam::DVec2;

/// World-space 2D vector (positions, velocities, forces)
pub type Vector2 = DVec2;

/// Geometry helpers not provided by glam
pub trait Vector2Ext {
    /// Taxicab distance to `other`
    fn dist_manhattan(self, other: Vector2) -> f64;

    /// True if within `radius` of `center` (boundary inclusive)
    fn is_inside_circle(self, center: Vector2, radius: f64) -> bool;

    /// True if inside the axis-aligned rect spanned by two opposite corners
    /// (corners may be given in any order, boundary inclusive)
    fn is_inside_rect(self, corner_a: Vector2, corner_b: Vector2) -> bool;
}

impl Vector2Ext for Vector2 {
    #[inline]
    fn dist_manhattan(self, other: Vector2) -> f64 {
        (self.x - other.x).abs() + (self.y - other.y).abs()
    }

    #[inline]
    fn is_inside_circle(self, center: Vector2, radius: f64) -> bool {
        self.distance(center) <= radius
    }

    fn is_inside_rect(self, corner_a: Vector2, corner_b: Vector2) -> bool {
        let min = corner_a.min(corner_b);
        let max = corner_a.max(corner_b);
        min.x <= self.x && self.x <= max.x && min.y <= self.y && self.y <= max.y
    }
}
