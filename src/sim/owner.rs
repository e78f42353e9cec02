//! Particle owners
//!
//! An owner supplies the force law that drives its particles and an optional
//! render color. Particles only hold a weak handle to their owner: the game
//! layer (players, test harnesses) keeps owners alive, the engine never does.

use std::cell::Cell;
use std::fmt;
use std::rc::{Rc, Weak};

use serde::{Deserialize, Serialize};

use super::particle::ParticleState;
use super::vector::Vector2;

/// Stable identity of an owner, used for per-owner particle counts
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OwnerId(String);

impl OwnerId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// 8-bit RGB color hint for rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Normalized RGBA (opaque)
    pub fn to_rgba(self) -> [f32; 4] {
        [
            self.r as f32 / 255.0,
            self.g as f32 / 255.0,
            self.b as f32 / 255.0,
            1.0,
        ]
    }
}

/// Force/color capability of whoever spawned a particle
///
/// Both capabilities default to "nothing": zero force and no color.
pub trait ParticleOwner {
    /// Identity used when tallying particles per owner
    fn identity(&self) -> &OwnerId;

    /// Force applied to `particle` this step
    fn force_on(&self, _particle: &ParticleState) -> Vector2 {
        Vector2::ZERO
    }

    /// Render color for `particle`; never affects physics
    fn color_of(&self, _particle: &ParticleState) -> Option<Color> {
        None
    }
}

/// Non-owning reference from a particle to its owner
///
/// Equality is pointer identity. A handle whose owner has been dropped acts
/// like no owner at all.
#[derive(Clone)]
pub struct OwnerHandle(Weak<dyn ParticleOwner>);

impl OwnerHandle {
    pub fn new<O: ParticleOwner + 'static>(owner: &Rc<O>) -> Self {
        let weak: Weak<O> = Rc::downgrade(owner);
        Self(weak)
    }

    /// Borrow the owner if it is still alive
    pub fn upgrade(&self) -> Option<Rc<dyn ParticleOwner>> {
        self.0.upgrade()
    }

    pub fn identity(&self) -> Option<OwnerId> {
        self.upgrade().map(|o| o.identity().clone())
    }

    pub fn is_alive(&self) -> bool {
        self.0.strong_count() > 0
    }

    /// True if both handles point at the same owner object
    pub fn ptr_eq(&self, other: &OwnerHandle) -> bool {
        Weak::ptr_eq(&self.0, &other.0)
    }
}

impl PartialEq for OwnerHandle {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl fmt::Debug for OwnerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.identity() {
            Some(id) => write!(f, "OWNER({id:?})"),
            None => f.write_str("OWNER(<dropped>)"),
        }
    }
}

/// Generic owner with a settable constant force
#[derive(Debug)]
pub struct TestOwner {
    id: OwnerId,
    force: Cell<Vector2>,
    color: Option<Color>,
}

impl TestOwner {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: OwnerId::new(id),
            force: Cell::new(Vector2::ZERO),
            color: None,
        }
    }

    pub fn with_force(id: impl Into<String>, force: Vector2) -> Self {
        let owner = Self::new(id);
        owner.set_force(force);
        owner
    }

    pub fn with_color(mut self, color: Color) -> Self {
        self.color = Some(color);
        self
    }

    pub fn set_force(&self, force: Vector2) {
        self.force.set(force);
    }
}

impl ParticleOwner for TestOwner {
    fn identity(&self) -> &OwnerId {
        &self.id
    }

    fn force_on(&self, _particle: &ParticleState) -> Vector2 {
        self.force.get()
    }

    fn color_of(&self, _particle: &ParticleState) -> Option<Color> {
        self.color
    }
}
