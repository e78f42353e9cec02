//! Point-mass particle state and its plain-data record form

use std::fmt;

use serde::{Serialize, Serializer};

use super::owner::{Color, OwnerHandle, OwnerId};
use super::vector::Vector2;
use crate::consts::DEFAULT_MASS;
use crate::error::{Result, SimError};

/// Snapshot of one point mass
///
/// States are values: integration returns a new state and never mutates
/// the old one. The owner handle is carried through unchanged.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticleState {
    pub owner: Option<OwnerHandle>,
    pub mass: f64,
    pub acceleration: Vector2,
    pub velocity: Vector2,
    pub position: Vector2,
}

impl Default for ParticleState {
    fn default() -> Self {
        Self {
            owner: None,
            mass: DEFAULT_MASS,
            acceleration: Vector2::ZERO,
            velocity: Vector2::ZERO,
            position: Vector2::ZERO,
        }
    }
}

impl ParticleState {
    /// Ownerless, unit-mass particle at rest
    pub fn at(position: Vector2) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    pub fn with_owner(mut self, owner: OwnerHandle) -> Self {
        self.owner = Some(owner);
        self
    }

    pub fn with_mass(mut self, mass: f64) -> Self {
        self.mass = mass;
        self
    }

    pub fn with_velocity(mut self, velocity: Vector2) -> Self {
        self.velocity = velocity;
        self
    }

    pub fn with_acceleration(mut self, acceleration: Vector2) -> Self {
        self.acceleration = acceleration;
        self
    }

    /// Identity of a live owner, if any
    pub fn owner_id(&self) -> Option<OwnerId> {
        self.owner.as_ref().and_then(OwnerHandle::identity)
    }

    /// Force the owner exerts on this particle (zero when ownerless)
    pub fn force(&self) -> Vector2 {
        self.owner
            .as_ref()
            .and_then(OwnerHandle::upgrade)
            .map(|owner| owner.force_on(self))
            .unwrap_or(Vector2::ZERO)
    }

    /// Render color supplied by the owner
    pub fn color(&self) -> Option<Color> {
        self.owner
            .as_ref()
            .and_then(OwnerHandle::upgrade)
            .and_then(|owner| owner.color_of(self))
    }

    /// Advance one explicit step of length `dt` under the owner's force
    pub fn integrate(&self, dt: f64) -> Result<ParticleState> {
        self.integrate_under(self.force(), dt)
    }

    /// Advance one step under an explicit force
    ///
    /// Position moves with the velocity from *before* this step; the new
    /// acceleration only reaches position on the following step.
    pub fn integrate_under(&self, force: Vector2, dt: f64) -> Result<ParticleState> {
        if self.mass == 0.0 || !self.mass.is_finite() {
            return Err(SimError::NonIntegrable { mass: self.mass });
        }
        if !force.is_finite() {
            return Err(SimError::NonFiniteForce {
                x: force.x,
                y: force.y,
            });
        }
        let acceleration = force / self.mass;
        Ok(ParticleState {
            owner: self.owner.clone(),
            mass: self.mass,
            acceleration,
            velocity: self.velocity + acceleration * dt,
            position: self.position + self.velocity * dt,
        })
    }

    /// Flatten into a plain-data record (shallow: owner handle is shared)
    pub fn export(&self) -> ParticleRecord {
        ParticleRecord {
            owner: self.owner.clone(),
            mass: self.mass,
            acceleration: self.acceleration,
            velocity: self.velocity,
            position: self.position,
        }
    }

    /// Rebuild a state from a record, reusing the record's owner handle
    pub fn from_record(record: &ParticleRecord) -> Self {
        Self {
            owner: record.owner.clone(),
            mass: record.mass,
            acceleration: record.acceleration,
            velocity: record.velocity,
            position: record.position,
        }
    }
}

impl fmt::Display for ParticleState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let owner = match &self.owner {
            Some(handle) => format!("{handle:?}"),
            None => "None".to_string(),
        };
        write!(
            f,
            "{{owner: {}, mass: {}, acc: ({}, {}), vel: ({}, {}), pos: ({}, {})}}",
            owner,
            self.mass,
            self.acceleration.x,
            self.acceleration.y,
            self.velocity.x,
            self.velocity.y,
            self.position.x,
            self.position.y
        )
    }
}

/// Flat plain-data form of a [`ParticleState`]
///
/// Serializes the owner as its identity string; the in-memory record keeps
/// the handle itself so importing restores the very same owner.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParticleRecord {
    #[serde(serialize_with = "serialize_owner")]
    pub owner: Option<OwnerHandle>,
    pub mass: f64,
    pub acceleration: Vector2,
    pub velocity: Vector2,
    pub position: Vector2,
}

impl ParticleRecord {
    /// Reject records carrying NaN/infinite values
    pub fn validate(&self, index: usize) -> Result<()> {
        let field = if !self.mass.is_finite() {
            Some("mass")
        } else if !self.acceleration.is_finite() {
            Some("acceleration")
        } else if !self.velocity.is_finite() {
            Some("velocity")
        } else if !self.position.is_finite() {
            Some("position")
        } else {
            None
        };
        match field {
            Some(field) => Err(SimError::MalformedRecord { index, field }),
            None => Ok(()),
        }
    }
}

fn serialize_owner<S: Serializer>(
    owner: &Option<OwnerHandle>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    owner
        .as_ref()
        .and_then(OwnerHandle::identity)
        .serialize(serializer)
}
