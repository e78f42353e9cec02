//! Ordered particle collections

use std::slice;

use super::particle::{ParticleRecord, ParticleState};
use crate::error::Result;

/// Ordered, appendable set of particles
///
/// Order matters for iteration and dumps only; physics treats every particle
/// independently.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParticleGroup {
    particles: Vec<ParticleState>,
}

impl ParticleGroup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn push(&mut self, particle: ParticleState) {
        self.particles.push(particle);
    }

    /// Append every particle of `other`, keeping its order
    pub fn append(&mut self, other: &ParticleGroup) {
        self.particles.extend_from_slice(&other.particles);
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    pub fn iter(&self) -> slice::Iter<'_, ParticleState> {
        self.particles.iter()
    }

    pub fn as_slice(&self) -> &[ParticleState] {
        &self.particles
    }

    /// Integrate every particle by `dt`
    ///
    /// Returns a new group; on error (a non-integrable particle) nothing
    /// is produced and `self` is untouched.
    pub fn integrate_all(&self, dt: f64) -> Result<ParticleGroup> {
        let particles = self
            .particles
            .iter()
            .map(|p| p.integrate(dt))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { particles })
    }

    /// Flatten to plain-data records, in order
    pub fn export(&self) -> Vec<ParticleRecord> {
        self.particles.iter().map(ParticleState::export).collect()
    }

    /// Append particles rebuilt from `records`
    ///
    /// All records are validated first, so a malformed record leaves the
    /// group unchanged.
    pub fn import_additive(&mut self, records: &[ParticleRecord]) -> Result<()> {
        for (index, record) in records.iter().enumerate() {
            record.validate(index)?;
        }
        self.particles
            .extend(records.iter().map(ParticleState::from_record));
        Ok(())
    }
}

impl From<Vec<ParticleState>> for ParticleGroup {
    fn from(particles: Vec<ParticleState>) -> Self {
        Self { particles }
    }
}

impl FromIterator<ParticleState> for ParticleGroup {
    fn from_iter<I: IntoIterator<Item = ParticleState>>(iter: I) -> Self {
        Self {
            particles: iter.into_iter().collect(),
        }
    }
}

impl Extend<ParticleState> for ParticleGroup {
    fn extend<I: IntoIterator<Item = ParticleState>>(&mut self, iter: I) {
        self.particles.extend(iter);
    }
}

impl IntoIterator for ParticleGroup {
    type Item = ParticleState;
    type IntoIter = std::vec::IntoIter<ParticleState>;

    fn into_iter(self) -> Self::IntoIter {
        self.particles.into_iter()
    }
}

impl<'a> IntoIterator for &'a ParticleGroup {
    type Item = &'a ParticleState;
    type IntoIter = slice::Iter<'a, ParticleState>;

    fn into_iter(self) -> Self::IntoIter {
        self.particles.iter()
    }
}
