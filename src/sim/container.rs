//! Per-cell rewindable history
//!
//! A container is a fixed ring of `capacity` group snapshots with a cursor.
//! Moving forward overwrites slots with the staged group; moving backward
//! erases the slots it passes, so each cell keeps a single linear timeline.

use std::fmt::Write as _;

use super::group::ParticleGroup;
use super::particle::ParticleState;
use crate::consts::{DEFAULT_CONTAINER_CAPACITY, DEFAULT_TIME_SLICE};
use crate::error::{Result, SimError};

/// Bounded history ring for one spatial cell
#[derive(Debug, Clone)]
pub struct ParticleContainer {
    capacity: usize,
    time_slice: f64,
    history: Vec<ParticleGroup>,
    cursor: usize,
    staged: ParticleGroup,
}

impl Default for ParticleContainer {
    fn default() -> Self {
        Self::empty(DEFAULT_CONTAINER_CAPACITY, DEFAULT_TIME_SLICE)
    }
}

impl ParticleContainer {
    /// Create an empty container
    ///
    /// `capacity` must be at least 1 and `time_slice` positive and finite.
    pub fn new(capacity: usize, time_slice: f64) -> Result<Self> {
        if capacity == 0 {
            return Err(SimError::InvalidSettings(
                "container capacity must be at least 1".into(),
            ));
        }
        if !(time_slice.is_finite() && time_slice > 0.0) {
            return Err(SimError::InvalidSettings(format!(
                "time slice must be positive and finite, got {time_slice}"
            )));
        }
        Ok(Self::empty(capacity, time_slice))
    }

    fn empty(capacity: usize, time_slice: f64) -> Self {
        Self {
            capacity,
            time_slice,
            history: vec![ParticleGroup::new(); capacity],
            cursor: 0,
            staged: ParticleGroup::new(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn time_slice(&self) -> f64 {
        self.time_slice
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Group at the cursor
    pub fn current(&self) -> &ParticleGroup {
        &self.history[self.cursor]
    }

    /// Group waiting for the next commit
    pub fn staged(&self) -> &ParticleGroup {
        &self.staged
    }

    /// Raw history slot (ring index, not relative to the cursor)
    pub fn slot(&self, index: usize) -> Option<&ParticleGroup> {
        self.history.get(index)
    }

    /// Queue a particle for the next committed slot
    pub fn stage(&mut self, particle: ParticleState) {
        self.staged.push(particle);
    }

    /// Whole slots covered by `period`, clamped to `[0, capacity]`
    pub fn slots_for(&self, period: f64) -> Result<usize> {
        if !period.is_finite() {
            return Err(SimError::InvalidPeriod(period));
        }
        let delta = (period / self.time_slice).floor();
        if delta <= 0.0 {
            Ok(0)
        } else {
            Ok((delta as usize).min(self.capacity))
        }
    }

    /// Advance the cursor by the slots in `period`, writing the staged group
    /// into every slot entered
    ///
    /// The staged group is always emptied. If `period` is shorter than one
    /// time slice nothing is written, so the staged particles are lost.
    /// Returns the number of slots advanced.
    pub fn commit(&mut self, period: f64) -> Result<usize> {
        let delta = self.slots_for(period)?;
        let staged = std::mem::take(&mut self.staged);
        for _ in 0..delta {
            self.cursor = (self.cursor + 1) % self.capacity;
            self.history[self.cursor] = staged.clone();
        }
        Ok(delta)
    }

    /// Move the cursor back by the slots in `period`, erasing each slot as it
    /// is vacated
    ///
    /// Erased slots stay empty: committing forward again does not bring
    /// them back. Returns the number of slots rewound.
    pub fn rewind(&mut self, period: f64) -> Result<usize> {
        let delta = self.slots_for(period)?;
        for _ in 0..delta {
            self.history[self.cursor].clear();
            self.cursor = (self.cursor + self.capacity - 1) % self.capacity;
        }
        Ok(delta)
    }

    /// Empty every history slot; the cursor stays where it is
    pub fn flush(&mut self) {
        for group in &mut self.history {
            group.clear();
        }
    }

    /// Human-readable dump of the slot count and current group
    pub fn describe(&self) -> String {
        let current = self.current();
        let mut out = format!(
            "buffered group count: {}, current group size: {}",
            self.history.len(),
            current.len()
        );
        for particle in current {
            let _ = write!(out, "\n  {particle}");
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::sim::owner::{OwnerHandle, TestOwner};
    use crate::sim::vector::Vector2;

    fn particle(x: f64) -> ParticleState {
        ParticleState::at(Vector2::new(x, 0.0))
    }

    fn container(capacity: usize) -> ParticleContainer {
        ParticleContainer::new(capacity, 1.0).unwrap()
    }

    #[test]
    fn test_new_validates() {
        assert!(ParticleContainer::new(0, 1.0).is_err());
        assert!(ParticleContainer::new(3, 0.0).is_err());
        assert!(ParticleContainer::new(3, f64::NAN).is_err());
        let c = container(3);
        assert_eq!(c.capacity(), 3);
        assert_eq!(c.cursor(), 0);
        assert!(c.current().is_empty());
    }

    #[test]
    fn test_rewind_on_fresh_container_wraps() {
        let mut c = container(3);
        assert_eq!(c.rewind(1.0).unwrap(), 1);
        assert_eq!(c.cursor(), 2);
        assert!(c.current().is_empty());
    }

    #[test]
    fn test_commit_sub_slice_drops_staged() {
        let mut c = container(3);
        c.stage(particle(1.0));
        assert_eq!(c.commit(0.5).unwrap(), 0);
        assert!(c.current().is_empty());
        assert!(c.staged().is_empty());
        assert_eq!(c.cursor(), 0);
    }

    #[test]
    fn test_commit_then_rewind_returns_to_empty() {
        let mut c = container(3);
        c.stage(particle(1.0));
        c.commit(1.0).unwrap();
        assert_eq!(c.cursor(), 1);
        assert_eq!(c.current().as_slice(), &[particle(1.0)]);

        c.rewind(1.0).unwrap();
        assert_eq!(c.cursor(), 0);
        assert!(c.current().is_empty());
        assert!(c.slot(1).unwrap().is_empty());
    }

    #[test]
    fn test_commit_multi_slot_copies_staged() {
        let mut c = container(4);
        c.stage(particle(2.0));
        assert_eq!(c.commit(2.5).unwrap(), 2);
        assert_eq!(c.cursor(), 2);
        assert_eq!(c.slot(1).unwrap().len(), 1);
        assert_eq!(c.slot(2).unwrap().len(), 1);
        assert!(c.slot(3).unwrap().is_empty());
    }

    #[test]
    fn test_period_clamps_to_capacity() {
        let mut c = container(3);
        c.stage(particle(1.0));
        assert_eq!(c.commit(100.0).unwrap(), 3);
        assert_eq!(c.cursor(), 0);
        assert!((0..3).all(|i| c.slot(i).unwrap().len() == 1));

        assert_eq!(c.rewind(1e9).unwrap(), 3);
        assert_eq!(c.cursor(), 0);
        assert!((0..3).all(|i| c.slot(i).unwrap().is_empty()));
    }

    #[test]
    fn test_rewind_erases_forward_history() {
        let mut c = container(5);
        for x in 1..=3 {
            c.stage(particle(x as f64));
            c.commit(1.0).unwrap();
        }
        assert_eq!(c.cursor(), 3);

        c.rewind(2.0).unwrap();
        assert_eq!(c.cursor(), 1);
        assert_eq!(c.current().as_slice(), &[particle(1.0)]);

        // Stepping forward with nothing staged does not restore slot 2
        c.commit(1.0).unwrap();
        assert_eq!(c.cursor(), 2);
        assert!(c.current().is_empty());
    }

    #[test]
    fn test_negative_or_zero_period_is_noop() {
        let mut c = container(3);
        c.stage(particle(1.0));
        c.commit(1.0).unwrap();
        assert_eq!(c.rewind(0.0).unwrap(), 0);
        assert_eq!(c.rewind(-4.0).unwrap(), 0);
        assert_eq!(c.cursor(), 1);
        assert_eq!(c.current().len(), 1);
    }

    #[test]
    fn test_invalid_period_leaves_container_untouched() {
        let mut c = container(3);
        c.stage(particle(1.0));
        assert!(matches!(c.commit(f64::NAN), Err(SimError::InvalidPeriod(_))));
        assert_eq!(c.staged().len(), 1);
        assert!(c.rewind(f64::INFINITY).is_err());
        assert_eq!(c.cursor(), 0);
    }

    #[test]
    fn test_time_slice_scales_delta() {
        let mut c = ParticleContainer::new(10, 0.5).unwrap();
        assert_eq!(c.slots_for(1.0).unwrap(), 2);
        assert_eq!(c.slots_for(0.4).unwrap(), 0);
        c.commit(1.0).unwrap();
        assert_eq!(c.cursor(), 2);
    }

    #[test]
    fn test_flush_keeps_cursor() {
        let mut c = container(3);
        c.stage(particle(1.0));
        c.commit(2.0).unwrap();
        c.flush();
        assert_eq!(c.cursor(), 2);
        assert!((0..3).all(|i| c.slot(i).unwrap().is_empty()));
        assert_eq!(c.capacity(), 3);
        assert_eq!(c.time_slice(), 1.0);
    }

    #[test]
    fn test_describe_lists_current_particles() {
        let owner = Rc::new(TestOwner::new("tester"));
        let mut c = container(3);
        c.stage(particle(4.0).with_owner(OwnerHandle::new(&owner)));
        c.commit(1.0).unwrap();
        let dump = c.describe();
        assert!(dump.contains("buffered group count: 3"));
        assert!(dump.contains("current group size: 1"));
        assert!(dump.contains("tester"));
    }
}
