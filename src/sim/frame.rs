//! Frame manager: buckets live particles into per-cell containers
//!
//! The live group is what physics and rendering read. Every forward step
//! integrates it, stages each particle into the container of the cell it
//! landed in, and advances all containers one slot. A rewind moves selected
//! containers backward and rebuilds the live group from every container's
//! current slot.

use std::collections::BTreeMap;
use std::collections::btree_map::Entry;
use std::fmt::Write as _;

use serde::{Deserialize, Serialize};

use super::container::ParticleContainer;
use super::group::ParticleGroup;
use super::particle::ParticleState;
use super::vector::Vector2;
use crate::consts::{DEFAULT_CONTAINER_CAPACITY, DEFAULT_TIME_SLICE, PHYSICS_STEP};
use crate::error::{Result, SimError};

/// Grid-aligned integer coordinate identifying one spatial cell
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
pub struct CellKey {
    pub x: i64,
    pub y: i64,
}

impl CellKey {
    pub const fn new(x: i64, y: i64) -> Self {
        Self { x, y }
    }

    /// World position of the cell's key corner
    pub fn corner(self) -> Vector2 {
        Vector2::new(self.x as f64, self.y as f64)
    }
}

impl From<(i64, i64)> for CellKey {
    fn from((x, y): (i64, i64)) -> Self {
        Self { x, y }
    }
}

/// Maps a finite world position to the key of the cell holding it
pub type KeyFn = Box<dyn Fn(Vector2) -> CellKey>;

/// Floor both axes to whole units
pub fn unit_cell_key(position: Vector2) -> CellKey {
    let cell = position.floor();
    CellKey::new(cell.x as i64, cell.y as i64)
}

/// Outcome of re-bucketing one particle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Staged into the container at this key
    Kept(CellKey),
    /// No container registered at this key; the particle leaves the simulation
    Dropped(CellKey),
    /// Non-finite position, so no cell at all; the particle leaves the simulation
    Stray,
}

/// Per-particle placements from one forward step, in live-group order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StepSummary {
    pub placements: Vec<Placement>,
}

impl StepSummary {
    pub fn kept(&self) -> usize {
        self.placements
            .iter()
            .filter(|p| matches!(p, Placement::Kept(_)))
            .count()
    }

    pub fn dropped(&self) -> usize {
        self.placements.len() - self.kept()
    }
}

/// Owns every cell container and the live particle set
pub struct ParticleFrameManager {
    live: ParticleGroup,
    containers: BTreeMap<CellKey, ParticleContainer>,
    key_fn: KeyFn,
    capacity: usize,
    time_slice: f64,
}

impl Default for ParticleFrameManager {
    fn default() -> Self {
        Self {
            live: ParticleGroup::new(),
            containers: BTreeMap::new(),
            key_fn: Box::new(unit_cell_key),
            capacity: DEFAULT_CONTAINER_CAPACITY,
            time_slice: DEFAULT_TIME_SLICE,
        }
    }
}

impl ParticleFrameManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Manager whose containers use the given history depth and slot length
    pub fn with_history(capacity: usize, time_slice: f64) -> Result<Self> {
        // Validate once here so create_container cannot fail later
        ParticleContainer::new(capacity, time_slice)?;
        Ok(Self {
            capacity,
            time_slice,
            ..Default::default()
        })
    }

    pub fn with_key_fn(mut self, key_fn: impl Fn(Vector2) -> CellKey + 'static) -> Self {
        self.key_fn = Box::new(key_fn);
        self
    }

    /// Register an empty container at `key`
    ///
    /// Registering the same key twice replaces the earlier container and
    /// its history.
    pub fn create_container(&mut self, key: CellKey) -> &mut ParticleContainer {
        let container = ParticleContainer::new(self.capacity, self.time_slice)
            .unwrap_or_default();
        match self.containers.entry(key) {
            Entry::Occupied(mut entry) => {
                log::warn!("cell {key:?} registered twice, history discarded");
                entry.insert(container);
                entry.into_mut()
            }
            Entry::Vacant(entry) => entry.insert(container),
        }
    }

    pub fn container(&self, key: CellKey) -> Option<&ParticleContainer> {
        self.containers.get(&key)
    }

    /// Containers in key order
    pub fn containers(&self) -> impl Iterator<Item = (&CellKey, &ParticleContainer)> + '_ {
        self.containers.iter()
    }

    pub fn container_count(&self) -> usize {
        self.containers.len()
    }

    /// Current particle set used by physics and rendering
    pub fn live(&self) -> &ParticleGroup {
        &self.live
    }

    /// Cell key of `position`, `None` when it is not finite
    pub fn key_of(&self, position: Vector2) -> Option<CellKey> {
        position.is_finite().then(|| (self.key_fn)(position))
    }

    /// Where `particle` would be bucketed right now
    pub fn placement(&self, particle: &ParticleState) -> Placement {
        match self.key_of(particle.position) {
            Some(key) if self.containers.contains_key(&key) => Placement::Kept(key),
            Some(key) => Placement::Dropped(key),
            None => Placement::Stray,
        }
    }

    /// Advance one frame
    ///
    /// With `apply_physics` the live group is integrated by one unit step
    /// first. Each live particle is then staged into its cell's container,
    /// or dropped when no container exists there, and every container
    /// commits one slot. The live group itself is not rebuilt here, so a
    /// particle dropped this step is still live until the next rebuild or
    /// the next step that re-buckets it.
    pub fn step(&mut self, apply_physics: bool) -> Result<StepSummary> {
        if apply_physics {
            self.live = self.live.integrate_all(PHYSICS_STEP)?;
        }

        let mut summary = StepSummary {
            placements: Vec::with_capacity(self.live.len()),
        };
        for particle in self.live.iter() {
            if !particle.position.is_finite() {
                log::warn!("particle at {:?} has no cell, dropped", particle.position);
                summary.placements.push(Placement::Stray);
                continue;
            }
            let key = (self.key_fn)(particle.position);
            match self.containers.get_mut(&key) {
                Some(container) => {
                    container.stage(particle.clone());
                    summary.placements.push(Placement::Kept(key));
                }
                None => {
                    log::trace!("particle at {:?} left the grid ({key:?})", particle.position);
                    summary.placements.push(Placement::Dropped(key));
                }
            }
        }

        for container in self.containers.values_mut() {
            container.commit(PHYSICS_STEP)?;
        }

        log::debug!(
            "step: {} staged, {} dropped across {} cells",
            summary.kept(),
            summary.dropped(),
            self.containers.len()
        );
        Ok(summary)
    }

    /// Rewind containers selectively and rebuild the live group
    ///
    /// `period_fn` is asked once per container; containers with a positive
    /// period are rewound by it, the rest keep their current slot. All
    /// periods are checked before any container moves. Returns the number
    /// of containers whose cursor actually moved.
    pub fn backward(&mut self, period_fn: impl Fn(CellKey) -> f64) -> Result<usize> {
        let periods: Vec<f64> = self.containers.keys().map(|&key| period_fn(key)).collect();
        if let Some(&bad) = periods.iter().find(|p| !p.is_finite()) {
            return Err(SimError::InvalidPeriod(bad));
        }

        let mut rewound = 0;
        for (container, &period) in self.containers.values_mut().zip(&periods) {
            if period > 0.0 && container.rewind(period)? > 0 {
                rewound += 1;
            }
        }
        self.rebuild_live();

        log::debug!(
            "backward: {rewound} of {} cells rewound, {} particles live",
            self.containers.len(),
            self.live.len()
        );
        Ok(rewound)
    }

    /// Clear all history, make `particles` the live group and bucket them
    ///
    /// The bucketing runs a full non-physical step, so every container's
    /// cursor advances by one slot.
    pub fn reset_and_seed(&mut self, particles: ParticleGroup) -> Result<StepSummary> {
        for container in self.containers.values_mut() {
            container.flush();
        }
        self.live = particles;
        self.step(false)
    }

    fn rebuild_live(&mut self) {
        let mut live = ParticleGroup::new();
        for container in self.containers.values() {
            live.append(container.current());
        }
        self.live = live;
    }

    /// Per-cell dump in key order
    pub fn describe(&self) -> String {
        let mut out = String::new();
        for (key, container) in &self.containers {
            let _ = writeln!(out, "({}, {}) {}", key.x, key.y, container.describe());
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use super::*;
    use crate::sim::owner::{OwnerHandle, TestOwner};

    fn gen_particle(owner: &Rc<TestOwner>) -> ParticleState {
        ParticleState::at(Vector2::ZERO)
            .with_owner(OwnerHandle::new(owner))
            .with_acceleration(Vector2::new(1.0, 0.0))
            .with_velocity(Vector2::new(1.0, 0.0))
    }

    fn split_key(position: Vector2) -> CellKey {
        if position.x < 3.0 {
            CellKey::new(1, 0)
        } else {
            CellKey::new(5, 0)
        }
    }

    #[test]
    fn test_unit_cell_key_floors() {
        assert_eq!(unit_cell_key(Vector2::new(2.7, 0.2)), CellKey::new(2, 0));
        assert_eq!(unit_cell_key(Vector2::new(-0.5, 3.0)), CellKey::new(-1, 3));
    }

    #[test]
    fn test_seed_buckets_and_advances_cursor() {
        let owner = Rc::new(TestOwner::with_force("tester", Vector2::new(1.0, 0.0)));
        let mut frame = ParticleFrameManager::with_history(3, 1.0)
            .unwrap()
            .with_key_fn(split_key);
        frame.create_container(CellKey::new(1, 0));
        frame.create_container(CellKey::new(5, 0));

        let first = gen_particle(&owner);
        let second = first.integrate(1.0).unwrap();
        let group: ParticleGroup = vec![first, second].into();

        let summary = frame.reset_and_seed(group).unwrap();
        assert_eq!(summary.kept(), 2);
        let left = frame.container(CellKey::new(1, 0)).unwrap();
        assert_eq!(left.cursor(), 1);
        assert_eq!(left.current().len(), 2);
        assert!(frame.container(CellKey::new(5, 0)).unwrap().current().is_empty());
    }

    #[test]
    fn test_step_moves_particles_between_cells_and_rewinds() {
        let owner = Rc::new(TestOwner::with_force("tester", Vector2::new(1.0, 0.0)));
        let mut frame = ParticleFrameManager::with_history(3, 1.0)
            .unwrap()
            .with_key_fn(split_key);
        frame.create_container(CellKey::new(1, 0));
        frame.create_container(CellKey::new(5, 0));

        // x = 0, vx = 1 and x = 1, vx = 2
        let first = gen_particle(&owner);
        let second = first.integrate(1.0).unwrap();
        frame.reset_and_seed(vec![first, second].into()).unwrap();

        // x: 1, 3
        frame.step(true).unwrap();
        assert_eq!(frame.container(CellKey::new(1, 0)).unwrap().current().len(), 1);
        assert_eq!(frame.container(CellKey::new(5, 0)).unwrap().current().len(), 1);

        // x: 3, 6
        frame.step(true).unwrap();
        assert!(frame.container(CellKey::new(1, 0)).unwrap().current().is_empty());
        assert_eq!(frame.container(CellKey::new(5, 0)).unwrap().current().len(), 2);

        frame.backward(|_| 1.0).unwrap();
        assert_eq!(frame.live().len(), 2);
        let xs: Vec<f64> = frame.live().iter().map(|p| p.position.x).collect();
        assert_eq!(xs, vec![1.0, 3.0]);
    }

    #[test]
    fn test_particle_leaving_grid_is_dropped() {
        let owner = Rc::new(TestOwner::new("drifter"));
        let mut frame = ParticleFrameManager::with_history(3, 1.0)
            .unwrap()
            .with_key_fn(|p| {
                let cell = (p / 5.0).floor() * 5.0;
                CellKey::new(cell.x as i64, cell.y as i64)
            });
        frame.create_container(CellKey::new(0, 0));

        let p = ParticleState::at(Vector2::new(1.0, 1.0))
            .with_owner(OwnerHandle::new(&owner))
            .with_velocity(Vector2::new(5.0, 5.0));
        frame.reset_and_seed(vec![p].into()).unwrap();
        assert_eq!(frame.container(CellKey::new(0, 0)).unwrap().current().len(), 1);

        // Lands in (5, 5): still live, but nothing holds it
        let summary = frame.step(true).unwrap();
        assert_eq!(summary.placements, vec![Placement::Dropped(CellKey::new(5, 5))]);
        assert_eq!(frame.live().len(), 1);
        let escaped = &frame.live().as_slice()[0];
        assert_eq!(frame.placement(escaped), Placement::Dropped(CellKey::new(5, 5)));

        frame.step(true).unwrap();
        assert!(frame.container(CellKey::new(0, 0)).unwrap().current().is_empty());

        frame.backward(|_| 0.0).unwrap();
        assert!(frame.live().is_empty());
    }

    #[test]
    fn test_non_finite_position_is_stray() {
        let mut frame = ParticleFrameManager::with_history(3, 1.0).unwrap();
        frame.create_container(CellKey::new(0, 0));
        let lost = ParticleState::at(Vector2::new(f64::NAN, 0.5));
        let group: ParticleGroup = vec![ParticleState::at(Vector2::new(0.5, 0.5)), lost.clone()].into();

        assert_eq!(frame.key_of(lost.position), None);
        assert_eq!(frame.placement(&lost), Placement::Stray);

        let summary = frame.reset_and_seed(group).unwrap();
        assert_eq!(
            summary.placements,
            vec![Placement::Kept(CellKey::new(0, 0)), Placement::Stray]
        );
        assert_eq!(summary.dropped(), 1);
        assert_eq!(frame.container(CellKey::new(0, 0)).unwrap().current().len(), 1);

        frame.backward(|_| 0.0).unwrap();
        assert_eq!(frame.live().len(), 1);
        assert!(frame.live().iter().all(|p| p.position.is_finite()));
    }

    #[test]
    fn test_backward_counts_only_moved_cursors() {
        let mut frame = ParticleFrameManager::with_history(3, 1.0).unwrap();
        frame.create_container(CellKey::new(0, 0));
        frame
            .reset_and_seed(vec![ParticleState::at(Vector2::new(0.5, 0.5))].into())
            .unwrap();

        // Shorter than one slot: positive but moves nothing
        assert_eq!(frame.backward(|_| 0.5).unwrap(), 0);
        let cell = frame.container(CellKey::new(0, 0)).unwrap();
        assert_eq!(cell.cursor(), 1);
        assert_eq!(cell.current().len(), 1);

        assert_eq!(frame.backward(|_| 1.0).unwrap(), 1);
        assert_eq!(frame.container(CellKey::new(0, 0)).unwrap().cursor(), 0);
    }

    #[test]
    fn test_backward_leaves_non_positive_cells_alone() {
        let mut frame = ParticleFrameManager::with_history(3, 1.0).unwrap();
        frame.create_container(CellKey::new(0, 0));
        frame.create_container(CellKey::new(5, 0));
        let group: ParticleGroup = vec![
            ParticleState::at(Vector2::new(0.5, 0.5)),
            ParticleState::at(Vector2::new(5.5, 0.5)),
        ]
        .into();
        frame.reset_and_seed(group).unwrap();

        let rewound = frame
            .backward(|key| if key == CellKey::new(0, 0) { 1.0 } else { -2.0 })
            .unwrap();
        assert_eq!(rewound, 1);
        assert!(frame.container(CellKey::new(0, 0)).unwrap().current().is_empty());
        assert_eq!(frame.live().len(), 1);
        assert_eq!(frame.live().as_slice()[0].position, Vector2::new(5.5, 0.5));
    }

    #[test]
    fn test_backward_rejects_nan_before_moving() {
        let mut frame = ParticleFrameManager::with_history(3, 1.0).unwrap();
        frame.create_container(CellKey::new(0, 0));
        frame.create_container(CellKey::new(1, 0));
        frame
            .reset_and_seed(vec![ParticleState::at(Vector2::new(0.5, 0.5))].into())
            .unwrap();

        let err = frame
            .backward(|key| if key.x == 1 { f64::NAN } else { 1.0 })
            .unwrap_err();
        assert!(matches!(err, SimError::InvalidPeriod(_)));
        let cell = frame.container(CellKey::new(0, 0)).unwrap();
        assert_eq!(cell.cursor(), 1);
        assert_eq!(cell.current().len(), 1);
    }

    #[test]
    fn test_zero_mass_step_is_atomic() {
        let mut frame = ParticleFrameManager::with_history(3, 1.0).unwrap();
        frame.create_container(CellKey::new(0, 0));
        frame
            .reset_and_seed(vec![ParticleState::at(Vector2::new(0.5, 0.5)).with_mass(0.0)].into())
            .unwrap();
        let cursor = frame.container(CellKey::new(0, 0)).unwrap().cursor();

        assert!(matches!(frame.step(true), Err(SimError::NonIntegrable { .. })));
        assert_eq!(frame.container(CellKey::new(0, 0)).unwrap().cursor(), cursor);
        assert_eq!(frame.live().len(), 1);
    }

    #[test]
    fn test_create_container_twice_replaces_history() {
        let mut frame = ParticleFrameManager::with_history(3, 1.0).unwrap();
        frame.create_container(CellKey::new(0, 0));
        frame
            .reset_and_seed(vec![ParticleState::at(Vector2::new(0.5, 0.5))].into())
            .unwrap();
        frame.create_container(CellKey::new(0, 0));
        assert_eq!(frame.container_count(), 1);
        let cell = frame.container(CellKey::new(0, 0)).unwrap();
        assert_eq!(cell.cursor(), 0);
        assert!(cell.current().is_empty());
    }

    #[test]
    fn test_describe_names_every_cell() {
        let mut frame = ParticleFrameManager::new();
        frame.create_container(CellKey::new(0, 0));
        frame.create_container(CellKey::new(1, 0));
        let dump = frame.describe();
        assert!(dump.contains("(0, 0) buffered group count: 200"));
        assert!(dump.contains("(1, 0)"));
    }
}
