//! World-scope particle manager
//!
//! Lays a regular grid of containers over the world, buffers particle
//! additions until they are committed, and keeps per-owner particle counts
//! in sync with the live set.

use std::collections::BTreeMap;

use super::frame::{CellKey, ParticleFrameManager, StepSummary};
use super::group::ParticleGroup;
use super::owner::OwnerId;
use super::particle::ParticleState;
use super::vector::Vector2;
use crate::error::Result;
use crate::renderer::ParticleVertex;
use crate::settings::EngineSettings;

/// Cell key of a finite `position` on a grid of `interval`-sized cells
pub fn grid_cell_key(interval: (u32, u32), position: Vector2) -> CellKey {
    let (dx, dy) = (interval.0 as f64, interval.1 as f64);
    CellKey::new(
        (dx * (position.x / dx).floor()) as i64,
        (dy * (position.y / dy).floor()) as i64,
    )
}

/// Grid-backed particle world
pub struct ParticleManager {
    settings: EngineSettings,
    frame: ParticleFrameManager,
    pending: ParticleGroup,
    owner_counts: BTreeMap<OwnerId, usize>,
}

impl ParticleManager {
    /// One container per cell over `[0, w) x [0, h)`
    pub fn new(world_extent: (u32, u32), cell_interval: (u32, u32)) -> Result<Self> {
        Self::from_settings(EngineSettings::for_world(world_extent, cell_interval))
    }

    pub fn from_settings(settings: EngineSettings) -> Result<Self> {
        settings.validate()?;

        let interval = settings.cell_interval;
        let mut frame =
            ParticleFrameManager::with_history(settings.container_capacity, settings.time_slice)?
                .with_key_fn(move |position| grid_cell_key(interval, position));

        let (w, h) = settings.world_extent;
        let (dx, dy) = interval;
        for x in (0..w).step_by(dx as usize) {
            for y in (0..h).step_by(dy as usize) {
                frame.create_container(CellKey::new(x as i64, y as i64));
            }
        }
        log::info!(
            "Particle grid ready: {}x{} world, {}x{} cells, {} containers of {} slots",
            w,
            h,
            dx,
            dy,
            frame.container_count(),
            settings.container_capacity
        );

        Ok(Self {
            settings,
            frame,
            pending: ParticleGroup::new(),
            owner_counts: BTreeMap::new(),
        })
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    pub fn frame(&self) -> &ParticleFrameManager {
        &self.frame
    }

    /// Particles waiting for [`commit`](Self::commit)
    pub fn pending(&self) -> &ParticleGroup {
        &self.pending
    }

    /// Buffer particles; nothing is visible until the next commit
    pub fn enqueue(&mut self, particles: impl IntoIterator<Item = ParticleState>) {
        self.pending.extend(particles);
    }

    /// Seed the world with every buffered particle
    ///
    /// This wipes the history of the whole grid, not only the cells the new
    /// particles land in; it is meant for populating a fresh round.
    pub fn commit(&mut self) -> Result<StepSummary> {
        let particles = std::mem::take(&mut self.pending);
        log::info!("Committing {} buffered particles", particles.len());
        let summary = self.frame.reset_and_seed(particles)?;
        self.refresh_counts();
        Ok(summary)
    }

    /// Advance one simulated frame
    pub fn tick(&mut self) -> Result<StepSummary> {
        let summary = self.frame.step(true)?;
        self.refresh_counts();
        Ok(summary)
    }

    /// Rewind cells by a per-cell period (0 or less leaves a cell alone)
    pub fn rewind_by(&mut self, period_fn: impl Fn(CellKey) -> f64) -> Result<usize> {
        let rewound = self.frame.backward(period_fn)?;
        self.refresh_counts();
        Ok(rewound)
    }

    /// Live particles owned by `owner`
    pub fn count_for(&self, owner: &OwnerId) -> usize {
        self.owner_counts.get(owner).copied().unwrap_or(0)
    }

    pub fn owner_counts(&self) -> &BTreeMap<OwnerId, usize> {
        &self.owner_counts
    }

    /// Grid cell holding `position`; non-finite positions have none
    pub fn cell_key_of(&self, position: Vector2) -> Option<CellKey> {
        position
            .is_finite()
            .then(|| grid_cell_key(self.settings.cell_interval, position))
    }

    /// Read-only view of the live set for rendering
    pub fn live(&self) -> impl Iterator<Item = &ParticleState> + '_ {
        self.frame.live().iter()
    }

    /// Packed per-particle vertices (position + owner color)
    pub fn vertices(&self) -> Vec<ParticleVertex> {
        self.live().map(ParticleVertex::from_particle).collect()
    }

    fn refresh_counts(&mut self) {
        self.owner_counts.clear();
        for particle in self.frame.live() {
            if let Some(id) = particle.owner_id() {
                *self.owner_counts.entry(id).or_insert(0) += 1;
            }
        }
    }

    /// One-line count summary
    pub fn summary(&self) -> String {
        let counts: Vec<String> = self
            .owner_counts
            .iter()
            .map(|(id, n)| format!("'{id}': {n}"))
            .collect();
        format!("manager: {{{}}}", counts.join(", "))
    }

    /// Count summary followed by every cell's dump, in grid order
    pub fn describe(&self) -> String {
        let text = format!("{}\n{}", self.summary(), self.frame.describe());
        log::debug!("{text}");
        text
    }

    /// Live set as plain records in JSON
    pub fn snapshot_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.frame.live().export())?)
    }
}
