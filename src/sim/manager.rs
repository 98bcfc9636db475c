//! Pulpit registry and spawn placement
//!
//! The manager is the only writer of board state. Pulpits report spawn
//! requests and expiry as events; the manager applies them in the order they
//! were emitted, places replacements on the grid and keeps the board at
//! [`TARGET_POPULATION`] live pulpits whenever a free cell can be found.

use glam::Vec3;
use std::collections::BTreeSet;
use thiserror::Error;

use super::grid::Cell;
use super::pulpit::{LifecycleError, Pulpit, PulpitEvent, PulpitId};
use crate::consts::*;
use crate::rng::GameRng;
use crate::score::Scoring;
use crate::settings::Settings;

/// Fatal manager configuration problems
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ManagerError {
    #[error("no pulpit prototype assigned")]
    MissingPrototype,
}

/// Template every spawned pulpit is stamped from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PulpitPrototype {
    /// Cosmetic height of the walking surface
    pub height: f32,
}

impl Default for PulpitPrototype {
    fn default() -> Self {
        Self {
            height: PULPIT_HEIGHT,
        }
    }
}

/// Timing and placement parameters, resolved from [`Settings`]
#[derive(Debug, Clone, PartialEq)]
pub struct SpawnTuning {
    pub min_destroy: f32,
    pub max_destroy: f32,
    /// Seconds before death that a successor is requested
    pub spawn_lead: f32,
    pub min_safe_lifetime: f32,
    pub enforce_min_safe_lifetime: bool,
    /// Seconds a vacated cell is skipped by neighbour placement
    pub vacated_cooldown: f32,
    pub grid_step: f32,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl SpawnTuning {
    pub fn from_settings(settings: &Settings) -> Self {
        let p = &settings.pulpit_data;
        let m = &settings.manager_data;
        Self {
            min_destroy: p.min_pulpit_destroy_time,
            max_destroy: p.max_pulpit_destroy_time,
            spawn_lead: p.pulpit_spawn_time,
            min_safe_lifetime: m.min_safe_lifetime,
            enforce_min_safe_lifetime: m.enforce_min_safe_lifetime,
            vacated_cooldown: m.vacated_cooldown,
            grid_step: m.grid_step,
        }
    }
}

/// Owner of every live pulpit
#[derive(Debug, Clone, PartialEq)]
pub struct PulpitManager {
    tuning: SpawnTuning,
    prototype: Option<PulpitPrototype>,
    rng: GameRng,
    /// Live pulpits in spawn order
    active: Vec<Pulpit>,
    /// Pulpits that already asked for a successor
    pending: BTreeSet<PulpitId>,
    last_vacated: Option<(Cell, f32)>,
    /// Seconds of simulated time since start
    now: f32,
    next_id: u32,
    spawned_total: u64,
    destroyed_total: u64,
    prototype_reported: bool,
}

impl PulpitManager {
    pub fn new(tuning: SpawnTuning, prototype: Option<PulpitPrototype>, seed: u64) -> Self {
        Self {
            tuning,
            prototype,
            rng: GameRng::new(seed),
            active: Vec::with_capacity(TARGET_POPULATION + 1),
            pending: BTreeSet::new(),
            last_vacated: None,
            now: 0.0,
            next_id: 1,
            spawned_total: 0,
            destroyed_total: 0,
            prototype_reported: false,
        }
    }

    /// Seed the board with a single pulpit at the origin
    pub fn start(&mut self) -> Result<PulpitId, ManagerError> {
        let t = &self.tuning;
        log::info!(
            "Pulpit manager start - min {:.2}s max {:.2}s lead {:.2}s min safe {:.2}s",
            t.min_destroy,
            t.max_destroy,
            t.spawn_lead,
            t.min_safe_lifetime
        );
        self.spawn_at(Cell::ORIGIN)
    }

    /// Drop every pulpit and rewind to a fresh board with `seed`
    pub fn reset(&mut self, seed: u64) {
        for pulpit in &mut self.active {
            pulpit.destroy();
        }
        self.active.clear();
        self.pending.clear();
        self.last_vacated = None;
        self.now = 0.0;
        self.spawned_total = 0;
        self.destroyed_total = 0;
        self.rng.reseed(seed);
    }

    /// Advance every live pulpit by `dt`, applying their events as they occur
    pub fn tick(&mut self, dt: f32, scoring: &dyn Scoring) {
        let dt = dt.max(0.0);
        self.now += dt;

        // Pulpits spawned during this tick start counting next tick
        let ids: Vec<PulpitId> = self.active.iter().map(Pulpit::id).collect();
        let mut events = Vec::new();

        for id in ids {
            let Some(index) = self.index_of(id) else {
                continue;
            };
            if let Err(err) = self.active[index].tick(dt, &mut events) {
                lifecycle_defect(err);
                continue;
            }
            for event in events.drain(..) {
                self.apply(event, scoring);
            }
        }
    }

    fn apply(&mut self, event: PulpitEvent, scoring: &dyn Scoring) {
        match event {
            PulpitEvent::SpawnAdjacent(id) => {
                self.request_spawn_adjacent(id);
            }
            PulpitEvent::Unregister(id) => {
                self.unregister(id, scoring);
            }
            PulpitEvent::StepOn(_) => {}
        }
    }

    /// A live pulpit asks for a successor next to it.
    ///
    /// Spawns right away while the board is below target; otherwise the
    /// request is remembered and the next death fills the slot.
    pub fn request_spawn_adjacent(&mut self, source: PulpitId) -> Option<PulpitId> {
        if self.index_of(source).is_none() {
            log::debug!("Ignored spawn request from inactive pulpit {}", source);
            return None;
        }
        if !self.pending.insert(source) {
            log::debug!("Ignored duplicate spawn request from pulpit {}", source);
            return None;
        }

        log::debug!(
            "Spawn requested by pulpit {} (active={})",
            source,
            self.active.len()
        );

        if self.active.len() < TARGET_POPULATION {
            self.spawn_adjacent_to(source)
        } else {
            log::debug!("Board full, spawn for {} deferred until a pulpit dies", source);
            None
        }
    }

    /// Remove a pulpit and refill the board.
    ///
    /// Removing a pulpit that is not live is a no-op. Returns the pulpits
    /// spawned to restore the population.
    pub fn unregister(&mut self, id: PulpitId, scoring: &dyn Scoring) -> Vec<PulpitId> {
        self.pending.remove(&id);
        let Some(index) = self.index_of(id) else {
            return Vec::new();
        };

        let mut pulpit = self.active.remove(index);
        pulpit.destroy();
        self.destroyed_total += 1;
        self.last_vacated = Some((pulpit.cell(), self.now));

        log::info!(
            "Unregistered pulpit {} at {}, active now {}",
            id,
            pulpit.cell(),
            self.active.len()
        );

        self.reconcile(scoring)
    }

    fn reconcile(&mut self, scoring: &dyn Scoring) -> Vec<PulpitId> {
        let mut spawned = Vec::new();

        let Some(anchor) = self.select_anchor(scoring) else {
            // Empty board: reseed at the origin like a fresh start
            if let Ok(id) = self.spawn_at(Cell::ORIGIN) {
                spawned.push(id);
            }
            return spawned;
        };

        let needed = TARGET_POPULATION.saturating_sub(self.active.len());
        for _ in 0..needed {
            match self.spawn_adjacent_to(anchor) {
                Some(id) => spawned.push(id),
                None => break,
            }
        }
        spawned
    }

    /// Player's pulpit, then an outstanding requester, then the oldest live pulpit
    fn select_anchor(&self, scoring: &dyn Scoring) -> Option<PulpitId> {
        if let Some(id) = scoring.current_pulpit()
            && self.index_of(id).is_some()
        {
            return Some(id);
        }

        self.pending
            .iter()
            .copied()
            .find(|id| self.index_of(*id).is_some())
            .or_else(|| self.active.first().map(Pulpit::id))
    }

    fn spawn_adjacent_to(&mut self, anchor: PulpitId) -> Option<PulpitId> {
        if self.prototype.is_none() {
            self.report_missing_prototype();
            return None;
        }

        let origin = self.get(anchor)?.cell();
        match self.find_free_cell(origin) {
            Some(cell) => self.spawn_at(cell).ok(),
            None => {
                log::warn!(
                    "Could not find a free cell near {} (active={})",
                    origin,
                    self.active.len()
                );
                None
            }
        }
    }

    /// Shuffled N/E/S/W neighbours first, then the shuffled Manhattan-2 ring
    fn find_free_cell(&mut self, origin: Cell) -> Option<Cell> {
        let mut near = origin.neighbors();
        self.rng.shuffle(&mut near);

        for cell in near {
            if self.is_recently_vacated(cell) {
                log::debug!("Skipping recently vacated cell {}", cell);
                continue;
            }
            if !self.is_occupied(cell) {
                return Some(cell);
            }
        }

        let mut ring = origin.ring2();
        self.rng.shuffle(&mut ring);
        ring.into_iter().find(|cell| !self.is_occupied(*cell))
    }

    fn is_recently_vacated(&self, cell: Cell) -> bool {
        matches!(
            self.last_vacated,
            Some((vacated, at)) if vacated == cell && self.now - at < self.tuning.vacated_cooldown
        )
    }

    /// Draw `(destroy, spawn_at)` for a new pulpit
    fn roll_timings(&mut self) -> (f32, f32) {
        let t = &self.tuning;
        let mut destroy = self.rng.range_f32(t.min_destroy, t.max_destroy).max(MIN_DURATION);

        let floor = t.spawn_lead + t.min_safe_lifetime;
        if t.enforce_min_safe_lifetime && destroy < floor {
            destroy = floor;
        }

        let spawn_at = (destroy - t.spawn_lead)
            .clamp(MIN_DURATION, (destroy - MIN_DURATION).max(MIN_DURATION));
        (destroy, spawn_at)
    }

    fn spawn_at(&mut self, cell: Cell) -> Result<PulpitId, ManagerError> {
        if self.prototype.is_none() {
            self.report_missing_prototype();
            return Err(ManagerError::MissingPrototype);
        }

        let (destroy, spawn_at) = self.roll_timings();
        let id = PulpitId(self.next_id);
        self.next_id += 1;

        let mut pulpit = Pulpit::new(id, cell);
        if let Err(err) = pulpit.initialize(destroy, spawn_at) {
            lifecycle_defect(err);
        }
        self.active.push(pulpit);
        self.spawned_total += 1;

        log::info!(
            "Spawned pulpit {} at {} -> destroy={:.2}s spawnAt={:.2}s (active={})",
            id,
            cell,
            destroy,
            spawn_at,
            self.active.len()
        );
        Ok(id)
    }

    fn report_missing_prototype(&mut self) {
        if !self.prototype_reported {
            self.prototype_reported = true;
            log::error!("{}", ManagerError::MissingPrototype);
        }
    }

    /// Player overlap began on `id`. Delivers a step-on to scoring.
    pub fn player_enter(&mut self, id: PulpitId, scoring: &mut dyn Scoring) -> bool {
        let Some(index) = self.index_of(id) else {
            return false;
        };
        let mut events = Vec::new();
        if !self.active[index].player_enter(&mut events) {
            return false;
        }
        for event in events {
            if let PulpitEvent::StepOn(id) = event {
                scoring.register_step_on(id);
            }
        }
        true
    }

    /// Player overlap ended on `id`
    pub fn player_exit(&mut self, id: PulpitId) -> bool {
        match self.index_of(id) {
            Some(index) => self.active[index].player_exit(),
            None => false,
        }
    }

    fn index_of(&self, id: PulpitId) -> Option<usize> {
        self.active.iter().position(|p| p.id() == id)
    }

    pub fn get(&self, id: PulpitId) -> Option<&Pulpit> {
        self.active.iter().find(|p| p.id() == id)
    }

    pub fn active(&self) -> &[Pulpit] {
        &self.active
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    pub fn is_occupied(&self, cell: Cell) -> bool {
        self.active.iter().any(|p| p.cell() == cell)
    }

    pub fn pending_requesters(&self) -> impl Iterator<Item = PulpitId> + '_ {
        self.pending.iter().copied()
    }

    /// Most recently freed cell and when it was freed
    pub fn last_vacated(&self) -> Option<(Cell, f32)> {
        self.last_vacated
    }

    pub fn world_position(&self, id: PulpitId) -> Option<Vec3> {
        let height = self.prototype.unwrap_or_default().height;
        self.get(id)
            .map(|p| p.cell().world_position(self.tuning.grid_step, height))
    }

    pub fn now(&self) -> f32 {
        self.now
    }

    pub fn spawned_total(&self) -> u64 {
        self.spawned_total
    }

    pub fn destroyed_total(&self) -> u64 {
        self.destroyed_total
    }

    pub fn tuning(&self) -> &SpawnTuning {
        &self.tuning
    }
}

/// Registry and pulpit disagree about a lifecycle. Loud in debug builds.
fn lifecycle_defect(err: LifecycleError) {
    log::error!("Lifecycle defect: {}", err);
    if cfg!(debug_assertions) {
        panic!("lifecycle defect: {err}");
    }
}
