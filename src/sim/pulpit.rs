//! Pulpit lifecycle state machine
//!
//! A pulpit is a pure countdown driven by externally supplied timings. It never
//! touches the registry; it reports what happened through [`PulpitEvent`]s and
//! the manager applies them in order.

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use super::grid::Cell;
use crate::consts::{MIN_DURATION, SPAWN_EPSILON};

/// Stable pulpit handle, never reused within a manager's lifetime
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PulpitId(pub u32);

impl fmt::Display for PulpitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Lifecycle phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PulpitPhase {
    /// Created, waiting for timings
    Uninitialized,
    /// Counting down
    Alive,
    /// Lifetime over, unregister reported, awaiting removal
    Dying,
    /// Removed from the board (terminal)
    Destroyed,
}

/// Side effects a pulpit asks its owner to carry out
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PulpitEvent {
    /// Place a replacement next to this pulpit
    SpawnAdjacent(PulpitId),
    /// Lifetime elapsed, remove from the registry
    Unregister(PulpitId),
    /// Player stepped onto this pulpit
    StepOn(PulpitId),
}

/// Lifecycle misuse. Always a bookkeeping defect in the owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum LifecycleError {
    #[error("pulpit {0} ticked before being initialized")]
    NotInitialized(PulpitId),
    #[error("pulpit {0} re-initialized after its countdown started")]
    AlreadyRunning(PulpitId),
    #[error("pulpit {0} ticked after its lifetime ended")]
    Expired(PulpitId),
}

/// A single walkable platform with a finite lifetime
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pulpit {
    id: PulpitId,
    cell: Cell,
    destroy_time: f32,
    spawn_trigger: f32,
    elapsed: f32,
    spawn_requested: bool,
    player_present: bool,
    phase: PulpitPhase,
    /// Set by the first tick; re-arming is refused afterwards
    started: bool,
}

impl Pulpit {
    pub fn new(id: PulpitId, cell: Cell) -> Self {
        Self {
            id,
            cell,
            destroy_time: 0.0,
            spawn_trigger: 0.0,
            elapsed: 0.0,
            spawn_requested: false,
            player_present: false,
            phase: PulpitPhase::Uninitialized,
            started: false,
        }
    }

    /// Arm the countdown.
    ///
    /// `destroy_duration` is clamped to at least [`MIN_DURATION`] and
    /// `spawn_at` into `[0, destroy_duration - SPAWN_EPSILON]`, so the spawn
    /// trigger always fires before death. Re-arming is allowed until the
    /// first tick.
    pub fn initialize(&mut self, destroy_duration: f32, spawn_at: f32) -> Result<(), LifecycleError> {
        match self.phase {
            PulpitPhase::Uninitialized => {}
            PulpitPhase::Alive if !self.started => {}
            _ => return Err(LifecycleError::AlreadyRunning(self.id)),
        }

        let destroy = destroy_duration.max(MIN_DURATION);
        self.destroy_time = destroy;
        self.spawn_trigger = spawn_at.max(0.0).min(destroy - SPAWN_EPSILON);
        self.elapsed = 0.0;
        self.spawn_requested = false;
        self.phase = PulpitPhase::Alive;
        Ok(())
    }

    /// Advance the countdown by `dt` seconds.
    ///
    /// Emits `SpawnAdjacent` once when the spawn trigger is crossed and
    /// `Unregister` once when the lifetime runs out, in that order when both
    /// happen in the same tick.
    pub fn tick(&mut self, dt: f32, out: &mut Vec<PulpitEvent>) -> Result<(), LifecycleError> {
        match self.phase {
            PulpitPhase::Alive => {}
            PulpitPhase::Uninitialized => return Err(LifecycleError::NotInitialized(self.id)),
            PulpitPhase::Dying | PulpitPhase::Destroyed => {
                return Err(LifecycleError::Expired(self.id));
            }
        }

        self.started = true;
        self.elapsed += dt.max(0.0);

        if !self.spawn_requested && self.elapsed >= self.spawn_trigger {
            self.spawn_requested = true;
            out.push(PulpitEvent::SpawnAdjacent(self.id));
        }

        if self.elapsed >= self.destroy_time {
            self.phase = PulpitPhase::Dying;
            out.push(PulpitEvent::Unregister(self.id));
        }

        Ok(())
    }

    /// Player overlap began. Returns true if a `StepOn` was emitted.
    pub fn player_enter(&mut self, out: &mut Vec<PulpitEvent>) -> bool {
        if self.player_present || !self.is_standing() {
            return false;
        }
        self.player_present = true;
        out.push(PulpitEvent::StepOn(self.id));
        true
    }

    /// Player overlap ended. Returns true if the player was present.
    pub fn player_exit(&mut self) -> bool {
        std::mem::replace(&mut self.player_present, false)
    }

    /// Final transition once the owner has removed this pulpit
    pub fn destroy(&mut self) {
        self.phase = PulpitPhase::Destroyed;
        self.player_present = false;
    }

    pub fn id(&self) -> PulpitId {
        self.id
    }

    pub fn cell(&self) -> Cell {
        self.cell
    }

    pub fn destroy_time(&self) -> f32 {
        self.destroy_time
    }

    pub fn spawn_trigger(&self) -> f32 {
        self.spawn_trigger
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Seconds left before this pulpit disappears
    pub fn remaining(&self) -> f32 {
        (self.destroy_time - self.elapsed).max(0.0)
    }

    pub fn spawn_requested(&self) -> bool {
        self.spawn_requested
    }

    pub fn player_present(&self) -> bool {
        self.player_present
    }

    pub fn phase(&self) -> PulpitPhase {
        self.phase
    }

    pub fn is_alive(&self) -> bool {
        self.phase == PulpitPhase::Alive
    }

    /// Still physically on the board (alive or dying)
    fn is_standing(&self) -> bool {
        matches!(self.phase, PulpitPhase::Alive | PulpitPhase::Dying)
    }
}
