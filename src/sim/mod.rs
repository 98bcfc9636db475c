//! Deterministic pulpit simulation
//!
//! Board logic lives here. This module must stay pure and deterministic:
//! - Time only advances through `tick(dt)`
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering, input or physics dependencies

pub mod grid;
pub mod manager;
pub mod pulpit;

pub use grid::Cell;
pub use manager::{ManagerError, PulpitManager, PulpitPrototype, SpawnTuning};
pub use pulpit::{LifecycleError, Pulpit, PulpitEvent, PulpitId, PulpitPhase};
