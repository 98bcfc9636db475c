//! Pulpit Run - a disappearing-platform arcade game core
//!
//! Core modules:
//! - `sim`: Platform lifecycle, grid placement and population control
//! - `settings`: Data-driven tuning loaded from the diary file
//! - `rng`: Seeded randomness for timing jitter and candidate ordering
//! - `score`: Step-on scoring collaborator
//! - `session`: Owned top-level context tying the pieces together

pub mod rng;
pub mod score;
pub mod session;
pub mod settings;
pub mod sim;

pub use rng::GameRng;
pub use score::{ScoreKeeper, Scoring};
pub use session::{FallDetector, GameOver, Session};
pub use settings::{Settings, SettingsError};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Number of pulpits kept alive at steady state
    pub const TARGET_POPULATION: usize = 2;

    /// Shortest lifetime a pulpit may be armed with (seconds)
    pub const MIN_DURATION: f32 = 0.05;
    /// Gap kept between a spawn trigger and the destroy instant (seconds)
    pub const SPAWN_EPSILON: f32 = 1.0e-3;

    /// World distance between neighbouring grid cells
    pub const GRID_STEP: f32 = 9.0;
    /// Cosmetic height pulpits are placed at
    pub const PULPIT_HEIGHT: f32 = 0.1;

    /// Built-in diary defaults
    pub const DEFAULT_MIN_DESTROY: f32 = 4.0;
    pub const DEFAULT_MAX_DESTROY: f32 = 5.0;
    pub const DEFAULT_SPAWN_LEAD: f32 = 2.5;
    pub const DEFAULT_PLAYER_SPEED: f32 = 3.0;
    pub const DEFAULT_MIN_SAFE_LIFETIME: f32 = 1.2;
    pub const DEFAULT_VACATED_COOLDOWN: f32 = 1.5;

    /// Player height at or below which the run is over
    pub const FALL_THRESHOLD: f32 = -5.0;
}
