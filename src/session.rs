//! Session context
//!
//! One `Session` owns everything a run needs: settings, the pulpit manager,
//! scoring and the game-over latch. Frontends hold a session and feed it
//! ticks and player events.

use crate::consts::FALL_THRESHOLD;
use crate::score::{ScoreKeeper, Scoring};
use crate::settings::Settings;
use crate::sim::{ManagerError, PulpitId, PulpitManager, PulpitPrototype, SpawnTuning};

/// Fires once when the player drops below a height threshold
#[derive(Debug, Clone, PartialEq)]
pub struct FallDetector {
    threshold: f32,
    triggered: bool,
}

impl Default for FallDetector {
    fn default() -> Self {
        Self::new(FALL_THRESHOLD)
    }
}

impl FallDetector {
    pub fn new(threshold: f32) -> Self {
        Self {
            threshold,
            triggered: false,
        }
    }

    /// Feed the player's current height. True on the first observation at or below the threshold.
    pub fn observe(&mut self, height: f32) -> bool {
        if self.triggered || height > self.threshold {
            return false;
        }
        self.triggered = true;
        log::info!("Player fell below {:.2}", self.threshold);
        true
    }

    pub fn reset(&mut self) {
        self.triggered = false;
    }
}

/// End-of-run latch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GameOver {
    final_score: Option<u64>,
}

impl GameOver {
    /// Latch the run as over. Returns false if it already was.
    pub fn trigger(&mut self, score: u64) -> bool {
        if self.final_score.is_some() {
            return false;
        }
        self.final_score = Some(score);
        log::info!("Game over, final score {}", score);
        true
    }

    pub fn is_over(&self) -> bool {
        self.final_score.is_some()
    }

    pub fn final_score(&self) -> Option<u64> {
        self.final_score
    }

    pub fn reset(&mut self) {
        self.final_score = None;
    }
}

/// A single run of the game
#[derive(Debug, Clone)]
pub struct Session {
    settings: Settings,
    seed: u64,
    manager: PulpitManager,
    score: ScoreKeeper,
    game_over: GameOver,
    fall: FallDetector,
}

impl Session {
    pub fn new(settings: Settings, seed: u64) -> Self {
        Self::with_prototype(settings, Some(PulpitPrototype::default()), seed)
    }

    pub fn with_prototype(settings: Settings, prototype: Option<PulpitPrototype>, seed: u64) -> Self {
        let manager = PulpitManager::new(SpawnTuning::from_settings(&settings), prototype, seed);
        Self {
            settings,
            seed,
            manager,
            score: ScoreKeeper::new(),
            game_over: GameOver::default(),
            fall: FallDetector::default(),
        }
    }

    /// Place the first pulpit
    pub fn start(&mut self) -> Result<PulpitId, ManagerError> {
        log::info!("Session starting with seed {}", self.seed);
        self.manager.start()
    }

    /// Advance the board. Frozen once the game is over.
    pub fn tick(&mut self, dt: f32) {
        if self.game_over.is_over() {
            return;
        }
        self.manager.tick(dt, &self.score);
    }

    pub fn player_enter(&mut self, id: PulpitId) -> bool {
        if self.game_over.is_over() {
            return false;
        }
        self.manager.player_enter(id, &mut self.score)
    }

    pub fn player_exit(&mut self, id: PulpitId) -> bool {
        self.manager.player_exit(id)
    }

    /// Report the player's height; ends the run on a fall
    pub fn observe_player_height(&mut self, height: f32) -> bool {
        self.fall.observe(height) && self.trigger_game_over()
    }

    pub fn trigger_game_over(&mut self) -> bool {
        self.game_over.trigger(self.score.score())
    }

    /// Start over on a fresh board
    pub fn restart(&mut self, seed: u64) -> Result<PulpitId, ManagerError> {
        self.seed = seed;
        self.manager.reset(seed);
        self.score.reset();
        self.game_over.reset();
        self.fall.reset();
        self.start()
    }

    pub fn manager(&self) -> &PulpitManager {
        &self.manager
    }

    pub fn score(&self) -> u64 {
        self.score.score()
    }

    pub fn current_pulpit(&self) -> Option<PulpitId> {
        self.score.current_pulpit()
    }

    pub fn game_over(&self) -> &GameOver {
        &self.game_over
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;

    #[test]
    fn test_fall_detector_fires_once() {
        let mut fall = FallDetector::default();
        assert!(!fall.observe(0.0));
        assert!(fall.observe(-5.0));
        assert!(!fall.observe(-10.0));
        fall.reset();
        assert!(fall.observe(-6.0));
    }

    #[test]
    fn test_game_over_latches() {
        let mut over = GameOver::default();
        assert!(over.trigger(3));
        assert!(!over.trigger(7));
        assert_eq!(over.final_score(), Some(3));
    }

    #[test]
    fn test_fall_freezes_board() {
        let mut session = Session::new(Settings::default(), 1);
        let first = session.start().unwrap();
        assert!(session.player_enter(first));
        assert_eq!(session.score(), 1);

        assert!(session.observe_player_height(-8.0));
        assert_eq!(session.game_over().final_score(), Some(1));

        let frozen = session.manager().clone();
        for _ in 0..600 {
            session.tick(SIM_DT);
        }
        assert_eq!(session.manager(), &frozen);
        assert!(!session.player_enter(first));
    }

    #[test]
    fn test_restart_resets_run() {
        let mut session = Session::new(Settings::default(), 1);
        let first = session.start().unwrap();
        session.player_enter(first);
        for _ in 0..300 {
            session.tick(SIM_DT);
        }
        session.trigger_game_over();

        session.restart(2).unwrap();
        assert_eq!(session.score(), 0);
        assert!(!session.game_over().is_over());
        assert_eq!(session.manager().active_count(), 1);
        assert_eq!(session.seed(), 2);
    }

    #[test]
    fn test_missing_prototype_session() {
        let mut session = Session::with_prototype(Settings::default(), None, 1);
        assert_eq!(session.start(), Err(ManagerError::MissingPrototype));
        session.tick(SIM_DT);
        assert_eq!(session.manager().active_count(), 0);
    }

    #[test]
    fn test_player_pulpit_anchors_replacements() {
        let mut session = Session::new(Settings::default(), 4);
        let first = session.start().unwrap();
        session.player_enter(first);

        // Walk the player onto each new pulpit as soon as it appears
        for _ in 0..(30.0 / SIM_DT) as usize {
            session.tick(SIM_DT);
            let newest = session.manager().active().last().map(|p| p.id());
            if let Some(id) = newest
                && Some(id) != session.current_pulpit()
            {
                if let Some(current) = session.current_pulpit() {
                    session.player_exit(current);
                }
                session.player_enter(id);
            }
        }
        assert!(session.score() > 5);
        assert!(session.manager().active_count() <= 2);
    }
}
