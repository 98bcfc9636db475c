//! Step-on scoring
//!
//! One point per pulpit the player lands on. Standing on the same pulpit
//! again, without having landed anywhere else in between, scores nothing.

use crate::sim::PulpitId;

/// What the pulpit core needs from the scoring side
pub trait Scoring {
    /// Player entered a pulpit it was not already standing on
    fn register_step_on(&mut self, id: PulpitId);

    /// The pulpit the player is on, as far as scoring knows
    fn current_pulpit(&self) -> Option<PulpitId>;
}

/// Default scoring collaborator
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScoreKeeper {
    score: u64,
    last_pulpit: Option<PulpitId>,
}

impl ScoreKeeper {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

impl Scoring for ScoreKeeper {
    fn register_step_on(&mut self, id: PulpitId) {
        if self.last_pulpit == Some(id) {
            return;
        }
        self.score += 1;
        self.last_pulpit = Some(id);
        log::info!("Stepped on pulpit {}, score {}", id, self.score);
    }

    fn current_pulpit(&self) -> Option<PulpitId> {
        self.last_pulpit
    }
}
