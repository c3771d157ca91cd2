//! Game state machine
//!
//! Owns the phase, the authoritative score, the current stage number and the
//! world for the stage in play. Phases:
//!
//! ```text
//! Waiting --Start--> Playing --ball lost--> GameOver --Retry--> Playing
//!                       |
//!                       +--grid exhausted--> Cleared --NextStage--> Playing
//!                                               |   (more stages left)
//!                                               +--Restart--> Playing
//!                                                   (final stage done)
//! ```

use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::stage::{StageError, StageTable};
use super::state::GameWorld;
use super::tick::{FrameReport, InputSnapshot, StepOutcome, step_frame};

/// Current phase of the game
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Start screen, nothing simulated
    Waiting,
    /// Simulation running
    Playing,
    /// Ball lost; the attempt is over
    GameOver,
    /// Stage grid exhausted (the final stage's clear is terminal)
    Cleared,
}

/// Player actions, one per overlay button
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Start,
    Retry,
    NextStage,
    Restart,
}

#[derive(Debug, Error)]
pub enum GameError {
    #[error(transparent)]
    Stage(#[from] StageError),

    #[error("{action:?} is not available in phase {phase:?}")]
    InvalidAction { action: Action, phase: GamePhase },
}

/// Overlay panel shown over the canvas when not playing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Overlay {
    Start,
    GameOver { score: u64 },
    StageCleared { stage: usize, score: u64 },
    AllCleared { score: u64 },
}

impl Overlay {
    pub fn title(&self) -> String {
        match self {
            Overlay::Start => "CYBER BREAKER".to_string(),
            Overlay::GameOver { .. } => "GAME OVER".to_string(),
            Overlay::StageCleared { stage, .. } => format!("STAGE {stage} CLEARED"),
            Overlay::AllCleared { .. } => "GAME CLEARED!".to_string(),
        }
    }

    pub fn message(&self) -> String {
        match self {
            Overlay::Start => "Bonus content - use the arrow keys".to_string(),
            Overlay::GameOver { score } | Overlay::StageCleared { score, .. } => {
                format!("SCORE: {score}")
            }
            Overlay::AllCleared { score } => format!("Well played! SCORE: {score}"),
        }
    }

    pub fn button_label(&self) -> &'static str {
        match self {
            Overlay::Start => "Start",
            Overlay::GameOver { .. } => "Retry",
            Overlay::StageCleared { .. } => "Next Stage",
            Overlay::AllCleared { .. } => "Play Again",
        }
    }

    /// The action this panel's button performs
    pub fn action(&self) -> Action {
        match self {
            Overlay::Start => Action::Start,
            Overlay::GameOver { .. } => Action::Retry,
            Overlay::StageCleared { .. } => Action::NextStage,
            Overlay::AllCleared { .. } => Action::Restart,
        }
    }
}

/// The game: phase, score, stage progression and the live world
pub struct Game {
    phase: GamePhase,
    score: u64,
    /// 1-based
    stage: usize,
    stages: StageTable,
    world: Option<GameWorld>,
    /// Seeds each new world
    rng: Pcg32,
    on_all_stages_cleared: Option<Box<dyn FnMut()>>,
    completion_fired: bool,
}

impl Game {
    pub fn new(stages: StageTable, seed: u64) -> Self {
        Self {
            phase: GamePhase::Waiting,
            score: 0,
            stage: 1,
            stages,
            world: None,
            rng: Pcg32::seed_from_u64(seed),
            on_all_stages_cleared: None,
            completion_fired: false,
        }
    }

    /// Register the callback fired the first time the final stage is cleared
    pub fn on_all_stages_cleared(&mut self, callback: impl FnMut() + 'static) {
        self.on_all_stages_cleared = Some(Box::new(callback));
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    /// Current stage number (1-based)
    pub fn stage(&self) -> usize {
        self.stage
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn world(&self) -> Option<&GameWorld> {
        self.world.as_ref()
    }

    pub fn world_mut(&mut self) -> Option<&mut GameWorld> {
        self.world.as_mut()
    }

    pub fn is_playing(&self) -> bool {
        self.phase == GamePhase::Playing
    }

    /// True once the final stage has been cleared
    pub fn is_complete(&self) -> bool {
        self.phase == GamePhase::Cleared && self.stage == self.stages.len()
    }

    /// Overlay to show, if any
    pub fn overlay(&self) -> Option<Overlay> {
        match self.phase {
            GamePhase::Waiting => Some(Overlay::Start),
            GamePhase::Playing => None,
            GamePhase::GameOver => Some(Overlay::GameOver { score: self.score }),
            GamePhase::Cleared if self.is_complete() => {
                Some(Overlay::AllCleared { score: self.score })
            }
            GamePhase::Cleared => Some(Overlay::StageCleared {
                stage: self.stage,
                score: self.score,
            }),
        }
    }

    /// Apply a player action. On success the game is `Playing`.
    pub fn apply(&mut self, action: Action) -> Result<(), GameError> {
        match (action, self.phase) {
            (Action::Start, GamePhase::Waiting)
            | (Action::Retry, GamePhase::GameOver) => self.begin_run(),
            (Action::Restart, GamePhase::Cleared) if self.is_complete() => self.begin_run(),
            (Action::NextStage, GamePhase::Cleared) if !self.is_complete() => {
                self.enter_stage(self.stage + 1)
            }
            (action, phase) => Err(GameError::InvalidAction { action, phase }),
        }
    }

    /// Fresh run from stage 1 with a zero score
    fn begin_run(&mut self) -> Result<(), GameError> {
        self.enter_stage(1)?;
        self.score = 0;
        Ok(())
    }

    fn enter_stage(&mut self, stage: usize) -> Result<(), GameError> {
        let layout = self.stages.get(stage)?;
        self.world = Some(GameWorld::new(layout, self.rng.random()));
        self.stage = stage;
        self.phase = GamePhase::Playing;
        log::info!("Stage {} ({}) started", stage, layout.name);
        Ok(())
    }

    /// Run one frame if playing. Score and phase are updated before returning.
    pub fn step(&mut self, input: InputSnapshot) -> Option<FrameReport> {
        if self.phase != GamePhase::Playing {
            return None;
        }
        let world = self.world.as_mut()?;
        let report = step_frame(world, input);
        self.score += report.points;

        match report.outcome {
            StepOutcome::Continue => {}
            StepOutcome::BallLost => {
                self.phase = GamePhase::GameOver;
                log::info!("Game over on stage {} with score {}", self.stage, self.score);
            }
            StepOutcome::Cleared => {
                self.phase = GamePhase::Cleared;
                log::info!("Stage {} cleared, score {}", self.stage, self.score);
                if self.is_complete() {
                    self.fire_completion();
                }
            }
        }
        Some(report)
    }

    fn fire_completion(&mut self) {
        if self.completion_fired {
            return;
        }
        self.completion_fired = true;
        log::info!("All stages cleared");
        if let Some(callback) = self.on_all_stages_cleared.as_mut() {
            callback();
        }
    }
}
