//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - One step per display frame, no wall-clock time
//! - Seeded RNG only
//! - Stable brick scan order (column-major)
//! - No rendering or platform dependencies

pub mod collision;
pub mod game;
pub mod stage;
pub mod state;
pub mod tick;

pub use collision::Rect;
pub use game::{Action, Game, GameError, GamePhase, Overlay};
pub use stage::{StageError, StageLayout, StageTable};
pub use state::{Ball, Brick, BrickHit, BrickStatus, GameEvent, GameWorld, Paddle};
pub use tick::{FrameReport, InputSnapshot, StepOutcome, autopilot, step_frame};
