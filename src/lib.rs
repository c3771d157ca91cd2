//! Cyber Breaker - a stage-based brick breaker mini-game
//!
//! Core modules:
//! - `sim`: Deterministic simulation (physics, collisions, stages, game state machine)
//! - `fx`: Particles, screen shake and the ambient backdrop field
//! - `platform`: Frame scheduling and keyboard input (browser/native)
//! - `renderer`: 2D draw pass and WebGPU pipeline
//! - `session`: Ties game, loop, input and settings together

pub mod fx;
pub mod platform;
pub mod renderer;
pub mod session;
pub mod settings;
pub mod sim;

pub use session::Session;
pub use settings::{QualityPreset, Settings};

/// Game configuration constants
pub mod consts {
    /// Logical canvas size (scaled to the container by the page)
    pub const CANVAS_WIDTH: f32 = 800.0;
    pub const CANVAS_HEIGHT: f32 = 500.0;

    /// Ball defaults
    pub const BALL_RADIUS: f32 = 8.0;
    /// Constant ball speed (pixels per frame); only direction changes on bounces
    pub const BALL_SPEED: f32 = 5.0;
    /// Ball spawn height above the bottom edge
    pub const BALL_SPAWN_OFFSET: f32 = 50.0;

    /// Paddle defaults
    pub const PADDLE_WIDTH: f32 = 120.0;
    pub const PADDLE_HEIGHT: f32 = 12.0;
    /// Gap between paddle and the bottom edge
    pub const PADDLE_MARGIN: f32 = 5.0;
    /// Paddle movement per frame while a key is held
    pub const PADDLE_STEP: f32 = 7.0;
    /// Maximum paddle deflection (60 degrees either side of vertical)
    pub const PADDLE_MAX_BOUNCE_ANGLE: f32 = std::f32::consts::FRAC_PI_3;

    /// Brick grid geometry
    pub const BRICK_WIDTH: f32 = 65.0;
    pub const BRICK_HEIGHT: f32 = 20.0;
    pub const BRICK_PADDING: f32 = 10.0;
    pub const BRICK_OFFSET_TOP: f32 = 50.0;
    pub const BRICK_OFFSET_LEFT: f32 = 35.0;
    /// Largest grid that still fits the canvas with room above the paddle
    pub const MAX_GRID_ROWS: usize = 10;
    pub const MAX_GRID_COLUMNS: usize = 10;
    /// Highest brick health tier
    pub const MAX_BRICK_HEALTH: u8 = 3;

    /// Scoring
    pub const CHIP_BONUS: u64 = 5;
    pub const TIER1_POINTS: u64 = 10;
    pub const TIER2_POINTS: u64 = 20;
    pub const TIER3_POINTS: u64 = 30;

    /// Screen shake (intensity in pixels, duration in frames)
    pub const SHAKE_PADDLE: (f32, u32) = (3.0, 8);
    pub const SHAKE_BRICK: (f32, u32) = (5.0, 10);
    pub const SHAKE_MISS: (f32, u32) = (20.0, 30);

    /// Explosion particles
    pub const EXPLOSION_PARTICLES: usize = 15;
    /// Explosion velocity range per axis ([-spread, spread])
    pub const EXPLOSION_SPREAD: f32 = 2.0;
    /// Alpha lost per frame
    pub const PARTICLE_FADE: f32 = 0.02;
    /// Drawn radius of an explosion particle
    pub const PARTICLE_SIZE: f32 = 2.0;
    /// Hard cap on live explosion particles
    pub const MAX_PARTICLES: usize = 512;

    /// Backdrop particle field
    pub const FIELD_PARTICLES: usize = 50;
    /// Distance under which two motes get a link line
    pub const FIELD_LINK_DISTANCE: f32 = 100.0;
    /// Peak alpha of a link line
    pub const FIELD_LINK_ALPHA: f32 = 0.1;
    /// Vertical drift per unit of scroll offset from the midpoint
    pub const FIELD_PARALLAX: f32 = 0.25;
}

/// Split a `0xRRGGBB` colour into RGBA floats
#[inline]
pub const fn rgba(hex: u32, alpha: f32) -> [f32; 4] {
    let r = ((hex >> 16) & 0xff) as f32 / 255.0;
    let g = ((hex >> 8) & 0xff) as f32 / 255.0;
    let b = (hex & 0xff) as f32 / 255.0;
    [r, g, b, alpha]
}
