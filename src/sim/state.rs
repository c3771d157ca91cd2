//! Simulation entities and the per-stage world
//!
//! A `GameWorld` exists only while a stage is being played: it is rebuilt
//! from the stage layout on every start, retry and stage advance.

use glam::Vec2;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::stage::StageLayout;
use crate::consts::*;
use crate::fx::{Particles, ScreenShake};

/// Brick colours per remaining health
pub const TIER1_COLOR: u32 = 0x00f5ff;
pub const TIER2_COLOR: u32 = 0xff007f;
pub const TIER3_COLOR: u32 = 0xa855f7;

/// Colour for a brick with `health` hits left
pub fn tier_color(health: u8) -> u32 {
    match health {
        0 | 1 => TIER1_COLOR,
        2 => TIER2_COLOR,
        _ => TIER3_COLOR,
    }
}

/// Points for destroying a brick of the given starting tier
pub fn destroy_points(tier: u8) -> u64 {
    match tier {
        0 | 1 => TIER1_POINTS,
        2 => TIER2_POINTS,
        _ => TIER3_POINTS,
    }
}

/// The ball
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ball {
    pub pos: Vec2,
    pub vel: Vec2,
    pub radius: f32,
}

impl Ball {
    pub fn new() -> Self {
        Self {
            pos: Vec2::new(CANVAS_WIDTH / 2.0, CANVAS_HEIGHT - BALL_SPAWN_OFFSET),
            vel: Vec2::ZERO,
            radius: BALL_RADIUS,
        }
    }

    /// Put the ball back at the spawn point and launch it upward at a random
    /// angle between -45° and -135°
    pub fn launch<R: Rng>(&mut self, rng: &mut R) {
        self.pos = Vec2::new(CANVAS_WIDTH / 2.0, CANVAS_HEIGHT - BALL_SPAWN_OFFSET);
        let angle = -std::f32::consts::FRAC_PI_4 - rng.random::<f32>() * std::f32::consts::FRAC_PI_2;
        self.vel = Vec2::new(BALL_SPEED * angle.cos(), BALL_SPEED * angle.sin());
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.vel.length()
    }
}

impl Default for Ball {
    fn default() -> Self {
        Self::new()
    }
}

/// The player's paddle. Only `x` moves; it is kept in `[0, width - paddle width]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Paddle {
    pub x: f32,
    pub width: f32,
    pub height: f32,
}

impl Default for Paddle {
    fn default() -> Self {
        Self {
            x: (CANVAS_WIDTH - PADDLE_WIDTH) / 2.0,
            width: PADDLE_WIDTH,
            height: PADDLE_HEIGHT,
        }
    }
}

impl Paddle {
    /// Top edge of the paddle
    #[inline]
    pub fn y(&self) -> f32 {
        CANVAS_HEIGHT - self.height - PADDLE_MARGIN
    }

    #[inline]
    pub fn center_x(&self) -> f32 {
        self.x + self.width / 2.0
    }

    #[inline]
    pub fn max_x(&self) -> f32 {
        CANVAS_WIDTH - self.width
    }

    pub fn rect(&self) -> Rect {
        Rect::new(Vec2::new(self.x, self.y()), Vec2::new(self.width, self.height))
    }

    /// Move one step. Right wins when both directions are held.
    pub fn steer(&mut self, left: bool, right: bool) {
        if right && self.x < self.max_x() {
            self.x += PADDLE_STEP;
        } else if left && self.x > 0.0 {
            self.x -= PADDLE_STEP;
        }
        self.x = self.x.clamp(0.0, self.max_x());
    }
}

/// Brick liveness
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BrickStatus {
    Alive,
    Destroyed,
}

/// Result of a ball striking a brick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BrickHit {
    /// Damaged but still standing
    Chipped { points: u64 },
    /// Health ran out
    Destroyed { points: u64 },
}

impl BrickHit {
    pub fn points(&self) -> u64 {
        match *self {
            BrickHit::Chipped { points } | BrickHit::Destroyed { points } => points,
        }
    }
}

/// A brick in the stage grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Brick {
    pub column: usize,
    pub row: usize,
    pub rect: Rect,
    /// Starting health; decides destroy points
    pub tier: u8,
    pub health: u8,
    pub status: BrickStatus,
    /// 0xRRGGBB, follows remaining health
    pub color: u32,
}

impl Brick {
    pub fn new(column: usize, row: usize, rect: Rect, health: u8) -> Self {
        Self {
            column,
            row,
            rect,
            tier: health,
            health,
            status: BrickStatus::Alive,
            color: tier_color(health),
        }
    }

    #[inline]
    pub fn is_alive(&self) -> bool {
        self.status == BrickStatus::Alive
    }

    /// Take one hit. Returns `None` for an already destroyed brick.
    pub fn hit(&mut self) -> Option<BrickHit> {
        if !self.is_alive() {
            return None;
        }
        self.health = self.health.saturating_sub(1);
        if self.health == 0 {
            self.status = BrickStatus::Destroyed;
            Some(BrickHit::Destroyed {
                points: destroy_points(self.tier),
            })
        } else {
            self.color = tier_color(self.health);
            Some(BrickHit::Chipped { points: CHIP_BONUS })
        }
    }
}

/// Things that happened during a frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    PaddleHit,
    BrickChipped { column: usize, row: usize },
    BrickDestroyed { column: usize, row: usize },
    BallLost,
    StageCleared,
}

/// Everything the simulation mutates while a stage is in play
#[derive(Debug, Clone)]
pub struct GameWorld {
    pub ball: Ball,
    pub paddle: Paddle,
    /// Column-major, row-minor; this is the collision scan order
    pub bricks: Vec<Brick>,
    pub particles: Particles,
    pub shake: ScreenShake,
    /// Frames stepped since the stage started
    pub frame: u64,
    /// Drives launch angles, explosions and shake offsets
    pub rng: Pcg32,
}

impl GameWorld {
    /// Build a fresh world for `layout`
    pub fn new(layout: &StageLayout, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let mut ball = Ball::new();
        ball.launch(&mut rng);

        Self {
            ball,
            paddle: Paddle::default(),
            bricks: layout.build_bricks(),
            particles: Particles::new(),
            shake: ScreenShake::default(),
            frame: 0,
            rng,
        }
    }

    pub fn alive_bricks(&self) -> usize {
        self.bricks.iter().filter(|b| b.is_alive()).count()
    }

    /// True once every brick of the stage is destroyed
    pub fn is_exhausted(&self) -> bool {
        self.bricks.iter().all(|b| !b.is_alive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::stage::cell_rect;

    #[test]
    fn test_launch_is_upward_at_constant_speed() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut ball = Ball::new();
        for _ in 0..200 {
            ball.launch(&mut rng);
            assert!(ball.vel.y < 0.0);
            assert!((ball.speed() - BALL_SPEED).abs() < 1e-5);
            // Within 45° of vertical
            assert!(ball.vel.x.abs() <= -ball.vel.y + 1e-5);
            assert_eq!(ball.pos, Vec2::new(400.0, 450.0));
        }
    }

    #[test]
    fn test_paddle_steer_clamps() {
        let mut paddle = Paddle::default();
        assert_eq!(paddle.x, 340.0);

        paddle.x = 678.0;
        paddle.steer(false, true);
        assert_eq!(paddle.x, 680.0);
        paddle.steer(false, true);
        assert_eq!(paddle.x, 680.0);

        paddle.x = 3.0;
        paddle.steer(true, false);
        assert_eq!(paddle.x, 0.0);
    }

    #[test]
    fn test_paddle_right_wins() {
        let mut paddle = Paddle::default();
        paddle.steer(true, true);
        assert_eq!(paddle.x, 347.0);
    }

    #[test]
    fn test_brick_tiers() {
        let mut brick = Brick::new(0, 0, cell_rect(0, 0), 3);
        assert_eq!(brick.color, TIER3_COLOR);

        assert_eq!(brick.hit(), Some(BrickHit::Chipped { points: 5 }));
        assert_eq!(brick.color, TIER2_COLOR);
        assert_eq!(brick.hit(), Some(BrickHit::Chipped { points: 5 }));
        assert_eq!(brick.color, TIER1_COLOR);
        assert_eq!(brick.hit(), Some(BrickHit::Destroyed { points: 30 }));
        assert!(!brick.is_alive());
        assert_eq!(brick.hit(), None);
        assert_eq!(brick.health, 0);
    }

    #[test]
    fn test_destroy_points_by_tier() {
        assert_eq!(destroy_points(1), 10);
        assert_eq!(destroy_points(2), 20);
        assert_eq!(destroy_points(3), 30);
    }

    #[test]
    fn test_world_new() {
        let layout = StageLayout::new("t", vec![vec![1, 2], vec![0, 3]]);
        let world = GameWorld::new(&layout, 9);
        assert_eq!(world.bricks.len(), 3);
        assert_eq!(world.alive_bricks(), 3);
        assert!(!world.is_exhausted());
        assert!(world.particles.is_empty());
        assert!(!world.shake.is_active());
        assert!(world.ball.vel.y < 0.0);
    }
}
