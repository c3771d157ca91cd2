//! Collision detection and response for the brick field
//!
//! Walls reflect elastically, the paddle reflects at an angle chosen by
//! where the ball lands on it, and bricks are tested by containment of the
//! ball's centre point (the radius is not considered).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::Brick;
use crate::consts::{PADDLE_MARGIN, PADDLE_MAX_BOUNCE_ANGLE};

/// Axis-aligned rectangle in canvas pixels (y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub min: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(min: Vec2, size: Vec2) -> Self {
        Self { min, size }
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.min + self.size
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.min + self.size * 0.5
    }

    /// Strict interior test; points on an edge are outside
    #[inline]
    pub fn contains_point(&self, p: Vec2) -> bool {
        let max = self.max();
        p.x > self.min.x && p.x < max.x && p.y > self.min.y && p.y < max.y
    }
}

/// Reflect off the left/right walls if the next position would leave
/// `[radius, width - radius]`
#[inline]
pub fn bounce_off_side_walls(pos: Vec2, vel: Vec2, radius: f32, width: f32) -> Vec2 {
    let next_x = pos.x + vel.x;
    if next_x > width - radius || next_x < radius {
        Vec2::new(-vel.x, vel.y)
    } else {
        vel
    }
}

/// True if the next position would pass above the top wall
#[inline]
pub fn hits_ceiling(pos: Vec2, vel: Vec2, radius: f32) -> bool {
    pos.y + vel.y < radius
}

/// True if the next position would drop into the paddle band at the bottom
#[inline]
pub fn reaches_paddle_band(pos: Vec2, vel: Vec2, radius: f32, height: f32) -> bool {
    pos.y + vel.y > height - radius - PADDLE_MARGIN
}

/// True if the ball's x lies strictly over the paddle
#[inline]
pub fn over_paddle(ball_x: f32, paddle_x: f32, paddle_width: f32) -> bool {
    ball_x > paddle_x && ball_x < paddle_x + paddle_width
}

/// New velocity after a paddle hit
///
/// The contact point relative to the paddle centre, in `[-1, 1]`, maps to a
/// launch angle in `[-60°, 60°]` from vertical. Speed is preserved.
pub fn paddle_bounce(ball_x: f32, paddle_x: f32, paddle_width: f32, speed: f32) -> Vec2 {
    let half = paddle_width / 2.0;
    let collide_point = ((ball_x - (paddle_x + half)) / half).clamp(-1.0, 1.0);
    let angle = collide_point * PADDLE_MAX_BOUNCE_ANGLE;
    Vec2::new(speed * angle.sin(), -speed * angle.cos())
}

/// Index of the first alive brick containing `point`, in slice order
pub fn first_brick_hit(bricks: &[Brick], point: Vec2) -> Option<usize> {
    bricks
        .iter()
        .position(|b| b.is_alive() && b.rect.contains_point(point))
}
