//! Per-frame simulation step
//!
//! One call advances the world by exactly one display frame. Order within a
//! frame: particles, brick collision, exhaustion check, walls and paddle,
//! paddle steering, ball integration.

use super::collision::{
    bounce_off_side_walls, first_brick_hit, hits_ceiling, over_paddle, paddle_bounce,
    reaches_paddle_band,
};
use super::state::{BrickHit, GameEvent, GameWorld};
use crate::consts::*;

/// Held-key state for a single frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    pub left: bool,
    pub right: bool,
}

/// How the frame ended
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StepOutcome {
    /// Keep playing
    #[default]
    Continue,
    /// Ball fell past the paddle
    BallLost,
    /// Every brick is destroyed
    Cleared,
}

/// What a frame produced
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    pub outcome: StepOutcome,
    /// Score earned this frame
    pub points: u64,
    pub events: Vec<GameEvent>,
}

/// Advance the world by one frame
pub fn step_frame(world: &mut GameWorld, input: InputSnapshot) -> FrameReport {
    let mut report = FrameReport::default();
    world.frame += 1;

    world.particles.advance();

    // At most one brick per frame; the dy flip usually carries the ball out
    // of the cell before the next one.
    if let Some(index) = first_brick_hit(&world.bricks, world.ball.pos) {
        world.ball.vel.y = -world.ball.vel.y;
        let (intensity, frames) = SHAKE_BRICK;
        world.shake.trigger(intensity, frames);

        let brick = &mut world.bricks[index];
        let (column, row) = (brick.column, brick.row);
        let center = brick.rect.center();
        match brick.hit() {
            Some(BrickHit::Destroyed { points }) => {
                let color = brick.color;
                world
                    .particles
                    .burst(&mut world.rng, center, color, EXPLOSION_PARTICLES);
                report.points += points;
                report.events.push(GameEvent::BrickDestroyed { column, row });
                log::debug!("Brick ({column}, {row}) destroyed, +{points}");
            }
            Some(BrickHit::Chipped { points }) => {
                report.points += points;
                report.events.push(GameEvent::BrickChipped { column, row });
            }
            None => {}
        }
    }

    if world.is_exhausted() {
        report.events.push(GameEvent::StageCleared);
        report.outcome = StepOutcome::Cleared;
        return report;
    }

    let ball = &mut world.ball;
    ball.vel = bounce_off_side_walls(ball.pos, ball.vel, ball.radius, CANVAS_WIDTH);

    if hits_ceiling(ball.pos, ball.vel, ball.radius) {
        ball.vel.y = -ball.vel.y;
    } else if reaches_paddle_band(ball.pos, ball.vel, ball.radius, CANVAS_HEIGHT) {
        if over_paddle(ball.pos.x, world.paddle.x, world.paddle.width) {
            ball.vel = paddle_bounce(ball.pos.x, world.paddle.x, world.paddle.width, BALL_SPEED);
            let (intensity, frames) = SHAKE_PADDLE;
            world.shake.trigger(intensity, frames);
            report.events.push(GameEvent::PaddleHit);
        } else {
            let (intensity, frames) = SHAKE_MISS;
            world.shake.trigger(intensity, frames);
            report.events.push(GameEvent::BallLost);
            report.outcome = StepOutcome::BallLost;
            return report;
        }
    }

    world.paddle.steer(input.left, input.right);

    let ball = &mut world.ball;
    ball.pos += ball.vel;
    // Keep float drift from carrying the ball through a wall
    ball.pos.x = ball.pos.x.clamp(ball.radius, CANVAS_WIDTH - ball.radius);
    ball.pos.y = ball.pos.y.max(ball.radius);

    report
}

/// Demo/idle input: keep the paddle under the ball, with a slowly drifting
/// aim offset so rallies do not settle into a fixed loop
pub fn autopilot(world: &GameWorld) -> InputSnapshot {
    let time_factor = world.frame as f32 * 0.01;
    let offset = (time_factor.sin() * 0.3 + (time_factor * 0.7).sin() * 0.15) * world.paddle.width;
    let target = world.ball.pos.x + offset;
    let center = world.paddle.center_x();

    if (target - center).abs() < PADDLE_STEP {
        InputSnapshot::default()
    } else {
        InputSnapshot {
            left: target < center,
            right: target > center,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::stage::{StageLayout, StageTable, cell_rect};
    use crate::sim::state::{BrickStatus, TIER1_COLOR};
    use glam::Vec2;
    use proptest::prelude::*;

    fn single_cell_layout(row: usize, column: usize, health: u8) -> StageLayout {
        let mut rows = vec![vec![0u8; 9]; 6];
        rows[row][column] = health;
        StageLayout::new("single", rows)
    }

    fn builtin_world(seed: u64) -> GameWorld {
        let table = StageTable::builtin();
        GameWorld::new(table.get(1).unwrap(), seed)
    }

    #[test]
    fn test_single_brick_clear() {
        let mut world = GameWorld::new(&single_cell_layout(2, 4, 1), 1);
        world.ball.pos = cell_rect(4, 2).center();
        world.ball.vel = Vec2::new(0.0, -BALL_SPEED);

        let report = step_frame(&mut world, InputSnapshot::default());
        assert_eq!(report.outcome, StepOutcome::Cleared);
        assert_eq!(report.points, TIER1_POINTS);
        assert!(report.events.contains(&GameEvent::BrickDestroyed { column: 4, row: 2 }));
        assert!(report.events.contains(&GameEvent::StageCleared));
    }

    #[test]
    fn test_tier3_brick_scores_forty() {
        let mut layout = single_cell_layout(0, 0, 3);
        // A second brick far away keeps the stage from clearing
        layout.rows[5][8] = 1;
        let mut world = GameWorld::new(&layout, 2);
        world.ball.pos = cell_rect(0, 0).center();
        world.ball.vel = Vec2::new(0.0, -BALL_SPEED);

        let mut score = 0;
        for _ in 0..3 {
            let report = step_frame(&mut world, InputSnapshot::default());
            assert_eq!(report.outcome, StepOutcome::Continue);
            score += report.points;
        }
        assert_eq!(score, CHIP_BONUS + CHIP_BONUS + TIER3_POINTS);
        assert_eq!(world.bricks[0].status, BrickStatus::Destroyed);
        assert_eq!(world.particles.len(), EXPLOSION_PARTICLES);
        assert!(world.particles.iter().all(|p| p.color == TIER1_COLOR));
    }

    #[test]
    fn test_brick_hit_flips_dy_and_shakes() {
        let mut world = GameWorld::new(&single_cell_layout(0, 0, 2), 3);
        world.ball.pos = cell_rect(0, 0).center();
        world.ball.vel = Vec2::new(3.0, -4.0);

        let report = step_frame(&mut world, InputSnapshot::default());
        assert_eq!(report.points, CHIP_BONUS);
        assert_eq!(world.ball.vel, Vec2::new(3.0, 4.0));
        assert_eq!(world.shake.intensity, SHAKE_BRICK.0);
        assert_eq!(world.shake.frames_left, SHAKE_BRICK.1);
    }

    #[test]
    fn test_only_first_brick_resolved_per_frame() {
        let mut world = GameWorld::new(&single_cell_layout(0, 0, 1), 4);
        let mut twin = world.bricks[0].clone();
        twin.column = 1;
        world.bricks.push(twin);
        world.ball.pos = cell_rect(0, 0).center();
        world.ball.vel = Vec2::new(0.0, -BALL_SPEED);

        let report = step_frame(&mut world, InputSnapshot::default());
        assert_eq!(report.outcome, StepOutcome::Continue);
        assert_eq!(world.alive_bricks(), 1);
        assert!(world.bricks[1].is_alive());
    }

    #[test]
    fn test_paddle_centre_hit_goes_straight_up() {
        let mut world = builtin_world(5);
        world.ball.pos = Vec2::new(world.paddle.center_x(), 483.0);
        world.ball.vel = Vec2::new(1.0, 4.0).normalize() * BALL_SPEED;

        let report = step_frame(&mut world, InputSnapshot::default());
        assert!(report.events.contains(&GameEvent::PaddleHit));
        assert!(world.ball.vel.x.abs() < 1e-6);
        assert!((world.ball.vel.y + BALL_SPEED).abs() < 1e-6);
        assert_eq!(world.shake.frames_left, SHAKE_PADDLE.1);
    }

    #[test]
    fn test_miss_loses_ball() {
        let mut world = builtin_world(6);
        world.paddle.x = 0.0;
        world.ball.pos = Vec2::new(600.0, 484.0);
        world.ball.vel = Vec2::new(0.0, BALL_SPEED);

        let report = step_frame(&mut world, InputSnapshot::default());
        assert_eq!(report.outcome, StepOutcome::BallLost);
        assert_eq!(world.shake.intensity, SHAKE_MISS.0);
        assert_eq!(world.shake.frames_left, SHAKE_MISS.1);
    }

    #[test]
    fn test_ceiling_bounce() {
        let mut world = builtin_world(7);
        world.ball.pos = Vec2::new(780.0, 10.0);
        world.ball.vel = Vec2::new(3.0, -4.0);

        step_frame(&mut world, InputSnapshot::default());
        assert_eq!(world.ball.vel, Vec2::new(3.0, 4.0));
    }

    #[test]
    fn test_side_wall_bounce() {
        let mut world = builtin_world(7);
        world.ball.pos = Vec2::new(790.0, 300.0);
        world.ball.vel = Vec2::new(4.0, -3.0);

        step_frame(&mut world, InputSnapshot::default());
        assert_eq!(world.ball.vel, Vec2::new(-4.0, -3.0));
        assert_eq!(world.ball.pos, Vec2::new(786.0, 297.0));

        world.ball.pos = Vec2::new(10.0, 300.0);
        world.ball.vel = Vec2::new(-4.0, 3.0);
        step_frame(&mut world, InputSnapshot::default());
        assert_eq!(world.ball.vel, Vec2::new(4.0, 3.0));
        assert!(world.ball.pos.x >= BALL_RADIUS && world.ball.pos.x <= CANVAS_WIDTH - BALL_RADIUS);
    }

    #[test]
    fn test_ball_clamped_inside_walls() {
        let mut world = builtin_world(7);
        let r = world.ball.radius;

        // Already past the right wall: the bounce alone would leave it outside
        world.ball.pos = Vec2::new(795.0, 300.0);
        world.ball.vel = Vec2::new(-2.0, 3.0);
        step_frame(&mut world, InputSnapshot::default());
        assert_eq!(world.ball.vel.x, 2.0);
        assert_eq!(world.ball.pos.x, CANVAS_WIDTH - r);

        world.ball.pos = Vec2::new(5.0, 300.0);
        world.ball.vel = Vec2::new(2.0, 3.0);
        step_frame(&mut world, InputSnapshot::default());
        assert_eq!(world.ball.vel.x, -2.0);
        assert_eq!(world.ball.pos.x, r);

        // Above the ceiling line
        world.ball.pos = Vec2::new(400.0, 5.0);
        world.ball.vel = Vec2::new(3.0, 2.0);
        step_frame(&mut world, InputSnapshot::default());
        assert_eq!(world.ball.vel.y, -2.0);
        assert_eq!(world.ball.pos, Vec2::new(403.0, r));
    }

    #[test]
    fn test_input_moves_paddle() {
        let mut world = builtin_world(8);
        let start = world.paddle.x;
        step_frame(
            &mut world,
            InputSnapshot {
                left: true,
                right: false,
            },
        );
        assert_eq!(world.paddle.x, start - PADDLE_STEP);
    }

    #[test]
    fn test_determinism() {
        let mut a = builtin_world(99999);
        let mut b = builtin_world(99999);
        for i in 0..500 {
            let input = InputSnapshot {
                left: i % 7 < 3,
                right: i % 11 < 4,
            };
            let ra = step_frame(&mut a, input);
            let rb = step_frame(&mut b, input);
            assert_eq!(ra, rb);
            if ra.outcome != StepOutcome::Continue {
                break;
            }
        }
        assert_eq!(a.ball, b.ball);
        assert_eq!(a.paddle, b.paddle);
        assert_eq!(a.bricks, b.bricks);
    }

    #[test]
    fn test_autopilot_steers_toward_ball() {
        let mut world = builtin_world(10);
        world.frame = 0;
        world.ball.pos.x = 100.0;
        let input = autopilot(&world);
        assert!(input.left && !input.right);

        world.ball.pos.x = 700.0;
        let input = autopilot(&world);
        assert!(input.right && !input.left);
    }

    proptest! {
        #[test]
        fn prop_speed_is_constant(
            seed in any::<u64>(),
            inputs in prop::collection::vec((any::<bool>(), any::<bool>()), 1..400),
        ) {
            let mut world = builtin_world(seed);
            for (left, right) in inputs {
                let report = step_frame(&mut world, InputSnapshot { left, right });
                if report.outcome != StepOutcome::Continue {
                    break;
                }
                prop_assert!((world.ball.vel.length_squared() - BALL_SPEED * BALL_SPEED).abs() < 1e-3);
            }
        }

        #[test]
        fn prop_paddle_stays_on_canvas(
            seed in any::<u64>(),
            inputs in prop::collection::vec((any::<bool>(), any::<bool>()), 1..400),
        ) {
            let mut world = builtin_world(seed);
            for (left, right) in inputs {
                let report = step_frame(&mut world, InputSnapshot { left, right });
                prop_assert!(world.paddle.x >= 0.0);
                prop_assert!(world.paddle.x <= CANVAS_WIDTH - world.paddle.width);
                if report.outcome != StepOutcome::Continue {
                    break;
                }
            }
        }

        #[test]
        fn prop_bricks_only_lose_health(seed in any::<u64>()) {
            let mut world = builtin_world(seed);
            let mut previous = world.bricks.clone();
            for _ in 0..1500 {
                let input = autopilot(&world);
                let report = step_frame(&mut world, input);
                for (before, after) in previous.iter().zip(&world.bricks) {
                    prop_assert!(after.health <= before.health);
                    if !before.is_alive() {
                        prop_assert!(!after.is_alive());
                    }
                    prop_assert_eq!(after.is_alive(), after.health > 0);
                }
                previous = world.bricks.clone();
                if report.outcome != StepOutcome::Continue {
                    break;
                }
            }
        }
    }
}
