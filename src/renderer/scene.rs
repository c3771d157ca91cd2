//! Per-frame draw pass
//!
//! Draw order while playing: wash the previous frame, backdrop, then (shaken)
//! bricks, particles, ball and paddle.

use glam::Vec2;

use super::Canvas;
use super::vertex::colors;
use crate::fx::ParticleField;
use crate::rgba;
use crate::settings::Settings;
use crate::sim::{GameWorld, Rect};

/// Glow margin around bricks and the paddle
const GLOW: f32 = 3.0;

/// Draw one playing frame. Consumes one frame of any running screen shake.
pub fn draw_frame<C: Canvas>(
    canvas: &mut C,
    world: &mut GameWorld,
    backdrop: Option<&ParticleField>,
    settings: &Settings,
) {
    canvas.clear(colors::TRAIL_FADE);
    if let Some(field) = backdrop {
        draw_backdrop(canvas, field);
    }

    // The timer runs down whether or not the offset is shown
    let offset = world.shake.next_offset(&mut world.rng);
    if let Some(offset) = offset.filter(|_| settings.effective_screen_shake()) {
        canvas.set_offset(offset);
    }

    for brick in world.bricks.iter().filter(|b| b.is_alive()) {
        canvas.fill_rect(grow(brick.rect, GLOW), rgba(brick.color, colors::BRICK_GLOW_ALPHA));
        canvas.fill_rect(brick.rect, rgba(brick.color, 1.0));
    }

    for particle in world.particles.iter().take(settings.max_particles()) {
        canvas.fill_circle(
            particle.pos,
            particle.size,
            rgba(particle.color, particle.alpha.clamp(0.0, 1.0)),
        );
    }

    let ball = &world.ball;
    canvas.fill_circle(ball.pos, ball.radius * 1.75, colors::BALL_GLOW);
    canvas.fill_circle(ball.pos, ball.radius, colors::BALL);

    let paddle = world.paddle.rect();
    canvas.fill_rect(grow(paddle, GLOW), colors::PADDLE_GLOW);
    canvas.fill_rect(paddle, colors::PADDLE);

    canvas.set_offset(Vec2::ZERO);
}

/// Frame shown while no stage is running: opaque black under the overlay
pub fn draw_idle<C: Canvas>(canvas: &mut C, backdrop: Option<&ParticleField>) {
    canvas.set_offset(Vec2::ZERO);
    canvas.clear(colors::BACKGROUND);
    if let Some(field) = backdrop {
        draw_backdrop(canvas, field);
    }
}

/// Link lines first, motes on top
pub fn draw_backdrop<C: Canvas>(canvas: &mut C, field: &ParticleField) {
    for link in field.links() {
        canvas.line(link.from, link.to, 1.0, rgba(crate::fx::field::FIELD_COLOR, link.alpha));
    }
    for mote in field.motes() {
        canvas.fill_circle(mote.pos, mote.size, rgba(mote.color, mote.alpha));
    }
}

fn grow(rect: Rect, by: f32) -> Rect {
    Rect::new(rect.min - Vec2::splat(by), rect.size + Vec2::splat(by * 2.0))
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::fx::Particle;
    use crate::sim::StageLayout;

    /// Canvas that records what was drawn, in order
    #[derive(Debug, Clone, PartialEq)]
    pub enum DrawCall {
        Clear([f32; 4]),
        Offset(Vec2),
        Rect(Rect, [f32; 4]),
        Circle(Vec2, f32, [f32; 4]),
        Line(Vec2, Vec2),
    }

    #[derive(Debug, Default)]
    pub struct RecordingCanvas {
        pub calls: Vec<DrawCall>,
    }

    impl Canvas for RecordingCanvas {
        fn clear(&mut self, color: [f32; 4]) {
            self.calls.push(DrawCall::Clear(color));
        }
        fn set_offset(&mut self, offset: Vec2) {
            self.calls.push(DrawCall::Offset(offset));
        }
        fn fill_rect(&mut self, rect: Rect, color: [f32; 4]) {
            self.calls.push(DrawCall::Rect(rect, color));
        }
        fn fill_circle(&mut self, center: Vec2, radius: f32, color: [f32; 4]) {
            self.calls.push(DrawCall::Circle(center, radius, color));
        }
        fn line(&mut self, from: Vec2, to: Vec2, _width: f32, _color: [f32; 4]) {
            self.calls.push(DrawCall::Line(from, to));
        }
    }

    fn world() -> GameWorld {
        GameWorld::new(&StageLayout::new("t", vec![vec![1, 0, 2]]), 7)
    }

    #[test]
    fn test_draw_order() {
        let mut world = world();
        world
            .particles
            .push(Particle::new(Vec2::new(5.0, 5.0), Vec2::ZERO, 0.5, 0xff0000, 2.0));
        let mut canvas = RecordingCanvas::default();
        draw_frame(&mut canvas, &mut world, None, &Settings::default());

        let calls = &canvas.calls;
        assert_eq!(calls[0], DrawCall::Clear(colors::TRAIL_FADE));
        // Two bricks with glow, then the particle
        assert!(matches!(calls[1], DrawCall::Rect(..)));
        assert!(matches!(calls[4], DrawCall::Rect(r, _) if r == world.bricks[1].rect));
        assert!(matches!(calls[5], DrawCall::Circle(p, _, _) if p == Vec2::new(5.0, 5.0)));
        // Ball, then paddle last
        assert_eq!(calls[7], DrawCall::Circle(world.ball.pos, world.ball.radius, colors::BALL));
        assert_eq!(calls[9], DrawCall::Rect(world.paddle.rect(), colors::PADDLE));
        assert_eq!(calls[10], DrawCall::Offset(Vec2::ZERO));
        assert_eq!(calls.len(), 11);
    }

    #[test]
    fn test_shake_offset_applied_and_consumed() {
        let mut world = world();
        world.shake.trigger(20.0, 2);
        let mut canvas = RecordingCanvas::default();
        draw_frame(&mut canvas, &mut world, None, &Settings::default());

        let DrawCall::Offset(offset) = canvas.calls[1] else {
            panic!("expected a shake offset, got {:?}", canvas.calls[1]);
        };
        assert!(offset.x.abs() <= 10.0 && offset.y.abs() <= 10.0);
        assert_eq!(world.shake.frames_left, 1);
    }

    #[test]
    fn test_shake_disabled_still_counts_down() {
        let mut world = world();
        world.shake.trigger(20.0, 2);
        let settings = Settings {
            reduced_motion: true,
            ..Settings::default()
        };
        let mut canvas = RecordingCanvas::default();
        draw_frame(&mut canvas, &mut world, None, &settings);

        let offsets = canvas
            .calls
            .iter()
            .filter(|c| matches!(c, DrawCall::Offset(_)))
            .count();
        assert_eq!(offsets, 1);
        assert_eq!(world.shake.frames_left, 1);
    }

    #[test]
    fn test_particles_respect_settings() {
        let mut world = world();
        for _ in 0..3 {
            world
                .particles
                .push(Particle::new(Vec2::ZERO, Vec2::ZERO, 1.0, 0xffffff, 2.0));
        }
        let settings = Settings {
            particles: false,
            ..Settings::default()
        };
        let mut canvas = RecordingCanvas::default();
        draw_frame(&mut canvas, &mut world, None, &settings);
        let particle_draws = canvas
            .calls
            .iter()
            .filter(|c| matches!(c, DrawCall::Circle(p, _, _) if *p == Vec2::ZERO))
            .count();
        assert_eq!(particle_draws, 0);
    }

    #[test]
    fn test_idle_is_opaque() {
        let mut canvas = RecordingCanvas::default();
        draw_idle(&mut canvas, None);
        assert_eq!(
            canvas.calls,
            vec![
                DrawCall::Offset(Vec2::ZERO),
                DrawCall::Clear(colors::BACKGROUND)
            ]
        );
    }
}
