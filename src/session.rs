//! A mounted game session
//!
//! Owns the game, the single frame loop, held-key state, the backdrop field
//! and the visual settings. Every frame callback goes through
//! [`Session::frame`]: draw, step, and reschedule while still playing.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::consts::{CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::fx::ParticleField;
use crate::platform::{FrameHandle, FrameLoop, FrameScheduler, KeyTracker};
use crate::renderer::{Canvas, draw_frame, draw_idle};
use crate::settings::Settings;
use crate::sim::{Action, FrameReport, Game, GameError, autopilot};

pub struct Session<S: FrameScheduler> {
    game: Game,
    frames: FrameLoop<S>,
    keys: KeyTracker,
    backdrop: Option<ParticleField>,
    settings: Settings,
    autopilot: bool,
    /// Page scroll position in `[0, 1]`, drives backdrop parallax
    scroll_progress: f32,
    seed: u64,
}

impl<S: FrameScheduler> Session<S> {
    pub fn new(game: Game, scheduler: S, settings: Settings, seed: u64) -> Self {
        let backdrop = build_backdrop(&settings, seed);
        Self {
            game,
            frames: FrameLoop::new(scheduler),
            keys: KeyTracker::new(),
            backdrop,
            settings,
            autopilot: false,
            scroll_progress: 0.5,
            seed,
        }
    }

    pub fn game(&self) -> &Game {
        &self.game
    }

    pub fn game_mut(&mut self) -> &mut Game {
        &mut self.game
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replace the settings, rebuilding the backdrop if its size changed
    pub fn set_settings(&mut self, settings: Settings) {
        let motes = self.backdrop.as_ref().map_or(0, |f| f.motes().len());
        if settings.field_particles() != motes {
            self.backdrop = build_backdrop(&settings, self.seed);
        }
        self.settings = settings;
    }

    /// Apply a settings hotkey and persist the result. Returns false if the
    /// key is not a settings key.
    pub fn settings_hotkey(&mut self, key: &str) -> bool {
        let Some(settings) = self.settings.with_hotkey(key) else {
            return false;
        };
        log::info!(
            "Settings: quality {}, shake {}, particles {}, backdrop {}, reduced motion {}",
            settings.quality.as_str(),
            settings.screen_shake,
            settings.particles,
            settings.backdrop,
            settings.reduced_motion
        );
        settings.save();
        self.set_settings(settings);
        true
    }

    pub fn backdrop(&self) -> Option<&ParticleField> {
        self.backdrop.as_ref()
    }

    pub fn frames(&self) -> &FrameLoop<S> {
        &self.frames
    }

    pub fn frames_mut(&mut self) -> &mut FrameLoop<S> {
        &mut self.frames
    }

    /// Apply a player action and (re)start the loop. Any frame already
    /// pending is invalidated first, so repeated actions never leave two
    /// loops running.
    pub fn apply(&mut self, action: Action) -> Result<(), GameError> {
        self.game.apply(action)?;
        if self.game.is_playing() {
            self.frames.schedule();
        }
        Ok(())
    }

    pub fn key_down(&mut self, name: &str) -> bool {
        self.keys.key_down(name)
    }

    pub fn key_up(&mut self, name: &str) -> bool {
        self.keys.key_up(name)
    }

    pub fn keys(&self) -> &KeyTracker {
        &self.keys
    }

    pub fn autopilot(&self) -> bool {
        self.autopilot
    }

    pub fn set_autopilot(&mut self, enabled: bool) {
        self.autopilot = enabled;
    }

    /// Flip autopilot, returning the new state
    pub fn toggle_autopilot(&mut self) -> bool {
        self.autopilot = !self.autopilot;
        log::info!("Autopilot: {}", self.autopilot);
        self.autopilot
    }

    pub fn set_scroll_progress(&mut self, progress: f32) {
        self.scroll_progress = progress.clamp(0.0, 1.0);
    }

    /// Handle a fired frame. Returns the step report when the game advanced.
    ///
    /// Stale handles are ignored. Outside `Playing` an idle frame is drawn
    /// and the loop is not rescheduled.
    pub fn frame<C: Canvas>(&mut self, handle: FrameHandle, canvas: &mut C) -> Option<FrameReport> {
        if !self.frames.accept(handle) {
            log::debug!("Ignoring stale frame {:?}", handle);
            return None;
        }

        if self.settings.animate_backdrop() {
            if let Some(field) = self.backdrop.as_mut() {
                field.update(self.scroll_progress);
            }
        }

        if !self.game.is_playing() {
            draw_idle(canvas, self.backdrop.as_ref());
            return None;
        }

        let world = self.game.world_mut()?;
        let input = if self.autopilot {
            autopilot(world)
        } else {
            self.keys.snapshot()
        };
        draw_frame(canvas, world, self.backdrop.as_ref(), &self.settings);

        let report = self.game.step(input);
        if self.game.is_playing() {
            self.frames.schedule();
        }
        report
    }

    /// Draw the still frame shown under an overlay
    pub fn draw_idle<C: Canvas>(&self, canvas: &mut C) {
        draw_idle(canvas, self.backdrop.as_ref());
    }

    /// Restart the loop after [`Session::teardown`] if a stage was running.
    /// Returns true if a frame was scheduled.
    pub fn resume(&mut self) -> bool {
        if !self.game.is_playing() {
            return false;
        }
        self.frames.schedule();
        log::info!("Session resumed");
        true
    }

    /// Stop the loop and release held keys
    pub fn teardown(&mut self) {
        self.frames.cancel();
        self.keys.reset();
        log::info!("Session torn down");
    }
}

fn build_backdrop(settings: &Settings, seed: u64) -> Option<ParticleField> {
    let count = settings.field_particles();
    if count == 0 {
        return None;
    }
    let mut rng = Pcg32::seed_from_u64(seed);
    Some(ParticleField::new(&mut rng, CANVAS_WIDTH, CANVAS_HEIGHT, count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::ManualScheduler;
    use crate::renderer::ShapeBatch;
    use crate::renderer::scene::tests::{DrawCall, RecordingCanvas};
    use crate::renderer::vertex::colors;
    use crate::consts::PARTICLE_SIZE;
    use crate::settings::QualityPreset;
    use crate::sim::{GamePhase, StageTable, StepOutcome};
    use glam::Vec2;

    fn session() -> Session<ManualScheduler> {
        Session::new(
            Game::new(StageTable::builtin(), 11),
            ManualScheduler::new(),
            Settings::default(),
            11,
        )
    }

    fn force_miss(session: &mut Session<ManualScheduler>) {
        let world = session.game_mut().world_mut().unwrap();
        world.paddle.x = 0.0;
        world.ball.pos = Vec2::new(700.0, 484.0);
        world.ball.vel = Vec2::new(0.0, 5.0);
    }

    #[test]
    fn test_start_schedules_one_frame() {
        let mut s = session();
        assert!(!s.frames().is_active());
        s.apply(Action::Start).unwrap();
        assert!(s.frames().is_active());
        assert_eq!(s.frames().scheduler().outstanding(), 1);
    }

    #[test]
    fn test_loop_singularity_under_action_spam() {
        let mut s = session();
        let mut canvas = ShapeBatch::new();
        s.apply(Action::Start).unwrap();

        for round in 0..20 {
            // Retry spam while playing is rejected and must not add a loop
            assert!(s.apply(Action::Retry).is_err());
            assert!(s.apply(Action::Start).is_err());
            assert!(s.frames().scheduler().outstanding() <= 1);

            let handle = s.frames_mut().scheduler_mut().fire().unwrap();
            s.frame(handle, &mut canvas);
            assert!(s.frames().scheduler().outstanding() <= 1);

            if round % 5 == 4 {
                force_miss(&mut s);
                let handle = s.frames_mut().scheduler_mut().fire().unwrap();
                let report = s.frame(handle, &mut canvas).unwrap();
                assert_eq!(report.outcome, StepOutcome::BallLost);
                assert_eq!(s.frames().scheduler().outstanding(), 0);

                s.apply(Action::Retry).unwrap();
                assert_eq!(s.frames().scheduler().outstanding(), 1);
            }
        }
    }

    #[test]
    fn test_loop_stops_when_game_ends() {
        let mut s = session();
        let mut canvas = ShapeBatch::new();
        s.apply(Action::Start).unwrap();
        force_miss(&mut s);

        let handle = s.frames_mut().scheduler_mut().fire().unwrap();
        s.frame(handle, &mut canvas);
        assert_eq!(s.game().phase(), GamePhase::GameOver);
        assert!(!s.frames().is_active());
        assert_eq!(s.frames_mut().scheduler_mut().fire(), None);
    }

    #[test]
    fn test_stale_handle_ignored() {
        let mut s = session();
        s.apply(Action::Start).unwrap();
        let stale = s.frames().pending().unwrap();
        s.frames_mut().schedule();

        let mut canvas = RecordingCanvas::default();
        assert!(s.frame(stale, &mut canvas).is_none());
        assert!(canvas.calls.is_empty());
        assert_eq!(s.game().world().unwrap().frame, 0);
    }

    #[test]
    fn test_frame_draws_then_steps() {
        let mut s = session();
        s.apply(Action::Start).unwrap();
        let before = s.game().world().unwrap().ball.pos;

        let mut canvas = RecordingCanvas::default();
        let handle = s.frames_mut().scheduler_mut().fire().unwrap();
        s.frame(handle, &mut canvas).unwrap();

        assert_eq!(canvas.calls[0], DrawCall::Clear(colors::TRAIL_FADE));
        // The ball is drawn where it was before the step moved it
        assert!(canvas.calls.contains(&DrawCall::Circle(before, 8.0, colors::BALL)));
        assert_ne!(s.game().world().unwrap().ball.pos, before);
    }

    #[test]
    fn test_held_keys_move_paddle() {
        let mut s = session();
        let mut canvas = ShapeBatch::new();
        s.apply(Action::Start).unwrap();
        assert!(s.key_down("ArrowLeft"));

        for _ in 0..3 {
            let handle = s.frames_mut().scheduler_mut().fire().unwrap();
            s.frame(handle, &mut canvas);
        }
        assert_eq!(s.game().world().unwrap().paddle.x, 340.0 - 21.0);

        s.key_up("ArrowLeft");
        let handle = s.frames_mut().scheduler_mut().fire().unwrap();
        s.frame(handle, &mut canvas);
        assert_eq!(s.game().world().unwrap().paddle.x, 319.0);
    }

    #[test]
    fn test_idle_frame_does_not_reschedule() {
        let mut s = session();
        let handle = s.frames_mut().schedule();
        let mut canvas = RecordingCanvas::default();
        assert!(s.frame(handle, &mut canvas).is_none());
        assert_eq!(canvas.calls[1], DrawCall::Clear(colors::BACKGROUND));
        // The idle frame is drawn once; the caller only presents it
        let clears = canvas.calls.iter().filter(|c| matches!(c, DrawCall::Clear(_))).count();
        assert_eq!(clears, 1);
        assert!(!s.frames().is_active());
    }

    #[test]
    fn test_teardown_cancels_loop_and_keys() {
        let mut s = session();
        s.apply(Action::Start).unwrap();
        s.key_down("Right");
        s.teardown();
        assert!(!s.frames().is_active());
        assert_eq!(s.frames().scheduler().outstanding(), 0);
        assert!(!s.keys().snapshot().right);
    }

    #[test]
    fn test_resume_after_teardown() {
        let mut s = session();
        assert!(!s.resume());
        assert!(!s.frames().is_active());

        s.apply(Action::Start).unwrap();
        s.teardown();
        assert!(s.resume());
        assert_eq!(s.frames().scheduler().outstanding(), 1);

        // Resuming twice still leaves a single loop
        assert!(s.resume());
        assert_eq!(s.frames().scheduler().outstanding(), 1);
        let handle = s.frames_mut().scheduler_mut().fire().unwrap();
        assert!(s.frame(handle, &mut ShapeBatch::new()).is_some());
    }

    #[test]
    fn test_settings_rebuild_backdrop() {
        let mut s = session();
        assert!(s.backdrop().is_some());
        s.set_settings(Settings {
            backdrop: false,
            ..Settings::default()
        });
        assert!(s.backdrop().is_none());
    }

    #[test]
    fn test_settings_hotkeys_change_draw_pass() {
        let mut s = session();
        assert!(!s.settings_hotkey("ArrowRight"));

        // Low quality drops the backdrop entirely
        assert!(s.settings_hotkey("q"));
        assert_eq!(s.settings().quality, QualityPreset::Low);
        assert!(s.backdrop().is_none());

        // Particles off: a fresh burst is simulated but not drawn
        assert!(s.settings_hotkey("p"));
        s.apply(Action::Start).unwrap();
        let world = s.game_mut().world_mut().unwrap();
        let mut rng = Pcg32::seed_from_u64(1);
        world.particles.burst(&mut rng, Vec2::new(400.0, 250.0), 0xffffff, 15);

        let mut canvas = RecordingCanvas::default();
        let handle = s.frames_mut().scheduler_mut().fire().unwrap();
        s.frame(handle, &mut canvas).unwrap();
        assert!(!canvas
            .calls
            .iter()
            .any(|call| matches!(call, DrawCall::Circle(_, r, _) if *r == PARTICLE_SIZE)));
    }

    #[test]
    fn test_autopilot_keeps_single_loop() {
        let mut s = session();
        s.set_autopilot(true);
        let mut canvas = ShapeBatch::new();
        s.apply(Action::Start).unwrap();

        let mut last_score = 0;
        for _ in 0..3000 {
            let Some(handle) = s.frames_mut().scheduler_mut().fire() else {
                break;
            };
            s.frame(handle, &mut canvas);
            assert!(s.frames().scheduler().outstanding() <= 1);
            assert!(s.game().score() >= last_score);
            last_score = s.game().score();
        }
        assert!(last_score > 0);
    }
}
