//! Screen shake timer
//!
//! A transient translation applied to the whole draw pass for a fixed number
//! of frames after an impact. Rendering only.

use glam::Vec2;
use rand::Rng;

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScreenShake {
    /// Maximum offset span in pixels (offsets fall in `[-intensity/2, intensity/2]`)
    pub intensity: f32,
    /// Frames of shake remaining
    pub frames_left: u32,
}

impl ScreenShake {
    /// Start a shake, replacing any shake in progress
    pub fn trigger(&mut self, intensity: f32, frames: u32) {
        self.intensity = intensity;
        self.frames_left = frames;
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        self.frames_left > 0
    }

    /// Offset for this frame, consuming one frame of shake.
    /// Returns `None` when no shake is running.
    pub fn next_offset<R: Rng>(&mut self, rng: &mut R) -> Option<Vec2> {
        if self.frames_left == 0 {
            return None;
        }
        self.frames_left -= 1;
        let dx = (rng.random::<f32>() - 0.5) * self.intensity;
        let dy = (rng.random::<f32>() - 0.5) * self.intensity;
        Some(Vec2::new(dx, dy))
    }
}
