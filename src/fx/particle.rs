//! Particle primitive and the explosion particle set

use glam::Vec2;
use rand::Rng;

use crate::consts::*;

/// A single particle: position, velocity and a fading alpha
#[derive(Debug, Clone, PartialEq)]
pub struct Particle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// 0-1, drawn opacity
    pub alpha: f32,
    /// 0xRRGGBB
    pub color: u32,
    /// Drawn radius
    pub size: f32,
}

/// Alpha values within this distance of zero count as faded out.
/// Repeated f32 subtraction of the fade step drifts by a few ulps.
const FADE_EPSILON: f32 = 1e-4;

impl Particle {
    pub fn new(pos: Vec2, vel: Vec2, alpha: f32, color: u32, size: f32) -> Self {
        Self {
            pos,
            vel,
            alpha,
            color,
            size,
        }
    }

    /// Move by one frame of velocity
    #[inline]
    pub fn drift(&mut self) {
        self.pos += self.vel;
    }

    /// Lose `step` alpha
    #[inline]
    pub fn fade(&mut self, step: f32) {
        self.alpha -= step;
    }

    #[inline]
    pub fn is_visible(&self) -> bool {
        self.alpha > FADE_EPSILON
    }
}

/// Active explosion particles
#[derive(Debug, Clone, Default)]
pub struct Particles {
    items: Vec<Particle>,
}

impl Particles {
    pub fn new() -> Self {
        Self { items: Vec::new() }
    }

    /// Spawn a burst of `count` particles at `center` with random velocity
    /// in `[-spread, spread]` on each axis. Oldest particles are dropped when
    /// the set would exceed `MAX_PARTICLES`.
    pub fn burst<R: Rng>(&mut self, rng: &mut R, center: Vec2, color: u32, count: usize) {
        for _ in 0..count {
            let vel = Vec2::new(
                rng.random_range(-EXPLOSION_SPREAD..=EXPLOSION_SPREAD),
                rng.random_range(-EXPLOSION_SPREAD..=EXPLOSION_SPREAD),
            );
            self.items
                .push(Particle::new(center, vel, 1.0, color, PARTICLE_SIZE));
        }
        if self.items.len() > MAX_PARTICLES {
            let excess = self.items.len() - MAX_PARTICLES;
            self.items.drain(..excess);
        }
    }

    pub fn push(&mut self, particle: Particle) {
        self.items.push(particle);
    }

    /// Advance one frame: drift, fade, and drop the ones that faded out
    pub fn advance(&mut self) {
        for p in &mut self.items {
            p.drift();
            p.fade(PARTICLE_FADE);
        }
        self.items.retain(Particle::is_visible);
    }

    pub fn iter(&self) -> impl Iterator<Item = &Particle> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}
