//! Ambient backdrop particle field
//!
//! Slow drifting motes with faint link lines between close neighbours.
//! Motes bounce off the side edges and wrap vertically; a scroll progress
//! value in `[0, 1]` adds a small vertical parallax drift.

use glam::Vec2;
use rand::Rng;

use super::particle::Particle;
use crate::consts::{FIELD_LINK_ALPHA, FIELD_LINK_DISTANCE, FIELD_PARALLAX};

/// Mote colour
pub const FIELD_COLOR: u32 = 0x00f5ff;

/// A link line between two motes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FieldLink {
    pub from: Vec2,
    pub to: Vec2,
    pub alpha: f32,
}

#[derive(Debug, Clone)]
pub struct ParticleField {
    pub width: f32,
    pub height: f32,
    motes: Vec<Particle>,
}

impl ParticleField {
    pub fn new<R: Rng>(rng: &mut R, width: f32, height: f32, count: usize) -> Self {
        let motes = (0..count)
            .map(|_| {
                let pos = Vec2::new(rng.random::<f32>() * width, rng.random::<f32>() * height);
                let vel = Vec2::new(
                    (rng.random::<f32>() - 0.5) * 0.5,
                    (rng.random::<f32>() - 0.5) * 0.5,
                );
                let size = rng.random::<f32>() * 2.0 + 1.0;
                let opacity = rng.random::<f32>() * 0.5 + 0.2;
                Particle::new(pos, vel, opacity, FIELD_COLOR, size)
            })
            .collect();

        Self {
            width,
            height,
            motes,
        }
    }

    /// Advance one frame
    pub fn update(&mut self, scroll_progress: f32) {
        let parallax = (scroll_progress - 0.5) * FIELD_PARALLAX;
        for mote in &mut self.motes {
            mote.pos.x += mote.vel.x;
            mote.pos.y += mote.vel.y + parallax;

            if mote.pos.x < 0.0 || mote.pos.x > self.width {
                mote.vel.x = -mote.vel.x;
            }
            if mote.pos.y > self.height {
                mote.pos.y = 0.0;
            } else if mote.pos.y < 0.0 {
                mote.pos.y = self.height;
            }
        }
    }

    pub fn motes(&self) -> &[Particle] {
        &self.motes
    }

    /// Link lines for every pair closer than `FIELD_LINK_DISTANCE`,
    /// fading linearly with distance.
    pub fn links(&self) -> Vec<FieldLink> {
        let mut links = Vec::new();
        for (i, a) in self.motes.iter().enumerate() {
            for b in &self.motes[i + 1..] {
                let distance = a.pos.distance(b.pos);
                if distance < FIELD_LINK_DISTANCE {
                    links.push(FieldLink {
                        from: a.pos,
                        to: b.pos,
                        alpha: (FIELD_LINK_DISTANCE - distance) / FIELD_LINK_DISTANCE
                            * FIELD_LINK_ALPHA,
                    });
                }
            }
        }
        links
    }
}
