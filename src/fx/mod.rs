//! Visual effects shared by the game and the backdrop
//!
//! Nothing here affects gameplay outcomes; it only decides what gets drawn.

pub mod field;
pub mod particle;
pub mod shake;

pub use field::{FieldLink, ParticleField};
pub use particle::{Particle, Particles};
pub use shake::ScreenShake;
