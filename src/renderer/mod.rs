//! Rendering module
//!
//! The scene is described through the [`Canvas`] trait in canvas pixel
//! coordinates (800x500, y down). [`ShapeBatch`] turns those calls into
//! triangles that the WebGPU pipeline uploads and draws.

use glam::Vec2;

use crate::sim::Rect;

pub mod pipeline;
pub mod scene;
pub mod shapes;
pub mod vertex;

pub use pipeline::RenderState;
pub use scene::{draw_backdrop, draw_frame, draw_idle};
pub use shapes::ShapeBatch;
pub use vertex::Vertex;

/// A 2D drawing surface
pub trait Canvas {
    /// Paint the whole surface. A translucent color washes over what is there.
    fn clear(&mut self, color: [f32; 4]);
    /// Translation applied to every following draw call
    fn set_offset(&mut self, offset: Vec2);
    fn fill_rect(&mut self, rect: Rect, color: [f32; 4]);
    fn fill_circle(&mut self, center: Vec2, radius: f32, color: [f32; 4]);
    fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: [f32; 4]);
}
