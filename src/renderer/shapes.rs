//! Shape generation for 2D primitives

use glam::Vec2;
use std::f32::consts::PI;

use super::Canvas;
use super::vertex::{Vertex, colors};
use crate::consts::{CANVAS_HEIGHT, CANVAS_WIDTH};
use crate::sim::Rect;

/// Generate vertices for a filled circle
pub fn circle(center: Vec2, radius: f32, color: [f32; 4], segments: u32) -> Vec<Vertex> {
    let mut vertices = Vec::with_capacity((segments * 3) as usize);

    for i in 0..segments {
        let theta1 = (i as f32 / segments as f32) * 2.0 * PI;
        let theta2 = ((i + 1) as f32 / segments as f32) * 2.0 * PI;

        // Triangle from center to edge
        vertices.push(Vertex::new(center.x, center.y, color));
        vertices.push(Vertex::new(
            center.x + radius * theta1.cos(),
            center.y + radius * theta1.sin(),
            color,
        ));
        vertices.push(Vertex::new(
            center.x + radius * theta2.cos(),
            center.y + radius * theta2.sin(),
            color,
        ));
    }

    vertices
}

/// Generate vertices for an axis-aligned filled rectangle
pub fn rect(min: Vec2, size: Vec2, color: [f32; 4]) -> Vec<Vertex> {
    let max = min + size;
    vec![
        Vertex::new(min.x, min.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(min.x, max.y, color),
        Vertex::new(min.x, max.y, color),
        Vertex::new(max.x, min.y, color),
        Vertex::new(max.x, max.y, color),
    ]
}

/// Generate vertices for a straight line of the given width
pub fn line(from: Vec2, to: Vec2, width: f32, color: [f32; 4]) -> Vec<Vertex> {
    let dir = (to - from).normalize_or_zero();
    if dir == Vec2::ZERO {
        return Vec::new();
    }
    // Perpendicular for width
    let perp = Vec2::new(-dir.y, dir.x) * (width / 2.0);

    let a1 = from + perp;
    let b1 = from - perp;
    let a2 = to + perp;
    let b2 = to - perp;

    vec![
        Vertex::new(a1.x, a1.y, color),
        Vertex::new(b1.x, b1.y, color),
        Vertex::new(a2.x, a2.y, color),
        Vertex::new(a2.x, a2.y, color),
        Vertex::new(b1.x, b1.y, color),
        Vertex::new(b2.x, b2.y, color),
    ]
}

/// Segment count that keeps small circles cheap and large ones round
#[inline]
fn circle_segments(radius: f32) -> u32 {
    ((radius * 2.0) as u32).clamp(8, 32)
}

/// A [`Canvas`] that collects triangles for one frame
#[derive(Debug, Clone)]
pub struct ShapeBatch {
    vertices: Vec<Vertex>,
    offset: Vec2,
    clear_color: [f32; 4],
}

impl Default for ShapeBatch {
    fn default() -> Self {
        Self {
            vertices: Vec::new(),
            offset: Vec2::ZERO,
            clear_color: colors::BACKGROUND,
        }
    }
}

impl ShapeBatch {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new frame
    pub fn reset(&mut self) {
        self.vertices.clear();
        self.offset = Vec2::ZERO;
        self.clear_color = colors::BACKGROUND;
    }

    pub fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }

    /// Color the render pass starts from
    pub fn clear_color(&self) -> [f32; 4] {
        self.clear_color
    }

    pub fn offset(&self) -> Vec2 {
        self.offset
    }

    pub fn triangle_count(&self) -> usize {
        self.vertices.len() / 3
    }
}

impl Canvas for ShapeBatch {
    fn clear(&mut self, color: [f32; 4]) {
        if color[3] >= 1.0 {
            self.vertices.clear();
            self.clear_color = color;
        } else {
            self.vertices.extend(rect(
                Vec2::ZERO,
                Vec2::new(CANVAS_WIDTH, CANVAS_HEIGHT),
                color,
            ));
        }
    }

    fn set_offset(&mut self, offset: Vec2) {
        self.offset = offset;
    }

    fn fill_rect(&mut self, r: Rect, color: [f32; 4]) {
        self.vertices.extend(rect(r.min + self.offset, r.size, color));
    }

    fn fill_circle(&mut self, center: Vec2, radius: f32, color: [f32; 4]) {
        self.vertices.extend(circle(
            center + self.offset,
            radius,
            color,
            circle_segments(radius),
        ));
    }

    fn line(&mut self, from: Vec2, to: Vec2, width: f32, color: [f32; 4]) {
        self.vertices
            .extend(line(from + self.offset, to + self.offset, width, color));
    }
}
