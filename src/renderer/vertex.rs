//! Vertex types for 2D rendering

use bytemuck::{Pod, Zeroable};

/// Simple 2D vertex with position and color
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 2],
    pub color: [f32; 4],
}

impl Vertex {
    pub const fn new(x: f32, y: f32, color: [f32; 4]) -> Self {
        Self {
            position: [x, y],
            color,
        }
    }

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[
                wgpu::VertexAttribute {
                    offset: 0,
                    shader_location: 0,
                    format: wgpu::VertexFormat::Float32x2,
                },
                wgpu::VertexAttribute {
                    offset: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
                    shader_location: 1,
                    format: wgpu::VertexFormat::Float32x4,
                },
            ],
        }
    }
}

/// Colors for game elements
pub mod colors {
    use crate::rgba;

    pub const BACKGROUND: [f32; 4] = rgba(0x000000, 1.0);
    /// Translucent wash laid over the previous frame while playing
    pub const TRAIL_FADE: [f32; 4] = rgba(0x000000, 0.25);
    pub const BALL: [f32; 4] = rgba(0xffffff, 1.0);
    pub const BALL_GLOW: [f32; 4] = rgba(0x22d3ee, 0.35);
    pub const PADDLE: [f32; 4] = rgba(0x06b6d4, 1.0);
    pub const PADDLE_GLOW: [f32; 4] = rgba(0x06b6d4, 0.3);
    /// Alpha of the halo drawn behind each brick
    pub const BRICK_GLOW_ALPHA: f32 = 0.25;
}
