//! Vertex format and the static triangle.

use core::mem;

use bytemuck::{Pod, Zeroable};

/// Position followed by a packed `R8G8B8A8_UNORM` color.
#[derive(Debug, Clone, Copy, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Vertex {
    pub position: [f32; 3],
    pub color: u32,
}

pub const VERTEX_STRIDE: u32 = mem::size_of::<Vertex>() as u32;
pub const COLOR_OFFSET: u32 = mem::offset_of!(Vertex, color) as u32;

/// Packs a color so the bytes land in R, G, B, A order in memory.
#[inline]
pub const fn pack_rgba(r: u8, g: u8, b: u8, a: u8) -> u32 {
    u32::from_le_bytes([r, g, b, a])
}

/// Immutable geometry uploaded once at startup.
#[derive(Debug, Clone, Copy)]
pub struct StaticMesh {
    pub vertices: &'static [Vertex],
    pub indices: &'static [u16],
}

impl StaticMesh {
    #[inline]
    pub const fn index_count(&self) -> u32 {
        self.indices.len() as u32
    }

    pub fn vertex_bytes(&self) -> &'static [u8] {
        bytemuck::cast_slice(self.vertices)
    }

    pub fn index_bytes(&self) -> &'static [u8] {
        bytemuck::cast_slice(self.indices)
    }
}

pub const TRIANGLE: StaticMesh = StaticMesh {
    vertices: &[
        Vertex {
            position: [-0.5, -0.5, 0.0],
            color: pack_rgba(255, 0, 0, 255),
        },
        Vertex {
            position: [0.5, -0.5, 0.0],
            color: pack_rgba(0, 255, 0, 255),
        },
        Vertex {
            position: [0.0, 0.5, 0.0],
            color: pack_rgba(0, 0, 255, 255),
        },
    ],
    // clockwise, the default front face
    indices: &[0, 2, 1],
};
