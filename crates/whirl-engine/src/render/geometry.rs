//! Static triangle geometry.

use bytemuck::{Pod, Zeroable};
use wgpu::util::DeviceExt;

/// One vertex: a position in normalized device coordinates.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub pos: [f32; 3],
}

impl Vertex {
    const ATTRS: [wgpu::VertexAttribute; 1] = wgpu::vertex_attr_array![0 => Float32x3];

    /// Buffer layout: 3 contiguous floats per vertex, one positional
    /// attribute at shader location 0, offset 0.
    pub fn layout() -> wgpu::VertexBufferLayout<'static> {
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<Vertex>() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRS,
        }
    }
}

/// The triangle, fixed at compile time.
pub const TRIANGLE_VERTICES: [Vertex; 3] = [
    Vertex { pos: [0.0, 0.5, 0.0] },
    Vertex { pos: [-0.5, -0.5, 0.0] },
    Vertex { pos: [0.5, -0.5, 0.0] },
];

/// GPU-resident vertex buffer holding the triangle.
///
/// Uploaded once; there is no update path. The buffer lives for the
/// process lifetime alongside the pipeline that consumes it.
pub struct GeometryBuffer {
    buffer: wgpu::Buffer,
    vertex_count: u32,
}

impl GeometryBuffer {
    /// Uploads the triangle vertex data.
    pub fn triangle(device: &wgpu::Device) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("whirl triangle vbo"),
            contents: bytemuck::cast_slice(&TRIANGLE_VERTICES),
            usage: wgpu::BufferUsages::VERTEX,
        });

        Self {
            buffer,
            vertex_count: TRIANGLE_VERTICES.len() as u32,
        }
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub fn vertex_count(&self) -> u32 {
        self.vertex_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn triangle_has_exactly_three_vertices() {
        assert_eq!(TRIANGLE_VERTICES.len(), 3);
    }

    #[test]
    fn vertices_are_in_normalized_device_coordinates() {
        assert_eq!(TRIANGLE_VERTICES[0], Vertex { pos: [0.0, 0.5, 0.0] });
        assert_eq!(TRIANGLE_VERTICES[1], Vertex { pos: [-0.5, -0.5, 0.0] });
        assert_eq!(TRIANGLE_VERTICES[2], Vertex { pos: [0.5, -0.5, 0.0] });
    }

    #[test]
    fn layout_is_three_contiguous_floats() {
        let layout = Vertex::layout();
        assert_eq!(layout.array_stride, 3 * std::mem::size_of::<f32>() as u64);
        assert_eq!(layout.step_mode, wgpu::VertexStepMode::Vertex);
        assert_eq!(layout.attributes.len(), 1);

        let attr = &layout.attributes[0];
        assert_eq!(attr.shader_location, 0);
        assert_eq!(attr.offset, 0);
        assert_eq!(attr.format, wgpu::VertexFormat::Float32x3);
    }
}
