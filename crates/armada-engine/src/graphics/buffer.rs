//! GPU vertex and index buffers.
//!
//! Both types own their `wgpu::Buffer`; the handle is released when the
//! owner drops. The batch renderer pre-allocates one of each at capacity and
//! rewrites only the vertex buffer per flush.

use wgpu::util::DeviceExt;

use super::vertex::BufferLayout;

/// GPU vertex buffer with a described memory layout.
///
/// Created at a fixed byte capacity and rewritten via [`set_data`]; the
/// upload span is asserted (debug builds) to fit the allocation.
///
/// [`set_data`]: VertexBuffer::set_data
pub struct VertexBuffer {
    buffer: wgpu::Buffer,
    capacity: u64,
    layout: BufferLayout,
    attributes: Vec<wgpu::VertexAttribute>,
}

impl VertexBuffer {
    /// Creates a dynamic buffer of `capacity` bytes (rewritten every flush).
    pub fn new(device: &wgpu::Device, capacity: u64, layout: BufferLayout) -> Self {
        let buffer = device.create_buffer(&wgpu::BufferDescriptor {
            label: Some("armada vertex buffer"),
            size: capacity,
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
            mapped_at_creation: false,
        });

        let attributes = layout.wgpu_attributes();

        Self {
            buffer,
            capacity,
            layout,
            attributes,
        }
    }

    /// Creates a static buffer uploaded once at creation.
    pub fn with_data(device: &wgpu::Device, data: &[u8], layout: BufferLayout) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("armada static vertex buffer"),
            contents: data,
            usage: wgpu::BufferUsages::VERTEX,
        });

        let attributes = layout.wgpu_attributes();

        Self {
            buffer,
            capacity: data.len() as u64,
            layout,
            attributes,
        }
    }

    /// Uploads `data` to the start of the buffer.
    ///
    /// The span must fit the allocated capacity; the batch keeps this true
    /// by construction and debug builds assert it.
    pub fn set_data(&self, queue: &wgpu::Queue, data: &[u8]) {
        debug_assert!(
            data.len() as u64 <= self.capacity,
            "vertex upload of {} bytes exceeds buffer capacity {}",
            data.len(),
            self.capacity
        );
        queue.write_buffer(&self.buffer, 0, data);
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub fn capacity(&self) -> u64 {
        self.capacity
    }

    pub fn layout(&self) -> &BufferLayout {
        &self.layout
    }

    /// wgpu view of the layout, borrowing the cached attribute list.
    pub fn vertex_layout(&self) -> wgpu::VertexBufferLayout<'_> {
        wgpu::VertexBufferLayout {
            array_stride: self.layout.stride() as u64,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &self.attributes,
        }
    }
}

/// GPU index buffer with an immutable element count.
///
/// The count comes from the slice the buffer is created with; it is never
/// rewritten for the lifetime of the batch renderer.
pub struct IndexBuffer {
    buffer: wgpu::Buffer,
    count: u32,
}

impl IndexBuffer {
    pub fn new(device: &wgpu::Device, indices: &[u32]) -> Self {
        let buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some("armada index buffer"),
            contents: bytemuck::cast_slice(indices),
            usage: wgpu::BufferUsages::INDEX,
        });

        Self {
            buffer,
            count: indices.len() as u32,
        }
    }

    pub fn buffer(&self) -> &wgpu::Buffer {
        &self.buffer
    }

    pub fn count(&self) -> u32 {
        self.count
    }
}
