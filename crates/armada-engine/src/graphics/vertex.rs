//! Vertex format description.
//!
//! A [`BufferLayout`] is an ordered list of typed fields with derived byte
//! offsets and stride; [`Vertex`] is the batch renderer's concrete format
//! (position, texcoord, color, texture slot) described by one such layout.

use bytemuck::{Pod, Zeroable};

use crate::paint::Color;

/// Semantic type of a vertex or uniform field.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ShaderDataType {
    Float,
    Float2,
    Float3,
    Float4,
    Mat3,
    Mat4,
    Int,
    Int2,
    Int3,
    Int4,
    Bool,
}

impl ShaderDataType {
    /// Size of the field in bytes.
    pub const fn size(self) -> u32 {
        match self {
            ShaderDataType::Float => 4,
            ShaderDataType::Float2 => 8,
            ShaderDataType::Float3 => 12,
            ShaderDataType::Float4 => 16,
            ShaderDataType::Mat3 => 4 * 3 * 3,
            ShaderDataType::Mat4 => 4 * 4 * 4,
            ShaderDataType::Int => 4,
            ShaderDataType::Int2 => 8,
            ShaderDataType::Int3 => 12,
            ShaderDataType::Int4 => 16,
            ShaderDataType::Bool => 4,
        }
    }

    /// Number of scalar components.
    pub const fn component_count(self) -> u32 {
        match self {
            ShaderDataType::Float => 1,
            ShaderDataType::Float2 => 2,
            ShaderDataType::Float3 => 3,
            ShaderDataType::Float4 => 4,
            ShaderDataType::Mat3 => 3 * 3,
            ShaderDataType::Mat4 => 4 * 4,
            ShaderDataType::Int => 1,
            ShaderDataType::Int2 => 2,
            ShaderDataType::Int3 => 3,
            ShaderDataType::Int4 => 4,
            ShaderDataType::Bool => 1,
        }
    }

    /// The wgpu vertex format for this type.
    ///
    /// Matrix types occupy several attribute locations and cannot be a single
    /// attribute; they are only valid inside uniform blocks, so this returns
    /// `None` for them.
    pub const fn vertex_format(self) -> Option<wgpu::VertexFormat> {
        match self {
            ShaderDataType::Float => Some(wgpu::VertexFormat::Float32),
            ShaderDataType::Float2 => Some(wgpu::VertexFormat::Float32x2),
            ShaderDataType::Float3 => Some(wgpu::VertexFormat::Float32x3),
            ShaderDataType::Float4 => Some(wgpu::VertexFormat::Float32x4),
            ShaderDataType::Int => Some(wgpu::VertexFormat::Sint32),
            ShaderDataType::Int2 => Some(wgpu::VertexFormat::Sint32x2),
            ShaderDataType::Int3 => Some(wgpu::VertexFormat::Sint32x3),
            ShaderDataType::Int4 => Some(wgpu::VertexFormat::Sint32x4),
            ShaderDataType::Bool => Some(wgpu::VertexFormat::Uint32),
            ShaderDataType::Mat3 | ShaderDataType::Mat4 => None,
        }
    }
}

/// One field of a vertex layout.
///
/// `offset` is derived when the element is added to a [`BufferLayout`];
/// everything else is fixed at construction.
#[derive(Debug, Clone)]
pub struct BufferElement {
    pub data_type: ShaderDataType,
    pub name: &'static str,
    pub size: u32,
    pub normalized: bool,
    pub offset: u32,
}

impl BufferElement {
    pub fn new(data_type: ShaderDataType, name: &'static str) -> Self {
        Self {
            data_type,
            name,
            size: data_type.size(),
            normalized: false,
            offset: 0,
        }
    }
}

/// Ordered sequence of [`BufferElement`]s with derived offsets and stride.
///
/// Invariant: offsets are strictly increasing and the stride equals the sum
/// of element sizes. Layouts are immutable once constructed.
#[derive(Debug, Clone)]
pub struct BufferLayout {
    elements: Vec<BufferElement>,
    stride: u32,
}

impl BufferLayout {
    pub fn new(mut elements: Vec<BufferElement>) -> Self {
        let mut offset = 0;
        for element in &mut elements {
            element.offset = offset;
            offset += element.size;
        }

        Self {
            elements,
            stride: offset,
        }
    }

    pub fn stride(&self) -> u32 {
        self.stride
    }

    pub fn elements(&self) -> &[BufferElement] {
        &self.elements
    }

    /// Converts the layout into wgpu vertex attributes.
    ///
    /// Shader locations follow element order. Matrix elements have no single
    /// vertex format and are skipped (debug-asserted; they do not appear in
    /// any layout this engine builds).
    pub fn wgpu_attributes(&self) -> Vec<wgpu::VertexAttribute> {
        self.elements
            .iter()
            .enumerate()
            .filter_map(|(location, element)| {
                let format = element.data_type.vertex_format();
                debug_assert!(
                    format.is_some(),
                    "matrix element '{}' cannot be a vertex attribute",
                    element.name
                );
                format.map(|format| wgpu::VertexAttribute {
                    format,
                    offset: element.offset as u64,
                    shader_location: location as u32,
                })
            })
            .collect()
    }
}

/// One batch vertex, written directly into the staging buffer.
#[repr(C)]
#[derive(Debug, Copy, Clone, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub texcoord: [f32; 2],
    pub color: [f32; 4],
    /// Index into the batch's bound-texture table; slot 0 is the white
    /// fallback used by untextured quads.
    pub tex_slot: f32,
}

impl Vertex {
    pub fn new(position: glam::Vec3, texcoord: glam::Vec2, color: Color, tex_slot: u32) -> Self {
        Self {
            position: position.to_array(),
            texcoord: texcoord.to_array(),
            color: color.to_array(),
            tex_slot: tex_slot as f32,
        }
    }

    /// The canonical batch vertex layout.
    pub fn layout() -> BufferLayout {
        BufferLayout::new(vec![
            BufferElement::new(ShaderDataType::Float3, "a_position"),
            BufferElement::new(ShaderDataType::Float2, "a_texcoord"),
            BufferElement::new(ShaderDataType::Float4, "a_color"),
            BufferElement::new(ShaderDataType::Float, "a_tex_slot"),
        ])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_offsets_and_stride() {
        let layout = Vertex::layout();
        let elements = layout.elements();

        assert_eq!(elements[0].offset, 0);
        assert_eq!(elements[1].offset, 12);
        assert_eq!(elements[2].offset, 20);
        assert_eq!(elements[3].offset, 36);
        assert_eq!(layout.stride(), 40);
    }

    #[test]
    fn layout_stride_matches_vertex_size() {
        assert_eq!(
            Vertex::layout().stride() as usize,
            std::mem::size_of::<Vertex>()
        );
    }

    #[test]
    fn offsets_strictly_increase() {
        let layout = BufferLayout::new(vec![
            BufferElement::new(ShaderDataType::Float4, "a"),
            BufferElement::new(ShaderDataType::Int2, "b"),
            BufferElement::new(ShaderDataType::Bool, "c"),
        ]);

        let mut prev = None;
        for element in layout.elements() {
            if let Some(p) = prev {
                assert!(element.offset > p);
            }
            prev = Some(element.offset);
        }
        assert_eq!(
            layout.stride(),
            layout.elements().iter().map(|e| e.size).sum::<u32>()
        );
    }

    #[test]
    fn attributes_follow_element_order() {
        let attrs = Vertex::layout().wgpu_attributes();

        assert_eq!(attrs.len(), 4);
        assert_eq!(attrs[0].format, wgpu::VertexFormat::Float32x3);
        assert_eq!(attrs[2].offset, 20);
        assert_eq!(attrs[3].shader_location, 3);
    }
}
