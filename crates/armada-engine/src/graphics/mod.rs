//! GPU rendering subsystem.
//!
//! The centerpiece is the batched quad renderer ([`renderer::Renderer`]):
//! draw calls append vertices to a CPU staging buffer and a bounded table of
//! texture slots; a flush uploads the staged span and issues exactly one
//! indexed draw call.
//!
//! Convention:
//! - Game geometry is in world units (y up); cameras project to NDC.
//! - The quad is the only primitive: two CCW triangles, four vertices.

mod ctx;

pub mod batch;
pub mod buffer;
pub mod camera;
pub mod font;
pub mod geometry;
pub mod renderer;
pub mod shader;
pub mod texture;
pub mod vertex;

pub use batch::{BatchFull, QuadBatch, MAX_INDICES, MAX_QUADS, MAX_VERTICES};
pub use buffer::{IndexBuffer, VertexBuffer};
pub use camera::OrthoCam;
pub use ctx::{RenderCtx, RenderTarget};
pub use font::{FontAtlas, FontLibrary, Glyph};
pub use renderer::{Drawable, RenderData, Renderer, Scene};
pub use texture::{Texture, TextureId};
pub use vertex::{BufferElement, BufferLayout, ShaderDataType, Vertex};
