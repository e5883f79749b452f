//! Color model shared between game code and the renderer.
//!
//! Vertex colors are straight-alpha RGBA in `[0, 1]`; blending against the
//! framebuffer happens in the alpha-blend state of the batch pipelines.

mod color;

pub use color::Color;
