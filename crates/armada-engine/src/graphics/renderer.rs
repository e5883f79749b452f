//! Batched quad renderer.
//!
//! [`Renderer`] owns one vertex buffer and one index buffer pre-allocated
//! for [`MAX_QUADS`](super::batch::MAX_QUADS), the shader library, and the
//! texture-slot mirror. [`Scene`] is the draw guard returned by
//! `start_scene`: draw calls accumulate into the CPU batch and a flush —
//! forced by capacity or issued at scene end — performs exactly one vertex
//! upload and one indexed draw call.
//!
//! A `Scene` mutably borrows the renderer, so a second `start_scene` before
//! the first scene ends is rejected at compile time; the batch cannot be
//! corrupted by interleaved scenes.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use glam::{Vec2, Vec3};

use crate::paint::Color;

use super::batch::{BatchFull, QuadBatch, SlotResolution, DEFAULT_TEX_COORDS, MAX_INDICES, MAX_VERTICES};
use super::buffer::{IndexBuffer, VertexBuffer};
use super::camera::OrthoCam;
use super::ctx::{RenderCtx, RenderTarget};
use super::font::{self, FontAtlas};
use super::geometry::{compute_quad_corners, rotate_quad};
use super::shader::{EffectUniform, SceneUniform, ShaderLibrary};
use super::texture::Texture;
use super::vertex::Vertex;

/// Common per-draw transform payload.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderData {
    pub position: Vec3,
    pub scale: Vec2,
    pub color: Color,
    /// Rotation about the quad center, degrees, counter-clockwise positive.
    pub rotation: f32,
}

impl Default for RenderData {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            scale: Vec2::ONE,
            color: Color::WHITE,
            rotation: 0.0,
        }
    }
}

/// A drawable thing, dispatched explicitly by [`Scene::draw`].
#[derive(Clone)]
pub enum Drawable {
    /// Solid colored quad; `scale` is its size in world units.
    Quad(RenderData),
    /// Textured quad sized by the texture's pixel dimensions times `scale`.
    Sprite {
        data: RenderData,
        texture: Arc<Texture>,
    },
    /// One line of text centered on `data.position`.
    Text {
        text: String,
        data: RenderData,
        font: Arc<FontAtlas>,
    },
}

/// The batch renderer. One per window; owns all batch GPU resources.
pub struct Renderer {
    batch: QuadBatch,
    vertex_buffer: VertexBuffer,
    index_buffer: IndexBuffer,
    shaders: ShaderLibrary,

    /// The renderer-owned white fallback (slot 0). All other textures in
    /// `bound` are shared with their creators.
    white: Arc<Texture>,

    /// Textures per slot, kept in lockstep with the batch's slot table so
    /// the flush can build the bind group. Stale entries past the live
    /// range keep their `Arc` until rebound, mirroring the id table.
    bound: Vec<Arc<Texture>>,

    window_size: Vec2,
}

impl Renderer {
    pub const DEFAULT_SHADER: &'static str = "default";

    /// Builds all fixed-capacity GPU resources.
    ///
    /// `max_texture_units` is clamped to `2..=32`; pass
    /// `Gpu::max_texture_units()`. Fails if the shader set cannot be built —
    /// callers are expected to abort startup on error.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        surface_format: wgpu::TextureFormat,
        window_size: Vec2,
        max_texture_units: u32,
    ) -> Result<Self> {
        let max_texture_units = max_texture_units.clamp(2, 32) as usize;

        let white = Arc::new(Texture::white(device, queue));
        let batch = QuadBatch::new(white.id(), max_texture_units);

        let layout = Vertex::layout();
        let vertex_buffer = VertexBuffer::new(
            device,
            (MAX_VERTICES * std::mem::size_of::<Vertex>()) as u64,
            layout,
        );

        // Fixed index pattern: two CCW triangles per quad, built once.
        let mut indices = Vec::with_capacity(MAX_INDICES);
        let mut offset = 0u32;
        while indices.len() < MAX_INDICES {
            indices.extend_from_slice(&[
                offset,
                offset + 1,
                offset + 2,
                offset + 2,
                offset + 3,
                offset,
            ]);
            offset += 4;
        }
        let index_buffer = IndexBuffer::new(device, &indices);

        let shaders = ShaderLibrary::new(
            device,
            surface_format,
            vertex_buffer.vertex_layout(),
            max_texture_units as u32,
        )
        .context("failed to build the renderer shader set")?;

        let bound = vec![white.clone(); max_texture_units];

        Ok(Self {
            batch,
            vertex_buffer,
            index_buffer,
            shaders,
            white,
            bound,
            window_size,
        })
    }

    /// Updates the window size used by effect shaders and full-window quads.
    pub fn set_window_size(&mut self, size: Vec2) {
        self.window_size = size;
    }

    pub fn window_size(&self) -> Vec2 {
        self.window_size
    }

    /// The renderer-owned white fallback texture.
    pub fn white_texture(&self) -> &Arc<Texture> {
        &self.white
    }

    /// Opens a scene: binds `shader`, uploads the camera's view-projection
    /// matrix, and returns the draw guard.
    ///
    /// Fails only for an unknown shader name.
    pub fn start_scene<'s, 'c, 't>(
        &'s mut self,
        ctx: &'s RenderCtx<'c>,
        target: &'s mut RenderTarget<'t>,
        camera: &OrthoCam,
        shader: &str,
    ) -> Result<Scene<'s, 'c, 't>> {
        let name = self
            .shaders
            .canonical_name(shader)
            .with_context(|| format!("unknown shader '{shader}'"))?;

        if let Some(entry) = self.shaders.get(name) {
            entry.write_scene(ctx.queue, &SceneUniform::new(camera.view_projection()));
        }

        Ok(Scene {
            renderer: self,
            ctx,
            target,
            shader: name,
        })
    }
}

/// Draw guard for one open scene.
///
/// Dropping the scene flushes any staged geometry; [`Scene::end`] does the
/// same but reads better at call sites.
pub struct Scene<'s, 'c, 't> {
    renderer: &'s mut Renderer,
    ctx: &'s RenderCtx<'c>,
    target: &'s mut RenderTarget<'t>,
    shader: &'static str,
}

impl Scene<'_, '_, '_> {
    /// Draws a solid colored quad; `data.scale` is the quad size.
    pub fn draw_quad(&mut self, data: &RenderData) {
        let corners = corners_for(data.position, data.scale, data.rotation);
        self.push_quad(&corners, data.color, &DEFAULT_TEX_COORDS, 0);
    }

    /// Draws a textured quad sized by the texture dimensions times
    /// `data.scale`.
    pub fn draw_texture(&mut self, data: &RenderData, texture: &Arc<Texture>) {
        let size = texture.dimensions() * data.scale;
        let corners = corners_for(data.position, size, data.rotation);
        self.push_textured(&corners, data.color, &DEFAULT_TEX_COORDS, texture);
    }

    /// Draws one line of text centered on `data.position`.
    ///
    /// The whole run shares the atlas texture's slot. If the batch fills
    /// mid-string, the glyph loop flushes and rebinds the atlas, so the run
    /// stays contiguous across the flush boundary.
    pub fn draw_text(&mut self, text: &str, data: &RenderData, font: &Arc<FontAtlas>) {
        let glyphs = font::layout_line(
            text,
            |ch| font.glyph(ch).copied(),
            data.position,
            data.scale,
            data.color,
        );

        for glyph in &glyphs {
            let corners = compute_quad_corners(glyph.center, glyph.size);
            self.push_textured(&corners, glyph.color, &glyph.tex_coords, font.texture());
        }
    }

    /// Explicit dispatch over the drawable variants.
    pub fn draw(&mut self, drawable: &Drawable) {
        match drawable {
            Drawable::Quad(data) => self.draw_quad(data),
            Drawable::Sprite { data, texture } => self.draw_texture(data, texture),
            Drawable::Text { text, data, font } => self.draw_text(text, data, font),
        }
    }

    /// Draws the pulsing loading indicator over `data`'s quad.
    ///
    /// `elapsed` drives the pulse animation; pass time since startup.
    pub fn loading_dots(
        &mut self,
        count: u32,
        spacing: f32,
        radius: f32,
        data: &RenderData,
        elapsed: Duration,
    ) {
        self.write_effect(EffectUniform {
            resolution: self.renderer.window_size.to_array(),
            spacing,
            radius,
            circle_count: count as f32,
            run_time: elapsed.as_secs_f32(),
            ..EffectUniform::default()
        });

        let corners = corners_for(data.position, data.scale, data.rotation);
        self.push_quad(&corners, data.color, &DEFAULT_TEX_COORDS, 0);
    }

    /// Draws the debug grid across the whole window.
    pub fn draw_grid(&mut self, camera_position: Vec3, cell_size: f32, zoom: f32) {
        self.write_effect(EffectUniform {
            resolution: self.renderer.window_size.to_array(),
            cell_size,
            zoom,
            camera_position: camera_position.to_array(),
            ..EffectUniform::default()
        });

        let corners = compute_quad_corners(Vec3::ZERO, self.renderer.window_size);
        self.push_quad(&corners, Color::WHITE, &DEFAULT_TEX_COORDS, 0);
    }

    /// Ends the scene, flushing staged geometry.
    pub fn end(self) {
        // Drop runs the final flush.
    }

    // ── internals ──────────────────────────────────────────────────────────

    /// Appends a quad on a slot that survives flushes (slot 0).
    fn push_quad(&mut self, corners: &[Vec3; 4], color: Color, texcoords: &[Vec2; 4], slot: u32) {
        loop {
            match self
                .renderer
                .batch
                .try_push_quad(corners, color, texcoords, slot)
            {
                Ok(()) => return,
                Err(BatchFull) => self.flush(),
            }
        }
    }

    /// Appends a textured quad, resolving the texture's slot first.
    ///
    /// The slot is re-resolved after any flush because flushing resets the
    /// slot table.
    fn push_textured(
        &mut self,
        corners: &[Vec3; 4],
        color: Color,
        texcoords: &[Vec2; 4],
        texture: &Arc<Texture>,
    ) {
        loop {
            let slot = self.resolve_slot(texture);
            if self
                .renderer
                .batch
                .try_push_quad(corners, color, texcoords, slot)
                .is_ok()
            {
                return;
            }
            self.flush();
        }
    }

    /// Returns the slot for `texture`, binding it if needed and flushing
    /// when the slot table is exhausted.
    fn resolve_slot(&mut self, texture: &Arc<Texture>) -> u32 {
        loop {
            match self.renderer.batch.resolve_slot(texture.id()) {
                SlotResolution::Reused(slot) => return slot,
                SlotResolution::Bound(slot) => {
                    self.renderer.bound[slot as usize] = texture.clone();
                    return slot;
                }
                SlotResolution::Full => self.flush(),
            }
        }
    }

    /// Submits the accumulated batch: one vertex upload, one bind group for
    /// the live texture slots (padded with white), one indexed draw call.
    /// No-op when nothing is staged.
    fn flush(&mut self) {
        let renderer = &mut *self.renderer;

        if renderer.batch.is_empty() {
            return;
        }

        let Some(entry) = renderer.shaders.get(self.shader) else {
            return;
        };

        renderer
            .vertex_buffer
            .set_data(self.ctx.queue, renderer.batch.vertex_bytes());

        let views: Vec<&wgpu::TextureView> =
            renderer.bound.iter().map(|texture| texture.view()).collect();
        let texture_bind_group = renderer.shaders.texture_bind_group(self.ctx.device, &views);

        {
            let mut rpass = self
                .target
                .encoder
                .begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("armada batch pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: self.target.color_view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Load,
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: None,
                    timestamp_writes: None,
                    occlusion_query_set: None,
                    multiview_mask: None,
                });

            rpass.set_pipeline(&entry.pipeline);
            rpass.set_bind_group(0, &entry.bind_group, &[]);
            rpass.set_bind_group(1, &texture_bind_group, &[]);
            rpass.set_vertex_buffer(0, renderer.vertex_buffer.buffer().slice(..));
            rpass.set_index_buffer(
                renderer.index_buffer.buffer().slice(..),
                wgpu::IndexFormat::Uint32,
            );
            rpass.draw_indexed(0..renderer.batch.index_count(), 0, 0..1);
        }

        renderer.batch.reset();
    }

    fn write_effect(&mut self, uniform: EffectUniform) {
        if let Some(entry) = self.renderer.shaders.get(self.shader) {
            entry.write_effect(self.ctx.queue, &uniform);
        }
    }
}

impl Drop for Scene<'_, '_, '_> {
    fn drop(&mut self) {
        self.flush();
    }
}

fn corners_for(position: Vec3, size: Vec2, rotation: f32) -> [Vec3; 4] {
    let corners = compute_quad_corners(position, size);
    if rotation != 0.0 {
        rotate_quad(&corners, position, rotation)
    } else {
        corners
    }
}
