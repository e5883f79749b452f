//! GPU texture resources.
//!
//! Textures are shared as `Arc<Texture>` between game objects and the batch
//! renderer's slot table; the renderer only ever creates the 1x1 white
//! fallback itself. Identity is an explicit id, not the GPU handle.

use std::path::Path;
use std::sync::atomic::{AtomicU64, Ordering};

use anyhow::{Context, Result};
use glam::Vec2;

static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Process-unique texture identity.
///
/// The batch slot table deduplicates by this id; two `Texture` values are
/// the same resource iff their ids are equal.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub struct TextureId(u64);

impl TextureId {
    /// Allocates a fresh id (also used by batch tests as a stand-in for a
    /// full GPU texture).
    pub(crate) fn next() -> Self {
        Self(NEXT_ID.fetch_add(1, Ordering::Relaxed))
    }
}

/// A 2D GPU texture with its sampled view and pixel dimensions.
pub struct Texture {
    id: TextureId,
    _texture: wgpu::Texture,
    view: wgpu::TextureView,
    width: u32,
    height: u32,
}

impl Texture {
    /// Creates a texture from raw RGBA8 pixels.
    pub fn from_pixels(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        width: u32,
        height: u32,
        pixels: &[u8],
        label: &str,
    ) -> Result<Self> {
        anyhow::ensure!(width > 0 && height > 0, "texture '{label}' has zero size");
        anyhow::ensure!(
            pixels.len() as u64 == width as u64 * height as u64 * 4,
            "texture '{label}': pixel data does not match {width}x{height} RGBA"
        );

        let size = wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        };

        let texture = device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::Rgba8UnormSrgb,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        queue.write_texture(
            wgpu::TexelCopyTextureInfo {
                texture: &texture,
                mip_level: 0,
                origin: wgpu::Origin3d::ZERO,
                aspect: wgpu::TextureAspect::All,
            },
            pixels,
            wgpu::TexelCopyBufferLayout {
                offset: 0,
                bytes_per_row: Some(4 * width),
                rows_per_image: Some(height),
            },
            size,
        );

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());

        Ok(Self {
            id: TextureId::next(),
            _texture: texture,
            view,
            width,
            height,
        })
    }

    /// Loads and decodes an image file.
    pub fn from_path(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        path: impl AsRef<Path>,
    ) -> Result<Self> {
        let path = path.as_ref();
        let image = image::open(path)
            .with_context(|| format!("failed to load texture from {}", path.display()))?
            .to_rgba8();

        let (width, height) = image.dimensions();
        let label = path.to_string_lossy();

        Self::from_pixels(device, queue, width, height, image.as_raw(), &label)
    }

    /// Creates the 1x1 opaque white fallback bound at slot 0.
    pub fn white(device: &wgpu::Device, queue: &wgpu::Queue) -> Self {
        // from_pixels only fails on dimension mismatch, impossible here.
        Self::from_pixels(device, queue, 1, 1, &[0xff, 0xff, 0xff, 0xff], "white")
            .expect("1x1 white texture is always valid")
    }

    /// Wraps an already-created texture (used by the font atlas).
    pub(crate) fn from_raw(
        texture: wgpu::Texture,
        view: wgpu::TextureView,
        width: u32,
        height: u32,
    ) -> Self {
        Self {
            id: TextureId::next(),
            _texture: texture,
            view,
            width,
            height,
        }
    }

    pub fn id(&self) -> TextureId {
        self.id
    }

    pub fn view(&self) -> &wgpu::TextureView {
        &self.view
    }

    /// Pixel dimensions as floats (sprite sizing math).
    pub fn dimensions(&self) -> Vec2 {
        Vec2::new(self.width as f32, self.height as f32)
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }
}
