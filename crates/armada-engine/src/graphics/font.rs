//! Font atlases.
//!
//! A [`FontAtlas`] rasterizes the printable ASCII range at one pixel size
//! into a single horizontal-strip `R8Unorm` texture and keeps per-glyph
//! metrics and normalized texcoords. The atlas texture participates in the
//! batch slot table like any other texture, so a whole string costs one
//! slot.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use glam::{Vec2, Vec3};

use super::texture::Texture;
use crate::paint::Color;

/// Printable ASCII range packed into every atlas.
const FIRST_CHAR: u8 = 32;
const LAST_CHAR: u8 = 127;

/// Gutter between glyphs in the strip, in pixels.
const GLYPH_PADDING: u32 = 1;

/// Z increment per glyph so later glyphs in a run sit on top.
const GLYPH_Z_STEP: f32 = 1e-5;

/// Metrics and texcoords for one rasterized glyph.
///
/// `bearing.x` is the left side bearing; `bearing.y` is the distance from
/// the baseline to the bitmap top. `advance` is the horizontal pen advance
/// in pixels. Texcoords are ordered BL, BR, TR, TL like quad corners.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Glyph {
    pub size: Vec2,
    pub bearing: Vec2,
    pub advance: f32,
    pub tex_coords: [Vec2; 4],
}

/// All printable-ASCII glyphs of one font at one pixel size, backed by a
/// single strip texture.
pub struct FontAtlas {
    size_px: f32,
    glyphs: HashMap<char, Glyph>,
    texture: Arc<Texture>,
}

impl FontAtlas {
    /// Rasterizes `font` at `size_px` and packs the strip texture.
    ///
    /// Characters the font cannot rasterize are skipped with one log line
    /// each; the atlas is still usable. Fails only when the font yields no
    /// glyphs at all.
    pub fn new(
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        font: &fontdue::Font,
        size_px: f32,
    ) -> Result<Self> {
        // First pass: strip dimensions.
        let mut strip_width = 0u32;
        let mut strip_height = 0u32;

        for byte in FIRST_CHAR..LAST_CHAR {
            let ch = byte as char;
            if font.lookup_glyph_index(ch) == 0 && byte != FIRST_CHAR {
                continue;
            }
            let metrics = font.metrics(ch, size_px);
            strip_width += metrics.width as u32 + GLYPH_PADDING;
            strip_height = strip_height.max(metrics.height as u32);
        }

        anyhow::ensure!(
            strip_width > 0 && strip_height > 0,
            "font produced no rasterizable glyphs at {size_px}px"
        );

        let extent = wgpu::Extent3d {
            width: strip_width,
            height: strip_height,
            depth_or_array_layers: 1,
        };

        let atlas = device.create_texture(&wgpu::TextureDescriptor {
            label: Some("armada font atlas"),
            size: extent,
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: wgpu::TextureFormat::R8Unorm,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        // Second pass: rasterize each glyph into the strip and record
        // metrics + normalized texcoords.
        let mut glyphs = HashMap::new();
        let mut cursor_x = 0u32;

        let atlas_w = strip_width as f32;
        let atlas_h = strip_height as f32;

        for byte in FIRST_CHAR..LAST_CHAR {
            let ch = byte as char;
            if font.lookup_glyph_index(ch) == 0 && byte != FIRST_CHAR {
                log::warn!("font atlas: no glyph for {ch:?} ({byte}), skipping");
                continue;
            }

            let (metrics, bitmap) = font.rasterize(ch, size_px);
            let (w, h) = (metrics.width as u32, metrics.height as u32);

            if w > 0 && h > 0 {
                queue.write_texture(
                    wgpu::TexelCopyTextureInfo {
                        texture: &atlas,
                        mip_level: 0,
                        origin: wgpu::Origin3d {
                            x: cursor_x,
                            y: 0,
                            z: 0,
                        },
                        aspect: wgpu::TextureAspect::All,
                    },
                    &bitmap,
                    wgpu::TexelCopyBufferLayout {
                        offset: 0,
                        bytes_per_row: Some(w),
                        rows_per_image: Some(h),
                    },
                    wgpu::Extent3d {
                        width: w,
                        height: h,
                        depth_or_array_layers: 1,
                    },
                );
            }

            let u0 = cursor_x as f32 / atlas_w;
            let u1 = (cursor_x + w) as f32 / atlas_w;
            // Bitmap rows are top-down; v grows downward in texture space,
            // so the quad's bottom corners sample the bottom of the glyph.
            let v_bottom = h as f32 / atlas_h;

            glyphs.insert(
                ch,
                Glyph {
                    size: Vec2::new(metrics.width as f32, metrics.height as f32),
                    bearing: Vec2::new(
                        metrics.xmin as f32,
                        metrics.ymin as f32 + metrics.height as f32,
                    ),
                    advance: metrics.advance_width,
                    tex_coords: [
                        Vec2::new(u0, v_bottom),
                        Vec2::new(u1, v_bottom),
                        Vec2::new(u1, 0.0),
                        Vec2::new(u0, 0.0),
                    ],
                },
            );

            cursor_x += w + GLYPH_PADDING;
        }

        let view = atlas.create_view(&wgpu::TextureViewDescriptor::default());
        let texture = Arc::new(Texture::from_raw(atlas, view, strip_width, strip_height));

        Ok(Self {
            size_px,
            glyphs,
            texture,
        })
    }

    /// Pixel size the atlas was rasterized at.
    pub fn size_px(&self) -> f32 {
        self.size_px
    }

    pub fn glyph(&self, ch: char) -> Option<&Glyph> {
        self.glyphs.get(&ch)
    }

    /// The strip texture; the batch dedups it by id like any sprite.
    pub fn texture(&self) -> &Arc<Texture> {
        &self.texture
    }

    /// Visual extent of `text` at `scale`, in world units.
    pub fn measure(&self, text: &str, scale: Vec2) -> Vec2 {
        line_extent(text, |ch| self.glyphs.get(&ch).copied()) * scale
    }
}

/// Named font with lazily-built atlases per pixel size.
pub struct FontLibrary {
    name: String,
    font: fontdue::Font,
    atlases: HashMap<u32, Arc<FontAtlas>>,
}

impl FontLibrary {
    /// Parses a TrueType/OpenType font from raw bytes.
    pub fn from_bytes(name: impl Into<String>, bytes: &[u8]) -> Result<Self> {
        let name = name.into();
        let font = fontdue::Font::from_bytes(bytes, fontdue::FontSettings::default())
            .map_err(|e| anyhow::anyhow!("failed to parse font '{name}': {e}"))?;

        Ok(Self {
            name,
            font,
            atlases: HashMap::new(),
        })
    }

    pub fn from_path(name: impl Into<String>, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)
            .with_context(|| format!("failed to read font file {}", path.display()))?;
        Self::from_bytes(name, &bytes)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the atlas for `size_px`, building it on first request.
    pub fn get(
        &mut self,
        device: &wgpu::Device,
        queue: &wgpu::Queue,
        size_px: u32,
    ) -> Result<Arc<FontAtlas>> {
        if let Some(atlas) = self.atlases.get(&size_px) {
            return Ok(atlas.clone());
        }

        let atlas = Arc::new(
            FontAtlas::new(device, queue, &self.font, size_px as f32)
                .with_context(|| format!("font '{}' at {size_px}px", self.name))?,
        );
        self.atlases.insert(size_px, atlas.clone());

        Ok(atlas)
    }
}

// ── line layout ───────────────────────────────────────────────────────────

/// One glyph quad produced by [`layout_line`].
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PlacedGlyph {
    pub center: Vec3,
    pub size: Vec2,
    pub color: Color,
    pub tex_coords: [Vec2; 4],
}

/// Unscaled visual extent of a line: pen advance up to the last glyph plus
/// its bitmap edge horizontally, tallest bitmap vertically.
fn line_extent(text: &str, lookup: impl Fn(char) -> Option<Glyph>) -> Vec2 {
    let mut width = 0.0f32;
    let mut height = 0.0f32;
    let mut pen = 0.0f32;

    for ch in text.chars() {
        let Some(glyph) = lookup(ch) else { continue };

        height = height.max(glyph.size.y);
        if glyph.size.x > 0.0 {
            width = width.max(pen + glyph.bearing.x + glyph.size.x);
        }
        pen += glyph.advance;
    }

    Vec2::new(width, height)
}

/// Lays out one baseline-aligned line centered on `position`.
///
/// Two passes: the first measures the visual extent to derive the centering
/// offset, the second places one quad per visible glyph, advancing the pen
/// and stepping z so glyphs stack deterministically. Characters without an
/// atlas entry are skipped; whitespace advances the pen without emitting a
/// quad.
pub fn layout_line(
    text: &str,
    lookup: impl Fn(char) -> Option<Glyph> + Copy,
    position: Vec3,
    scale: Vec2,
    color: Color,
) -> Vec<PlacedGlyph> {
    let extent = line_extent(text, lookup);
    let offset = extent / 2.0;

    let mut placed = Vec::new();
    let mut pen = position.x - offset.x * scale.x;
    let mut z = position.z;

    for ch in text.chars() {
        let Some(glyph) = lookup(ch) else { continue };

        if glyph.size.x > 0.0 && glyph.size.y > 0.0 {
            z += GLYPH_Z_STEP;

            let center = Vec3::new(
                pen + (glyph.bearing.x + glyph.size.x / 2.0) * scale.x,
                position.y + (glyph.bearing.y - glyph.size.y / 2.0 - offset.y) * scale.y,
                z,
            );

            placed.push(PlacedGlyph {
                center,
                size: glyph.size * scale,
                color,
                tex_coords: glyph.tex_coords,
            });
        }

        pen += glyph.advance * scale.x;
    }

    placed
}

#[cfg(test)]
mod tests {
    use super::*;

    // Synthetic monospace-ish metrics: 10x10 bitmaps sitting on the
    // baseline, 12px advance. Space has no bitmap.
    fn lookup(ch: char) -> Option<Glyph> {
        match ch {
            ' ' => Some(Glyph {
                size: Vec2::ZERO,
                bearing: Vec2::ZERO,
                advance: 12.0,
                tex_coords: [Vec2::ZERO; 4],
            }),
            'a'..='z' => Some(Glyph {
                size: Vec2::new(10.0, 10.0),
                bearing: Vec2::new(0.0, 10.0),
                advance: 12.0,
                tex_coords: [Vec2::ZERO; 4],
            }),
            _ => None,
        }
    }

    #[test]
    fn two_glyphs_center_symmetrically() {
        let placed = layout_line("ab", lookup, Vec3::ZERO, Vec2::ONE, Color::WHITE);

        assert_eq!(placed.len(), 2);
        // Extent: 12 (advance) + 10 (last bitmap) = 22, so offset is 11.
        assert!((placed[0].center.x - -6.0).abs() < 1e-4);
        assert!((placed[1].center.x - 6.0).abs() < 1e-4);
    }

    #[test]
    fn whitespace_advances_without_quads() {
        let placed = layout_line("a b", lookup, Vec3::ZERO, Vec2::ONE, Color::WHITE);

        assert_eq!(placed.len(), 2);
        assert!((placed[1].center.x - placed[0].center.x - 24.0).abs() < 1e-4);
    }

    #[test]
    fn unknown_characters_are_skipped() {
        let placed = layout_line("a\u{fffd}b", lookup, Vec3::ZERO, Vec2::ONE, Color::WHITE);
        assert_eq!(placed.len(), 2);
    }

    #[test]
    fn z_steps_per_visible_glyph() {
        let placed = layout_line("abc", lookup, Vec3::new(0.0, 0.0, 0.5), Vec2::ONE, Color::WHITE);

        assert!(placed[0].center.z > 0.5);
        assert!(placed[1].center.z > placed[0].center.z);
        assert!(placed[2].center.z > placed[1].center.z);
    }

    #[test]
    fn scale_multiplies_extent_and_positions() {
        let unit = layout_line("ab", lookup, Vec3::ZERO, Vec2::ONE, Color::WHITE);
        let double = layout_line("ab", lookup, Vec3::ZERO, Vec2::splat(2.0), Color::WHITE);

        assert!((double[0].center.x - unit[0].center.x * 2.0).abs() < 1e-4);
        assert_eq!(double[0].size, unit[0].size * 2.0);
    }

    #[test]
    fn caps_center_on_position_y() {
        let placed = layout_line("aa", lookup, Vec3::new(0.0, 5.0, 0.0), Vec2::ONE, Color::WHITE);

        // bearing.y == size.y == extent height: glyph centers land on the
        // requested y.
        for glyph in placed {
            assert!((glyph.center.y - 5.0).abs() < 1e-4);
        }
    }
}
