//! CPU-side quad batch accumulator.
//!
//! `QuadBatch` is the pure core of the batch renderer: it stages vertices,
//! counts indices, and manages the bounded table of texture slots for the
//! batch currently being accumulated. It never touches the GPU — the
//! renderer drains it on flush — which keeps every capacity and slot-reuse
//! rule unit-testable.
//!
//! Invariants between flushes:
//! - `index_count <= MAX_INDICES` and `vertices.len() <= MAX_VERTICES`
//! - slot 0 always holds the white fallback texture
//! - slots `1..next_slot` hold distinct texture ids

use glam::{Vec2, Vec3};
use std::fmt;

use crate::paint::Color;

use super::texture::TextureId;
use super::vertex::Vertex;

/// Maximum quads accumulated before a flush is forced.
pub const MAX_QUADS: usize = 10_000;
/// Four vertices per quad.
pub const MAX_VERTICES: usize = MAX_QUADS * 4;
/// Six indices per quad (two CCW triangles).
pub const MAX_INDICES: usize = MAX_QUADS * 6;

/// Texcoords covering a whole texture, corner order BL, BR, TR, TL.
pub const DEFAULT_TEX_COORDS: [Vec2; 4] = [
    Vec2::new(0.0, 0.0),
    Vec2::new(1.0, 0.0),
    Vec2::new(1.0, 1.0),
    Vec2::new(0.0, 1.0),
];

/// The batch cannot take another quad; flush and retry.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BatchFull;

impl fmt::Display for BatchFull {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "quad batch is at capacity")
    }
}

impl std::error::Error for BatchFull {}

/// Result of asking the slot table for a texture.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SlotResolution {
    /// The texture was already bound in this batch at the given slot.
    Reused(u32),
    /// The texture was bound into a fresh slot.
    Bound(u32),
    /// The slot table is exhausted; flush and retry.
    Full,
}

/// Accumulates quads and texture bindings for one flush.
pub struct QuadBatch {
    vertices: Vec<Vertex>,
    index_count: u32,

    /// Texture ids per slot. Slot 0 is the white fallback; entries at or
    /// above `next_slot` are stale leftovers from earlier batches and are
    /// never read.
    slots: Vec<TextureId>,
    next_slot: usize,
}

impl QuadBatch {
    /// Creates a batch with `max_texture_units` slots (clamped to `2..=32`,
    /// slot 0 reserved for `white`).
    pub fn new(white: TextureId, max_texture_units: usize) -> Self {
        let max_slots = max_texture_units.clamp(2, 32);

        Self {
            vertices: Vec::with_capacity(MAX_VERTICES),
            index_count: 0,
            slots: vec![white; max_slots],
            next_slot: 1,
        }
    }

    /// Appends one quad (four vertices, six indices).
    ///
    /// Capacity is checked here, not by callers: when the batch is full the
    /// quad is not added and `BatchFull` tells the caller to flush and
    /// retry.
    pub fn try_push_quad(
        &mut self,
        corners: &[Vec3; 4],
        color: Color,
        texcoords: &[Vec2; 4],
        slot: u32,
    ) -> Result<(), BatchFull> {
        if self.index_count as usize + 6 > MAX_INDICES {
            return Err(BatchFull);
        }
        debug_assert!((slot as usize) < self.next_slot, "quad references an unbound slot");

        for (corner, texcoord) in corners.iter().zip(texcoords.iter()) {
            self.vertices.push(Vertex::new(*corner, *texcoord, color, slot));
        }
        self.index_count += 6;

        Ok(())
    }

    /// Finds or binds a slot for `id`.
    ///
    /// Slots `1..next_slot` are scanned low-to-high and the first match
    /// wins; ties are impossible since bound slots are distinct by
    /// construction. Slot 0 (white) never participates.
    pub fn resolve_slot(&mut self, id: TextureId) -> SlotResolution {
        for slot in 1..self.next_slot {
            if self.slots[slot] == id {
                return SlotResolution::Reused(slot as u32);
            }
        }

        if self.next_slot >= self.slots.len() {
            return SlotResolution::Full;
        }

        let slot = self.next_slot;
        self.slots[slot] = id;
        self.next_slot += 1;

        SlotResolution::Bound(slot as u32)
    }

    /// Rewinds the batch after a flush: cursor to the base of the staging
    /// buffer, no indices, slot table back to just the white fallback.
    pub fn reset(&mut self) {
        self.vertices.clear();
        self.index_count = 0;
        self.next_slot = 1;
    }

    pub fn is_empty(&self) -> bool {
        self.index_count == 0
    }

    pub fn index_count(&self) -> u32 {
        self.index_count
    }

    pub fn quad_count(&self) -> u32 {
        self.index_count / 6
    }

    /// Number of live slots (including the white fallback).
    pub fn bound_slot_count(&self) -> usize {
        self.next_slot
    }

    /// The staged vertex span as bytes — exactly what one flush uploads.
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    #[cfg(test)]
    pub(crate) fn vertices(&self) -> &[Vertex] {
        &self.vertices
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit_corners() -> [Vec3; 4] {
        [
            Vec3::new(-0.5, -0.5, 0.0),
            Vec3::new(0.5, -0.5, 0.0),
            Vec3::new(0.5, 0.5, 0.0),
            Vec3::new(-0.5, 0.5, 0.0),
        ]
    }

    fn push(batch: &mut QuadBatch, slot: u32) -> Result<(), BatchFull> {
        batch.try_push_quad(&unit_corners(), Color::WHITE, &DEFAULT_TEX_COORDS, slot)
    }

    fn batch() -> QuadBatch {
        QuadBatch::new(TextureId::next(), 16)
    }

    #[test]
    fn push_advances_counts() {
        let mut batch = batch();

        push(&mut batch, 0).unwrap();
        push(&mut batch, 0).unwrap();

        assert_eq!(batch.index_count(), 12);
        assert_eq!(batch.quad_count(), 2);
        assert_eq!(batch.vertices().len(), 8);
        assert_eq!(batch.vertex_bytes().len(), 8 * std::mem::size_of::<Vertex>());
    }

    #[test]
    fn under_capacity_never_fills() {
        // Everything below MAX_QUADS accumulates into a single batch: the
        // driving scene performs exactly one flush at end-of-scene.
        let mut batch = batch();

        for _ in 0..MAX_QUADS {
            push(&mut batch, 0).unwrap();
        }

        assert_eq!(batch.index_count() as usize, MAX_INDICES);
    }

    #[test]
    fn overflowing_quad_is_rejected_not_truncated() {
        let mut batch = batch();

        for _ in 0..MAX_QUADS {
            push(&mut batch, 0).unwrap();
        }

        let vertices_before = batch.vertices().len();
        assert_eq!(push(&mut batch, 0), Err(BatchFull));
        assert_eq!(batch.vertices().len(), vertices_before);
        assert_eq!(batch.index_count() as usize, MAX_INDICES);
    }

    #[test]
    fn flush_count_is_ceil_of_total_over_capacity() {
        // Emulates the scene's flush-and-retry loop for 2.5 batches worth of
        // quads and checks the number of flushes matches ceil(total / max).
        let mut batch = batch();
        let total = MAX_QUADS * 2 + MAX_QUADS / 2;
        let mut flushes = 0;

        for _ in 0..total {
            loop {
                match push(&mut batch, 0) {
                    Ok(()) => break,
                    Err(BatchFull) => {
                        flushes += 1;
                        batch.reset();
                    }
                }
            }
        }
        if !batch.is_empty() {
            flushes += 1; // end-of-scene flush
        }

        assert_eq!(flushes, total.div_ceil(MAX_QUADS));
    }

    #[test]
    fn same_texture_reuses_slot() {
        let mut batch = batch();
        let id = TextureId::next();

        let first = batch.resolve_slot(id);
        let second = batch.resolve_slot(id);

        assert_eq!(first, SlotResolution::Bound(1));
        assert_eq!(second, SlotResolution::Reused(1));
        assert_eq!(batch.bound_slot_count(), 2);
    }

    #[test]
    fn distinct_textures_get_increasing_slots() {
        let mut batch = batch();

        assert_eq!(batch.resolve_slot(TextureId::next()), SlotResolution::Bound(1));
        assert_eq!(batch.resolve_slot(TextureId::next()), SlotResolution::Bound(2));
        assert_eq!(batch.resolve_slot(TextureId::next()), SlotResolution::Bound(3));
    }

    #[test]
    fn slot_table_reports_full_at_capacity() {
        let mut batch = QuadBatch::new(TextureId::next(), 4);

        for expected in 1..4 {
            assert_eq!(
                batch.resolve_slot(TextureId::next()),
                SlotResolution::Bound(expected)
            );
        }

        assert_eq!(batch.resolve_slot(TextureId::next()), SlotResolution::Full);

        // A texture bound before the table filled is still reusable.
        let bound = batch.slots[2];
        assert_eq!(batch.resolve_slot(bound), SlotResolution::Reused(2));
    }

    #[test]
    fn reset_matches_fresh_batch() {
        let mut batch = batch();

        push(&mut batch, 0).unwrap();
        batch.resolve_slot(TextureId::next());
        batch.reset();

        assert!(batch.is_empty());
        assert_eq!(batch.index_count(), 0);
        assert_eq!(batch.bound_slot_count(), 1);
        assert!(batch.vertex_bytes().is_empty());
    }

    #[test]
    fn rebinding_after_reset_starts_at_slot_one() {
        let mut batch = batch();
        let a = TextureId::next();
        let b = TextureId::next();

        batch.resolve_slot(a);
        batch.resolve_slot(b);
        batch.reset();

        // Stale entries must not be reused for a different texture.
        assert_eq!(batch.resolve_slot(b), SlotResolution::Bound(1));
    }

    #[test]
    fn text_run_survives_a_mid_batch_flush() {
        // Mirrors the scene's glyph loop: resolve the atlas slot, push, and
        // on BatchFull flush (reset) and re-resolve before retrying. Every
        // glyph lands exactly once and the run continues in the new batch.
        let mut batch = batch();
        let atlas = TextureId::next();

        for _ in 0..MAX_QUADS - 3 {
            push(&mut batch, 0).unwrap();
        }

        let mut emitted = 0;
        let mut flushes = 0;
        for _ in 0..8 {
            loop {
                let slot = match batch.resolve_slot(atlas) {
                    SlotResolution::Reused(slot) | SlotResolution::Bound(slot) => slot,
                    SlotResolution::Full => {
                        flushes += 1;
                        batch.reset();
                        continue;
                    }
                };
                match push(&mut batch, slot) {
                    Ok(()) => {
                        emitted += 1;
                        break;
                    }
                    Err(BatchFull) => {
                        flushes += 1;
                        batch.reset();
                    }
                }
            }
        }

        assert_eq!(emitted, 8);
        assert_eq!(flushes, 1);
        assert_eq!(batch.quad_count(), 5);
        // The atlas was rebound into the fresh batch at slot 1.
        assert_eq!(batch.resolve_slot(atlas), SlotResolution::Reused(1));
    }

    #[test]
    fn slot_count_is_clamped() {
        let batch = QuadBatch::new(TextureId::next(), 64);
        assert_eq!(batch.slots.len(), 32);

        let batch = QuadBatch::new(TextureId::next(), 0);
        assert_eq!(batch.slots.len(), 2);
    }
}
