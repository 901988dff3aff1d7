use std::mem;

use bytemuck::Zeroable;

use macroquad::prelude::{Color, Rect, BLACK};

use super::atlas_cache::AtlasCache;
use super::backend::GraphicsBackend;
use crate::command::DrawRequest;
use crate::tileset::AtlasId;

/// Batch capacity used when none is configured.
pub const DEFAULT_BATCH_CAPACITY: usize = 4000;
/// Two triangles per sprite.
pub const VERTICES_PER_SPRITE: usize = 6;

/// Vertex layout handed to the backend: position, color, uv.
#[repr(C)]
#[derive(Debug, Copy, Clone, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct SpriteVertex {
    /// World position.
    pub position: [f32; 2],
    /// RGBA tint.
    pub color: [f32; 4],
    /// Normalized texture coordinates.
    pub uv: [f32; 2],
}

/// Counters for one frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Requests accepted by `submit`.
    pub sprites: usize,
    /// Calls to the backend's `draw_triangles`.
    pub draw_calls: usize,
    /// Atlas changes, the first bind of the frame included.
    pub texture_binds: usize,
    /// Times the pending queue was turned into vertices.
    pub flushes: usize,
    /// Non-empty cells that could not be drawn.
    pub skipped_cells: usize,
}

/// Fixed-capacity sprite queue plus the vertex buffer it flushes into.
#[derive(Debug)]
pub struct SpriteBatch {
    capacity: usize,
    pending: Vec<DrawRequest>,
    vertices: Box<[SpriteVertex]>,
    vertex_count: usize,
    stats: FrameStats,
    clear_color: Color,
}

impl SpriteBatch {
    /// Capacity is in sprites; 0 is treated as 1.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        SpriteBatch {
            capacity,
            pending: Vec::with_capacity(capacity),
            vertices: vec![SpriteVertex::zeroed(); capacity * VERTICES_PER_SPRITE].into_boxed_slice(),
            vertex_count: 0,
            stats: FrameStats::default(),
            clear_color: BLACK,
        }
    }

    /// Color the draw target is cleared to by [`begin`](Self::begin).
    pub fn with_clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self
    }

    /// Sprites queued before a flush is forced.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Stats of the last finished (or current) frame.
    pub fn stats(&self) -> FrameStats {
        self.stats
    }

    /// Clears the draw target and opens a frame. Submissions go through the
    /// returned guard until [`BatchFrame::end`].
    pub fn begin<'a, G: GraphicsBackend>(
        &'a mut self,
        gfx: &'a mut G,
        atlases: &'a AtlasCache<G::Texture>,
    ) -> BatchFrame<'a, G> {
        gfx.clear(self.clear_color);
        self.pending.clear();
        self.vertex_count = 0;
        self.stats = FrameStats::default();
        BatchFrame {
            batch: self,
            gfx,
            atlases,
        }
    }
}

impl Default for SpriteBatch {
    fn default() -> Self {
        Self::new(DEFAULT_BATCH_CAPACITY)
    }
}

/// An open frame on a [`SpriteBatch`].
#[must_use = "a frame must be finished with `end()` or queued sprites are lost"]
pub struct BatchFrame<'a, G: GraphicsBackend> {
    batch: &'a mut SpriteBatch,
    gfx: &'a mut G,
    atlases: &'a AtlasCache<G::Texture>,
}

impl<'a, G: GraphicsBackend> BatchFrame<'a, G> {
    /// Queues a sprite, flushing first when the batch is full.
    pub fn submit(&mut self, req: DrawRequest) {
        if self.batch.pending.len() >= self.batch.capacity {
            self.flush();
        }
        self.batch.pending.push(req);
        self.batch.stats.sprites += 1;
    }

    /// Records a cell that was not drawn.
    pub fn skip_cell(&mut self) {
        self.batch.stats.skipped_cells += 1;
    }

    /// Sprites queued since the last flush.
    pub fn pending(&self) -> usize {
        self.batch.pending.len()
    }

    /// Turns queued sprites into draw calls, one per run of equal atlases.
    pub fn flush(&mut self) {
        let SpriteBatch {
            pending,
            vertices,
            vertex_count,
            stats,
            ..
        } = &mut *self.batch;
        if pending.is_empty() {
            return;
        }
        stats.flushes += 1;

        let mut bound: Option<(AtlasId, u32, u32)> = None;
        for req in pending.drain(..) {
            let (atlas_w, atlas_h) = match bound {
                Some((id, w, h)) if id == req.atlas => (w, h),
                _ => {
                    let Some(tex) = self.atlases.get(req.atlas) else {
                        // no texture for this atlas; the sprite is dropped
                        continue;
                    };
                    emit(self.gfx, vertices, vertex_count, stats);
                    self.gfx.bind_texture(&tex.texture);
                    stats.texture_binds += 1;
                    bound = Some((req.atlas, tex.width, tex.height));
                    (tex.width, tex.height)
                }
            };

            let end = *vertex_count + VERTICES_PER_SPRITE;
            debug_assert!(end <= vertices.len());
            vertices[*vertex_count..end].copy_from_slice(&quad(&req, atlas_w, atlas_h));
            *vertex_count = end;
        }
        emit(self.gfx, vertices, vertex_count, stats);
    }

    /// Flushes what is left and returns the frame's stats.
    pub fn end(mut self) -> FrameStats {
        self.flush();
        self.batch.stats
    }
}

fn emit<G: GraphicsBackend>(
    gfx: &mut G,
    vertices: &[SpriteVertex],
    vertex_count: &mut usize,
    stats: &mut FrameStats,
) {
    if *vertex_count == 0 {
        return;
    }
    gfx.upload_vertex_bytes(bytemuck::cast_slice(&vertices[..*vertex_count]));
    gfx.draw_triangles(*vertex_count);
    stats.draw_calls += 1;
    *vertex_count = 0;
}

/// Six vertices for one sprite: (tl, bl, br) and (tl, br, tr).
fn quad(req: &DrawRequest, atlas_w: u32, atlas_h: u32) -> [SpriteVertex; VERTICES_PER_SPRITE] {
    let (u0, v0, u1, v1) = req.src.uv(atlas_w, atlas_h);
    let (mut tl, mut tr, mut bl, mut br) = ([u0, v0], [u1, v0], [u0, v1], [u1, v1]);
    let flip = req.flip;
    if flip.any() {
        if flip.diagonal {
            mem::swap(&mut tr, &mut bl);
        }
        if flip.horizontal {
            mem::swap(&mut tl, &mut tr);
            mem::swap(&mut bl, &mut br);
        }
        if flip.vertical {
            mem::swap(&mut tl, &mut bl);
            mem::swap(&mut tr, &mut br);
        }
    }

    let color = [req.tint.r, req.tint.g, req.tint.b, req.tint.a];
    let Rect { x, y, w, h } = req.dest;
    let v = |px: f32, py: f32, uv: [f32; 2]| SpriteVertex {
        position: [px, py],
        color,
        uv,
    };
    [
        v(x, y, tl),
        v(x, y + h, bl),
        v(x + w, y + h, br),
        v(x, y, tl),
        v(x + w, y + h, br),
        v(x + w, y, tr),
    ]
}
