use macroquad::prelude::*;

use crate::command::DrawRequest;
use crate::layer::TileLayer;
use crate::map::Map;
use crate::render::atlas_cache::AtlasCache;
use crate::render::backend::GraphicsBackend;
use crate::render::batch::{BatchFrame, FrameStats, SpriteBatch, DEFAULT_BATCH_CAPACITY};
use crate::render::cull::{visible_cells, CellRange};
use crate::resource::ResourceCache;

/// Renderer settings.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RenderConfig {
    /// Sprites per batch before an early flush.
    pub batch_capacity: usize,
    /// Multiplied into every tile; alpha is further scaled by layer opacity.
    pub tint: Color,
    /// Color each frame starts from.
    pub clear_color: Color,
    /// Extra cells drawn around the view in [`MapRenderer::draw_visible_rect`].
    pub cull_margin: u32,
}

impl Default for RenderConfig {
    fn default() -> Self {
        RenderConfig {
            batch_capacity: DEFAULT_BATCH_CAPACITY,
            tint: WHITE,
            clear_color: BLACK,
            cull_margin: 1,
        }
    }
}

impl RenderConfig {
    /// Sets [`batch_capacity`](Self::batch_capacity).
    pub fn with_batch_capacity(mut self, capacity: usize) -> Self {
        self.batch_capacity = capacity;
        self
    }

    /// Sets [`tint`](Self::tint).
    pub fn with_tint(mut self, tint: Color) -> Self {
        self.tint = tint;
        self
    }

    /// Sets [`clear_color`](Self::clear_color).
    pub fn with_clear_color(mut self, color: Color) -> Self {
        self.clear_color = color;
        self
    }

    /// Sets [`cull_margin`](Self::cull_margin).
    pub fn with_cull_margin(mut self, cells: u32) -> Self {
        self.cull_margin = cells;
        self
    }
}

/// Draws a [`Map`] one frame at a time through a [`SpriteBatch`].
///
/// Owns the atlas textures it creates; call [`release`](Self::release) with
/// the same backend before dropping it.
pub struct MapRenderer<T> {
    config: RenderConfig,
    batch: SpriteBatch,
    atlases: AtlasCache<T>,
}

impl<T> MapRenderer<T> {
    /// Renderer with no textures yet; they are created on the first frame.
    pub fn new(config: RenderConfig) -> Self {
        MapRenderer {
            config,
            batch: SpriteBatch::new(config.batch_capacity).with_clear_color(config.clear_color),
            atlases: AtlasCache::new(),
        }
    }

    /// Settings given at construction.
    pub fn config(&self) -> &RenderConfig {
        &self.config
    }

    /// Textures created so far.
    pub fn atlases(&self) -> &AtlasCache<T> {
        &self.atlases
    }

    /// Stats of the last frame.
    pub fn last_frame(&self) -> FrameStats {
        self.batch.stats()
    }

    /// Draws every cell of every visible layer.
    pub fn draw_map<G: GraphicsBackend<Texture = T>>(
        &mut self,
        map: &Map,
        resources: &mut ResourceCache,
        gfx: &mut G,
    ) -> FrameStats {
        self.frame(map, resources, gfx, None)
    }

    /// Draws only the cells overlapping the world-space rectangle
    /// `view_min..view_max`, padded by the configured cull margin.
    pub fn draw_visible_rect<G: GraphicsBackend<Texture = T>>(
        &mut self,
        map: &Map,
        resources: &mut ResourceCache,
        gfx: &mut G,
        view_min: Vec2,
        view_max: Vec2,
    ) -> FrameStats {
        self.frame(map, resources, gfx, Some((view_min, view_max)))
    }

    /// Destroys the atlas textures. Later frames recreate them.
    pub fn release<G: GraphicsBackend<Texture = T>>(&mut self, gfx: &mut G) {
        self.atlases.release(gfx);
    }

    fn frame<G: GraphicsBackend<Texture = T>>(
        &mut self,
        map: &Map,
        resources: &mut ResourceCache,
        gfx: &mut G,
        view: Option<(Vec2, Vec2)>,
    ) -> FrameStats {
        self.atlases.prepare(map.atlases(), resources, gfx);

        let config = self.config;
        let mut frame = self.batch.begin(gfx, &self.atlases);
        let cell = vec2(map.tile_w as f32, map.tile_h as f32);
        for layer in map.layers().iter().filter(|l| l.visible) {
            let range = match view {
                Some((min, max)) => visible_cells(
                    min,
                    max,
                    layer.offset,
                    cell,
                    layer.width,
                    layer.height,
                    config.cull_margin,
                ),
                None => CellRange::full(layer.width, layer.height),
            };
            if range.is_empty() {
                continue;
            }
            draw_layer(&mut frame, map, layer, range, &config, &self.atlases);
        }
        frame.end()
    }
}

fn draw_layer<G: GraphicsBackend>(
    frame: &mut BatchFrame<'_, G>,
    map: &Map,
    layer: &TileLayer,
    range: CellRange,
    config: &RenderConfig,
    atlases: &AtlasCache<G::Texture>,
) {
    let cell = vec2(map.tile_w as f32, map.tile_h as f32);
    let mut tint = config.tint;
    tint.a *= layer.opacity;

    for y in range.y0..range.y1 {
        for x in range.x0..range.x1 {
            let Some(id) = layer.tile_at(x, y) else { continue };
            if id.is_empty() {
                continue;
            }
            let Some(hit) = map.resolve(id) else {
                frame.skip_cell();
                continue;
            };
            if !atlases.is_ready(hit.atlas) {
                frame.skip_cell();
                continue;
            }

            let src = hit.region;
            // tiles taller than the grid grow upwards from the cell's bottom edge
            let dest = Rect::new(
                layer.offset.x + x as f32 * cell.x,
                layer.offset.y + (y + 1) as f32 * cell.y - src.height as f32,
                src.width as f32,
                src.height as f32,
            );
            frame.submit(DrawRequest {
                atlas: hit.atlas,
                dest,
                src,
                tint,
                flip: id.flags(),
            });
        }
    }
}
