use macroquad::prelude::{Color, Rect};

use crate::tile_id::FlipFlags;
use crate::tileset::AtlasId;

/// One drawable sprite, queued for the batcher and consumed at flush.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawRequest {
    /// Atlas the source rectangle refers to.
    pub atlas: AtlasId,
    /// Destination in world units.
    pub dest: Rect,
    /// Source rectangle in atlas pixels.
    pub src: TileRegion,
    /// Vertex color, multiplied with the texel.
    pub tint: Color,
    /// Mirroring taken from the cell's id.
    pub flip: FlipFlags,
}

/// Pixel rectangle of one tile inside its atlas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileRegion {
    /// Left edge in atlas pixels.
    pub start_x: u32,
    /// Top edge in atlas pixels.
    pub start_y: u32,
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl TileRegion {
    /// Region with its top-left corner at `(start_x, start_y)`.
    pub const fn new(start_x: u32, start_y: u32, width: u32, height: u32) -> Self {
        TileRegion {
            start_x,
            start_y,
            width,
            height,
        }
    }

    /// Whether the region lies fully inside an atlas of the given size.
    pub fn fits_within(&self, atlas_w: u32, atlas_h: u32) -> bool {
        self.start_x as u64 + self.width as u64 <= atlas_w as u64
            && self.start_y as u64 + self.height as u64 <= atlas_h as u64
    }

    /// Normalized `(u0, v0, u1, v1)` texture coordinates for an atlas of the given size.
    pub fn uv(&self, atlas_w: u32, atlas_h: u32) -> (f32, f32, f32, f32) {
        let aw = atlas_w.max(1) as f32;
        let ah = atlas_h.max(1) as f32;
        (
            self.start_x as f32 / aw,
            self.start_y as f32 / ah,
            (self.start_x as f32 + self.width as f32) / aw,
            (self.start_y as f32 + self.height as f32) / ah,
        )
    }
}

/// Resolution of a global id: which atlas, and where inside it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedTile {
    /// Atlas holding the tile.
    pub atlas: AtlasId,
    /// Where the tile sits in that atlas.
    pub region: TileRegion,
}
