use std::path::{Path, PathBuf};

use log::warn;

use crate::error::MapError;
use crate::ir_map::IrTileset;

/// Index of an atlas image within its map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AtlasId(pub u16);

/// One texture atlas shared by the tilesets that point at it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtlasImage {
    /// Identifier used by the batcher and the atlas cache.
    pub id: AtlasId,
    /// Declared pixel width.
    pub width: u32,
    /// Declared pixel height.
    pub height: u32,
    /// Image path, already joined with the map directory.
    pub source: PathBuf,
}

/// A contiguous range of global ids backed by a grid of tiles in one atlas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tileset {
    /// Name from the document, possibly empty.
    pub name: String,
    /// First global id of the range, inclusive.
    pub first_id: u32,
    /// Last global id of the range, inclusive.
    pub last_id: u32,
    /// Atlas image holding the tiles.
    pub atlas: AtlasId,
    /// Tile width in pixels.
    pub tile_w: u32,
    /// Tile height in pixels.
    pub tile_h: u32,
    /// Columns actually present in the atlas image.
    pub columns: u32,
    /// Tiles in the atlas grid, `last_id - first_id + 1`.
    pub tile_count: u32,
    /// Pixels between neighbouring tiles.
    pub spacing: u32,
    /// Pixels around the tile grid.
    pub margin: u32,
}

/// Number of whole tiles of size `tile` fitting along an atlas side.
fn tiles_along(side: u32, tile: u32, spacing: u32, margin: u32) -> u32 {
    let usable = side
        .saturating_sub(margin.saturating_mul(2))
        .saturating_add(spacing);
    usable / tile.saturating_add(spacing)
}

impl Tileset {
    /// Validates a declared tileset and computes its id range.
    ///
    /// `atlas` must already be registered for the tileset's image; images are
    /// deduplicated by the caller.
    pub(crate) fn from_ir(ir: &IrTileset, atlas: AtlasId) -> Result<Self, MapError> {
        let malformed = |reason: String| MapError::MalformedTileset {
            name: ir.name.clone(),
            reason,
        };

        if ir.tile_w == 0 || ir.tile_h == 0 {
            return Err(malformed(format!(
                "tile size {}x{} has a zero side",
                ir.tile_w, ir.tile_h
            )));
        }
        if ir.tile_w.checked_add(ir.spacing).is_none() || ir.tile_h.checked_add(ir.spacing).is_none() {
            return Err(malformed(format!(
                "tile size {}x{} plus spacing {} overflows",
                ir.tile_w, ir.tile_h, ir.spacing
            )));
        }
        if ir.first_gid == 0 {
            return Err(malformed("firstgid must be at least 1".into()));
        }
        let image = ir
            .image
            .as_ref()
            .ok_or_else(|| malformed("no image block".into()))?;

        let cols = tiles_along(image.width, ir.tile_w, ir.spacing, ir.margin);
        let rows = tiles_along(image.height, ir.tile_h, ir.spacing, ir.margin);
        if cols == 0 || rows == 0 {
            return Err(malformed(format!(
                "image {}x{} cannot hold a {}x{} tile",
                image.width, image.height, ir.tile_w, ir.tile_h
            )));
        }

        match ir.columns {
            Some(declared) if declared > cols => {
                return Err(malformed(format!(
                    "declares {declared} columns but the image holds {cols}"
                )));
            }
            Some(declared) if declared != 0 && declared != cols => {
                warn!(
                    "tileset '{}' declares {} columns, image holds {}; using the image",
                    ir.name, declared, cols
                );
            }
            _ => {}
        }

        let tile_count = cols
            .checked_mul(rows)
            .ok_or_else(|| malformed("tile count overflows u32".into()))?;
        if let Some(declared) = ir.tilecount {
            if declared != tile_count {
                warn!(
                    "tileset '{}' declares {} tiles, image holds {}",
                    ir.name, declared, tile_count
                );
            }
        }

        let last_id = ir
            .first_gid
            .checked_add(tile_count - 1)
            .ok_or_else(|| malformed("id range overflows u32".into()))?;

        Ok(Tileset {
            name: ir.name.clone(),
            first_id: ir.first_gid,
            last_id,
            atlas,
            tile_w: ir.tile_w,
            tile_h: ir.tile_h,
            columns: cols,
            tile_count,
            spacing: ir.spacing,
            margin: ir.margin,
        })
    }

    /// Whether `gid` (flags already stripped) falls in this tileset's range.
    #[inline]
    pub fn contains(&self, gid: u32) -> bool {
        gid >= self.first_id && gid <= self.last_id
    }

    /// Pixel origin of tile `gid` inside the atlas, or `None` outside the range.
    pub fn tile_origin(&self, gid: u32) -> Option<(u32, u32)> {
        if !self.contains(gid) {
            return None;
        }
        let local = gid - self.first_id;
        let col = u64::from(local % self.columns);
        let row = u64::from(local / self.columns);
        let margin = u64::from(self.margin);
        let x = margin + col * (u64::from(self.tile_w) + u64::from(self.spacing));
        let y = margin + row * (u64::from(self.tile_h) + u64::from(self.spacing));
        Some((u32::try_from(x).ok()?, u32::try_from(y).ok()?))
    }
}

/// Registers `source` (relative to `base_dir`) in `atlases`, reusing an
/// existing entry for the same path.
pub(crate) fn intern_atlas(
    atlases: &mut Vec<AtlasImage>,
    base_dir: &Path,
    source: &str,
    width: u32,
    height: u32,
) -> Result<AtlasId, MapError> {
    let path = base_dir.join(source);
    if let Some(existing) = atlases.iter().find(|a| a.source == path) {
        return Ok(existing.id);
    }
    let index = u16::try_from(atlases.len()).map_err(|_| MapError::MalformedTileset {
        name: source.to_owned(),
        reason: "too many distinct atlas images".into(),
    })?;
    let id = AtlasId(index);
    atlases.push(AtlasImage {
        id,
        width,
        height,
        source: path,
    });
    Ok(id)
}
