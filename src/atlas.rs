use crate::command::{ResolvedTile, TileRegion};
use crate::error::MapError;
use crate::tile_id::TileId;
use crate::tileset::Tileset;

/// Highest id for which a flat region table is built. Maps with sparser id
/// spaces fall back to a binary search over the tileset ranges.
pub const MAX_TABLE_GID: u32 = 1 << 20;

/// Maps global tile ids to atlas regions.
#[derive(Debug, Clone, Default)]
pub struct AtlasResolver {
    tilesets: Vec<Tileset>, // sorted by first_id, ranges disjoint
    table: Option<Vec<Option<ResolvedTile>>>, // index = gid - 1
}

impl AtlasResolver {
    /// Builds the resolver, rejecting overlapping id ranges.
    pub fn new(tilesets: &[Tileset]) -> Result<Self, MapError> {
        let mut sorted = tilesets.to_vec();
        sorted.sort_by_key(|t| t.first_id);

        for pair in sorted.windows(2) {
            let (a, b) = (&pair[0], &pair[1]);
            if b.first_id <= a.last_id {
                return Err(MapError::MalformedTileset {
                    name: b.name.clone(),
                    reason: format!(
                        "ids {}..={} overlap tileset '{}' ({}..={})",
                        b.first_id, b.last_id, a.name, a.first_id, a.last_id
                    ),
                });
            }
        }

        let max_gid = sorted.last().map(|t| t.last_id).unwrap_or(0);
        let table = (max_gid <= MAX_TABLE_GID).then(|| {
            let mut table = vec![None; max_gid as usize];
            for ts in &sorted {
                for gid in ts.first_id..=ts.last_id {
                    table[(gid - 1) as usize] = region_in(ts, gid);
                }
            }
            table
        });

        Ok(AtlasResolver {
            tilesets: sorted,
            table,
        })
    }

    /// Atlas and source rectangle for `id`; `None` for empty or uncovered ids.
    #[inline]
    pub fn resolve(&self, id: TileId) -> Option<ResolvedTile> {
        let gid = id.clean();
        if gid == 0 {
            return None;
        }
        match &self.table {
            Some(table) => table.get((gid - 1) as usize).copied().flatten(),
            None => self.tileset_for(gid).and_then(|ts| region_in(ts, gid)),
        }
    }

    /// Tileset whose range contains `gid` (flags stripped).
    pub fn tileset_for(&self, gid: u32) -> Option<&Tileset> {
        let idx = self.tilesets.partition_point(|t| t.first_id <= gid);
        let ts = self.tilesets.get(idx.checked_sub(1)?)?;
        ts.contains(gid).then_some(ts)
    }

    /// Tilesets in id order.
    pub fn tilesets(&self) -> &[Tileset] {
        &self.tilesets
    }

    /// Whether lookups go through the precomputed table.
    pub fn has_table(&self) -> bool {
        self.table.is_some()
    }
}

fn region_in(ts: &Tileset, gid: u32) -> Option<ResolvedTile> {
    let (start_x, start_y) = ts.tile_origin(gid)?;
    Some(ResolvedTile {
        atlas: ts.atlas,
        region: TileRegion::new(start_x, start_y, ts.tile_w, ts.tile_h),
    })
}
