use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::atlas::AtlasResolver;
use crate::command::ResolvedTile;
use crate::error::{LayerError, MapError};
use crate::ir_map::IrMap;
use crate::layer::TileLayer;
use crate::loader::{json_loader::decode_json_to_ir, tmx_loader::decode_tmx_to_ir};
use crate::resource::ResourceCache;
use crate::tile_id::TileId;
use crate::tileset::{intern_atlas, AtlasImage, Tileset};

/// A loaded, immutable tile map.
#[derive(Debug, Clone)]
pub struct Map {
    /// Width in cells.
    pub width: u32,
    /// Height in cells.
    pub height: u32,
    /// Cell width in pixels.
    pub tile_w: u32,
    /// Cell height in pixels.
    pub tile_h: u32,
    atlases: Vec<AtlasImage>,
    tilesets: Vec<Tileset>,
    layers: Vec<TileLayer>,
    resolver: AtlasResolver,
    skipped: Vec<LayerError>,
}

impl Map {
    /// Loads a `.tmx`, `.json` or `.tmj` map through `resources`.
    pub fn load<P: AsRef<Path>>(path: P, resources: &mut ResourceCache) -> Result<Self, MapError> {
        let path = path.as_ref();
        let decode = match path.extension().and_then(|e| e.to_str()) {
            Some("tmx") => decode_tmx_to_ir,
            Some("json") | Some("tmj") => decode_json_to_ir,
            _ => return Err(MapError::UnsupportedFormat(path.display().to_string())),
        };

        let ir = decode(resources.tiled_document(path)?)?;

        let map_dir = path
            .parent()
            .map(|d| d.to_path_buf())
            .unwrap_or_else(|| PathBuf::from("./"));

        let map = Self::from_ir(ir, &map_dir)?;
        info!(
            "loaded {}: {} tilesets, {} layers ({} skipped)",
            path.display(),
            map.tilesets.len(),
            map.layers.len(),
            map.skipped.len()
        );
        Ok(map)
    }

    /// Parses TMX text; image paths are taken relative to `base_dir`.
    pub fn from_tmx_str(text: &str, base_dir: &Path) -> Result<Self, MapError> {
        Self::from_ir(decode_tmx_to_ir(text)?, base_dir)
    }

    /// Parses Tiled JSON text; image paths are taken relative to `base_dir`.
    pub fn from_json_str(text: &str, base_dir: &Path) -> Result<Self, MapError> {
        Self::from_ir(decode_json_to_ir(text)?, base_dir)
    }

    /// Validates tilesets (fatal on error) and decodes layers (dropped on error).
    pub(crate) fn from_ir(ir: IrMap, base_dir: &Path) -> Result<Self, MapError> {
        let mut atlases = Vec::new();
        let mut tilesets = Vec::with_capacity(ir.tilesets.len());

        for t in &ir.tilesets {
            let image = t.image.as_ref().ok_or_else(|| MapError::MalformedTileset {
                name: t.name.clone(),
                reason: "no image block".into(),
            })?;
            let atlas = intern_atlas(&mut atlases, base_dir, &image.source, image.width, image.height)?;
            tilesets.push(Tileset::from_ir(t, atlas)?);
        }

        let resolver = AtlasResolver::new(&tilesets)?;

        let mut layers = Vec::with_capacity(ir.layers.len());
        let mut skipped = Vec::new();
        for l in ir.layers {
            match TileLayer::from_ir(l) {
                Ok(layer) => {
                    let unresolved = layer
                        .cells()
                        .filter(|&(_, _, id)| resolver.resolve(id).is_none())
                        .count();
                    if unresolved > 0 {
                        warn!(
                            "layer '{}': {} cells reference ids no tileset covers; they will not be drawn",
                            layer.name, unresolved
                        );
                    }
                    layers.push(layer);
                }
                Err(e) => {
                    warn!("skipping layer: {e}");
                    skipped.push(e);
                }
            }
        }

        Ok(Self {
            width: ir.width,
            height: ir.height,
            tile_w: ir.tile_w,
            tile_h: ir.tile_h,
            atlases,
            tilesets,
            layers,
            resolver,
            skipped,
        })
    }

    /// Atlas and source rectangle for a cell value.
    #[inline]
    pub fn resolve(&self, id: TileId) -> Option<ResolvedTile> {
        self.resolver.resolve(id)
    }

    /// Tileset owning `id`, if any.
    pub fn ts_for_gid(&self, id: TileId) -> Option<&Tileset> {
        self.resolver.tileset_for(id.clean())
    }

    /// Layers in paint order, bottom first.
    pub fn layers(&self) -> &[TileLayer] {
        &self.layers
    }

    /// First layer with the given name.
    pub fn layer(&self, name: &str) -> Option<&TileLayer> {
        self.layers.iter().find(|l| l.name == name)
    }

    /// Tilesets in document order.
    pub fn tilesets(&self) -> &[Tileset] {
        &self.tilesets
    }

    /// Distinct atlas images, indexed by `AtlasId`.
    pub fn atlases(&self) -> &[AtlasImage] {
        &self.atlases
    }

    /// Why layers were dropped during load.
    pub fn skipped_layers(&self) -> &[LayerError] {
        &self.skipped
    }

    /// Map size in pixels. Wide enough for any declared grid.
    pub fn pixel_size(&self) -> (u64, u64) {
        (
            u64::from(self.width) * u64::from(self.tile_w),
            u64::from(self.height) * u64::from(self.tile_h),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::TileRegion;
    use crate::tileset::AtlasId;

    const TWO_SETS: &str = r#"<map width="2" height="1" tilewidth="16" tileheight="16">
 <tileset firstgid="1" name="a" tilewidth="16" tileheight="16" tilecount="4" columns="2">
  <image source="a.png" width="32" height="32"/>
 </tileset>
 <tileset firstgid="5" name="b" tilewidth="16" tileheight="16" tilecount="4" columns="2">
  <image source="a.png" width="32" height="32"/>
 </tileset>
 <tileset firstgid="9" name="c" tilewidth="8" tileheight="8" tilecount="4" columns="2">
  <image source="sub/c.png" width="16" height="16"/>
 </tileset>
 <layer name="l" width="2" height="1"><data encoding="base64">BQAAAAwAAAA=</data></layer>
</map>"#;

    #[test]
    fn shares_atlases_between_tilesets_with_the_same_image() {
        let map = Map::from_tmx_str(TWO_SETS, Path::new("maps")).expect("load");
        assert_eq!(map.atlases().len(), 2);
        assert_eq!(map.tilesets()[0].atlas, map.tilesets()[1].atlas);
        assert_eq!(map.atlases()[1].source, Path::new("maps").join("sub/c.png"));

        let hit = map.resolve(TileId(12)).unwrap();
        assert_eq!(hit.atlas, AtlasId(1));
        assert_eq!(hit.region, TileRegion::new(8, 8, 8, 8));
        assert_eq!(map.ts_for_gid(TileId(5)).map(|t| t.name.as_str()), Some("b"));
        assert_eq!(map.layer("l").map(|l| l.data().to_vec()), Some(vec![5, 12]));
    }

    #[test]
    fn tileset_without_image_is_fatal() {
        let tmx = r#"<map width="1" height="1" tilewidth="8" tileheight="8">
            <tileset firstgid="1" name="ext" tilewidth="8" tileheight="8"/>
        </map>"#;
        let err = Map::from_tmx_str(tmx, Path::new(".")).unwrap_err();
        assert!(matches!(err, MapError::MalformedTileset { ref name, .. } if name == "ext"));
    }

    #[test]
    fn unsupported_extension_is_rejected_before_reading() {
        let mut resources = ResourceCache::from_fs();
        let err = Map::load("foo.tsx", &mut resources).unwrap_err();
        assert!(matches!(err, MapError::UnsupportedFormat(ref p) if p == "foo.tsx"));
        assert!(resources.is_empty());
    }

    #[test]
    fn pixel_size_does_not_overflow_for_huge_grids() {
        let tmx = r#"<map width="100000" height="1" tilewidth="100000" tileheight="16"></map>"#;
        let map = Map::from_tmx_str(tmx, Path::new(".")).unwrap();
        assert_eq!(map.pixel_size(), (10_000_000_000, 16));
    }
}
