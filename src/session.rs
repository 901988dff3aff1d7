use std::path::Path;

use log::info;
use macroquad::prelude::Vec2;

use crate::error::MapError;
use crate::map::Map;
use crate::render::backend::GraphicsBackend;
use crate::render::batch::FrameStats;
use crate::renderer::{MapRenderer, RenderConfig};
use crate::resource::ResourceCache;

/// A loaded map together with everything needed to draw it.
///
/// Dropping the session destroys its atlas textures and empties the
/// resource cache, so it must be dropped while the graphics context is alive.
pub struct TileSession<G: GraphicsBackend> {
    gfx: G,
    resources: ResourceCache,
    map: Map,
    renderer: MapRenderer<G::Texture>,
    closed: bool,
}

impl<G: GraphicsBackend> TileSession<G> {
    /// Loads the map at `path`. Load errors are returned before any texture
    /// is created.
    pub fn open<P: AsRef<Path>>(
        path: P,
        gfx: G,
        mut resources: ResourceCache,
        config: RenderConfig,
    ) -> Result<Self, MapError> {
        let map = Map::load(path, &mut resources)?;
        Ok(Self::with_map(map, gfx, resources, config))
    }

    /// Wraps an already loaded map.
    pub fn with_map(map: Map, gfx: G, resources: ResourceCache, config: RenderConfig) -> Self {
        TileSession {
            gfx,
            resources,
            map,
            renderer: MapRenderer::new(config),
            closed: false,
        }
    }

    /// Draws the whole map.
    pub fn frame(&mut self) -> FrameStats {
        self.renderer
            .draw_map(&self.map, &mut self.resources, &mut self.gfx)
    }

    /// Draws the part of the map inside `view_min..view_max`.
    pub fn frame_visible(&mut self, view_min: Vec2, view_max: Vec2) -> FrameStats {
        self.renderer.draw_visible_rect(
            &self.map,
            &mut self.resources,
            &mut self.gfx,
            view_min,
            view_max,
        )
    }

    /// The loaded map.
    pub fn map(&self) -> &Map {
        &self.map
    }

    /// The graphics backend.
    pub fn gfx(&self) -> &G {
        &self.gfx
    }

    /// The graphics backend, mutably.
    pub fn gfx_mut(&mut self) -> &mut G {
        &mut self.gfx
    }

    /// The renderer and its atlas cache.
    pub fn renderer(&self) -> &MapRenderer<G::Texture> {
        &self.renderer
    }

    /// Releases textures and cached assets. Safe to call more than once.
    pub fn shutdown(&mut self) {
        if self.closed {
            return;
        }
        self.closed = true;
        self.renderer.release(&mut self.gfx);
        self.resources.clear();
        info!("tile session closed");
    }
}

impl<G: GraphicsBackend> Drop for TileSession<G> {
    fn drop(&mut self) {
        self.shutdown();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::headless::{GfxCall, HeadlessBackend};
    use crate::resource::{ImageData, MemoryAssets};

    const TMX: &str = r#"<map width="1" height="1" tilewidth="8" tileheight="8">
 <tileset firstgid="1" name="t" tilewidth="8" tileheight="8" tilecount="1" columns="1">
  <image source="t.png" width="8" height="8"/>
 </tileset>
 <layer name="l" width="1" height="1"><data encoding="base64">AQAAAA==</data></layer>
</map>"#;

    fn assets() -> ResourceCache {
        ResourceCache::new(
            MemoryAssets::new()
                .with_document("maps/one.tmx", TMX)
                .with_image(
                    "maps/t.png",
                    ImageData {
                        width: 8,
                        height: 8,
                        pixels: vec![0; 8 * 8 * 4],
                    },
                ),
        )
    }

    #[test]
    fn open_draw_and_shut_down() {
        let mut session = TileSession::open(
            "maps/one.tmx",
            HeadlessBackend::new(),
            assets(),
            RenderConfig::default(),
        )
        .unwrap();

        assert_eq!(session.frame().sprites, 1);
        assert_eq!(session.gfx().live_textures(), 1);

        session.shutdown();
        session.shutdown();
        let destroyed = session
            .gfx()
            .calls()
            .iter()
            .filter(|c| matches!(c, GfxCall::DestroyTexture(_)))
            .count();
        assert_eq!(destroyed, 1);
        assert_eq!(session.gfx().live_textures(), 0);
    }

    #[test]
    fn load_errors_surface_before_any_texture_exists() {
        let err = TileSession::open(
            "maps/none.tmx",
            HeadlessBackend::new(),
            assets(),
            RenderConfig::default(),
        )
        .err()
        .unwrap();
        assert!(matches!(err, MapError::Asset(_)));
    }
}
