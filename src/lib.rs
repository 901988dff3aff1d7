#![warn(missing_docs)]

//! Tiled TMX/JSON map loader with an atlas-batched tile renderer for Macroquad.
//!
//! A [`Map`] is decoded once from a document, then drawn every frame by a
//! [`MapRenderer`] that groups tiles into one draw call per run of sprites
//! sharing an atlas texture. Graphics go through [`GraphicsBackend`];
//! [`MacroquadBackend`] draws on screen, [`HeadlessBackend`] only records.

mod atlas;
mod command;
mod error;
mod ir_map;
mod layer;
mod loader {
    pub mod json_loader;
    pub mod tmx_loader;
}
mod map;
mod render {
    pub mod atlas_cache;
    pub mod backend;
    pub mod batch;
    pub mod cull;
    pub mod headless;
    pub mod macroquad_backend;
}
mod renderer;
mod resource;
mod session;
mod tile_id;
mod tileset;

pub use atlas::AtlasResolver;
pub use command::{DrawRequest, ResolvedTile, TileRegion};
pub use error::{AssetError, LayerError, MapError};
pub use layer::TileLayer;
pub use map::Map;
pub use render::atlas_cache::{AtlasCache, AtlasTexture};
pub use render::backend::GraphicsBackend;
pub use render::batch::{BatchFrame, FrameStats, SpriteBatch, SpriteVertex};
pub use render::headless::{GfxCall, HeadlessBackend};
pub use render::macroquad_backend::MacroquadBackend;
pub use renderer::{MapRenderer, RenderConfig};
pub use resource::{AssetSource, FsAssets, ImageData, MemoryAssets, Resource, ResourceCache};
pub use session::TileSession;
pub use tile_id::{FlipFlags, TileId, FLIP_D, FLIP_H, FLIP_V, GID_MASK};
pub use tileset::{AtlasId, AtlasImage, Tileset};
