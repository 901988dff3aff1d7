// src/ir_map.rs
use macroquad::prelude::*;

/// Canonical, format-agnostic map. Both the TMX and the JSON front-end lower to this.
#[derive(Debug, Clone)]
pub struct IrMap {
    pub width: u32,
    pub height: u32,
    pub tile_w: u32,
    pub tile_h: u32,
    pub tilesets: Vec<IrTileset>, // document order
    pub layers: Vec<IrLayer>,     // draw order: array order
}

/// One tileset exactly as declared; nothing is validated yet.
#[derive(Debug, Clone)]
pub struct IrTileset {
    pub first_gid: u32,
    pub name: String,
    pub tile_w: u32,
    pub tile_h: u32,
    pub tilecount: Option<u32>,
    pub columns: Option<u32>, // 0 and None both mean "derive from the image"
    pub spacing: u32,
    pub margin: u32,
    pub image: Option<IrImage>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IrImage {
    pub source: String, // relative to the map document
    pub width: u32,
    pub height: u32,
}

/// Tile payload of a layer before decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IrTileData {
    /// Text payload with its declared encoding and compression.
    Encoded {
        encoding: Option<String>,
        compression: Option<String>,
        payload: String,
    },
    /// Ids given directly (JSON integer arrays).
    Gids(Vec<u32>),
    /// No data block in the document.
    Missing,
}

#[derive(Debug, Clone)]
pub struct IrLayer {
    pub name: String,
    pub width: u32,
    pub height: u32,
    pub visible: bool,
    pub opacity: f32,
    pub offset: Vec2, // world offset for this layer
    pub data: IrTileData,
}
