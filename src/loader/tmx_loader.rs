// src/loader/tmx_loader.rs
use crate::error::MapError;
use crate::ir_map::*;
use log::{debug, warn};
use macroquad::prelude::*;
use quick_xml::events::Event;
use quick_xml::Reader;
use serde::de::IgnoredAny;
use serde::Deserialize;

#[derive(Deserialize)]
struct XmlMap {
    #[serde(rename = "@width")]
    width: u32,
    #[serde(rename = "@height")]
    height: u32,
    #[serde(rename = "@tilewidth")]
    tilewidth: u32,
    #[serde(rename = "@tileheight")]
    tileheight: u32,
    #[serde(rename = "tileset", default)]
    tilesets: Vec<XmlTileset>,
    #[serde(rename = "layer", default)]
    layers: Vec<XmlLayer>,
    #[serde(rename = "group", default)]
    groups: Vec<XmlGroup>,
    #[serde(rename = "objectgroup", default)]
    object_groups: Vec<XmlNamed>,
    #[serde(rename = "imagelayer", default)]
    image_layers: Vec<XmlNamed>,
}

#[derive(Deserialize)]
struct XmlGroup {
    #[serde(rename = "@name", default)]
    name: String,
    #[serde(rename = "layer", default)]
    layers: Vec<IgnoredAny>,
}

#[derive(Deserialize)]
struct XmlNamed {
    #[serde(rename = "@name", default)]
    name: String,
}

#[derive(Deserialize)]
struct XmlTileset {
    #[serde(rename = "@firstgid")]
    firstgid: u32,
    #[serde(rename = "@name", default)]
    name: String,
    #[serde(rename = "@tilewidth", default)]
    tilewidth: u32,
    #[serde(rename = "@tileheight", default)]
    tileheight: u32,
    #[serde(rename = "@tilecount", default)]
    tilecount: Option<u32>,
    #[serde(rename = "@columns", default)]
    columns: Option<u32>,
    #[serde(rename = "@spacing", default)]
    spacing: u32,
    #[serde(rename = "@margin", default)]
    margin: u32,
    #[serde(default)]
    image: Option<XmlImage>,
}

#[derive(Deserialize)]
struct XmlImage {
    #[serde(rename = "@source")]
    source: String,
    #[serde(rename = "@width")]
    width: u32,
    #[serde(rename = "@height")]
    height: u32,
}

#[derive(Deserialize)]
struct XmlLayer {
    #[serde(rename = "@name", default)]
    name: String,
    #[serde(rename = "@width")]
    width: u32,
    #[serde(rename = "@height")]
    height: u32,
    #[serde(rename = "@visible", default = "one_u8")]
    visible: u8,
    #[serde(rename = "@opacity", default = "one")]
    opacity: f32,
    #[serde(rename = "@offsetx", default)]
    offsetx: f32,
    #[serde(rename = "@offsety", default)]
    offsety: f32,
    #[serde(default)]
    data: Option<XmlData>,
}

#[derive(Deserialize)]
struct XmlData {
    #[serde(rename = "@encoding", default)]
    encoding: Option<String>,
    #[serde(rename = "@compression", default)]
    compression: Option<String>,
    #[serde(rename = "$text", default)]
    text: String,
}

fn one() -> f32 {
    1.0
}
fn one_u8() -> u8 {
    1
}

/// Name of the first element of an XML document.
fn root_element_name(text: &str) -> Result<String, MapError> {
    let mut reader = Reader::from_str(text);
    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => {
                return Ok(String::from_utf8_lossy(e.name().as_ref()).into_owned());
            }
            Ok(Event::Eof) => return Err(MapError::Xml("document has no root element".into())),
            Ok(_) => {}
            Err(e) => return Err(MapError::Xml(e.to_string())),
        }
    }
}

/// Lowers a TMX document to the IR. Only the document is read; tileset images
/// are referenced by path and loaded later.
pub fn decode_tmx_to_ir(text: &str) -> Result<IrMap, MapError> {
    let root = root_element_name(text)?;
    if root != "map" {
        return Err(MapError::NotAMapDocument { root });
    }

    let m: XmlMap = quick_xml::de::from_str(text).map_err(|e| MapError::Xml(e.to_string()))?;

    // only top-level tile layers are drawn
    for g in &m.groups {
        if g.layers.is_empty() {
            debug!("ignoring group layer '{}'", g.name);
        } else {
            warn!("ignoring group '{}' and the {} tile layer(s) inside it", g.name, g.layers.len());
        }
    }
    for o in &m.object_groups {
        debug!("ignoring objectgroup layer '{}'", o.name);
    }
    for i in &m.image_layers {
        debug!("ignoring imagelayer layer '{}'", i.name);
    }

    let tilesets = m
        .tilesets
        .into_iter()
        .map(|ts| IrTileset {
            first_gid: ts.firstgid,
            name: ts.name,
            tile_w: ts.tilewidth,
            tile_h: ts.tileheight,
            tilecount: ts.tilecount,
            columns: ts.columns,
            spacing: ts.spacing,
            margin: ts.margin,
            image: ts.image.map(|img| IrImage {
                source: img.source,
                width: img.width,
                height: img.height,
            }),
        })
        .collect();

    let layers = m
        .layers
        .into_iter()
        .map(|l| IrLayer {
            name: l.name,
            width: l.width,
            height: l.height,
            visible: l.visible != 0,
            opacity: l.opacity,
            offset: vec2(l.offsetx, l.offsety),
            data: match l.data {
                Some(d) => IrTileData::Encoded {
                    encoding: d.encoding,
                    compression: d.compression,
                    payload: d.text,
                },
                None => IrTileData::Missing,
            },
        })
        .collect();

    Ok(IrMap {
        width: m.width,
        height: m.height,
        tile_w: m.tilewidth,
        tile_h: m.tileheight,
        tilesets,
        layers,
    })
}
