// src/loader/json_loader.rs
use crate::error::MapError;
use crate::ir_map::*;
use log::debug;
use macroquad::prelude::*;
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
enum JsonLayerData {
    Gids(Vec<u32>),
    Encoded(String),
}

#[derive(Deserialize)]
struct JsonLayer {
    #[serde(default)]
    data: Option<JsonLayerData>,
    #[serde(default)]
    encoding: Option<String>,
    #[serde(default)]
    compression: Option<String>,
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
    #[serde(default = "default_true")]
    visible: bool,
    #[serde(default = "one")]
    opacity: f32,
    #[serde(default)]
    offsetx: f32,
    #[serde(default)]
    offsety: f32,
    #[serde(default)]
    name: String,
    #[serde(rename = "type")]
    kind: Option<String>, // "tilelayer" expected here
}

fn default_true() -> bool {
    true
}
fn one() -> f32 {
    1.0
}

#[derive(Deserialize)]
struct JsonTileset {
    firstgid: u32,
    #[serde(default)]
    name: String,
    #[serde(default)]
    tilewidth: u32,
    #[serde(default)]
    tileheight: u32,
    #[serde(default)]
    tilecount: Option<u32>,
    #[serde(default)]
    columns: Option<u32>,
    #[serde(default)]
    spacing: u32,
    #[serde(default)]
    margin: u32,
    #[serde(default)]
    image: Option<String>,
    #[serde(default)]
    imagewidth: u32,
    #[serde(default)]
    imageheight: u32,
}

#[derive(Deserialize)]
struct JsonMap {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    width: u32,
    #[serde(default)]
    height: u32,
    tilewidth: u32,
    tileheight: u32,
    #[serde(default)]
    layers: Vec<JsonLayer>,
    #[serde(default)]
    tilesets: Vec<JsonTileset>,
}

/// Lowers a Tiled JSON map (`.json` / `.tmj`) with embedded tilesets to the IR.
pub fn decode_json_to_ir(text: &str) -> Result<IrMap, MapError> {
    let j: JsonMap = serde_json::from_str(text)?;

    if let Some(kind) = j.kind.as_deref() {
        if kind != "map" {
            return Err(MapError::NotAMapDocument {
                root: kind.to_owned(),
            });
        }
    }

    let tilesets = j
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
            image: ts.image.map(|source| IrImage {
                source,
                width: ts.imagewidth,
                height: ts.imageheight,
            }),
        })
        .collect();

    let mut layers = Vec::with_capacity(j.layers.len());
    for l in j.layers {
        match l.kind.as_deref().unwrap_or("tilelayer") {
            "tilelayer" => {}
            other => {
                debug!("ignoring {other} layer '{}'", l.name);
                continue;
            }
        }

        let data = match l.data {
            Some(JsonLayerData::Gids(gids)) => IrTileData::Gids(gids),
            Some(JsonLayerData::Encoded(payload)) => IrTileData::Encoded {
                encoding: l.encoding,
                compression: l.compression,
                payload,
            },
            None => IrTileData::Missing,
        };

        layers.push(IrLayer {
            name: l.name,
            width: l.width,
            height: l.height,
            visible: l.visible,
            opacity: l.opacity,
            offset: vec2(l.offsetx, l.offsety),
            data,
        });
    }

    Ok(IrMap {
        width: j.width,
        height: j.height,
        tile_w: j.tilewidth,
        tile_h: j.tileheight,
        tilesets,
        layers,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lowers_array_and_base64_layers() {
        let json = r#"{
          "type": "map",
          "width": 2,
          "height": 2,
          "tilewidth": 16,
          "tileheight": 16,
          "layers": [
            { "type": "tilelayer", "name": "ground", "width": 2, "height": 2, "data": [1, 2, 0, 3] },
            { "type": "objectgroup", "name": "spawns", "objects": [] },
            {
              "type": "tilelayer", "name": "top", "width": 2, "height": 2,
              "encoding": "base64", "data": "AQAAAAIAAAAAAAAAAwAAAA==",
              "visible": false, "opacity": 0.25, "offsetx": 8
            }
          ],
          "tilesets": [
            { "firstgid": 1, "name": "terrain", "tilewidth": 16, "tileheight": 16,
              "tilecount": 4, "columns": 2, "image": "terrain.png",
              "imagewidth": 32, "imageheight": 32 }
          ]
        }"#;

        let ir = decode_json_to_ir(json).expect("decode");
        assert_eq!(ir.layers.len(), 2);
        assert_eq!(ir.layers[0].data, IrTileData::Gids(vec![1, 2, 0, 3]));
        assert_eq!(
            ir.layers[1].data,
            IrTileData::Encoded {
                encoding: Some("base64".into()),
                compression: None,
                payload: "AQAAAAIAAAAAAAAAAwAAAA==".into(),
            }
        );
        assert!(!ir.layers[1].visible);
        assert_eq!(ir.layers[1].offset, vec2(8.0, 0.0));

        let ts = &ir.tilesets[0];
        assert_eq!(ts.image.as_ref().map(|i| (i.width, i.height)), Some((32, 32)));
    }

    #[test]
    fn returns_typed_error_for_malformed_json() {
        let err = decode_json_to_ir("{ not json").err().expect("expected decode error");
        assert!(matches!(err, MapError::Json { .. }));
    }

    #[test]
    fn other_document_types_are_not_maps() {
        let json = r#"{ "type": "tileset", "tilewidth": 16, "tileheight": 16 }"#;
        let err = decode_json_to_ir(json).unwrap_err();
        assert!(matches!(err, MapError::NotAMapDocument { ref root } if root == "tileset"));
    }
}
