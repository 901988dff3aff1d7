// tests/map_tests.rs

use std::path::Path;
use macroquad_tiled_batch::{LayerError, Map, MapError, TileId, TileRegion};

fn tmx(layers: &str) -> String {
    format!(
        r#"<map width="2" height="2" tilewidth="16" tileheight="16">
 <tileset firstgid="1" name="terrain" tilewidth="16" tileheight="16" tilecount="4" columns="2">
  <image source="terrain.png" width="32" height="32"/>
 </tileset>
{layers}
</map>"#
    )
}

const GOOD: &str = r#"<layer name="good" width="2" height="2"><data encoding="base64">AQAAAAIAAAAAAAAAAwAAAA==</data></layer>"#;

#[test]
fn corrupt_layer_is_skipped_but_map_loads() {
    // 12 bytes for a 2x2 layer
    let bad = r#"<layer name="oops" width="2" height="2"><data encoding="base64">AQAAAAIAAAADAAAA</data></layer>"#;
    let map = Map::from_tmx_str(&tmx(&format!("{bad}\n{GOOD}")), Path::new(".")).unwrap();

    assert_eq!(map.layers().len(), 1);
    assert_eq!(map.layers()[0].name, "good");
    assert!(matches!(
        &map.skipped_layers()[0],
        LayerError::CorruptLayerData { layer, .. } if layer == "oops"
    ));
}

#[test]
fn compressed_and_csv_layers_are_unsupported() {
    let zlib = r#"<layer name="z" width="2" height="2"><data encoding="base64" compression="zlib">eJxjZGBgYAQAAA0ABA==</data></layer>"#;
    let csv = r#"<layer name="c" width="2" height="2"><data encoding="csv">1,2,0,3</data></layer>"#;
    let map = Map::from_tmx_str(&tmx(&format!("{zlib}\n{csv}")), Path::new(".")).unwrap();

    assert!(map.layers().is_empty());
    let skipped = map.skipped_layers();
    assert_eq!(skipped.len(), 2);
    assert!(skipped
        .iter()
        .all(|e| matches!(e, LayerError::UnsupportedEncoding { .. })));
    assert_eq!(skipped[0].layer(), "z");
}

#[test]
fn non_map_root_is_rejected() {
    let tsx = r#"<tileset name="terrain" tilewidth="16" tileheight="16" tilecount="4" columns="2"/>"#;
    let err = Map::from_tmx_str(tsx, Path::new(".")).unwrap_err();
    assert!(matches!(err, MapError::NotAMapDocument { root } if root == "tileset"));
}

#[test]
fn impossible_tileset_geometry_is_fatal() {
    let doc = r#"<map width="1" height="1" tilewidth="16" tileheight="16">
 <tileset firstgid="1" name="broken" tilewidth="0" tileheight="16" tilecount="4" columns="2">
  <image source="terrain.png" width="32" height="32"/>
 </tileset>
</map>"#;
    let err = Map::from_tmx_str(doc, Path::new(".")).unwrap_err();
    assert!(matches!(err, MapError::MalformedTileset { name, .. } if name == "broken"));
}

#[test]
fn resolves_cells_through_the_map() {
    let map = Map::from_tmx_str(&tmx(GOOD), Path::new(".")).unwrap();
    let layer = &map.layers()[0];

    assert_eq!(map.resolve(TileId(0)), None);
    assert_eq!(map.resolve(TileId(99)), None);
    let cells: Vec<_> = layer.cells().map(|(x, y, id)| (x, y, id.raw())).collect();
    assert_eq!(cells, vec![(0, 0, 1), (1, 0, 2), (1, 1, 3)]);

    let third = map.resolve(layer.tile_at(1, 1).unwrap()).unwrap();
    assert_eq!(third.region, TileRegion::new(0, 16, 16, 16));

    // flip bits do not change which tile is resolved
    let flipped = map.resolve(TileId(0x8000_0003)).unwrap();
    assert_eq!(flipped, third);
}

const JSON_WITH_EXTRA: &str = r#"
{
  "width":1, "height":1,
  "tilewidth":8, "tileheight":8,
  "dummyField": "ignored",
  "layers": [
    {
      "name":"L",
      "width":1, "height":1,
      "data":[0],
      "opacity": 0.5,
      "properties": []
    }
  ]
}
"#;

#[test]
fn load_ignores_extra_fields() {
    let map = Map::from_json_str(JSON_WITH_EXTRA, Path::new(".")).expect("Should ignore unknown fields");
    assert_eq!(map.layers()[0].name, "L");
    assert_eq!(map.layers()[0].data(), &[0]);
    assert_eq!(map.layers()[0].opacity, 0.5);
}

#[test]
fn json_array_of_wrong_length_is_corrupt() {
    let json = r#"{ "width":2, "height":2, "tilewidth":8, "tileheight":8,
        "layers":[ { "name":"short", "width":2, "height":2, "data":[1,2,3] } ] }"#;
    let map = Map::from_json_str(json, Path::new(".")).unwrap();
    assert!(map.layers().is_empty());
    assert_eq!(map.skipped_layers()[0].layer(), "short");
}
