// tests/load_tests.rs

use std::fs;
use std::path::{Path, PathBuf};
use macroquad_tiled_batch::{AssetError, Map, MapError, ResourceCache};

const TMX: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<map version="1.10" orientation="orthogonal" width="2" height="2" tilewidth="16" tileheight="16">
 <tileset firstgid="1" name="terrain" tilewidth="16" tileheight="16" tilecount="4" columns="2">
  <image source="terrain.png" width="32" height="32"/>
 </tileset>
 <layer id="1" name="ground" width="2" height="2">
  <data encoding="base64">
   AQAAAAIAAAAAAAAAAwAAAA==
  </data>
 </layer>
</map>
"#;

const JSON: &str = r#"
{
    "type": "map",
    "width": 1,
    "height": 1,
    "tilewidth": 4,
    "tileheight": 4,
    "layers": [ { "type": "tilelayer", "name": "L", "width": 1, "height": 1, "data": [0] } ],
    "tilesets": []
}
"#;

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("tiled_batch_{}_{}", name, std::process::id()));
    fs::create_dir_all(&dir).unwrap();
    dir
}

#[test]
fn integration_load_from_file_and_str() {
    // Inline
    let map = Map::from_tmx_str(TMX, Path::new("maps")).expect("should parse inline TMX");
    assert_eq!((map.width, map.height), (2, 2));
    assert_eq!(map.layer("ground").unwrap().data(), &[1, 2, 0, 3]);
    assert_eq!(map.atlases()[0].source, Path::new("maps").join("terrain.png"));

    let map = Map::from_json_str(JSON, Path::new(".")).expect("should parse inline JSON");
    assert_eq!(map.tile_w, 4);

    // File-based
    let dir = temp_dir("load");
    let tmx_path = dir.join("level.tmx");
    let json_path = dir.join("level.tmj");
    fs::write(&tmx_path, TMX).unwrap();
    fs::write(&json_path, JSON).unwrap();

    let mut resources = ResourceCache::from_fs();
    let map = Map::load(&tmx_path, &mut resources).unwrap();
    assert_eq!(map.atlases()[0].source, dir.join("terrain.png"));
    assert_eq!(map.pixel_size(), (32, 32));
    let map2 = Map::load(&json_path, &mut resources).unwrap();
    assert_eq!(map2.tile_h, 4);
    assert_eq!(resources.len(), 2);

    fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn integration_unsupported_format() {
    let mut resources = ResourceCache::from_fs();
    let err = Map::load("foo.csv", &mut resources).unwrap_err();
    match err {
        MapError::UnsupportedFormat(ext) => assert_eq!(ext, "foo.csv"),
        other => panic!("expected UnsupportedFormat, got {:?}", other),
    }
}

#[test]
fn integration_missing_file_is_an_asset_error() {
    let mut resources = ResourceCache::from_fs();
    let missing = std::env::temp_dir().join("tiled_batch_does_not_exist.tmx");
    let err = Map::load(&missing, &mut resources).unwrap_err();
    assert!(matches!(err, MapError::Asset(AssetError::Io { ref path, .. }) if *path == missing));
}
