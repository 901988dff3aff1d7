//! Loads a map and prints what one frame would cost, without opening a window.
//!
//! `cargo run --example headless_stats -- assets/map.json`

use macroquad_tiled_batch::{HeadlessBackend, RenderConfig, ResourceCache, TileSession};

fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "assets/map.tmx".to_owned());
    let capacity = std::env::args()
        .nth(2)
        .map(|s| s.parse::<usize>())
        .transpose()?
        .unwrap_or(RenderConfig::default().batch_capacity);

    let config = RenderConfig::default().with_batch_capacity(capacity);
    let mut session = TileSession::open(&path, HeadlessBackend::new(), ResourceCache::from_fs(), config)?;

    let map = session.map();
    println!(
        "{}: {}x{} cells of {}x{} px, {} tilesets over {} atlases",
        path,
        map.width,
        map.height,
        map.tile_w,
        map.tile_h,
        map.tilesets().len(),
        map.atlases().len()
    );
    for layer in map.layers() {
        println!(
            "  layer '{}': {} tiles{}",
            layer.name,
            layer.cells().count(),
            if layer.visible { "" } else { " (hidden)" }
        );
    }
    for skipped in map.skipped_layers() {
        println!("  skipped: {skipped}");
    }

    let stats = session.frame();
    println!(
        "frame: {} sprites, {} draw calls, {} binds, {} flushes, {} skipped cells",
        stats.sprites, stats.draw_calls, stats.texture_binds, stats.flushes, stats.skipped_cells
    );

    session.shutdown();
    Ok(())
}
