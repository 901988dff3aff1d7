use macroquad::prelude::*;
use macroquad_tiled_batch::{MacroquadBackend, RenderConfig, ResourceCache, TileSession};

fn window_conf() -> Conf {
    Conf {
        window_title: "Basic Map".into(),
        window_width: 1280,
        window_height: 720,
        ..Default::default()
    }
}

async fn run() -> anyhow::Result<()> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "assets/map.tmx".to_owned());

    let config = RenderConfig::default().with_clear_color(Color::from_rgba(20, 20, 28, 255));
    let mut session = TileSession::open(&path, MacroquadBackend::new(), ResourceCache::from_fs(), config)?;

    let mut origin = Vec2::ZERO;
    loop {
        if is_key_pressed(KeyCode::Escape) {
            break;
        }

        // arrow keys scroll the view
        let speed = 240.0 * get_frame_time();
        if is_key_down(KeyCode::Left) {
            origin.x -= speed;
        }
        if is_key_down(KeyCode::Right) {
            origin.x += speed;
        }
        if is_key_down(KeyCode::Up) {
            origin.y -= speed;
        }
        if is_key_down(KeyCode::Down) {
            origin.y += speed;
        }

        set_camera(&Camera2D {
            target: origin + vec2(screen_width(), screen_height()) / 2.0,
            // negative y keeps world y pointing down, like screen space
            zoom: vec2(2.0 / screen_width(), -2.0 / screen_height()),
            ..Default::default()
        });
        let stats = session.frame_visible(origin, origin + vec2(screen_width(), screen_height()));
        set_default_camera();

        draw_text(
            &format!("FPS: {}", get_fps()),
            screen_width() - 135.0,
            55.0,
            30.0,
            RED,
        );
        draw_text(
            &format!("sprites: {}  draw calls: {}", stats.sprites, stats.draw_calls),
            20.0,
            30.0,
            24.0,
            WHITE,
        );

        next_frame().await;
    }

    session.shutdown();
    Ok(())
}

#[macroquad::main(window_conf)]
async fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    if let Err(e) = run().await {
        log::error!("{e:#}");
        std::process::exit(1);
    }
}
