use std::mem::size_of;

use macroquad::models::{draw_mesh, Mesh, Vertex};
use macroquad::prelude::*;

use super::backend::GraphicsBackend;
use super::batch::{SpriteVertex, VERTICES_PER_SPRITE};
use crate::error::AssetError;
use crate::tileset::AtlasId;

/// Largest mesh handed to macroquad in one go. Stays under the default
/// index buffer size and keeps sprites whole.
const MAX_MESH_VERTICES: usize = 833 * VERTICES_PER_SPRITE;

/// Draws through macroquad's immediate-mode mesh API. Must be used on the
/// thread running the macroquad main loop.
#[derive(Default)]
pub struct MacroquadBackend {
    bound: Option<Texture2D>,
    staged: Vec<Vertex>,
}

impl MacroquadBackend {
    /// Backend with nothing bound.
    pub fn new() -> Self {
        Self::default()
    }
}

impl GraphicsBackend for MacroquadBackend {
    type Texture = Texture2D;

    fn clear(&mut self, color: Color) {
        clear_background(color);
    }

    fn create_texture(
        &mut self,
        atlas: AtlasId,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<Texture2D, AssetError> {
        let (Ok(w), Ok(h)) = (u16::try_from(width), u16::try_from(height)) else {
            return Err(AssetError::Texture {
                atlas,
                reason: format!("{width}x{height} is larger than a texture can be"),
            });
        };
        if rgba.len() != width as usize * height as usize * 4 {
            return Err(AssetError::Texture {
                atlas,
                reason: format!("{} bytes for {width}x{height} RGBA", rgba.len()),
            });
        }
        let texture = Texture2D::from_rgba8(w, h, rgba);
        texture.set_filter(FilterMode::Nearest);
        Ok(texture)
    }

    fn destroy_texture(&mut self, texture: Texture2D) {
        // textures are only destroyed between frames
        self.bound = None;
        drop(texture);
    }

    fn bind_texture(&mut self, texture: &Texture2D) {
        self.bound = Some(texture.clone());
    }

    fn upload_vertex_bytes(&mut self, bytes: &[u8]) {
        self.staged.clear();
        self.staged.extend(
            bytes
                .chunks_exact(size_of::<SpriteVertex>())
                .map(bytemuck::pod_read_unaligned::<SpriteVertex>)
                .map(|v| {
                    let [r, g, b, a] = v.color;
                    Vertex::new(v.position[0], v.position[1], 0.0, v.uv[0], v.uv[1], Color::new(r, g, b, a))
                }),
        );
    }

    fn draw_triangles(&mut self, vertex_count: usize) {
        let count = vertex_count.min(self.staged.len());
        for chunk in self.staged[..count].chunks(MAX_MESH_VERTICES) {
            let mesh = Mesh {
                vertices: chunk.to_vec(),
                indices: (0..chunk.len() as u16).collect(),
                texture: self.bound.clone(),
            };
            draw_mesh(&mesh);
        }
    }
}
