use std::mem::size_of;

use macroquad::prelude::Color;

use super::backend::GraphicsBackend;
use super::batch::SpriteVertex;
use crate::error::AssetError;
use crate::tileset::AtlasId;

/// A call received by [`HeadlessBackend`].
#[derive(Debug, Clone, PartialEq)]
pub enum GfxCall {
    /// Target cleared to a color.
    Clear(Color),
    /// Texture created for an atlas.
    CreateTexture {
        /// Atlas the texture belongs to.
        atlas: AtlasId,
        /// Width in pixels.
        width: u32,
        /// Height in pixels.
        height: u32,
    },
    /// Texture of an atlas destroyed.
    DestroyTexture(AtlasId),
    /// Atlas texture bound for the following draws.
    Bind(AtlasId),
    /// Vertex bytes uploaded, decoded back into vertices.
    Upload(Vec<SpriteVertex>),
    /// Triangles drawn from the last upload.
    Draw {
        /// Number of vertices drawn.
        vertices: usize,
    },
}

/// Backend without a GPU that records every call. Used for dedicated servers,
/// tooling that only needs frame statistics, and tests.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    calls: Vec<GfxCall>,
    live_textures: usize,
    max_texture_size: Option<u32>,
}

impl HeadlessBackend {
    /// Backend accepting textures of any size.
    pub fn new() -> Self {
        Self::default()
    }

    /// Refuses textures with a side longer than `max`.
    pub fn with_max_texture_size(mut self, max: u32) -> Self {
        self.max_texture_size = Some(max);
        self
    }

    /// Every call since creation or the last [`reset`](Self::reset).
    pub fn calls(&self) -> &[GfxCall] {
        &self.calls
    }

    /// Forgets recorded calls; live textures are kept.
    pub fn reset(&mut self) {
        self.calls.clear();
    }

    /// Textures created and not yet destroyed.
    pub fn live_textures(&self) -> usize {
        self.live_textures
    }

    /// Vertex count of every draw call, in order.
    pub fn draw_calls(&self) -> Vec<usize> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                GfxCall::Draw { vertices } => Some(*vertices),
                _ => None,
            })
            .collect()
    }

    /// Atlas of every bind, in order.
    pub fn bound_atlases(&self) -> Vec<AtlasId> {
        self.calls
            .iter()
            .filter_map(|c| match c {
                GfxCall::Bind(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    /// All vertices drawn since the last reset, with the atlas bound at the time.
    pub fn drawn_vertices(&self) -> Vec<(AtlasId, SpriteVertex)> {
        let mut bound = None;
        let mut uploaded: &[SpriteVertex] = &[];
        let mut out = Vec::new();
        for call in &self.calls {
            match call {
                GfxCall::Bind(id) => bound = Some(*id),
                GfxCall::Upload(v) => uploaded = v,
                GfxCall::Draw { vertices } => {
                    if let Some(atlas) = bound {
                        let n = (*vertices).min(uploaded.len());
                        out.extend(uploaded[..n].iter().map(|v| (atlas, *v)));
                    }
                }
                _ => {}
            }
        }
        out
    }
}

impl GraphicsBackend for HeadlessBackend {
    type Texture = AtlasId;

    fn clear(&mut self, color: Color) {
        self.calls.push(GfxCall::Clear(color));
    }

    fn create_texture(
        &mut self,
        atlas: AtlasId,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<AtlasId, AssetError> {
        if let Some(max) = self.max_texture_size {
            if width > max || height > max {
                return Err(AssetError::Texture {
                    atlas,
                    reason: format!("{width}x{height} exceeds {max}x{max}"),
                });
            }
        }
        if rgba.len() != width as usize * height as usize * 4 {
            return Err(AssetError::Texture {
                atlas,
                reason: format!("{} bytes for {width}x{height} RGBA", rgba.len()),
            });
        }
        self.live_textures += 1;
        self.calls.push(GfxCall::CreateTexture {
            atlas,
            width,
            height,
        });
        Ok(atlas)
    }

    fn destroy_texture(&mut self, texture: AtlasId) {
        self.live_textures = self.live_textures.saturating_sub(1);
        self.calls.push(GfxCall::DestroyTexture(texture));
    }

    fn bind_texture(&mut self, texture: &AtlasId) {
        self.calls.push(GfxCall::Bind(*texture));
    }

    fn upload_vertex_bytes(&mut self, bytes: &[u8]) {
        let vertices = bytes
            .chunks_exact(size_of::<SpriteVertex>())
            .map(bytemuck::pod_read_unaligned::<SpriteVertex>)
            .collect();
        self.calls.push(GfxCall::Upload(vertices));
    }

    fn draw_triangles(&mut self, vertex_count: usize) {
        self.calls.push(GfxCall::Draw {
            vertices: vertex_count,
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use macroquad::prelude::BLACK;

    fn vertex(x: f32) -> SpriteVertex {
        SpriteVertex {
            position: [x, 0.0],
            color: [1.0; 4],
            uv: [0.0, 0.0],
        }
    }

    #[test]
    fn reset_forgets_calls_but_keeps_textures() {
        let mut gfx = HeadlessBackend::new();
        let tex = gfx.create_texture(AtlasId(0), 1, 1, &[0; 4]).unwrap();
        gfx.clear(BLACK);
        gfx.bind_texture(&tex);
        assert_eq!(gfx.calls().len(), 3);

        gfx.reset();
        assert!(gfx.calls().is_empty());
        assert!(gfx.drawn_vertices().is_empty());
        assert_eq!(gfx.live_textures(), 1);

        gfx.destroy_texture(tex);
        assert_eq!(gfx.live_textures(), 0);
        assert_eq!(gfx.calls(), &[GfxCall::DestroyTexture(AtlasId(0))]);
    }

    #[test]
    fn draws_use_the_last_upload_and_bind() {
        let mut gfx = HeadlessBackend::new();
        gfx.bind_texture(&AtlasId(3));
        let verts = [vertex(1.0), vertex(2.0), vertex(3.0)];
        gfx.upload_vertex_bytes(bytemuck::cast_slice(&verts));
        gfx.draw_triangles(2);

        assert_eq!(gfx.draw_calls(), vec![2]);
        assert_eq!(gfx.bound_atlases(), vec![AtlasId(3)]);
        assert_eq!(
            gfx.drawn_vertices(),
            vec![(AtlasId(3), vertex(1.0)), (AtlasId(3), vertex(2.0))]
        );
    }

    #[test]
    fn oversized_or_short_textures_are_refused() {
        let mut gfx = HeadlessBackend::new().with_max_texture_size(2);
        assert!(matches!(
            gfx.create_texture(AtlasId(1), 4, 1, &[0; 16]),
            Err(AssetError::Texture { atlas: AtlasId(1), .. })
        ));
        assert!(gfx.create_texture(AtlasId(1), 2, 2, &[0; 4]).is_err());
        assert_eq!(gfx.live_textures(), 0);
        assert!(gfx.calls().is_empty());
    }
}
