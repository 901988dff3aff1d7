use macroquad::prelude::Color;

use crate::error::AssetError;
use crate::tileset::AtlasId;

/// The graphics calls the renderer needs. Everything else (context creation,
/// shaders, projection) belongs to the implementor.
pub trait GraphicsBackend {
    /// Handle to a texture created by this backend.
    type Texture;

    /// Clears the frame's draw target.
    fn clear(&mut self, color: Color);

    /// Creates a texture from tightly packed RGBA8 pixels.
    fn create_texture(
        &mut self,
        atlas: AtlasId,
        width: u32,
        height: u32,
        rgba: &[u8],
    ) -> Result<Self::Texture, AssetError>;

    /// Frees a texture. Never called while a frame is open.
    fn destroy_texture(&mut self, texture: Self::Texture);

    /// Makes `texture` the source for following draws.
    fn bind_texture(&mut self, texture: &Self::Texture);

    /// Replaces the vertex buffer contents with `bytes`, a packed slice of
    /// [`SpriteVertex`](super::batch::SpriteVertex).
    fn upload_vertex_bytes(&mut self, bytes: &[u8]);

    /// Draws the first `vertex_count` uploaded vertices as a triangle list
    /// with the bound texture.
    fn draw_triangles(&mut self, vertex_count: usize);
}
