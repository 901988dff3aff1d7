use std::collections::HashMap;

use log::{debug, error, warn};

use super::backend::GraphicsBackend;
use crate::resource::ResourceCache;
use crate::tileset::{AtlasId, AtlasImage};

/// A created texture and the pixel size it was created with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AtlasTexture<T> {
    /// Backend handle.
    pub texture: T,
    /// Width in pixels; uv coordinates are normalized against it.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

#[derive(Debug)]
enum Slot<T> {
    Ready(AtlasTexture<T>),
    Failed,
}

/// One texture per atlas, created on first use and kept until [`release`](Self::release).
///
/// An atlas whose image or texture could not be created is remembered as
/// failed, so the failure is reported once and never retried mid-session.
#[derive(Debug)]
pub struct AtlasCache<T> {
    slots: HashMap<AtlasId, Slot<T>>,
}

impl<T> Default for AtlasCache<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> AtlasCache<T> {
    /// Empty cache.
    pub fn new() -> Self {
        AtlasCache {
            slots: HashMap::new(),
        }
    }

    /// The texture for `id`, if one was created.
    pub fn get(&self, id: AtlasId) -> Option<&AtlasTexture<T>> {
        match self.slots.get(&id) {
            Some(Slot::Ready(tex)) => Some(tex),
            _ => None,
        }
    }

    /// True when a texture exists for `id`.
    pub fn is_ready(&self, id: AtlasId) -> bool {
        self.get(id).is_some()
    }

    /// True when creating the texture for `id` was attempted and failed.
    pub fn has_failed(&self, id: AtlasId) -> bool {
        matches!(self.slots.get(&id), Some(Slot::Failed))
    }

    /// Number of live textures.
    pub fn len(&self) -> usize {
        self.slots
            .values()
            .filter(|s| matches!(s, Slot::Ready(_)))
            .count()
    }

    /// True when no texture is live.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registers a texture created elsewhere.
    pub fn insert(&mut self, id: AtlasId, texture: AtlasTexture<T>) {
        self.slots.insert(id, Slot::Ready(texture));
    }

    /// Makes sure `atlas` has a texture, loading its image on first use.
    /// Returns whether the atlas can be drawn.
    pub fn ensure<G: GraphicsBackend<Texture = T>>(
        &mut self,
        atlas: &AtlasImage,
        resources: &mut ResourceCache,
        gfx: &mut G,
    ) -> bool {
        if let Some(slot) = self.slots.get(&atlas.id) {
            return matches!(slot, Slot::Ready(_));
        }

        let slot = match resources.image(&atlas.source) {
            Ok(img) => {
                if (img.width, img.height) != (atlas.width, atlas.height) {
                    warn!(
                        "atlas {} is {}x{}, the map declares {}x{}",
                        atlas.source.display(),
                        img.width,
                        img.height,
                        atlas.width,
                        atlas.height
                    );
                }
                match gfx.create_texture(atlas.id, img.width, img.height, &img.pixels) {
                    Ok(texture) => {
                        debug!("created texture for atlas {}", atlas.source.display());
                        Slot::Ready(AtlasTexture {
                            texture,
                            width: img.width,
                            height: img.height,
                        })
                    }
                    Err(e) => {
                        error!("{e}; tiles from this atlas will not be drawn");
                        Slot::Failed
                    }
                }
            }
            Err(e) => {
                error!("{e}; tiles from this atlas will not be drawn");
                Slot::Failed
            }
        };

        let ready = matches!(slot, Slot::Ready(_));
        self.slots.insert(atlas.id, slot);
        ready
    }

    /// [`ensure`](Self::ensure) for every atlas of a map.
    pub fn prepare<G: GraphicsBackend<Texture = T>>(
        &mut self,
        atlases: &[AtlasImage],
        resources: &mut ResourceCache,
        gfx: &mut G,
    ) {
        for atlas in atlases {
            self.ensure(atlas, resources, gfx);
        }
    }

    /// Destroys every texture and forgets failures.
    pub fn release<G: GraphicsBackend<Texture = T>>(&mut self, gfx: &mut G) {
        for (_, slot) in self.slots.drain() {
            if let Slot::Ready(tex) = slot {
                gfx.destroy_texture(tex.texture);
            }
        }
    }
}
