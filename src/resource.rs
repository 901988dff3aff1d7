use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

use log::debug;

use crate::error::AssetError;

/// Decoded RGBA8 image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// `width * height * 4` bytes, rows top to bottom.
    pub pixels: Vec<u8>,
}

/// Where documents and images come from.
pub trait AssetSource {
    /// Reads a Tiled map document as text.
    fn load_tiled_document(&mut self, path: &Path) -> Result<String, AssetError>;
    /// Reads and decodes an image to RGBA8.
    fn load_image(&mut self, path: &Path) -> Result<ImageData, AssetError>;
}

/// Loads assets from the local filesystem; PNG decoding goes through `image`.
#[derive(Debug, Default, Clone)]
pub struct FsAssets;

impl AssetSource for FsAssets {
    fn load_tiled_document(&mut self, path: &Path) -> Result<String, AssetError> {
        std::fs::read_to_string(path).map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })
    }

    fn load_image(&mut self, path: &Path) -> Result<ImageData, AssetError> {
        let bytes = std::fs::read(path).map_err(|source| AssetError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let img = image::load_from_memory(&bytes)
            .map_err(|source| AssetError::Image {
                path: path.to_path_buf(),
                source,
            })?
            .to_rgba8();
        let (width, height) = img.dimensions();
        Ok(ImageData {
            width,
            height,
            pixels: img.into_raw(),
        })
    }
}

/// In-memory assets keyed by path, for tools and tests that have no files.
#[derive(Debug, Default, Clone)]
pub struct MemoryAssets {
    documents: HashMap<PathBuf, String>,
    images: HashMap<PathBuf, ImageData>,
}

impl MemoryAssets {
    /// Source with nothing registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Serves `text` as the document at `path`.
    pub fn with_document(mut self, path: impl Into<PathBuf>, text: impl Into<String>) -> Self {
        self.documents.insert(path.into(), text.into());
        self
    }

    /// Serves `image` as the decoded image at `path`.
    pub fn with_image(mut self, path: impl Into<PathBuf>, image: ImageData) -> Self {
        self.images.insert(path.into(), image);
        self
    }
}

fn not_found(path: &Path) -> AssetError {
    AssetError::Io {
        path: path.to_path_buf(),
        source: std::io::Error::from(std::io::ErrorKind::NotFound),
    }
}

impl AssetSource for MemoryAssets {
    fn load_tiled_document(&mut self, path: &Path) -> Result<String, AssetError> {
        self.documents.get(path).cloned().ok_or_else(|| not_found(path))
    }

    fn load_image(&mut self, path: &Path) -> Result<ImageData, AssetError> {
        self.images.get(path).cloned().ok_or_else(|| not_found(path))
    }
}

/// A cached asset.
#[derive(Debug, Clone)]
pub enum Resource {
    /// TMX or JSON map text.
    TiledDocument(String),
    /// Decoded atlas image.
    Image(ImageData),
}

impl Resource {
    fn kind(&self) -> &'static str {
        match self {
            Resource::TiledDocument(_) => "tiled document",
            Resource::Image(_) => "image",
        }
    }
}

/// Path-keyed cache of loaded assets, owned by whoever drives the session.
pub struct ResourceCache {
    source: Box<dyn AssetSource>,
    entries: HashMap<PathBuf, Resource>,
}

impl ResourceCache {
    /// Empty cache reading from `source`.
    pub fn new(source: impl AssetSource + 'static) -> Self {
        ResourceCache {
            source: Box::new(source),
            entries: HashMap::new(),
        }
    }

    /// Cache backed by the filesystem.
    pub fn from_fs() -> Self {
        Self::new(FsAssets)
    }

    /// Text of the map document at `path`, loading it on first request.
    pub fn tiled_document(&mut self, path: &Path) -> Result<&str, AssetError> {
        let source = &mut self.source;
        let res = match self.entries.entry(path.to_path_buf()) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(v) => {
                debug!("loading document {}", path.display());
                v.insert(Resource::TiledDocument(source.load_tiled_document(path)?))
            }
        };
        match &*res {
            Resource::TiledDocument(text) => Ok(text.as_str()),
            other => Err(AssetError::KindMismatch {
                path: path.to_path_buf(),
                expected: "tiled document",
                found: other.kind(),
            }),
        }
    }

    /// Decoded image at `path`, loading it on first request.
    pub fn image(&mut self, path: &Path) -> Result<&ImageData, AssetError> {
        let source = &mut self.source;
        let res = match self.entries.entry(path.to_path_buf()) {
            Entry::Occupied(e) => e.into_mut(),
            Entry::Vacant(v) => {
                debug!("loading image {}", path.display());
                v.insert(Resource::Image(source.load_image(path)?))
            }
        };
        match &*res {
            Resource::Image(img) => Ok(img),
            other => Err(AssetError::KindMismatch {
                path: path.to_path_buf(),
                expected: "image",
                found: other.kind(),
            }),
        }
    }

    /// Drops a single entry; the next request reloads it.
    pub fn evict(&mut self, path: &Path) -> Option<Resource> {
        self.entries.remove(path)
    }

    /// True when `path` is cached, whatever its kind.
    pub fn contains(&self, path: &Path) -> bool {
        self.entries.contains_key(path)
    }

    /// Number of cached assets.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when nothing is cached.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Releases every cached asset.
    pub fn clear(&mut self) {
        debug!("clearing {} cached resources", self.entries.len());
        self.entries.clear();
    }
}
