use std::path::PathBuf;
use thiserror::Error;

use crate::tileset::AtlasId;

/// Fatal errors that abort loading a map.
#[derive(Debug, Error)]
pub enum MapError {
    /// The document parsed, but its root is not a Tiled map.
    #[error("not a map document: root is `{root}`")]
    NotAMapDocument {
        /// Name of the root element (TMX) or `type` field (JSON).
        root: String,
    },

    /// A tileset's geometry cannot be used to locate tiles.
    #[error("malformed tileset '{name}': {reason}")]
    MalformedTileset {
        /// Tileset name as declared in the document.
        name: String,
        /// What is wrong with it.
        reason: String,
    },

    /// The file extension is not one of the supported map formats.
    #[error("unsupported map format: {0}")]
    UnsupportedFormat(String),

    /// The TMX document is not well-formed XML or misses required attributes.
    #[error("invalid TMX document: {0}")]
    Xml(String),

    /// The JSON document could not be parsed.
    #[error("invalid JSON map: {source}")]
    Json {
        /// Underlying parser error.
        #[from]
        source: serde_json::Error,
    },

    /// The map document itself could not be loaded.
    #[error(transparent)]
    Asset(#[from] AssetError),
}

/// Non-fatal problems with a single layer. The layer is dropped, the map still loads.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LayerError {
    /// The payload does not decode to exactly `width * height` tile ids.
    #[error("corrupt data in layer '{layer}': {reason}")]
    CorruptLayerData {
        /// Layer name.
        layer: String,
        /// What did not add up.
        reason: String,
    },

    /// The declared encoding/compression is not base64 of raw little-endian u32.
    #[error("unsupported encoding in layer '{layer}': {encoding}")]
    UnsupportedEncoding {
        /// Layer name.
        layer: String,
        /// Declared encoding, with compression if any.
        encoding: String,
    },

    /// The layer has no tile data block at all.
    #[error("layer '{layer}' has no tile data")]
    MissingLayerData {
        /// Layer name.
        layer: String,
    },
}

impl LayerError {
    /// Name of the layer this diagnostic belongs to.
    pub fn layer(&self) -> &str {
        match self {
            LayerError::CorruptLayerData { layer, .. }
            | LayerError::UnsupportedEncoding { layer, .. }
            | LayerError::MissingLayerData { layer } => layer,
        }
    }
}

/// Failures of the asset collaborator or of texture creation.
#[derive(Debug, Error)]
pub enum AssetError {
    /// Reading a file failed.
    #[error("I/O error reading {path}: {source}")]
    Io {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },

    /// Decoding an image failed.
    #[error("cannot decode image {path}: {source}")]
    Image {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: image::ImageError,
    },

    /// A cached resource exists under this path but is of another kind.
    #[error("resource {path} is a {found}, expected a {expected}")]
    KindMismatch {
        /// Cache key.
        path: PathBuf,
        /// Kind requested by the accessor.
        expected: &'static str,
        /// Kind actually cached.
        found: &'static str,
    },

    /// The graphics backend refused to create a texture.
    #[error("cannot create texture for atlas {atlas:?}: {reason}")]
    Texture {
        /// Atlas the texture was for.
        atlas: AtlasId,
        /// Backend-specific reason.
        reason: String,
    },

    /// Any other failure reported by a custom asset source.
    #[error("cannot load {path}: {source}")]
    Other {
        /// File that failed.
        path: PathBuf,
        /// Underlying error.
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}
