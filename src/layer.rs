use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use macroquad::prelude::Vec2;

use crate::error::LayerError;
use crate::ir_map::{IrLayer, IrTileData};
use crate::tile_id::TileId;

/// A decoded grid of tile ids, row-major (`index = x + y * width`).
#[derive(Debug, Clone, PartialEq)]
pub struct TileLayer {
    /// Name from the document.
    pub name: String,
    /// Width in cells.
    pub width: u32,
    /// Height in cells.
    pub height: u32,
    /// Hidden layers are kept but never drawn.
    pub visible: bool,
    /// In `0.0..=1.0`; scales the alpha of every tile.
    pub opacity: f32,
    /// World offset added to every cell.
    pub offset: Vec2,
    data: Vec<u32>,
}

impl TileLayer {
    /// Decodes a declared layer, or reports why it has to be dropped.
    pub(crate) fn from_ir(ir: IrLayer) -> Result<Self, LayerError> {
        let data = decode_tile_data(&ir.name, ir.width, ir.height, &ir.data)?;
        Ok(TileLayer {
            name: ir.name,
            width: ir.width,
            height: ir.height,
            visible: ir.visible,
            opacity: ir.opacity.clamp(0.0, 1.0),
            offset: ir.offset,
            data,
        })
    }

    /// Raw ids, row-major.
    pub fn data(&self) -> &[u32] {
        &self.data
    }

    /// Id at cell `(x, y)`; `None` outside the grid.
    #[inline]
    pub fn tile_at(&self, x: u32, y: u32) -> Option<TileId> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data
            .get(x as usize + y as usize * self.width as usize)
            .map(|&raw| TileId(raw))
    }

    /// Non-empty cells as `(x, y, id)`, row-major.
    pub fn cells(&self) -> impl Iterator<Item = (u32, u32, TileId)> + '_ {
        let w = self.width.max(1) as usize;
        self.data.iter().enumerate().filter_map(move |(idx, &raw)| {
            let id = TileId(raw);
            (!id.is_empty()).then(|| ((idx % w) as u32, (idx / w) as u32, id))
        })
    }
}

/// Decodes a layer payload into exactly `width * height` ids.
pub fn decode_tile_data(
    layer: &str,
    width: u32,
    height: u32,
    data: &IrTileData,
) -> Result<Vec<u32>, LayerError> {
    let corrupt = |reason: String| LayerError::CorruptLayerData {
        layer: layer.to_owned(),
        reason,
    };
    let cells = (width as usize)
        .checked_mul(height as usize)
        .ok_or_else(|| corrupt(format!("{width}x{height} cells overflow")))?;

    match data {
        IrTileData::Missing => Err(LayerError::MissingLayerData {
            layer: layer.to_owned(),
        }),
        IrTileData::Gids(gids) => {
            if gids.len() != cells {
                return Err(corrupt(format!("expected {cells} ids, found {}", gids.len())));
            }
            Ok(gids.clone())
        }
        IrTileData::Encoded {
            encoding,
            compression,
            payload,
        } => {
            let compression = compression.as_deref().filter(|c| !c.is_empty());
            match (encoding.as_deref(), compression) {
                (Some("base64"), None) => {}
                (enc, comp) => {
                    let mut described = enc.unwrap_or("xml").to_owned();
                    if let Some(comp) = comp {
                        described.push('+');
                        described.push_str(comp);
                    }
                    return Err(LayerError::UnsupportedEncoding {
                        layer: layer.to_owned(),
                        encoding: described,
                    });
                }
            }

            let compact: String = payload.chars().filter(|c| !c.is_whitespace()).collect();
            let bytes = BASE64
                .decode(compact.as_bytes())
                .map_err(|e| corrupt(format!("invalid base64: {e}")))?;

            let expected = cells * 4;
            if bytes.len() != expected {
                return Err(corrupt(format!(
                    "expected {expected} bytes for {width}x{height} cells, found {}",
                    bytes.len()
                )));
            }

            Ok(bytes
                .chunks_exact(4)
                .map(|b| u32::from_le_bytes([b[0], b[1], b[2], b[3]]))
                .collect())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(ids: &[u32]) -> String {
        let bytes: Vec<u8> = ids.iter().flat_map(|id| id.to_le_bytes()).collect();
        BASE64.encode(bytes)
    }

    fn base64_data(payload: String) -> IrTileData {
        IrTileData::Encoded {
            encoding: Some("base64".into()),
            compression: None,
            payload,
        }
    }

    #[test]
    fn decodes_little_endian_row_major() {
        let ids = [1, 2, 0, 0x0102_0304, 5, 0x8000_0006];
        let out = decode_tile_data("ground", 3, 2, &base64_data(encode(&ids))).unwrap();
        assert_eq!(out, ids);
    }

    #[test]
    fn tolerates_whitespace_around_payload() {
        let payload = format!("\n   {}\n  ", encode(&[7, 8, 9, 10]));
        let out = decode_tile_data("ground", 2, 2, &base64_data(payload)).unwrap();
        assert_eq!(out, vec![7, 8, 9, 10]);
    }

    #[test]
    fn byte_count_mismatch_is_corrupt() {
        let err = decode_tile_data("ground", 2, 2, &base64_data(encode(&[1, 2, 3]))).unwrap_err();
        assert!(matches!(err, LayerError::CorruptLayerData { ref layer, .. } if layer == "ground"));

        let err = decode_tile_data("ground", 2, 2, &base64_data("!!not base64!!".into())).unwrap_err();
        assert!(matches!(err, LayerError::CorruptLayerData { .. }));
    }

    #[test]
    fn other_encodings_are_unsupported() {
        let csv = IrTileData::Encoded {
            encoding: Some("csv".into()),
            compression: None,
            payload: "1,2,3,4".into(),
        };
        let err = decode_tile_data("l", 2, 2, &csv).unwrap_err();
        assert_eq!(
            err,
            LayerError::UnsupportedEncoding {
                layer: "l".into(),
                encoding: "csv".into()
            }
        );

        let zlib = IrTileData::Encoded {
            encoding: Some("base64".into()),
            compression: Some("zlib".into()),
            payload: String::new(),
        };
        let err = decode_tile_data("l", 2, 2, &zlib).unwrap_err();
        assert!(matches!(err, LayerError::UnsupportedEncoding { ref encoding, .. } if encoding == "base64+zlib"));
    }

    #[test]
    fn gid_arrays_must_fill_the_grid() {
        assert_eq!(
            decode_tile_data("l", 2, 1, &IrTileData::Gids(vec![3, 4])).unwrap(),
            vec![3, 4]
        );
        assert!(decode_tile_data("l", 2, 2, &IrTileData::Gids(vec![3, 4])).is_err());
        assert!(matches!(
            decode_tile_data("l", 2, 2, &IrTileData::Missing),
            Err(LayerError::MissingLayerData { .. })
        ));
    }

    #[test]
    fn cells_skip_empty_and_report_coordinates() {
        let layer = TileLayer::from_ir(IrLayer {
            name: "l".into(),
            width: 2,
            height: 2,
            visible: true,
            opacity: 1.0,
            offset: Vec2::ZERO,
            data: IrTileData::Gids(vec![1, 2, 0, 3]),
        })
        .unwrap();
        let cells: Vec<_> = layer.cells().map(|(x, y, id)| (x, y, id.raw())).collect();
        assert_eq!(cells, vec![(0, 0, 1), (1, 0, 2), (1, 1, 3)]);
        assert_eq!(layer.tile_at(0, 1), Some(TileId(0)));
        assert_eq!(layer.tile_at(2, 0), None);
    }
}
