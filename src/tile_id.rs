/// Raw global tile id as stored in a layer, flip flags included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct TileId(pub u32);

/// Horizontal flip flag, bit 31.
pub const FLIP_H: u32 = 0x8000_0000;
/// Vertical flip flag, bit 30.
pub const FLIP_V: u32 = 0x4000_0000;
/// Diagonal (x/y swap) flag, bit 29.
pub const FLIP_D: u32 = 0x2000_0000;
/// Mask keeping the lower 29 bits, i.e. the id proper.
pub const GID_MASK: u32 = 0x1FFF_FFFF;

impl TileId {
    /// Id 0, the empty cell.
    pub const EMPTY: TileId = TileId(0);

    /// Id exactly as stored, flags included.
    #[inline]
    pub fn raw(self) -> u32 {
        self.0
    }

    /// Id with the flip flags stripped.
    #[inline]
    pub fn clean(self) -> u32 {
        self.0 & GID_MASK
    }

    /// True when the cell holds no tile, whatever its flags.
    #[inline]
    pub fn is_empty(self) -> bool {
        self.clean() == 0
    }

    /// Flip flags carried in the top three bits.
    #[inline]
    pub fn flags(self) -> FlipFlags {
        FlipFlags {
            horizontal: (self.0 & FLIP_H) != 0,
            vertical: (self.0 & FLIP_V) != 0,
            diagonal: (self.0 & FLIP_D) != 0,
        }
    }
}

impl From<u32> for TileId {
    fn from(raw: u32) -> Self {
        TileId(raw)
    }
}

/// How a tile is mirrored when drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FlipFlags {
    /// Mirror left/right.
    pub horizontal: bool,
    /// Mirror top/bottom.
    pub vertical: bool,
    /// Swap of the x and y axes, applied before the other two.
    pub diagonal: bool,
}

impl FlipFlags {
    /// No flipping.
    pub const NONE: FlipFlags = FlipFlags {
        horizontal: false,
        vertical: false,
        diagonal: false,
    };

    /// True when at least one flag is set.
    pub fn any(self) -> bool {
        self.horizontal || self.vertical || self.diagonal
    }
}
