use macroquad::prelude::*;

/// Half-open range of cells `[x0, x1) x [y0, y1)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CellRange {
    pub x0: u32,
    pub y0: u32,
    pub x1: u32,
    pub y1: u32,
}

impl CellRange {
    /// Every cell of a `width x height` layer.
    pub fn full(width: u32, height: u32) -> Self {
        CellRange {
            x0: 0,
            y0: 0,
            x1: width,
            y1: height,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }
}

/// Cells of a `width x height` grid placed at `origin` whose `cell`-sized
/// squares overlap the view rectangle, padded by `margin` cells on each side.
/// Corners may be given in any order.
pub fn visible_cells(
    view_min: Vec2,
    view_max: Vec2,
    origin: Vec2,
    cell: Vec2,
    width: u32,
    height: u32,
    margin: u32,
) -> CellRange {
    if cell.x <= 0.0 || cell.y <= 0.0 {
        return CellRange::full(width, height);
    }

    let lo = view_min.min(view_max) - origin;
    let hi = view_min.max(view_max) - origin;

    let span = |lo: f32, hi: f32, size: f32, len: u32| -> (u32, u32) {
        let first = (lo / size).floor() as i64 - margin as i64;
        let last = (hi / size).floor() as i64 + margin as i64;
        let clamp = |v: i64| v.clamp(0, len as i64) as u32;
        (clamp(first), clamp(last + 1))
    };

    let (x0, x1) = span(lo.x, hi.x, cell.x, width);
    let (y0, y1) = span(lo.y, hi.y, cell.y, height);
    CellRange { x0, y0, x1, y1 }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_inside_the_grid_is_padded_and_clamped() {
        let r = visible_cells(vec2(40.0, 40.0), vec2(80.0, 70.0), Vec2::ZERO, vec2(16.0, 16.0), 10, 10, 1);
        assert_eq!(r, CellRange { x0: 1, y0: 1, x1: 7, y1: 6 });

        let r = visible_cells(vec2(0.0, 0.0), vec2(1000.0, 1000.0), Vec2::ZERO, vec2(16.0, 16.0), 10, 10, 1);
        assert_eq!(r, CellRange::full(10, 10));
    }

    #[test]
    fn swapped_corners_give_the_same_range() {
        let a = visible_cells(vec2(10.0, 10.0), vec2(50.0, 50.0), Vec2::ZERO, vec2(16.0, 16.0), 8, 8, 0);
        let b = visible_cells(vec2(50.0, 50.0), vec2(10.0, 10.0), Vec2::ZERO, vec2(16.0, 16.0), 8, 8, 0);
        assert_eq!(a, b);
        assert_eq!(a, CellRange { x0: 0, y0: 0, x1: 4, y1: 4 });
    }

    #[test]
    fn view_outside_the_grid_is_empty() {
        let r = visible_cells(vec2(-500.0, -500.0), vec2(-200.0, -200.0), Vec2::ZERO, vec2(16.0, 16.0), 8, 8, 1);
        assert!(r.is_empty());
        let r = visible_cells(vec2(0.0, 0.0), vec2(32.0, 32.0), vec2(200.0, 0.0), vec2(16.0, 16.0), 8, 8, 0);
        assert!(r.is_empty());
    }
}
