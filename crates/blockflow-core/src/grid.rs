//! Grid snapping for aligning block geometry to the canvas grid.

use kurbo::{Point, Rect};

/// Default grid cell size in canvas units (matches the visual grid).
pub const GRID_SIZE: f64 = 5.0;

/// Snap a value to the nearest multiple of the grid cell size.
///
/// Rounds half-up cases away from zero (`round` semantics), so 2.5 at
/// cell 5 snaps to 5. Idempotent: snapping a snapped value is a no-op.
/// A non-positive cell size passes the value through unchanged.
pub fn snap(value: f64, cell: f64) -> f64 {
    if cell <= 0.0 {
        return value;
    }
    (value / cell).round() * cell
}

/// Snap a point's coordinates independently to the grid.
pub fn snap_point(point: Point, cell: f64) -> Point {
    Point::new(snap(point.x, cell), snap(point.y, cell))
}

/// Snap all four fields of a rectangle (origin and extent) independently.
///
/// Width and height are snapped as lengths, not as far edges, so a
/// 100-wide block stays 100 wide wherever its origin lands.
pub fn snap_rect(rect: Rect, cell: f64) -> Rect {
    let x = snap(rect.x0, cell);
    let y = snap(rect.y0, cell);
    let width = snap(rect.width(), cell);
    let height = snap(rect.height(), cell);
    Rect::new(x, y, x + width, y + height)
}

/// Check whether a value sits exactly on the grid.
pub fn is_aligned(value: f64, cell: f64) -> bool {
    if cell <= 0.0 {
        return true;
    }
    (value - snap(value, cell)).abs() < 1e-9
}
