//! Board layout: mapping between viewport pixels and grid cells.

use crate::grid::Cell;
use crate::pathfinder::Route;
use kurbo::{Affine, Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Default cell edge length in pixels.
pub const DEFAULT_CELL_SIZE: f64 = 56.0;

/// Placement of the board in the viewport.
///
/// Three coordinate spaces are involved:
/// - viewport: pointer event coordinates (`clientX`/`clientY`),
/// - board: pixels relative to the board's top-left corner (used for drawing),
/// - grid: board pixels divided by the cell size (`x` = column, `y` = row).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BoardLayout {
    /// Viewport position of the board's top-left corner.
    pub origin: Point,
    /// Edge length of one cell in pixels.
    pub cell_size: f64,
    /// Cells per side.
    pub grid_size: u32,
}

impl BoardLayout {
    /// Create a layout with the board at the viewport origin.
    pub fn new(grid_size: u32, cell_size: f64) -> Self {
        Self {
            origin: Point::ZERO,
            cell_size,
            grid_size,
        }
    }

    /// Fit a square board into the given viewport rectangle.
    pub fn from_rect(rect: Rect, grid_size: u32) -> Self {
        let side = rect.width().min(rect.height());
        let cell_size = if grid_size == 0 {
            DEFAULT_CELL_SIZE
        } else {
            side / f64::from(grid_size)
        };
        Self {
            origin: rect.origin(),
            cell_size,
            grid_size,
        }
    }

    /// Transform from board to viewport coordinates.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.origin.to_vec2())
    }

    /// Transform from viewport to board coordinates.
    pub fn inverse_transform(&self) -> Affine {
        Affine::translate(-self.origin.to_vec2())
    }

    pub fn viewport_to_board(&self, point: Point) -> Point {
        self.inverse_transform() * point
    }

    pub fn board_to_viewport(&self, point: Point) -> Point {
        self.transform() * point
    }

    /// Board point in fractional cell units.
    pub fn board_to_grid(&self, point: Point) -> Point {
        Point::new(point.x / self.cell_size, point.y / self.cell_size)
    }

    /// Board extent in board coordinates.
    pub fn bounds(&self) -> Rect {
        let side = self.cell_size * f64::from(self.grid_size);
        Rect::new(0.0, 0.0, side, side)
    }

    /// Move the board, e.g. after the page was resized or scrolled.
    pub fn set_origin(&mut self, origin: Point) {
        self.origin = origin;
    }

    /// Cell under a viewport point, `None` outside the board.
    pub fn cell_at(&self, viewport_point: Point) -> Option<Cell> {
        self.cell_at_board(self.viewport_to_board(viewport_point))
    }

    /// Cell under a board point, `None` outside the board.
    pub fn cell_at_board(&self, point: Point) -> Option<Cell> {
        if !point.x.is_finite() || !point.y.is_finite() || self.cell_size <= 0.0 {
            return None;
        }
        let grid = self.board_to_grid(point);
        if grid.x < 0.0 || grid.y < 0.0 {
            return None;
        }
        let cell = Cell::new(grid.y.floor() as u32, grid.x.floor() as u32);
        cell.in_bounds(self.grid_size).then_some(cell)
    }

    /// Center of a cell in board coordinates.
    pub fn cell_center(&self, cell: Cell) -> Point {
        Point::new(
            (f64::from(cell.col) + 0.5) * self.cell_size,
            (f64::from(cell.row) + 0.5) * self.cell_size,
        )
    }

    /// Board-space points through the centers of the route's cells.
    pub fn route_points(&self, route: &Route) -> Vec<Point> {
        route.cells().iter().map(|&c| self.cell_center(c)).collect()
    }

    /// Cells crossed by a straight board-space move from `from` to `to`,
    /// both ends included.
    ///
    /// The move is clipped to the board first, so the result never holds more
    /// than `2 * grid_size + 1` entries and is empty when the move misses the
    /// board. Consecutive entries always differ by one step along a single
    /// axis, so every pair is a grid edge. An entry on the board's far edge is
    /// `None`.
    pub fn cells_along(&self, from: Point, to: Point) -> Vec<Option<Cell>> {
        if self.cell_size <= 0.0 || self.grid_size == 0 {
            return Vec::new();
        }
        let Some((a, b)) = clip_to_square(
            self.board_to_grid(from),
            self.board_to_grid(to),
            f64::from(self.grid_size),
        ) else {
            return Vec::new();
        };

        let (mut cx, mut cy) = (a.x.floor() as i64, a.y.floor() as i64);
        let (ex, ey) = (b.x.floor() as i64, b.y.floor() as i64);
        let delta = b - a;

        let step_x = if delta.x > 0.0 { 1 } else { -1 };
        let step_y = if delta.y > 0.0 { 1 } else { -1 };
        let (mut t_max_x, t_delta_x) = axis_start(a.x, cx, delta.x);
        let (mut t_max_y, t_delta_y) = axis_start(a.y, cy, delta.y);

        let steps = cx.abs_diff(ex) + cy.abs_diff(ey);
        let mut out = Vec::with_capacity(steps as usize + 1);
        out.push(self.grid_cell(cx, cy));
        for _ in 0..steps {
            let move_x = if cx == ex {
                false
            } else if cy == ey {
                true
            } else {
                t_max_x < t_max_y
            };
            if move_x {
                cx += step_x;
                t_max_x += t_delta_x;
            } else {
                cy += step_y;
                t_max_y += t_delta_y;
            }
            out.push(self.grid_cell(cx, cy));
        }
        out
    }

    fn grid_cell(&self, x: i64, y: i64) -> Option<Cell> {
        let row = u32::try_from(y).ok()?;
        let col = u32::try_from(x).ok()?;
        let cell = Cell::new(row, col);
        cell.in_bounds(self.grid_size).then_some(cell)
    }
}

/// Clip the segment `a -> b` to the square `[0, side]²` (Liang-Barsky).
///
/// Returns `None` when the segment misses the square or either end is not
/// finite.
fn clip_to_square(a: Point, b: Point, side: f64) -> Option<(Point, Point)> {
    let delta: Vec2 = b - a;
    if !(delta.x.is_finite() && delta.y.is_finite()) {
        return None;
    }
    let (mut t0, mut t1) = (0.0_f64, 1.0_f64);
    for (p, q) in [
        (-delta.x, a.x),
        (delta.x, side - a.x),
        (-delta.y, a.y),
        (delta.y, side - a.y),
    ] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
            continue;
        }
        let r = q / p;
        if p < 0.0 {
            if r > t1 {
                return None;
            }
            t0 = t0.max(r);
        } else {
            if r < t0 {
                return None;
            }
            t1 = t1.min(r);
        }
    }
    let clamp = |v: f64| v.clamp(0.0, side);
    let start = a + delta * t0;
    let end = a + delta * t1;
    Some((
        Point::new(clamp(start.x), clamp(start.y)),
        Point::new(clamp(end.x), clamp(end.y)),
    ))
}

/// Parametric distance to the first cell boundary and between boundaries.
fn axis_start(pos: f64, cell: i64, delta: f64) -> (f64, f64) {
    if delta > 0.0 {
        (((cell + 1) as f64 - pos) / delta, 1.0 / delta)
    } else if delta < 0.0 {
        ((pos - cell as f64) / -delta, 1.0 / -delta)
    } else {
        (f64::INFINITY, f64::INFINITY)
    }
}

/// Total `|dx| + |dy|` length of a polyline.
pub fn manhattan_length(points: &[Point]) -> f64 {
    points
        .windows(2)
        .map(|p| (p[1].x - p[0].x).abs() + (p[1].y - p[0].y).abs())
        .sum()
}

/// Two-leg stroke from `start` to `end`: horizontal first, then vertical.
pub fn elbow(start: Point, end: Point) -> Vec<Point> {
    vec![start, Point::new(end.x, start.y), end]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn layout() -> BoardLayout {
        let mut layout = BoardLayout::new(4, 50.0);
        layout.set_origin(Point::new(100.0, 20.0));
        layout
    }

    #[test]
    fn test_viewport_round_trip() {
        let layout = layout();
        let p = Point::new(173.0, 91.0);
        let board = layout.viewport_to_board(p);
        assert!((board.x - 73.0).abs() < f64::EPSILON);
        assert!((board.y - 71.0).abs() < f64::EPSILON);
        assert_eq!(layout.board_to_viewport(board), p);
    }

    #[test]
    fn test_cell_at() {
        let layout = layout();
        assert_eq!(layout.cell_at(Point::new(100.0, 20.0)), Some(Cell::new(0, 0)));
        assert_eq!(layout.cell_at(Point::new(173.0, 91.0)), Some(Cell::new(1, 1)));
        assert_eq!(layout.cell_at(Point::new(299.0, 219.0)), Some(Cell::new(3, 3)));
    }

    #[test]
    fn test_cell_at_outside_board() {
        let layout = layout();
        assert_eq!(layout.cell_at(Point::new(99.0, 50.0)), None);
        assert_eq!(layout.cell_at(Point::new(150.0, 10.0)), None);
        assert_eq!(layout.cell_at(Point::new(300.0, 50.0)), None);
        assert_eq!(layout.cell_at(Point::new(f64::NAN, 50.0)), None);
    }

    #[test]
    fn test_cell_center() {
        let layout = BoardLayout::new(4, 50.0);
        assert_eq!(layout.cell_center(Cell::new(0, 0)), Point::new(25.0, 25.0));
        assert_eq!(layout.cell_center(Cell::new(2, 1)), Point::new(75.0, 125.0));
    }

    #[test]
    fn test_from_rect_uses_shorter_side() {
        let layout = BoardLayout::from_rect(Rect::new(10.0, 10.0, 410.0, 310.0), 6);
        assert!((layout.cell_size - 50.0).abs() < f64::EPSILON);
        assert_eq!(layout.origin, Point::new(10.0, 10.0));
        assert!((layout.bounds().width() - 300.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_cells_along_single_cell() {
        let layout = BoardLayout::new(4, 50.0);
        let cells = layout.cells_along(Point::new(10.0, 10.0), Point::new(40.0, 30.0));
        assert_eq!(cells, vec![Some(Cell::new(0, 0))]);
    }

    #[test]
    fn test_cells_along_diagonal_is_four_connected() {
        let layout = BoardLayout::new(4, 50.0);
        let cells = layout.cells_along(Point::new(25.0, 30.0), Point::new(175.0, 160.0));

        assert_eq!(cells.first(), Some(&Some(Cell::new(0, 0))));
        assert_eq!(cells.last(), Some(&Some(Cell::new(3, 3))));
        assert_eq!(cells.len(), 7);
        for pair in cells.windows(2) {
            let (a, b) = (pair[0].unwrap(), pair[1].unwrap());
            assert!(a.is_adjacent(b));
        }
    }

    #[test]
    fn test_cells_along_leaving_board() {
        let layout = BoardLayout::new(2, 50.0);
        let cells = layout.cells_along(Point::new(75.0, 25.0), Point::new(125.0, 25.0));
        assert_eq!(cells, vec![Some(Cell::new(0, 1)), None]);
    }

    #[test]
    fn test_cells_along_far_off_board_is_clipped() {
        let layout = BoardLayout::new(3, 50.0);
        let cells = layout.cells_along(Point::new(25.0, 125.0), Point::new(1e300, 125.0));
        assert!(cells.len() <= 4);
        assert_eq!(
            &cells[..3],
            &[Some(Cell::new(2, 0)), Some(Cell::new(2, 1)), Some(Cell::new(2, 2))]
        );

        let crossing = layout.cells_along(Point::new(-1e12, 75.0), Point::new(1e12, 75.0));
        assert!(crossing.len() <= 2 * 3 + 1);
        assert_eq!(crossing.first(), Some(&Some(Cell::new(1, 0))));
    }

    #[test]
    fn test_cells_along_missing_board_is_empty() {
        let layout = BoardLayout::new(3, 50.0);
        let above = layout.cells_along(Point::new(-500.0, -10.0), Point::new(1e300, -10.0));
        assert!(above.is_empty());
        let infinite = layout.cells_along(Point::new(0.0, 0.0), Point::new(f64::INFINITY, 0.0));
        assert!(infinite.is_empty());
        let nan = layout.cells_along(Point::new(f64::NAN, 0.0), Point::new(10.0, 10.0));
        assert!(nan.is_empty());
    }

    #[test]
    fn test_manhattan_length_and_elbow() {
        let points = elbow(Point::new(0.0, 0.0), Point::new(30.0, -40.0));
        assert_eq!(points[1], Point::new(30.0, 0.0));
        assert!((manhattan_length(&points) - 70.0).abs() < f64::EPSILON);
        assert!(manhattan_length(&points[..1]).abs() < f64::EPSILON);
    }
}
