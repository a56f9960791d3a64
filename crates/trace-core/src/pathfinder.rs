//! Breadth-first route search between two targets.

use crate::config::MAX_GRID_SIZE;
use crate::grid::Cell;
use crate::ledger::EdgeLedger;
use serde::{Deserialize, Serialize};
use std::collections::{HashSet, VecDeque};

/// Neighbor expansion order: right, left, down, up.
const DIRECTIONS: [(i32, i32); 4] = [(0, 1), (0, -1), (1, 0), (-1, 0)];

/// An axis-aligned path of side-adjacent cells, endpoints included.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route(Vec<Cell>);

impl Route {
    pub fn cells(&self) -> &[Cell] {
        &self.0
    }

    /// Number of cells, endpoints included.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of unit steps along the route.
    pub fn steps(&self) -> usize {
        self.0.len().saturating_sub(1)
    }

    pub fn start(&self) -> Option<Cell> {
        self.0.first().copied()
    }

    pub fn end(&self) -> Option<Cell> {
        self.0.last().copied()
    }

    pub fn into_cells(self) -> Vec<Cell> {
        self.0
    }
}

/// Find a shortest route from `start` to `end` on a `size`×`size` grid.
///
/// The route never enters an `occupied` cell other than `end` and never crosses
/// an edge blocked in `ledger`. Returns `None` when `start` is occupied, either
/// endpoint is off the grid, the grid is larger than [`MAX_GRID_SIZE`], or the
/// search exhausts without reaching `end`.
pub fn find_route(
    size: u32,
    start: Cell,
    end: Cell,
    occupied: &HashSet<Cell>,
    ledger: &EdgeLedger,
) -> Option<Route> {
    if size > MAX_GRID_SIZE || !start.in_bounds(size) || !end.in_bounds(size) {
        return None;
    }
    if occupied.contains(&start) {
        return None;
    }
    if start == end {
        return Some(Route(vec![start]));
    }

    let total = usize::try_from(u64::from(size) * u64::from(size)).ok()?;
    let mut visited = vec![false; total];
    let mut parent: Vec<Option<usize>> = vec![None; total];
    let mut queue = VecDeque::new();

    let start_idx = start.index(size);
    let end_idx = end.index(size);
    visited[start_idx] = true;
    queue.push_back(start);

    let mut found = false;
    'search: while let Some(cell) = queue.pop_front() {
        for (d_row, d_col) in DIRECTIONS {
            let Some(next) = cell.offset(d_row, d_col, size) else {
                continue;
            };
            let next_idx = next.index(size);
            if visited[next_idx] {
                continue;
            }
            if ledger.is_blocked(cell, next) {
                continue;
            }
            if next != end && occupied.contains(&next) {
                continue;
            }
            visited[next_idx] = true;
            parent[next_idx] = Some(cell.index(size));
            if next_idx == end_idx {
                found = true;
                break 'search;
            }
            queue.push_back(next);
        }
    }

    if !found {
        return None;
    }

    let mut cells = Vec::new();
    let mut cur = Some(end_idx);
    while let Some(idx) = cur {
        cells.push(Cell::from_index(idx, size));
        cur = parent[idx];
    }
    cells.reverse();
    Some(Route(cells))
}
