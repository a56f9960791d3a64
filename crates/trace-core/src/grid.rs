//! Grid model: cells and the numbered targets placed on them.

use crate::config::{ConfigError, MAX_GRID_SIZE, RoundConfig};
use rand::Rng;
use rand::seq::index;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A grid coordinate, 0-indexed from the top-left corner.
///
/// Ordering is row-major, which is what edge canonicalization relies on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Cell {
    pub row: u32,
    pub col: u32,
}

impl Cell {
    /// Create a new cell.
    pub const fn new(row: u32, col: u32) -> Self {
        Self { row, col }
    }

    /// Check whether the cell lies on a `size`×`size` grid.
    pub fn in_bounds(self, size: u32) -> bool {
        self.row < size && self.col < size
    }

    /// Manhattan distance to another cell.
    pub fn manhattan(self, other: Cell) -> u32 {
        self.row.abs_diff(other.row) + self.col.abs_diff(other.col)
    }

    /// Whether the two cells share a side.
    pub fn is_adjacent(self, other: Cell) -> bool {
        self.manhattan(other) == 1
    }

    /// Step by a signed offset, staying on a `size`×`size` grid.
    pub fn offset(self, d_row: i32, d_col: i32, size: u32) -> Option<Cell> {
        let row = self.row.checked_add_signed(d_row)?;
        let col = self.col.checked_add_signed(d_col)?;
        let cell = Cell::new(row, col);
        cell.in_bounds(size).then_some(cell)
    }

    /// Row-major index on a grid of the given size.
    pub(crate) fn index(self, size: u32) -> usize {
        self.row as usize * size as usize + self.col as usize
    }

    /// Inverse of [`Cell::index`].
    pub(crate) fn from_index(index: usize, size: u32) -> Cell {
        let size = size as usize;
        Cell::new((index / size) as u32, (index % size) as u32)
    }
}

/// A numbered dot the player must visit in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Target {
    /// Ordinal in `1..=count`.
    pub ordinal: u32,
    pub cell: Cell,
}

/// Choose `count` distinct cells uniformly at random and number them in the
/// order they were drawn.
pub fn generate(size: u32, count: u32) -> Result<Vec<Target>, ConfigError> {
    generate_with_rng(size, count, &mut rand::rng())
}

/// [`generate`] with a caller-supplied random source.
pub fn generate_with_rng<R: Rng + ?Sized>(
    size: u32,
    count: u32,
    rng: &mut R,
) -> Result<Vec<Target>, ConfigError> {
    let config = RoundConfig::new(size, count);
    config.validate()?;

    let capacity = usize::try_from(config.capacity()).map_err(|_| ConfigError::GridTooLarge {
        size,
        max: MAX_GRID_SIZE,
    })?;
    let targets = index::sample(rng, capacity, count as usize)
        .into_iter()
        .enumerate()
        .map(|(i, idx)| Target {
            ordinal: i as u32 + 1,
            cell: Cell::from_index(idx, size),
        })
        .collect();
    Ok(targets)
}

/// An N×N grid together with its targets.
#[derive(Debug, Clone)]
pub struct Grid {
    size: u32,
    /// Targets sorted by ordinal; `targets[i].ordinal == i + 1`.
    targets: Vec<Target>,
    by_cell: HashMap<Cell, u32>,
}

impl Grid {
    /// Generate a random grid for the given configuration.
    pub fn random(config: RoundConfig) -> Result<Self, ConfigError> {
        let targets = generate(config.grid_size, config.target_count)?;
        Self::from_targets(config.grid_size, targets)
    }

    /// Build a grid from an explicit target layout.
    pub fn from_targets(size: u32, mut targets: Vec<Target>) -> Result<Self, ConfigError> {
        RoundConfig::new(size, targets.len() as u32).validate()?;

        targets.sort_by_key(|t| t.ordinal);
        let mut by_cell = HashMap::with_capacity(targets.len());
        for (i, target) in targets.iter().enumerate() {
            if target.ordinal != i as u32 + 1 {
                return Err(ConfigError::InvalidLayout(format!(
                    "expected ordinal {} but found {}",
                    i + 1,
                    target.ordinal
                )));
            }
            if !target.cell.in_bounds(size) {
                return Err(ConfigError::InvalidLayout(format!(
                    "target {} at ({}, {}) is outside a {}x{} grid",
                    target.ordinal, target.cell.row, target.cell.col, size, size
                )));
            }
            if by_cell.insert(target.cell, target.ordinal).is_some() {
                return Err(ConfigError::InvalidLayout(format!(
                    "cell ({}, {}) holds more than one target",
                    target.cell.row, target.cell.col
                )));
            }
        }

        Ok(Self {
            size,
            targets,
            by_cell,
        })
    }

    /// Cells per side.
    pub fn size(&self) -> u32 {
        self.size
    }

    /// Number of targets.
    pub fn target_count(&self) -> u32 {
        self.targets.len() as u32
    }

    /// Targets in ordinal order.
    pub fn targets(&self) -> &[Target] {
        &self.targets
    }

    /// Cell holding the given ordinal.
    pub fn target(&self, ordinal: u32) -> Option<Cell> {
        let idx = ordinal.checked_sub(1)? as usize;
        self.targets.get(idx).map(|t| t.cell)
    }

    /// Ordinal of the target on the given cell, if any.
    pub fn ordinal_at(&self, cell: Cell) -> Option<u32> {
        self.by_cell.get(&cell).copied()
    }

    pub fn contains(&self, cell: Cell) -> bool {
        cell.in_bounds(self.size)
    }

    /// All target cells except those holding the two given ordinals.
    pub fn occupied_except(&self, a: u32, b: u32) -> HashSet<Cell> {
        self.targets
            .iter()
            .filter(|t| t.ordinal != a && t.ordinal != b)
            .map(|t| t.cell)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn layout(size: u32, cells: &[(u32, u32)]) -> Grid {
        let targets = cells
            .iter()
            .enumerate()
            .map(|(i, &(row, col))| Target {
                ordinal: i as u32 + 1,
                cell: Cell::new(row, col),
            })
            .collect();
        Grid::from_targets(size, targets).unwrap()
    }

    #[test]
    fn test_generate_ordinals_and_cells() {
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..50 {
            let targets = generate_with_rng(6, 8, &mut rng).unwrap();
            assert_eq!(targets.len(), 8);

            let ordinals: Vec<u32> = targets.iter().map(|t| t.ordinal).collect();
            assert_eq!(ordinals, (1..=8).collect::<Vec<_>>());

            let cells: HashSet<Cell> = targets.iter().map(|t| t.cell).collect();
            assert_eq!(cells.len(), 8);
            assert!(cells.iter().all(|c| c.in_bounds(6)));
        }
    }

    #[test]
    fn test_generate_fills_whole_grid() {
        let targets = generate(3, 9).unwrap();
        let cells: HashSet<Cell> = targets.iter().map(|t| t.cell).collect();
        assert_eq!(cells.len(), 9);
    }

    #[test]
    fn test_generate_rejects_overfull_grid() {
        assert!(matches!(
            generate(2, 5),
            Err(ConfigError::CapacityExceeded { count: 5, capacity: 4 })
        ));
    }

    #[test]
    fn test_lookup() {
        let grid = layout(3, &[(0, 0), (2, 0), (2, 2)]);
        assert_eq!(grid.target(1), Some(Cell::new(0, 0)));
        assert_eq!(grid.target(3), Some(Cell::new(2, 2)));
        assert_eq!(grid.target(0), None);
        assert_eq!(grid.target(4), None);
        assert_eq!(grid.ordinal_at(Cell::new(2, 0)), Some(2));
        assert_eq!(grid.ordinal_at(Cell::new(1, 1)), None);

        let occupied = grid.occupied_except(1, 2);
        assert_eq!(occupied.len(), 1);
        assert!(occupied.contains(&Cell::new(2, 2)));
    }

    #[test]
    fn test_from_targets_sorts_by_ordinal() {
        let targets = vec![
            Target {
                ordinal: 2,
                cell: Cell::new(1, 1),
            },
            Target {
                ordinal: 1,
                cell: Cell::new(0, 0),
            },
        ];
        let grid = Grid::from_targets(2, targets).unwrap();
        assert_eq!(grid.targets()[0].ordinal, 1);
        assert_eq!(grid.target(2), Some(Cell::new(1, 1)));
    }

    #[test]
    fn test_from_targets_rejects_bad_layouts() {
        let gap = vec![
            Target {
                ordinal: 1,
                cell: Cell::new(0, 0),
            },
            Target {
                ordinal: 3,
                cell: Cell::new(0, 1),
            },
        ];
        assert!(matches!(Grid::from_targets(3, gap), Err(ConfigError::InvalidLayout(_))));

        let shared = vec![
            Target {
                ordinal: 1,
                cell: Cell::new(0, 0),
            },
            Target {
                ordinal: 2,
                cell: Cell::new(0, 0),
            },
        ];
        assert!(matches!(Grid::from_targets(3, shared), Err(ConfigError::InvalidLayout(_))));

        let outside = vec![Target {
            ordinal: 1,
            cell: Cell::new(3, 0),
        }];
        assert!(matches!(Grid::from_targets(3, outside), Err(ConfigError::InvalidLayout(_))));
    }

    #[test]
    fn test_cell_offset_stays_on_grid() {
        let corner = Cell::new(0, 0);
        assert_eq!(corner.offset(0, -1, 3), None);
        assert_eq!(corner.offset(-1, 0, 3), None);
        assert_eq!(corner.offset(0, 1, 3), Some(Cell::new(0, 1)));
        assert_eq!(Cell::new(2, 2).offset(1, 0, 3), None);
    }
}
