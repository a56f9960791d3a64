//! Ledger of grid edges consumed by completed routes.

use crate::grid::Cell;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// An unordered pair of side-adjacent cells.
///
/// `a <= b` always holds, so `(A, B)` and `(B, A)` compare equal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Edge {
    a: Cell,
    b: Cell,
}

impl Edge {
    /// Canonical edge between two cells, or `None` if they are not adjacent.
    pub fn between(a: Cell, b: Cell) -> Option<Edge> {
        if !a.is_adjacent(b) {
            return None;
        }
        Some(if a <= b { Edge { a, b } } else { Edge { a: b, b: a } })
    }

    /// The two endpoints, lower cell first.
    pub fn cells(&self) -> (Cell, Cell) {
        (self.a, self.b)
    }
}

/// Edges that may no longer be crossed this round.
#[derive(Debug, Clone, Default)]
pub struct EdgeLedger {
    blocked: HashSet<Edge>,
}

impl EdgeLedger {
    /// Create an empty ledger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Block every edge traversed by the route.
    pub fn block(&mut self, route: &[Cell]) {
        for pair in route.windows(2) {
            match Edge::between(pair[0], pair[1]) {
                Some(edge) => {
                    self.blocked.insert(edge);
                }
                None => log::warn!(
                    "Skipping non-adjacent route step ({}, {}) -> ({}, {})",
                    pair[0].row,
                    pair[0].col,
                    pair[1].row,
                    pair[1].col
                ),
            }
        }
    }

    pub fn is_blocked(&self, a: Cell, b: Cell) -> bool {
        Edge::between(a, b).is_some_and(|edge| self.blocked.contains(&edge))
    }

    pub fn contains(&self, edge: &Edge) -> bool {
        self.blocked.contains(edge)
    }

    pub fn clear(&mut self) {
        self.blocked.clear();
    }

    pub fn len(&self) -> usize {
        self.blocked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.blocked.is_empty()
    }

    pub fn edges(&self) -> impl Iterator<Item = &Edge> {
        self.blocked.iter()
    }
}
