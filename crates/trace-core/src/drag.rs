//! Drag gesture state machine for a single segment attempt.

use crate::grid::{Cell, Grid};
use crate::layout::{BoardLayout, elbow, manhattan_length};
use crate::ledger::EdgeLedger;
use crate::pathfinder::{Route, find_route};
use kurbo::Point;
use serde::{Deserialize, Serialize};

#[cfg(target_arch = "wasm32")]
use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// A committed connection between two consecutive targets.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    pub from: u32,
    pub to: u32,
    pub reaction_ms: u64,
    pub route: Route,
    /// Board-space points of the drawn stroke.
    pub points: Vec<Point>,
    /// Manhattan length of the stroke in pixels.
    pub distance_px: f64,
}

/// A drag in progress, started on the anchor target.
#[derive(Debug, Clone)]
pub struct ArmedDrag {
    /// Ordinal the drag started from.
    pub ordinal: u32,
    pub anchor: Cell,
    started_at: Instant,
    /// Anchor center in board coordinates.
    origin: Point,
    /// Last sampled pointer position in viewport coordinates.
    last_position: Point,
    crossed_blocked: bool,
}

impl ArmedDrag {
    /// Whether the pointer has crossed an already used edge.
    pub fn crossed_blocked(&self) -> bool {
        self.crossed_blocked
    }
}

/// State of the drag gesture.
#[derive(Debug, Clone, Default)]
pub enum DragState {
    /// Waiting for a press on the anchor target.
    #[default]
    Idle,
    /// Pointer is down on the anchor and being dragged.
    Armed(ArmedDrag),
}

/// What a press did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PressOutcome {
    /// The anchor was pressed and a drag began.
    Armed { ordinal: u32 },
    /// A numbered cell other than the anchor was pressed.
    WrongTarget { pressed: u32 },
    /// Nothing numbered under the pointer, or a drag is already active.
    Ignored,
}

/// Pointer movement recorded during a drag.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveSample {
    pub dx: f64,
    pub dy: f64,
    /// Provisional stroke from the anchor to the pointer (board coordinates).
    pub provisional: Vec<Point>,
}

/// Why a release did not complete the segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    /// Released somewhere other than the next target.
    WrongTarget { hit: Option<u32> },
    /// The pointer crossed an edge used by an earlier segment.
    CrossedBlockedEdge,
    /// No legal route connects the two targets any more.
    NoRoute,
}

/// Result of resolving a release.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Committed(Segment),
    Rejected(RejectReason),
}

/// Drives Idle -> Armed -> (Resolving) -> Idle for each segment attempt.
///
/// Move and release only have an effect while armed, so at most one drag can
/// be in flight.
#[derive(Debug, Clone, Default)]
pub struct DragController {
    state: DragState,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &DragState {
        &self.state
    }

    pub fn is_armed(&self) -> bool {
        matches!(self.state, DragState::Armed(_))
    }

    /// Handle a pointer press at a viewport position.
    pub fn press(
        &mut self,
        grid: &Grid,
        layout: &BoardLayout,
        anchor_ordinal: u32,
        position: Point,
        now: Instant,
    ) -> PressOutcome {
        if self.is_armed() {
            return PressOutcome::Ignored;
        }
        let Some(cell) = layout.cell_at(position) else {
            return PressOutcome::Ignored;
        };
        let Some(ordinal) = grid.ordinal_at(cell) else {
            return PressOutcome::Ignored;
        };
        if ordinal != anchor_ordinal {
            return PressOutcome::WrongTarget { pressed: ordinal };
        }

        self.state = DragState::Armed(ArmedDrag {
            ordinal,
            anchor: cell,
            started_at: now,
            origin: layout.cell_center(cell),
            last_position: position,
            crossed_blocked: false,
        });
        PressOutcome::Armed { ordinal }
    }

    /// Handle pointer movement. Returns `None` unless a drag is active.
    ///
    /// Samples that are not finite, or whose delta is not, are dropped and
    /// leave the drag untouched.
    pub fn track(
        &mut self,
        layout: &BoardLayout,
        ledger: &EdgeLedger,
        position: Point,
    ) -> Option<MoveSample> {
        let DragState::Armed(drag) = &mut self.state else {
            return None;
        };

        let dx = position.x - drag.last_position.x;
        let dy = position.y - drag.last_position.y;
        if !(dx.is_finite() && dy.is_finite()) {
            return None;
        }
        if crosses_blocked_edge(layout, ledger, drag.last_position, position) {
            drag.crossed_blocked = true;
        }
        drag.last_position = position;

        Some(MoveSample {
            dx,
            dy,
            provisional: elbow(drag.origin, layout.viewport_to_board(position)),
        })
    }

    /// Resolve a release. Returns `None` unless a drag was active.
    ///
    /// On commit the route's edges are blocked in `ledger`.
    pub fn release(
        &mut self,
        grid: &Grid,
        layout: &BoardLayout,
        ledger: &mut EdgeLedger,
        position: Point,
        now: Instant,
    ) -> Option<Resolution> {
        let DragState::Armed(mut drag) = std::mem::take(&mut self.state) else {
            return None;
        };
        if crosses_blocked_edge(layout, ledger, drag.last_position, position) {
            drag.crossed_blocked = true;
        }
        Some(resolve(grid, layout, ledger, &drag, position, now))
    }

    /// Abandon an active drag without resolving it.
    pub fn cancel(&mut self) {
        self.state = DragState::Idle;
    }
}

fn resolve(
    grid: &Grid,
    layout: &BoardLayout,
    ledger: &mut EdgeLedger,
    drag: &ArmedDrag,
    position: Point,
    now: Instant,
) -> Resolution {
    let next = drag.ordinal + 1;
    let hit = layout.cell_at(position).and_then(|c| grid.ordinal_at(c));
    if hit != Some(next) {
        return Resolution::Rejected(RejectReason::WrongTarget { hit });
    }
    if drag.crossed_blocked {
        return Resolution::Rejected(RejectReason::CrossedBlockedEdge);
    }
    let Some(end) = grid.target(next) else {
        return Resolution::Rejected(RejectReason::WrongTarget { hit });
    };

    let occupied = grid.occupied_except(drag.ordinal, next);
    let Some(route) = find_route(grid.size(), drag.anchor, end, &occupied, ledger) else {
        return Resolution::Rejected(RejectReason::NoRoute);
    };

    ledger.block(route.cells());
    let points = layout.route_points(&route);
    let distance_px = manhattan_length(&points);
    Resolution::Committed(Segment {
        from: drag.ordinal,
        to: next,
        reaction_ms: now.duration_since(drag.started_at).as_millis() as u64,
        route,
        points,
        distance_px,
    })
}

/// Whether the straight move between two viewport points crosses a blocked edge.
fn crosses_blocked_edge(layout: &BoardLayout, ledger: &EdgeLedger, from: Point, to: Point) -> bool {
    if ledger.is_empty() {
        return false;
    }
    let from = layout.viewport_to_board(from);
    let to = layout.viewport_to_board(to);
    layout
        .cells_along(from, to)
        .windows(2)
        .any(|pair| matches!((pair[0], pair[1]), (Some(a), Some(b)) if ledger.is_blocked(a, b)))
}
