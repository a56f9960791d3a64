//! A single round: grid, blocked edges, drag gesture and metrics.

use crate::drag::{DragController, PressOutcome, RejectReason, Resolution, Segment};
use crate::grid::Grid;
use crate::input::PointerEvent;
use crate::layout::{BoardLayout, elbow};
use crate::ledger::EdgeLedger;
use crate::metrics::{MetricsAggregator, Summary};
use crate::pathfinder::{Route, find_route};
use crate::render::{Renderer, RoundStatus};
use kurbo::Point;
use std::time::Duration;

#[cfg(target_arch = "wasm32")]
use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// What a pointer event did to the round.
#[derive(Debug, Clone, PartialEq)]
pub enum InputOutcome {
    Pressed(PressOutcome),
    Moved,
    Resolved(Resolution),
    /// The event had no effect (no active drag, or the round is over).
    Ignored,
}

/// State owned by one round. A new round always starts from a fresh value.
#[derive(Debug, Clone)]
pub struct Round {
    grid: Grid,
    layout: BoardLayout,
    ledger: EdgeLedger,
    metrics: MetricsAggregator,
    drag: DragController,
    segments: Vec<Segment>,
    /// Ordinal the next segment starts from.
    anchor: u32,
    started_at: Instant,
    finished_at: Option<Instant>,
}

impl Round {
    /// Start a round on the given grid.
    pub fn new(grid: Grid, mut layout: BoardLayout, now: Instant) -> Self {
        layout.grid_size = grid.size();
        let mut round = Self {
            metrics: MetricsAggregator::new(grid.target_count()),
            grid,
            layout,
            ledger: EdgeLedger::new(),
            drag: DragController::new(),
            segments: Vec::new(),
            anchor: 1,
            started_at: now,
            finished_at: None,
        };
        if round.is_complete() {
            round.finish(now);
        }
        round
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn layout(&self) -> &BoardLayout {
        &self.layout
    }

    /// Update the board placement, e.g. after a resize.
    pub fn set_layout(&mut self, mut layout: BoardLayout) {
        layout.grid_size = self.grid.size();
        self.layout = layout;
    }

    pub fn ledger(&self) -> &EdgeLedger {
        &self.ledger
    }

    pub fn metrics(&self) -> &MetricsAggregator {
        &self.metrics
    }

    /// Committed segments in order.
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn anchor(&self) -> u32 {
        self.anchor
    }

    pub fn is_dragging(&self) -> bool {
        self.drag.is_armed()
    }

    /// The round is over once the anchor has no successor.
    pub fn is_complete(&self) -> bool {
        self.anchor >= self.grid.target_count()
    }

    pub fn status(&self) -> RoundStatus {
        RoundStatus {
            current_ordinal: self.anchor,
            wrong_releases: self.metrics.wrong_releases(),
        }
    }

    /// Time since the round started, frozen once it completes.
    pub fn elapsed(&self, now: Instant) -> Duration {
        self.finished_at
            .unwrap_or(now)
            .duration_since(self.started_at)
    }

    /// Final results, available once the round is complete.
    pub fn summary(&self) -> Option<Summary> {
        self.is_complete().then(|| self.metrics.summary())
    }

    /// Route the current segment would take under the current constraints.
    pub fn next_route(&self) -> Option<Route> {
        if self.is_complete() {
            return None;
        }
        let next = self.anchor + 1;
        let start = self.grid.target(self.anchor)?;
        let end = self.grid.target(next)?;
        let occupied = self.grid.occupied_except(self.anchor, next);
        find_route(self.grid.size(), start, end, &occupied, &self.ledger)
    }

    pub fn handle_pointer_event(
        &mut self,
        event: PointerEvent,
        now: Instant,
        renderer: &mut dyn Renderer,
    ) -> InputOutcome {
        match event {
            PointerEvent::Down { position } => self.press(position, now, renderer),
            PointerEvent::Move { position } => self.drag_to(position, renderer),
            PointerEvent::Up { position } => self.release(position, now, renderer),
        }
    }

    pub fn press(
        &mut self,
        position: Point,
        now: Instant,
        renderer: &mut dyn Renderer,
    ) -> InputOutcome {
        if self.is_complete() {
            return InputOutcome::Ignored;
        }
        let outcome = self
            .drag
            .press(&self.grid, &self.layout, self.anchor, position, now);
        match outcome {
            PressOutcome::Armed { .. } => {
                if let Some(anchor) = self.grid.target(self.anchor) {
                    let origin = self.layout.cell_center(anchor);
                    let cursor = self.layout.viewport_to_board(position);
                    renderer.draw_provisional(&elbow(origin, cursor));
                }
                renderer.update_status(self.status());
            }
            PressOutcome::WrongTarget { pressed } => {
                self.metrics.record_wrong_release();
                log::debug!("Pressed {} while expecting {}", pressed, self.anchor);
                renderer.flash_wrong(pressed);
                renderer.update_status(self.status());
            }
            PressOutcome::Ignored => return InputOutcome::Ignored,
        }
        InputOutcome::Pressed(outcome)
    }

    pub fn drag_to(&mut self, position: Point, renderer: &mut dyn Renderer) -> InputOutcome {
        let Some(sample) = self.drag.track(&self.layout, &self.ledger, position) else {
            return InputOutcome::Ignored;
        };
        self.metrics.record_cursor_delta(sample.dx, sample.dy);
        renderer.draw_provisional(&sample.provisional);
        InputOutcome::Moved
    }

    pub fn release(
        &mut self,
        position: Point,
        now: Instant,
        renderer: &mut dyn Renderer,
    ) -> InputOutcome {
        let Some(resolution) =
            self.drag
                .release(&self.grid, &self.layout, &mut self.ledger, position, now)
        else {
            return InputOutcome::Ignored;
        };
        renderer.clear_provisional();

        match &resolution {
            Resolution::Committed(segment) => {
                log::debug!(
                    "Connected {} -> {} in {} ms over {} steps",
                    segment.from,
                    segment.to,
                    segment.reaction_ms,
                    segment.route.steps()
                );
                self.metrics
                    .record_segment(segment.reaction_ms, segment.distance_px);
                renderer.draw_route(&segment.points);
                self.segments.push(segment.clone());
                self.anchor = segment.to;
                if self.is_complete() {
                    self.finish(now);
                }
            }
            Resolution::Rejected(reason) => {
                self.metrics.record_wrong_release();
                match reason {
                    RejectReason::WrongTarget { hit } => {
                        log::debug!("Released on {:?}, expected {}", hit, self.anchor + 1)
                    }
                    RejectReason::CrossedBlockedEdge => {
                        log::debug!("Drag from {} crossed a used edge", self.anchor)
                    }
                    RejectReason::NoRoute => {
                        log::debug!("No route left from {} to {}", self.anchor, self.anchor + 1)
                    }
                }
            }
        }
        renderer.update_status(self.status());
        InputOutcome::Resolved(resolution)
    }

    fn finish(&mut self, now: Instant) {
        if self.finished_at.is_some() {
            return;
        }
        self.finished_at = Some(now);
        let total = now.duration_since(self.started_at);
        self.metrics.finish(total);
        log::info!(
            "Round complete: {} targets in {} ms, {} wrong releases",
            self.grid.target_count(),
            total.as_millis(),
            self.metrics.wrong_releases()
        );
    }
}
