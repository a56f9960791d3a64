//! Headless play-through of a round.
//!
//! Drives a [`Game`] with synthetic pointer events along the routes the
//! engine itself would accept, the way a perfect player would.

use crate::config::{AppConfig, AppError};
use kurbo::Point;
use rand::SeedableRng;
use rand::rngs::StdRng;
use std::time::Duration;
use trace_core::grid::{self, Grid};
use trace_core::{
    BoardLayout, CommandBuffer, Game, InputOutcome, PointerEvent, Resolution, Round, Summary,
};

#[cfg(target_arch = "wasm32")]
use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// Simulated time to start a drag.
const PRESS_DELAY: Duration = Duration::from_millis(180);
/// Simulated time per cell travelled.
const STEP_DELAY: Duration = Duration::from_millis(45);

/// Outcome of an autoplayed round.
#[derive(Debug, Clone)]
pub struct Report {
    /// Targets in ordinal order.
    pub targets: Vec<grid::Target>,
    pub segments: usize,
    /// Set when the round finished.
    pub summary: Option<Summary>,
    /// ASCII picture of the final board.
    pub board: String,
}

impl Report {
    pub fn is_complete(&self) -> bool {
        self.summary.is_some()
    }
}

/// Build the grid for a configuration, seeded when the config asks for it.
pub fn build_grid(config: &AppConfig) -> Result<Grid, AppError> {
    let round = config.round;
    let grid = match config.seed {
        Some(seed) => {
            let mut rng = StdRng::seed_from_u64(seed);
            let targets = grid::generate_with_rng(round.grid_size, round.target_count, &mut rng)?;
            Grid::from_targets(round.grid_size, targets)?
        }
        None => Grid::random(round)?,
    };
    Ok(grid)
}

/// Play a fresh round for `config`.
pub fn play(config: &AppConfig) -> Result<Report, AppError> {
    config.validate()?;
    let grid = build_grid(config)?;
    Ok(play_grid(grid, config.cell_size))
}

/// Play a round on a fixed grid.
///
/// Stops early when a segment has no route left; the report then carries no
/// summary.
pub fn play_grid(grid: Grid, cell_size: f64) -> Report {
    let mut clock = Instant::now();
    let mut game = Game::new(BoardLayout::new(grid.size(), cell_size));
    let mut buffer = CommandBuffer::new();
    game.start_with_grid(grid, clock);

    while let Some(round) = game.round() {
        if round.is_complete() {
            break;
        }
        let anchor = round.anchor();
        let Some(route) = round.next_route() else {
            log::warn!("No route from {} to {}, stopping", anchor, anchor + 1);
            break;
        };
        let layout = *round.layout();
        let points: Vec<Point> = route
            .cells()
            .iter()
            .map(|cell| layout.board_to_viewport(layout.cell_center(*cell)))
            .collect();
        let (Some(&first), Some(&last)) = (points.first(), points.last()) else {
            break;
        };

        game.handle_pointer_event(PointerEvent::Down { position: first }, clock, &mut buffer);
        for &position in &points[1..] {
            game.handle_pointer_event(PointerEvent::Move { position }, clock, &mut buffer);
        }
        clock += PRESS_DELAY + STEP_DELAY * route.steps() as u32;
        let outcome =
            game.handle_pointer_event(PointerEvent::Up { position: last }, clock, &mut buffer);
        if !matches!(outcome, InputOutcome::Resolved(Resolution::Committed(_))) {
            log::warn!("Segment {} -> {} was not accepted: {:?}", anchor, anchor + 1, outcome);
            break;
        }
        buffer.drain();
    }

    match game.round() {
        Some(round) => Report {
            targets: round.grid().targets().to_vec(),
            segments: round.segments().len(),
            summary: round.summary(),
            board: draw_board(round),
        },
        None => Report {
            targets: Vec::new(),
            segments: 0,
            summary: None,
            board: String::new(),
        },
    }
}

/// Draw the board as text: ordinals on targets, `*` on route cells, `.` elsewhere.
pub fn draw_board(round: &Round) -> String {
    let grid = round.grid();
    let size = grid.size();
    let width = grid.target_count().to_string().len();

    let mut on_route = std::collections::HashSet::new();
    for segment in round.segments() {
        on_route.extend(segment.route.cells().iter().copied());
    }

    let mut out = String::new();
    for row in 0..size {
        for col in 0..size {
            let cell = grid::Cell::new(row, col);
            if col > 0 {
                out.push(' ');
            }
            let label = match grid.ordinal_at(cell) {
                Some(ordinal) => ordinal.to_string(),
                None if on_route.contains(&cell) => "*".to_string(),
                None => ".".to_string(),
            };
            out.push_str(&format!("{:>width$}", label));
        }
        out.push('\n');
    }
    out
}
