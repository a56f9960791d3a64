//! Round lifecycle: NotStarted -> InProgress -> Complete.

use crate::config::{ConfigError, RoundConfig};
use crate::grid::Grid;
use crate::input::PointerEvent;
use crate::layout::{BoardLayout, DEFAULT_CELL_SIZE};
use crate::metrics::Summary;
use crate::render::Renderer;
use crate::round::{InputOutcome, Round};
use kurbo::Rect;
use std::time::Duration;

#[cfg(target_arch = "wasm32")]
use web_time::Instant;
#[cfg(not(target_arch = "wasm32"))]
use std::time::Instant;

/// Lifecycle phase of the game.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    NotStarted,
    InProgress,
    Complete,
}

/// Owns the active round and starts new ones.
#[derive(Debug, Clone)]
pub struct Game {
    config: RoundConfig,
    layout: BoardLayout,
    round: Option<Round>,
}

impl Default for Game {
    fn default() -> Self {
        Self::new(BoardLayout::new(RoundConfig::default().grid_size, DEFAULT_CELL_SIZE))
    }
}

impl Game {
    /// Create a game whose board is placed according to `layout`.
    pub fn new(layout: BoardLayout) -> Self {
        Self {
            config: RoundConfig::default(),
            layout,
            round: None,
        }
    }

    pub fn phase(&self) -> Phase {
        match &self.round {
            None => Phase::NotStarted,
            Some(round) if round.is_complete() => Phase::Complete,
            Some(_) => Phase::InProgress,
        }
    }

    /// Configuration of the current (or last requested) round.
    pub fn config(&self) -> RoundConfig {
        self.config
    }

    pub fn round(&self) -> Option<&Round> {
        self.round.as_ref()
    }

    pub fn layout(&self) -> &BoardLayout {
        &self.layout
    }

    /// Start a new round with randomly placed targets.
    ///
    /// The configuration is validated before anything changes; on error the
    /// previous round is left untouched.
    pub fn start(&mut self, config: RoundConfig, now: Instant) -> Result<&Round, ConfigError> {
        config.validate()?;
        let grid = Grid::random(config)?;
        self.config = config;
        Ok(self.begin(grid, now))
    }

    /// Start a new round on a fixed target layout.
    pub fn start_with_grid(&mut self, grid: Grid, now: Instant) -> &Round {
        self.config = RoundConfig::new(grid.size(), grid.target_count());
        self.begin(grid, now)
    }

    /// Discard the current round and start over with the same configuration.
    pub fn reset(&mut self, now: Instant) -> Result<&Round, ConfigError> {
        self.start(self.config, now)
    }

    fn begin(&mut self, grid: Grid, now: Instant) -> &Round {
        log::info!(
            "Starting round: {}x{} grid, {} targets",
            grid.size(),
            grid.size(),
            grid.target_count()
        );
        self.round.insert(Round::new(grid, self.layout, now))
    }

    /// Place the board at a new viewport rectangle.
    pub fn set_board_rect(&mut self, rect: Rect) {
        let grid_size = self
            .round
            .as_ref()
            .map_or(self.config.grid_size, |r| r.grid().size());
        self.set_layout(BoardLayout::from_rect(rect, grid_size));
    }

    pub fn set_layout(&mut self, layout: BoardLayout) {
        self.layout = layout;
        if let Some(round) = &mut self.round {
            round.set_layout(layout);
        }
    }

    /// Feed a pointer event to the active round.
    pub fn handle_pointer_event(
        &mut self,
        event: PointerEvent,
        now: Instant,
        renderer: &mut dyn Renderer,
    ) -> InputOutcome {
        match &mut self.round {
            Some(round) => round.handle_pointer_event(event, now, renderer),
            None => InputOutcome::Ignored,
        }
    }

    /// Elapsed time for the timer display.
    pub fn elapsed(&self, now: Instant) -> Duration {
        self.round.as_ref().map_or(Duration::ZERO, |r| r.elapsed(now))
    }

    /// Results of the round, once complete.
    pub fn summary(&self) -> Option<Summary> {
        self.round.as_ref().and_then(Round::summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drag::Resolution;
    use crate::grid::{Cell, Target};
    use crate::render::CommandBuffer;
    use std::collections::HashSet;

    const CELL: f64 = 50.0;

    fn regression_grid() -> Grid {
        let targets = vec![
            Target {
                ordinal: 1,
                cell: Cell::new(0, 0),
            },
            Target {
                ordinal: 2,
                cell: Cell::new(2, 0),
            },
            Target {
                ordinal: 3,
                cell: Cell::new(2, 2),
            },
        ];
        Grid::from_targets(3, targets).unwrap()
    }

    fn at(game: &Game, ordinal: u32) -> (f64, f64) {
        let round = game.round().unwrap();
        let p = round
            .layout()
            .board_to_viewport(round.layout().cell_center(round.grid().target(ordinal).unwrap()));
        (p.x, p.y)
    }

    fn drag(
        game: &mut Game,
        from: u32,
        to: u32,
        now: Instant,
        out: &mut CommandBuffer,
    ) -> InputOutcome {
        let (x0, y0) = at(game, from);
        let (x1, y1) = at(game, to);
        game.handle_pointer_event(PointerEvent::down(x0, y0), now, out);
        // Horizontal then vertical, like the provisional stroke.
        game.handle_pointer_event(PointerEvent::moved(x1, y0), now, out);
        game.handle_pointer_event(PointerEvent::moved(x1, y1), now, out);
        game.handle_pointer_event(PointerEvent::up(x1, y1), now + Duration::from_millis(300), out)
    }

    #[test]
    fn test_phases() {
        let t0 = Instant::now();
        let mut out = CommandBuffer::new();
        let mut game = Game::new(BoardLayout::new(3, CELL));
        assert_eq!(game.phase(), Phase::NotStarted);
        assert_eq!(game.elapsed(t0), Duration::ZERO);
        assert!(game.summary().is_none());

        game.start_with_grid(regression_grid(), t0);
        assert_eq!(game.phase(), Phase::InProgress);

        drag(&mut game, 1, 2, t0, &mut out);
        assert_eq!(game.phase(), Phase::InProgress);
        // 2 -> 3 straight along the bottom row.
        drag(&mut game, 2, 3, t0, &mut out);
        assert_eq!(game.phase(), Phase::Complete);

        let summary = game.summary().unwrap();
        assert_eq!(summary.accuracy_pct, 100);
        assert_eq!(summary.reaction_times_ms.len(), 2);
    }

    #[test]
    fn test_input_before_start_is_ignored() {
        let mut game = Game::default();
        let outcome = game.handle_pointer_event(
            PointerEvent::down(10.0, 10.0),
            Instant::now(),
            &mut CommandBuffer::new(),
        );
        assert_eq!(outcome, InputOutcome::Ignored);
    }

    #[test]
    fn test_invalid_config_leaves_round_untouched() {
        let t0 = Instant::now();
        let mut game = Game::new(BoardLayout::new(3, CELL));
        game.start_with_grid(regression_grid(), t0);

        let err = game.start(RoundConfig::new(3, 10), t0).unwrap_err();
        assert!(matches!(err, ConfigError::CapacityExceeded { .. }));
        assert_eq!(game.phase(), Phase::InProgress);
        assert_eq!(game.round().unwrap().grid().target(2), Some(Cell::new(2, 0)));
        assert_eq!(game.config(), RoundConfig::new(3, 3));
    }

    #[test]
    fn test_oversized_grid_rejected_before_start() {
        let t0 = Instant::now();
        let mut game = Game::default();
        let err = game.start(RoundConfig::new(u32::MAX, 2), t0).unwrap_err();
        assert!(matches!(err, ConfigError::GridTooLarge { size: u32::MAX, .. }));
        assert_eq!(game.phase(), Phase::NotStarted);
        assert!(game.round().is_none());
    }

    #[test]
    fn test_random_start() {
        let mut game = Game::default();
        let round = game.start(RoundConfig::new(5, 9), Instant::now()).unwrap();
        assert_eq!(round.grid().size(), 5);
        assert_eq!(round.grid().target_count(), 9);
        assert_eq!(round.layout().grid_size, 5);

        let cells: HashSet<Cell> = round.grid().targets().iter().map(|t| t.cell).collect();
        assert_eq!(cells.len(), 9);
    }

    #[test]
    fn test_new_round_clears_blocked_edges_and_metrics() {
        let t0 = Instant::now();
        let mut out = CommandBuffer::new();
        let mut game = Game::new(BoardLayout::new(3, CELL));
        game.start_with_grid(regression_grid(), t0);

        drag(&mut game, 1, 2, t0, &mut out);
        // Misplaced release to leave something in the metrics.
        let (x, y) = at(&game, 2);
        game.handle_pointer_event(PointerEvent::down(x, y), t0, &mut out);
        game.handle_pointer_event(PointerEvent::up(x, y), t0, &mut out);
        {
            let round = game.round().unwrap();
            assert!(round.ledger().is_blocked(Cell::new(0, 0), Cell::new(1, 0)));
            assert_eq!(round.metrics().wrong_releases(), 1);
        }

        // Same layout again: the left column is free.
        game.start_with_grid(regression_grid(), t0);
        let round = game.round().unwrap();
        assert!(round.ledger().is_empty());
        assert_eq!(round.metrics().wrong_releases(), 0);
        assert!(round.metrics().reaction_times_ms().is_empty());
        assert!((round.metrics().cursor_distance()).abs() < f64::EPSILON);
        assert_eq!(round.anchor(), 1);
        assert_eq!(
            round.next_route().map(|r| r.into_cells()),
            Some(vec![Cell::new(0, 0), Cell::new(1, 0), Cell::new(2, 0)])
        );

        let outcome = drag(&mut game, 1, 2, t0, &mut out);
        assert!(matches!(outcome, InputOutcome::Resolved(Resolution::Committed(_))));
    }

    #[test]
    fn test_reset_uses_last_config() {
        let t0 = Instant::now();
        let mut game = Game::default();
        game.start(RoundConfig::new(4, 5), t0).unwrap();
        let round = game.reset(t0).unwrap();
        assert_eq!(round.grid().size(), 4);
        assert_eq!(round.grid().target_count(), 5);
    }

    #[test]
    fn test_board_rect_updates_round_layout() {
        let t0 = Instant::now();
        let mut game = Game::default();
        game.start_with_grid(regression_grid(), t0);
        game.set_board_rect(Rect::new(100.0, 50.0, 400.0, 350.0));

        let layout = game.round().unwrap().layout();
        assert_eq!(layout.grid_size, 3);
        assert!((layout.cell_size - 100.0).abs() < f64::EPSILON);
        assert_eq!(
            layout.cell_at(kurbo::Point::new(150.0, 100.0)),
            Some(Cell::new(0, 0))
        );
    }
}
