//! Trace Core Library
//!
//! Platform-agnostic puzzle engine for the Trace drag game: grid generation,
//! route finding under blocked edges, drag validation, metrics and the
//! session/questionnaire store.

pub mod config;
pub mod drag;
pub mod game;
pub mod grid;
pub mod input;
pub mod layout;
pub mod ledger;
pub mod metrics;
pub mod pathfinder;
pub mod render;
pub mod round;
pub mod session;
pub mod storage;

pub use config::{ConfigError, DEFAULT_GRID_SIZE, DEFAULT_TARGET_COUNT, RoundConfig};
pub use drag::{DragController, DragState, PressOutcome, RejectReason, Resolution, Segment};
pub use game::{Game, Phase};
pub use grid::{Cell, Grid, Target};
pub use input::PointerEvent;
pub use layout::{BoardLayout, DEFAULT_CELL_SIZE};
pub use ledger::{Edge, EdgeLedger};
pub use metrics::{MetricsAggregator, Summary};
pub use pathfinder::{Route, find_route};
pub use render::{CommandBuffer, NullRenderer, RenderCommand, Renderer, RoundStatus};
pub use round::{InputOutcome, Round};
pub use session::{QUESTIONNAIRE_FIELDS, SessionError, SessionStore, User};
pub use storage::{KeyValueStore, MemoryStore, StorageError, StorageResult};
