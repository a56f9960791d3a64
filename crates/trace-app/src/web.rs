//! WebAssembly bindings used by the browser page.
//!
//! The page forwards pointer events to [`TraceGame`] and replays the returned
//! render commands onto its SVG overlay. [`TraceAuth`] exposes the login and
//! questionnaire state kept in `localStorage`.

use kurbo::Rect;
use serde::Serialize;
use std::collections::BTreeMap;
use trace_core::session::{QUESTIONNAIRE_FIELDS, WEEK_MS};
use trace_core::storage::LocalStore;
use trace_core::{CommandBuffer, Game, Phase, PointerEvent, RoundConfig, SessionStore, User};
use wasm_bindgen::prelude::*;
use web_time::Instant;

fn to_js<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsError> {
    Ok(serde_wasm_bindgen::to_value(value)?)
}

/// A game bound to the page.
#[wasm_bindgen]
pub struct TraceGame {
    game: Game,
    buffer: CommandBuffer,
}

#[wasm_bindgen]
impl TraceGame {
    #[wasm_bindgen(constructor)]
    pub fn new() -> TraceGame {
        TraceGame {
            game: Game::default(),
            buffer: CommandBuffer::new(),
        }
    }

    /// Start a new round and return its targets.
    pub fn start(&mut self, grid_size: u32, target_count: u32) -> Result<JsValue, JsError> {
        self.buffer.drain();
        self.game
            .start(RoundConfig::new(grid_size, target_count), Instant::now())?;
        self.targets()
    }

    /// Restart with the last configuration.
    pub fn reset(&mut self) -> Result<JsValue, JsError> {
        self.buffer.drain();
        self.game.reset(Instant::now())?;
        self.targets()
    }

    /// Place the board in viewport coordinates.
    pub fn set_board_rect(&mut self, x: f64, y: f64, width: f64, height: f64) {
        self.game
            .set_board_rect(Rect::new(x, y, x + width, y + height));
    }

    /// Cell edge length in pixels for the current board.
    pub fn cell_size(&self) -> f64 {
        self.game.layout().cell_size
    }

    pub fn pointer_down(&mut self, x: f64, y: f64) -> Result<JsValue, JsError> {
        self.dispatch(PointerEvent::down(x, y))
    }

    pub fn pointer_move(&mut self, x: f64, y: f64) -> Result<JsValue, JsError> {
        self.dispatch(PointerEvent::moved(x, y))
    }

    pub fn pointer_up(&mut self, x: f64, y: f64) -> Result<JsValue, JsError> {
        self.dispatch(PointerEvent::up(x, y))
    }

    /// Elapsed round time for the timer display.
    pub fn elapsed_ms(&self) -> f64 {
        self.game.elapsed(Instant::now()).as_secs_f64() * 1000.0
    }

    pub fn is_complete(&self) -> bool {
        self.game.phase() == Phase::Complete
    }

    /// Live status, or `null` before the first round.
    pub fn status(&self) -> Result<JsValue, JsError> {
        match self.game.round() {
            Some(round) => to_js(&round.status()),
            None => Ok(JsValue::NULL),
        }
    }

    /// Round summary, or `null` until the round is complete.
    pub fn summary(&self) -> Result<JsValue, JsError> {
        match self.game.summary() {
            Some(summary) => to_js(&summary),
            None => Ok(JsValue::NULL),
        }
    }

    /// Reaction bar heights in percent, for the results view.
    pub fn reaction_bars(&self) -> Vec<f64> {
        self.game
            .summary()
            .map(|s| s.reaction_bar_heights())
            .unwrap_or_default()
    }

    /// Targets of the current round with their board-space centers.
    pub fn targets(&self) -> Result<JsValue, JsError> {
        #[derive(Serialize)]
        struct TargetView {
            ordinal: u32,
            row: u32,
            col: u32,
            x: f64,
            y: f64,
        }

        let Some(round) = self.game.round() else {
            return to_js::<[TargetView]>(&[]);
        };
        let layout = round.layout();
        let views: Vec<TargetView> = round
            .grid()
            .targets()
            .iter()
            .map(|t| {
                let center = layout.cell_center(t.cell);
                TargetView {
                    ordinal: t.ordinal,
                    row: t.cell.row,
                    col: t.cell.col,
                    x: center.x,
                    y: center.y,
                }
            })
            .collect();
        to_js(&views)
    }

    fn dispatch(&mut self, event: PointerEvent) -> Result<JsValue, JsError> {
        self.game
            .handle_pointer_event(event, Instant::now(), &mut self.buffer);
        to_js(&self.buffer.drain())
    }
}

impl Default for TraceGame {
    fn default() -> Self {
        Self::new()
    }
}

/// Login state and the weekly questionnaire.
#[wasm_bindgen]
pub struct TraceAuth {
    session: SessionStore<LocalStore>,
}

#[wasm_bindgen]
impl TraceAuth {
    #[wasm_bindgen(constructor)]
    pub fn new() -> Result<TraceAuth, JsError> {
        Ok(TraceAuth {
            session: SessionStore::new(LocalStore::new()?),
        })
    }

    /// The stored user, or `null`.
    pub fn user(&self) -> Result<JsValue, JsError> {
        match self.session.user() {
            Some(user) => to_js(&user),
            None => Ok(JsValue::NULL),
        }
    }

    pub fn set_user(&self, id: &str) -> Result<(), JsError> {
        Ok(self.session.set_user(&User::new(id))?)
    }

    /// Log in with a fresh random id and return it.
    pub fn login_anonymous(&self) -> Result<String, JsError> {
        let user = User::anonymous();
        self.session.set_user(&user)?;
        Ok(user.id)
    }

    pub fn logout(&self) -> Result<(), JsError> {
        Ok(self.session.logout()?)
    }

    pub fn is_logged_in(&self) -> bool {
        self.session.is_logged_in()
    }

    pub fn needs_questionnaire(&self) -> bool {
        self.session.needs_questionnaire()
    }

    pub fn questionnaire(&self) -> Result<JsValue, JsError> {
        to_js(&self.session.questionnaire())
    }

    /// Store a completed questionnaire given as `{ field: answer }`.
    pub fn record_completion(&self, answers: JsValue) -> Result<(), JsError> {
        let answers: BTreeMap<String, String> = serde_wasm_bindgen::from_value(answers)?;
        Ok(self.session.record_completion(answers)?)
    }

    pub fn questionnaire_fields() -> Result<JsValue, JsError> {
        to_js(&QUESTIONNAIRE_FIELDS)
    }

    pub fn week_ms() -> f64 {
        WEEK_MS as f64
    }
}

/// Install logging and the panic hook.
#[wasm_bindgen(start)]
pub fn run_wasm() {
    console_error_panic_hook::set_once();

    if let Err(e) = console_log::init_with_level(log::Level::Info) {
        web_sys::console::warn_1(&format!("Logger already initialized: {}", e).into());
    }

    log::info!("Starting Trace (WASM)");
}
