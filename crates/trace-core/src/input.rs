//! Pointer input events.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Pointer event in viewport coordinates, unified across mouse and touch.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum PointerEvent {
    Down { position: Point },
    Move { position: Point },
    Up { position: Point },
}

impl PointerEvent {
    pub fn down(x: f64, y: f64) -> Self {
        Self::Down {
            position: Point::new(x, y),
        }
    }

    pub fn moved(x: f64, y: f64) -> Self {
        Self::Move {
            position: Point::new(x, y),
        }
    }

    pub fn up(x: f64, y: f64) -> Self {
        Self::Up {
            position: Point::new(x, y),
        }
    }

    /// Viewport position carried by the event.
    pub fn position(&self) -> Point {
        match *self {
            Self::Down { position } | Self::Move { position } | Self::Up { position } => position,
        }
    }
}
