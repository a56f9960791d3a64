//! Renderer collaborator interface.
//!
//! The engine never draws anything itself. It tells a [`Renderer`] which
//! strokes to show and what the live status line should read; the browser shell
//! replays a [`CommandBuffer`] onto its SVG overlay.

use kurbo::Point;
use serde::{Deserialize, Serialize};

/// Live status shown while a round is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoundStatus {
    /// Ordinal of the target the next drag must start from.
    pub current_ordinal: u32,
    /// Wrong releases so far.
    pub wrong_releases: u32,
}

/// Receives drawing instructions from the engine.
pub trait Renderer {
    /// Draw a persistent stroke for a committed segment (board coordinates).
    fn draw_route(&mut self, points: &[Point]);

    /// Replace the provisional stroke following the pointer.
    fn draw_provisional(&mut self, points: &[Point]);

    /// Remove the provisional stroke.
    fn clear_provisional(&mut self);

    /// Update the live status display.
    fn update_status(&mut self, status: RoundStatus);

    /// Briefly highlight a numbered cell pressed out of order.
    fn flash_wrong(&mut self, _ordinal: u32) {}
}

/// A recorded renderer call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RenderCommand {
    DrawRoute { points: Vec<Point> },
    DrawProvisional { points: Vec<Point> },
    ClearProvisional,
    Status { status: RoundStatus },
    FlashWrong { ordinal: u32 },
}

/// Renderer that records commands for later replay.
#[derive(Debug, Clone, Default)]
pub struct CommandBuffer {
    commands: Vec<RenderCommand>,
}

impl CommandBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    /// Take all recorded commands, leaving the buffer empty.
    pub fn drain(&mut self) -> Vec<RenderCommand> {
        std::mem::take(&mut self.commands)
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    /// Most recent status update, if any.
    pub fn last_status(&self) -> Option<RoundStatus> {
        self.commands.iter().rev().find_map(|c| match c {
            RenderCommand::Status { status } => Some(*status),
            _ => None,
        })
    }
}

impl Renderer for CommandBuffer {
    fn draw_route(&mut self, points: &[Point]) {
        self.commands.push(RenderCommand::DrawRoute {
            points: points.to_vec(),
        });
    }

    fn draw_provisional(&mut self, points: &[Point]) {
        // Only the latest provisional stroke matters.
        if let Some(RenderCommand::DrawProvisional { points: last }) = self.commands.last_mut() {
            *last = points.to_vec();
            return;
        }
        self.commands.push(RenderCommand::DrawProvisional {
            points: points.to_vec(),
        });
    }

    fn clear_provisional(&mut self) {
        self.commands.push(RenderCommand::ClearProvisional);
    }

    fn update_status(&mut self, status: RoundStatus) {
        self.commands.push(RenderCommand::Status { status });
    }

    fn flash_wrong(&mut self, ordinal: u32) {
        self.commands.push(RenderCommand::FlashWrong { ordinal });
    }
}

/// Renderer that discards everything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {
    fn draw_route(&mut self, _points: &[Point]) {}
    fn draw_provisional(&mut self, _points: &[Point]) {}
    fn clear_provisional(&mut self) {}
    fn update_status(&mut self, _status: RoundStatus) {}
}
