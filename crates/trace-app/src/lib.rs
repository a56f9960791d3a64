//! Trace Application
//!
//! Shells around the core engine: browser bindings for the web page and a
//! headless player for the native binary.

pub mod autoplay;
mod config;

pub use config::{AppConfig, AppError};

#[cfg(target_arch = "wasm32")]
mod web;

#[cfg(target_arch = "wasm32")]
pub use web::{TraceAuth, TraceGame, run_wasm};
