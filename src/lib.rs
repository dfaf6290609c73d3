//! Grid Snake - a single-player snake game on a fixed square grid
//!
//! This library provides:
//! - Core game logic (game module): a deterministic engine driven by commands and steps
//! - A tick-driven session task that owns the engine (session module)
//! - TUI rendering and keyboard input for the interactive shell (render, input modules)
//! - Interactive and headless execution modes (modes module)

pub mod game;
pub mod input;
pub mod metrics;
pub mod modes;
pub mod render;
pub mod session;
