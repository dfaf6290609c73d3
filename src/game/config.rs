use anyhow::{Result, ensure};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use super::state::Position;

/// Smallest grid that still leaves room for a head and a separate food cell
pub const MIN_GRID_SIZE: usize = 3;

/// Largest grid the terminal renderer and food scan are sized for
pub const MAX_GRID_SIZE: usize = 100;

/// Configuration for the game
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameConfig {
    /// Side length of the square grid
    pub grid_size: usize,
    /// Interval between two simulation steps
    pub tick_interval_ms: u64,
    /// Points awarded per food eaten
    pub food_score: u32,
    /// Cell the single-segment snake starts on
    pub initial_head: Position,
    /// Cell the first food is placed on
    pub initial_food: Position,
    /// Random draws tried before scanning the grid for a free cell
    pub max_food_attempts: u32,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new(20)
    }
}

impl GameConfig {
    /// Create a configuration for an `n`×`n` grid.
    ///
    /// The snake starts in the centre and the first food sits at three
    /// quarters of the way along both axes, which for the default 20×20 grid
    /// gives (10,10) and (15,15).
    pub fn new(grid_size: usize) -> Self {
        let centre = (grid_size / 2) as i32;
        let quarter = (grid_size * 3 / 4) as i32;
        Self {
            grid_size,
            tick_interval_ms: 150,
            food_score: 10,
            initial_head: Position::new(centre, centre),
            initial_food: Position::new(quarter, quarter),
            max_food_attempts: 64,
        }
    }

    /// Create a small grid for testing
    pub fn small() -> Self {
        Self::new(10)
    }

    pub fn with_tick_interval(mut self, interval: Duration) -> Self {
        self.tick_interval_ms = interval.as_millis() as u64;
        self
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn contains(&self, pos: Position) -> bool {
        let n = self.grid_size as i32;
        (0..n).contains(&pos.x) && (0..n).contains(&pos.y)
    }

    /// Check that the configuration describes a playable board
    pub fn validate(&self) -> Result<()> {
        ensure!(
            self.grid_size >= MIN_GRID_SIZE,
            "grid size must be at least {MIN_GRID_SIZE}, got {}",
            self.grid_size
        );
        ensure!(
            self.grid_size <= MAX_GRID_SIZE,
            "grid size must be at most {MAX_GRID_SIZE}, got {}",
            self.grid_size
        );
        ensure!(self.tick_interval_ms > 0, "tick interval must be positive");
        ensure!(
            self.contains(self.initial_head),
            "initial head {} lies outside the {}x{} grid",
            self.initial_head,
            self.grid_size,
            self.grid_size
        );
        ensure!(
            self.contains(self.initial_food),
            "initial food {} lies outside the {}x{} grid",
            self.initial_food,
            self.grid_size,
            self.grid_size
        );
        ensure!(
            self.initial_head != self.initial_food,
            "initial food must not start on the snake at {}",
            self.initial_head
        );
        Ok(())
    }
}
