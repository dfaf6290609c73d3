use std::time::{Duration, Instant};

use crate::game::{GamePhase, GameState};

/// In-memory statistics for the current process. Nothing here outlives it.
pub struct GameMetrics {
    /// Play time of the current game, excluding pauses
    pub elapsed_time: Duration,
    pub best_score: u32,
    pub games_played: u32,
    accumulated: Duration,
    running_since: Option<Instant>,
}

impl GameMetrics {
    pub fn new() -> Self {
        Self {
            elapsed_time: Duration::ZERO,
            best_score: 0,
            games_played: 0,
            accumulated: Duration::ZERO,
            running_since: None,
        }
    }

    pub fn update(&mut self) {
        self.elapsed_time = self.accumulated
            + self
                .running_since
                .map(|since| since.elapsed())
                .unwrap_or_default();
    }

    /// Feed a phase change observed in a snapshot
    pub fn observe(&mut self, previous: GamePhase, state: &GameState) {
        if previous == state.phase {
            return;
        }

        match state.phase {
            GamePhase::Playing => {
                // Only a resume keeps the clock; snapshots can skip WAITING
                if previous != GamePhase::Paused {
                    self.on_game_start();
                }
                self.running_since = Some(Instant::now());
            }
            GamePhase::Paused => self.stop_clock(),
            GamePhase::GameOver => {
                self.stop_clock();
                self.on_game_over(state.score);
            }
            GamePhase::Waiting => {
                self.running_since = None;
                self.on_game_start();
            }
        }
        self.update();
    }

    pub fn on_game_start(&mut self) {
        self.accumulated = Duration::ZERO;
        self.elapsed_time = Duration::ZERO;
    }

    pub fn on_game_over(&mut self, final_score: u32) {
        self.games_played += 1;
        if final_score > self.best_score {
            self.best_score = final_score;
        }
    }

    pub fn format_time(&self) -> String {
        let total_secs = self.elapsed_time.as_secs();
        let minutes = total_secs / 60;
        let seconds = total_secs % 60;
        format!("{:02}:{:02}", minutes, seconds)
    }

    fn stop_clock(&mut self) {
        if let Some(since) = self.running_since.take() {
            self.accumulated += since.elapsed();
        }
    }
}

impl Default for GameMetrics {
    fn default() -> Self {
        Self::new()
    }
}
