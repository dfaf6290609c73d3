use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::{debug, info, trace};

use super::{
    action::{Command, Direction},
    config::GameConfig,
    food::place_food,
    state::{CollisionKind, GamePhase, GameState, Snake},
};

/// What a single call to [`GameEngine::step`] did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepOutcome {
    /// Not playing; nothing changed
    Idle,
    /// The snake moved one cell without eating
    Moved,
    /// The snake ate and grew; new food was placed
    Ate,
    /// The move would have left the grid or hit the body; the game is over
    Collided(CollisionKind),
    /// The snake ate the last free cell; the game is over
    BoardFilled,
}

impl StepOutcome {
    /// True when this step ended the game
    pub fn is_terminal(self) -> bool {
        matches!(self, StepOutcome::Collided(_) | StepOutcome::BoardFilled)
    }
}

/// The game engine: sole owner and mutator of the game state.
///
/// Every command is a silent no-op when it does not apply to the current
/// phase. Commands report whether they took effect, but never fail.
pub struct GameEngine<R = StdRng> {
    config: GameConfig,
    rng: R,
    state: GameState,
}

impl GameEngine<StdRng> {
    /// Create an engine whose food placement is seeded from the OS
    pub fn new(config: GameConfig) -> Self {
        Self::with_rng(config, StdRng::from_entropy())
    }

    /// Create an engine with reproducible food placement
    pub fn with_seed(config: GameConfig, seed: u64) -> Self {
        Self::with_rng(config, StdRng::seed_from_u64(seed))
    }
}

impl<R: Rng> GameEngine<R> {
    pub fn with_rng(config: GameConfig, rng: R) -> Self {
        let state = initial_state(&config);
        Self { config, rng, state }
    }

    /// Resume from an arbitrary state
    pub(crate) fn from_state(config: GameConfig, state: GameState, rng: R) -> Self {
        Self { config, rng, state }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    /// Borrow the current state
    pub fn state(&self) -> &GameState {
        &self.state
    }

    /// Owned copy of the current state for observers
    pub fn snapshot(&self) -> GameState {
        self.state.clone()
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase
    }

    /// WAITING or PAUSED -> PLAYING
    pub fn start(&mut self) -> bool {
        match self.state.phase {
            GamePhase::Waiting | GamePhase::Paused => {
                info!(from = ?self.state.phase, score = self.state.score, "game started");
                self.state.phase = GamePhase::Playing;
                true
            }
            phase => {
                trace!(?phase, "start ignored");
                false
            }
        }
    }

    /// PLAYING -> PAUSED
    pub fn pause(&mut self) -> bool {
        if self.state.phase == GamePhase::Playing {
            debug!(score = self.state.score, "game paused");
            self.state.phase = GamePhase::Paused;
            true
        } else {
            trace!(phase = ?self.state.phase, "pause ignored");
            false
        }
    }

    /// Pause when playing, resume when paused
    pub fn toggle_pause(&mut self) -> bool {
        match self.state.phase {
            GamePhase::Playing => self.pause(),
            GamePhase::Paused => self.start(),
            phase => {
                trace!(?phase, "toggle ignored");
                false
            }
        }
    }

    /// Restore the initial board from any phase
    pub fn reset(&mut self) -> bool {
        debug!(phase = ?self.state.phase, score = self.state.score, "game reset");
        self.state = initial_state(&self.config);
        true
    }

    /// Change heading while playing. A reversal onto the current axis is
    /// ignored since it would run the head straight into the neck.
    pub fn set_direction(&mut self, direction: Direction) -> bool {
        if self.state.phase != GamePhase::Playing {
            trace!(?direction, phase = ?self.state.phase, "turn ignored");
            return false;
        }
        if self.state.direction.is_opposite(direction) {
            trace!(?direction, current = ?self.state.direction, "reversal ignored");
            return false;
        }
        self.state.direction = direction;
        true
    }

    pub fn apply(&mut self, command: Command) -> bool {
        match command {
            Command::Start => self.start(),
            Command::Pause => self.pause(),
            Command::TogglePause => self.toggle_pause(),
            Command::Reset => self.reset(),
            Command::Turn(direction) => self.set_direction(direction),
        }
    }

    /// Advance the game by one tick
    pub fn step(&mut self) -> StepOutcome {
        if self.state.phase != GamePhase::Playing {
            return StepOutcome::Idle;
        }

        let new_head = self
            .state
            .snake
            .head()
            .moved_in_direction(self.state.direction);

        // Both checks run against the snake before the tail moves, so the
        // current tail cell counts as occupied.
        let collision = if !self.state.is_in_bounds(new_head) {
            Some(CollisionKind::Wall)
        } else if self.state.snake.contains(new_head) {
            Some(CollisionKind::SelfCollision)
        } else {
            None
        };

        if let Some(kind) = collision {
            self.state.phase = GamePhase::GameOver;
            info!(
                ?kind,
                score = self.state.score,
                length = self.state.snake.len(),
                "game over"
            );
            return StepOutcome::Collided(kind);
        }

        let ate_food = new_head == self.state.food;
        self.state.snake.advance(new_head, ate_food);
        self.state.steps = self.state.steps.saturating_add(1);

        if !ate_food {
            return StepOutcome::Moved;
        }

        self.state.score = self.state.score.saturating_add(self.config.food_score);

        match place_food(
            &mut self.rng,
            self.config.grid_size,
            &self.state.snake,
            self.config.max_food_attempts,
        ) {
            Some(food) => {
                debug!(score = self.state.score, %food, "food eaten");
                self.state.food = food;
                StepOutcome::Ate
            }
            None => {
                self.state.phase = GamePhase::GameOver;
                info!(score = self.state.score, "board filled");
                StepOutcome::BoardFilled
            }
        }
    }
}

fn initial_state(config: &GameConfig) -> GameState {
    GameState::new(
        Snake::new(config.initial_head),
        config.initial_food,
        Direction::Right,
        config.grid_size,
    )
}
