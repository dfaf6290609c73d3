//! Tick-driven game session.
//!
//! A session is a single tokio task that owns the [`GameEngine`]. It waits on
//! three things at once: the step interval, the command channel and a
//! shutdown signal. Because only this task touches the engine, a command is
//! always applied between two steps, never in the middle of one.
//!
//! Observers read the game through a `watch` channel of cloned
//! [`GameState`] snapshots, so nothing outside the task can mutate it.

use anyhow::{Context, Result, anyhow};
use rand::Rng;
use std::time::Duration;
use tokio::sync::{mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info};

use crate::game::{Command, GameEngine, GameState, StepOutcome};

pub const COMMAND_CHANNEL_CAPACITY: usize = 64;

/// Handle to a running session. Dropping it stops the session and its timer.
pub struct SessionHandle<R> {
    commands: mpsc::Sender<Command>,
    snapshots: watch::Receiver<GameState>,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<GameEngine<R>>,
}

/// Start a session that steps `engine` every `tick`
pub fn spawn_session<R>(engine: GameEngine<R>, tick: Duration) -> SessionHandle<R>
where
    R: Rng + Send + 'static,
{
    let (command_tx, command_rx) = mpsc::channel(COMMAND_CHANNEL_CAPACITY);
    let (snapshot_tx, snapshot_rx) = watch::channel(engine.snapshot());
    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let task = tokio::spawn(run_session(
        engine,
        tick,
        command_rx,
        snapshot_tx,
        shutdown_rx,
    ));

    SessionHandle {
        commands: command_tx,
        snapshots: snapshot_rx,
        shutdown: Some(shutdown_tx),
        task,
    }
}

impl<R> SessionHandle<R> {
    /// Queue a command for the session
    pub async fn send(&self, command: Command) -> Result<()> {
        self.commands
            .send(command)
            .await
            .map_err(|_| anyhow!("game session has stopped"))
    }

    /// A sender that input sources can own independently of the handle
    pub fn commands(&self) -> mpsc::Sender<Command> {
        self.commands.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<GameState> {
        self.snapshots.clone()
    }

    /// Copy of the most recently published state
    pub fn latest(&self) -> GameState {
        self.snapshots.borrow().clone()
    }

    /// Stop the session and hand back the engine
    pub async fn shutdown(mut self) -> Result<GameEngine<R>> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        (&mut self.task).await.context("game session task failed")
    }
}

async fn run_session<R: Rng>(
    mut engine: GameEngine<R>,
    tick: Duration,
    mut commands: mpsc::Receiver<Command>,
    snapshots: watch::Sender<GameState>,
    mut shutdown: oneshot::Receiver<()>,
) -> GameEngine<R> {
    let mut ticker = interval(tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    // The first tick completes immediately; the first step is one interval out.
    ticker.tick().await;

    info!(tick_ms = tick.as_millis() as u64, "game session started");

    loop {
        tokio::select! {
            _ = &mut shutdown => {
                debug!("shutdown requested");
                break;
            }

            maybe_command = commands.recv() => {
                let Some(command) = maybe_command else {
                    debug!("command channel closed");
                    break;
                };
                if engine.apply(command) {
                    debug!(?command, phase = ?engine.phase(), "command applied");
                    snapshots.send_replace(engine.snapshot());
                }
            }

            _ = ticker.tick() => {
                let outcome = engine.step();
                if outcome != StepOutcome::Idle {
                    snapshots.send_replace(engine.snapshot());
                }
            }
        }
    }

    info!(score = engine.state().score, "game session stopped");
    engine
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Direction, GameConfig, GamePhase, Position};

    const TICK: Duration = Duration::from_millis(150);

    fn session() -> SessionHandle<rand::rngs::StdRng> {
        spawn_session(GameEngine::with_seed(GameConfig::default(), 1), TICK)
    }

    #[tokio::test(start_paused = true)]
    async fn test_no_steps_before_start() {
        let handle = session();
        tokio::time::sleep(TICK * 10).await;

        let state = handle.latest();
        assert_eq!(state.phase, GamePhase::Waiting);
        assert_eq!(state.snake.head(), Position::new(10, 10));
        assert_eq!(state.steps, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_ticks_advance_snake_while_playing() {
        let handle = session();
        let mut rx = handle.subscribe();

        handle.send(Command::Start).await.unwrap();
        let state = rx.wait_for(|s| s.steps == 4).await.unwrap().clone();

        assert_eq!(state.phase, GamePhase::Playing);
        assert_eq!(state.snake.cells(), &[Position::new(14, 10)]);
        assert_eq!(state.score, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_command_visible_before_next_step() {
        let handle = session();
        let mut rx = handle.subscribe();

        handle.send(Command::Start).await.unwrap();
        rx.wait_for(|s| s.phase == GamePhase::Playing).await.unwrap();
        handle.send(Command::Turn(Direction::Down)).await.unwrap();
        let state = rx
            .wait_for(|s| s.direction == Direction::Down)
            .await
            .unwrap()
            .clone();
        assert_eq!(state.snake.head(), Position::new(10, 10));

        let state = rx.wait_for(|s| s.steps == 1).await.unwrap().clone();
        assert_eq!(state.snake.head(), Position::new(10, 11));
    }

    #[tokio::test(start_paused = true)]
    async fn test_pause_stops_ticking() {
        let handle = session();
        let mut rx = handle.subscribe();

        handle.send(Command::Start).await.unwrap();
        rx.wait_for(|s| s.steps >= 2).await.unwrap();
        handle.send(Command::Pause).await.unwrap();
        let paused = rx
            .wait_for(|s| s.phase == GamePhase::Paused)
            .await
            .unwrap()
            .clone();

        tokio::time::sleep(TICK * 20).await;
        assert_eq!(handle.latest(), paused);
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_into_wall_and_stops() {
        let handle = session();
        let mut rx = handle.subscribe();

        handle.send(Command::Start).await.unwrap();
        let state = rx
            .wait_for(|s| s.phase == GamePhase::GameOver)
            .await
            .unwrap()
            .clone();
        // Nine moves right from (10,10) reach the last column; the tenth hits the wall.
        assert_eq!(state.snake.head(), Position::new(19, 10));
        assert_eq!(state.steps, 9);

        handle.send(Command::Start).await.unwrap();
        tokio::time::sleep(TICK * 5).await;
        assert_eq!(handle.latest().phase, GamePhase::GameOver);

        handle.send(Command::Reset).await.unwrap();
        let state = rx
            .wait_for(|s| s.phase == GamePhase::Waiting)
            .await
            .unwrap()
            .clone();
        assert_eq!(state.snake.head(), Position::new(10, 10));
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_returns_engine() {
        let handle = session();
        let commands = handle.commands();
        let mut rx = handle.subscribe();
        handle.send(Command::Start).await.unwrap();
        rx.wait_for(|s| s.phase == GamePhase::Playing).await.unwrap();

        let engine = handle.shutdown().await.unwrap();
        assert_eq!(engine.phase(), GamePhase::Playing);
        assert!(commands.send(Command::Pause).await.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_stops_session() {
        let handle = session();
        let mut rx = handle.subscribe();
        drop(handle);

        assert!(rx.changed().await.is_err());
    }
}
