use anyhow::{Context, Result};
use crossterm::{
    event::{Event, EventStream, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use futures::StreamExt;
use ratatui::{Terminal, backend::CrosstermBackend};
use std::io::{Stderr, stderr};
use std::time::Duration;
use tokio::sync::watch;
use tokio::time::interval;
use tracing::{debug, info};

use crate::game::{Command, GameEngine, GameState};
use crate::input::{InputHandler, KeyAction};
use crate::metrics::GameMetrics;
use crate::render::Renderer;
use crate::session::{SessionHandle, spawn_session};

// Render at 30 FPS (33ms per frame)
const RENDER_INTERVAL: Duration = Duration::from_millis(33);

/// Interactive terminal shell
pub struct HumanMode {
    engine: GameEngine,
    shell: Shell,
}

impl HumanMode {
    pub fn new(engine: GameEngine) -> Self {
        let shell = Shell::new(engine.snapshot());
        Self { engine, shell }
    }

    pub async fn run(self) -> Result<()> {
        let Self { engine, mut shell } = self;
        let tick = engine.config().tick_interval();

        // Setup terminal
        enable_raw_mode().context("Failed to enable raw mode")?;
        let mut stderr = stderr();
        execute!(stderr, EnterAlternateScreen).context("Failed to enter alternate screen")?;
        let backend = CrosstermBackend::new(stderr);
        let mut terminal = Terminal::new(backend).context("Failed to create terminal")?;
        terminal.hide_cursor().context("Failed to hide cursor")?;
        terminal.clear().context("Failed to clear terminal")?;

        let session = spawn_session(engine, tick);

        // Run game loop with cleanup
        let result = shell.run_game_loop(&mut terminal, &session).await;

        // Stop the tick timer before the terminal is handed back
        let stopped = session.shutdown().await;

        cleanup_terminal(&mut terminal)?;

        if let Ok(engine) = &stopped {
            info!(
                score = engine.state().score,
                games = shell.metrics.games_played,
                best = shell.metrics.best_score,
                "human session finished"
            );
        }
        result.and(stopped.map(|_| ()))
    }
}

struct Shell {
    state: GameState,
    metrics: GameMetrics,
    renderer: Renderer,
    input_handler: InputHandler,
    should_quit: bool,
}

impl Shell {
    fn new(state: GameState) -> Self {
        Self {
            state,
            metrics: GameMetrics::new(),
            renderer: Renderer::new(),
            input_handler: InputHandler::new(),
            should_quit: false,
        }
    }

    async fn run_game_loop<R>(
        &mut self,
        terminal: &mut Terminal<CrosstermBackend<Stderr>>,
        session: &SessionHandle<R>,
    ) -> Result<()> {
        let mut event_stream = EventStream::new();
        let mut snapshots: watch::Receiver<GameState> = session.subscribe();
        let mut render_timer = interval(RENDER_INTERVAL);

        loop {
            tokio::select! {
                // Handle terminal events
                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(event)) => {
                            if let Some(command) = self.handle_event(event) {
                                session.send(command).await?;
                            }
                        }
                        Some(Err(e)) => return Err(e).context("Failed to read terminal event"),
                        None => break,
                    }
                }

                // Fresh snapshot from the session
                changed = snapshots.changed() => {
                    if changed.is_err() {
                        debug!("session closed its snapshot channel");
                        break;
                    }
                    let state = snapshots.borrow_and_update().clone();
                    self.metrics.observe(self.state.phase, &state);
                    self.state = state;
                }

                // Render frame
                _ = render_timer.tick() => {
                    self.metrics.update();
                    terminal.draw(|frame| {
                        self.renderer.render(frame, &self.state, &self.metrics);
                    }).context("Failed to draw frame")?;
                }

                // Handle Ctrl+C
                _ = tokio::signal::ctrl_c() => {
                    self.should_quit = true;
                }
            }

            if self.should_quit {
                break;
            }
        }

        Ok(())
    }

    /// Map a terminal event to a game command, flagging quit requests
    fn handle_event(&mut self, event: Event) -> Option<Command> {
        let Event::Key(key) = event else {
            return None;
        };
        // Only process key press events, not release
        if key.kind != KeyEventKind::Press {
            return None;
        }

        match self.input_handler.handle_key_event(key) {
            KeyAction::Game(command) => Some(command),
            KeyAction::Quit => {
                self.should_quit = true;
                None
            }
            KeyAction::None => None,
        }
    }
}

fn cleanup_terminal(terminal: &mut Terminal<CrosstermBackend<Stderr>>) -> Result<()> {
    disable_raw_mode().context("Failed to disable raw mode")?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)
        .context("Failed to leave alternate screen")?;
    terminal.show_cursor().context("Failed to show cursor")?;
    Ok(())
}
