//! Line-oriented shell for scripting and piping.
//!
//! Each input line holds one command. After every command the current game
//! state is written as a single line of JSON, so the output can be consumed
//! by `jq` or a test harness. There is no timer here: time only advances on an
//! explicit `step`.
//!
//! ```text
//! start          -> Command::Start
//! pause          -> Command::Pause
//! toggle         -> Command::TogglePause
//! reset          -> Command::Reset
//! up|down|left|right
//! step [n]       -> n engine steps (default 1)
//! show           -> print the state without changing it
//! quit
//! ```

use anyhow::{Context, Result, bail};
use rand::Rng;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt};
use tracing::{debug, info, warn};

use crate::game::{Command, Direction, GameEngine, StepOutcome};

/// Upper bound on `step n` so a typo cannot spin forever
pub const MAX_STEPS_PER_LINE: u32 = 100_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeadlessCommand {
    Game(Command),
    Step(u32),
    Show,
    Quit,
}

/// Parse one input line. Blank lines and `#` comments yield `None`.
pub fn parse_line(line: &str) -> Result<Option<HeadlessCommand>> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return Ok(None);
    }

    let mut words = line.split_whitespace();
    let verb = words.next().unwrap_or_default().to_ascii_lowercase();
    let arg = words.next();
    if words.next().is_some() {
        bail!("too many arguments in {line:?}");
    }
    if arg.is_some() && verb != "step" {
        bail!("{verb} takes no argument");
    }

    let command = match verb.as_str() {
        "start" => HeadlessCommand::Game(Command::Start),
        "pause" => HeadlessCommand::Game(Command::Pause),
        "toggle" => HeadlessCommand::Game(Command::TogglePause),
        "reset" => HeadlessCommand::Game(Command::Reset),
        "up" => HeadlessCommand::Game(Command::Turn(Direction::Up)),
        "down" => HeadlessCommand::Game(Command::Turn(Direction::Down)),
        "left" => HeadlessCommand::Game(Command::Turn(Direction::Left)),
        "right" => HeadlessCommand::Game(Command::Turn(Direction::Right)),
        "show" => HeadlessCommand::Show,
        "quit" | "exit" => HeadlessCommand::Quit,
        "step" => {
            let count = match arg {
                Some(raw) => raw
                    .parse::<u32>()
                    .with_context(|| format!("invalid step count {raw:?}"))?,
                None => 1,
            };
            if count > MAX_STEPS_PER_LINE {
                bail!("step count {count} exceeds {MAX_STEPS_PER_LINE}");
            }
            HeadlessCommand::Step(count)
        }
        other => bail!("unknown command {other:?}"),
    };

    Ok(Some(command))
}

pub struct HeadlessMode<R> {
    engine: GameEngine<R>,
}

impl<R: Rng> HeadlessMode<R> {
    pub fn new(engine: GameEngine<R>) -> Self {
        Self { engine }
    }

    /// Process `input` until it ends or a `quit` line arrives
    pub async fn run<I, O>(&mut self, mut input: I, mut output: O) -> Result<()>
    where
        I: AsyncBufRead + Unpin,
        O: AsyncWrite + Unpin,
    {
        let mut buf = Vec::new();
        let mut line_no = 0usize;

        loop {
            buf.clear();
            let read = input
                .read_until(b'\n', &mut buf)
                .await
                .context("Failed to read input")?;
            if read == 0 {
                break;
            }
            line_no += 1;

            let command = match decode_line(&buf).and_then(|line| parse_line(&line)) {
                Ok(Some(command)) => command,
                Ok(None) => continue,
                Err(e) => {
                    warn!(line = line_no, error = %e, "rejected input line");
                    let error = serde_json::json!({ "line": line_no, "error": e.to_string() });
                    write_json(&mut output, &error).await?;
                    continue;
                }
            };

            if command == HeadlessCommand::Quit {
                debug!(line = line_no, "quit requested");
                break;
            }
            self.execute(command);
            write_json(&mut output, self.engine.state()).await?;
        }

        output.flush().await.context("Failed to flush output")?;
        info!(
            lines = line_no,
            score = self.engine.state().score,
            "headless session finished"
        );
        Ok(())
    }

    fn execute(&mut self, command: HeadlessCommand) {
        match command {
            HeadlessCommand::Game(command) => {
                self.engine.apply(command);
            }
            HeadlessCommand::Step(count) => {
                for _ in 0..count {
                    let outcome = self.engine.step();
                    if outcome == StepOutcome::Idle || outcome.is_terminal() {
                        break;
                    }
                }
            }
            HeadlessCommand::Show | HeadlessCommand::Quit => {}
        }
    }
}

/// Strip the line terminator and check the bytes are UTF-8
fn decode_line(raw: &[u8]) -> Result<String> {
    let raw = raw.strip_suffix(b"\n").unwrap_or(raw);
    let raw = raw.strip_suffix(b"\r").unwrap_or(raw);
    String::from_utf8(raw.to_vec()).context("input line is not valid UTF-8")
}

async fn write_json<O, T>(output: &mut O, value: &T) -> Result<()>
where
    O: AsyncWrite + Unpin,
    T: serde::Serialize + ?Sized,
{
    let mut line = serde_json::to_vec(value).context("Failed to encode state")?;
    line.push(b'\n');
    output
        .write_all(&line)
        .await
        .context("Failed to write output")
}
