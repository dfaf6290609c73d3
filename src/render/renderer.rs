use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::game::{GamePhase, GameState, Position};
use crate::metrics::GameMetrics;

const OVERLAY_WIDTH: u16 = 34;
const OVERLAY_HEIGHT: u16 = 7;

pub struct Renderer;

impl Renderer {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, frame: &mut Frame, state: &GameState, metrics: &GameMetrics) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Length(3), // Header
                Constraint::Min(0),    // Game area
                Constraint::Length(3), // Footer
            ])
            .split(frame.area());

        frame.render_widget(self.render_stats(state, metrics), chunks[0]);

        let game_area = chunks[1];
        frame.render_widget(self.render_grid(state), game_area);

        // Everything but live play gets an overlay on top of the board
        if let Some(overlay) = self.render_overlay(state) {
            let popup = centered(game_area, OVERLAY_WIDTH, OVERLAY_HEIGHT);
            frame.render_widget(Clear, popup);
            frame.render_widget(overlay, popup);
        }

        frame.render_widget(self.render_controls(), chunks[2]);
    }

    fn render_grid(&self, state: &GameState) -> Paragraph<'_> {
        let head = state.snake.head();
        let mut lines = Vec::with_capacity(state.grid_size);

        for y in 0..state.grid_size {
            let mut spans = Vec::with_capacity(state.grid_size);

            for x in 0..state.grid_size {
                let pos = Position::new(x as i32, y as i32);

                let cell = if pos == head {
                    // Snake head - distinct color
                    Span::styled(
                        "■ ",
                        Style::default()
                            .fg(Color::Cyan)
                            .add_modifier(Modifier::BOLD),
                    )
                } else if state.snake.contains(pos) {
                    Span::styled("□ ", Style::default().fg(Color::Green))
                } else if pos == state.food {
                    Span::styled(
                        "O ",
                        Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                    )
                } else {
                    Span::styled(". ", Style::default().fg(Color::DarkGray))
                };

                spans.push(cell);
            }

            lines.push(Line::from(spans));
        }

        Paragraph::new(lines)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Double)
                    .border_style(Style::default().fg(Color::White))
                    .title(" Snake "),
            )
            .alignment(Alignment::Center)
    }

    fn render_stats(&self, state: &GameState, metrics: &GameMetrics) -> Paragraph<'_> {
        let label = Style::default().fg(Color::Yellow);
        let value = Style::default().fg(Color::White);

        let text = vec![Line::from(vec![
            Span::styled("Score: ", label),
            Span::styled(state.score.to_string(), value.add_modifier(Modifier::BOLD)),
            Span::raw("    "),
            Span::styled("Length: ", label),
            Span::styled(state.snake.len().to_string(), value),
            Span::raw("    "),
            Span::styled("Time: ", label),
            Span::styled(metrics.format_time(), value),
            Span::raw("    "),
            Span::styled("Best: ", label),
            Span::styled(metrics.best_score.to_string(), value),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }

    fn render_overlay(&self, state: &GameState) -> Option<Paragraph<'_>> {
        let hint = Style::default().fg(Color::Gray);
        let key = Style::default()
            .fg(Color::Green)
            .add_modifier(Modifier::BOLD);
        let score_line = Line::from(vec![
            Span::styled("Score: ", Style::default().fg(Color::Yellow)),
            Span::styled(
                state.score.to_string(),
                Style::default()
                    .fg(Color::White)
                    .add_modifier(Modifier::BOLD),
            ),
        ]);

        let (color, lines) = match state.phase {
            GamePhase::Playing => return None,
            GamePhase::Waiting => (
                Color::Cyan,
                vec![Line::from(vec![
                    Span::styled("Press ", hint),
                    Span::styled("Enter", key),
                    Span::styled(" to start", hint),
                ])],
            ),
            GamePhase::Paused => (
                Color::Yellow,
                vec![
                    score_line,
                    Line::from(vec![
                        Span::styled("Press ", hint),
                        Span::styled("Space", key),
                        Span::styled(" to resume", hint),
                    ]),
                ],
            ),
            GamePhase::GameOver => (
                Color::Red,
                vec![
                    Line::from(vec![
                        Span::styled("Final Score: ", Style::default().fg(Color::Yellow)),
                        Span::styled(
                            state.score.to_string(),
                            Style::default()
                                .fg(Color::White)
                                .add_modifier(Modifier::BOLD),
                        ),
                    ]),
                    Line::from(vec![
                        Span::styled("Press ", hint),
                        Span::styled("R", key),
                        Span::styled(" to restart or ", hint),
                        Span::styled(
                            "Q",
                            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
                        ),
                        Span::styled(" to quit", hint),
                    ]),
                ],
            ),
        };

        let mut text = vec![
            Line::from(Span::styled(
                state.phase.label(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
        ];
        text.extend(lines);

        Some(
            Paragraph::new(text).alignment(Alignment::Center).block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(color)),
            ),
        )
    }

    fn render_controls(&self) -> Paragraph<'_> {
        let text = vec![Line::from(vec![
            Span::styled("↑↓←→", Style::default().fg(Color::Cyan)),
            Span::raw(" or "),
            Span::styled("WASD", Style::default().fg(Color::Cyan)),
            Span::raw(" to move | "),
            Span::styled("Enter", Style::default().fg(Color::Green)),
            Span::raw(" start | "),
            Span::styled("Space", Style::default().fg(Color::Yellow)),
            Span::raw(" pause | "),
            Span::styled("R", Style::default().fg(Color::Green)),
            Span::raw(" reset | "),
            Span::styled("Q", Style::default().fg(Color::Red)),
            Span::raw(" quit"),
        ])];

        Paragraph::new(text).alignment(Alignment::Center)
    }
}

impl Default for Renderer {
    fn default() -> Self {
        Self::new()
    }
}

/// A `width`×`height` rectangle centred in `area`, clipped to it
fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let width = width.min(area.width);
    let height = height.min(area.height);
    Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Direction, Snake};
    use ratatui::{Terminal, backend::TestBackend, buffer::Buffer};

    fn state(phase: GamePhase, score: u32) -> GameState {
        let snake = Snake::from_cells(vec![
            Position::new(3, 3),
            Position::new(2, 3),
            Position::new(1, 3),
        ])
        .unwrap();
        let mut state = GameState::new(snake, Position::new(7, 7), Direction::Right, 10);
        state.phase = phase;
        state.score = score;
        state
    }

    fn draw(state: &GameState) -> Buffer {
        let mut terminal = Terminal::new(TestBackend::new(90, 24)).unwrap();
        let metrics = GameMetrics::new();
        terminal
            .draw(|frame| Renderer::new().render(frame, state, &metrics))
            .unwrap();
        terminal.backend().buffer().clone()
    }

    fn text(buffer: &Buffer) -> String {
        buffer.content.iter().map(|cell| cell.symbol()).collect()
    }

    fn count(buffer: &Buffer, symbol: &str) -> usize {
        buffer
            .content
            .iter()
            .filter(|cell| cell.symbol() == symbol)
            .count()
    }

    #[test]
    fn test_playing_draws_board_without_overlay() {
        let buffer = draw(&state(GamePhase::Playing, 20));
        let text = text(&buffer);

        assert!(text.contains("Score: 20"));
        assert!(text.contains("Length: 3"));
        assert!(!text.contains("PAUSED"));
        assert!(!text.contains("GAME OVER"));

        assert_eq!(count(&buffer, "■"), 1);
        assert_eq!(count(&buffer, "□"), 2);
        assert_eq!(count(&buffer, "O"), 1);
    }

    #[test]
    fn test_waiting_overlay() {
        let text = text(&draw(&state(GamePhase::Waiting, 0)));
        assert!(text.contains("WAITING"));
        assert!(text.contains("Press Enter to start"));
    }

    #[test]
    fn test_paused_overlay_shows_score() {
        let text = text(&draw(&state(GamePhase::Paused, 30)));
        assert!(text.contains("PAUSED"));
        assert!(text.contains("Score: 30"));
    }

    #[test]
    fn test_game_over_overlay_shows_final_score() {
        let text = text(&draw(&state(GamePhase::GameOver, 50)));
        assert!(text.contains("GAME OVER"));
        assert!(text.contains("Final Score: 50"));
    }

    #[test]
    fn test_centered_clips_to_area() {
        let area = Rect::new(2, 3, 20, 5);
        let popup = centered(area, 34, 7);
        assert_eq!(popup, area);

        let popup = centered(Rect::new(0, 0, 40, 20), 10, 4);
        assert_eq!(popup, Rect::new(15, 8, 10, 4));
    }
}
