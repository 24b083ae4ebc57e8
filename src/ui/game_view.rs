use crate::game::{Column, GameMode, Player};
use crate::render::PixelBuffer;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::board_widget::BoardCanvas;

/// Screen regions of the game screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GameLayout {
    pub header: Rect,
    /// Bordered frame around the board.
    pub board_frame: Rect,
    /// Inside of the frame, one pixel column per cell.
    pub board: Rect,
    pub controls: Rect,
}

pub fn layout(area: Rect) -> GameLayout {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Min(8),    // Board
            Constraint::Length(3), // Controls
        ])
        .split(area);

    let board = Block::default().borders(Borders::ALL).inner(chunks[1]);
    GameLayout {
        header: chunks[0],
        board_frame: chunks[1],
        board,
        controls: chunks[2],
    }
}

/// What the game screen shows for one frame.
pub struct GameView<'a> {
    pub mode: GameMode,
    pub current_player: Player,
    /// Column the next click would drop into.
    pub hover: Option<Column>,
    pub status: &'a str,
    pub faulted: bool,
    pub game_over: bool,
    pub pixels: &'a PixelBuffer,
}

fn player_color(player: Player) -> Color {
    match player {
        Player::A => Color::Red,
        Player::B => Color::Yellow,
    }
}

pub fn render(frame: &mut Frame, layout: &GameLayout, view: &GameView) {
    render_header(frame, view, layout.header);
    render_board(frame, view, layout);
    render_controls(frame, layout.controls);
    // Overlay goes on top of the board, after it.
    render_status(frame, view, layout.board);
}

fn render_header(frame: &mut Frame, view: &GameView, area: Rect) {
    let target = match view.hover {
        Some(column) => format!("row {}, col {}", column.row, column.col),
        None => "-".to_string(),
    };
    let header = Paragraph::new(format!("Mode: {}  |  Target: {}", view.mode.label(), target))
        .style(
            Style::default()
                .fg(player_color(view.current_player))
                .add_modifier(Modifier::BOLD),
        )
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("3D Connect Four"),
        );

    frame.render_widget(header, area);
}

fn render_board(frame: &mut Frame, view: &GameView, layout: &GameLayout) {
    frame.render_widget(Block::default().borders(Borders::ALL), layout.board_frame);
    frame.render_widget(BoardCanvas::new(view.pixels), layout.board);
}

fn render_status(frame: &mut Frame, view: &GameView, board: Rect) {
    if board.height == 0 {
        return;
    }
    let color = if view.faulted {
        Color::LightRed
    } else if view.game_over {
        Color::LightGreen
    } else {
        Color::White
    };
    let line = Line::from(Span::styled(
        format!(" {} ", view.status),
        Style::default()
            .fg(color)
            .bg(Color::Black)
            .add_modifier(Modifier::BOLD),
    ));
    let area = Rect {
        height: 1,
        ..board
    };
    frame.render_widget(Paragraph::new(line), area);
}

fn render_controls(frame: &mut Frame, area: Rect) {
    let line = Line::from("←/→/↑/↓ or right-drag: Rotate  |  Click: Drop  |  R: Reset  |  Q: Quit");

    let controls = Paragraph::new(line)
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Controls"),
        );

    frame.render_widget(controls, area);
}
