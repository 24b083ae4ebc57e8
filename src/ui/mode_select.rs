//! Opening menu choosing who plays each side.

use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use crate::game::GameMode;

const MODES: [GameMode; 3] = [
    GameMode::HumanVsHuman,
    GameMode::HumanVsEngine,
    GameMode::EngineVsEngine,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    Play(GameMode),
    Quit,
}

/// Map a key press on the menu to a choice.
pub fn handle_key(key: &KeyEvent) -> Option<MenuChoice> {
    if key.kind == KeyEventKind::Release {
        return None;
    }
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Some(MenuChoice::Quit),
        KeyCode::Char(c) => GameMode::from_key(c).map(MenuChoice::Play),
        _ => None,
    }
}

fn describe(mode: GameMode) -> &'static str {
    match mode {
        GameMode::HumanVsHuman => "Human vs Human",
        GameMode::HumanVsEngine => "Human vs Engine (you play Red)",
        GameMode::EngineVsEngine => "Engine vs Engine",
    }
}

pub fn render(frame: &mut Frame) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Title
            Constraint::Min(5),    // Options
            Constraint::Length(3), // Hint
        ])
        .split(frame.area());

    let title = Paragraph::new("3D Connect Four")
        .style(Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, chunks[0]);

    let mut lines = vec![Line::from("")];
    for (i, mode) in MODES.iter().enumerate() {
        lines.push(Line::from(format!("{}. {}", i + 1, describe(*mode))));
    }
    let options = Paragraph::new(lines)
        .alignment(Alignment::Center)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title("Select Mode"),
        );
    frame.render_widget(options, chunks[1]);

    let hint = Paragraph::new("1/2/3: Start  |  Q: Quit")
        .style(Style::default().fg(Color::Gray))
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(hint, chunks[2]);
}
