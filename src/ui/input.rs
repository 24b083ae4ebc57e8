//! Maps terminal key and mouse events onto game-screen actions.

use crossterm::event::{
    Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind,
};
use ratatui::layout::{Position, Rect};

use crate::config::CameraConfig;
use crate::render::Point;

/// What the game screen should do in response to one event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputAction {
    Rotate { yaw: f64, pitch: f64 },
    /// Pointer moved; `None` when it left the board.
    PointerMoved(Option<Point>),
    /// Left click on the board at this pixel.
    Submit(Point),
    Reset,
    Quit,
}

/// Translate a terminal cell inside `board` to the centre of its pixels.
/// Each cell carries one pixel across and two down.
pub fn cell_to_pixel(board: Rect, column: u16, row: u16) -> Option<Point> {
    if !board.contains(Position::new(column, row)) {
        return None;
    }
    let x = f64::from(column - board.x) + 0.5;
    let y = f64::from(row - board.y) * 2.0 + 1.0;
    Some(Point::new(x, y))
}

/// Stateful event mapper; remembers an in-progress right-button drag.
#[derive(Debug, Clone)]
pub struct InputController {
    rotate_step: f64,
    drag_sensitivity: f64,
    drag_from: Option<(u16, u16)>,
}

impl InputController {
    pub fn new(camera: &CameraConfig) -> Self {
        InputController {
            rotate_step: camera.rotate_step,
            drag_sensitivity: camera.drag_sensitivity,
            drag_from: None,
        }
    }

    /// Map one event. `board` is where the board was last drawn.
    pub fn handle(&mut self, event: &Event, board: Rect) -> Option<InputAction> {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse, board),
            _ => None,
        }
    }

    fn handle_key(&self, key: &KeyEvent) -> Option<InputAction> {
        if key.kind == KeyEventKind::Release {
            return None;
        }
        let step = self.rotate_step;
        match key.code {
            KeyCode::Left => Some(InputAction::Rotate {
                yaw: step,
                pitch: 0.0,
            }),
            KeyCode::Right => Some(InputAction::Rotate {
                yaw: -step,
                pitch: 0.0,
            }),
            KeyCode::Up => Some(InputAction::Rotate {
                yaw: 0.0,
                pitch: step,
            }),
            KeyCode::Down => Some(InputAction::Rotate {
                yaw: 0.0,
                pitch: -step,
            }),
            KeyCode::Char('r') | KeyCode::Char('R') => Some(InputAction::Reset),
            KeyCode::Char('q') | KeyCode::Esc => Some(InputAction::Quit),
            _ => None,
        }
    }

    fn handle_mouse(&mut self, mouse: &MouseEvent, board: Rect) -> Option<InputAction> {
        let (column, row) = (mouse.column, mouse.row);
        match mouse.kind {
            MouseEventKind::Moved => Some(InputAction::PointerMoved(cell_to_pixel(
                board, column, row,
            ))),
            MouseEventKind::Down(MouseButton::Left) => {
                cell_to_pixel(board, column, row).map(InputAction::Submit)
            }
            MouseEventKind::Down(MouseButton::Right) => {
                self.drag_from = Some((column, row));
                None
            }
            MouseEventKind::Drag(MouseButton::Right) => {
                let (last_col, last_row) = self.drag_from?;
                self.drag_from = Some((column, row));
                let dx = f64::from(column) - f64::from(last_col);
                // Two pixels per row.
                let dy = (f64::from(row) - f64::from(last_row)) * 2.0;
                if dx == 0.0 && dy == 0.0 {
                    return None;
                }
                Some(InputAction::Rotate {
                    yaw: dx * self.drag_sensitivity,
                    pitch: dy * self.drag_sensitivity,
                })
            }
            MouseEventKind::Up(MouseButton::Right) => {
                self.drag_from = None;
                None
            }
            _ => None,
        }
    }
}
