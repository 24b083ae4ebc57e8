//! Terminal UI: mode menu, the rotating 3D board, and the frame loop that
//! drives the engine worker.

mod app;
pub mod board_widget;
mod game_view;
pub mod input;
mod mode_select;

pub use app::App;
