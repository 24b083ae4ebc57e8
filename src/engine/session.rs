use tracing::{debug, instrument, warn};

use super::client::{EngineClient, EngineKiller};
use super::protocol::{self, Command, MoveStatus};
use crate::error::ProtocolError;
use crate::game::{BoardState, Column, Player};

/// A move the engine accepted, with its authoritative board afterwards.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AppliedMove {
    pub board: BoardState,
    pub status: MoveStatus,
}

/// Sequences protocol exchanges over a single engine client.
pub struct EngineSession {
    client: EngineClient,
}

impl EngineSession {
    pub fn new(client: EngineClient) -> Self {
        EngineSession { client }
    }

    pub fn is_alive(&mut self) -> bool {
        self.client.is_alive()
    }

    pub fn killer(&self) -> Option<EngineKiller> {
        self.client.killer()
    }

    /// Fetch the engine's bitboards.
    pub fn board_state(&mut self) -> Result<BoardState, ProtocolError> {
        let line = self.client.request(Command::PrintRaw);
        protocol::parse_board_state(&line)
    }

    /// Play a move and resynchronise the board from the engine.
    #[instrument(skip(self))]
    pub fn play_move(
        &mut self,
        column: Column,
        player: Player,
    ) -> Result<AppliedMove, ProtocolError> {
        let line = self.client.request(Command::Move { column, player });
        let status = protocol::parse_made_move(&line).map_err(|e| {
            warn!(error = %e, "move rejected");
            e
        })?;
        let board = self.board_state().map_err(|e| {
            warn!(error = %e, "board refresh after move failed");
            e
        })?;
        debug!(?status, pieces = board.piece_count(), "move applied");
        Ok(AppliedMove { board, status })
    }

    /// Ask the engine for its best move for `player`.
    #[instrument(skip(self))]
    pub fn search(&mut self, depth: u32, player: Player) -> Result<Column, ProtocolError> {
        let line = self.client.request(Command::Search { depth, player });
        let column = protocol::parse_bestmove(&line).map_err(|e| {
            warn!(error = %e, "search reply unusable");
            e
        })?;
        debug!(row = column.row, col = column.col, "engine chose column");
        Ok(column)
    }

    pub fn new_game(&mut self) {
        self.client.notify(Command::New);
    }

    /// Send `quit` and release the engine process.
    pub fn close(&mut self) {
        self.client.close();
    }
}
