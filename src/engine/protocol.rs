//! Line protocol spoken with the search engine.
//!
//! Every command is one line. `print_raw`, `move` and `search` are answered by
//! exactly one line; `new` and `quit` are not answered.

use std::fmt;

use crate::error::ProtocolError;
use crate::game::{BoardState, Column, Player};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    PrintRaw,
    Move { column: Column, player: Player },
    Search { depth: u32, player: Player },
    New,
    Quit,
}

impl Command {
    /// Whether the engine answers this command with a reply line.
    pub fn expects_reply(&self) -> bool {
        matches!(
            self,
            Command::PrintRaw | Command::Move { .. } | Command::Search { .. }
        )
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Command::PrintRaw => f.write_str("print_raw"),
            Command::Move { column, player } => {
                write!(f, "move {} {} {}", column.row, column.col, player.wire_id())
            }
            Command::Search { depth, player } => {
                write!(f, "search {} {}", depth, player.wire_id())
            }
            Command::New => f.write_str("new"),
            Command::Quit => f.write_str("quit"),
        }
    }
}

/// Game status reported as the last field of a `made_move` reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveStatus {
    Ongoing,
    WinA,
    WinB,
    Draw,
}

impl MoveStatus {
    /// Any token other than the three terminal ones means play continues.
    pub fn from_token(token: &str) -> Self {
        match token {
            "win_A" => MoveStatus::WinA,
            "win_B" => MoveStatus::WinB,
            "draw" => MoveStatus::Draw,
            _ => MoveStatus::Ongoing,
        }
    }
}

/// Split a reply into tokens after checking its keyword.
fn tokens<'a>(line: &'a str, keyword: &'static str) -> Result<Vec<&'a str>, ProtocolError> {
    let parts: Vec<&str> = line.split_whitespace().collect();
    match parts.first() {
        None => Err(ProtocolError::EmptyReply),
        Some(&"error") => Err(ProtocolError::Refused(parts[1..].join(" "))),
        Some(&first) if first == keyword => Ok(parts),
        Some(_) => Err(ProtocolError::UnexpectedReply {
            expected: keyword,
            line: line.trim().to_string(),
        }),
    }
}

fn field<T: std::str::FromStr>(
    raw: &str,
    name: &'static str,
    line: &str,
) -> Result<T, ProtocolError> {
    raw.parse().map_err(|_| ProtocolError::Malformed {
        field: name,
        line: line.trim().to_string(),
    })
}

/// Parse `board_state <A_bits> <B_bits>`.
pub fn parse_board_state(line: &str) -> Result<BoardState, ProtocolError> {
    let parts = tokens(line, "board_state")?;
    if parts.len() != 3 {
        return Err(ProtocolError::Malformed {
            field: "token count",
            line: line.trim().to_string(),
        });
    }
    let owner_a: u64 = field(parts[1], "A bitboard", line)?;
    let owner_b: u64 = field(parts[2], "B bitboard", line)?;
    BoardState::from_bits(owner_a, owner_b)
}

/// Parse `made_move ... <status>`. Only the trailing status is interpreted.
pub fn parse_made_move(line: &str) -> Result<MoveStatus, ProtocolError> {
    let parts = tokens(line, "made_move")?;
    match parts.last() {
        Some(status) if parts.len() >= 2 => Ok(MoveStatus::from_token(status)),
        _ => Err(ProtocolError::Malformed {
            field: "status",
            line: line.trim().to_string(),
        }),
    }
}

/// Parse `bestmove <r> <c> ...`; trailing fields (level, score) are ignored.
pub fn parse_bestmove(line: &str) -> Result<Column, ProtocolError> {
    let parts = tokens(line, "bestmove")?;
    if parts.len() < 3 {
        return Err(ProtocolError::Malformed {
            field: "token count",
            line: line.trim().to_string(),
        });
    }
    let row: usize = field(parts[1], "row", line)?;
    let col: usize = field(parts[2], "col", line)?;
    Column::new(row, col).ok_or_else(|| ProtocolError::Malformed {
        field: "column",
        line: line.trim().to_string(),
    })
}
