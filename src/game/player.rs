#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Player {
    A,
    B,
}

impl Player {
    /// Get the other player
    pub fn other(self) -> Player {
        match self {
            Player::A => Player::B,
            Player::B => Player::A,
        }
    }

    /// Numeric id used on the engine wire (`1` for A, `2` for B).
    pub fn wire_id(self) -> u8 {
        match self {
            Player::A => 1,
            Player::B => 2,
        }
    }

    /// Get player name for display
    pub fn name(self) -> &'static str {
        match self {
            Player::A => "Player A (Red)",
            Player::B => "Player B (Yellow)",
        }
    }
}
