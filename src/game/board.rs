use super::Player;
use crate::error::ProtocolError;

/// Edge length of the cube.
pub const SIZE: usize = 4;
/// Number of cells (and bits per bitboard).
pub const CELLS: usize = SIZE * SIZE * SIZE;

/// A board position. Depth 0 is the bottom level, pieces fall towards it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Cell {
    pub depth: usize,
    pub row: usize,
    pub col: usize,
}

impl Cell {
    /// Create a cell, or `None` if any coordinate is off the board.
    pub fn new(depth: usize, row: usize, col: usize) -> Option<Self> {
        if depth < SIZE && row < SIZE && col < SIZE {
            Some(Cell { depth, row, col })
        } else {
            None
        }
    }

    /// Bit index inside a bitboard. The first cell (0, 0, 0) is the most
    /// significant bit.
    pub fn bit_index(self) -> u32 {
        (CELLS - 1 - (self.depth * 16 + self.row * 4 + self.col)) as u32
    }

    /// Inverse of [`Cell::bit_index`].
    pub fn from_bit_index(index: u32) -> Option<Self> {
        let index = index as usize;
        if index >= CELLS {
            return None;
        }
        let slot = CELLS - 1 - index;
        Some(Cell {
            depth: slot / 16,
            row: (slot / 4) % 4,
            col: slot % 4,
        })
    }

    pub fn mask(self) -> u64 {
        1u64 << self.bit_index()
    }

    /// Iterate all 64 cells, depth-major.
    pub fn all() -> impl Iterator<Item = Cell> {
        (0..SIZE).flat_map(|depth| {
            (0..SIZE).flat_map(move |row| (0..SIZE).map(move |col| Cell { depth, row, col }))
        })
    }
}

/// A vertical stack of four cells, addressed by (row, col). Moves target a
/// column; gravity picks the depth.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Column {
    pub row: usize,
    pub col: usize,
}

impl Column {
    pub fn new(row: usize, col: usize) -> Option<Self> {
        if row < SIZE && col < SIZE {
            Some(Column { row, col })
        } else {
            None
        }
    }

    pub fn cell(self, depth: usize) -> Cell {
        Cell {
            depth,
            row: self.row,
            col: self.col,
        }
    }

    /// Iterate the 16 columns, row-major.
    pub fn all() -> impl Iterator<Item = Column> {
        (0..SIZE).flat_map(|row| (0..SIZE).map(move |col| Column { row, col }))
    }
}

/// Occupancy of the cube as two disjoint bitboards.
///
/// Boards are values: a new board replaces the old one whenever the engine
/// reports its authoritative state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BoardState {
    owner_a: u64,
    owner_b: u64,
}

impl BoardState {
    /// Create a new empty board
    pub fn new() -> Self {
        BoardState::default()
    }

    /// Build a board from raw bitboards, rejecting cells claimed by both
    /// players.
    pub fn from_bits(owner_a: u64, owner_b: u64) -> Result<Self, ProtocolError> {
        if owner_a & owner_b != 0 {
            return Err(ProtocolError::OverlappingOwners { owner_a, owner_b });
        }
        Ok(BoardState { owner_a, owner_b })
    }

    pub fn owner_a(&self) -> u64 {
        self.owner_a
    }

    pub fn owner_b(&self) -> u64 {
        self.owner_b
    }

    pub fn occupied(&self) -> u64 {
        self.owner_a | self.owner_b
    }

    /// Which player, if any, holds a cell.
    pub fn occupant(&self, cell: Cell) -> Option<Player> {
        let mask = cell.mask();
        if self.owner_a & mask != 0 {
            Some(Player::A)
        } else if self.owner_b & mask != 0 {
            Some(Player::B)
        } else {
            None
        }
    }

    /// Lowest empty depth in a column, scanning upward from depth 0.
    pub fn lowest_free_depth(&self, column: Column) -> Option<usize> {
        let occupied = self.occupied();
        (0..SIZE).find(|&depth| occupied & column.cell(depth).mask() == 0)
    }

    /// Check if a column is full
    pub fn is_column_full(&self, column: Column) -> bool {
        self.lowest_free_depth(column).is_none()
    }

    pub fn piece_count(&self) -> u32 {
        self.occupied().count_ones()
    }

    /// Check if the board is completely full
    pub fn is_full(&self) -> bool {
        self.occupied() == u64::MAX
    }

    /// Drop a piece for `player` into `column`, returning the new board and the
    /// cell it landed in. The engine is authoritative; this mirrors its gravity
    /// rule for previews and tests.
    pub fn with_drop(&self, column: Column, player: Player) -> Option<(BoardState, Cell)> {
        let cell = column.cell(self.lowest_free_depth(column)?);
        let mut next = *self;
        match player {
            Player::A => next.owner_a |= cell.mask(),
            Player::B => next.owner_b |= cell.mask(),
        }
        Some((next, cell))
    }
}
