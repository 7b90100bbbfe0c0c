mod bbox;
mod hypothetical;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

pub use bbox::*;
pub use hypothetical::*;

use crate::{Error, Result};

/// A cell coordinate.
///
/// Coordinates are signed so that a candidate outside of the board can be
/// expressed at all; it is then simply not a possible move.
///
/// The derived ordering is row-major, which is the enumeration order used
/// everywhere determinism matters.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Position {
    pub row: i32,
    pub column: i32,
}

impl Position {
    pub fn new(row: i32, column: i32) -> Self {
        Self { row, column }
    }

    /// The position `steps` steps away in direction `(d_row, d_column)`.
    pub fn offset(self, (d_row, d_column): (i32, i32), steps: i32) -> Self {
        Self {
            row: self.row + d_row * steps,
            column: self.column + d_column * steps,
        }
    }
}

impl std::fmt::Display for Position {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.row, self.column)
    }
}

/// One of the two players.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Player {
    X,
    O,
}

impl Player {
    pub fn opponent(self) -> Self {
        match self {
            Player::X => Player::O,
            Player::O => Player::X,
        }
    }
}

impl std::fmt::Display for Player {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Player::X => write!(f, "X"),
            Player::O => write!(f, "O"),
        }
    }
}

/// A stone placed (or to be placed) by a player.
///
/// Two moves are equal when coordinates and player are equal, no matter
/// when or on which board they were played.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Move {
    pub row: i32,
    pub column: i32,
    pub player: Player,
}

impl Move {
    pub fn new(row: i32, column: i32, player: Player) -> Self {
        Self {
            row,
            column,
            player,
        }
    }

    pub fn at(position: Position, player: Player) -> Self {
        Self::new(position.row, position.column, player)
    }

    pub fn position(&self) -> Position {
        Position::new(self.row, self.column)
    }
}

impl std::fmt::Display for Move {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}@{}", self.player, self.position())
    }
}

/// The extents of the playing field and the length of a winning run.
///
/// Deserialization goes through [`Board::new()`], so a deserialized board is
/// always valid.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Extents", into = "Extents")]
pub struct Board {
    rows: i32,
    columns: i32,
    win_length: i32,
}

#[derive(Serialize, Deserialize)]
struct Extents {
    rows: i32,
    columns: i32,
    win_length: i32,
}

impl Board {
    pub fn new(rows: i32, columns: i32, win_length: i32) -> Result<Self> {
        if rows < 1 || columns < 1 {
            return Err(Error::InvalidConfiguration(format!(
                "a board needs at least one row and one column, got {}x{}",
                rows, columns
            )));
        }
        if win_length < 1 {
            return Err(Error::InvalidConfiguration(format!(
                "the winning run length must be positive, got {}",
                win_length
            )));
        }
        Ok(Self {
            rows,
            columns,
            win_length,
        })
    }

    pub fn rows(&self) -> i32 {
        self.rows
    }

    pub fn columns(&self) -> i32 {
        self.columns
    }

    /// K, the number of consecutive stones needed to win.
    pub fn win_length(&self) -> i32 {
        self.win_length
    }

    pub fn contains(&self, position: Position) -> bool {
        position.row >= 0
            && position.column >= 0
            && position.row < self.rows
            && position.column < self.columns
    }

    /// The length of the longest line on the board.
    ///
    /// Any two cells are fewer than `span()` steps apart, so a walk or a
    /// neighbourhood wider than that only adds off-board cells.
    pub fn span(&self) -> i32 {
        self.rows.max(self.columns)
    }

    pub fn center(&self) -> Position {
        Position::new(self.rows / 2, self.columns / 2)
    }

    pub fn num_cells(&self) -> usize {
        self.rows as usize * self.columns as usize
    }

    /// The whole board as a bounding box.
    pub fn area(&self) -> BoundingBox {
        BoundingBox {
            row_min: 0,
            column_min: 0,
            row_max: self.rows - 1,
            column_max: self.columns - 1,
        }
    }

    /// All cells in row-major order.
    pub fn positions(&self) -> impl DoubleEndedIterator<Item = Position> {
        self.area().positions()
    }
}

impl TryFrom<Extents> for Board {
    type Error = Error;

    fn try_from(extents: Extents) -> Result<Self> {
        Board::new(extents.rows, extents.columns, extents.win_length)
    }
}

impl From<Board> for Extents {
    fn from(board: Board) -> Self {
        Extents {
            rows: board.rows,
            columns: board.columns,
            win_length: board.win_length,
        }
    }
}

/// Read access to the stones on a board.
///
/// This is everything the analysis needs from whoever keeps track of the
/// game. Implementations are shared between scan workers, hence `Sync`.
pub trait MoveLookup: Sync {
    fn board(&self) -> &Board;

    /// The move played on this cell, if any.
    fn get(&self, position: Position) -> Option<Move>;

    /// All played moves, in no particular order.
    fn moves(&self) -> Box<dyn Iterator<Item = Move> + '_>;

    fn num_moves(&self) -> usize {
        self.moves().count()
    }

    fn is_empty(&self) -> bool {
        self.moves().next().is_none()
    }
}

/// A plain in-memory record of the moves of one match.
#[derive(Clone, Debug)]
pub struct MoveLog {
    board: Board,
    /// There is at most one entry for every cell.
    moves: HashMap<Position, Move>,
}

impl MoveLog {
    pub fn new(board: Board) -> Self {
        Self {
            board,
            moves: HashMap::new(),
        }
    }

    /// Creates a log from a list of moves, validating each one.
    pub fn from_moves(board: Board, moves: impl IntoIterator<Item = Move>) -> Result<Self> {
        let mut log = Self::new(board);
        for mv in moves {
            log.play(mv)?;
        }
        Ok(log)
    }

    /// Records a move.
    ///
    /// Fails if the cell is outside of the board or already taken.
    pub fn play(&mut self, mv: Move) -> Result<()> {
        let position = mv.position();
        if !self.board.contains(position) {
            return Err(Error::OutOfRange {
                row: mv.row,
                column: mv.column,
            });
        }
        if self.moves.contains_key(&position) {
            return Err(Error::Occupied {
                row: mv.row,
                column: mv.column,
            });
        }
        self.moves.insert(position, mv);
        Ok(())
    }

    pub fn contains(&self, mv: Move) -> bool {
        self.moves.get(&mv.position()) == Some(&mv)
    }
}

impl MoveLookup for MoveLog {
    fn board(&self) -> &Board {
        &self.board
    }

    fn get(&self, position: Position) -> Option<Move> {
        self.moves.get(&position).copied()
    }

    fn moves(&self) -> Box<dyn Iterator<Item = Move> + '_> {
        Box::new(self.moves.values().copied())
    }

    fn num_moves(&self) -> usize {
        self.moves.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn board_rejects_degenerate_extents() {
        assert!(matches!(
            Board::new(0, 3, 3),
            Err(Error::InvalidConfiguration(_))
        ));
        assert!(matches!(
            Board::new(3, 3, 0),
            Err(Error::InvalidConfiguration(_))
        ));
        assert!(Board::new(1, 1, 1).is_ok());
    }

    #[test]
    fn board_deserialization_is_validated() {
        let board: Board =
            serde_json::from_str(r#"{"rows": 6, "columns": 7, "win_length": 4}"#).unwrap();
        assert_eq!(board, Board::new(6, 7, 4).unwrap());
        assert!(serde_json::from_str::<Board>(r#"{"rows": 6, "columns": 7, "win_length": 0}"#)
            .is_err());
    }

    #[test]
    fn positions_are_row_major() {
        let board = Board::new(2, 3, 2).unwrap();
        let positions: Vec<_> = board.positions().collect();
        assert_eq!(positions.len(), 6);
        assert_eq!(positions[0], Position::new(0, 0));
        assert_eq!(positions[1], Position::new(0, 1));
        assert_eq!(positions[3], Position::new(1, 0));
        let mut sorted = positions.clone();
        sorted.sort();
        assert_eq!(positions, sorted);
    }

    #[test]
    fn move_log_rejects_bad_moves() {
        let mut log = MoveLog::new(Board::new(3, 3, 3).unwrap());
        log.play(Move::new(1, 1, Player::X)).unwrap();
        assert!(matches!(
            log.play(Move::new(1, 1, Player::O)),
            Err(Error::Occupied { row: 1, column: 1 })
        ));
        assert!(matches!(
            log.play(Move::new(3, 0, Player::O)),
            Err(Error::OutOfRange { row: 3, column: 0 })
        ));
        assert_eq!(log.num_moves(), 1);
        assert_eq!(log.get(Position::new(1, 1)), Some(Move::new(1, 1, Player::X)));
        assert!(log.contains(Move::new(1, 1, Player::X)));
        assert!(!log.contains(Move::new(1, 1, Player::O)));
    }

    #[test]
    fn positions_in_row_major_order_both_ways() {
        let board = Board::new(2, 3, 3).unwrap();
        let forward: Vec<Position> = board.positions().collect();
        assert_eq!(forward.len(), board.num_cells());
        assert!(forward.windows(2).all(|pair| pair[0] < pair[1]));
        let mut backward: Vec<Position> = board.positions().rev().collect();
        assert_eq!(backward[0], Position::new(1, 2));
        backward.reverse();
        assert_eq!(backward, forward);
    }

    #[test]
    fn span_is_the_longer_side() {
        assert_eq!(Board::new(3, 7, 3).unwrap().span(), 7);
        assert_eq!(Board::new(4, 2, 9).unwrap().span(), 4);
        assert_eq!(Board::new(3, 3, i32::MAX).unwrap().span(), 3);
    }
}
