use quickcheck::{Arbitrary, Gen};

use crate::{Board, Move, MoveLog, Player, Position};

/// A partly played match plus a candidate move.
///
/// The candidate may lie on an occupied cell or up to one cell outside of
/// the board.
#[derive(Clone, Debug)]
pub struct ArbitraryGame {
    pub log: MoveLog,
    pub candidate: Move,
}

impl ArbitraryGame {
    fn on(g: &mut Gen, board: Board) -> Self {
        let log = arbitrary_log(g, board);
        let row = (u8::arbitrary(g) % (board.rows() as u8 + 2)) as i32 - 1;
        let column = (u8::arbitrary(g) % (board.columns() as u8 + 2)) as i32 - 1;
        let candidate = Move::new(row, column, Player::arbitrary(g));
        ArbitraryGame { log, candidate }
    }
}

impl Arbitrary for ArbitraryGame {
    fn arbitrary(g: &mut Gen) -> Self {
        let rows = 3 + (u8::arbitrary(g) % 6) as i32;
        let columns = 3 + (u8::arbitrary(g) % 6) as i32;
        let longest = rows.min(columns).min(5);
        let win_length = 3 + (u8::arbitrary(g) % (longest as u8 - 2)) as i32;
        let board = Board::new(rows, columns, win_length).unwrap();
        Self::on(g, board)
    }
}

/// An [`ArbitraryGame`] on the 3×3 board with K = 3.
#[derive(Clone, Debug)]
pub struct TicTacToe(pub ArbitraryGame);

impl Arbitrary for TicTacToe {
    fn arbitrary(g: &mut Gen) -> Self {
        TicTacToe(ArbitraryGame::on(g, Board::new(3, 3, 3).unwrap()))
    }
}

/// Alternating moves, X first, on random free cells.
pub fn arbitrary_log(g: &mut Gen, board: Board) -> MoveLog {
    let mut log = MoveLog::new(board);
    let num_moves = usize::arbitrary(g) % (board.num_cells() + 1);
    let mut free: Vec<Position> = board.positions().collect();
    let mut player = Player::X;
    for _ in 0..num_moves {
        let idx = usize::arbitrary(g) % free.len();
        let position = free.swap_remove(idx);
        log.play(Move::at(position, player)).unwrap();
        player = player.opponent();
    }
    log
}

impl Arbitrary for Player {
    fn arbitrary(g: &mut Gen) -> Self {
        *g.choose(&[Player::X, Player::O]).unwrap()
    }
}
