use super::{Board, Move, MoveLookup, Position};

/// A board as it would look after some further moves.
///
/// The additional moves are layered over a borrowed base without copying
/// it, which is how prediction tree nodes see "their" board.
pub struct Hypothetical<'a> {
    base: &'a dyn MoveLookup,
    /// Must not contain a move on a cell that the base (or an earlier entry) uses.
    extra: &'a [Move],
}

impl<'a> Hypothetical<'a> {
    pub fn new(base: &'a dyn MoveLookup, extra: &'a [Move]) -> Self {
        debug_assert!(extra.iter().all(|mv| base.get(mv.position()).is_none()));
        Self { base, extra }
    }
}

impl MoveLookup for Hypothetical<'_> {
    fn board(&self) -> &Board {
        self.base.board()
    }

    fn get(&self, position: Position) -> Option<Move> {
        self.extra
            .iter()
            .find(|mv| mv.position() == position)
            .copied()
            .or_else(|| self.base.get(position))
    }

    fn moves(&self) -> Box<dyn Iterator<Item = Move> + '_> {
        Box::new(self.base.moves().chain(self.extra.iter().copied()))
    }

    fn num_moves(&self) -> usize {
        self.base.num_moves() + self.extra.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{MoveLog, Player};

    #[test]
    fn layers_moves_over_base() {
        let board = Board::new(3, 3, 3).unwrap();
        let log = MoveLog::from_moves(board, [Move::new(0, 0, Player::X)]).unwrap();
        let extra = [Move::new(1, 1, Player::O)];
        let hypothetical = Hypothetical::new(&log, &extra);
        assert_eq!(hypothetical.num_moves(), 2);
        assert_eq!(hypothetical.moves().count(), 2);
        assert_eq!(
            hypothetical.get(Position::new(1, 1)),
            Some(Move::new(1, 1, Player::O))
        );
        assert_eq!(
            hypothetical.get(Position::new(0, 0)),
            Some(Move::new(0, 0, Player::X))
        );
        assert_eq!(hypothetical.get(Position::new(2, 2)), None);
        // The base is untouched
        assert_eq!(log.get(Position::new(1, 1)), None);
    }
}
