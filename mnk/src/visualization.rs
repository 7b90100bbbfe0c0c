use crate::{MoveLookup, Player, Position};

/// Draws the board in a box, one character per cell.
pub fn visualize(lookup: &dyn MoveLookup) -> String {
    let board = lookup.board();
    let width = board.columns() as usize;
    // Draw the top of the box
    let mut result = format!("     {:<width$}", 0, width = width);
    result += "\n    ╭";
    result += &"─".repeat(width);
    result += "╮\n";
    for row in 0..board.rows() {
        result += &format!("{:>3} │", row);
        for column in 0..board.columns() {
            result.push(match lookup.get(Position::new(row, column)) {
                Some(mv) if mv.player == Player::X => 'X',
                Some(_) => 'O',
                None => '·',
            });
        }
        result += "│\n";
    }
    // Draw the bottom of the box
    result += "    ╰";
    result += &"─".repeat(width);
    result += "╯";
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Board, Move, MoveLog};

    #[test]
    fn draws_stones_and_free_cells() {
        let board = Board::new(2, 3, 2).unwrap();
        let log = MoveLog::from_moves(
            board,
            [Move::new(0, 0, Player::X), Move::new(1, 2, Player::O)],
        )
        .unwrap();
        let expected = [
            "     0  ",
            "    ╭───╮",
            "  0 │X··│",
            "  1 │··O│",
            "    ╰───╯",
        ]
        .join("\n");
        assert_eq!(visualize(&log), expected);
    }
}
