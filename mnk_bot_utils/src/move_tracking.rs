use anyhow::{bail, Context};
use mnk::{Board, Move, MoveLog, MoveLookup, Player, TurnResponse};
use tracing::warn;

use crate::Bot;

/// What a bot knows about the current match, derived from the move lists
/// it receives.
///
/// This can be automatically updated by implementing [`HasMoveTracker`] for
/// your bot and wrapping it in a [`MoveTrackingWrapper`].
#[derive(Clone, Debug, Default)]
pub struct MoveTracker {
    game: Option<(Player, MoveLog)>,
    fresh: Vec<Move>,
    resynced: bool,
}

impl MoveTracker {
    fn new_game(&mut self, player: Player, board: Board) {
        self.game = Some((player, MoveLog::new(board)));
        self.fresh.clear();
        self.resynced = false;
    }

    /// Takes in the full list of moves sent with a turn.
    fn update(&mut self, moves: &[Move]) -> anyhow::Result<()> {
        let Some((_, log)) = &mut self.game else {
            bail!("Asked to play a turn before a game was started");
        };
        self.fresh.clear();
        let known = moves.iter().filter(|&&mv| log.contains(mv)).count();
        self.resynced = known != log.num_moves();
        if self.resynced {
            warn!(
                known = log.num_moves(),
                received = moves.len(),
                "Move list does not extend the known moves, starting over"
            );
            *log = MoveLog::from_moves(*log.board(), moves.iter().copied())
                .context("Invalid move list")?;
            self.fresh.extend_from_slice(moves);
            return Ok(());
        }
        for &mv in moves {
            if !log.contains(mv) {
                log.play(mv).with_context(|| format!("Invalid move {}", mv))?;
                self.fresh.push(mv);
            }
        }
        Ok(())
    }

    /// The bot's own side, once a game was started.
    pub fn player(&self) -> Option<Player> {
        self.game.as_ref().map(|(player, _)| *player)
    }

    /// All moves played so far, once a game was started.
    pub fn log(&self) -> Option<&MoveLog> {
        self.game.as_ref().map(|(_, log)| log)
    }

    /// The moves that are new in this turn, in the order they were played.
    pub fn fresh(&self) -> &[Move] {
        &self.fresh
    }

    /// Whether the moves of this turn did not build on the previous ones.
    ///
    /// All of them are fresh then.
    pub fn resynced(&self) -> bool {
        self.resynced
    }
}

/// Implement this trait on your bot to allow it to be used with a [`MoveTrackingWrapper`].
///
/// Basically the same as `DerefMut<Target=MoveTracker>`
pub trait HasMoveTracker {
    fn get_tracker(&mut self) -> &mut MoveTracker;
}

/// Automatically tracks moves for your bot.
pub struct MoveTrackingWrapper<T>
where
    T: HasMoveTracker,
{
    bot: T,
}

impl<T> MoveTrackingWrapper<T>
where
    T: HasMoveTracker,
{
    pub fn new(bot: T) -> Self {
        Self { bot }
    }

    pub fn inner(&self) -> &T {
        &self.bot
    }

    pub fn inner_mut(&mut self) -> &mut T {
        &mut self.bot
    }
}

impl<T: HasMoveTracker + Bot> Bot for MoveTrackingWrapper<T> {
    fn new_game(&mut self, player: Player, board: Board) -> anyhow::Result<()> {
        self.bot.get_tracker().new_game(player, board);
        self.bot.new_game(player, board)
    }

    fn play_turn(&mut self, moves: Vec<Move>) -> anyhow::Result<TurnResponse> {
        self.bot.get_tracker().update(&moves)?;
        self.bot.play_turn(moves)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> Board {
        Board::new(3, 3, 3).unwrap()
    }

    #[test]
    fn fresh_moves_in_play_order() {
        let mut tracker = MoveTracker::default();
        tracker.new_game(Player::O, board());
        let first = Move::new(1, 1, Player::X);
        tracker.update(&[first]).unwrap();
        assert_eq!(tracker.fresh(), &[first]);
        assert!(!tracker.resynced());

        let mine = Move::new(0, 0, Player::O);
        let theirs = Move::new(2, 2, Player::X);
        tracker.update(&[first, mine, theirs]).unwrap();
        assert_eq!(tracker.fresh(), &[mine, theirs]);
        assert!(!tracker.resynced());
        assert_eq!(tracker.log().unwrap().num_moves(), 3);
        assert_eq!(tracker.player(), Some(Player::O));
    }

    #[test]
    fn unrelated_move_list_starts_over() {
        let mut tracker = MoveTracker::default();
        tracker.new_game(Player::X, board());
        tracker.update(&[Move::new(1, 1, Player::X)]).unwrap();
        let moves = [Move::new(0, 0, Player::X), Move::new(0, 1, Player::O)];
        tracker.update(&moves).unwrap();
        assert!(tracker.resynced());
        assert_eq!(tracker.fresh(), &moves);
        assert!(!tracker.log().unwrap().contains(Move::new(1, 1, Player::X)));
    }

    #[test]
    fn rejects_turns_outside_a_game_and_bad_moves() {
        let mut tracker = MoveTracker::default();
        assert!(tracker.update(&[]).is_err());
        tracker.new_game(Player::X, board());
        assert!(tracker.update(&[Move::new(3, 0, Player::X)]).is_err());
        assert!(tracker
            .update(&[Move::new(0, 0, Player::X), Move::new(0, 0, Player::O)])
            .is_err());
    }

    #[test]
    fn new_game_forgets_the_old_one() {
        let mut tracker = MoveTracker::default();
        tracker.new_game(Player::X, board());
        tracker.update(&[Move::new(1, 1, Player::X)]).unwrap();
        tracker.new_game(Player::O, Board::new(4, 4, 3).unwrap());
        assert_eq!(tracker.log().unwrap().num_moves(), 0);
        assert_eq!(tracker.log().unwrap().board().rows(), 4);
        assert!(tracker.fresh().is_empty());
    }
}
