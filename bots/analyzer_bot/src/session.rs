use anyhow::Context;
use mnk::{
    visualize, AnalyzerConfig, Board, GrowthPolicy, Move, MoveLog, MoveLookup, Player,
    PredictionTree,
};
use mnk_bot_utils::MoveTracker;
use tracing::{debug, info};

/// The prediction tree of one match, kept in step with the real moves.
pub struct Session {
    player: Player,
    config: AnalyzerConfig,
    /// The moves the tree was last brought up to date with.
    replica: MoveLog,
    tree: Option<PredictionTree>,
}

impl Session {
    /// Fails if the analysis can't work on this board.
    pub fn new(player: Player, board: Board, config: AnalyzerConfig) -> anyhow::Result<Self> {
        // Catch a bad board now rather than on the first turn
        GrowthPolicy::new(&board, &config).context("Cannot analyze this board")?;
        Ok(Self {
            player,
            config,
            replica: MoveLog::new(board),
            tree: None,
        })
    }

    fn build(&self, log: &MoveLog) -> anyhow::Result<PredictionTree> {
        let policy = GrowthPolicy::new(log.board(), &self.config)?;
        Ok(PredictionTree::new(log, self.player, policy))
    }

    /// Brings the tree up to date with the moves of a new turn, and returns it.
    ///
    /// Every fresh move that was predicted only advances the tree; the
    /// tree is built from scratch for the first turn and after a resync.
    pub fn advance(&mut self, tracker: &MoveTracker) -> anyhow::Result<&PredictionTree> {
        let log = tracker
            .log()
            .context("Asked to play a turn before a game was started")?;
        let tree = match self.tree.take() {
            Some(mut tree) if !tracker.resynced() => {
                for &mv in tracker.fresh() {
                    self.replica.play(mv)?;
                    tree.grow(&self.replica, mv);
                }
                if tree.to_move() != self.player {
                    info!(player = %self.player, "Not our turn according to the tree, rebuilding");
                    tree.cuttings(log, self.player);
                }
                tree
            }
            _ => {
                self.replica = log.clone();
                self.build(log)?
            }
        };
        debug!(
            moves = log.num_moves(),
            nodes = tree.num_nodes(),
            "Board:\n{}",
            visualize(log)
        );
        Ok(self.tree.insert(tree))
    }
}

#[cfg(test)]
mod tests {
    use mnk::{Analyzer, Position};
    use mnk_bot_utils::{Bot, HasMoveTracker, MoveTrackingWrapper};

    use super::*;

    impl Session {
        fn replica(&self) -> &MoveLog {
            &self.replica
        }
    }

    /// Just enough of a bot to feed a tracker.
    #[derive(Default)]
    struct Recorder {
        tracker: MoveTracker,
    }

    impl HasMoveTracker for Recorder {
        fn get_tracker(&mut self) -> &mut MoveTracker {
            &mut self.tracker
        }
    }

    impl Bot for Recorder {
        fn new_game(&mut self, _player: Player, _board: Board) -> anyhow::Result<()> {
            Ok(())
        }

        fn play_turn(&mut self, _moves: Vec<Move>) -> anyhow::Result<mnk::TurnResponse> {
            Ok(mnk::TurnResponse::NoLegalMove)
        }
    }

    fn small() -> AnalyzerConfig {
        AnalyzerConfig {
            branching: 3,
            ..AnalyzerConfig::default()
        }
    }

    #[test]
    fn follows_the_match() {
        let board = Board::new(5, 5, 3).unwrap();
        let analyzer = Analyzer::new(small());
        let mut session = Session::new(Player::O, board, small()).unwrap();
        let mut wrapper = MoveTrackingWrapper::new(Recorder::default());
        wrapper.new_game(Player::O, board).unwrap();

        let mut moves = vec![Move::new(2, 2, Player::X)];
        for turn in 0..3 {
            wrapper.play_turn(moves.clone()).unwrap();
            let tracker = wrapper_tracker(&mut wrapper);
            let tree = session.advance(&tracker).unwrap();
            assert_eq!(tree.to_move(), Player::O);

            let fresh = {
                let policy = GrowthPolicy::new(&board, &small()).unwrap();
                PredictionTree::new(tracker.log().unwrap(), Player::O, policy)
            };
            assert_eq!(analyzer.scores(tree), analyzer.scores(&fresh), "turn {}", turn);

            let mine = Move::at(analyzer.analyze(tree).unwrap(), Player::O);
            moves.push(mine);
            // The opponent answers somewhere away from the action
            let reply = board
                .positions()
                .rev()
                .find(|&position| moves.iter().all(|mv| mv.position() != position))
                .unwrap();
            moves.push(Move::at(reply, Player::X));
        }
        assert_eq!(session.replica().num_moves(), 5);
    }

    #[test]
    fn resync_rebuilds() {
        let (x, o) = (Player::X, Player::O);
        let board = Board::new(3, 3, 3).unwrap();
        let mut session = Session::new(x, board, small()).unwrap();
        let mut wrapper = MoveTrackingWrapper::new(Recorder::default());
        wrapper.new_game(x, board).unwrap();

        wrapper.play_turn(vec![]).unwrap();
        let tracker = wrapper_tracker(&mut wrapper);
        let tree = session.advance(&tracker).unwrap();
        assert_eq!(
            tree.root().predictions().next().and_then(|child| child.mv()),
            Some(Move::at(Position::new(1, 1), x))
        );

        // We didn't play the centre, which the tree has to cope with
        wrapper
            .play_turn(vec![Move::new(0, 0, x), Move::new(2, 2, o)])
            .unwrap();
        let tracker = wrapper_tracker(&mut wrapper);
        assert!(!tracker.resynced());
        let tree = session.advance(&tracker).unwrap();
        assert_eq!(tree.to_move(), x);
        assert_eq!(session.replica().num_moves(), 2);

        let moves = vec![Move::new(1, 1, x), Move::new(0, 1, o)];
        wrapper.play_turn(moves.clone()).unwrap();
        let tracker = wrapper_tracker(&mut wrapper);
        assert!(tracker.resynced());
        let tree = session.advance(&tracker).unwrap();
        assert_eq!(tree.to_move(), x);
        assert!(moves.iter().all(|&mv| session.replica().contains(mv)));
        assert_eq!(session.replica().num_moves(), 2);
    }

    #[test]
    fn rejects_small_win_length() {
        let board = Board::new(5, 5, 2).unwrap();
        assert!(Session::new(Player::X, board, AnalyzerConfig::default()).is_err());
    }

    fn wrapper_tracker(wrapper: &mut MoveTrackingWrapper<Recorder>) -> MoveTracker {
        wrapper.inner_mut().tracker.clone()
    }
}
