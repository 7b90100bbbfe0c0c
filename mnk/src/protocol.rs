use serde::{Deserialize, Serialize};

use crate::{Board, Move, Player, Position};

/// Request for a bot to do something.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Request {
    /// Request to reset the bot's state for a new game.
    ///
    /// The response should be an [`Okay`].
    NewGame {
        /// The stones the bot plays.
        player: Player,
        board: Board,
    },
    /// Request to play the next turn.
    ///
    /// The response should be a [`TurnResponse`].
    PlayTurn {
        /// Every move played so far, in the order they were played.
        moves: Vec<Move>,
    },
    /// The bot should shut down.
    Bye,
}

/// Dummy struct for use in bot communication.
///
/// Used to signal an acknowledgement without data.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Okay();

/// Where to place the next stone.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TurnResponse {
    Play(Position),
    /// The board is full.
    NoLegalMove,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn requests_from_json() {
        let request: Request = serde_json::from_str(
            r#"{"type": "NewGame", "player": "o", "board": {"rows": 3, "columns": 4, "win_length": 3}}"#,
        )
        .unwrap();
        assert_eq!(
            request,
            Request::NewGame {
                player: Player::O,
                board: Board::new(3, 4, 3).unwrap()
            }
        );

        let request: Request = serde_json::from_str(
            r#"{"type": "PlayTurn", "moves": [{"row": 1, "column": 1, "player": "x"}]}"#,
        )
        .unwrap();
        assert_eq!(
            request,
            Request::PlayTurn {
                moves: vec![Move::new(1, 1, Player::X)]
            }
        );

        let request: Request = serde_json::from_str(r#"{"type": "Bye"}"#).unwrap();
        assert_eq!(request, Request::Bye);
    }

    #[test]
    fn invalid_board_is_rejected() {
        let request = serde_json::from_str::<Request>(
            r#"{"type": "NewGame", "player": "x", "board": {"rows": 0, "columns": 4, "win_length": 3}}"#,
        );
        assert!(request.is_err());
    }

    #[test]
    fn responses_to_json() {
        assert_eq!(
            serde_json::to_string(&TurnResponse::Play(Position::new(2, 0))).unwrap(),
            r#"{"play":{"row":2,"column":0}}"#
        );
        assert_eq!(
            serde_json::to_string(&TurnResponse::NoLegalMove).unwrap(),
            r#""no_legal_move""#
        );
        assert_eq!(serde_json::to_string(&Okay()).unwrap(), "[]");
    }
}
