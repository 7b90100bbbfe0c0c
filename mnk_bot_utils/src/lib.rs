mod move_tracking;
pub use move_tracking::*;

use mnk::{Board, Move, Okay, Player, Request, TurnResponse};

/// A trait to simplify writing bots.
pub trait Bot {
    fn new_game(&mut self, player: Player, board: Board) -> anyhow::Result<()>;
    fn play_turn(&mut self, moves: Vec<Move>) -> anyhow::Result<TurnResponse>;

    fn run(&mut self) -> anyhow::Result<()> {
        // Communication happens through stdin/stdout.
        // Stderr can be used for logging.
        let mut stdin = std::io::stdin().lock();
        let mut stdout = std::io::stdout().lock();
        let mut buf = String::new();

        loop {
            // Read the next line into buf
            buf.clear(); // because stdin.read_line() appends to the buffer
            use std::io::BufRead;
            let num_bytes_read = stdin.read_line(&mut buf)?;
            if num_bytes_read == 0 {
                // 0 bytes read means EOF - the judge has exited.
                break Ok(());
            }

            let req = serde_json::from_str::<Request>(buf.trim_end())?;

            match req {
                Request::NewGame { player, board } => {
                    self.new_game(player, board)?;
                    serde_json::to_writer(&mut stdout, &Okay())?;
                }
                Request::PlayTurn { moves } => {
                    serde_json::to_writer(&mut stdout, &self.play_turn(moves)?)?
                }
                Request::Bye => break Ok(()),
            }
            use std::io::Write;
            writeln!(stdout)?;
            stdout.flush()?;
        }
    }
}
