mod session;

use std::path::PathBuf;

use clap::Parser;
use mnk::{Analyzer, AnalyzerConfig, Board, Error, Move, Player, TurnResponse};
use mnk_bot_utils::{Bot, HasMoveTracker, MoveTracker, MoveTrackingWrapper};
use session::Session;
use tracing::{debug, info};
use tracing_subscriber::filter::{LevelFilter, Targets};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[derive(Parser)]
struct Args {
    /// A log level among "off", "error", "warn", "info", "debug", "trace"
    #[arg(short, long, default_value = "info")]
    log_level: LevelFilter,
    /// JSON file with analyzer settings. Missing settings keep their default.
    #[arg(short, long)]
    config: Option<PathBuf>,
}

struct AnalyzerBot {
    analyzer: Analyzer,
    tracker: MoveTracker,
    session: Option<Session>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    initialize_logging(args.log_level);
    let config = match &args.config {
        Some(path) => AnalyzerConfig::load(path)?,
        None => AnalyzerConfig::default(),
    };
    info!(?config, "Starting");
    MoveTrackingWrapper::new(AnalyzerBot {
        analyzer: Analyzer::new(config),
        tracker: MoveTracker::default(),
        session: None,
    })
    .run()
}

fn initialize_logging(level: LevelFilter) {
    let format = tracing_subscriber::fmt::format()
        .with_target(false)
        .compact();

    let filter = Targets::new().with_default(level);

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .event_format(format)
                .with_writer(std::io::stderr),
        )
        .with(filter)
        .init();
}

impl HasMoveTracker for AnalyzerBot {
    fn get_tracker(&mut self) -> &mut MoveTracker {
        &mut self.tracker
    }
}

impl Bot for AnalyzerBot {
    fn new_game(&mut self, player: Player, board: Board) -> anyhow::Result<()> {
        info!(
            %player,
            rows = board.rows(),
            columns = board.columns(),
            k = board.win_length(),
            "New game"
        );
        self.session = Some(Session::new(
            player,
            board,
            self.analyzer.config().clone(),
        )?);
        Ok(())
    }

    fn play_turn(&mut self, _moves: Vec<Move>) -> anyhow::Result<TurnResponse> {
        let Some(session) = &mut self.session else {
            anyhow::bail!("Asked to play a turn before a game was started");
        };
        let tree = session.advance(&self.tracker)?;
        match self.analyzer.analyze(tree) {
            Ok(position) => Ok(TurnResponse::Play(position)),
            Err(Error::NoLegalMove) => {
                debug!("Board is full");
                Ok(TurnResponse::NoLegalMove)
            }
            Err(err) => Err(err.into()),
        }
    }
}
