//! Sorting candidate moves into the [`MoveType`] lattice.
//!
//! Every categorizer delegates to the one for the next weaker category and
//! only runs its own test when that one succeeded, so its result always
//! contains the weaker tags it relied on.

use tracing::trace;

use crate::scan::{blocks_run, completes_run, open_threat, CancelToken, LineScanner};
use crate::{
    Board, BoundingBox, CategorizedMove, Error, Move, MoveLookup, MoveType, MoveTypes, Player,
    Result,
};

pub trait Categorize: Send + Sync {
    /// The categories `mv` belongs to on the board described by `lookup`.
    ///
    /// The returned set is closed under the lattice.
    fn categorize(&self, mv: Move, lookup: &dyn MoveLookup) -> MoveTypes;

    fn categorize_move(&self, mv: Move, lookup: &dyn MoveLookup) -> CategorizedMove {
        CategorizedMove::new(mv, self.categorize(mv, lookup))
    }
}

/// Scanning categorizers look K−2 cells past the candidate, which only
/// makes sense for K ≥ 3.
fn scan_window(board: &Board, categorizer: &str) -> Result<usize> {
    if board.win_length() < 3 {
        return Err(Error::InvalidConfiguration(format!(
            "{} needs a winning run length of at least 3, got {}",
            categorizer,
            board.win_length()
        )));
    }
    Ok(board.win_length() as usize)
}

fn any_move_near(
    lookup: &dyn MoveLookup,
    mv: Move,
    radius: i32,
    player: Option<Player>,
) -> bool {
    let area = BoundingBox::around(mv.position(), radius);
    lookup.moves().any(|other| {
        area.contains(other.position()) && player.map_or(true, |player| other.player == player)
    })
}

/// The cell is on the board and nobody has played there.
#[derive(Clone, Copy, Debug, Default)]
pub struct Possible;

impl Categorize for Possible {
    fn categorize(&self, mv: Move, lookup: &dyn MoveLookup) -> MoveTypes {
        let position = mv.position();
        if lookup.board().contains(position) && lookup.get(position).is_none() {
            MoveType::Possible.implied()
        } else {
            MoveTypes::new()
        }
    }
}

/// Possible, and some stone lies within K−1 cells.
#[derive(Clone, Copy, Debug)]
pub struct Tactical {
    possible: Possible,
    radius: i32,
}

impl Tactical {
    pub fn new(board: &Board) -> Self {
        Self {
            possible: Possible,
            radius: (board.win_length() - 1).min(board.span()),
        }
    }
}

impl Categorize for Tactical {
    fn categorize(&self, mv: Move, lookup: &dyn MoveLookup) -> MoveTypes {
        let tags = self.possible.categorize(mv, lookup);
        if tags.contains(MoveType::Possible) && any_move_near(lookup, mv, self.radius, None) {
            tags | MoveType::Tactical.implied()
        } else {
            tags
        }
    }
}

/// Tactical, and one of the player's own stones lies within K cells.
#[derive(Clone, Copy, Debug)]
pub struct Offensive {
    tactical: Tactical,
    radius: i32,
}

impl Offensive {
    pub fn new(board: &Board) -> Self {
        Self {
            tactical: Tactical::new(board),
            radius: board.win_length().min(board.span()),
        }
    }
}

impl Categorize for Offensive {
    fn categorize(&self, mv: Move, lookup: &dyn MoveLookup) -> MoveTypes {
        let tags = self.tactical.categorize(mv, lookup);
        if tags.contains(MoveType::Tactical)
            && any_move_near(lookup, mv, self.radius, Some(mv.player))
        {
            tags | MoveType::Offensive.implied()
        } else {
            tags
        }
    }
}

/// Tactical, and an opponent's stone lies within K cells.
#[derive(Clone, Copy, Debug)]
pub struct Defensive {
    tactical: Tactical,
    radius: i32,
}

impl Defensive {
    pub fn new(board: &Board) -> Self {
        Self {
            tactical: Tactical::new(board),
            radius: board.win_length().min(board.span()),
        }
    }
}

impl Categorize for Defensive {
    fn categorize(&self, mv: Move, lookup: &dyn MoveLookup) -> MoveTypes {
        let tags = self.tactical.categorize(mv, lookup);
        if tags.contains(MoveType::Tactical)
            && any_move_near(lookup, mv, self.radius, Some(mv.player.opponent()))
        {
            tags | MoveType::Defensive.implied()
        } else {
            tags
        }
    }
}

/// Number of axes through `mv` on which its player would have a complete run.
fn winning_axes(lookup: &dyn MoveLookup, mv: Move, win_length: usize) -> usize {
    LineScanner::new(lookup, mv.position(), mv.player).count_axes(
        1,
        &CancelToken::new(),
        &completes_run(win_length),
    )
}

/// Number of axes through `mv` on which the opponent of its player would
/// complete a run, seen from the player's side.
fn blocking_axes(lookup: &dyn MoveLookup, mv: Move, win_length: usize) -> usize {
    LineScanner::new(lookup, mv.position(), mv.player).count_axes(
        1,
        &CancelToken::new(),
        &blocks_run(win_length),
    )
}

/// Number of axes through `mv` on which `player` would have an open threat,
/// counted up to two.
fn threat_axes(lookup: &dyn MoveLookup, mv: Move, player: Player, win_length: usize) -> usize {
    LineScanner::new(lookup, mv.position(), player).count_axes(
        2,
        &CancelToken::new(),
        &open_threat(win_length),
    )
}

/// Offensive, and placing the stone completes a run of K.
#[derive(Clone, Copy, Debug)]
pub struct Winning {
    offensive: Offensive,
    win_length: usize,
}

impl Winning {
    pub fn new(board: &Board) -> Result<Self> {
        Ok(Self {
            offensive: Offensive::new(board),
            win_length: scan_window(board, "the winning move categorizer")?,
        })
    }
}

impl Categorize for Winning {
    fn categorize(&self, mv: Move, lookup: &dyn MoveLookup) -> MoveTypes {
        let tags = self.offensive.categorize(mv, lookup);
        if tags.contains(MoveType::Offensive)
            && winning_axes(lookup, mv, self.win_length) >= 1
        {
            trace!(%mv, "winning");
            tags | MoveType::Winning.implied()
        } else {
            tags
        }
    }
}

/// Offensive, and placing the stone creates open threats on two axes at once.
#[derive(Clone, Copy, Debug)]
pub struct Fork {
    offensive: Offensive,
    win_length: usize,
}

impl Fork {
    pub fn new(board: &Board) -> Result<Self> {
        Ok(Self {
            offensive: Offensive::new(board),
            win_length: scan_window(board, "the fork categorizer")?,
        })
    }
}

impl Categorize for Fork {
    fn categorize(&self, mv: Move, lookup: &dyn MoveLookup) -> MoveTypes {
        let tags = self.offensive.categorize(mv, lookup);
        if tags.contains(MoveType::Offensive)
            && threat_axes(lookup, mv, mv.player, self.win_length) >= 2
        {
            trace!(%mv, "fork");
            tags | MoveType::Fork.implied()
        } else {
            tags
        }
    }
}

/// Defensive, and the opponent would complete a run of K on this cell.
#[derive(Clone, Copy, Debug)]
pub struct BlockWinning {
    defensive: Defensive,
    win_length: usize,
}

impl BlockWinning {
    pub fn new(board: &Board) -> Result<Self> {
        Ok(Self {
            defensive: Defensive::new(board),
            win_length: scan_window(board, "the win blocking categorizer")?,
        })
    }
}

impl Categorize for BlockWinning {
    fn categorize(&self, mv: Move, lookup: &dyn MoveLookup) -> MoveTypes {
        let tags = self.defensive.categorize(mv, lookup);
        if tags.contains(MoveType::Defensive)
            && blocking_axes(lookup, mv, self.win_length) >= 1
        {
            trace!(%mv, "blocks a win");
            tags | MoveType::BlockWinning.implied()
        } else {
            tags
        }
    }
}

/// Defensive, and the opponent would fork on this cell.
#[derive(Clone, Copy, Debug)]
pub struct BlockFork {
    defensive: Defensive,
    win_length: usize,
}

impl BlockFork {
    pub fn new(board: &Board) -> Result<Self> {
        Ok(Self {
            defensive: Defensive::new(board),
            win_length: scan_window(board, "the fork blocking categorizer")?,
        })
    }
}

impl Categorize for BlockFork {
    fn categorize(&self, mv: Move, lookup: &dyn MoveLookup) -> MoveTypes {
        let tags = self.defensive.categorize(mv, lookup);
        if tags.contains(MoveType::Defensive)
            && threat_axes(lookup, mv, mv.player.opponent(), self.win_length) >= 2
        {
            trace!(%mv, "blocks a fork");
            tags | MoveType::BlockFork.implied()
        } else {
            tags
        }
    }
}

/// Runs several categorizers and merges their findings.
#[derive(Default)]
pub struct CompositeCategorizer {
    parts: Vec<Box<dyn Categorize>>,
}

impl CompositeCategorizer {
    pub fn new(parts: Vec<Box<dyn Categorize>>) -> Self {
        Self { parts }
    }

    /// Covers the whole lattice.
    ///
    /// Fails for K < 3.
    pub fn standard(board: &Board) -> Result<Self> {
        Ok(Self::new(vec![
            Box::new(Winning::new(board)?),
            Box::new(Fork::new(board)?),
            Box::new(BlockWinning::new(board)?),
            Box::new(BlockFork::new(board)?),
        ]))
    }

    pub fn push(&mut self, part: Box<dyn Categorize>) {
        self.parts.push(part);
    }
}

impl Categorize for CompositeCategorizer {
    fn categorize(&self, mv: Move, lookup: &dyn MoveLookup) -> MoveTypes {
        self.parts
            .iter()
            .fold(MoveTypes::new(), |tags, part| tags | part.categorize(mv, lookup))
    }
}
