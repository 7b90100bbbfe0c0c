//! Walking outward from a cell along the four line directions.
//!
//! Each axis is scanned in both sub-directions at once. The two sides share
//! an accumulator and a caller-supplied success predicate; as soon as the
//! predicate holds, the side that noticed trips a [`CancelToken`] and the
//! sibling stops at its next step. Predicates must be monotone in the
//! tallies (counts only grow), which makes the verdict independent of how
//! the two sides are scheduled.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, PoisonError};

use rayon::prelude::*;
use tracing::trace;

use crate::{MoveLookup, Player, Position};

/// One of the four lines through a cell.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    Vertical,
    Horizontal,
    Diagonal,
    AntiDiagonal,
}

impl Axis {
    pub const ALL: [Axis; 4] = [
        Axis::Vertical,
        Axis::Horizontal,
        Axis::Diagonal,
        Axis::AntiDiagonal,
    ];

    /// Unit step of the "front" sub-direction. "Behind" is its negation.
    pub fn direction(self) -> (i32, i32) {
        match self {
            Axis::Vertical => (1, 0),
            Axis::Horizontal => (0, 1),
            Axis::Diagonal => (1, 1),
            Axis::AntiDiagonal => (1, -1),
        }
    }
}

/// What a scanned cell holds, seen from the scanning player.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Cell {
    Empty,
    Own,
    Opponent,
}

/// A cooperative cancellation flag.
///
/// A token created with [`CancelToken::child()`] also reports cancellation
/// when any of its ancestors is cancelled, but cancelling it leaves the
/// ancestors alone.
#[derive(Debug, Default)]
pub struct CancelToken<'p> {
    cancelled: AtomicBool,
    parent: Option<&'p CancelToken<'p>>,
}

impl<'p> CancelToken<'p> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn child(&self) -> CancelToken<'_> {
        CancelToken {
            cancelled: AtomicBool::new(false),
            parent: Some(self),
        }
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Release);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Acquire)
            || self.parent.is_some_and(|parent| parent.is_cancelled())
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum Phase {
    #[default]
    Start,
    Run,
    OpponentRun,
    Open,
    Closed,
}

/// Running counts of one sub-scan.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Tally {
    /// Own cells directly adjacent to the origin, without a gap.
    pub run: usize,
    /// Opponent cells directly adjacent to the origin, without a gap.
    /// At most one of `run` and `opponent_run` is non-zero.
    pub opponent_run: usize,
    /// Empty cells directly following the own run (or the origin).
    pub open: usize,
    /// Whether any empty cell was seen.
    pub found_empty: bool,
    phase: Phase,
}

impl Tally {
    pub fn record(&mut self, cell: Cell) {
        match (self.phase, cell) {
            (Phase::Start | Phase::Run, Cell::Own) => {
                self.run += 1;
                self.phase = Phase::Run;
            }
            (Phase::Start | Phase::OpponentRun, Cell::Opponent) => {
                self.opponent_run += 1;
                self.phase = Phase::OpponentRun;
            }
            (Phase::Start | Phase::Run | Phase::Open, Cell::Empty) => {
                self.open += 1;
                self.phase = Phase::Open;
            }
            _ => self.phase = Phase::Closed,
        }
        self.found_empty |= cell == Cell::Empty;
    }
}

/// Placing here makes a run of `win_length`.
pub fn completes_run(win_length: usize) -> impl Fn(&Tally, &Tally) -> bool + Sync + Copy {
    let needed = win_length.saturating_sub(1);
    move |front, behind| front.run + behind.run >= needed
}

/// The opponent would make a run of `win_length` by placing here.
pub fn blocks_run(win_length: usize) -> impl Fn(&Tally, &Tally) -> bool + Sync + Copy {
    let needed = win_length.saturating_sub(1);
    move |front, behind| front.opponent_run + behind.opponent_run >= needed
}

/// Placing here makes a run of `win_length - 1` that can be completed on
/// at least two cells.
pub fn open_threat(win_length: usize) -> impl Fn(&Tally, &Tally) -> bool + Sync + Copy {
    let needed = win_length.saturating_sub(2);
    move |front, behind| front.run + behind.run >= needed && front.open + behind.open >= 2
}

/// The cells seen by one sub-scan, closest first.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SubScan {
    pub cells: Vec<Cell>,
    pub tally: Tally,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Verdict {
    Satisfied,
    Unsatisfied,
    /// Stopped from outside before a verdict was reached.
    Cancelled,
}

/// Result of scanning one axis.
///
/// A sub-scan that was cancelled by its sibling (or from outside) is
/// `None`: its partial cells are dropped.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AxisScan {
    pub axis: Axis,
    pub front: Option<SubScan>,
    pub behind: Option<SubScan>,
    pub verdict: Verdict,
}

#[derive(Clone, Copy, Debug)]
enum Side {
    Front = 0,
    Behind = 1,
}

/// Scans the lines through one cell from the point of view of one player.
pub struct LineScanner<'a> {
    lookup: &'a dyn MoveLookup,
    origin: Position,
    perspective: Player,
    limit: usize,
}

impl<'a> LineScanner<'a> {
    /// A scanner that walks at most K−1 cells in every sub-direction.
    pub fn new(lookup: &'a dyn MoveLookup, origin: Position, perspective: Player) -> Self {
        let limit = (lookup.board().win_length() - 1).max(0) as usize;
        Self::with_limit(lookup, origin, perspective, limit)
    }

    /// The limit is capped at the board's span, past which every cell is
    /// off the board.
    pub fn with_limit(
        lookup: &'a dyn MoveLookup,
        origin: Position,
        perspective: Player,
        limit: usize,
    ) -> Self {
        Self {
            lookup,
            origin,
            perspective,
            limit: limit.min(lookup.board().span() as usize),
        }
    }

    /// `None` when the position is off the board.
    pub fn classify(&self, position: Position) -> Option<Cell> {
        if !self.lookup.board().contains(position) {
            return None;
        }
        Some(match self.lookup.get(position) {
            None => Cell::Empty,
            Some(mv) if mv.player == self.perspective => Cell::Own,
            Some(_) => Cell::Opponent,
        })
    }

    /// Scans both sub-directions of `axis` concurrently.
    pub fn scan_axis<P>(&self, axis: Axis, token: &CancelToken<'_>, predicate: &P) -> AxisScan
    where
        P: Fn(&Tally, &Tally) -> bool + Sync,
    {
        let axis_token = token.child();
        let progress = Mutex::new([Tally::default(); 2]);
        let (d_row, d_column) = axis.direction();
        let (front, behind) = rayon::join(
            || self.walk((d_row, d_column), Side::Front, &progress, &axis_token, predicate),
            || self.walk((-d_row, -d_column), Side::Behind, &progress, &axis_token, predicate),
        );
        let tallies = progress.into_inner().unwrap_or_else(PoisonError::into_inner);
        // The sub-scans only ever cancel the axis token after the predicate
        // held, so a cancellation without success came from outside.
        let verdict = if predicate(&tallies[0], &tallies[1]) {
            Verdict::Satisfied
        } else if axis_token.is_cancelled() {
            Verdict::Cancelled
        } else {
            Verdict::Unsatisfied
        };
        AxisScan {
            axis,
            front,
            behind,
            verdict,
        }
    }

    /// Counts the axes on which `predicate` holds.
    ///
    /// The axes are scanned in parallel. Once `required` of them are
    /// confirmed, the remaining scans are cancelled and don't count, so the
    /// result is exact below `required` and at least `required` otherwise.
    pub fn count_axes<P>(&self, required: usize, token: &CancelToken<'_>, predicate: &P) -> usize
    where
        P: Fn(&Tally, &Tally) -> bool + Sync,
    {
        let fan_in = token.child();
        let confirmed = AtomicUsize::new(0);
        Axis::ALL.par_iter().for_each(|&axis| {
            if fan_in.is_cancelled() {
                return;
            }
            let scan = self.scan_axis(axis, &fan_in, predicate);
            trace!(origin = %self.origin, ?axis, verdict = ?scan.verdict);
            if scan.verdict == Verdict::Satisfied
                && confirmed.fetch_add(1, Ordering::AcqRel) + 1 >= required
            {
                fan_in.cancel();
            }
        });
        confirmed.load(Ordering::Acquire)
    }

    fn walk<P>(
        &self,
        direction: (i32, i32),
        side: Side,
        progress: &Mutex<[Tally; 2]>,
        token: &CancelToken<'_>,
        predicate: &P,
    ) -> Option<SubScan>
    where
        P: Fn(&Tally, &Tally) -> bool + Sync,
    {
        let mut cells = Vec::with_capacity(self.limit);
        let mut tally = Tally::default();
        for steps in 1..=self.limit as i32 {
            if token.is_cancelled() {
                trace!(origin = %self.origin, ?side, steps, "sub-scan cancelled");
                return None;
            }
            let Some(cell) = self.classify(self.origin.offset(direction, steps)) else {
                break;
            };
            cells.push(cell);
            tally.record(cell);
            let satisfied = {
                let mut shared = progress.lock().unwrap_or_else(PoisonError::into_inner);
                shared[side as usize] = tally;
                predicate(&shared[0], &shared[1])
            };
            if satisfied {
                token.cancel();
                break;
            }
        }
        Some(SubScan { cells, tally })
    }
}
