//! Composable scoring of moves.
//!
//! An evaluator is a total function from a [`Subject`] to a score. The
//! building blocks here are meant to be stacked; see [`standard()`] for the
//! combination the analyzer uses.

use crate::{AnalyzerConfig, CategorizedMove, Move, MoveTypes, Player, Weights};

/// Optional capabilities of a [`Subject`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capability {
    /// It carries a set of move categories.
    Categorized,
    /// It carries predictions of the moves that may follow.
    Predicted,
}

/// Something that can be scored: a move, possibly categorized, possibly
/// with predicted continuations.
pub trait Subject {
    /// The move this subject stands for, if any.
    fn played(&self) -> Option<Move>;

    fn categories(&self) -> Option<MoveTypes>;

    /// The predicted next moves. Empty if there are none.
    fn predictions(&self) -> Vec<Box<dyn Subject + '_>>;

    fn has(&self, capability: Capability) -> bool {
        match capability {
            Capability::Categorized => self.categories().is_some(),
            Capability::Predicted => !self.predictions().is_empty(),
        }
    }
}

impl Subject for CategorizedMove {
    fn played(&self) -> Option<Move> {
        Some(self.mv)
    }

    fn categories(&self) -> Option<MoveTypes> {
        Some(self.categories)
    }

    fn predictions(&self) -> Vec<Box<dyn Subject + '_>> {
        Vec::new()
    }

    fn has(&self, capability: Capability) -> bool {
        capability == Capability::Categorized
    }
}

pub trait Evaluate: Send + Sync {
    fn evaluate(&self, subject: &dyn Subject) -> f64;
}

/// Sum of one weight per category held.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CategoryWeights {
    weights: [f64; 8],
}

impl CategoryWeights {
    pub fn new(weights: &Weights) -> Self {
        Self {
            weights: weights.to_array(),
        }
    }
}

impl Evaluate for CategoryWeights {
    fn evaluate(&self, subject: &dyn Subject) -> f64 {
        subject.categories().map_or(0.0, |tags| {
            tags.into_iter().map(|tag| self.weights[tag as usize]).sum()
        })
    }
}

/// Scales another evaluator.
pub struct Rate {
    rate: f64,
    child: Box<dyn Evaluate>,
}

impl Rate {
    pub fn new(rate: f64, child: impl Evaluate + 'static) -> Self {
        Self {
            rate,
            child: Box::new(child),
        }
    }
}

impl Evaluate for Rate {
    fn evaluate(&self, subject: &dyn Subject) -> f64 {
        self.rate * self.child.evaluate(subject)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Condition {
    PlayedBy(Player),
    NotPlayedBy(Player),
}

impl Condition {
    pub fn holds(self, subject: &dyn Subject) -> bool {
        let played_by = |player| subject.played().is_some_and(|mv| mv.player == player);
        match self {
            Condition::PlayedBy(player) => played_by(player),
            Condition::NotPlayedBy(player) => !played_by(player),
        }
    }
}

/// Only lets a score through if a condition holds, 0 otherwise.
pub struct Gate {
    condition: Condition,
    child: Box<dyn Evaluate>,
}

impl Gate {
    pub fn new(condition: Condition, child: impl Evaluate + 'static) -> Self {
        Self {
            condition,
            child: Box::new(child),
        }
    }
}

impl Evaluate for Gate {
    fn evaluate(&self, subject: &dyn Subject) -> f64 {
        if self.condition.holds(subject) {
            self.child.evaluate(subject)
        } else {
            0.0
        }
    }
}

/// Scores 0 for subjects lacking a capability.
pub struct Require {
    capability: Capability,
    child: Box<dyn Evaluate>,
}

impl Require {
    pub fn new(capability: Capability, child: impl Evaluate + 'static) -> Self {
        Self {
            capability,
            child: Box::new(child),
        }
    }
}

impl Evaluate for Require {
    fn evaluate(&self, subject: &dyn Subject) -> f64 {
        if subject.has(self.capability) {
            self.child.evaluate(subject)
        } else {
            0.0
        }
    }
}

/// The mean score of the predicted continuations.
///
/// Continuations that have predictions of their own are averaged
/// recursively; the others are scored by the leaf evaluator. A subject
/// without predictions scores 0.
pub struct LookAhead {
    leaf: Box<dyn Evaluate>,
}

impl LookAhead {
    pub fn new(leaf: impl Evaluate + 'static) -> Self {
        Self {
            leaf: Box::new(leaf),
        }
    }
}

impl Evaluate for LookAhead {
    fn evaluate(&self, subject: &dyn Subject) -> f64 {
        let predictions = subject.predictions();
        if predictions.is_empty() {
            return 0.0;
        }
        let total: f64 = predictions
            .iter()
            .map(|child| {
                if child.has(Capability::Predicted) {
                    self.evaluate(child.as_ref())
                } else {
                    self.leaf.evaluate(child.as_ref())
                }
            })
            .sum();
        total / predictions.len() as f64
    }
}

#[derive(Default)]
pub struct Sum {
    parts: Vec<Box<dyn Evaluate>>,
}

impl Sum {
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with(mut self, part: impl Evaluate + 'static) -> Self {
        self.parts.push(Box::new(part));
        self
    }
}

impl Evaluate for Sum {
    fn evaluate(&self, subject: &dyn Subject) -> f64 {
        self.parts.iter().map(|part| part.evaluate(subject)).sum()
    }
}

/// Category score from the point of view of `me`: positive for my moves,
/// negative for the opponent's.
pub fn signed_weights(weights: &Weights, me: Player) -> Sum {
    let weights = CategoryWeights::new(weights);
    Sum::new()
        .with(Gate::new(Condition::PlayedBy(me), weights))
        .with(Gate::new(
            Condition::NotPlayedBy(me),
            Rate::new(-1.0, weights),
        ))
}

/// The evaluator used to pick moves for `me`: a blend of the move's own
/// category score and the averaged score of its continuations.
pub fn standard(config: &AnalyzerConfig, me: Player) -> Sum {
    Sum::new()
        .with(Rate::new(
            config.immediate_rate,
            Require::new(
                Capability::Categorized,
                signed_weights(&config.weights, me),
            ),
        ))
        .with(Rate::new(
            config.look_ahead_rate,
            Require::new(
                Capability::Predicted,
                LookAhead::new(signed_weights(&config.weights, me)),
            ),
        ))
}
