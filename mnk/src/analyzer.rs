use tracing::{debug, trace};

use crate::evaluate::{self, Evaluate};
use crate::{AnalyzerConfig, Error, Position, PredictionTree, Result};

/// Picks the next move from a prediction tree.
#[derive(Clone, Debug, Default)]
pub struct Analyzer {
    config: AnalyzerConfig,
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// The score of every prediction of the root, in row-major order.
    pub fn scores(&self, tree: &PredictionTree) -> Vec<(Position, f64)> {
        let evaluator = evaluate::standard(&self.config, tree.to_move());
        tree.root()
            .predictions()
            .filter_map(|child| {
                let position = child.mv()?.position();
                let score = evaluator.evaluate(&child);
                trace!(%position, score, categories = %child.categories());
                Some((position, score))
            })
            .collect()
    }

    /// The best-scoring cell for the player to move. On a tie, the earliest
    /// cell in row-major order wins.
    pub fn analyze(&self, tree: &PredictionTree) -> Result<Position> {
        let mut best: Option<(Position, f64)> = None;
        for (position, score) in self.scores(tree) {
            if best.map_or(true, |(_, best_score)| score > best_score) {
                best = Some((position, score));
            }
        }
        let (position, score) = best.ok_or(Error::NoLegalMove)?;
        debug!(player = %tree.to_move(), %position, score, "Chose move");
        Ok(position)
    }
}
