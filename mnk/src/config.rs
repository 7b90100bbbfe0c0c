use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{MoveType, Result};

/// One weight per [`MoveType`].
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    pub possible: f64,
    pub tactical: f64,
    pub offensive: f64,
    pub defensive: f64,
    pub fork: f64,
    pub winning: f64,
    pub block_fork: f64,
    pub block_winning: f64,
}

impl Weights {
    pub fn get(&self, tag: MoveType) -> f64 {
        match tag {
            MoveType::Possible => self.possible,
            MoveType::Tactical => self.tactical,
            MoveType::Offensive => self.offensive,
            MoveType::Defensive => self.defensive,
            MoveType::Fork => self.fork,
            MoveType::Winning => self.winning,
            MoveType::BlockFork => self.block_fork,
            MoveType::BlockWinning => self.block_winning,
        }
    }

    /// The weights indexed by the discriminant of [`MoveType`].
    pub fn to_array(&self) -> [f64; 8] {
        MoveType::ALL.map(|tag| self.get(tag))
    }
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            possible: 0.0,
            tactical: 0.0,
            offensive: 1.0,
            defensive: 1.0,
            fork: 2.25,
            winning: 3.25,
            block_fork: 2.0,
            block_winning: 3.0,
        }
    }
}

/// Everything that can be tuned about the analysis.
///
/// Missing fields take their default, so an empty JSON object is a valid
/// configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub weights: Weights,
    /// Scale of the category score of the move itself.
    pub immediate_rate: f64,
    /// Scale of the averaged score of the predicted continuations.
    pub look_ahead_rate: f64,
    /// Number of plies the prediction tree is grown to.
    pub depth: usize,
    /// Number of candidates kept per ply below the root.
    pub branching: usize,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            weights: Weights::default(),
            immediate_rate: 0.65,
            look_ahead_rate: 0.35,
            depth: 2,
            branching: 8,
        }
    }
}

impl AnalyzerConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config: AnalyzerConfig = serde_json::from_str(&contents)?;
        debug!(path = %path.display(), ?config, "Loaded analyzer configuration");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn empty_object_is_the_reference_configuration() {
        let config: AnalyzerConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, AnalyzerConfig::default());
        assert_eq!(config.weights.get(MoveType::Winning), 3.25);
        assert_eq!(config.weights.get(MoveType::Tactical), 0.0);
    }

    #[test]
    fn partial_override() {
        let config: AnalyzerConfig =
            serde_json::from_str(r#"{"depth": 3, "weights": {"fork": 5.0}}"#).unwrap();
        assert_eq!(config.depth, 3);
        assert_eq!(config.branching, 8);
        assert_eq!(config.weights.fork, 5.0);
        assert_eq!(config.weights.block_fork, 2.0);
    }

    #[test]
    fn weights_array_follows_the_lattice_order() {
        let weights = Weights::default().to_array();
        assert_eq!(weights[MoveType::Fork as usize], 2.25);
        assert_eq!(weights[MoveType::BlockWinning as usize], 3.0);
    }

    #[test]
    fn load_reports_missing_file_and_bad_json() {
        let dir = std::env::temp_dir();
        assert!(matches!(
            AnalyzerConfig::load(dir.join("mnk-config-does-not-exist.json")),
            Err(Error::Io(_))
        ));
        let path = dir.join(format!("mnk-config-{}.json", std::process::id()));
        std::fs::write(&path, "{ not json").unwrap();
        assert!(matches!(AnalyzerConfig::load(&path), Err(Error::Json(_))));
        std::fs::write(&path, r#"{"branching": 4}"#).unwrap();
        assert_eq!(AnalyzerConfig::load(&path).unwrap().branching, 4);
        std::fs::remove_file(&path).unwrap();
    }
}
