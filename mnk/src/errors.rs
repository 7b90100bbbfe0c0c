use thiserror::Error;

/// The error type of this crate.
#[derive(Debug, Error)]
pub enum Error {
    /// The board or the analyzer settings cannot work together, e.g. a
    /// winning run length too short for line scanning.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// There is no cell left to play on. The match is over.
    #[error("no legal move left on the board")]
    NoLegalMove,

    #[error("cell ({row}, {column}) is outside of the board")]
    OutOfRange { row: i32, column: i32 },

    #[error("cell ({row}, {column}) is already occupied")]
    Occupied { row: i32, column: i32 },

    #[error("could not read configuration file: {0}")]
    Io(#[from] std::io::Error),

    #[error("could not parse configuration: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
