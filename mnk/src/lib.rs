pub use analyzer::*;
pub use board::*;
pub use categorize::*;
pub use config::*;
pub use errors::*;
pub use move_type::*;
pub use protocol::*;
pub use tree::*;
pub use visualization::*;

mod analyzer;
#[cfg(test)]
mod arbitrary;
mod bitset;
mod board;
mod categorize;
mod config;
mod errors;
pub mod evaluate;
mod move_type;
mod protocol;
pub mod scan;
mod tree;
mod visualization;
