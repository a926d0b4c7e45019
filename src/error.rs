//! Error taxonomy for the core and its ambient front-end.
//!
//! Plain hand-rolled enums, no `thiserror`/`anyhow`: a handful of
//! variants the front-end can match on, with a `Display` impl for the
//! UCI `info string` / logging paths.

use std::fmt;

/// Anything that can go wrong building or updating a [`crate::position::Position`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PositionError {
    Fen(String),
    IllegalMove { from: crate::types::Square, to: crate::types::Square },
}

impl fmt::Display for PositionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PositionError::Fen(msg) => write!(f, "invalid FEN: {msg}"),
            PositionError::IllegalMove { from, to } => {
                write!(f, "illegal move {}->{}", from.0, to.0)
            }
        }
    }
}

impl std::error::Error for PositionError {}

/// Top-level error type surfaced by the engine's ambient front-end
/// (config parsing, NNUE loading, UCI command handling).
#[derive(Debug)]
pub enum EngineError {
    Position(PositionError),
    NnueLoad(String),
    Config(String),
    Uci(String),
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Position(e) => write!(f, "{e}"),
            EngineError::NnueLoad(msg) => write!(f, "failed to load network: {msg}"),
            EngineError::Config(msg) => write!(f, "bad configuration: {msg}"),
            EngineError::Uci(msg) => write!(f, "uci: {msg}"),
        }
    }
}

impl std::error::Error for EngineError {}

impl From<PositionError> for EngineError {
    fn from(e: PositionError) -> Self {
        EngineError::Position(e)
    }
}
