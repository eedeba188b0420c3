//! Error types for board construction, rule application and search.
//!
//! Expected game conditions (a shortfall, a bankruptcy, a terminal root) are never errors;
//! these only describe violated invariants and rejected inputs.

use thiserror::Error;

use crate::monopoly::Action;

/// The static board tables do not describe a well-formed board.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BoardError {
    #[error("space at position {0} lies outside the board")]
    OutOfRange(usize),

    #[error("position {0} is defined by more than one table entry")]
    Duplicate(usize),

    #[error("no space is defined for position {0}")]
    Missing(usize),
}

/// A rule-engine request that cannot be honoured.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum GameError {
    #[error(transparent)]
    Board(#[from] BoardError),

    #[error("a game needs at least one opponent")]
    NoOpponents,

    #[error("action {0} is not legal in the current state")]
    IllegalAction(Action),
}

/// Errors from the search engine.
#[derive(Debug, Error)]
pub enum SearchError {
    #[error("no child of the root was expanded for action {0}")]
    ChildNotFound(String),

    #[error("failed to build search thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}
