use thiserror::Error;

use crate::simulation::GamePhase;

#[derive(Debug, Error)]
pub enum BlackjackError {
    #[error("cannot deal {requested} cards, only {remaining} remain in the deck")]
    InsufficientCards { requested: usize, remaining: usize },

    #[error("{operation} is only allowed in {expected:?} phase, current phase is {actual:?}")]
    WrongPhase {
        operation: &'static str,
        expected: GamePhase,
        actual: GamePhase,
    },

    #[error("expected `hit` or `stay`, got `{0}`")]
    InvalidInput(String),

    #[error("internal error: {0}")]
    Internal(&'static str),
}
